//! SpaceCar CLI - Command-line interface
//!
//! Counts cars inside a GeoJSON area using the remote analysis service and
//! writes annotated tiles plus a summary to a timestamped directory.

mod error;
mod runner;

use clap::Parser;
use error::CliError;
use runner::{CliRunner, Overrides};
use spacecar::api::BearerToken;
use spacecar::geometry::Polygon;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "spacecar")]
#[command(version, about = "Count cars in satellite imagery of an area", long_about = None)]
struct Args {
    /// GeoJSON file with the area of interest
    file: PathBuf,

    /// Search for scenes acquired within this many days
    #[arg(long)]
    days_ago: Option<u32>,

    /// Maximum cloud cover (0.0 - 1.0) for a scene to be preferred
    #[arg(long)]
    max_cloud_cover: Option<f64>,

    /// Root directory for run output
    #[arg(long)]
    output: Option<PathBuf>,

    /// Bearer token for the analysis service
    #[arg(long, env = "JWT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    /// Bearer token from `--token` or `JWT_TOKEN`; empty when neither is set.
    fn bearer_token(&self) -> BearerToken {
        BearerToken::new(self.token.clone().unwrap_or_default())
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        e.exit();
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let runner = CliRunner::with_debug(args.debug)?;
    runner.log_startup();

    let polygon = Polygon::load(&args.file).await?;
    info!(
        file = %args.file.display(),
        vertices = polygon.vertices().len(),
        "Area of interest loaded"
    );

    let token = args.bearer_token();
    let analysis = runner.create_analysis(
        token,
        Overrides {
            days_ago: args.days_ago,
            max_cloud_cover: args.max_cloud_cover,
            output: args.output,
        },
    )?;

    println!("Analyzing {}...", args.file.display());
    let report = analysis.run(&polygon).await?;

    if let Some(scene_id) = &report.summary.scene_id {
        println!("Scene: {}", scene_id);
    }
    println!("Tiles analyzed: {}", report.summary.tiles.len());
    println!("Total cars: {}", report.summary.total_cars);
    println!("Output written to {}", report.output_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_token_is_used() {
        let args = Args::try_parse_from(["spacecar", "area.geojson", "--token", " abc "]).unwrap();
        assert!(!args.bearer_token().is_empty());
        assert_eq!(args.bearer_token(), BearerToken::new("abc"));
    }

    #[test]
    fn test_overrides_parse() {
        let args = Args::try_parse_from([
            "spacecar",
            "area.geojson",
            "--days-ago",
            "30",
            "--max-cloud-cover",
            "0.2",
            "--output",
            "runs",
            "--debug",
        ])
        .unwrap();

        assert_eq!(args.file, PathBuf::from("area.geojson"));
        assert_eq!(args.days_ago, Some(30));
        assert_eq!(args.max_cloud_cover, Some(0.2));
        assert_eq!(args.output, Some(PathBuf::from("runs")));
        assert!(args.debug);
    }
}
