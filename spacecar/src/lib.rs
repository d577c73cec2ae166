//! SpaceCar - car counting over satellite imagery
//!
//! Sends an area of interest to the SpaceKnow analysis service, downloads
//! the resulting imagery and car detections tile by tile, and writes
//! annotated images plus aggregate counts to disk.
//!
//! # High-Level API
//!
//! ```ignore
//! use spacecar::analysis::{Analysis, AnalysisOptions};
//! use spacecar::api::{ApiEndpoints, BearerToken, ReqwestClient, SpaceKnowClient};
//! use spacecar::geometry::Polygon;
//!
//! let polygon = Polygon::load(path).await?;
//! let client = SpaceKnowClient::new(
//!     ReqwestClient::with_timeout(60)?,
//!     BearerToken::new(token),
//!     ApiEndpoints::default(),
//! )?;
//! let report = Analysis::new(client, options).run(&polygon).await?;
//! println!("{} cars", report.summary.total_cars);
//! ```

pub mod analysis;
pub mod api;
pub mod config;
pub mod coord;
pub mod dispatch;
pub mod geometry;
pub mod logging;
pub mod output;
pub mod scene;

/// Version of the SpaceCar library and CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
