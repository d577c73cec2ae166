//! Scene selection.

use crate::api::Scene;
use tracing::info;

/// Picks the scene to analyze.
///
/// Among scenes with `cloudCover <= max_cloud_cover` (a scene without a
/// reported cloud cover counts as fully clouded) the one with the finest
/// ground sample distance wins; ties keep the earlier scene. When no scene
/// is clear enough the first one is used. Returns `None` only for an empty
/// list.
pub fn choose_best_scene(scenes: &[Scene], max_cloud_cover: f64) -> Option<&Scene> {
    let best = scenes
        .iter()
        .filter(|s| s.cloud_cover.unwrap_or(1.0) <= max_cloud_cover)
        .fold(None::<&Scene>, |best, scene| match best {
            Some(b) if gsd_or_max(b) <= gsd_or_max(scene) => Some(b),
            _ => Some(scene),
        })
        .or_else(|| scenes.first())?;

    info!(scene_id = %best.scene_id, datetime = %best.datetime, "Scene was chosen");
    Some(best)
}

fn gsd_or_max(scene: &Scene) -> f64 {
    scene.gsd().unwrap_or(f64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Band;

    fn scene(id: &str, cloud: Option<f64>, gsd: f64) -> Scene {
        Scene {
            scene_id: id.to_string(),
            datetime: "2026-09-01 10:00:00".to_string(),
            cloud_cover: cloud,
            bands: vec![Band {
                gsd,
                names: vec![],
            }],
            provider: None,
            dataset: None,
        }
    }

    #[test]
    fn test_finest_clear_scene_wins() {
        let scenes = vec![
            scene("a", Some(0.1), 0.5),
            scene("b", Some(0.2), 0.3),
            scene("c", Some(0.9), 0.1),
        ];
        assert_eq!(choose_best_scene(&scenes, 0.3).unwrap().scene_id, "b");
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let scenes = vec![scene("a", Some(0.5), 0.5), scene("b", Some(0.3), 0.6)];
        assert_eq!(choose_best_scene(&scenes, 0.3).unwrap().scene_id, "b");
    }

    #[test]
    fn test_missing_cloud_cover_is_not_clear() {
        let scenes = vec![scene("a", Some(0.2), 0.5), scene("b", None, 0.1)];
        assert_eq!(choose_best_scene(&scenes, 0.3).unwrap().scene_id, "a");
    }

    #[test]
    fn test_falls_back_to_first_scene() {
        let scenes = vec![scene("a", Some(0.8), 0.5), scene("b", Some(0.9), 0.1)];
        assert_eq!(choose_best_scene(&scenes, 0.3).unwrap().scene_id, "a");
    }

    #[test]
    fn test_tie_keeps_earlier_scene() {
        let scenes = vec![scene("a", Some(0.1), 0.5), scene("b", Some(0.1), 0.5)];
        assert_eq!(choose_best_scene(&scenes, 0.3).unwrap().scene_id, "a");
    }

    #[test]
    fn test_no_scenes() {
        assert!(choose_best_scene(&[], 0.3).is_none());
    }
}
