//! Placement scoring and commit
//!
//! The validator never raycasts itself. Callers hit-test the scene and hand
//! over the nearest hit, which keeps scoring a pure function of its inputs.

use serde::Serialize;
use tracing::debug;

use crate::config::PlacementConfig;
use crate::scene::{ObjectId, SceneGraph};
use crate::spatial::Point3D;

/// Result of the most recent placement check
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PlacementState {
    /// Where a commit would put the object
    pub position: Point3D,
    pub can_place: bool,
    /// Position that was being evaluated
    pub candidate: Point3D,
}

/// Visual cue for where a dragged object would land
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PlacementIndicator {
    pub visible: bool,
    pub position: Point3D,
    /// Uniform scale in the surface plane, 1.0 at contact
    pub planar_scale: f32,
}

#[derive(Debug, Clone, Default)]
pub struct PlacementValidator {
    config: PlacementConfig,
    state: PlacementState,
    indicator: PlacementIndicator,
}

impl PlacementValidator {
    pub fn new(config: PlacementConfig) -> Self {
        Self {
            config,
            state: PlacementState::default(),
            indicator: PlacementIndicator::default(),
        }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    pub fn state(&self) -> &PlacementState {
        &self.state
    }

    pub fn indicator(&self) -> &PlacementIndicator {
        &self.indicator
    }

    pub fn can_place(&self) -> bool {
        self.state.can_place
    }

    /// Score a downward hit found `hit_distance` below `candidate`.
    ///
    /// Within `max_distance` the placement position becomes the hit point
    /// lifted by the configured surface offset, and the indicator shrinks
    /// linearly from full size at contact to `min_indicator_scale` at the
    /// threshold.
    pub fn check_placement(
        &mut self,
        candidate: Point3D,
        max_distance: f32,
        hit_position: Point3D,
        hit_distance: f32,
    ) -> bool {
        self.state.candidate = candidate;

        if hit_distance < max_distance {
            let position = hit_position.offset_y(self.config.surface_offset);
            let planar_scale = if hit_distance <= 0.0 {
                1.0
            } else {
                1.0 - (1.0 - self.config.min_indicator_scale) * (hit_distance / max_distance)
            };

            self.state.position = position;
            self.state.can_place = true;
            self.indicator = PlacementIndicator {
                visible: true,
                position,
                planar_scale,
            };
        } else {
            self.state.can_place = false;
            self.indicator.visible = false;
        }

        self.state.can_place
    }

    /// Forget the last verdict, e.g. when the downward ray hit nothing
    pub fn clear(&mut self) {
        self.state.can_place = false;
        self.indicator.visible = false;
    }

    /// Move `object` to the stored placement position.
    ///
    /// Returns false, touching nothing, unless the last check allowed
    /// placement. A successful commit consumes that verdict.
    pub fn commit_placement<S: SceneGraph>(&mut self, scene: &mut S, object: ObjectId) -> bool {
        if !self.state.can_place {
            return false;
        }
        let Some(current) = scene.world_transform(object) else {
            self.clear();
            return false;
        };

        scene.set_world_transform(object, current.with_position(self.state.position));
        debug!(object = %object, position = ?self.state.position, "placement committed");
        self.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemoryScene;
    use crate::spatial::{Quaternion, Transform, Vector3D};

    fn validator() -> PlacementValidator {
        PlacementValidator::new(PlacementConfig::default())
    }

    #[test]
    fn test_near_hit_allows_and_scales_indicator() {
        let mut validator = validator();
        let hit = Point3D::new(1.0, 0.5, 2.0);

        assert!(validator.check_placement(Point3D::new(1.0, 0.79, 2.0), 0.3, hit, 0.29));

        let expected = 1.0 - 0.75 * (0.29 / 0.3);
        let indicator = validator.indicator();
        assert!(indicator.visible);
        assert!((indicator.planar_scale - expected).abs() < 0.0001);
        assert!((indicator.planar_scale - 0.275).abs() < 0.001);

        let position = validator.state().position;
        assert!((position.y - 0.501).abs() < 0.00001);
        assert_eq!(position.x, 1.0);
    }

    #[test]
    fn test_far_hit_denies_and_hides() {
        let mut validator = validator();
        validator.check_placement(Point3D::ORIGIN, 0.3, Point3D::ORIGIN, 0.1);
        assert!(validator.indicator().visible);

        assert!(!validator.check_placement(Point3D::ORIGIN, 0.3, Point3D::ORIGIN, 0.31));
        assert!(!validator.can_place());
        assert!(!validator.indicator().visible);
    }

    #[test]
    fn test_contact_is_full_scale() {
        let mut validator = validator();
        assert!(validator.check_placement(Point3D::ORIGIN, 0.3, Point3D::ORIGIN, 0.0));
        assert_eq!(validator.indicator().planar_scale, 1.0);
    }

    #[test]
    fn test_commit_consumes_verdict() {
        let mut scene = MemoryScene::new();
        let rotation = Quaternion::from_axis_angle(Vector3D::UP, 0.4);
        let object = scene.spawn(
            "cup",
            None,
            Transform::from_position_rotation(Point3D::new(0.0, 1.0, 0.0), rotation),
        );

        let mut validator = validator();
        validator.check_placement(
            Point3D::new(0.0, 1.0, 0.0),
            0.3,
            Point3D::new(0.0, 0.8, 0.0),
            0.2,
        );

        assert!(validator.commit_placement(&mut scene, object));
        assert!(!validator.commit_placement(&mut scene, object));
        assert!(!validator.indicator().visible);

        let placed = scene.world_transform(object).unwrap();
        assert!((placed.position.y - 0.801).abs() < 0.0001);
        assert!(placed.rotation.approx_eq(&rotation, 0.0001));
    }

    #[test]
    fn test_commit_without_check_fails() {
        let mut scene = MemoryScene::new();
        let object = scene.spawn("cup", None, Transform::IDENTITY);
        let mut validator = validator();

        assert!(!validator.commit_placement(&mut scene, object));
        assert_eq!(scene.world_transform(object), Some(Transform::IDENTITY));
    }

    #[test]
    fn test_commit_on_missing_object_fails() {
        let mut scene = MemoryScene::new();
        let object = scene.spawn("cup", None, Transform::IDENTITY);
        scene.despawn(object);

        let mut validator = validator();
        validator.check_placement(Point3D::ORIGIN, 0.3, Point3D::ORIGIN, 0.0);
        assert!(!validator.commit_placement(&mut scene, object));
        assert!(!validator.can_place());
    }
}
