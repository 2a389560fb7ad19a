//! World-space bounding volumes per entity type.
//!
//! Collision works entirely on axis-aligned bounding boxes. Each collidable
//! entity kind derives its [`Aabb`] on demand from the entity's position and
//! its rotation about the vertical axis: the eight local corners of a fixed
//! half-extent box are spun about Z, translated, and min/maxed. Tilt and
//! roll are deliberately ignored for bounding purposes even when the render
//! rotation includes them; collision stays in the fixed-camera-height plane.

use glam::{Vec3, vec3};

use crate::config::GameConfig;
use crate::game::entity::{Entity, EntityKind};

/// Vertical offset from a cube entity's position to the center of its
/// collision box, matching the visual mesh origin.
pub const CUBE_CENTER_LIFT: f32 = 0.9;

/// Axis-aligned bounding box described by componentwise min/max corners.
///
/// Invariant: `min[i] <= max[i]` on every axis. Boxes are derived on demand
/// and never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Creates a box from its min/max corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every given point.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }

    /// Box centered on `center` with the given half-extents.
    pub fn centered(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Inclusive overlap test: boxes that merely touch count as
    /// overlapping.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Center point of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Componentwise clamp of a point into the box.
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min, self.max)
    }
}

/// Bounds of a fixed-extent box rotated about the vertical axis only.
///
/// The eight local corners are rotated by `yaw_degrees` about Z, shifted to
/// `center`, and min/maxed into a world-space box.
fn rotated_box(center: Vec3, half_extents: Vec3, yaw_degrees: f32) -> Aabb {
    let (hx, hy, hz) = (half_extents.x, half_extents.y, half_extents.z);
    let (sin, cos) = yaw_degrees.to_radians().sin_cos();

    let mut corners = [Vec3::ZERO; 8];
    let mut i = 0;
    for sx in [1.0f32, -1.0] {
        for sy in [1.0f32, -1.0] {
            for sz in [1.0f32, -1.0] {
                let local = vec3(sx * hx, sy * hy, sz * hz);
                corners[i] = center
                    + vec3(
                        cos * local.x - sin * local.y,
                        sin * local.x + cos * local.y,
                        local.z,
                    );
                i += 1;
            }
        }
    }
    Aabb::from_points(&corners)
}

/// Derives the world-space bounding box for a collidable entity.
///
/// Returns `None` for kinds that take no part in collision (ground, lights,
/// billboards).
pub fn aabb_for(entity: &Entity, config: &GameConfig) -> Option<Aabb> {
    match entity.kind {
        EntityKind::Wall => {
            let half = vec3(
                config.cell_size() / 2.0,
                config.wall_thickness / 2.0,
                config.wall_height / 2.0,
            );
            Some(rotated_box(entity.position, half, entity.rotation.z))
        }
        EntityKind::Cube | EntityKind::DynamicCube => {
            let center = entity.position + Vec3::Z * CUBE_CENTER_LIFT;
            Some(rotated_box(center, Vec3::ONE, entity.rotation.z))
        }
        EntityKind::Ground | EntityKind::Light { .. } | EntityKind::Billboard => None,
    }
}

/// Player collision box centered on the given position.
pub fn player_aabb(position: Vec3, config: &GameConfig) -> Aabb {
    let half = vec3(
        config.player_width / 2.0,
        config.player_width / 2.0,
        config.player_height / 2.0,
    );
    Aabb::centered(position, half)
}

/// Player collision sphere for the legacy sphere path: the center sits at
/// half the position's vertical coordinate (body center rather than eye).
pub fn player_sphere(position: Vec3, config: &GameConfig) -> (Vec3, f32) {
    (
        vec3(position.x, position.y, position.z / 2.0),
        config.player_radius,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::Entity;
    use glam::Vec3;

    fn wall_at(position: Vec3, yaw: f32) -> Entity {
        Entity::new(position, vec3(0.0, 0.0, yaw), Vec3::ONE, EntityKind::Wall)
    }

    #[test]
    fn aabb_min_never_exceeds_max() {
        let config = GameConfig::default();
        for yaw in [0.0, 17.0, 45.0, 90.0, 133.7, 270.0, 359.0] {
            let aabb = aabb_for(&wall_at(vec3(3.0, -2.0, 0.5), yaw), &config).unwrap();
            assert!(aabb.min.x <= aabb.max.x);
            assert!(aabb.min.y <= aabb.max.y);
            assert!(aabb.min.z <= aabb.max.z);
        }
    }

    #[test]
    fn ninety_degree_rotation_swaps_extents() {
        let config = GameConfig::default();
        let flat = aabb_for(&wall_at(Vec3::ZERO, 0.0), &config).unwrap();
        let turned = aabb_for(&wall_at(Vec3::ZERO, 90.0), &config).unwrap();

        let flat_extent = flat.max - flat.min;
        let turned_extent = turned.max - turned.min;
        assert!((flat_extent.x - turned_extent.y).abs() < 1e-4);
        assert!((flat_extent.y - turned_extent.x).abs() < 1e-4);
        assert!((flat_extent.z - turned_extent.z).abs() < 1e-4);
    }

    #[test]
    fn wall_extents_come_from_world_constants() {
        let config = GameConfig::default();
        let aabb = aabb_for(&wall_at(Vec3::ZERO, 0.0), &config).unwrap();
        let extent = aabb.max - aabb.min;
        assert!((extent.x - config.cell_size()).abs() < 1e-4);
        assert!((extent.y - config.wall_thickness).abs() < 1e-4);
        assert!((extent.z - config.wall_height).abs() < 1e-4);
    }

    #[test]
    fn cube_box_is_lifted() {
        let config = GameConfig::default();
        let cube = Entity::new(
            vec3(16.0, 16.0, -1.0),
            Vec3::ZERO,
            Vec3::splat(0.1),
            EntityKind::DynamicCube,
        );
        let aabb = aabb_for(&cube, &config).unwrap();
        assert!((aabb.center().z - (-1.0 + CUBE_CENTER_LIFT)).abs() < 1e-5);
        assert!((aabb.max.x - aabb.min.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn lights_and_ground_are_not_collidable() {
        let config = GameConfig::default();
        let light = Entity::new(
            Vec3::ZERO,
            Vec3::ZERO,
            Vec3::ONE,
            EntityKind::Light {
                color: Vec3::ONE,
                strength: 10.0,
            },
        );
        let ground = Entity::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE, EntityKind::Ground);
        assert!(aabb_for(&light, &config).is_none());
        assert!(aabb_for(&ground, &config).is_none());
    }

    #[test]
    fn touching_boxes_overlap() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::ONE, Vec3::splat(2.0));
        assert!(a.intersects(&b));
        let c = Aabb::new(vec3(1.1, 0.0, 0.0), vec3(2.0, 1.0, 1.0));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn player_sphere_center_halves_height() {
        let config = GameConfig::default();
        let (center, radius) = player_sphere(vec3(2.0, 3.0, 1.0), &config);
        assert_eq!(center, vec3(2.0, 3.0, 0.5));
        assert_eq!(radius, config.player_radius);
    }
}
