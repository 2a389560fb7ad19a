//! Player collision resolution.
//!
//! Movement is resolved after the fact: the caller proposes a new player
//! position and a [`Resolver`] returns the corrected one, displacing the
//! pushable obstacle as a side effect. Two algorithms are available behind
//! the trait. [`BoxPushOut`] is the authoritative path: box-vs-box
//! penetration depths on all six faces, minimum depth picks the separating
//! axis, and the player slides along the implied surface. [`SphereSlide`]
//! is the older sphere-clamp variant kept selectable for behavioral
//! comparison.
//!
//! Candidates are visited in the order given. When several colliders fire
//! in one frame the last one wins the slide; the candidate list puts the
//! pushable obstacle after the walls so wall response is never overridden
//! by a push.

use glam::{Vec3, vec3};

use crate::config::{GameConfig, ResolverKind};
use crate::game::bounds::{self, Aabb};
use crate::game::entity::{EntityArena, EntityId, EntityKind};

/// Distance the pushable obstacle is shoved per colliding frame on the
/// sphere path.
const PUSH_STEP: f32 = 1.0;

/// Squared length below which a direction is treated as degenerate.
const DEGENERATE_EPS: f32 = 1e-12;

/// Resolves a proposed player move against a set of collider entities.
pub trait Resolver {
    /// Returns the corrected player position.
    ///
    /// `current` is where the player is, `proposed` where the unobstructed
    /// move would land. Colliding [`EntityKind::DynamicCube`] candidates
    /// are displaced in the arena instead of correcting the player.
    fn resolve(
        &self,
        current: Vec3,
        proposed: Vec3,
        candidates: &[EntityId],
        arena: &mut EntityArena,
        config: &GameConfig,
    ) -> Vec3;
}

/// Instantiates the configured resolver.
pub fn resolver_for(kind: ResolverKind) -> Box<dyn Resolver> {
    match kind {
        ResolverKind::BoxPushOut => Box::new(BoxPushOut),
        ResolverKind::SphereSlide => Box::new(SphereSlide),
    }
}

/// Box-vs-box minimum-penetration resolver.
pub struct BoxPushOut;

impl BoxPushOut {
    /// Separation vector for the collider: the smallest translation of the
    /// other box, along a single axis, that ends the overlap. Ties go to
    /// the first axis in -X/+X/-Y/+Y/-Z/+Z order.
    fn push_out(player: &Aabb, other: &Aabb) -> Vec3 {
        let depths = [
            other.max.x - player.min.x,
            player.max.x - other.min.x,
            other.max.y - player.min.y,
            player.max.y - other.min.y,
            other.max.z - player.min.z,
            player.max.z - other.min.z,
        ];
        let mut axis = 0;
        for (i, &d) in depths.iter().enumerate() {
            if d < depths[axis] {
                axis = i;
            }
        }
        match axis {
            0 => vec3(-depths[0], 0.0, 0.0),
            1 => vec3(depths[1], 0.0, 0.0),
            2 => vec3(0.0, -depths[2], 0.0),
            3 => vec3(0.0, depths[3], 0.0),
            4 => vec3(0.0, 0.0, -depths[4]),
            _ => vec3(0.0, 0.0, depths[5]),
        }
    }
}

impl Resolver for BoxPushOut {
    fn resolve(
        &self,
        current: Vec3,
        proposed: Vec3,
        candidates: &[EntityId],
        arena: &mut EntityArena,
        config: &GameConfig,
    ) -> Vec3 {
        let movement = proposed - current;
        // The player box is read at the proposed position for every
        // candidate, so all colliders in a frame see the same move.
        let player_box = bounds::player_aabb(proposed, config);
        let mut corrected = proposed;

        for &id in candidates {
            let entity = arena.get(id);
            let Some(other_box) = bounds::aabb_for(entity, config) else {
                continue;
            };
            if !player_box.intersects(&other_box) {
                continue;
            }

            let push = Self::push_out(&player_box, &other_box);

            if entity.kind == EntityKind::DynamicCube {
                // The push vector transfers to the obstacle verbatim; the
                // floor clamp is a sphere-path behavior only.
                arena.get_mut(id).position += push;
                continue;
            }

            let normal = if push.length_squared() > DEGENERATE_EPS {
                push.normalize()
            } else {
                Vec3::Z
            };
            corrected = current + (movement - movement.dot(normal) * normal);
        }

        corrected
    }
}

/// Legacy sphere-vs-box resolver.
///
/// The player's collision sphere is clamped against each candidate box; a
/// hit slides the move along the contact normal, or shoves the pushable
/// obstacle a fixed step in the horizontal move direction. Unlike the box
/// path the sphere is re-read from the partially corrected position, so
/// earlier candidates influence later tests.
pub struct SphereSlide;

impl Resolver for SphereSlide {
    fn resolve(
        &self,
        current: Vec3,
        proposed: Vec3,
        candidates: &[EntityId],
        arena: &mut EntityArena,
        config: &GameConfig,
    ) -> Vec3 {
        let movement = proposed - current;
        let mut new_pos = proposed;

        for &id in candidates {
            let entity = arena.get(id);
            let Some(other_box) = bounds::aabb_for(entity, config) else {
                continue;
            };
            let (center, radius) = bounds::player_sphere(new_pos, config);
            let closest = other_box.closest_point(center);
            let delta = center - closest;
            if delta.length_squared() >= radius * radius {
                continue;
            }

            if entity.kind == EntityKind::DynamicCube {
                if movement.length_squared() > DEGENERATE_EPS {
                    let dir = movement.normalize();
                    let obstacle = arena.get_mut(id);
                    obstacle.position.x += dir.x * PUSH_STEP;
                    obstacle.position.y += dir.y * PUSH_STEP;
                    obstacle.position.z = obstacle.position.z.max(config.cube_floor);
                }
                continue;
            }

            let normal = if delta.length_squared() > DEGENERATE_EPS {
                delta.normalize()
            } else {
                Vec3::Z
            };
            new_pos = current + (movement - movement.dot(normal) * normal);
        }

        new_pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::Entity;

    fn wall(position: Vec3, yaw: f32, arena: &mut EntityArena) -> EntityId {
        arena.alloc(Entity::new(
            position,
            vec3(0.0, 0.0, yaw),
            Vec3::ONE,
            EntityKind::Wall,
        ))
    }

    fn pushable(position: Vec3, arena: &mut EntityArena) -> EntityId {
        arena.alloc(Entity::new(
            position,
            Vec3::ZERO,
            Vec3::splat(0.1),
            EntityKind::DynamicCube,
        ))
    }

    #[test]
    fn box_path_cancels_motion_into_a_wall() {
        let config = GameConfig::default();
        let mut arena = EntityArena::new();
        // Yaw 90 gives the wall box X extent 1.0; at x=0.7 it spans
        // [0.2, 1.2] on X.
        let id = wall(vec3(0.7, 0.0, 0.0), 90.0, &mut arena);

        let current = vec3(-0.5, 0.0, 0.0);
        let proposed = vec3(0.3, 0.0, 0.0);
        let corrected = BoxPushOut.resolve(current, proposed, &[id], &mut arena, &config);
        assert!(corrected.abs_diff_eq(current, 1e-5));
    }

    #[test]
    fn box_path_slides_along_the_wall() {
        let config = GameConfig::default();
        let mut arena = EntityArena::new();
        let id = wall(vec3(0.7, 0.0, 0.0), 90.0, &mut arena);

        // Diagonal move: the X component is blocked, Y passes through.
        let current = vec3(-0.5, -1.0, 0.0);
        let proposed = vec3(0.3, 0.0, 0.0);
        let corrected = BoxPushOut.resolve(current, proposed, &[id], &mut arena, &config);
        assert!(corrected.abs_diff_eq(vec3(-0.5, 0.0, 0.0), 1e-5));

        // The slid position's box must not penetrate the wall box.
        let wall_box = bounds::aabb_for(arena.get(id), &config).unwrap();
        let player_box = bounds::player_aabb(corrected, &config);
        assert!(player_box.max.x <= wall_box.min.x + 1e-5);
    }

    #[test]
    fn box_path_reads_the_proposed_position() {
        let config = GameConfig::default();
        let mut arena = EntityArena::new();
        let id = wall(vec3(0.7, 0.0, 0.0), 90.0, &mut arena);

        // The current-position box ends at x=0 and misses the wall
        // entirely; only the proposed box overlaps. The hit must still
        // register.
        let current = vec3(-0.5, 0.0, 0.0);
        let proposed = vec3(0.3, 0.0, 0.0);
        let corrected = BoxPushOut.resolve(current, proposed, &[id], &mut arena, &config);
        assert_ne!(corrected, proposed);
    }

    #[test]
    fn box_path_shoves_the_pushable_cube() {
        let config = GameConfig::default();
        let mut arena = EntityArena::new();
        let id = pushable(vec3(16.0, 16.0, -1.0), &mut arena);

        // Cube box spans [15,17] on X; the proposed player box reaches
        // 15.1, a 0.1 deep X overlap.
        let current = vec3(13.8, 16.0, 1.0);
        let proposed = vec3(14.6, 16.0, 1.0);
        let corrected = BoxPushOut.resolve(current, proposed, &[id], &mut arena, &config);

        assert!(corrected.abs_diff_eq(proposed, 1e-5));
        let cube = arena.get(id);
        assert!((cube.position.x - 16.1).abs() < 1e-4);
        assert_eq!(cube.position.y, 16.0);
    }

    #[test]
    fn box_path_push_is_not_floor_clamped() {
        let config = GameConfig::default();
        let mut arena = EntityArena::new();
        // Cube hovering just above the sphere path's floor limit; a small
        // downward push must land below it unclamped.
        let id = pushable(vec3(0.0, 0.0, -1.88), &mut arena);

        let current = vec3(0.0, 0.0, 1.0);
        let proposed = vec3(0.0, 0.0, 0.88);
        let corrected = BoxPushOut.resolve(current, proposed, &[id], &mut arena, &config);

        assert!(corrected.abs_diff_eq(proposed, 1e-5));
        let cube_z = arena.get(id).position.z;
        assert!((cube_z - (-1.92)).abs() < 1e-4);
        assert!(cube_z < config.cube_floor);
    }

    #[test]
    fn degenerate_touch_falls_back_to_vertical_normal() {
        let config = GameConfig::default();
        let mut arena = EntityArena::new();
        // Wall box starts exactly where the proposed player box ends:
        // zero-depth contact, the push vector is the zero vector.
        let id = wall(vec3(1.3, 0.0, 0.0), 90.0, &mut arena);

        let current = vec3(-0.5, 0.0, 0.0);
        let proposed = vec3(0.3, 0.0, 0.0);
        let corrected = BoxPushOut.resolve(current, proposed, &[id], &mut arena, &config);
        // Vertical fallback normal leaves the horizontal move intact.
        assert!(corrected.is_finite());
        assert!(corrected.abs_diff_eq(proposed, 1e-5));
    }

    #[test]
    fn last_collider_wins_the_slide() {
        let config = GameConfig::default();
        let mut arena = EntityArena::new();
        // Two overlapping walls with perpendicular contact normals; the
        // second one dictates the final slide.
        let x_wall = wall(vec3(0.7, 0.0, 0.0), 90.0, &mut arena);
        let y_wall = wall(vec3(0.0, 0.9, 0.0), 0.0, &mut arena);

        let current = vec3(-0.4, -0.4, 0.0);
        let proposed = vec3(0.3, 0.3, 0.0);
        let a = BoxPushOut.resolve(current, proposed, &[x_wall, y_wall], &mut arena, &config);
        let b = BoxPushOut.resolve(current, proposed, &[y_wall, x_wall], &mut arena, &config);
        // Order matters: each run keeps the axis the last wall allows.
        assert!((a.y - current.y).abs() < 1e-5 || (a.x - current.x).abs() < 1e-5);
        assert_ne!(a, b);
    }

    #[test]
    fn sphere_path_blocks_head_on_motion() {
        let config = GameConfig::default();
        let mut arena = EntityArena::new();
        let id = wall(vec3(0.0, 0.0, 0.0), 90.0, &mut arena);

        let current = vec3(-3.0, 0.0, 1.0);
        let proposed = vec3(-1.8, 0.0, 1.0);
        let corrected = SphereSlide.resolve(current, proposed, &[id], &mut arena, &config);
        assert!(corrected.abs_diff_eq(current, 1e-5));
    }

    #[test]
    fn sphere_path_allows_motion_outside_the_radius() {
        let config = GameConfig::default();
        let mut arena = EntityArena::new();
        let id = wall(vec3(0.0, 0.0, 0.0), 90.0, &mut arena);

        let current = vec3(-4.0, 0.0, 1.0);
        let proposed = vec3(-3.0, 0.0, 1.0);
        let corrected = SphereSlide.resolve(current, proposed, &[id], &mut arena, &config);
        assert_eq!(corrected, proposed);
    }

    #[test]
    fn sphere_path_steps_the_pushable_cube() {
        let config = GameConfig::default();
        let mut arena = EntityArena::new();
        let id = pushable(vec3(16.0, 16.0, -1.0), &mut arena);

        let current = vec3(13.0, 16.0, 1.0);
        let proposed = vec3(13.8, 16.0, 1.0);
        let corrected = SphereSlide.resolve(current, proposed, &[id], &mut arena, &config);

        // The player keeps the move, the cube takes a unit step along it.
        assert_eq!(corrected, proposed);
        let cube = arena.get(id);
        assert!((cube.position.x - 17.0).abs() < 1e-5);
        assert!(cube.position.z >= config.cube_floor);
    }

    #[test]
    fn sphere_center_inside_box_does_not_produce_nan() {
        let config = GameConfig::default();
        let mut arena = EntityArena::new();
        let id = wall(vec3(0.0, 0.0, 0.0), 0.0, &mut arena);

        // Center exactly on the box interior: clamp returns the center
        // itself and the contact normal degenerates.
        let inside = vec3(0.0, 0.0, 0.2);
        let corrected = SphereSlide.resolve(inside, inside, &[id], &mut arena, &config);
        assert!(corrected.is_finite());
        assert_eq!(corrected, inside);
    }

    #[test]
    fn non_collidable_candidates_are_skipped() {
        let config = GameConfig::default();
        let mut arena = EntityArena::new();
        let light = arena.alloc(Entity::new(
            Vec3::ZERO,
            Vec3::ZERO,
            Vec3::ONE,
            EntityKind::Light {
                color: Vec3::ONE,
                strength: 5.0,
            },
        ));

        let proposed = vec3(0.1, 0.0, 0.0);
        let corrected = BoxPushOut.resolve(Vec3::ZERO, proposed, &[light], &mut arena, &config);
        assert_eq!(corrected, proposed);
    }
}
