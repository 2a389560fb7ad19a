//! Core game state: the scene graph, the maze, and per-frame orchestration.
//!
//! [`Scene`] owns every entity, the spatial grid, and the player, and is the
//! only type the app layer talks to. Per frame the driver feeds it elapsed
//! time and movement/rotation intents; the scene converts intents to world
//! deltas through the player basis, narrows colliders through the maze grid,
//! runs the configured resolver, and commits the corrected position. The
//! render collaborator reads entity transforms afterwards through
//! [`Scene::arena`].

pub mod bounds;
pub mod collision;
pub mod entity;
pub mod maze;
pub mod player;

use glam::{Vec3, vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::config::{ConfigError, DebugFlags, GameConfig};
use crate::game::collision::Resolver;
use crate::game::entity::{Entity, EntityArena, EntityId, EntityKind};
use crate::game::maze::{Maze, MazeError};
use crate::game::player::Player;

/// Seconds between steps of the pushable cube's scripted intro path.
const KEYFRAME_STEP: f32 = 0.1;

/// Scene construction failures. Always fatal; nothing per-frame errors.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The world configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The maze could not be built.
    #[error("maze construction failed: {0}")]
    Maze(#[from] MazeError),
}

/// The whole mutable game world.
pub struct Scene {
    /// All entities. The render collaborator iterates this.
    pub arena: EntityArena,
    /// The spatial grid and its walls.
    pub maze: Maze,
    /// The player camera.
    pub player: Player,
    config: GameConfig,
    resolver: Box<dyn Resolver>,
    pushable_id: EntityId,
    billboard_id: EntityId,
    keyframes: Vec<Vec3>,
    next_keyframe: usize,
    keyframe_clock: f32,
}

impl Scene {
    /// Builds the fixed demo world.
    ///
    /// The layout is hard-coded: ground plane, maze walls (generated or the
    /// fixed test layout per `debug.generate_maze`), one static cube, the
    /// pushable cube with a key light and marker billboard above it, and
    /// eight seed-scattered point lights.
    pub fn new(config: GameConfig, debug: &DebugFlags) -> Result<Self, SceneError> {
        config.validate()?;

        let mut arena = EntityArena::new();
        let ground_position = vec3(0.0, 0.0, -2.0);

        let map = if debug.generate_maze {
            maze::generate_map(config.grid_size, config.maze_seed)
        } else {
            maze::test_map(config.grid_size)
        };
        let mut maze = Maze::new(&config, ground_position, map)?;
        maze.generate_walls(&mut arena, &config);

        arena.alloc(Entity::new(
            ground_position,
            Vec3::ZERO,
            Vec3::ONE,
            EntityKind::Ground,
        ));
        arena.alloc(Entity::new(
            vec3(5.0, 5.0, 0.0),
            Vec3::ZERO,
            Vec3::ONE,
            EntityKind::Cube,
        ));

        let pushable_id = arena.alloc(Entity::new(
            vec3(16.0, 16.0, -1.0),
            vec3(90.0, 0.0, 0.0),
            Vec3::splat(0.1),
            EntityKind::DynamicCube,
        ));
        let (cube_cell_x, cube_cell_y) = maze.cell_of(16.0, 16.0);
        maze.cell_mut(cube_cell_x, cube_cell_y)
            .entities
            .push(pushable_id);

        // Key light and marker billboard hover over the pushable cube.
        arena.alloc(Entity::new(
            vec3(16.0, 16.0, 3.0),
            Vec3::ZERO,
            Vec3::ONE,
            EntityKind::Light {
                color: vec3(0.9, 0.8, 1.0),
                strength: 80.0,
            },
        ));
        let billboard_id = arena.alloc(Entity::new(
            vec3(16.0, 16.0, 2.0),
            Vec3::ZERO,
            Vec3::splat(0.5),
            EntityKind::Billboard,
        ));

        let mut rng = StdRng::seed_from_u64(config.maze_seed);
        for _ in 0..8 {
            let position = vec3(
                rng.gen_range(-20.0..20.0),
                rng.gen_range(-20.0..20.0),
                rng.gen_range(-1.0..4.0),
            );
            let color = vec3(
                rng.gen_range(0.1..1.0),
                rng.gen_range(0.1..1.0),
                rng.gen_range(0.1..1.0),
            );
            arena.alloc(Entity::new(
                position,
                Vec3::ZERO,
                Vec3::ONE,
                EntityKind::Light {
                    color,
                    strength: 20.0,
                },
            ));
        }

        let player = Player::new(
            vec3(-5.0, 0.0, 1.0),
            Vec3::ZERO,
            config.move_speed,
            config.mouse_sensitivity,
        );

        let keyframes = (0..10)
            .map(|i| vec3(16.0, 16.0 - i as f32, -1.0))
            .collect();

        let resolver = collision::resolver_for(config.resolver);

        log::info!(
            "scene built: {} entities, {} walls",
            arena.len(),
            maze.wall_ids.len()
        );

        Ok(Self {
            arena,
            maze,
            player,
            config,
            resolver,
            pushable_id,
            billboard_id,
            keyframes,
            next_keyframe: 0,
            keyframe_clock: 0.0,
        })
    }

    /// Per-frame world update: scripted animation, billboard facing, and a
    /// basis refresh.
    pub fn update(&mut self, dt: f32) {
        if self.next_keyframe < self.keyframes.len() {
            self.keyframe_clock += dt;
            while self.keyframe_clock >= KEYFRAME_STEP && self.next_keyframe < self.keyframes.len()
            {
                self.arena.get_mut(self.pushable_id).position = self.keyframes[self.next_keyframe];
                self.next_keyframe += 1;
                self.keyframe_clock -= KEYFRAME_STEP;
            }
        }

        let eye = self.player.position;
        self.arena.get_mut(self.billboard_id).face_towards(eye);

        self.player.update();
    }

    /// Moves the player by a local intent vector (forward, strafe-right,
    /// raise), already scaled by speed and elapsed time.
    ///
    /// The intent is mapped through the player basis, collision candidates
    /// are gathered from the radius-1 cell neighborhood of the proposed
    /// position plus the always-active pushable cube, and the configured
    /// resolver corrects the move. With `debug.collision` off the proposed
    /// position is committed as-is.
    pub fn move_player(&mut self, local_delta: Vec3, debug: &DebugFlags) {
        let delta = self.player.world_move(local_delta);
        let proposed = self.player.position + delta;

        let new_pos = if debug.collision {
            let (cell_x, cell_y) = self.maze.cell_of(proposed.x, proposed.y);
            let mut candidates: Vec<EntityId> = Vec::new();
            for cell in self.maze.neighbors(cell_x, cell_y, 1) {
                candidates.extend_from_slice(&cell.walls);
            }
            // The pushable cube participates regardless of cell residency;
            // it goes last so a push never overrides a wall slide.
            candidates.push(self.pushable_id);

            self.resolver.resolve(
                self.player.position,
                proposed,
                &candidates,
                &mut self.arena,
                &self.config,
            )
        } else {
            proposed
        };

        self.player
            .commit_move(new_pos, debug.fly, self.config.eye_height);
    }

    /// Applies raw mouse deltas to the player orientation, scaled by the
    /// configured sensitivity.
    pub fn spin_player(&mut self, raw_delta: Vec3) {
        let scaled = raw_delta * self.player.mouse_sensitivity;
        self.player.spin(scaled);
    }

    /// Grid cell currently containing the player.
    pub fn player_cell(&self) -> (usize, usize) {
        self.maze
            .cell_of(self.player.position.x, self.player.position.y)
    }

    /// The world configuration the scene was built with.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}
