//! World constants and debug toggles.
//!
//! Everything the core reads at startup lives here: the ground/grid
//! dimensions that drive the spatial partition, the player's collision
//! extents, and the set of debug switches the input layer is allowed to
//! flip at runtime. [`GameConfig`] is validated once at scene construction
//! and immutable afterwards; [`DebugFlags`] is the only mutable knob set
//! and it is owned by the app layer, never read directly by deep internals.

use thiserror::Error;

/// Which player-collision algorithm the scene runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolverKind {
    /// Box-vs-box penetration push-out. The authoritative path.
    #[default]
    BoxPushOut,
    /// Legacy sphere-clamp wall slide, kept for behavioral comparison.
    SphereSlide,
}

/// Immutable world configuration, loaded once at startup.
///
/// All lengths are in world units. The maze grid is square:
/// `grid_size` x `grid_size` cells spanning `ground_width` x
/// `ground_height` of floor.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Ground plane extent along X.
    pub ground_width: f32,
    /// Ground plane extent along Y.
    pub ground_height: f32,
    /// Number of maze cells per side.
    pub grid_size: usize,
    /// Wall extent along the vertical axis.
    pub wall_height: f32,
    /// Wall extent across its thin axis.
    pub wall_thickness: f32,
    /// Player collision box extent on X and Y.
    pub player_width: f32,
    /// Player collision box extent on Z.
    pub player_height: f32,
    /// Player collision sphere radius (legacy sphere path).
    pub player_radius: f32,
    /// Vertical coordinate the player is clamped to while grounded.
    pub eye_height: f32,
    /// Lowest vertical coordinate the sphere resolver may shove the
    /// pushable cube to. The box resolver applies pushes unclamped.
    pub cube_floor: f32,
    /// Movement speed in world units per second.
    pub move_speed: f32,
    /// Multiplier applied to raw mouse deltas.
    pub mouse_sensitivity: f32,
    /// Seed for maze generation and light scatter.
    pub maze_seed: u64,
    /// Player-collision algorithm selection.
    pub resolver: ResolverKind,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ground_width: 50.0,
            ground_height: 50.0,
            grid_size: 10,
            wall_height: 5.0,
            wall_thickness: 1.0,
            player_width: 1.0,
            player_height: 2.0,
            player_radius: 1.5,
            eye_height: 1.0,
            cube_floor: -1.9,
            move_speed: 5.0,
            mouse_sensitivity: 0.05,
            maze_seed: 123,
            resolver: ResolverKind::BoxPushOut,
        }
    }
}

impl GameConfig {
    /// World-unit side length of one maze cell.
    pub fn cell_size(&self) -> f32 {
        self.ground_width / self.grid_size as f32
    }

    /// Checks the configuration for values the core cannot operate on.
    ///
    /// Invalid configuration is fatal at construction time; the per-frame
    /// collision and grid queries assume these checks have passed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::ZeroGridSize);
        }
        if self.ground_width <= 0.0 || self.ground_height <= 0.0 {
            return Err(ConfigError::InvalidGround {
                width: self.ground_width,
                height: self.ground_height,
            });
        }
        if self.wall_height <= 0.0 || self.wall_thickness <= 0.0 {
            return Err(ConfigError::InvalidWall {
                height: self.wall_height,
                thickness: self.wall_thickness,
            });
        }
        if self.player_width <= 0.0 || self.player_height <= 0.0 || self.player_radius <= 0.0 {
            return Err(ConfigError::InvalidPlayer {
                width: self.player_width,
                height: self.player_height,
                radius: self.player_radius,
            });
        }
        Ok(())
    }
}

/// Construction-time configuration failures.
///
/// These are the only errors the core surfaces; numeric degeneracies during
/// per-frame resolution are handled by safe substitution instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The maze grid must have at least one cell per side.
    #[error("grid size must be at least 1")]
    ZeroGridSize,
    /// Ground dimensions must be positive.
    #[error("ground dimensions must be positive, got {width}x{height}")]
    InvalidGround {
        /// Configured ground width.
        width: f32,
        /// Configured ground height.
        height: f32,
    },
    /// Wall dimensions must be positive.
    #[error("wall dimensions must be positive, got height {height}, thickness {thickness}")]
    InvalidWall {
        /// Configured wall height.
        height: f32,
        /// Configured wall thickness.
        thickness: f32,
    },
    /// Player collision extents must be positive.
    #[error("player extents must be positive, got {width}x{height}, radius {radius}")]
    InvalidPlayer {
        /// Configured player width.
        width: f32,
        /// Configured player height.
        height: f32,
        /// Configured player radius.
        radius: f32,
    },
}

/// Runtime debug switches.
///
/// Owned by the app layer and passed by reference into the scene's movement
/// call; the collision resolver and grid never read these globally.
#[derive(Debug, Clone)]
pub struct DebugFlags {
    /// Resolve player movement against colliders. Off means no-clip.
    pub collision: bool,
    /// Skip the grounded eye-height clamp.
    pub fly: bool,
    /// Render walls as flat quads instead of extruded boxes (render hint).
    pub flat_walls: bool,
    /// Expose wall hitboxes to the render collaborator for overlay.
    pub show_hitboxes: bool,
    /// Generate a random maze instead of the fixed test layout.
    pub generate_maze: bool,
}

impl Default for DebugFlags {
    fn default() -> Self {
        Self {
            collision: true,
            fly: false,
            flat_walls: false,
            show_hitboxes: false,
            generate_maze: true,
        }
    }
}
