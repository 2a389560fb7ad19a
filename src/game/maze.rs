//! Maze grid: spatial partition, wall generation, and layout carving.
//!
//! The world floor is partitioned into a fixed `grid_size` x `grid_size`
//! array of [`Cell`]s. Each cell records which of its four sides are walled
//! via [`WallBits`] and, after [`Maze::generate_walls`], holds handles to
//! the wall entities standing on those sides. The grid is the broad phase
//! of collision: movement queries ask for the cells around the player and
//! only their walls are fed to the resolver.
//!
//! Layouts come from two sources: a seeded recursive-backtracker carve
//! ([`generate_map`]) producing a perfect maze, or the hand-authored
//! [`test_map`] used for collision debugging.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use glam::{Vec3, vec3};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

use crate::config::GameConfig;
use crate::game::bounds::{self, Aabb};
use crate::game::entity::{Entity, EntityArena, EntityId, EntityKind};

/// One side of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The -Y side.
    Top,
    /// The +Y side.
    Bottom,
    /// The -X side.
    Left,
    /// The +X side.
    Right,
}

impl Side {
    /// All four sides, in wall-list order.
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    /// The side facing this one from the adjacent cell.
    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Grid step toward the neighbor across this side.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Side::Top => (0, -1),
            Side::Bottom => (0, 1),
            Side::Left => (-1, 0),
            Side::Right => (1, 0),
        }
    }
}

/// Wall connectivity of one cell: `true` means the side is walled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallBits {
    /// Wall on the -Y side.
    pub top: bool,
    /// Wall on the +Y side.
    pub bottom: bool,
    /// Wall on the -X side.
    pub left: bool,
    /// Wall on the +X side.
    pub right: bool,
}

impl WallBits {
    /// All four sides walled.
    pub fn closed() -> Self {
        Self {
            top: true,
            bottom: true,
            left: true,
            right: true,
        }
    }

    /// No sides walled.
    pub fn open() -> Self {
        Self {
            top: false,
            bottom: false,
            left: false,
            right: false,
        }
    }

    /// Whether the given side is walled.
    pub fn side(&self, side: Side) -> bool {
        match side {
            Side::Top => self.top,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Sets the wall state of one side.
    pub fn set(&mut self, side: Side, walled: bool) {
        match side {
            Side::Top => self.top = walled,
            Side::Bottom => self.bottom = walled,
            Side::Left => self.left = walled,
            Side::Right => self.right = walled,
        }
    }
}

/// One grid square of the maze.
///
/// Cells reference walls by handle; the entity arena owns them. The wall
/// list is immutable after generation.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    /// Grid X coordinate.
    pub x: usize,
    /// Grid Y coordinate.
    pub y: usize,
    /// Handles of the walls this cell owns (0-4, order top/bottom/left/right).
    pub walls: Vec<EntityId>,
    /// Non-wall entities located in this cell at build time.
    pub entities: Vec<EntityId>,
}

/// Construction-time maze failures.
#[derive(Debug, Error)]
pub enum MazeError {
    /// The grid must have at least one cell per side.
    #[error("grid size must be at least 1")]
    ZeroGridSize,
    /// The wall map does not cover the whole grid.
    #[error("wall map has {got} cells, expected {expected}")]
    MapSize {
        /// Cells in the provided map.
        got: usize,
        /// `grid_size * grid_size`.
        expected: usize,
    },
}

/// Carves a perfect maze with a seeded recursive backtracker.
///
/// Starting from cell (0,0), the carve shuffles the four directions at each
/// step, knocks down the wall bit toward an unvisited neighbor together with
/// the mirror bit on the neighbor's side, and backtracks when stuck. Every
/// cell ends up reachable from the start with exactly one path between any
/// two cells. The entry (0,0, left) and exit (N-1,N-1, right) walls are then
/// forced open. Output is bit-identical for a fixed seed.
pub fn generate_map(grid_size: usize, seed: u64) -> Vec<WallBits> {
    let n = grid_size;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut cells = vec![WallBits::closed(); n * n];
    let mut visited = vec![false; n * n];

    struct Frame {
        x: usize,
        y: usize,
        dirs: [Side; 4],
        next: usize,
    }

    let shuffled = |rng: &mut StdRng| {
        let mut dirs = Side::ALL;
        dirs.shuffle(rng);
        dirs
    };

    visited[0] = true;
    let mut stack = vec![Frame {
        x: 0,
        y: 0,
        dirs: shuffled(&mut rng),
        next: 0,
    }];

    while let Some(top) = stack.last_mut() {
        let carve_to = {
            let mut found = None;
            while top.next < 4 {
                let side = top.dirs[top.next];
                top.next += 1;
                let (dx, dy) = side.delta();
                let nx = top.x as isize + dx;
                let ny = top.y as isize + dy;
                if nx < 0 || ny < 0 || nx >= n as isize || ny >= n as isize {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                if !visited[ny * n + nx] {
                    found = Some((top.x, top.y, nx, ny, side));
                    break;
                }
            }
            found
        };
        match carve_to {
            Some((x, y, nx, ny, side)) => {
                cells[y * n + x].set(side, false);
                cells[ny * n + nx].set(side.opposite(), false);
                visited[ny * n + nx] = true;
                let dirs = shuffled(&mut rng);
                stack.push(Frame {
                    x: nx,
                    y: ny,
                    dirs,
                    next: 0,
                });
            }
            None => {
                stack.pop();
            }
        }
    }

    // Entry and exit on the boundary.
    cells[0].set(Side::Left, false);
    cells[n * n - 1].set(Side::Right, false);

    cells
}

/// Hand-authored fixed layout for collision debugging.
///
/// Outer boundary walls with two gaps in the top row, plus a short
/// double-sided corridor piece in the middle of the grid.
pub fn test_map(grid_size: usize) -> Vec<WallBits> {
    let n = grid_size;
    let bits = |top, bottom, left, right| WallBits {
        top,
        bottom,
        left,
        right,
    };

    let mut map = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let cell = if y == 0 {
                if x == 0 {
                    bits(true, false, true, false)
                } else if x == n - 1 {
                    bits(true, false, false, true)
                } else if x == 4 || x == 5 {
                    WallBits::open()
                } else {
                    bits(true, false, false, false)
                }
            } else if y == n - 1 {
                if x == 0 {
                    bits(false, true, true, false)
                } else if x == n - 1 {
                    bits(false, true, false, true)
                } else {
                    bits(false, true, false, false)
                }
            } else if (x == 4 || x == 5) && y == 5 {
                bits(false, false, true, true)
            } else if x == 0 {
                bits(false, false, true, false)
            } else if x == n - 1 {
                bits(false, false, false, true)
            } else {
                WallBits::open()
            };
            map.push(cell);
        }
    }
    map
}

/// The maze: a uniform grid of cells plus the wall entities standing on it.
#[derive(Debug)]
pub struct Maze {
    grid_size: usize,
    cell_size: f32,
    ground_position: Vec3,
    ground_half_width: f32,
    ground_half_height: f32,
    /// Wall connectivity per cell, row-major (`y * grid_size + x`).
    pub map: Vec<WallBits>,
    /// Grid cells, row-major.
    pub cells: Vec<Cell>,
    /// Every wall entity generated, across all cells.
    pub wall_ids: Vec<EntityId>,
    /// World-space wall boxes, read by the render collaborator when the
    /// hitbox overlay is enabled.
    pub wall_hitboxes: Vec<Aabb>,
}

impl Maze {
    /// Builds the grid over the given ground plane from a wall map.
    ///
    /// Fails when the grid has no cells or the map does not cover
    /// `grid_size * grid_size` of them. The spatial queries assume a
    /// non-empty grid, so a zero size is rejected here rather than
    /// underflowing later.
    pub fn new(
        config: &GameConfig,
        ground_position: Vec3,
        map: Vec<WallBits>,
    ) -> Result<Self, MazeError> {
        let n = config.grid_size;
        if n == 0 {
            return Err(MazeError::ZeroGridSize);
        }
        if map.len() != n * n {
            return Err(MazeError::MapSize {
                got: map.len(),
                expected: n * n,
            });
        }

        let mut cells = Vec::with_capacity(n * n);
        for y in 0..n {
            for x in 0..n {
                cells.push(Cell {
                    x,
                    y,
                    walls: Vec::new(),
                    entities: Vec::new(),
                });
            }
        }

        Ok(Self {
            grid_size: n,
            cell_size: config.cell_size(),
            ground_position,
            ground_half_width: config.ground_width / 2.0,
            ground_half_height: config.ground_height / 2.0,
            map,
            cells,
            wall_ids: Vec::new(),
            wall_hitboxes: Vec::new(),
        })
    }

    /// Number of cells per side.
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// World-unit side length of one cell.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Borrows the cell at grid coordinates (x, y).
    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        &self.cells[y * self.grid_size + x]
    }

    /// Mutably borrows the cell at grid coordinates (x, y).
    pub fn cell_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        &mut self.cells[y * self.grid_size + x]
    }

    /// Instantiates one wall entity per owned set wall bit.
    ///
    /// A wall between two cells is geometrically shared, but it is emitted
    /// from exactly one of them: a cell always emits its top and left
    /// walls; it emits bottom or right only when no neighbor exists on that
    /// side or the neighbor's mirror bit is clear. This keeps the invariant
    /// that every wall segment belongs to exactly one cell's wall list.
    pub fn generate_walls(&mut self, arena: &mut EntityArena, config: &GameConfig) {
        let n = self.grid_size;
        let offset = self.cell_size / 2.0;
        let wall_z = self.ground_position.z + config.wall_height / 2.0;

        for y in 0..n {
            for x in 0..n {
                let bits = self.map[y * n + x];

                let cx = self.ground_position.x - self.ground_half_width
                    + (x as f32 + 0.5) * self.cell_size;
                let cy = self.ground_position.y - self.ground_half_height
                    + (y as f32 + 0.5) * self.cell_size;

                let mirrored_below = y + 1 < n && self.map[(y + 1) * n + x].top;
                let mirrored_right = x + 1 < n && self.map[y * n + x + 1].left;

                if bits.top {
                    self.spawn_wall(arena, config, x, y, vec3(cx, cy - offset, wall_z), 0.0);
                }
                if bits.bottom && !mirrored_below {
                    self.spawn_wall(arena, config, x, y, vec3(cx, cy + offset, wall_z), 0.0);
                }
                if bits.left {
                    self.spawn_wall(arena, config, x, y, vec3(cx - offset, cy, wall_z), 90.0);
                }
                if bits.right && !mirrored_right {
                    self.spawn_wall(arena, config, x, y, vec3(cx + offset, cy, wall_z), 90.0);
                }
            }
        }

        log::info!(
            "generated {} wall entities for a {}x{} maze",
            self.wall_ids.len(),
            n,
            n
        );
    }

    fn spawn_wall(
        &mut self,
        arena: &mut EntityArena,
        config: &GameConfig,
        cell_x: usize,
        cell_y: usize,
        position: Vec3,
        yaw: f32,
    ) {
        let wall = Entity::new(position, vec3(0.0, 0.0, yaw), Vec3::ONE, EntityKind::Wall);
        if let Some(hitbox) = bounds::aabb_for(&wall, config) {
            self.wall_hitboxes.push(hitbox);
        }
        let id = arena.alloc(wall);
        self.wall_ids.push(id);
        self.cells[cell_y * self.grid_size + cell_x].walls.push(id);
    }

    /// Grid cell containing a world-space (x, y) position.
    ///
    /// Positions are shifted so the ground's corner is the origin, divided
    /// by the cell size, and clamped into the grid, so out-of-world
    /// positions still map to a valid boundary cell.
    pub fn cell_of(&self, world_x: f32, world_y: f32) -> (usize, usize) {
        let local_x = world_x - (self.ground_position.x - self.ground_half_width);
        let local_y = world_y - (self.ground_position.y - self.ground_half_height);
        let max = (self.grid_size - 1) as isize;
        let cell_x = ((local_x / self.cell_size).floor() as isize).clamp(0, max);
        let cell_y = ((local_y / self.cell_size).floor() as isize).clamp(0, max);
        (cell_x as usize, cell_y as usize)
    }

    /// All in-bounds cells within a Chebyshev distance of `radius` from the
    /// given cell, the cell itself included.
    pub fn neighbors(&self, cell_x: usize, cell_y: usize, radius: usize) -> Vec<&Cell> {
        let n = self.grid_size as isize;
        let r = radius as isize;
        let mut found = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                let x = cell_x as isize + dx;
                let y = cell_y as isize + dy;
                if x >= 0 && x < n && y >= 0 && y < n {
                    found.push(&self.cells[(y * n + x) as usize]);
                }
            }
        }
        found
    }

    /// Dumps the wall bitmap as ASCII art to a timestamped file under
    /// `maze-dumps/`, for eyeballing generated layouts.
    pub fn save_to_file(&self) -> std::io::Result<PathBuf> {
        let n = self.grid_size;
        let dim = 2 * n + 1;
        let mut rows = vec![vec![' '; dim]; dim];

        // Lattice corners are always drawn.
        for row in rows.iter_mut().step_by(2) {
            for ch in row.iter_mut().step_by(2) {
                *ch = '#';
            }
        }

        for y in 0..n {
            for x in 0..n {
                let bits = self.map[y * n + x];
                let above_bottom = y > 0 && self.map[(y - 1) * n + x].bottom;
                let left_right = x > 0 && self.map[y * n + x - 1].right;

                if bits.top || above_bottom {
                    rows[2 * y][2 * x + 1] = '#';
                }
                if bits.left || left_right {
                    rows[2 * y + 1][2 * x] = '#';
                }
                if y == n - 1 && bits.bottom {
                    rows[2 * n][2 * x + 1] = '#';
                }
                if x == n - 1 && bits.right {
                    rows[2 * y + 1][2 * n] = '#';
                }
            }
        }

        let mut out = String::with_capacity(dim * (dim + 1));
        for row in &rows {
            out.extend(row.iter());
            out.push('\n');
        }

        let dir = Path::new("maze-dumps");
        fs::create_dir_all(dir)?;
        let name = Local::now().format("maze_%Y-%m-%d_%H-%M-%S.txt").to_string();
        let path = dir.join(name);
        fs::write(&path, out)?;
        log::info!("maze dumped to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn built_maze(map: Vec<WallBits>) -> (Maze, EntityArena, GameConfig) {
        let config = GameConfig::default();
        let mut arena = EntityArena::new();
        let mut maze = Maze::new(&config, vec3(0.0, 0.0, -2.0), map).expect("valid map");
        maze.generate_walls(&mut arena, &config);
        (maze, arena, config)
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate_map(10, 123);
        let b = generate_map(10, 123);
        assert_eq!(a, b);
        let c = generate_map(10, 124);
        assert_ne!(a, c);
    }

    #[test]
    fn entry_and_exit_are_open() {
        let map = generate_map(10, 123);
        assert!(!map[0].left);
        assert!(!map[99].right);
    }

    #[test]
    fn every_cell_is_reachable() {
        let n = 10;
        let map = generate_map(n, 123);
        let mut seen = vec![false; n * n];
        let mut queue = VecDeque::from([(0usize, 0usize)]);
        seen[0] = true;
        while let Some((x, y)) = queue.pop_front() {
            for side in Side::ALL {
                if map[y * n + x].side(side) {
                    continue;
                }
                let (dx, dy) = side.delta();
                let nx = x as isize + dx;
                let ny = y as isize + dy;
                if nx < 0 || ny < 0 || nx >= n as isize || ny >= n as isize {
                    continue;
                }
                let idx = ny as usize * n + nx as usize;
                if !seen[idx] {
                    seen[idx] = true;
                    queue.push_back((nx as usize, ny as usize));
                }
            }
        }
        assert!(seen.iter().all(|&v| v), "isolated cells in generated maze");
    }

    #[test]
    fn carved_walls_are_mirrored() {
        let n = 10;
        let map = generate_map(n, 7);
        for y in 0..n {
            for x in 0..n {
                for side in Side::ALL {
                    let (dx, dy) = side.delta();
                    let nx = x as isize + dx;
                    let ny = y as isize + dy;
                    if nx < 0 || ny < 0 || nx >= n as isize || ny >= n as isize {
                        continue;
                    }
                    let here = map[y * n + x].side(side);
                    let there = map[ny as usize * n + nx as usize].side(side.opposite());
                    assert_eq!(
                        here, there,
                        "unmirrored wall at ({x},{y}) side {side:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn each_wall_belongs_to_one_cell() {
        let (maze, _arena, _config) = built_maze(generate_map(10, 123));
        let mut owners = std::collections::HashMap::new();
        for cell in &maze.cells {
            for &wall in &cell.walls {
                *owners.entry(wall).or_insert(0usize) += 1;
            }
        }
        assert_eq!(owners.len(), maze.wall_ids.len());
        assert!(owners.values().all(|&count| count == 1));
    }

    #[test]
    fn no_two_walls_coincide() {
        let (maze, arena, _config) = built_maze(generate_map(10, 123));
        let mut seen = std::collections::HashSet::new();
        for &id in &maze.wall_ids {
            let wall = arena.get(id);
            let key = (
                (wall.position.x * 100.0).round() as i64,
                (wall.position.y * 100.0).round() as i64,
                (wall.rotation.z * 100.0).round() as i64,
            );
            assert!(seen.insert(key), "duplicate wall at {:?}", wall.position);
        }
    }

    #[test]
    fn test_map_keeps_unmirrored_walls() {
        // The fixed layout's mid corridor sets left+right on (4,5) and
        // (5,5) without mirror bits on the outer neighbors; those walls
        // must still be generated.
        let (maze, arena, _config) = built_maze(test_map(10));
        let corridor = maze.cell(5, 5);
        assert_eq!(corridor.walls.len(), 2);
        for &id in &corridor.walls {
            assert_eq!(arena.get(id).rotation.z, 90.0);
        }
    }

    #[test]
    fn cell_of_clamps_out_of_world_positions() {
        let (maze, _arena, _config) = built_maze(generate_map(10, 123));
        assert_eq!(maze.cell_of(-1000.0, -1000.0), (0, 0));
        assert_eq!(maze.cell_of(1000.0, 1000.0), (9, 9));
        assert_eq!(maze.cell_of(-1000.0, 1000.0), (0, 9));
    }

    #[test]
    fn cell_of_maps_cell_centers() {
        let (maze, _arena, _config) = built_maze(generate_map(10, 123));
        // Ground centered at origin, 50 wide, 10 cells: cell (0,0) spans
        // [-25,-20) on both axes.
        assert_eq!(maze.cell_of(-22.5, -22.5), (0, 0));
        assert_eq!(maze.cell_of(0.1, 0.1), (5, 5));
        assert_eq!(maze.cell_of(22.5, -22.5), (9, 0));
    }

    #[test]
    fn neighbors_clip_at_the_boundary() {
        let (maze, _arena, _config) = built_maze(generate_map(10, 123));
        assert_eq!(maze.neighbors(0, 0, 1).len(), 4);
        assert_eq!(maze.neighbors(5, 5, 1).len(), 9);
        assert_eq!(maze.neighbors(9, 9, 1).len(), 4);
        assert_eq!(maze.neighbors(0, 5, 1).len(), 6);
    }

    #[test]
    fn zero_grid_size_is_rejected() {
        // An empty map satisfies the length check (0 == 0 * 0), so the
        // size itself must be refused before any cell query can underflow.
        let config = GameConfig {
            grid_size: 0,
            ..GameConfig::default()
        };
        let err = Maze::new(&config, Vec3::ZERO, Vec::new());
        assert!(matches!(err, Err(MazeError::ZeroGridSize)));
    }

    #[test]
    fn wrong_map_size_is_rejected() {
        let config = GameConfig::default();
        let err = Maze::new(&config, Vec3::ZERO, vec![WallBits::closed(); 7]);
        assert!(matches!(
            err,
            Err(MazeError::MapSize {
                got: 7,
                expected: 100
            })
        ));
    }
}
