//! Mazewalk - a first-person maze exploration demo.
//!
//! A window-driven loop walks a player camera through a fixed world of
//! primitive entities: a ground plane, procedurally generated maze walls, a
//! pushable cube, lights, and a billboard. Player movement is resolved
//! against axis-aligned bounding volumes with wall sliding and obstacle
//! push-out. Rendering is left to an external collaborator that reads the
//! settled entity transforms each frame.
//!
//! # Architecture
//! - `app/`: winit event handling and key mapping
//! - `game/`: scene graph, maze grid, collision, and the player camera
//! - `config`: world constants and debug toggles
//!
//! # Usage
//! Run with `cargo run`. WASD/arrows move, the mouse looks, `C` toggles
//! collision, `F` toggles fly mode, `B` toggles the hitbox overlay, `M`
//! dumps the maze layout to a file, and backtick quits.

#![warn(missing_docs)]
pub mod app;
pub mod config;
pub mod game;

use anyhow::Result;
use winit::event_loop::{ControlFlow, EventLoop};

use crate::config::{DebugFlags, GameConfig};

/// Entry point: logging, scene construction, and the event loop.
fn main() -> Result<()> {
    env_logger::init();

    let config = GameConfig::default();
    let debug = DebugFlags::default();
    let mut app = app::App::new(config, debug)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop.run_app(&mut app)?;
    Ok(())
}
