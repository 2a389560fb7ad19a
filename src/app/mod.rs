//! Window and input driver.
//!
//! [`App`] implements winit's [`ApplicationHandler`]: it owns the window,
//! the key state, the debug flags, and the [`Scene`], and translates window
//! and device events into scene calls. One logical update runs per redraw:
//! elapsed time is measured, held keys become a movement intent, the scene
//! resolves and commits the move, and another redraw is requested.

pub mod keys;

use std::time::Instant;

use glam::vec3;
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, ElementState, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{CursorGrabMode, Window, WindowId};

use crate::config::{DebugFlags, GameConfig};
use crate::game::{Scene, SceneError};
use keys::{GameKey, KeyState};

/// The application driver: window, input state, and the scene.
pub struct App {
    window: Option<Window>,
    scene: Scene,
    keys: KeyState,
    debug: DebugFlags,
    capture_mouse: bool,
    last_frame: Instant,
}

impl App {
    /// Builds the scene up front; window creation waits for `resumed`.
    pub fn new(config: GameConfig, debug: DebugFlags) -> Result<Self, SceneError> {
        let scene = Scene::new(config, &debug)?;
        Ok(Self {
            window: None,
            scene,
            keys: KeyState::new(),
            debug,
            capture_mouse: true,
            last_frame: Instant::now(),
        })
    }

    /// Applies the current capture preference to the window cursor.
    ///
    /// Confined grab is tried first; platforms without it (e.g. Wayland
    /// compositors that only lock) fall back to locked mode.
    fn triage_mouse(&self) {
        let Some(window) = &self.window else {
            return;
        };
        if self.capture_mouse {
            if window.set_cursor_grab(CursorGrabMode::Confined).is_err() {
                if let Err(err) = window.set_cursor_grab(CursorGrabMode::Locked) {
                    log::warn!("could not grab cursor: {err}");
                }
            }
            window.set_cursor_visible(false);
        } else {
            if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
                log::warn!("could not release cursor: {err}");
            }
            window.set_cursor_visible(true);
        }
    }

    /// Edge-triggered actions for freshly pressed keys.
    fn handle_pressed(&mut self, key: GameKey, event_loop: &ActiveEventLoop) {
        match key {
            GameKey::ToggleCollision => {
                self.debug.collision = !self.debug.collision;
                log::info!("collision: {}", self.debug.collision);
            }
            GameKey::ToggleFly => {
                self.debug.fly = !self.debug.fly;
                log::info!("fly: {}", self.debug.fly);
            }
            GameKey::ToggleHitboxes => {
                self.debug.show_hitboxes = !self.debug.show_hitboxes;
                log::info!("hitbox overlay: {}", self.debug.show_hitboxes);
            }
            GameKey::DumpMaze => {
                if let Err(err) = self.scene.maze.save_to_file() {
                    log::error!("maze dump failed: {err}");
                }
            }
            GameKey::Escape => {
                self.capture_mouse = !self.capture_mouse;
                self.triage_mouse();
            }
            GameKey::Quit => event_loop.exit(),
            _ => {}
        }
    }

    /// One logical frame: scale the held-key intent by speed and elapsed
    /// time, move the player, advance animations.
    fn frame(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        let cell_before = self.scene.player_cell();

        let intent = self.keys.movement_intent();
        if intent != glam::Vec3::ZERO {
            let local_delta = intent * self.scene.player.speed * dt;
            self.scene.move_player(local_delta, &self.debug);
        }
        self.scene.update(dt);

        let cell_after = self.scene.player_cell();
        if cell_after != cell_before {
            log::debug!("entered cell ({}, {})", cell_after.0, cell_after.1);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes().with_title("mazewalk");
        match event_loop.create_window(attributes) {
            Ok(window) => {
                self.window = Some(window);
                self.triage_mouse();
                self.last_frame = Instant::now();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.capture_mouse {
                // Horizontal motion yaws, vertical motion pitches; both are
                // inverted so the view follows the mouse.
                self.scene
                    .spin_player(vec3(0.0, -delta.0 as f32, -delta.1 as f32));
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::KeyboardInput { event, .. } => {
                let Some(key) = keys::winit_key_to_game_key(&event.logical_key) else {
                    return;
                };
                match event.state {
                    ElementState::Pressed => {
                        if !event.repeat {
                            self.handle_pressed(key, event_loop);
                        }
                        self.keys.press_key(key);
                    }
                    ElementState::Released => self.keys.release_key(key),
                }
            }

            WindowEvent::RedrawRequested => {
                self.frame();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}
