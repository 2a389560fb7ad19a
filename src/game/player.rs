//! First-person player state: pose, orientation basis, and view transform.

use glam::{Mat4, Vec3, vec3};

/// Pitch is clamped short of straight up/down so the view basis never
/// degenerates.
const PITCH_LIMIT: f32 = 89.0;

const DEGENERATE_EPS: f32 = 1e-12;

/// The player camera.
///
/// Euler angles are stored in degrees: `rotation.y` is yaw about the
/// vertical axis, `rotation.z` is pitch, `rotation.x` is roll (unused by
/// input but kept in the pose). The orthonormal `forwards`/`right`/`up`
/// basis is derived from yaw and pitch by [`Player::update`] and cached
/// between orientation changes.
#[derive(Debug, Clone)]
pub struct Player {
    /// Eye position in world space.
    pub position: Vec3,
    /// Euler angles in degrees (x roll, y yaw, z pitch).
    pub rotation: Vec3,
    /// View direction. Unit length.
    pub forwards: Vec3,
    /// Strafe direction. Unit length, horizontal.
    pub right: Vec3,
    /// View-up direction. Unit length.
    pub up: Vec3,
    /// Walk speed in world units per second.
    pub speed: f32,
    /// Degrees of rotation per unit of raw mouse delta.
    pub mouse_sensitivity: f32,
}

impl Player {
    /// Creates a player at the given pose with a freshly derived basis.
    pub fn new(position: Vec3, rotation: Vec3, speed: f32, mouse_sensitivity: f32) -> Self {
        let mut player = Self {
            position,
            rotation,
            forwards: Vec3::X,
            right: Vec3::NEG_Y,
            up: Vec3::Z,
            speed,
            mouse_sensitivity,
        };
        player.update();
        player
    }

    /// Rebuilds the orientation basis from the current yaw and pitch.
    ///
    /// If the forwards vector lines up with the world vertical the cross
    /// product collapses; the previous right/up pair is kept in that case
    /// rather than producing NaN axes.
    pub fn update(&mut self) {
        let yaw = self.rotation.y.to_radians();
        let pitch = self.rotation.z.to_radians();
        self.forwards = vec3(
            yaw.cos() * pitch.cos(),
            yaw.sin() * pitch.cos(),
            pitch.sin(),
        )
        .normalize();

        let right = self.forwards.cross(Vec3::Z);
        if right.length_squared() > DEGENERATE_EPS {
            self.right = right.normalize();
            self.up = self.right.cross(self.forwards).normalize();
        }
    }

    /// Applies a rotation delta in degrees and re-derives the basis.
    ///
    /// Roll and yaw wrap into [0, 360); pitch is clamped to [-89, 89]
    /// degrees.
    pub fn spin(&mut self, delta_degrees: Vec3) {
        self.rotation += delta_degrees;
        self.rotation.x = self.rotation.x.rem_euclid(360.0);
        self.rotation.y = self.rotation.y.rem_euclid(360.0);
        self.rotation.z = self.rotation.z.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update();
    }

    /// Maps a local movement intent (forward, strafe-right, raise) to a
    /// world-space direction. The raise component is along the world
    /// vertical, not the view up, so walking while looking down does not
    /// burrow.
    pub fn world_move(&self, local: Vec3) -> Vec3 {
        self.forwards * local.x + self.right * local.y + Vec3::Z * local.z
    }

    /// Commits a resolved position. Grounded players are pinned to the
    /// configured eye height; flying players keep their vertical position.
    pub fn commit_move(&mut self, new_pos: Vec3, fly: bool, eye_height: f32) {
        self.position = new_pos;
        if !fly {
            self.position.z = eye_height;
        }
    }

    /// World-to-view matrix for the current pose.
    pub fn get_view_transform(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forwards, self.up)
    }
}
