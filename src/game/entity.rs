//! World entities: pose state and derived transforms.
//!
//! Every placeable object in the scene is an [`Entity`]: a position, an
//! Euler rotation, a scale, and a [`EntityKind`] tag that decides its
//! collision and render behavior. Entities live in an [`EntityArena`] and
//! are referred to everywhere else by [`EntityId`] handles, so the maze
//! cells can point at walls without owning them.

use glam::{Mat3, Mat4, Vec3};

/// Smallest scale component allowed on an entity.
///
/// Zero scale makes the model matrix's upper-left 3x3 singular and the
/// normal matrix unrepresentable, so scales are clamped away from zero at
/// creation instead of guarding every render-time inversion.
pub const MIN_SCALE: f32 = 1e-4;

/// Stable handle into an [`EntityArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(u32);

/// Tag distinguishing render/collision behavior per entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityKind {
    /// The floor plane. Not collidable.
    Ground,
    /// One maze wall segment.
    Wall,
    /// A static decorative cube.
    Cube,
    /// The one pushable obstacle; collision resolution displaces it
    /// instead of the player.
    DynamicCube,
    /// A point light. Not collidable.
    Light {
        /// RGB light color.
        color: Vec3,
        /// Light intensity.
        strength: f32,
    },
    /// An object that re-orients toward the camera every frame.
    Billboard,
}

/// A basic object in the world, with a position, rotation and scale.
#[derive(Debug, Clone)]
pub struct Entity {
    /// World position.
    pub position: Vec3,
    /// Euler angles in degrees, applied in X, then Y, then Z order.
    pub rotation: Vec3,
    /// Per-axis scale factors, clamped to at least [`MIN_SCALE`].
    pub scale: Vec3,
    /// Behavior tag.
    pub kind: EntityKind,
}

impl Entity {
    /// Creates an entity, clamping scale components away from zero.
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3, kind: EntityKind) -> Self {
        Self {
            position,
            rotation,
            scale: scale.max(Vec3::splat(MIN_SCALE)),
            kind,
        }
    }

    /// Returns the entity's model-to-world transformation matrix.
    ///
    /// Rotations are applied in X, then Y, then Z order, followed by scale
    /// and translation.
    pub fn get_model_transform(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_scale(self.scale)
            * Mat4::from_rotation_z(self.rotation.z.to_radians())
            * Mat4::from_rotation_y(self.rotation.y.to_radians())
            * Mat4::from_rotation_x(self.rotation.x.to_radians())
    }

    /// Returns the 3x3 normal matrix (inverse-transpose of the model
    /// matrix's upper-left 3x3) for transforming normals to world space.
    ///
    /// The scale clamp in [`Entity::new`] guarantees the 3x3 block is
    /// invertible.
    pub fn get_normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.get_model_transform())
            .inverse()
            .transpose()
    }

    /// Re-orients a billboard so it faces the camera.
    ///
    /// Yaw tracks the horizontal direction to the camera, pitch the
    /// vertical one. No-op for non-billboard kinds.
    pub fn face_towards(&mut self, camera_pos: Vec3) {
        if self.kind != EntityKind::Billboard {
            return;
        }
        let to_camera = camera_pos - self.position;
        self.rotation.z = -(-to_camera.y).atan2(to_camera.x).to_degrees();
        self.rotation.y = -to_camera.z.atan2(to_camera.length()).to_degrees();
    }
}

/// Flat arena owning every entity in the scene.
///
/// Handles are plain indices and stay valid for the arena's lifetime;
/// entities are never removed before scene teardown.
#[derive(Debug, Default)]
pub struct EntityArena {
    entities: Vec<Entity>,
}

impl EntityArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an entity and returns its handle.
    pub fn alloc(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        self.entities.push(entity);
        id
    }

    /// Borrows the entity behind a handle.
    pub fn get(&self, id: EntityId) -> &Entity {
        &self.entities[id.0 as usize]
    }

    /// Mutably borrows the entity behind a handle.
    pub fn get_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.0 as usize]
    }

    /// Number of entities stored.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates over all entities with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, e)| (EntityId(i as u32), e))
    }
}
