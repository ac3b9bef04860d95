//! # Transform Service
//!
//! Handle-based TRS transforms with parenting. Controls and the editor gizmo
//! only hold [`TransformHandle`]s; the store owns the data and composes world
//! matrices on request (`T * R * S`, parent applied on the left).

use cgmath::{InnerSpace, Matrix4, One, Quaternion, SquareMatrix, Vector3, Vector4, Zero};
use log::warn;

/// Generational handle to a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransformHandle {
    index: u32,
    generation: u32,
}

impl TransformHandle {
    pub const INVALID: TransformHandle = TransformHandle {
        index: u32::MAX,
        generation: u32::MAX,
    };

    pub fn is_invalid(self) -> bool {
        self == Self::INVALID
    }
}

impl Default for TransformHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

#[derive(Debug, Clone)]
struct TransformData {
    position: Vector3<f32>,
    rotation: Quaternion<f32>,
    scale: Vector3<f32>,
    parent: Option<TransformHandle>,
    /// Opaque owner tag supplied at creation, for debugging.
    user: u64,
}

impl TransformData {
    fn local(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

struct Entry {
    generation: u32,
    data: Option<TransformData>,
}

/// Owner of every transform in the process.
#[derive(Default)]
pub struct TransformStore {
    entries: Vec<Entry>,
}

impl TransformStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an identity transform tagged with `user`.
    pub fn create(&mut self, user: u64) -> TransformHandle {
        let data = TransformData {
            position: Vector3::zero(),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            parent: None,
            user,
        };
        if let Some(index) = self.entries.iter().position(|e| e.data.is_none()) {
            let entry = &mut self.entries[index];
            entry.data = Some(data);
            return TransformHandle {
                index: index as u32,
                generation: entry.generation,
            };
        }
        self.entries.push(Entry {
            generation: 0,
            data: Some(data),
        });
        TransformHandle {
            index: (self.entries.len() - 1) as u32,
            generation: 0,
        }
    }

    /// Creates a transform with an initial position, rotation and scale.
    pub fn create_from_prs(
        &mut self,
        position: Vector3<f32>,
        rotation: Quaternion<f32>,
        scale: Vector3<f32>,
    ) -> TransformHandle {
        let handle = self.create(0);
        if let Some(data) = self.data_mut(handle) {
            data.position = position;
            data.rotation = rotation;
            data.scale = scale;
        }
        handle
    }

    /// Frees the transform. Children keep their local values and lose the parent link.
    pub fn destroy(&mut self, handle: TransformHandle) {
        if self.data(handle).is_none() {
            return;
        }
        for entry in &mut self.entries {
            if let Some(data) = entry.data.as_mut() {
                if data.parent == Some(handle) {
                    data.parent = None;
                }
            }
        }
        let entry = &mut self.entries[handle.index as usize];
        entry.data = None;
        entry.generation = entry.generation.wrapping_add(1);
    }

    pub fn is_valid(&self, handle: TransformHandle) -> bool {
        self.data(handle).is_some()
    }

    /// Number of live transforms.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.data.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn data(&self, handle: TransformHandle) -> Option<&TransformData> {
        let entry = self.entries.get(handle.index as usize)?;
        if entry.generation != handle.generation {
            return None;
        }
        entry.data.as_ref()
    }

    fn data_mut(&mut self, handle: TransformHandle) -> Option<&mut TransformData> {
        let entry = self.entries.get_mut(handle.index as usize)?;
        if entry.generation != handle.generation {
            return None;
        }
        entry.data.as_mut()
    }

    /// Sets (or clears, with `None`) the parent. Refuses links that would form a cycle.
    pub fn parent_set(&mut self, child: TransformHandle, parent: Option<TransformHandle>) -> bool {
        if let Some(parent) = parent {
            if !self.is_valid(parent) {
                warn!("transform parent_set: invalid parent {:?}", parent);
                return false;
            }
            let mut cursor = Some(parent);
            while let Some(current) = cursor {
                if current == child {
                    warn!("transform parent_set: refusing cycle through {:?}", child);
                    return false;
                }
                cursor = self.data(current).and_then(|d| d.parent);
            }
        }
        match self.data_mut(child) {
            Some(data) => {
                data.parent = parent;
                true
            }
            None => false,
        }
    }

    pub fn parent_get(&self, handle: TransformHandle) -> Option<TransformHandle> {
        self.data(handle).and_then(|d| d.parent)
    }

    pub fn user_get(&self, handle: TransformHandle) -> Option<u64> {
        self.data(handle).map(|d| d.user)
    }

    pub fn user_set(&mut self, handle: TransformHandle, user: u64) {
        if let Some(data) = self.data_mut(handle) {
            data.user = user;
        }
    }

    pub fn position_get(&self, handle: TransformHandle) -> Vector3<f32> {
        self.data(handle).map_or(Vector3::zero(), |d| d.position)
    }

    pub fn position_set(&mut self, handle: TransformHandle, position: Vector3<f32>) {
        if let Some(data) = self.data_mut(handle) {
            data.position = position;
        }
    }

    pub fn translate(&mut self, handle: TransformHandle, delta: Vector3<f32>) {
        if let Some(data) = self.data_mut(handle) {
            data.position += delta;
        }
    }

    pub fn rotation_get(&self, handle: TransformHandle) -> Quaternion<f32> {
        self.data(handle).map_or(Quaternion::one(), |d| d.rotation)
    }

    pub fn rotation_set(&mut self, handle: TransformHandle, rotation: Quaternion<f32>) {
        if let Some(data) = self.data_mut(handle) {
            data.rotation = rotation.normalize();
        }
    }

    pub fn scale_get(&self, handle: TransformHandle) -> Vector3<f32> {
        self.data(handle).map_or(Vector3::new(1.0, 1.0, 1.0), |d| d.scale)
    }

    pub fn scale_set(&mut self, handle: TransformHandle, scale: Vector3<f32>) {
        if let Some(data) = self.data_mut(handle) {
            data.scale = scale;
        }
    }

    /// Local matrix (`T * R * S`), identity for invalid handles.
    pub fn local_get(&self, handle: TransformHandle) -> Matrix4<f32> {
        self.data(handle).map_or(Matrix4::identity(), TransformData::local)
    }

    /// World matrix: the local matrix with every ancestor applied.
    pub fn world_get(&self, handle: TransformHandle) -> Matrix4<f32> {
        let mut world = Matrix4::identity();
        let mut cursor = Some(handle);
        while let Some(current) = cursor {
            let Some(data) = self.data(current) else {
                break;
            };
            world = data.local() * world;
            cursor = data.parent;
        }
        world
    }

    pub fn world_position_get(&self, handle: TransformHandle) -> Vector3<f32> {
        let world = self.world_get(handle);
        let p = world * Vector4::new(0.0, 0.0, 0.0, 1.0);
        Vector3::new(p.x, p.y, p.z)
    }

    /// Composed rotation of the transform and all its ancestors (scale ignored).
    pub fn world_rotation_get(&self, handle: TransformHandle) -> Quaternion<f32> {
        let mut rotation = Quaternion::one();
        let mut cursor = Some(handle);
        while let Some(current) = cursor {
            let Some(data) = self.data(current) else {
                break;
            };
            rotation = data.rotation * rotation;
            cursor = data.parent;
        }
        rotation.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Rotation, Rotation3};

    fn approx(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-4
    }

    #[test]
    fn test_world_position_follows_parent() {
        let mut store = TransformStore::new();
        let parent = store.create(0);
        let child = store.create(1);
        store.position_set(parent, Vector3::new(10.0, 0.0, 0.0));
        store.position_set(child, Vector3::new(0.0, 5.0, 0.0));
        assert!(store.parent_set(child, Some(parent)));
        assert!(approx(store.world_position_get(child), Vector3::new(10.0, 5.0, 0.0)));
    }

    #[test]
    fn test_world_rotation_composes() {
        let mut store = TransformStore::new();
        let parent = store.create(0);
        let child = store.create(0);
        store.rotation_set(parent, Quaternion::from_angle_z(Deg(90.0)));
        store.parent_set(child, Some(parent));
        store.position_set(child, Vector3::new(1.0, 0.0, 0.0));
        let rotated = store.world_rotation_get(child).rotate_vector(Vector3::unit_x());
        assert!(approx(rotated, Vector3::unit_y()));
        assert!(approx(store.world_position_get(child), Vector3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_stale_handle_after_destroy() {
        let mut store = TransformStore::new();
        let a = store.create(0);
        store.destroy(a);
        let b = store.create(0);
        assert!(!store.is_valid(a));
        assert!(store.is_valid(b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_parent_cycle_rejected() {
        let mut store = TransformStore::new();
        let a = store.create(0);
        let b = store.create(0);
        assert!(store.parent_set(b, Some(a)));
        assert!(!store.parent_set(a, Some(b)));
    }
}
