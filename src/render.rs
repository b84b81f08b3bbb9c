//! The interface between nodes and a paint backend.
//!
//! Nodes never rasterize anything themselves. During [`Renderable::render`]
//! they only position the backend's coordinate system and opacity, then hand
//! the surface to their widget's paint step.

use crate::transform::Transform;

/// Transform and opacity state a paint backend exposes to nodes.
pub trait Surface {
    /// Push the current transform and alpha.
    fn save(&mut self);
    /// Pop back to the most recently saved state. Unbalanced calls are ignored.
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    /// Rotate by `radians` about the current origin.
    fn rotate(&mut self, radians: f32);
    fn scale(&mut self, sx: f32, sy: f32);
    /// Local-to-surface transform composed so far
    fn current_transform(&self) -> Transform;
    fn alpha(&self) -> f32;
    fn set_alpha(&mut self, alpha: f32);
}

/// Something that paints itself (and its subtree) onto a [`Surface`].
pub trait Renderable {
    fn render(&self, surface: &mut dyn Surface);
}

/// Something that advances per-frame logic. `dt` is in seconds.
pub trait Updatable {
    fn update(&self, dt: f32);
}

/// A [`Surface`] that only tracks the composed transform and alpha.
///
/// Useful for backends that want the final matrix per node, and for tests.
#[derive(Debug, Clone)]
pub struct TransformStack {
    current: Transform,
    alpha: f32,
    saved: Vec<(Transform, f32)>,
}

impl TransformStack {
    pub fn new() -> Self {
        Self {
            current: Transform::IDENTITY,
            alpha: 1.0,
            saved: Vec::with_capacity(4),
        }
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Map a point from the current local space to surface space.
    pub fn to_surface(&self, x: f32, y: f32) -> (f32, f32) {
        self.current.transform_point(x, y)
    }

    fn push(&mut self, transform: Transform) {
        self.current = self.current.then(&transform);
    }
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TransformStack {
    fn save(&mut self) {
        self.saved.push((self.current, self.alpha));
    }

    fn restore(&mut self) {
        if let Some((transform, alpha)) = self.saved.pop() {
            self.current = transform;
            self.alpha = alpha;
        }
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.push(Transform::translate(x, y));
    }

    fn rotate(&mut self, radians: f32) {
        self.push(Transform::rotate(radians));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.push(Transform::scale_xy(sx, sy));
    }

    fn current_transform(&self) -> Transform {
        self.current
    }

    fn alpha(&self) -> f32 {
        self.alpha
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }
}
