use crate::transform::Transform;

/// An axis-aligned box with its derived edges and center.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub right: f32,
    pub bottom: f32,
    pub center_x: f32,
    pub center_y: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            right: x + width,
            bottom: y + height,
            center_x: x + width / 2.0,
            center_y: y + height / 2.0,
        }
    }

    /// Box of the given size centered on `(cx, cy)`
    pub fn centered(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    /// Edges are inclusive.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right && y >= self.y && y <= self.bottom
    }

    /// Strict overlap: boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.right
            && other.x < self.right
            && self.y < other.bottom
            && other.y < self.bottom
    }

    /// Corners in clockwise order starting at the top-left
    pub fn corners(&self) -> [(f32, f32); 4] {
        [
            (self.x, self.y),
            (self.right, self.y),
            (self.right, self.bottom),
            (self.x, self.bottom),
        ]
    }

    /// Exact corners after `transform`, in the same order as [`Bounds::corners`]
    pub fn transformed_corners(&self, transform: &Transform) -> [(f32, f32); 4] {
        self.corners().map(|(x, y)| transform.transform_point(x, y))
    }
}
