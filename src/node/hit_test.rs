use crate::geometry::Bounds;
use crate::transform::Transform;

use super::{Node, NodeFlags};

impl Node {
    /// Untransformed local box
    pub fn get_bounds(&self) -> Bounds {
        let state = self.inner.borrow();
        Bounds::new(state.x, state.y, state.width, state.height)
    }

    /// Axis-aligned box enclosing the node after rotation and scale about
    /// its center.
    ///
    /// This over-approximates a rotated node: points near the corners of the
    /// enclosing box hit even though they are outside the rotated shape.
    pub fn get_transformed_bounds(&self) -> Bounds {
        let state = self.inner.borrow();
        let bounds = Bounds::new(state.x, state.y, state.width, state.height);
        let scaled_w = state.scale_x.abs() * state.width;
        let scaled_h = state.scale_y.abs() * state.height;

        let (width, height) = if state.rotation != 0.0 {
            let cos = state.rotation.cos().abs();
            let sin = state.rotation.sin().abs();
            (
                scaled_w * cos + scaled_h * sin,
                scaled_w * sin + scaled_h * cos,
            )
        } else {
            (scaled_w, scaled_h)
        };

        Bounds::centered(bounds.center_x, bounds.center_y, width, height)
    }

    /// Local-to-parent transform: scale then rotate about the node center.
    pub fn local_transform(&self) -> Transform {
        let state = self.inner.borrow();
        let cx = state.x + state.width / 2.0;
        let cy = state.y + state.height / 2.0;
        let inner = Transform::rotate(state.rotation)
            .then(&Transform::scale_xy(state.scale_x, state.scale_y));
        Transform::about(cx, cy, &inner)
    }

    /// Exact corners of the rotated and scaled box
    pub fn transformed_corners(&self) -> [(f32, f32); 4] {
        self.get_bounds()
            .transformed_corners(&self.local_transform())
    }

    pub fn has_identity_transform(&self) -> bool {
        let state = self.inner.borrow();
        state.rotation == 0.0 && state.scale_x == 1.0 && state.scale_y == 1.0
    }

    /// Whether `(x, y)` hits the node. Invisible and fully transparent nodes
    /// never hit. With `use_transform`, a transformed node is tested against
    /// [`Node::get_transformed_bounds`].
    pub fn contains_point(&self, x: f32, y: f32, use_transform: bool) -> bool {
        {
            let state = self.inner.borrow();
            if !state.flags.contains(NodeFlags::VISIBLE) || state.alpha <= 0.0 {
                return false;
            }
        }
        if use_transform && !self.has_identity_transform() {
            self.get_transformed_bounds().contains(x, y)
        } else {
            self.get_bounds().contains(x, y)
        }
    }

    /// Untransformed box overlap
    pub fn intersects(&self, other: &Node) -> bool {
        self.get_bounds().intersects(&other.get_bounds())
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    use super::*;
    use crate::node::NodeConfig;
    use crate::test_support::test_scheduler;

    fn node(config: NodeConfig) -> Node {
        let (scheduler, _, _) = test_scheduler();
        Node::new(config.scheduler(scheduler))
    }

    #[test]
    fn test_identity_transform_matches_bounds() {
        let n = node(NodeConfig::new().bounds(10.0, 20.0, 30.0, 40.0));
        assert_eq!(n.get_transformed_bounds(), n.get_bounds());
    }

    #[test]
    fn test_scaled_bounds_stay_centered() {
        let n = node(NodeConfig::new().bounds(0.0, 0.0, 100.0, 50.0).scale(2.0, -0.5));
        let t = n.get_transformed_bounds();
        assert_eq!(t.width, 200.0);
        assert_eq!(t.height, 25.0);
        assert_eq!(t.center_x, 50.0);
        assert_eq!(t.center_y, 25.0);
    }

    #[test]
    fn test_quarter_turn_swaps_extents() {
        let n = node(NodeConfig::new().bounds(0.0, 0.0, 100.0, 20.0).rotation(FRAC_PI_2));
        let t = n.get_transformed_bounds();
        assert!((t.width - 20.0).abs() < 1e-3);
        assert!((t.height - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_rotated_hit_is_lenient_at_corners() {
        let n = node(
            NodeConfig::new()
                .bounds(0.0, 0.0, 100.0, 100.0)
                .rotation(FRAC_PI_4),
        );
        // outside the diamond, inside its enclosing box
        assert!(n.contains_point(-15.0, -15.0, true));
        assert!(!n.contains_point(-15.0, -15.0, false));
        assert!(!n.contains_point(-25.0, 50.0, true));
    }

    #[test]
    fn test_invisible_or_transparent_never_hit() {
        let hidden = node(NodeConfig::new().size(10.0, 10.0).visible(false));
        let clear = node(NodeConfig::new().size(10.0, 10.0).alpha(0.0));
        assert!(!hidden.contains_point(5.0, 5.0, false));
        assert!(!clear.contains_point(5.0, 5.0, true));
    }

    #[test]
    fn test_intersects_ignores_transform() {
        let a = node(NodeConfig::new().bounds(0.0, 0.0, 10.0, 10.0).scale(5.0, 5.0));
        let b = node(NodeConfig::new().bounds(20.0, 0.0, 10.0, 10.0));
        assert!(!a.intersects(&b));
        assert!(a.get_transformed_bounds().intersects(&b.get_bounds()));
    }
}
