//! The root of a node tree and the redraw bookkeeping around it.

use std::cell::Cell;
use std::rc::Rc;

use crate::node::{Node, NodeConfig};
use crate::render::{Renderable, Surface, Updatable};

/// State a node reaches through its weak scene reference
#[derive(Default)]
pub(crate) struct SceneShared {
    redraw: Cell<bool>,
}

impl SceneShared {
    pub(crate) fn request_redraw(&self) {
        self.redraw.set(true);
    }
}

/// Owns a root node. Every node added beneath it reports redraws here.
///
/// Dropping the scene destroys the whole tree.
pub struct Scene {
    root: Node,
    shared: Rc<SceneShared>,
}

impl Scene {
    pub fn new(config: NodeConfig) -> Self {
        let root = Node::new(config);
        let shared = Rc::new(SceneShared::default());
        root.attach_scene(Some(Rc::downgrade(&shared)));
        shared.request_redraw();
        Self { root, shared }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn request_redraw(&self) {
        self.shared.request_redraw();
    }

    /// Check whether anything in the scene changed since the last call, and
    /// clear the flag.
    pub fn take_redraw_request(&self) -> bool {
        self.shared.redraw.replace(false)
    }

    /// Run per-frame widget logic for the whole tree. `dt` is in seconds.
    pub fn update(&self, dt: f32) {
        self.root.update(dt);
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        self.root.render(surface);
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.root.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TransformStack;
    use crate::test_support::test_scheduler;

    fn node() -> Node {
        let (scheduler, _, _) = test_scheduler();
        Node::new(NodeConfig::new().scheduler(scheduler))
    }

    #[test]
    fn test_changes_below_the_root_request_redraw() {
        let (scheduler, _, _) = test_scheduler();
        let scene = Scene::new(NodeConfig::new().scheduler(scheduler));
        assert!(scene.take_redraw_request());
        assert!(!scene.take_redraw_request());

        let panel = node();
        let button = node();
        panel.add_child(&button);
        scene.root().add_child(&panel);
        assert!(button.in_scene());
        assert!(scene.take_redraw_request());

        button.set_position(4.0, 4.0);
        assert!(scene.take_redraw_request());

        scene.render(&mut TransformStack::new());
        assert!(!button.is_dirty());
    }

    #[test]
    fn test_removed_nodes_leave_the_scene() {
        let (scheduler, _, _) = test_scheduler();
        let scene = Scene::new(NodeConfig::new().scheduler(scheduler));
        let child = node();
        scene.root().add_child(&child);
        scene.root().remove_child(&child);
        scene.take_redraw_request();

        assert!(!child.in_scene());
        child.set_alpha(0.5);
        assert!(!scene.take_redraw_request());
    }

    #[test]
    fn test_dropping_the_scene_destroys_the_tree() {
        let child = node();
        {
            let (scheduler, _, _) = test_scheduler();
            let scene = Scene::new(NodeConfig::new().scheduler(scheduler));
            scene.root().add_child(&child);
        }
        assert!(child.is_destroyed());
        assert!(!child.in_scene());
    }
}
