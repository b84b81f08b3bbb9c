use std::rc::{Rc, Weak};

use crate::error::Error;
use crate::scene::SceneShared;

use super::event::{EventData, EventKind};
use super::Node;

impl Node {
    /// Append `child`, detaching it from its current parent first.
    ///
    /// Refuses (and reports) adopting the node itself or one of its
    /// ancestors. Destroyed nodes are refused silently.
    pub fn add_child(&self, child: &Node) -> bool {
        if self.is_destroyed() || child.is_destroyed() {
            return false;
        }
        if self.ptr_eq(child) {
            self.report(&Error::SelfParent(self.id()), "add_child");
            return false;
        }
        if self.ancestors().any(|ancestor| ancestor.ptr_eq(child)) {
            let error = Error::Cycle {
                parent: self.id(),
                child: child.id(),
            };
            self.report(&error, "add_child");
            return false;
        }

        if let Some(old_parent) = child.parent() {
            old_parent.detach_child(child);
        }
        // a handler on the old parent may have torn either node down
        if self.is_destroyed() || child.is_destroyed() {
            return false;
        }

        let scene = {
            let mut state = self.inner.borrow_mut();
            state.children.push(child.clone());
            state.scene.clone()
        };
        child.inner.borrow_mut().parent = Some(Rc::downgrade(&self.inner));
        child.attach_scene(scene);

        self.mark_dirty();
        self.emit(EventKind::ChildAdded, EventData::Child(child.clone()));
        true
    }

    /// Remove `child` if it is a direct child. Returns false otherwise.
    pub fn remove_child(&self, child: &Node) -> bool {
        if self.is_destroyed() {
            return false;
        }
        self.detach_child(child)
    }

    /// Remove every child, re-reading the first child each time so handlers
    /// that mutate the list are tolerated.
    pub fn remove_all_children(&self) {
        loop {
            let first = self.inner.borrow().children.first().cloned();
            match first {
                Some(child) if self.remove_child(&child) => {}
                _ => break,
            }
        }
    }

    pub(super) fn detach_child(&self, child: &Node) -> bool {
        let removed = {
            let mut state = self.inner.borrow_mut();
            match state.children.iter().position(|c| c.ptr_eq(child)) {
                Some(index) => {
                    state.children.remove(index);
                    true
                }
                None => false,
            }
        };
        if !removed {
            return false;
        }

        child.inner.borrow_mut().parent = None;
        child.attach_scene(None);
        self.mark_dirty();
        self.emit(EventKind::ChildRemoved, EventData::Child(child.clone()));
        true
    }

    /// Point this subtree at `scene`
    pub(crate) fn attach_scene(&self, scene: Option<Weak<SceneShared>>) {
        let children = {
            let mut state = self.inner.borrow_mut();
            state.scene = scene.clone();
            state.children.clone()
        };
        for child in &children {
            child.attach_scene(scene.clone());
        }
    }

    pub fn parent(&self) -> Option<Node> {
        self.inner
            .borrow()
            .parent
            .as_ref()
            .and_then(|weak| weak.upgrade())
            .map(|inner| Node { inner })
    }

    /// Snapshot of the children in paint order (last is on top)
    pub fn children(&self) -> Vec<Node> {
        self.inner.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.inner.borrow().children.len()
    }

    /// Iterate from the parent up to the root
    pub fn ancestors(&self) -> impl Iterator<Item = Node> {
        std::iter::successors(self.parent(), |node| node.parent())
    }

    pub fn find_child_by_id(&self, id: &str) -> Option<Node> {
        self.inner
            .borrow()
            .children
            .iter()
            .find(|child| child.inner.borrow().id.as_str() == id)
            .cloned()
    }

    pub fn find_children_by_kind(&self, kind: &str) -> Vec<Node> {
        self.inner
            .borrow()
            .children
            .iter()
            .filter(|child| child.inner.borrow().kind == kind)
            .cloned()
            .collect()
    }
}
