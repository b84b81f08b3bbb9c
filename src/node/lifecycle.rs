use std::mem;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::animation::{AnimationKey, Outcome};
use crate::error::{panic_message, Error};

use super::event::{Event, EventData, EventKind, ListenerId};
use super::{Node, NodeFlags, NodeState};

/// What a cleanup task undoes, so it can be pruned when that thing goes
/// away before the node does.
#[derive(Clone, PartialEq)]
pub(super) enum CleanupTag {
    Listener(EventKind, ListenerId),
    Animation(AnimationKey),
    User,
}

pub(super) struct CleanupTask {
    tag: CleanupTag,
    run: Box<dyn FnOnce()>,
}

impl NodeState {
    pub(super) fn push_cleanup(&mut self, tag: CleanupTag, run: impl FnOnce() + 'static) {
        self.cleanup.push(CleanupTask {
            tag,
            run: Box::new(run),
        });
    }

    pub(super) fn prune_cleanup(&mut self, tag: &CleanupTag) {
        if let Some(index) = self.cleanup.iter().position(|task| &task.tag == tag) {
            self.cleanup.remove(index);
        }
    }

    pub(super) fn remove_listener(&mut self, kind: &EventKind, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(kind) else {
            return false;
        };
        let Some(index) = list.iter().position(|listener| listener.id == id) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            self.listeners.remove(kind);
        }
        true
    }
}

impl Node {
    /// Run `task` exactly once when the node is destroyed. Returns false (and
    /// drops the task) if the node is already destroyed.
    pub fn on_cleanup(&self, task: impl FnOnce() + 'static) -> bool {
        let mut state = self.inner.borrow_mut();
        if state.is_destroyed() {
            return false;
        }
        state.push_cleanup(CleanupTag::User, task);
        true
    }

    /// Number of cleanup tasks waiting for destroy
    pub fn cleanup_task_count(&self) -> usize {
        self.inner.borrow().cleanup.len()
    }

    /// Tear the node down. Calling it again is a no-op.
    ///
    /// In order: the `destroy` event is delivered, animations are cancelled
    /// (their completions settle as [`Outcome::Interrupted`]), handlers are
    /// dropped, cleanup tasks run, children are destroyed, and the node
    /// detaches from its parent. Failures are reported, never propagated.
    pub fn destroy(&self) {
        {
            let mut state = self.inner.borrow_mut();
            if state.is_destroyed() {
                return;
            }
            state.flags.insert(NodeFlags::DESTROYED);
            log::debug!("destroying node {}", state.id);
        }

        let event = Event::new(
            EventKind::Destroy,
            self.clone(),
            self.scheduler().now(),
            EventData::None,
        );
        self.dispatch(event);

        self.cancel_animations(Some(Outcome::Interrupted));

        let tasks = {
            let mut state = self.inner.borrow_mut();
            state.listeners.clear();
            mem::take(&mut state.cleanup)
        };
        for task in tasks {
            let result = catch_unwind(AssertUnwindSafe(task.run));
            if let Err(payload) = result {
                let error = Error::CleanupPanicked(panic_message(payload.as_ref()));
                self.report(&error, "destroy");
            }
        }

        let children = mem::take(&mut self.inner.borrow_mut().children);
        for child in &children {
            child.inner.borrow_mut().parent = None;
            child.destroy();
        }

        let parent = self.inner.borrow_mut().parent.take();
        if let Some(parent) = parent.and_then(|weak| weak.upgrade()) {
            Node { inner: parent }.detach_child(self);
        }

        let mut state = self.inner.borrow_mut();
        state.scene = None;
        state.widget = None;
        state.flags.remove(NodeFlags::POINTER_STATE | NodeFlags::FOCUSED);
    }
}
