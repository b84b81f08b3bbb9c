//! Named events, their payload, and per-node handler registration.

use std::borrow::Cow;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;
use std::time::Duration;

use crate::error::{panic_message, Error};

use super::input::{Key, Modifiers, MouseButton};
use super::lifecycle::CleanupTag;
use super::{Handler, Listener, Node};

/// Name of an event a node emits.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    MouseDown,
    PointerDown,
    MouseUp,
    PointerUp,
    MouseMove,
    PointerMove,
    Click,
    DoubleClick,
    Hover,
    HoverEnd,
    MouseEnter,
    MouseLeave,
    DragStart,
    Drag,
    DragEnd,
    KeyDown,
    KeyUp,
    Wheel,
    Focus,
    Blur,
    Select,
    Deselect,
    Enable,
    Disable,
    Show,
    Hide,
    ChildAdded,
    ChildRemoved,
    Destroy,
    /// Application-defined event
    Custom(Cow<'static, str>),
}

const NAMED: &[(EventKind, &str)] = &[
    (EventKind::MouseDown, "mouseDown"),
    (EventKind::PointerDown, "pointerDown"),
    (EventKind::MouseUp, "mouseUp"),
    (EventKind::PointerUp, "pointerUp"),
    (EventKind::MouseMove, "mouseMove"),
    (EventKind::PointerMove, "pointerMove"),
    (EventKind::Click, "click"),
    (EventKind::DoubleClick, "doubleClick"),
    (EventKind::Hover, "hover"),
    (EventKind::HoverEnd, "hoverEnd"),
    (EventKind::MouseEnter, "mouseEnter"),
    (EventKind::MouseLeave, "mouseLeave"),
    (EventKind::DragStart, "dragStart"),
    (EventKind::Drag, "drag"),
    (EventKind::DragEnd, "dragEnd"),
    (EventKind::KeyDown, "keyDown"),
    (EventKind::KeyUp, "keyUp"),
    (EventKind::Wheel, "wheel"),
    (EventKind::Focus, "focus"),
    (EventKind::Blur, "blur"),
    (EventKind::Select, "select"),
    (EventKind::Deselect, "deselect"),
    (EventKind::Enable, "enable"),
    (EventKind::Disable, "disable"),
    (EventKind::Show, "show"),
    (EventKind::Hide, "hide"),
    (EventKind::ChildAdded, "childAdded"),
    (EventKind::ChildRemoved, "childRemoved"),
    (EventKind::Destroy, "destroy"),
];

impl EventKind {
    pub fn name(&self) -> &str {
        if let EventKind::Custom(name) = self {
            return name;
        }
        NAMED
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, name)| *name)
            .unwrap_or_default()
    }
}

impl From<&'static str> for EventKind {
    fn from(name: &'static str) -> Self {
        NAMED
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(kind, _)| kind.clone())
            .unwrap_or(EventKind::Custom(Cow::Borrowed(name)))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Event-specific payload
#[derive(Debug, Clone, Default)]
pub enum EventData {
    #[default]
    None,
    /// `local_*` are relative to the node's origin
    Pointer {
        x: f32,
        y: f32,
        local_x: f32,
        local_y: f32,
        button: Option<MouseButton>,
    },
    /// `dx`/`dy` are the movement since the previous drag event
    Drag { x: f32, y: f32, dx: f32, dy: f32 },
    Key { key: Key, modifiers: Modifiers },
    Wheel {
        x: f32,
        y: f32,
        delta_x: f32,
        delta_y: f32,
    },
    /// The child of a `childAdded` / `childRemoved` event
    Child(Node),
}

/// One emission, shared by every handler it is delivered to.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub target: Node,
    /// Scheduler clock time at emission
    pub timestamp: Duration,
    pub data: EventData,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    pub fn new(kind: EventKind, target: Node, timestamp: Duration, data: EventData) -> Self {
        Self {
            kind,
            target,
            timestamp,
            data,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Suppress the node's built-in reaction (e.g. Enter synthesizing a click).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Skip the handlers registered after the current one, for this emission only.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Handle returned by [`Node::on`], used to remove the handler again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

impl Node {
    /// Register `handler` for `kind`. Handlers run in registration order.
    ///
    /// On a destroyed node the handler is dropped and the returned id is inert.
    pub fn on(
        &self,
        kind: impl Into<EventKind>,
        handler: impl Fn(&mut Event) + 'static,
    ) -> ListenerId {
        let kind = kind.into();
        let mut state = self.inner.borrow_mut();
        state.next_listener += 1;
        let id = ListenerId(state.next_listener);
        if state.is_destroyed() {
            return id;
        }

        state.listeners.entry(kind.clone()).or_default().push(Listener {
            id,
            handler: Rc::new(handler),
        });

        let weak = self.downgrade();
        let tag = CleanupTag::Listener(kind.clone(), id);
        state.push_cleanup(tag, move || {
            if let Some(node) = weak.upgrade() {
                node.inner.borrow_mut().remove_listener(&kind, id);
            }
        });
        id
    }

    /// Remove a handler added with [`Node::on`]. Returns false if it was not
    /// registered.
    pub fn off(&self, kind: impl Into<EventKind>, id: ListenerId) -> bool {
        let kind = kind.into();
        let mut state = self.inner.borrow_mut();
        let removed = state.remove_listener(&kind, id);
        if removed {
            state.prune_cleanup(&CleanupTag::Listener(kind, id));
        }
        removed
    }

    pub fn listener_count(&self, kind: impl Into<EventKind>) -> usize {
        let kind = kind.into();
        self.inner
            .borrow()
            .listeners
            .get(&kind)
            .map_or(0, |list| list.len())
    }

    /// Deliver `kind` to this node's handlers and return the event as the
    /// last handler left it. Does nothing on a destroyed node.
    pub fn emit(&self, kind: impl Into<EventKind>, data: EventData) -> Event {
        let event = Event::new(kind.into(), self.clone(), self.scheduler().now(), data);
        if self.is_destroyed() {
            return event;
        }
        self.dispatch(event)
    }

    /// Runs handlers over a snapshot of the registry, so handlers may add or
    /// remove handlers (or destroy the node) while it is being delivered.
    pub(super) fn dispatch(&self, mut event: Event) -> Event {
        let handlers: Vec<Handler> = match self.inner.borrow().listeners.get(&event.kind) {
            Some(list) => list.iter().map(|l| l.handler.clone()).collect(),
            None => return event,
        };

        for handler in handlers {
            if event.propagation_stopped {
                break;
            }
            if event.kind != EventKind::Destroy && self.is_destroyed() {
                break;
            }
            let result = catch_unwind(AssertUnwindSafe(|| handler(&mut event)));
            if let Err(payload) = result {
                let error = Error::HandlerPanicked {
                    event: event.kind.to_string(),
                    message: panic_message(payload.as_ref()),
                };
                self.report(&error, &format!("emit({})", event.kind));
            }
        }
        event
    }
}
