//! Pointer, keyboard and focus handling.
//!
//! The input router decides which node receives an [`InputEvent`]; the node
//! then updates its own interaction flags and emits the semantic events.

use std::time::Duration;

use super::event::{EventData, EventKind};
use super::input::{InputEvent, Key, MouseButton, PointerSource};
use super::{Node, NodeFlags};

impl Node {
    /// Feed one input event to the node. Returns true if it was consumed.
    ///
    /// Non-interactive, invisible, disabled and destroyed nodes consume
    /// nothing.
    pub fn handle_input(&self, input: InputEvent) -> bool {
        if !self.accepts_input() {
            return false;
        }
        match input {
            InputEvent::PointerDown {
                x,
                y,
                button,
                source,
            } => self.pointer_down(x, y, button, source),
            InputEvent::PointerUp {
                x,
                y,
                button,
                source,
            } => self.pointer_up(x, y, button, source),
            InputEvent::PointerMove { x, y, source } => self.pointer_move(x, y, source),
            InputEvent::KeyDown { key, modifiers } => {
                if !self.is_focused() {
                    return false;
                }
                let event = self.emit(EventKind::KeyDown, EventData::Key { key, modifiers });
                if key.is_activation() && !event.is_default_prevented() {
                    self.emit(EventKind::Click, EventData::None);
                }
                if key == Key::Escape {
                    self.blur();
                }
                true
            }
            InputEvent::KeyUp { key, modifiers } => {
                if !self.is_focused() {
                    return false;
                }
                self.emit(EventKind::KeyUp, EventData::Key { key, modifiers });
                true
            }
            InputEvent::Wheel {
                x,
                y,
                delta_x,
                delta_y,
            } => {
                if !self.contains_point(x, y, true) {
                    return false;
                }
                self.emit(
                    EventKind::Wheel,
                    EventData::Wheel {
                        x,
                        y,
                        delta_x,
                        delta_y,
                    },
                );
                true
            }
            InputEvent::Focus => self.focus(),
            InputEvent::Blur => self.blur(),
        }
    }

    fn accepts_input(&self) -> bool {
        let flags = self.flags();
        flags.contains(NodeFlags::INTERACTIVE | NodeFlags::VISIBLE)
            && !flags.intersects(NodeFlags::DISABLED | NodeFlags::DESTROYED)
    }

    fn pointer_data(&self, x: f32, y: f32, button: Option<MouseButton>) -> EventData {
        let (origin_x, origin_y) = {
            let state = self.inner.borrow();
            (state.x, state.y)
        };
        EventData::Pointer {
            x,
            y,
            local_x: x - origin_x,
            local_y: y - origin_y,
            button,
        }
    }

    fn pointer_down(&self, x: f32, y: f32, button: MouseButton, source: PointerSource) -> bool {
        if !self.contains_point(x, y, true) {
            return false;
        }
        self.set_flag(NodeFlags::PRESSED, true);
        self.emit(source.down_event(), self.pointer_data(x, y, Some(button)));

        if self.is_draggable() && !self.is_destroyed() {
            {
                let mut state = self.inner.borrow_mut();
                state.flags.insert(NodeFlags::DRAGGING);
                state.drag_last = Some((x, y));
            }
            self.emit(
                EventKind::DragStart,
                EventData::Drag {
                    x,
                    y,
                    dx: 0.0,
                    dy: 0.0,
                },
            );
        }
        true
    }

    fn pointer_up(&self, x: f32, y: f32, button: MouseButton, source: PointerSource) -> bool {
        if !self.is_pressed() {
            return false;
        }
        self.set_flag(NodeFlags::PRESSED, false);
        self.emit(source.up_event(), self.pointer_data(x, y, Some(button)));
        self.end_drag(x, y);

        if self.contains_point(x, y, true) && !self.is_destroyed() {
            self.emit(EventKind::Click, self.pointer_data(x, y, Some(button)));
            if self.register_click() {
                self.emit(EventKind::DoubleClick, self.pointer_data(x, y, Some(button)));
            }
        }
        true
    }

    /// Record a pointer click; true if it completes a double click.
    fn register_click(&self) -> bool {
        let now = self.scheduler().now();
        let mut state = self.inner.borrow_mut();
        let threshold = state.double_click_threshold;
        match state.last_click {
            Some(previous) if now.saturating_sub(previous) < threshold => {
                state.last_click = None;
                true
            }
            _ => {
                state.last_click = Some(now);
                false
            }
        }
    }

    fn end_drag(&self, x: f32, y: f32) {
        let last = {
            let mut state = self.inner.borrow_mut();
            if !state.flags.contains(NodeFlags::DRAGGING) {
                return;
            }
            state.flags.remove(NodeFlags::DRAGGING);
            state.drag_last.take()
        };
        let (dx, dy) = last.map_or((0.0, 0.0), |(lx, ly)| (x - lx, y - ly));
        self.emit(EventKind::DragEnd, EventData::Drag { x, y, dx, dy });
    }

    fn pointer_move(&self, x: f32, y: f32, source: PointerSource) -> bool {
        let inside = self.contains_point(x, y, true);
        let was_hovered = self.is_hovered();

        if inside && !was_hovered {
            self.set_flag(NodeFlags::HOVERED, true);
            self.emit(EventKind::Hover, self.pointer_data(x, y, None));
            self.emit(EventKind::MouseEnter, self.pointer_data(x, y, None));
        } else if !inside && was_hovered {
            self.set_flag(NodeFlags::HOVERED, false);
            self.emit(EventKind::HoverEnd, self.pointer_data(x, y, None));
            self.emit(EventKind::MouseLeave, self.pointer_data(x, y, None));
        }

        let dragging = self.is_dragging();
        if self.is_hovered() || dragging {
            self.emit(source.move_event(), self.pointer_data(x, y, None));
        }
        if dragging {
            let last = self.inner.borrow_mut().drag_last.replace((x, y));
            let (dx, dy) = last.map_or((0.0, 0.0), |(lx, ly)| (x - lx, y - ly));
            self.emit(EventKind::Drag, EventData::Drag { x, y, dx, dy });
        }

        inside || was_hovered || dragging
    }

    /// Give the node keyboard focus. Returns true on the unfocused to
    /// focused transition only.
    pub fn focus(&self) -> bool {
        let flags = self.flags();
        if flags.intersects(NodeFlags::DESTROYED | NodeFlags::DISABLED | NodeFlags::FOCUSED)
            || !flags.contains(NodeFlags::FOCUSABLE)
        {
            return false;
        }
        self.set_flag(NodeFlags::FOCUSED, true);
        self.mark_dirty();
        self.emit(EventKind::Focus, EventData::None);
        true
    }

    pub fn blur(&self) -> bool {
        if self.is_destroyed() || !self.is_focused() {
            return false;
        }
        self.set_flag(NodeFlags::FOCUSED, false);
        self.mark_dirty();
        self.emit(EventKind::Blur, EventData::None);
        true
    }

    pub fn select(&self) -> bool {
        let flags = self.flags();
        if flags.intersects(NodeFlags::DESTROYED | NodeFlags::DISABLED | NodeFlags::SELECTED)
            || !flags.contains(NodeFlags::SELECTABLE)
        {
            return false;
        }
        self.set_flag(NodeFlags::SELECTED, true);
        self.mark_dirty();
        self.emit(EventKind::Select, EventData::None);
        true
    }

    pub fn deselect(&self) -> bool {
        if self.is_destroyed() || !self.is_selected() {
            return false;
        }
        self.set_flag(NodeFlags::SELECTED, false);
        self.mark_dirty();
        self.emit(EventKind::Deselect, EventData::None);
        true
    }

    /// Flip selection; returns the new state.
    pub fn toggle_selected(&self) -> bool {
        if self.is_selected() {
            self.deselect();
        } else {
            self.select();
        }
        self.is_selected()
    }

    /// Disabling drops hover, press, drag and focus before emitting `disable`.
    pub fn set_disabled(&self, disabled: bool) {
        if self.is_destroyed() || self.is_disabled() == disabled {
            return;
        }
        if disabled {
            {
                let mut state = self.inner.borrow_mut();
                state.flags.insert(NodeFlags::DISABLED);
                state.flags.remove(NodeFlags::POINTER_STATE);
                state.drag_last = None;
            }
            if self.is_focused() {
                self.set_flag(NodeFlags::FOCUSED, false);
                self.emit(EventKind::Blur, EventData::None);
            }
            self.mark_dirty();
            self.emit(EventKind::Disable, EventData::None);
        } else {
            self.set_flag(NodeFlags::DISABLED, false);
            self.mark_dirty();
            self.emit(EventKind::Enable, EventData::None);
        }
    }

    pub fn show(&self) {
        self.set_visible(true);
    }

    pub fn hide(&self) {
        self.set_visible(false);
    }

    pub fn set_visible(&self, visible: bool) {
        if self.is_destroyed() || self.is_visible() == visible {
            return;
        }
        self.set_flag(NodeFlags::VISIBLE, visible);
        self.mark_dirty();
        let kind = if visible {
            EventKind::Show
        } else {
            EventKind::Hide
        };
        self.emit(kind, EventData::None);
    }

    /// Time window used for double-click detection
    pub fn double_click_threshold(&self) -> Duration {
        self.inner.borrow().double_click_threshold
    }
}
