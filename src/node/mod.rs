//! The interactive node: geometry, interaction state, children, handlers
//! and animations of one element of the scene graph.
//!
//! A [`Node`] is a cheap, clonable handle. The tree owns children through
//! these handles while parents and the scene are only referenced weakly, so
//! dropping the last handle to a subtree frees it. Destruction is explicit
//! though: [`Node::destroy`] runs the teardown a widget relies on (destroy
//! event, animation cancellation, cleanup tasks, child cascade).
//!
//! No `RefCell` borrow is held while handlers, widget hooks, tween steps or
//! cleanup tasks run, so all of them may call back into any node.

mod animate;
mod config;
mod event;
mod flags;
mod hit_test;
mod input;
mod interaction;
mod lifecycle;
mod property;
mod tree;

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::animation::{AnimationKey, AnimationScheduler, Completion};
use crate::error::{default_error_handler, Error, ErrorHandler};
use crate::render::{Renderable, Surface, Updatable};
use crate::scene::SceneShared;

pub use config::{NodeConfig, DEFAULT_DOUBLE_CLICK};
pub use event::{Event, EventData, EventKind, ListenerId};
pub use flags::NodeFlags;
pub use input::{InputEvent, Key, Modifiers, MouseButton, PointerSource};
pub use property::Property;

use animate::QueuedAnimation;
use lifecycle::CleanupTask;

/// Unique identifier of a node
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(String);

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    /// Generate a new unique id of the form `node-N`
    pub fn next() -> Self {
        NodeId(format!(
            "node-{}",
            NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extension points for concrete widgets built on a node.
///
/// The node calls these during [`Updatable::update`] and
/// [`Renderable::render`] after it has handled its own state, so widgets
/// never need to traverse children themselves.
pub trait Widget {
    /// Per-frame logic. `dt` is in seconds.
    fn on_update(&mut self, _node: &Node, _dt: f32) {}

    /// Paint the widget's own content. The surface is already translated,
    /// rotated, scaled and faded for this node.
    fn render_self(&self, _node: &Node, _surface: &mut dyn Surface) {}
}

type Handler = Rc<dyn Fn(&mut Event)>;

struct Listener {
    id: ListenerId,
    handler: Handler,
}

struct NodeState {
    id: NodeId,
    kind: Cow<'static, str>,

    x: f32,
    y: f32,
    z: f32,
    width: f32,
    height: f32,
    rotation: f32,
    scale_x: f32,
    scale_y: f32,
    alpha: f32,
    custom: HashMap<Cow<'static, str>, f32>,

    flags: NodeFlags,

    parent: Option<Weak<RefCell<NodeState>>>,
    children: Vec<Node>,
    scene: Option<Weak<SceneShared>>,

    listeners: HashMap<EventKind, Vec<Listener>>,
    next_listener: u64,

    animations: HashMap<AnimationKey, Completion>,
    queue: VecDeque<QueuedAnimation>,
    queue_busy: bool,
    queue_epoch: u64,

    cleanup: Vec<CleanupTask>,

    scheduler: AnimationScheduler,
    error_handler: ErrorHandler,
    widget: Option<Rc<RefCell<dyn Widget>>>,

    double_click_threshold: Duration,
    last_click: Option<Duration>,
    drag_last: Option<(f32, f32)>,
}

impl NodeState {
    fn is_destroyed(&self) -> bool {
        self.flags.contains(NodeFlags::DESTROYED)
    }

    fn read(&self, property: &Property) -> Option<f32> {
        Some(match property {
            Property::X => self.x,
            Property::Y => self.y,
            Property::Z => self.z,
            Property::Width => self.width,
            Property::Height => self.height,
            Property::Rotation => self.rotation,
            Property::ScaleX => self.scale_x,
            Property::ScaleY => self.scale_y,
            Property::Alpha => self.alpha,
            Property::Custom(name) => return self.custom.get(name.as_ref()).copied(),
        })
    }

    fn write(&mut self, property: &Property, value: f32) -> bool {
        let slot = match property {
            Property::X => &mut self.x,
            Property::Y => &mut self.y,
            Property::Z => &mut self.z,
            Property::Width => &mut self.width,
            Property::Height => &mut self.height,
            Property::Rotation => &mut self.rotation,
            Property::ScaleX => &mut self.scale_x,
            Property::ScaleY => &mut self.scale_y,
            Property::Alpha => {
                self.alpha = value.clamp(0.0, 1.0);
                return true;
            }
            Property::Custom(name) => match self.custom.get_mut(name.as_ref()) {
                Some(slot) => slot,
                None => return false,
            },
        };
        *slot = value;
        true
    }
}

/// Handle to a node in the scene graph. Clones refer to the same node.
#[derive(Clone)]
pub struct Node {
    inner: Rc<RefCell<NodeState>>,
}

/// Non-owning handle to a node
#[derive(Clone)]
pub struct WeakNode {
    inner: Weak<RefCell<NodeState>>,
}

impl WeakNode {
    pub fn upgrade(&self) -> Option<Node> {
        self.inner.upgrade().map(|inner| Node { inner })
    }
}

impl Node {
    pub fn new(config: NodeConfig) -> Self {
        let config = config.validated();

        let mut flags = NodeFlags::DIRTY;
        flags.set(NodeFlags::VISIBLE, config.visible);
        flags.set(NodeFlags::INTERACTIVE, config.interactive);
        flags.set(NodeFlags::DRAGGABLE, config.draggable);
        flags.set(NodeFlags::RESIZABLE, config.resizable);
        flags.set(NodeFlags::FOCUSABLE, config.focusable);
        flags.set(NodeFlags::SELECTABLE, config.selectable);
        flags.set(NodeFlags::DISABLED, config.disabled);

        let state = NodeState {
            id: config.id.unwrap_or_else(NodeId::next),
            kind: config.kind,
            x: config.x,
            y: config.y,
            z: config.z,
            width: config.width,
            height: config.height,
            rotation: config.rotation,
            scale_x: config.scale_x,
            scale_y: config.scale_y,
            alpha: config.alpha,
            custom: HashMap::new(),
            flags,
            parent: None,
            children: Vec::new(),
            scene: None,
            listeners: HashMap::new(),
            next_listener: 0,
            animations: HashMap::new(),
            queue: VecDeque::new(),
            queue_busy: false,
            queue_epoch: 0,
            cleanup: Vec::new(),
            scheduler: config.scheduler.unwrap_or_else(AnimationScheduler::global),
            error_handler: config.error_handler.unwrap_or_else(default_error_handler),
            widget: None,
            double_click_threshold: config.double_click_threshold,
            last_click: None,
            drag_last: None,
        };

        Node {
            inner: Rc::new(RefCell::new(state)),
        }
    }

    pub fn downgrade(&self) -> WeakNode {
        WeakNode {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether both handles refer to the same node
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn id(&self) -> NodeId {
        self.inner.borrow().id.clone()
    }

    pub fn kind(&self) -> Cow<'static, str> {
        self.inner.borrow().kind.clone()
    }

    pub fn scheduler(&self) -> AnimationScheduler {
        self.inner.borrow().scheduler.clone()
    }

    /// Attach the widget whose hooks run during update and render.
    pub fn set_widget(&self, widget: impl Widget + 'static) {
        let widget: Rc<RefCell<dyn Widget>> = Rc::new(RefCell::new(widget));
        let mut state = self.inner.borrow_mut();
        if !state.is_destroyed() {
            state.widget = Some(widget);
        }
    }

    pub fn set_error_handler(&self, handler: ErrorHandler) {
        self.inner.borrow_mut().error_handler = handler;
    }

    /// Route `error` to this node's error handler.
    pub fn report(&self, error: &Error, context: &str) {
        let handler = self.inner.borrow().error_handler.clone();
        handler(error, context);
    }

    // -- properties --

    /// Current value of `property`, or `None` for an undeclared custom property.
    pub fn get(&self, property: impl Into<Property>) -> Option<f32> {
        self.inner.borrow().read(&property.into())
    }

    /// Write `property`. Unknown custom properties and non-finite values are
    /// reported and refused.
    pub fn set(&self, property: impl Into<Property>, value: f32) -> bool {
        let property = property.into();
        if self.is_destroyed() {
            return false;
        }
        if !value.is_finite() {
            self.report(
                &Error::InvalidValue {
                    property: property.to_string(),
                    value,
                },
                "set",
            );
            return false;
        }
        let written = self.inner.borrow_mut().write(&property, value);
        if !written {
            self.report(&self.unknown_property(&property), "set");
            return false;
        }
        self.mark_dirty();
        true
    }

    /// Declare a custom numeric property so it can be read, written and animated.
    pub fn define_property(&self, name: impl Into<Cow<'static, str>>, initial: f32) {
        let name = name.into();
        let mut state = self.inner.borrow_mut();
        if !state.is_destroyed() {
            state.custom.insert(name, initial);
        }
    }

    fn unknown_property(&self, property: &Property) -> Error {
        Error::UnknownProperty {
            node: self.id(),
            property: property.to_string(),
        }
    }

    pub fn x(&self) -> f32 {
        self.inner.borrow().x
    }

    pub fn y(&self) -> f32 {
        self.inner.borrow().y
    }

    pub fn z(&self) -> f32 {
        self.inner.borrow().z
    }

    pub fn width(&self) -> f32 {
        self.inner.borrow().width
    }

    pub fn height(&self) -> f32 {
        self.inner.borrow().height
    }

    pub fn rotation(&self) -> f32 {
        self.inner.borrow().rotation
    }

    pub fn scale(&self) -> (f32, f32) {
        let state = self.inner.borrow();
        (state.scale_x, state.scale_y)
    }

    pub fn alpha(&self) -> f32 {
        self.inner.borrow().alpha
    }

    pub fn set_position(&self, x: f32, y: f32) {
        self.set(Property::X, x);
        self.set(Property::Y, y);
    }

    pub fn set_size(&self, width: f32, height: f32) {
        self.set(Property::Width, width.max(0.0));
        self.set(Property::Height, height.max(0.0));
    }

    pub fn set_rotation(&self, radians: f32) {
        self.set(Property::Rotation, radians);
    }

    pub fn set_scale(&self, scale_x: f32, scale_y: f32) {
        self.set(Property::ScaleX, scale_x);
        self.set(Property::ScaleY, scale_y);
    }

    pub fn set_alpha(&self, alpha: f32) {
        self.set(Property::Alpha, alpha);
    }

    // -- flags --

    pub fn flags(&self) -> NodeFlags {
        self.inner.borrow().flags
    }

    fn has(&self, flag: NodeFlags) -> bool {
        self.inner.borrow().flags.contains(flag)
    }

    fn set_flag(&self, flag: NodeFlags, on: bool) {
        let mut state = self.inner.borrow_mut();
        if !state.is_destroyed() {
            state.flags.set(flag, on);
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.has(NodeFlags::DESTROYED)
    }

    pub fn is_visible(&self) -> bool {
        self.has(NodeFlags::VISIBLE)
    }

    pub fn is_interactive(&self) -> bool {
        self.has(NodeFlags::INTERACTIVE)
    }

    pub fn is_draggable(&self) -> bool {
        self.has(NodeFlags::DRAGGABLE)
    }

    pub fn is_resizable(&self) -> bool {
        self.has(NodeFlags::RESIZABLE)
    }

    pub fn is_focusable(&self) -> bool {
        self.has(NodeFlags::FOCUSABLE)
    }

    pub fn is_selectable(&self) -> bool {
        self.has(NodeFlags::SELECTABLE)
    }

    pub fn is_hovered(&self) -> bool {
        self.has(NodeFlags::HOVERED)
    }

    pub fn is_focused(&self) -> bool {
        self.has(NodeFlags::FOCUSED)
    }

    pub fn is_dragging(&self) -> bool {
        self.has(NodeFlags::DRAGGING)
    }

    pub fn is_selected(&self) -> bool {
        self.has(NodeFlags::SELECTED)
    }

    pub fn is_pressed(&self) -> bool {
        self.has(NodeFlags::PRESSED)
    }

    pub fn is_disabled(&self) -> bool {
        self.has(NodeFlags::DISABLED)
    }

    pub fn is_dirty(&self) -> bool {
        self.has(NodeFlags::DIRTY)
    }

    pub fn set_interactive(&self, interactive: bool) {
        self.set_flag(NodeFlags::INTERACTIVE, interactive);
    }

    pub fn set_draggable(&self, draggable: bool) {
        self.set_flag(NodeFlags::DRAGGABLE, draggable);
    }

    pub fn set_resizable(&self, resizable: bool) {
        self.set_flag(NodeFlags::RESIZABLE, resizable);
    }

    pub fn set_focusable(&self, focusable: bool) {
        self.set_flag(NodeFlags::FOCUSABLE, focusable);
    }

    pub fn set_selectable(&self, selectable: bool) {
        self.set_flag(NodeFlags::SELECTABLE, selectable);
    }

    /// Flag the node for redraw and notify its scene.
    pub fn mark_dirty(&self) {
        let scene = {
            let mut state = self.inner.borrow_mut();
            if state.is_destroyed() {
                return;
            }
            state.flags.insert(NodeFlags::DIRTY);
            state.scene.as_ref().and_then(Weak::upgrade)
        };
        if let Some(scene) = scene {
            scene.request_redraw();
        }
    }

    /// Whether the node is attached to a live scene
    pub fn in_scene(&self) -> bool {
        self.inner
            .borrow()
            .scene
            .as_ref()
            .is_some_and(|scene| scene.strong_count() > 0)
    }

    fn widget(&self) -> Option<Rc<RefCell<dyn Widget>>> {
        self.inner.borrow().widget.clone()
    }
}

impl Renderable for Node {
    /// Translate to the node origin, rotate and scale about its center,
    /// compose alpha, paint the widget, then paint children in order.
    fn render(&self, surface: &mut dyn Surface) {
        let (x, y, width, height, rotation, scale_x, scale_y, alpha, children) = {
            let state = self.inner.borrow();
            if state.is_destroyed()
                || !state.flags.contains(NodeFlags::VISIBLE)
                || state.alpha <= 0.0
            {
                return;
            }
            (
                state.x,
                state.y,
                state.width,
                state.height,
                state.rotation,
                state.scale_x,
                state.scale_y,
                state.alpha,
                state.children.clone(),
            )
        };
        let (cx, cy) = (width / 2.0, height / 2.0);

        surface.save();
        surface.translate(x, y);
        if rotation != 0.0 {
            surface.translate(cx, cy);
            surface.rotate(rotation);
            surface.translate(-cx, -cy);
        }
        if scale_x != 1.0 || scale_y != 1.0 {
            surface.translate(cx, cy);
            surface.scale(scale_x, scale_y);
            surface.translate(-cx, -cy);
        }
        surface.set_alpha(surface.alpha() * alpha);

        if let Some(widget) = self.widget() {
            match widget.try_borrow() {
                Ok(widget) => widget.render_self(self, surface),
                Err(_) => log::warn!("skipping render of busy widget {}", self.id()),
            }
        }
        for child in &children {
            child.render(surface);
        }

        surface.restore();
        self.inner.borrow_mut().flags.remove(NodeFlags::DIRTY);
    }
}

impl Updatable for Node {
    fn update(&self, dt: f32) {
        if self.is_destroyed() {
            return;
        }
        if let Some(widget) = self.widget() {
            match widget.try_borrow_mut() {
                Ok(mut widget) => widget.on_update(self, dt),
                Err(_) => log::warn!("skipping update of busy widget {}", self.id()),
            }
        }
        let children = self.inner.borrow().children.clone();
        for child in &children {
            child.update(dt);
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(state) => f
                .debug_struct("Node")
                .field("id", &state.id)
                .field("kind", &state.kind)
                .field("flags", &state.flags)
                .field("children", &state.children.len())
                .finish(),
            Err(_) => f.debug_struct("Node").finish_non_exhaustive(),
        }
    }
}

impl fmt::Debug for WeakNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakNode")
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::render::TransformStack;
    use crate::test_support::test_scheduler;
    use crate::transform::Transform;

    fn node(config: NodeConfig) -> Node {
        let (scheduler, _, _) = test_scheduler();
        Node::new(config.scheduler(scheduler))
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = node(NodeConfig::new());
        let b = node(NodeConfig::new());
        assert_ne!(a.id(), b.id());
        assert!(a.id().as_str().starts_with("node-"));

        let named = node(NodeConfig::new().id("ok-button"));
        assert_eq!(named.id().to_string(), "ok-button");
    }

    #[test]
    fn test_properties() {
        let n = node(NodeConfig::new().bounds(1.0, 2.0, 30.0, 40.0));
        assert_eq!(n.get("x"), Some(1.0));
        assert_eq!(n.get(Property::Height), Some(40.0));

        assert!(n.set("alpha", 3.0));
        assert_eq!(n.alpha(), 1.0);

        assert_eq!(n.get("progress"), None);
        assert!(!n.set("progress", 0.5));
        n.define_property("progress", 0.0);
        assert!(n.set("progress", 0.5));
        assert_eq!(n.get("progress"), Some(0.5));

        assert!(!n.set(Property::X, f32::NAN));
        assert_eq!(n.x(), 1.0);
    }

    #[test]
    fn test_invalid_config_is_validated() {
        let n = node(NodeConfig::new().size(-5.0, 10.0).alpha(-1.0));
        assert_eq!(n.width(), 0.0);
        assert_eq!(n.alpha(), 0.0);
    }

    struct Probe {
        updates: Rc<Cell<u32>>,
        painted_alpha: Rc<Cell<f32>>,
    }

    impl Widget for Probe {
        fn on_update(&mut self, _node: &Node, _dt: f32) {
            self.updates.set(self.updates.get() + 1);
        }

        fn render_self(&self, _node: &Node, surface: &mut dyn Surface) {
            self.painted_alpha.set(surface.alpha());
        }
    }

    #[test]
    fn test_update_and_render_reach_children() {
        let parent = node(NodeConfig::new().bounds(10.0, 10.0, 100.0, 100.0).alpha(0.5));
        let child = node(NodeConfig::new().bounds(5.0, 5.0, 10.0, 10.0).alpha(0.5));
        let updates = Rc::new(Cell::new(0));
        let painted = Rc::new(Cell::new(0.0));
        child.set_widget(Probe {
            updates: updates.clone(),
            painted_alpha: painted.clone(),
        });
        parent.add_child(&child);

        parent.update(0.016);
        assert_eq!(updates.get(), 1);

        let mut surface = TransformStack::new();
        parent.render(&mut surface);
        assert_eq!(painted.get(), 0.25);
        assert_eq!(surface.depth(), 0);
        assert!(!parent.is_dirty());
        assert!(!child.is_dirty());
    }

    struct TransformProbe {
        seen: Rc<Cell<Option<Transform>>>,
    }

    impl Widget for TransformProbe {
        fn render_self(&self, _node: &Node, surface: &mut dyn Surface) {
            self.seen.set(Some(surface.current_transform()));
        }
    }

    #[test]
    fn test_render_rotates_then_scales_about_center() {
        let n = node(
            NodeConfig::new()
                .bounds(30.0, 10.0, 80.0, 40.0)
                .rotation(0.7)
                .scale(1.5, 0.5),
        );
        let seen = Rc::new(Cell::new(None));
        n.set_widget(TransformProbe { seen: seen.clone() });

        n.render(&mut TransformStack::new());
        let transform = seen.get().expect("widget was painted");

        let local = [(0.0, 0.0), (80.0, 0.0), (80.0, 40.0), (0.0, 40.0)];
        for ((lx, ly), (cx, cy)) in local.into_iter().zip(n.transformed_corners()) {
            let (x, y) = transform.transform_point(lx, ly);
            assert!(
                (x - cx).abs() < 1e-3 && (y - cy).abs() < 1e-3,
                "local ({lx}, {ly}) painted at ({x}, {y}), expected ({cx}, {cy})"
            );
        }
    }

    #[test]
    fn test_invisible_node_is_not_rendered() {
        let n = node(NodeConfig::new().visible(false));
        let painted = Rc::new(Cell::new(-1.0));
        n.set_widget(Probe {
            updates: Rc::new(Cell::new(0)),
            painted_alpha: painted.clone(),
        });
        n.render(&mut TransformStack::new());
        assert_eq!(painted.get(), -1.0);
    }
}
