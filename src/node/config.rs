use std::borrow::Cow;
use std::time::Duration;

use crate::animation::AnimationScheduler;
use crate::error::ErrorHandler;

use super::NodeId;

/// Window within which a second click counts as a double click
pub const DEFAULT_DOUBLE_CLICK: Duration = Duration::from_millis(500);

/// Construction options for a [`Node`](super::Node).
///
/// ```
/// use trellis::{Node, NodeConfig};
///
/// let button = Node::new(
///     NodeConfig::new()
///         .kind("button")
///         .bounds(10.0, 10.0, 120.0, 32.0)
///         .interactive(true)
///         .focusable(true),
/// );
/// assert!(button.is_interactive());
/// ```
#[derive(Clone)]
pub struct NodeConfig {
    /// Generated when `None`
    pub id: Option<NodeId>,
    pub kind: Cow<'static, str>,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub alpha: f32,
    pub visible: bool,
    pub interactive: bool,
    pub draggable: bool,
    pub resizable: bool,
    pub focusable: bool,
    pub selectable: bool,
    pub disabled: bool,
    pub double_click_threshold: Duration,
    /// Defaults to [`AnimationScheduler::global`]
    pub scheduler: Option<AnimationScheduler>,
    /// Defaults to [`default_error_handler`](crate::error::default_error_handler)
    pub error_handler: Option<ErrorHandler>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            id: None,
            kind: Cow::Borrowed("node"),
            x: 0.0,
            y: 0.0,
            z: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            alpha: 1.0,
            visible: true,
            interactive: false,
            draggable: false,
            resizable: false,
            focusable: false,
            selectable: false,
            disabled: false,
            double_click_threshold: DEFAULT_DOUBLE_CLICK,
            scheduler: None,
            error_handler: None,
        }
    }
}

impl NodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(NodeId::new(id));
        self
    }

    /// Class-like tag used by `find_children_by_kind`
    pub fn kind(mut self, kind: impl Into<Cow<'static, str>>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn bounds(self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.position(x, y).size(width, height)
    }

    pub fn z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }

    pub fn rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    pub fn scale(mut self, scale_x: f32, scale_y: f32) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn double_click_threshold(mut self, threshold: Duration) -> Self {
        self.double_click_threshold = threshold;
        self
    }

    pub fn scheduler(mut self, scheduler: AnimationScheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn error_handler(mut self, handler: ErrorHandler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// Replace values a node cannot hold: non-finite geometry falls back to
    /// the default, negative sizes become 0 and alpha is clamped to `[0, 1]`.
    pub fn validated(mut self) -> Self {
        let defaults = NodeConfig::default();
        let fields = [
            ("x", &mut self.x, defaults.x),
            ("y", &mut self.y, defaults.y),
            ("z", &mut self.z, defaults.z),
            ("width", &mut self.width, defaults.width),
            ("height", &mut self.height, defaults.height),
            ("rotation", &mut self.rotation, defaults.rotation),
            ("scaleX", &mut self.scale_x, defaults.scale_x),
            ("scaleY", &mut self.scale_y, defaults.scale_y),
            ("alpha", &mut self.alpha, defaults.alpha),
        ];
        for (name, value, default) in fields {
            if !value.is_finite() {
                log::warn!("node config: {} is {}, using {}", name, value, default);
                *value = default;
            }
        }

        if self.width < 0.0 || self.height < 0.0 {
            log::warn!(
                "node config: negative size {}x{} clamped to 0",
                self.width,
                self.height
            );
            self.width = self.width.max(0.0);
            self.height = self.height.max(0.0);
        }

        if !(0.0..=1.0).contains(&self.alpha) {
            log::warn!("node config: alpha {} clamped to [0, 1]", self.alpha);
            self.alpha = self.alpha.clamp(0.0, 1.0);
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NodeConfig::default();
        assert!(config.visible);
        assert!(!config.interactive);
        assert_eq!(config.alpha, 1.0);
        assert_eq!(config.scale_x, 1.0);
        assert_eq!(config.double_click_threshold, Duration::from_millis(500));
    }

    #[test]
    fn test_validated_fixes_bad_values() {
        let config = NodeConfig::new()
            .position(f32::NAN, 4.0)
            .size(-10.0, 20.0)
            .scale(f32::INFINITY, 2.0)
            .alpha(1.5)
            .validated();

        assert_eq!(config.x, 0.0);
        assert_eq!(config.y, 4.0);
        assert_eq!(config.width, 0.0);
        assert_eq!(config.height, 20.0);
        assert_eq!(config.scale_x, 1.0);
        assert_eq!(config.scale_y, 2.0);
        assert_eq!(config.alpha, 1.0);
    }

    #[test]
    fn test_validated_keeps_good_values() {
        let config = NodeConfig::new()
            .bounds(1.0, 2.0, 3.0, 4.0)
            .alpha(0.25)
            .validated();
        assert_eq!((config.x, config.y), (1.0, 2.0));
        assert_eq!((config.width, config.height), (3.0, 4.0));
        assert_eq!(config.alpha, 0.25);
    }
}
