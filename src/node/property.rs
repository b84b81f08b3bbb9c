use std::borrow::Cow;
use std::fmt;

/// An animatable numeric property of a node.
///
/// Built-in geometry is always present. `Custom` properties exist only after
/// the widget declares them with [`Node::define_property`](super::Node::define_property).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    X,
    Y,
    Z,
    Width,
    Height,
    /// Radians
    Rotation,
    ScaleX,
    ScaleY,
    /// Opacity in `[0, 1]`
    Alpha,
    Custom(Cow<'static, str>),
}

impl Property {
    pub fn name(&self) -> &str {
        match self {
            Property::X => "x",
            Property::Y => "y",
            Property::Z => "z",
            Property::Width => "width",
            Property::Height => "height",
            Property::Rotation => "rotation",
            Property::ScaleX => "scaleX",
            Property::ScaleY => "scaleY",
            Property::Alpha => "alpha",
            Property::Custom(name) => name,
        }
    }

    fn builtin(name: &str) -> Option<Self> {
        Some(match name {
            "x" => Property::X,
            "y" => Property::Y,
            "z" => Property::Z,
            "width" => Property::Width,
            "height" => Property::Height,
            "rotation" => Property::Rotation,
            "scaleX" => Property::ScaleX,
            "scaleY" => Property::ScaleY,
            "alpha" => Property::Alpha,
            _ => return None,
        })
    }
}

impl From<&'static str> for Property {
    fn from(name: &'static str) -> Self {
        Property::builtin(name).unwrap_or(Property::Custom(Cow::Borrowed(name)))
    }
}

impl From<String> for Property {
    fn from(name: String) -> Self {
        Property::builtin(&name).unwrap_or(Property::Custom(Cow::Owned(name)))
    }
}

impl From<&Property> for Property {
    fn from(property: &Property) -> Self {
        property.clone()
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
