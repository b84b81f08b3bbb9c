use bitflags::bitflags;

bitflags! {
    /// Capability, interaction and lifecycle state of a node.
    ///
    /// Interaction states are independent: a node can be focused and hovered
    /// at the same time.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct NodeFlags: u16 {
        /// Receives routed input at all
        const INTERACTIVE = 1 << 0;
        const DRAGGABLE   = 1 << 1;
        const RESIZABLE   = 1 << 2;
        const FOCUSABLE   = 1 << 3;
        const SELECTABLE  = 1 << 4;

        const HOVERED     = 1 << 5;
        const FOCUSED     = 1 << 6;
        const DRAGGING    = 1 << 7;
        const SELECTED    = 1 << 8;
        const PRESSED     = 1 << 9;
        const DISABLED    = 1 << 10;

        const VISIBLE     = 1 << 11;
        /// Changed since it was last rendered
        const DIRTY       = 1 << 12;
        /// Set once by `destroy`, never cleared
        const DESTROYED   = 1 << 13;

        /// Transient pointer state that disabling a node resets
        const POINTER_STATE = Self::HOVERED.bits() | Self::PRESSED.bits() | Self::DRAGGING.bits();
    }
}
