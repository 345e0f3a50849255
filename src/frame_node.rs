use crate::event_hub::GestureEventHub;
use crate::geometry_node::GeometryNode;
use crate::layout::LayoutProperty;
use crate::pattern::Pattern;
use crate::render_context::RenderContext;
use core::fmt;
use core::ops;

/// A unique identifier for a frame node.
///
/// Ids are handed out sequentially by the [`FrameTree`](crate::FrameTree) and never reused, so a
/// stale id simply fails to resolve.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub i32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element kinds.
pub mod tags {
    pub const ROOT: &str = "root";
    pub const STAGE: &str = "stage";
    pub const PAGE: &str = "page";
    pub const TEXT: &str = "Text";
    pub const KEYBOARD: &str = "Keyboard";
    pub const WINDOW_SCENE: &str = "WindowScene";
    pub const SELECT_OVERLAY: &str = "SelectOverlay";
    pub const SELECT_MENU: &str = "SelectMenu";
    pub const SELECT_MENU_BUTTON: &str = "SelectMenuButton";
    pub const SELECT_EXTENSION_MENU: &str = "SelectExtensionMenu";
    pub const MENU_OPTION: &str = "MenuOption";
    pub const CUSTOM_MENU: &str = "CustomMenu";
}

/// What needs to be recomputed after a property change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropertyChangeFlag(u32);

impl PropertyChangeFlag {
    pub const NONE: PropertyChangeFlag = PropertyChangeFlag(0);
    /// Repaint only; geometry is unchanged.
    pub const RENDER: PropertyChangeFlag = PropertyChangeFlag(1);
    /// Remeasure this node with its previous constraint.
    pub const MEASURE_SELF: PropertyChangeFlag = PropertyChangeFlag(1 << 1);
    /// Remeasure this node and its parent.
    pub const MEASURE: PropertyChangeFlag = PropertyChangeFlag(1 << 2);
    /// Reposition children without remeasuring.
    pub const LAYOUT: PropertyChangeFlag = PropertyChangeFlag(1 << 3);

    pub fn contains(self, other: PropertyChangeFlag) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn needs_layout(self) -> bool {
        self.contains(PropertyChangeFlag::MEASURE_SELF)
            || self.contains(PropertyChangeFlag::MEASURE)
            || self.contains(PropertyChangeFlag::LAYOUT)
    }
}

impl ops::BitOr for PropertyChangeFlag {
    type Output = PropertyChangeFlag;
    fn bitor(self, rhs: PropertyChangeFlag) -> PropertyChangeFlag {
        PropertyChangeFlag(self.0 | rhs.0)
    }
}

/// One visual element.
///
/// A frame node exclusively owns its geometry, layout property, gesture hub, and pattern. Its
/// render context is shared with the node’s peer in the render tree.
pub struct FrameNode {
    id: NodeId,
    tag: &'static str,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    geometry: GeometryNode,
    layout_property: LayoutProperty,
    event_hub: GestureEventHub,
    pub(crate) pattern: Option<Box<dyn Pattern>>,
    render_context: RenderContext,
    pub(crate) is_layout_dirty_marked: bool,
    pub(crate) is_render_dirty_marked: bool,
    is_active: bool,
    is_first_building: bool,
    /// True while the node is mirrored in the render tree.
    pub(crate) on_main_tree: bool,
    pub(crate) destroy_callbacks: Vec<Box<dyn FnOnce()>>,
}

impl FrameNode {
    pub(crate) fn new(
        id: NodeId,
        tag: &'static str,
        pattern: Option<Box<dyn Pattern>>,
    ) -> FrameNode {
        FrameNode {
            id,
            tag,
            parent: None,
            children: Vec::new(),
            geometry: GeometryNode::new(),
            layout_property: LayoutProperty::default(),
            event_hub: GestureEventHub::default(),
            pattern,
            render_context: RenderContext::new(),
            is_layout_dirty_marked: false,
            is_render_dirty_marked: false,
            is_active: true,
            is_first_building: true,
            on_main_tree: false,
            destroy_callbacks: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn geometry_node(&self) -> &GeometryNode {
        &self.geometry
    }

    pub fn geometry_node_mut(&mut self) -> &mut GeometryNode {
        &mut self.geometry
    }

    pub fn layout_property(&self) -> &LayoutProperty {
        &self.layout_property
    }

    pub fn layout_property_mut(&mut self) -> &mut LayoutProperty {
        &mut self.layout_property
    }

    pub fn event_hub(&self) -> &GestureEventHub {
        &self.event_hub
    }

    pub fn event_hub_mut(&mut self) -> &mut GestureEventHub {
        &mut self.event_hub
    }

    pub fn render_context(&self) -> &RenderContext {
        &self.render_context
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    pub fn is_first_building(&self) -> bool {
        self.is_first_building
    }

    pub(crate) fn mark_built(&mut self) {
        self.is_first_building = false;
    }

    pub fn is_layout_dirty_marked(&self) -> bool {
        self.is_layout_dirty_marked
    }

    pub fn is_render_dirty_marked(&self) -> bool {
        self.is_render_dirty_marked
    }

    pub fn is_on_main_tree(&self) -> bool {
        self.on_main_tree
    }

    /// Returns the pattern if it is of type `P`.
    ///
    /// Returns `None` while the pattern is lent out to one of its own callbacks.
    pub fn pattern<P: Pattern>(&self) -> Option<&P> {
        self.pattern.as_ref()?.as_any().downcast_ref::<P>()
    }

    pub fn pattern_mut<P: Pattern>(&mut self) -> Option<&mut P> {
        self.pattern.as_mut()?.as_any_mut().downcast_mut::<P>()
    }

    /// Enqueues a callback that runs right before the node is destroyed.
    pub fn push_destroy_callback<F: 'static + FnOnce()>(&mut self, callback: F) {
        self.destroy_callbacks.push(Box::new(callback));
    }
}

impl fmt::Debug for FrameNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FrameNode")
            .field("id", &self.id)
            .field("tag", &self.tag)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("frame", &self.geometry.frame_rect())
            .field("active", &self.is_active)
            .field("layout_dirty", &self.is_layout_dirty_marked)
            .field("render_dirty", &self.is_render_dirty_marked)
            .finish()
    }
}

#[test]
fn test_change_flags() {
    let flag = PropertyChangeFlag::RENDER | PropertyChangeFlag::MEASURE_SELF;
    assert!(flag.contains(PropertyChangeFlag::RENDER));
    assert!(flag.needs_layout());
    assert!(!PropertyChangeFlag::RENDER.needs_layout());
    assert!(!flag.contains(PropertyChangeFlag::NONE));
}
