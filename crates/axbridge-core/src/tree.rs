use serde::Serialize;

use crate::geometry::Rect;

/// Stable identity of a node in the live tree.
///
/// Ids survive unrelated mutations; once a node leaves the tree its id
/// resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeInfo {
    pub min: f32,
    pub max: f32,
    pub current: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionRange {
    pub lower: i32,
    pub upper: i32,
}

/// Point-in-time snapshot of one node's attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInfo {
    pub id: NodeId,
    /// Position among the parent's children; 0 for the root.
    pub index: usize,
    pub class_name: String,
    pub package: String,
    pub text: Option<String>,
    pub hint: Option<String>,
    pub content_desc: Option<String>,
    pub resource_id: Option<String>,
    pub bounds: Rect,
    pub enabled: bool,
    pub checkable: bool,
    pub checked: bool,
    pub clickable: bool,
    pub focusable: bool,
    pub focused: bool,
    pub long_clickable: bool,
    pub scrollable: bool,
    pub selected: bool,
    pub visible: bool,
    pub password: bool,
    pub editable: bool,
    pub selection_start: i32,
    pub selection_end: i32,
    pub range: Option<RangeInfo>,
}

impl NodeInfo {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            id: NodeId(0),
            index: 0,
            class_name: class_name.into(),
            package: String::new(),
            text: None,
            hint: None,
            content_desc: None,
            resource_id: None,
            bounds: Rect::default(),
            enabled: true,
            checkable: false,
            checked: false,
            clickable: false,
            focusable: false,
            focused: false,
            long_clickable: false,
            scrollable: false,
            selected: false,
            visible: true,
            password: false,
            editable: false,
            selection_start: -1,
            selection_end: -1,
            range: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.content_desc = Some(desc.into());
        self
    }

    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn editable(mut self) -> Self {
        self.editable = true;
        self.focusable = true;
        self.clickable = true;
        self
    }

    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Both ends of the text selection, or nothing when either end is unset.
    pub fn selection_range(&self) -> Option<SelectionRange> {
        if self.selection_start < 0 || self.selection_end < 0 {
            return None;
        }
        Some(SelectionRange {
            lower: self.selection_start.min(self.selection_end),
            upper: self.selection_start.max(self.selection_end),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeAction {
    SetText(String),
    ClearText,
    SetProgress(f32),
}

/// The live accessibility tree exposed by the platform.
///
/// The tree is mutated by the app under test at any time; implementations
/// only promise that each call observes some consistent state.
pub trait UiTree: Send + Sync {
    fn root(&self) -> Option<NodeId>;

    /// Current attributes of `id`, or `None` once it left the tree.
    fn node(&self, id: NodeId) -> Option<NodeInfo>;

    fn children(&self, id: NodeId) -> Vec<NodeId>;

    fn parent(&self, id: NodeId) -> Option<NodeId>;

    /// Monotonic count of tree-mutation events observed so far.
    fn generation(&self) -> u64;

    /// Returns false when the target app rejects the action.
    fn perform_action(&self, id: NodeId, action: &NodeAction) -> bool;

    fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }
}

/// Pre-order walk of everything below `scope`, excluding `scope` itself.
pub fn descendants<T: UiTree + ?Sized>(tree: &T, scope: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = tree.children(scope).into_iter().rev().collect();
    while let Some(id) = stack.pop() {
        out.push(id);
        stack.extend(tree.children(id).into_iter().rev());
    }
    out
}

/// Pre-order walk of `scope` and everything below it.
pub fn subtree<T: UiTree + ?Sized>(tree: &T, scope: NodeId) -> Vec<NodeId> {
    let mut out = vec![scope];
    out.extend(descendants(tree, scope));
    out
}
