//! Element handles over the two query backends.
//!
//! A [`FastElement`] is bound to one tree node at resolution time and goes
//! stale once that node leaves the tree. A [`LegacyElement`] is a selector
//! chain that is replayed against the live tree on every operation, so it
//! follows whatever node currently matches. Both expose the same operation
//! set through [`ElementHandle`].

mod attributes;
mod gestures;

use axbridge_core::{
    LegacySelector, NodeAction, NodeId, NodeInfo, Point, Rect, Selector, UiTree,
};
use tracing::debug;

use crate::bridge::AutomationBridge;
use crate::error::BridgeError;
use crate::geometry::GeometryHelper;
use crate::resolver::ElementResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastElement {
    node: NodeId,
}

impl FastElement {
    pub fn new(node: NodeId) -> Self {
        Self { node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}

/// A selector replayed inside the node its parent chain currently resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyElement {
    selector: LegacySelector,
    parent: Option<Box<LegacyElement>>,
}

impl LegacyElement {
    pub fn new(selector: LegacySelector) -> Self {
        Self {
            selector,
            parent: None,
        }
    }

    pub fn within(selector: LegacySelector, parent: LegacyElement) -> Self {
        Self {
            selector,
            parent: Some(Box::new(parent)),
        }
    }

    pub fn selector(&self) -> &LegacySelector {
        &self.selector
    }

    pub fn resolve<T: UiTree + ?Sized>(&self, tree: &T) -> Option<NodeId> {
        let scope = match &self.parent {
            Some(parent) => Some(parent.resolve(tree)?),
            None => None,
        };
        self.selector.resolve(tree, scope)
    }

    pub fn exists<T: UiTree + ?Sized>(&self, tree: &T) -> bool {
        self.resolve(tree).is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Fast(FastElement),
    Legacy(LegacyElement),
}

/// A published element. The id is assigned by the session's known-elements
/// registry when the handle is stored.
#[derive(Debug, Clone)]
pub struct ElementHandle {
    id: String,
    kind: ElementKind,
    selector: Selector,
    single_match: bool,
    context_id: Option<String>,
}

impl ElementHandle {
    pub fn new(kind: ElementKind, selector: Selector, single_match: bool) -> Self {
        Self {
            id: String::new(),
            kind,
            selector,
            single_match,
            context_id: None,
        }
    }

    pub fn with_context(mut self, context_id: Option<String>) -> Self {
        self.context_id = context_id;
        self
    }

    pub(crate) fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Same node (fast) or same replayed selector chain (legacy), found in
    /// the same context.
    pub fn same_target(&self, other: &ElementHandle) -> bool {
        self.kind == other.kind && self.context_id == other.context_id
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn is_single_match(&self) -> bool {
        self.single_match
    }

    pub fn context_id(&self) -> Option<&str> {
        self.context_id.as_deref()
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self.kind, ElementKind::Legacy(_))
    }

    fn target(&self) -> String {
        if self.id.is_empty() {
            self.selector.to_string()
        } else {
            format!("{} ({})", self.id, self.selector)
        }
    }

    /// The tree node this handle refers to right now.
    pub fn native_node(&self, bridge: &AutomationBridge) -> Result<NodeId, BridgeError> {
        let tree = bridge.tree();
        match &self.kind {
            ElementKind::Fast(fast) if tree.contains(fast.node) => Ok(fast.node),
            ElementKind::Fast(_) => Err(BridgeError::StaleElement {
                element_id: self.id.clone(),
            }),
            ElementKind::Legacy(legacy) => {
                legacy
                    .resolve(tree.as_ref())
                    .ok_or_else(|| BridgeError::ElementNotFound {
                        target: self.target(),
                    })
            }
        }
    }

    /// Fresh snapshot of the node's attributes.
    pub fn info(&self, bridge: &AutomationBridge) -> Result<NodeInfo, BridgeError> {
        let node = self.native_node(bridge)?;
        bridge
            .tree()
            .node(node)
            .ok_or_else(|| BridgeError::StaleElement {
                element_id: self.id.clone(),
            })
    }

    /// This handle expressed in the legacy grammar, for replaying legacy
    /// selectors underneath it.
    pub(crate) fn legacy_anchor(
        &self,
        bridge: &AutomationBridge,
    ) -> Result<LegacyElement, BridgeError> {
        match &self.kind {
            ElementKind::Legacy(legacy) => Ok(legacy.clone()),
            ElementKind::Fast(_) => {
                let node = self.native_node(bridge)?;
                let tree = bridge.tree();
                let selector = LegacySelector::for_node(tree.as_ref(), node).ok_or_else(|| {
                    BridgeError::StaleElement {
                        element_id: self.id.clone(),
                    }
                })?;
                debug!(element_id = %self.id, %selector, "Re-homed fast element as legacy selector");
                Ok(LegacyElement::new(selector))
            }
        }
    }

    pub fn exists(&self, bridge: &AutomationBridge) -> bool {
        self.native_node(bridge).is_ok()
    }

    pub fn get_text(&self, bridge: &AutomationBridge) -> Result<String, BridgeError> {
        Ok(self.info(bridge)?.text_or_empty().to_string())
    }

    pub fn get_bounds(&self, bridge: &AutomationBridge) -> Result<Rect, BridgeError> {
        Ok(self.info(bridge)?.bounds)
    }

    /// `offset` inside the element, relative to its top-left corner.
    pub fn get_absolute_position(
        &self,
        bridge: &AutomationBridge,
        offset: Point,
    ) -> Result<Point, BridgeError> {
        GeometryHelper::absolute_position_in(self.get_bounds(bridge)?, offset)
    }

    /// Replace the element text. `Ok(false)` when the app rejected it.
    pub fn set_text(&self, bridge: &AutomationBridge, text: &str) -> Result<bool, BridgeError> {
        let node = self.native_node(bridge)?;
        Ok(bridge
            .tree()
            .perform_action(node, &NodeAction::SetText(text.to_string())))
    }

    /// Empty the field. Fast handles use the clear action, legacy handles
    /// replace the text with an empty string.
    pub fn clear(&self, bridge: &AutomationBridge) -> Result<bool, BridgeError> {
        let node = self.native_node(bridge)?;
        let action = match self.kind {
            ElementKind::Fast(_) => NodeAction::ClearText,
            ElementKind::Legacy(_) => NodeAction::SetText(String::new()),
        };
        Ok(bridge.tree().perform_action(node, &action))
    }

    pub fn can_set_progress(&self, bridge: &AutomationBridge) -> Result<bool, BridgeError> {
        Ok(self.info(bridge)?.range.is_some())
    }

    pub fn set_progress(&self, bridge: &AutomationBridge, value: f32) -> Result<bool, BridgeError> {
        let info = self.info(bridge)?;
        if info.range.is_none() {
            return Err(BridgeError::InvalidState {
                message: format!("{} does not accept a progress value", info.class_name),
            });
        }
        if !value.is_finite() {
            return Err(BridgeError::InvalidArgument(format!(
                "progress value {value} is not a number"
            )));
        }
        Ok(bridge
            .tree()
            .perform_action(info.id, &NodeAction::SetProgress(value)))
    }

    pub fn get_child(
        &self,
        bridge: &AutomationBridge,
        selector: &Selector,
    ) -> Result<Option<ElementHandle>, BridgeError> {
        ElementResolver::new(bridge).find(selector, Some(self))
    }

    pub fn get_children(
        &self,
        bridge: &AutomationBridge,
        selector: &Selector,
    ) -> Result<Vec<ElementHandle>, BridgeError> {
        ElementResolver::new(bridge).find_all(selector, Some(self))
    }
}
