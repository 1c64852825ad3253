use axbridge_core::{descendants, Attribute, NodeInfo, UiTree};
use serde_json::json;

use super::{ElementHandle, ElementKind};
use crate::bridge::AutomationBridge;
use crate::error::BridgeError;

fn flag(value: bool) -> Option<String> {
    Some(value.to_string())
}

impl ElementHandle {
    /// Read one attribute by client-facing name. Absent values are `None`.
    pub fn get_attribute(
        &self,
        bridge: &AutomationBridge,
        name: &str,
    ) -> Result<Option<String>, BridgeError> {
        let attribute = Attribute::from_name(name).ok_or_else(|| BridgeError::UnsupportedAttribute {
            name: name.to_string(),
        })?;
        if attribute == Attribute::Displayed {
            return self.displayed(bridge).map(flag);
        }
        let info = self.info(bridge)?;
        let value = match attribute {
            Attribute::Text => Some(info.text_or_empty().to_string()),
            Attribute::ContentDescription => info.content_desc,
            Attribute::ClassName => Some(info.class_name),
            Attribute::ResourceId => info.resource_id,
            Attribute::Bounds => Some(info.bounds.to_short_string()),
            Attribute::Enabled => flag(info.enabled),
            Attribute::Checkable => flag(info.checkable),
            Attribute::Checked => flag(info.checked),
            Attribute::Clickable => flag(info.clickable),
            Attribute::Focusable => flag(info.focusable),
            Attribute::Focused => flag(info.focused),
            Attribute::LongClickable => flag(info.long_clickable),
            Attribute::Scrollable => flag(info.scrollable),
            Attribute::Selected => flag(info.selected),
            Attribute::Password => flag(info.password),
            Attribute::SelectionStart => info.selection_range().map(|r| r.lower.to_string()),
            Attribute::SelectionEnd => info.selection_range().map(|r| r.upper.to_string()),
            Attribute::Package => Some(info.package),
            Attribute::ContentSize => Some(content_size(bridge.tree().as_ref(), &info)?),
            Attribute::Displayed => None,
        };
        Ok(value)
    }

    /// Visible on screen. A legacy handle whose selector no longer matches
    /// reads as not displayed rather than failing.
    fn displayed(&self, bridge: &AutomationBridge) -> Result<bool, BridgeError> {
        match &self.kind {
            ElementKind::Legacy(legacy) => {
                let tree = bridge.tree();
                Ok(legacy
                    .resolve(tree.as_ref())
                    .and_then(|node| tree.node(node))
                    .is_some_and(|info| info.visible))
            }
            ElementKind::Fast(_) => Ok(self.info(bridge)?.visible),
        }
    }
}

/// Size of a scrollable container's content, as JSON.
fn content_size(tree: &dyn UiTree, info: &NodeInfo) -> Result<String, BridgeError> {
    if !info.scrollable {
        return Err(BridgeError::InvalidState {
            message: format!("{} is not scrollable", info.class_name),
        });
    }
    let content_bottom = descendants(tree, info.id)
        .into_iter()
        .filter_map(|id| tree.node(id))
        .filter(|child| !child.bounds.is_empty())
        .map(|child| child.bounds.bottom)
        .max()
        .unwrap_or(info.bounds.bottom);
    let content_height = (content_bottom - info.bounds.top).max(info.bounds.height());
    let size = json!({
        "width": info.bounds.width(),
        "height": info.bounds.height(),
        "top": info.bounds.top,
        "left": info.bounds.left,
        "scrollableOffset": content_height - info.bounds.height(),
    });
    Ok(size.to_string())
}
