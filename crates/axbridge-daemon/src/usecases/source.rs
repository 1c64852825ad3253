use std::sync::Arc;

use axbridge_core::{NodeId, NodeInfo, UiTree};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::bridge::AutomationBridge;
use crate::domain::{SourceInput, SourceOutput};
use crate::error::BridgeError;
use crate::repository::SessionRepository;

/// Use case for dumping the current UI hierarchy.
pub trait SourceUseCase: Send + Sync {
    fn execute(&self, input: SourceInput) -> Result<SourceOutput, BridgeError>;
}

pub struct SourceUseCaseImpl<R: SessionRepository> {
    repository: Arc<R>,
    bridge: Arc<AutomationBridge>,
}

impl<R: SessionRepository> SourceUseCaseImpl<R> {
    pub fn new(repository: Arc<R>, bridge: Arc<AutomationBridge>) -> Self {
        Self { repository, bridge }
    }
}

/// Nodes nested deeper than this are dumped without their children.
const MAX_DUMP_DEPTH: usize = 128;

struct DumpBudget {
    max_size: usize,
    used: usize,
    nodes: usize,
    truncated: bool,
    depth_capped: bool,
    skip_unbound: bool,
}

fn node_attributes(info: &NodeInfo) -> Value {
    json!({
        "index": info.index,
        "class": info.class_name,
        "package": info.package,
        "text": info.text_or_empty(),
        "content-desc": info.content_desc.as_deref().unwrap_or(""),
        "resource-id": info.resource_id.as_deref().unwrap_or(""),
        "checkable": info.checkable,
        "checked": info.checked,
        "clickable": info.clickable,
        "enabled": info.enabled,
        "focusable": info.focusable,
        "focused": info.focused,
        "long-clickable": info.long_clickable,
        "password": info.password,
        "scrollable": info.scrollable,
        "selected": info.selected,
        "displayed": info.visible,
        "bounds": info.bounds.to_short_string(),
    })
}

/// Pre-order dump. The root is always emitted; every other node is dropped
/// when it has no on-screen area (if configured) or would overflow the size
/// budget, and the first overflow ends the walk.
fn dump_node(
    tree: &dyn UiTree,
    id: NodeId,
    budget: &mut DumpBudget,
    depth: usize,
) -> Option<Value> {
    let is_root = depth == 0;
    let info = tree.node(id)?;
    if !is_root && budget.skip_unbound && info.bounds.is_empty() {
        return None;
    }
    let mut node = node_attributes(&info);
    let size = node.to_string().len();
    if !is_root && budget.used + size > budget.max_size {
        budget.truncated = true;
        return None;
    }
    budget.used += size;
    budget.nodes += 1;

    let child_ids = tree.children(id);
    if depth >= MAX_DUMP_DEPTH {
        budget.depth_capped |= !child_ids.is_empty();
        return Some(node);
    }
    let mut children = Vec::new();
    for child in child_ids {
        if budget.truncated {
            break;
        }
        if let Some(child) = dump_node(tree, child, budget, depth + 1) {
            children.push(child);
        }
    }
    if !children.is_empty() {
        node["children"] = Value::Array(children);
    }
    Some(node)
}

impl<R: SessionRepository> SourceUseCase for SourceUseCaseImpl<R> {
    fn execute(&self, input: SourceInput) -> Result<SourceOutput, BridgeError> {
        self.repository.resolve(input.session_id.as_deref())?;
        let root = self.bridge.get_root_node()?;
        let registry = self.bridge.registry();
        let mut budget = DumpBudget {
            max_size: registry.xml_dump_max_size(),
            used: 0,
            nodes: 0,
            truncated: false,
            depth_capped: false,
            skip_unbound: registry.xml_dump_skip_unbound(),
        };

        let tree = self.bridge.tree();
        let hierarchy = dump_node(tree.as_ref(), root, &mut budget, 0).ok_or_else(|| {
            BridgeError::BridgeUnavailable {
                reason: "root node disappeared while dumping".to_string(),
            }
        })?;
        if budget.truncated {
            warn!(
                max_size = budget.max_size,
                nodes = budget.nodes,
                "Hierarchy dump truncated at size limit"
            );
        }
        if budget.depth_capped {
            warn!(max_depth = MAX_DUMP_DEPTH, "Hierarchy dump cut at nesting limit");
        }
        debug!(nodes = budget.nodes, bytes = budget.used, "Hierarchy dumped");

        Ok(SourceOutput {
            hierarchy,
            node_count: budget.nodes,
            truncated: budget.truncated || budget.depth_capped,
        })
    }
}
