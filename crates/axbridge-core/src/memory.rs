use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use axbridge_common::{rwlock_read_or_recover, rwlock_write_or_recover};
use tracing::debug;

use crate::tree::{NodeAction, NodeId, NodeInfo, UiTree};

struct Entry {
    info: NodeInfo,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Default)]
struct Inner {
    nodes: HashMap<NodeId, Entry>,
    root: Option<NodeId>,
    next_id: u64,
}

impl Inner {
    fn allocate(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }

    fn drop_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(entry) = self.nodes.remove(&current) {
                stack.extend(entry.children);
            }
        }
    }
}

/// Thread-safe in-memory [`UiTree`].
///
/// Every structural or attribute mutation bumps the generation counter, which
/// is what idle detection watches. A churning tree reports a fresh mutation on
/// every generation read and therefore never settles.
#[derive(Default)]
pub struct MemoryTree {
    inner: RwLock<Inner>,
    generation: AtomicU64,
    churning: AtomicBool,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole tree with a single root node.
    pub fn set_root(&self, info: NodeInfo) -> NodeId {
        let mut inner = rwlock_write_or_recover(&self.inner);
        inner.nodes.clear();
        let id = inner.allocate();
        let mut info = info;
        info.id = id;
        info.index = 0;
        inner.nodes.insert(
            id,
            Entry {
                info,
                parent: None,
                children: Vec::new(),
            },
        );
        inner.root = Some(id);
        drop(inner);
        self.touch();
        id
    }

    /// Append `info` as the last child of `parent`.
    pub fn add_child(&self, parent: NodeId, info: NodeInfo) -> Option<NodeId> {
        let mut inner = rwlock_write_or_recover(&self.inner);
        if !inner.nodes.contains_key(&parent) {
            return None;
        }
        let id = inner.allocate();
        let mut info = info;
        info.id = id;
        inner.nodes.insert(
            id,
            Entry {
                info,
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        if let Some(entry) = inner.nodes.get_mut(&parent) {
            entry.children.push(id);
        }
        drop(inner);
        self.touch();
        Some(id)
    }

    /// Detach `id` and everything below it.
    pub fn remove(&self, id: NodeId) -> bool {
        let mut inner = rwlock_write_or_recover(&self.inner);
        let Some(parent) = inner.nodes.get(&id).map(|e| e.parent) else {
            return false;
        };
        match parent {
            Some(parent) => {
                if let Some(entry) = inner.nodes.get_mut(&parent) {
                    entry.children.retain(|c| *c != id);
                }
            }
            None => inner.root = None,
        }
        inner.drop_subtree(id);
        drop(inner);
        self.touch();
        true
    }

    pub fn update<F>(&self, id: NodeId, f: F) -> bool
    where
        F: FnOnce(&mut NodeInfo),
    {
        let mut inner = rwlock_write_or_recover(&self.inner);
        let Some(entry) = inner.nodes.get_mut(&id) else {
            return false;
        };
        f(&mut entry.info);
        drop(inner);
        self.touch();
        true
    }

    pub fn clear(&self) {
        let mut inner = rwlock_write_or_recover(&self.inner);
        inner.nodes.clear();
        inner.root = None;
        drop(inner);
        self.touch();
    }

    /// Record a mutation event without changing any node.
    pub fn touch(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn set_churning(&self, churning: bool) {
        self.churning.store(churning, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        rwlock_read_or_recover(&self.inner).nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn write_text(info: &mut NodeInfo, text: String) {
    if text.is_empty() {
        info.text = info.hint.clone();
    } else {
        info.text = Some(text);
    }
    info.selection_start = -1;
    info.selection_end = -1;
}

impl UiTree for MemoryTree {
    fn root(&self) -> Option<NodeId> {
        rwlock_read_or_recover(&self.inner).root
    }

    fn node(&self, id: NodeId) -> Option<NodeInfo> {
        let inner = rwlock_read_or_recover(&self.inner);
        let entry = inner.nodes.get(&id)?;
        let mut info = entry.info.clone();
        info.index = entry
            .parent
            .and_then(|p| inner.nodes.get(&p))
            .and_then(|p| p.children.iter().position(|c| *c == id))
            .unwrap_or(0);
        Some(info)
    }

    fn children(&self, id: NodeId) -> Vec<NodeId> {
        rwlock_read_or_recover(&self.inner)
            .nodes
            .get(&id)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        rwlock_read_or_recover(&self.inner)
            .nodes
            .get(&id)
            .and_then(|e| e.parent)
    }

    fn generation(&self) -> u64 {
        if self.churning.load(Ordering::SeqCst) {
            return self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        }
        self.generation.load(Ordering::SeqCst)
    }

    fn perform_action(&self, id: NodeId, action: &NodeAction) -> bool {
        let mut inner = rwlock_write_or_recover(&self.inner);
        let Some(entry) = inner.nodes.get_mut(&id) else {
            return false;
        };
        let info = &mut entry.info;
        let accepted = match action {
            NodeAction::SetText(text) if info.editable && info.enabled => {
                write_text(info, text.clone());
                true
            }
            NodeAction::ClearText if info.editable && info.enabled => {
                write_text(info, String::new());
                true
            }
            NodeAction::SetProgress(value) => match info.range.as_mut() {
                Some(range) if info.enabled => {
                    range.current = value.clamp(range.min, range.max);
                    true
                }
                _ => false,
            },
            _ => false,
        };
        drop(inner);
        if accepted {
            self.touch();
        } else {
            debug!(node = id.0, ?action, "Action rejected");
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::tree::{descendants, RangeInfo};

    fn sample() -> (MemoryTree, NodeId, NodeId, NodeId) {
        let tree = MemoryTree::new();
        let root = tree.set_root(NodeInfo::new("android.widget.FrameLayout"));
        let a = tree
            .add_child(root, NodeInfo::new("android.widget.TextView").with_text("a"))
            .unwrap();
        let b = tree
            .add_child(
                root,
                NodeInfo::new("android.widget.EditText")
                    .with_hint("Search")
                    .editable(),
            )
            .unwrap();
        (tree, root, a, b)
    }

    #[test]
    fn test_index_is_position_in_parent() {
        let (tree, root, a, b) = sample();
        assert_eq!(tree.node(root).unwrap().index, 0);
        assert_eq!(tree.node(a).unwrap().index, 0);
        assert_eq!(tree.node(b).unwrap().index, 1);
    }

    #[test]
    fn test_remove_drops_subtree_and_bumps_generation() {
        let (tree, root, a, _) = sample();
        let nested = tree.add_child(a, NodeInfo::new("x")).unwrap();
        let before = tree.generation();

        assert!(tree.remove(a));
        assert!(tree.generation() > before);
        assert!(tree.node(a).is_none());
        assert!(tree.node(nested).is_none());
        assert_eq!(tree.children(root).len(), 1);
        assert!(!tree.remove(a));
    }

    #[test]
    fn test_set_text_requires_editable() {
        let (tree, _, a, b) = sample();
        assert!(!tree.perform_action(a, &NodeAction::SetText("x".into())));
        assert!(tree.perform_action(b, &NodeAction::SetText("hello".into())));
        assert_eq!(tree.node(b).unwrap().text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_clear_falls_back_to_hint() {
        let (tree, _, _, b) = sample();
        tree.perform_action(b, &NodeAction::SetText("hello".into()));
        assert!(tree.perform_action(b, &NodeAction::ClearText));
        assert_eq!(tree.node(b).unwrap().text.as_deref(), Some("Search"));

        tree.perform_action(b, &NodeAction::SetText("again".into()));
        assert!(tree.perform_action(b, &NodeAction::SetText(String::new())));
        assert_eq!(tree.node(b).unwrap().text.as_deref(), Some("Search"));
    }

    #[test]
    fn test_set_progress_clamps_to_range() {
        let (tree, root, _, _) = sample();
        let seek = tree
            .add_child(root, NodeInfo::new("android.widget.SeekBar"))
            .unwrap();
        assert!(!tree.perform_action(seek, &NodeAction::SetProgress(3.0)));

        tree.update(seek, |n| {
            n.range = Some(RangeInfo {
                min: 0.0,
                max: 10.0,
                current: 0.0,
            })
        });
        assert!(tree.perform_action(seek, &NodeAction::SetProgress(42.0)));
        assert_eq!(tree.node(seek).unwrap().range.unwrap().current, 10.0);
    }

    #[test]
    fn test_churning_tree_reports_new_generation_each_read() {
        let (tree, _, _, _) = sample();
        tree.set_churning(true);
        let first = tree.generation();
        assert_ne!(first, tree.generation());
        tree.set_churning(false);
        assert_eq!(tree.generation(), tree.generation());
    }

    #[test]
    fn test_descendants_preorder() {
        let (tree, root, a, b) = sample();
        let nested = tree
            .add_child(a, NodeInfo::new("x").with_bounds(Rect::new(0, 0, 1, 1)))
            .unwrap();
        assert_eq!(descendants(&tree, root), vec![a, nested, b]);
    }
}
