use std::fmt;

use crate::selector::TextMatch;
use crate::tree::{descendants, subtree, NodeId, NodeInfo, UiTree};

/// Handle-based selector: matched nodes are returned as stable ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FastSelector {
    pub text: Option<TextMatch>,
    pub desc: Option<TextMatch>,
    pub class_name: Option<TextMatch>,
    pub resource_id: Option<TextMatch>,
    pub package: Option<TextMatch>,
    pub checkable: Option<bool>,
    pub checked: Option<bool>,
    pub clickable: Option<bool>,
    pub enabled: Option<bool>,
    pub focusable: Option<bool>,
    pub focused: Option<bool>,
    pub long_clickable: Option<bool>,
    pub scrollable: Option<bool>,
    pub selected: Option<bool>,
    pub has_child: Option<Box<FastSelector>>,
}

impl FastSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, m: TextMatch) -> Self {
        self.text = Some(m);
        self
    }

    pub fn desc(mut self, m: TextMatch) -> Self {
        self.desc = Some(m);
        self
    }

    pub fn class_name(mut self, m: TextMatch) -> Self {
        self.class_name = Some(m);
        self
    }

    pub fn resource_id(mut self, m: TextMatch) -> Self {
        self.resource_id = Some(m);
        self
    }

    pub fn package(mut self, m: TextMatch) -> Self {
        self.package = Some(m);
        self
    }

    pub fn clickable(mut self, value: bool) -> Self {
        self.clickable = Some(value);
        self
    }

    pub fn enabled(mut self, value: bool) -> Self {
        self.enabled = Some(value);
        self
    }

    pub fn has_child(mut self, child: FastSelector) -> Self {
        self.has_child = Some(Box::new(child));
        self
    }

    pub fn matches_node(&self, info: &NodeInfo) -> bool {
        let text_ok = [
            (self.text.as_ref(), info.text.as_deref()),
            (self.desc.as_ref(), info.content_desc.as_deref()),
            (self.class_name.as_ref(), Some(info.class_name.as_str())),
            (self.resource_id.as_ref(), info.resource_id.as_deref()),
            (self.package.as_ref(), Some(info.package.as_str())),
        ]
        .into_iter()
        .all(|(m, value)| m.map_or(true, |m| m.matches(value)));

        let flags_ok = [
            (self.checkable, info.checkable),
            (self.checked, info.checked),
            (self.clickable, info.clickable),
            (self.enabled, info.enabled),
            (self.focusable, info.focusable),
            (self.focused, info.focused),
            (self.long_clickable, info.long_clickable),
            (self.scrollable, info.scrollable),
            (self.selected, info.selected),
        ]
        .into_iter()
        .all(|(want, have)| want.map_or(true, |w| w == have));

        text_ok && flags_ok
    }

    fn matches<T: UiTree + ?Sized>(&self, tree: &T, id: NodeId) -> bool {
        let Some(info) = tree.node(id) else {
            return false;
        };
        if !self.matches_node(&info) {
            return false;
        }
        match &self.has_child {
            Some(child) => tree
                .children(id)
                .into_iter()
                .any(|c| child.matches(tree, c)),
            None => true,
        }
    }

    fn search_space<T: UiTree + ?Sized>(tree: &T, scope: Option<NodeId>) -> Vec<NodeId> {
        match scope {
            Some(scope) => descendants(tree, scope),
            None => tree.root().map(|r| subtree(tree, r)).unwrap_or_default(),
        }
    }

    /// First match in pre-order; below `scope` when given, else the whole tree.
    pub fn find_object<T: UiTree + ?Sized>(&self, tree: &T, scope: Option<NodeId>) -> Option<NodeId> {
        Self::search_space(tree, scope)
            .into_iter()
            .find(|id| self.matches(tree, *id))
    }

    pub fn find_objects<T: UiTree + ?Sized>(&self, tree: &T, scope: Option<NodeId>) -> Vec<NodeId> {
        Self::search_space(tree, scope)
            .into_iter()
            .filter(|id| self.matches(tree, *id))
            .collect()
    }
}

impl fmt::Display for FastSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        let text_fields = [
            ("TEXT", &self.text),
            ("DESC", &self.desc),
            ("CLASS", &self.class_name),
            ("RES", &self.resource_id),
            ("PKG", &self.package),
        ];
        for (label, m) in text_fields {
            if let Some(m) = m {
                parts.push(format!("{label}={m}"));
            }
        }
        let flag_fields = [
            ("CHECKABLE", self.checkable),
            ("CHECKED", self.checked),
            ("CLICKABLE", self.clickable),
            ("ENABLED", self.enabled),
            ("FOCUSABLE", self.focusable),
            ("FOCUSED", self.focused),
            ("LONGCLICKABLE", self.long_clickable),
            ("SCROLLABLE", self.scrollable),
            ("SELECTED", self.selected),
        ];
        for (label, flag) in flag_fields {
            if let Some(flag) = flag {
                parts.push(format!("{label}={flag}"));
            }
        }
        if let Some(child) = &self.has_child {
            parts.push(format!("CHILD={child}"));
        }
        write!(f, "By[{}]", parts.join(", "))
    }
}
