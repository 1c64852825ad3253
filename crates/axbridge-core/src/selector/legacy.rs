use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::selector::{Pattern, SelectorError, MAX_SELECTOR_DEPTH};
use crate::tree::{descendants, subtree, NodeId, NodeInfo, UiTree};

fn ends_with_instance_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r".*INSTANCE=\d+\]$").expect("valid regex"))
}

/// Replay-based selector.
///
/// A `LegacySelector` is not a handle: every resolution re-evaluates the
/// predicates against the live tree. `instance` picks the n-th match (counted
/// per concrete class when the class is given as a regex) and `index` is a
/// predicate on the node's position in its parent. Once `instance` is bound
/// the selector names exactly one element and must not be re-indexed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacySelector {
    pub text: Option<String>,
    pub text_contains: Option<String>,
    pub text_starts_with: Option<String>,
    pub text_matches: Option<Pattern>,
    pub description: Option<String>,
    pub description_contains: Option<String>,
    pub description_starts_with: Option<String>,
    pub description_matches: Option<Pattern>,
    pub class_name: Option<String>,
    pub class_regex: Option<Pattern>,
    pub resource_id: Option<String>,
    pub resource_id_regex: Option<Pattern>,
    pub package_name: Option<String>,
    pub checkable: Option<bool>,
    pub checked: Option<bool>,
    pub clickable: Option<bool>,
    pub enabled: Option<bool>,
    pub focusable: Option<bool>,
    pub focused: Option<bool>,
    pub long_clickable: Option<bool>,
    pub scrollable: Option<bool>,
    pub selected: Option<bool>,
    pub index: Option<usize>,
    pub instance: Option<usize>,
    pub child: Option<Box<LegacySelector>>,
    pub parent: Option<Box<LegacySelector>>,
}

impl LegacySelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, value: impl Into<String>) -> Self {
        self.text = Some(value.into());
        self
    }

    pub fn text_contains(mut self, value: impl Into<String>) -> Self {
        self.text_contains = Some(value.into());
        self
    }

    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    pub fn class_name(mut self, value: impl Into<String>) -> Self {
        self.class_name = Some(value.into());
        self
    }

    pub fn class_name_matches(mut self, pattern: &str) -> Result<Self, SelectorError> {
        self.class_regex = Some(Pattern::new(pattern)?);
        Ok(self)
    }

    pub fn resource_id(mut self, value: impl Into<String>) -> Self {
        self.resource_id = Some(value.into());
        self
    }

    pub fn package_name(mut self, value: impl Into<String>) -> Self {
        self.package_name = Some(value.into());
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn instance(mut self, instance: usize) -> Self {
        self.instance = Some(instance);
        self
    }

    pub fn child_selector(mut self, child: LegacySelector) -> Self {
        self.child = Some(Box::new(child));
        self
    }

    pub fn from_parent(mut self, parent: LegacySelector) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// True when the string form ends in a literal `INSTANCE=n`, i.e. the
    /// selector was already bound to one element.
    pub fn pins_instance(&self) -> bool {
        ends_with_instance_regex().is_match(&self.to_string())
    }

    /// Longest chain of nested child/parent selectors below this one.
    pub fn nesting_depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 0)];
        while let Some((sel, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            for nested in [&sel.child, &sel.parent].into_iter().flatten() {
                pending.push((nested, depth + 1));
            }
        }
        deepest
    }

    pub fn check_depth(&self) -> Result<(), SelectorError> {
        if self.nesting_depth() > MAX_SELECTOR_DEPTH {
            return Err(SelectorError::TooDeep {
                limit: MAX_SELECTOR_DEPTH,
            });
        }
        Ok(())
    }

    pub fn uses_class_regex(&self) -> bool {
        self.class_regex.is_some()
            || self.child.as_ref().is_some_and(|c| c.uses_class_regex())
            || self.parent.as_ref().is_some_and(|p| p.uses_class_regex())
    }

    /// A copy targeting the n-th match. Rejected once an instance is bound,
    /// since rebinding silently retargets a different element.
    pub fn probe_instance(&self, instance: usize) -> Result<Self, SelectorError> {
        if self.instance.is_some() {
            return Err(SelectorError::SelectorCorruption {
                selector: self.to_string(),
            });
        }
        Ok(self.clone().instance(instance))
    }

    /// A copy restricted to nodes at position `index` in their parent.
    pub fn probe_index(&self, index: usize) -> Result<Self, SelectorError> {
        if self.instance.is_some() || self.index.is_some() {
            return Err(SelectorError::SelectorCorruption {
                selector: self.to_string(),
            });
        }
        Ok(self.clone().index(index))
    }

    pub fn matches_node(&self, info: &NodeInfo) -> bool {
        let text = info.text.as_deref().unwrap_or("");
        let desc = info.content_desc.as_deref().unwrap_or("");
        let res = info.resource_id.as_deref().unwrap_or("");

        let eq = |want: &Option<String>, have: &str| want.as_deref().map_or(true, |w| w == have);
        let contains =
            |want: &Option<String>, have: &str| want.as_deref().map_or(true, |w| have.contains(w));
        let starts =
            |want: &Option<String>, have: &str| want.as_deref().map_or(true, |w| have.starts_with(w));
        let pattern = |want: &Option<Pattern>, have: &str| want.as_ref().map_or(true, |p| p.is_match(have));
        let flag = |want: Option<bool>, have: bool| want.map_or(true, |w| w == have);

        eq(&self.text, text)
            && contains(&self.text_contains, text)
            && starts(&self.text_starts_with, text)
            && pattern(&self.text_matches, text)
            && eq(&self.description, desc)
            && contains(&self.description_contains, desc)
            && starts(&self.description_starts_with, desc)
            && pattern(&self.description_matches, desc)
            && eq(&self.class_name, &info.class_name)
            && pattern(&self.class_regex, &info.class_name)
            && eq(&self.resource_id, res)
            && pattern(&self.resource_id_regex, res)
            && eq(&self.package_name, &info.package)
            && flag(self.checkable, info.checkable)
            && flag(self.checked, info.checked)
            && flag(self.clickable, info.clickable)
            && flag(self.enabled, info.enabled)
            && flag(self.focusable, info.focusable)
            && flag(self.focused, info.focused)
            && flag(self.long_clickable, info.long_clickable)
            && flag(self.scrollable, info.scrollable)
            && flag(self.selected, info.selected)
            && self.index.map_or(true, |i| i == info.index)
    }

    fn candidates<T: UiTree + ?Sized>(&self, tree: &T, scope: Option<NodeId>) -> Vec<NodeInfo> {
        let space = match scope {
            Some(scope) => descendants(tree, scope),
            None => tree.root().map(|r| subtree(tree, r)).unwrap_or_default(),
        };
        space
            .into_iter()
            .filter_map(|id| tree.node(id))
            .filter(|info| self.matches_node(info))
            .collect()
    }

    fn pick_instance(&self, candidates: Vec<NodeInfo>) -> Option<NodeInfo> {
        let Some(instance) = self.instance else {
            return candidates.into_iter().next();
        };
        if self.class_regex.is_none() {
            return candidates.into_iter().nth(instance);
        }
        let mut seen: HashMap<String, usize> = HashMap::new();
        candidates.into_iter().find(|info| {
            let ordinal = seen.entry(info.class_name.clone()).or_insert(0);
            let hit = *ordinal == instance;
            *ordinal += 1;
            hit
        })
    }

    /// Replay the selector: the single node it names right now, if any.
    /// Nothing resolves once nesting passes [`MAX_SELECTOR_DEPTH`].
    pub fn resolve<T: UiTree + ?Sized>(&self, tree: &T, scope: Option<NodeId>) -> Option<NodeId> {
        self.resolve_nested(tree, scope, 0)
    }

    fn resolve_nested<T: UiTree + ?Sized>(
        &self,
        tree: &T,
        scope: Option<NodeId>,
        depth: usize,
    ) -> Option<NodeId> {
        if depth > MAX_SELECTOR_DEPTH {
            warn!(limit = MAX_SELECTOR_DEPTH, "Legacy selector nested too deeply");
            return None;
        }
        let anchor = self.pick_instance(self.candidates(tree, scope))?.id;
        let anchor = match &self.parent {
            Some(parent) => {
                let container = tree.parent(anchor).unwrap_or(anchor);
                parent.resolve_nested(tree, Some(container), depth + 1)?
            }
            None => anchor,
        };
        let found = match &self.child {
            Some(child) => child.resolve_nested(tree, Some(anchor), depth + 1),
            None => Some(anchor),
        };
        debug!(selector = %self, ?scope, ?found, "Resolved legacy selector");
        found
    }

    pub fn exists<T: UiTree + ?Sized>(&self, tree: &T, scope: Option<NodeId>) -> bool {
        self.resolve(tree, scope).is_some()
    }

    /// Describe an existing node as a selector that replays back to it.
    pub fn for_node<T: UiTree + ?Sized>(tree: &T, id: NodeId) -> Option<Self> {
        let info = tree.node(id)?;
        let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);
        let mut sel = LegacySelector::new().class_name(info.class_name.clone());
        sel.text = non_empty(&info.text);
        sel.description = non_empty(&info.content_desc);
        sel.resource_id = non_empty(&info.resource_id);
        if !info.package.is_empty() {
            sel.package_name = Some(info.package.clone());
        }
        let position = sel.candidates(tree, None).iter().position(|n| n.id == id)?;
        Some(sel.instance(position))
    }
}

impl fmt::Display for LegacySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        let strings = [
            ("TEXT", &self.text),
            ("CONTAINS_TEXT", &self.text_contains),
            ("START_TEXT", &self.text_starts_with),
            ("DESCRIPTION", &self.description),
            ("CONTAINS_DESCRIPTION", &self.description_contains),
            ("START_DESCRIPTION", &self.description_starts_with),
            ("CLASS", &self.class_name),
            ("RESOURCE_ID", &self.resource_id),
            ("PACKAGE_NAME", &self.package_name),
        ];
        for (label, value) in strings {
            if let Some(value) = value {
                parts.push(format!("{label}={value}"));
            }
        }
        let patterns = [
            ("PATTERN_TEXT", &self.text_matches),
            ("PATTERN_DESCRIPTION", &self.description_matches),
            ("CLASS_REGEX", &self.class_regex),
            ("RESOURCE_ID_REGEX", &self.resource_id_regex),
        ];
        for (label, value) in patterns {
            if let Some(value) = value {
                parts.push(format!("{label}={value}"));
            }
        }
        let flags = [
            ("CHECKABLE", self.checkable),
            ("CHECKED", self.checked),
            ("CLICKABLE", self.clickable),
            ("ENABLED", self.enabled),
            ("FOCUSABLE", self.focusable),
            ("FOCUSED", self.focused),
            ("LONG_CLICKABLE", self.long_clickable),
            ("SCROLLABLE", self.scrollable),
            ("SELECTED", self.selected),
        ];
        for (label, value) in flags {
            if let Some(value) = value {
                parts.push(format!("{label}={value}"));
            }
        }
        if let Some(index) = self.index {
            parts.push(format!("INDEX={index}"));
        }
        if let Some(child) = &self.child {
            parts.push(format!("CHILD={child}"));
        }
        if let Some(parent) = &self.parent {
            parts.push(format!("PARENT={parent}"));
        }
        if let Some(instance) = self.instance {
            parts.push(format!("INSTANCE={instance}"));
        }
        write!(f, "UiSelector[{}]", parts.join(", "))
    }
}
