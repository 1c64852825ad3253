//! Selector resolution into element handles.
//!
//! Single resolution delegates to the selector's own backend. When the scope
//! handle belongs to the other backend, the scope is first re-homed through
//! its tree node. Legacy selectors have no native "all matches" query, so
//! `find_all` probes the n-th match until one is missing.

use axbridge_core::{LegacySelector, NodeId, Selector};
use tracing::{debug, warn};

use crate::bridge::AutomationBridge;
use crate::element::{ElementHandle, ElementKind, FastElement, LegacyElement};
use crate::error::BridgeError;

/// Probe ceiling used when the caller does not configure one.
pub const DEFAULT_FIND_ALL_LIMIT: usize = 1000;

/// Result of a legacy enumeration.
#[derive(Debug)]
pub struct Enumeration {
    pub handles: Vec<ElementHandle>,
    /// Number of selector replays performed, including the final miss.
    pub probes: usize,
}

pub struct ElementResolver<'a> {
    bridge: &'a AutomationBridge,
    limit: usize,
}

impl<'a> ElementResolver<'a> {
    pub fn new(bridge: &'a AutomationBridge) -> Self {
        Self {
            bridge,
            limit: DEFAULT_FIND_ALL_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    fn publishable(
        &self,
        kind: ElementKind,
        selector: Selector,
        single_match: bool,
        scope: Option<&ElementHandle>,
    ) -> ElementHandle {
        let context = scope.map(|s| s.id().to_string()).filter(|id| !id.is_empty());
        ElementHandle::new(kind, selector, single_match).with_context(context)
    }

    /// The first element matching `selector`, under `scope` when given.
    pub fn find(
        &self,
        selector: &Selector,
        scope: Option<&ElementHandle>,
    ) -> Result<Option<ElementHandle>, BridgeError> {
        self.bridge.get_root_node()?;
        let tree = self.bridge.tree();
        let found = match selector {
            Selector::Fast(fast) => {
                let scope_node = self.scope_node(scope)?;
                fast.find_object(tree.as_ref(), scope_node).map(|node| {
                    self.publishable(
                        ElementKind::Fast(FastElement::new(node)),
                        selector.clone(),
                        true,
                        scope,
                    )
                })
            }
            Selector::Legacy(legacy) => {
                let element = self.legacy_element(legacy.clone(), scope)?;
                element.exists(tree.as_ref()).then(|| {
                    self.publishable(ElementKind::Legacy(element), selector.clone(), true, scope)
                })
            }
        };
        debug!(%selector, found = found.is_some(), "Resolved selector");
        Ok(found)
    }

    /// Every element matching `selector`, under `scope` when given.
    pub fn find_all(
        &self,
        selector: &Selector,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementHandle>, BridgeError> {
        match selector {
            Selector::Fast(fast) => {
                self.bridge.get_root_node()?;
                let tree = self.bridge.tree();
                let scope_node = self.scope_node(scope)?;
                Ok(fast
                    .find_objects(tree.as_ref(), scope_node)
                    .into_iter()
                    .map(|node| {
                        self.publishable(
                            ElementKind::Fast(FastElement::new(node)),
                            selector.clone(),
                            false,
                            scope,
                        )
                    })
                    .collect())
            }
            Selector::Legacy(legacy) => Ok(self.enumerate_legacy(legacy, scope)?.handles),
        }
    }

    /// Probe the n-th match of `selector` for n = 0, 1, ... until a probe
    /// misses.
    ///
    /// A selector already bound to an instance names exactly one element
    /// and is resolved directly. Selectors with a class regex advance by
    /// index, everything else by instance.
    pub fn enumerate_legacy(
        &self,
        selector: &LegacySelector,
        scope: Option<&ElementHandle>,
    ) -> Result<Enumeration, BridgeError> {
        self.bridge.get_root_node()?;
        let tree = self.bridge.tree();
        let anchor = scope.map(|s| s.legacy_anchor(self.bridge)).transpose()?;
        let place = |probe: LegacySelector| match &anchor {
            Some(anchor) => LegacyElement::within(probe, anchor.clone()),
            None => LegacyElement::new(probe),
        };

        if selector.pins_instance() {
            let element = place(selector.clone());
            let handles = if element.exists(tree.as_ref()) {
                vec![self.publishable(
                    ElementKind::Legacy(element),
                    Selector::Legacy(selector.clone()),
                    true,
                    scope,
                )]
            } else {
                Vec::new()
            };
            return Ok(Enumeration { handles, probes: 1 });
        }

        let by_index = selector.uses_class_regex();
        let mut handles = Vec::new();
        let mut probes = 0;
        loop {
            let counter = handles.len();
            let probe = if by_index {
                selector.probe_index(counter)?
            } else {
                selector.probe_instance(counter)?
            };
            probes += 1;
            let element = place(probe.clone());
            if !element.exists(tree.as_ref()) {
                break;
            }
            if counter == self.limit {
                warn!(%selector, limit = self.limit, "Enumeration exceeded probe ceiling");
                return Err(BridgeError::ResourceExhausted {
                    selector: selector.to_string(),
                    limit: self.limit,
                });
            }
            handles.push(self.publishable(
                ElementKind::Legacy(element),
                Selector::Legacy(probe),
                false,
                scope,
            ));
        }
        debug!(%selector, by_index, found = handles.len(), probes, "Enumerated legacy selector");
        Ok(Enumeration { handles, probes })
    }

    fn scope_node(&self, scope: Option<&ElementHandle>) -> Result<Option<NodeId>, BridgeError> {
        scope.map(|s| s.native_node(self.bridge)).transpose()
    }

    fn legacy_element(
        &self,
        selector: LegacySelector,
        scope: Option<&ElementHandle>,
    ) -> Result<LegacyElement, BridgeError> {
        Ok(match scope {
            Some(scope) => LegacyElement::within(selector, scope.legacy_anchor(self.bridge)?),
            None => LegacyElement::new(selector),
        })
    }
}
