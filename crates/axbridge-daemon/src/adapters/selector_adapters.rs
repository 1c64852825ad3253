//! Decoding of client selector payloads.
//!
//! A fast selector arrives as a JSON object of predicates; a legacy
//! selector arrives as its builder-chain string.

use axbridge_core::{
    parse_legacy, FastSelector, Pattern, Selector, SelectorError, TextMatch, MAX_SELECTOR_DEPTH,
};
use serde_json::{Map, Value};

use crate::error::BridgeError;

const TEXT_FIELDS: [&str; 5] = ["text", "desc", "className", "resourceId", "package"];

const FLAG_FIELDS: [&str; 9] = [
    "checkable",
    "checked",
    "clickable",
    "enabled",
    "focusable",
    "focused",
    "longClickable",
    "scrollable",
    "selected",
];

fn invalid(reason: impl Into<String>) -> BridgeError {
    BridgeError::InvalidArgument(reason.into())
}

/// Read `base`, `baseContains`, `baseStartsWith`, `baseEndsWith` or
/// `baseMatches`. At most one may be present.
fn text_match(obj: &Map<String, Value>, base: &str) -> Result<Option<TextMatch>, BridgeError> {
    let variants: [(String, fn(String) -> Result<TextMatch, BridgeError>); 5] = [
        (base.to_string(), |v| Ok(TextMatch::Exact(v))),
        (format!("{base}Contains"), |v| Ok(TextMatch::Contains(v))),
        (format!("{base}StartsWith"), |v| Ok(TextMatch::StartsWith(v))),
        (format!("{base}EndsWith"), |v| Ok(TextMatch::EndsWith(v))),
        (format!("{base}Matches"), |v| {
            Ok(TextMatch::Pattern(Pattern::new(&v)?))
        }),
    ];

    let mut found = None;
    for (key, build) in variants {
        let Some(value) = obj.get(&key) else {
            continue;
        };
        let value = value
            .as_str()
            .ok_or_else(|| invalid(format!("selector field '{key}' must be a string")))?;
        if found.is_some() {
            return Err(invalid(format!(
                "selector sets more than one '{base}' predicate"
            )));
        }
        found = Some(build(value.to_string())?);
    }
    Ok(found)
}

fn flag(obj: &Map<String, Value>, key: &str) -> Result<Option<bool>, BridgeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(invalid(format!("selector field '{key}' must be a boolean"))),
    }
}

pub fn fast_selector_from_json(value: &Value) -> Result<FastSelector, BridgeError> {
    fast_selector_at(value, 0)
}

fn fast_selector_at(value: &Value, depth: usize) -> Result<FastSelector, BridgeError> {
    if depth > MAX_SELECTOR_DEPTH {
        return Err(SelectorError::TooDeep {
            limit: MAX_SELECTOR_DEPTH,
        }
        .into());
    }
    let obj = value
        .as_object()
        .ok_or_else(|| invalid("fast selector must be a JSON object"))?;

    let known = |key: &str| {
        FLAG_FIELDS.contains(&key)
            || key == "hasChild"
            || TEXT_FIELDS.iter().any(|base| {
                key.strip_prefix(base).is_some_and(|rest| {
                    matches!(rest, "" | "Contains" | "StartsWith" | "EndsWith" | "Matches")
                })
            })
    };
    if let Some(unknown) = obj.keys().find(|k| !known(k)) {
        return Err(invalid(format!("unknown selector field '{unknown}'")));
    }

    let mut selector = FastSelector {
        text: text_match(obj, "text")?,
        desc: text_match(obj, "desc")?,
        class_name: text_match(obj, "className")?,
        resource_id: text_match(obj, "resourceId")?,
        package: text_match(obj, "package")?,
        checkable: flag(obj, "checkable")?,
        checked: flag(obj, "checked")?,
        clickable: flag(obj, "clickable")?,
        enabled: flag(obj, "enabled")?,
        focusable: flag(obj, "focusable")?,
        focused: flag(obj, "focused")?,
        long_clickable: flag(obj, "longClickable")?,
        scrollable: flag(obj, "scrollable")?,
        selected: flag(obj, "selected")?,
        has_child: None,
    };
    if let Some(child) = obj.get("hasChild") {
        selector.has_child = Some(Box::new(fast_selector_at(child, depth + 1)?));
    }
    Ok(selector)
}

/// Decode a selector for `strategy` (`fast` or `legacy`).
pub fn selector_from_json(strategy: &str, value: &Value) -> Result<Selector, BridgeError> {
    match strategy {
        "fast" => Ok(Selector::Fast(fast_selector_from_json(value)?)),
        "legacy" => {
            let source = value
                .as_str()
                .ok_or_else(|| invalid("legacy selector must be a string"))?;
            Ok(Selector::Legacy(parse_legacy(source)?))
        }
        other => Err(invalid(format!(
            "unknown selector strategy '{other}', expected 'fast' or 'legacy'"
        ))),
    }
}
