//! Core types for the axbridge automation bridge.
//!
//! This crate models the live accessibility tree as the platform exposes it
//! ([`UiTree`]), the two selector grammars used to query it (the handle-based
//! [`FastSelector`] and the replay-based [`LegacySelector`]), the closed set of
//! readable element [`Attribute`]s, and the geometry used by gestures.
//!
//! Nothing here talks to a device; the daemon crate wires these types to an
//! automation session.

#![deny(clippy::all)]

mod attribute;
pub mod geometry;
mod gesture;
mod memory;
pub mod selector;
mod tree;

pub use attribute::Attribute;
pub use geometry::GeometryError;
pub use geometry::Point;
pub use geometry::Rect;
pub use geometry::Size;
pub use gesture::Direction;
pub use gesture::Gesture;
pub use gesture::DEFAULT_LONG_CLICK;
pub use memory::MemoryTree;
pub use selector::FastSelector;
pub use selector::parse_legacy;
pub use selector::LegacySelector;
pub use selector::Pattern;
pub use selector::Selector;
pub use selector::SelectorError;
pub use selector::MAX_SELECTOR_DEPTH;
pub use selector::TextMatch;
pub use tree::descendants;
pub use tree::subtree;
pub use tree::NodeAction;
pub use tree::NodeId;
pub use tree::NodeInfo;
pub use tree::RangeInfo;
pub use tree::SelectionRange;
pub use tree::UiTree;
