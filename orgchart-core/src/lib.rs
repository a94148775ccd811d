//! Organization-chart tree core.
//!
//! Turns a flat table of person/position records into a validated,
//! navigable hierarchy:
//!
//! ```text
//! records ──► validate_records ──► build_tree ──► OrgNode
//!                                                    │
//!                             flatten_tree / path_to_root / search
//!                                                    │
//!                                                ViewState
//! ```
//!
//! The tree is a pure function of the input records and mapping: rebuilding
//! from identical input yields a structurally identical tree. Per-view state
//! (collapsed nodes, highlighted path, search cursor) lives in [`ViewState`]
//! as ownerless id sets, never inside the tree, so a new input snapshot
//! simply replaces the old tree.
//!
//! Rendering, layout and host persistence are deliberately absent; consumers
//! drive those from the tree and the query operations exported here.

pub mod tree;
pub mod types;
pub mod view;

pub use tree::build::{build_tree, BuildError};
pub use tree::query::{flatten_tree, path_to_root};
pub use tree::search::{normalize, search};
pub use tree::validate::validate_records;
pub use types::{
    ErrorDetail, FieldMapping, NodeId, OrgNode, OrphanRef, Record, RoleType, SearchField,
    SearchResult, ValidationError, ValidationErrorKind,
};
pub use view::ViewState;
