//! Instance reconciliation for `Loom TUI`.
//!
//! Every frame the widget layer produces a fresh, immutable [`VNode`] tree.
//! This crate decides which persistent instances survive from the previous
//! frame, which are created and which are destroyed:
//!
//! - [`reconcile_children`]: matches one sibling list (keyed by key, unkeyed by
//!   slot, both gated on identical widget kind) and reports reused, new and
//!   unmounted instance ids
//! - [`InstanceTree`]: the persistent tree, committed level by level with
//!   transactional semantics
//!
//! Duplicate sibling keys are always fatal; nothing is resolved by "last wins".
//!
//! [`VNode`]: loom_tui_core::VNode

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

mod reconcile;
mod tree;

pub use reconcile::{
    reconcile_children, reconcile_children_with_parent, ChildPlan, PrevChild, ReconcileOutcome,
};
pub use tree::{CommitReport, InstanceKey, InstanceNode, InstanceTree};
