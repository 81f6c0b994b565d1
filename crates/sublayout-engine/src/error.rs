//! Fatal-tier errors.
//!
//! These indicate that the operator's selection is structurally invalid and
//! abort the operation: before any mutation when raised at construction
//! time, mid-walk otherwise (no rollback; see the crate docs on partial
//! mutation). Nonfatal problems are reported through
//! [`ReplicateResult`](crate::ReplicateResult) instead.

use sublayout_board::ItemKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplicateError {
    /// Two target footprints in scope share the same hierarchical path
    /// suffix, so postfix matching cannot produce a bijection.
    #[error("duplicate hierarchical path suffix in target scope at {reference}")]
    DuplicateSuffix { reference: String },

    /// Matched source footprints imply more than one source sub-hierarchy
    /// root; replication from multiple simultaneous prefixes is not
    /// supported.
    #[error(
        "matched source footprints imply {count} distinct source hierarchy prefixes; \
         a single source sub-hierarchy root is required"
    )]
    AmbiguousSourcePrefix { count: usize },

    /// The selected target anchor has no counterpart in the source layout.
    #[error("target anchor {reference} has no matching source footprint")]
    AnchorUnmatched { reference: String },

    /// The replicated source tree contains an item kind the structural walk
    /// cannot reproduce.
    #[error("unsupported item kind {kind:?} in replicated source tree")]
    UnsupportedItem { kind: ItemKind },
}
