//! Hierarchical sub-layout selection and replication.
//!
//! A hierarchical board design instantiates the same logical sub-circuit in
//! several places (or across board revisions). This crate takes a laid-out
//! instance and reproduces its physical layout (component placement, tracks,
//! copper zones, grouping structure) onto other instances, geometrically
//! transformed around an anchor component pair.
//!
//! The pipeline:
//!
//! 1. [`correspondence`] matches source footprints to target footprints,
//!    either by hierarchical-path postfix or by reference-designator offset.
//! 2. [`transform`] derives the rigid 2D transform (rotation, mirroring,
//!    translation) from one matched anchor pair.
//! 3. [`replicate`] walks the source grouping tree, reposing matched target
//!    footprints and duplicating tracks/zones with net assignment inferred
//!    from pad correspondences.
//!
//! [`selector`] independently carves a hierarchy level out of a board, for
//! saving a sub-layout as its own document or for deleting one, and
//! [`identity`] provides the content-based group identity those walks rely
//! on. [`namer`] derives display names for hierarchy paths; it is consumed
//! by UI layers only and is not required for correctness.

pub mod correspondence;
pub mod error;
pub mod hier;
pub mod identity;
pub mod namer;
pub mod replicate;
pub mod selector;
pub mod transform;

pub use correspondence::{CorrespondenceStrategy, FootprintCorrespondence};
pub use error::ReplicateError;
pub use identity::GroupIdentity;
pub use namer::HierarchyNamer;
pub use replicate::{ReplicateResult, ReplicateSublayout};
pub use selector::{FilterResult, HierarchySelector};
pub use transform::PositionTransform;
