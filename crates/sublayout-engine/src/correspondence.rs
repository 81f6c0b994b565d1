//! Source-to-target footprint matching.
//!
//! Replication needs a best-effort bijection between the footprints of the
//! source sub-layout and the footprints of the target scope. Two strategies
//! produce the same three-part result shape:
//!
//! * **Hierarchical path**: postfix matching of persistent identity chains.
//!   Exact, but requires both sides to carry comparable paths.
//! * **Reference-designator offset**: positional pairing of same-typed
//!   components after sorting by numeric index. Tolerates divergent or
//!   absent paths, at the cost of being purely positional.
//!
//! Both strategies consume immutable snapshots (a frozen target pool and a
//! source list) into a fresh result; nothing is mutated during iteration.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use log::debug;

use sublayout_board::{Board, BoardItem, ItemId};

use crate::error::ReplicateError;
use crate::hier;

/// Strategy selector for [`FootprintCorrespondence`] construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrespondenceStrategy {
    HierarchicalPath,
    RefDesOffset,
}

/// An immutable matching between source and target footprints: matched
/// pairs plus the unmatched remainder on each side.
#[derive(Debug, Clone)]
pub struct FootprintCorrespondence {
    pairs: Vec<(ItemId, ItemId)>,
    source_only: Vec<ItemId>,
    target_only: Vec<ItemId>,
}

/// Footprint ids reachable from `roots`, recursing through nested groups,
/// in traversal order.
pub(crate) fn collect_footprints(board: &Board, roots: &[ItemId]) -> Vec<ItemId> {
    let mut out = Vec::new();
    for &root in roots {
        match board.get(root) {
            Some(BoardItem::Footprint(_)) => out.push(root),
            Some(BoardItem::Group(g)) => {
                out.extend(collect_footprints(board, &g.members));
            }
            _ => {}
        }
    }
    out
}

/// Split a reference designator into its alphabetic type prefix and trailing
/// numeric index: `"R12"` → `("R", 12)`. A designator without trailing
/// digits yields index −1.
fn split_refdes(reference: &str) -> (&str, i64) {
    let digits_at = reference
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|i| i + 1)
        .unwrap_or(0);
    let (prefix, digits) = reference.split_at(digits_at);
    match digits.parse::<i64>() {
        Ok(index) => (prefix, index),
        Err(_) => (reference, -1),
    }
}

impl FootprintCorrespondence {
    /// Match by hierarchical-path postfix.
    ///
    /// Target footprints under `target_prefix` are pooled by their path
    /// suffix beyond the prefix (a duplicate suffix is a fatal
    /// inconsistency). Each source footprint, collected recursively from
    /// `source_roots`, tries its own path suffixes from longest to
    /// shortest; the first pool hit wins and is consumed. If the matches
    /// collectively imply more than one source prefix length, the source
    /// sub-hierarchy root is ambiguous and the construction fails.
    pub fn by_path(
        source: &Board,
        source_roots: &[ItemId],
        target: &Board,
        target_prefix: &[String],
    ) -> Result<Self, ReplicateError> {
        let mut pool: BTreeMap<Vec<String>, ItemId> = BTreeMap::new();
        for (id, fp) in target.footprints() {
            if !hier::starts_with(fp, target_prefix) {
                continue;
            }
            let suffix = hier::path_of(fp)[target_prefix.len()..].to_vec();
            if pool.insert(suffix, id).is_some() {
                return Err(ReplicateError::DuplicateSuffix {
                    reference: fp.reference.clone(),
                });
            }
        }

        let mut pairs = Vec::new();
        let mut source_only = Vec::new();
        let mut prefix_lens: BTreeSet<usize> = BTreeSet::new();

        for src in collect_footprints(source, source_roots) {
            let Some(fp) = source.footprint(src) else {
                continue;
            };
            let segs = hier::path_of(fp);
            let mut matched = false;
            for suffix_len in (1..=segs.len()).rev() {
                let suffix = &segs[segs.len() - suffix_len..];
                if let Some(tgt) = pool.remove(suffix) {
                    pairs.push((src, tgt));
                    prefix_lens.insert(segs.len() - suffix_len);
                    matched = true;
                    break;
                }
            }
            if !matched {
                source_only.push(src);
            }
        }

        if prefix_lens.len() > 1 {
            return Err(ReplicateError::AmbiguousSourcePrefix {
                count: prefix_lens.len(),
            });
        }

        let target_only: Vec<ItemId> = pool.into_values().collect();
        debug!(
            "path correspondence: {} matched, {} source-only, {} target-only",
            pairs.len(),
            source_only.len(),
            target_only.len()
        );

        Ok(Self {
            pairs,
            source_only,
            target_only,
        })
    }

    /// Match by reference-designator offset.
    ///
    /// Components are grouped by refdes type prefix on both sides; within a
    /// type, both groups are sorted by numeric index ascending and paired
    /// positionally. Surplus on either side (including types present on
    /// one side only) is unmatched. Purely positional: this assumes the
    /// Nth-lowest-numbered component of a type in the source corresponds to
    /// the Nth-lowest-numbered in the target.
    pub fn by_refdes(
        source: &Board,
        source_roots: &[ItemId],
        target: &Board,
        target_prefix: &[String],
    ) -> Self {
        let mut by_type: BTreeMap<String, (Vec<(i64, String, ItemId)>, Vec<(i64, String, ItemId)>)> =
            BTreeMap::new();

        for src in collect_footprints(source, source_roots) {
            let Some(fp) = source.footprint(src) else {
                continue;
            };
            let (prefix, index) = split_refdes(&fp.reference);
            by_type.entry(prefix.to_string()).or_default().0.push((
                index,
                fp.reference.clone(),
                src,
            ));
        }
        for (id, fp) in target.footprints() {
            if !hier::starts_with(fp, target_prefix) {
                continue;
            }
            let (prefix, index) = split_refdes(&fp.reference);
            by_type.entry(prefix.to_string()).or_default().1.push((
                index,
                fp.reference.clone(),
                id,
            ));
        }

        let mut pairs = Vec::new();
        let mut source_only = Vec::new();
        let mut target_only = Vec::new();

        for (_, (mut sources, mut targets)) in by_type {
            sources.sort();
            targets.sort();
            let paired = sources.len().min(targets.len());
            for (s, t) in sources.iter().zip(targets.iter()) {
                pairs.push((s.2, t.2));
            }
            source_only.extend(sources.drain(paired..).map(|(_, _, id)| id));
            target_only.extend(targets.drain(paired..).map(|(_, _, id)| id));
        }

        debug!(
            "refdes correspondence: {} matched, {} source-only, {} target-only",
            pairs.len(),
            source_only.len(),
            target_only.len()
        );

        Self {
            pairs,
            source_only,
            target_only,
        }
    }

    /// Matched (source, target) pairs, in source traversal order.
    pub fn pairs(&self) -> &[(ItemId, ItemId)] {
        &self.pairs
    }

    pub fn source_only(&self) -> &[ItemId] {
        &self.source_only
    }

    pub fn target_only(&self) -> &[ItemId] {
        &self.target_only
    }

    /// Target counterpart of a source footprint. Linear over the matched
    /// pairs; a candidate for caching if profiles ever show it.
    pub fn get_footprint(&self, source: ItemId) -> Option<ItemId> {
        self.pairs
            .iter()
            .find(|(s, _)| *s == source)
            .map(|(_, t)| *t)
    }

    /// Source counterpart of a target footprint.
    pub fn source_of(&self, target: ItemId) -> Option<ItemId> {
        self.pairs
            .iter()
            .find(|(_, t)| *t == target)
            .map(|(s, _)| *s)
    }

    /// References of matched pairs, for diagnostics.
    pub fn describe(&self, source: &Board, target: &Board) -> String {
        self.pairs
            .iter()
            .map(|(s, t)| {
                format!(
                    "{} -> {}",
                    source.footprint(*s).map(|f| f.reference.as_str()).unwrap_or("?"),
                    target.footprint(*t).map(|f| f.reference.as_str()).unwrap_or("?"),
                )
            })
            .join(", ")
    }
}
