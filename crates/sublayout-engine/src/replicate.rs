//! Sub-layout replication.
//!
//! Composes correspondence, transform, and group identity: given a source
//! sub-layout and a target anchor footprint under a hierarchical path
//! prefix, walk the source grouping tree and reconstruct an equivalent tree
//! on the target board, transformed around the anchor pair.
//!
//! Footprints are never duplicated: the target's own footprints are
//! reparented and re-posed. Tracks and zones *are* duplicated, with net
//! assignment inferred from pad correspondences; only a uniquely inferred
//! net is assigned, anything ambiguous or missing is left unconnected and
//! reported. Conservative by design: false negatives are acceptable, wrong
//! nets are not.
//!
//! Correspondence and transform are computed eagerly at construction, so a
//! structurally invalid selection fails before any mutation. The walk
//! itself does not roll back on a fatal error; the target board keeps any
//! mutations already applied.

use std::collections::BTreeSet;

use itertools::Itertools;
use log::{debug, info};

use sublayout_board::{Board, BoardItem, Group, ItemId, ItemKind, NetId};

use crate::correspondence::{
    collect_footprints, CorrespondenceStrategy, FootprintCorrespondence,
};
use crate::error::ReplicateError;
use crate::hier;
use crate::identity::{self, GroupIdentity};
use crate::selector::FilterResult;
use crate::transform::PositionTransform;

/// Outcome of one [`ReplicateSublayout::replicate`] call: the target group
/// used plus the nonfatal problems encountered. Problems never block
/// completion; they are surfaced to the operator as warnings.
#[derive(Debug)]
pub struct ReplicateResult {
    /// The grouping container the replicated layout landed in.
    pub group: ItemId,
    /// Target footprints the source sub-layout does not know how to place.
    pub target_footprints_missing_source: Vec<ItemId>,
    /// Source footprints with no target counterpart; nothing was placed for
    /// them.
    pub source_footprints_unused: Vec<ItemId>,
    /// Duplicated tracks whose net could not be uniquely inferred, with the
    /// source net they came from.
    pub tracks_missing_netcode: Vec<(ItemId, NetId)>,
    /// Duplicated zones whose net could not be uniquely inferred, with the
    /// source net they came from.
    pub zones_missing_netcode: Vec<(ItemId, NetId)>,
}

impl ReplicateResult {
    pub fn is_clean(&self) -> bool {
        self.target_footprints_missing_source.is_empty()
            && self.source_footprints_unused.is_empty()
            && self.tracks_missing_netcode.is_empty()
            && self.zones_missing_netcode.is_empty()
    }

    /// Human-readable problem summaries, one string per populated list.
    pub fn error_strs(&self, source: &Board, target: &Board) -> Vec<String> {
        let mut out = Vec::new();
        if !self.target_footprints_missing_source.is_empty() {
            out.push(format!(
                "{} target footprints have no source counterpart: {}",
                self.target_footprints_missing_source.len(),
                refs(target, &self.target_footprints_missing_source)
            ));
        }
        if !self.source_footprints_unused.is_empty() {
            out.push(format!(
                "{} source footprints were not placed: {}",
                self.source_footprints_unused.len(),
                refs(source, &self.source_footprints_unused)
            ));
        }
        if !self.tracks_missing_netcode.is_empty() {
            out.push(format!(
                "{} tracks failed to replicate nets: {}",
                self.tracks_missing_netcode.len(),
                net_names(source, &self.tracks_missing_netcode)
            ));
        }
        if !self.zones_missing_netcode.is_empty() {
            out.push(format!(
                "{} zones failed to replicate nets: {}",
                self.zones_missing_netcode.len(),
                net_names(source, &self.zones_missing_netcode)
            ));
        }
        out
    }
}

fn refs(board: &Board, ids: &[ItemId]) -> String {
    ids.iter()
        .filter_map(|id| board.footprint(*id))
        .map(|fp| fp.reference.as_str())
        .sorted()
        .join(", ")
}

fn net_names(source: &Board, entries: &[(ItemId, NetId)]) -> String {
    entries
        .iter()
        .map(|(_, net)| source.net_name(*net).unwrap_or("?"))
        .sorted()
        .dedup()
        .join(", ")
}

/// Result of net inference for one duplicated copper item.
enum NetInference {
    /// Source item was unconnected; nothing to infer.
    Unconnected,
    Unique(NetId),
    /// Zero or multiple candidate target nets.
    Unresolved,
}

impl NetInference {
    fn assigned(&self) -> NetId {
        match self {
            NetInference::Unique(net) => *net,
            NetInference::Unconnected | NetInference::Unresolved => NetId::UNCONNECTED,
        }
    }

    fn failed(&self) -> bool {
        matches!(self, NetInference::Unresolved)
    }
}

/// A prepared replication: correspondence and transform computed, target
/// container determined. Construction performs no mutation; `replicate` and
/// `purge_lca` mutate only the target board.
///
/// State is per target instance; replicating onto several instances means
/// constructing one of these per instance.
#[derive(Debug)]
pub struct ReplicateSublayout {
    source_roots: Vec<ItemId>,
    source_footprints: Vec<ItemId>,
    target_prefix: Vec<String>,
    correspondence: FootprintCorrespondence,
    transform: PositionTransform,
    reuse_group: Option<ItemId>,
}

impl ReplicateSublayout {
    /// Prepare replication of an entire source board.
    pub fn new(
        source: &Board,
        target: &Board,
        target_anchor: ItemId,
        target_prefix: &[String],
        strategy: CorrespondenceStrategy,
    ) -> Result<Self, ReplicateError> {
        Self::with_roots(
            source,
            source.root_items(),
            target,
            target_anchor,
            target_prefix,
            strategy,
        )
    }

    /// Prepare replication of a pre-selected subset of the source board (a
    /// [`FilterResult`] from
    /// [`HierarchySelector`](crate::selector::HierarchySelector)).
    pub fn from_filtered(
        source: &Board,
        filtered: &FilterResult,
        target: &Board,
        target_anchor: ItemId,
        target_prefix: &[String],
        strategy: CorrespondenceStrategy,
    ) -> Result<Self, ReplicateError> {
        Self::with_roots(
            source,
            filtered.root_items(),
            target,
            target_anchor,
            target_prefix,
            strategy,
        )
    }

    fn with_roots(
        source: &Board,
        source_roots: Vec<ItemId>,
        target: &Board,
        target_anchor: ItemId,
        target_prefix: &[String],
        strategy: CorrespondenceStrategy,
    ) -> Result<Self, ReplicateError> {
        let correspondence = match strategy {
            CorrespondenceStrategy::HierarchicalPath => {
                FootprintCorrespondence::by_path(source, &source_roots, target, target_prefix)?
            }
            CorrespondenceStrategy::RefDesOffset => {
                FootprintCorrespondence::by_refdes(source, &source_roots, target, target_prefix)
            }
        };

        let anchor_ref = target
            .footprint(target_anchor)
            .map(|fp| fp.reference.clone())
            .unwrap_or_else(|| target_anchor.to_string());
        let source_anchor =
            correspondence
                .source_of(target_anchor)
                .ok_or(ReplicateError::AnchorUnmatched {
                    reference: anchor_ref.clone(),
                })?;
        let (Some(source_fp), Some(target_fp)) = (
            source.footprint(source_anchor),
            target.footprint(target_anchor),
        ) else {
            return Err(ReplicateError::AnchorUnmatched {
                reference: anchor_ref,
            });
        };
        let transform = PositionTransform::from_anchors(source_fp, target_fp);

        // Candidate container to receive the replicated layout: the lowest
        // common ancestor group of every target-side footprint in scope.
        // Reused only when everything inside it belongs to the target
        // prefix; a container shared with an unrelated sub-circuit is not
        // ours to restructure.
        let identities: Vec<GroupIdentity> = correspondence
            .pairs()
            .iter()
            .map(|(_, tgt)| *tgt)
            .chain(correspondence.target_only().iter().copied())
            .map(|tgt| GroupIdentity::of_parent(target, tgt))
            .collect();
        let reuse_group = identity::lowest_common_ancestor(target, &identities)
            .and_then(|ident| ident.group())
            .filter(|gid| group_fully_under_prefix(target, *gid, target_prefix));

        debug!(
            "replication prepared: anchor {}, {} pairs, reuse group {:?}",
            anchor_ref,
            correspondence.pairs().len(),
            reuse_group
        );

        let source_footprints = collect_footprints(source, &source_roots);
        Ok(Self {
            source_roots,
            source_footprints,
            target_prefix: target_prefix.to_vec(),
            correspondence,
            transform,
            reuse_group,
        })
    }

    pub fn correspondence(&self) -> &FootprintCorrespondence {
        &self.correspondence
    }

    pub fn transform(&self) -> &PositionTransform {
        &self.transform
    }

    /// The target container that will be reused, if one was found.
    pub fn reuse_group(&self) -> Option<ItemId> {
        self.reuse_group
    }

    /// Clear a previously replicated layout's routing: recursively delete
    /// every track and zone inside the reusable target container, leaving
    /// footprints and nested containers in place as position references.
    /// No-op when there is no reusable container.
    pub fn purge_lca(&self, target: &mut Board) {
        let Some(group) = self.reuse_group else {
            return;
        };
        let mut doomed = Vec::new();
        collect_copper(target, group, &mut doomed);
        info!("purging {} copper items from {}", doomed.len(), group);
        for id in doomed {
            target.remove(id);
        }
    }

    /// Perform the replication. Mutates only `target`; `source` must be the
    /// same board the construction saw.
    pub fn replicate(
        &self,
        source: &Board,
        target: &mut Board,
    ) -> Result<ReplicateResult, ReplicateError> {
        let group = match self.reuse_group {
            Some(gid) => gid,
            None => target.add(BoardItem::Group(Group::new(&self.target_prefix.join("/")))),
        };

        let mut result = ReplicateResult {
            group,
            target_footprints_missing_source: self.correspondence.target_only().to_vec(),
            source_footprints_unused: Vec::new(),
            tracks_missing_netcode: Vec::new(),
            zones_missing_netcode: Vec::new(),
        };

        self.walk(source, target, &self.source_roots, group, &mut result)?;

        info!(
            "replicated into {}: {} pairs, {} unplaced source, {} unmatched target",
            group,
            self.correspondence.pairs().len(),
            result.source_footprints_unused.len(),
            result.target_footprints_missing_source.len()
        );
        Ok(result)
    }

    fn walk(
        &self,
        source: &Board,
        target: &mut Board,
        items: &[ItemId],
        into: ItemId,
        result: &mut ReplicateResult,
    ) -> Result<(), ReplicateError> {
        for &id in items {
            let Some(item) = source.get(id) else {
                continue;
            };
            match item {
                BoardItem::Group(src_group) => {
                    let child = target.add(BoardItem::Group(Group::new(&src_group.name)));
                    // `into` and `child` both live on `target`; cannot fail.
                    let _ = target.attach(into, child);
                    self.walk(source, target, &src_group.members, child, result)?;
                }
                BoardItem::Footprint(src_fp) => match self.correspondence.get_footprint(id) {
                    None => result.source_footprints_unused.push(id),
                    Some(tgt_id) => {
                        let position = self.transform.transform(src_fp.position);
                        let orientation = self.transform.transform_orientation(src_fp.orientation);
                        let side = self.transform.transform_flipped(src_fp.side);
                        let _ = target.attach(into, tgt_id);
                        if let Some(tgt_fp) = target.footprint_mut(tgt_id) {
                            tgt_fp.position = position;
                            tgt_fp.orientation = orientation;
                            tgt_fp.side = side;
                        }
                    }
                },
                BoardItem::Track(src_track) => {
                    let inference = self.infer_net(source, target, src_track.net);
                    let mut dup = src_track.clone();
                    dup.start = self.transform.transform(src_track.start);
                    dup.end = self.transform.transform(src_track.end);
                    if self.transform.relative_flipped() {
                        dup.layer = dup.layer.side_swapped();
                    }
                    dup.net = inference.assigned();
                    let new_id = target.add(BoardItem::Track(dup));
                    let _ = target.attach(into, new_id);
                    if inference.failed() {
                        result.tracks_missing_netcode.push((new_id, src_track.net));
                    }
                }
                BoardItem::Zone(src_zone) => {
                    let inference = self.infer_net(source, target, src_zone.net);
                    let mut dup = src_zone.clone();
                    dup.corners = src_zone
                        .corners
                        .iter()
                        .map(|corner| self.transform.transform(*corner))
                        .collect();
                    if self.transform.relative_flipped() {
                        dup.layers = dup
                            .layers
                            .iter()
                            .map(|layer| layer.side_swapped())
                            .collect();
                    }
                    dup.net = inference.assigned();
                    // Stale fill geometry must not be trusted after a move.
                    dup.filled = false;
                    let new_id = target.add(BoardItem::Zone(dup));
                    let _ = target.attach(into, new_id);
                    if inference.failed() {
                        result.zones_missing_netcode.push((new_id, src_zone.net));
                    }
                }
                BoardItem::Drawing(_) => {
                    return Err(ReplicateError::UnsupportedItem {
                        kind: ItemKind::Drawing,
                    });
                }
            }
        }
        Ok(())
    }

    /// Infer the target net for a source copper item by induction over the
    /// matched footprints: every source pad on the item's net votes with the
    /// net of the corresponding target pad. Only a unanimous single-net
    /// outcome is assigned.
    fn infer_net(&self, source: &Board, target: &Board, net: NetId) -> NetInference {
        if !net.is_connected() {
            return NetInference::Unconnected;
        }
        let mut candidates: BTreeSet<NetId> = BTreeSet::new();
        for &src_id in &self.source_footprints {
            let Some(src_fp) = source.footprint(src_id) else {
                continue;
            };
            let Some(tgt_id) = self.correspondence.get_footprint(src_id) else {
                continue;
            };
            let Some(tgt_fp) = target.footprint(tgt_id) else {
                continue;
            };
            for pad in src_fp.pads.iter().filter(|pad| pad.net == net) {
                if let Some(tgt_pad) = tgt_fp.pads.iter().find(|p| p.number == pad.number) {
                    if tgt_pad.net.is_connected() {
                        candidates.insert(tgt_pad.net);
                    }
                }
            }
        }
        match candidates.len() {
            1 => match candidates.first() {
                Some(net) => NetInference::Unique(*net),
                None => NetInference::Unresolved,
            },
            _ => NetInference::Unresolved,
        }
    }
}

/// True if every footprint transitively inside `group` lies under
/// `prefix`, i.e. the container holds nothing from unrelated sub-circuits.
fn group_fully_under_prefix(board: &Board, group: ItemId, prefix: &[String]) -> bool {
    board.members(group).iter().all(|&member| match board.get(member) {
        Some(BoardItem::Footprint(fp)) => hier::starts_with(fp, prefix),
        Some(BoardItem::Group(_)) => group_fully_under_prefix(board, member, prefix),
        _ => true,
    })
}

fn collect_copper(board: &Board, group: ItemId, out: &mut Vec<ItemId>) {
    for &member in board.members(group) {
        match board.get(member) {
            Some(BoardItem::Track(_) | BoardItem::Zone(_)) => out.push(member),
            Some(BoardItem::Group(_)) => collect_copper(board, member, out),
            _ => {}
        }
    }
}
