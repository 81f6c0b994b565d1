//! Hierarchy-scope selection.
//!
//! Given a hierarchical path prefix, partition a board into the items that
//! belong to the designated sub-circuit and the rest. Membership is direct
//! for footprints (path prefix match) and inferred for copper (net
//! connectivity); grouping containers are preserved when they lie fully in
//! scope and dissolved when they straddle the boundary.
//!
//! Net scoping is conservative: a net touched by *any* out-of-scope
//! footprint is excluded entirely, even if in-scope footprints touch it too.
//! This prevents a saved sub-layout from leaking connections that only
//! partially belong to the sub-circuit. The overlap is reported with a
//! `warn!` diagnostic naming the dropped nets.

use std::collections::BTreeSet;

use itertools::Itertools;
use log::{debug, warn};

use sublayout_board::{Board, BoardItem, Group, ItemId, ItemKind, NetId};

use crate::hier;
use crate::identity::{self, GroupIdentity};

/// In-scope partition of a board, as computed by
/// [`HierarchySelector::get_elts`].
#[derive(Debug)]
pub struct FilterResult {
    /// In-scope items with no preserved enclosing group.
    pub ungrouped: Vec<ItemId>,
    /// Outermost fully-in-scope grouping containers; each covers its whole
    /// subtree.
    pub groups: Vec<GroupIdentity>,
    /// All in-scope footprints, grouped or not.
    pub footprints: Vec<ItemId>,
    /// Effective in-scope net set (include − exclude).
    pub nets: BTreeSet<NetId>,
}

impl FilterResult {
    /// Root item ids of the in-scope forest: ungrouped items plus covering
    /// group containers.
    pub fn root_items(&self) -> Vec<ItemId> {
        let mut roots = self.ungrouped.clone();
        roots.extend(self.groups.iter().filter_map(GroupIdentity::group));
        roots
    }
}

/// Selects the sub-layout under one hierarchical path prefix.
#[derive(Debug, Clone)]
pub struct HierarchySelector {
    path_prefix: Vec<String>,
}

impl HierarchySelector {
    pub fn new(path_prefix: &[String]) -> Self {
        Self {
            path_prefix: path_prefix.to_vec(),
        }
    }

    pub fn path_prefix(&self) -> &[String] {
        &self.path_prefix
    }

    /// Partition `board` into in-scope and out-of-scope items.
    pub fn get_elts(&self, board: &Board) -> FilterResult {
        let mut include: BTreeSet<NetId> = BTreeSet::new();
        let mut exclude: BTreeSet<NetId> = BTreeSet::new();
        let mut footprints: Vec<ItemId> = Vec::new();

        for (id, fp) in board.footprints() {
            let pad_nets = fp.pads.iter().map(|p| p.net).filter(|n| n.is_connected());
            if hier::starts_with(fp, &self.path_prefix) {
                footprints.push(id);
                include.extend(pad_nets);
            } else {
                exclude.extend(pad_nets);
            }
        }

        let overlap: Vec<NetId> = include.intersection(&exclude).copied().collect();
        if !overlap.is_empty() {
            warn!(
                "{} nets touch footprints both inside and outside {:?} and are dropped \
                 from the sub-layout: {}",
                overlap.len(),
                self.path_prefix.join("/"),
                overlap
                    .iter()
                    .map(|n| board.net_name(*n).unwrap_or("?"))
                    .join(", ")
            );
        }
        let nets: BTreeSet<NetId> = include.difference(&exclude).copied().collect();

        // In-scope leaves: the footprints plus all copper on in-scope nets.
        // Drawings carry no connectivity and are never in scope.
        let mut in_scope: BTreeSet<ItemId> = footprints.iter().copied().collect();
        for (id, track) in board.tracks() {
            if nets.contains(&track.net) {
                in_scope.insert(id);
            }
        }
        for (id, zone) in board.zones() {
            if nets.contains(&zone.net) {
                in_scope.insert(id);
            }
        }

        // A group survives only if its subtree contains at least one
        // in-scope leaf and no out-of-scope leaf: a container straddling
        // the scope boundary cannot be preserved as a unit.
        let mut survivors: BTreeSet<ItemId> = BTreeSet::new();
        for (gid, _) in board.groups() {
            let (any_in, any_out) = classify_subtree(board, gid, &in_scope);
            if any_in && !any_out {
                survivors.insert(gid);
            }
        }

        let ungrouped: Vec<ItemId> = in_scope
            .iter()
            .copied()
            .filter(|id| {
                match board.get(*id).and_then(|item| item.parent_group()) {
                    Some(parent) => !survivors.contains(&parent),
                    None => true,
                }
            })
            .collect();

        let identities: Vec<GroupIdentity> = survivors
            .iter()
            .map(|gid| GroupIdentity::of(board, Some(*gid)))
            .collect();
        let groups = identity::highest_covering_groups(board, &identities);

        debug!(
            "scope {:?}: {} footprints, {} nets, {} loose items, {} covering groups",
            self.path_prefix.join("/"),
            footprints.len(),
            nets.len(),
            ungrouped.len(),
            groups.len()
        );

        FilterResult {
            ungrouped,
            groups,
            footprints,
            nets,
        }
    }

    /// Materialize the in-scope subset as a standalone board: net
    /// definitions referenced by the copied items, the loose items, and
    /// each covering group's entire subtree. A lone covering group with no
    /// loose items is flattened: its contents land at the new board's root
    /// rather than inside a redundant outer container.
    pub fn create_sublayout(&self, board: &Board) -> Board {
        let result = self.get_elts(board);
        let mut out = Board::new();

        let roots = match (&result.groups[..], &result.ungrouped[..]) {
            ([only], []) if only.group().is_some() => match only.group() {
                Some(gid) => board.members(gid).to_vec(),
                None => result.root_items(),
            },
            _ => result.root_items(),
        };

        let mut referenced: BTreeSet<NetId> = BTreeSet::new();
        for &root in &roots {
            collect_net_refs(board, root, &mut referenced);
        }
        for net in referenced {
            out.add_net(net, board.net_name(net).unwrap_or(""));
        }

        for &root in &roots {
            deep_copy(board, &mut out, root, None);
        }
        out
    }

    /// Destructively remove the in-scope subset from `board`. Items whose
    /// kind is in `exclude_kinds` are detached from their containers but
    /// kept on the board (e.g. keep footprints as position references while
    /// purging their routing).
    pub fn delete(&self, board: &mut Board, exclude_kinds: &[ItemKind]) {
        let result = self.get_elts(board);
        for root in result.root_items() {
            delete_subtree(board, root, exclude_kinds);
        }
    }
}

/// Whether a group's subtree contains in-scope leaves / out-of-scope
/// leaves. Nested groups and drawings are neutral.
fn classify_subtree(board: &Board, group: ItemId, in_scope: &BTreeSet<ItemId>) -> (bool, bool) {
    let mut any_in = false;
    let mut any_out = false;
    for &member in board.members(group) {
        match board.get(member) {
            Some(BoardItem::Group(_)) => {
                let (nested_in, nested_out) = classify_subtree(board, member, in_scope);
                any_in |= nested_in;
                any_out |= nested_out;
            }
            Some(BoardItem::Drawing(_)) | None => {}
            Some(BoardItem::Footprint(_) | BoardItem::Track(_) | BoardItem::Zone(_)) => {
                if in_scope.contains(&member) {
                    any_in = true;
                } else {
                    any_out = true;
                }
            }
        }
    }
    (any_in, any_out)
}

fn collect_net_refs(board: &Board, id: ItemId, nets: &mut BTreeSet<NetId>) {
    match board.get(id) {
        Some(BoardItem::Footprint(fp)) => {
            nets.extend(fp.pads.iter().map(|p| p.net).filter(|n| n.is_connected()));
        }
        Some(BoardItem::Track(t)) => {
            if t.net.is_connected() {
                nets.insert(t.net);
            }
        }
        Some(BoardItem::Zone(z)) => {
            if z.net.is_connected() {
                nets.insert(z.net);
            }
        }
        Some(BoardItem::Group(g)) => {
            for member in g.members.clone() {
                collect_net_refs(board, member, nets);
            }
        }
        Some(BoardItem::Drawing(_)) | None => {}
    }
}

/// Recursively duplicate an item subtree from `src` onto `dst`, preserving
/// group structure.
fn deep_copy(src: &Board, dst: &mut Board, id: ItemId, parent: Option<ItemId>) {
    let Some(item) = src.get(id) else {
        return;
    };
    match item {
        BoardItem::Group(g) => {
            let members = g.members.clone();
            let new_id = dst.add(BoardItem::Group(Group::new(&g.name)));
            if let Some(parent) = parent {
                // Both ids were created on `dst` in this walk; cannot fail.
                let _ = dst.attach(parent, new_id);
            }
            for member in members {
                deep_copy(src, dst, member, Some(new_id));
            }
        }
        other => {
            let new_id = dst.add(other.clone());
            if let Some(parent) = parent {
                let _ = dst.attach(parent, new_id);
            }
        }
    }
}

fn delete_subtree(board: &mut Board, id: ItemId, exclude_kinds: &[ItemKind]) {
    let Some(item) = board.get(id) else {
        return;
    };
    let kind = item.kind();
    if let BoardItem::Group(g) = item {
        for member in g.members.clone() {
            delete_subtree(board, member, exclude_kinds);
        }
    }
    if exclude_kinds.contains(&kind) {
        let _ = board.detach(id);
    } else {
        board.remove(id);
    }
}
