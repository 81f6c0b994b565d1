//! Content-based group identity.
//!
//! Group containers loaded from two different board documents are never the
//! same object even when they enclose structurally identical content, so
//! equality and ancestry over groups must be computed structurally. A
//! [`GroupIdentity`] reduces a group (or the distinguished "no group" case)
//! to a value: an order-independent collection of child descriptors, nested
//! groups recursively. Equality, hashing, and set membership all go through
//! that value; the underlying item id is carried only so ancestry can be
//! walked on the owning board.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use sublayout_board::{Board, BoardItem, ItemId, Point};

/// Structural descriptor of one direct child of a group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum ChildKey {
    Footprint {
        reference: String,
        position: Point,
        /// Orientation as raw bits: bit-stable across loads of the same
        /// persisted document, which is the equivalence this key exists for.
        orientation_bits: u64,
    },
    Track {
        start: Point,
        end: Point,
        width: i64,
    },
    Zone {
        corners: Vec<Point>,
    },
    Drawing {
        start: Point,
        end: Point,
    },
    Group(BTreeSet<ChildKey>),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum IdentityKey {
    /// The "ungrouped" case: a first-class identity, equal only to itself.
    None,
    Group(BTreeSet<ChildKey>),
}

/// Value-based identity of an optional group container.
///
/// Two identities compare equal iff they enclose structurally equivalent
/// content; this is a content equivalence class, not reference identity.
#[derive(Debug, Clone)]
pub struct GroupIdentity {
    group: Option<ItemId>,
    key: IdentityKey,
}

impl PartialEq for GroupIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for GroupIdentity {}

impl Hash for GroupIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl GroupIdentity {
    /// Identity of `group` on `board`; `None` yields the distinguished
    /// "no group" identity.
    pub fn of(board: &Board, group: Option<ItemId>) -> Self {
        let key = match group {
            None => IdentityKey::None,
            Some(id) => IdentityKey::Group(child_keys(board, id)),
        };
        Self { group, key }
    }

    /// Identity of a footprint's (or any item's) immediate enclosing group.
    pub fn of_parent(board: &Board, item: ItemId) -> Self {
        let parent = board.get(item).and_then(|it| it.parent_group());
        Self::of(board, parent)
    }

    pub fn is_none(&self) -> bool {
        matches!(self.key, IdentityKey::None)
    }

    /// The underlying group id, if this identity denotes an actual group.
    pub fn group(&self) -> Option<ItemId> {
        self.group
    }

    /// Ancestor chain on `board`, root group first, this identity last.
    /// Empty for the "no group" identity.
    fn chain(&self, board: &Board) -> Vec<GroupIdentity> {
        let mut chain = Vec::new();
        let mut current = self.group;
        while let Some(id) = current {
            chain.push(GroupIdentity::of(board, Some(id)));
            current = board.get(id).and_then(|it| it.parent_group());
        }
        chain.reverse();
        chain
    }

    /// True if `self` is a proper ancestor of `other` on `board`.
    fn is_proper_ancestor_of(&self, board: &Board, other: &GroupIdentity) -> bool {
        let chain = other.chain(board);
        chain
            .iter()
            .take(chain.len().saturating_sub(1))
            .any(|anc| anc == self)
    }
}

fn child_keys(board: &Board, group: ItemId) -> BTreeSet<ChildKey> {
    let mut keys = BTreeSet::new();
    for member in board.members(group) {
        let Some(item) = board.get(*member) else {
            continue;
        };
        let key = match item {
            BoardItem::Footprint(f) => ChildKey::Footprint {
                reference: f.reference.clone(),
                position: f.position,
                orientation_bits: f.orientation.to_bits(),
            },
            BoardItem::Track(t) => ChildKey::Track {
                start: t.start,
                end: t.end,
                width: t.width,
            },
            BoardItem::Zone(z) => ChildKey::Zone {
                corners: z.corners.clone(),
            },
            BoardItem::Drawing(d) => ChildKey::Drawing {
                start: d.start,
                end: d.end,
            },
            BoardItem::Group(_) => ChildKey::Group(child_keys(board, *member)),
        };
        keys.insert(key);
    }
    keys
}

/// Deepest identity common to every input's ancestor chain.
///
/// Chains are compared root-to-leaf by value; the walk stops at the first
/// position where any chain diverges or ends. Returns `None` if the inputs
/// are empty, any input is the "no group" identity, or the chains already
/// diverge at the root.
pub fn lowest_common_ancestor(
    board: &Board,
    identities: &[GroupIdentity],
) -> Option<GroupIdentity> {
    if identities.is_empty() || identities.iter().any(GroupIdentity::is_none) {
        return None;
    }
    let chains: Vec<Vec<GroupIdentity>> =
        identities.iter().map(|ident| ident.chain(board)).collect();
    let depth = chains.iter().map(Vec::len).min().unwrap_or(0);

    let mut deepest: Option<GroupIdentity> = None;
    for level in 0..depth {
        let candidate = &chains[0][level];
        if chains.iter().all(|chain| &chain[level] == candidate) {
            deepest = Some(candidate.clone());
        } else {
            break;
        }
    }
    deepest
}

/// Minimal covering set: every input is itself, or a descendant of, exactly
/// one output entry. Inputs are deduplicated (preserving first-occurrence
/// order); an input is absorbed only when a *proper* ancestor of it is also
/// present. "No group" identities pass through, deduplicated.
pub fn highest_covering_groups(
    board: &Board,
    identities: &[GroupIdentity],
) -> Vec<GroupIdentity> {
    let mut deduped: Vec<GroupIdentity> = Vec::new();
    for ident in identities {
        if !deduped.contains(ident) {
            deduped.push(ident.clone());
        }
    }

    let mut covering = Vec::new();
    for ident in &deduped {
        let absorbed = !ident.is_none()
            && deduped
                .iter()
                .any(|other| other != ident && other.is_proper_ancestor_of(board, ident));
        if !absorbed {
            covering.push(ident.clone());
        }
    }
    covering
}
