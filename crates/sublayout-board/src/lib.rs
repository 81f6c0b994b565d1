//! In-memory PCB board document model.
//!
//! This crate owns the board-side data that sub-layout tooling operates on:
//! footprints with pads, tracks and vias, copper zones, graphic drawings,
//! nestable item groups, and the net table. It is deliberately small: a
//! board here is the working representation handed to the selection and
//! replication engine, not a file format. The structures are serialisable
//! with `serde` so documents can be stored or transferred as JSON.
//!
//! Items live in a flat id-keyed map; groups reference their members by id.
//! [`Board::attach`]/[`Board::detach`] are the only ways membership changes,
//! which keeps parent pointers and member lists consistent.

mod items;

pub use items::{
    BoardItem, CopperLayer, Drawing, Footprint, Group, ItemKind, Pad, Point, Side, Track,
    TrackKind, Zone,
};

use std::collections::BTreeMap;
use std::fmt;
use std::num::ParseIntError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable handle to an item on one [`Board`]. Ids are never reused within a
/// board; handles from different boards are unrelated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "String", try_from = "String")]
pub struct ItemId(u64);

impl From<ItemId> for String {
    fn from(id: ItemId) -> String {
        id.0.to_string()
    }
}

impl TryFrom<String> for ItemId {
    type Error = ParseIntError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Ok(ItemId(s.parse()?))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Electrical net identifier. Code 0 is the distinguished "unconnected" net.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "String", try_from = "String")]
pub struct NetId(i32);

impl NetId {
    pub const UNCONNECTED: NetId = NetId(0);

    pub const fn new(code: i32) -> Self {
        NetId(code)
    }

    pub const fn code(self) -> i32 {
        self.0
    }

    pub const fn is_connected(self) -> bool {
        self.0 != 0
    }
}

impl From<NetId> for String {
    fn from(net: NetId) -> String {
        net.0.to_string()
    }
}

impl TryFrom<String> for NetId {
    type Error = ParseIntError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Ok(NetId(s.parse()?))
    }
}

/// Net table entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetInfo {
    pub name: String,
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("no such item: {0}")]
    NoSuchItem(ItemId),

    #[error("item {0} is not a group")]
    NotAGroup(ItemId),
}

/// A board document: a flat item arena plus the net table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Board {
    items: BTreeMap<ItemId, BoardItem>,
    nets: BTreeMap<NetId, NetInfo>,
    next_id: u64,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the board, assigning a fresh id. The item enters the
    /// board ungrouped: any parent pointer is cleared, and a group's member
    /// list starts empty (membership is established via [`Board::attach`]).
    pub fn add(&mut self, mut item: BoardItem) -> ItemId {
        item.set_parent_group(None);
        if let BoardItem::Group(g) = &mut item {
            g.members.clear();
        }
        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.items.insert(id, item);
        id
    }

    /// Clone an existing item onto this board as a fresh ungrouped item.
    pub fn duplicate(&mut self, id: ItemId) -> Option<ItemId> {
        let item = self.items.get(&id)?.clone();
        Some(self.add(item))
    }

    /// Remove an item. The item is detached from its parent group first; if
    /// it is itself a group, its members are orphaned (they stay on the
    /// board, ungrouped), since children have independent existence in the
    /// flat item list.
    pub fn remove(&mut self, id: ItemId) -> Option<BoardItem> {
        self.detach(id).ok()?;
        let item = self.items.remove(&id)?;
        if let BoardItem::Group(g) = &item {
            for member in g.members.clone() {
                if let Some(child) = self.items.get_mut(&member) {
                    child.set_parent_group(None);
                }
            }
        }
        Some(item)
    }

    /// Make `item` a member of `group`, detaching it from any previous
    /// parent. An item belongs to at most one group.
    pub fn attach(&mut self, group: ItemId, item: ItemId) -> Result<(), BoardError> {
        if !matches!(self.items.get(&group), Some(BoardItem::Group(_))) {
            return Err(BoardError::NotAGroup(group));
        }
        self.detach(item)?;
        match self.items.get_mut(&item) {
            Some(it) => it.set_parent_group(Some(group)),
            None => return Err(BoardError::NoSuchItem(item)),
        }
        if let Some(BoardItem::Group(g)) = self.items.get_mut(&group) {
            g.members.push(item);
        }
        Ok(())
    }

    /// Remove `item` from its parent group, if any.
    pub fn detach(&mut self, item: ItemId) -> Result<(), BoardError> {
        let parent = match self.items.get(&item) {
            Some(it) => it.parent_group(),
            None => return Err(BoardError::NoSuchItem(item)),
        };
        let Some(parent) = parent else {
            return Ok(());
        };
        if let Some(BoardItem::Group(g)) = self.items.get_mut(&parent) {
            g.members.retain(|m| *m != item);
        }
        if let Some(it) = self.items.get_mut(&item) {
            it.set_parent_group(None);
        }
        Ok(())
    }

    pub fn get(&self, id: ItemId) -> Option<&BoardItem> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut BoardItem> {
        self.items.get_mut(&id)
    }

    pub fn footprint(&self, id: ItemId) -> Option<&Footprint> {
        match self.items.get(&id) {
            Some(BoardItem::Footprint(f)) => Some(f),
            _ => None,
        }
    }

    pub fn footprint_mut(&mut self, id: ItemId) -> Option<&mut Footprint> {
        match self.items.get_mut(&id) {
            Some(BoardItem::Footprint(f)) => Some(f),
            _ => None,
        }
    }

    pub fn group(&self, id: ItemId) -> Option<&Group> {
        match self.items.get(&id) {
            Some(BoardItem::Group(g)) => Some(g),
            _ => None,
        }
    }

    /// Member ids of a group, empty for non-groups.
    pub fn members(&self, id: ItemId) -> &[ItemId] {
        match self.items.get(&id) {
            Some(BoardItem::Group(g)) => &g.members,
            _ => &[],
        }
    }

    pub fn items(&self) -> impl Iterator<Item = (ItemId, &BoardItem)> {
        self.items.iter().map(|(id, item)| (*id, item))
    }

    /// Ids of items with no parent group, in id order.
    pub fn root_items(&self) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|(_, item)| item.parent_group().is_none())
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn footprints(&self) -> impl Iterator<Item = (ItemId, &Footprint)> {
        self.items.iter().filter_map(|(id, item)| match item {
            BoardItem::Footprint(f) => Some((*id, f)),
            _ => None,
        })
    }

    pub fn tracks(&self) -> impl Iterator<Item = (ItemId, &Track)> {
        self.items.iter().filter_map(|(id, item)| match item {
            BoardItem::Track(t) => Some((*id, t)),
            _ => None,
        })
    }

    pub fn zones(&self) -> impl Iterator<Item = (ItemId, &Zone)> {
        self.items.iter().filter_map(|(id, item)| match item {
            BoardItem::Zone(z) => Some((*id, z)),
            _ => None,
        })
    }

    pub fn groups(&self) -> impl Iterator<Item = (ItemId, &Group)> {
        self.items.iter().filter_map(|(id, item)| match item {
            BoardItem::Group(g) => Some((*id, g)),
            _ => None,
        })
    }

    pub fn drawings(&self) -> impl Iterator<Item = (ItemId, &Drawing)> {
        self.items.iter().filter_map(|(id, item)| match item {
            BoardItem::Drawing(d) => Some((*id, d)),
            _ => None,
        })
    }

    /// Find a footprint by reference designator.
    pub fn find_footprint(&self, reference: &str) -> Option<ItemId> {
        self.footprints()
            .find(|(_, f)| f.reference == reference)
            .map(|(id, _)| id)
    }

    pub fn add_net(&mut self, net: NetId, name: &str) {
        if let Some(existing) = self.nets.get(&net) {
            if existing.name != name {
                log::warn!(
                    "net {} renamed from {:?} to {:?}",
                    net.code(),
                    existing.name,
                    name
                );
            }
        }
        self.nets.insert(
            net,
            NetInfo {
                name: name.to_string(),
            },
        );
    }

    pub fn net(&self, net: NetId) -> Option<&NetInfo> {
        self.nets.get(&net)
    }

    pub fn net_name(&self, net: NetId) -> Option<&str> {
        self.nets.get(&net).map(|n| n.name.as_str())
    }

    pub fn nets(&self) -> impl Iterator<Item = (NetId, &NetInfo)> {
        self.nets.iter().map(|(id, net)| (*id, net))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Board> {
        serde_json::from_str(json)
    }
}
