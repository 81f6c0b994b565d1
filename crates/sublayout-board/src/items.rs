//! Board item types.
//!
//! A board is a flat collection of items; groups add structural membership on
//! top of it. Every item kind that can belong to a group carries its parent
//! group id, and the owning [`Board`](crate::Board) keeps parent pointers and
//! group member lists consistent.

use serde::{Deserialize, Serialize};

use crate::NetId;

/// A point in board coordinates, in integer board units.
///
/// Board space uses the screen convention: x grows rightward, y grows
/// *downward*. Geometry code converting to mathematical angles must flip the
/// sign of y deltas.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Physical side of the board a component or copper feature lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Front,
    Back,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }
}

/// A copper layer. Inner layers are numbered from the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CopperLayer {
    Front,
    Inner(u8),
    Back,
}

impl CopperLayer {
    /// The layer this layer maps to when the front/back sides are swapped.
    /// Inner layers are unaffected.
    pub fn side_swapped(self) -> Self {
        match self {
            CopperLayer::Front => CopperLayer::Back,
            CopperLayer::Back => CopperLayer::Front,
            inner @ CopperLayer::Inner(_) => inner,
        }
    }
}

/// A connection point on a footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    /// Pad number/name, unique within the footprint (e.g. "1", "A7").
    pub number: String,
    pub net: NetId,
}

/// A placed component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Reference designator (e.g. "R12").
    pub reference: String,
    /// Raw hierarchical path string as persisted by the host design tool,
    /// slash-delimited (e.g. "/sheet-uuid/component-uuid"). Opaque except for
    /// segment boundaries.
    pub path: String,
    /// Source file of the hierarchical sheet instantiating this component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheetfile: Option<String>,
    /// Display name of the hierarchical sheet instantiating this component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheetname: Option<String>,
    pub position: Point,
    /// Orientation in radians, mathematical sense.
    pub orientation: f64,
    pub side: Side,
    pub pads: Vec<Pad>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_group: Option<crate::ItemId>,
}

impl Footprint {
    /// Minimal footprint for building boards in code; no pads, front side,
    /// zero orientation.
    pub fn new(reference: &str, path: &str, position: Point) -> Self {
        Self {
            reference: reference.to_string(),
            path: path.to_string(),
            sheetfile: None,
            sheetname: None,
            position,
            orientation: 0.0,
            side: Side::Front,
            pads: Vec::new(),
            parent_group: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Segment,
    /// A via; start and end are the same point.
    Via,
}

/// A copper track segment or via.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub kind: TrackKind,
    pub start: Point,
    pub end: Point,
    pub width: i64,
    pub layer: CopperLayer,
    pub net: NetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_group: Option<crate::ItemId>,
}

impl Track {
    pub fn segment(start: Point, end: Point, width: i64, layer: CopperLayer, net: NetId) -> Self {
        Self {
            kind: TrackKind::Segment,
            start,
            end,
            width,
            layer,
            net,
            parent_group: None,
        }
    }

    pub fn via(at: Point, width: i64, net: NetId) -> Self {
        Self {
            kind: TrackKind::Via,
            start: at,
            end: at,
            width,
            layer: CopperLayer::Front,
            net,
            parent_group: None,
        }
    }
}

/// A filled copper region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Outline corners, in order.
    pub corners: Vec<Point>,
    /// Copper layers the zone occupies.
    pub layers: Vec<CopperLayer>,
    pub net: NetId,
    /// Whether the zone's fill geometry is current. Cleared whenever the
    /// outline is moved; refilling is the host editor's job.
    pub filled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_group: Option<crate::ItemId>,
}

impl Zone {
    pub fn new(corners: Vec<Point>, layer: CopperLayer, net: NetId) -> Self {
        Self {
            corners,
            layers: vec![layer],
            net,
            filled: false,
            parent_group: None,
        }
    }
}

/// A structural grouping of board items, nestable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    /// Member item ids, in insertion order. Maintained by the owning board.
    pub members: Vec<crate::ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_group: Option<crate::ItemId>,
}

impl Group {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            members: Vec::new(),
            parent_group: None,
        }
    }
}

/// A graphic item (outline, silkscreen line). Carries no connectivity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub start: Point,
    pub end: Point,
    /// Host layer name (e.g. "Edge.Cuts"); opaque to this crate.
    pub layer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_group: Option<crate::ItemId>,
}

/// Discriminant of [`BoardItem`], usable as a filter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Footprint,
    Track,
    Zone,
    Group,
    Drawing,
}

/// A board item. Closed set: traversals match exhaustively so that adding a
/// kind is a compile-time-checked change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "lowercase")]
pub enum BoardItem {
    Footprint(Footprint),
    Track(Track),
    Zone(Zone),
    Group(Group),
    Drawing(Drawing),
}

impl BoardItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            BoardItem::Footprint(_) => ItemKind::Footprint,
            BoardItem::Track(_) => ItemKind::Track,
            BoardItem::Zone(_) => ItemKind::Zone,
            BoardItem::Group(_) => ItemKind::Group,
            BoardItem::Drawing(_) => ItemKind::Drawing,
        }
    }

    pub fn parent_group(&self) -> Option<crate::ItemId> {
        match self {
            BoardItem::Footprint(f) => f.parent_group,
            BoardItem::Track(t) => t.parent_group,
            BoardItem::Zone(z) => z.parent_group,
            BoardItem::Group(g) => g.parent_group,
            BoardItem::Drawing(d) => d.parent_group,
        }
    }

    pub(crate) fn set_parent_group(&mut self, parent: Option<crate::ItemId>) {
        match self {
            BoardItem::Footprint(f) => f.parent_group = parent,
            BoardItem::Track(t) => t.parent_group = parent,
            BoardItem::Zone(z) => z.parent_group = parent,
            BoardItem::Group(g) => g.parent_group = parent,
            BoardItem::Drawing(d) => d.parent_group = parent,
        }
    }
}
