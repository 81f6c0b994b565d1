//! Rigid 2D transform between two anchor frames.
//!
//! One matched (source, target) anchor footprint pair fixes the transform
//! for an entire replication: translation between the anchor positions,
//! rotation between the anchor orientations, and a mirror flip when the
//! anchors sit on opposite board sides.
//!
//! Board coordinates use the screen convention (y grows downward). All
//! angle math happens in mathematical convention, so vertical deltas change
//! sign on the way in and out; this is deliberate and must not be "fixed".

use std::f64::consts::{PI, TAU};

use sublayout_board::{Footprint, Point, Side};

/// Immutable transform derived from one anchor pair. Constructed once per
/// replication, read-only afterwards.
#[derive(Debug, Clone)]
pub struct PositionTransform {
    source_position: Point,
    source_orientation: f64,
    source_side: Side,
    target_position: Point,
    target_orientation: f64,
    target_side: Side,
}

/// Normalize an angle into (−π, π].
fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

impl PositionTransform {
    /// The anchor pair is explicit; it is never inferred from the position
    /// of a pair in some list.
    pub fn from_anchors(source: &Footprint, target: &Footprint) -> Self {
        Self {
            source_position: source.position,
            source_orientation: source.orientation,
            source_side: source.side,
            target_position: target.position,
            target_orientation: target.orientation,
            target_side: target.side,
        }
    }

    /// True iff the anchors sit on opposite sides, i.e. the whole sub-layout
    /// is mirrored. Mirroring reverses the sense of rotation and swaps
    /// front/back copper of replicated items.
    pub fn relative_flipped(&self) -> bool {
        self.source_side != self.target_side
    }

    /// Map a source-board point into target-board space.
    pub fn transform(&self, point: Point) -> Point {
        let dx = (point.x - self.source_position.x) as f64;
        // Screen y grows downward; flip into mathematical convention.
        let dy = -((point.y - self.source_position.y) as f64);
        let dist = dx.hypot(dy);
        let rel_angle = dy.atan2(dx) - self.source_orientation;
        let target_angle = if self.relative_flipped() {
            self.target_orientation - rel_angle
        } else {
            self.target_orientation + rel_angle
        };
        Point {
            x: self.target_position.x + (target_angle.cos() * dist).round() as i64,
            y: self.target_position.y - (target_angle.sin() * dist).round() as i64,
        }
    }

    /// Map a source orientation angle (radians) into target space,
    /// normalized into (−π, π].
    pub fn transform_orientation(&self, orientation: f64) -> f64 {
        let mut rel = orientation - self.source_orientation;
        if self.relative_flipped() {
            rel = -rel;
        }
        normalize_angle(self.target_orientation + rel)
    }

    /// Map a source board side into target space: the item's side relative
    /// to the source anchor, composed with the anchor-to-anchor mirror
    /// delta.
    pub fn transform_flipped(&self, side: Side) -> Side {
        let rel_flipped = (side == Side::Back) != (self.source_side == Side::Back);
        let flipped = match self.target_side {
            Side::Front => rel_flipped,
            Side::Back => !rel_flipped,
        };
        if flipped { Side::Back } else { Side::Front }
    }
}
