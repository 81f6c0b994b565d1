//! Shared fixture boards for the integration suites.
//!
//! The "blinky" topology: an MCU block (U2, C3–C8, J2) under the
//! `sheet-mcu` hierarchy instance, an LED block (D1, R3) under `sheet-led`,
//! and a USB block (J1 with a nested CC pull-down sub-block R1/R2) under
//! `sheet-usb`. VCC and GND span all blocks; each block also has local
//! nets.

use std::f64::consts::{FRAC_PI_2, PI};

use sublayout_board::{
    Board, BoardItem, CopperLayer, Footprint, Group, NetId, Pad, Point, Side, Track, Zone,
};

// Target board nets.
pub const VCC: NetId = NetId::new(1);
pub const GND: NetId = NetId::new(2);
pub const MCU_XTAL: NetId = NetId::new(3);
pub const USB_CC1: NetId = NetId::new(4);
pub const USB_CC2: NetId = NetId::new(5);
pub const LED_K: NetId = NetId::new(6);

// Source sub-layout nets (deliberately different ids than the target).
pub const SRC_VCC: NetId = NetId::new(101);
pub const SRC_GND: NetId = NetId::new(102);
pub const SRC_XTAL: NetId = NetId::new(103);

#[allow(unused)]
pub fn segs(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[allow(unused)]
pub fn footprint(
    reference: &str,
    path: &str,
    at: Point,
    pads: &[(&str, NetId)],
) -> BoardItem {
    let mut fp = Footprint::new(reference, path, at);
    fp.pads = pads
        .iter()
        .map(|(number, net)| Pad {
            number: number.to_string(),
            net: *net,
        })
        .collect();
    BoardItem::Footprint(fp)
}

/// The full target board, ungrouped, with the MCU block footprints parked
/// at placeholder positions (replication will pose them).
#[allow(unused)]
pub fn blinky_board() -> Board {
    let mut board = Board::new();
    board.add_net(VCC, "VCC");
    board.add_net(GND, "GND");
    board.add_net(MCU_XTAL, "MCU_XTAL");
    board.add_net(USB_CC1, "USB_CC1");
    board.add_net(USB_CC2, "USB_CC2");
    board.add_net(LED_K, "LED_K");

    // MCU block. U2 is the laid-out anchor; the rest are parked in a row.
    let mut u2 = Footprint::new("U2", "/sheet-mcu/fp-u2", Point::new(50_000, 50_000));
    u2.orientation = FRAC_PI_2;
    u2.pads = vec![
        Pad {
            number: "1".to_string(),
            net: VCC,
        },
        Pad {
            number: "2".to_string(),
            net: GND,
        },
        Pad {
            number: "3".to_string(),
            net: MCU_XTAL,
        },
    ];
    board.add(BoardItem::Footprint(u2));
    for (i, r) in ["c3", "c4", "c5", "c6", "c7"].iter().enumerate() {
        board.add(footprint(
            &r.to_uppercase(),
            &format!("/sheet-mcu/fp-{r}"),
            Point::new(10_000 + 1_000 * i as i64, 10_000),
            &[("1", VCC), ("2", GND)],
        ));
    }
    board.add(footprint(
        "C8",
        "/sheet-mcu/fp-c8",
        Point::new(15_000, 10_000),
        &[("1", MCU_XTAL), ("2", GND)],
    ));
    board.add(footprint(
        "J2",
        "/sheet-mcu/fp-j2",
        Point::new(16_000, 10_000),
        &[("1", VCC), ("2", GND)],
    ));

    // LED block.
    board.add(footprint(
        "D1",
        "/sheet-led/fp-d1",
        Point::new(70_000, 10_000),
        &[("1", VCC), ("2", LED_K)],
    ));
    board.add(footprint(
        "R3",
        "/sheet-led/fp-r3",
        Point::new(71_000, 10_000),
        &[("1", LED_K), ("2", GND)],
    ));

    // USB block with the nested CC pull-down sub-block.
    board.add(footprint(
        "J1",
        "/sheet-usb/fp-j1",
        Point::new(80_000, 10_000),
        &[("1", VCC), ("2", GND), ("3", USB_CC1), ("4", USB_CC2)],
    ));
    board.add(footprint(
        "R1",
        "/sheet-usb/sheet-cc/fp-r1",
        Point::new(81_000, 10_000),
        &[("1", USB_CC1), ("2", GND)],
    ));
    board.add(footprint(
        "R2",
        "/sheet-usb/sheet-cc/fp-r2",
        Point::new(82_000, 10_000),
        &[("1", USB_CC2), ("2", GND)],
    ));

    // Copper: one MCU-local track, one track on the shared VCC net, one LED
    // zone.
    board.add(BoardItem::Track(Track::segment(
        Point::new(50_100, 50_000),
        Point::new(50_500, 50_000),
        200,
        CopperLayer::Front,
        MCU_XTAL,
    )));
    board.add(BoardItem::Track(Track::segment(
        Point::new(40_000, 40_000),
        Point::new(41_000, 40_000),
        400,
        CopperLayer::Front,
        VCC,
    )));
    board.add(BoardItem::Zone(Zone::new(
        vec![
            Point::new(69_000, 9_000),
            Point::new(72_000, 9_000),
            Point::new(72_000, 11_000),
            Point::new(69_000, 11_000),
        ],
        CopperLayer::Back,
        LED_K,
    )));

    board
}

/// `blinky_board` with the USB block gathered into groups:
/// `usb { J1, cc { R1, R2 } }`.
#[allow(unused)]
pub fn grouped_usb_board() -> Board {
    let mut board = blinky_board();
    let usb = board.add(BoardItem::Group(Group::new("usb")));
    let cc = board.add(BoardItem::Group(Group::new("cc")));
    let j1 = board.find_footprint("J1").unwrap();
    let r1 = board.find_footprint("R1").unwrap();
    let r2 = board.find_footprint("R2").unwrap();
    board.attach(usb, j1).unwrap();
    board.attach(usb, cc).unwrap();
    board.attach(cc, r1).unwrap();
    board.attach(cc, r2).unwrap();
    board
}

/// The laid-out MCU sub-layout document: same logical components as the
/// target's MCU block, paths rooted at the block itself, source-local net
/// ids, real routing, and a nested group tree
/// `decoupling { C3, C4, bulk { C5 } }`.
#[allow(unused)]
pub fn mcu_sublayout() -> Board {
    let mut board = Board::new();
    board.add_net(SRC_VCC, "VCC");
    board.add_net(SRC_GND, "GND");
    board.add_net(SRC_XTAL, "MCU_XTAL");

    board.add(footprint(
        "U2",
        "/fp-u2",
        Point::new(1_000, 1_000),
        &[("1", SRC_VCC), ("2", SRC_GND), ("3", SRC_XTAL)],
    ));
    let c3 = board.add(footprint(
        "C3",
        "/fp-c3",
        Point::new(2_000, 1_000),
        &[("1", SRC_VCC), ("2", SRC_GND)],
    ));
    let c4 = board.add(footprint(
        "C4",
        "/fp-c4",
        Point::new(2_000, 1_500),
        &[("1", SRC_VCC), ("2", SRC_GND)],
    ));
    let c5 = board.add(footprint(
        "C5",
        "/fp-c5",
        Point::new(2_000, 2_000),
        &[("1", SRC_VCC), ("2", SRC_GND)],
    ));
    board.add(footprint(
        "C6",
        "/fp-c6",
        Point::new(3_000, 1_000),
        &[("1", SRC_VCC), ("2", SRC_GND)],
    ));
    board.add(footprint(
        "C7",
        "/fp-c7",
        Point::new(3_000, 1_500),
        &[("1", SRC_VCC), ("2", SRC_GND)],
    ));
    board.add(footprint(
        "C8",
        "/fp-c8",
        Point::new(3_000, 2_000),
        &[("1", SRC_XTAL), ("2", SRC_GND)],
    ));
    let mut j2 = Footprint::new("J2", "/fp-j2", Point::new(4_000, 1_000));
    j2.orientation = PI;
    j2.side = Side::Back;
    j2.pads = vec![
        Pad {
            number: "1".to_string(),
            net: SRC_VCC,
        },
        Pad {
            number: "2".to_string(),
            net: SRC_GND,
        },
    ];
    board.add(BoardItem::Footprint(j2));

    let decoupling = board.add(BoardItem::Group(Group::new("decoupling")));
    let bulk = board.add(BoardItem::Group(Group::new("bulk")));
    board.attach(decoupling, c3).unwrap();
    board.attach(decoupling, c4).unwrap();
    board.attach(decoupling, bulk).unwrap();
    board.attach(bulk, c5).unwrap();

    board.add(BoardItem::Track(Track::segment(
        Point::new(1_100, 1_000),
        Point::new(3_000, 1_900),
        200,
        CopperLayer::Front,
        SRC_XTAL,
    )));
    board.add(BoardItem::Track(Track::segment(
        Point::new(1_000, 900),
        Point::new(4_000, 900),
        400,
        CopperLayer::Back,
        SRC_VCC,
    )));
    board.add(BoardItem::Track(Track::via(
        Point::new(2_500, 2_500),
        600,
        SRC_GND,
    )));

    let mut gnd_pour = Zone::new(
        vec![
            Point::new(0, 0),
            Point::new(5_000, 0),
            Point::new(5_000, 3_000),
            Point::new(0, 3_000),
        ],
        CopperLayer::Back,
        SRC_GND,
    );
    gnd_pour.filled = true;
    board.add(BoardItem::Zone(gnd_pour));

    board
}

/// Find a direct member group of `parent` by name.
#[allow(unused)]
pub fn subgroup_named(
    board: &Board,
    parent: sublayout_board::ItemId,
    name: &str,
) -> Option<sublayout_board::ItemId> {
    board
        .members(parent)
        .iter()
        .copied()
        .find(|id| board.group(*id).is_some_and(|g| g.name == name))
}

/// All item ids in a group's subtree, the group itself excluded.
#[allow(unused)]
pub fn subtree_items(board: &Board, root: sublayout_board::ItemId) -> Vec<sublayout_board::ItemId> {
    let mut out = Vec::new();
    for &member in board.members(root) {
        out.push(member);
        if board.group(member).is_some() {
            out.extend(subtree_items(board, member));
        }
    }
    out
}
