//! Carving sub-layouts out of a board by hierarchy prefix.

use std::collections::BTreeSet;

use sublayout_board::{Board, ItemKind};
use sublayout_engine::HierarchySelector;

mod helpers;
use helpers::*;

fn footprint_refs(board: &Board) -> BTreeSet<String> {
    board
        .footprints()
        .map(|(_, fp)| fp.reference.clone())
        .collect()
}

fn refs(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn save_mcu_block() {
    let board = blinky_board();
    let sub = HierarchySelector::new(&segs(&["sheet-mcu"])).create_sublayout(&board);

    assert_eq!(
        footprint_refs(&sub),
        refs(&["U2", "C3", "C4", "C5", "C6", "C7", "C8", "J2"])
    );
    // The LED zone does not belong to this block.
    assert_eq!(sub.zones().count(), 0);
    // Only the block-local track comes along.
    let tracks: Vec<_> = sub.tracks().collect();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].1.net, MCU_XTAL);
    // Net definitions referenced by the copied items are carried over.
    assert_eq!(sub.net_name(MCU_XTAL), Some("MCU_XTAL"));
    assert_eq!(sub.net_name(VCC), Some("VCC"));
    assert_eq!(sub.net_name(LED_K), None);
}

#[test]
fn save_led_block() {
    let board = blinky_board();
    let sub = HierarchySelector::new(&segs(&["sheet-led"])).create_sublayout(&board);

    assert_eq!(footprint_refs(&sub), refs(&["D1", "R3"]));
    let zones: Vec<_> = sub.zones().collect();
    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0].1.net, LED_K);
}

#[test]
fn save_usb_block_includes_nested_hierarchy() {
    let board = blinky_board();
    let sub = HierarchySelector::new(&segs(&["sheet-usb"])).create_sublayout(&board);
    assert_eq!(footprint_refs(&sub), refs(&["J1", "R1", "R2"]));
}

#[test]
fn save_inner_block_excludes_outer_hierarchy() {
    let board = blinky_board();
    let sub =
        HierarchySelector::new(&segs(&["sheet-usb", "sheet-cc"])).create_sublayout(&board);
    assert_eq!(footprint_refs(&sub), refs(&["R1", "R2"]));
}

#[test]
fn shared_nets_never_leak_into_scope() {
    let board = blinky_board();
    let selector = HierarchySelector::new(&segs(&["sheet-mcu"]));
    let result = selector.get_elts(&board);

    // VCC and GND touch the LED and USB blocks too; only the block-local
    // net survives.
    assert!(result.nets.contains(&MCU_XTAL));
    assert!(!result.nets.contains(&VCC));
    assert!(!result.nets.contains(&GND));

    let sub = selector.create_sublayout(&board);
    assert!(sub.tracks().all(|(_, t)| t.net != VCC));
}

#[test]
fn grouped_scope_preserves_and_flattens_groups() {
    let board = grouped_usb_board();
    let selector = HierarchySelector::new(&segs(&["sheet-usb"]));

    let result = selector.get_elts(&board);
    assert!(result.ungrouped.is_empty());
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.footprints.len(), 3);

    // One covering group, no loose items: its contents are flattened to the
    // new board's root rather than wrapped in a redundant outer container.
    let sub = selector.create_sublayout(&board);
    assert_eq!(footprint_refs(&sub), refs(&["J1", "R1", "R2"]));

    let j1 = sub.find_footprint("J1").unwrap();
    assert_eq!(sub.get(j1).unwrap().parent_group(), None);

    let group_names: Vec<String> = sub.groups().map(|(_, g)| g.name.clone()).collect();
    assert_eq!(group_names, vec!["cc".to_string()]);

    let r1 = sub.find_footprint("R1").unwrap();
    let (cc, _) = sub.groups().next().unwrap();
    assert_eq!(sub.get(r1).unwrap().parent_group(), Some(cc));
}

#[test]
fn straddling_group_falls_back_to_loose_items() {
    let mut board = blinky_board();
    // Group the MCU block together with an LED footprint: the container now
    // straddles the scope boundary and cannot be preserved.
    let mixed = board.add(sublayout_board::BoardItem::Group(
        sublayout_board::Group::new("mixed"),
    ));
    let u2 = board.find_footprint("U2").unwrap();
    let d1 = board.find_footprint("D1").unwrap();
    board.attach(mixed, u2).unwrap();
    board.attach(mixed, d1).unwrap();

    let result = HierarchySelector::new(&segs(&["sheet-mcu"])).get_elts(&board);
    assert!(result.groups.is_empty());
    assert!(result.ungrouped.contains(&u2));
}

#[test]
fn delete_purges_scope_but_keeps_excluded_kinds() {
    let mut board = blinky_board();
    let u2 = board.find_footprint("U2").unwrap();
    HierarchySelector::new(&segs(&["sheet-mcu"]))
        .delete(&mut board, &[ItemKind::Footprint]);

    // Footprints survive (kept as anchors for a later replicate)...
    assert!(board.footprint(u2).is_some());
    assert_eq!(board.footprints().count(), 13);
    // ...the block-local track is gone, shared-net copper is untouched.
    assert!(board.tracks().all(|(_, t)| t.net != MCU_XTAL));
    assert!(board.tracks().any(|(_, t)| t.net == VCC));
    assert_eq!(board.zones().count(), 1);
}

#[test]
fn delete_without_exclusions_removes_footprints_too() {
    let mut board = blinky_board();
    HierarchySelector::new(&segs(&["sheet-mcu"])).delete(&mut board, &[]);
    assert!(board.find_footprint("U2").is_none());
    assert_eq!(
        footprint_refs(&board),
        refs(&["D1", "R3", "J1", "R1", "R2"])
    );
}
