use std::collections::BTreeSet;

use liblabid::standards::{Iso14443a, Iso15693, Picopass, TagSource};
use liblabid::Uid;

use crate::common;

/// What a polling loop does with two snapshots: UIDs that arrived and UIDs
/// that left.
fn diff(before: &[Uid], after: &[Uid]) -> (Vec<Uid>, Vec<Uid>) {
    let b: BTreeSet<_> = before.iter().cloned().collect();
    let a: BTreeSet<_> = after.iter().cloned().collect();
    (
        a.difference(&b).cloned().collect(),
        b.difference(&a).cloned().collect(),
    )
}

#[test]
fn successive_iso14443a_snapshots() {
    let (mock, engine) = common::mock_engine();
    let uid4 = common::sample_uid4();
    let uid7 = common::sample_uid7();
    mock.push_reply(0x00, &common::card_list(&[&uid4])).unwrap();
    mock.push_reply(0x00, &common::card_list(&[&uid7])).unwrap();
    mock.push_reply(0x01, &[]).unwrap();

    let source: Box<dyn TagSource> = Box::new(Iso14443a::new(engine));
    let first = source.snapshot().unwrap();
    let second = source.snapshot().unwrap();
    let third = source.snapshot().unwrap();

    let (arrived, left) = diff(&first, &second);
    assert_eq!(arrived, vec![Uid::from_slice(&uid7)]);
    assert_eq!(left, vec![Uid::from_slice(&uid4)]);
    assert!(third.is_empty());
}

#[test]
fn every_standard_is_a_tag_source() {
    let (mock, engine) = common::mock_engine();
    let mut inventory = vec![0x01];
    inventory.extend_from_slice(&common::sample_uid15693());
    mock.push_reply(0x00, &inventory).unwrap();
    mock.push_reply(0x00, &[0x08, 1, 2, 3, 4, 5, 6, 7, 8]).unwrap();

    let sources: Vec<Box<dyn TagSource>> = vec![
        Box::new(Iso15693::new(engine.clone())),
        Box::new(Picopass::new(engine)),
    ];
    let total: usize = sources.iter().map(|s| s.snapshot().unwrap().len()).sum();
    assert_eq!(total, 2);
}
