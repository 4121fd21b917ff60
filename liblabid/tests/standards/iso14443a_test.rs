use liblabid::standards::Iso14443a;
use liblabid::{CardType, Error, KeySource, KeyType, MifareKey, Uid};

use crate::common;

#[test]
fn activate_ultralight() {
    let (mock, engine) = common::mock_engine();
    mock.push_reply(0x00, &common::ultralight_activation()).unwrap();
    let iso = Iso14443a::new(engine);

    let target = iso.activate_idle().unwrap().unwrap();
    assert_eq!(target.uid.as_bytes(), &common::sample_uid7());
    assert_eq!(target.card_type(), CardType::Ultralight);
    assert_eq!(mock.sent_bodies()[0], vec![0xA0, 0x90]);
}

#[test]
fn wake_up_then_read_classic_block() {
    let (mock, engine) = common::mock_engine();
    mock.push_reply(0x00, &common::classic_activation()).unwrap();
    mock.push_reply(0x00, &[]).unwrap();
    mock.push_reply(0x00, &[]).unwrap();
    mock.push_reply(0x00, &[0xAB; 16]).unwrap();
    let iso = Iso14443a::new(engine);

    let uid = Uid::from_slice(&common::sample_uid4());
    let target = iso.activate_wakeup(&uid).unwrap().unwrap();
    assert_eq!(target.card_type(), CardType::Classic1k);

    iso.authenticate(KeyType::A, &uid, KeySource::from(MifareKey::DEFAULT), 4)
        .unwrap();
    assert_eq!(iso.read16(4).unwrap(), [0xAB; 16]);

    let bodies = mock.sent_bodies();
    assert_eq!(bodies[0], [vec![0xA0, 0x91], common::sample_uid4().to_vec()].concat());
    assert_eq!(bodies[1], vec![0xA0, 0x19, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(bodies[2], [vec![0xA0, 0x60, 0x04], common::sample_uid4().to_vec()].concat());
    assert_eq!(bodies[3], vec![0xA0, 0x30, 0x04]);
}

#[test]
fn failed_key_load_stops_authentication() {
    let (mock, engine) = common::mock_engine();
    mock.push_reply(0x03, &[]).unwrap();
    let iso = Iso14443a::new(engine);
    let uid = Uid::from_slice(&common::sample_uid4());
    assert!(matches!(
        iso.authenticate(KeyType::B, &uid, MifareKey::DEFAULT.into(), 0),
        Err(Error::Protocol { code: 0x03 })
    ));
    assert_eq!(mock.sent().len(), 1);
}

#[test]
fn value_operations_layout() {
    let (mock, engine) = common::mock_engine();
    for _ in 0..3 {
        mock.push_reply(0x00, &[]).unwrap();
    }
    let iso = Iso14443a::new(engine);
    iso.increment(10, 5, true).unwrap();
    iso.decrement(1, 5, false).unwrap();
    iso.transfer(6).unwrap();

    let bodies = mock.sent_bodies();
    assert_eq!(bodies[0], vec![0xA0, 0xC1, 0x00, 0x05, 0x0A, 0x00, 0x00, 0x00]);
    assert_eq!(bodies[1][..4], [0xA0, 0xC0, 0x01, 0x05]);
    assert_eq!(bodies[2], vec![0xA0, 0xB0, 0x06]);
}

#[test]
fn write_sizes_checked_before_io() {
    let (mock, engine) = common::mock_engine();
    let iso = Iso14443a::new(engine);
    assert!(matches!(iso.write16(&[0; 15], 4), Err(Error::Validation(_))));
    assert!(matches!(iso.write4(&[0; 5], 4), Err(Error::Validation(_))));
    assert!(mock.sent().is_empty());
}

#[test]
fn iso14443_4_pass_through() {
    let (mock, engine) = common::mock_engine();
    mock.push_reply(0x00, &[0x02, 0x90, 0x00]).unwrap();
    let iso = Iso14443a::new(engine);
    assert_eq!(
        iso.exchange_iso14443_4(&[0x00, 0xA4, 0x04, 0x00]).unwrap(),
        vec![0x90, 0x00]
    );
    assert_eq!(
        mock.sent_bodies()[0],
        vec![0xA0, 0xD2, 0x04, 0x00, 0xA4, 0x04, 0x00]
    );
}
