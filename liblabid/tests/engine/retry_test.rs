use liblabid::engine::EngineConfig;
use liblabid::protocol::Command;
use liblabid::standards::Iso14443a;
use liblabid::Error;

use crate::common;

#[test]
fn two_timeouts_then_success() {
    let (mock, engine) = common::mock_engine();
    mock.push_timeout();
    mock.push_timeout();
    mock.push_reply(0x00, &[0x42]).unwrap();

    let payload = engine.exchange(&Command::new(0xA0, 0x30).byte(1)).unwrap();
    assert_eq!(payload, vec![0x42]);
    // one attempt plus exactly two retries
    assert_eq!(mock.sent().len(), 3);
    assert_eq!(mock.discard_count(), 2);
    assert_eq!(mock.pending(), 0);
}

#[test]
fn no_tag_status_on_activation_is_none_without_retry() {
    let (mock, engine) = common::mock_engine();
    mock.push_reply(0x01, &[]).unwrap();
    mock.push_reply(0x00, &[0xFF]).unwrap();

    let iso = Iso14443a::new(engine);
    assert!(iso.activate_idle().unwrap().is_none());
    assert_eq!(mock.sent().len(), 1);
    assert_eq!(mock.discard_count(), 0);
    assert_eq!(mock.pending(), 1);
}

#[test]
fn retry_bound_follows_configuration() {
    let (mock, engine) = common::mock_engine_with_config(EngineConfig::default().with_retries(0));
    mock.push_timeout();
    mock.push_reply(0x00, &[]).unwrap();

    assert!(matches!(
        engine.exchange(&Command::new(0xA0, 0x50)),
        Err(Error::Timeout)
    ));
    assert_eq!(mock.sent().len(), 1);
}

#[test]
fn corrupted_reply_is_retried_then_reported() {
    let (mock, engine) = common::mock_engine();
    for _ in 0..4 {
        let mut frame = common::reply_frame(0x00, &[1, 2, 3]);
        frame[5] ^= 0xFF;
        mock.push_response(frame);
    }
    assert!(matches!(
        engine.exchange(&Command::new(0xA0, 0x30).byte(0)),
        Err(Error::ChecksumMismatch { .. })
    ));
    assert_eq!(mock.sent().len(), 4);
}

#[test]
fn protocol_status_is_reported_once() {
    let (mock, engine) = common::mock_engine();
    mock.push_reply(0x05, &[]).unwrap();
    match engine.exchange(&Command::new(0xA0, 0x30).byte(0)) {
        Err(e @ Error::Protocol { code: 0x05 }) => assert!(!e.is_transient()),
        other => panic!("expected protocol error, got {:?}", other),
    }
    assert_eq!(mock.sent().len(), 1);
}
