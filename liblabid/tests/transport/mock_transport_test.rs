use liblabid::protocol::{Crc16, Frame};
use liblabid::transport::{MockTransport, Transport};
use liblabid::Error;

use crate::common;

#[test]
fn queue_then_responder() {
    let mut m = MockTransport::new();
    m.push_response(common::reply_frame(0x00, &[0x01]));
    m.set_responder(|frame| {
        let body = Frame::decode_command(frame, &Crc16::default())?;
        Frame::encode_reply(0x00, &body, &Crc16::default())
    });

    m.send(&Frame::encode(&[0xA0, 0x30], &Crc16::default()).unwrap())
        .unwrap();
    assert_eq!(m.receive(100).unwrap(), common::reply_frame(0x00, &[0x01]));

    m.send(&Frame::encode(&[0xA0, 0x50], &Crc16::default()).unwrap())
        .unwrap();
    let echoed = Frame::decode(&m.receive(100).unwrap(), &Crc16::default()).unwrap();
    assert_eq!(echoed.payload, vec![0xA0, 0x50]);
    assert_eq!(m.receive_count(), 2);
}

#[test]
fn empty_queue_times_out() {
    let mut m = MockTransport::new();
    assert!(matches!(m.receive(100), Err(Error::Timeout)));
}

#[test]
fn injected_errors_surface_in_order() {
    let mut m = MockTransport::new();
    m.push_error(Error::Communication("line noise".into()));
    m.push_timeout();
    assert!(matches!(m.receive(1), Err(Error::Communication(_))));
    assert!(matches!(m.receive(1), Err(Error::Timeout)));
    m.discard_input().unwrap();
    assert_eq!(m.discard_count(), 1);
}

#[test]
fn clones_share_state() {
    let m = MockTransport::new();
    let mut boxed: Box<dyn Transport> = Box::new(m.clone());
    boxed.send(&[0x01, 0x02]).unwrap();
    assert_eq!(m.sent(), vec![vec![0x01, 0x02]]);
}
