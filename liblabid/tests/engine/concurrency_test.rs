use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use liblabid::protocol::{Command, Crc16, Frame};
use liblabid::transport::Transport;
use liblabid::{ProtocolEngine, Result};

/// Echoes the parameters of each command and counts any send that arrives
/// while a previous request is still waiting for its reply.
struct Instrumented {
    in_flight: Arc<AtomicBool>,
    overlaps: Arc<AtomicUsize>,
    exchanges: Arc<AtomicUsize>,
    pending: Option<Vec<u8>>,
}

impl Transport for Instrumented {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.pending = Some(Frame::decode_command(data, &Crc16::default())?);
        Ok(())
    }

    fn receive(&mut self, _timeout_ms: u64) -> Result<Vec<u8>> {
        thread::sleep(Duration::from_micros(200));
        let body = self.pending.take().unwrap_or_default();
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        self.in_flight.store(false, Ordering::SeqCst);
        Frame::encode_reply(0x00, body.get(2..).unwrap_or(&[]), &Crc16::default())
    }
}

#[test]
fn concurrent_exchanges_never_interleave() {
    let overlaps = Arc::new(AtomicUsize::new(0));
    let exchanges = Arc::new(AtomicUsize::new(0));
    let transport = Instrumented {
        in_flight: Arc::new(AtomicBool::new(false)),
        overlaps: overlaps.clone(),
        exchanges: exchanges.clone(),
        pending: None,
    };
    let engine = Arc::new(ProtocolEngine::new(Box::new(transport)));

    let threads: Vec<_> = (0..8u8)
        .map(|t| {
            let engine = engine.clone();
            thread::spawn(move || {
                for i in 0..25u8 {
                    let cmd = Command::new(0xA0, 0x30).byte(t).byte(i);
                    let payload = engine.exchange(&cmd).unwrap();
                    assert_eq!(payload, vec![t, i], "reply belongs to another caller");
                }
            })
        })
        .collect();

    for handle in threads {
        handle.join().unwrap();
    }

    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    assert_eq!(exchanges.load(Ordering::SeqCst), 8 * 25);
}

#[test]
fn command_sets_share_one_engine() {
    let (mock, engine) = crate::common::mock_engine();
    mock.set_responder(|frame| {
        let body = Frame::decode_command(frame, &Crc16::default())?;
        match body[0] {
            0xA0 => Frame::encode_reply(0x00, &[0x01, 0x04, 1, 2, 3, 4], &Crc16::default()),
            _ => Frame::encode_reply(0x00, &[0x00], &Crc16::default()),
        }
    });

    let a = liblabid::standards::Iso14443a::new(engine.clone());
    let v = liblabid::standards::Iso15693::new(engine);
    let ta = thread::spawn(move || a.show_cards().unwrap());
    let tv = thread::spawn(move || v.inventory().unwrap());

    assert_eq!(ta.join().unwrap().len(), 1);
    assert!(tv.join().unwrap().is_empty());
    assert_eq!(mock.sent().len(), 2);
}
