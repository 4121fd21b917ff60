use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use liblabid::engine::EngineBuilder;
use liblabid::protocol::{Crc16, Frame};
use liblabid::transport::TcpTransport;
use liblabid::Error;

use crate::common;

/// Accept one connection and answer every request with `reply`, written in
/// two pieces to exercise partial reads.
fn spawn_reader(reply: Vec<u8>, requests: usize) -> (String, thread::JoinHandle<Vec<Vec<u8>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut seen = Vec::new();
        for _ in 0..requests {
            let mut len = [0u8; 1];
            stream.read_exact(&mut len).unwrap();
            let mut rest = vec![0u8; len[0] as usize - 1];
            stream.read_exact(&mut rest).unwrap();
            seen.push([len.to_vec(), rest].concat());

            let (a, b) = reply.split_at(3);
            stream.write_all(a).unwrap();
            stream.flush().unwrap();
            thread::sleep(Duration::from_millis(5));
            stream.write_all(b).unwrap();
        }
        seen
    });
    (addr, handle)
}

#[test]
fn probe_over_tcp() {
    let (addr, server) = spawn_reader(common::captured_version_reply(), 1);
    let transport = TcpTransport::connect(addr.as_str()).unwrap();
    let engine = EngineBuilder::new()
        .with_transport(Box::new(transport))
        .connect()
        .unwrap();
    assert_eq!(engine.config().retries, 3);

    let seen = server.join().unwrap();
    assert_eq!(
        Frame::decode_command(&seen[0], &Crc16::default()).unwrap(),
        vec![0x00, 0x01]
    );
}

#[test]
fn silent_peer_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_millis(300));
        drop(stream);
    });

    let engine = EngineBuilder::new()
        .with_transport(Box::new(TcpTransport::connect(addr).unwrap()))
        .with_timeout_ms(50)
        .with_retries(0)
        .build()
        .unwrap();
    assert!(matches!(
        engine.exchange_bytes(&[0xA0, 0x26]),
        Err(Error::Timeout)
    ));
    server.join().unwrap();
}
