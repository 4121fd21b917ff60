#![cfg(feature = "serial")]

// These tests need a LAB ID reader on a serial port named by the
// `LABID_PORT` environment variable. They are marked `#[ignore]` so CI does
// not attempt to run them. Run manually with:
//
// LABID_PORT=/dev/ttyUSB0 cargo test -p liblabid --test hardware --features serial -- --ignored
//

use std::sync::Arc;

use liblabid::engine::EngineBuilder;
use liblabid::standards::{Iso14443a, Iso15693, TagSource};
use liblabid::transport::SerialTransport;
use liblabid::transport::stream::DEFAULT_BAUD_RATE;
use liblabid::{ProtocolEngine, Result};
use serial_test::serial;

/// 実機を開いて probe する。ポート未指定なら `Ok(None)`。
fn open_reader() -> Result<Option<Arc<ProtocolEngine>>> {
    let Ok(port) = std::env::var("LABID_PORT") else {
        return Ok(None);
    };
    let _ = env_logger::builder().is_test(true).try_init();
    let transport = SerialTransport::open(&port, DEFAULT_BAUD_RATE)?;
    let engine = EngineBuilder::new()
        .with_transport(Box::new(transport))
        .connect()?;
    Ok(Some(engine))
}

#[test]
#[ignore]
#[serial]
fn probe_and_identify() -> Result<()> {
    if let Some(engine) = open_reader()? {
        let version = engine.software_version()?;
        println!("firmware {}", version);
        println!("reader uid {}", engine.reader_uid()?);
    }
    Ok(())
}

#[test]
#[ignore]
#[serial]
fn snapshot_field() -> Result<()> {
    if let Some(engine) = open_reader()? {
        for uid in Iso14443a::new(engine.clone()).snapshot()? {
            println!("iso14443a {}", uid);
        }
        for uid in Iso15693::new(engine).snapshot()? {
            println!("iso15693 {}", uid.reversed());
        }
    }
    Ok(())
}
