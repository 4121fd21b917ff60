// Probe a LAB ID reader and list the tags in its field.
//
// Usage:
//   cargo run -p liblabid --example probe -- 192.168.1.50:4001
//   cargo run -p liblabid --example probe --features serial -- /dev/ttyUSB0

use anyhow::{Context, bail};
use liblabid::prelude::*;

fn open(target: &str) -> anyhow::Result<Box<dyn Transport>> {
    if target.contains(':') && !target.starts_with("/dev/") {
        let t = TcpTransport::connect(target).with_context(|| format!("connecting to {}", target))?;
        return Ok(Box::new(t));
    }

    #[cfg(feature = "serial")]
    {
        use liblabid::transport::SerialTransport;
        use liblabid::transport::stream::DEFAULT_BAUD_RATE;
        let t = SerialTransport::open(target, DEFAULT_BAUD_RATE)?;
        return Ok(Box::new(t));
    }

    #[cfg(not(feature = "serial"))]
    bail!("{} looks like a serial port; rebuild with --features serial", target)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let Some(target) = std::env::args().nth(1) else {
        bail!("usage: probe <host:port | serial port>");
    };

    println!("Opening {}...", target);
    let engine = EngineBuilder::new()
        .with_transport(open(&target)?)
        .connect()
        .context("reader did not answer")?;

    println!("Firmware: {}", engine.software_version()?);
    match engine.reader_uid() {
        Ok(uid) => println!("Reader UID: {}", uid),
        Err(e) => println!("Reader UID unavailable: {}", e),
    }

    println!("\n=== ISO14443A ===");
    let iso_a = Iso14443a::new(engine.clone());
    match iso_a.activate_idle()? {
        Some(target) => println!(
            "Activated {} ({}), ATQA {}, SAK {:02X}",
            target.uid,
            target.card_type(),
            bytes_to_hex(target.atqa.as_bytes()),
            target.sak
        ),
        None => println!("No tag to activate"),
    }
    for uid in iso_a.snapshot()? {
        println!("  {}", uid);
    }

    println!("\n=== ISO15693 ===");
    let tags = Iso15693::new(engine.clone()).snapshot()?;
    if tags.is_empty() {
        println!("No tags");
    }
    for uid in tags {
        println!("  {}", uid.reversed());
    }

    println!("\n=== Picopass ===");
    match Picopass::new(engine).get_uid()? {
        Some(uid) => println!("  {}", uid),
        None => println!("No tags"),
    }

    Ok(())
}
