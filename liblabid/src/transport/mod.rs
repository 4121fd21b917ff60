// liblabid/src/transport/mod.rs

/// Scripted transport for tests
pub mod mock;
/// TCP and serial transports
pub mod stream;
/// The `Transport` trait
pub mod traits;

pub use mock::MockTransport;
#[cfg(feature = "serial")]
pub use stream::SerialTransport;
pub use stream::{ByteStream, StreamTransport, TcpTransport};
pub use traits::Transport;
