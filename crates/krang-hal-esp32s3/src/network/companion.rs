//! Companion inbox framing.
//!
//! The phone sends one settings dictionary per UDP datagram. Datagrams are
//! copied into a fixed buffer before crossing from the network task to the UI
//! loop; only the newest unread one is kept.

pub use krang_core::message::{MAX_MESSAGE_LEN, MessageBuffer, buffer_message};

/// Default UDP port of the settings inbox.
pub const COMPANION_PORT: u16 = 47_800;
