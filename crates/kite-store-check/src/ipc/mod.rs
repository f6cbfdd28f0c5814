//! # IPC Layer - Store Check
//!
//! Response packets and the acknowledgment builder. The broker answers every
//! rejected message with exactly one negative `MessageStoreAck`.

pub mod ack;
pub mod packets;

pub use ack::{address, reject, store_ack};
pub use packets::*;
