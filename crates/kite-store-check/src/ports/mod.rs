//! Ports layer for the check stage.
//!
//! - Inbound (Driving) ports: how the pipeline drives the stage
//! - Outbound (Driven) ports: the pipeline context and the clock

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
