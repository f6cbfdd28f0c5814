//! # Handler Module
//!
//! MessageCheckHandler, the pipeline stage that validates inbound messages.
//!
//! ## Modules
//!
//! - `check`: MessageCheckHandler and the validation chain

mod check;
#[cfg(test)]
mod tests;

pub use check::MessageCheckHandler;
pub(crate) use check::STAGE;
