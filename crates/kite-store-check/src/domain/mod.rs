//! # Domain Layer - Store Check
//!
//! Pure logic of the check stage.
//!
//! ## Components
//!
//! - `entities`: MessageHeader, MessageEntity, PersistentEvent, ClientConnection
//! - `topics`: TopicAuthorization, the shared snapshot of accepted topics
//! - `policy`: Message id rule and HeaderPolicy normalization
//! - `value_objects`: RejectReason, CheckOutcome

pub mod entities;
pub mod policy;
pub mod topics;
pub mod value_objects;

pub use entities::*;
pub use policy::*;
pub use topics::*;
pub use value_objects::*;
