//! Message id rule and header normalization policy.
//!
//! Pure functions of the header and the current time. No locks, no I/O.

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

use super::entities::{MessageEntity, Timestamp};
use super::value_objects::RejectReason;

/// Maximum redelivery attempts a message may request.
pub const MAX_DELIVER_LIMIT: i32 = 100;

/// Maximum time a message may stay in the broker.
pub const MAX_EXPIRED_TIME: Duration = Duration::from_secs(7 * 24 * 3600);

/// Lexical form of a message id.
pub const MESSAGE_ID_PATTERN: &str = "^[0-9a-fA-F]{32}$";

/// Maximum message id length in bytes.
pub const MAX_MESSAGE_ID_LEN: usize = 32;

static MESSAGE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(MESSAGE_ID_PATTERN).expect("invalid message id pattern"));

/// Returns true iff `id` is exactly 32 hex characters, either case.
pub fn is_valid_message_id(id: &str) -> bool {
    id.len() <= MAX_MESSAGE_ID_LEN && MESSAGE_ID_RE.is_match(id)
}

/// Header fields rewritten by [`HeaderPolicy::normalize`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeaderChanges {
    pub create_time: bool,
    pub deliver_limit: bool,
    pub expired_time: bool,
}

impl HeaderChanges {
    pub fn is_empty(&self) -> bool {
        !(self.create_time || self.deliver_limit || self.expired_time)
    }
}

/// Broker-enforced bounds on mutable header fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderPolicy {
    /// Deliver limit used when the header's is unset or out of range.
    pub max_deliver_limit: i32,
    /// Longest allowed distance between now and the expiration time, in seconds.
    pub max_expired_secs: i64,
}

impl Default for HeaderPolicy {
    fn default() -> Self {
        Self {
            max_deliver_limit: MAX_DELIVER_LIMIT,
            max_expired_secs: MAX_EXPIRED_TIME.as_secs() as i64,
        }
    }
}

impl HeaderPolicy {
    pub fn new(max_deliver_limit: i32, max_expired_secs: i64) -> Self {
        Self {
            max_deliver_limit,
            max_expired_secs,
        }
    }

    /// Latest expiration time accepted at `now`.
    pub fn latest_expiry(&self, now: Timestamp) -> Timestamp {
        now.saturating_add(self.max_expired_secs)
    }

    /// Brings the header within bounds, in place.
    ///
    /// Order: creation time, deliver limit, expiration time. An expiration
    /// time that is set, positive and not past the window is left alone,
    /// unless it is at or before `now`, which rejects the message. A value
    /// past the window is clamped, never rejected.
    ///
    /// Applying this twice at the same `now` changes nothing the second time.
    pub fn normalize(
        &self,
        entity: &mut MessageEntity,
        now: Timestamp,
    ) -> Result<HeaderChanges, RejectReason> {
        let mut changes = HeaderChanges::default();
        let header = &mut entity.header;

        if header.create_time.map_or(true, |t| t <= 0) {
            header.create_time = Some(now);
            changes.create_time = true;
        }

        if header
            .deliver_limit
            .map_or(true, |l| l <= 0 || l > self.max_deliver_limit)
        {
            header.deliver_limit = Some(self.max_deliver_limit);
            entity.deliver_limit = self.max_deliver_limit;
            changes.deliver_limit = true;
        }

        let latest = self.latest_expiry(now);
        let expired_time = header.expired_time.unwrap_or(0);
        if expired_time <= 0 || expired_time > latest {
            header.expired_time = Some(latest);
            entity.expired_time = latest;
            changes.expired_time = true;
        } else if expired_time <= now {
            return Err(RejectReason::Expired);
        }

        Ok(changes)
    }
}
