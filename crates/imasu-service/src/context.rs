//! Request context carrying the authenticated member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use imasu_core::types::MemberId;

/// Context for the current authenticated request.
///
/// Only ever built from an identity the credential gate resolved, so
/// self-referential operations cannot be pointed at another member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated member.
    pub member_id: MemberId,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(member_id: MemberId) -> Self {
        Self {
            member_id,
            request_time: Utc::now(),
        }
    }
}
