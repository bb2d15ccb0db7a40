//! Capability for turning an opaque bearer credential into a member identity.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::MemberId;

/// Resolves a bearer credential to the member it belongs to.
///
/// This is the only source of identity for self-referential operations:
/// callers never supply a member id of their own. Implementations must
/// answer quickly and must fail with
/// [`ErrorKind::Unauthenticated`](crate::error::ErrorKind::Unauthenticated)
/// when the credential is missing, malformed, expired, or unknown. How
/// credentials are minted, transported, or expired is not part of this
/// contract.
#[async_trait]
pub trait CredentialResolver: Send + Sync + 'static {
    /// Resolve `credential` to its owning member.
    async fn resolve(&self, credential: &str) -> AppResult<MemberId>;
}
