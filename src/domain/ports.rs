use async_trait::async_trait;

use crate::domain::class_session::MemberInfo;
use crate::domain::errors::BackendError;
use crate::domain::member::{InputMode, ResolvedMember};
use crate::domain::outcome::CheckinOutcome;

// Port for the ERP procedures the kiosk calls. The kiosk runtime depends on
// this trait, not on the concrete JSON-RPC client.
#[async_trait]
pub trait KioskBackend: Send + Sync {
    // `Ok(None)` is the not-found answer.
    async fn lookup(
        &self,
        mode: InputMode,
        value: &str,
    ) -> Result<Option<ResolvedMember>, BackendError>;

    async fn search(
        &self,
        query: &str,
        session_id: Option<u64>,
    ) -> Result<Vec<ResolvedMember>, BackendError>;

    async fn member_info(&self, partner_id: u64) -> Result<MemberInfo, BackendError>;

    async fn checkin(
        &self,
        partner_id: u64,
        session_id: Option<u64>,
    ) -> Result<CheckinOutcome, BackendError>;

    async fn instructor_auth(&self, pin: &str) -> Result<bool, BackendError>;
}
