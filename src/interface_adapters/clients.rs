use crate::domain::{
    AttendanceEntry, BackendError, CheckinOutcome, CheckinStatus, ClassSessionCandidate,
    InputMode, KioskBackend, MemberInfo, ResolvedMember,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use url::Url;

// JSON-RPC client for the ERP kiosk procedures.
// Every procedure is a POST of `{"jsonrpc":"2.0","method":"call","params":{..}}`
// to its own path; the answer sits in `result`.

const LOOKUP_PATH: &str = "/dojo/kiosk/lookup";
const SEARCH_PATH: &str = "/dojo/kiosk/search";
const MEMBER_INFO_PATH: &str = "/dojo/kiosk/member_info";
const CHECKIN_PATH: &str = "/dojo/kiosk/checkin";
const INSTRUCTOR_AUTH_PATH: &str = "/dojo/kiosk/instructor_auth";

// Lookup error codes that just mean "nobody matched".
const NOT_FOUND_CODES: &[&str] = &["not_found", "empty"];

#[derive(Clone)]
pub struct ErpClient {
    http: Client,
    base_url: Url,
}

#[derive(Debug, Serialize)]
struct RpcRequest<P> {
    jsonrpc: &'static str,
    method: &'static str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<R> {
    result: Option<R>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

#[derive(Debug, Serialize)]
struct LookupParams<'a> {
    mode: &'static str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct SearchParams<'a> {
    query: &'a str,
    session_id: Option<u64>,
}

#[derive(Debug, Serialize)]
struct PartnerParams {
    partner_id: u64,
}

#[derive(Debug, Serialize)]
struct CheckinParams {
    partner_id: u64,
    session_id: Option<u64>,
}

#[derive(Debug, Serialize)]
struct PinParams<'a> {
    pin: &'a str,
}

#[derive(Debug, Deserialize)]
struct MemberRecord {
    id: u64,
    name: String,
    #[serde(default)]
    belt_rank: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

impl From<MemberRecord> for ResolvedMember {
    fn from(record: MemberRecord) -> Self {
        ResolvedMember::new(record.id, record.name, record.belt_rank, record.avatar_url)
    }
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    #[serde(default)]
    member: Option<MemberRecord>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    members: Vec<MemberRecord>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionRecord {
    id: u64,
    name: String,
    #[serde(default)]
    time: String,
    #[serde(default)]
    capacity: u32,
    #[serde(default)]
    count: u32,
    #[serde(default = "eligible_by_default")]
    eligible: bool,
    #[serde(default)]
    reason: Option<String>,
}

fn eligible_by_default() -> bool {
    true
}

impl From<SessionRecord> for ClassSessionCandidate {
    fn from(record: SessionRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            time: record.time,
            capacity: record.capacity,
            count: record.count,
            eligible: record.eligible,
            reason: record.reason.filter(|reason| !reason.trim().is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryRecord {
    session_name: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    time: Option<String>,
}

impl From<HistoryRecord> for AttendanceEntry {
    fn from(record: HistoryRecord) -> Self {
        Self {
            session_name: record.session_name,
            date: record.date,
            time: record.time,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MemberInfoResult {
    #[serde(default)]
    sessions: Vec<SessionRecord>,
    #[serde(default)]
    history: Vec<HistoryRecord>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckinResult {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    required_belt: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    belt_rank: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

impl From<CheckinResult> for CheckinOutcome {
    fn from(result: CheckinResult) -> Self {
        Self {
            status: CheckinStatus::from_wire(result.status.as_deref(), result.error.as_deref()),
            required_belt: result.required_belt,
            name: result.name,
            belt_rank: result.belt_rank,
            avatar_url: result.avatar_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InstructorAuthResult {
    #[serde(default)]
    ok: bool,
}

impl ErpClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    async fn call<P, R>(&self, path: &str, params: P) -> Result<R, BackendError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| BackendError::Transport(format!("bad procedure url: {err}")))?;
        let res = self
            .http
            .post(url)
            .json(&RpcRequest {
                jsonrpc: "2.0",
                method: "call",
                params,
            })
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        let status = res.status();

        if !status.is_success() {
            let message = res
                .text()
                .await
                .ok()
                .filter(|body| !body.trim().is_empty());
            return Err(BackendError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let envelope = res
            .json::<RpcResponse<R>>()
            .await
            .map_err(|err| BackendError::Decode(err.to_string()))?;

        if let Some(error) = envelope.error {
            return Err(match error.code {
                Some(code) => BackendError::Rpc(format!("{} (code {code})", error.message)),
                None => BackendError::Rpc(error.message),
            });
        }
        envelope
            .result
            .ok_or_else(|| BackendError::Decode("response has neither result nor error".to_string()))
    }
}

#[async_trait]
impl KioskBackend for ErpClient {
    #[tracing::instrument(name = "erp_lookup", skip(self, value))]
    async fn lookup(
        &self,
        mode: InputMode,
        value: &str,
    ) -> Result<Option<ResolvedMember>, BackendError> {
        let result: LookupResult = self
            .call(
                LOOKUP_PATH,
                LookupParams {
                    mode: mode.as_str(),
                    value,
                },
            )
            .await?;

        match (result.member, result.error) {
            (Some(member), _) => Ok(Some(member.into())),
            (None, Some(code)) if !NOT_FOUND_CODES.contains(&code.as_str()) => {
                Err(BackendError::Rpc(code))
            }
            (None, _) => Ok(None),
        }
    }

    #[tracing::instrument(name = "erp_search", skip(self))]
    async fn search(
        &self,
        query: &str,
        session_id: Option<u64>,
    ) -> Result<Vec<ResolvedMember>, BackendError> {
        let result: SearchResult = self
            .call(SEARCH_PATH, SearchParams { query, session_id })
            .await?;
        if let Some(code) = result.error {
            return Err(BackendError::Rpc(code));
        }

        Ok(result.members.into_iter().map(ResolvedMember::from).collect())
    }

    #[tracing::instrument(name = "erp_member_info", skip(self))]
    async fn member_info(&self, partner_id: u64) -> Result<MemberInfo, BackendError> {
        let result: MemberInfoResult = self
            .call(MEMBER_INFO_PATH, PartnerParams { partner_id })
            .await?;
        if let Some(code) = result.error {
            return Err(BackendError::Rpc(code));
        }

        Ok(MemberInfo {
            sessions: result.sessions.into_iter().map(Into::into).collect(),
            history: result.history.into_iter().map(Into::into).collect(),
        })
    }

    #[tracing::instrument(name = "erp_checkin", skip(self))]
    async fn checkin(
        &self,
        partner_id: u64,
        session_id: Option<u64>,
    ) -> Result<CheckinOutcome, BackendError> {
        // Error codes in the result are outcomes, not transport failures.
        let result: CheckinResult = self
            .call(
                CHECKIN_PATH,
                CheckinParams {
                    partner_id,
                    session_id,
                },
            )
            .await?;
        Ok(result.into())
    }

    #[tracing::instrument(name = "erp_instructor_auth", skip_all)]
    async fn instructor_auth(&self, pin: &str) -> Result<bool, BackendError> {
        let result: InstructorAuthResult =
            self.call(INSTRUCTOR_AUTH_PATH, PinParams { pin }).await?;
        Ok(result.ok)
    }
}
