// Shared fixtures for integration tests: a scripted ERP JSON-RPC server and a
// helper that boots a kiosk against it.
#![allow(dead_code)]

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use dojo_kiosk::KioskConfig;
use dojo_kiosk::domain::InputMode;
use dojo_kiosk::use_cases::KioskTimings;
use serde_json::{Value, json};
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

pub const MEMBER_ID: u64 = 7;
pub const MEMBER_BARCODE: &str = "A1234";
pub const MEMBER_PIN: &str = "4821";
pub const INSTRUCTOR_PIN: &str = "2468";
pub const EXIT_PIN: &str = "1357";
pub const OPEN_SESSION_ID: u64 = 31;
pub const RESTRICTED_SESSION_ID: u64 = 32;

// Global base URL of the fake ERP, shared by every test in a binary.
static ERP_URL: OnceLock<String> = OnceLock::new();
static ERP_READY: OnceLock<()> = OnceLock::new();

// Ensure the fake ERP is running and return its base URL.
pub fn ensure_fake_erp() -> &'static str {
    ERP_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);
        // Own thread and runtime so the server outlives individual test runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{}", addr));
                axum::serve(listener, fake_erp())
                    .await
                    .expect("fake erp failed");
            });
        });
        wait_for_url_and_readiness(published_url);
    });

    ERP_URL
        .get()
        .expect("erp url should be initialized")
        .as_str()
}

fn wait_for_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };
    let _ = ERP_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");
    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("fake erp did not become ready in time");
}

/// Timings short enough that tests can wait on them in real time.
pub fn fast_timings() -> KioskTimings {
    KioskTimings {
        pin_submit: Duration::from_millis(50),
        pin_error: Duration::from_millis(300),
        search_debounce: Duration::from_millis(50),
        confirm_dismiss: Duration::from_millis(300),
        ..KioskTimings::default()
    }
}

pub fn kiosk_config(mode: InputMode, terminal_session_id: Option<u64>) -> KioskConfig {
    KioskConfig {
        erp_base_url: url::Url::parse(ensure_fake_erp()).expect("valid erp url"),
        rpc_timeout: Duration::from_secs(2),
        default_mode: mode,
        terminal_session_id,
        timings: fast_timings(),
        exit_pin: EXIT_PIN.to_string(),
    }
}

// Boot a fresh kiosk on an ephemeral port inside the calling test's runtime.
pub async fn spawn_kiosk_server(config: KioskConfig) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        dojo_kiosk::run(listener, config)
            .await
            .expect("kiosk server failed");
    });
    format!("http://{addr}")
}

pub async fn post_input(client: &reqwest::Client, base_url: &str, event: Value) {
    let res = client
        .post(format!("{base_url}/kiosk/input"))
        .json(&event)
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::ACCEPTED, "event {event}");
}

// Poll the rendered view until `predicate` holds.
pub async fn wait_for_view(
    client: &reqwest::Client,
    base_url: &str,
    predicate: impl Fn(&Value) -> bool,
) -> Value {
    let mut last = Value::Null;
    for _ in 0..150 {
        last = client
            .get(format!("{base_url}/kiosk/view"))
            .send()
            .await
            .expect("request should succeed")
            .json::<Value>()
            .await
            .expect("view should be json");
        if predicate(&last) {
            return last;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("view never reached the expected state; last view: {last}");
}

fn fake_erp() -> Router {
    Router::new()
        .route("/dojo/kiosk/lookup", post(lookup))
        .route("/dojo/kiosk/search", post(search))
        .route("/dojo/kiosk/member_info", post(member_info))
        .route("/dojo/kiosk/checkin", post(checkin))
        .route("/dojo/kiosk/instructor_auth", post(instructor_auth))
}

fn member() -> Value {
    json!({
        "id": MEMBER_ID,
        "name": "Ada Lovelace",
        "belt_rank": "blue_belt",
        "avatar_url": format!("/web/image/res.partner/{MEMBER_ID}/avatar_128"),
    })
}

fn rpc_result(result: Value) -> Response {
    Json(json!({"jsonrpc": "2.0", "id": null, "result": result})).into_response()
}

fn params(call: &Value) -> &Value {
    &call["params"]
}

async fn lookup(Json(call): Json<Value>) -> Response {
    let value = params(&call)["value"].as_str().unwrap_or_default();
    let mode = params(&call)["mode"].as_str().unwrap_or_default();
    match (mode, value) {
        ("barcode", MEMBER_BARCODE) | ("pin", MEMBER_PIN) => rpc_result(json!({"member": member()})),
        (_, "HTTP500") => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        (_, "RPCERR") => Json(json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": {"code": 200, "message": "Odoo Server Error"},
        }))
        .into_response(),
        (_, "GARBAGE") => (StatusCode::OK, "<html>not json</html>").into_response(),
        _ => rpc_result(json!({"error": "not_found"})),
    }
}

async fn search(Json(call): Json<Value>) -> Response {
    let query = params(&call)["query"]
        .as_str()
        .unwrap_or_default()
        .to_lowercase();
    let members = if !query.is_empty() && "ada lovelace".contains(&query) {
        vec![member()]
    } else {
        Vec::new()
    };
    rpc_result(json!({"members": members}))
}

async fn member_info(Json(call): Json<Value>) -> Response {
    if params(&call)["partner_id"].as_u64() != Some(MEMBER_ID) {
        return rpc_result(json!({"sessions": [], "history": []}));
    }
    rpc_result(json!({
        "sessions": [{
            "id": OPEN_SESSION_ID,
            "name": "Adult BJJ",
            "time": "06:00 PM",
            "capacity": 20,
            "count": 5,
            "eligible": true,
        }],
        "history": [{
            "session_name": "Adult BJJ",
            "date": "2026-10-10",
            "time": "06:00 PM",
        }],
    }))
}

async fn checkin(Json(call): Json<Value>) -> Response {
    match params(&call)["session_id"].as_u64() {
        None => rpc_result(json!({"error": "session_unavailable"})),
        Some(RESTRICTED_SESSION_ID) => rpc_result(json!({
            "status": "belt_rank_too_low",
            "required_belt": "blue_belt",
        })),
        Some(_) => rpc_result(json!({
            "status": "ok",
            "name": "Ada Lovelace",
            "belt_rank": "blue_belt",
        })),
    }
}

async fn instructor_auth(Json(call): Json<Value>) -> Response {
    let ok = params(&call)["pin"].as_str() == Some(INSTRUCTOR_PIN);
    rpc_result(json!({"ok": ok}))
}
