use crate::domain::InputMode;
use crate::use_cases::KioskTimings;
use crate::use_cases::state::{DEFAULT_EXIT_PIN, PIN_LENGTH};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{env, fmt, time::Duration};
use url::Url;

// Runtime/server constants (not kiosk timing).

pub const INPUT_CHANNEL_CAPACITY: usize = 256;
pub const COMPLETION_CHANNEL_CAPACITY: usize = 64;

const DEFAULT_ERP_BASE_URL: &str = "http://127.0.0.1:8069";

pub fn http_port() -> u16 {
    env::var("KIOSK_HTTP_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3010)
}

pub fn erp_base_url() -> Result<Url, ConfigError> {
    let value = env::var("ERP_BASE_URL").unwrap_or_else(|_| DEFAULT_ERP_BASE_URL.to_string());
    Url::parse(&value).map_err(|source| ConfigError::InvalidUrl { value, source })
}

// `0` or an unparsable value means no session is preselected.
pub fn terminal_session_id() -> Option<u64> {
    env::var("KIOSK_SESSION_ID")
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|id| *id != 0)
}

pub fn default_mode() -> InputMode {
    match env::var("KIOSK_DEFAULT_MODE") {
        Ok(value) => InputMode::parse(&value).unwrap_or_else(|| {
            tracing::warn!(value = %value, "unknown KIOSK_DEFAULT_MODE; using barcode");
            InputMode::Barcode
        }),
        Err(_) => InputMode::Barcode,
    }
}

pub fn rpc_timeout() -> Duration {
    let millis = env::var("KIOSK_RPC_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(4000);
    Duration::from_millis(millis)
}

pub fn exit_pin() -> Result<String, ConfigError> {
    match env::var("KIOSK_EXIT_PIN") {
        Ok(value) => parse_exit_pin(&value),
        Err(_) => Ok(DEFAULT_EXIT_PIN.to_string()),
    }
}

// The gate pad only ever produces four digits.
pub fn parse_exit_pin(value: &str) -> Result<String, ConfigError> {
    let pin = value.trim();
    if pin.len() == PIN_LENGTH && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(pin.to_string())
    } else {
        Err(ConfigError::InvalidExitPin)
    }
}

pub fn timings() -> Result<KioskTimings, ConfigError> {
    match env::var("KIOSK_TIMINGS_FILE") {
        Ok(path) if !path.trim().is_empty() => load_timings(Path::new(path.trim())),
        _ => Ok(KioskTimings::default()),
    }
}

/// Everything the kiosk needs at boot.
#[derive(Debug, Clone)]
pub struct KioskConfig {
    pub erp_base_url: Url,
    pub rpc_timeout: Duration,
    pub default_mode: InputMode,
    pub terminal_session_id: Option<u64>,
    pub timings: KioskTimings,
    pub exit_pin: String,
}

impl KioskConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            erp_base_url: erp_base_url()?,
            rpc_timeout: rpc_timeout(),
            default_mode: default_mode(),
            terminal_session_id: terminal_session_id(),
            timings: timings()?,
            exit_pin: exit_pin()?,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidUrl {
        value: String,
        source: url::ParseError,
    },
    TimingsRead {
        path: PathBuf,
        source: std::io::Error,
    },
    TimingsParse(toml::de::Error),
    InvalidExitPin,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidUrl { value, source } => {
                write!(f, "invalid ERP_BASE_URL {value:?}: {source}")
            }
            ConfigError::TimingsRead { path, source } => {
                write!(f, "cannot read timings file {}: {source}", path.display())
            }
            ConfigError::TimingsParse(err) => write!(f, "invalid timings file: {err}"),
            ConfigError::InvalidExitPin => write!(f, "KIOSK_EXIT_PIN must be {PIN_LENGTH} digits"),
        }
    }
}

impl std::error::Error for ConfigError {}

// Every field is optional; missing ones keep the built-in default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TimingsFile {
    barcode_idle_ms: Option<u64>,
    barcode_flash_ms: Option<u64>,
    pin_submit_ms: Option<u64>,
    pin_error_ms: Option<u64>,
    search_debounce_ms: Option<u64>,
    overlay_idle_ms: Option<u64>,
    confirm_dismiss_ms: Option<u64>,
    gate_cooldown_ms: Option<u64>,
}

fn load_timings(path: &Path) -> Result<KioskTimings, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::TimingsRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_timings(&text)
}

pub fn parse_timings(text: &str) -> Result<KioskTimings, ConfigError> {
    let file: TimingsFile = toml::from_str(text).map_err(ConfigError::TimingsParse)?;
    let defaults = KioskTimings::default();
    let pick = |value: Option<u64>, fallback: Duration| {
        value.map(Duration::from_millis).unwrap_or(fallback)
    };

    Ok(KioskTimings {
        barcode_idle: pick(file.barcode_idle_ms, defaults.barcode_idle),
        barcode_flash: pick(file.barcode_flash_ms, defaults.barcode_flash),
        pin_submit: pick(file.pin_submit_ms, defaults.pin_submit),
        pin_error: pick(file.pin_error_ms, defaults.pin_error),
        search_debounce: pick(file.search_debounce_ms, defaults.search_debounce),
        overlay_idle: pick(file.overlay_idle_ms, defaults.overlay_idle),
        confirm_dismiss: pick(file.confirm_dismiss_ms, defaults.confirm_dismiss),
        gate_cooldown: pick(file.gate_cooldown_ms, defaults.gate_cooldown),
    })
}
