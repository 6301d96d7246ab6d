use std::fmt;

// Failures of a remote ERP call. The controller never shows these to members;
// they are folded into the matching domain failure (not found, load failure,
// pessimistic outcome).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    // Connection refused, timeout, DNS and similar.
    Transport(String),
    // Non-2xx HTTP status from the ERP.
    Upstream { status: u16, message: Option<String> },
    // Body was not the JSON shape we expected.
    Decode(String),
    // JSON-RPC level error object or an `error` code in the result.
    Rpc(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Transport(err) => write!(f, "erp transport error: {err}"),
            BackendError::Upstream { status, message } => {
                if let Some(message) = message {
                    write!(f, "erp upstream error {status}: {message}")
                } else {
                    write!(f, "erp upstream error {status}")
                }
            }
            BackendError::Decode(err) => write!(f, "erp response decode error: {err}"),
            BackendError::Rpc(message) => write!(f, "erp rpc error: {message}"),
        }
    }
}

impl std::error::Error for BackendError {}
