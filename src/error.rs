use thiserror::Error;

/// Failure talking to the device over HTTP.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    Status(u16),
    #[error("response too large (>{0}B)")]
    TooLarge(usize),
    #[error("response is not valid UTF-8")]
    NotUtf8,
    #[error("response is not JSON")]
    NotJson,
    #[error("device unavailable: {0}")]
    Unavailable(String),
}

/// A poll cycle that produced no sample. Logged, never shown to the operator.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("status fetch failed: {0}")]
    Fetch(#[from] TransportError),
    #[error("malformed status payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A command submission that did not reach an accepting device.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("device rejected command (HTTP {status})")]
    Rejected { status: u16 },
    #[error("command not delivered: {0}")]
    Network(TransportError),
}

impl From<TransportError> for SubmitError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Status(status) => SubmitError::Rejected { status },
            other => SubmitError::Network(other),
        }
    }
}

/// The renderer refused output at startup; the poll loop was not started.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("renderer not ready")]
pub struct NotReady;

/// Operator console line that could not be understood.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),
    #[error("'{command}' expects {expected}")]
    BadArgument {
        command: &'static str,
        expected: &'static str,
    },
}
