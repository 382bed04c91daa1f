use std::{path::PathBuf, time::Duration};

use game_session::SessionError;
use thiserror::Error;

/// The agent could not be reached or said nothing usable. Each one costs
/// the acquisition an attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("agent did not answer within {0:?}")]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Http(String),

    #[error("agent endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unusable reply: {0}")]
    Unusable(String),

    #[error("environment variable {0} holding the API key is not set")]
    MissingApiKey(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::Http(e.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    /// A newer acquisition started (new game, pause, resignation). The
    /// result must be dropped without touching the session.
    #[error("acquisition superseded by a newer one")]
    Cancelled,

    /// Every attempt was spent without a legal proposal.
    #[error("no legal move after {attempts} attempts")]
    BudgetExhausted {
        attempts: u32,
        rejected: Vec<String>,
        last_transport_error: Option<TransportError>,
    },
}

pub type AcquisitionResult<T> = Result<T, AcquisitionError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error("it is {0}'s turn and no agent sits there")]
    NotAgentTurn(chess_core::Color),

    #[error("it is {0}'s turn and an agent sits there")]
    NotHumanTurn(chess_core::Color),
}

pub type ControllerResult<T> = Result<T, ControllerError>;
