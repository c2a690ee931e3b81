use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Cache lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Invalid response body: {0}")]
    InvalidBody(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl RegistryError {
    /// Whether the failure happened while talking to the registry, as opposed
    /// to the registry answering with JSON that breaks the response contract
    pub fn is_remote_fetch(&self) -> bool {
        !matches!(self, RegistryError::MalformedResponse(_))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unparseable version {0:?}")]
pub struct VersionParseError(pub String);
