use std::fmt;

pub const GENERIC_FAILURE: &str = "Request failed for an unknown reason";

/// A request that did not produce a usable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl FetchFailure {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn transport(err: impl std::error::Error) -> Self {
        Self {
            status: None,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{status}, {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for FetchFailure {}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err)
    }
}

pub type FetchResult<T> = Result<T, FetchFailure>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("user id is missing")]
    MissingUserId,
    #[error("session token is missing")]
    MissingToken,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("no data to format")]
    NoData,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}
