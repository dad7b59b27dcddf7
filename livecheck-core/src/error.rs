#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(&'static str),
    #[error("Invalid instant")]
    InvalidInstant,
    #[error("Status unavailable")]
    StatusUnavailable,
    #[error("std::io error: {0}")]
    IoError(std::io::Error),
    #[error("reqwest error: {0}")]
    ReqwestError(reqwest::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::ReqwestError(err)
    }
}
