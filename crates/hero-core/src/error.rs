use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeroError {
    #[error("image fetch failed: {0}")]
    ImageFetch(String),
    #[error("image decode failed: {0}")]
    ImageDecode(String),
    #[error("load result belongs to a superseded request")]
    StaleTicket,
    #[error("load result matches no outstanding request")]
    UnknownTicket,
    #[error("gpu init failed: {0}")]
    GpuInit(String),
}
