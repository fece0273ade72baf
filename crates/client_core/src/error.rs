use thiserror::Error;

use crate::session::{PendingRequest, Stage};

/// Failure of a single call to the quiz service.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("invalid quiz service url: {0}")]
    InvalidBaseUrl(String),
    #[error("request to quiz service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("quiz service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed response from quiz service: {0}")]
    Malformed(String),
    #[error("stats payload is not a renderable image: {0}")]
    NotAnImage(String),
    #[error("failed to store stats image: {0}")]
    Io(#[from] std::io::Error),
}

/// A rejected quiz flow action. The session is left as it was before the call.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("`{action}` is not available on the {stage} screen")]
    WrongStage { action: &'static str, stage: Stage },
    #[error("unknown main topic `{0}`")]
    UnknownMainTopic(String),
    #[error("category `{category}` is not part of {main}")]
    CategoryNotInTopic { category: String, main: &'static str },
    #[error("no main topic selected")]
    NoMainTopicSelected,
    #[error("no category selected")]
    NoCategorySelected,
    #[error("the current question has already been answered")]
    AlreadyAnswered,
    #[error("answer the current question before moving on")]
    NoResultYet,
    #[error("`{0}` is not one of the current options")]
    UnknownOption(String),
    #[error("a {0} request is already in flight")]
    Busy(PendingRequest),
    #[error("response superseded by a newer request")]
    Superseded,
    #[error(transparent)]
    Network(#[from] NetworkError),
}

impl FlowError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
