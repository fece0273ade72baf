use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::CategoryKey,
    error::ApiErrorBody,
    protocol::{Question, SubmitAnswerRequest, SubmitAnswerResponse},
};
use tracing::{debug, warn};
use url::Url;

pub mod controller;
pub mod error;
pub mod session;
pub mod stats;

pub use controller::QuizController;
pub use error::{FlowError, NetworkError};
pub use session::{AnswerFeedback, OptionView, PendingRequest, QuizSession, RequestTicket, Stage};
pub use stats::StatsImage;

/// Remote operations offered by the quiz service.
#[async_trait]
pub trait QuizService: Send + Sync {
    async fn fetch_questions(&self, category: &CategoryKey) -> Result<Vec<Question>, NetworkError>;
    async fn submit_answer(
        &self,
        request: &SubmitAnswerRequest,
    ) -> Result<SubmitAnswerResponse, NetworkError>;
    async fn fetch_stats(&self, category: &CategoryKey) -> Result<Vec<u8>, NetworkError>;
    async fn list_categories(&self) -> Result<Vec<CategoryKey>, NetworkError>;
}

/// HTTP client for a quiz service rooted at `base_url` (for example
/// `https://host/api`).
#[derive(Debug, Clone)]
pub struct QuizHttpClient {
    http: Client,
    base_url: Url,
}

impl QuizHttpClient {
    pub fn new(base_url: &str) -> Result<Self, NetworkError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, NetworkError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|err| NetworkError::InvalidBaseUrl(format!("{base_url}: {err}")))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(NetworkError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        url
    }
}

#[async_trait]
impl QuizService for QuizHttpClient {
    async fn fetch_questions(&self, category: &CategoryKey) -> Result<Vec<Question>, NetworkError> {
        let url = self.endpoint("questions");
        debug!(%url, %category, "fetching questions");
        let res = self
            .http
            .get(url)
            .query(&[("category", category.as_str())])
            .send()
            .await?;
        read_json(res).await
    }

    async fn submit_answer(
        &self,
        request: &SubmitAnswerRequest,
    ) -> Result<SubmitAnswerResponse, NetworkError> {
        let url = self.endpoint("submit");
        debug!(
            %url,
            category = %request.category,
            question_id = %request.question_id,
            "submitting answer"
        );
        let res = self.http.post(url).json(request).send().await?;
        read_json(res).await
    }

    async fn fetch_stats(&self, category: &CategoryKey) -> Result<Vec<u8>, NetworkError> {
        let url = self.endpoint("stats");
        debug!(%url, %category, "fetching stats image");
        let res = self
            .http
            .get(url)
            .query(&[("category", category.as_str())])
            .send()
            .await?;
        let res = ensure_success(res).await?;
        Ok(res.bytes().await?.to_vec())
    }

    async fn list_categories(&self) -> Result<Vec<CategoryKey>, NetworkError> {
        let url = self.endpoint("categories");
        debug!(%url, "listing categories");
        let res = self.http.get(url).send().await?;
        read_json(res).await
    }
}

async fn ensure_success(res: Response) -> Result<Response, NetworkError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let message = match res.text().await {
        Ok(body) => ApiErrorBody::message_from_body(&body),
        Err(error) => {
            warn!(status = status.as_u16(), %error, "failed to read error body");
            String::new()
        }
    };
    let message = if message.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        message
    };
    warn!(status = status.as_u16(), %message, "quiz service rejected request");
    Err(NetworkError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(res: Response) -> Result<T, NetworkError> {
    let res = ensure_success(res).await?;
    let bytes = res.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| NetworkError::Malformed(err.to_string()))
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
