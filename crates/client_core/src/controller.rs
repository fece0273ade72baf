//! Async quiz flow: drives [`QuizSession`] transitions around calls to a
//! [`QuizService`].

use std::path::PathBuf;

use tracing::{info, warn};

use crate::{
    error::FlowError,
    session::{AnswerFeedback, QuizSession, Stage},
    stats::StatsImage,
    QuizService,
};

pub struct QuizController<S: QuizService> {
    service: S,
    session: QuizSession,
    stats_dir: Option<PathBuf>,
}

impl<S: QuizService> QuizController<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            session: QuizSession::new(),
            stats_dir: None,
        }
    }

    /// Directory that receives stats image files instead of the system temp dir.
    pub fn with_stats_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.stats_dir = Some(dir.into());
        self
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn stage(&self) -> Stage {
        self.session.stage()
    }

    pub fn select_main(&mut self, main: &str) -> Result<(), FlowError> {
        self.session.select_main(main)?;
        info!(main, "main topic selected");
        Ok(())
    }

    /// Loads the question set for `category` and enters the quiz. On failure
    /// the subcategory screen and any prior session data are kept.
    pub async fn select_category(&mut self, category: &str) -> Result<(), FlowError> {
        let ticket = self.session.begin_load(category)?;
        let result = self.service.fetch_questions(ticket.category()).await;
        if let Err(error) = &result {
            warn!(%category, %error, "failed to load questions");
        }
        self.session.finish_load(ticket, result)?;
        info!(
            %category,
            questions = self.session.questions().len(),
            "quiz started"
        );
        Ok(())
    }

    pub async fn submit_answer(&mut self, option: &str) -> Result<&AnswerFeedback, FlowError> {
        let (ticket, request) = self.session.begin_submit(option)?;
        let result = self.service.submit_answer(&request).await;
        if let Err(error) = &result {
            warn!(question_id = %request.question_id, %error, "failed to submit answer");
        }
        self.session.finish_submit(ticket, result)
    }

    pub fn advance(&mut self) -> Result<Stage, FlowError> {
        let stage = self.session.advance()?;
        if stage == Stage::End {
            info!(
                category = ?self.session.selected_category(),
                "quiz completed"
            );
        }
        Ok(stage)
    }

    pub async fn show_stats(&mut self) -> Result<&StatsImage, FlowError> {
        let ticket = self.session.begin_stats()?;
        let result = match self.service.fetch_stats(ticket.category()).await {
            Ok(bytes) => StatsImage::from_bytes(&bytes, self.stats_dir.as_deref()),
            Err(error) => Err(error),
        };
        if let Err(error) = &result {
            warn!(category = %ticket.category(), %error, "failed to load stats");
        }
        self.session.finish_stats(ticket, result)
    }

    pub fn reset(&mut self) {
        self.session.reset();
        info!("returned home");
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
