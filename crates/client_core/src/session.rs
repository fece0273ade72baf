//! Quiz session state and the transitions between screens.
//!
//! Every remote call is split into a `begin_*` step that validates the action
//! and hands out a [`RequestTicket`], and a `finish_*` step that applies the
//! outcome. Only the most recent ticket is honoured, so a late response to an
//! earlier request can never overwrite newer state.

use std::{fmt, time::Instant};

use shared::{
    domain::{find_main_topic, CategoryKey, MainTopic},
    protocol::{Question, SubmitAnswerRequest, SubmitAnswerResponse},
};
use tracing::debug;

use crate::{
    error::{FlowError, NetworkError},
    stats::StatsImage,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Home,
    Subcategory,
    Quiz,
    End,
    Stats,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Subcategory => "subcategory",
            Self::Quiz => "quiz",
            Self::End => "end",
            Self::Stats => "stats",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingRequest {
    Questions,
    Submit,
    Stats,
}

impl fmt::Display for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Questions => "questions",
            Self::Submit => "submit",
            Self::Stats => "stats",
        })
    }
}

/// Handle for one in-flight request, returned by the `begin_*` transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    kind: PendingRequest,
    generation: u64,
    category: CategoryKey,
}

impl RequestTicket {
    pub fn kind(&self) -> PendingRequest {
        self.kind
    }

    pub fn category(&self) -> &CategoryKey {
        &self.category
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub message: String,
    pub correct: Option<bool>,
    pub correct_answer: Option<String>,
}

impl From<SubmitAnswerResponse> for AnswerFeedback {
    fn from(value: SubmitAnswerResponse) -> Self {
        Self {
            message: value.message,
            correct: value.correct,
            correct_answer: value.correct_answer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionView<'a> {
    pub text: &'a str,
    pub enabled: bool,
    pub highlighted: bool,
}

#[derive(Debug, Default)]
pub struct QuizSession {
    stage: Stage,
    selected_main: Option<&'static MainTopic>,
    selected_category: Option<CategoryKey>,
    questions: Vec<Question>,
    current_index: usize,
    feedback: Option<AnswerFeedback>,
    stats_image: Option<StatsImage>,
    pending: Option<RequestTicket>,
    generation: u64,
    question_shown_at: Option<Instant>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn selected_main(&self) -> Option<&'static MainTopic> {
        self.selected_main
    }

    pub fn selected_category(&self) -> Option<&CategoryKey> {
        self.selected_category.as_ref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.stage != Stage::Quiz {
            return None;
        }
        self.questions.get(self.current_index)
    }

    pub fn feedback(&self) -> Option<&AnswerFeedback> {
        self.feedback.as_ref()
    }

    pub fn last_result_message(&self) -> Option<&str> {
        self.feedback.as_ref().map(|feedback| feedback.message.as_str())
    }

    pub fn awaiting_next(&self) -> bool {
        self.feedback.is_some()
    }

    pub fn stats_image(&self) -> Option<&StatsImage> {
        self.stats_image.as_ref()
    }

    pub fn pending(&self) -> Option<PendingRequest> {
        self.pending.as_ref().map(RequestTicket::kind)
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Categories offered on the subcategory screen.
    pub fn category_choices(&self) -> Vec<CategoryKey> {
        self.selected_main
            .map(MainTopic::category_keys)
            .unwrap_or_default()
    }

    /// The option to highlight as correct. Nothing is revealed until the
    /// current question has a result.
    pub fn correct_option(&self) -> Option<&str> {
        let feedback = self.feedback.as_ref()?;
        if let Some(answer) = feedback.correct_answer.as_deref() {
            return Some(answer);
        }
        self.current_question()?.answer.as_deref()
    }

    pub fn option_views(&self) -> Vec<OptionView<'_>> {
        let Some(question) = self.current_question() else {
            return Vec::new();
        };
        let correct = self.correct_option();
        let enabled = self.feedback.is_none() && self.pending.is_none();
        question
            .options
            .iter()
            .map(|option| OptionView {
                text: option.as_str(),
                enabled,
                highlighted: correct == Some(option.as_str()),
            })
            .collect()
    }

    pub fn select_main(&mut self, main: &str) -> Result<(), FlowError> {
        self.require_stage("select main topic", Stage::Home)?;
        let topic =
            find_main_topic(main).ok_or_else(|| FlowError::UnknownMainTopic(main.to_string()))?;
        self.selected_main = Some(topic);
        self.stage = Stage::Subcategory;
        Ok(())
    }

    /// Starts loading questions for `category`. A newer call supersedes any
    /// load still in flight.
    pub fn begin_load(&mut self, category: &str) -> Result<RequestTicket, FlowError> {
        self.require_stage("select category", Stage::Subcategory)?;
        let main = self.selected_main.ok_or(FlowError::NoMainTopicSelected)?;
        if !main.contains(category) {
            return Err(FlowError::CategoryNotInTopic {
                category: category.to_string(),
                main: main.name,
            });
        }
        Ok(self.issue(PendingRequest::Questions, CategoryKey::new(category)))
    }

    pub fn finish_load(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<Question>, NetworkError>,
    ) -> Result<(), FlowError> {
        self.settle(&ticket)?;
        let questions = result?;
        validate_question_set(&questions)?;

        self.selected_category = Some(ticket.category);
        self.questions = questions;
        self.current_index = 0;
        self.feedback = None;
        self.question_shown_at = Some(Instant::now());
        self.stage = Stage::Quiz;
        Ok(())
    }

    pub fn begin_submit(
        &mut self,
        option: &str,
    ) -> Result<(RequestTicket, SubmitAnswerRequest), FlowError> {
        self.require_stage("submit answer", Stage::Quiz)?;
        self.require_idle()?;
        if self.feedback.is_some() {
            return Err(FlowError::AlreadyAnswered);
        }
        let category = self
            .selected_category
            .clone()
            .ok_or(FlowError::NoCategorySelected)?;
        let question = self
            .questions
            .get(self.current_index)
            .ok_or(FlowError::WrongStage {
                action: "submit answer",
                stage: self.stage,
            })?;
        if !question.has_option(option) {
            return Err(FlowError::UnknownOption(option.to_string()));
        }

        let request = SubmitAnswerRequest {
            category: category.clone(),
            question_id: question.id.clone(),
            user_answer: option.to_string(),
            time_taken: self
                .question_shown_at
                .map(|shown| shown.elapsed().as_secs_f64())
                .unwrap_or_default(),
        };
        Ok((self.issue(PendingRequest::Submit, category), request))
    }

    pub fn finish_submit(
        &mut self,
        ticket: RequestTicket,
        result: Result<SubmitAnswerResponse, NetworkError>,
    ) -> Result<&AnswerFeedback, FlowError> {
        self.settle(&ticket)?;
        let response = result?;
        Ok(self.feedback.insert(response.into()))
    }

    /// Moves past an answered question, ending the quiz after the last one.
    pub fn advance(&mut self) -> Result<Stage, FlowError> {
        self.require_stage("next", Stage::Quiz)?;
        if self.feedback.is_none() {
            return Err(FlowError::NoResultYet);
        }
        self.feedback = None;
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            self.question_shown_at = Some(Instant::now());
        } else {
            self.question_shown_at = None;
            self.stage = Stage::End;
        }
        Ok(self.stage)
    }

    pub fn begin_stats(&mut self) -> Result<RequestTicket, FlowError> {
        self.require_stage("view stats", Stage::End)?;
        self.require_idle()?;
        let category = self
            .selected_category
            .clone()
            .ok_or(FlowError::NoCategorySelected)?;
        Ok(self.issue(PendingRequest::Stats, category))
    }

    /// Installs a fetched stats image. Any image from an earlier view is
    /// dropped here, which revokes its handle.
    pub fn finish_stats(
        &mut self,
        ticket: RequestTicket,
        result: Result<StatsImage, NetworkError>,
    ) -> Result<&StatsImage, FlowError> {
        self.settle(&ticket)?;
        let image = result?;
        self.stage = Stage::Stats;
        Ok(self.stats_image.insert(image))
    }

    /// Returns to the home screen, dropping the whole session. Requests still
    /// in flight are abandoned and their responses ignored.
    pub fn reset(&mut self) {
        self.stage = Stage::Home;
        self.selected_main = None;
        self.selected_category = None;
        self.questions.clear();
        self.current_index = 0;
        self.feedback = None;
        self.stats_image = None;
        self.pending = None;
        self.question_shown_at = None;
    }

    fn require_stage(&self, action: &'static str, expected: Stage) -> Result<(), FlowError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(FlowError::WrongStage {
                action,
                stage: self.stage,
            })
        }
    }

    fn require_idle(&self) -> Result<(), FlowError> {
        match &self.pending {
            Some(ticket) => Err(FlowError::Busy(ticket.kind)),
            None => Ok(()),
        }
    }

    fn issue(&mut self, kind: PendingRequest, category: CategoryKey) -> RequestTicket {
        self.generation += 1;
        let ticket = RequestTicket {
            kind,
            generation: self.generation,
            category,
        };
        self.pending = Some(ticket.clone());
        ticket
    }

    fn settle(&mut self, ticket: &RequestTicket) -> Result<(), FlowError> {
        if self.pending.as_ref() != Some(ticket) {
            debug!(
                kind = %ticket.kind,
                generation = ticket.generation,
                "dropping superseded response"
            );
            return Err(FlowError::Superseded);
        }
        self.pending = None;
        Ok(())
    }
}

fn validate_question_set(questions: &[Question]) -> Result<(), NetworkError> {
    if questions.is_empty() {
        return Err(NetworkError::Malformed(
            "question set is empty".to_string(),
        ));
    }
    if let Some(question) = questions.iter().find(|question| question.options.len() < 2) {
        return Err(NetworkError::Malformed(format!(
            "question {} has fewer than two options",
            question.id
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
