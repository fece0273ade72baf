//! Terminal rendering of the quiz screens and the interactive input loop.

use std::{fmt::Write as _, io::Write};

use anyhow::Result;
use client_core::{QuizController, QuizService, QuizSession, Stage};
use shared::domain::{CategoryKey, CATALOG};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectMain(&'static str),
    SelectCategory(CategoryKey),
    Answer(String),
    Next,
    ShowStats,
    Home,
    Quit,
    Invalid(String),
}

pub fn render(session: &QuizSession) -> String {
    let mut out = String::new();
    match session.stage() {
        Stage::Home => {
            let _ = writeln!(out, "Choose Your Path");
            for (index, topic) in CATALOG.iter().enumerate() {
                let _ = writeln!(out, "  {}) {}", index + 1, topic.name);
            }
            let _ = writeln!(out, "  q) Quit");
        }
        Stage::Subcategory => {
            let main = session.selected_main().map(|topic| topic.name).unwrap_or_default();
            let _ = writeln!(out, "{main} Categories");
            for (index, category) in session.category_choices().iter().enumerate() {
                let _ = writeln!(out, "  {}) {}", index + 1, category.display_label());
            }
            let _ = writeln!(out, "  b) Back");
        }
        Stage::Quiz => {
            if let Some(question) = session.current_question() {
                let _ = writeln!(
                    out,
                    "Q{}: {}",
                    session.current_index() + 1,
                    question.question
                );
            }
            for (index, view) in session.option_views().iter().enumerate() {
                let marker = if view.highlighted { "  <- correct" } else { "" };
                let _ = writeln!(out, "  {}) {}{marker}", index + 1, view.text);
            }
            if let Some(message) = session.last_result_message() {
                let _ = writeln!(out, "{message}");
                let _ = writeln!(out, "  n) Next");
            }
        }
        Stage::End => {
            let _ = writeln!(out, "Quiz Completed!");
            let _ = writeln!(out, "  s) View My Stats");
            let _ = writeln!(out, "  h) Try Again");
        }
        Stage::Stats => {
            let _ = writeln!(out, "Your Performance");
            if let Some(image) = session.stats_image() {
                let (width, height) = image.dimensions();
                let _ = writeln!(
                    out,
                    "  chart saved to {} ({width}x{height}, {:?})",
                    image.path().display(),
                    image.format()
                );
            }
            let _ = writeln!(out, "  h) Back to Home");
        }
    }
    out
}

pub fn parse_action(session: &QuizSession, line: &str) -> Action {
    let input = line.trim();
    if input.eq_ignore_ascii_case("q") {
        return Action::Quit;
    }

    match session.stage() {
        Stage::Home => match pick(input, CATALOG.len()) {
            Some(index) => Action::SelectMain(CATALOG[index].name),
            None => Action::Invalid(format!("choose 1-{}", CATALOG.len())),
        },
        Stage::Subcategory => {
            if input.eq_ignore_ascii_case("b") {
                return Action::Home;
            }
            let choices = session.category_choices();
            match pick(input, choices.len()) {
                Some(index) => Action::SelectCategory(choices[index].clone()),
                None => Action::Invalid(format!("choose 1-{} or b", choices.len())),
            }
        }
        Stage::Quiz => {
            if input.eq_ignore_ascii_case("n") {
                return Action::Next;
            }
            if input.eq_ignore_ascii_case("h") {
                return Action::Home;
            }
            let options = session
                .current_question()
                .map(|question| question.options.as_slice())
                .unwrap_or_default();
            match pick(input, options.len()) {
                Some(index) => Action::Answer(options[index].clone()),
                None => Action::Invalid(format!("choose 1-{}, n or h", options.len())),
            }
        }
        Stage::End if input.eq_ignore_ascii_case("s") => Action::ShowStats,
        Stage::End | Stage::Stats if input.eq_ignore_ascii_case("h") => Action::Home,
        Stage::End => Action::Invalid("choose s or h".to_string()),
        Stage::Stats => Action::Invalid("choose h".to_string()),
    }
}

fn pick(input: &str, len: usize) -> Option<usize> {
    let number: usize = input.parse().ok()?;
    (1..=len).contains(&number).then(|| number - 1)
}

/// Runs the interactive loop until input ends or the user quits.
pub async fn run<S, R, W>(controller: &mut QuizController<S>, input: R, out: &mut W) -> Result<()>
where
    S: QuizService,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut input = input;
    let mut buf = Vec::new();
    loop {
        write!(out, "\n{}> ", render(controller.session()))?;
        out.flush()?;

        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let action = match std::str::from_utf8(&buf) {
            Ok(line) => parse_action(controller.session(), line),
            Err(_) => Action::Invalid(format!(
                "input `{}` is not valid UTF-8",
                String::from_utf8_lossy(&buf).trim()
            )),
        };
        debug!(stage = %controller.stage(), ?action, "input");

        match action {
            Action::Quit => break,
            Action::SelectMain(main) => {
                if let Err(error) = controller.select_main(main) {
                    writeln!(out, "{error}")?;
                }
            }
            Action::SelectCategory(category) => {
                writeln!(out, "Loading {} questions...", category.display_label())?;
                if let Err(error) = controller.select_category(category.as_str()).await {
                    writeln!(out, "Error fetching questions: {error}")?;
                }
            }
            Action::Answer(option) => {
                if let Err(error) = controller.submit_answer(&option).await {
                    writeln!(out, "Error submitting answer: {error}")?;
                }
            }
            Action::Next => {
                if let Err(error) = controller.advance() {
                    writeln!(out, "{error}")?;
                }
            }
            Action::ShowStats => {
                if let Err(error) = controller.show_stats().await {
                    writeln!(out, "Error loading stats: {error}")?;
                }
            }
            Action::Home => controller.reset(),
            Action::Invalid(hint) => writeln!(out, "Unrecognised input, {hint}")?,
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/ui_tests.rs"]
mod tests;
