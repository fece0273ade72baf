use super::*;
use crate::{error::NetworkError, test_support::{arithmetic_question, sample_png}};
use async_trait::async_trait;
use shared::{
    domain::{CategoryKey, CATALOG},
    protocol::{Question, SubmitAnswerRequest, SubmitAnswerResponse},
};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

struct FakeQuizService {
    questions: Option<Vec<Question>>,
    stats_png: Option<Vec<u8>>,
    load_calls: AtomicUsize,
    loaded_categories: Mutex<Vec<CategoryKey>>,
    submissions: Mutex<Vec<SubmitAnswerRequest>>,
}

impl FakeQuizService {
    fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            questions: Some(questions),
            stats_png: Some(sample_png()),
            load_calls: AtomicUsize::new(0),
            loaded_categories: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
        }
    }

    fn unreachable() -> Self {
        let mut service = Self::with_questions(Vec::new());
        service.questions = None;
        service.stats_png = None;
        service
    }

    fn without_stats(mut self) -> Self {
        self.stats_png = None;
        self
    }
}

#[async_trait]
impl QuizService for FakeQuizService {
    async fn fetch_questions(&self, category: &CategoryKey) -> Result<Vec<Question>, NetworkError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        self.loaded_categories.lock().await.push(category.clone());
        self.questions
            .clone()
            .ok_or_else(|| NetworkError::Malformed("expected value at line 1 column 1".to_string()))
    }

    async fn submit_answer(
        &self,
        request: &SubmitAnswerRequest,
    ) -> Result<SubmitAnswerResponse, NetworkError> {
        self.submissions.lock().await.push(request.clone());
        let question = self
            .questions
            .iter()
            .flatten()
            .find(|question| question.id == request.question_id)
            .ok_or_else(|| NetworkError::Status {
                status: 404,
                message: "Question not found".to_string(),
            })?;
        let answer = question.answer.clone().unwrap_or_default();
        let correct = answer == request.user_answer;
        Ok(SubmitAnswerResponse {
            message: if correct {
                "Correct!".to_string()
            } else {
                format!("Incorrect. Correct: {answer}")
            },
            correct: Some(correct),
            correct_answer: Some(answer),
        })
    }

    async fn fetch_stats(&self, _category: &CategoryKey) -> Result<Vec<u8>, NetworkError> {
        self.stats_png.clone().ok_or_else(|| NetworkError::Status {
            status: 400,
            message: "No attempts yet".to_string(),
        })
    }

    async fn list_categories(&self) -> Result<Vec<CategoryKey>, NetworkError> {
        Ok(shared::domain::all_categories().collect())
    }
}

async fn finish_single_question_quiz(controller: &mut QuizController<FakeQuizService>) {
    controller.select_main("Technical").expect("main");
    controller.select_category("java").await.expect("category");
    controller.submit_answer("4").await.expect("submit");
    assert_eq!(controller.advance().expect("advance"), Stage::End);
}

#[tokio::test]
async fn each_catalog_category_loads_once_and_enters_quiz() {
    for topic in CATALOG {
        for category in topic.categories {
            let mut controller =
                QuizController::new(FakeQuizService::with_questions(vec![arithmetic_question()]));
            controller.select_main(topic.name).expect("main");
            controller.select_category(category).await.expect("load");

            assert_eq!(controller.stage(), Stage::Quiz);
            assert_eq!(controller.service().load_calls.load(Ordering::SeqCst), 1);
            assert_eq!(
                *controller.service().loaded_categories.lock().await,
                vec![CategoryKey::new(*category)]
            );
        }
    }
}

#[tokio::test]
async fn malformed_load_reports_error_and_keeps_subcategory() {
    let mut controller = QuizController::new(FakeQuizService::unreachable());
    controller.select_main("Non-Technical").expect("main");

    let err = controller
        .select_category("gk")
        .await
        .expect_err("must fail");

    assert!(matches!(err, FlowError::Network(NetworkError::Malformed(_))));
    assert_eq!(controller.stage(), Stage::Subcategory);
    assert_eq!(controller.service().load_calls.load(Ordering::SeqCst), 1);
    assert!(controller.session().questions().is_empty());
}

#[tokio::test]
async fn single_question_scenario_reaches_end() {
    let mut controller =
        QuizController::new(FakeQuizService::with_questions(vec![arithmetic_question()]));
    controller.select_main("Technical").expect("main");
    controller.select_category("java").await.expect("load");

    assert!(controller.session().correct_option().is_none());
    let feedback = controller.submit_answer("4").await.expect("submit");
    assert!(feedback.message.contains("Correct"));
    assert_eq!(feedback.correct, Some(true));

    let submissions = controller.service().submissions.lock().await.clone();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].category, CategoryKey::new("java"));
    assert_eq!(submissions[0].question_id.as_str(), "1");
    assert_eq!(submissions[0].user_answer, "4");

    let err = controller.submit_answer("3").await.expect_err("no resubmit");
    assert!(matches!(err, FlowError::AlreadyAnswered));
    assert_eq!(controller.service().submissions.lock().await.len(), 1);

    assert_eq!(controller.advance().expect("advance"), Stage::End);
}

#[tokio::test]
async fn show_stats_yields_image_handle() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut controller =
        QuizController::new(FakeQuizService::with_questions(vec![arithmetic_question()]))
            .with_stats_dir(dir.path());
    finish_single_question_quiz(&mut controller).await;

    let image = controller.show_stats().await.expect("stats");
    assert!(image.len() > 0);
    assert!(image.path().starts_with(dir.path()));
    assert!(image.path().exists());
    assert_eq!(controller.stage(), Stage::Stats);
}

#[tokio::test]
async fn stats_failure_keeps_end_stage() {
    let mut controller =
        QuizController::new(FakeQuizService::with_questions(vec![arithmetic_question()]).without_stats());
    finish_single_question_quiz(&mut controller).await;

    let err = controller.show_stats().await.expect_err("must fail");
    assert!(matches!(
        err,
        FlowError::Network(NetworkError::Status { status: 400, .. })
    ));
    assert_eq!(controller.stage(), Stage::End);
    assert!(controller.session().stats_image().is_none());
}

#[tokio::test]
async fn repeated_stats_views_revoke_previous_handle() {
    let mut controller =
        QuizController::new(FakeQuizService::with_questions(vec![arithmetic_question()]));

    finish_single_question_quiz(&mut controller).await;
    let first_path = controller.show_stats().await.expect("first").path().to_path_buf();
    assert!(first_path.exists());

    controller.reset();
    assert!(!first_path.exists());

    finish_single_question_quiz(&mut controller).await;
    let second_path = controller.show_stats().await.expect("second").path().to_path_buf();
    assert_ne!(first_path, second_path);
    assert!(second_path.exists());
    assert!(!first_path.exists());
}

#[tokio::test]
async fn reset_returns_home_with_empty_session() {
    let mut controller =
        QuizController::new(FakeQuizService::with_questions(vec![arithmetic_question()]));
    controller.select_main("Technical").expect("main");
    controller.select_category("python").await.expect("load");

    controller.reset();

    assert_eq!(controller.stage(), Stage::Home);
    assert!(controller.session().questions().is_empty());
    assert_eq!(controller.session().current_index(), 0);
    assert!(controller.session().selected_category().is_none());
}
