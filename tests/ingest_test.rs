use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::SqlitePool;

use eduplanner::ai::{AiError, LlmClient};
use eduplanner::db::repository;
use eduplanner::error::AppError;
use eduplanner::ingest::{
    self, IngestService, SECTION_DESCRIPTION, SECTION_KEY_DATES, SECTION_RAW_SYLLABUS,
    SUMMARY_UNAVAILABLE,
};
use eduplanner::models::{Course, NewCourseRequest, SyllabusFile};
use eduplanner::pdf::TextExtractor;

const SYLLABUS_TEXT: &str = "CS 101 Introduction to Computer Science. \
Grading: two midterms (20% each), weekly quizzes (10%), final project (30%).";

/// Stands in for the file-fetch + PDF-decode collaborator.
struct StubExtractor {
    text: String,
    calls: AtomicUsize,
}

impl StubExtractor {
    fn new(text: &str) -> Arc<Self> {
        Arc::new(Self { text: text.to_string(), calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for StubExtractor {
    async fn extract(&self, _file: &SyllabusFile) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text.clone()
    }
}

/// Replays a fixed sequence of completions, one per call, in stage order.
struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<String, AiError>>>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    fn new(responses: Vec<Result<String, AiError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, _prompt: &str) -> Result<String, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(AiError::Malformed("script exhausted".to_string())))
    }
}

/// Simulates a missing/invalid credential on every call.
struct AuthFailingLlm {
    calls: AtomicUsize,
}

impl AuthFailingLlm {
    fn new() -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl LlmClient for AuthFailingLlm {
    async fn complete(&self, _prompt: &str) -> Result<String, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AiError::Auth("API key not valid".to_string()))
    }
}

async fn setup_test_db() -> SqlitePool {
    // one connection: every pooled connection to :memory: is its own db
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test db");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

fn course_request(syllabus: Option<SyllabusFile>) -> NewCourseRequest {
    NewCourseRequest {
        name: "Introduction to Computer Science".to_string(),
        code: "CS 101".to_string(),
        description: None,
        color: None,
        start_date: Some("2026-09-01T00:00:00Z".to_string()),
        end_date: Some("2026-12-15T00:00:00Z".to_string()),
        syllabus,
    }
}

fn pdf_syllabus() -> SyllabusFile {
    SyllabusFile {
        url: "https://files.example/cs101-syllabus.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
        filename: Some("cs101-syllabus.pdf".to_string()),
        size: Some(48_213),
    }
}

fn coursework_completion() -> String {
    r#"Here is the coursework I found:
{
  "midterms": [
    { "name": "Midterm 1", "weight": 20, "date": "2026-10-12" },
    { "name": "Midterm 2", "weight": "20%", "date": "2026-11-16" }
  ],
  "quizzes": [
    { "name": "Weekly quizzes", "weight": 10 }
  ],
  "projects": [
    { "name": "Final project", "weight": 30, "date": "2026-12-10", "description": "Team project" }
  ]
}"#
    .to_string()
}

// Scenario A: no syllabus attached, no AI stage invoked, user input untouched.
#[tokio::test]
async fn course_without_syllabus_skips_every_stage() {
    let db = setup_test_db().await;
    let extractor = StubExtractor::new(SYLLABUS_TEXT);
    let gemini = ScriptedLlm::new(vec![]);
    let openai = ScriptedLlm::new(vec![]);

    let mut req = course_request(None);
    req.description = Some("my own notes".to_string());
    let mut course = Course::from_request("user-1", req);

    let service = IngestService::new(extractor.clone(), gemini.clone(), openai.clone());
    service.run(&mut course).await;
    repository::insert_course(&db, &course).await.expect("insert failed");

    let saved = repository::find_course_for_user(&db, &course.id, "user-1")
        .await
        .expect("fetch failed");
    assert_eq!(saved.description.as_deref(), Some("my own notes"));
    assert!(saved.syllabus_text.is_none());
    assert!(saved.ai_summary.is_none());
    assert!(saved.coursework.is_empty());
    assert_eq!(extractor.calls(), 0);
    assert_eq!(gemini.calls(), 0);
    assert_eq!(openai.calls(), 0);
}

// Scenario B: valid PDF, every AI call succeeds. The description carries the
// three labeled sections in order and the coursework is fully normalized.
#[tokio::test]
async fn successful_ingestion_produces_all_sections_and_coursework() {
    let db = setup_test_db().await;
    let extractor = StubExtractor::new(SYLLABUS_TEXT);
    let gemini = ScriptedLlm::new(vec![
        Ok("An introduction to programming and computational thinking.".to_string()),
        Ok("- Midterm 1: 2026-10-12 (20%)\n- Final project: 2026-12-10 (30%)".to_string()),
        Ok(coursework_completion()),
    ]);
    let openai = ScriptedLlm::new(vec![Ok("A solid first course in CS.".to_string())]);

    let mut course = Course::from_request("user-1", course_request(Some(pdf_syllabus())));
    let service = IngestService::new(extractor.clone(), gemini.clone(), openai.clone());
    service.run(&mut course).await;
    repository::insert_course(&db, &course).await.expect("insert failed");

    let saved = repository::find_course_for_user(&db, &course.id, "user-1")
        .await
        .expect("fetch failed");

    let description = saved.description.expect("description should be populated");
    let desc_pos = description.find(SECTION_DESCRIPTION).expect("missing description section");
    let dates_pos = description.find(SECTION_KEY_DATES).expect("missing key-dates section");
    let raw_pos = description.find(SECTION_RAW_SYLLABUS).expect("missing raw-syllabus section");
    assert!(desc_pos < dates_pos && dates_pos < raw_pos);
    assert!(description.contains(SYLLABUS_TEXT));

    assert_eq!(saved.syllabus_text.as_deref(), Some(SYLLABUS_TEXT));
    assert_eq!(saved.ai_summary.as_deref(), Some("A solid first course in CS."));

    assert_eq!(saved.coursework.len(), 4);
    assert_eq!(saved.coursework_categories.exams.len(), 2);
    assert_eq!(saved.coursework_categories.quizzes.len(), 1);
    assert_eq!(saved.coursework_categories.projects.len(), 1);
    assert!(saved.coursework_categories.assignments.is_empty());

    let midterm = saved
        .coursework
        .iter()
        .find(|i| i.name == "Midterm 2")
        .expect("Midterm 2 missing");
    assert_eq!(midterm.weight, 20.0);
    assert_eq!(midterm.item_type, "midterms");

    assert_eq!(gemini.calls(), 3);
    assert_eq!(openai.calls(), 1);
}

// Scenario C: every AI call fails with a credential error. The raw syllabus
// text still lands in the description and the summary is the placeholder.
#[tokio::test]
async fn credential_failure_degrades_to_raw_text_and_placeholder_summary() {
    let db = setup_test_db().await;
    let extractor = StubExtractor::new(SYLLABUS_TEXT);
    let gemini = AuthFailingLlm::new();
    let openai = AuthFailingLlm::new();

    let mut course = Course::from_request("user-1", course_request(Some(pdf_syllabus())));
    let service = IngestService::new(extractor.clone(), gemini.clone(), openai.clone());
    service.run(&mut course).await;
    repository::insert_course(&db, &course).await.expect("insert failed");

    let saved = repository::find_course_for_user(&db, &course.id, "user-1")
        .await
        .expect("fetch failed");

    let description = saved.description.expect("raw syllabus text must survive");
    assert!(description.starts_with(SECTION_RAW_SYLLABUS));
    assert!(description.contains(SYLLABUS_TEXT));
    assert!(!description.contains(SECTION_DESCRIPTION));
    assert!(!description.contains(SECTION_KEY_DATES));

    assert!(saved.coursework.is_empty());
    assert!(saved.coursework_categories.is_empty());
    assert_eq!(saved.ai_summary.as_deref(), Some(SUMMARY_UNAVAILABLE));
}

// A stage-3 failure must not block stages 4-6.
#[tokio::test]
async fn description_stage_failure_does_not_block_later_stages() {
    let db = setup_test_db().await;
    let extractor = StubExtractor::new(SYLLABUS_TEXT);
    let gemini = ScriptedLlm::new(vec![
        Err(AiError::Api { status: 500, body: "internal".to_string() }),
        Ok("- Midterm 1: 2026-10-12".to_string()),
        Ok(coursework_completion()),
    ]);
    let openai = ScriptedLlm::new(vec![Ok("Summary.".to_string())]);

    let mut course = Course::from_request("user-1", course_request(Some(pdf_syllabus())));
    let service = IngestService::new(extractor, gemini.clone(), openai.clone());
    service.run(&mut course).await;
    repository::insert_course(&db, &course).await.expect("insert failed");

    let saved = repository::find_course_for_user(&db, &course.id, "user-1")
        .await
        .expect("fetch failed");

    let description = saved.description.expect("description should be populated");
    assert!(!description.contains(SECTION_DESCRIPTION));
    assert!(description.contains(SECTION_KEY_DATES));
    assert!(description.contains(SECTION_RAW_SYLLABUS));
    assert!(!saved.coursework.is_empty());
    assert_eq!(saved.ai_summary.as_deref(), Some("Summary."));
    assert_eq!(gemini.calls(), 3);
    assert_eq!(openai.calls(), 1);
}

// An empty extraction result (e.g. scanned PDF) skips the analysis stages.
#[tokio::test]
async fn empty_extracted_text_skips_analysis() {
    let extractor = StubExtractor::new("   ");
    let gemini = ScriptedLlm::new(vec![]);
    let openai = ScriptedLlm::new(vec![]);

    let mut course = Course::from_request("user-1", course_request(Some(pdf_syllabus())));
    let service = IngestService::new(extractor.clone(), gemini.clone(), openai.clone());
    service.run(&mut course).await;

    assert_eq!(extractor.calls(), 1);
    assert_eq!(gemini.calls(), 0);
    assert_eq!(openai.calls(), 0);
    assert!(course.syllabus_text.is_none());
    assert!(course.description.is_none());
}

// Idempotence: an update that does not replace the syllabus file must not
// re-invoke any extraction stage or mutate coursework fields.
#[tokio::test]
async fn unchanged_syllabus_reference_does_not_reingest() {
    let db = setup_test_db().await;
    let extractor = StubExtractor::new(SYLLABUS_TEXT);
    let gemini = ScriptedLlm::new(vec![
        Ok("Course description.".to_string()),
        Ok("- Key dates".to_string()),
        Ok(coursework_completion()),
    ]);
    let openai = ScriptedLlm::new(vec![Ok("Summary.".to_string())]);

    let mut course = Course::from_request("user-1", course_request(Some(pdf_syllabus())));
    let service = IngestService::new(extractor.clone(), gemini.clone(), openai.clone());
    service.run(&mut course).await;
    repository::insert_course(&db, &course).await.expect("insert failed");

    let calls_after_create = (extractor.calls(), gemini.calls(), openai.calls());

    // Same file reference re-submitted on update: the gate stays closed.
    let mut updated = repository::find_course_for_user(&db, &course.id, "user-1")
        .await
        .expect("fetch failed");
    updated.name = "Intro to CS (renamed)".to_string();
    assert!(!ingest::syllabus_changed(course.syllabus.as_ref(), updated.syllabus.as_ref()));
    repository::update_course(&db, &updated).await.expect("update failed");

    let saved = repository::find_course_for_user(&db, &course.id, "user-1")
        .await
        .expect("fetch failed");
    assert_eq!(saved.name, "Intro to CS (renamed)");
    assert_eq!(saved.coursework, course.coursework);
    assert_eq!((extractor.calls(), gemini.calls(), openai.calls()), calls_after_create);

    // A different file reference reopens it.
    let replaced = SyllabusFile {
        url: "https://files.example/cs101-syllabus-v2.pdf".to_string(),
        ..pdf_syllabus()
    };
    assert!(ingest::syllabus_changed(course.syllabus.as_ref(), Some(&replaced)));
}

// Scenario D: a user fetching another user's course is rejected outright.
#[tokio::test]
async fn cross_user_course_access_is_rejected() {
    let db = setup_test_db().await;

    let course = Course::from_request("user-1", course_request(None));
    repository::insert_course(&db, &course).await.expect("insert failed");

    let result = repository::find_course_for_user(&db, &course.id, "user-2").await;
    assert!(matches!(result, Err(AppError::AccessDenied)));

    let result = repository::delete_course(&db, &course.id, "user-2").await;
    assert!(matches!(result, Err(AppError::AccessDenied)));
}
