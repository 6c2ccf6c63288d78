use axum::Json;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::Utc;
use serde::Deserialize;

use crate::ai::{AnalysisResult, Analyzer};
use crate::db::repository;
use crate::error::AppError;
use crate::ingest::{self, IngestService, prompts};
use crate::models::*;
use crate::state::AppState;

/// Opaque id of the authenticated user, supplied by the session collaborator
/// as an `X-User-Id` header. Every course path is tenancy-checked against it.
pub struct UserId(pub String);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| UserId(v.to_string()))
            .ok_or(AppError::Unauthorized)
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "type")]
    pub analysis_type: String,
    pub course_id: Option<String>,
    pub question: Option<String>,
    pub content: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).patch(update_course).delete(delete_course),
        )
        .route("/analyze", post(analyze))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_courses(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = repository::fetch_courses(&state.db, &user_id).await?;
    Ok(Json(courses))
}

async fn get_course(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    let course = repository::find_course_for_user(&state.db, &id, &user_id).await?;
    Ok(Json(course))
}

async fn create_course(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(req): Json<NewCourseRequest>,
) -> Result<Json<Course>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Course name is required".to_string()));
    }
    if req.code.trim().is_empty() {
        return Err(AppError::BadRequest("Course code is required".to_string()));
    }

    let mut course = Course::from_request(&user_id, req);

    let service = IngestService::new(
        state.extractor.clone(),
        state.gemini.clone(),
        state.openai.clone(),
    );
    service.run(&mut course).await;

    repository::insert_course(&state.db, &course).await?;
    Ok(Json(course))
}

async fn update_course(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    let existing = repository::find_course_for_user(&state.db, &id, &user_id).await?;
    let mut course = existing.clone();

    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("Course name is required".to_string()));
        }
        course.name = name;
    }
    if let Some(code) = req.code {
        if code.trim().is_empty() {
            return Err(AppError::BadRequest("Course code is required".to_string()));
        }
        course.code = code;
    }
    if let Some(description) = req.description {
        course.description = Some(description);
    }
    if let Some(color) = req.color {
        course.color = Some(color);
    }
    if let Some(start_date) = req.start_date {
        course.start_date = Some(start_date);
    }
    if let Some(end_date) = req.end_date {
        course.end_date = Some(end_date);
    }

    // The pipeline only re-fires when the syllabus file reference actually
    // changed in this update.
    let mut rerun = false;
    if let Some(syllabus) = req.syllabus {
        rerun = ingest::syllabus_changed(existing.syllabus.as_ref(), Some(&syllabus));
        course.syllabus = Some(syllabus);
    }

    if rerun {
        let service = IngestService::new(
            state.extractor.clone(),
            state.gemini.clone(),
            state.openai.clone(),
        );
        service.run(&mut course).await;
    }

    course.updated_at = Utc::now().to_rfc3339();
    repository::update_course(&state.db, &course).await?;
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    repository::delete_course(&state.db, &id, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Multi-purpose analysis entry point. Builds the prompt for the requested
/// analysis type and returns the analyzer's raw envelope.
async fn analyze(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    let prompt = match req.analysis_type.as_str() {
        "deadlines" => {
            if let Some(course_id) = &req.course_id {
                let course =
                    repository::find_course_for_user(&state.db, course_id, &user_id).await?;
                prompts::deadlines_from_course(
                    &course.code,
                    &course.name,
                    course.description.as_deref().unwrap_or(""),
                    course.start_date.as_deref(),
                    course.end_date.as_deref(),
                )
            } else if let Some(content) = &req.content {
                prompts::deadlines_from_content(content)
            } else {
                return Err(AppError::BadRequest(
                    "Either course_id or content must be provided".to_string(),
                ));
            }
        }
        "syllabus" => {
            let course_id = req.course_id.as_ref().ok_or_else(|| {
                AppError::BadRequest("Course ID is required for syllabus analysis".to_string())
            })?;
            let course = repository::find_course_for_user(&state.db, course_id, &user_id).await?;
            let syllabus = course.syllabus.as_ref().ok_or_else(|| {
                AppError::BadRequest("This course doesn't have a syllabus uploaded".to_string())
            })?;
            let syllabus_text = state.extractor.extract(syllabus).await;
            prompts::syllabus_analysis(&course.code, &course.name, &syllabus_text)
        }
        "summary" => {
            if let Some(course_id) = &req.course_id {
                let course =
                    repository::find_course_for_user(&state.db, course_id, &user_id).await?;
                let mut content = format!(
                    "Course: {} - {}\nDescription: {}\nStart date: {}\nEnd date: {}",
                    course.code,
                    course.name,
                    course.description.as_deref().unwrap_or(""),
                    course.start_date.as_deref().unwrap_or("unknown"),
                    course.end_date.as_deref().unwrap_or("unknown"),
                );
                if let Some(syllabus) = &course.syllabus {
                    let syllabus_text = state.extractor.extract(syllabus).await;
                    if !syllabus_text.is_empty() {
                        content.push_str("\nSyllabus content: ");
                        content.push_str(&syllabus_text);
                    }
                }
                prompts::course_summary(&content)
            } else if let Some(content) = &req.content {
                prompts::course_summary(content)
            } else {
                return Err(AppError::BadRequest(
                    "Either course_id or content must be provided for summary analysis"
                        .to_string(),
                ));
            }
        }
        "question" => {
            let question = req
                .question
                .as_ref()
                .ok_or_else(|| AppError::BadRequest("Question is required".to_string()))?;

            let context = if let Some(course_id) = &req.course_id {
                let course =
                    repository::find_course_for_user(&state.db, course_id, &user_id).await?;
                let mut context = format!(
                    "Course: {} - {}\nDescription: {}",
                    course.code,
                    course.name,
                    course.description.as_deref().unwrap_or(""),
                );
                if let Some(syllabus) = &course.syllabus {
                    let syllabus_text = state.extractor.extract(syllabus).await;
                    if !syllabus_text.is_empty() {
                        context.push_str("\nSyllabus content: ");
                        context.push_str(&syllabus_text);
                    }
                }
                context
            } else if let Some(content) = &req.content {
                content.clone()
            } else {
                let courses = repository::fetch_courses(&state.db, &user_id).await?;
                let listing = courses
                    .iter()
                    .map(|c| {
                        format!(
                            "{} - {}: {}",
                            c.code,
                            c.name,
                            c.description.as_deref().unwrap_or("")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n");
                format!("Your courses:\n{}", listing)
            };

            prompts::question(&context, question)
        }
        _ => {
            return Err(AppError::BadRequest(
                "Invalid analysis type. Valid types are: deadlines, syllabus, question, summary"
                    .to_string(),
            ));
        }
    };

    let analyzer = Analyzer::new(state.gemini.clone());
    Ok(Json(analyzer.analyze(&prompt).await))
}
