use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::coursework::{CourseworkBuckets, CourseworkItem};

/// Reference to an uploaded syllabus file. The file itself lives in external
/// storage; we only keep the public URL and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyllabusFile {
    pub url: String,
    pub mime_type: String,
    pub filename: Option<String>,
    pub size: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub syllabus: Option<SyllabusFile>,
    /// Raw text extracted from the syllabus PDF, cached on the record.
    pub syllabus_text: Option<String>,
    pub ai_summary: Option<String>,
    pub coursework: Vec<CourseworkItem>,
    pub coursework_categories: CourseworkBuckets,
    pub created_at: String,
    pub updated_at: String,
}

impl Course {
    /// Builds an unsaved record from a create request. The ingestion
    /// pipeline mutates it in memory before the single persist.
    pub fn from_request(user_id: &str, req: NewCourseRequest) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: req.name,
            code: req.code,
            description: req.description,
            color: req.color,
            start_date: req.start_date,
            end_date: req.end_date,
            syllabus: req.syllabus,
            syllabus_text: None,
            ai_summary: None,
            coursework: Vec::new(),
            coursework_categories: CourseworkBuckets::default(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub syllabus: Option<SyllabusFile>,
}

/// Partial update. `None` means "leave the field unchanged".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub syllabus: Option<SyllabusFile>,
}
