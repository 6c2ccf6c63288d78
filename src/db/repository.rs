use sqlx::{FromRow, SqlitePool};

use crate::error::AppError;
use crate::models::{Course, CourseworkBuckets, CourseworkItem, SyllabusFile};

const COURSE_COLUMNS: &str = "id, user_id, name, code, description, color, start_date, end_date, \
     syllabus_url, syllabus_mime_type, syllabus_filename, syllabus_size, \
     syllabus_text, ai_summary, coursework, coursework_categories, \
     created_at, updated_at";

/// Flat row shape; the JSON columns are decoded into their typed form in
/// `into_course`.
#[derive(Debug, FromRow)]
struct CourseRow {
    id: String,
    user_id: String,
    name: String,
    code: String,
    description: Option<String>,
    color: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    syllabus_url: Option<String>,
    syllabus_mime_type: Option<String>,
    syllabus_filename: Option<String>,
    syllabus_size: Option<i64>,
    syllabus_text: Option<String>,
    ai_summary: Option<String>,
    coursework: String,
    coursework_categories: String,
    created_at: String,
    updated_at: String,
}

impl CourseRow {
    fn into_course(self) -> Course {
        let syllabus = match (self.syllabus_url, self.syllabus_mime_type) {
            (Some(url), Some(mime_type)) => Some(SyllabusFile {
                url,
                mime_type,
                filename: self.syllabus_filename,
                size: self.syllabus_size,
            }),
            _ => None,
        };

        let coursework: Vec<CourseworkItem> =
            serde_json::from_str(&self.coursework).unwrap_or_default();
        let coursework_categories: CourseworkBuckets =
            serde_json::from_str(&self.coursework_categories).unwrap_or_default();

        Course {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            code: self.code,
            description: self.description,
            color: self.color,
            start_date: self.start_date,
            end_date: self.end_date,
            syllabus,
            syllabus_text: self.syllabus_text,
            ai_summary: self.ai_summary,
            coursework,
            coursework_categories,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn encode_coursework(course: &Course) -> (String, String) {
    let items = serde_json::to_string(&course.coursework)
        .unwrap_or_else(|_| "[]".to_string());
    let categories = serde_json::to_string(&course.coursework_categories)
        .unwrap_or_else(|_| {
            r#"{"assignments":[],"exams":[],"projects":[],"quizzes":[]}"#.to_string()
        });
    (items, categories)
}

pub async fn fetch_courses(db: &SqlitePool, user_id: &str) -> Result<Vec<Course>, AppError> {
    let rows = sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {} FROM courses WHERE user_id = ? ORDER BY updated_at DESC",
        COURSE_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(CourseRow::into_course).collect())
}

pub async fn find_course(db: &SqlitePool, id: &str) -> Result<Option<Course>, AppError> {
    let row = sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {} FROM courses WHERE id = ?",
        COURSE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(CourseRow::into_course))
}

/// Tenancy-checked fetch: a course owned by another user is access-denied,
/// before any field is returned.
pub async fn find_course_for_user(
    db: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<Course, AppError> {
    let course = find_course(db, id).await?.ok_or(AppError::NotFound)?;
    if course.user_id != user_id {
        return Err(AppError::AccessDenied);
    }
    Ok(course)
}

pub async fn insert_course(db: &SqlitePool, course: &Course) -> Result<(), AppError> {
    let (coursework, coursework_categories) = encode_coursework(course);

    sqlx::query(
        r#"
        INSERT INTO courses
            (id, user_id, name, code, description, color, start_date, end_date,
            syllabus_url, syllabus_mime_type, syllabus_filename, syllabus_size,
            syllabus_text, ai_summary, coursework, coursework_categories,
            created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&course.id)
    .bind(&course.user_id)
    .bind(&course.name)
    .bind(&course.code)
    .bind(&course.description)
    .bind(&course.color)
    .bind(&course.start_date)
    .bind(&course.end_date)
    .bind(course.syllabus.as_ref().map(|s| s.url.clone()))
    .bind(course.syllabus.as_ref().map(|s| s.mime_type.clone()))
    .bind(course.syllabus.as_ref().and_then(|s| s.filename.clone()))
    .bind(course.syllabus.as_ref().and_then(|s| s.size))
    .bind(&course.syllabus_text)
    .bind(&course.ai_summary)
    .bind(coursework)
    .bind(coursework_categories)
    .bind(&course.created_at)
    .bind(&course.updated_at)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn update_course(db: &SqlitePool, course: &Course) -> Result<(), AppError> {
    let (coursework, coursework_categories) = encode_coursework(course);

    let result = sqlx::query(
        r#"
        UPDATE courses
        SET name = ?, code = ?, description = ?, color = ?,
            start_date = ?, end_date = ?,
            syllabus_url = ?, syllabus_mime_type = ?, syllabus_filename = ?, syllabus_size = ?,
            syllabus_text = ?, ai_summary = ?, coursework = ?, coursework_categories = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&course.name)
    .bind(&course.code)
    .bind(&course.description)
    .bind(&course.color)
    .bind(&course.start_date)
    .bind(&course.end_date)
    .bind(course.syllabus.as_ref().map(|s| s.url.clone()))
    .bind(course.syllabus.as_ref().map(|s| s.mime_type.clone()))
    .bind(course.syllabus.as_ref().and_then(|s| s.filename.clone()))
    .bind(course.syllabus.as_ref().and_then(|s| s.size))
    .bind(&course.syllabus_text)
    .bind(&course.ai_summary)
    .bind(coursework)
    .bind(coursework_categories)
    .bind(&course.updated_at)
    .bind(&course.id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Tenancy-checked delete. No extraction side effects.
pub async fn delete_course(db: &SqlitePool, id: &str, user_id: &str) -> Result<(), AppError> {
    find_course_for_user(db, id, user_id).await?;

    sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;

    Ok(())
}
