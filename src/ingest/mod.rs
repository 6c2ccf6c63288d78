pub mod normalize;
pub mod prompts;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::ai::{AiError, Analyzer, LlmClient};
use crate::models::{Course, SyllabusFile};
use crate::pdf::TextExtractor;

pub use normalize::{NormalizedCoursework, normalize_coursework};

pub const SECTION_DESCRIPTION: &str = "--- Course Description ---";
pub const SECTION_KEY_DATES: &str = "--- Key Dates & Deadlines ---";
pub const SECTION_RAW_SYLLABUS: &str = "--- Extracted Syllabus Content ---";

/// Shown instead of a summary when the language-model credential is missing
/// or rejected.
pub const SUMMARY_UNAVAILABLE: &str =
    "AI summary unavailable: the language model API key is missing or invalid.";

/// Runs the syllabus ingestion pipeline on one unsaved course record. The
/// stages are strictly sequential and each one is fault-isolated: a failed
/// stage logs, applies its fallback, and never blocks the stages after it.
/// The caller persists the record exactly once after the run.
pub struct IngestService {
    extractor: Arc<dyn TextExtractor>,
    analyzer: Analyzer,
    summarizer: Analyzer,
}

impl IngestService {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        gemini: Arc<dyn LlmClient>,
        openai: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            extractor,
            analyzer: Analyzer::new(gemini),
            summarizer: Analyzer::new(openai),
        }
    }

    pub async fn run(&self, course: &mut Course) {
        let Some(syllabus) = course.syllabus.clone() else {
            debug!(course_name = %course.name, "no syllabus file attached, skipping ingestion");
            return;
        };

        let text = self.extractor.extract(&syllabus).await;
        if text.trim().is_empty() {
            debug!(
                course_id = %course.id,
                course_name = %course.name,
                "no usable syllabus content, skipping analysis stages"
            );
            return;
        }
        course.syllabus_text = Some(text.clone());

        self.extract_description(course, &text).await;
        let key_dates_ok = self.analyze_key_dates(course, &text).await;
        if key_dates_ok {
            self.extract_coursework(course, &text).await;
        }
        self.generate_summary(course).await;

        info!(
            course_id = %course.id,
            course_name = %course.name,
            coursework_items = course.coursework.len(),
            "syllabus ingestion completed"
        );
    }

    /// Stage 3: isolate the syllabus's opening descriptive paragraphs.
    async fn extract_description(&self, course: &mut Course, text: &str) {
        match self.analyzer.complete_guarded(&prompts::course_description(text)).await {
            Ok(description) if !description.trim().is_empty() => {
                append_section(&mut course.description, SECTION_DESCRIPTION, description.trim());
            }
            Ok(_) => {
                debug!(course_id = %course.id, "syllabus yielded no course description");
            }
            Err(e) => {
                warn!(
                    course_id = %course.id,
                    course_name = %course.name,
                    error = %e,
                    "description extraction failed"
                );
            }
        }
    }

    /// Stage 4: markdown list of tests/assignments/deadlines. The raw
    /// extracted text is appended either way, so syllabus content is never
    /// silently lost even if every AI stage fails.
    async fn analyze_key_dates(&self, course: &mut Course, text: &str) -> bool {
        match self.analyzer.complete_guarded(&prompts::key_dates(text)).await {
            Ok(analysis) if !analysis.trim().is_empty() => {
                append_section(&mut course.description, SECTION_KEY_DATES, analysis.trim());
                append_section(&mut course.description, SECTION_RAW_SYLLABUS, text.trim());
                true
            }
            Ok(_) => {
                warn!(course_id = %course.id, course_name = %course.name, "key-dates analysis returned nothing");
                append_section(&mut course.description, SECTION_RAW_SYLLABUS, text.trim());
                false
            }
            Err(e) => {
                warn!(
                    course_id = %course.id,
                    course_name = %course.name,
                    error = %e,
                    "key-dates analysis failed"
                );
                append_section(&mut course.description, SECTION_RAW_SYLLABUS, text.trim());
                false
            }
        }
    }

    /// Stage 5: structured coursework extraction. On any failure the
    /// coursework fields stay at their initialized empty state.
    async fn extract_coursework(&self, course: &mut Course, text: &str) {
        match self.analyzer.extract_json(&prompts::coursework_extraction(text)).await {
            Ok(value) => {
                let normalized = normalize_coursework(&value);
                course.coursework = normalized.items;
                course.coursework_categories = normalized.categories;
            }
            Err(e) => {
                warn!(
                    course_id = %course.id,
                    course_name = %course.name,
                    error = %e,
                    "coursework extraction failed"
                );
            }
        }
    }

    /// Stage 6: course-level summary over whatever description exists by
    /// now, user-supplied or extracted.
    async fn generate_summary(&self, course: &mut Course) {
        let Some(description) = course.description.clone().filter(|d| !d.trim().is_empty()) else {
            return;
        };

        match self.summarizer.complete_guarded(&prompts::course_summary(&description)).await {
            Ok(summary) if !summary.trim().is_empty() => {
                course.ai_summary = Some(summary);
            }
            Ok(_) => {}
            Err(AiError::Auth(detail)) => {
                warn!(
                    course_id = %course.id,
                    course_name = %course.name,
                    detail = %detail,
                    "summary generation failed on credentials, using placeholder"
                );
                course.ai_summary = Some(SUMMARY_UNAVAILABLE.to_string());
            }
            Err(e) => {
                warn!(
                    course_id = %course.id,
                    course_name = %course.name,
                    error = %e,
                    "summary generation failed"
                );
            }
        }
    }
}

/// Appends `content` under a labeled section, or starts the description with
/// it when none exists. Existing description text is never overwritten.
pub fn append_section(description: &mut Option<String>, label: &str, content: &str) {
    let section = format!("{}\n\n{}", label, content);
    match description {
        Some(existing) if !existing.trim().is_empty() => {
            existing.push_str("\n\n");
            existing.push_str(&section);
        }
        _ => *description = Some(section),
    }
}

/// Whether an update actually replaced the syllabus file. The pipeline only
/// re-fires when the file reference changed, never on unrelated edits.
pub fn syllabus_changed(old: Option<&SyllabusFile>, new: Option<&SyllabusFile>) -> bool {
    match (old, new) {
        (None, None) => false,
        (Some(a), Some(b)) => a.url != b.url,
        _ => true,
    }
}
