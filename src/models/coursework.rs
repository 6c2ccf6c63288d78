use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The four canonical buckets every raw coursework label is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseworkCategory {
    Assignments,
    Exams,
    Projects,
    Quizzes,
}

impl CourseworkCategory {
    /// Maps a free-form category label onto a canonical bucket. Unknown
    /// labels land in `Assignments` rather than dropping data.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "assignments" | "homework" | "assignment" | "tutorials" | "tutorial"
            | "participation" => Self::Assignments,
            "exams" | "exam" | "test" | "tests" | "midterm" | "midterms" | "final"
            | "finals" => Self::Exams,
            "projects" | "project" => Self::Projects,
            "quizzes" | "quiz" => Self::Quizzes,
            _ => Self::Assignments,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assignments => "assignments",
            Self::Exams => "exams",
            Self::Projects => "projects",
            Self::Quizzes => "quizzes",
        }
    }
}

/// One gradable unit of a course, produced by the normalizer from LLM output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseworkItem {
    pub name: String,
    /// Original source label, lower-cased.
    #[serde(rename = "type")]
    pub item_type: String,
    pub category: CourseworkCategory,
    /// Percentage of the final grade. 0 when the source gave none.
    pub weight: f64,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
}

/// Coursework grouped by canonical category. All four buckets are always
/// present so consumers never null-check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseworkBuckets {
    #[serde(default)]
    pub assignments: Vec<CourseworkItem>,
    #[serde(default)]
    pub exams: Vec<CourseworkItem>,
    #[serde(default)]
    pub projects: Vec<CourseworkItem>,
    #[serde(default)]
    pub quizzes: Vec<CourseworkItem>,
}

impl CourseworkBuckets {
    pub fn push(&mut self, item: CourseworkItem) {
        match item.category {
            CourseworkCategory::Assignments => self.assignments.push(item),
            CourseworkCategory::Exams => self.exams.push(item),
            CourseworkCategory::Projects => self.projects.push(item),
            CourseworkCategory::Quizzes => self.quizzes.push(item),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
            && self.exams.is_empty()
            && self.projects.is_empty()
            && self.quizzes.is_empty()
    }
}
