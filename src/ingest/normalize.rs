use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::Value;

use crate::models::{CourseworkBuckets, CourseworkCategory, CourseworkItem};

/// One item as the model returned it, before any coercion. Every field is
/// optional; the normalizer decides what survives.
#[derive(Debug, Default, Deserialize)]
pub struct RawCourseworkItem {
    #[serde(default, alias = "title")]
    pub name: Option<String>,
    #[serde(default)]
    pub weight: Option<Value>,
    #[serde(default, alias = "dueDate", alias = "due_date")]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default)]
pub struct NormalizedCoursework {
    pub items: Vec<CourseworkItem>,
    pub categories: CourseworkBuckets,
}

/// Maps the raw structured-extraction object (free-form category labels to
/// arrays of raw items) onto the canonical coursework shape. Items without a
/// name are dropped; everything else is kept, coerced field by field.
pub fn normalize_coursework(raw: &Value) -> NormalizedCoursework {
    let mut out = NormalizedCoursework::default();
    let Some(map) = raw.as_object() else {
        return out;
    };

    for (label, value) in map {
        let Some(entries) = value.as_array() else {
            continue;
        };
        let category = CourseworkCategory::from_label(label);
        let item_type = label.trim().to_lowercase();

        for entry in entries {
            let raw_item: RawCourseworkItem =
                serde_json::from_value(entry.clone()).unwrap_or_default();

            // Unnamed items are not actionable.
            let Some(name) = raw_item.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
            else {
                continue;
            };

            let item = CourseworkItem {
                name,
                item_type: item_type.clone(),
                category,
                weight: parse_weight(raw_item.weight.as_ref()),
                date: raw_item.date.as_deref().and_then(parse_date),
                description: raw_item.description.unwrap_or_default(),
            };

            out.items.push(item.clone());
            out.categories.push(item);
        }
    }

    out
}

/// Weight as a percentage: a JSON number, or a numeric-looking string with
/// an optional trailing `%`. Anything else is 0.
pub fn parse_weight(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Best-effort calendar-date parse over the formats models actually emit.
/// Unparseable input is null, never an error.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%B %d, %Y", "%b %d, %Y", "%B %d %Y", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn known_labels_map_to_their_canonical_category() {
        for label in ["assignments", "homework", "assignment", "tutorials", "tutorial", "participation"] {
            assert_eq!(CourseworkCategory::from_label(label), CourseworkCategory::Assignments);
        }
        for label in ["exams", "exam", "test", "tests", "midterm", "midterms", "final", "finals"] {
            assert_eq!(CourseworkCategory::from_label(label), CourseworkCategory::Exams);
        }
        for label in ["projects", "project"] {
            assert_eq!(CourseworkCategory::from_label(label), CourseworkCategory::Projects);
        }
        for label in ["quizzes", "quiz"] {
            assert_eq!(CourseworkCategory::from_label(label), CourseworkCategory::Quizzes);
        }
    }

    #[test]
    fn unknown_labels_default_to_assignments() {
        assert_eq!(CourseworkCategory::from_label("labs"), CourseworkCategory::Assignments);
        assert_eq!(CourseworkCategory::from_label("Presentations"), CourseworkCategory::Assignments);
        assert_eq!(CourseworkCategory::from_label(""), CourseworkCategory::Assignments);
    }

    #[test]
    fn label_matching_is_case_insensitive() {
        assert_eq!(CourseworkCategory::from_label("Midterms"), CourseworkCategory::Exams);
        assert_eq!(CourseworkCategory::from_label("QUIZ"), CourseworkCategory::Quizzes);
    }

    #[test]
    fn unnamed_items_are_dropped_from_both_views() {
        let raw = json!({
            "quizzes": [
                { "name": "Quiz 1", "weight": 5 },
                { "weight": 10 },
                { "name": "   " }
            ]
        });

        let normalized = normalize_coursework(&raw);
        assert_eq!(normalized.items.len(), 1);
        assert_eq!(normalized.items[0].name, "Quiz 1");
        assert_eq!(normalized.categories.quizzes.len(), 1);
        assert!(normalized.categories.assignments.is_empty());
    }

    #[test]
    fn unrecognized_category_lands_in_assignments_with_original_type() {
        let raw = json!({
            "Labs": [ { "name": "Lab 3", "weight": "10%" } ]
        });

        let normalized = normalize_coursework(&raw);
        assert_eq!(normalized.items.len(), 1);
        let item = &normalized.items[0];
        assert_eq!(item.category, CourseworkCategory::Assignments);
        assert_eq!(item.item_type, "labs");
        assert_eq!(item.weight, 10.0);
        assert_eq!(normalized.categories.assignments.len(), 1);
    }

    #[test]
    fn weight_parses_numbers_and_numeric_strings() {
        assert_eq!(parse_weight(Some(&json!(25))), 25.0);
        assert_eq!(parse_weight(Some(&json!(12.5))), 12.5);
        assert_eq!(parse_weight(Some(&json!("30"))), 30.0);
        assert_eq!(parse_weight(Some(&json!("15%"))), 15.0);
        assert_eq!(parse_weight(Some(&json!(" 7.5 % "))), 7.5);
        assert_eq!(parse_weight(Some(&json!("a lot"))), 0.0);
        assert_eq!(parse_weight(Some(&json!(null))), 0.0);
        assert_eq!(parse_weight(None), 0.0);
    }

    #[test]
    fn dates_parse_or_fall_back_to_none() {
        assert_eq!(parse_date("2026-03-15"), NaiveDate::from_ymd_opt(2026, 3, 15));
        assert_eq!(parse_date("March 15, 2026"), NaiveDate::from_ymd_opt(2026, 3, 15));
        assert_eq!(parse_date("03/15/2026"), NaiveDate::from_ymd_opt(2026, 3, 15));
        assert_eq!(parse_date("2026-03-15T10:00:00Z"), NaiveDate::from_ymd_opt(2026, 3, 15));
        assert_eq!(parse_date("sometime in week 3"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn output_round_trips_through_json() {
        let raw = json!({
            "midterms": [ { "name": "Midterm 1", "weight": 20, "date": "2026-10-20" } ],
            "assignments": [ { "name": "Essay", "weight": "15%", "description": "1500 words" } ]
        });

        let normalized = normalize_coursework(&raw);
        let encoded = serde_json::to_string(&normalized.items).unwrap();
        let decoded: Vec<CourseworkItem> = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, normalized.items);

        let encoded = serde_json::to_string(&normalized.categories).unwrap();
        let decoded: CourseworkBuckets = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, normalized.categories);
    }

    #[test]
    fn non_object_input_yields_the_initialized_empty_state() {
        let normalized = normalize_coursework(&json!([1, 2, 3]));
        assert!(normalized.items.is_empty());
        assert!(normalized.categories.is_empty());
    }
}
