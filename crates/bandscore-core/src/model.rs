//! Core data model types for bandscore.
//!
//! Exams, questions, answer values and submissions. Answer keys and submitted
//! answers share one shape-aware type, [`AnswerValue`], so matchers can reject
//! shape confusion (a string where a mapping was expected) without panicking.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::GradeError;

/// An answer key or a submitted answer.
///
/// Deserializes from any JSON/TOML value: strings stay strings, numbers and
/// booleans are stringified, arrays become [`AnswerValue::List`] and objects
/// become [`AnswerValue::Map`]. Nested containers are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// A single value: a letter option, a word, or a short phrase.
    Text(String),
    /// An unordered selection (multiple choice with several answers).
    List(Vec<String>),
    /// Item key to answer (matching questions, multi-blank completions).
    Map(BTreeMap<String, String>),
}

/// The shape of an [`AnswerValue`], used in validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerShape {
    Text,
    List,
    Map,
}

impl fmt::Display for AnswerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerShape::Text => write!(f, "string"),
            AnswerShape::List => write!(f, "list"),
            AnswerShape::Map => write!(f, "mapping"),
        }
    }
}

impl AnswerValue {
    /// Returns the shape of this value.
    pub fn shape(&self) -> AnswerShape {
        match self {
            AnswerValue::Text(_) => AnswerShape::Text,
            AnswerValue::List(_) => AnswerShape::List,
            AnswerValue::Map(_) => AnswerShape::Map,
        }
    }

    /// True for blank text, an empty list, or an empty mapping.
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(s) => s.trim().is_empty(),
            AnswerValue::List(items) => items.is_empty(),
            AnswerValue::Map(map) => map.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Text(s) => write!(f, "{s}"),
            AnswerValue::List(items) => write!(f, "{}", items.join(", ")),
            AnswerValue::Map(map) => {
                let pairs: Vec<String> = map.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{}", pairs.join(", "))
            }
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        AnswerValue::Text(s.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(s: String) -> Self {
        AnswerValue::Text(s)
    }
}

impl From<Vec<&str>> for AnswerValue {
    fn from(items: Vec<&str>) -> Self {
        AnswerValue::List(items.into_iter().map(String::from).collect())
    }
}

impl From<Vec<(&str, &str)>> for AnswerValue {
    fn from(pairs: Vec<(&str, &str)>) -> Self {
        AnswerValue::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Stringify a scalar JSON value the way a loosely typed store would.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl TryFrom<Value> for AnswerValue {
    type Error = GradeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Err(GradeError::InvalidAnswer("null".into())),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    scalar_to_string(item).ok_or_else(|| {
                        GradeError::InvalidAnswer(format!("list item must be a scalar, got {item}"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(AnswerValue::List),
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| {
                    scalar_to_string(&v)
                        .map(|s| (k.clone(), s))
                        .ok_or_else(|| {
                            GradeError::InvalidAnswer(format!(
                                "mapping value for '{k}' must be a scalar, got {v}"
                            ))
                        })
                })
                .collect::<Result<BTreeMap<_, _>, _>>()
                .map(AnswerValue::Map),
            scalar => scalar_to_string(&scalar)
                .map(AnswerValue::Text)
                .ok_or_else(|| GradeError::InvalidAnswer(scalar.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for AnswerValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        AnswerValue::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// Submitted answers keyed by question index (as a string, e.g. `"12"`).
pub type SubmittedAnswers = HashMap<String, AnswerValue>;

/// The category of an exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamKind {
    Listening,
    Reading,
    Writing,
    Mixed,
}

impl ExamKind {
    /// Writing exams are marked by examiners; nothing in them is auto-graded.
    pub fn is_manually_graded(self) -> bool {
        matches!(self, ExamKind::Writing)
    }
}

impl fmt::Display for ExamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamKind::Listening => write!(f, "listening"),
            ExamKind::Reading => write!(f, "reading"),
            ExamKind::Writing => write!(f, "writing"),
            ExamKind::Mixed => write!(f, "mixed"),
        }
    }
}

impl FromStr for ExamKind {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "listening" => Ok(ExamKind::Listening),
            "reading" => Ok(ExamKind::Reading),
            "writing" => Ok(ExamKind::Writing),
            "mixed" => Ok(ExamKind::Mixed),
            other => Err(GradeError::UnknownExamKind(other.to_string())),
        }
    }
}

/// Grading-relevant part of a question document.
///
/// Everything besides the answer key and word limit (prompts, options,
/// images) is kept verbatim in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionPayload {
    /// The correct answer. `None` for manually graded questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_key: Option<AnswerValue>,
    /// Maximum number of words accepted in a free-text answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_words: Option<u32>,
    /// Presentation fields not used for grading.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A single question within an exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Position of the question in the exam; submissions are keyed by it.
    pub index: u32,
    /// Question type tag (see [`crate::registry`]).
    #[serde(rename = "type")]
    pub question_type: String,
    #[serde(default)]
    pub payload: QuestionPayload,
}

impl Question {
    /// Build a question with an answer key and no other payload.
    pub fn new(index: u32, question_type: &str, answer_key: Option<AnswerValue>) -> Self {
        Self {
            index,
            question_type: question_type.to_string(),
            payload: QuestionPayload {
                answer_key,
                ..Default::default()
            },
        }
    }

    /// Set the word limit.
    pub fn with_max_words(mut self, max_words: u32) -> Self {
        self.payload.max_words = Some(max_words);
        self
    }

    /// The key used to look this question up in [`SubmittedAnswers`].
    pub fn key(&self) -> String {
        self.index.to_string()
    }

    pub fn answer_key(&self) -> Option<&AnswerValue> {
        self.payload.answer_key.as_ref()
    }

    /// The effective word limit. A limit of zero means "no limit".
    pub fn max_words(&self) -> Option<u32> {
        self.payload.max_words.filter(|&m| m > 0)
    }
}

/// An exam: an ordered list of questions plus identifying metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub exam_type: Option<ExamKind>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Exam {
    pub fn summary(&self) -> ExamSummary {
        ExamSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            exam_type: self.exam_type,
            question_count: self.questions.len(),
        }
    }
}

/// Summary of an exam (without the question list).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamSummary {
    pub id: String,
    pub title: String,
    pub exam_type: Option<ExamKind>,
    pub question_count: usize,
}

/// A test-taker's answers for one exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub exam_id: String,
    /// Optional identifier of the test-taker.
    #[serde(default)]
    pub candidate: Option<String>,
    #[serde(default, deserialize_with = "deserialize_answers")]
    pub answers: SubmittedAnswers,
}

/// Null answers are dropped; they grade the same as a missing answer.
fn deserialize_answers<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<SubmittedAnswers, D::Error> {
    let raw: HashMap<String, Option<AnswerValue>> = HashMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn answer_value_from_json_shapes() {
        let text: AnswerValue = serde_json::from_value(json!("Sarah Wilson")).unwrap();
        assert_eq!(text, AnswerValue::Text("Sarah Wilson".into()));

        let number: AnswerValue = serde_json::from_value(json!(25)).unwrap();
        assert_eq!(number, AnswerValue::Text("25".into()));

        let list: AnswerValue = serde_json::from_value(json!(["A", "C"])).unwrap();
        assert_eq!(list, AnswerValue::from(vec!["A", "C"]));

        let map: AnswerValue = serde_json::from_value(json!({"Dr. Smith": "C"})).unwrap();
        assert_eq!(map, AnswerValue::from(vec![("Dr. Smith", "C")]));
    }

    #[test]
    fn answer_value_rejects_nested_containers() {
        let nested: Result<AnswerValue, _> = serde_json::from_value(json!([["A"]]));
        assert!(nested.is_err());
        let nested_map: Result<AnswerValue, _> = serde_json::from_value(json!({"1": {"a": "b"}}));
        assert!(nested_map.is_err());
    }

    #[test]
    fn answer_value_emptiness() {
        assert!(AnswerValue::Text("   ".into()).is_empty());
        assert!(AnswerValue::List(vec![]).is_empty());
        assert!(AnswerValue::Map(BTreeMap::new()).is_empty());
        assert!(!AnswerValue::Text("B".into()).is_empty());
    }

    #[test]
    fn exam_kind_display_and_parse() {
        assert_eq!(ExamKind::Writing.to_string(), "writing");
        assert_eq!("Listening".parse::<ExamKind>().unwrap(), ExamKind::Listening);
        assert_eq!(" reading ".parse::<ExamKind>().unwrap(), ExamKind::Reading);
        assert!("speaking".parse::<ExamKind>().is_err());
        assert!(ExamKind::Writing.is_manually_graded());
        assert!(!ExamKind::Mixed.is_manually_graded());
    }

    #[test]
    fn question_payload_keeps_presentation_fields() {
        let q: Question = serde_json::from_value(json!({
            "index": 11,
            "type": "map_labeling",
            "payload": {
                "prompt": "Library",
                "options": ["A", "B", "C"],
                "answer_key": "C",
                "max_words": 0
            }
        }))
        .unwrap();
        assert_eq!(q.key(), "11");
        assert_eq!(q.answer_key(), Some(&AnswerValue::Text("C".into())));
        assert_eq!(q.max_words(), None);
        assert_eq!(q.payload.extra["prompt"], json!("Library"));
    }

    #[test]
    fn null_answer_key_is_absent() {
        let q: Question = serde_json::from_value(json!({
            "index": 1,
            "type": "writing_task_1",
            "payload": { "answer_key": null, "min_words": 150 }
        }))
        .unwrap();
        assert!(q.answer_key().is_none());
    }

    #[test]
    fn submission_drops_null_answers() {
        let s: Submission = serde_json::from_value(json!({
            "exam_id": "listening-1",
            "answers": { "1": "C", "2": null, "3": ["A", "B"] }
        }))
        .unwrap();
        assert_eq!(s.answers.len(), 2);
        assert!(!s.answers.contains_key("2"));
        assert!(s.candidate.is_none());
    }
}
