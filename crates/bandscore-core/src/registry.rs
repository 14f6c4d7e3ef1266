//! Static question-type registry.
//!
//! The single source of truth for how each question type tag is graded.
//! Changing grading behaviour for a type means changing its entry here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GradeError;

/// Equivalence policy used to compare a submitted answer with the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    /// Trimmed, upper-cased equality. Letter options and fixed labels.
    ExactMatch,
    /// Normalized equality. Short factual fills with fixed wording.
    CaseInsensitive,
    /// Unordered equality of normalized lists. Multi-select questions.
    SetMatch,
    /// Whole-mapping equality; single-string keys fall back to exact match.
    MappingMatch,
    /// Word-overlap match with an optional word limit. Free-text completions.
    FlexibleText,
}

impl fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatcherKind::ExactMatch => write!(f, "exact_match"),
            MatcherKind::CaseInsensitive => write!(f, "case_insensitive"),
            MatcherKind::SetMatch => write!(f, "set_match"),
            MatcherKind::MappingMatch => write!(f, "mapping_match"),
            MatcherKind::FlexibleText => write!(f, "flexible_text"),
        }
    }
}

/// How a question type is graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "method", content = "matcher")]
pub enum Grading {
    /// Compared automatically with the given matcher.
    Auto(MatcherKind),
    /// Requires an examiner (essays).
    ManualOnly,
}

impl Grading {
    pub fn is_auto(self) -> bool {
        matches!(self, Grading::Auto(_))
    }

    pub fn matcher(self) -> Option<MatcherKind> {
        match self {
            Grading::Auto(kind) => Some(kind),
            Grading::ManualOnly => None,
        }
    }
}

impl fmt::Display for Grading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grading::Auto(kind) => write!(f, "{kind}"),
            Grading::ManualOnly => write!(f, "manual_only"),
        }
    }
}

/// The test section a question type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestSection {
    Listening,
    Reading,
    Writing,
}

impl fmt::Display for TestSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestSection::Listening => write!(f, "listening"),
            TestSection::Reading => write!(f, "reading"),
            TestSection::Writing => write!(f, "writing"),
        }
    }
}

impl FromStr for TestSection {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "listening" => Ok(TestSection::Listening),
            "reading" => Ok(TestSection::Reading),
            "writing" => Ok(TestSection::Writing),
            other => Err(GradeError::UnknownSection(other.to_string())),
        }
    }
}

/// One registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestionTypeInfo {
    /// Type tag as stored on questions.
    pub tag: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Owning test section. `None` for legacy tags kept for old exams.
    pub section: Option<TestSection>,
    pub grading: Grading,
}

impl QuestionTypeInfo {
    pub fn is_auto_gradable(&self) -> bool {
        self.grading.is_auto()
    }

    pub fn is_legacy(&self) -> bool {
        self.section.is_none()
    }
}

const fn entry(
    tag: &'static str,
    name: &'static str,
    section: Option<TestSection>,
    grading: Grading,
) -> QuestionTypeInfo {
    QuestionTypeInfo {
        tag,
        name,
        section,
        grading,
    }
}

use Grading::{Auto, ManualOnly};
use MatcherKind::{CaseInsensitive, ExactMatch, FlexibleText, MappingMatch, SetMatch};

const L: Option<TestSection> = Some(TestSection::Listening);
const R: Option<TestSection> = Some(TestSection::Reading);
const W: Option<TestSection> = Some(TestSection::Writing);

/// Every recognized question type.
pub static QUESTION_TYPES: &[QuestionTypeInfo] = &[
    // Listening
    entry("fill_in_gaps", "Fill in the Gaps", L, Auto(CaseInsensitive)),
    entry(
        "fill_in_gaps_short_answers",
        "Fill in the Gaps (Short Answers)",
        L,
        Auto(FlexibleText),
    ),
    entry(
        "flowchart_completion_listening",
        "Flowchart Completion",
        L,
        Auto(FlexibleText),
    ),
    entry("form_completion", "Form Completion", L, Auto(CaseInsensitive)),
    entry("map_labeling", "Labelling on a Map", L, Auto(ExactMatch)),
    entry("matching_listening", "Matching", L, Auto(MappingMatch)),
    entry(
        "multiple_choice_multiple_listening",
        "Multiple Choice (More Than One Answer)",
        L,
        Auto(SetMatch),
    ),
    entry(
        "multiple_choice_single_listening",
        "Multiple Choice (One Answer)",
        L,
        Auto(ExactMatch),
    ),
    entry(
        "sentence_completion_listening",
        "Sentence Completion",
        L,
        Auto(FlexibleText),
    ),
    entry(
        "table_completion_listening",
        "Table Completion",
        L,
        Auto(CaseInsensitive),
    ),
    // Reading
    entry(
        "flowchart_completion_reading",
        "Flowchart Completion (Selecting Words from Text)",
        R,
        Auto(FlexibleText),
    ),
    entry(
        "true_false_not_given",
        "Identifying Information (True/False/Not Given)",
        R,
        Auto(ExactMatch),
    ),
    entry("matching_features", "Matching Features", R, Auto(MappingMatch)),
    entry("matching_headings", "Matching Headings", R, Auto(ExactMatch)),
    entry(
        "matching_sentence_endings",
        "Matching Sentence Endings",
        R,
        Auto(ExactMatch),
    ),
    entry(
        "multiple_choice_multiple_reading",
        "Multiple Choice with More Than One Answer",
        R,
        Auto(SetMatch),
    ),
    entry(
        "multiple_choice_single_reading",
        "Multiple Choice with One Answer",
        R,
        Auto(ExactMatch),
    ),
    entry("note_completion", "Note Completion", R, Auto(FlexibleText)),
    entry(
        "sentence_completion_reading",
        "Sentence Completion",
        R,
        Auto(FlexibleText),
    ),
    entry(
        "summary_completion_list",
        "Summary Completion (Selecting from a List)",
        R,
        Auto(ExactMatch),
    ),
    entry(
        "summary_completion_text",
        "Summary Completion (Selecting Words from Text)",
        R,
        Auto(FlexibleText),
    ),
    entry(
        "table_completion_reading",
        "Table Completion",
        R,
        Auto(FlexibleText),
    ),
    // Writing
    entry("writing_task_1", "Writing Task 1", W, ManualOnly),
    entry("writing_task_2", "Writing Task 2", W, ManualOnly),
    // Legacy tags from exams created before the current type set
    entry("short_answer", "Short Answer", None, Auto(FlexibleText)),
    entry("diagram_labeling", "Diagram Labelling", None, Auto(FlexibleText)),
    entry(
        "short_answer_reading",
        "Short Answer (Reading)",
        None,
        Auto(FlexibleText),
    ),
    entry("multiple_choice", "Multiple Choice", None, Auto(ExactMatch)),
    entry(
        "matching_paragraphs",
        "Matching Paragraphs",
        None,
        Auto(ExactMatch),
    ),
    entry(
        "yes_no_not_given",
        "Identifying Views (Yes/No/Not Given)",
        None,
        Auto(ExactMatch),
    ),
];

/// Look up a type tag.
pub fn lookup(tag: &str) -> Option<&'static QuestionTypeInfo> {
    QUESTION_TYPES.iter().find(|info| info.tag == tag)
}

pub fn all_types() -> impl Iterator<Item = &'static QuestionTypeInfo> {
    QUESTION_TYPES.iter()
}

/// All tags belonging to a test section, in registry order.
pub fn types_for_section(section: TestSection) -> Vec<&'static str> {
    QUESTION_TYPES
        .iter()
        .filter(|info| info.section == Some(section))
        .map(|info| info.tag)
        .collect()
}

/// Unknown tags are reported as not auto-gradable.
pub fn is_auto_gradable(tag: &str) -> bool {
    lookup(tag).is_some_and(|info| info.is_auto_gradable())
}

pub fn section_of(tag: &str) -> Option<TestSection> {
    lookup(tag).and_then(|info| info.section)
}
