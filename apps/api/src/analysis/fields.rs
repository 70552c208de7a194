//! Field inference — best-effort regex heuristics over extracted resume text.
//!
//! Every inferrer is a pure function of the text. Where several patterns can
//! apply, they live in an ordered strategy table and the first hit wins.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::models::Detection;

static CAPITALIZED_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-z]+(?: [A-Z][a-z]+)+$").unwrap());
static UPPERCASE_FIRST_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2,}(?: [A-Z][A-Za-z]+)+$").unwrap());
static MIDDLE_INITIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-z]+ [A-Z]\. [A-Z][a-z]+$").unwrap());

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());

static PHONE_LOCAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap());
static PHONE_INTERNATIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+\d{1,3}[-.\s]?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});

static EDUCATION_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)EDUCATION").unwrap());
static ACADEMIC_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ACADEMIC").unwrap());
static QUALIFICATION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)QUALIFICATION").unwrap());
static EDUCATION_STOP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)EXPERIENCE|SKILLS|PROJECTS|\n\n\n").unwrap());
static DEGREE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Bachelor|Master|PhD|B\.S\.|M\.S\.|B\.A\.|M\.A\.|B\.Tech|M\.Tech|MBA").unwrap()
});
static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\n").unwrap());

static EXPERIENCE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)EXPERIENCE|EMPLOYMENT|WORK HISTORY").unwrap());
static BACKGROUND_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)PROFESSIONAL BACKGROUND").unwrap());
static EXPERIENCE_STOP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)EDUCATION|SKILLS|PROJECTS|\n\n\n").unwrap());

const NAME_WINDOW: usize = 10;
const NAME_FALLBACK_WINDOW: usize = 5;

/// A name pattern tried against a single line.
#[derive(Debug, Clone, Copy)]
pub enum NameMatcher {
    /// "First Last", "First Middle Last".
    CapitalizedWords,
    /// "JOHN Smith", "JANE DOE".
    UppercaseFirstWord,
    /// "First M. Last".
    MiddleInitial,
}

impl NameMatcher {
    fn pattern(&self) -> &'static Lazy<Regex> {
        match self {
            NameMatcher::CapitalizedWords => &CAPITALIZED_WORDS,
            NameMatcher::UppercaseFirstWord => &UPPERCASE_FIRST_WORD,
            NameMatcher::MiddleInitial => &MIDDLE_INITIAL,
        }
    }

    pub fn matches(&self, line: &str) -> bool {
        self.pattern().is_match(line)
    }
}

pub const NAME_MATCHERS: &[NameMatcher] = &[
    NameMatcher::CapitalizedWords,
    NameMatcher::UppercaseFirstWord,
    NameMatcher::MiddleInitial,
];

/// A section runs from the start match to the first stop match after it,
/// or to the end of the text.
#[derive(Debug, Clone, Copy)]
pub struct SectionMatcher {
    pub start: &'static Lazy<Regex>,
    pub stop: &'static Lazy<Regex>,
}

impl SectionMatcher {
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        let start = self.start.find(text)?;
        let end = self
            .stop
            .find_at(text, start.end())
            .map_or(text.len(), |m| m.start());
        Some(text[start.start()..end].trim())
    }
}

pub static EDUCATION_MATCHERS: &[SectionMatcher] = &[
    SectionMatcher {
        start: &EDUCATION_HEADER,
        stop: &EDUCATION_STOP,
    },
    SectionMatcher {
        start: &ACADEMIC_HEADER,
        stop: &EDUCATION_STOP,
    },
    SectionMatcher {
        start: &QUALIFICATION_HEADER,
        stop: &EDUCATION_STOP,
    },
    // No header at all: fall back to the first degree mention.
    SectionMatcher {
        start: &DEGREE,
        stop: &BLANK_LINE,
    },
];

pub static EXPERIENCE_MATCHERS: &[SectionMatcher] = &[
    SectionMatcher {
        start: &EXPERIENCE_HEADER,
        stop: &EXPERIENCE_STOP,
    },
    SectionMatcher {
        start: &BACKGROUND_HEADER,
        stop: &EXPERIENCE_STOP,
    },
];

static PHONE_PATTERNS: &[&Lazy<Regex>] = &[&PHONE_LOCAL, &PHONE_INTERNATIONAL];

/// Scans the first ten lines, trying every name pattern on each line before
/// moving on. Lines must match as-is; only the fallback over the first five
/// lines tolerates surrounding whitespace.
pub fn infer_name(text: &str) -> Detection {
    let window = text
        .lines()
        .take(NAME_WINDOW)
        .map(|line| line.trim_end_matches('\r'));
    for line in window {
        if NAME_MATCHERS.iter().any(|m| m.matches(line)) {
            return Detection::Detected(line.to_string());
        }
    }

    text.lines()
        .take(NAME_FALLBACK_WINDOW)
        .map(str::trim)
        .find(|line| {
            let len = line.chars().count();
            (4..40).contains(&len) && NameMatcher::CapitalizedWords.matches(line)
        })
        .map(str::to_string)
        .into()
}

pub fn infer_email(text: &str) -> Detection {
    EMAIL.find(text).map(|m| m.as_str().to_string()).into()
}

pub fn infer_phone(text: &str) -> Detection {
    PHONE_PATTERNS
        .iter()
        .find_map(|p| p.find(text))
        .map(|m| m.as_str().to_string())
        .into()
}

pub fn infer_education(text: &str) -> Detection {
    first_section(EDUCATION_MATCHERS, text)
}

pub fn infer_experience(text: &str) -> Detection {
    first_section(EXPERIENCE_MATCHERS, text)
}

fn first_section(matchers: &[SectionMatcher], text: &str) -> Detection {
    matchers
        .iter()
        .find_map(|m| m.find(text))
        .filter(|section| !section.is_empty())
        .map(str::to_string)
        .into()
}
