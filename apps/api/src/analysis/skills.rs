//! Skill catalog — the configuration data behind skill inference.
//!
//! The catalog is an ordered list of categories of literal terms. It is compiled
//! once into a single case-insensitive alternation; earlier terms win when two
//! terms could match at the same position ("React" before "React Native").
//! A JSON file can replace the built-in catalog:
//!
//! ```json
//! { "categories": [ { "name": "languages", "terms": ["Rust", "C++"] } ] }
//! ```
//!
//! or simply `["Rust", "C++"]`.

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Cannot read skill catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid skill catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Skill catalog category '{0}' contains an empty term")]
    EmptyTerm(String),

    #[error("Skill catalog contains no terms")]
    Empty,

    #[error("Skill pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub name: String,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCatalog {
    pub categories: Vec<SkillCategory>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Grouped(SkillCatalog),
    Flat(Vec<String>),
}

const DEFAULT_CATALOG: &[(&str, &[&str])] = &[
    (
        "programming_languages",
        &[
            "Python", "Java", "JavaScript", "C++", "C#", "Ruby", "PHP", "Swift", "Kotlin", "Go",
            "Rust",
        ],
    ),
    (
        "web",
        &[
            "HTML", "CSS", "React", "Angular", "Vue", "Node.js", "Express", "Django", "Flask",
            "Spring Boot",
        ],
    ),
    (
        "databases",
        &["SQL", "MySQL", "PostgreSQL", "MongoDB", "Oracle", "DynamoDB", "Firebase"],
    ),
    (
        "cloud",
        &["AWS", "Azure", "Google Cloud", "Heroku", "Netlify", "Vercel"],
    ),
    (
        "devops",
        &["Docker", "Kubernetes", "Jenkins", "Git", "GitHub", "GitLab", "CI/CD", "Terraform"],
    ),
    (
        "data_science",
        &[
            "Machine Learning", "Deep Learning", "TensorFlow", "PyTorch", "pandas", "NumPy",
            "Data Analysis", "NLP", "Computer Vision", "AI",
        ],
    ),
    (
        "mobile",
        &["Android", "iOS", "React Native", "Flutter", "Xamarin"],
    ),
    (
        "office",
        &["Word", "Excel", "PowerPoint", "Outlook", "Microsoft Office"],
    ),
    (
        "design",
        &[
            "Photoshop", "Illustrator", "InDesign", "Figma", "Sketch", "UX/UI", "UX Design",
            "UI Design",
        ],
    ),
    (
        "languages",
        &["English", "Spanish", "French", "German", "Chinese", "Japanese", "Korean"],
    ),
    (
        "soft_skills",
        &[
            "Project Management", "Team Leadership", "Communication", "Problem Solving", "Agile",
            "Scrum", "Critical Thinking", "Teamwork", "Time Management",
        ],
    ),
];

impl Default for SkillCatalog {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATALOG
                .iter()
                .map(|(name, terms)| SkillCategory {
                    name: name.to_string(),
                    terms: terms.iter().map(|t| t.to_string()).collect(),
                })
                .collect(),
        }
    }
}

impl SkillCatalog {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog = match serde_json::from_str::<CatalogFile>(raw)? {
            CatalogFile::Grouped(catalog) => catalog,
            CatalogFile::Flat(terms) => SkillCatalog {
                categories: vec![SkillCategory {
                    name: "custom".to_string(),
                    terms,
                }],
            },
        };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for category in &self.categories {
            if category.terms.iter().any(|t| t.trim().is_empty()) {
                return Err(CatalogError::EmptyTerm(category.name.clone()));
            }
        }
        if self.terms().next().is_none() {
            return Err(CatalogError::Empty);
        }
        Ok(())
    }

    /// All terms in catalog order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .flat_map(|c| c.terms.iter().map(String::as_str))
    }
}

/// Compiled whole-word, case-insensitive matcher over a catalog.
#[derive(Debug, Clone)]
pub struct SkillMatcher {
    pattern: Regex,
}

impl SkillMatcher {
    pub fn new(catalog: &SkillCatalog) -> Result<Self, CatalogError> {
        catalog.validate()?;
        let alternation = catalog
            .terms()
            .map(whole_word)
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!("(?i)(?:{alternation})"))?;
        Ok(Self { pattern })
    }

    /// Matches in order of first occurrence, deduplicated ignoring case.
    /// The casing kept is the one found first in the text.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|skill| seen.insert(skill.to_lowercase()))
            .map(str::to_string)
            .collect()
    }
}

/// Word boundaries only make sense next to word characters, so "C++" and "C#"
/// get no trailing `\b`.
fn whole_word(term: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let escaped = regex::escape(term.trim());
    let lead = if term.trim().starts_with(is_word) { r"\b" } else { "" };
    let trail = if term.trim().ends_with(is_word) { r"\b" } else { "" };
    format!("{lead}{escaped}{trail}")
}
