//! ATS-friendliness scoring.
//!
//! The score starts at `BASE_SCORE` and every rule in `SCORE_RULES` runs in order,
//! adjusting the running total and optionally appending one suggestion. The final
//! total is clamped to 0..=100. Rules never remove earlier suggestions.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::analysis::models::{ExtractedText, ParsedFields};

pub const BASE_SCORE: i32 = 70;
pub const MIN_WORDS: usize = 200;
pub const MAX_WORDS: usize = 1000;

/// Box-drawing vertical bars left behind by tables and multi-column layouts.
static TABLE_GLYPHS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[│┃┆┇┊┋╎╏]").unwrap());
static SECTION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)EXPERIENCE|EMPLOYMENT|WORK HISTORY").unwrap());
static MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\w* \d{4}\b").unwrap()
});
static SUMMARY_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)SUMMARY|OBJECTIVE|PROFILE").unwrap());

/// Everything a rule may look at.
pub struct ScoreInput<'a> {
    pub fields: &'a ParsedFields,
    pub text: &'a str,
    pub word_count: usize,
}

/// Effect of a rule that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleOutcome {
    pub delta: i32,
    pub suggestion: Option<&'static str>,
}

impl RuleOutcome {
    const fn penalty(delta: i32, suggestion: &'static str) -> Self {
        Self {
            delta: -delta,
            suggestion: Some(suggestion),
        }
    }

    const fn advice(suggestion: &'static str) -> Self {
        Self {
            delta: 0,
            suggestion: Some(suggestion),
        }
    }

    const fn bonus(delta: i32) -> Self {
        Self {
            delta,
            suggestion: None,
        }
    }
}

pub struct ScoreRule {
    pub name: &'static str,
    pub check: fn(&ScoreInput<'_>) -> Option<RuleOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreCard {
    pub score: u8,
    pub suggestions: Vec<String>,
}

pub static SCORE_RULES: &[ScoreRule] = &[
    ScoreRule {
        name: "name_present",
        check: |i| {
            (!i.fields.name.is_detected()).then_some(RuleOutcome::penalty(
                5,
                "Include your full name prominently at the top of your resume",
            ))
        },
    },
    ScoreRule {
        name: "email_present",
        check: |i| {
            (!i.fields.email.is_detected())
                .then_some(RuleOutcome::penalty(5, "Add a professional email address"))
        },
    },
    ScoreRule {
        name: "phone_present",
        check: |i| {
            (!i.fields.phone.is_detected())
                .then_some(RuleOutcome::penalty(3, "Include a phone number for contact"))
        },
    },
    ScoreRule {
        name: "skills_count",
        check: |i| {
            Some(match i.fields.skills.len() {
                0 => RuleOutcome::penalty(10, "Add a dedicated skills section with relevant keywords"),
                1..=4 => RuleOutcome::penalty(
                    5,
                    "Consider adding more relevant skills to improve keyword matching",
                ),
                _ => RuleOutcome::bonus(5),
            })
        },
    },
    ScoreRule {
        name: "education_present",
        check: |i| {
            (!i.fields.education.is_detected())
                .then_some(RuleOutcome::penalty(5, "Include your educational background"))
        },
    },
    ScoreRule {
        name: "experience_present",
        check: |i| {
            (!i.fields.experience.is_detected()).then_some(RuleOutcome::penalty(
                10,
                "Add your work experience with clear job titles and dates",
            ))
        },
    },
    ScoreRule {
        name: "table_glyphs",
        check: |i| {
            TABLE_GLYPHS.is_match(i.text).then_some(RuleOutcome::penalty(
                5,
                "Avoid using tables or columns as they may confuse ATS systems",
            ))
        },
    },
    ScoreRule {
        name: "section_headers",
        check: |i| {
            (!SECTION_HEADER.is_match(i.text)).then_some(RuleOutcome::penalty(
                3,
                "Use clear section headers like 'Experience', 'Education', and 'Skills'",
            ))
        },
    },
    ScoreRule {
        name: "date_format",
        check: |i| {
            (MONTH_YEAR.find_iter(i.text).count() < 2).then_some(RuleOutcome::advice(
                "Use a consistent date format (Month YYYY) for work and education entries",
            ))
        },
    },
    ScoreRule {
        name: "length",
        check: |i| {
            if i.word_count < MIN_WORDS {
                Some(RuleOutcome::penalty(
                    5,
                    "Your resume may be too short - consider adding more details",
                ))
            } else if i.word_count > MAX_WORDS {
                Some(RuleOutcome::penalty(
                    3,
                    "Your resume is quite lengthy - consider focusing on the most relevant information",
                ))
            } else {
                None
            }
        },
    },
    ScoreRule {
        name: "summary_section",
        check: |i| {
            (!SUMMARY_HEADER.is_match(i.text)).then_some(RuleOutcome::advice(
                "Consider adding a summary section highlighting your key qualifications",
            ))
        },
    },
];

/// Scores the inferred fields against the raw text. Deterministic and pure.
pub fn score(fields: &ParsedFields, text: &ExtractedText) -> ScoreCard {
    let input = ScoreInput {
        fields,
        text: text.as_str(),
        word_count: text.word_count(),
    };

    let mut total = BASE_SCORE;
    let mut suggestions = Vec::new();
    for rule in SCORE_RULES {
        if let Some(outcome) = (rule.check)(&input) {
            tracing::trace!(rule = rule.name, delta = outcome.delta, "score rule fired");
            total += outcome.delta;
            if let Some(s) = outcome.suggestion {
                suggestions.push(s.to_string());
            }
        }
    }

    ScoreCard {
        score: clamp_score(total),
        suggestions,
    }
}

pub fn clamp_score(raw: i32) -> u8 {
    raw.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::Detection;

    fn detected(v: &str) -> Detection {
        Detection::Detected(v.to_string())
    }

    fn complete_fields() -> ParsedFields {
        ParsedFields {
            name: detected("Jane Doe"),
            email: detected("jane@example.com"),
            phone: detected("(415) 555-2671"),
            skills: ["Rust", "Go", "Docker", "AWS", "SQL"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            education: detected("EDUCATION\nMIT"),
            experience: detected("EXPERIENCE\nAcme"),
        }
    }

    fn filler(words: usize) -> String {
        vec!["lorem"; words].join(" ")
    }

    fn strong_text() -> ExtractedText {
        ExtractedText::new(format!(
            "SUMMARY\nEngineer.\nEXPERIENCE\nAcme, Jan 2020 - March 2023\n{}",
            filler(300)
        ))
    }

    #[test]
    fn test_all_absent_short_text_exact_arithmetic() {
        let text = ExtractedText::new(filler(50));
        let card = score(&ParsedFields::default(), &text);
        // 70 - 5 (name) - 5 (email) - 3 (phone) - 10 (skills) - 5 (education)
        //    - 10 (experience) - 3 (headers) - 5 (short) = 24
        assert_eq!(card.score, 24);
        assert_eq!(
            card.suggestions,
            vec![
                "Include your full name prominently at the top of your resume",
                "Add a professional email address",
                "Include a phone number for contact",
                "Add a dedicated skills section with relevant keywords",
                "Include your educational background",
                "Add your work experience with clear job titles and dates",
                "Use clear section headers like 'Experience', 'Education', and 'Skills'",
                "Use a consistent date format (Month YYYY) for work and education entries",
                "Your resume may be too short - consider adding more details",
                "Consider adding a summary section highlighting your key qualifications",
            ]
        );
    }

    #[test]
    fn test_strong_resume_gets_bonus_and_no_suggestions() {
        let card = score(&complete_fields(), &strong_text());
        assert_eq!(card.score, 75);
        assert!(card.suggestions.is_empty(), "{:?}", card.suggestions);
    }

    #[test]
    fn test_few_skills_penalized() {
        let mut fields = complete_fields();
        fields.skills.truncate(2);
        let card = score(&fields, &strong_text());
        assert_eq!(card.score, 65);
        assert_eq!(
            card.suggestions,
            vec!["Consider adding more relevant skills to improve keyword matching"]
        );
    }

    #[test]
    fn test_table_glyphs_penalized() {
        let text = ExtractedText::new(format!("{}\nPython │ Rust", strong_text().as_str()));
        let card = score(&complete_fields(), &text);
        assert_eq!(card.score, 70);
        assert_eq!(
            card.suggestions,
            vec!["Avoid using tables or columns as they may confuse ATS systems"]
        );
    }

    #[test]
    fn test_lengthy_resume_penalized() {
        let text = ExtractedText::new(format!(
            "SUMMARY\nEXPERIENCE\nJan 2020 to Dec 2022\n{}",
            filler(1200)
        ));
        let card = score(&complete_fields(), &text);
        assert_eq!(card.score, 72);
        assert_eq!(card.suggestions.len(), 1);
        assert!(card.suggestions[0].starts_with("Your resume is quite lengthy"));
    }

    #[test]
    fn test_advice_only_rules_do_not_change_score() {
        // No dates and no summary header: two suggestions, zero delta.
        let text = ExtractedText::new(format!("EXPERIENCE\n{}", filler(300)));
        let card = score(&complete_fields(), &text);
        assert_eq!(card.score, 75);
        assert_eq!(card.suggestions.len(), 2);
    }

    #[test]
    fn test_score_matches_summed_deltas_for_every_combination() {
        // Text-only deltas: headers/length/table glyphs.
        let texts = [
            (ExtractedText::new(filler(10)), -3 - 5),
            (strong_text(), 0),
            (ExtractedText::new(format!("│┃ {}", filler(2000))), -5 - 3 - 3),
        ];
        for mask in 0u8..32 {
            let present = |bit: u8| mask & (1 << bit) != 0;
            let pick = |bit: u8, v: &str| {
                if present(bit) {
                    detected(v)
                } else {
                    Detection::NotDetected
                }
            };
            let field_delta = [(0, 5), (1, 5), (2, 3), (3, 5), (4, 10)]
                .iter()
                .filter(|(bit, _)| !present(*bit))
                .map(|(_, penalty)| -penalty)
                .sum::<i32>();

            for (skill_count, skill_delta) in [(0usize, -10), (3, -5), (8, 5)] {
                let fields = ParsedFields {
                    name: pick(0, "Jane Doe"),
                    email: pick(1, "j@x.io"),
                    phone: pick(2, "415-555-2671"),
                    skills: (0..skill_count).map(|n| format!("skill{n}")).collect(),
                    education: pick(3, "MIT"),
                    experience: pick(4, "Acme"),
                };
                for (text, text_delta) in &texts {
                    let expected = (70 + field_delta + skill_delta + text_delta).clamp(0, 100);
                    let card = score(&fields, text);
                    assert_eq!(
                        i32::from(card.score),
                        expected,
                        "mask={mask:05b} skills={skill_count}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(-40), 0);
        assert_eq!(clamp_score(0), 0);
        assert_eq!(clamp_score(55), 55);
        assert_eq!(clamp_score(140), 100);
    }

    #[test]
    fn test_rule_table_order() {
        let names: Vec<_> = SCORE_RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "name_present",
                "email_present",
                "phone_present",
                "skills_count",
                "education_present",
                "experience_present",
                "table_glyphs",
                "section_headers",
                "date_format",
                "length",
                "summary_section",
            ]
        );
    }
}
