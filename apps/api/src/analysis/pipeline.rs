//! Pipeline orchestrator — extraction, field inference, scoring.
//!
//! A run moves strictly forward through
//! `Idle → Extracting → Inferring → Scoring → Done`, or ends in `Failed` with the
//! stage it failed in. Nothing is retried and no partial result escapes a failed run.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analysis::extractor::DocumentExtractor;
use crate::analysis::fields;
use crate::analysis::models::{
    AnalysisResult, Detection, ExtractedText, ParsedFields, RawDocument,
};
use crate::analysis::scoring;
use crate::analysis::skills::SkillMatcher;
use crate::errors::{AnalysisError, ErrorCategory};

/// Stages that do work and can therefore fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extracting,
    Inferring,
    Scoring,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Extracting => "extracting",
            Stage::Inferring => "inferring",
            Stage::Scoring => "scoring",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running(Stage),
    Done,
    Failed {
        stage: Stage,
        category: ErrorCategory,
    },
}

impl PipelineState {
    fn ordinal(&self) -> u8 {
        match self {
            PipelineState::Idle => 0,
            PipelineState::Running(Stage::Extracting) => 1,
            PipelineState::Running(Stage::Inferring) => 2,
            PipelineState::Running(Stage::Scoring) => 3,
            PipelineState::Done | PipelineState::Failed { .. } => 4,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed { .. })
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{stage} stage failed: {error}")]
pub struct PipelineFailure {
    pub stage: Stage,
    pub error: AnalysisError,
}

/// State of one run. Transitions only move forward; no state is re-entered.
#[derive(Debug)]
pub struct PipelineRun {
    pub id: Uuid,
    state: PipelineState,
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineRun {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Enters the next working stage or `Done`. Returns false on an illegal move.
    pub fn advance(&mut self, next: PipelineState) -> bool {
        let legal = match next {
            PipelineState::Running(_) | PipelineState::Done => {
                !self.state.is_terminal() && next.ordinal() == self.state.ordinal() + 1
            }
            PipelineState::Idle | PipelineState::Failed { .. } => false,
        };
        if legal {
            debug!(run_id = %self.id, from = ?self.state, to = ?next, "pipeline transition");
            self.state = next;
        }
        legal
    }

    /// Records a failure in the current stage. Only legal while a stage is running.
    pub fn fail(&mut self, error: AnalysisError) -> PipelineFailure {
        let stage = match self.state {
            PipelineState::Running(stage) => stage,
            // Failures outside a running stage are attributed to extraction.
            _ => Stage::Extracting,
        };
        let category = error.category();
        warn!(
            run_id = %self.id,
            %stage,
            category = category.code(),
            "pipeline run failed: {error}"
        );
        self.state = PipelineState::Failed { stage, category };
        PipelineFailure { stage, error }
    }
}

/// Sequences extraction, concurrent field inference and scoring for one document.
#[derive(Clone)]
pub struct AnalysisPipeline {
    extractor: DocumentExtractor,
    skills: Arc<SkillMatcher>,
}

impl AnalysisPipeline {
    pub fn new(extractor: DocumentExtractor, skills: Arc<SkillMatcher>) -> Self {
        Self { extractor, skills }
    }

    pub async fn run(&self, doc: RawDocument) -> Result<AnalysisResult, PipelineFailure> {
        let mut run = PipelineRun::new();
        let span = info_span!("analysis", run_id = %run.id, media_type = %doc.media_type);
        self.drive(&mut run, doc).instrument(span).await
    }

    async fn drive(
        &self,
        run: &mut PipelineRun,
        doc: RawDocument,
    ) -> Result<AnalysisResult, PipelineFailure> {
        run.advance(PipelineState::Running(Stage::Extracting));
        let text = match self.extractor.extract(doc).await {
            Ok(text) => text,
            Err(e) => return Err(run.fail(e)),
        };

        run.advance(PipelineState::Running(Stage::Inferring));
        let fields = match self.infer_fields(&text).await {
            Ok(fields) => fields,
            Err(e) => return Err(run.fail(e)),
        };

        run.advance(PipelineState::Running(Stage::Scoring));
        let card = scoring::score(&fields, &text);

        run.advance(PipelineState::Done);
        info!(
            state = ?run.state(),
            score = card.score,
            skills = fields.skills.len(),
            suggestions = card.suggestions.len(),
            words = text.word_count(),
            "analysis complete"
        );

        Ok(AnalysisResult {
            fields,
            score: card.score,
            suggestions: card.suggestions,
        })
    }

    /// Fans out the six independent inferrers and waits for all of them.
    /// Each runs on its own blocking task so a panic surfaces as an error.
    pub async fn infer_fields(&self, text: &ExtractedText) -> Result<ParsedFields, AnalysisError> {
        let matcher = Arc::clone(&self.skills);
        join_fields(InferenceTasks {
            name: spawn_inferrer(text, fields::infer_name),
            email: spawn_inferrer(text, fields::infer_email),
            phone: spawn_inferrer(text, fields::infer_phone),
            skills: spawn_inferrer(text, move |t| matcher.extract(t)),
            education: spawn_inferrer(text, fields::infer_education),
            experience: spawn_inferrer(text, fields::infer_experience),
        })
        .await
    }
}

/// One in-flight task per inferred field.
struct InferenceTasks {
    name: JoinHandle<Detection>,
    email: JoinHandle<Detection>,
    phone: JoinHandle<Detection>,
    skills: JoinHandle<Vec<String>>,
    education: JoinHandle<Detection>,
    experience: JoinHandle<Detection>,
}

/// Waits for every inferrer. A panicked or cancelled task fails the whole
/// join; no partially filled `ParsedFields` is ever built.
async fn join_fields(tasks: InferenceTasks) -> Result<ParsedFields, AnalysisError> {
    let (name, email, phone, skills, education, experience) = tokio::try_join!(
        tasks.name,
        tasks.email,
        tasks.phone,
        tasks.skills,
        tasks.education,
        tasks.experience,
    )
    .map_err(|e| AnalysisError::InternalInference(e.to_string()))?;

    Ok(ParsedFields {
        name,
        email,
        phone,
        skills,
        education,
        experience,
    })
}

fn spawn_inferrer<T, F>(text: &ExtractedText, inferrer: F) -> JoinHandle<T>
where
    T: Send + 'static,
    F: FnOnce(&str) -> T + Send + 'static,
{
    let text = text.clone();
    tokio::task::spawn_blocking(move || inferrer(text.as_str()))
}
