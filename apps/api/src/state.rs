use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::analysis::extractor::DocumentExtractor;
use crate::analysis::pipeline::AnalysisPipeline;
use crate::analysis::skills::{SkillCatalog, SkillMatcher};
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Stateless between runs; concurrent requests share it without locking.
    pub pipeline: AnalysisPipeline,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self> {
        let catalog = match &config.skill_catalog_path {
            Some(path) => {
                let catalog = SkillCatalog::from_path(path)
                    .with_context(|| format!("Failed to load skill catalog from '{path}'"))?;
                info!("Loaded skill catalog from {path}");
                catalog
            }
            None => SkillCatalog::default(),
        };
        let matcher = SkillMatcher::new(&catalog).context("Failed to compile skill catalog")?;
        info!("Skill catalog ready ({} terms)", catalog.terms().count());

        Ok(Self {
            config,
            pipeline: AnalysisPipeline::new(DocumentExtractor::default(), Arc::new(matcher)),
        })
    }
}
