use crate::config::helper::parse_query;
use crate::rewrite::builder::assemble;
use crate::rewrite::hooks::RuleStage;
use crate::rewrite::spec::{RuleKind, RuleSpec, Segment};
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_yaml::Mapping;
use std::convert::TryFrom;

// YAML structure for a custom rule
#[derive(Debug, Deserialize, Clone)]
pub struct RuleConfig {
    #[serde(default = "default_kind")]
    pub kind: RuleKind,
    #[serde(default)]
    pub stage: RuleStage,
    #[serde(default)]
    pub segments: Vec<String>,
    #[serde(default)]
    pub query: Mapping,
}

fn default_kind() -> RuleKind {
    RuleKind::Custom
}

// Parsed and validated rule, ready to be installed as an extension
#[derive(Debug, Clone, PartialEq)]
pub struct ConfiguredRule {
    pub stage: RuleStage,
    pub spec: RuleSpec,
}

impl TryFrom<RuleConfig> for ConfiguredRule {
    type Error = anyhow::Error;

    fn try_from(config: RuleConfig) -> Result<Self> {
        if config.segments.is_empty() && config.kind == RuleKind::Custom {
            return Err(anyhow!("Custom rule must have at least one segment"));
        }

        let segments = config
            .segments
            .iter()
            .map(|text| Segment::parse(text))
            .collect();
        let query = parse_query(&config.query)?;
        let spec = assemble(config.kind, segments, query);

        spec.validate()
            .with_context(|| format!("Invalid rule: {}", spec))?;

        Ok(Self {
            stage: config.stage,
            spec,
        })
    }
}
