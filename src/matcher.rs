use serde::{Deserialize, Serialize};

use crate::error::BiomapperError;
use crate::identifier::{self, Identifier, base_form};
use crate::record::SourceRecord;
use crate::reverse_index::ReverseIndex;

/// Matching strategies, in priority order. A closed enum rather than a
/// string-keyed registry so the stage list is exhaustively checkable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    Direct,
    Composite,
    BaseForm,
    Historical,
}

impl MatchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStage::Direct => "direct",
            MatchStage::Composite => "composite",
            MatchStage::BaseForm => "base_form",
            MatchStage::Historical => "historical",
        }
    }

    /// Stage confidences are constants, non-increasing with stage number.
    /// Historical confidence comes from the alias resolver, capped at the
    /// base-form level so the ordering invariant holds.
    pub fn confidence(&self) -> f64 {
        match self {
            MatchStage::Direct => 1.0,
            MatchStage::Composite => 0.8,
            MatchStage::BaseForm => 0.6,
            MatchStage::Historical => 0.6,
        }
    }
}

/// Resolves a canonical identifier to historical/alias forms, eg via a
/// UniProt secondary-accession table. May do I/O; a failure is absorbed as
/// "no aliases found" and never aborts the run.
pub trait AliasResolver {
    fn aliases(&self, canonical: &str) -> anyhow::Result<Vec<(String, f64)>>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub source_index: usize,
    pub target_index: usize,
    pub stage: MatchStage,
    pub confidence: f64,
    /// The canonical form that hit the index for this candidate.
    pub matched_value: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    /// No stage produced a candidate.
    Unmatched,
    /// The raw identifier failed normalization; no stage was attempted.
    Invalid,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchResult {
    pub source_index: usize,
    pub status: MatchStatus,
    pub matched_stage: Option<MatchStage>,
    pub candidates: Vec<MatchCandidate>,
    /// Canonical form of the source identifier, when normalization succeeded.
    pub canonical: Option<String>,
}

#[derive(Clone, Debug)]
pub struct MatcherConfig {
    /// Stages to attempt, in order. `Historical` only fires when a resolver
    /// is attached.
    pub stages: Vec<MatchStage>,
    /// Audit mode: keep evaluating later stages after the first hit.
    pub continue_all_stages: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            stages: vec![MatchStage::Direct, MatchStage::Composite, MatchStage::BaseForm],
            continue_all_stages: false,
        }
    }
}

pub struct ProgressiveMatcher<'a> {
    config: MatcherConfig,
    resolver: Option<&'a dyn AliasResolver>,
}

impl<'a> ProgressiveMatcher<'a> {
    pub fn new(config: MatcherConfig) -> Self {
        Self {
            config,
            resolver: None,
        }
    }

    pub fn with_resolver(mut self, resolver: &'a dyn AliasResolver) -> Self {
        self.resolver = Some(resolver);
        if !self.config.stages.contains(&MatchStage::Historical) {
            self.config.stages.push(MatchStage::Historical);
        }
        self
    }

    /// Matches every source record against the index, stage by stage.
    ///
    /// Raises [`BiomapperError::EmptyInput`] when either collection is empty;
    /// everything else degrades to per-record `Unmatched`/`Invalid` statuses.
    /// Output order follows source order, and candidate order within a record
    /// follows index insertion order, so repeated runs are identical.
    pub fn run(
        &self,
        sources: &[SourceRecord],
        index: &ReverseIndex,
    ) -> Result<Vec<MatchResult>, BiomapperError> {
        if sources.is_empty() {
            return Err(BiomapperError::EmptyInput("source records".to_string()));
        }
        if index.is_empty() {
            return Err(BiomapperError::EmptyInput("reverse index".to_string()));
        }
        Ok(sources
            .iter()
            .map(|record| self.match_record(record, index))
            .collect())
    }

    fn match_record(&self, record: &SourceRecord, index: &ReverseIndex) -> MatchResult {
        let Some(id) = identifier::normalize(&record.identifier) else {
            return MatchResult {
                source_index: record.index,
                status: MatchStatus::Invalid,
                matched_stage: None,
                candidates: vec![],
                canonical: None,
            };
        };
        let mut candidates = vec![];
        let mut matched_stage = None;
        for stage in &self.config.stages {
            let found = self.run_stage(*stage, record.index, &id, index);
            if found.is_empty() {
                continue;
            }
            if matched_stage.is_none() {
                matched_stage = Some(*stage);
            }
            candidates.extend(found);
            if !self.config.continue_all_stages {
                break;
            }
        }
        MatchResult {
            source_index: record.index,
            status: if matched_stage.is_some() {
                MatchStatus::Matched
            } else {
                MatchStatus::Unmatched
            },
            matched_stage,
            candidates,
            canonical: Some(id.canonical),
        }
    }

    fn run_stage(
        &self,
        stage: MatchStage,
        source_index: usize,
        id: &Identifier,
        index: &ReverseIndex,
    ) -> Vec<MatchCandidate> {
        match stage {
            MatchStage::Direct => lookup_candidates(index, &id.canonical, source_index, stage),
            MatchStage::Composite => {
                let parts = id.parts();
                if parts.len() < 2 {
                    return vec![];
                }
                parts
                    .iter()
                    .flat_map(|part| lookup_candidates(index, part, source_index, stage))
                    .collect()
            }
            MatchStage::BaseForm => {
                let base = base_form(&id.canonical);
                if base == id.canonical {
                    return vec![];
                }
                lookup_candidates(index, base, source_index, stage)
            }
            MatchStage::Historical => {
                let Some(resolver) = self.resolver else {
                    return vec![];
                };
                // A resolver failure means "no aliases for this record".
                let aliases = resolver.aliases(&id.canonical).unwrap_or_default();
                aliases
                    .iter()
                    .flat_map(|(alias, confidence)| {
                        let confidence = confidence.min(stage.confidence());
                        index
                            .lookup(alias)
                            .unwrap_or_default()
                            .iter()
                            .map(move |entry| MatchCandidate {
                                source_index,
                                target_index: entry.target_index,
                                stage,
                                confidence,
                                matched_value: alias.clone(),
                            })
                    })
                    .collect()
            }
        }
    }
}

fn lookup_candidates(
    index: &ReverseIndex,
    canonical: &str,
    source_index: usize,
    stage: MatchStage,
) -> Vec<MatchCandidate> {
    index
        .lookup(canonical)
        .unwrap_or_default()
        .iter()
        .map(|entry| MatchCandidate {
            source_index,
            target_index: entry.target_index,
            stage,
            confidence: stage.confidence(),
            matched_value: canonical.to_string(),
        })
        .collect()
}
