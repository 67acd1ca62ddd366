use std::collections::{BTreeMap, HashSet};
use std::io::Write;

use anyhow::Result;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};

use crate::matcher::{MatchResult, MatchStage, MatchStatus};
use crate::record::{SourceRecord, TargetRecord};

/// One row of the output relation. A one-to-many match produces several rows
/// sharing the same source index; unmatched and invalid records keep exactly
/// one row each with empty target fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputRow {
    pub source_index: usize,
    pub source_identifier: String,
    pub canonical: Option<String>,
    pub target_index: Option<usize>,
    pub target_identifier: Option<String>,
    pub stage: Option<MatchStage>,
    pub confidence: Option<f64>,
    pub matched_value: Option<String>,
    pub status: MatchStatus,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MappingStatistics {
    pub total_source_records: usize,
    /// Unique canonical identifiers among records that normalized.
    pub unique_valid_identifiers: usize,
    pub unique_matched_identifiers: usize,
    /// Records whose raw identifier failed normalization. Excluded from the
    /// coverage denominator, reported here instead.
    pub invalid_input_count: usize,
    pub unmatched_count: usize,
    pub stage_counts: BTreeMap<MatchStage, usize>,
    /// unique matched / unique valid, as a percentage.
    pub coverage_percentage: f64,
}

/// Flattens match results into the output relation and summary statistics.
///
/// `results` must be the matcher output for `sources`, in source order;
/// target payloads are joined in by position from `targets`.
pub fn assemble(
    sources: &[SourceRecord],
    results: &[MatchResult],
    targets: &[TargetRecord],
) -> (Vec<OutputRow>, MappingStatistics) {
    let mut rows = vec![];
    let mut valid: HashSet<&str> = HashSet::new();
    let mut matched: HashSet<&str> = HashSet::new();
    let mut stats = MappingStatistics {
        total_source_records: sources.len(),
        ..MappingStatistics::default()
    };
    for (record, result) in sources.iter().zip(results) {
        if let Some(canonical) = &result.canonical {
            valid.insert(canonical);
        }
        match result.status {
            MatchStatus::Matched => {
                if let Some(canonical) = &result.canonical {
                    matched.insert(canonical);
                }
                if let Some(stage) = result.matched_stage {
                    *stats.stage_counts.entry(stage).or_insert(0) += 1;
                }
                for candidate in &result.candidates {
                    let target = targets.get(candidate.target_index);
                    rows.push(OutputRow {
                        source_index: record.index,
                        source_identifier: record.identifier.clone(),
                        canonical: result.canonical.clone(),
                        target_index: Some(candidate.target_index),
                        target_identifier: target.map(|t| t.primary_id.clone()),
                        stage: Some(candidate.stage),
                        confidence: Some(candidate.confidence),
                        matched_value: Some(candidate.matched_value.clone()),
                        status: MatchStatus::Matched,
                    });
                }
            }
            MatchStatus::Unmatched => {
                stats.unmatched_count += 1;
                rows.push(source_only_row(record, result.canonical.clone(), MatchStatus::Unmatched));
            }
            MatchStatus::Invalid => {
                stats.invalid_input_count += 1;
                rows.push(source_only_row(record, None, MatchStatus::Invalid));
            }
        }
    }
    stats.unique_valid_identifiers = valid.len();
    stats.unique_matched_identifiers = matched.len();
    stats.coverage_percentage = if valid.is_empty() {
        0.0
    } else {
        matched.len() as f64 / valid.len() as f64 * 100.0
    };
    (rows, stats)
}

fn source_only_row(record: &SourceRecord, canonical: Option<String>, status: MatchStatus) -> OutputRow {
    OutputRow {
        source_index: record.index,
        source_identifier: record.identifier.clone(),
        canonical,
        target_index: None,
        target_identifier: None,
        stage: None,
        confidence: None,
        matched_value: None,
        status,
    }
}

/// Writes the output relation as CSV, one header plus one line per row.
pub fn write_output_csv<W: Write>(rows: &[OutputRow], writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the statistics as pretty JSON, for report files and logs.
pub fn write_statistics_json<W: Write>(stats: &MappingStatistics, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, stats)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{MatcherConfig, ProgressiveMatcher};
    use crate::reverse_index::ReverseIndex;
    use crate::xref::XrefPattern;

    fn pipeline(
        sources: &[SourceRecord],
        targets: &[TargetRecord],
    ) -> (Vec<OutputRow>, MappingStatistics) {
        let index = ReverseIndex::build(targets, XrefPattern::uniprot());
        let results = ProgressiveMatcher::new(MatcherConfig::default())
            .run(sources, &index)
            .unwrap();
        assemble(sources, &results, targets)
    }

    #[test]
    fn test_one_to_many_produces_multiple_rows() {
        let sources = vec![SourceRecord::new(0, "Q67890")];
        let targets = vec![
            TargetRecord::new(0, "A", "UniProtKB:Q67890"),
            TargetRecord::new(1, "B", "PR:Q67890"),
        ];
        let (rows, stats) = pipeline(&sources, &targets);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.source_index == 0));
        assert_eq!(rows[0].target_identifier.as_deref(), Some("A"));
        assert_eq!(rows[1].target_identifier.as_deref(), Some("B"));
        assert_eq!(stats.unique_matched_identifiers, 1);
    }

    #[test]
    fn test_coverage_arithmetic() {
        // Three valid unique identifiers, two matched, one invalid record.
        let sources = vec![
            SourceRecord::new(0, "Q67890"),
            SourceRecord::new(1, "P12345"),
            SourceRecord::new(2, "P99999"),
            SourceRecord::new(3, "garbage!"),
        ];
        let targets = vec![
            TargetRecord::new(0, "A", "UniProtKB:Q67890"),
            TargetRecord::new(1, "B", "UniProtKB:P12345"),
        ];
        let (rows, stats) = pipeline(&sources, &targets);
        assert_eq!(stats.total_source_records, 4);
        assert_eq!(stats.unique_valid_identifiers, 3);
        assert_eq!(stats.unique_matched_identifiers, 2);
        assert_eq!(stats.invalid_input_count, 1);
        assert_eq!(stats.unmatched_count, 1);
        assert_eq!(stats.coverage_percentage, 2.0 / 3.0 * 100.0);
        assert_eq!(stats.stage_counts.get(&MatchStage::Direct), Some(&2));
        // Unmatched and invalid records still get a row each.
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().any(|r| r.status == MatchStatus::Unmatched));
        assert!(rows.iter().any(|r| r.status == MatchStatus::Invalid));
    }

    #[test]
    fn test_duplicate_source_identifiers_counted_once() {
        let sources = vec![
            SourceRecord::new(0, "Q67890"),
            SourceRecord::new(1, "q67890"),
        ];
        let targets = vec![TargetRecord::new(0, "A", "UniProtKB:Q67890")];
        let (_, stats) = pipeline(&sources, &targets);
        assert_eq!(stats.unique_valid_identifiers, 1);
        assert_eq!(stats.unique_matched_identifiers, 1);
        assert_eq!(stats.coverage_percentage, 100.0);
    }

    #[test]
    fn test_write_output_csv() {
        let sources = vec![SourceRecord::new(0, "Q67890")];
        let targets = vec![TargetRecord::new(0, "A", "UniProtKB:Q67890")];
        let (rows, _) = pipeline(&sources, &targets);
        let mut buffer = vec![];
        write_output_csv(&rows, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("source_index,"));
        assert!(text.contains("Q67890"));
        assert!(text.contains("matched"));
    }

    #[test]
    fn test_write_statistics_json() {
        let sources = vec![SourceRecord::new(0, "Q67890")];
        let targets = vec![TargetRecord::new(0, "A", "UniProtKB:Q67890")];
        let (_, stats) = pipeline(&sources, &targets);
        let mut buffer = vec![];
        write_statistics_json(&stats, &mut buffer).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed["coverage_percentage"], 100.0);
        assert_eq!(parsed["stage_counts"]["direct"], 1);
    }
}
