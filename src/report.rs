//! Dashboard view model for data completeness.
//!
//! Shapes a [`MissingDataMap`] (and optional [`EnrichmentGaps`]) into what the
//! dashboard card and analyzer page render: per-table level buckets and dot
//! matrices, merged recommendations and severity-sorted gaps.

use std::collections::HashSet;
use std::fmt::Write;

use serde::Serialize;

use crate::completeness::{
    calculate_overall_completeness, categorize_fields_by_completeness, classify_level,
    color_class_for, color_for, recommendations_for_named, severity_color_for, severity_icon_for,
    text_color_for, CompletenessLevel, FieldBuckets,
};
use crate::types::{
    CriticalGap, EnrichmentGaps, FieldCompleteness, FieldType, MissingDataMap, TableAnalysis,
};

/// Rows of the dot matrix shown per table.
pub const MATRIX_DISPLAY_CAP: usize = 50;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelTokens {
    pub level: CompletenessLevel,
    pub label: &'static str,
    pub color: &'static str,
    pub color_class: &'static str,
    pub text_color: &'static str,
}

impl LevelTokens {
    fn for_percentage(percentage: f64) -> Self {
        let level = classify_level(percentage);
        Self {
            level,
            label: level.label(),
            color: color_for(percentage),
            color_class: color_class_for(percentage),
            text_color: text_color_for(percentage),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReport {
    pub name: String,
    pub total_records: u64,
    pub overall_completeness: f64,
    pub core_fields_completeness: f64,
    pub enrichment_fields_completeness: f64,
    pub tokens: LevelTokens,
    pub fields_by_level: FieldBuckets,
    /// Column order of `dot_matrix`.
    pub matrix_fields: Vec<String>,
    pub dot_matrix: Vec<Vec<bool>>,
    pub matrix_truncated: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapView {
    #[serde(flatten)]
    pub gap: CriticalGap,
    pub color: &'static str,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessReport {
    pub analysis_timestamp: String,
    pub overall_completeness: f64,
    pub tokens: LevelTokens,
    pub total_records: u64,
    pub intelligence_table_exists: bool,
    pub tables: Vec<TableReport>,
    pub recommendations: Vec<String>,
    pub critical_gaps: Vec<GapView>,
    pub actionable_insights: Vec<String>,
}

fn table_report(name: &str, table: &TableAnalysis) -> TableReport {
    let fields = &table.field_completeness;
    let overall = calculate_overall_completeness(fields.values());
    let of_type = |ty: FieldType| {
        calculate_overall_completeness(fields.values().filter(|f| f.field_type == ty))
    };

    let matrix_fields: Vec<String> = fields.keys().cloned().collect();
    let dot_matrix: Vec<Vec<bool>> = table
        .completeness_matrix
        .iter()
        .take(MATRIX_DISPLAY_CAP)
        .map(|row| {
            matrix_fields
                .iter()
                .map(|f| row.get(f).copied().unwrap_or(false))
                .collect()
        })
        .collect();

    TableReport {
        name: name.to_string(),
        total_records: table.total_records,
        overall_completeness: overall,
        core_fields_completeness: of_type(FieldType::Core),
        enrichment_fields_completeness: of_type(FieldType::Enrichment),
        tokens: LevelTokens::for_percentage(overall),
        fields_by_level: categorize_fields_by_completeness(fields),
        matrix_truncated: table.completeness_matrix.len() > MATRIX_DISPLAY_CAP,
        matrix_fields,
        dot_matrix,
        error: table.error.clone(),
    }
}

pub fn build_report(map: &MissingDataMap, gaps: Option<&EnrichmentGaps>) -> CompletenessReport {
    let tables: Vec<TableReport> = map
        .missing_data_map
        .iter()
        .map(|(name, table)| table_report(name, table))
        .collect();

    let healthy: Vec<f64> = tables
        .iter()
        .filter(|t| t.error.is_none())
        .map(|t| t.overall_completeness)
        .collect();
    let overall = if healthy.is_empty() {
        0.0
    } else {
        healthy.iter().sum::<f64>() / healthy.len() as f64
    };

    // Backend recommendations first, then rule output over qualified field names.
    let qualified: Vec<(String, &FieldCompleteness)> = map
        .missing_data_map
        .iter()
        .filter(|(_, t)| t.error.is_none())
        .flat_map(|(table, t)| {
            t.field_completeness
                .iter()
                .map(move |(field, fc)| (format!("{}.{}", table, field), fc))
        })
        .collect();
    let generated = recommendations_for_named(qualified.iter().map(|(n, f)| (n.as_str(), *f)));

    let mut seen = HashSet::new();
    let recommendations: Vec<String> = map
        .recommendations
        .iter()
        .cloned()
        .chain(generated)
        .filter(|r| seen.insert(r.clone()))
        .collect();

    let mut critical_gaps: Vec<GapView> = gaps
        .map(|g| {
            g.gaps_analysis
                .critical_missing_data
                .iter()
                .map(|gap| GapView {
                    gap: gap.clone(),
                    color: severity_color_for(gap.severity),
                    icon: severity_icon_for(gap.severity),
                })
                .collect()
        })
        .unwrap_or_default();
    critical_gaps.sort_by_key(|v| v.gap.severity);

    CompletenessReport {
        analysis_timestamp: map.analysis_timestamp.clone(),
        overall_completeness: overall,
        tokens: LevelTokens::for_percentage(overall),
        total_records: map
            .missing_data_map
            .values()
            .fold(0u64, |acc, t| acc.saturating_add(t.total_records)),
        intelligence_table_exists: map.summary.intelligence_table_exists,
        tables,
        recommendations,
        critical_gaps,
        actionable_insights: gaps
            .map(|g| g.actionable_insights.clone())
            .unwrap_or_default(),
    }
}

/// Plain-text rendering for the terminal.
pub fn render_text(report: &CompletenessReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Data completeness: {:.1}% ({}) across {} records, analysed {}",
        report.overall_completeness,
        report.tokens.label,
        report.total_records,
        report.analysis_timestamp
    );

    for table in &report.tables {
        let _ = writeln!(out);
        if let Some(ref err) = table.error {
            let _ = writeln!(out, "{}: unavailable ({})", table.name, err);
            continue;
        }
        let _ = writeln!(
            out,
            "{}: {:.1}% {} | core {:.1}% | enrichment {:.1}% | {} records",
            table.name,
            table.overall_completeness,
            table.tokens.label,
            table.core_fields_completeness,
            table.enrichment_fields_completeness,
            table.total_records
        );
        for level in [
            CompletenessLevel::Excellent,
            CompletenessLevel::Good,
            CompletenessLevel::Fair,
            CompletenessLevel::Poor,
        ] {
            let names = table.fields_by_level.bucket(level);
            if !names.is_empty() {
                let _ = writeln!(out, "  {:<9} {}", level.label(), names.join(", "));
            }
        }
        if !table.dot_matrix.is_empty() {
            let _ = writeln!(out, "  fields: {}", table.matrix_fields.join(" "));
            for row in &table.dot_matrix {
                let dots: String = row.iter().map(|&ok| if ok { '●' } else { '○' }).collect();
                let _ = writeln!(out, "  {}", dots);
            }
            if table.matrix_truncated {
                let _ = writeln!(out, "  … first {} records shown", MATRIX_DISPLAY_CAP);
            }
        }
    }

    if !report.recommendations.is_empty() {
        let _ = writeln!(out, "\nRecommendations:");
        for rec in &report.recommendations {
            let _ = writeln!(out, "  - {}", rec);
        }
    }

    if !report.critical_gaps.is_empty() {
        let _ = writeln!(out, "\nCritical gaps:");
        for view in &report.critical_gaps {
            let _ = writeln!(
                out,
                "  [{}] {} ({} records): {}",
                view.gap.severity.as_str(),
                view.gap.gap_type,
                view.gap.affected_records,
                view.gap.description
            );
        }
    }

    if !report.actionable_insights.is_empty() {
        let _ = writeln!(out, "\nInsights:");
        for insight in &report.actionable_insights {
            let _ = writeln!(out, "  - {}", insight);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::types::Severity;

    #[test]
    fn test_report_from_fixtures() {
        let map = fixtures::missing_data_map();
        let gaps = fixtures::enrichment_gaps();
        let report = build_report(&map, Some(&gaps));

        assert_eq!(report.tables.len(), 2);
        assert_eq!(report.total_records, 18);
        let publications = report.tables.iter().find(|t| t.name == "publications").unwrap();
        assert_eq!(publications.dot_matrix.len(), 10);
        assert_eq!(publications.matrix_fields.len(), 7);
        assert!(publications.fields_by_level.excellent.contains(&"title".to_string()));
        assert!(!publications.matrix_truncated);

        let expected_overall = report
            .tables
            .iter()
            .map(|t| t.overall_completeness)
            .sum::<f64>()
            / 2.0;
        assert!((report.overall_completeness - expected_overall).abs() < 1e-9);
    }

    #[test]
    fn test_backend_recommendations_come_first_and_rules_are_qualified() {
        let map = fixtures::missing_data_map();
        let report = build_report(&map, None);
        assert_eq!(report.recommendations[..3], map.recommendations[..]);
        let critical = report
            .recommendations
            .iter()
            .find(|r| r.starts_with("Critical"))
            .expect("core field rule fires for publications.abstract");
        assert!(critical.contains("publications.abstract"));
        assert!(report.critical_gaps.is_empty());
    }

    #[test]
    fn test_gaps_sorted_by_severity() {
        let map = fixtures::missing_data_map();
        let mut gaps = fixtures::enrichment_gaps();
        gaps.gaps_analysis.critical_missing_data.reverse();
        let report = build_report(&map, Some(&gaps));
        let order: Vec<Severity> = report.critical_gaps.iter().map(|g| g.gap.severity).collect();
        assert_eq!(order, vec![Severity::Critical, Severity::High, Severity::Medium]);
        assert_eq!(report.critical_gaps[0].icon, "alert-triangle");
    }

    #[test]
    fn test_matrix_is_capped_for_display() {
        let mut map = fixtures::missing_data_map();
        let table = map.missing_data_map.get_mut("innovations").unwrap();
        let row = table.completeness_matrix[0].clone();
        table.total_records = 80;
        table.completeness_matrix = vec![row; 80];
        let report = build_report(&map, None);
        let innovations = report.tables.iter().find(|t| t.name == "innovations").unwrap();
        assert_eq!(innovations.dot_matrix.len(), MATRIX_DISPLAY_CAP);
        assert!(innovations.matrix_truncated);
    }

    #[test]
    fn test_errored_tables_excluded_from_overall() {
        let mut map = fixtures::missing_data_map();
        map.missing_data_map.insert(
            "intelligence_reports".into(),
            TableAnalysis {
                error: Some("relation does not exist".into()),
                ..Default::default()
            },
        );
        let with_error = build_report(&map, None);
        let without = build_report(&fixtures::missing_data_map(), None);
        assert!((with_error.overall_completeness - without.overall_completeness).abs() < 1e-9);

        let text = render_text(&with_error);
        assert!(text.contains("intelligence_reports: unavailable"));
    }

    #[test]
    fn test_total_records_saturates_on_huge_tables() {
        let mut map = fixtures::missing_data_map();
        map.missing_data_map.clear();
        for name in ["publications", "innovations"] {
            map.missing_data_map.insert(
                name.into(),
                TableAnalysis {
                    total_records: 1 << 63,
                    ..Default::default()
                },
            );
        }
        assert!(crate::validation::validate_missing_data_map(&map).is_ok());

        let report = build_report(&map, None);
        assert_eq!(report.total_records, u64::MAX);
    }

    #[test]
    fn test_render_text_draws_dots() {
        let report = build_report(
            &fixtures::missing_data_map(),
            Some(&fixtures::enrichment_gaps()),
        );
        let text = render_text(&report);
        assert!(text.contains('●'));
        assert!(text.contains('○'));
        assert!(text.contains("Recommendations:"));
        assert!(text.contains("[critical] innovation_funding"));
    }
}
