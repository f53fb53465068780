//! Boundary checks for backend payloads.
//!
//! Deserialization guarantees the shape; these checks enforce the numeric
//! invariants. A failing payload is treated like an unavailable endpoint.

use chrono::{DateTime, NaiveDateTime};

use crate::types::{EnrichmentGaps, FieldCompleteness, MissingDataMap, TableAnalysis};

/// Allowed drift between the reported percentage and complete/total.
const PERCENTAGE_TOLERANCE: f64 = 1.0;

pub fn validate_missing_data_map(map: &MissingDataMap) -> Result<(), String> {
    if !is_iso_timestamp(&map.analysis_timestamp) {
        return Err(format!(
            "analysis_timestamp is not ISO-8601: {:?}",
            map.analysis_timestamp
        ));
    }
    for (table, analysis) in &map.missing_data_map {
        validate_table(analysis).map_err(|e| format!("table {}: {}", table, e))?;
    }
    Ok(())
}

pub fn validate_table(table: &TableAnalysis) -> Result<(), String> {
    for (name, value) in [
        ("overall_completeness", table.overall_completeness),
        ("core_fields_completeness", table.core_fields_completeness),
        (
            "enrichment_fields_completeness",
            table.enrichment_fields_completeness,
        ),
    ] {
        check_percentage(name, value)?;
    }

    if table.completeness_matrix.len() as u64 > table.total_records {
        return Err(format!(
            "completeness_matrix has {} rows for {} records",
            table.completeness_matrix.len(),
            table.total_records
        ));
    }

    // Tables the backend could not analyse carry an error and no field stats.
    if table.error.is_some() {
        return Ok(());
    }

    for (name, field) in &table.field_completeness {
        validate_field(field, table.total_records).map_err(|e| format!("field {}: {}", name, e))?;
    }
    Ok(())
}

fn validate_field(field: &FieldCompleteness, total_records: u64) -> Result<(), String> {
    check_percentage("completeness_percentage", field.completeness_percentage)?;

    let counted = field
        .complete_records
        .checked_add(field.missing_records)
        .ok_or_else(|| {
            format!(
                "complete_records {} + missing_records {} overflows",
                field.complete_records, field.missing_records
            )
        })?;
    if counted != total_records {
        return Err(format!(
            "complete_records + missing_records = {} but table has {} records",
            counted, total_records
        ));
    }

    if total_records > 0 {
        let expected = field.complete_records as f64 / total_records as f64 * 100.0;
        if (expected - field.completeness_percentage).abs() > PERCENTAGE_TOLERANCE {
            return Err(format!(
                "completeness_percentage {} disagrees with counts ({:.1})",
                field.completeness_percentage, expected
            ));
        }
    }
    Ok(())
}

pub fn validate_enrichment_gaps(gaps: &EnrichmentGaps) -> Result<(), String> {
    for priority in &gaps.gaps_analysis.enrichment_priority {
        if !priority.priority_score.is_finite() {
            return Err(format!(
                "enrichment task {:?} has a non-finite priority score",
                priority.task
            ));
        }
    }
    for gap in &gaps.gaps_analysis.critical_missing_data {
        if gap.gap_type.trim().is_empty() {
            return Err("critical gap without a type".to_string());
        }
    }
    Ok(())
}

fn check_percentage(name: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} out of range: {}", name, value))
    }
}

/// RFC 3339, or a naive ISO timestamp as emitted by Python's `isoformat()`.
fn is_iso_timestamp(raw: &str) -> bool {
    DateTime::parse_from_rfc3339(raw).is_ok()
        || NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}
