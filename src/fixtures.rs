//! Canonical fallback payloads.
//!
//! Every degraded-mode value served when the backend is unavailable comes
//! from here. Fixtures are built from counts so they satisfy the same
//! invariants as live payloads.

use std::collections::BTreeMap;

use crate::completeness::calculate_overall_completeness;
use crate::types::{
    AnalysisSummary, CriticalGap, EnrichmentGaps, EnrichmentPriority, FieldCompleteness,
    FieldType, GapsAnalysis, HomepageAggregate, HomepageData, InnovationSummary, MissingDataMap,
    PlatformStats, SectorCount, Severity, TableAnalysis,
};

/// Fixed so fallback output is reproducible.
pub const FIXTURE_TIMESTAMP: &str = "2025-01-01T00:00:00Z";

/// (field, complete records, field type)
type FieldSeed<'a> = (&'a str, u64, FieldType);

const PUBLICATION_RECORDS: u64 = 10;
const PUBLICATION_FIELDS: &[FieldSeed<'static>] = &[
    ("abstract", 5, FieldType::Core),
    ("authors", 9, FieldType::Core),
    ("citation_count", 2, FieldType::Enrichment),
    ("doi", 3, FieldType::Enrichment),
    ("keywords", 6, FieldType::Enrichment),
    ("publication_date", 8, FieldType::Core),
    ("title", 10, FieldType::Core),
];

const INNOVATION_RECORDS: u64 = 8;
const INNOVATION_FIELDS: &[FieldSeed<'static>] = &[
    ("country", 6, FieldType::Core),
    ("description", 7, FieldType::Core),
    ("funding_amount", 2, FieldType::Enrichment),
    ("team_size", 1, FieldType::Enrichment),
    ("title", 8, FieldType::Core),
    ("website_url", 4, FieldType::Enrichment),
];

fn table_from_seeds(total_records: u64, seeds: &[FieldSeed]) -> TableAnalysis {
    let field_completeness: BTreeMap<String, FieldCompleteness> = seeds
        .iter()
        .map(|(name, complete, field_type)| {
            (
                name.to_string(),
                FieldCompleteness {
                    completeness_percentage: *complete as f64 / total_records as f64 * 100.0,
                    complete_records: *complete,
                    missing_records: total_records - complete,
                    field_type: *field_type,
                },
            )
        })
        .collect();

    // Record i has field f iff i < complete(f): the matrix agrees with the counts.
    let completeness_matrix: Vec<BTreeMap<String, bool>> = (0..total_records)
        .map(|i| {
            seeds
                .iter()
                .map(|(name, complete, _)| (name.to_string(), i < *complete))
                .collect()
        })
        .collect();

    let of_type = |ty: FieldType| {
        calculate_overall_completeness(field_completeness.values().filter(|f| f.field_type == ty))
    };

    TableAnalysis {
        total_records,
        completeness_matrix,
        overall_completeness: calculate_overall_completeness(field_completeness.values()),
        core_fields_completeness: of_type(FieldType::Core),
        enrichment_fields_completeness: of_type(FieldType::Enrichment),
        field_completeness,
        error: None,
    }
}

pub fn missing_data_map() -> MissingDataMap {
    let mut tables = BTreeMap::new();
    tables.insert(
        "publications".to_string(),
        table_from_seeds(PUBLICATION_RECORDS, PUBLICATION_FIELDS),
    );
    tables.insert(
        "innovations".to_string(),
        table_from_seeds(INNOVATION_RECORDS, INNOVATION_FIELDS),
    );

    MissingDataMap {
        missing_data_map: tables,
        recommendations: vec![
            "Backfill publication abstracts from DOI metadata".to_string(),
            "Collect funding amounts for listed innovations".to_string(),
            "Create the intelligence reports table to enable enrichment tracking".to_string(),
        ],
        analysis_timestamp: FIXTURE_TIMESTAMP.to_string(),
        summary: AnalysisSummary {
            tables_analyzed: 2,
            total_records_analyzed: PUBLICATION_RECORDS + INNOVATION_RECORDS,
            intelligence_table_exists: false,
        },
    }
}

pub fn enrichment_gaps() -> EnrichmentGaps {
    let gaps_for = |total: u64, seeds: &[FieldSeed]| -> BTreeMap<String, u64> {
        seeds
            .iter()
            .filter(|(_, complete, _)| *complete < total)
            .map(|(name, complete, _)| (name.to_string(), total - complete))
            .collect()
    };

    let mut intelligence_gaps = BTreeMap::new();
    intelligence_gaps.insert("table_exists".to_string(), serde_json::json!(false));
    intelligence_gaps.insert("reports_missing".to_string(), serde_json::json!(true));

    EnrichmentGaps {
        gaps_analysis: GapsAnalysis {
            publications_gaps: gaps_for(PUBLICATION_RECORDS, PUBLICATION_FIELDS),
            innovations_gaps: gaps_for(INNOVATION_RECORDS, INNOVATION_FIELDS),
            intelligence_gaps,
            critical_missing_data: vec![
                CriticalGap {
                    gap_type: "innovation_funding".to_string(),
                    severity: Severity::Critical,
                    description: "Most innovations have no recorded funding amount".to_string(),
                    impact: "Funding charts under-report investment per country".to_string(),
                    affected_records: 6,
                    recommended_action:
                        "Cross-reference funding announcements and investor databases".to_string(),
                },
                CriticalGap {
                    gap_type: "publication_doi".to_string(),
                    severity: Severity::High,
                    description: "Publications without DOI cannot be citation-tracked".to_string(),
                    impact: "Citation analytics cover a minority of papers".to_string(),
                    affected_records: 7,
                    recommended_action: "Resolve DOIs through Crossref title search".to_string(),
                },
                CriticalGap {
                    gap_type: "intelligence_reports".to_string(),
                    severity: Severity::Medium,
                    description: "No intelligence reports table is available".to_string(),
                    impact: "Enrichment progress cannot be tracked over time".to_string(),
                    affected_records: 0,
                    recommended_action: "Run the intelligence reports migration".to_string(),
                },
            ],
            enrichment_priority: vec![
                EnrichmentPriority {
                    task: "Funding data collection".to_string(),
                    priority_score: 9.5,
                    justification: "Funding is the headline dashboard metric".to_string(),
                    estimated_effort: "medium".to_string(),
                    expected_impact: "high".to_string(),
                },
                EnrichmentPriority {
                    task: "DOI resolution".to_string(),
                    priority_score: 7.0,
                    justification: "Unlocks citation and impact metrics".to_string(),
                    estimated_effort: "low".to_string(),
                    expected_impact: "medium".to_string(),
                },
            ],
        },
        actionable_insights: vec![
            "Prioritize funding data: 75% of innovations lack a funding amount".to_string(),
            "Resolving DOIs would enable citation tracking for 7 publications".to_string(),
        ],
    }
}

pub fn platform_stats() -> PlatformStats {
    PlatformStats {
        total_innovations: 247,
        total_publications: 1_832,
        total_funding_usd: 125_400_000.0,
        countries_covered: 38,
        verified_innovations: 96,
        last_updated: Some(FIXTURE_TIMESTAMP.to_string()),
    }
}

pub fn homepage_aggregate() -> HomepageAggregate {
    let funding_by_country: BTreeMap<String, f64> = [
        ("Egypt", 18_300_000.0),
        ("Kenya", 24_800_000.0),
        ("Nigeria", 31_500_000.0),
        ("South Africa", 29_100_000.0),
    ]
    .into_iter()
    .map(|(country, amount)| (country.to_string(), amount))
    .collect();

    let publications_by_year: BTreeMap<String, u64> = [
        ("2021", 298),
        ("2022", 371),
        ("2023", 455),
        ("2024", 512),
    ]
    .into_iter()
    .map(|(year, count)| (year.to_string(), count))
    .collect();

    HomepageAggregate {
        featured_countries: vec![
            "Nigeria".to_string(),
            "Kenya".to_string(),
            "South Africa".to_string(),
            "Egypt".to_string(),
        ],
        funding_by_country,
        publications_by_year,
        top_sectors: vec![
            SectorCount {
                sector: "Healthcare".to_string(),
                count: 64,
            },
            SectorCount {
                sector: "Agriculture".to_string(),
                count: 51,
            },
            SectorCount {
                sector: "Fintech".to_string(),
                count: 47,
            },
        ],
    }
}

pub fn recent_innovations() -> Vec<InnovationSummary> {
    vec![
        InnovationSummary {
            id: "fallback-1".to_string(),
            title: "Crop disease detection from smartphone photos".to_string(),
            description:
                "Offline image classifier helping smallholder farmers identify cassava disease"
                    .to_string(),
            country: Some("Kenya".to_string()),
            innovation_type: Some("Agriculture".to_string()),
            funding_amount: Some(1_200_000.0),
            created_at: Some(FIXTURE_TIMESTAMP.to_string()),
        },
        InnovationSummary {
            id: "fallback-2".to_string(),
            title: "Multilingual clinical triage assistant".to_string(),
            description: "Speech-driven triage in Yoruba, Hausa and Igbo for rural clinics"
                .to_string(),
            country: Some("Nigeria".to_string()),
            innovation_type: Some("Healthcare".to_string()),
            funding_amount: None,
            created_at: Some(FIXTURE_TIMESTAMP.to_string()),
        },
        InnovationSummary {
            id: "fallback-3".to_string(),
            title: "Alternative credit scoring for informal traders".to_string(),
            description: "Mobile-money transaction models for micro-lending decisions".to_string(),
            country: Some("Ghana".to_string()),
            innovation_type: Some("Fintech".to_string()),
            funding_amount: Some(800_000.0),
            created_at: Some(FIXTURE_TIMESTAMP.to_string()),
        },
    ]
}

/// Static homepage payload, tagged as cached data.
pub fn homepage_data() -> HomepageData {
    HomepageData {
        stats: Some(platform_stats()),
        homepage: Some(homepage_aggregate()),
        recent_innovations: recent_innovations(),
        is_real_data: false,
        fetched_at: FIXTURE_TIMESTAMP.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_matches_field_counts() {
        let map = missing_data_map();
        for table in map.missing_data_map.values() {
            assert_eq!(table.completeness_matrix.len() as u64, table.total_records);
            for (name, field) in &table.field_completeness {
                let present = table
                    .completeness_matrix
                    .iter()
                    .filter(|row| row.get(name).copied().unwrap_or(false))
                    .count() as u64;
                assert_eq!(present, field.complete_records, "field {}", name);
            }
        }
    }

    #[test]
    fn test_summary_totals_match_tables() {
        let map = missing_data_map();
        let total: u64 = map.missing_data_map.values().map(|t| t.total_records).sum();
        assert_eq!(map.summary.total_records_analyzed, total);
        assert_eq!(map.summary.tables_analyzed as usize, map.missing_data_map.len());
    }

    #[test]
    fn test_homepage_fallback_is_flagged() {
        let data = homepage_data();
        assert!(!data.is_real_data);
        assert!(data.stats.is_some());
        assert!(!data.recent_innovations.is_empty());
    }
}
