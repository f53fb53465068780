//! Completeness classification utilities.
//!
//! Pure functions shared by the monitor, the report builder and the HTTP
//! surface. Level thresholds: >=80 excellent, >=60 good, >=40 fair, else poor.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{FieldCompleteness, FieldType, Severity};

const EXCELLENT_THRESHOLD: f64 = 80.0;
const GOOD_THRESHOLD: f64 = 60.0;
const FAIR_THRESHOLD: f64 = 40.0;

/// Core fields below this percentage trigger the critical recommendation.
const CORE_FIELD_CRITICAL_THRESHOLD: f64 = 60.0;

/// Share of excellent fields needed for the "maintain standards" recommendation.
const EXCELLENT_SHARE_FOR_PRAISE: f64 = 0.8;

/// Completeness bucket, ordered best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompletenessLevel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl CompletenessLevel {
    pub fn label(&self) -> &'static str {
        match self {
            CompletenessLevel::Excellent => "Excellent",
            CompletenessLevel::Good => "Good",
            CompletenessLevel::Fair => "Fair",
            CompletenessLevel::Poor => "Poor",
        }
    }
}

/// Classify a completeness percentage. Input is clamped to [0, 100]; NaN is poor.
pub fn classify_level(percentage: f64) -> CompletenessLevel {
    if percentage.is_nan() {
        return CompletenessLevel::Poor;
    }
    let p = percentage.clamp(0.0, 100.0);
    if p >= EXCELLENT_THRESHOLD {
        CompletenessLevel::Excellent
    } else if p >= GOOD_THRESHOLD {
        CompletenessLevel::Good
    } else if p >= FAIR_THRESHOLD {
        CompletenessLevel::Fair
    } else {
        CompletenessLevel::Poor
    }
}

/// Hex colour for charts and dot matrices.
pub fn color_for(percentage: f64) -> &'static str {
    match classify_level(percentage) {
        CompletenessLevel::Excellent => "#10b981",
        CompletenessLevel::Good => "#3b82f6",
        CompletenessLevel::Fair => "#f59e0b",
        CompletenessLevel::Poor => "#ef4444",
    }
}

/// Background utility class.
pub fn color_class_for(percentage: f64) -> &'static str {
    match classify_level(percentage) {
        CompletenessLevel::Excellent => "bg-green-500",
        CompletenessLevel::Good => "bg-blue-500",
        CompletenessLevel::Fair => "bg-yellow-500",
        CompletenessLevel::Poor => "bg-red-500",
    }
}

/// Text utility class.
pub fn text_color_for(percentage: f64) -> &'static str {
    match classify_level(percentage) {
        CompletenessLevel::Excellent => "text-green-600",
        CompletenessLevel::Good => "text-blue-600",
        CompletenessLevel::Fair => "text-yellow-600",
        CompletenessLevel::Poor => "text-red-600",
    }
}

/// Badge classes for a severity label. Unknown labels get the `low` styling.
pub fn severity_color(severity: &str) -> &'static str {
    severity_color_for(Severity::from_label(severity))
}

pub fn severity_color_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "text-red-600 bg-red-50 border-red-200",
        Severity::High => "text-orange-600 bg-orange-50 border-orange-200",
        Severity::Medium => "text-yellow-600 bg-yellow-50 border-yellow-200",
        Severity::Low => "text-blue-600 bg-blue-50 border-blue-200",
    }
}

/// Icon name for a severity label. Unknown labels get the `low` icon.
pub fn severity_icon(severity: &str) -> &'static str {
    severity_icon_for(Severity::from_label(severity))
}

pub fn severity_icon_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "alert-triangle",
        Severity::High => "alert-circle",
        Severity::Medium => "info",
        Severity::Low => "check-circle",
    }
}

/// Mean completeness percentage across fields; 0 when there are none.
pub fn calculate_overall_completeness<'a, I>(fields: I) -> f64
where
    I: IntoIterator<Item = &'a FieldCompleteness>,
{
    let (sum, count) = fields
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), f| {
            (sum + f.completeness_percentage, count + 1)
        });
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Field names bucketed by completeness level, in iteration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldBuckets {
    pub excellent: Vec<String>,
    pub good: Vec<String>,
    pub fair: Vec<String>,
    pub poor: Vec<String>,
}

impl FieldBuckets {
    pub fn bucket(&self, level: CompletenessLevel) -> &[String] {
        match level {
            CompletenessLevel::Excellent => &self.excellent,
            CompletenessLevel::Good => &self.good,
            CompletenessLevel::Fair => &self.fair,
            CompletenessLevel::Poor => &self.poor,
        }
    }

    fn push(&mut self, level: CompletenessLevel, name: String) {
        match level {
            CompletenessLevel::Excellent => self.excellent.push(name),
            CompletenessLevel::Good => self.good.push(name),
            CompletenessLevel::Fair => self.fair.push(name),
            CompletenessLevel::Poor => self.poor.push(name),
        }
    }

    pub fn total(&self) -> usize {
        self.excellent.len() + self.good.len() + self.fair.len() + self.poor.len()
    }
}

pub fn categorize_fields_by_completeness(
    fields: &BTreeMap<String, FieldCompleteness>,
) -> FieldBuckets {
    categorize_named(fields.iter().map(|(name, f)| (name.as_str(), f)))
}

/// Like [`categorize_fields_by_completeness`] for any ordered (name, field) sequence.
pub fn categorize_named<'a, I>(fields: I) -> FieldBuckets
where
    I: IntoIterator<Item = (&'a str, &'a FieldCompleteness)>,
{
    let mut buckets = FieldBuckets::default();
    for (name, field) in fields {
        buckets.push(classify_level(field.completeness_percentage), name.to_string());
    }
    buckets
}

pub fn generate_recommendations(fields: &BTreeMap<String, FieldCompleteness>) -> Vec<String> {
    recommendations_for_named(fields.iter().map(|(name, f)| (name.as_str(), f)))
}

/// Rule-based recommendations. Every applicable rule fires, in rule order:
/// low core fields, poor field count, then the excellent-share praise.
pub fn recommendations_for_named<'a, I>(fields: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, &'a FieldCompleteness)>,
{
    let fields: Vec<(&str, &FieldCompleteness)> = fields.into_iter().collect();
    let mut recommendations = Vec::new();

    let low_core: Vec<&str> = fields
        .iter()
        .filter(|(_, f)| {
            f.field_type == FieldType::Core
                && f.completeness_percentage < CORE_FIELD_CRITICAL_THRESHOLD
        })
        .map(|(name, _)| *name)
        .collect();
    if !low_core.is_empty() {
        recommendations.push(format!(
            "Critical: core fields below {}% completeness need immediate attention: {}",
            CORE_FIELD_CRITICAL_THRESHOLD,
            low_core.join(", ")
        ));
    }

    let buckets = categorize_named(fields.iter().copied());
    if !buckets.poor.is_empty() {
        recommendations.push(format!(
            "{} field(s) have poor completeness (below {}%) \
             and should be prioritized for enrichment",
            buckets.poor.len(),
            FAIR_THRESHOLD
        ));
    }

    if !fields.is_empty() {
        let excellent_share = buckets.excellent.len() as f64 / fields.len() as f64;
        if excellent_share >= EXCELLENT_SHARE_FOR_PRAISE {
            recommendations.push(
                "Data quality is excellent across most fields. \
                 Maintain current data collection standards"
                    .to_string(),
            );
        }
    }

    recommendations
}
