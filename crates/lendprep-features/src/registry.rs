//! Feature Registry
//!
//! Catalogue of every column the pipeline derives or encodes, with its
//! output label and the raw columns it is computed from.

use lendprep_data::schema::{application, credit, derived};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Feature categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureCategory {
    /// Credit account tenure
    Tenure,
    /// Applicant demographics
    Demographic,
    /// Employment status and duration
    Employment,
    /// Risk label
    Target,
    /// Binary-encoded categorical fields
    Encoding,
}

impl fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tenure => "tenure",
            Self::Demographic => "demographic",
            Self::Employment => "employment",
            Self::Target => "target",
            Self::Encoding => "encoding",
        };
        f.write_str(name)
    }
}

/// Feature metadata
#[derive(Debug, Clone, Serialize)]
pub struct FeatureInfo {
    /// Technical column name
    pub name: &'static str,
    /// Label in the final table
    pub label: &'static str,
    /// Feature category
    pub category: FeatureCategory,
    /// What the column holds
    pub description: &'static str,
    /// Raw columns it is computed from
    pub source_columns: &'static [&'static str],
}

/// All derived and encoded features
pub fn available_features() -> Vec<FeatureInfo> {
    vec![
        FeatureInfo {
            name: derived::ACCOUNT_LENGTH,
            label: "Account_length",
            category: FeatureCategory::Tenure,
            description: "Months since the oldest credit-history entry",
            source_columns: &[credit::MONTHS_BALANCE],
        },
        FeatureInfo {
            name: derived::AGE_YEARS,
            label: "Age",
            category: FeatureCategory::Demographic,
            description: "Age in years at application",
            source_columns: &[application::DAYS_BIRTH],
        },
        FeatureInfo {
            name: derived::UNEMPLOYED,
            label: "Unemployed",
            category: FeatureCategory::Employment,
            description: "1 when there is no employment history, else 0",
            source_columns: &[application::DAYS_EMPLOYED],
        },
        FeatureInfo {
            name: derived::YEARS_EMPLOYED,
            label: "Years_employed",
            category: FeatureCategory::Employment,
            description: "Years in current employment, 0 when unemployed",
            source_columns: &[application::DAYS_EMPLOYED],
        },
        FeatureInfo {
            name: derived::TARGET,
            label: "Target",
            category: FeatureCategory::Target,
            description: "1 if any month was at least 30 days overdue",
            source_columns: &[credit::STATUS],
        },
        FeatureInfo {
            name: application::CODE_GENDER,
            label: "Gender",
            category: FeatureCategory::Encoding,
            description: "F = 0, M = 1",
            source_columns: &[application::CODE_GENDER],
        },
        FeatureInfo {
            name: application::FLAG_OWN_CAR,
            label: "Own_car",
            category: FeatureCategory::Encoding,
            description: "N = 0, Y = 1",
            source_columns: &[application::FLAG_OWN_CAR],
        },
        FeatureInfo {
            name: application::FLAG_OWN_REALTY,
            label: "Own_property",
            category: FeatureCategory::Encoding,
            description: "N = 0, Y = 1",
            source_columns: &[application::FLAG_OWN_REALTY],
        },
    ]
}

/// Features in one category
pub fn features_by_category(category: FeatureCategory) -> Vec<FeatureInfo> {
    available_features()
        .into_iter()
        .filter(|f| f.category == category)
        .collect()
}

/// Look up a feature by technical name or output label
pub fn get_feature_info(name: &str) -> Option<FeatureInfo> {
    available_features()
        .into_iter()
        .find(|f| f.name == name || f.label == name)
}

/// All features indexed by technical name
pub fn feature_map() -> HashMap<&'static str, FeatureInfo> {
    available_features()
        .into_iter()
        .map(|f| (f.name, f))
        .collect()
}

/// Technical names of all features
pub fn list_feature_names() -> Vec<&'static str> {
    available_features().into_iter().map(|f| f.name).collect()
}

/// Count features by category
pub fn count_by_category() -> HashMap<FeatureCategory, usize> {
    let mut counts = HashMap::new();
    for feature in available_features() {
        *counts.entry(feature.category).or_insert(0) += 1;
    }
    counts
}
