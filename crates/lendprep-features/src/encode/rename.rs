//! Mapping from technical column names to readable output labels.

use crate::stage::Stage;
use lendprep_data::schema::{application, derived};
use lendprep_data::{PrepError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One entry of the rename map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePair {
    /// Technical name
    pub from: String,
    /// Output label
    pub to: String,
}

/// Ordered, one-to-one column relabelling.
///
/// Columns not in the map keep their name. Values and column order are
/// never touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RenamePair>", into = "Vec<RenamePair>")]
pub struct ColumnRenames {
    pairs: Vec<RenamePair>,
}

impl ColumnRenames {
    /// Build a map, rejecting repeated sources or targets.
    pub fn new<I, S, T>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let pairs: Vec<RenamePair> = pairs
            .into_iter()
            .map(|(from, to)| RenamePair {
                from: from.into(),
                to: to.into(),
            })
            .collect();
        Self::try_from(pairs)
    }

    /// Output label for `name`, if mapped.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|p| p.from == name)
            .map(|p| p.to.as_str())
    }

    /// Label `name` ends up with: the mapped label or the name itself.
    pub fn label<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).unwrap_or(name)
    }

    /// The reverse map.
    pub fn inverse(&self) -> Self {
        Self {
            pairs: self
                .pairs
                .iter()
                .map(|p| RenamePair {
                    from: p.to.clone(),
                    to: p.from.clone(),
                })
                .collect(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over `(from, to)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|p| (p.from.as_str(), p.to.as_str()))
    }

    /// Relabel the columns of `df`.
    pub fn apply(&self, mut df: DataFrame) -> Result<DataFrame> {
        let labels: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| self.label(name.as_str()).to_string())
            .collect();

        let mut seen = HashSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(PrepError::data_quality(
                    label.as_str(),
                    "rename would produce a duplicate column label",
                ));
            }
        }

        df.set_column_names(labels)?;
        Ok(df)
    }
}

impl Default for ColumnRenames {
    fn default() -> Self {
        let pairs = [
            (application::CODE_GENDER, "Gender"),
            (application::FLAG_OWN_CAR, "Own_car"),
            (application::FLAG_OWN_REALTY, "Own_property"),
            (application::CNT_CHILDREN, "Num_children"),
            (application::AMT_INCOME_TOTAL, "Total_income"),
            (application::NAME_INCOME_TYPE, "Income_type"),
            (application::NAME_EDUCATION_TYPE, "Education_type"),
            (application::NAME_FAMILY_STATUS, "Family_status"),
            (application::NAME_HOUSING_TYPE, "Housing_type"),
            (application::FLAG_WORK_PHONE, "Work_phone"),
            (application::FLAG_PHONE, "Phone"),
            (application::FLAG_EMAIL, "Email"),
            (application::OCCUPATION_TYPE, "Occupation_type"),
            (application::CNT_FAM_MEMBERS, "Num_family"),
            (derived::ACCOUNT_LENGTH, "Account_length"),
            (derived::AGE_YEARS, "Age"),
            (derived::UNEMPLOYED, "Unemployed"),
            (derived::YEARS_EMPLOYED, "Years_employed"),
            (derived::TARGET, "Target"),
        ];
        Self {
            pairs: pairs
                .into_iter()
                .map(|(from, to)| RenamePair {
                    from: from.to_string(),
                    to: to.to_string(),
                })
                .collect(),
        }
    }
}

impl TryFrom<Vec<RenamePair>> for ColumnRenames {
    type Error = PrepError;

    fn try_from(pairs: Vec<RenamePair>) -> Result<Self> {
        let mut sources = HashSet::new();
        let mut targets = HashSet::new();
        for pair in &pairs {
            if !sources.insert(pair.from.as_str()) {
                return Err(PrepError::Config(format!(
                    "column '{}' is renamed more than once",
                    pair.from
                )));
            }
            if !targets.insert(pair.to.as_str()) {
                return Err(PrepError::Config(format!(
                    "label '{}' is the target of more than one rename",
                    pair.to
                )));
            }
        }
        Ok(Self { pairs })
    }
}

impl From<ColumnRenames> for Vec<RenamePair> {
    fn from(renames: ColumnRenames) -> Self {
        renames.pairs
    }
}

/// Stage wrapper around a rename map.
#[derive(Debug, Clone, Default)]
pub struct Renamer {
    renames: ColumnRenames,
}

impl Renamer {
    /// Create a renamer.
    pub const fn new(renames: ColumnRenames) -> Self {
        Self { renames }
    }
}

impl Stage for Renamer {
    fn name(&self) -> &str {
        "rename"
    }

    fn required_columns(&self) -> Vec<&str> {
        Vec::new()
    }

    fn apply(&self, df: DataFrame) -> Result<DataFrame> {
        self.renames.apply(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DataFrame {
        DataFrame::new(vec![
            Column::new("ID".into(), [1i64, 2]),
            Column::new(application::CODE_GENDER.into(), [1i32, 0]),
            Column::new(derived::AGE_YEARS.into(), [39.9, 51.2]),
            Column::new(derived::TARGET.into(), [1i32, 0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_default_map_labels() {
        let out = ColumnRenames::default().apply(table()).unwrap();
        let names: Vec<&str> = out
            .get_column_names()
            .into_iter()
            .map(|n| n.as_str())
            .collect();
        assert_eq!(names, vec!["ID", "Gender", "Age", "Target"]);
    }

    #[test]
    fn test_inverse_restores_labels_and_values() {
        let renames = ColumnRenames::default();
        let original = table();
        let restored = renames
            .inverse()
            .apply(renames.apply(original.clone()).unwrap())
            .unwrap();
        assert!(restored.equals(&original));
        assert_eq!(restored.get_column_names(), original.get_column_names());
    }

    #[test]
    fn test_chained_renames_do_not_collide() {
        // A -> B and B -> C applied together, not one after another
        let renames = ColumnRenames::new([("A", "B"), ("B", "C")]).unwrap();
        let df = DataFrame::new(vec![
            Column::new("A".into(), [1i64]),
            Column::new("B".into(), [2i64]),
        ])
        .unwrap();
        let out = renames.apply(df).unwrap();
        assert_eq!(out.column("B").unwrap().i64().unwrap().get(0), Some(1));
        assert_eq!(out.column("C").unwrap().i64().unwrap().get(0), Some(2));
    }

    #[test]
    fn test_collision_with_unmapped_column() {
        let renames = ColumnRenames::new([("A", "B")]).unwrap();
        let df = DataFrame::new(vec![
            Column::new("A".into(), [1i64]),
            Column::new("B".into(), [2i64]),
        ])
        .unwrap();
        assert!(renames.apply(df).is_err());
    }

    #[test]
    fn test_duplicate_target_rejected() {
        let err = ColumnRenames::new([("A", "X"), ("B", "X")]).unwrap_err();
        assert!(matches!(err, PrepError::Config(_)));
    }

    #[test]
    fn test_serde_round_trip() {
        let renames = ColumnRenames::default();
        let json = serde_json::to_string(&renames).unwrap();
        let parsed: ColumnRenames = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, renames);
        assert_eq!(parsed.len(), 19);
    }

    #[test]
    fn test_serde_rejects_duplicate_source() {
        let json = r#"[{"from":"A","to":"X"},{"from":"A","to":"Y"}]"#;
        assert!(serde_json::from_str::<ColumnRenames>(json).is_err());
    }
}
