//! # Datasets
//!
//! Report columns come from one of four data entities. Which entities may be
//! combined in one report is decided by a compatibility graph fetched from
//! the server; this module filters the selectable entities against it.

pub mod column_select;

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

pub type DatasetId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    #[serde(alias = "Inventory")]
    Inventory,
    #[serde(alias = "Contacts")]
    Contacts,
    #[serde(alias = "Deals")]
    Deals,
    #[serde(alias = "Accounts")]
    Accounts,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::Inventory,
        Dataset::Contacts,
        Dataset::Deals,
        Dataset::Accounts,
    ];

    /// Key used in API paths and catalog entries.
    pub fn key(self) -> &'static str {
        match self {
            Dataset::Inventory => "inventory",
            Dataset::Contacts => "contacts",
            Dataset::Deals => "deals",
            Dataset::Accounts => "accounts",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|dataset| dataset.key().eq_ignore_ascii_case(key))
    }
}

impl Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Dataset::Inventory => "Inventory",
            Dataset::Contacts => "Contacts",
            Dataset::Deals => "Deals",
            Dataset::Accounts => "Accounts",
        };
        write!(f, "{label}")
    }
}

/// Reference to a dataset this one may be combined with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMatch {
    pub id: DatasetId,
    #[serde(default)]
    pub name: String,
}

/// Catalog entry describing a dataset and its compatibility edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub id: DatasetId,
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "match", default)]
    pub matches: Vec<DatasetMatch>,
}

impl DatasetInfo {
    pub fn dataset(&self) -> Option<Dataset> {
        Dataset::from_key(&self.key)
    }

    pub fn matches_id(&self, id: DatasetId) -> bool {
        self.matches.iter().any(|m| m.id == id)
    }

    /// Both entries list each other as a match.
    pub fn is_compatible_with(&self, other: &DatasetInfo) -> bool {
        self.matches_id(other.id) && other.matches_id(self.id)
    }
}

/// A column of some dataset, as offered to and selected in a report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportColumn {
    pub data: String,
    pub name: String,
    pub dataset: Dataset,
}

pub fn find_info(catalog: &[DatasetInfo], dataset: Dataset) -> Option<&DatasetInfo> {
    catalog.iter().find(|info| info.dataset() == Some(dataset))
}

/// Datasets that can still be added next to `selected`.
///
/// A candidate stays available when it is already selected, or when it is
/// mutually compatible with every selected dataset found in the catalog.
/// With nothing selected, or no catalog, every dataset is available.
pub fn get_compatible_datasets(selected: &[Dataset], catalog: &[DatasetInfo]) -> Vec<Dataset> {
    if selected.is_empty() || catalog.is_empty() {
        return Dataset::ALL.to_vec();
    }

    let selected_infos: Vec<&DatasetInfo> = catalog
        .iter()
        .filter(|info| info.dataset().is_some_and(|dataset| selected.contains(&dataset)))
        .collect();

    Dataset::ALL
        .into_iter()
        .filter(|candidate| {
            if selected.contains(candidate) {
                return true;
            }
            let Some(candidate_info) = find_info(catalog, *candidate) else {
                return false;
            };
            selected_infos
                .iter()
                .all(|selected_info| candidate_info.is_compatible_with(selected_info))
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn info(id: DatasetId, dataset: Dataset, matches: &[DatasetId]) -> DatasetInfo {
        DatasetInfo {
            id,
            key: dataset.key().to_string(),
            name: dataset.to_string(),
            matches: matches
                .iter()
                .map(|id| DatasetMatch {
                    id: *id,
                    name: String::new(),
                })
                .collect(),
        }
    }

    /// Inventory(1) <-> Deals(3) <-> Contacts(2), Deals <-> Accounts(4),
    /// Contacts <-> Accounts. Inventory and Contacts do not mix.
    pub(crate) fn catalog() -> Vec<DatasetInfo> {
        vec![
            info(1, Dataset::Inventory, &[3]),
            info(2, Dataset::Contacts, &[3, 4]),
            info(3, Dataset::Deals, &[1, 2, 4]),
            info(4, Dataset::Accounts, &[2, 3]),
        ]
    }

    #[test]
    fn empty_inputs_offer_everything() {
        assert_eq!(get_compatible_datasets(&[], &catalog()), Dataset::ALL.to_vec());
        assert_eq!(get_compatible_datasets(&[Dataset::Deals], &[]), Dataset::ALL.to_vec());
    }

    #[test]
    fn mutual_match_keeps_partner() {
        let compatible = get_compatible_datasets(&[Dataset::Inventory], &catalog());
        assert_eq!(compatible, vec![Dataset::Inventory, Dataset::Deals]);

        let compatible = get_compatible_datasets(&[Dataset::Deals], &catalog());
        assert!(compatible.contains(&Dataset::Inventory));
    }

    #[test]
    fn one_sided_match_is_not_enough() {
        let catalog = vec![
            info(1, Dataset::Inventory, &[2]),
            info(2, Dataset::Contacts, &[]),
        ];

        assert_eq!(get_compatible_datasets(&[Dataset::Inventory], &catalog), vec![Dataset::Inventory]);
        assert_eq!(get_compatible_datasets(&[Dataset::Contacts], &catalog), vec![Dataset::Contacts]);
    }

    #[test]
    fn candidate_must_match_whole_selection() {
        let compatible = get_compatible_datasets(&[Dataset::Contacts, Dataset::Deals], &catalog());
        assert_eq!(compatible, vec![Dataset::Contacts, Dataset::Deals, Dataset::Accounts]);

        let compatible = get_compatible_datasets(&[Dataset::Inventory, Dataset::Deals], &catalog());
        assert_eq!(compatible, vec![Dataset::Inventory, Dataset::Deals]);
    }

    #[test]
    fn selection_is_always_retained_and_subset_of_all() {
        for dataset in Dataset::ALL {
            let compatible = get_compatible_datasets(&[dataset], &catalog());
            assert!(compatible.contains(&dataset));
            assert!(compatible.iter().all(|d| Dataset::ALL.contains(d)));
        }
    }

    #[test]
    fn filter_is_idempotent() {
        let selected = [Dataset::Accounts];
        let first = get_compatible_datasets(&selected, &catalog());
        let second = get_compatible_datasets(&selected, &catalog());
        assert_eq!(first, second);
    }

    #[test]
    fn datasets_missing_from_catalog_are_not_offered() {
        let catalog = vec![info(1, Dataset::Inventory, &[3]), info(3, Dataset::Deals, &[1])];

        let compatible = get_compatible_datasets(&[Dataset::Inventory], &catalog);
        assert_eq!(compatible, vec![Dataset::Inventory, Dataset::Deals]);
    }

    #[test]
    fn parses_catalog_entry() {
        let raw = r#"{ "id": 3, "key": "Deals", "name": "Deals", "match": [{ "id": 1, "name": "Inventory" }] }"#;
        let entry: DatasetInfo = serde_json::from_str(raw).unwrap();

        assert_eq!(entry.dataset(), Some(Dataset::Deals));
        assert!(entry.matches_id(1));
    }

    #[test]
    fn parses_column_with_dataset_key() {
        let raw = r#"{ "data": "vin", "name": "VIN", "dataset": "inventory" }"#;
        let column: ReportColumn = serde_json::from_str(raw).unwrap();
        assert_eq!(column.dataset, Dataset::Inventory);
    }
}
