use tracing::debug;

use crate::error::SelectionError;

use super::{find_info, get_compatible_datasets, Dataset, DatasetInfo, ReportColumn};

/// Columns picked for a report and the dataset currently browsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelection {
    selected: Vec<ReportColumn>,
    browsing: Option<Dataset>,
}

impl ColumnSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &[ReportColumn] {
        &self.selected
    }

    pub fn browsing(&self) -> Option<Dataset> {
        self.browsing
    }

    pub fn is_selected(&self, column: &ReportColumn) -> bool {
        self.selected.contains(column)
    }

    /// Distinct datasets of the selected columns, in enumeration order.
    pub fn selected_datasets(&self) -> Vec<Dataset> {
        Dataset::ALL
            .into_iter()
            .filter(|dataset| self.selected.iter().any(|column| column.dataset == *dataset))
            .collect()
    }

    pub fn selectable_datasets(&self, catalog: &[DatasetInfo]) -> Vec<Dataset> {
        get_compatible_datasets(&self.selected_datasets(), catalog)
    }

    pub fn browse(&mut self, dataset: Dataset) {
        self.browsing = Some(dataset);
    }

    pub fn select(&mut self, column: ReportColumn, catalog: &[DatasetInfo]) -> Result<(), SelectionError> {
        if catalog.is_empty() {
            return Err(SelectionError::CatalogUnavailable);
        }
        if self.is_selected(&column) {
            return Err(SelectionError::AlreadySelected(column.name));
        }
        if !self.selectable_datasets(catalog).contains(&column.dataset) {
            return Err(SelectionError::IncompatibleDataset {
                dataset: column.dataset,
            });
        }

        debug!(column = %column.data, dataset = %column.dataset, "column selected");
        self.selected.push(column);
        Ok(())
    }

    pub fn deselect(&mut self, column: &ReportColumn, catalog: &[DatasetInfo]) {
        self.selected.retain(|selected| selected != column);
        self.settle_browsing(catalog);
    }

    pub fn remove_at(&mut self, index: usize, catalog: &[DatasetInfo]) -> Option<ReportColumn> {
        if index >= self.selected.len() {
            return None;
        }
        let removed = self.selected.remove(index);
        self.settle_browsing(catalog);
        Some(removed)
    }

    /// Checkbox handler: select when checked, deselect otherwise.
    pub fn toggle(&mut self, column: ReportColumn, checked: bool, catalog: &[DatasetInfo]) -> Result<(), SelectionError> {
        if checked {
            self.select(column, catalog)?;
            self.settle_browsing(catalog);
        } else {
            self.deselect(&column, catalog);
        }
        Ok(())
    }

    /// Keep the browsed dataset selectable, falling back to the first one
    /// that is.
    fn settle_browsing(&mut self, catalog: &[DatasetInfo]) {
        let selectable = self.selectable_datasets(catalog);
        match self.browsing {
            Some(dataset) if selectable.contains(&dataset) => {}
            _ => self.browsing = selectable.first().copied(),
        }
    }

    /// Hints like "Contacts + Inventory is not allowed" for the datasets
    /// the current selection rules out. Selected pairs that conflict, which
    /// a refreshed catalog can produce, are reported first.
    pub fn incompatible_pairs(&self, catalog: &[DatasetInfo]) -> Vec<String> {
        let selectable = self.selectable_datasets(catalog);
        let selected = self.selected_datasets();
        let conflicts = |left: Dataset, right: Dataset| match (find_info(catalog, left), find_info(catalog, right)) {
            (Some(left_info), Some(right_info)) => !left_info.is_compatible_with(right_info),
            _ => true,
        };

        let mut hints = Vec::new();
        if !catalog.is_empty() {
            for (index, first) in selected.iter().enumerate() {
                for second in &selected[index + 1..] {
                    if conflicts(*first, *second) {
                        hints.push(format!("{first} + {second} is not allowed"));
                    }
                }
            }
        }
        for blocked in Dataset::ALL.into_iter().filter(|dataset| !selectable.contains(dataset)) {
            if let Some(culprit) = selected.iter().find(|dataset| conflicts(**dataset, blocked)) {
                hints.push(format!("{culprit} + {blocked} is not allowed"));
            }
        }
        hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::tests::catalog;

    fn column(data: &str, dataset: Dataset) -> ReportColumn {
        ReportColumn {
            data: data.to_string(),
            name: data.to_uppercase(),
            dataset,
        }
    }

    #[test]
    fn starts_with_everything_selectable() {
        let selection = ColumnSelection::new();
        assert_eq!(selection.selectable_datasets(&catalog()), Dataset::ALL.to_vec());
        assert!(selection.selected_datasets().is_empty());
    }

    #[test]
    fn selecting_shrinks_selectable_datasets() {
        let catalog = catalog();
        let mut selection = ColumnSelection::new();

        selection.select(column("vin", Dataset::Inventory), &catalog).unwrap();
        let after_first = selection.selectable_datasets(&catalog);
        assert_eq!(after_first, vec![Dataset::Inventory, Dataset::Deals]);

        selection.select(column("price", Dataset::Deals), &catalog).unwrap();
        let after_second = selection.selectable_datasets(&catalog);
        assert!(after_second.iter().all(|d| after_first.contains(d)));
        assert!(after_second.contains(&Dataset::Inventory));
    }

    #[test]
    fn refuses_incompatible_and_duplicate_columns() {
        let catalog = catalog();
        let mut selection = ColumnSelection::new();
        selection.select(column("vin", Dataset::Inventory), &catalog).unwrap();

        let err = selection.select(column("email", Dataset::Contacts), &catalog).unwrap_err();
        assert_eq!(
            err,
            SelectionError::IncompatibleDataset {
                dataset: Dataset::Contacts
            }
        );

        let err = selection.select(column("vin", Dataset::Inventory), &catalog).unwrap_err();
        assert_eq!(err, SelectionError::AlreadySelected("VIN".into()));
        assert_eq!(selection.selected().len(), 1);
    }

    #[test]
    fn removing_last_column_re_expands() {
        let catalog = catalog();
        let mut selection = ColumnSelection::new();
        selection.select(column("vin", Dataset::Inventory), &catalog).unwrap();
        selection.select(column("stock", Dataset::Inventory), &catalog).unwrap();

        selection.remove_at(0, &catalog);
        assert_eq!(selection.selectable_datasets(&catalog).len(), 2);

        selection.deselect(&column("stock", Dataset::Inventory), &catalog);
        assert_eq!(selection.selectable_datasets(&catalog), Dataset::ALL.to_vec());
        assert!(selection.remove_at(3, &catalog).is_none());
    }

    #[test]
    fn toggle_keeps_browsing_on_a_selectable_dataset() {
        let catalog = catalog();
        let mut selection = ColumnSelection::new();
        selection.browse(Dataset::Contacts);

        selection.toggle(column("vin", Dataset::Inventory), true, &catalog).unwrap();
        assert_eq!(selection.browsing(), Some(Dataset::Inventory));

        selection.browse(Dataset::Deals);
        selection.toggle(column("vin", Dataset::Inventory), false, &catalog).unwrap();
        assert_eq!(selection.browsing(), Some(Dataset::Deals));
        assert!(selection.selected().is_empty());
    }

    #[test]
    fn refuses_columns_until_catalog_is_loaded() {
        let mut selection = ColumnSelection::new();

        let err = selection.select(column("vin", Dataset::Inventory), &[]).unwrap_err();
        assert_eq!(err, SelectionError::CatalogUnavailable);
        assert!(selection.selected().is_empty());

        selection.select(column("vin", Dataset::Inventory), &catalog()).unwrap();
        assert_eq!(selection.selected().len(), 1);
    }

    #[test]
    fn reports_conflicts_after_catalog_refresh() {
        let mut selection = ColumnSelection::new();
        selection.select(column("vin", Dataset::Inventory), &catalog()).unwrap();
        selection.select(column("price", Dataset::Deals), &catalog()).unwrap();

        let refreshed: Vec<DatasetInfo> = catalog()
            .into_iter()
            .map(|mut info| {
                if info.dataset() == Some(Dataset::Deals) {
                    info.matches.retain(|m| m.id != 1);
                }
                info
            })
            .collect();

        let hints = selection.incompatible_pairs(&refreshed);
        assert_eq!(hints.first().map(String::as_str), Some("Inventory + Deals is not allowed"));
    }

    #[test]
    fn explains_blocked_datasets() {
        let catalog = catalog();
        let mut selection = ColumnSelection::new();
        selection.select(column("email", Dataset::Contacts), &catalog).unwrap();

        assert_eq!(selection.incompatible_pairs(&catalog), vec!["Contacts + Inventory is not allowed"]);
    }
}
