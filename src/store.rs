// Chart configuration store: owns every widget's config in creation order

use crate::config::{ChartConfig, ChartKind, SettingsPatch, WidgetId, WidgetKind};
use crate::data::Dataset;
use crate::error::StoreError;
use crate::EngineOptions;
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct ConfigStore {
    configs: IndexMap<WidgetId, ChartConfig>,
    selected: Option<WidgetId>,
    next_id: u64,
    active_dataset: Option<Arc<Dataset>>,
    options: EngineOptions,
}

impl ConfigStore {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    fn allocate_id(&mut self) -> WidgetId {
        self.next_id += 1;
        WidgetId::new(self.next_id)
    }

    /// Create a widget of `kind`, seeded from the active dataset's columns
    pub fn create(&mut self, kind: WidgetKind) -> WidgetId {
        let id = self.allocate_id();
        let columns = self
            .active_dataset
            .as_ref()
            .map(|d| d.columns.clone())
            .unwrap_or_default();

        let config = ChartConfig {
            id,
            title: kind.default_title(),
            color: self.options.widget_color(),
            dataset: self.active_dataset.clone(),
            kind: ChartKind::seeded(kind, &columns, self.options.row_limit),
        };

        log::debug!("created {} ({})", id, kind);
        self.configs.insert(id, config);
        id
    }

    /// Store a clone of `source` under a fresh id
    pub fn insert_copy(&mut self, source: &ChartConfig) -> WidgetId {
        let id = self.allocate_id();
        let mut copy = source.clone();
        copy.id = id;
        copy.title = format!("{} (copy)", source.title);

        log::debug!("copied {} to {}", source.id, id);
        self.configs.insert(id, copy);
        id
    }

    pub fn get(&self, id: WidgetId) -> Option<&ChartConfig> {
        self.configs.get(&id)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut ChartConfig> {
        self.configs.get_mut(&id)
    }

    /// Apply `patch` to a widget. Column names are not validated.
    pub fn update(&mut self, id: WidgetId, patch: &SettingsPatch) -> Result<(), StoreError> {
        let config = self
            .configs
            .get_mut(&id)
            .ok_or(StoreError::UnknownWidget(id))?;
        config.apply(patch);
        log::debug!("updated {}", id);
        Ok(())
    }

    pub fn remove(&mut self, id: WidgetId) -> Option<ChartConfig> {
        let removed = self.configs.shift_remove(&id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::debug!("removed {}", id);
        Some(removed)
    }

    /// All configs in creation order
    pub fn list_all(&self) -> impl Iterator<Item = &ChartConfig> {
        self.configs.values()
    }

    pub fn ids(&self) -> Vec<WidgetId> {
        self.configs.keys().copied().collect()
    }

    pub fn select(&mut self, id: WidgetId) -> Result<(), StoreError> {
        if !self.configs.contains_key(&id) {
            return Err(StoreError::UnknownWidget(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    pub fn selected(&self) -> Option<WidgetId> {
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Dataset new widgets are bound to. Existing widgets keep theirs.
    pub fn set_active_dataset(&mut self, dataset: Option<Arc<Dataset>>) {
        self.active_dataset = dataset;
    }

    pub fn active_dataset(&self) -> Option<&Arc<Dataset>> {
        self.active_dataset.as_ref()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{AggregationKind, RowLimit};
    use crate::config::Encoding;

    fn dataset(columns: &[&str]) -> Arc<Dataset> {
        Arc::new(Dataset::new(
            columns.iter().map(|c| c.to_string()).collect(),
            Vec::new(),
        ))
    }

    #[test]
    fn test_create_seeds_from_active_dataset() {
        let mut store = ConfigStore::default();
        store.set_active_dataset(Some(dataset(&["city", "sales", "cost"])));
        let id = store.create(WidgetKind::Bar);

        let config = store.get(id).unwrap();
        assert_eq!(config.title, "Bar chart");
        assert_eq!(config.color, "#1f77b4");
        assert!(config.dataset.is_some());

        let view = config.kind.category_view().unwrap();
        assert_eq!(view.x_field, Some("city"));
        assert_eq!(view.y_fields, &["sales".to_string()]);
        assert_eq!(view.aggregation, AggregationKind::Sum);
        assert_eq!(view.row_limit, RowLimit::Top(20));
        assert!(!view.dual_axis);
    }

    #[test]
    fn test_create_without_dataset() {
        let mut store = ConfigStore::default();
        let id = store.create(WidgetKind::Scatter);
        let config = store.get(id).unwrap();
        assert!(config.dataset.is_none());
        match config.kind.encoding() {
            Encoding::Scatter(enc) => assert!(enc.x_fields.is_empty()),
            Encoding::Category(_) => panic!("expected scatter encoding"),
        }
    }

    #[test]
    fn test_create_uses_engine_options() {
        let options = EngineOptions {
            row_limit: RowLimit::Unbounded,
            default_color: Some("#abcdef".to_string()),
            ..Default::default()
        };
        let mut store = ConfigStore::new(options);
        let id = store.create(WidgetKind::Line);
        let config = store.get(id).unwrap();
        assert_eq!(config.color, "#abcdef");
        assert_eq!(store.options().row_limit, RowLimit::Unbounded);
        assert_eq!(config.kind.category_view().unwrap().row_limit, RowLimit::Unbounded);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut store = ConfigStore::default();
        let a = store.create(WidgetKind::Bar);
        let b = store.create(WidgetKind::Pie);
        assert!(store.remove(b).is_some());
        assert!(store.get(b).is_none());
        let c = store.create(WidgetKind::Line);
        assert!(a < b && b < c);
        assert_eq!(store.ids(), vec![a, c]);
    }

    #[test]
    fn test_list_all_keeps_creation_order() {
        let mut store = ConfigStore::default();
        let ids: Vec<WidgetId> = WidgetKind::ALL.iter().map(|k| store.create(*k)).collect();
        store.remove(ids[1]);
        let kinds: Vec<WidgetKind> = store.list_all().map(|c| c.widget_kind()).collect();
        assert_eq!(
            kinds,
            vec![WidgetKind::Bar, WidgetKind::Area, WidgetKind::Pie, WidgetKind::Scatter]
        );
    }

    #[test]
    fn test_update_unknown_widget() {
        let mut store = ConfigStore::default();
        let missing = WidgetId::new(42);
        assert_eq!(
            store.update(missing, &SettingsPatch::default()),
            Err(StoreError::UnknownWidget(missing))
        );
    }

    #[test]
    fn test_update_last_write_wins() {
        let mut store = ConfigStore::default();
        let id = store.create(WidgetKind::Bar);
        for title in ["first", "second"] {
            let patch = SettingsPatch {
                title: Some(title.to_string()),
                y_fields: Some(vec!["not_a_column".to_string()]),
                ..Default::default()
            };
            store.update(id, &patch).unwrap();
        }
        let config = store.get(id).unwrap();
        assert_eq!(config.title, "second");
        assert_eq!(config.kind.category_view().unwrap().y_fields, &["not_a_column".to_string()]);
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut store = ConfigStore::default();
        let a = store.create(WidgetKind::Bar);
        let b = store.create(WidgetKind::Bar);

        store.select(a).unwrap();
        store.remove(b);
        assert_eq!(store.selected(), Some(a));

        store.remove(a);
        assert!(store.get(a).is_none());
        assert!(store.get_mut(a).is_none());
        assert_eq!(store.selected(), None);
        assert!(store.is_empty());
        assert!(store.remove(a).is_none());
    }

    #[test]
    fn test_select_unknown_keeps_previous() {
        let mut store = ConfigStore::default();
        let a = store.create(WidgetKind::Bar);
        store.select(a).unwrap();
        assert!(store.select(WidgetId::new(99)).is_err());
        assert_eq!(store.selected(), Some(a));
        store.clear_selection();
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn test_insert_copy() {
        let mut store = ConfigStore::default();
        store.set_active_dataset(Some(dataset(&["a", "b"])));
        let a = store.create(WidgetKind::Area);
        let source = store.get(a).unwrap().clone();
        let b = store.insert_copy(&source);

        assert_ne!(a, b);
        let copy = store.get(b).unwrap();
        assert_eq!(copy.id, b);
        assert_eq!(copy.title, "Area chart (copy)");
        assert_eq!(copy.kind, source.kind);
        assert_eq!(store.len(), 2);
    }
}
