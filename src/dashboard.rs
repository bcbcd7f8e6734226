// Widget lifecycle: store mutations followed by a repaint through the injected renderer

use crate::aggregate::{AggregationKind, RowLimit};
use crate::config::{ChartConfig, SettingsPatch, WidgetId, WidgetKind};
use crate::data::Dataset;
use crate::error::{DashboardError, FallbackReason, StoreError};
use crate::options::ChartOptions;
use crate::series::SeriesBuilder;
use crate::store::ConfigStore;
use crate::EngineOptions;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Draws option objects into per-widget containers.
/// Implementations treat a missing container as a no-op.
pub trait Renderer {
    fn render(&mut self, id: WidgetId, options: &ChartOptions);
    fn release(&mut self, id: WidgetId);
}

/// Raw values submitted by a settings form, in field order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues(IndexMap<String, String>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Convert to a settings patch. Unknown keys are ignored.
    pub fn to_patch(&self) -> Result<SettingsPatch, DashboardError> {
        let mut patch = SettingsPatch::default();

        for (key, value) in &self.0 {
            match key.as_str() {
                "title" => patch.title = Some(value.clone()),
                "color" => patch.color = Some(value.trim().to_string()),
                "x" | "x_fields" => patch.x_fields = Some(split_fields(value)),
                "y" | "y_fields" => patch.y_fields = Some(split_fields(value)),
                "aggregation" => {
                    let kind = value
                        .parse::<AggregationKind>()
                        .map_err(|_| invalid(key, value))?;
                    patch.aggregation = Some(kind);
                }
                "row_limit" => {
                    let limit = parse_row_limit(value).ok_or_else(|| invalid(key, value))?;
                    patch.row_limit = Some(limit);
                }
                "dual_axis" => {
                    let flag = parse_flag(value).ok_or_else(|| invalid(key, value))?;
                    patch.dual_axis = Some(flag);
                }
                other => log::debug!("ignoring unknown setting `{}`", other),
            }
        }

        Ok(patch)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        FormValues(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn invalid(key: &str, value: &str) -> DashboardError {
    DashboardError::InvalidSetting {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn split_fields(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(String::from)
        .collect()
}

fn parse_row_limit(value: &str) -> Option<RowLimit> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        return Some(RowLimit::Unbounded);
    }
    value.parse::<usize>().ok().map(RowLimit::from)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => Some(true),
        "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

pub struct Dashboard<R: Renderer> {
    store: ConfigStore,
    renderer: R,
    builder: SeriesBuilder,
    fallbacks: HashMap<WidgetId, FallbackReason>,
}

impl<R: Renderer> Dashboard<R> {
    pub fn new(renderer: R, options: EngineOptions) -> Self {
        Self {
            builder: SeriesBuilder::from_options(&options),
            store: ConfigStore::new(options),
            renderer,
            fallbacks: HashMap::new(),
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    pub fn add_widget(&mut self, kind: WidgetKind) -> WidgetId {
        let id = self.store.create(kind);
        self.paint(id);
        id
    }

    pub fn select_widget(&mut self, id: WidgetId) -> Result<(), DashboardError> {
        self.store.select(id)?;
        self.paint(id);
        Ok(())
    }

    pub fn duplicate_widget(&mut self, id: WidgetId) -> Result<WidgetId, DashboardError> {
        let source = self.store.get(id).ok_or(StoreError::UnknownWidget(id))?.clone();
        let copy = self.store.insert_copy(&source);
        self.paint(copy);
        Ok(copy)
    }

    pub fn remove_widget(&mut self, id: WidgetId) -> Result<ChartConfig, DashboardError> {
        let removed = self.store.remove(id).ok_or(StoreError::UnknownWidget(id))?;
        self.fallbacks.remove(&id);
        self.renderer.release(id);
        Ok(removed)
    }

    /// Validate the whole form before touching the config, then repaint
    pub fn apply_edited_settings(
        &mut self,
        id: WidgetId,
        form: &FormValues,
    ) -> Result<(), DashboardError> {
        if self.store.get(id).is_none() {
            return Err(StoreError::UnknownWidget(id).into());
        }
        let patch = form.to_patch()?;
        self.apply_patch(id, &patch)
    }

    pub fn apply_patch(
        &mut self,
        id: WidgetId,
        patch: &SettingsPatch,
    ) -> Result<(), DashboardError> {
        self.store.update(id, patch)?;
        self.paint(id);
        Ok(())
    }

    /// Make `dataset` active and bind it to every widget that has none yet,
    /// seeding fields those widgets never had
    pub fn load_dataset(&mut self, dataset: Arc<Dataset>) {
        log::debug!("loaded dataset with {} rows", dataset.len());
        self.store.set_active_dataset(Some(dataset.clone()));

        let unbound: Vec<WidgetId> = self
            .store
            .list_all()
            .filter(|config| config.dataset.is_none())
            .map(|config| config.id)
            .collect();

        for id in unbound {
            if let Some(config) = self.store.get_mut(id) {
                config.kind.seed_missing_fields(&dataset.columns);
                config.dataset = Some(dataset.clone());
            }
            self.paint(id);
        }
    }

    pub fn repaint(&mut self, id: WidgetId) -> Result<(), DashboardError> {
        if self.store.get(id).is_none() {
            return Err(StoreError::UnknownWidget(id).into());
        }
        self.paint(id);
        Ok(())
    }

    pub fn repaint_all(&mut self) {
        for id in self.store.ids() {
            self.paint(id);
        }
    }

    /// Why the widget last fell back to the placeholder, if it did
    pub fn last_fallback(&self, id: WidgetId) -> Option<&FallbackReason> {
        self.fallbacks.get(&id)
    }

    fn paint(&mut self, id: WidgetId) {
        let Some(config) = self.store.get(id) else {
            log::warn!("{}: repaint of unknown widget ignored", id);
            return;
        };

        let data = match self.builder.try_build(config) {
            Ok(data) => {
                self.fallbacks.remove(&id);
                data
            }
            Err(reason) => {
                log::warn!("{}: {}; showing placeholder", id, reason);
                let data = self.builder.placeholder(config);
                self.fallbacks.insert(id, reason);
                data
            }
        };

        let options = ChartOptions::assemble(config, &data);
        self.renderer.render(id, &options);
    }
}
