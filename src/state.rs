use std::path::Path;
use std::sync::Arc;

use crate::color::SeriesColors;
use crate::config::DashboardConfig;
use crate::data::aggregate::{recompute, SummaryTables};
use crate::data::filter::FilterSelection;
use crate::data::loader::{LoadCache, LoadError, SourceKey};
use crate::data::model::{Dataset, Dimensions};

// ---------------------------------------------------------------------------
// Load state machine
// ---------------------------------------------------------------------------

/// Where the dashboard stands with respect to its input workbook.
///
/// ```text
///  AwaitingInput ──upload ok──▶ Loaded ◀──upload ok── Failed
///        │                        │                     ▲
///        └──────upload bad────────┴─────upload bad──────┘
/// ```
#[derive(Debug, Clone)]
pub enum LoadState {
    /// The primary source could not be read; waiting for an upload.
    AwaitingInput { reason: String },
    Loaded(Arc<Dataset>),
    /// The last upload was unreadable; the user has to pick another file.
    Failed { error: String },
}

impl LoadState {
    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        match self {
            LoadState::Loaded(ds) => Some(ds),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Shared dataset cache.
    pub cache: Arc<LoadCache>,

    pub load: LoadState,

    /// Source of the dataset currently shown.
    pub source: Option<SourceKey>,

    /// Selectable years and products of the loaded dataset.
    pub dimensions: Dimensions,

    /// Sidebar selections.
    pub selection: FilterSelection,

    /// Per-product colours shared by the grouped charts.
    pub colors: SeriesColors,

    /// Chart tables for the current dataset and selection (cached).
    pub summaries: Option<SummaryTables>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig, cache: Arc<LoadCache>) -> Self {
        Self {
            config,
            cache,
            load: LoadState::AwaitingInput {
                reason: "Aucun fichier chargé.".to_string(),
            },
            source: None,
            dimensions: Dimensions::default(),
            selection: FilterSelection::default(),
            colors: SeriesColors::default(),
            summaries: None,
            status_message: None,
        }
    }

    pub fn primary_source(&self) -> SourceKey {
        SourceKey::new(&self.config.data_path, &self.config.sheet)
    }

    /// Read the configured workbook. Failure is not an error: the dashboard
    /// switches to waiting for an upload.
    pub fn load_primary(&mut self) {
        let key = self.primary_source();
        match self.cache.get_or_load(&key, &self.config.columns) {
            Ok(dataset) => self.set_dataset(dataset, key),
            Err(e) => {
                log::warn!(
                    "Primary source {} unavailable, waiting for upload: {e}",
                    key.path.display()
                );
                self.load = LoadState::AwaitingInput {
                    reason: e.to_string(),
                };
                self.clear_dataset();
            }
        }
    }

    /// Read a user-supplied workbook (same sheet as the primary source). Any
    /// earlier cache entry for that path is dropped first.
    pub fn load_upload(&mut self, path: &Path) {
        let key = SourceKey::new(path, &self.config.sheet);
        self.cache.invalidate(&key);
        match self.cache.get_or_load(&key, &self.config.columns) {
            Ok(dataset) => self.set_dataset(dataset, key),
            Err(e) => self.fail_upload(e),
        }
    }

    /// Re-read the current source, bypassing the cache.
    pub fn reload(&mut self) {
        match self.source.clone() {
            Some(key) if key != self.primary_source() => self.load_upload(&key.path),
            _ => {
                self.cache.invalidate(&self.primary_source());
                self.load_primary();
            }
        }
    }

    /// Drop every cached dataset, then re-read the current source.
    pub fn reload_all(&mut self) {
        if !self.cache.is_empty() {
            log::info!("Dropping {} cached dataset(s)", self.cache.len());
            self.cache.clear();
        }
        match self.source.clone() {
            Some(key) if key != self.primary_source() => self.load_upload(&key.path),
            _ => self.load_primary(),
        }
    }

    fn fail_upload(&mut self, e: LoadError) {
        log::error!("Failed to load upload: {e:#}");
        self.status_message = Some(format!("Erreur : {e}"));
        self.load = LoadState::Failed {
            error: e.to_string(),
        };
        self.clear_dataset();
    }

    fn clear_dataset(&mut self) {
        self.source = None;
        self.dimensions = Dimensions::default();
        self.selection = FilterSelection::default();
        self.colors = SeriesColors::default();
        self.summaries = None;
    }

    /// Ingest a newly loaded dataset, reset filters and recompute.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>, source: SourceKey) {
        log::info!(
            "Showing {} records from {} ({} products)",
            dataset.len(),
            source.path.display(),
            dataset.dimensions().products.len()
        );
        if dataset.is_empty() {
            log::warn!("Sheet {} has a header but no records", source.sheet);
        }
        self.dimensions = dataset.dimensions();
        self.selection =
            FilterSelection::initial(&self.dimensions, &self.config.default_mean_years);
        self.colors = SeriesColors::new(&self.dimensions.products);
        self.load = LoadState::Loaded(dataset);
        self.source = Some(source);
        self.status_message = None;
        self.refresh();
    }

    /// Recompute the summary tables after a selection change.
    pub fn refresh(&mut self) {
        self.summaries = self
            .load
            .dataset()
            .map(|ds| recompute(ds, &self.selection, &self.config.annex));
    }

    // ---- selection edits ----

    pub fn toggle_product(&mut self, product: &str) {
        if !self.selection.products.remove(product) {
            self.selection.products.insert(product.to_string());
        }
        self.refresh();
    }

    pub fn select_all_products(&mut self) {
        self.selection.products = self.dimensions.products.iter().cloned().collect();
        self.refresh();
    }

    pub fn select_no_products(&mut self) {
        self.selection.products.clear();
        self.refresh();
    }

    pub fn set_bar_year(&mut self, year: i32) {
        self.selection.bar_year = Some(year);
        self.refresh();
    }

    pub fn set_line_year(&mut self, year: i32) {
        self.selection.line_year = Some(year);
        self.refresh();
    }

    pub fn toggle_mean_year(&mut self, year: i32) {
        if !self.selection.mean_years.remove(&year) {
            self.selection.mean_years.insert(year);
        }
        self.refresh();
    }
}
