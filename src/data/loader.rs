use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use calamine::{open_workbook_auto, Data, Reader};
use thiserror::Error;

use super::model::{CellValue, ColumnPresence, Dataset, Record};
use super::month;
use crate::config::ColumnNames;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0} (expected .xlsx)")]
    UnsupportedExtension(String),

    #[error("cannot open workbook {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("cannot read sheet '{sheet}': {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    #[error("sheet '{0}' has no header row")]
    EmptySheet(String),

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: invalid year value '{value}'")]
    InvalidYear { row: usize, value: String },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Read one sheet of a workbook into a [`Dataset`].
pub fn load_workbook(
    path: &Path,
    sheet: &str,
    columns: &ColumnNames,
) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "xlsx" {
        return Err(LoadError::UnsupportedExtension(ext));
    }

    let mut workbook = open_workbook_auto(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|source| LoadError::Sheet {
            sheet: sheet.to_string(),
            source,
        })?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| LoadError::EmptySheet(sheet.to_string()))?
        .iter()
        .map(|cell| cell_from_data(cell).to_string())
        .collect();

    let body = rows.map(|row| row.iter().map(cell_from_data).collect::<Vec<_>>());
    parse_rows(&header, body, columns)
}

fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Empty | Data::Error(_) => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Row normalisation
// ---------------------------------------------------------------------------

/// Where each known column sits in the header, after trimming header text.
struct ColumnIndex {
    month_numeric: Option<usize>,
    month_long: Option<usize>,
    year: usize,
    product: Option<usize>,
    class: Option<usize>,
    division: Option<usize>,
    units: Option<usize>,
}

impl ColumnIndex {
    fn locate(header: &[String], names: &ColumnNames) -> Result<Self, LoadError> {
        let find = |name: &str| header.iter().position(|h| h.trim() == name.trim());

        let month_numeric = find(&names.month_numeric);
        let month_long = find(&names.month_long);
        if month_numeric.is_none() && month_long.is_none() {
            return Err(LoadError::MissingColumn(names.month_numeric.clone()));
        }

        Ok(Self {
            month_numeric,
            month_long,
            year: find(&names.year).ok_or_else(|| LoadError::MissingColumn(names.year.clone()))?,
            product: find(&names.product),
            class: find(&names.class),
            division: find(&names.division),
            units: find(&names.units),
        })
    }

    fn presence(&self) -> ColumnPresence {
        ColumnPresence {
            product: self.product.is_some(),
            class: self.class.is_some(),
            division: self.division.is_some(),
            units: self.units.is_some(),
        }
    }
}

/// Turn header + body rows into records. The numeric month column wins over
/// the long-text one when both are present.
pub fn parse_rows<I>(header: &[String], rows: I, names: &ColumnNames) -> Result<Dataset, LoadError>
where
    I: IntoIterator<Item = Vec<CellValue>>,
{
    let idx = ColumnIndex::locate(header, names)?;
    let mut records = Vec::new();

    for (row_no, row) in rows.into_iter().enumerate() {
        if row.iter().all(CellValue::is_null) {
            continue;
        }
        let cell = |i: Option<usize>| {
            i.and_then(|i| row.get(i))
                .cloned()
                .unwrap_or(CellValue::Null)
        };

        let (month_raw, month) = match (idx.month_numeric, idx.month_long) {
            (Some(i), _) => {
                let raw = cell(Some(i));
                let m = month::coerce_month(&raw);
                (raw, m)
            }
            (None, long) => {
                let raw = cell(long);
                let m = month::resolve_month(&raw);
                (raw, m)
            }
        };

        // Row numbers in errors count the header as row 1.
        let year = parse_year(&cell(Some(idx.year)), row_no + 2)?;

        let mut record = Record::new(month_raw, month, year);
        record.product = cell(idx.product).as_text();
        record.class = cell(idx.class).as_text();
        record.division = cell(idx.division).as_text();
        if idx.units.is_some() {
            record.units = cell(idx.units).as_f64().unwrap_or(0.0);
        }
        records.push(record);
    }

    Ok(Dataset::new(records, idx.presence()))
}

fn parse_year(value: &CellValue, row: usize) -> Result<Option<i32>, LoadError> {
    if value.is_null() {
        return Ok(None);
    }
    let n = match value {
        CellValue::String(s) => s.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    };
    match n {
        Some(n) if n.is_finite() && n.abs() < i32::MAX as f64 => Ok(Some(n.trunc() as i32)),
        _ => Err(LoadError::InvalidYear {
            row,
            value: value.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Load cache
// ---------------------------------------------------------------------------

/// Identity of a loaded source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey {
    pub path: PathBuf,
    pub sheet: String,
}

impl SourceKey {
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
        }
    }
}

/// Process-wide dataset cache. Datasets are immutable once built, so the
/// same `Arc` is handed to every caller asking for the same source.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: Mutex<HashMap<SourceKey, Arc<Dataset>>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<SourceKey, Arc<Dataset>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached dataset for `key`, reading the workbook on a miss. Failed reads
    /// are not cached.
    pub fn get_or_load(
        &self,
        key: &SourceKey,
        columns: &ColumnNames,
    ) -> Result<Arc<Dataset>, LoadError> {
        if let Some(ds) = self.entries().get(key) {
            log::debug!("Cache hit for {} [{}]", key.path.display(), key.sheet);
            return Ok(Arc::clone(ds));
        }

        let dataset = Arc::new(load_workbook(&key.path, &key.sheet, columns)?);
        log::info!(
            "Loaded {} records from {} [{}]",
            dataset.len(),
            key.path.display(),
            key.sheet
        );
        self.entries().insert(key.clone(), Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Drop `key` so the next request re-reads the workbook.
    pub fn invalidate(&self, key: &SourceKey) -> bool {
        self.entries().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    enum Cell<'a> {
        S(&'a str),
        N(f64),
        E,
    }
    use Cell::*;

    fn write_xlsx(
        dir: &Path,
        name: &str,
        sheet: &str,
        header: &[&str],
        rows: &[Vec<Cell>],
    ) -> PathBuf {
        let path = dir.join(name);
        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.set_name(sheet).unwrap();
        for (c, h) in header.iter().enumerate() {
            ws.write_string(0, c as u16, *h).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32 + 1, c as u16);
                match cell {
                    S(s) => {
                        ws.write_string(r, c, *s).unwrap();
                    }
                    N(n) => {
                        ws.write_number(r, c, *n).unwrap();
                    }
                    E => {}
                }
            }
        }
        workbook.save(&path).unwrap();
        path
    }

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    // ── parse_rows ────────────────────────────────────────────────────────────

    #[test]
    fn headers_are_trimmed_and_units_default_to_one() {
        let ds = parse_rows(
            &header(&[" Mois saisie ", "Annee saisie  ", " PRODUIT"]),
            vec![vec![CellValue::Integer(3), CellValue::Integer(2020), s("A")]],
            &ColumnNames::default(),
        )
        .unwrap();
        assert_eq!(ds.len(), 1);
        let r = &ds.records[0];
        assert_eq!(r.month, Some(3));
        assert_eq!(r.year, Some(2020));
        assert_eq!(r.product.as_deref(), Some("A"));
        assert_eq!(r.units, 1.0);
        assert!(ds.columns.product);
        assert!(!ds.columns.class);
        assert!(!ds.columns.units);
    }

    #[test]
    fn numeric_month_column_wins_over_long() {
        let ds = parse_rows(
            &header(&["Mois saisie", "Mois saisie long", "Annee saisie"]),
            vec![vec![s("Mars"), s("03 - Mars"), CellValue::Float(2020.0)]],
            &ColumnNames::default(),
        )
        .unwrap();
        // Numeric coercion of "Mars" fails; the long column is not consulted.
        assert_eq!(ds.records[0].month, None);
        assert_eq!(ds.records[0].month_label, "");
    }

    #[test]
    fn long_month_column_goes_through_the_resolver() {
        let ds = parse_rows(
            &header(&["Mois saisie long", "Annee saisie"]),
            vec![
                vec![s("Février"), CellValue::Integer(2020)],
                vec![s("11 - Novembre"), CellValue::Integer(2020)],
            ],
            &ColumnNames::default(),
        )
        .unwrap();
        let months: Vec<_> = ds.records.iter().map(|r| r.month).collect();
        assert_eq!(months, vec![Some(2), Some(11)]);
        assert_eq!(ds.records[1].month_label, "11 - Nov");
    }

    #[test]
    fn explicit_units_and_blank_units() {
        let ds = parse_rows(
            &header(&["Mois saisie", "Annee saisie", "un"]),
            vec![
                vec![CellValue::Integer(1), CellValue::Integer(2020), CellValue::Float(4.0)],
                vec![CellValue::Integer(1), CellValue::Integer(2020), CellValue::Null],
            ],
            &ColumnNames::default(),
        )
        .unwrap();
        assert!(ds.columns.units);
        assert_eq!(ds.records[0].units, 4.0);
        assert_eq!(ds.records[1].units, 0.0);
    }

    #[test]
    fn empty_rows_are_skipped_and_blank_years_kept() {
        let ds = parse_rows(
            &header(&["Mois saisie", "Annee saisie"]),
            vec![
                vec![CellValue::Null, CellValue::Null],
                vec![CellValue::Integer(5), CellValue::Null],
            ],
            &ColumnNames::default(),
        )
        .unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].year, None);
    }

    #[test]
    fn missing_required_columns() {
        let names = ColumnNames::default();
        let err = parse_rows(&header(&["Mois saisie"]), Vec::new(), &names).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "Annee saisie"));

        let err = parse_rows(&header(&["Annee saisie"]), Vec::new(), &names).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(_)));
    }

    #[test]
    fn invalid_year_is_fatal() {
        let err = parse_rows(
            &header(&["Mois saisie", "Annee saisie"]),
            vec![vec![CellValue::Integer(1), s("deux mille")]],
            &ColumnNames::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::InvalidYear { row: 2, .. }));
    }

    // ── load_workbook ─────────────────────────────────────────────────────────

    #[test]
    fn reads_a_real_workbook() {
        let dir = TempDir::new().unwrap();
        let path = write_xlsx(
            dir.path(),
            "resil.xlsx",
            "Sheet1",
            &["Mois saisie long", "Annee saisie", "PRODUIT", "CLASSE_CLIENT", "DV"],
            &[
                vec![S("Janvier"), N(2020.0), S("A"), S("3*"), S("Nord")],
                vec![S("02 - Fev"), N(2021.0), N(7.0), E, S("Sud")],
            ],
        );
        let ds = load_workbook(&path, "Sheet1", &ColumnNames::default()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].month, Some(1));
        assert_eq!(ds.records[1].month, Some(2));
        assert_eq!(ds.records[1].product.as_deref(), Some("7"));
        assert_eq!(ds.records[1].class, None);
        assert!(ds.columns.class && ds.columns.division);
        assert_eq!(ds.dimensions().years, vec![2020, 2021]);
    }

    #[test]
    fn missing_sheet_and_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = write_xlsx(dir.path(), "a.xlsx", "Autre", &["Mois saisie", "Annee saisie"], &[]);
        let err = load_workbook(&path, "Sheet1", &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, LoadError::Sheet { .. }));

        let absent = dir.path().join("absent.xlsx");
        let err = load_workbook(&absent, "Sheet1", &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }

    #[test]
    fn rejects_other_formats() {
        let names = ColumnNames::default();
        let err = load_workbook(Path::new("data.csv"), "Sheet1", &names).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ref e) if e == "csv"));

        let err = load_workbook(Path::new("macros.xlsm"), "Sheet1", &names).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ref e) if e == "xlsm"));
    }

    // ── LoadCache ─────────────────────────────────────────────────────────────

    #[test]
    fn cache_serves_repeat_loads_without_rereading() {
        let dir = TempDir::new().unwrap();
        let path = write_xlsx(
            dir.path(),
            "c.xlsx",
            "Sheet1",
            &["Mois saisie", "Annee saisie"],
            &[vec![N(1.0), N(2020.0)]],
        );
        let cache = LoadCache::new();
        let key = SourceKey::new(&path, "Sheet1");
        let first = cache.get_or_load(&key, &ColumnNames::default()).unwrap();

        // The file is gone but the cached dataset is still served.
        std::fs::remove_file(&path).unwrap();
        let second = cache.get_or_load(&key, &ColumnNames::default()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        assert!(cache.invalidate(&key));
        assert!(cache.get_or_load(&key, &ColumnNames::default()).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn cache_keys_include_the_sheet() {
        let dir = TempDir::new().unwrap();
        let path = write_xlsx(
            dir.path(),
            "k.xlsx",
            "Sheet1",
            &["Mois saisie", "Annee saisie"],
            &[vec![N(1.0), N(2020.0)]],
        );
        let cache = LoadCache::new();
        let names = ColumnNames::default();
        assert!(cache.get_or_load(&SourceKey::new(&path, "Sheet1"), &names).is_ok());
        assert!(cache.get_or_load(&SourceKey::new(&path, "Sheet2"), &names).is_err());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
