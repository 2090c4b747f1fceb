use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable pointing at a JSON config file.
pub const CONFIG_ENV: &str = "RESILIATIONS_CONFIG";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "resiliations.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Every field is optional in the JSON file; missing ones take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Primary workbook location.
    pub data_path: PathBuf,
    /// Sheet read from both the primary workbook and uploads.
    pub sheet: String,
    pub columns: ColumnNames,
    /// Initial averaging window, intersected with the years present.
    pub default_mean_years: Vec<i32>,
    /// Static reference figures shown in the annex table.
    pub annex: Vec<AnnexRow>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data").join("DEM_VOLO_M2.xlsx"),
            sheet: "Sheet1".to_string(),
            columns: ColumnNames::default(),
            default_mean_years: vec![2005, 2006],
            annex: default_annex(),
        }
    }
}

/// Source column headers (compared after trimming).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub month_numeric: String,
    pub month_long: String,
    pub year: String,
    pub product: String,
    pub class: String,
    pub division: String,
    pub units: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            month_numeric: "Mois saisie".to_string(),
            month_long: "Mois saisie long".to_string(),
            year: "Annee saisie".to_string(),
            product: "PRODUIT".to_string(),
            class: "CLASSE_CLIENT".to_string(),
            division: "DV".to_string(),
            units: "un".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnexRow {
    pub label: String,
    pub value: i64,
}

fn default_annex() -> Vec<AnnexRow> {
    [
        ("Sorties 2008 — écart", -133),
        ("Moyenne démissions 2005–2006 — écart", 693),
        ("Démissions 2007 — écart", 613),
    ]
    .into_iter()
    .map(|(label, value)| AnnexRow {
        label: label.to_string(),
        value,
    })
    .collect()
}

impl DashboardConfig {
    /// Parse a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))
    }

    /// `$RESILIATIONS_CONFIG`, then `./resiliations.json`, then defaults.
    pub fn resolve() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_source_layout() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.sheet, "Sheet1");
        assert!(cfg.data_path.ends_with("DEM_VOLO_M2.xlsx"));
        assert_eq!(cfg.columns.year, "Annee saisie");
        assert_eq!(cfg.default_mean_years, vec![2005, 2006]);
        let values: Vec<i64> = cfg.annex.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![-133, 693, 613]);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: DashboardConfig = serde_json::from_str(
            r#"{ "sheet": "Export", "columns": { "product": "Offre" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.sheet, "Export");
        assert_eq!(cfg.columns.product, "Offre");
        assert_eq!(cfg.columns.division, "DV");
        assert_eq!(cfg.annex.len(), 3);
    }

    #[test]
    fn from_file_reports_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = DashboardConfig::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
    }

    #[test]
    fn from_file_reads_annex() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{ "annex": [ { "label": "x", "value": 7 } ] }"#).unwrap();
        let cfg = DashboardConfig::from_file(&path).unwrap();
        let expected = AnnexRow {
            label: "x".into(),
            value: 7,
        };
        assert_eq!(cfg.annex, vec![expected]);
    }
}
