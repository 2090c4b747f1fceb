use std::collections::BTreeSet;
use std::fmt;

use super::month;

// ---------------------------------------------------------------------------
// CellValue – a single spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from the workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Whole floats print like integers so `42.0` ids read as `42`.
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.0}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed text form, `None` for empty cells.
    pub fn as_text(&self) -> Option<String> {
        if self.is_null() {
            return None;
        }
        Some(self.to_string().trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// Record – one cancellation event (one sheet row)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Entry month exactly as read from the sheet.
    pub month_raw: CellValue,
    /// Resolved month; may be out of 1..=12 when the source is.
    pub month: Option<u32>,
    /// `"MM - Label"`, empty when the month is unresolved.
    pub month_label: String,
    pub year: Option<i32>,
    pub product: Option<String>,
    pub class: Option<String>,
    pub division: Option<String>,
    /// Aggregation weight, 1 when the sheet has no unit column.
    pub units: f64,
}

impl Record {
    /// Build a record and derive the month label from the resolved month.
    pub fn new(month_raw: CellValue, month: Option<u32>, year: Option<i32>) -> Self {
        Self {
            month_raw,
            month,
            month_label: month::full_label(month),
            year,
            product: None,
            class: None,
            division: None,
            units: 1.0,
        }
    }
}

#[cfg(test)]
impl Record {
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_division(mut self, division: impl Into<String>) -> Self {
        self.division = Some(division.into());
        self
    }

    pub fn with_units(mut self, units: f64) -> Self {
        self.units = units;
        self
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded sheet
// ---------------------------------------------------------------------------

/// Which optional columns the source sheet carried. Grouped charts are gated
/// on these, not on whether any row has a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnPresence {
    pub product: bool,
    pub class: bool,
    pub division: bool,
    pub units: bool,
}

/// The loaded records. Never mutated after load; a new upload replaces it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<Record>,
    pub columns: ColumnPresence,
}

impl Dataset {
    pub fn new(records: Vec<Record>, columns: ColumnPresence) -> Self {
        Self { records, columns }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct selectable values, computed once per load.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::from_dataset(self)
    }
}

// ---------------------------------------------------------------------------
// Dimensions – selectable filter values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dimensions {
    /// Sorted ascending, yearless records dropped.
    pub years: Vec<i32>,
    /// Sorted ascending; empty when the sheet has no product column.
    pub products: Vec<String>,
}

impl Dimensions {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let years: BTreeSet<i32> = dataset.records.iter().filter_map(|r| r.year).collect();
        let products: BTreeSet<&str> = if dataset.columns.product {
            dataset
                .records
                .iter()
                .filter_map(|r| r.product.as_deref())
                .collect()
        } else {
            BTreeSet::new()
        };

        Self {
            years: years.into_iter().collect(),
            products: products.into_iter().map(str::to_string).collect(),
        }
    }
}
