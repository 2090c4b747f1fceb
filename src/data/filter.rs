use std::collections::BTreeSet;

use super::model::{Dataset, Dimensions, Record};

// ---------------------------------------------------------------------------
// Filter selection: the sidebar state
// ---------------------------------------------------------------------------

/// Everything the user picked in the sidebar. Lives only for the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    /// Selected products. Empty means "no filter", not "exclude everything".
    pub products: BTreeSet<String>,
    /// Year drawn as bars in the comparison chart.
    pub bar_year: Option<i32>,
    /// Year drawn as a line in the comparison chart.
    pub line_year: Option<i32>,
    /// Years averaged into the "Moyenne" line.
    pub mean_years: BTreeSet<i32>,
}

impl FilterSelection {
    /// Initial selection for a freshly loaded dataset: every product, the
    /// latest year as bars, the one before as a line, and the configured
    /// averaging years that actually occur.
    pub fn initial(dims: &Dimensions, default_mean_years: &[i32]) -> Self {
        let bar_year = dims.years.last().copied();
        let line_year = if dims.years.len() > 1 {
            dims.years.get(dims.years.len() - 2).copied()
        } else {
            dims.years.first().copied()
        };

        Self {
            products: dims.products.iter().cloned().collect(),
            bar_year,
            line_year,
            mean_years: default_mean_years
                .iter()
                .copied()
                .filter(|y| dims.years.contains(y))
                .collect(),
        }
    }
}

/// Records passing the product selection.
///
/// * empty selection → every record
/// * otherwise → records whose product is selected (product-less records drop out)
pub fn filter_records<'a>(dataset: &'a Dataset, products: &BTreeSet<String>) -> Vec<&'a Record> {
    if products.is_empty() {
        return dataset.records.iter().collect();
    }
    dataset
        .records
        .iter()
        .filter(|r| r.product.as_ref().is_some_and(|p| products.contains(p)))
        .collect()
}
