use std::collections::{BTreeMap, BTreeSet};

use super::filter::{filter_records, FilterSelection};
use super::model::{Dataset, Record};
use super::month::MONTHS;
use crate::config::AnnexRow;

/// One value per month, index 0 = January.
pub type MonthSeries = [f64; 12];

fn month_slot(month: Option<u32>) -> Option<usize> {
    month.filter(|m| MONTHS.contains(m)).map(|m| (m - 1) as usize)
}

// ---------------------------------------------------------------------------
// Month × year heatmap
// ---------------------------------------------------------------------------

/// Rows are the fixed months 1..=12, columns the observed years.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeatmapTable {
    pub years: Vec<i32>,
    /// `values[month - 1][year column]`, zero where no record matched.
    pub values: Vec<Vec<f64>>,
}

impl HeatmapTable {
    pub fn max(&self) -> f64 {
        self.values.iter().flatten().copied().fold(0.0, f64::max)
    }
}

/// Sum units per (month, year). A year becomes a column as soon as one of
/// its records has a resolved month, even if that month is off the axis.
pub fn month_year_heatmap(records: &[&Record]) -> HeatmapTable {
    let mut sums: BTreeMap<(usize, i32), f64> = BTreeMap::new();
    let mut years = BTreeSet::new();

    for r in records {
        let (Some(month), Some(year)) = (r.month, r.year) else {
            continue;
        };
        years.insert(year);
        if let Some(slot) = month_slot(Some(month)) {
            *sums.entry((slot, year)).or_default() += r.units;
        }
    }

    let years: Vec<i32> = years.into_iter().collect();
    let values = (0..12)
        .map(|slot| {
            years
                .iter()
                .map(|y| sums.get(&(slot, *y)).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();

    HeatmapTable { years, values }
}

// ---------------------------------------------------------------------------
// Category × product grouped table
// ---------------------------------------------------------------------------

/// Summed units keyed by (category, product); only observed pairs are stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedTable {
    /// Sorted categories (x axis).
    pub categories: Vec<String>,
    /// Sorted products (one bar series each).
    pub series: Vec<String>,
    pub values: BTreeMap<(String, String), f64>,
}

impl GroupedTable {
    pub fn value(&self, category: &str, series: &str) -> Option<f64> {
        self.values
            .get(&(category.to_string(), series.to_string()))
            .copied()
    }
}

/// Group by (category, product). Records missing either key are dropped.
pub fn grouped_by_product<F>(records: &[&Record], category: F) -> GroupedTable
where
    F: Fn(&Record) -> Option<&str>,
{
    let mut values: BTreeMap<(String, String), f64> = BTreeMap::new();
    for r in records {
        let (Some(cat), Some(prod)) = (category(r), r.product.as_deref()) else {
            continue;
        };
        *values.entry((cat.to_string(), prod.to_string())).or_default() += r.units;
    }

    let categories: BTreeSet<&String> = values.keys().map(|(c, _)| c).collect();
    let series: BTreeSet<&String> = values.keys().map(|(_, p)| p).collect();

    GroupedTable {
        categories: categories.into_iter().cloned().collect(),
        series: series.into_iter().cloned().collect(),
        values,
    }
}

/// Customer class × product, `None` when either column is absent.
pub fn class_by_product(dataset: &Dataset, records: &[&Record]) -> Option<GroupedTable> {
    (dataset.columns.class && dataset.columns.product)
        .then(|| grouped_by_product(records, |r| r.class.as_deref()))
}

/// Sales division × product, `None` when either column is absent.
pub fn division_by_product(dataset: &Dataset, records: &[&Record]) -> Option<GroupedTable> {
    (dataset.columns.division && dataset.columns.product)
        .then(|| grouped_by_product(records, |r| r.division.as_deref()))
}

// ---------------------------------------------------------------------------
// Monthly comparison: bar year, line year, averaged years
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthComparison {
    pub bar_year: Option<i32>,
    pub line_year: Option<i32>,
    pub mean_years: Vec<i32>,
    pub bar: MonthSeries,
    pub line: MonthSeries,
    pub mean: MonthSeries,
}

impl MonthComparison {
    pub fn title(&self) -> String {
        let year = |y: Option<i32>| y.map(|y| y.to_string()).unwrap_or_else(|| "–".to_string());
        let mut title = format!(
            "Sorties {}, {} et Moyenne démissions",
            year(self.bar_year),
            year(self.line_year)
        );
        if let (Some(lo), Some(hi)) = (self.mean_years.first(), self.mean_years.last()) {
            title.push_str(&format!(" {lo}-{hi}"));
        }
        title
    }
}

/// Monthly unit sums for one year, zero-filled on 1..=12.
pub fn monthly_sums(records: &[&Record], year: Option<i32>) -> MonthSeries {
    let mut series = [0.0; 12];
    let Some(year) = year else {
        return series;
    };
    for r in records.iter().filter(|r| r.year == Some(year)) {
        if let Some(slot) = month_slot(r.month) {
            series[slot] += r.units;
        }
    }
    series
}

/// Per-month mean of per-year sums over `years`.
///
/// Units are first summed within each (year, month); each month then averages
/// the yearly sums of the years that have records in that month. Months with
/// no such year are zero.
pub fn monthly_mean_of_yearly_sums(records: &[&Record], years: &BTreeSet<i32>) -> MonthSeries {
    let mut yearly: BTreeMap<(i32, usize), f64> = BTreeMap::new();
    for r in records {
        let (Some(year), Some(slot)) = (r.year, month_slot(r.month)) else {
            continue;
        };
        if years.contains(&year) {
            *yearly.entry((year, slot)).or_default() += r.units;
        }
    }

    let mut totals = [0.0; 12];
    let mut counts = [0usize; 12];
    for ((_, slot), sum) in &yearly {
        totals[*slot] += sum;
        counts[*slot] += 1;
    }

    let mut mean = [0.0; 12];
    for slot in 0..12 {
        if counts[slot] > 0 {
            mean[slot] = totals[slot] / counts[slot] as f64;
        }
    }
    mean
}

pub fn month_comparison(records: &[&Record], selection: &FilterSelection) -> MonthComparison {
    MonthComparison {
        bar_year: selection.bar_year,
        line_year: selection.line_year,
        mean_years: selection.mean_years.iter().copied().collect(),
        bar: monthly_sums(records, selection.bar_year),
        line: monthly_sums(records, selection.line_year),
        mean: monthly_mean_of_yearly_sums(records, &selection.mean_years),
    }
}

// ---------------------------------------------------------------------------
// All chart tables at once
// ---------------------------------------------------------------------------

/// Chart-ready tables for one (dataset, selection) pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTables {
    pub filtered_len: usize,
    pub heatmap: HeatmapTable,
    pub class_by_product: Option<GroupedTable>,
    pub comparison: MonthComparison,
    pub division_by_product: Option<GroupedTable>,
    pub annex: Vec<AnnexRow>,
}

/// Rebuild every table. Pure; call it whenever the dataset or the selection
/// changes.
pub fn recompute(
    dataset: &Dataset,
    selection: &FilterSelection,
    annex: &[AnnexRow],
) -> SummaryTables {
    let records = filter_records(dataset, &selection.products);
    log::debug!(
        "Recomputing summaries over {}/{} records",
        records.len(),
        dataset.len()
    );

    SummaryTables {
        filtered_len: records.len(),
        heatmap: month_year_heatmap(&records),
        class_by_product: class_by_product(dataset, &records),
        comparison: month_comparison(&records, selection),
        division_by_product: division_by_product(dataset, &records),
        annex: annex.to_vec(),
    }
}

#[cfg(test)]
impl HeatmapTable {
    pub fn get(&self, month: u32, year: i32) -> Option<f64> {
        let row = month_slot(Some(month))?;
        let col = self.years.iter().position(|y| *y == year)?;
        Some(self.values[row][col])
    }
}
