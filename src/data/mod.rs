/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///   .xlsx (configured path, or uploaded)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read sheet → trim headers → resolve months → Dataset
///   └──────────┘   (LoadCache keyed by path + sheet)
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, column presence, Dimensions
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  product selection → filtered records
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  heatmap, class×product, monthly comparison,
///   └───────────┘  division×product, annex → SummaryTables
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod month;
