/// Data layer: core types and loading.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet  (path or URL)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch + parse → Table, check required columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  Vec<Row>, header order, distinct values per column
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
