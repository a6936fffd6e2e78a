/// Data layer: table model, loading, filtering, aggregation and export.
///
/// Architecture:
/// ```text
///  .csv (';') / .xlsx / .xls / .ods
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Dataset (typed columns)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  range + category predicates → filtered Dataset
///   └──────────┘
///        │
///        ├──────────────┬──────────────┐
///        ▼              ▼              ▼
///   ┌──────────┐  ┌──────────┐  ┌──────────┐
///   │ aggregate │  │ summary  │  │  export   │
///   └──────────┘  └──────────┘  └──────────┘
///   % per target   describe()    CSV / XLSX bytes
/// ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
