/// Sweep layer: axis types, enumeration, and selection.
///
/// Architecture:
/// ```text
///   SweepConfig [grid]
///        │
///        ▼
///   ┌──────────┐
///   │  grid     │  dedup axes → Cartesian product
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ Combination   │  prior × scale × dataset × inference × temperature
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  --only axis=values → kept combinations
///   └──────────┘
/// ```

pub mod filter;
pub mod grid;
pub mod model;
