/// Data layer: the parsed-log model and its loader.
///
/// Architecture:
/// ```text
///  /tmp/poet_log.txt (one per run of the program under test)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  header row + numeric rows → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  variable name → Vec<f64>, header order kept
///   └──────────┘
/// ```
pub mod loader;
pub mod model;
