//! Coverage walker
//!
//! # Architecture
//!
//! ```text
//!   ┌──────────────────────┐        ┌──────────────────────┐
//!   │   CoverageWalker     │ writes │    WalkCounters      │
//!   │  - recursive visit   ├───────►│  - dirs visited      │
//!   │  - deferred batches  │        │  - manifests found   │
//!   └──────────┬───────────┘        │  - current path      │
//!              │                    └──────────┬───────────┘
//!              │ Diagnostic                    │ samples
//!              ▼                               ▼
//!   ┌──────────────────────┐        ┌──────────────────────┐
//!   │     ReportSink       │        │   ProgressMonitor    │
//!   └──────────────────────┘        └──────────────────────┘
//! ```

pub mod counters;
pub mod coverage;

pub use counters::{WalkCounters, WalkProgress};
pub use coverage::{AuditSummary, CoverageWalker, SubtreeStatus, WalkOptions};
