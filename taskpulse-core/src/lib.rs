//! taskpulse-core: deterministic task prioritization and productivity analysis.
//!
//! Both engines are pure functions of their input: no I/O, no global state,
//! no caching between calls.

pub mod advisor;
pub mod analyzer;
pub mod error;
pub mod prioritizer;
pub mod record;
pub mod selection;
pub mod task;
pub mod time;

pub use advisor::{AdviceSource, Advised, DeterministicAdvisor, FallbackAdvisor, TaskAdvisor};
pub use analyzer::{Analyzer, ProductivityAnalysis, analyze, analyze_records};
pub use error::{EngineError, Result};
pub use prioritizer::{compare, is_permutation_of, is_prioritized, prioritize, prioritize_records};
pub use record::{Degradation, NormalizedTask, normalize_record, normalize_records};
pub use selection::{completed, completed_on, completed_today};
pub use task::{Priority, Task, TaskStatus};
pub use time::{local_day, parse_due_date, parse_timezone};
