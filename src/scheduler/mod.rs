//! Timetable generation, ranking and failure analysis.
//!
//! [`TimetableScheduler`] ties the pipeline together: catalog indexing,
//! selection enumeration, pre-search failure analysis, search, and
//! ranking of the results.
//!
//! # Ranking
//!
//! With preference weights configured, schedules are ordered by the
//! weighted [`ScoreBreakdown`] total. Without weights the order is
//! lexicographic: fewer conflicts first, then more credits.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent Research Directions in Automated Timetabling"

mod analysis;
mod score;
mod timetable;

pub use analysis::{analyze_infeasibility, Infeasibility, InfeasibilityKind};
pub use score::{score, RankKey, ScoreBreakdown};
pub use timetable::{ScheduleOutcome, SearchStatus, TimetableScheduler};
