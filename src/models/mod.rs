//! Timetabling domain models.
//!
//! Provides the core data types for representing a student's course
//! offerings and the timetables built from them.
//!
//! # Domain Mappings
//!
//! | u-timetable | University | Training Center |
//! |-------------|------------|-----------------|
//! | Section | Lecture / Recitation / Lab | Session |
//! | CourseGroup | Course code | Module |
//! | Selection | Registered section set | Enrollment |
//! | Schedule | Weekly timetable | Attendee agenda |

mod group;
mod schedule;
mod section;
mod slot;

pub use group::{CourseGroup, GroupConstraint, Selection};
pub use schedule::{Schedule, ScheduleStats, Violation, ViolationType};
pub use section::{Section, SectionRole};
pub use slot::{Day, TimeSlot, DAYS_PER_WEEK, MAX_PERIOD};
