//! Student timetable generation.
//!
//! Turns a catalog of course sections (lectures, problem sessions, labs)
//! into ranked, conflict-bounded weekly timetables that respect a credit
//! ceiling, mandatory and excluded courses, and free-day preferences.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Section`, `CourseGroup`, `Selection`,
//!   `Schedule`, `TimeSlot`, `Day`
//! - **`config`**: `SchedulerConfig`, `PreferenceWeights`, `AnnealingConfig`
//! - **`validation`**: Section integrity checks (IDs, credits, slots)
//! - **`catalog`**: Grouping, constraint derivation, selection enumeration
//! - **`search`**: Backtracking and simulated-annealing search, result ledger
//! - **`scheduler`**: Entry point, preference scoring, failure analysis
//!
//! # Example
//!
//! ```
//! use u_timetable::config::SchedulerConfig;
//! use u_timetable::models::{Day, Section};
//! use u_timetable::scheduler::TimetableScheduler;
//!
//! let sections = vec![
//!     Section::lecture("MATH-1", "MATH").with_credits(4).with_block(Day::Monday, 1, 2),
//!     Section::lecture("PHYS-1", "PHYS").with_credits(3).with_slot(Day::Tuesday, 3),
//! ];
//! let config = SchedulerConfig::default().with_max_credits(7).with_mandatory("MATH");
//! let outcome = TimetableScheduler::new(config).generate(&sections).unwrap();
//! assert_eq!(outcome.best().unwrap().schedule.total_credits(), 7);
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

pub mod catalog;
pub mod config;
pub mod models;
pub mod scheduler;
pub mod search;
pub mod validation;
