//! Weekly class timetables found by a genetic algorithm.
//!
//! Records (`subject,teacher,class`) are placed into a six-day week of two
//! five-slot sessions. Candidate weeks are scored against soft rules
//! (no teacher double-booking, 3–5 periods per session, 8–10 per day) and
//! evolved by truncation selection, single-point crossover and slot
//! mutation. The best week is decoded into a 10 × 6 grid.

pub mod error;
pub mod fitness;
pub mod genetic_algorithm;
pub mod genetic_optimizer;
pub mod grid;
pub mod records;
pub mod scheduler;
pub mod timetable;
pub mod visualization;

pub use error::{Result, SchedulerError};
pub use genetic_optimizer::{FitnessHistory, FitnessPoint, MutationMode, TimetableConfig};
pub use grid::TimetableGrid;
pub use records::ClassRecord;
pub use scheduler::TimetableScheduler;
pub use timetable::{Day, ScheduleEntry, Session, Timetable};
