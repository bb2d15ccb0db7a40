//! Attendance event entities.

pub mod model;

pub use model::{AttendanceEvent, NewAttendanceEvent, TransitionCommit};
