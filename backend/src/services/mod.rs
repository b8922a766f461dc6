//! Service layer for roster logic.
//!
//! Services sit between the repositories and the HTTP layer:
//! - `registry`: per-shift assignment snapshot with conflict checks
//! - `weekly_export`: the seven-page weekly document

pub mod registry;
pub mod weekly_export;

pub use registry::{
    AssignOutcome, AssignmentRegistry, LoadStatus, LoadTicket, PendingAssignment, ReadOutcome,
    RegistryError, RosterContext, Selection, WorkerOption,
};
pub use weekly_export::{
    build_weekly_export, load_weekly_export, render_text, DayPage, ExportRow, ShiftTable,
    WeeklyExport, EXPORT_FILE_NAME,
};
