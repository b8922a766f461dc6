//! Weekly roster export.
//!
//! Builds one page per canonical day, each with the three shift tables side
//! by side, and renders it as fixed-width text with one page per form feed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::repository::FullRepository;
use crate::models::{
    sort_by_role_order, Assignment, Role, RoleId, ShiftGroup, Weekday, Worker, WorkerId,
};

use super::registry::ReadOutcome;

/// Download name of the rendered document.
pub const EXPORT_FILE_NAME: &str = "Turni_Settimanali.txt";

/// Cell text of the placeholder row in an empty table.
pub const EMPTY_CELL: &str = "-";

const ROLE_HEADER: &str = "RUOLO";
const NAME_HEADER: &str = "NOME";
const COLUMN_GAP: &str = "   ";
const PAGE_BREAK: char = '\x0c';

/// One `(role code, worker name)` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub role: String,
    pub worker: String,
}

impl ExportRow {
    pub fn new(role: impl Into<String>, worker: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            worker: worker.into(),
        }
    }

    fn placeholder() -> Self {
        Self::new(EMPTY_CELL, EMPTY_CELL)
    }
}

/// Table of one shift group on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftTable {
    pub group: ShiftGroup,
    pub heading: String,
    pub rows: Vec<ExportRow>,
}

/// One page of the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayPage {
    pub day: Weekday,
    pub tables: [ShiftTable; 3],
}

impl DayPage {
    pub fn table(&self, group: ShiftGroup) -> &ShiftTable {
        &self.tables[group as usize]
    }
}

/// The whole week, Monday to Sunday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyExport {
    pub generated_at: DateTime<Utc>,
    pub pages: [DayPage; 7],
}

impl WeeklyExport {
    pub fn page(&self, day: Weekday) -> &DayPage {
        &self.pages[day as usize]
    }
}

/// Arrange `assignments` into the weekly document.
///
/// Role and worker ids missing from the lookups render as empty strings.
/// Every table is ordered by [`crate::models::ROLE_DISPLAY_ORDER`], and a
/// table with no records gets a single `("-", "-")` row.
pub fn build_weekly_export(
    assignments: &[Assignment],
    roles: &[Role],
    workers: &[Worker],
    generated_at: DateTime<Utc>,
) -> WeeklyExport {
    let role_codes: HashMap<RoleId, &str> =
        roles.iter().map(|r| (r.id, r.code.as_str())).collect();
    let worker_names: HashMap<WorkerId, &str> =
        workers.iter().map(|w| (w.id, w.name.as_str())).collect();

    let mut cells: HashMap<(Weekday, ShiftGroup), Vec<ExportRow>> = HashMap::new();
    for assignment in assignments {
        let row = ExportRow::new(
            role_codes.get(&assignment.role_id).copied().unwrap_or(""),
            worker_names
                .get(&assignment.worker_id)
                .copied()
                .unwrap_or(""),
        );
        cells
            .entry((assignment.day, assignment.group))
            .or_default()
            .push(row);
    }

    let pages = Weekday::WEEK.map(|day| DayPage {
        day,
        tables: ShiftGroup::ALL.map(|group| {
            let mut rows = cells.remove(&(day, group)).unwrap_or_default();
            if rows.is_empty() {
                rows.push(ExportRow::placeholder());
            } else {
                sort_by_role_order(&mut rows, |row| row.role.as_str());
            }
            ShiftTable {
                group,
                heading: group.heading(),
                rows,
            }
        }),
    });

    WeeklyExport {
        generated_at,
        pages,
    }
}

/// Read the week's records and lookups, then build the export.
///
/// Failed reads contribute nothing; the first error travels with the result.
pub async fn load_weekly_export(
    repo: &dyn FullRepository,
    generated_at: DateTime<Utc>,
) -> ReadOutcome<WeeklyExport> {
    let (roles, workers, assignments) = tokio::join!(
        repo.list_roles(),
        repo.list_workers(None),
        repo.list_assignments_for_days(&Weekday::WEEK),
    );
    let roles = ReadOutcome::from_result(roles);
    let workers = ReadOutcome::from_result(workers);
    let assignments = ReadOutcome::from_result(assignments);

    log::info!(
        "Building weekly export from {} assignments",
        assignments.data.len()
    );

    ReadOutcome {
        data: build_weekly_export(
            &assignments.data,
            &roles.data,
            &workers.data,
            generated_at,
        ),
        error: roles.error.or(workers.error).or(assignments.error),
    }
}

/// Render the export as text, one page per day separated by form feeds.
pub fn render_text(export: &WeeklyExport) -> String {
    let all_rows = export
        .pages
        .iter()
        .flat_map(|page| page.tables.iter())
        .flat_map(|table| table.rows.iter());

    let mut role_width = ROLE_HEADER.chars().count();
    let mut name_width = NAME_HEADER.chars().count();
    for row in all_rows {
        role_width = role_width.max(row.role.chars().count());
        name_width = name_width.max(row.worker.chars().count());
    }

    export
        .pages
        .iter()
        .map(|page| render_page(page, role_width, name_width))
        .collect::<Vec<_>>()
        .join(&PAGE_BREAK.to_string())
}

fn render_page(page: &DayPage, role_width: usize, name_width: usize) -> String {
    let table_width = role_width + 3 + name_width;
    let columns: Vec<Vec<String>> = page
        .tables
        .iter()
        .map(|table| render_table(table, role_width, name_width, table_width))
        .collect();
    let height = columns.iter().map(Vec::len).max().unwrap_or(0);
    let page_width = table_width * columns.len() + COLUMN_GAP.len() * (columns.len() - 1);
    let blank = " ".repeat(table_width);

    let mut out = String::new();
    out.push_str(format!("{:^width$}", page.day.label(), width = page_width).trim_end());
    out.push_str("\n\n");

    for line in 0..height {
        let joined = columns
            .iter()
            .map(|column| column.get(line).map(String::as_str).unwrap_or(blank.as_str()))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP);
        out.push_str(joined.trim_end());
        out.push('\n');
    }
    out
}

fn render_table(
    table: &ShiftTable,
    role_width: usize,
    name_width: usize,
    table_width: usize,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(table.rows.len() + 3);
    lines.push(format!("{:^width$}", table.heading, width = table_width));
    lines.push(format!(
        "{:<rw$} | {:<nw$}",
        ROLE_HEADER,
        NAME_HEADER,
        rw = role_width,
        nw = name_width
    ));
    lines.push(format!(
        "{}-+-{}",
        "-".repeat(role_width),
        "-".repeat(name_width)
    ));
    for row in &table.rows {
        lines.push(format!(
            "{:<rw$} | {:<nw$}",
            row.role,
            row.worker,
            rw = role_width,
            nw = name_width
        ));
    }
    lines
}
