use crate::error::Result;
use crate::timetable::{
    Day, ScheduleEntry, Session, Timetable, DAYS_PER_WEEK, SESSIONS_PER_DAY, SLOTS_PER_SESSION,
};
use csv::Writer;
use std::fmt;
use std::io::Write;

pub const ROWS: usize = SESSIONS_PER_DAY * SLOTS_PER_SESSION as usize;
pub const COLUMNS: usize = DAYS_PER_WEEK;

/// The week laid out for display: rows are the five morning slots followed
/// by the five afternoon slots, columns are Mon..Sat.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimetableGrid {
    cells: [[String; COLUMNS]; ROWS],
}

impl TimetableGrid {
    /// Later entries overwrite earlier ones that land on the same cell.
    pub fn decode(timetable: &Timetable) -> Self {
        let mut grid = Self::default();

        for entry in timetable.entries.iter() {
            let (row, col) = position(entry);
            grid.cells[row][col] = label(entry);
        }

        grid
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        &self.cells[row][col]
    }

    pub fn rows(&self) -> &[[String; COLUMNS]; ROWS] {
        &self.cells
    }

    pub fn filled_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|c| !c.is_empty()).count()
    }

    fn header() -> Vec<String> {
        ["Session".to_string(), "Slot".to_string()]
            .into_iter()
            .chain(Day::ALL.iter().map(|d| d.to_string()))
            .collect()
    }

    fn row_labels(row: usize) -> (Session, usize) {
        let session = Session::ALL[row / SLOTS_PER_SESSION as usize];
        (session, row % SLOTS_PER_SESSION as usize + 1)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = Writer::from_writer(writer);
        writer.write_record(Self::header())?;

        for (row, cells) in self.cells.iter().enumerate() {
            let (session, slot) = Self::row_labels(row);
            let leading = [session.to_string(), slot.to_string()];
            let fields = leading.iter().chain(cells.iter()).map(String::as_str);
            writer.write_record(fields)?;
        }

        writer.flush()?;
        Ok(())
    }
}

pub fn position(entry: &ScheduleEntry) -> (usize, usize) {
    let row = (entry.slot() as usize - 1) + entry.session.row_offset();
    (row, entry.day.index())
}

pub fn label(entry: &ScheduleEntry) -> String {
    format!(
        "{} - {} ({})",
        entry.record.subject, entry.record.class_name, entry.record.teacher
    )
}

impl fmt::Display for TimetableGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = Self::header();
        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for cells in self.cells.iter() {
            for (col, cell) in cells.iter().enumerate() {
                widths[col + 2] = widths[col + 2].max(cell.chars().count());
            }
        }

        let write_row = |f: &mut fmt::Formatter<'_>, values: &[&str]| -> fmt::Result {
            let line: Vec<String> = values
                .iter()
                .zip(widths.iter())
                .map(|(value, &width)| format!("{:<width$}", value, width = width))
                .collect();
            writeln!(f, "| {} |", line.join(" | "))
        };

        let header: Vec<&str> = header.iter().map(String::as_str).collect();
        write_row(f, &header)?;

        let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        writeln!(f, "|-{}-|", rule.join("-|-"))?;

        for (row, cells) in self.cells.iter().enumerate() {
            let (session, slot) = Self::row_labels(row);
            let session = if slot == 1 { session.to_string() } else { String::new() };
            let slot = slot.to_string();

            let mut values = vec![session.as_str(), slot.as_str()];
            values.extend(cells.iter().map(String::as_str));
            write_row(f, &values)?;
        }

        Ok(())
    }
}
