use chrono::{DateTime, Utc};

use crate::models::BuildRecord;

const HEADERS: [&str; 5] = ["Build", "Timestamp", "Time", "Revision", "Branch"];
const ALIGNMENT: [Align; 5] = [Align::Right, Align::Left, Align::Right, Align::Left, Align::Left];
const COLUMN_GAP: &str = "  ";
const REVISION_WIDTH: usize = 8;

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

/// `YYYY-MM-DD HH:MM:SS`, in UTC.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Milliseconds as `{minutes}m{seconds:02}s`, truncated to whole seconds.
pub fn format_duration(millis: i64) -> String {
    let seconds = millis.div_euclid(1000);
    let (minutes, seconds) = (seconds.div_euclid(60), seconds.rem_euclid(60));
    format!("{minutes}m{seconds:02}s")
}

fn history_row(build: &BuildRecord) -> [String; 5] {
    let building = build.is_building();

    let number = build
        .number
        .map(|number| {
            if building {
                format!("* {number}")
            } else {
                number.to_string()
            }
        })
        .unwrap_or_default();

    let duration = build
        .duration
        .map(|millis| {
            let duration = format_duration(millis);
            if building {
                format!("?{duration}")
            } else {
                duration
            }
        })
        .unwrap_or_default();

    [
        number,
        build.timestamp.as_ref().map(format_timestamp).unwrap_or_default(),
        duration,
        build
            .revision
            .as_deref()
            .map(|revision| revision.chars().take(REVISION_WIDTH).collect())
            .unwrap_or_default(),
        build.branch_name.clone().unwrap_or_default(),
    ]
}

/// Renders builds as a plain aligned table with a header row.
///
/// Missing fields are blank cells. Lines carry no trailing whitespace.
pub fn render_history(builds: &[BuildRecord]) -> String {
    let rows: Vec<[String; 5]> = builds.iter().map(history_row).collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = HEADERS.map(str::to_string);
    std::iter::once(&header)
        .chain(&rows)
        .map(|row| render_line(row, &widths))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_line(row: &[String; 5], widths: &[usize; 5]) -> String {
    let cells: Vec<String> = row
        .iter()
        .zip(widths)
        .zip(ALIGNMENT)
        .map(|((cell, &width), align)| match align {
            Align::Left => format!("{cell:<width$}"),
            Align::Right => format!("{cell:>width$}"),
        })
        .collect();

    cells.join(COLUMN_GAP).trim_end().to_string()
}
