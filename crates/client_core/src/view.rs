//! Presentation helpers shared by the view binders.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use shared::domain::{ScoreId, ScoreRecord};

pub const PROCESSED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const HEADERS: [&str; 3] = ["Scenario", "Score", "Processed At"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRow {
    pub id: ScoreId,
    pub scenario: String,
    pub score: String,
    pub processed_at: String,
}

impl ScoreRow {
    pub fn from_record<Tz>(record: &ScoreRecord, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            id: record.id,
            scenario: record.scenario.clone(),
            score: record.score.to_string(),
            processed_at: format_processed_at(&record.processed_at, tz),
        }
    }
}

pub fn format_processed_at<Tz>(processed_at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    processed_at
        .with_timezone(tz)
        .format(PROCESSED_AT_FORMAT)
        .to_string()
}

/// Rows in backend order, timestamps in the local time zone.
pub fn local_rows(records: &[ScoreRecord]) -> Vec<ScoreRow> {
    records
        .iter()
        .map(|record| ScoreRow::from_record(record, &Local))
        .collect()
}

/// Plain-text table used by the terminal binder.
pub fn render_table(rows: &[ScoreRow]) -> String {
    if rows.is_empty() {
        return "No scores recorded yet.\n".to_string();
    }

    let mut widths = HEADERS.map(str::len);
    for row in rows {
        widths[0] = widths[0].max(row.scenario.chars().count());
        widths[1] = widths[1].max(row.score.len());
        widths[2] = widths[2].max(row.processed_at.len());
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_line(
        &mut out,
        &[rule[0].as_str(), rule[1].as_str(), rule[2].as_str()],
        &widths,
    );
    for row in rows {
        push_line(
            &mut out,
            &[
                row.scenario.as_str(),
                row.score.as_str(),
                row.processed_at.as_str(),
            ],
            &widths,
        );
    }
    out
}

fn push_line(out: &mut String, cells: &[&str; 3], widths: &[usize; 3]) {
    let line = format!(
        "{:<w0$}  {:>w1$}  {:<w2$}",
        cells[0],
        cells[1],
        cells[2],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
    );
    out.push_str(line.trim_end());
    out.push('\n');
}
