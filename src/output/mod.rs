use serde::Serialize;

use crate::render::page::{render_page, PageDocument};
use crate::render::{Row, TableBody, TableSpec};
use crate::summary::{Metric, SlotMap, Summary};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Clone, Debug, Serialize)]
pub struct SummaryEntry {
    pub metric: Metric,
    pub target: String,
    pub value: usize,
}

pub struct PageReport<'a> {
    pub title: &'a str,
    pub table: &'a TableSpec,
    pub body: TableBody,
    pub summary: Summary,
    pub slots: SlotMap,
    pub search: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    page: &'a str,
    search: &'a str,
    summary: Vec<SummaryEntry>,
    empty: Option<&'a str>,
    rows: &'a [Row],
}

impl PageReport<'_> {
    pub fn summary_entries(&self) -> Vec<SummaryEntry> {
        self.slots
            .metrics()
            .map(|metric| SummaryEntry {
                metric,
                target: self.slots.target(metric).unwrap_or_default().to_string(),
                value: self.summary.get(metric),
            })
            .collect()
    }

    pub fn render(&self, format: OutputFormat) -> Vec<u8> {
        match format {
            OutputFormat::Text => render_text(self),
            OutputFormat::Json => render_json(self),
            OutputFormat::Html => render_html(self),
        }
    }
}

fn empty_message(body: &TableBody) -> Option<&'static str> {
    match body {
        TableBody::Empty { message, .. } => Some(*message),
        TableBody::Rows(_) => None,
    }
}

pub fn render_text(report: &PageReport<'_>) -> Vec<u8> {
    let headers: Vec<&str> = report
        .table
        .columns
        .iter()
        .copied()
        .filter(|c| *c != "Actions")
        .collect();
    let rows: Vec<Vec<&str>> = report
        .body
        .rows()
        .iter()
        .map(|r| r.cells.iter().map(|c| c.plain()).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[&str]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<width$}", c, width = widths.get(i).copied().unwrap_or(0)))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = String::new();
    out.push_str(&line(&headers));
    match empty_message(&report.body) {
        Some(message) => {
            out.push_str(message);
            out.push('\n');
        }
        None => {
            for row in &rows {
                out.push_str(&line(row));
            }
        }
    }
    out.into_bytes()
}

pub fn render_json(report: &PageReport<'_>) -> Vec<u8> {
    let json = JsonReport {
        page: report.title,
        search: &report.search,
        summary: report.summary_entries(),
        empty: empty_message(&report.body),
        rows: report.body.rows(),
    };
    serde_json::to_vec_pretty(&json).unwrap_or_else(|_| b"{}\n".to_vec())
}

pub fn render_html(report: &PageReport<'_>) -> Vec<u8> {
    render_page(&PageDocument {
        title: report.title,
        table: report.table,
        body: &report.body,
        summary: &report.summary,
        slots: &report.slots,
        search: &report.search,
    })
    .into_bytes()
}
