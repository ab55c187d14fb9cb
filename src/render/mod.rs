pub mod page;

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Clone, Copy, Debug)]
pub struct RenderContext {
    pub today: NaiveDate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    View,
    Camera,
    Edit,
    MarkReturned,
    Delete,
}

impl ActionKind {
    pub fn class(self) -> &'static str {
        match self {
            Self::View => "view-btn",
            Self::Camera => "camera-btn",
            Self::Edit => "edit-btn",
            Self::MarkReturned => "return-btn",
            Self::Delete => "delete-btn",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::View => "fa-eye",
            Self::Camera => "fa-camera",
            Self::Edit => "fa-edit",
            Self::MarkReturned => "fa-check",
            Self::Delete => "fa-trash",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::View => "View",
            Self::Camera => "Camera",
            Self::Edit => "Edit",
            Self::MarkReturned => "Mark Returned",
            Self::Delete => "Delete",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Action {
    pub kind: ActionKind,
    pub id: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Cell {
    Text { text: String },
    Badge { class: String, label: String },
}

impl Cell {
    pub fn text(value: impl ToString) -> Self {
        Self::Text {
            text: value.to_string(),
        }
    }

    pub fn badge(class: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Badge {
            class: class.into(),
            label: label.into(),
        }
    }

    pub fn plain(&self) -> &str {
        match self {
            Self::Text { text } => text,
            Self::Badge { label, .. } => label,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Row {
    pub id: u64,
    pub cells: Vec<Cell>,
    pub actions: Vec<Action>,
}

impl Row {
    pub fn has_action(&self, kind: ActionKind) -> bool {
        self.actions.iter().any(|a| a.kind == kind)
    }
}

pub trait RowTemplate {
    fn row(&self, ctx: &RenderContext) -> Row;
}

#[derive(Clone, Copy, Debug)]
pub struct EmptyState {
    pub icon: &'static str,
    pub title: &'static str,
    pub no_records: &'static str,
    pub no_matches: &'static str,
}

#[derive(Clone, Copy, Debug)]
pub struct TableSpec {
    pub body_id: &'static str,
    pub columns: &'static [&'static str],
    pub empty: EmptyState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    NoRecords,
    NoMatches,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableBody {
    Empty {
        reason: EmptyReason,
        icon: &'static str,
        title: &'static str,
        message: &'static str,
        colspan: usize,
    },
    Rows(Vec<Row>),
}

/// Builds the body for `view`. `total` is the size of the unfiltered cache
/// and decides which empty-state message applies.
pub fn build_body<T: RowTemplate>(
    spec: &TableSpec,
    total: usize,
    view: &[&T],
    ctx: &RenderContext,
) -> TableBody {
    if view.is_empty() {
        let reason = if total == 0 {
            EmptyReason::NoRecords
        } else {
            EmptyReason::NoMatches
        };
        return TableBody::Empty {
            reason,
            icon: spec.empty.icon,
            title: spec.empty.title,
            message: match reason {
                EmptyReason::NoRecords => spec.empty.no_records,
                EmptyReason::NoMatches => spec.empty.no_matches,
            },
            colspan: spec.columns.len(),
        };
    }
    TableBody::Rows(view.iter().map(|r| r.row(ctx)).collect())
}

impl TableBody {
    pub fn rows(&self) -> &[Row] {
        match self {
            Self::Rows(rows) => rows,
            Self::Empty { .. } => &[],
        }
    }

    pub fn empty_reason(&self) -> Option<EmptyReason> {
        match self {
            Self::Empty { reason, .. } => Some(*reason),
            Self::Rows(_) => None,
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            Self::Empty {
                icon,
                title,
                message,
                colspan,
                ..
            } => format!(
                "<tr class=\"empty-state\">\n  <td colspan=\"{colspan}\">\n    <div class=\"empty-message\">\n      <i class=\"fas {icon}\"></i>\n      <h3>{}</h3>\n      <p>{}</p>\n    </div>\n  </td>\n</tr>\n",
                escape_html(title),
                escape_html(message)
            ),
            Self::Rows(rows) => rows.iter().map(render_row).collect(),
        }
    }
}

fn render_row(row: &Row) -> String {
    let mut out = String::new();
    out.push_str(&format!("<tr data-id=\"{}\">\n", row.id));
    for cell in &row.cells {
        match cell {
            Cell::Text { text } => {
                out.push_str(&format!("  <td>{}</td>\n", escape_html(text)));
            }
            Cell::Badge { class, label } => {
                out.push_str(&format!(
                    "  <td>\n    <span class=\"status-badge {}\">{}</span>\n  </td>\n",
                    escape_html(class),
                    escape_html(label)
                ));
            }
        }
    }
    out.push_str("  <td>\n    <div class=\"action-buttons\">\n");
    for action in &row.actions {
        out.push_str(&format!(
            "      <button class=\"action-btn {}\" data-action=\"{}\" data-id=\"{}\" title=\"{}\">\n        <i class=\"fas {}\"></i>\n      </button>\n",
            action.kind.class(),
            action_name(action.kind),
            action.id,
            action.kind.title(),
            action.kind.icon()
        ));
    }
    out.push_str("    </div>\n  </td>\n</tr>\n");
    out
}

fn action_name(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::View => "view",
        ActionKind::Camera => "camera",
        ActionKind::Edit => "edit",
        ActionKind::MarkReturned => "mark-returned",
        ActionKind::Delete => "delete",
    }
}

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn render_options(placeholder: &str, options: &[(String, String)]) -> String {
    let mut out = format!("<option value=\"\">{}</option>\n", escape_html(placeholder));
    for (value, label) in options {
        out.push_str(&format!(
            "<option value=\"{}\">{}</option>\n",
            escape_html(value),
            escape_html(label)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing(u64, &'static str);

    impl RowTemplate for Thing {
        fn row(&self, _ctx: &RenderContext) -> Row {
            Row {
                id: self.0,
                cells: vec![Cell::text(self.0), Cell::text(self.1), Cell::badge("ok", "Fine")],
                actions: vec![Action {
                    kind: ActionKind::Delete,
                    id: self.0,
                }],
            }
        }
    }

    const SPEC: TableSpec = TableSpec {
        body_id: "thingTableBody",
        columns: &["ID", "Name", "Status", "Actions"],
        empty: EmptyState {
            icon: "fa-cube",
            title: "No Things",
            no_records: "Nothing here yet.",
            no_matches: "Nothing matches.",
        },
    };

    fn ctx() -> RenderContext {
        RenderContext {
            today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn empty_cache_shows_no_records_message() {
        let body = build_body::<Thing>(&SPEC, 0, &[], &ctx());
        assert_eq!(body.empty_reason(), Some(EmptyReason::NoRecords));
        let html = body.to_html();
        assert!(html.contains("Nothing here yet."));
        assert!(html.contains("colspan=\"4\""));
    }

    #[test]
    fn empty_filtered_view_shows_no_matches_message() {
        let body = build_body::<Thing>(&SPEC, 3, &[], &ctx());
        assert_eq!(body.empty_reason(), Some(EmptyReason::NoMatches));
        assert!(body.to_html().contains("Nothing matches."));
        assert!(!body.to_html().contains("Nothing here yet."));
    }

    #[test]
    fn row_text_is_escaped() {
        let thing = Thing(1, "<script>alert(1)</script>");
        let body = build_body(&SPEC, 1, &[&thing], &ctx());
        let html = body.to_html();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("data-action=\"delete\" data-id=\"1\""));
    }

    #[test]
    fn options_start_with_placeholder() {
        let html = render_options(
            "Select an item...",
            &[("4".to_string(), "Tape (3 rolls available)".to_string())],
        );
        let first = html.lines().next().unwrap();
        assert_eq!(first, "<option value=\"\">Select an item...</option>");
        assert!(html.contains("<option value=\"4\">Tape (3 rolls available)</option>"));
    }
}
