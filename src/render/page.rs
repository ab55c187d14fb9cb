use serde::Serialize;

use super::{escape_html, TableBody, TableSpec};
use crate::summary::{SlotMap, Summary};

fn json_for_script_tag(value: &str) -> String {
    value.replace("</", "<\\/")
}

pub struct PageDocument<'a> {
    pub title: &'a str,
    pub table: &'a TableSpec,
    pub body: &'a TableBody,
    pub summary: &'a Summary,
    pub slots: &'a SlotMap,
    pub search: &'a str,
}

#[derive(Serialize)]
struct EmbeddedData<'a> {
    title: &'a str,
    search: &'a str,
    summary: &'a Summary,
    rows: &'a [super::Row],
}

fn render_head(spec: &TableSpec) -> String {
    let mut out = String::from("<thead>\n<tr>\n");
    for column in spec.columns {
        out.push_str(&format!("  <th>{}</th>\n", escape_html(column)));
    }
    out.push_str("</tr>\n</thead>\n");
    out
}

pub fn render_page(doc: &PageDocument<'_>) -> String {
    let data = EmbeddedData {
        title: doc.title,
        search: doc.search,
        summary: doc.summary,
        rows: doc.body.rows(),
    };
    let json = serde_json::to_string(&data).unwrap_or_else(|_| "{}".to_string());
    let json = json_for_script_tag(&json);

    let search_note = if doc.search.is_empty() {
        String::new()
    } else {
        format!(
            "      <p class=\"search-note\">Filtered by \"{}\"</p>\n",
            escape_html(doc.search)
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>{title} - GSU Monitor</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.0.0/css/all.min.css"/>
  <style>
    body {{ font-family: 'Segoe UI', sans-serif; background: #f5f7fa; color: #1f2937; margin: 0; }}
    main {{ max-width: 1200px; margin: 0 auto; padding: 32px; }}
    .summary {{ display: flex; gap: 16px; margin-bottom: 24px; }}
    .summary-item {{ background: #fff; border-radius: 8px; padding: 16px 20px; flex: 1; box-shadow: 0 1px 3px rgba(0,0,0,.08); }}
    .summary-label {{ display: block; font-size: 12px; color: #6b7280; text-transform: uppercase; }}
    .summary-value {{ font-size: 24px; font-weight: 700; }}
    table {{ width: 100%; border-collapse: collapse; background: #fff; }}
    th, td {{ padding: 12px 16px; border-bottom: 1px solid #e5e7eb; text-align: left; }}
    .status-badge {{ padding: 4px 10px; border-radius: 12px; font-size: 12px; font-weight: 600; }}
    .status-badge.ok, .status-badge.returned, .status-badge.active {{ background: #dcfce7; color: #166534; }}
    .status-badge.low, .status-badge.pending {{ background: #fef9c3; color: #854d0e; }}
    .status-badge.critical, .status-badge.overdue {{ background: #fee2e2; color: #991b1b; }}
    .status-badge.borrowed {{ background: #dbeafe; color: #1e40af; }}
    .empty-message {{ text-align: center; color: #6b7280; padding: 32px 0; }}
    .action-btn {{ border: none; background: none; cursor: pointer; }}
  </style>
</head>
<body>
  <script type="application/json" id="page-data">{json}</script>
  <main>
    <header>
      <h1>{title}</h1>
{search_note}    </header>
{summary}    <table>
{head}<tbody id="{body_id}">
{rows}</tbody>
    </table>
  </main>
</body>
</html>
"#,
        title = escape_html(doc.title),
        json = json,
        search_note = search_note,
        summary = doc.slots.to_html(doc.summary),
        head = render_head(doc.table),
        body_id = doc.table.body_id,
        rows = doc.body.to_html(),
    )
}
