//! HTML and CSV rendering of a snapshot.
//!
//! This is the presentation boundary: display policy lives here and only
//! here. In particular, a zero price renders as `N/A` alongside absent
//! values — the cache layer never conflates the two, but the dashboard always
//! has. Failed rows stay in the table with their status visible instead of
//! being dropped, so the table keeps a stable shape across cycles.

use chrono::{DateTime, Utc};

use crate::snapshot::{QuoteRow, RowStatus, Snapshot};

/// Table column headers, in render order.
const HEADERS: &[&str] = &[
    "Symbol",
    "LTP",
    "Open",
    "High",
    "Low",
    "Prev. Close",
    "Volume",
    "Status",
];

/// Render a price cell. Absent and zero both display as the placeholder.
fn format_price(value: Option<f64>) -> String {
    match value {
        Some(v) if v != 0.0 => format!("\u{20b9}{}", group_thousands(&format!("{v:.2}"))),
        _ => "N/A".to_string(),
    }
}

/// Render a volume cell. Absent and zero both display as the placeholder.
fn format_volume(value: Option<u64>) -> String {
    match value {
        Some(v) if v > 0 => group_thousands(&v.to_string()),
        _ => "N/A".to_string(),
    }
}

/// Insert thousands separators into a plain decimal string.
fn group_thousands(number: &str) -> String {
    let (integer, fraction) = number
        .split_once('.')
        .map_or((number, None), |(i, f)| (i, Some(f)));

    let digits: Vec<char> = integer.chars().collect();
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, ch) in digits.iter().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    match fraction {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}

/// Status cell text.
fn format_status(status: &RowStatus) -> String {
    match status {
        RowStatus::Ok => "OK".to_string(),
        RowStatus::PartialData => "Partial".to_string(),
        RowStatus::Failed(reason) => format!("Failed: {reason}"),
    }
}

/// Escape text destined for an HTML cell.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn render_row(row: &QuoteRow) -> String {
    let status_class = match row.status {
        RowStatus::Ok => "status-ok",
        RowStatus::PartialData => "status-partial",
        RowStatus::Failed(_) => "status-failed",
    };
    format!(
        "<tr class=\"{status_class}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        escape_html(&row.symbol),
        format_price(row.last_price),
        format_price(row.open),
        format_price(row.high),
        format_price(row.low),
        format_price(row.previous_close),
        format_volume(row.volume),
        escape_html(&format_status(&row.status)),
    )
}

/// Render the full dashboard page.
///
/// `snapshot` is `None` before the first cycle has completed (eager mode
/// startup); the table then carries a single placeholder row.
#[must_use]
pub fn render_dashboard(snapshot: Option<&Snapshot>, ttl_secs: u64) -> String {
    let header_row: String = HEADERS
        .iter()
        .map(|h| format!("<th>{h}</th>"))
        .collect();

    let (body_rows, last_updated) = match snapshot {
        Some(snapshot) if !snapshot.rows.is_empty() => {
            let rows: String = snapshot.rows.iter().map(render_row).collect();
            (rows, format_timestamp(snapshot.captured_at))
        }
        _ => (
            format!(
                "<tr><td colspan=\"{}\" class=\"empty\">No stock data available to display.</td></tr>",
                HEADERS.len()
            ),
            "Never".to_string(),
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<meta http-equiv="refresh" content="{ttl_secs}">
<title>Stock Financial Dashboard</title>
<style>
body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 0; padding: 20px; background-color: #f0f2f6; color: #333; }}
.container {{ max-width: 1400px; margin: auto; background-color: white; padding: 30px; border-radius: 12px; box-shadow: 0 6px 15px rgba(0, 0, 0, 0.1); }}
h1 {{ color: #1e88e5; border-bottom: 3px solid #eee; padding-bottom: 10px; text-align: center; }}
.header-row {{ display: flex; justify-content: space-between; align-items: center; margin-bottom: 20px; }}
.info-box {{ background-color: #e3f2fd; color: #0d47a1; padding: 10px 15px; border-radius: 6px; font-size: 0.9em; font-weight: bold; }}
table {{ width: 100%; border-collapse: collapse; margin-top: 10px; border-radius: 8px; overflow: hidden; }}
th, td {{ border: 1px solid #e0e0e0; padding: 10px 15px; text-align: right; }}
th {{ background-color: #42a5f5; color: white; font-weight: normal; position: sticky; top: 0; }}
th:first-child, td:first-child {{ text-align: left; }}
tr:nth-child(even) {{ background-color: #f5f5f5; }}
tr.status-failed td {{ color: #c62828; }}
tr.status-partial td {{ color: #8d6e63; }}
td.empty {{ text-align: center; color: red; }}
.download-btn {{ background-color: #4caf50; color: white; padding: 10px 15px; border-radius: 5px; text-decoration: none; font-weight: bold; }}
.footer {{ text-align: center; color: #999; margin-top: 40px; padding-top: 20px; border-top: 1px solid #ddd; font-size: 0.8em; }}
</style>
</head>
<body>
<div class="container">
<h1>Stock Financial Dashboard</h1>
<div class="header-row">
<a href="/download_csv" class="download-btn">Download Raw Data (.csv)</a>
<div class="info-box">Last Updated: {last_updated}</div>
</div>
<div style="max-height: 70vh; overflow-y: auto;">
<table>
<thead><tr>{header_row}</tr></thead>
<tbody>{body_rows}</tbody>
</table>
</div>
<div class="footer"><p>Data provided by Yahoo Finance</p></div>
</div>
</body>
</html>
"#
    )
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Serialize a snapshot to CSV, dropping rows with no numeric data.
///
/// Returns `None` when nothing remains to export. The CSV carries raw values
/// (absent fields as empty cells, zero as `0`); the `N/A` placeholder policy
/// is HTML-only.
pub fn to_csv(snapshot: &Snapshot) -> Result<Option<String>, csv::Error> {
    let rows: Vec<&QuoteRow> = snapshot.rows.iter().filter(|row| !row.is_empty()).collect();
    if rows.is_empty() {
        return Ok(None);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;
    for row in rows {
        writer.write_record([
            row.symbol.clone(),
            optional_to_cell(row.last_price),
            optional_to_cell(row.open),
            optional_to_cell(row.high),
            optional_to_cell(row.low),
            optional_to_cell(row.previous_close),
            row.volume.map(|v| v.to_string()).unwrap_or_default(),
            format_status(&row.status),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

fn optional_to_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}
