use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// One sheet cell, normalized to a trimmed string. The raw formula text is
/// kept alongside because some sheets hide their payload in `=IMAGE(...)`
/// formulas rather than cell values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GvizCell {
    pub value: String,
    pub formula: Option<String>,
}

/// Generic grid decoded from one GVIZ export: column labels (possibly empty)
/// plus rows of cells. Blank rows are kept here and skipped by the domain
/// normalizers.
#[derive(Debug, Clone, Default)]
pub struct GvizTable {
    pub labels: Vec<String>,
    pub rows: Vec<Vec<GvizCell>>,
}

#[derive(Debug, Deserialize)]
struct GvizPayload {
    #[serde(default)]
    table: Option<GvizTableWire>,
}

#[derive(Debug, Deserialize)]
struct GvizTableWire {
    #[serde(default)]
    cols: Vec<GvizColWire>,
    #[serde(default)]
    rows: Vec<GvizRowWire>,
}

#[derive(Debug, Deserialize)]
struct GvizColWire {
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GvizRowWire {
    #[serde(default)]
    c: Vec<Option<GvizCellWire>>,
}

#[derive(Debug, Deserialize)]
struct GvizCellWire {
    #[serde(default)]
    v: Value,
    #[serde(default)]
    f: Option<String>,
}

/// Decode the JSON-with-padding envelope the GVIZ endpoint wraps its payload
/// in: arbitrary prefix/suffix around one JSON object, delimited by the first
/// `{` and the last `}`. Anything without that pair, or with invalid JSON
/// inside it, is a malformed payload and fails the whole fetch.
pub fn parse_gviz(raw: &str) -> Result<GvizTable> {
    let start = raw.find('{');
    let end = raw.rfind('}');
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => anyhow::bail!("malformed gviz payload: no json object found"),
    };

    let payload: GvizPayload =
        serde_json::from_str(&raw[start..=end]).context("malformed gviz payload")?;

    let Some(table) = payload.table else {
        return Ok(GvizTable::default());
    };

    let labels = table
        .cols
        .into_iter()
        .map(|col| col.label.unwrap_or_default().trim().to_string())
        .collect();

    let rows = table
        .rows
        .into_iter()
        .map(|row| row.c.into_iter().map(build_cell).collect())
        .collect();

    Ok(GvizTable { labels, rows })
}

fn build_cell(cell: Option<GvizCellWire>) -> GvizCell {
    let Some(cell) = cell else {
        return GvizCell::default();
    };
    let value = match &cell.v {
        Value::String(s) => s.trim().to_string(),
        // Number text is preserved verbatim so later numeric coercion sees the
        // exact digits the sheet held.
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Object(_) | Value::Array(_) => String::new(),
    };
    let formula = cell
        .f
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty());
    GvizCell { value, formula }
}

/// Cell value at `index`, empty string when the row is too short.
pub fn pick(cells: &[GvizCell], index: usize) -> &str {
    cells.get(index).map(|cell| cell.value.as_str()).unwrap_or("")
}

/// Like [`pick`], but preferring the raw formula text when one exists.
pub fn pick_formula(cells: &[GvizCell], index: usize) -> &str {
    match cells.get(index) {
        Some(cell) => cell.formula.as_deref().unwrap_or(cell.value.as_str()),
        None => "",
    }
}

/// Pull the URL out of an `=IMAGE("...")` formula, tolerating missing quotes
/// and trailing size arguments. A bare URL passes through unchanged.
pub fn extract_image_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let upper = trimmed.to_ascii_uppercase();
    let Some(open) = upper.find("IMAGE(") else {
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Some(trimmed.to_string());
        }
        return None;
    };

    let rest = trimmed[open + "IMAGE(".len()..].trim_start();
    let rest = rest
        .strip_prefix('"')
        .or_else(|| rest.strip_prefix('\''))
        .unwrap_or(rest);
    let end = rest.find(['"', '\'', ',', ')']).unwrap_or(rest.len());
    let url = rest[..end].trim();
    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

/// First non-empty value from `start` rightwards. Community sheets sometimes
/// shift the location column by one, so a miss scans the rest of the row.
pub fn pick_from(cells: &[GvizCell], start: usize) -> &str {
    let direct = pick(cells, start);
    if !direct.is_empty() {
        return direct;
    }
    for cell in cells.iter().skip(start) {
        if !cell.value.is_empty() {
            return cell.value.as_str();
        }
    }
    ""
}
