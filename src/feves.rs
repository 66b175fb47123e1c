use anyhow::Result;
use reqwest::blocking::Client;

use crate::gviz::{pick, GvizCell};
use crate::sheets::{self, FetchOutcome, SheetSource};
use crate::text::{build_id, normalize_label, text_or, DASH, UNKNOWN};

// Fixed layout: A name, B color, C how to obtain, D farming tip.
const COL_NAME: usize = 0;
const COL_COLOR: usize = 1;
const COL_OBTENTION: usize = 2;
const COL_ASTUCE: usize = 3;

#[derive(Debug, Clone)]
pub struct Feve {
    pub id: String,
    pub name: String,
    pub color: String,
    pub obtention: String,
    pub astuce: String,
}

pub fn normalize_row(cells: &[GvizCell], index: usize) -> Option<Feve> {
    if cells.is_empty() {
        return None;
    }

    let name = pick(cells, COL_NAME);
    let folded = normalize_label(name);
    if name.is_empty() || folded == "liste des feves" || folded == "name" {
        return None;
    }

    Some(Feve {
        id: build_id(name, index, "feve"),
        name: name.to_string(),
        color: text_or(pick(cells, COL_COLOR), UNKNOWN),
        obtention: text_or(pick(cells, COL_OBTENTION), DASH),
        astuce: text_or(pick(cells, COL_ASTUCE), DASH),
    })
}

pub fn fetch_feves(client: &Client, source: &SheetSource) -> Result<FetchOutcome<Feve>> {
    let table = sheets::fetch_table(client, source)?;
    let records = table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(index, cells)| normalize_row(cells, index))
        .collect();
    Ok(FetchOutcome { records, notes: Vec::new() })
}
