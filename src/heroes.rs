use anyhow::Result;
use reqwest::blocking::Client;

use crate::gviz::{pick, GvizCell};
use crate::passives::split_passives;
use crate::sheets::{self, FetchOutcome, SheetSource};
use crate::text::{build_id, capitalize, normalize_label, text_or, UNKNOWN};

// Fixed layout: A name, B color, C constellation, D unlock condition
// (unused), E passives free text, F style.
const COL_NAME: usize = 0;
const COL_COLOR: usize = 1;
const COL_CONSTELLATION: usize = 2;
const COL_PASSIVES: usize = 4;
const COL_STYLE: usize = 5;

/// Controlled style vocabulary; raw values outside it are kept but
/// re-capitalized.
const STYLE_LABELS: &[(&str, &str)] = &[
    ("breche", "Brèche"),
    ("violence", "Violence"),
    ("tension", "Tension"),
    ("justice", "Justice"),
    ("lien", "Lien"),
    ("contre", "Contre"),
    ("brutale", "Brutale"),
    ("support", "Support"),
    ("tactique", "Tactique"),
];

#[derive(Debug, Clone)]
pub struct Hero {
    pub id: String,
    pub name: String,
    pub color: String,
    pub constellation: String,
    pub passives: Vec<String>,
    pub style: String,
}

pub fn normalize_style(raw: &str) -> String {
    if raw.trim().is_empty() {
        return UNKNOWN.to_string();
    }
    let folded = normalize_label(raw);
    for (key, label) in STYLE_LABELS {
        if folded == *key {
            return label.to_string();
        }
    }
    capitalize(raw)
}

pub fn normalize_row(cells: &[GvizCell], index: usize) -> Option<Hero> {
    if cells.is_empty() {
        return None;
    }

    let name = pick(cells, COL_NAME);
    if name.is_empty() || normalize_label(name) == "heros" {
        return None;
    }

    Some(Hero {
        id: build_id(name, index, "hero"),
        name: name.to_string(),
        color: text_or(pick(cells, COL_COLOR), UNKNOWN),
        constellation: text_or(pick(cells, COL_CONSTELLATION), UNKNOWN),
        passives: split_passives(pick(cells, COL_PASSIVES)),
        style: normalize_style(pick(cells, COL_STYLE)),
    })
}

pub fn fetch_heroes(client: &Client, source: &SheetSource) -> Result<FetchOutcome<Hero>> {
    let table = sheets::fetch_table(client, source)?;
    let records = table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(index, cells)| normalize_row(cells, index))
        .collect();
    Ok(FetchOutcome { records, notes: Vec::new() })
}
