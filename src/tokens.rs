use anyhow::Result;
use reqwest::blocking::Client;

use crate::gviz::{extract_image_url, pick, pick_formula, GvizCell};
use crate::sheets::{self, FetchOutcome, SheetSource};
use crate::text::{build_id, normalize_label, text_or, DASH};

// The token tab has no usable header labels, the columns are fixed:
// A name, B location, C NPC, D picture (an =IMAGE formula).
const COL_NAME: usize = 0;
const COL_LOCATION: usize = 1;
const COL_NPC: usize = 2;
const COL_IMAGE: usize = 3;

#[derive(Debug, Clone)]
pub struct Token {
    pub id: String,
    pub name: String,
    pub color: String,
    pub location: String,
    pub npc: String,
    pub image_url: Option<String>,
}

/// Token families are color-coded by name keyword; unmatched names fall into
/// the "Normal" family.
pub fn color_from_name(name: &str) -> &'static str {
    let normalized = normalize_label(name);
    const FAMILIES: [(&[&str], &str); 7] = [
        (&["gratitude"], "Bleu"),
        (&["reve", "dream"], "Violet"),
        (&["objectif", "objective"], "Vert"),
        (&["amour", "love"], "Rose"),
        (&["vitalite", "vitality"], "Rouge"),
        (&["amitie", "friendship"], "Jaune"),
        (&["passion"], "Orange"),
    ];
    for (keywords, color) in FAMILIES {
        if keywords.iter().any(|kw| normalized.contains(kw)) {
            return color;
        }
    }
    "Normal"
}

pub fn normalize_row(cells: &[GvizCell], index: usize) -> Option<Token> {
    if cells.is_empty() {
        return None;
    }

    let name = pick(cells, COL_NAME);
    let folded = normalize_label(name);
    if name.is_empty() || folded == "token" || folded == "guide token" {
        return None;
    }

    Some(Token {
        id: build_id(name, index, "token"),
        name: name.to_string(),
        color: color_from_name(name).to_string(),
        location: text_or(pick(cells, COL_LOCATION), DASH),
        npc: text_or(pick(cells, COL_NPC), DASH),
        image_url: extract_image_url(pick_formula(cells, COL_IMAGE)),
    })
}

pub fn fetch_tokens(client: &Client, source: &SheetSource) -> Result<FetchOutcome<Token>> {
    let table = sheets::fetch_table(client, source)?;
    let records = table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(index, cells)| normalize_row(cells, index))
        .collect();
    Ok(FetchOutcome { records, notes: Vec::new() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(value: &str) -> GvizCell {
        GvizCell { value: value.to_string(), formula: None }
    }

    #[test]
    fn colors_follow_name_keywords() {
        assert_eq!(color_from_name("Token de Gratitude"), "Bleu");
        assert_eq!(color_from_name("Token de Rêve"), "Violet");
        assert_eq!(color_from_name("Dream Token"), "Violet");
        assert_eq!(color_from_name("Token d'Amitié"), "Jaune");
        assert_eq!(color_from_name("Token mystère"), "Normal");
    }

    #[test]
    fn header_rows_are_skipped() {
        assert!(normalize_row(&[cell("Token")], 0).is_none());
        assert!(normalize_row(&[cell("GUIDE TOKEN")], 0).is_none());
        assert!(normalize_row(&[cell("")], 0).is_none());
        assert!(normalize_row(&[], 0).is_none());
    }

    #[test]
    fn normalizes_a_full_row() {
        let cells = vec![
            cell("Token de Passion"),
            cell("Plage sud"),
            cell("Marchand"),
            GvizCell {
                value: String::new(),
                formula: Some(r#"=IMAGE("https://lh3.googleusercontent.com/t.png")"#.to_string()),
            },
        ];
        let token = normalize_row(&cells, 2).expect("row should normalize");
        assert_eq!(token.id, "token-de-passion-2");
        assert_eq!(token.color, "Orange");
        assert_eq!(token.location, "Plage sud");
        assert_eq!(token.npc, "Marchand");
        assert_eq!(
            token.image_url.as_deref(),
            Some("https://lh3.googleusercontent.com/t.png")
        );
    }

    #[test]
    fn short_rows_fall_back_to_placeholders() {
        let token = normalize_row(&[cell("Token de Rêve")], 0).expect("row");
        assert_eq!(token.location, "—");
        assert_eq!(token.npc, "—");
        assert!(token.image_url.is_none());
    }
}
