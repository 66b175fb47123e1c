use anyhow::Result;
use reqwest::blocking::Client;

use crate::gviz::{extract_image_url, pick, pick_formula, GvizCell};
use crate::sheets::{self, FetchOutcome, SheetSource, REVALIDATE_TAG};
use crate::text::{build_id, normalize_label, text_or, to_number};

// The player tab carries no headers worth matching; positions are fixed:
// 0/1 image (=IMAGE formula or bare URL), 2 name, 3 position, 4 element,
// then the stat block with gaps for columns the site never used.
const COL_IMAGE_A: usize = 0;
const COL_IMAGE_B: usize = 1;
const COL_NAME: usize = 2;
const COL_POSITION: usize = 3;
const COL_ELEMENT: usize = 4;
const COL_KICK: usize = 5;
const COL_CONTROL: usize = 6;
const COL_GUARD: usize = 8;
const COL_BODY: usize = 9;
const COL_SPEED: usize = 10;
const COL_STAMINA: usize = 11;
const COL_CATCH: usize = 17;

/// Base stats at green rarity, level 50, no equipment. Always finite; blank
/// or malformed cells coerce to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatBlock {
    pub kick: f64,
    pub control: f64,
    pub guard: f64,
    pub body: f64,
    pub speed: f64,
    pub stamina: f64,
    pub catch: f64,
}

#[derive(Debug, Clone)]
pub struct PlayerStat {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub position: String,
    pub element: String,
    pub stats: StatBlock,
}

pub fn normalize_row(cells: &[GvizCell], index: usize) -> Option<PlayerStat> {
    if cells.len() < 3 {
        return None;
    }

    let name = pick(cells, COL_NAME);
    let folded = normalize_label(name);
    if name.is_empty() || folded == "name" || folded == "nom" {
        return None;
    }

    let image_raw = {
        let primary = pick_formula(cells, COL_IMAGE_A);
        if primary.is_empty() {
            pick_formula(cells, COL_IMAGE_B)
        } else {
            primary
        }
    };

    Some(PlayerStat {
        id: build_id(name, index, "player"),
        name: name.to_string(),
        image: extract_image_url(image_raw),
        position: text_or(pick(cells, COL_POSITION), "Unknown"),
        element: text_or(pick(cells, COL_ELEMENT), "Unknown"),
        stats: StatBlock {
            kick: to_number(pick(cells, COL_KICK)),
            control: to_number(pick(cells, COL_CONTROL)),
            guard: to_number(pick(cells, COL_GUARD)),
            body: to_number(pick(cells, COL_BODY)),
            speed: to_number(pick(cells, COL_SPEED)),
            stamina: to_number(pick(cells, COL_STAMINA)),
            catch: to_number(pick(cells, COL_CATCH)),
        },
    })
}

/// `<img src="...">` URLs from the published-HTML rendition of the tab, in
/// document order. Best effort: anything that is not an absolute http(s) URL
/// is skipped.
pub fn extract_img_srcs(html: &str) -> Vec<String> {
    let mut out = Vec::new();
    let lower = html.to_ascii_lowercase();
    let mut cursor = 0;
    while let Some(tag_rel) = lower[cursor..].find("<img") {
        let tag_start = cursor + tag_rel;
        let Some(end_rel) = lower[tag_start..].find('>') else {
            break;
        };
        let tag_end = tag_start + end_rel;
        if let Some(src_rel) = lower[tag_start..tag_end].find("src=") {
            let value_start = tag_start + src_rel + "src=".len();
            let rest = &html[value_start..tag_end];
            let (quote, rest) = match rest.chars().next() {
                Some(q @ ('"' | '\'')) => (Some(q), &rest[1..]),
                _ => (None, rest),
            };
            let value_end = match quote {
                Some(q) => rest.find(q).unwrap_or(rest.len()),
                None => rest.find(char::is_whitespace).unwrap_or(rest.len()),
            };
            let url = rest[..value_end].trim().replace("&amp;", "&");
            if url.starts_with("http://") || url.starts_with("https://") {
                out.push(url);
            }
        }
        cursor = tag_end + 1;
    }
    out
}

/// Fill images missed by the `=IMAGE` cells from the scraped list, pairing
/// players and scraped images by ordinal. Returns how many were filled.
pub fn augment_images(players: &mut [PlayerStat], scraped: &[String]) -> usize {
    let mut filled = 0;
    for (ordinal, player) in players.iter_mut().enumerate() {
        if player.image.is_none() {
            if let Some(url) = scraped.get(ordinal) {
                player.image = Some(url.clone());
                filled += 1;
            }
        }
    }
    filled
}

/// The one two-way fetch: the GVIZ table and the pubhtml image scrape run
/// concurrently and are joined before normalization. Either failure fails
/// the whole fetch — no partial record set.
pub fn fetch_players(client: &Client, source: &SheetSource) -> Result<FetchOutcome<PlayerStat>> {
    let (table, scraped) = {
        let (table_res, scrape_res) = rayon::join(
            || sheets::fetch_table(client, source),
            || fetch_image_scrape(client, source),
        );
        (table_res?, scrape_res?)
    };

    let mut records: Vec<PlayerStat> = table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(index, cells)| normalize_row(cells, index))
        .collect();

    let mut notes = Vec::new();
    let filled = augment_images(&mut records, &scraped);
    if filled > 0 {
        notes.push(format!("[INFO] players: {filled} images filled from pubhtml"));
    }

    Ok(FetchOutcome { records, notes })
}

fn fetch_image_scrape(client: &Client, source: &SheetSource) -> Result<Vec<String>> {
    let html = sheets::fetch_text_cached(client, &source.pubhtml_url(), source.ttl, &[REVALIDATE_TAG])?;
    Ok(extract_img_srcs(&html))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<GvizCell> {
        values
            .iter()
            .map(|v| GvizCell { value: v.to_string(), formula: None })
            .collect()
    }

    fn full_row(name: &str) -> Vec<GvizCell> {
        let mut cells = vec![String::new(); 18];
        cells[COL_NAME] = name.to_string();
        cells[COL_POSITION] = "FW".to_string();
        cells[COL_ELEMENT] = "Fire".to_string();
        cells[COL_KICK] = "92".to_string();
        cells[COL_CONTROL] = "78".to_string();
        cells[COL_GUARD] = "55".to_string();
        cells[COL_BODY] = "61".to_string();
        cells[COL_SPEED] = "70".to_string();
        cells[COL_STAMINA] = "66".to_string();
        cells[COL_CATCH] = "12".to_string();
        cells
            .into_iter()
            .map(|value| GvizCell { value, formula: None })
            .collect()
    }

    #[test]
    fn normalizes_the_stat_block() {
        let player = normalize_row(&full_row("Axel Blaze"), 0).expect("row should normalize");
        assert_eq!(player.id, "axel-blaze-0");
        assert_eq!(player.position, "FW");
        assert_eq!(player.element, "Fire");
        assert_eq!(player.stats.kick, 92.0);
        assert_eq!(player.stats.catch, 12.0);
    }

    #[test]
    fn header_and_short_rows_are_dropped() {
        assert!(normalize_row(&row(&["", "", "Name"]), 0).is_none());
        assert!(normalize_row(&row(&["", "", "Nom"]), 0).is_none());
        assert!(normalize_row(&row(&["a", "b"]), 0).is_none());
        assert!(normalize_row(&[], 0).is_none());
    }

    #[test]
    fn missing_stats_coerce_to_zero() {
        let player = normalize_row(&row(&["", "", "Jude Sharp"]), 0).expect("row");
        assert_eq!(player.stats, StatBlock::default());
        assert_eq!(player.position, "Unknown");
        assert_eq!(player.element, "Unknown");
        assert!(player.image.is_none());
    }

    #[test]
    fn image_prefers_first_column_then_second() {
        let mut cells = row(&["", "https://example.com/b.png", "Nathan Swift"]);
        let player = normalize_row(&cells, 0).expect("row");
        assert_eq!(player.image.as_deref(), Some("https://example.com/b.png"));

        cells[0].formula = Some(r#"=IMAGE("https://example.com/a.png")"#.to_string());
        let player = normalize_row(&cells, 0).expect("row");
        assert_eq!(player.image.as_deref(), Some("https://example.com/a.png"));
    }

    #[test]
    fn scrape_extracts_absolute_urls_in_order() {
        let html = r#"
            <table><tr><td><img src="https://lh3.googleusercontent.com/a.png"/></td></tr>
            <tr><td><IMG SRC='https://lh3.googleusercontent.com/b.png?x=1&amp;y=2'></td></tr>
            <tr><td><img src="/relative.png"></td></tr></table>
        "#;
        assert_eq!(
            extract_img_srcs(html),
            vec![
                "https://lh3.googleusercontent.com/a.png",
                "https://lh3.googleusercontent.com/b.png?x=1&y=2",
            ]
        );
    }

    #[test]
    fn augmentation_fills_only_missing_images() {
        let mut players = vec![
            normalize_row(&row(&["", "https://example.com/keep.png", "A"]), 0).expect("row"),
            normalize_row(&row(&["", "", "B"]), 1).expect("row"),
        ];
        let scraped = vec![
            "https://example.com/0.png".to_string(),
            "https://example.com/1.png".to_string(),
        ];
        assert_eq!(augment_images(&mut players, &scraped), 1);
        assert_eq!(players[0].image.as_deref(), Some("https://example.com/keep.png"));
        assert_eq!(players[1].image.as_deref(), Some("https://example.com/1.png"));
    }
}
