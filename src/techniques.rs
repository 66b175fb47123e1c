use anyhow::Result;
use reqwest::blocking::Client;

use crate::columns::{resolve_columns, ColumnSpec, ResolvedColumns};
use crate::gviz::{pick, pick_from, GvizCell};
use crate::sheets::{self, FetchOutcome, SheetSource};
use crate::text::{self, build_id, normalize_label, text_or, to_number};

/// The four technique sheets share one record shape; only the dominant stat
/// (OFF or DEF) and the extra shot-type column differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechniqueKind {
    Offensive,
    Defensive,
    Keeper,
    Shot,
}

impl TechniqueKind {
    pub fn power_label(self) -> &'static str {
        match self {
            TechniqueKind::Offensive | TechniqueKind::Shot => "OFF",
            TechniqueKind::Defensive | TechniqueKind::Keeper => "DEF",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TechniqueKind::Offensive => "Technique offensive",
            TechniqueKind::Defensive => "Technique défensive",
            TechniqueKind::Keeper => "Technique gardien",
            TechniqueKind::Shot => "Technique de tir",
        }
    }
}

/// Presentational badges derived from the free-text location at
/// normalization time, shared by the list rows and the focus view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationTag {
    Boutique,
    Chronicle,
    Marche,
    Versus,
    Histoire,
}

impl LocationTag {
    const ALL: [LocationTag; 5] = [
        LocationTag::Boutique,
        LocationTag::Chronicle,
        LocationTag::Marche,
        LocationTag::Versus,
        LocationTag::Histoire,
    ];

    fn keyword(self) -> &'static str {
        match self {
            LocationTag::Boutique => "boutique",
            LocationTag::Chronicle => "chronicle",
            LocationTag::Marche => "marche",
            LocationTag::Versus => "vs",
            LocationTag::Histoire => "histoire",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LocationTag::Boutique => "Boutique",
            LocationTag::Chronicle => "Chronicle",
            LocationTag::Marche => "Marché",
            LocationTag::Versus => "VS",
            LocationTag::Histoire => "Story",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Technique {
    pub id: String,
    pub kind: TechniqueKind,
    pub name_fr: String,
    pub name_en: String,
    pub name_jp: String,
    pub element: String,
    /// OFF or DEF depending on the kind; always finite, 0 when unparsable.
    pub power: f64,
    pub shot_block: String,
    /// Counter/long-shot qualifier, shot sheet only.
    pub shot_type: Option<String>,
    pub location: String,
    pub price: String,
    pub tags: Vec<LocationTag>,
}

pub fn extract_location_tags(location: &str) -> Vec<LocationTag> {
    let haystack = normalize_label(location);
    LocationTag::ALL
        .into_iter()
        .filter(|tag| haystack.contains(tag.keyword()))
        .collect()
}

/// Column schema for one technique sheet: keyword sets plus the positional
/// fallbacks that hold when the community renames the headers.
pub fn schema(kind: TechniqueKind) -> Vec<ColumnSpec> {
    let mut specs = vec![
        ColumnSpec { field: "nameFr", keywords: &["nom", "francais"], fallback: 0 },
        ColumnSpec { field: "nameEn", keywords: &["anglais", "english"], fallback: 1 },
        ColumnSpec { field: "nameJp", keywords: &["japon", "japan"], fallback: 2 },
        ColumnSpec { field: "element", keywords: &["element"], fallback: 3 },
    ];
    match kind {
        TechniqueKind::Offensive => {
            specs.push(ColumnSpec { field: "power", keywords: &["off"], fallback: 4 });
        }
        TechniqueKind::Shot => {
            specs.push(ColumnSpec { field: "power", keywords: &["off", "att"], fallback: 4 });
        }
        TechniqueKind::Defensive | TechniqueKind::Keeper => {
            specs.push(ColumnSpec { field: "power", keywords: &["def"], fallback: 4 });
        }
    }
    specs.push(ColumnSpec {
        field: "shotBlock",
        keywords: &["blocage", "block", "shot"],
        fallback: 5,
    });
    if kind == TechniqueKind::Shot {
        specs.push(ColumnSpec {
            field: "shotType",
            keywords: &["tir contre", "counter", "long shot", "tir long"],
            fallback: 6,
        });
        specs.push(ColumnSpec { field: "location", keywords: &["emplacement", "location"], fallback: 7 });
        specs.push(ColumnSpec { field: "price", keywords: &["prix", "price"], fallback: 8 });
    } else {
        specs.push(ColumnSpec { field: "location", keywords: &["emplacement", "location"], fallback: 6 });
        specs.push(ColumnSpec { field: "price", keywords: &["prix", "price"], fallback: 7 });
    }
    specs
}

/// Build one technique from a raw row, or `None` for blank rows and rows that
/// merely repeat the header inside the data range.
pub fn normalize_row(
    kind: TechniqueKind,
    cells: &[GvizCell],
    columns: &ResolvedColumns,
    index: usize,
) -> Option<Technique> {
    if cells.is_empty() {
        return None;
    }

    let name_fr = pick(cells, columns.index("nameFr"));
    if name_fr.is_empty() || normalize_label(name_fr) == "nom francais" {
        return None;
    }

    let location = text_or(pick_from(cells, columns.index("location")), text::DASH);
    let shot_type = (kind == TechniqueKind::Shot)
        .then(|| text_or(pick(cells, columns.index("shotType")), text::DASH));

    Some(Technique {
        id: build_id(name_fr, index, "technique"),
        kind,
        name_fr: name_fr.to_string(),
        name_en: pick(cells, columns.index("nameEn")).to_string(),
        name_jp: pick(cells, columns.index("nameJp")).to_string(),
        element: text_or(pick(cells, columns.index("element")), text::UNKNOWN),
        power: to_number(pick(cells, columns.index("power"))),
        shot_block: text_or(pick(cells, columns.index("shotBlock")), text::DASH),
        shot_type,
        tags: extract_location_tags(&location),
        location,
        price: text_or(pick(cells, columns.index("price")), text::DASH),
    })
}

pub fn fetch_techniques(
    client: &Client,
    source: &SheetSource,
    kind: TechniqueKind,
) -> Result<FetchOutcome<Technique>> {
    let table = sheets::fetch_table(client, source)?;
    let columns = resolve_columns(&table.labels, &schema(kind));

    let mut notes = Vec::new();
    if let Some(note) = columns.fallback_note(source.domain.key()) {
        notes.push(note);
    }

    let records = table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(index, cells)| normalize_row(kind, cells, &columns, index))
        .collect();

    Ok(FetchOutcome { records, notes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::resolve_columns;

    fn row(values: &[&str]) -> Vec<GvizCell> {
        values
            .iter()
            .map(|v| GvizCell { value: v.to_string(), formula: None })
            .collect()
    }

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn normalizes_defensive_row_with_resolved_headers() {
        let labels = labels(&[
            "Nom Francais",
            "Blocage",
            "",
            "Element",
            "DEF",
            "",
            "Emplacement",
            "",
        ]);
        let columns = resolve_columns(&labels, &schema(TechniqueKind::Defensive));
        let cells = row(&[
            "Éclair Rapide",
            "",
            "",
            "Foudre",
            "85",
            "Non",
            "Boutique (500 gold)",
            "500",
        ]);

        let tech = normalize_row(TechniqueKind::Defensive, &cells, &columns, 0)
            .expect("row should normalize");
        assert_eq!(tech.name_fr, "Éclair Rapide");
        assert_eq!(tech.element, "Foudre");
        assert_eq!(tech.power, 85.0);
        assert_eq!(tech.location, "Boutique (500 gold)");
        assert_eq!(tech.shot_block, "—");
        assert_eq!(tech.id, "eclair-rapide-0");
        assert_eq!(tech.tags, vec![LocationTag::Boutique]);
    }

    #[test]
    fn header_lookalike_rows_are_dropped() {
        let columns = resolve_columns(&[], &schema(TechniqueKind::Offensive));
        assert!(normalize_row(
            TechniqueKind::Offensive,
            &row(&["Nom Français", "English", "", "Element"]),
            &columns,
            0
        )
        .is_none());
        assert!(normalize_row(TechniqueKind::Offensive, &row(&[""]), &columns, 1).is_none());
        assert!(normalize_row(TechniqueKind::Offensive, &[], &columns, 2).is_none());
    }

    #[test]
    fn duplicate_names_get_distinct_ids() {
        let columns = resolve_columns(&[], &schema(TechniqueKind::Offensive));
        let a = normalize_row(TechniqueKind::Offensive, &row(&["Tir du Dragon"]), &columns, 3)
            .expect("row");
        let b = normalize_row(TechniqueKind::Offensive, &row(&["Tir du Dragon"]), &columns, 9)
            .expect("row");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn missing_fields_get_placeholders_and_zeroes() {
        let columns = resolve_columns(&[], &schema(TechniqueKind::Shot));
        let tech = normalize_row(TechniqueKind::Shot, &row(&["Météore"]), &columns, 0)
            .expect("row");
        assert_eq!(tech.element, "Inconnu");
        assert_eq!(tech.power, 0.0);
        assert_eq!(tech.shot_block, "—");
        assert_eq!(tech.shot_type.as_deref(), Some("—"));
        assert_eq!(tech.location, "—");
        assert_eq!(tech.price, "—");
        assert!(tech.tags.is_empty());
    }

    #[test]
    fn power_accepts_comma_decimals_and_garbage() {
        let columns = resolve_columns(&[], &schema(TechniqueKind::Offensive));
        let tech = normalize_row(
            TechniqueKind::Offensive,
            &row(&["Frappe", "", "", "Feu", "87,5"]),
            &columns,
            0,
        )
        .expect("row");
        assert_eq!(tech.power, 87.5);

        let tech = normalize_row(
            TechniqueKind::Offensive,
            &row(&["Frappe", "", "", "Feu", "???"]),
            &columns,
            0,
        )
        .expect("row");
        assert_eq!(tech.power, 0.0);
    }

    #[test]
    fn location_tags_match_accent_insensitively() {
        assert_eq!(
            extract_location_tags("Marché noir, après VS"),
            vec![LocationTag::Marche, LocationTag::Versus]
        );
        assert!(extract_location_tags("—").is_empty());
        assert_eq!(
            extract_location_tags("Mode Histoire chapitre 3"),
            vec![LocationTag::Histoire]
        );
    }
}
