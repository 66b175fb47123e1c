//! Offline seed data. With `VROAD_OFFLINE=1` the provider skips the network
//! and feeds these records through the same deltas the live fetch path uses,
//! so the whole UI is drivable without connectivity.

use std::env;

use crate::feves::Feve;
use crate::gviz::GvizCell;
use crate::heroes;
use crate::players;
use crate::sheets::Domain;
use crate::state::Delta;
use crate::techniques::{self, TechniqueKind};
use crate::tokens;

pub fn is_offline() -> bool {
    env::var("VROAD_OFFLINE")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn cells(values: &[&str]) -> Vec<GvizCell> {
    values
        .iter()
        .map(|v| GvizCell { value: v.to_string(), formula: None })
        .collect()
}

// Header-less resolution: every field sits on its fallback position, which
// is exactly how the seed rows are laid out.
fn techniques_from(kind: TechniqueKind, rows: &[&[&str]]) -> Vec<techniques::Technique> {
    let columns = crate::columns::resolve_columns(&[], &techniques::schema(kind));
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| techniques::normalize_row(kind, &cells(row), &columns, index))
        .collect()
}

pub fn seed_deltas() -> Vec<Delta> {
    let offensive = techniques_from(
        TechniqueKind::Offensive,
        &[
            &["Tir du Dragon", "Dragon Shot", "ドラゴンシュート", "Feu", "118", "Non", "Boutique (1200 kizuna)", "1200"],
            &["Tornade de Feu", "Fire Tornado", "ファイアトルネード", "Feu", "104", "Non", "Histoire chapitre 4", "—"],
            &["Mirage Fendu", "Split Mirage", "", "Vent", "92", "Oui", "Marché noir", "850"],
        ],
    );
    let defensive = techniques_from(
        TechniqueKind::Defensive,
        &[
            &["Mur Infini", "The Wall", "ザ・ウォール", "Terre", "110", "Oui", "Boutique (900 kizuna)", "900"],
            &["Tacle Éclair", "Lightning Tackle", "", "Foudre", "87", "Non", "VS classé", "—"],
        ],
    );
    let keeper = techniques_from(
        TechniqueKind::Keeper,
        &[
            &["Main Céleste", "God Hand", "ゴッドハンド", "Terre", "121", "Oui", "Histoire chapitre 6", "—"],
            &["Poing Majin", "Majin The Hand", "", "Feu", "109", "Oui", "Boutique (1500 kizuna)", "1500"],
        ],
    );
    let shots = techniques_from(
        TechniqueKind::Shot,
        &[
            &["Éclair Céleste", "Heaven's Bolt", "", "Foudre", "96", "Non", "Tir contre", "Marché", "700"],
            &["Frappe Comète", "Comet Strike", "", "Vent", "88", "Non", "Tir long", "Boutique", "500"],
        ],
    );

    let tokens: Vec<tokens::Token> = [
        &["Token de Gratitude", "Place du marché", "Vieil homme au banc"][..],
        &["Token de Rêve", "Toit du lycée", "Rêveuse"][..],
        &["Token de Passion", "Terrain riverain", "Supporter"][..],
    ]
    .iter()
    .enumerate()
    .filter_map(|(index, row)| tokens::normalize_row(&cells(row), index))
    .collect();

    let feves: Vec<Feve> = [
        &["Fève d'Or", "Jaune", "Récompense VS", "Trois victoires d'affilée"][..],
        &["Fève Azur", "Bleu", "Boutique", "Stock limité le lundi"][..],
    ]
    .iter()
    .enumerate()
    .filter_map(|(index, row)| crate::feves::normalize_row(&cells(row), index))
    .collect();

    let hero_rows: &[&[&str]] = &[
        &["Axel Blaze", "Rouge", "Lion", "Chapitre 2", "Quand le joueur tire Gagne 10% ATT Après un tacle réussi Récupère 5 PV", "violence"],
        &["Mark Evans", "Orange", "Gardien", "Départ", "Si un arrêt est réussi Gagne 8% DEF", "justice"],
    ];
    let heroes_records: Vec<heroes::Hero> = hero_rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| heroes::normalize_row(&cells(row), index))
        .collect();

    let player_rows: &[&[&str]] = &[
        &["", "https://lh3.googleusercontent.com/axel.png", "Axel Blaze", "FW", "Fire", "131", "102", "", "84", "96", "88", "79", "", "", "", "", "", "24"],
        &["", "", "Mark Evans", "GK", "Mountain", "48", "77", "", "98", "101", "72", "94", "", "", "", "", "", "139"],
        &["", "", "Nathan Swift", "DF", "Wind", "64", "83", "", "88", "79", "122", "85", "", "", "", "", "", "31"],
        &["", "", "Jude Sharp", "MF", "Wood", "88", "119", "", "86", "74", "90", "108", "", "", "", "", "", "28"],
    ];
    let players_records: Vec<players::PlayerStat> = player_rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| players::normalize_row(&cells(row), index))
        .collect();

    vec![
        Delta::SetTechniques { domain: Domain::Offensive, records: offensive },
        Delta::SetTechniques { domain: Domain::Defensive, records: defensive },
        Delta::SetTechniques { domain: Domain::Keeper, records: keeper },
        Delta::SetTechniques { domain: Domain::Shots, records: shots },
        Delta::SetTokens(tokens),
        Delta::SetFeves(feves),
        Delta::SetHeroes(heroes_records),
        Delta::SetPlayers(players_records),
    ]
}
