use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::directory::{
    filter_feves, filter_heroes, filter_players, filter_techniques, filter_tokens,
};
use crate::sheets::Domain;
use crate::state::AppState;
use crate::thresholds::StatKey;

pub struct ExportReport {
    pub rows: usize,
    pub path: PathBuf,
}

/// Write the current directory — with its active filters and sort — to one
/// XLSX worksheet. The pager window is ignored: exports always cover the
/// whole filtered set.
pub fn export_directory(path: &Path, state: &AppState) -> Result<ExportReport> {
    let (sheet_name, rows) = directory_rows(state);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name)?;
        write_rows(sheet, &rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        rows: rows.len().saturating_sub(1),
        path: path.to_path_buf(),
    })
}

fn directory_rows(state: &AppState) -> (&'static str, Vec<Vec<String>>) {
    match state.domain {
        Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => {
            let dir = state.technique_dir(state.domain).expect("technique dir");
            let filtered = filter_techniques(state.technique_records(state.domain), &dir.filter);
            let mut rows = vec![vec![
                "Nom FR".to_string(),
                "Nom EN".to_string(),
                "Nom JP".to_string(),
                "Élément".to_string(),
                "Puissance".to_string(),
                "Blocage".to_string(),
                "Type de tir".to_string(),
                "Emplacement".to_string(),
                "Prix".to_string(),
            ]];
            rows.extend(filtered.iter().map(|tech| {
                vec![
                    tech.name_fr.clone(),
                    tech.name_en.clone(),
                    tech.name_jp.clone(),
                    tech.element.clone(),
                    format_power(tech.power),
                    tech.shot_block.clone(),
                    tech.shot_type.clone().unwrap_or_default(),
                    tech.location.clone(),
                    tech.price.clone(),
                ]
            }));
            ("Techniques", rows)
        }
        Domain::Tokens => {
            let filtered = filter_tokens(&state.tokens, &state.dir_tokens.filter);
            let mut rows = vec![vec![
                "Token".to_string(),
                "Couleur".to_string(),
                "Emplacement".to_string(),
                "PNJ".to_string(),
                "Image".to_string(),
            ]];
            rows.extend(filtered.iter().map(|token| {
                vec![
                    token.name.clone(),
                    token.color.clone(),
                    token.location.clone(),
                    token.npc.clone(),
                    token.image_url.clone().unwrap_or_default(),
                ]
            }));
            ("Tokens", rows)
        }
        Domain::Feves => {
            let filtered = filter_feves(&state.feves, &state.dir_feves.filter);
            let mut rows = vec![vec![
                "Fève".to_string(),
                "Couleur".to_string(),
                "Obtention".to_string(),
                "Astuce".to_string(),
            ]];
            rows.extend(filtered.iter().map(|feve| {
                vec![
                    feve.name.clone(),
                    feve.color.clone(),
                    feve.obtention.clone(),
                    feve.astuce.clone(),
                ]
            }));
            ("Feves", rows)
        }
        Domain::Heroes => {
            let filtered = filter_heroes(&state.heroes, &state.dir_heroes.filter);
            let mut rows = vec![vec![
                "Héros".to_string(),
                "Couleur".to_string(),
                "Constellation".to_string(),
                "Style".to_string(),
                "Passifs".to_string(),
            ]];
            rows.extend(filtered.iter().map(|hero| {
                vec![
                    hero.name.clone(),
                    hero.color.clone(),
                    hero.constellation.clone(),
                    hero.style.clone(),
                    hero.passives.join(" "),
                ]
            }));
            ("Heros", rows)
        }
        Domain::Players => {
            let filtered = filter_players(&state.players, &state.dir_players.filter);
            let mut header = vec![
                "Joueur".to_string(),
                "Position".to_string(),
                "Élément".to_string(),
            ];
            header.extend(StatKey::ALL.iter().map(|key| key.label().to_string()));
            let mut rows = vec![header];
            rows.extend(filtered.iter().map(|player| {
                let mut row = vec![
                    player.name.clone(),
                    player.position.clone(),
                    player.element.clone(),
                ];
                row.extend(
                    StatKey::ALL
                        .iter()
                        .map(|key| format_power(key.get(&player.stats))),
                );
                row
            }));
            ("Joueurs", rows)
        }
    }
}

fn format_power(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
