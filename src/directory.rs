//! Client-side directory engine: pure filter/sort functions over one
//! normalized record set plus an explicit, by-value view state. Every state
//! change recomputes the derived view synchronously; records are never
//! mutated.

use crate::feves::Feve;
use crate::heroes::Hero;
use crate::players::{PlayerStat, StatBlock};
use crate::techniques::Technique;
use crate::text::normalize_label;
use crate::thresholds::StatKey;
use crate::tokens::Token;

/// Incrementally growing visible-count window. Never shrinks except through
/// [`Pager::reset`], which every filter edit triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    initial: usize,
    step: usize,
    pub visible: usize,
}

impl Pager {
    pub fn new(initial: usize, step: usize) -> Self {
        Self { initial, step, visible: initial }
    }

    pub fn reset(&mut self) {
        self.visible = self.initial;
    }

    pub fn show_more(&mut self) {
        self.visible += self.step;
    }
}

/// Filter + pagination + focus state for one directory. Editing the filter
/// through [`DirectoryState::edit_filter`] resets the pager; focus is
/// independent of both and only cleared explicitly.
#[derive(Debug, Clone)]
pub struct DirectoryState<F> {
    pub filter: F,
    pub pager: Pager,
    pub focused: Option<String>,
    /// Cursor position within the visible window (TUI selection bar).
    pub cursor: usize,
}

impl<F: Default> DirectoryState<F> {
    pub fn new(initial: usize, step: usize) -> Self {
        Self {
            filter: F::default(),
            pager: Pager::new(initial, step),
            focused: None,
            cursor: 0,
        }
    }
}

impl<F> DirectoryState<F> {
    pub fn edit_filter(&mut self, edit: impl FnOnce(&mut F)) {
        edit(&mut self.filter);
        self.pager.reset();
        self.cursor = 0;
    }

    pub fn show_more(&mut self) {
        self.pager.show_more();
    }

    pub fn focus(&mut self, id: impl Into<String>) {
        self.focused = Some(id.into());
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
    }
}

fn matches_query(haystack: &[&str], query: &str) -> bool {
    let term = normalize_label(query);
    if term.is_empty() {
        return true;
    }
    haystack
        .iter()
        .any(|field| normalize_label(field).contains(&term))
}

fn matches_category(value: &str, selected: Option<&String>) -> bool {
    match selected {
        Some(want) => normalize_label(value) == normalize_label(want),
        None => true,
    }
}

fn name_order(a: &str, b: &str) -> std::cmp::Ordering {
    normalize_label(a).cmp(&normalize_label(b)).then_with(|| a.cmp(b))
}

/// Distinct raw values of a categorical field, sorted, for the filter cycles.
pub fn unique_sorted(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let trimmed = value.trim().to_string();
        if trimmed.is_empty() || out.iter().any(|v| v == &trimmed) {
            continue;
        }
        out.push(trimmed);
    }
    out.sort_by(|a, b| name_order(a, b));
    out
}

#[derive(Debug, Clone, Default)]
pub struct TechniqueFilter {
    pub query: String,
    pub element: Option<String>,
    pub shot_type: Option<String>,
    pub min_power: f64,
}

/// All predicates AND together; result ordered by power descending with an
/// alphabetical tie-break on the French name.
pub fn filter_techniques<'a>(
    records: &'a [Technique],
    filter: &TechniqueFilter,
) -> Vec<&'a Technique> {
    let mut out: Vec<&Technique> = records
        .iter()
        .filter(|tech| {
            let shot_type = tech.shot_type.as_deref().unwrap_or("");
            let haystack = [
                tech.name_fr.as_str(),
                tech.name_en.as_str(),
                tech.name_jp.as_str(),
                tech.element.as_str(),
                tech.location.as_str(),
                shot_type,
            ];
            matches_query(&haystack, &filter.query)
                && matches_category(&tech.element, filter.element.as_ref())
                && match filter.shot_type.as_ref() {
                    Some(want) => normalize_label(shot_type).starts_with(&normalize_label(want)),
                    None => true,
                }
                && tech.power >= filter.min_power
        })
        .collect();
    out.sort_by(|a, b| {
        b.power
            .partial_cmp(&a.power)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| name_order(&a.name_fr, &b.name_fr))
    });
    out
}

#[derive(Debug, Clone, Default)]
pub struct TokenFilter {
    pub query: String,
    pub color: Option<String>,
    pub location: Option<String>,
}

pub fn filter_tokens<'a>(records: &'a [Token], filter: &TokenFilter) -> Vec<&'a Token> {
    let mut out: Vec<&Token> = records
        .iter()
        .filter(|token| {
            matches_query(&[token.name.as_str()], &filter.query)
                && matches_category(&token.color, filter.color.as_ref())
                && matches_category(&token.location, filter.location.as_ref())
        })
        .collect();
    out.sort_by(|a, b| name_order(&a.name, &b.name));
    out
}

#[derive(Debug, Clone, Default)]
pub struct FeveFilter {
    pub query: String,
    pub color: Option<String>,
}

pub fn filter_feves<'a>(records: &'a [Feve], filter: &FeveFilter) -> Vec<&'a Feve> {
    let mut out: Vec<&Feve> = records
        .iter()
        .filter(|feve| {
            let haystack = [feve.name.as_str(), feve.obtention.as_str(), feve.astuce.as_str()];
            matches_query(&haystack, &filter.query)
                && matches_category(&feve.color, filter.color.as_ref())
        })
        .collect();
    out.sort_by(|a, b| name_order(&a.name, &b.name));
    out
}

#[derive(Debug, Clone, Default)]
pub struct HeroFilter {
    pub query: String,
    pub style: Option<String>,
    pub color: Option<String>,
}

pub fn filter_heroes<'a>(records: &'a [Hero], filter: &HeroFilter) -> Vec<&'a Hero> {
    let mut out: Vec<&Hero> = records
        .iter()
        .filter(|hero| {
            let mut haystack: Vec<&str> = vec![hero.name.as_str(), hero.style.as_str()];
            haystack.extend(hero.passives.iter().map(|p| p.as_str()));
            matches_query(&haystack, &filter.query)
                && matches_category(&hero.style, filter.style.as_ref())
                && matches_category(&hero.color, filter.color.as_ref())
        })
        .collect();
    out.sort_by(|a, b| name_order(&a.name, &b.name));
    out
}

/// User-selectable sort for the player directory. `Default` preserves the
/// fetch order (stable, not re-sorted).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayerSort {
    #[default]
    Default,
    Name,
    Stat(StatKey),
}

impl PlayerSort {
    pub fn label(self) -> String {
        match self {
            PlayerSort::Default => "Défaut".to_string(),
            PlayerSort::Name => "Nom (A-Z)".to_string(),
            PlayerSort::Stat(key) => key.label().to_string(),
        }
    }

    /// Cycle order used by the sort key binding.
    pub fn next(self) -> Self {
        match self {
            PlayerSort::Default => PlayerSort::Name,
            PlayerSort::Name => PlayerSort::Stat(StatKey::ALL[0]),
            PlayerSort::Stat(key) => {
                let pos = StatKey::ALL.iter().position(|k| *k == key).unwrap_or(0);
                match StatKey::ALL.get(pos + 1) {
                    Some(next) => PlayerSort::Stat(*next),
                    None => PlayerSort::Default,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    pub query: String,
    pub position: Option<String>,
    pub element: Option<String>,
    pub min_stats: StatBlock,
    pub sort: PlayerSort,
}

pub fn filter_players<'a>(records: &'a [PlayerStat], filter: &PlayerFilter) -> Vec<&'a PlayerStat> {
    let mut out: Vec<&PlayerStat> = records
        .iter()
        .filter(|player| {
            matches_query(&[player.name.as_str()], &filter.query)
                && matches_category(&player.position, filter.position.as_ref())
                && matches_category(&player.element, filter.element.as_ref())
                && StatKey::ALL.iter().all(|key| {
                    key.get(&player.stats) >= key.get(&filter.min_stats)
                })
        })
        .collect();

    match filter.sort {
        PlayerSort::Default => {}
        PlayerSort::Name => out.sort_by(|a, b| name_order(&a.name, &b.name)),
        PlayerSort::Stat(key) => out.sort_by(|a, b| {
            key.get(&b.stats)
                .partial_cmp(&key.get(&a.stats))
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
    }
    out
}
