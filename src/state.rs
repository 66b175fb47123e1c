use std::collections::{HashMap, VecDeque};
use std::time::SystemTime;

use crate::directory::{
    filter_feves, filter_heroes, filter_players, filter_techniques, filter_tokens, unique_sorted,
    DirectoryState, FeveFilter, HeroFilter, PlayerFilter, TechniqueFilter, TokenFilter,
};
use crate::feves::Feve;
use crate::heroes::Hero;
use crate::players::PlayerStat;
use crate::sheets::Domain;
use crate::techniques::Technique;
use crate::thresholds::{compute_thresholds, StatKey, StatThresholds};
use crate::tokens::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// The search field is capturing keystrokes.
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// Messages from the provider thread to the UI. One record-set delta per
/// domain fetch — the whole set is replaced atomically, never patched.
#[derive(Debug)]
pub enum Delta {
    SetTechniques { domain: Domain, records: Vec<Technique> },
    SetTokens(Vec<Token>),
    SetFeves(Vec<Feve>),
    SetHeroes(Vec<Hero>),
    SetPlayers(Vec<PlayerStat>),
    FetchFailed { domain: Domain, error: String },
    Log(String),
}

#[derive(Debug)]
pub enum ProviderCommand {
    /// Run the revalidation handler (purging the shared cache tag) and
    /// refetch every domain.
    Revalidate,
    /// Download one image through the relay handler.
    FetchImage { name: String, src: String },
}

pub struct AppState {
    pub domain: Domain,
    pub input_mode: InputMode,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
    pub load: HashMap<Domain, LoadState>,
    pub fetched_at: HashMap<Domain, SystemTime>,

    pub offensive: Vec<Technique>,
    pub defensive: Vec<Technique>,
    pub keeper: Vec<Technique>,
    pub shots: Vec<Technique>,
    pub tokens: Vec<Token>,
    pub feves: Vec<Feve>,
    pub heroes: Vec<Hero>,
    pub players: Vec<PlayerStat>,
    pub thresholds: StatThresholds,

    pub dir_offensive: DirectoryState<TechniqueFilter>,
    pub dir_defensive: DirectoryState<TechniqueFilter>,
    pub dir_keeper: DirectoryState<TechniqueFilter>,
    pub dir_shots: DirectoryState<TechniqueFilter>,
    pub dir_tokens: DirectoryState<TokenFilter>,
    pub dir_feves: DirectoryState<FeveFilter>,
    pub dir_heroes: DirectoryState<HeroFilter>,
    pub dir_players: DirectoryState<PlayerFilter>,
    /// Which stat the player min-threshold keys currently adjust.
    pub player_min_focus: StatKey,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        let load = Domain::ALL
            .into_iter()
            .map(|domain| (domain, LoadState::Loading))
            .collect();
        Self {
            domain: Domain::Offensive,
            input_mode: InputMode::Normal,
            help_overlay: false,
            logs: VecDeque::new(),
            load,
            fetched_at: HashMap::new(),
            offensive: Vec::new(),
            defensive: Vec::new(),
            keeper: Vec::new(),
            shots: Vec::new(),
            tokens: Vec::new(),
            feves: Vec::new(),
            heroes: Vec::new(),
            players: Vec::new(),
            thresholds: StatThresholds::default(),
            dir_offensive: DirectoryState::new(12, 8),
            dir_defensive: DirectoryState::new(12, 8),
            dir_keeper: DirectoryState::new(12, 8),
            dir_shots: DirectoryState::new(12, 8),
            dir_tokens: DirectoryState::new(12, 8),
            dir_feves: DirectoryState::new(12, 8),
            dir_heroes: DirectoryState::new(10, 10),
            dir_players: DirectoryState::new(80, 80),
            player_min_focus: StatKey::Kick,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn technique_records(&self, domain: Domain) -> &[Technique] {
        match domain {
            Domain::Offensive => &self.offensive,
            Domain::Defensive => &self.defensive,
            Domain::Keeper => &self.keeper,
            Domain::Shots => &self.shots,
            _ => &[],
        }
    }

    pub fn technique_dir(&self, domain: Domain) -> Option<&DirectoryState<TechniqueFilter>> {
        match domain {
            Domain::Offensive => Some(&self.dir_offensive),
            Domain::Defensive => Some(&self.dir_defensive),
            Domain::Keeper => Some(&self.dir_keeper),
            Domain::Shots => Some(&self.dir_shots),
            _ => None,
        }
    }

    pub fn technique_dir_mut(
        &mut self,
        domain: Domain,
    ) -> Option<&mut DirectoryState<TechniqueFilter>> {
        match domain {
            Domain::Offensive => Some(&mut self.dir_offensive),
            Domain::Defensive => Some(&mut self.dir_defensive),
            Domain::Keeper => Some(&mut self.dir_keeper),
            Domain::Shots => Some(&mut self.dir_shots),
            _ => None,
        }
    }

    /// Number of rows in the current directory after filtering, before the
    /// pager window.
    pub fn filtered_len(&self) -> usize {
        match self.domain {
            Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => {
                let dir = self.technique_dir(self.domain).expect("technique dir");
                filter_techniques(self.technique_records(self.domain), &dir.filter).len()
            }
            Domain::Tokens => filter_tokens(&self.tokens, &self.dir_tokens.filter).len(),
            Domain::Feves => filter_feves(&self.feves, &self.dir_feves.filter).len(),
            Domain::Heroes => filter_heroes(&self.heroes, &self.dir_heroes.filter).len(),
            Domain::Players => filter_players(&self.players, &self.dir_players.filter).len(),
        }
    }

    pub fn visible_len(&self) -> usize {
        self.filtered_len().min(self.pager_visible())
    }

    fn pager_visible(&self) -> usize {
        match self.domain {
            Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => {
                self.technique_dir(self.domain).expect("technique dir").pager.visible
            }
            Domain::Tokens => self.dir_tokens.pager.visible,
            Domain::Feves => self.dir_feves.pager.visible,
            Domain::Heroes => self.dir_heroes.pager.visible,
            Domain::Players => self.dir_players.pager.visible,
        }
    }

    pub fn cursor(&self) -> usize {
        match self.domain {
            Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => {
                self.technique_dir(self.domain).expect("technique dir").cursor
            }
            Domain::Tokens => self.dir_tokens.cursor,
            Domain::Feves => self.dir_feves.cursor,
            Domain::Heroes => self.dir_heroes.cursor,
            Domain::Players => self.dir_players.cursor,
        }
    }

    fn set_cursor(&mut self, cursor: usize) {
        match self.domain {
            Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => {
                self.technique_dir_mut(self.domain).expect("technique dir").cursor = cursor;
            }
            Domain::Tokens => self.dir_tokens.cursor = cursor,
            Domain::Feves => self.dir_feves.cursor = cursor,
            Domain::Heroes => self.dir_heroes.cursor = cursor,
            Domain::Players => self.dir_players.cursor = cursor,
        }
    }

    pub fn select_next(&mut self) {
        let total = self.visible_len();
        if total == 0 {
            self.set_cursor(0);
            return;
        }
        self.set_cursor((self.cursor() + 1) % total);
    }

    pub fn select_prev(&mut self) {
        let total = self.visible_len();
        if total == 0 {
            self.set_cursor(0);
            return;
        }
        let cursor = self.cursor();
        self.set_cursor(if cursor == 0 { total - 1 } else { cursor - 1 });
    }

    pub fn clamp_cursor(&mut self) {
        let total = self.visible_len();
        if total == 0 {
            self.set_cursor(0);
        } else if self.cursor() >= total {
            self.set_cursor(total - 1);
        }
    }

    /// Id of the record under the cursor in the current filtered view.
    pub fn selected_id(&self) -> Option<String> {
        let cursor = self.cursor();
        match self.domain {
            Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => {
                let dir = self.technique_dir(self.domain)?;
                filter_techniques(self.technique_records(self.domain), &dir.filter)
                    .get(cursor)
                    .map(|t| t.id.clone())
            }
            Domain::Tokens => filter_tokens(&self.tokens, &self.dir_tokens.filter)
                .get(cursor)
                .map(|t| t.id.clone()),
            Domain::Feves => filter_feves(&self.feves, &self.dir_feves.filter)
                .get(cursor)
                .map(|f| f.id.clone()),
            Domain::Heroes => filter_heroes(&self.heroes, &self.dir_heroes.filter)
                .get(cursor)
                .map(|h| h.id.clone()),
            Domain::Players => filter_players(&self.players, &self.dir_players.filter)
                .get(cursor)
                .map(|p| p.id.clone()),
        }
    }

    pub fn focused_id(&self) -> Option<&str> {
        match self.domain {
            Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => {
                self.technique_dir(self.domain)?.focused.as_deref()
            }
            Domain::Tokens => self.dir_tokens.focused.as_deref(),
            Domain::Feves => self.dir_feves.focused.as_deref(),
            Domain::Heroes => self.dir_heroes.focused.as_deref(),
            Domain::Players => self.dir_players.focused.as_deref(),
        }
    }

    pub fn focus_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match self.domain {
            Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => {
                if let Some(dir) = self.technique_dir_mut(self.domain) {
                    dir.focus(id);
                }
            }
            Domain::Tokens => self.dir_tokens.focus(id),
            Domain::Feves => self.dir_feves.focus(id),
            Domain::Heroes => self.dir_heroes.focus(id),
            Domain::Players => self.dir_players.focus(id),
        }
    }

    pub fn clear_focus(&mut self) {
        match self.domain {
            Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => {
                if let Some(dir) = self.technique_dir_mut(self.domain) {
                    dir.clear_focus();
                }
            }
            Domain::Tokens => self.dir_tokens.clear_focus(),
            Domain::Feves => self.dir_feves.clear_focus(),
            Domain::Heroes => self.dir_heroes.clear_focus(),
            Domain::Players => self.dir_players.clear_focus(),
        }
    }

    pub fn show_more(&mut self) {
        match self.domain {
            Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => {
                if let Some(dir) = self.technique_dir_mut(self.domain) {
                    dir.show_more();
                }
            }
            Domain::Tokens => self.dir_tokens.show_more(),
            Domain::Feves => self.dir_feves.show_more(),
            Domain::Heroes => self.dir_heroes.show_more(),
            Domain::Players => self.dir_players.show_more(),
        }
    }

    pub fn query(&self) -> &str {
        match self.domain {
            Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => self
                .technique_dir(self.domain)
                .map(|dir| dir.filter.query.as_str())
                .unwrap_or(""),
            Domain::Tokens => &self.dir_tokens.filter.query,
            Domain::Feves => &self.dir_feves.filter.query,
            Domain::Heroes => &self.dir_heroes.filter.query,
            Domain::Players => &self.dir_players.filter.query,
        }
    }

    pub fn search_push(&mut self, ch: char) {
        self.edit_query(|query| query.push(ch));
    }

    pub fn search_pop(&mut self) {
        self.edit_query(|query| {
            query.pop();
        });
    }

    pub fn search_clear(&mut self) {
        self.edit_query(|query| query.clear());
    }

    fn edit_query(&mut self, edit: impl FnOnce(&mut String)) {
        match self.domain {
            Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => {
                if let Some(dir) = self.technique_dir_mut(self.domain) {
                    dir.edit_filter(|f| edit(&mut f.query));
                }
            }
            Domain::Tokens => self.dir_tokens.edit_filter(|f| edit(&mut f.query)),
            Domain::Feves => self.dir_feves.edit_filter(|f| edit(&mut f.query)),
            Domain::Heroes => self.dir_heroes.edit_filter(|f| edit(&mut f.query)),
            Domain::Players => self.dir_players.edit_filter(|f| edit(&mut f.query)),
        }
    }

    /// Cycle the main categorical filter: all -> first option -> ... -> all.
    pub fn cycle_primary_category(&mut self) {
        match self.domain {
            Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => {
                let options = unique_sorted(
                    self.technique_records(self.domain)
                        .iter()
                        .map(|t| t.element.clone()),
                );
                if let Some(dir) = self.technique_dir_mut(self.domain) {
                    dir.edit_filter(|f| f.element = cycle_option(f.element.take(), &options));
                }
            }
            Domain::Tokens => {
                let options = unique_sorted(self.tokens.iter().map(|t| t.color.clone()));
                self.dir_tokens
                    .edit_filter(|f| f.color = cycle_option(f.color.take(), &options));
            }
            Domain::Feves => {
                let options = unique_sorted(self.feves.iter().map(|f| f.color.clone()));
                self.dir_feves
                    .edit_filter(|f| f.color = cycle_option(f.color.take(), &options));
            }
            Domain::Heroes => {
                let options = unique_sorted(self.heroes.iter().map(|h| h.style.clone()));
                self.dir_heroes
                    .edit_filter(|f| f.style = cycle_option(f.style.take(), &options));
            }
            Domain::Players => {
                let options = unique_sorted(self.players.iter().map(|p| p.element.clone()));
                self.dir_players
                    .edit_filter(|f| f.element = cycle_option(f.element.take(), &options));
            }
        }
    }

    /// Cycle the secondary categorical filter where one exists (shot type,
    /// token location, hero color, player position).
    pub fn cycle_secondary_category(&mut self) {
        match self.domain {
            Domain::Shots => {
                let options = unique_sorted(
                    self.shots
                        .iter()
                        .filter_map(|t| t.shot_type.clone())
                        .filter(|s| s != crate::text::DASH),
                );
                self.dir_shots
                    .edit_filter(|f| f.shot_type = cycle_option(f.shot_type.take(), &options));
            }
            Domain::Tokens => {
                let options = unique_sorted(self.tokens.iter().map(|t| t.location.clone()));
                self.dir_tokens
                    .edit_filter(|f| f.location = cycle_option(f.location.take(), &options));
            }
            Domain::Heroes => {
                let options = unique_sorted(self.heroes.iter().map(|h| h.color.clone()));
                self.dir_heroes
                    .edit_filter(|f| f.color = cycle_option(f.color.take(), &options));
            }
            Domain::Players => {
                let options = unique_sorted(self.players.iter().map(|p| p.position.clone()));
                self.dir_players
                    .edit_filter(|f| f.position = cycle_option(f.position.take(), &options));
            }
            _ => {}
        }
    }

    /// Adjust the numeric minimum filter by `delta`, clamped at zero.
    pub fn adjust_min(&mut self, delta: f64) {
        match self.domain {
            Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => {
                if let Some(dir) = self.technique_dir_mut(self.domain) {
                    dir.edit_filter(|f| f.min_power = (f.min_power + delta).max(0.0));
                }
            }
            Domain::Players => {
                let key = self.player_min_focus;
                self.dir_players.edit_filter(|f| {
                    let current = key.get(&f.min_stats);
                    set_stat(&mut f.min_stats, key, (current + delta).max(0.0));
                });
            }
            _ => {}
        }
    }

    pub fn cycle_player_min_focus(&mut self) {
        let pos = StatKey::ALL
            .iter()
            .position(|k| *k == self.player_min_focus)
            .unwrap_or(0);
        self.player_min_focus = StatKey::ALL[(pos + 1) % StatKey::ALL.len()];
    }

    pub fn cycle_player_sort(&mut self) {
        self.dir_players.edit_filter(|f| f.sort = f.sort.next());
    }
}

fn cycle_option(current: Option<String>, options: &[String]) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    match current {
        None => Some(options[0].clone()),
        Some(value) => {
            let pos = options.iter().position(|opt| *opt == value);
            match pos {
                Some(pos) if pos + 1 < options.len() => Some(options[pos + 1].clone()),
                _ => None,
            }
        }
    }
}

fn set_stat(stats: &mut crate::players::StatBlock, key: StatKey, value: f64) {
    match key {
        StatKey::Kick => stats.kick = value,
        StatKey::Control => stats.control = value,
        StatKey::Guard => stats.guard = value,
        StatKey::Body => stats.body = value,
        StatKey::Speed => stats.speed = value,
        StatKey::Stamina => stats.stamina = value,
        StatKey::Catch => stats.catch = value,
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetTechniques { domain, records } => {
            match domain {
                Domain::Offensive => state.offensive = records,
                Domain::Defensive => state.defensive = records,
                Domain::Keeper => state.keeper = records,
                Domain::Shots => state.shots = records,
                _ => return,
            }
            mark_ready(state, domain);
        }
        Delta::SetTokens(records) => {
            state.tokens = records;
            mark_ready(state, Domain::Tokens);
        }
        Delta::SetFeves(records) => {
            state.feves = records;
            mark_ready(state, Domain::Feves);
        }
        Delta::SetHeroes(records) => {
            state.heroes = records;
            mark_ready(state, Domain::Heroes);
        }
        Delta::SetPlayers(records) => {
            state.players = records;
            state.thresholds = compute_thresholds(&state.players);
            mark_ready(state, Domain::Players);
        }
        Delta::FetchFailed { domain, error } => {
            state.load.insert(domain, LoadState::Failed(error));
        }
        Delta::Log(line) => state.push_log(line),
    }
    state.clamp_cursor();
}

fn mark_ready(state: &mut AppState, domain: Domain) {
    state.load.insert(domain, LoadState::Ready);
    state.fetched_at.insert(domain, SystemTime::now());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::players::StatBlock;

    fn seeded_state() -> AppState {
        let mut state = AppState::new();
        let players = vec![
            PlayerStat {
                id: "a-0".to_string(),
                name: "Axel".to_string(),
                image: None,
                position: "FW".to_string(),
                element: "Fire".to_string(),
                stats: StatBlock { kick: 90.0, ..StatBlock::default() },
            },
            PlayerStat {
                id: "b-1".to_string(),
                name: "Mark".to_string(),
                image: None,
                position: "GK".to_string(),
                element: "Mountain".to_string(),
                stats: StatBlock { kick: 40.0, ..StatBlock::default() },
            },
        ];
        apply_delta(&mut state, Delta::SetPlayers(players));
        state.domain = Domain::Players;
        state
    }

    #[test]
    fn record_set_replacement_recomputes_thresholds() {
        let state = seeded_state();
        assert_eq!(state.load.get(&Domain::Players), Some(&LoadState::Ready));
        assert_ne!(state.thresholds.cuts(StatKey::Kick), [0.0; 4]);
    }

    #[test]
    fn fetch_failure_keeps_previous_records() {
        let mut state = seeded_state();
        apply_delta(
            &mut state,
            Delta::FetchFailed { domain: Domain::Players, error: "http 500".to_string() },
        );
        assert_eq!(state.players.len(), 2);
        assert!(matches!(
            state.load.get(&Domain::Players),
            Some(LoadState::Failed(_))
        ));
    }

    #[test]
    fn search_edit_resets_pager_and_cursor() {
        let mut state = seeded_state();
        state.dir_players.show_more();
        state.select_next();
        state.search_push('a');
        assert_eq!(state.dir_players.pager.visible, 80);
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.query(), "a");
    }

    #[test]
    fn category_cycle_walks_options_and_returns_to_all() {
        let mut state = seeded_state();
        assert!(state.dir_players.filter.element.is_none());
        state.cycle_primary_category();
        assert_eq!(state.dir_players.filter.element.as_deref(), Some("Fire"));
        state.cycle_primary_category();
        assert_eq!(state.dir_players.filter.element.as_deref(), Some("Mountain"));
        state.cycle_primary_category();
        assert!(state.dir_players.filter.element.is_none());
    }

    #[test]
    fn focus_survives_filter_changes() {
        let mut state = seeded_state();
        state.focus_selected();
        assert!(state.focused_id().is_some());
        state.search_push('x');
        assert!(state.focused_id().is_some());
        state.clear_focus();
        assert!(state.focused_id().is_none());
    }

    #[test]
    fn selection_wraps_within_visible_rows() {
        let mut state = seeded_state();
        assert_eq!(state.cursor(), 0);
        state.select_next();
        assert_eq!(state.cursor(), 1);
        state.select_next();
        assert_eq!(state.cursor(), 0);
        state.select_prev();
        assert_eq!(state.cursor(), 1);
    }

    #[test]
    fn min_stat_filter_targets_the_focused_stat() {
        let mut state = seeded_state();
        state.adjust_min(50.0);
        assert_eq!(state.dir_players.filter.min_stats.kick, 50.0);
        assert_eq!(state.filtered_len(), 1);
        state.adjust_min(-80.0);
        assert_eq!(state.dir_players.filter.min_stats.kick, 0.0);
        assert_eq!(state.filtered_len(), 2);
    }

    #[test]
    fn logs_are_bounded() {
        let mut state = AppState::new();
        for i in 0..250 {
            state.push_log(format!("line {i}"));
        }
        assert_eq!(state.logs.len(), 200);
        assert_eq!(state.logs.front().map(String::as_str), Some("line 50"));
    }
}
