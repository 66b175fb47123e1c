use std::collections::HashSet;

use vroad_terminal::demo::seed_deltas;
use vroad_terminal::directory::{
    filter_heroes, filter_players, filter_techniques, HeroFilter, PlayerFilter, PlayerSort,
    TechniqueFilter,
};
use vroad_terminal::sheets::Domain;
use vroad_terminal::state::{apply_delta, AppState, Delta};
use vroad_terminal::thresholds::{classify, StatKey, Tier};

fn seeded_state() -> AppState {
    let mut state = AppState::new();
    for delta in seed_deltas() {
        apply_delta(&mut state, delta);
    }
    state
}

#[test]
fn ids_are_pairwise_unique_within_every_domain() {
    let state = seeded_state();
    for domain in [Domain::Offensive, Domain::Defensive, Domain::Keeper, Domain::Shots] {
        let ids: HashSet<&str> = state
            .technique_records(domain)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids.len(), state.technique_records(domain).len());
    }
    let ids: HashSet<&str> = state.players.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids.len(), state.players.len());
}

#[test]
fn technique_filters_compose_with_and_semantics() {
    let state = seeded_state();
    let records = state.technique_records(Domain::Offensive);

    let both = TechniqueFilter {
        element: Some("feu".to_string()),
        min_power: 110.0,
        ..TechniqueFilter::default()
    };
    let by_element = TechniqueFilter {
        element: Some("feu".to_string()),
        ..TechniqueFilter::default()
    };
    let by_power = TechniqueFilter { min_power: 110.0, ..TechniqueFilter::default() };

    let combined: HashSet<&str> = filter_techniques(records, &both)
        .iter()
        .map(|t| t.id.as_str())
        .collect();
    let element_ids: HashSet<&str> = filter_techniques(records, &by_element)
        .iter()
        .map(|t| t.id.as_str())
        .collect();
    let power_ids: HashSet<&str> = filter_techniques(records, &by_power)
        .iter()
        .map(|t| t.id.as_str())
        .collect();

    let intersection: HashSet<&str> = element_ids.intersection(&power_ids).copied().collect();
    assert_eq!(combined, intersection);
    assert!(!combined.is_empty());
}

#[test]
fn hero_query_searches_passive_text() {
    let state = seeded_state();
    let filter = HeroFilter { query: "tacle".to_string(), ..HeroFilter::default() };
    let hits = filter_heroes(&state.heroes, &filter);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Axel Blaze");
}

#[test]
fn hero_passives_are_deduplicated_and_terminated() {
    let state = seeded_state();
    for hero in &state.heroes {
        let unique: HashSet<&String> = hero.passives.iter().collect();
        assert_eq!(unique.len(), hero.passives.len());
        for passive in &hero.passives {
            assert!(
                passive.ends_with('.') || passive.ends_with('%') || passive.ends_with(')'),
                "unterminated passive: {passive:?}"
            );
        }
    }
}

#[test]
fn player_sort_by_each_stat_is_descending() {
    let state = seeded_state();
    for key in StatKey::ALL {
        let filter = PlayerFilter { sort: PlayerSort::Stat(key), ..PlayerFilter::default() };
        let sorted = filter_players(&state.players, &filter);
        for pair in sorted.windows(2) {
            assert!(key.get(&pair[0].stats) >= key.get(&pair[1].stats));
        }
    }
}

#[test]
fn thresholds_bucket_the_seeded_population() {
    let state = seeded_state();
    for key in StatKey::ALL {
        let cuts = state.thresholds.cuts(key);
        assert!(cuts[0] <= cuts[1] && cuts[1] <= cuts[2] && cuts[2] <= cuts[3]);
    }
    // The strongest kick in the seed population lands in the top band.
    let best = state
        .players
        .iter()
        .map(|p| p.stats.kick)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(
        classify(best, state.thresholds.cuts(StatKey::Kick)),
        Tier::Orange
    );
}

#[test]
fn pager_resets_only_on_filter_changes() {
    let mut state = seeded_state();
    state.domain = Domain::Heroes;
    state.show_more();
    assert_eq!(state.dir_heroes.pager.visible, 20);

    state.focus_selected();
    assert_eq!(state.dir_heroes.pager.visible, 20);

    state.cycle_primary_category();
    assert_eq!(state.dir_heroes.pager.visible, 10);
    assert!(state.focused_id().is_some());
}
