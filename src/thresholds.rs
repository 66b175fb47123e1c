use ratatui::style::Color;

use crate::players::{PlayerStat, StatBlock};

/// Closed enumeration of the tracked numeric stats. Sorting, minimum filters
/// and threshold buckets all go through these typed accessors instead of
/// stringly-typed field lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKey {
    Kick,
    Control,
    Guard,
    Body,
    Speed,
    Stamina,
    Catch,
}

impl StatKey {
    pub const ALL: [StatKey; 7] = [
        StatKey::Kick,
        StatKey::Control,
        StatKey::Guard,
        StatKey::Body,
        StatKey::Speed,
        StatKey::Stamina,
        StatKey::Catch,
    ];

    pub fn get(self, stats: &StatBlock) -> f64 {
        match self {
            StatKey::Kick => stats.kick,
            StatKey::Control => stats.control,
            StatKey::Guard => stats.guard,
            StatKey::Body => stats.body,
            StatKey::Speed => stats.speed,
            StatKey::Stamina => stats.stamina,
            StatKey::Catch => stats.catch,
        }
    }

    /// Display label, matching the in-game stat names.
    pub fn label(self) -> &'static str {
        match self {
            StatKey::Kick => "Frappe",
            StatKey::Control => "Contrôle",
            StatKey::Guard => "Pression",
            StatKey::Body => "Physique",
            StatKey::Speed => "Agilité",
            StatKey::Stamina => "Intelligence",
            StatKey::Catch => "Technique",
        }
    }

    fn ordinal(self) -> usize {
        Self::ALL.iter().position(|key| *key == self).unwrap_or(0)
    }
}

/// Percentile cut values per stat, computed over one full population
/// snapshot and replaced wholesale on every refresh. Cuts are ascending:
/// cut[0] ≤ cut[1] ≤ cut[2] ≤ cut[3].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatThresholds {
    cuts: [[f64; 4]; 7],
}

impl StatThresholds {
    pub fn cuts(&self, key: StatKey) -> [f64; 4] {
        self.cuts[key.ordinal()]
    }
}

/// Five population bands, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Green,
    Blue,
    Violet,
    Yellow,
    Orange,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::Green => "Vert",
            Tier::Blue => "Bleu",
            Tier::Violet => "Violet",
            Tier::Yellow => "Jaune",
            Tier::Orange => "Orange",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Tier::Green => Color::Green,
            Tier::Blue => Color::Blue,
            Tier::Violet => Color::Magenta,
            Tier::Yellow => Color::Yellow,
            Tier::Orange => Color::LightRed,
        }
    }
}

/// Nearest-rank percentile cuts at the 31st, 51st, 71st and 86th percentiles
/// (`sorted[floor(n * p)]`). A stat with no samples yields the degenerate
/// all-zero tuple.
pub fn compute_thresholds(players: &[PlayerStat]) -> StatThresholds {
    let mut thresholds = StatThresholds::default();

    for key in StatKey::ALL {
        let mut values: Vec<f64> = players.iter().map(|p| key.get(&p.stats)).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        if values.is_empty() {
            continue;
        }
        let n = values.len();
        let cut = |p: f64| values[((n as f64 * p).floor() as usize).min(n - 1)];
        thresholds.cuts[key.ordinal()] = [cut(0.31), cut(0.51), cut(0.71), cut(0.86)];
    }

    thresholds
}

/// Bucket one value against one stat's cuts. Boundary values belong to the
/// upper band; the degenerate all-zero tuple puts everything in the lowest
/// band.
pub fn classify(value: f64, cuts: [f64; 4]) -> Tier {
    if cuts == [0.0; 4] {
        return Tier::Green;
    }
    if value < cuts[0] {
        Tier::Green
    } else if value < cuts[1] {
        Tier::Blue
    } else if value < cuts[2] {
        Tier::Violet
    } else if value < cuts[3] {
        Tier::Yellow
    } else {
        Tier::Orange
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::players::PlayerStat;

    fn player(kick: f64) -> PlayerStat {
        PlayerStat {
            id: format!("p-{kick}"),
            name: format!("P{kick}"),
            image: None,
            position: "FW".to_string(),
            element: "Fire".to_string(),
            stats: StatBlock { kick, ..StatBlock::default() },
        }
    }

    #[test]
    fn empty_population_yields_zero_cuts_and_lowest_tier() {
        let thresholds = compute_thresholds(&[]);
        for key in StatKey::ALL {
            assert_eq!(thresholds.cuts(key), [0.0; 4]);
            assert_eq!(classify(120.0, thresholds.cuts(key)), Tier::Green);
        }
    }

    #[test]
    fn cuts_are_non_decreasing() {
        let players: Vec<PlayerStat> = (0..40).map(|i| player(i as f64 * 3.0)).collect();
        let thresholds = compute_thresholds(&players);
        for key in StatKey::ALL {
            let cuts = thresholds.cuts(key);
            assert!(cuts[0] <= cuts[1]);
            assert!(cuts[1] <= cuts[2]);
            assert!(cuts[2] <= cuts[3]);
        }
    }

    #[test]
    fn nearest_rank_indices_match() {
        // 100 players with kick 0..=99: cuts land on indices 31/51/71/86.
        let players: Vec<PlayerStat> = (0..100).map(|i| player(i as f64)).collect();
        let thresholds = compute_thresholds(&players);
        assert_eq!(thresholds.cuts(StatKey::Kick), [31.0, 51.0, 71.0, 86.0]);
    }

    #[test]
    fn boundary_values_take_the_upper_band() {
        let cuts = [31.0, 51.0, 71.0, 86.0];
        assert_eq!(classify(30.9, cuts), Tier::Green);
        assert_eq!(classify(31.0, cuts), Tier::Blue);
        assert_eq!(classify(70.0, cuts), Tier::Violet);
        assert_eq!(classify(71.0, cuts), Tier::Yellow);
        assert_eq!(classify(86.0, cuts), Tier::Orange);
        assert_eq!(classify(200.0, cuts), Tier::Orange);
    }

    #[test]
    fn single_sample_population_is_its_own_cut() {
        let thresholds = compute_thresholds(&[player(50.0)]);
        assert_eq!(thresholds.cuts(StatKey::Kick), [50.0; 4]);
        // 50 is at/above the fourth cut.
        assert_eq!(classify(50.0, thresholds.cuts(StatKey::Kick)), Tier::Orange);
        assert_eq!(classify(49.0, thresholds.cuts(StatKey::Kick)), Tier::Green);
    }
}
