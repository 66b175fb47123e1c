//! Segmentation of hero passive descriptions.
//!
//! The hero sheet packs several passive abilities into one free-text cell,
//! usually without terminal punctuation between them. The only reliable
//! signal is the French discourse marker opening each ability ("Quand",
//! "Après", "Si", ...). This is a best-effort heuristic splitter, not a
//! grammar parser: a marker starting a word always opens a new sentence,
//! even when it is arguably embedded mid-clause. Behavior on ambiguous input
//! is pinned by the test table below; do not "fix" cases without updating it.

use crate::text::collapse_whitespace;

/// Connectives that open a new passive description. Matching is
/// case-insensitive and anchored at word boundaries.
const BOUNDARY_TERMS: &[&str] = &[
    "Quand",
    "Après",
    "Jusqu'",
    "En gagnant",
    "En perdant",
    "En cas",
    "Taux",
    "Si",
    "Au",
    "Lorsqu",
    "Avant",
];

/// Split one raw passive cell into discrete, punctuation-terminated
/// sentences. Duplicates are removed, first occurrence order is kept.
pub fn split_passives(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    let collapsed = collapse_whitespace(raw);
    let with_boundaries = insert_marker_boundaries(&collapsed);

    let mut seen: Vec<String> = Vec::new();
    for segment in split_on_periods(&with_boundaries) {
        for part in split_at_markers(&segment) {
            let cleaned = clean_sentence(&part);
            if cleaned.is_empty() {
                continue;
            }
            let terminated = ensure_terminated(cleaned);
            if !seen.iter().any(|s| s == &terminated) {
                seen.push(terminated);
            }
        }
    }
    seen
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric()
}

/// Case-insensitive match of `term` at byte position `pos`, anchored at a
/// word boundary after the term ("Au" must not match inside "Aucun", while
/// "Jusqu'" must be followed by a letter).
fn term_matches_at(text: &str, pos: usize, term: &str) -> bool {
    let mut rest = text[pos..].chars();
    for expected in term.chars() {
        match rest.next() {
            Some(ch) if ch.to_lowercase().eq(expected.to_lowercase()) => {}
            _ => return false,
        }
    }
    let last_is_word = term.chars().next_back().map(is_word_char).unwrap_or(false);
    match (last_is_word, rest.next()) {
        (true, Some(next)) => !is_word_char(next),
        (true, None) => true,
        (false, Some(next)) => is_word_char(next),
        (false, None) => false,
    }
}

fn boundary_term_at(text: &str, pos: usize) -> bool {
    BOUNDARY_TERMS.iter().any(|term| term_matches_at(text, pos, term))
}

/// Write an explicit sentence end before every boundary marker that is not
/// already preceded by terminal punctuation. Input arrives with whitespace
/// collapsed, so every separator is a single space.
fn insert_marker_boundaries(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut prev: Option<char> = None;
    for (i, ch) in text.char_indices() {
        if ch == ' ' {
            let prev_ok = prev.map(|p| p != '.' && p != ';').unwrap_or(false);
            if prev_ok && boundary_term_at(text, i + 1) {
                out.push_str(". ");
                prev = Some(' ');
                continue;
            }
        }
        out.push(ch);
        prev = Some(ch);
    }
    out
}

/// Split on real sentence periods: a `.` with a digit on either side is a
/// decimal separator (or an abbreviation like "1.5%") and stays put.
fn split_on_periods(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut parts = Vec::new();
    let mut start = 0;
    for (k, &(i, ch)) in chars.iter().enumerate() {
        if ch != '.' {
            continue;
        }
        let prev_digit = k > 0 && chars[k - 1].1.is_ascii_digit();
        let next_digit = chars
            .get(k + 1)
            .map(|&(_, c)| c.is_ascii_digit())
            .unwrap_or(false);
        if !prev_digit && !next_digit {
            parts.push(text[start..i].to_string());
            start = i + 1;
        }
    }
    parts.push(text[start..].to_string());
    parts
}

/// Second pass inside a coarse segment: cut right before every remaining
/// marker, whatever precedes it.
fn split_at_markers(segment: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, ch) in segment.char_indices() {
        if ch == ' ' && i + 1 < segment.len() && boundary_term_at(segment, i + 1) {
            parts.push(segment[start..i].to_string());
            start = i + 1;
        }
    }
    parts.push(segment[start..].to_string());
    parts
}

fn clean_sentence(part: &str) -> String {
    let trimmed = part.trim();
    let trimmed = trimmed
        .strip_prefix('•')
        .or_else(|| trimmed.strip_prefix('-'))
        .unwrap_or(trimmed);
    collapse_whitespace(trimmed)
}

fn ensure_terminated(sentence: String) -> String {
    if sentence.ends_with(['.', '%', ')']) {
        sentence
    } else {
        format!("{sentence}.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // (input, expected output) — known-good cases plus pinned ambiguous ones.
    const TABLE: &[(&str, &[&str])] = &[
        // Two abilities already separated by a real period.
        (
            "Quand le joueur tire Gagne 10% ATT. Après un tacle réussi Récupère 5 PV.",
            &[
                "Quand le joueur tire Gagne 10% ATT.",
                "Après un tacle réussi Récupère 5 PV.",
            ],
        ),
        // Same two abilities with no punctuation at all: the marker carries
        // the split.
        (
            "Quand le joueur tire Gagne 10% ATT Après un tacle réussi Récupère 5 PV",
            &[
                "Quand le joueur tire Gagne 10% ATT.",
                "Après un tacle réussi Récupère 5 PV.",
            ],
        ),
        // Decimal periods never split.
        (
            "Gagne 1.5% ATT Quand le duel est gagné",
            &["Gagne 1.5% ATT.", "Quand le duel est gagné."],
        ),
        // Leading bullet, messy whitespace.
        (
            "•  Si le tir   est cadré  Gagne 8 PV",
            &["Si le tir est cadré Gagne 8 PV."],
        ),
        // "%"- and ")"-terminated sentences keep their ending.
        (
            "Lorsqu'un but est marqué gagne 12% Quand le match commence (une fois)",
            &[
                "Lorsqu'un but est marqué gagne 12%",
                "Quand le match commence (une fois)",
            ],
        ),
        // Duplicate abilities collapse to one, order of first occurrence.
        (
            "Si possession gagne 5 ATT. Après un arrêt gagne 3 DEF. Si possession gagne 5 ATT.",
            &["Si possession gagne 5 ATT.", "Après un arrêt gagne 3 DEF."],
        ),
        // Markers embedded inside other words stay put ("Aucun" is not "Au",
        // "Sinon" is not "Si").
        (
            "Aucun effet Sinon gagne 2 PV",
            &["Aucun effet Sinon gagne 2 PV."],
        ),
        // Pinned ambiguous case: a marker opening a word mid-clause still
        // splits, matching the sheet-facing behavior.
        (
            "Le bonus Taux de critique augmente de 10%",
            &["Le bonus.", "Taux de critique augmente de 10%"],
        ),
        // Elided markers bind to the following word.
        (
            "Gagne 4 DEF Jusqu'à la mi-temps",
            &["Gagne 4 DEF.", "Jusqu'à la mi-temps."],
        ),
        ("", &[]),
        ("   ", &[]),
    ];

    #[test]
    fn table_driven_segmentation() {
        for (input, expected) in TABLE {
            let got = split_passives(input);
            assert_eq!(&got, expected, "input: {input:?}");
        }
    }

    #[test]
    fn segmentation_is_idempotent_on_its_own_output() {
        for (input, _) in TABLE {
            let first = split_passives(input);
            let rejoined = first.join(" ");
            let second = split_passives(&rejoined);
            assert_eq!(first, second, "input: {input:?}");
        }
    }

    #[test]
    fn semicolon_skips_the_period_but_the_marker_still_splits() {
        let got = split_passives("Gagne 3 ATT; Quand le match commence");
        assert_eq!(got, vec!["Gagne 3 ATT;.", "Quand le match commence."]);
    }

    #[test]
    fn case_insensitive_markers() {
        let got = split_passives("Gagne 2 PV quand le ballon est perdu");
        assert_eq!(got, vec!["Gagne 2 PV.", "quand le ballon est perdu."]);
    }
}
