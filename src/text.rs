//! Small string helpers shared by every normalizer. The community sheets mix
//! accents, stray whitespace and comma decimals freely, so everything funnels
//! through here before comparisons or numeric coercion.

/// Placeholder glyph for empty free-text fields.
pub const DASH: &str = "—";
/// Sentinel for missing classification fields, displayed as-is.
pub const UNKNOWN: &str = "Inconnu";

/// Replace the accented characters seen in the sheets with their bare ASCII
/// letter. Anything unmapped passes through untouched.
pub fn fold_diacritics(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            'à' | 'â' | 'ä' | 'á' | 'ã' => out.push('a'),
            'À' | 'Â' | 'Ä' | 'Á' | 'Ã' => out.push('A'),
            'é' | 'è' | 'ê' | 'ë' => out.push('e'),
            'É' | 'È' | 'Ê' | 'Ë' => out.push('E'),
            'î' | 'ï' | 'í' => out.push('i'),
            'Î' | 'Ï' | 'Í' => out.push('I'),
            'ô' | 'ö' | 'ó' | 'õ' => out.push('o'),
            'Ô' | 'Ö' | 'Ó' | 'Õ' => out.push('O'),
            'ù' | 'û' | 'ü' | 'ú' => out.push('u'),
            'Ù' | 'Û' | 'Ü' | 'Ú' => out.push('U'),
            'ç' => out.push('c'),
            'Ç' => out.push('C'),
            'ñ' => out.push('n'),
            'Ñ' => out.push('N'),
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("OE"),
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("AE"),
            other => out.push(other),
        }
    }
    out
}

/// Canonical form for header labels and vocabulary lookups: accents folded,
/// lowercased, trimmed.
pub fn normalize_label(value: &str) -> String {
    fold_diacritics(value).to_lowercase().trim().to_string()
}

/// Lowercased, accent-folded slug with runs of non-alphanumerics collapsed to
/// single dashes. May be empty when the input has no alphanumerics at all.
pub fn slugify(value: &str) -> String {
    let folded = fold_diacritics(value).to_lowercase();
    let mut out = String::with_capacity(folded.len());
    for ch in folded.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

/// Record id: slug of the primary name suffixed with the row ordinal, so two
/// rows sharing a name still get distinct ids. `stem` fills in for names that
/// slug down to nothing.
pub fn build_id(label: &str, index: usize, stem: &str) -> String {
    let slug = slugify(label);
    if slug.is_empty() {
        format!("{stem}-{index}")
    } else {
        format!("{slug}-{index}")
    }
}

/// Loose numeric coercion: accepts comma decimal separators, maps anything
/// unparsable or non-finite to 0. Never fails.
pub fn to_number(raw: &str) -> f64 {
    let cleaned = raw.trim().replace(',', ".");
    if cleaned.is_empty() {
        return 0.0;
    }
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => 0.0,
    }
}

/// Empty text becomes the given placeholder; cells reach this already trimmed.
pub fn text_or(raw: &str, placeholder: &str) -> String {
    if raw.trim().is_empty() {
        placeholder.to_string()
    } else {
        raw.to_string()
    }
}

/// First letter uppercased, the rest lowercased.
pub fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_french_accents() {
        assert_eq!(fold_diacritics("Éclair Rapide"), "Eclair Rapide");
        assert_eq!(normalize_label("  FRANÇAIS "), "francais");
    }

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(slugify("Éclair  Rapide!"), "eclair-rapide");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn id_uses_stem_when_slug_empty() {
        assert_eq!(build_id("Tir du Dragon", 4, "technique"), "tir-du-dragon-4");
        assert_eq!(build_id("???", 7, "technique"), "technique-7");
    }

    #[test]
    fn numbers_accept_comma_decimals() {
        assert_eq!(to_number("85"), 85.0);
        assert_eq!(to_number("12,5"), 12.5);
        assert_eq!(to_number(""), 0.0);
        assert_eq!(to_number("n/a"), 0.0);
        assert_eq!(to_number("-3"), 0.0);
    }

    #[test]
    fn capitalize_lowercases_tail() {
        assert_eq!(capitalize("bRUTALE"), "Brutale");
        assert_eq!(capitalize(""), "");
    }
}
