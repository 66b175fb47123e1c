use crate::text::normalize_label;

/// One semantic field of a domain schema: the keywords that identify its
/// header label, plus the position assumed when no label matches. Keywords
/// are written pre-normalized (lowercase, accents folded).
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub field: &'static str,
    pub keywords: &'static [&'static str],
    pub fallback: usize,
}

/// Result of resolving a schema against one header row. Resolution is total:
/// every field gets an index, by keyword match or by fallback. The fields
/// that fell back are kept so the fetch layer can log the decision instead of
/// failing silently.
#[derive(Debug, Clone)]
pub struct ResolvedColumns {
    indexes: Vec<(&'static str, usize)>,
    fallback_fields: Vec<&'static str>,
}

impl ResolvedColumns {
    pub fn index(&self, field: &'static str) -> usize {
        self.indexes
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, idx)| *idx)
            .unwrap_or(0)
    }

    pub fn fallback_fields(&self) -> &[&'static str] {
        &self.fallback_fields
    }

    /// One console-ready warning naming every field that used its fallback
    /// position, or `None` when all headers matched.
    pub fn fallback_note(&self, domain: &str) -> Option<String> {
        if self.fallback_fields.is_empty() {
            return None;
        }
        Some(format!(
            "[WARN] {domain}: header match failed, positional fallback for {}",
            self.fallback_fields.join(", ")
        ))
    }
}

/// Scan the header labels left to right for the first one containing any of
/// the field's keywords (case- and accent-insensitive). The sheets are
/// community-edited, so headers drift; a miss silently uses the fixed
/// fallback position rather than dropping the field.
pub fn resolve_columns(labels: &[String], schema: &[ColumnSpec]) -> ResolvedColumns {
    let normalized: Vec<String> = labels.iter().map(|label| normalize_label(label)).collect();

    let mut indexes = Vec::with_capacity(schema.len());
    let mut fallback_fields = Vec::new();

    for spec in schema {
        let found = normalized.iter().position(|label| {
            !label.is_empty() && spec.keywords.iter().any(|kw| label.contains(kw))
        });
        match found {
            Some(idx) => indexes.push((spec.field, idx)),
            None => {
                indexes.push((spec.field, spec.fallback));
                fallback_fields.push(spec.field);
            }
        }
    }

    ResolvedColumns {
        indexes,
        fallback_fields,
    }
}
