use super::model::CellValue;

// ---------------------------------------------------------------------------
// Month labels
// ---------------------------------------------------------------------------

/// Display labels (heatmap rows), index 0 = January.
pub const LABELS_FR: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Juin", "Juil", "Aoû", "Sept", "Oct", "Nov", "Déc",
];

/// Accent-free labels used to build the full `"MM - Label"` axis labels.
pub const LABELS_ASCII: [&str; 12] = [
    "Jan", "Fev", "Mars", "Avr", "Mai", "Juin", "Juil", "Aout", "Sept", "Oct", "Nov", "Dec",
];

/// The fixed month axis shared by every month-keyed table.
pub const MONTHS: std::ops::RangeInclusive<u32> = 1..=12;

/// Three-letter prefixes of French month names.
///
/// `jun` maps to June and `jui` to July, so a bare "Juin" resolves to July.
/// Numeric-prefixed labels (`"06 - Juin"`) never reach this lookup.
const ABBREVIATIONS: [(&str, u32); 15] = [
    ("jan", 1),
    ("fév", 2),
    ("fev", 2),
    ("mar", 3),
    ("avr", 4),
    ("mai", 5),
    ("jun", 6),
    ("jui", 7),
    ("aoû", 8),
    ("aou", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("déc", 12),
    ("dec", 12),
];

// ---------------------------------------------------------------------------
// Month resolution
// ---------------------------------------------------------------------------

/// Resolve a long-form month cell (`"03 - Mars"`, `"Février"`, `7`, …).
///
/// A leading run of one or two digits wins and is returned without range
/// checking; month-keyed tables reindex on 1..=12 and drop anything else.
/// Otherwise the first three lower-cased characters are looked up in the
/// abbreviation table. Returns `None` when nothing matches.
pub fn resolve_month(value: &CellValue) -> Option<u32> {
    match value {
        CellValue::Null => None,
        other => resolve_month_str(&other.to_string()),
    }
}

pub fn resolve_month_str(raw: &str) -> Option<u32> {
    let s = raw.trim();

    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).take(2).collect();
    if !digits.is_empty() {
        return digits.parse().ok();
    }

    let prefix: String = s.to_lowercase().chars().take(3).collect();
    ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| *abbr == prefix)
        .map(|(_, month)| *month)
}

/// Numeric coercion of a purely numeric month cell. Whole floats and numeric
/// text are accepted; anything else is unresolved.
pub fn coerce_month(value: &CellValue) -> Option<u32> {
    let n = match value {
        CellValue::String(s) => s.trim().parse::<f64>().ok()?,
        other => other.as_f64()?,
    };
    if n.is_finite() && n.fract() == 0.0 && n >= 0.0 && n <= u32::MAX as f64 {
        Some(n as u32)
    } else {
        None
    }
}

/// `"03 - Mars"` for a month in 1..=12, empty for anything else.
pub fn full_label(month: Option<u32>) -> String {
    match month {
        Some(m) if MONTHS.contains(&m) => format!("{m:02} - {}", LABELS_ASCII[(m - 1) as usize]),
        _ => String::new(),
    }
}

/// The 12 full labels in month order.
pub fn axis_labels() -> Vec<String> {
    MONTHS.map(|m| full_label(Some(m))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_digits_are_returned_as_is() {
        assert_eq!(resolve_month_str("3"), Some(3));
        assert_eq!(resolve_month_str("  11 - Nov  "), Some(11));
        assert_eq!(resolve_month_str("07-Juillet"), Some(7));
        // Only the first two digits are taken and no range check is applied.
        assert_eq!(resolve_month_str("13"), Some(13));
        assert_eq!(resolve_month_str("123"), Some(12));
    }

    #[test]
    fn numeric_cells_resolve_through_their_text() {
        assert_eq!(resolve_month(&CellValue::Integer(4)), Some(4));
        assert_eq!(resolve_month(&CellValue::Float(9.0)), Some(9));
        assert_eq!(resolve_month(&CellValue::String(" 5 ".into())), Some(5));
    }

    #[test]
    fn french_names_with_and_without_accents() {
        let cases = [
            ("Janvier", 1),
            ("Février", 2),
            ("fevrier", 2),
            ("MARS", 3),
            ("Avril", 4),
            ("mai", 5),
            ("Juillet", 7),
            ("Août", 8),
            ("aout", 8),
            ("Septembre", 9),
            ("Octobre", 10),
            ("Novembre", 11),
            ("Décembre", 12),
            ("decembre", 12),
        ];
        for (name, expected) in cases {
            assert_eq!(resolve_month_str(name), Some(expected), "{name}");
        }
    }

    #[test]
    fn juin_resolves_to_july_through_the_prefix_table() {
        assert_eq!(resolve_month_str("Juin"), Some(7));
        assert_eq!(resolve_month_str("jun"), Some(6));
    }

    #[test]
    fn only_the_three_letter_prefix_matters() {
        assert_eq!(resolve_month_str("January"), Some(1));
        assert_eq!(resolve_month_str("Decembre"), Some(12));
        assert_eq!(resolve_month_str(" Fév "), Some(2));
        assert_eq!(resolve_month_str("AOÛT"), Some(8));
        assert_eq!(resolve_month_str("DÉCEMBRE"), Some(12));
    }

    #[test]
    fn unresolvable_values() {
        assert_eq!(resolve_month(&CellValue::Null), None);
        assert_eq!(resolve_month_str(""), None);
        assert_eq!(resolve_month_str("   "), None);
        assert_eq!(resolve_month_str("Foo"), None);
        assert_eq!(resolve_month_str("xyz"), None);
        assert_eq!(resolve_month_str("xx"), None);
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(coerce_month(&CellValue::Integer(2)), Some(2));
        assert_eq!(coerce_month(&CellValue::Float(12.0)), Some(12));
        assert_eq!(coerce_month(&CellValue::String("6".into())), Some(6));
        assert_eq!(coerce_month(&CellValue::Float(2.5)), None);
        assert_eq!(coerce_month(&CellValue::String("Mars".into())), None);
        assert_eq!(coerce_month(&CellValue::Null), None);
    }

    #[test]
    fn labels() {
        assert_eq!(full_label(Some(3)), "03 - Mars");
        assert_eq!(full_label(Some(12)), "12 - Dec");
        assert_eq!(full_label(Some(13)), "");
        assert_eq!(full_label(None), "");
        let axis = axis_labels();
        assert_eq!(axis.len(), 12);
        assert_eq!(axis[7], "08 - Aout");
    }
}
