//! Country name normalization.
//!
//! The Census API publishes names in upper case ("KOREA, SOUTH"); the tariff
//! catalog uses everyday spellings ("South Korea"). Joining the two relies on
//! exact string equality, so every trade-side name passes through [`normalize`].

/// Renames applied after title-casing. Identity entries are kept on purpose
/// so the table documents which catalog names were checked against the source.
const NAME_FIXES: &[(&str, &str)] = &[
    ("Korea, South", "South Korea"),
    ("United Kingdom", "United Kingdom"),
    ("China", "China"),
    ("Russian Federation", "Russia"),
    ("Vietnam", "Vietnam"),
    ("Germany", "Germany"),
];

/// Title-case `raw` and apply the fixed rename table.
pub fn normalize(raw: &str) -> String {
    let titled = title_case(raw.trim());
    match NAME_FIXES.iter().find(|(from, _)| *from == titled) {
        Some((_, to)) => (*to).to_string(),
        None => titled,
    }
}

/// Upper-case the first letter of every word and lower-case the rest.
///
/// A word starts at any letter that follows a non-letter, so "COTE D'IVOIRE"
/// becomes "Cote D'Ivoire" and "GUINEA-BISSAU" becomes "Guinea-Bissau".
/// Letters whose case mapping expands ("ß" upper-cases to "SS") are cased
/// character by character, so "ßAARLAND" becomes "Ssaarland".
pub fn title_case(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        push_cased(&mut output, ch, 0);
    }
    output
}

/// Bound on nested case expansions; real mappings settle after one or two.
const MAX_CASE_DEPTH: u8 = 4;

/// Append `ch` cased for its position. The word state comes from the last
/// character written, so every character in `output` is already in the form
/// a second pass would give it.
fn push_cased(output: &mut String, ch: char, depth: u8) {
    if !ch.is_alphabetic() || depth == MAX_CASE_DEPTH {
        output.push(ch);
        return;
    }

    let in_word = output.chars().next_back().is_some_and(char::is_alphabetic);
    let mapped: Vec<char> = if in_word {
        ch.to_lowercase().collect()
    } else {
        ch.to_uppercase().collect()
    };

    if mapped == [ch] {
        output.push(ch);
    } else {
        for cased in mapped {
            push_cased(output, cased, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn remaps_known_census_names() {
        assert_eq!(normalize("RUSSIAN FEDERATION"), "Russia");
        assert_eq!(normalize("KOREA, SOUTH"), "South Korea");
    }

    #[test]
    fn title_cases_names_without_fixes() {
        assert_eq!(normalize("FRANCE"), "France");
        assert_eq!(normalize("UNITED KINGDOM"), "United Kingdom");
        assert_eq!(normalize("BOSNIA AND HERZEGOVINA"), "Bosnia And Herzegovina");
    }

    #[test]
    fn title_case_restarts_after_punctuation() {
        assert_eq!(title_case("COTE D'IVOIRE"), "Cote D'Ivoire");
        assert_eq!(title_case("GUINEA-BISSAU"), "Guinea-Bissau");
        assert_eq!(title_case("CONGO (BRAZZAVILLE)"), "Congo (Brazzaville)");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "RUSSIAN FEDERATION",
            "KOREA, SOUTH",
            "FRANCE",
            "COTE D'IVOIRE",
            "south korea",
            "  VIETNAM ",
            "TOTAL FOR ALL COUNTRIES",
            "ßAARLAND",
        ];
        for raw in samples {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn expanding_case_mappings_keep_one_capital() {
        assert_eq!(title_case("ßAARLAND"), "Ssaarland");
        assert_eq!(title_case("ﬁJI"), "Fiji");
        assert_eq!(title_case("STRAßE"), "Straße");
    }

    #[test]
    fn fix_targets_are_stable_under_normalize() {
        for (_, to) in NAME_FIXES {
            assert_eq!(normalize(to), *to);
        }
    }

    #[test]
    fn identity_fixes_pass_through() {
        assert_eq!(normalize("GERMANY"), "Germany");
        assert_eq!(normalize("CHINA"), "China");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent_for_any_input(raw in any::<String>()) {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn normalize_is_idempotent_for_census_style_names(raw in "[A-Za-z ,.'()-]{0,40}") {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
