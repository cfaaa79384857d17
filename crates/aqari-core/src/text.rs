//! Message and keyword normalization plus token extraction.
//!
//! Every string that is compared against the knowledge base goes through
//! [`normalize`] exactly once — keywords at load time, messages at request
//! time — so the two sides always agree on casing and whitespace.

/// Normalize a message or keyword: trim, lowercase, turn non-breaking
/// spaces into plain spaces, and collapse internal whitespace runs.
pub fn normalize(input: &str) -> String {
    input
        .replace('\u{a0}', " ")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Length of a property reference number.
pub const REFERENCE_LEN: usize = 7;

/// Returns the reference number iff the whole message is exactly one
/// 7-digit numeral (after normalization). Messages that merely *contain*
/// a reference somewhere do not qualify.
pub fn extract_reference(input: &str) -> Option<String> {
    let norm = normalize(input);
    if norm.len() == REFERENCE_LEN && norm.bytes().all(|b| b.is_ascii_digit()) {
        Some(norm)
    } else {
        None
    }
}

/// All bounded 7-digit tokens in a text, in order of appearance.
///
/// Used to derive an ambiguity menu's valid reference set from its own
/// reply text, where options are listed as "1008123 - Tower A Marina".
pub fn references_in(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let left_ok = start == 0 || !chars[start - 1].is_alphanumeric();
            let right_ok = i == chars.len() || !chars[i].is_alphanumeric();
            if i - start == REFERENCE_LEN && left_ok && right_ok {
                out.push(chars[start..i].iter().collect());
            }
        } else {
            i += 1;
        }
    }
    out
}

/// Unit suffixes accepted after a bedroom count.
const BEDROOM_SUFFIXES: &[&str] = &["br", "b/r", "bed", "beds", "bedroom", "bedrooms", "bhk"];

/// Spelled-out counts mapped to digits before scanning.
const NUMBER_WORDS: &[(&str, &str)] = &[
    ("one", "1"),
    ("two", "2"),
    ("three", "3"),
    ("four", "4"),
    ("five", "5"),
];

/// Extract a canonical bedroom type from free text.
///
/// Returns `"studio"` or `"1"`..`"5"`. Accepts a bare count token, a count
/// glued to a unit suffix ("1br", "2bed"), or a count followed by a suffix
/// token ("1 b/r", "2 bedrooms"). Spelled-out counts are normalized to
/// digits first, so "one bed" and "1 bed" are equivalent.
pub fn extract_bedroom(input: &str) -> Option<String> {
    let norm = normalize(input);
    let tokens: Vec<&str> = norm
        .split(' ')
        .map(|t| {
            NUMBER_WORDS
                .iter()
                .find(|(word, _)| *word == t)
                .map(|(_, digit)| *digit)
                .unwrap_or(t)
        })
        .collect();

    for token in &tokens {
        if *token == "studio" {
            return Some("studio".to_string());
        }
        let mut chars = token.chars();
        match chars.next() {
            Some(c @ '1'..='5') => {
                let rest = chars.as_str();
                if rest.is_empty() || BEDROOM_SUFFIXES.contains(&rest) {
                    return Some(c.to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  Tower\u{a0}A   Marina  "), "tower a marina");
    }

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(normalize("STUDIO in JLT"), "studio in jlt");
    }

    #[test]
    fn test_extract_reference_whole_message_only() {
        assert_eq!(extract_reference(" 1006828 "), Some("1006828".to_string()));
        assert_eq!(extract_reference("ref 1006828"), None);
        assert_eq!(extract_reference("100682"), None);
        assert_eq!(extract_reference("10068281"), None);
    }

    #[test]
    fn test_references_in_bounded_tokens() {
        let menu = "1) 1008123 - Tower A Marina\n2) 1008124 - Tower A JLT";
        assert_eq!(references_in(menu), vec!["1008123", "1008124"]);
        // Glued to letters or longer runs do not count.
        assert_eq!(references_in("x1008123 and 10081234"), Vec::<String>::new());
    }

    #[test]
    fn test_bedroom_equivalents_canonicalize() {
        for input in ["1 bedroom", "one bed", "1br", "1 b/r"] {
            assert_eq!(extract_bedroom(input), Some("1".to_string()), "{input}");
        }
    }

    #[test]
    fn test_bedroom_studio() {
        assert_eq!(extract_bedroom("a Studio please"), Some("studio".to_string()));
    }

    #[test]
    fn test_bedroom_out_of_range_or_absent() {
        assert_eq!(extract_bedroom("6 bedroom"), None);
        assert_eq!(extract_bedroom("tower a marina"), None);
        assert_eq!(extract_bedroom("10br"), None);
    }

    #[test]
    fn test_bedroom_word_boundaries() {
        // "someone" must not read as "1".
        assert_eq!(extract_bedroom("someone help"), None);
        assert_eq!(extract_bedroom("two bedrooms"), Some("2".to_string()));
    }
}
