// HTML character reference lookup.
//
// Named references are case-sensitive and given *without* the leading `&`
// and trailing `;` (pass `"lt"`, not `"&lt;"`).

/// Look up a named character reference.
pub fn lookup_entity(name: &str) -> Option<&'static str> {
    let s: &'static str = match name {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{00A0}",
        "copy" => "\u{00A9}",
        "reg" => "\u{00AE}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        _ => return None,
    };
    Some(s)
}

/// Append the text a character reference stands for to `out`.
///
/// Handles named references and numeric ones (`#60`, `#x3C`). Unknown or
/// invalid references append nothing.
pub fn decode_entity(name: &str, out: &mut String) {
    if let Some(numeric) = name.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => numeric.parse::<u32>().ok(),
        };
        if let Some(c) = code.and_then(char::from_u32).filter(|&c| c != '\0') {
            out.push(c);
        }
        return;
    }
    if let Some(s) = lookup_entity(name) {
        out.push_str(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(name: &str) -> String {
        let mut out = String::new();
        decode_entity(name, &mut out);
        out
    }

    #[test]
    fn angle_brackets() {
        assert_eq!(lookup_entity("lt"), Some("<"));
        assert_eq!(lookup_entity("gt"), Some(">"));
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_eq!(lookup_entity("LT"), None);
    }

    #[test]
    fn unknown_resolves_to_nothing() {
        assert_eq!(decode("foo"), "");
        assert_eq!(decode(""), "");
    }

    #[test]
    fn numeric_references() {
        assert_eq!(decode("#60"), "<");
        assert_eq!(decode("#x3C"), "<");
        assert_eq!(decode("#X3e"), ">");
        assert_eq!(decode("#8212"), "\u{2014}");
    }

    #[test]
    fn invalid_numeric_references() {
        assert_eq!(decode("#"), "");
        assert_eq!(decode("#xZZ"), "");
        assert_eq!(decode("#0"), "");
        assert_eq!(decode("#55296"), ""); // lone surrogate
        assert_eq!(decode("#99999999999"), "");
    }
}
