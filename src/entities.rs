//! Lookups into the WHATWG table of named character references, as shipped by html5ever.
use html5ever::data::{C1_REPLACEMENTS, NAMED_ENTITIES};

/// Result of looking up a (partial) character reference name, without the leading `&`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Lookup {
    /// The name is a complete reference, expanding to one or two code points.
    Match(char, Option<char>),
    /// The name is not a reference but a longer one starts with it.
    Prefix,
    /// Neither, the longest match has already been seen.
    NoMatch,
}

pub(crate) fn lookup(name: &[u8]) -> Lookup {
    let entry = std::str::from_utf8(name)
        .ok()
        .and_then(|name| NAMED_ENTITIES.get(name));

    // the table contains every prefix of every name, mapped to (0, 0)
    match entry {
        None => Lookup::NoMatch,
        Some(&(0, _)) => Lookup::Prefix,
        Some(&(c1, c2)) => match char::from_u32(c1) {
            Some(c1) => Lookup::Match(c1, char::from_u32(c2).filter(|_| c2 != 0)),
            None => Lookup::NoMatch,
        },
    }
}

/// The replacement for a numeric character reference to a C1 control, as browsers treat them as
/// windows-1252.
pub(crate) fn c1_replacement(code: u32) -> Option<char> {
    match code {
        0x80..=0x9f => C1_REPLACEMENTS[(code - 0x80) as usize],
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup(b"amp;"), Lookup::Match('&', None));
        assert_eq!(lookup(b"amp"), Lookup::Match('&', None));
        assert_eq!(lookup(b"am"), Lookup::Prefix);
        assert_eq!(lookup(b"ampx"), Lookup::NoMatch);
        assert_eq!(lookup(b"NotEqualTilde;"), Lookup::Match('\u{2242}', Some('\u{338}')));
        // only legacy references work without semicolon
        assert_eq!(lookup(b"hellip"), Lookup::Prefix);
        assert_eq!(lookup(b"hellip;"), Lookup::Match('\u{2026}', None));
    }

    #[test]
    fn test_c1_replacement() {
        assert_eq!(c1_replacement(0x80), Some('\u{20ac}'));
        assert_eq!(c1_replacement(0x81), None);
        assert_eq!(c1_replacement(0x41), None);
    }
}
