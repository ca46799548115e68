macro_rules! surrogate_pat {
    () => {
        0xd800..=0xdfff
    };
}

pub(crate) use surrogate_pat;

macro_rules! noncharacter_pat {
    () => {
        0xfdd0..=0xfdef | 0xfffe | 0xffff | 0x1fffe | 0x1ffff | 0x2fffe | 0x2ffff | 0x3fffe
            | 0x3ffff | 0x4fffe | 0x4ffff | 0x5fffe | 0x5ffff | 0x6fffe | 0x6ffff | 0x7fffe
            | 0x7ffff | 0x8fffe | 0x8ffff | 0x9fffe | 0x9ffff | 0xafffe | 0xaffff | 0xbfffe
            | 0xbffff | 0xcfffe | 0xcffff | 0xdfffe | 0xdffff | 0xefffe | 0xeffff | 0xffffe
            | 0xfffff | 0x10fffe | 0x10ffff
    };
}

pub(crate) use noncharacter_pat;

macro_rules! control_pat {
    () => {
        0x0001..=0x001f | 0x007f..=0x009f
    };
}

pub(crate) use control_pat;

/// A content state the tokenizer can be started in, or switched to after a start tag.
///
/// Which one applies after a given start tag depends on tree construction, which this crate
/// does not do. See [`crate::naive_next_state`] for the approximation used by the scanner.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum State {
    /// The data state. Markup is recognized, character references are decoded.
    Data,
    /// The RCDATA state, as in `<textarea>` and `<title>`. Only the appropriate end tag is
    /// recognized, character references are decoded.
    RcData,
    /// The RAWTEXT state, as in `<style>` or `<script>`. Only the appropriate end tag is
    /// recognized.
    RawText,
    /// The PLAINTEXT state. Nothing is recognized until EOF.
    PlainText,
}

pub(crate) enum ControlToken {
    Eof,
    Continue,
}

macro_rules! ctostr {
    ($c:expr) => {
        &*$c.encode_utf8(&mut [0; 4])
    };
}

pub(crate) use ctostr;

/// Repeatedly call `f` with chunks of lowercased characters from `s`.
pub(crate) fn with_lowercase_str(s: &[u8], mut f: impl FnMut(&[u8])) {
    if s.iter().any(u8::is_ascii_uppercase) {
        for x in s {
            f(&[x.to_ascii_lowercase()]);
        }
    } else {
        f(s);
    }
}

// a macro so that format!() and its allocation disappear entirely from release builds
macro_rules! trace_log {
    ($($tt:tt)*) => {{
        #[cfg(debug_assertions)]
        crate::testutils::trace_log(&format!($($tt)*));
    }};
}

pub(crate) use trace_log;

#[test]
fn test_with_lowercase_str() {
    let mut out = Vec::<u8>::new();
    with_lowercase_str(b"InPuT", |xs| out.extend(xs));
    assert_eq!(out, b"input");

    let mut calls = 0;
    with_lowercase_str(b"input", |_| calls += 1);
    assert_eq!(calls, 1);
}
