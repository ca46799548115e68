//! Helpers for integration tests.
//!
//! Those tests should only test public API surface in general, with some exceptions as provided by
//! this module.
use std::cell::Cell;

use crate::Reader;

thread_local! {
    /// Buffer of all debugging output logged internally by the tokenizer and scanner.
    pub static OUTPUT: Cell<String> = Cell::default();
}

/// Simple debug logger for tests.
///
/// The harness used by `tests/extract_cases.rs` cannot capture stdout, so the log goes into
/// [`OUTPUT`] and is attached to failure messages instead.
pub fn trace_log(msg: &str) {
    OUTPUT.with(|cell| {
        let mut buf = cell.take();
        buf.push_str(msg);
        buf.push('\n');

        if buf.len() > 20 * 1024 * 1024 {
            buf.clear();
            buf.push_str("[truncated output]\n");
        }

        cell.set(buf);
    });
}

/// Take everything logged on this thread so far.
pub fn take_output() -> String {
    OUTPUT.with(Cell::take)
}

/// A kind of reader that implements `read_until` very poorly, returning one byte at a time.
#[derive(Debug)]
pub struct SlowReader<R: Reader>(pub R);

impl<R: Reader> Reader for SlowReader<R> {
    type Error = R::Error;

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        self.0.read_byte()
    }

    fn try_read_string(&mut self, s: &[u8], case_sensitive: bool) -> Result<bool, Self::Error> {
        self.0.try_read_string(s, case_sensitive)
    }
}

#[test]
fn test_trace_log_is_collected() {
    take_output();
    trace_log("one");
    trace_log("two");
    assert_eq!(take_output(), "one\ntwo\n");
    assert_eq!(take_output(), "");
}
