use std::cmp::min;
use std::error;
use std::fmt;

use crate::reader::fast_find;
use crate::Reader;

/// The error a [`FeedReader`] returns when it runs out of buffered input before
/// [`FeedReader::close`] was called.
///
/// This is not a failure: the tokenizer is rewound to the last content-state boundary and can be
/// resumed once more input has been pushed. [`crate::Scanner`] does this automatically.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct NeedMoreInput;

impl fmt::Display for NeedMoreInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("input ended in the middle of a construct, more input is needed")
    }
}

impl error::Error for NeedMoreInput {}

/// A [`Reader`] over a growable buffer that input can be pushed into in chunks.
///
/// Until [`FeedReader::close`] is called, running out of bytes is reported as
/// [`NeedMoreInput`] instead of EOF.
#[derive(Debug, Default)]
pub struct FeedReader {
    buf: Vec<u8>,
    pos: usize,
    mark: usize,
    closed: bool,
}

impl FeedReader {
    /// Create an empty, open reader.
    pub fn new() -> Self {
        FeedReader::default()
    }

    /// Append a chunk of input.
    ///
    /// Bytes before the last mark are dropped, only the construct that is still being read
    /// stays buffered.
    pub fn push(&mut self, chunk: &[u8]) {
        debug_assert!(!self.closed, "push after close");
        self.buf.drain(..self.mark);
        self.pos -= self.mark;
        self.mark = 0;
        self.buf.extend_from_slice(chunk);
    }

    /// Declare that no more input will be pushed. From now on, running out of bytes is EOF.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Whether [`FeedReader::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The number of bytes kept in the buffer.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    fn remaining(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    #[inline]
    fn exhausted(&self) -> Result<(), NeedMoreInput> {
        if self.closed {
            Ok(())
        } else {
            Err(NeedMoreInput)
        }
    }
}

impl Reader for FeedReader {
    type Error = NeedMoreInput;

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        match self.buf.get(self.pos) {
            Some(&x) => {
                self.pos += 1;
                Ok(Some(x))
            }
            None => self.exhausted().map(|()| None),
        }
    }

    fn try_read_string(&mut self, s1: &[u8], case_sensitive: bool) -> Result<bool, Self::Error> {
        let rest = self.remaining();
        let s2 = &rest[..min(s1.len(), rest.len())];
        let s1_prefix = &s1[..s2.len()];
        if s1_prefix != s2 && (case_sensitive || !s1_prefix.eq_ignore_ascii_case(s2)) {
            return Ok(false);
        }

        if s2.len() < s1.len() {
            // what we have so far matches, but the rest is not there yet
            self.exhausted()?;
            return Ok(false);
        }

        self.pos += s1.len();
        Ok(true)
    }

    fn read_until<'b>(
        &'b mut self,
        needle: &[u8],
        _: &'b mut [u8; 4],
    ) -> Result<Option<&'b [u8]>, Self::Error> {
        if self.pos == self.buf.len() {
            self.exhausted()?;
            return Ok(None);
        }

        let start = self.pos;
        let len = match fast_find(needle, &self.buf[start..]) {
            Some(0) => 1,
            Some(needle_pos) => needle_pos,
            None => self.buf.len() - start,
        };
        self.pos += len;
        Ok(Some(&self.buf[start..start + len]))
    }

    fn mark(&mut self, unread: usize) {
        debug_assert!(unread <= self.pos);
        self.mark = self.pos - unread;
    }

    fn rewind(&mut self) {
        self.pos = self.mark;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_need_more_input_until_closed() {
        let mut reader = FeedReader::new();
        reader.push(b"ab");
        assert_eq!(reader.read_byte(), Ok(Some(b'a')));
        assert_eq!(reader.read_byte(), Ok(Some(b'b')));
        assert_eq!(reader.read_byte(), Err(NeedMoreInput));
        reader.close();
        assert_eq!(reader.read_byte(), Ok(None));
    }

    #[test]
    fn test_try_read_string_partial() {
        let mut reader = FeedReader::new();
        reader.push(b"<!-");
        assert_eq!(reader.read_byte(), Ok(Some(b'<')));
        assert_eq!(reader.try_read_string(b"!--", true), Err(NeedMoreInput));
        assert_eq!(reader.try_read_string(b"!DO", true), Ok(false));
        reader.push(b"-");
        assert_eq!(reader.try_read_string(b"!--", true), Ok(true));
    }

    #[test]
    fn test_rewind_and_compact() {
        let mut reader = FeedReader::new();
        reader.push(b"text<inp");
        let mut char_buf = [0; 4];
        assert_eq!(
            reader.read_until(b"<", &mut char_buf),
            Ok(Some(&b"text"[..]))
        );
        reader.mark(0);
        assert_eq!(reader.read_until(b"<", &mut char_buf), Ok(Some(&b"<"[..])));
        assert_eq!(reader.read_until(b">", &mut char_buf), Ok(Some(&b"inp"[..])));
        assert_eq!(reader.read_until(b">", &mut char_buf), Err(NeedMoreInput));
        reader.rewind();
        reader.push(b"ut>");
        assert_eq!(reader.buffered_len(), b"<input>".len());
        assert_eq!(reader.read_until(b">", &mut char_buf), Ok(Some(&b"<input"[..])));
    }
}
