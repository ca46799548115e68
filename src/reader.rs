use std::convert::Infallible;

/// An object that provides bytes to the tokenizer.
///
/// See [`crate::Tokenizer::new`] for more information.
pub trait Reader {
    /// The error returned by this reader.
    type Error: std::error::Error;

    /// Return a new byte from the input stream.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Attempt to read an entire string at once, either case-insensitively or not.
    ///
    /// `case_sensitive=false` means that bytes of the input stream should be compared while
    /// ignoring ASCII-casing.
    ///
    /// If the next bytes equal to `s`, this function consumes them from the input stream and
    /// returns `true`. If not, it does nothing and returns `false`.
    fn try_read_string(&mut self, s: &[u8], case_sensitive: bool) -> Result<bool, Self::Error>;

    /// Read an arbitrary amount of bytes up until and including the next byte that matches an
    /// array entry in `needle`.
    ///
    /// Return either:
    ///
    /// 1. A chunk of consumed bytes that does not contain any bytes from `needle`. The chunk can be arbitrarily large or small.
    /// 2. If the next byte is included in `needle`, a slice with just that byte and nothing else.
    ///
    /// The default implementation reads one byte into `char_buf` and ignores the needle
    /// entirely. It is recommended to implement `read_until` manually if there is an in-memory
    /// buffer to search.
    ///
    /// # Example
    ///
    /// Here is how [`StringReader`] behaves:
    ///
    /// ```rust
    /// use extract_input_value::{Reader, Readable};
    ///
    /// let mut reader = "hello world".to_reader();
    /// let mut chunks = Vec::new();
    /// loop {
    ///     let mut char_buf = [0; 4];
    ///     match reader.read_until(&[b' ', b'r'], &mut char_buf).unwrap() {
    ///         Some(xs) => chunks.push(std::str::from_utf8(xs).unwrap().to_owned()),
    ///         None => break,
    ///     }
    /// }
    ///
    /// assert_eq!(chunks, &["hello", " ", "wo", "r", "ld"]);
    /// ```
    fn read_until<'b>(
        &'b mut self,
        needle: &[u8],
        char_buf: &'b mut [u8; 4],
    ) -> Result<Option<&'b [u8]>, Self::Error> {
        let _needle = needle;

        match self.read_byte()? {
            Some(x) => {
                char_buf[0] = x;
                Ok(Some(&char_buf[..1]))
            }
            None => Ok(None),
        }
    }

    /// Remember the current position as the place to come back to on [`Reader::rewind`].
    ///
    /// `unread` is the number of bytes the tokenizer has already read from this reader but pushed
    /// back, so the position to remember is that many bytes before the current one.
    ///
    /// Only readers used for incremental input need to implement this; the default does nothing.
    fn mark(&mut self, unread: usize) {
        let _unread = unread;
    }

    /// Go back to the position remembered by the last call to [`Reader::mark`].
    fn rewind(&mut self) {}
}

/// An object that can be converted into a [`crate::Reader`].
///
/// For example, any utf8-string can be converted into a `StringReader`, such that
/// `Tokenizer::new("mystring")` and `Tokenizer::new(&String::from("foo"))` work.
pub trait Readable<'a> {
    /// The reader type to which this type should be converted.
    type Reader: Reader + 'a;

    /// Convert self to some sort of reader.
    fn to_reader(self) -> Self::Reader;
}

impl<'a, R: 'a + Reader> Readable<'a> for R {
    type Reader = Self;

    fn to_reader(self) -> Self::Reader {
        self
    }
}

/// A helper struct to seek forwards in in-memory input. Used by the tokenizer to read HTML from
/// strings and byte slices.
///
/// ```rust
/// use extract_input_value::{Token, Tokenizer};
///
/// let names: Vec<_> = Tokenizer::new("<form><input name=q></form>")
///     .infallible()
///     .filter_map(|token| match token {
///         Token::StartTag(tag) => Some(String::from_utf8_lossy(&tag.name).into_owned()),
///         _ => None,
///     })
///     .collect();
///
/// assert_eq!(names, &["form", "input"]);
/// ```
#[derive(Debug)]
pub struct StringReader<'a> {
    input: &'a [u8],
}

impl<'a> StringReader<'a> {
    fn new(input: &'a [u8]) -> Self {
        StringReader { input }
    }
}

impl<'a> Reader for StringReader<'a> {
    type Error = Infallible;

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        match self.input.split_first() {
            Some((&x, rest)) => {
                self.input = rest;
                Ok(Some(x))
            }
            None => Ok(None),
        }
    }

    fn read_until<'b>(
        &'b mut self,
        needle: &[u8],
        _: &'b mut [u8; 4],
    ) -> Result<Option<&'b [u8]>, Self::Error> {
        if self.input.is_empty() {
            return Ok(None);
        }

        let (rv, new_input) = match fast_find(needle, self.input) {
            Some(0) => self.input.split_at(1),
            Some(needle_pos) => self.input.split_at(needle_pos),
            None => (self.input, &b""[..]),
        };
        self.input = new_input;
        Ok(Some(rv))
    }

    fn try_read_string(&mut self, s1: &[u8], case_sensitive: bool) -> Result<bool, Self::Error> {
        if let Some(s2) = self.input.get(..s1.len()) {
            if s1 == s2 || (!case_sensitive && s1.eq_ignore_ascii_case(s2)) {
                self.input = &self.input[s1.len()..];
                return Ok(true);
            }
        }

        Ok(false)
    }
}

impl<'a> Readable<'a> for &'a str {
    type Reader = StringReader<'a>;

    fn to_reader(self) -> Self::Reader {
        StringReader::new(self.as_bytes())
    }
}

impl<'a> Readable<'a> for &'a String {
    type Reader = StringReader<'a>;

    fn to_reader(self) -> Self::Reader {
        StringReader::new(self.as_bytes())
    }
}

impl<'a> Readable<'a> for &'a Vec<u8> {
    type Reader = StringReader<'a>;

    fn to_reader(self) -> Self::Reader {
        StringReader::new(self.as_slice())
    }
}

impl<'a> Readable<'a> for &'a [u8] {
    type Reader = StringReader<'a>;

    fn to_reader(self) -> Self::Reader {
        StringReader::new(self)
    }
}

/// Find the first position in `haystack` holding any byte of `needle`.
#[cfg(feature = "jetscii")]
#[inline]
pub(crate) fn fast_find(needle: &[u8], haystack: &[u8]) -> Option<usize> {
    if needle.len() > 16 {
        return haystack.iter().position(|b| needle.contains(b));
    }

    let mut needle_arr = [0; 16];
    needle_arr[..needle.len()].copy_from_slice(needle);
    jetscii::Bytes::new(needle_arr, needle.len() as i32, |b| needle.contains(&b)).find(haystack)
}

/// Find the first position in `haystack` holding any byte of `needle`.
#[cfg(not(feature = "jetscii"))]
#[inline]
pub(crate) fn fast_find(needle: &[u8], haystack: &[u8]) -> Option<usize> {
    haystack.iter().position(|b| needle.contains(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_find() {
        assert_eq!(fast_find(b"<&", b"hello <world>"), Some(6));
        assert_eq!(fast_find(b"<&", b"a &amp; b"), Some(2));
        assert_eq!(fast_find(b"<&", b"no markup"), None);
        assert_eq!(fast_find(b"<", b""), None);
    }

    #[test]
    fn test_try_read_string() {
        let mut reader = "<!DOCTYPE html>".to_reader();
        assert_eq!(reader.try_read_string(b"<!doctype", true), Ok(false));
        assert_eq!(reader.try_read_string(b"<!doctype", false), Ok(true));
        assert_eq!(reader.read_byte(), Ok(Some(b' ')));
        assert_eq!(reader.try_read_string(b"html>and more", false), Ok(false));
    }
}
