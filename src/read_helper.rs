use crate::Reader;

/// Wraps a [`Reader`] with the ability to push bytes back ("reconsume" in WHATWG terms).
#[derive(Debug)]
pub(crate) struct ReadHelper<R: Reader> {
    reader: R,
    // a stack, the last element is read next. `None` is a pushed-back EOF.
    to_reconsume: Vec<Option<u8>>,
}

impl<R: Reader> ReadHelper<R> {
    pub(crate) fn new(reader: R) -> Self {
        ReadHelper {
            reader,
            to_reconsume: Vec::new(),
        }
    }

    pub(crate) fn inner_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    #[inline]
    pub(crate) fn read_byte(&mut self) -> Result<Option<u8>, R::Error> {
        match self.to_reconsume.pop() {
            Some(c) => Ok(c),
            None => self.reader.read_byte(),
        }
    }

    pub(crate) fn try_read_string(
        &mut self,
        s: &[u8],
        case_sensitive: bool,
    ) -> Result<bool, R::Error> {
        debug_assert!(!s.is_empty());

        let matches = |x: u8, y: u8| x == y || (!case_sensitive && x.eq_ignore_ascii_case(&y));

        // compare the pushed-back bytes first, most recently pushed is the next one in the stream
        let mut consumed = 0;
        for c in self.to_reconsume.iter().rev() {
            if consumed == s.len() {
                break;
            }
            match c {
                Some(x) if matches(*x, s[consumed]) => consumed += 1,
                _ => return Ok(false),
            }
        }

        if consumed < s.len() && !self.reader.try_read_string(&s[consumed..], case_sensitive)? {
            return Ok(false);
        }

        let new_len = self.to_reconsume.len() - consumed;
        self.to_reconsume.truncate(new_len);
        Ok(true)
    }

    #[inline]
    pub(crate) fn read_until<'b>(
        &'b mut self,
        needle: &[u8],
        char_buf: &'b mut [u8; 4],
    ) -> Result<Option<&'b [u8]>, R::Error> {
        match self.to_reconsume.pop() {
            Some(Some(x)) => {
                char_buf[0] = x;
                Ok(Some(&char_buf[..1]))
            }
            Some(None) => Ok(None),
            None => self.reader.read_until(needle, char_buf),
        }
    }

    #[inline]
    pub(crate) fn unread_byte(&mut self, c: Option<u8>) {
        self.to_reconsume.push(c);
    }

    /// Push back a run of bytes so that they are read again in their original order.
    pub(crate) fn unread_bytes(&mut self, xs: &[u8]) {
        self.to_reconsume.extend(xs.iter().rev().copied().map(Some));
    }

    pub(crate) fn mark(&mut self) {
        let unread = self.to_reconsume.iter().filter(|c| c.is_some()).count();
        self.reader.mark(unread);
    }

    pub(crate) fn rewind(&mut self) {
        self.to_reconsume.clear();
        self.reader.rewind();
    }
}

/// A version of `match read_helper.read_byte()` that reads runs of uninteresting bytes at once.
///
/// The needle lists every single byte that has its own match arm. Any other run of bytes ends up
/// in the catch-all `Some(xs)` arm, and needle bytes are always returned alone.
///
/// ```text
/// fast_read_char!(slf, [b'<', b'&'], match xs {
///     Some(b"<") => ...,
///     Some(b"&") => ...,
///     Some(xs) => ...,
///     None => ...,
/// })
/// ```
macro_rules! fast_read_char {
    ($slf:expr, [$($needle:literal),* $(,)?], match $xs:ident { $($arms:tt)* }) => {{
        let mut char_buf = [0; 4];
        let $xs = $slf.reader.read_until(&[$($needle),*], &mut char_buf)?;
        match $xs {
            $($arms)*
        }
    }};
}

pub(crate) use fast_read_char;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Readable;

    #[test]
    fn test_reconsume_order() {
        let mut helper = ReadHelper::new("xyz".to_reader());
        assert_eq!(helper.read_byte(), Ok(Some(b'x')));
        helper.unread_bytes(b"ab");
        helper.unread_byte(Some(b'_'));
        assert_eq!(helper.read_byte(), Ok(Some(b'_')));
        assert_eq!(helper.read_byte(), Ok(Some(b'a')));
        assert_eq!(helper.read_byte(), Ok(Some(b'b')));
        assert_eq!(helper.read_byte(), Ok(Some(b'y')));
    }

    #[test]
    fn test_try_read_string_across_pushback() {
        let mut helper = ReadHelper::new("CTYPE html>".to_reader());
        helper.unread_bytes(b"do");
        assert_eq!(helper.try_read_string(b"doctype", false), Ok(true));
        assert_eq!(helper.read_byte(), Ok(Some(b' ')));

        let mut helper = ReadHelper::new("-x".to_reader());
        helper.unread_byte(Some(b'-'));
        assert_eq!(helper.try_read_string(b"---", true), Ok(false));
        assert_eq!(helper.read_byte(), Ok(Some(b'-')));
        assert_eq!(helper.read_byte(), Ok(Some(b'-')));
    }
}
