//! Push-based scanning: feed input in chunks and get called back for every token.
//!
//! ```
//! use std::convert::Infallible;
//!
//! use extract_input_value::{Scanner, StartTag, TagHandler};
//!
//! #[derive(Default)]
//! struct CountInputs(usize);
//!
//! impl TagHandler for CountInputs {
//!     type Error = Infallible;
//!
//!     fn start_tag(&mut self, tag: &StartTag) -> Result<(), Infallible> {
//!         if tag.name == "input" {
//!             self.0 += 1;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut scanner = Scanner::new(CountInputs::default());
//! let Ok(()) = scanner.feed(b"<input name=a><inp");
//! let Ok(()) = scanner.feed(b"ut name=b><script><input></script>");
//! let Ok(handler) = scanner.close();
//! assert_eq!(handler.0, 2);
//! ```
use crate::utils::trace_log;
use crate::{EndTag, Error, FeedReader, NeedMoreInput, StartTag, Token, Tokenizer};

/// Callbacks invoked by a [`Scanner`], one per token.
///
/// Only [`TagHandler::start_tag`] has to be implemented, everything else is ignored by default.
/// Returning an error stops the current [`Scanner::feed`] or [`Scanner::close`] call and hands the
/// error to the caller.
pub trait TagHandler {
    /// The error returned by the callbacks, for example `std::io::Error` when writing output.
    type Error;

    /// A start tag such as `<input name=q>` was fully read.
    fn start_tag(&mut self, tag: &StartTag) -> Result<(), Self::Error>;

    /// An end tag such as `</form>` was fully read.
    fn end_tag(&mut self, tag: &EndTag) -> Result<(), Self::Error> {
        let _tag = tag;
        Ok(())
    }

    /// A comment, without the `<!--` and `-->`.
    fn comment(&mut self, value: &[u8]) -> Result<(), Self::Error> {
        let _value = value;
        Ok(())
    }

    /// A doctype, everything between `<!DOCTYPE` and `>`.
    fn doctype(&mut self, value: &[u8]) -> Result<(), Self::Error> {
        let _value = value;
        Ok(())
    }

    /// Text between tags with character references decoded.
    ///
    /// Consecutive text is folded into one call, even when it was split across chunks.
    fn text(&mut self, value: &[u8]) -> Result<(), Self::Error> {
        let _value = value;
        Ok(())
    }

    /// A parse error. The scanner always recovers from those.
    fn parse_error(&mut self, error: Error) -> Result<(), Self::Error> {
        trace_log!("parse error: {}", error);
        Ok(())
    }
}

/// An incremental HTML scanner.
///
/// Input can be split at arbitrary byte positions, including in the middle of a tag, a quoted
/// attribute value or a character reference. Whatever construct is cut off by the end of a chunk
/// is read again once the next chunk arrives. [`Scanner::close`] finishes the input, and a
/// construct that is still unterminated at that point is handled like HTML at EOF, which drops
/// unterminated tags.
///
/// Elements like `<script>` and `<textarea>` switch the tokenizer into raw text modes, so markup
/// inside of them is not reported as tags. See [`crate::naive_next_state`].
#[derive(Debug)]
pub struct Scanner<H: TagHandler> {
    tokenizer: Tokenizer<FeedReader>,
    handler: H,
}

impl<H: TagHandler> Scanner<H> {
    /// Create a scanner that reports to `handler`.
    pub fn new(handler: H) -> Self {
        let mut tokenizer = Tokenizer::new(FeedReader::new());
        tokenizer.emitter_mut().switch_states(true);
        Scanner { tokenizer, handler }
    }

    /// Push a chunk of input and call the handler for every token that is complete now.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), H::Error> {
        trace_log!("feed: {} bytes", chunk.len());
        self.tokenizer.reader_mut().push(chunk);
        self.drain()
    }

    /// Declare the end of input, flush the remaining tokens and return the handler.
    pub fn close(mut self) -> Result<H, H::Error> {
        trace_log!("close");
        self.tokenizer.reader_mut().close();
        self.drain()?;
        Ok(self.handler)
    }

    /// The handler passed to [`Scanner::new`].
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The handler passed to [`Scanner::new`].
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    fn drain(&mut self) -> Result<(), H::Error> {
        loop {
            match self.tokenizer.next() {
                Some(Ok(token)) => self.dispatch(token)?,
                Some(Err(NeedMoreInput)) => {
                    self.tokenizer.rewind();
                    return Ok(());
                }
                None => return Ok(()),
            }
        }
    }

    fn dispatch(&mut self, token: Token) -> Result<(), H::Error> {
        match token {
            Token::StartTag(tag) => self.handler.start_tag(&tag),
            Token::EndTag(tag) => self.handler.end_tag(&tag),
            Token::String(value) => self.handler.text(&value),
            Token::Comment(value) => self.handler.comment(&value),
            Token::Doctype(value) => self.handler.doctype(&value),
            Token::Error(error) => self.handler.parse_error(error),
        }
    }
}
