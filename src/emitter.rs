use std::borrow::{Borrow, BorrowMut};
use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::fmt::{Debug, Formatter};
use std::mem;
use std::ops::{Deref, DerefMut};

use crate::utils::trace_log;
use crate::{Error, State};

/// A wrapper around a bytestring.
///
/// This newtype only exists to provide a nicer `Debug` impl
#[derive(Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HtmlString(pub Vec<u8>);

impl Deref for HtmlString {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for HtmlString {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Debug for HtmlString {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "b\"")?;
        for &byte in &self.0 {
            for ch in std::ascii::escape_default(byte) {
                write!(f, "{}", ch as char)?;
            }
        }

        write!(f, "\"")
    }
}

impl Borrow<[u8]> for HtmlString {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl BorrowMut<[u8]> for HtmlString {
    fn borrow_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl From<Vec<u8>> for HtmlString {
    fn from(vec: Vec<u8>) -> HtmlString {
        HtmlString(vec)
    }
}

impl From<&[u8]> for HtmlString {
    fn from(s: &[u8]) -> HtmlString {
        HtmlString(s.to_vec())
    }
}

impl From<&str> for HtmlString {
    fn from(s: &str) -> HtmlString {
        HtmlString(s.as_bytes().to_vec())
    }
}

impl From<HtmlString> for Vec<u8> {
    fn from(other: HtmlString) -> Vec<u8> {
        other.0
    }
}

impl PartialEq<[u8]> for HtmlString {
    fn eq(&self, other: &[u8]) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for HtmlString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

/// An emitter is an object providing methods to the tokenizer to produce tokens.
///
/// Domain-specific applications of the tokenizer can manually implement this trait to customize
/// per-token allocations, or avoid them altogether.
///
/// An emitter is assumed to have these internal states:
///
/// * _last start tag_: The most recently emitted start tag's name
/// * _current token_: Can be a tag, doctype or comment token. There's only one current token.
/// * _current attribute_: The currently processed HTML attribute, consisting of two strings for name and value.
///
/// The state machine needs a functional implementation of
/// `current_is_appropriate_end_tag_token` to leave RCDATA and RAWTEXT content correctly.
pub trait Emitter {
    /// The token type emitted by this emitter. This controls what type of values the
    /// [`crate::Tokenizer`] yields when used as an iterator.
    type Token;

    /// Set the name of the _last start tag_.
    ///
    /// This is *not* supposed to override the tag name of the current tag.
    fn set_last_start_tag(&mut self, last_start_tag: Option<&[u8]>);

    /// The state machine has reached the end of the file. It will soon call `pop_token` for the
    /// last time.
    fn emit_eof(&mut self);

    /// A recoverable parsing error has occured.
    fn emit_error(&mut self, error: Error);

    /// The tokenizer calls this method to retrieve a new token that can be returned via its
    /// iterator interface. It is only called between constructs, never while a tag, comment or
    /// character reference is half-read.
    fn pop_token(&mut self) -> Option<Self::Token>;

    /// Emit a bunch of plain characters as character tokens.
    fn emit_string(&mut self, c: &[u8]);

    /// Set the _current token_ to a start tag.
    fn init_start_tag(&mut self);

    /// Set the _current token_ to an end tag.
    fn init_end_tag(&mut self);

    /// Set the _current token_ to a comment.
    fn init_comment(&mut self);

    /// Set the _current token_ to a doctype with an empty body.
    fn init_doctype(&mut self);

    /// Emit the _current token_, assuming it is a tag.
    ///
    /// Also get the current attribute and append it to the to-be-emitted tag.
    ///
    /// If a start tag is emitted, update the _last start tag_.
    ///
    /// The return value is used to switch the tokenizer to a new content state. If this method
    /// always returns `None`, states are never switched, which leads to artifacts like contents
    /// of `<script>` tags being interpreted as HTML. See [`naive_next_state`].
    #[must_use]
    fn emit_current_tag(&mut self) -> Option<State>;

    /// Emit the _current token_, assuming it is a comment.
    fn emit_current_comment(&mut self);

    /// Emit the _current token_, assuming it is a doctype.
    fn emit_current_doctype(&mut self);

    /// Assuming the _current token_ is a start tag, set the self-closing flag.
    ///
    /// If the current token is an end tag, the emitter should emit the
    /// [`crate::Error::EndTagWithTrailingSolidus`] error.
    fn set_self_closing(&mut self);

    /// Assuming the _current token_ is a start/end tag, append a string to the current tag's name.
    fn push_tag_name(&mut self, s: &[u8]);

    /// Assuming the _current token_ is a comment, append a string to the comment's contents.
    fn push_comment(&mut self, s: &[u8]);

    /// Assuming the _current token_ is a doctype, append a string to its body.
    fn push_doctype(&mut self, s: &[u8]);

    /// Set the _current attribute_ to a new one, starting with empty name and value strings.
    ///
    /// The old attribute, if any, should be put on the _current token_.
    ///
    /// If the current token is an end tag token, a [`crate::Error::EndTagWithAttributes`]
    /// error should be emitted.
    fn init_attribute(&mut self);

    /// Append a string to the current attribute's name.
    fn push_attribute_name(&mut self, s: &[u8]);

    /// Append a string to the current attribute's value.
    fn push_attribute_value(&mut self, s: &[u8]);

    /// Return true if all of these hold. Return false otherwise.
    ///
    /// * the _current token_ is an end tag
    /// * the _last start tag_ exists
    /// * the current end tag token's name equals to the last start tag's name.
    ///
    /// See also [WHATWG's definition of "appropriate end tag
    /// token"](https://html.spec.whatwg.org/#appropriate-end-tag-token).
    fn current_is_appropriate_end_tag_token(&mut self) -> bool;

    /// The tokenizer is between two constructs. Remember everything emitted so far, so that
    /// [`Emitter::rewind`] can discard whatever comes after.
    ///
    /// Only needed for incremental input. The default does nothing.
    fn mark(&mut self) {}

    /// Discard the current token, current attribute and everything emitted since the last
    /// [`Emitter::mark`]. The tokenizer is about to read the same input again.
    fn rewind(&mut self) {}
}

/// Take an educated guess at the next state using the name of a just-now emitted start tag.
///
/// This is good enough for scraping but unsuitable for implementing a browser: a real tree
/// builder would for example not switch states for a `<title>` inside of `<svg>`.
#[must_use]
pub fn naive_next_state(tag_name: &[u8]) -> Option<State> {
    match tag_name {
        b"textarea" | b"title" => Some(State::RcData),
        b"plaintext" => Some(State::PlainText),
        b"script" | b"style" | b"iframe" | b"xmp" | b"noembed" | b"noframes" => {
            Some(State::RawText)
        }
        _ => None,
    }
}

/// The default implementation of [`crate::Emitter`], used to produce ("emit") tokens.
#[derive(Debug, Default)]
pub struct DefaultEmitter {
    current_characters: HtmlString,
    current_token: Option<Token>,
    last_start_tag: HtmlString,
    current_attribute: Option<Attribute>,
    end_tag_had_attributes: bool,
    emitted_tokens: VecDeque<Token>,
    switch_states: bool,
    marked_tokens: usize,
    marked_characters: usize,
}

impl DefaultEmitter {
    /// Whether to use [`naive_next_state`] to switch states automatically.
    ///
    /// The default is off.
    pub fn switch_states(&mut self, yes: bool) {
        self.switch_states = yes;
    }

    fn emit_token(&mut self, token: Token) {
        self.flush_current_characters();
        self.emitted_tokens.push_front(token);
    }

    fn flush_current_attribute(&mut self) {
        let attribute = match self.current_attribute.take() {
            Some(attribute) => attribute,
            None => return,
        };

        match self.current_token {
            Some(Token::StartTag(ref mut tag)) => {
                let duplicate = tag.attributes.iter().any(|x| x.name == attribute.name);
                tag.attributes.push(attribute);
                if duplicate {
                    self.emit_error(Error::DuplicateAttribute);
                }
            }
            Some(Token::EndTag(_)) => {
                self.end_tag_had_attributes = true;
            }
            _ => {
                debug_assert!(false);
            }
        }
    }

    fn flush_current_characters(&mut self) {
        if self.current_characters.is_empty() {
            return;
        }

        let s = mem::take(&mut self.current_characters);
        self.emit_token(Token::String(s));
    }
}

impl Emitter for DefaultEmitter {
    type Token = Token;

    fn set_last_start_tag(&mut self, last_start_tag: Option<&[u8]>) {
        self.last_start_tag.clear();
        self.last_start_tag
            .extend(last_start_tag.unwrap_or_default());
    }

    fn emit_eof(&mut self) {
        self.flush_current_characters();
    }

    fn emit_error(&mut self, error: Error) {
        if error.is_malformed_attribute() {
            if let Some(Token::StartTag(ref mut tag)) = self.current_token {
                tag.malformed = true;
            }
        }

        // bypass character flushing in self.emit_token: we don't need the error location to be
        // that exact
        self.emitted_tokens.push_front(Token::Error(error));
    }

    fn pop_token(&mut self) -> Option<Self::Token> {
        self.emitted_tokens.pop_back()
    }

    fn emit_string(&mut self, s: &[u8]) {
        self.current_characters.extend(s);
    }

    fn init_start_tag(&mut self) {
        self.current_token = Some(Token::StartTag(StartTag::default()));
    }

    fn init_end_tag(&mut self) {
        self.current_token = Some(Token::EndTag(EndTag::default()));
        self.end_tag_had_attributes = false;
    }

    fn init_comment(&mut self) {
        self.current_token = Some(Token::Comment(HtmlString::default()));
    }

    fn init_doctype(&mut self) {
        self.current_token = Some(Token::Doctype(HtmlString::default()));
    }

    fn emit_current_tag(&mut self) -> Option<State> {
        self.flush_current_attribute();
        let token = match self.current_token.take() {
            Some(token) => token,
            None => {
                debug_assert!(false);
                return None;
            }
        };

        match token {
            Token::EndTag(_) => {
                if self.end_tag_had_attributes {
                    self.emit_error(Error::EndTagWithAttributes);
                }
                self.end_tag_had_attributes = false;
                self.set_last_start_tag(None);
            }
            Token::StartTag(ref tag) => {
                self.set_last_start_tag(Some(tag.name.as_slice()));
            }
            _ => debug_assert!(false),
        }
        trace_log!("emit_current_tag: {:?}", token);
        self.emit_token(token);

        if self.switch_states {
            naive_next_state(&self.last_start_tag)
        } else {
            None
        }
    }

    fn emit_current_comment(&mut self) {
        if let Some(comment) = self.current_token.take() {
            debug_assert!(matches!(comment, Token::Comment(_)));
            self.emit_token(comment);
        }
    }

    fn emit_current_doctype(&mut self) {
        if let Some(doctype) = self.current_token.take() {
            debug_assert!(matches!(doctype, Token::Doctype(_)));
            self.emit_token(doctype);
        }
    }

    fn set_self_closing(&mut self) {
        match self.current_token {
            Some(Token::StartTag(ref mut tag)) => {
                tag.self_closing = true;
            }
            Some(Token::EndTag(_)) => {
                self.emit_error(Error::EndTagWithTrailingSolidus);
            }
            _ => {
                debug_assert!(false);
            }
        }
    }

    fn push_tag_name(&mut self, s: &[u8]) {
        match self.current_token {
            Some(
                Token::StartTag(StartTag { ref mut name, .. })
                | Token::EndTag(EndTag { ref mut name, .. }),
            ) => {
                name.extend(s);
            }
            _ => debug_assert!(false),
        }
    }

    fn push_comment(&mut self, s: &[u8]) {
        match self.current_token {
            Some(Token::Comment(ref mut data)) => data.extend(s),
            _ => debug_assert!(false),
        }
    }

    fn push_doctype(&mut self, s: &[u8]) {
        match self.current_token {
            Some(Token::Doctype(ref mut data)) => data.extend(s),
            _ => debug_assert!(false),
        }
    }

    fn init_attribute(&mut self) {
        self.flush_current_attribute();
        self.current_attribute = Some(Attribute::default());
    }

    fn push_attribute_name(&mut self, s: &[u8]) {
        if let Some(ref mut attribute) = self.current_attribute {
            attribute.name.extend(s);
        }
    }

    fn push_attribute_value(&mut self, s: &[u8]) {
        if let Some(ref mut attribute) = self.current_attribute {
            attribute.value.extend(s);
        }
    }

    fn current_is_appropriate_end_tag_token(&mut self) -> bool {
        match self.current_token {
            Some(Token::EndTag(ref tag)) => {
                !self.last_start_tag.is_empty() && self.last_start_tag == tag.name
            }
            _ => false,
        }
    }

    fn mark(&mut self) {
        self.marked_tokens = self.emitted_tokens.len();
        self.marked_characters = self.current_characters.len();
    }

    fn rewind(&mut self) {
        trace_log!(
            "emitter rewind: dropping {} tokens",
            self.emitted_tokens.len().saturating_sub(self.marked_tokens)
        );
        // newest tokens are at the front
        while self.emitted_tokens.len() > self.marked_tokens {
            self.emitted_tokens.pop_front();
        }
        self.current_characters.truncate(self.marked_characters);
        self.current_token = None;
        self.current_attribute = None;
        self.end_tag_had_attributes = false;
    }
}

/// A single attribute of a [`StartTag`], such as `name="q"`.
#[derive(Debug, Default, Eq, PartialEq, Clone)]
pub struct Attribute {
    /// The attribute name, lowercased.
    pub name: HtmlString,
    /// The attribute value with quotes removed and character references decoded. Empty for
    /// attributes written without a value, like `disabled`.
    pub value: HtmlString,
}

/// A HTML start/open tag, such as `<p>` or `<input name=q>`.
#[derive(Debug, Default, Eq, PartialEq, Clone)]
pub struct StartTag {
    /// Whether this tag ended with `/>`.
    pub self_closing: bool,

    /// The start tag's name, lowercased, such as `"p"` or `"input"`.
    pub name: HtmlString,

    /// All attributes in the order they appear in the markup.
    ///
    /// Unlike WHATWG, which drops repeated attributes, duplicates are kept here. Use
    /// [`StartTag::get`] or [`StartTag::attribute_map`] for lookups where the last occurrence
    /// wins.
    pub attributes: Vec<Attribute>,

    /// Whether the attribute list could not be tokenized cleanly, for example because of a stray
    /// quote in `<input name="a"b">`. See [`crate::Error::is_malformed_attribute`].
    pub malformed: bool,
}

impl StartTag {
    /// Get the value of the last attribute called `name`.
    #[must_use]
    pub fn get(&self, name: &[u8]) -> Option<&[u8]> {
        self.attributes
            .iter()
            .rev()
            .find(|attribute| attribute.name == *name)
            .map(|attribute| attribute.value.as_slice())
    }

    /// Build a lookup map from the attribute list. Later duplicates overwrite earlier ones.
    #[must_use]
    pub fn attribute_map(&self) -> BTreeMap<&[u8], &[u8]> {
        self.attributes
            .iter()
            .map(|attribute| (attribute.name.as_slice(), attribute.value.as_slice()))
            .collect()
    }
}

/// A HTML end/close tag, such as `</p>` or `</a>`.
#[derive(Debug, Default, Eq, PartialEq, Clone)]
pub struct EndTag {
    /// The ending tag's name, such as `"p"` or `"a"`.
    pub name: HtmlString,
}

/// The token type used by default. You can define your own token type by implementing the
/// [`crate::Emitter`] trait and using [`crate::Tokenizer::new_with_emitter`].
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Token {
    /// A HTML start tag.
    StartTag(StartTag),
    /// A HTML end tag.
    EndTag(EndTag),
    /// A literal string.
    String(HtmlString),
    /// A HTML comment. Processing instructions and other bogus comments end up here too.
    Comment(HtmlString),
    /// A doctype declaration. Contains everything between `<!DOCTYPE` and `>` verbatim, such as
    /// `" html"`.
    Doctype(HtmlString),
    /// A HTML parsing error.
    ///
    /// Can be skipped over, the tokenizer is supposed to recover from the error and continues with
    /// more tokens afterward.
    Error(Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(attributes: &[(&str, &str)]) -> StartTag {
        StartTag {
            name: "input".into(),
            attributes: attributes
                .iter()
                .map(|&(name, value)| Attribute {
                    name: name.into(),
                    value: value.into(),
                })
                .collect(),
            ..StartTag::default()
        }
    }

    #[test]
    fn test_last_duplicate_wins() {
        let tag = tag(&[("name", "a"), ("value", "1"), ("name", "b")]);
        assert_eq!(tag.get(b"name"), Some(&b"b"[..]));
        assert_eq!(tag.get(b"value"), Some(&b"1"[..]));
        assert_eq!(tag.get(b"type"), None);

        let map = tag.attribute_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&b"name"[..]), Some(&&b"b"[..]));
    }

    #[test]
    fn test_naive_next_state() {
        assert_eq!(naive_next_state(b"script"), Some(State::RawText));
        assert_eq!(naive_next_state(b"textarea"), Some(State::RcData));
        assert_eq!(naive_next_state(b"input"), None);
    }

    #[test]
    fn test_rewind_discards_partial_tag() {
        let mut emitter = DefaultEmitter::default();
        emitter.emit_string(b"before ");
        emitter.mark();
        emitter.emit_string(b"&");
        emitter.init_start_tag();
        emitter.push_tag_name(b"inp");
        emitter.emit_error(Error::UnexpectedNullCharacter);
        emitter.rewind();

        emitter.emit_eof();
        assert_eq!(
            emitter.pop_token(),
            Some(Token::String("before ".into()))
        );
        assert_eq!(emitter.pop_token(), None);
    }

    #[test]
    fn test_htmlstring_debug() {
        assert_eq!(format!("{:?}", HtmlString::from("a\"b\n")), r#"b"a\"b\n""#);
    }
}
