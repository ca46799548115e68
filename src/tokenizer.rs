use std::convert::Infallible;

use crate::machine::consume;
use crate::machine_helper::MachineHelper;
use crate::read_helper::ReadHelper;
use crate::utils::{trace_log, ControlToken, State};
use crate::{DefaultEmitter, Emitter, Readable, Reader};

/// A HTML tokenizer. See crate-level docs for basic usage.
///
/// Tokens are handed out only when the state machine is back in a content state (or at EOF), so
/// that everything produced while reading a tag, comment or character reference can be thrown
/// away again if the reader runs out of input halfway through. See [`crate::FeedReader`].
#[derive(Debug)]
pub struct Tokenizer<R: Reader, E: Emitter = DefaultEmitter> {
    eof: bool,
    pub(crate) emitter: E,
    pub(crate) reader: ReadHelper<R>,
    pub(crate) machine_helper: MachineHelper,
}

impl<R: Reader> Tokenizer<R> {
    /// Create a new tokenizer from some input.
    ///
    /// `input` can be `&String`, `&str`, `&[u8]` or `&Vec<u8>`, as those are the types for which
    /// [`crate::Readable`] is implemented, but you can implement that trait on your own types.
    ///
    /// ```
    /// use extract_input_value::{Token, Tokenizer};
    ///
    /// let tags: Vec<_> = Tokenizer::new("<input name=q value=1>")
    ///     .infallible()
    ///     .filter_map(|token| match token {
    ///         Token::StartTag(tag) => Some(tag),
    ///         _ => None,
    ///     })
    ///     .collect();
    ///
    /// assert_eq!(tags[0].get(b"value"), Some(&b"1"[..]));
    /// ```
    pub fn new<'a, S: Readable<'a, Reader = R>>(input: S) -> Self {
        Tokenizer::<S::Reader>::new_with_emitter(input, DefaultEmitter::default())
    }
}

impl<R: Reader, E: Emitter> Tokenizer<R, E> {
    /// Construct a new tokenizer from some input and a custom emitter.
    pub fn new_with_emitter<'a, S: Readable<'a, Reader = R>>(input: S, emitter: E) -> Self {
        Tokenizer {
            eof: false,
            emitter,
            reader: ReadHelper::new(input.to_reader()),
            machine_helper: MachineHelper::default(),
        }
    }

    /// Override internal state. Necessary for tokenizing the contents of an element such as
    /// `<textarea>` on its own.
    pub fn set_state(&mut self, state: State) {
        self.machine_helper.switch_to(state.into());
    }

    /// Set the name of the last start tag, which decides which end tag leaves the RCDATA and
    /// RAWTEXT states. Only useful together with [`Tokenizer::set_state`].
    pub fn set_last_start_tag(&mut self, last_start_tag: Option<&str>) {
        self.emitter
            .set_last_start_tag(last_start_tag.map(str::as_bytes));
    }

    /// Access the emitter, for example to toggle [`DefaultEmitter::switch_states`].
    pub fn emitter_mut(&mut self) -> &mut E {
        &mut self.emitter
    }

    pub(crate) fn reader_mut(&mut self) -> &mut R {
        self.reader.inner_mut()
    }

    /// Drop everything read since the last content-state boundary, so that it is read again on
    /// the next call to `next()`.
    pub(crate) fn rewind(&mut self) {
        trace_log!("tokenizer rewind");
        self.reader.rewind();
        self.emitter.rewind();
        self.machine_helper.rewind();
    }
}

impl<R: Reader, E: Emitter<Token = Infallible>> Tokenizer<R, E> {
    /// Some emitters don't ever produce any tokens and instead have other side effects. Drain
    /// the tokenizer for those, stopping at the first reader error.
    pub fn finish(self) -> Result<(), R::Error> {
        for result in self {
            result?;
        }

        Ok(())
    }
}

impl<R: Reader, E: Emitter> Iterator for Tokenizer<R, E> {
    type Item = Result<E::Token, R::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let at_boundary = self.machine_helper.state.is_content_state();

            if at_boundary || self.eof {
                if let Some(token) = self.emitter.pop_token() {
                    break Some(Ok(token));
                }
            }

            if self.eof {
                break None;
            }

            if at_boundary {
                self.reader.mark();
                self.emitter.mark();
                self.machine_helper.mark();
            }

            match consume(self) {
                Ok(ControlToken::Continue) => (),
                Ok(ControlToken::Eof) => {
                    self.eof = true;
                    self.emitter.emit_eof();
                }
                Err(e) => break Some(Err(e)),
            }
        }
    }
}

/// A kind of tokenizer that directly yields tokens when used as an iterator, so `Token` instead of
/// `Result<Token, _>`.
///
/// This is the return value of [`Tokenizer::infallible`].
#[derive(Debug)]
pub struct InfallibleTokenizer<R: Reader<Error = Infallible>, E: Emitter>(Tokenizer<R, E>);

impl<R: Reader<Error = Infallible>, E: Emitter> Tokenizer<R, E> {
    /// Statically assert that this iterator is infallible.
    ///
    /// Call this to get rid of error handling when parsing HTML from strings.
    pub fn infallible(self) -> InfallibleTokenizer<R, E> {
        InfallibleTokenizer(self)
    }
}

impl<R: Reader<Error = Infallible>, E: Emitter> Iterator for InfallibleTokenizer<R, E> {
    type Item = E::Token;

    fn next(&mut self) -> Option<Self::Item> {
        match self.0.next()? {
            Ok(token) => Some(token),
            Err(e) => match e {},
        }
    }
}
