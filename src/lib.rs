#![deny(missing_docs)]
// This is an HTML parser. HTML can be untrusted input from the internet.
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod emitter;
mod entities;
mod error;
mod extract;
mod feed;
mod machine;
mod machine_helper;
mod read_helper;
mod reader;
mod scanner;
mod tokenizer;
mod utils;

#[doc(hidden)]
pub mod testutils;

pub use emitter::{
    naive_next_state, Attribute, DefaultEmitter, Emitter, EndTag, HtmlString, StartTag, Token,
};
pub use error::Error;
pub use extract::{extract_input_values, input_value, InputValueExtractor};
pub use feed::{FeedReader, NeedMoreInput};
pub use reader::{Readable, Reader, StringReader};
pub use scanner::{Scanner, TagHandler};
pub use tokenizer::{InfallibleTokenizer, Tokenizer};
pub use utils::State;
