use std::{fs::File, io::BufReader, path::Path};

use extract_input_value::testutils::{trace_log, SlowReader};
use extract_input_value::{
    input_value, Error, InputValueExtractor, Readable, Reader, Scanner, StartTag, TagHandler,
    Token, Tokenizer,
};

use glob::glob;
use libtest_mimic::{Arguments, Trial};
use pretty_assertions::assert_eq;
use serde::{de::Error as _, Deserialize};

mod testutils;

#[derive(Debug, Eq, PartialEq, Clone)]
struct ParseError(Error);

impl<'de> Deserialize<'de> for ParseError {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let str_err = String::deserialize(deserializer)?;
        let err: Error = str_err
            .parse()
            .map_err(|_| D::Error::custom(format!("failed to deserialize error: {}", str_err)))?;
        Ok(ParseError(err))
    }
}

#[derive(Deserialize, Clone)]
struct TestFileEntry {
    description: String,
    input: String,
    field: String,
    output: Vec<String>,
    /// Checked only when present.
    #[serde(default)]
    errors: Option<Vec<ParseError>>,
}

#[derive(Deserialize)]
struct TestFile {
    tests: Vec<TestFileEntry>,
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    /// `Tokenizer` over the whole string
    Pull,
    /// `Tokenizer` over a reader without `read_until`
    SlowPull,
    /// `Scanner`, all input in one `feed` call
    Feed,
    /// `Scanner`, one `feed` call per byte
    FeedBytewise,
}

struct TestCase {
    mode: Mode,
    filename: String,
    test_i: usize,
    declaration: TestFileEntry,
}

#[derive(Debug, Default, PartialEq)]
struct Outcome {
    values: Vec<String>,
    errors: Vec<ParseError>,
}

/// Collects matches and parse errors from a [`Scanner`].
struct Collect<'a> {
    field: &'a str,
    outcome: Outcome,
}

impl TagHandler for Collect<'_> {
    type Error = std::convert::Infallible;

    fn start_tag(&mut self, tag: &StartTag) -> Result<(), Self::Error> {
        if let Some(value) = input_value(tag, self.field.as_bytes()) {
            self.outcome
                .values
                .push(String::from_utf8(value.to_vec()).unwrap());
        }
        Ok(())
    }

    fn parse_error(&mut self, error: Error) -> Result<(), Self::Error> {
        self.outcome.errors.push(ParseError(error));
        Ok(())
    }
}

fn produce_testcases_from_file(tests: &mut Vec<Trial>, path: &Path) {
    let fname = path.file_name().unwrap().to_str().unwrap();

    let f = File::open(path).unwrap();
    let bf = BufReader::new(f);
    let TestFile {
        tests: declarations,
    } = serde_json::from_reader(bf).unwrap();

    for (test_i, declaration) in declarations.into_iter().enumerate() {
        for mode in [Mode::Pull, Mode::SlowPull, Mode::Feed, Mode::FeedBytewise] {
            let case = TestCase {
                mode,
                filename: fname.to_owned(),
                test_i,
                declaration: declaration.clone(),
            };

            tests.push(Trial::test(
                format!("{}:{}:{:?}", fname, declaration.description, mode),
                move || testutils::catch_unwind_and_report(move || run_test(&case)),
            ));
        }
    }
}

fn main() {
    let args = Arguments::from_args();

    let mut tests = Vec::new();

    for entry in glob("tests/cases/*.json").unwrap() {
        produce_testcases_from_file(&mut tests, &entry.unwrap());
    }

    libtest_mimic::run(&args, tests).exit();
}

fn run_test(test: &TestCase) {
    trace_log(&format!(
        "==== FILE {}, TEST {}, MODE {:?} ====",
        test.filename, test.test_i, test.mode,
    ));
    trace_log(&format!("description: {}", test.declaration.description));

    let input = test.declaration.input.as_bytes();
    let field = test.declaration.field.as_str();

    let outcome = match test.mode {
        Mode::Pull => run_tokenizer(Tokenizer::new(input.to_reader()), field),
        Mode::SlowPull => run_tokenizer(Tokenizer::new(SlowReader(input.to_reader())), field),
        Mode::Feed => run_scanner(&[input], field),
        Mode::FeedBytewise => run_scanner(&input.chunks(1).collect::<Vec<_>>(), field),
    };

    assert_eq!(outcome.values, test.declaration.output);

    if let Some(ref errors) = test.declaration.errors {
        assert_eq!(outcome.errors, *errors);
    }

    if matches!(test.mode, Mode::Feed) {
        check_cli_output(test);
    }
}

fn run_tokenizer<R: Reader>(mut tokenizer: Tokenizer<R>, field: &str) -> Outcome {
    tokenizer.emitter_mut().switch_states(true);

    let mut outcome = Outcome::default();
    for token in tokenizer {
        match token.unwrap() {
            Token::StartTag(tag) => {
                if let Some(value) = input_value(&tag, field.as_bytes()) {
                    outcome
                        .values
                        .push(String::from_utf8(value.to_vec()).unwrap());
                }
            }
            Token::Error(e) => outcome.errors.push(ParseError(e)),
            _ => (),
        }
    }

    outcome
}

fn run_scanner(chunks: &[&[u8]], field: &str) -> Outcome {
    let mut scanner = Scanner::new(Collect {
        field,
        outcome: Outcome::default(),
    });

    for chunk in chunks {
        let Ok(()) = scanner.feed(chunk);
    }

    let Ok(collect) = scanner.close();
    collect.outcome
}

/// The line-based output that the binary would print.
fn check_cli_output(test: &TestCase) {
    let mut scanner = Scanner::new(InputValueExtractor::new(
        test.declaration.field.as_str(),
        Vec::new(),
    ));
    scanner.feed(test.declaration.input.as_bytes()).unwrap();
    let output = scanner.close().unwrap().into_inner().unwrap();

    let expected: String = test
        .declaration
        .output
        .iter()
        .map(|value| format!("{}\n", value))
        .collect();
    assert_eq!(String::from_utf8(output).unwrap(), expected);
}
