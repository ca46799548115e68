//! Pick the `value` of `<input>` elements by their `name`.
use std::io::{self, Write};

use crate::utils::trace_log;
use crate::{Scanner, StartTag, TagHandler};

/// If `tag` is an `<input>` whose `name` is exactly `field_name`, return its `value`.
///
/// Attribute lookups go through [`StartTag::attribute_map`], so when an attribute is repeated the
/// last occurrence counts. A missing or valueless `value` attribute yields an empty value. Tags
/// with a [malformed](StartTag::malformed) attribute list never match.
///
/// ```
/// use extract_input_value::{input_value, Token, Tokenizer};
///
/// for token in Tokenizer::new(r#"<input name="q" value="1"><input name="r" value="2">"#).infallible() {
///     if let Token::StartTag(tag) = token {
///         if let Some(value) = input_value(&tag, b"r") {
///             assert_eq!(value, b"2");
///         }
///     }
/// }
/// ```
#[must_use]
pub fn input_value<'a>(tag: &'a StartTag, field_name: &[u8]) -> Option<&'a [u8]> {
    if tag.name != "input" {
        return None;
    }

    if tag.malformed {
        trace_log!("input_value: skipping malformed tag {:?}", tag);
        return None;
    }

    let attributes = tag.attribute_map();
    if attributes.get(b"name".as_slice()) != Some(&field_name) {
        return None;
    }

    Some(attributes.get(b"value".as_slice()).copied().unwrap_or_default())
}

/// A [`TagHandler`] that writes the value of every matching `<input>` to `out`, one per line.
///
/// Values are written as raw bytes. They are not escaped, so a value containing a newline
/// spans multiple output lines.
#[derive(Debug)]
pub struct InputValueExtractor<W: Write> {
    field_name: Vec<u8>,
    out: W,
    matches: usize,
}

impl<W: Write> InputValueExtractor<W> {
    /// Create an extractor for inputs called `field_name`.
    pub fn new(field_name: impl Into<Vec<u8>>, out: W) -> Self {
        InputValueExtractor {
            field_name: field_name.into(),
            out,
            matches: 0,
        }
    }

    /// How many values have been written so far.
    pub fn matches(&self) -> usize {
        self.matches
    }

    /// Flush and return the writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> TagHandler for InputValueExtractor<W> {
    type Error = io::Error;

    fn start_tag(&mut self, tag: &StartTag) -> io::Result<()> {
        if let Some(value) = input_value(tag, &self.field_name) {
            trace_log!("match: {:?}", String::from_utf8_lossy(value));
            self.matches += 1;
            self.out.write_all(value)?;
            self.out.write_all(b"\n")?;
        }

        Ok(())
    }
}

/// Scan a complete document and collect the value of every `<input>` called `field_name`, in
/// document order.
///
/// ```
/// use extract_input_value::extract_input_values;
///
/// let html = r#"<form><input type="hidden" name="csrf" value="abc123"></form>"#;
/// assert_eq!(extract_input_values(html.as_bytes(), "csrf"), vec![b"abc123".to_vec()]);
/// ```
#[must_use]
pub fn extract_input_values(html: &[u8], field_name: &str) -> Vec<Vec<u8>> {
    struct Collect<'a> {
        field_name: &'a [u8],
        values: Vec<Vec<u8>>,
    }

    impl TagHandler for Collect<'_> {
        type Error = std::convert::Infallible;

        fn start_tag(&mut self, tag: &StartTag) -> Result<(), Self::Error> {
            if let Some(value) = input_value(tag, self.field_name) {
                self.values.push(value.to_vec());
            }
            Ok(())
        }
    }

    let mut scanner = Scanner::new(Collect {
        field_name: field_name.as_bytes(),
        values: Vec::new(),
    });
    let Ok(()) = scanner.feed(html);
    let Ok(collect) = scanner.close();
    collect.values
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn extract(html: &str, field_name: &str) -> Vec<String> {
        extract_input_values(html.as_bytes(), field_name)
            .into_iter()
            .map(|value| String::from_utf8(value).unwrap())
            .collect()
    }

    #[test]
    fn test_quoting_styles() {
        let html = r#"<input name="a" value="double"><input name='a' value='single'><input name=a value=bare>"#;
        assert_eq!(extract(html, "a"), vec!["double", "single", "bare"]);
    }

    #[test]
    fn test_single_match_with_other_attributes() {
        let html = r#"<form><input type="hidden" name="csrf" value="abc123"></form>"#;
        assert_eq!(extract(html, "csrf"), vec!["abc123"]);
    }

    #[test]
    fn test_document_order() {
        let html = r#"<input name="x" value="1"><input name="y" value="2"><input name="x" value="3">"#;
        assert_eq!(extract(html, "x"), vec!["1", "3"]);
        assert_eq!(extract(html, "y"), vec!["2"]);
    }

    #[test]
    fn test_missing_value_is_empty() {
        assert_eq!(extract(r#"<input name="check" type="checkbox">"#, "check"), vec![""]);
        assert_eq!(extract(r#"<input name="check" value>"#, "check"), vec![""]);
    }

    #[test]
    fn test_name_is_exact_and_case_sensitive() {
        let html = r#"<input name="Csrf" value="1"><input name="csrf_token" value="2"><input name=" csrf" value="3">"#;
        assert!(extract(html, "csrf").is_empty());
        assert_eq!(extract(html, "Csrf"), vec!["1"]);
    }

    #[test]
    fn test_tag_and_attribute_names_are_case_insensitive() {
        assert_eq!(extract(r#"<INPUT NAME="q" VALUE="1">"#, "q"), vec!["1"]);
    }

    #[test]
    fn test_only_input_elements() {
        let html = r#"<select name="q"><option value="1"></select><textarea name=q>2</textarea><button name=q value=3>"#;
        assert!(extract(html, "q").is_empty());
    }

    #[test]
    fn test_no_name_attribute() {
        assert!(extract(r#"<input value="1">"#, "").is_empty());
        assert!(extract(r#"<input id="q" value="1">"#, "q").is_empty());
    }

    #[test]
    fn test_character_references_are_decoded() {
        assert_eq!(
            extract(r#"<input name="q&amp;a" value="&lt;b&gt; &quot;x&quot; &#39; &eacute">"#, "q&a"),
            vec!["<b> \"x\" ' \u{e9}"]
        );
    }

    #[test]
    fn test_last_duplicate_wins() {
        assert_eq!(extract(r#"<input name="q" value="1" value="2">"#, "q"), vec!["2"]);
        assert_eq!(extract(r#"<input name="q" name="r" value="1">"#, "r"), vec!["1"]);
        assert!(extract(r#"<input name="q" name="r" value="1">"#, "q").is_empty());
    }

    #[test]
    fn test_self_closing() {
        assert_eq!(extract(r#"<input name="q" value="1"/>"#, "q"), vec!["1"]);
        assert_eq!(extract(r#"<input name="q" value="1" />"#, "q"), vec!["1"]);
    }

    #[test]
    fn test_malformed_tags_are_skipped() {
        let html = r#"<input name="q" value="1"x"><input name="q" value="2">"#;
        assert_eq!(extract(html, "q"), vec!["2"]);
        assert!(extract(r#"<input na"me="q" value="1">"#, "q").is_empty());
    }

    #[test]
    fn test_missing_whitespace_between_attributes() {
        assert_eq!(extract(r#"<input name="q"value="1">"#, "q"), vec!["1"]);
        assert_eq!(extract(r#"<input value='2'name='q'>"#, "q"), vec!["2"]);
    }

    #[test]
    fn test_markup_in_text_is_ignored() {
        let html = r#"<!-- <input name=q value=1> --><script>"<input name=q value=2>"</script><textarea><input name=q value=3></textarea><input name=q value=4>"#;
        assert_eq!(extract(html, "q"), vec!["4"]);
    }

    #[test]
    fn test_unterminated_tag_is_dropped() {
        assert!(extract(r#"<input name="q" value="1""#, "q").is_empty());
    }

    #[test]
    fn test_no_inputs() {
        assert!(extract("<p>no inputs here</p>", "anything").is_empty());
        assert!(extract("", "anything").is_empty());
    }

    #[test]
    fn test_extractor_writes_lines() {
        let mut scanner = Scanner::new(InputValueExtractor::new(
            "q",
            Vec::new(),
        ));
        scanner
            .feed(b"<input name=q value=\"a\nb\"><input name=q value=\xff>")
            .unwrap();
        let extractor = scanner.close().unwrap();
        assert_eq!(extractor.matches(), 2);
        assert_eq!(extractor.into_inner().unwrap(), b"a\nb\n\xff\n");
    }
}
