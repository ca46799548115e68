macro_rules! impl_error {
    ($(
        $string:literal <=> $variant:ident,
    )*) => {
        /// All [parsing errors](https://html.spec.whatwg.org/#parse-errors) this tokenizer can emit.
        ///
        /// None of them abort tokenization. They are informational, and the tokenizer recovers
        /// from each one the way an HTML5 browser would.
        #[derive(Debug, Eq, PartialEq, Clone, Copy)]
        pub enum Error {
            $(
                #[doc = concat!("This error corresponds to the `", $string, "` error found in the WHATWG spec.")]
                $variant
            ),*
        }
        impl std::str::FromStr for Error {
            type Err = ();

            /// Parse a `kebap-case` error code as typically written in the WHATWG spec into an
            /// enum variant.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $string => Ok(Self::$variant), )*
                    _ => Err(())
                }
            }
        }

        impl Error {
            /// Convert an enum variant back into the `kebap-case` error code as typically written
            /// in the WHATWG spec.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match *self {
                    $( Self::$variant => $string, )*
                }
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Whether this error means the attribute list of the current tag could not be split into
    /// name/value pairs cleanly, for example because of a stray quote.
    ///
    /// Tags that saw such an error are flagged as [`crate::StartTag::malformed`].
    #[must_use]
    pub fn is_malformed_attribute(&self) -> bool {
        matches!(self, Error::UnexpectedCharacterInAttributeName)
    }
}

impl_error! {
    "abrupt-closing-of-empty-comment" <=> AbruptClosingOfEmptyComment,
    "absence-of-digits-in-numeric-character-reference" <=> AbsenceOfDigitsInNumericCharacterReference,
    "cdata-in-html-content" <=> CdataInHtmlContent,
    "character-reference-outside-unicode-range" <=> CharacterReferenceOutsideUnicodeRange,
    "control-character-reference" <=> ControlCharacterReference,
    "duplicate-attribute" <=> DuplicateAttribute,
    "end-tag-with-attributes" <=> EndTagWithAttributes,
    "end-tag-with-trailing-solidus" <=> EndTagWithTrailingSolidus,
    "eof-before-tag-name" <=> EofBeforeTagName,
    "eof-in-comment" <=> EofInComment,
    "eof-in-doctype" <=> EofInDoctype,
    "eof-in-tag" <=> EofInTag,
    "incorrectly-closed-comment" <=> IncorrectlyClosedComment,
    "incorrectly-opened-comment" <=> IncorrectlyOpenedComment,
    "invalid-first-character-of-tag-name" <=> InvalidFirstCharacterOfTagName,
    "missing-attribute-value" <=> MissingAttributeValue,
    "missing-end-tag-name" <=> MissingEndTagName,
    "missing-semicolon-after-character-reference" <=> MissingSemicolonAfterCharacterReference,
    "missing-whitespace-between-attributes" <=> MissingWhitespaceBetweenAttributes,
    "noncharacter-character-reference" <=> NoncharacterCharacterReference,
    "null-character-reference" <=> NullCharacterReference,
    "surrogate-character-reference" <=> SurrogateCharacterReference,
    "unexpected-character-in-attribute-name" <=> UnexpectedCharacterInAttributeName,
    "unexpected-character-in-unquoted-attribute-value" <=> UnexpectedCharacterInUnquotedAttributeValue,
    "unexpected-equals-sign-before-attribute-name" <=> UnexpectedEqualsSignBeforeAttributeName,
    "unexpected-null-character" <=> UnexpectedNullCharacter,
    "unexpected-question-mark-instead-of-tag-name" <=> UnexpectedQuestionMarkInsteadOfTagName,
    "unexpected-solidus-in-tag" <=> UnexpectedSolidusInTag,
    "unknown-named-character-reference" <=> UnknownNamedCharacterReference,
}

#[test]
fn test_error_codes_roundtrip() {
    let err: Error = "missing-whitespace-between-attributes".parse().unwrap();
    assert_eq!(err, Error::MissingWhitespaceBetweenAttributes);
    assert_eq!(err.to_string(), "missing-whitespace-between-attributes");
    assert!(!err.is_malformed_attribute());
    assert!(Error::UnexpectedCharacterInAttributeName.is_malformed_attribute());
    assert!(!Error::EofInTag.is_malformed_attribute());
    assert!("not-an-error".parse::<Error>().is_err());
}
