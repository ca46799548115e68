use crate::entities::{c1_replacement, lookup, Lookup};
use crate::machine_helper::MachineState;
use crate::read_helper::fast_read_char;
use crate::utils::{
    control_pat, ctostr, noncharacter_pat, surrogate_pat, with_lowercase_str, ControlToken,
};
use crate::{Emitter, Error, Reader, Tokenizer};

// Note: This is not implemented as a method on Tokenizer because there's fields on Tokenizer that
// should not be available in this method, such as the eof flag.
#[inline]
pub(crate) fn consume<R: Reader, E: Emitter>(
    slf: &mut Tokenizer<R, E>,
) -> Result<ControlToken, R::Error> {
    macro_rules! mutate_character_reference {
        (* $mul:literal + $x:ident - $sub:literal) => {
            match slf
                .machine_helper
                .character_reference_code
                .checked_mul($mul)
                .and_then(|cr| cr.checked_add($x as u32 - $sub))
            {
                Some(cr) => slf.machine_helper.character_reference_code = cr,
                None => {
                    // provoke err
                    slf.machine_helper.character_reference_code = 0x110000;
                }
            };
        };
    }

    macro_rules! switch_to {
        ($state:ident) => {{
            slf.machine_helper.switch_to(MachineState::$state);
            cont!()
        }};
    }

    macro_rules! enter_state {
        ($state:ident) => {{
            slf.machine_helper.enter_state(MachineState::$state);
            cont!()
        }};
    }

    macro_rules! exit_state {
        () => {{
            slf.machine_helper.exit_state();
            cont!()
        }};
    }

    macro_rules! reconsume_in {
        ($c:expr, $state:ident) => {{
            let c = $c;
            slf.reader.unread_byte(c);
            slf.machine_helper.switch_to(MachineState::$state);
            cont!()
        }};
    }

    macro_rules! reconsume_in_return_state {
        ($c:expr) => {{
            let c = $c;
            slf.reader.unread_byte(c);
            slf.machine_helper.exit_state();
            cont!()
        }};
    }

    macro_rules! emit_current_tag_and_switch_to_data {
        () => {{
            let next_state = slf.emitter.emit_current_tag();
            slf.machine_helper
                .switch_to(next_state.map_or(MachineState::Data, MachineState::from));
            cont!()
        }};
    }

    macro_rules! cont {
        () => {{
            return Ok(ControlToken::Continue);
        }};
    }

    macro_rules! eof {
        () => {{
            return Ok(ControlToken::Eof);
        }};
    }

    macro_rules! read_byte {
        () => {
            slf.reader.read_byte()
        };
    }

    macro_rules! error {
        ($e:expr) => {
            slf.emitter.emit_error($e);
        };
    }

    match slf.machine_helper.state {
        MachineState::Data => fast_read_char!(
            slf,
            [b'&', b'<', b'\0'],
            match xs {
                Some(b"&") => {
                    enter_state!(CharacterReference)
                }
                Some(b"<") => {
                    switch_to!(TagOpen)
                }
                Some(b"\0") => {
                    error!(Error::UnexpectedNullCharacter);
                    slf.emitter.emit_string(b"\0");
                    cont!()
                }
                Some(xs) => {
                    slf.emitter.emit_string(xs);
                    cont!()
                }
                None => {
                    eof!()
                }
            }
        ),
        MachineState::RcData => fast_read_char!(
            slf,
            [b'&', b'<', b'\0'],
            match xs {
                Some(b"&") => {
                    enter_state!(CharacterReference)
                }
                Some(b"<") => {
                    switch_to!(RcDataLessThanSign)
                }
                Some(b"\0") => {
                    error!(Error::UnexpectedNullCharacter);
                    slf.emitter.emit_string("\u{fffd}".as_bytes());
                    cont!()
                }
                Some(xs) => {
                    slf.emitter.emit_string(xs);
                    cont!()
                }
                None => {
                    eof!()
                }
            }
        ),
        MachineState::RawText => fast_read_char!(
            slf,
            [b'<', b'\0'],
            match xs {
                Some(b"<") => {
                    switch_to!(RawTextLessThanSign)
                }
                Some(b"\0") => {
                    error!(Error::UnexpectedNullCharacter);
                    slf.emitter.emit_string("\u{fffd}".as_bytes());
                    cont!()
                }
                Some(xs) => {
                    slf.emitter.emit_string(xs);
                    cont!()
                }
                None => {
                    eof!()
                }
            }
        ),
        MachineState::PlainText => fast_read_char!(
            slf,
            [b'\0'],
            match xs {
                Some(b"\0") => {
                    error!(Error::UnexpectedNullCharacter);
                    slf.emitter.emit_string("\u{fffd}".as_bytes());
                    cont!()
                }
                Some(xs) => {
                    slf.emitter.emit_string(xs);
                    cont!()
                }
                None => {
                    eof!()
                }
            }
        ),
        MachineState::TagOpen => match read_byte!()? {
            Some(b'!') => {
                switch_to!(MarkupDeclarationOpen)
            }
            Some(b'/') => {
                switch_to!(EndTagOpen)
            }
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.init_start_tag();
                reconsume_in!(Some(x), TagName)
            }
            c @ Some(b'?') => {
                error!(Error::UnexpectedQuestionMarkInsteadOfTagName);
                slf.emitter.init_comment();
                reconsume_in!(c, BogusComment)
            }
            None => {
                error!(Error::EofBeforeTagName);
                slf.emitter.emit_string(b"<");
                eof!()
            }
            c => {
                error!(Error::InvalidFirstCharacterOfTagName);
                slf.emitter.emit_string(b"<");
                reconsume_in!(c, Data)
            }
        },
        MachineState::EndTagOpen => match read_byte!()? {
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.init_end_tag();
                reconsume_in!(Some(x), TagName)
            }
            Some(b'>') => {
                error!(Error::MissingEndTagName);
                switch_to!(Data)
            }
            None => {
                error!(Error::EofBeforeTagName);
                slf.emitter.emit_string(b"</");
                eof!()
            }
            c => {
                error!(Error::InvalidFirstCharacterOfTagName);
                slf.emitter.init_comment();
                reconsume_in!(c, BogusComment)
            }
        },
        MachineState::TagName => fast_read_char!(
            slf,
            [b'\t', b'\n', b'\r', b'\x0C', b' ', b'/', b'>', b'\0'],
            match xs {
                Some(b"\t" | b"\n" | b"\r" | b"\x0C" | b" ") => {
                    switch_to!(BeforeAttributeName)
                }
                Some(b"/") => {
                    switch_to!(SelfClosingStartTag)
                }
                Some(b">") => {
                    emit_current_tag_and_switch_to_data!()
                }
                Some(b"\0") => {
                    error!(Error::UnexpectedNullCharacter);
                    slf.emitter.push_tag_name("\u{fffd}".as_bytes());
                    cont!()
                }
                Some(xs) => {
                    let emitter = &mut slf.emitter;
                    with_lowercase_str(xs, |xs| {
                        emitter.push_tag_name(xs);
                    });
                    cont!()
                }
                None => {
                    error!(Error::EofInTag);
                    eof!()
                }
            }
        ),
        MachineState::RcDataLessThanSign => match read_byte!()? {
            Some(b'/') => {
                slf.machine_helper.temporary_buffer.clear();
                switch_to!(RcDataEndTagOpen)
            }
            c => {
                slf.emitter.emit_string(b"<");
                reconsume_in!(c, RcData)
            }
        },
        MachineState::RcDataEndTagOpen => match read_byte!()? {
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.init_end_tag();
                reconsume_in!(Some(x), RcDataEndTagName)
            }
            c => {
                slf.emitter.emit_string(b"</");
                reconsume_in!(c, RcData)
            }
        },
        MachineState::RcDataEndTagName => match read_byte!()? {
            Some(b'\t' | b'\n' | b'\r' | b'\x0C' | b' ')
                if slf.emitter.current_is_appropriate_end_tag_token() =>
            {
                switch_to!(BeforeAttributeName)
            }
            Some(b'/') if slf.emitter.current_is_appropriate_end_tag_token() => {
                switch_to!(SelfClosingStartTag)
            }
            Some(b'>') if slf.emitter.current_is_appropriate_end_tag_token() => {
                emit_current_tag_and_switch_to_data!()
            }
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.push_tag_name(&[x.to_ascii_lowercase()]);
                slf.machine_helper.temporary_buffer.push(x);
                cont!()
            }
            c => {
                slf.emitter.emit_string(b"</");
                slf.machine_helper.flush_buffer_characters(&mut slf.emitter);
                reconsume_in!(c, RcData)
            }
        },
        MachineState::RawTextLessThanSign => match read_byte!()? {
            Some(b'/') => {
                slf.machine_helper.temporary_buffer.clear();
                switch_to!(RawTextEndTagOpen)
            }
            c => {
                slf.emitter.emit_string(b"<");
                reconsume_in!(c, RawText)
            }
        },
        MachineState::RawTextEndTagOpen => match read_byte!()? {
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.init_end_tag();
                reconsume_in!(Some(x), RawTextEndTagName)
            }
            c => {
                slf.emitter.emit_string(b"</");
                reconsume_in!(c, RawText)
            }
        },
        MachineState::RawTextEndTagName => match read_byte!()? {
            Some(b'\t' | b'\n' | b'\r' | b'\x0C' | b' ')
                if slf.emitter.current_is_appropriate_end_tag_token() =>
            {
                switch_to!(BeforeAttributeName)
            }
            Some(b'/') if slf.emitter.current_is_appropriate_end_tag_token() => {
                switch_to!(SelfClosingStartTag)
            }
            Some(b'>') if slf.emitter.current_is_appropriate_end_tag_token() => {
                emit_current_tag_and_switch_to_data!()
            }
            Some(x) if x.is_ascii_alphabetic() => {
                slf.emitter.push_tag_name(&[x.to_ascii_lowercase()]);
                slf.machine_helper.temporary_buffer.push(x);
                cont!()
            }
            c => {
                slf.emitter.emit_string(b"</");
                slf.machine_helper.flush_buffer_characters(&mut slf.emitter);
                reconsume_in!(c, RawText)
            }
        },
        MachineState::BeforeAttributeName => match read_byte!()? {
            Some(b'\t' | b'\n' | b'\r' | b'\x0C' | b' ') => cont!(),
            c @ (Some(b'/' | b'>') | None) => {
                reconsume_in!(c, AfterAttributeName)
            }
            Some(b'=') => {
                error!(Error::UnexpectedEqualsSignBeforeAttributeName);
                slf.emitter.init_attribute();
                slf.emitter.push_attribute_name(b"=");
                switch_to!(AttributeName)
            }
            Some(x) => {
                slf.emitter.init_attribute();
                reconsume_in!(Some(x), AttributeName)
            }
        },
        MachineState::AttributeName => fast_read_char!(
            slf,
            [b'\t', b'\n', b'\r', b'\x0C', b' ', b'/', b'>', b'=', b'\0', b'"', b'\'', b'<'],
            match xs {
                Some(x @ (b"\t" | b"\n" | b"\r" | b"\x0C" | b" " | b"/" | b">")) => {
                    reconsume_in!(Some(x[0]), AfterAttributeName)
                }
                Some(b"=") => {
                    switch_to!(BeforeAttributeValue)
                }
                Some(b"\0") => {
                    error!(Error::UnexpectedNullCharacter);
                    slf.emitter.push_attribute_name("\u{fffd}".as_bytes());
                    cont!()
                }
                Some(x @ (b"\"" | b"'" | b"<")) => {
                    error!(Error::UnexpectedCharacterInAttributeName);
                    slf.emitter.push_attribute_name(x);
                    cont!()
                }
                Some(xs) => {
                    let emitter = &mut slf.emitter;
                    with_lowercase_str(xs, |xs| {
                        emitter.push_attribute_name(xs);
                    });
                    cont!()
                }
                None => {
                    reconsume_in!(None, AfterAttributeName)
                }
            }
        ),
        MachineState::AfterAttributeName => match read_byte!()? {
            Some(b'\t' | b'\n' | b'\r' | b'\x0C' | b' ') => cont!(),
            Some(b'/') => {
                switch_to!(SelfClosingStartTag)
            }
            Some(b'=') => {
                switch_to!(BeforeAttributeValue)
            }
            Some(b'>') => {
                emit_current_tag_and_switch_to_data!()
            }
            None => {
                error!(Error::EofInTag);
                eof!()
            }
            Some(x) => {
                slf.emitter.init_attribute();
                reconsume_in!(Some(x), AttributeName)
            }
        },
        MachineState::BeforeAttributeValue => match read_byte!()? {
            Some(b'\t' | b'\n' | b'\r' | b'\x0C' | b' ') => cont!(),
            Some(b'"') => {
                switch_to!(AttributeValueDoubleQuoted)
            }
            Some(b'\'') => {
                switch_to!(AttributeValueSingleQuoted)
            }
            Some(b'>') => {
                error!(Error::MissingAttributeValue);
                emit_current_tag_and_switch_to_data!()
            }
            c => {
                reconsume_in!(c, AttributeValueUnquoted)
            }
        },
        MachineState::AttributeValueDoubleQuoted => fast_read_char!(
            slf,
            [b'"', b'&', b'\0'],
            match xs {
                Some(b"\"") => {
                    switch_to!(AfterAttributeValueQuoted)
                }
                Some(b"&") => {
                    enter_state!(CharacterReference)
                }
                Some(b"\0") => {
                    error!(Error::UnexpectedNullCharacter);
                    slf.emitter.push_attribute_value("\u{fffd}".as_bytes());
                    cont!()
                }
                Some(xs) => {
                    slf.emitter.push_attribute_value(xs);
                    cont!()
                }
                None => {
                    error!(Error::EofInTag);
                    eof!()
                }
            }
        ),
        MachineState::AttributeValueSingleQuoted => fast_read_char!(
            slf,
            [b'\'', b'&', b'\0'],
            match xs {
                Some(b"'") => {
                    switch_to!(AfterAttributeValueQuoted)
                }
                Some(b"&") => {
                    enter_state!(CharacterReference)
                }
                Some(b"\0") => {
                    error!(Error::UnexpectedNullCharacter);
                    slf.emitter.push_attribute_value("\u{fffd}".as_bytes());
                    cont!()
                }
                Some(xs) => {
                    slf.emitter.push_attribute_value(xs);
                    cont!()
                }
                None => {
                    error!(Error::EofInTag);
                    eof!()
                }
            }
        ),
        MachineState::AttributeValueUnquoted => fast_read_char!(
            slf,
            [b'\t', b'\n', b'\r', b'\x0C', b' ', b'&', b'>', b'\0', b'"', b'\'', b'<', b'=', b'`'],
            match xs {
                Some(b"\t" | b"\n" | b"\r" | b"\x0C" | b" ") => {
                    switch_to!(BeforeAttributeName)
                }
                Some(b"&") => {
                    enter_state!(CharacterReference)
                }
                Some(b">") => {
                    emit_current_tag_and_switch_to_data!()
                }
                Some(b"\0") => {
                    error!(Error::UnexpectedNullCharacter);
                    slf.emitter.push_attribute_value("\u{fffd}".as_bytes());
                    cont!()
                }
                Some(x @ (b"\"" | b"'" | b"<" | b"=" | b"`")) => {
                    error!(Error::UnexpectedCharacterInUnquotedAttributeValue);
                    slf.emitter.push_attribute_value(x);
                    cont!()
                }
                Some(xs) => {
                    slf.emitter.push_attribute_value(xs);
                    cont!()
                }
                None => {
                    error!(Error::EofInTag);
                    eof!()
                }
            }
        ),
        MachineState::AfterAttributeValueQuoted => match read_byte!()? {
            c @ (Some(b'\t' | b'\n' | b'\r' | b'\x0C' | b' ' | b'/' | b'>') | None) => {
                reconsume_in!(c, BeforeAttributeName)
            }
            c => {
                error!(Error::MissingWhitespaceBetweenAttributes);
                reconsume_in!(c, BeforeAttributeName)
            }
        },
        MachineState::SelfClosingStartTag => match read_byte!()? {
            Some(b'>') => {
                slf.emitter.set_self_closing();
                emit_current_tag_and_switch_to_data!()
            }
            None => {
                error!(Error::EofInTag);
                eof!()
            }
            c => {
                error!(Error::UnexpectedSolidusInTag);
                reconsume_in!(c, BeforeAttributeName)
            }
        },
        MachineState::BogusComment => fast_read_char!(
            slf,
            [b'>', b'\0'],
            match xs {
                Some(b">") => {
                    slf.emitter.emit_current_comment();
                    switch_to!(Data)
                }
                Some(b"\0") => {
                    error!(Error::UnexpectedNullCharacter);
                    slf.emitter.push_comment("\u{fffd}".as_bytes());
                    cont!()
                }
                Some(xs) => {
                    slf.emitter.push_comment(xs);
                    cont!()
                }
                None => {
                    slf.emitter.emit_current_comment();
                    eof!()
                }
            }
        ),
        MachineState::MarkupDeclarationOpen => {
            if slf.reader.try_read_string(b"--", true)? {
                slf.emitter.init_comment();
                switch_to!(CommentStart)
            } else if slf.reader.try_read_string(b"doctype", false)? {
                slf.emitter.init_doctype();
                switch_to!(Doctype)
            } else if slf.reader.try_read_string(b"[CDATA[", true)? {
                // no foreign content without a tree builder, so CDATA is always bogus
                error!(Error::CdataInHtmlContent);
                slf.emitter.init_comment();
                slf.emitter.push_comment(b"[CDATA[");
                switch_to!(BogusComment)
            } else {
                error!(Error::IncorrectlyOpenedComment);
                slf.emitter.init_comment();
                switch_to!(BogusComment)
            }
        }
        MachineState::CommentStart => match read_byte!()? {
            Some(b'-') => {
                switch_to!(CommentStartDash)
            }
            Some(b'>') => {
                error!(Error::AbruptClosingOfEmptyComment);
                slf.emitter.emit_current_comment();
                switch_to!(Data)
            }
            c => {
                reconsume_in!(c, Comment)
            }
        },
        MachineState::CommentStartDash => match read_byte!()? {
            Some(b'-') => {
                switch_to!(CommentEnd)
            }
            Some(b'>') => {
                error!(Error::AbruptClosingOfEmptyComment);
                slf.emitter.emit_current_comment();
                switch_to!(Data)
            }
            None => {
                error!(Error::EofInComment);
                slf.emitter.emit_current_comment();
                eof!()
            }
            c => {
                slf.emitter.push_comment(b"-");
                reconsume_in!(c, Comment)
            }
        },
        MachineState::Comment => fast_read_char!(
            slf,
            [b'-', b'\0'],
            match xs {
                Some(b"-") => {
                    switch_to!(CommentEndDash)
                }
                Some(b"\0") => {
                    error!(Error::UnexpectedNullCharacter);
                    slf.emitter.push_comment("\u{fffd}".as_bytes());
                    cont!()
                }
                Some(xs) => {
                    slf.emitter.push_comment(xs);
                    cont!()
                }
                None => {
                    error!(Error::EofInComment);
                    slf.emitter.emit_current_comment();
                    eof!()
                }
            }
        ),
        MachineState::CommentEndDash => match read_byte!()? {
            Some(b'-') => {
                switch_to!(CommentEnd)
            }
            None => {
                error!(Error::EofInComment);
                slf.emitter.emit_current_comment();
                eof!()
            }
            c => {
                slf.emitter.push_comment(b"-");
                reconsume_in!(c, Comment)
            }
        },
        MachineState::CommentEnd => match read_byte!()? {
            Some(b'>') => {
                slf.emitter.emit_current_comment();
                switch_to!(Data)
            }
            Some(b'!') => {
                switch_to!(CommentEndBang)
            }
            Some(b'-') => {
                slf.emitter.push_comment(b"-");
                cont!()
            }
            None => {
                error!(Error::EofInComment);
                slf.emitter.emit_current_comment();
                eof!()
            }
            c => {
                slf.emitter.push_comment(b"--");
                reconsume_in!(c, Comment)
            }
        },
        MachineState::CommentEndBang => match read_byte!()? {
            Some(b'-') => {
                slf.emitter.push_comment(b"--!");
                switch_to!(CommentEndDash)
            }
            Some(b'>') => {
                error!(Error::IncorrectlyClosedComment);
                slf.emitter.emit_current_comment();
                switch_to!(Data)
            }
            None => {
                error!(Error::EofInComment);
                slf.emitter.emit_current_comment();
                eof!()
            }
            c => {
                slf.emitter.push_comment(b"--!");
                reconsume_in!(c, Comment)
            }
        },
        MachineState::Doctype => fast_read_char!(
            slf,
            [b'>', b'\0'],
            match xs {
                Some(b">") => {
                    slf.emitter.emit_current_doctype();
                    switch_to!(Data)
                }
                Some(b"\0") => {
                    error!(Error::UnexpectedNullCharacter);
                    slf.emitter.push_doctype("\u{fffd}".as_bytes());
                    cont!()
                }
                Some(xs) => {
                    slf.emitter.push_doctype(xs);
                    cont!()
                }
                None => {
                    error!(Error::EofInDoctype);
                    slf.emitter.emit_current_doctype();
                    eof!()
                }
            }
        ),
        MachineState::CharacterReference => {
            slf.machine_helper.temporary_buffer.clear();
            slf.machine_helper.temporary_buffer.push(b'&');

            match read_byte!()? {
                Some(x) if x.is_ascii_alphanumeric() => {
                    reconsume_in!(Some(x), NamedCharacterReference)
                }
                Some(b'#') => {
                    slf.machine_helper.temporary_buffer.push(b'#');
                    switch_to!(NumericCharacterReference)
                }
                c => {
                    slf.machine_helper
                        .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
                    reconsume_in_return_state!(c)
                }
            }
        }
        MachineState::NamedCharacterReference => {
            // temporary_buffer holds "&" followed by the name read so far. Read as far as the
            // name could still be a prefix of a known reference, remembering the longest match.
            let mut longest_match = None;
            loop {
                match read_byte!()? {
                    Some(x) if x.is_ascii_alphanumeric() || x == b';' => {
                        slf.machine_helper.temporary_buffer.push(x);
                        match lookup(&slf.machine_helper.temporary_buffer[1..]) {
                            Lookup::Match(c1, c2) => {
                                longest_match =
                                    Some((slf.machine_helper.temporary_buffer.len(), c1, c2));
                            }
                            Lookup::Prefix => (),
                            Lookup::NoMatch => break,
                        }
                        if x == b';' {
                            break;
                        }
                    }
                    c => {
                        slf.reader.unread_byte(c);
                        break;
                    }
                }
            }

            let (match_len, c1, c2) = match longest_match {
                Some(x) => x,
                None => {
                    let overread = slf.machine_helper.temporary_buffer.split_off(1);
                    slf.reader.unread_bytes(&overread);
                    slf.machine_helper
                        .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
                    switch_to!(AmbiguousAmpersand)
                }
            };

            let overread = slf.machine_helper.temporary_buffer.split_off(match_len);
            slf.reader.unread_bytes(&overread);
            let ends_with_semicolon = slf.machine_helper.temporary_buffer.last() == Some(&b';');
            let next_character = read_byte!()?;
            slf.reader.unread_byte(next_character);

            if slf.machine_helper.is_consumed_as_part_of_an_attribute()
                && !ends_with_semicolon
                && matches!(next_character, Some(x) if x == b'=' || x.is_ascii_alphanumeric())
            {
                // for historical reasons, `&copy=` and `&copyx` stay literal in attribute values.
                // the buffer already holds the name as written.
            } else {
                if !ends_with_semicolon {
                    error!(Error::MissingSemicolonAfterCharacterReference);
                }

                let buf = &mut slf.machine_helper.temporary_buffer;
                buf.clear();
                buf.extend_from_slice(ctostr!(c1).as_bytes());
                if let Some(c2) = c2 {
                    buf.extend_from_slice(ctostr!(c2).as_bytes());
                }
            }

            slf.machine_helper
                .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
            exit_state!()
        }
        MachineState::AmbiguousAmpersand => match read_byte!()? {
            Some(x) if x.is_ascii_alphanumeric() => {
                if slf.machine_helper.is_consumed_as_part_of_an_attribute() {
                    slf.emitter.push_attribute_value(&[x]);
                } else {
                    slf.emitter.emit_string(&[x]);
                }

                cont!()
            }
            c @ Some(b';') => {
                error!(Error::UnknownNamedCharacterReference);
                reconsume_in_return_state!(c)
            }
            c => {
                reconsume_in_return_state!(c)
            }
        },
        MachineState::NumericCharacterReference => {
            slf.machine_helper.character_reference_code = 0;

            match read_byte!()? {
                Some(x @ (b'x' | b'X')) => {
                    slf.machine_helper.temporary_buffer.push(x);
                    switch_to!(HexadecimalCharacterReferenceStart)
                }
                Some(x @ b'0'..=b'9') => {
                    reconsume_in!(Some(x), DecimalCharacterReference)
                }
                c => {
                    error!(Error::AbsenceOfDigitsInNumericCharacterReference);
                    slf.machine_helper
                        .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
                    reconsume_in_return_state!(c)
                }
            }
        }
        MachineState::HexadecimalCharacterReferenceStart => match read_byte!()? {
            c @ Some(b'0'..=b'9' | b'A'..=b'F' | b'a'..=b'f') => {
                reconsume_in!(c, HexadecimalCharacterReference)
            }
            c => {
                error!(Error::AbsenceOfDigitsInNumericCharacterReference);
                slf.machine_helper
                    .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
                reconsume_in_return_state!(c)
            }
        },
        MachineState::HexadecimalCharacterReference => match read_byte!()? {
            Some(x @ b'0'..=b'9') => {
                mutate_character_reference!(*16 + x - 0x0030);
                cont!()
            }
            Some(x @ b'A'..=b'F') => {
                mutate_character_reference!(*16 + x - 0x0037);
                cont!()
            }
            Some(x @ b'a'..=b'f') => {
                mutate_character_reference!(*16 + x - 0x0057);
                cont!()
            }
            Some(b';') => {
                switch_to!(NumericCharacterReferenceEnd)
            }
            c => {
                error!(Error::MissingSemicolonAfterCharacterReference);
                reconsume_in!(c, NumericCharacterReferenceEnd)
            }
        },
        MachineState::DecimalCharacterReference => match read_byte!()? {
            Some(x @ b'0'..=b'9') => {
                mutate_character_reference!(*10 + x - 0x0030);
                cont!()
            }
            Some(b';') => {
                switch_to!(NumericCharacterReferenceEnd)
            }
            c => {
                error!(Error::MissingSemicolonAfterCharacterReference);
                reconsume_in!(c, NumericCharacterReferenceEnd)
            }
        },
        MachineState::NumericCharacterReferenceEnd => {
            let code = match slf.machine_helper.character_reference_code {
                0x00 => {
                    error!(Error::NullCharacterReference);
                    0xfffd
                }
                0x110000.. => {
                    error!(Error::CharacterReferenceOutsideUnicodeRange);
                    0xfffd
                }
                surrogate_pat!() => {
                    error!(Error::SurrogateCharacterReference);
                    0xfffd
                }
                x @ noncharacter_pat!() => {
                    error!(Error::NoncharacterCharacterReference);
                    x
                }
                // 0x000d, or a control that is not whitespace
                x @ 0x000d | x @ control_pat!()
                    if !matches!(x, 0x0009 | 0x000a | 0x000c | 0x0020) =>
                {
                    error!(Error::ControlCharacterReference);
                    c1_replacement(x).map_or(x, u32::from)
                }
                x => x,
            };

            let buf = &mut slf.machine_helper.temporary_buffer;
            buf.clear();
            buf.extend_from_slice(
                ctostr!(std::char::from_u32(code).unwrap_or('\u{fffd}')).as_bytes(),
            );
            slf.machine_helper
                .flush_code_points_consumed_as_character_reference(&mut slf.emitter);
            exit_state!()
        }
    }
}
