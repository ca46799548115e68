use crate::utils::{trace_log, State};
use crate::Emitter;

/// Every state of the tokenizer state machine.
///
/// This is the subset of the [WHATWG tokenizer states](https://html.spec.whatwg.org/#tokenization)
/// needed to find tags in HTML content, minus script data escaping and CDATA sections.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum MachineState {
    Data,
    RcData,
    RawText,
    PlainText,
    TagOpen,
    EndTagOpen,
    TagName,
    RcDataLessThanSign,
    RcDataEndTagOpen,
    RcDataEndTagName,
    RawTextLessThanSign,
    RawTextEndTagOpen,
    RawTextEndTagName,
    BeforeAttributeName,
    AttributeName,
    AfterAttributeName,
    BeforeAttributeValue,
    AttributeValueDoubleQuoted,
    AttributeValueSingleQuoted,
    AttributeValueUnquoted,
    AfterAttributeValueQuoted,
    SelfClosingStartTag,
    BogusComment,
    MarkupDeclarationOpen,
    CommentStart,
    CommentStartDash,
    Comment,
    CommentEndDash,
    CommentEnd,
    CommentEndBang,
    Doctype,
    CharacterReference,
    NamedCharacterReference,
    AmbiguousAmpersand,
    NumericCharacterReference,
    HexadecimalCharacterReferenceStart,
    HexadecimalCharacterReference,
    DecimalCharacterReference,
    NumericCharacterReferenceEnd,
}

impl MachineState {
    /// Content states are the only places where no construct is half-read.
    pub(crate) fn is_content_state(self) -> bool {
        matches!(
            self,
            MachineState::Data
                | MachineState::RcData
                | MachineState::RawText
                | MachineState::PlainText
        )
    }
}

impl From<State> for MachineState {
    fn from(state: State) -> Self {
        match state {
            State::Data => MachineState::Data,
            State::RcData => MachineState::RcData,
            State::RawText => MachineState::RawText,
            State::PlainText => MachineState::PlainText,
        }
    }
}

#[derive(Debug)]
pub(crate) struct MachineHelper {
    pub(crate) temporary_buffer: Vec<u8>,
    pub(crate) character_reference_code: u32,
    pub(crate) state: MachineState,
    return_state: Option<MachineState>,
    checkpoint: MachineState,
}

impl Default for MachineHelper {
    fn default() -> Self {
        MachineHelper {
            temporary_buffer: Vec::new(),
            character_reference_code: 0,
            state: MachineState::Data,
            return_state: None,
            checkpoint: MachineState::Data,
        }
    }
}

impl MachineHelper {
    pub(crate) fn is_consumed_as_part_of_an_attribute(&self) -> bool {
        matches!(
            self.return_state,
            Some(
                MachineState::AttributeValueDoubleQuoted
                    | MachineState::AttributeValueSingleQuoted
                    | MachineState::AttributeValueUnquoted
            )
        )
    }

    pub(crate) fn flush_code_points_consumed_as_character_reference<E: Emitter>(
        &mut self,
        emitter: &mut E,
    ) {
        if self.is_consumed_as_part_of_an_attribute() {
            emitter.push_attribute_value(&self.temporary_buffer);
            self.temporary_buffer.clear();
        } else {
            self.flush_buffer_characters(emitter);
        }
    }

    pub(crate) fn flush_buffer_characters<E: Emitter>(&mut self, emitter: &mut E) {
        emitter.emit_string(&self.temporary_buffer);
        self.temporary_buffer.clear();
    }

    pub(crate) fn enter_state(&mut self, state: MachineState) {
        debug_assert!(self.return_state.is_none());
        self.return_state = Some(self.state);
        self.switch_to(state);
    }

    pub(crate) fn pop_return_state(&mut self) -> MachineState {
        debug_assert!(self.return_state.is_some());
        self.return_state.take().unwrap_or(MachineState::Data)
    }

    pub(crate) fn exit_state(&mut self) {
        let state = self.pop_return_state();
        self.switch_to(state);
    }

    pub(crate) fn switch_to(&mut self, state: MachineState) {
        trace_log!("switch_to: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    pub(crate) fn mark(&mut self) {
        debug_assert!(self.state.is_content_state());
        self.checkpoint = self.state;
    }

    pub(crate) fn rewind(&mut self) {
        trace_log!("rewind: {:?} -> {:?}", self.state, self.checkpoint);
        self.state = self.checkpoint;
        self.return_state = None;
        self.temporary_buffer.clear();
    }
}
