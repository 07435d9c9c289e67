use std::fmt;

/// Reason a bit pattern was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternError {
    /// Pattern is not exactly 16 characters long.
    Length(usize),
    /// Character outside of `0`, `1` and `x` at the given index.
    Char(usize, char),
}

impl fmt::Display for PatternError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Length(len) => write!(fmt, "expected 16 characters, found {len}"),
            Self::Char(i, c) => write!(fmt, "unexpected character {c:?} at index {i}"),
        }
    }
}

impl std::error::Error for PatternError {}

/// Inconsistencies in a specification document.
///
/// Every variant is fatal: generation stops at the first one and no
/// artifact is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpecError {
    MalformedBitPattern {
        decoder: String,
        pattern: String,
        reason: PatternError,
    },
    DuplicateInstructionName(String),
    DuplicateDecoderName(String),
    DuplicateSplitterName(String),
    UnknownInstructionReference {
        decoder: String,
        instruction: String,
    },
    UnknownCallback {
        opcode: String,
        callback: String,
    },
    /// Name is defined both as a decoder and as a splitter.
    AmbiguousCallback(String),
    /// Opcode map key is not a 5-digit binary string.
    InvalidOpcodeKey(String),
    /// Opcode map has more than one entry for a selector value.
    DuplicateOpcode(String),
    /// Two entries, or an entry and a built-in name, derive the same C++
    /// identifier.
    DuplicateIdentifier { name: String, identifier: String },
}

impl fmt::Display for SpecError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MalformedBitPattern {
                decoder,
                pattern,
                reason,
            } => {
                write!(
                    fmt,
                    "malformed bit pattern \"{pattern}\" in decoder \"{decoder}\", {reason}"
                )
            }
            Self::DuplicateInstructionName(name) => {
                write!(fmt, "duplicate instruction name \"{name}\"")
            }
            Self::DuplicateDecoderName(name) => write!(fmt, "duplicate decoder name \"{name}\""),
            Self::DuplicateSplitterName(name) => {
                write!(fmt, "duplicate splitter name \"{name}\"")
            }
            Self::UnknownInstructionReference {
                decoder,
                instruction,
            } => {
                write!(
                    fmt,
                    "decoder \"{decoder}\" references unknown instruction \"{instruction}\""
                )
            }
            Self::UnknownCallback { opcode, callback } => {
                write!(
                    fmt,
                    "opcode {opcode} references unknown decoder or splitter \"{callback}\""
                )
            }
            Self::AmbiguousCallback(name) => {
                write!(fmt, "\"{name}\" is defined both as a decoder and a splitter")
            }
            Self::InvalidOpcodeKey(key) => {
                write!(fmt, "invalid opcode \"{key}\", expected 5 binary digits")
            }
            Self::DuplicateOpcode(key) => write!(fmt, "duplicate opcode \"{key}\""),
            Self::DuplicateIdentifier { name, identifier } => {
                write!(
                    fmt,
                    "\"{name}\" derives identifier \"{identifier}\" which is already in use"
                )
            }
        }
    }
}

impl std::error::Error for SpecError {}
