//! Primary selector table.
//!
//! The selector is a 5-bit field, every one of the 32 values is resolved to
//! exactly one of a decoder, a splitter or the invalid fallback.

use std::{
    collections::{BTreeSet, HashMap},
    slice,
};

use serde::Serialize;

use crate::{
    decoder::DecoderCatalog,
    error::SpecError,
    names,
    spec::{Entries, Fields, OpcodeSpec},
    splitter::SplitterSet,
};

pub const SELECTOR_BITS: usize = 5;
pub const SELECTOR_COUNT: usize = 1 << SELECTOR_BITS;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpcodeKind {
    Decoder,
    Splitter,
    Invalid,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OpcodeEntry {
    pub index: u8,
    pub bin: String,
    pub kind: OpcodeKind,
    pub name_decoder: String,
    pub flags: BTreeSet<String>,
    /// Extra fields of the opcode map entry, empty for the fallback.
    pub fields: Fields,
}

impl OpcodeEntry {
    fn invalid(index: u8, bin: String) -> Self {
        Self {
            index,
            bin,
            kind: OpcodeKind::Invalid,
            name_decoder: names::INVALID_DECODER.to_owned(),
            flags: BTreeSet::new(),
            fields: Fields::new(),
        }
    }
}

/// Zero padded binary string of a selector value, most significant bit first.
pub fn binary_string(index: usize) -> String {
    format!("{index:0width$b}", width = SELECTOR_BITS)
}

fn is_opcode_key(key: &str) -> bool {
    key.len() == SELECTOR_BITS && key.bytes().all(|b| b == b'0' || b == b'1')
}

/// Resolves a single selector value.
///
/// `opcodes` maps binary strings to opcode map entries, see
/// [`OpcodeTable::build`].
pub fn resolve(
    index: usize,
    opcodes: &HashMap<&str, &OpcodeSpec>,
    decoders: &DecoderCatalog,
    splitters: &SplitterSet,
) -> Result<OpcodeEntry, SpecError> {
    let bin = binary_string(index);
    let index = index as u8;
    let Some(spec) = opcodes.get(bin.as_str()) else {
        return Ok(OpcodeEntry::invalid(index, bin));
    };

    let cb = spec.decoder.as_str();
    let entry = match (decoders.get(cb), splitters.get(cb)) {
        (Some(_), Some(_)) => return Err(SpecError::AmbiguousCallback(cb.to_owned())),
        (Some(decoder), None) => OpcodeEntry {
            index,
            bin,
            kind: OpcodeKind::Decoder,
            name_decoder: decoder.callback_name.clone(),
            flags: decoder.flags.clone(),
            fields: spec.fields.clone(),
        },
        (None, Some(splitter)) => OpcodeEntry {
            index,
            bin,
            kind: OpcodeKind::Splitter,
            name_decoder: splitter.callback_name.clone(),
            flags: splitter.flags.clone(),
            fields: spec.fields.clone(),
        },
        (None, None) => {
            return Err(SpecError::UnknownCallback {
                opcode: bin,
                callback: cb.to_owned(),
            })
        }
    };
    trace!("opcode {} -> {}", entry.bin, entry.name_decoder);
    Ok(entry)
}

/// Table of all selector values ordered by value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OpcodeTable {
    entries: Vec<OpcodeEntry>,
}

impl OpcodeTable {
    pub fn build(
        opcodes: &Entries<OpcodeSpec>,
        decoders: &DecoderCatalog,
        splitters: &SplitterSet,
    ) -> Result<Self, SpecError> {
        let mut map = HashMap::with_capacity(opcodes.len());
        for (key, spec) in opcodes {
            if !is_opcode_key(key) {
                return Err(SpecError::InvalidOpcodeKey(key.clone()));
            }
            if map.insert(key.as_str(), spec).is_some() {
                return Err(SpecError::DuplicateOpcode(key.clone()));
            }
        }

        let entries = (0..SELECTOR_COUNT)
            .map(|index| resolve(index, &map, decoders, splitters))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "opcodes: {} decoders, {} splitters, {} invalid",
            entries.iter().filter(|i| i.kind == OpcodeKind::Decoder).count(),
            entries.iter().filter(|i| i.kind == OpcodeKind::Splitter).count(),
            entries.iter().filter(|i| i.kind == OpcodeKind::Invalid).count(),
        );
        Ok(Self { entries })
    }

    pub fn get(&self, index: usize) -> Option<&OpcodeEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, OpcodeEntry> {
        self.entries.iter()
    }

    pub fn count(&self, kind: OpcodeKind) -> usize {
        self.entries.iter().filter(|i| i.kind == kind).count()
    }
}

impl<'a> IntoIterator for &'a OpcodeTable {
    type Item = &'a OpcodeEntry;
    type IntoIter = slice::Iter<'a, OpcodeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
