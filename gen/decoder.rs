use std::{
    collections::{BTreeSet, HashMap, HashSet},
    slice,
};

use serde::Serialize;

use crate::{
    error::SpecError,
    instr::InstructionCatalog,
    names,
    pattern::{BitPattern, Predicate},
    spec::{DecoderSpec, Entries, Fields},
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Decoder {
    pub name: String,
    /// Name of the decoded instruction.
    pub instruction: String,
    pub callback_name: String,
    /// Copied from the instruction.
    pub struct_name: String,
    /// Copied from the instruction.
    pub enum_tag: String,
    pub flags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<BitPattern>,
    /// Assertions verifying the fixed bits of `pattern`, empty without one.
    pub predicates: Vec<Predicate>,
    pub fields: Fields,
}

impl Decoder {
    pub fn new(
        name: &str,
        spec: &DecoderSpec,
        instructions: &InstructionCatalog,
    ) -> Result<Self, SpecError> {
        let instruction = instructions.get(&spec.instruction).ok_or_else(|| {
            SpecError::UnknownInstructionReference {
                decoder: name.to_owned(),
                instruction: spec.instruction.clone(),
            }
        })?;

        let pattern = spec
            .pattern
            .as_ref()
            .map(|p| BitPattern::new(&p.lo, p.hi.as_deref()))
            .transpose()
            .map_err(|(pattern, reason)| SpecError::MalformedBitPattern {
                decoder: name.to_owned(),
                pattern,
                reason,
            })?;
        let predicates = pattern
            .as_ref()
            .map(BitPattern::predicates)
            .unwrap_or_default();

        Ok(Self {
            name: name.to_owned(),
            instruction: instruction.name.clone(),
            callback_name: names::callback_name(name),
            struct_name: instruction.struct_name.clone(),
            enum_tag: instruction.enum_tag.clone(),
            flags: spec.flags.iter().cloned().collect(),
            pattern,
            predicates,
            fields: spec.fields.clone(),
        })
    }

    /// Decoders with a high half pattern handle 32-bit encodings.
    pub fn is_wide(&self) -> bool {
        self.pattern.as_ref().map_or(false, BitPattern::is_wide)
    }
}

/// Decoders in document order, unique by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DecoderCatalog {
    items: Vec<Decoder>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl DecoderCatalog {
    pub fn build(
        entries: &Entries<DecoderSpec>,
        instructions: &InstructionCatalog,
    ) -> Result<Self, SpecError> {
        let mut catalog = Self {
            items: Vec::with_capacity(entries.len()),
            index: HashMap::with_capacity(entries.len()),
        };
        let mut callbacks = HashSet::from([names::INVALID_DECODER.to_owned()]);
        for (name, spec) in entries {
            if catalog.index.contains_key(name) {
                return Err(SpecError::DuplicateDecoderName(name.clone()));
            }
            let decoder = Decoder::new(name, spec, instructions)?;
            if !callbacks.insert(decoder.callback_name.clone()) {
                return Err(SpecError::DuplicateIdentifier {
                    name: name.clone(),
                    identifier: decoder.callback_name,
                });
            }
            trace!(
                "decoder {name} -> {}, {} predicates",
                decoder.struct_name,
                decoder.predicates.len()
            );
            catalog.index.insert(name.clone(), catalog.items.len());
            catalog.items.push(decoder);
        }
        debug!("decoders: {}", catalog.items.len());
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&Decoder> {
        self.index.get(name).map(|&i| &self.items[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Decoder> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a DecoderCatalog {
    type Item = &'a Decoder;
    type IntoIter = slice::Iter<'a, Decoder>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
