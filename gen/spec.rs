//! Input document model.
//!
//! The document is a JSON object with four sections, each one an object keyed
//! by name:
//!
//! ```json
//! {
//!     "instructions": { "mov_reg": { "fields": { "d": "u8", "m": "u8" } } },
//!     "decoders": {
//!         "mov_reg_t1": {
//!             "instruction": "mov_reg",
//!             "flags": [],
//!             "pattern": { "lo": "01000110xxxxxxxx" }
//!         }
//!     },
//!     "splitters": { "16bit_op01000": { "flags": [] } },
//!     "opcodes": { "01000": { "decoder": "16bit_op01000" } }
//! }
//! ```
//!
//! Sections keep document order and repeated keys, duplicates are rejected
//! later by the catalogs instead of being merged here.

use std::{fmt, marker::PhantomData, slice, str::FromStr};

use serde::{
    de::{MapAccess, Visitor},
    Deserialize, Deserializer,
};
use serde_json::{Map, Value};

/// Opaque record fields passed through to the renderer.
pub type Fields = Map<String, Value>;

/// Named entries of a document section in document order.
#[derive(Clone, Debug, PartialEq)]
pub struct Entries<T>(Vec<(String, T)>);

impl<T> Entries<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, name: impl Into<String>, value: T) {
        self.0.push((name.into(), value));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the first entry with the given name.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> slice::Iter<'_, (String, T)> {
        self.0.iter()
    }
}

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S: Into<String>> FromIterator<(S, T)> for Entries<T> {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'a, T> IntoIterator for &'a Entries<T> {
    type Item = &'a (String, T);
    type IntoIter = slice::Iter<'a, (String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

struct EntriesVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
    type Value = Entries<T>;

    fn expecting(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str("an object of named entries")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((name, value)) = map.next_entry::<String, T>()? {
            entries.push((name, value));
        }
        Ok(Entries(entries))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Entries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PatternSpec {
    pub lo: String,
    #[serde(default)]
    pub hi: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DecoderSpec {
    pub instruction: String,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub pattern: Option<PatternSpec>,
    #[serde(flatten)]
    pub fields: Fields,
}

impl DecoderSpec {
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            flags: Vec::new(),
            pattern: None,
            fields: Fields::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SplitterSpec {
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(flatten)]
    pub fields: Fields,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct OpcodeSpec {
    pub decoder: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl OpcodeSpec {
    pub fn new(decoder: impl Into<String>) -> Self {
        Self {
            decoder: decoder.into(),
            fields: Fields::new(),
        }
    }
}

/// Parsed specification document, immutable once loaded.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SpecDocument {
    #[serde(default)]
    pub instructions: Entries<Fields>,
    #[serde(default)]
    pub decoders: Entries<DecoderSpec>,
    #[serde(default)]
    pub splitters: Entries<SplitterSpec>,
    #[serde(default)]
    pub opcodes: Entries<OpcodeSpec>,
}

impl FromStr for SpecDocument {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}
