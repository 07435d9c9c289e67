use std::{
    collections::{BTreeSet, HashMap},
    slice,
};

use serde::Serialize;

use crate::{
    error::SpecError,
    names,
    spec::{Entries, Fields, SplitterSpec},
};

/// Secondary dispatch point for selector values shared by several encodings.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Splitter {
    pub name: String,
    pub callback_name: String,
    pub flags: BTreeSet<String>,
    pub fields: Fields,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SplitterSet {
    items: Vec<Splitter>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SplitterSet {
    pub fn build(entries: &Entries<SplitterSpec>) -> Result<Self, SpecError> {
        let mut set = Self::default();
        for (name, spec) in entries {
            if set.index.contains_key(name) {
                return Err(SpecError::DuplicateSplitterName(name.clone()));
            }
            set.index.insert(name.clone(), set.items.len());
            set.items.push(Splitter {
                name: name.clone(),
                callback_name: names::splitter_callback(name),
                flags: spec.flags.iter().cloned().collect(),
                fields: spec.fields.clone(),
            });
        }
        debug!("splitters: {}", set.items.len());
        Ok(set)
    }

    pub fn get(&self, name: &str) -> Option<&Splitter> {
        self.index.get(name).map(|&i| &self.items[i])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Splitter> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a SplitterSet {
    type Item = &'a Splitter;
    type IntoIter = slice::Iter<'a, Splitter>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
