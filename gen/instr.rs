use std::{
    collections::{HashMap, HashSet},
    slice,
};

use serde::Serialize;

use crate::{
    error::SpecError,
    names,
    spec::{Entries, Fields},
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Instruction {
    pub name: String,
    pub struct_name: String,
    pub enum_tag: String,
    /// Raw record from the document, never interpreted by the catalogs.
    pub fields: Fields,
}

impl Instruction {
    pub fn new(name: &str, fields: Fields) -> Self {
        Self {
            name: name.to_owned(),
            struct_name: names::struct_name(name),
            enum_tag: names::enum_tag(name),
            fields,
        }
    }
}

/// Instructions in document order, unique by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InstructionCatalog {
    items: Vec<Instruction>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl InstructionCatalog {
    pub fn build(entries: &Entries<Fields>) -> Result<Self, SpecError> {
        let mut catalog = Self {
            items: Vec::with_capacity(entries.len()),
            index: HashMap::with_capacity(entries.len()),
        };
        let mut idents = HashSet::from([names::INVALID_TAG.to_owned()]);
        for (name, fields) in entries {
            if catalog.index.contains_key(name) {
                return Err(SpecError::DuplicateInstructionName(name.clone()));
            }
            let instr = Instruction::new(name, fields.clone());
            for ident in [&instr.struct_name, &instr.enum_tag] {
                if !idents.insert(ident.clone()) {
                    return Err(SpecError::DuplicateIdentifier {
                        name: name.clone(),
                        identifier: ident.clone(),
                    });
                }
            }
            catalog.index.insert(name.clone(), catalog.items.len());
            catalog.items.push(instr);
        }
        debug!("instructions: {}", catalog.items.len());
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&Instruction> {
        self.index.get(name).map(|&i| &self.items[i])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Instruction> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a InstructionCatalog {
    type Item = &'a Instruction;
    type IntoIter = slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
