use std::collections::HashSet;

use serde::Serialize;

use crate::{
    decoder::DecoderCatalog, error::SpecError, instr::InstructionCatalog, opcode::OpcodeTable,
    spec::SpecDocument, splitter::SplitterSet,
};

/// Everything the renderer needs, built once from a document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenData {
    pub opcodes: OpcodeTable,
    pub decoders: DecoderCatalog,
    pub splitters: SplitterSet,
    pub instructions: InstructionCatalog,
}

impl GenData {
    pub fn assemble(
        opcodes: OpcodeTable,
        decoders: DecoderCatalog,
        splitters: SplitterSet,
        instructions: InstructionCatalog,
    ) -> Self {
        Self {
            opcodes,
            decoders,
            splitters,
            instructions,
        }
    }

    /// Builds every catalog and the opcode table, stops at the first error.
    pub fn build(doc: &SpecDocument) -> Result<Self, SpecError> {
        let instructions = InstructionCatalog::build(&doc.instructions)?;
        let decoders = DecoderCatalog::build(&doc.decoders, &instructions)?;
        let splitters = SplitterSet::build(&doc.splitters)?;
        check_callbacks(&decoders, &splitters)?;
        let opcodes = OpcodeTable::build(&doc.opcodes, &decoders, &splitters)?;
        Ok(Self::assemble(opcodes, decoders, splitters, instructions))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Rejects names shared by a decoder and a splitter and callbacks of
/// different entries that derive the same identifier.
fn check_callbacks(decoders: &DecoderCatalog, splitters: &SplitterSet) -> Result<(), SpecError> {
    let callbacks: HashSet<&str> = decoders.iter().map(|i| i.callback_name.as_str()).collect();
    for splitter in splitters {
        if decoders.contains(&splitter.name) {
            return Err(SpecError::AmbiguousCallback(splitter.name.clone()));
        }
        if callbacks.contains(splitter.callback_name.as_str()) {
            return Err(SpecError::DuplicateIdentifier {
                name: splitter.name.clone(),
                identifier: splitter.callback_name.clone(),
            });
        }
    }
    Ok(())
}
