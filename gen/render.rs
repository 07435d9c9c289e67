//! C++ header rendering.
//!
//! Both renderers are pure functions of [`GenData`] and [`RenderOptions`],
//! the same input always produces the same text.

use std::fmt::{self, Write};

use serde_json::Value;

use crate::{
    decoder::Decoder,
    instr::Instruction,
    names,
    opcode::SELECTOR_BITS,
    output::GenData,
    pattern::{Check, Half, Predicate},
    splitter::Splitter,
};

const HEADER_NOTE: &str = "// Generated by decgen, do not edit.";

const INSTR_INCLUDES: &[&str] = &[
    "libmicroemu/internal/decoder/instr_flags.h",
    "libmicroemu/internal/logic/imm_shift_results.h",
    "libmicroemu/internal/logic/thumb_immediate_result.h",
    "libmicroemu/types.h",
];

const DECODER_INCLUDES: &[&str] = &[
    "libmicroemu/internal/fetcher/raw_instr.h",
    "libmicroemu/internal/logic/thumb.h",
    "libmicroemu/internal/result.h",
    "libmicroemu/internal/utils/bit_manip.h",
    "libmicroemu/register_details.h",
    "libmicroemu/types.h",
];

const TEMPLATE: &str = "template <typename TCpuAccessor, typename TItOps>";
const CALLBACK_ARGS: &str = "(const RawInstr &rinstr, TCpuAccessor &cpua)";
const UNKNOWN_OPCODE: &str = "return Err<Instr>(StatusCode::kDecoderUnknownOpCode);";

/// Indentation, two spaces per level.
#[derive(Copy, Clone, Debug, Default)]
pub struct Pad(usize);

impl Pad {
    pub fn shift(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Pad {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for _ in 0..self.0 {
            fmt.write_str("  ")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    pub namespace: String,
    /// Lowest bit of the primary selector in the low half-word.
    pub opcode_first: u32,
    /// Include path of the rendered instruction header.
    pub instr_header: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            namespace: "libmicroemu::internal".to_owned(),
            opcode_first: 11,
            instr_header: "libmicroemu/internal/decoder/instr.h".to_owned(),
        }
    }
}

impl RenderOptions {
    /// Largest valid `opcode_first` for a 16-bit half-word.
    pub const OPCODE_FIRST_MAX: u32 = 16 - SELECTOR_BITS as u32;

    pub fn namespace(mut self, s: impl Into<String>) -> Self {
        self.namespace = s.into();
        self
    }

    pub fn opcode_first(mut self, first: u32) -> Self {
        self.opcode_first = first;
        self
    }

    pub fn instr_header(mut self, s: impl Into<String>) -> Self {
        self.instr_header = s.into();
        self
    }

    pub fn opcode_last(&self) -> u32 {
        self.opcode_first.saturating_add(SELECTOR_BITS as u32 - 1)
    }

    /// Returns `true` if the selector field fits in the low half-word.
    pub fn is_valid(&self) -> bool {
        self.opcode_first <= Self::OPCODE_FIRST_MAX
    }
}

fn write_includes<W: Write>(out: &mut W, includes: &[&str]) -> fmt::Result {
    for i in includes {
        writeln!(out, "#include \"{i}\"")?;
    }
    Ok(())
}

/// Member names declared by an instruction's `fields` object.
fn instr_fields(instr: &Instruction) -> impl Iterator<Item = (&str, &str)> {
    instr
        .fields
        .get("fields")
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
        .map(|(name, ty)| (name.as_str(), ty.as_str().unwrap_or("u32")))
}

/// Lines of a `body` field, a string is treated as a single line.
fn body_lines(value: Option<&Value>) -> Vec<&str> {
    match value {
        Some(Value::String(s)) => s.lines().collect(),
        Some(Value::Array(lines)) => lines.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn write_instr_struct<W: Write>(out: &mut W, pad: Pad, instr: &Instruction) -> fmt::Result {
    let p = pad.shift();
    writeln!(out, "{pad}struct {} {{", instr.struct_name)?;
    writeln!(out, "{p}InstrId id;          // base_type: u8")?;
    writeln!(out, "{p}InstrFlagsSet flags; // base_type: u8")?;
    for (name, ty) in instr_fields(instr) {
        writeln!(out, "{p}{ty} {name};")?;
    }
    writeln!(out, "{pad}}};")
}

pub fn write_instr<W: Write>(out: &mut W, data: &GenData, opts: &RenderOptions) -> fmt::Result {
    let pad = Pad::default();
    let p = pad.shift();

    writeln!(out, "{HEADER_NOTE}")?;
    writeln!(out, "#pragma once")?;
    writeln!(out)?;
    write_includes(out, INSTR_INCLUDES)?;
    writeln!(out)?;
    writeln!(out, "namespace {} {{", opts.namespace)?;
    writeln!(out)?;

    writeln!(out, "enum class InstrId : u8 {{")?;
    for instr in &data.instructions {
        writeln!(out, "{p}{},", instr.enum_tag)?;
    }
    writeln!(out, "{p}{}", names::INVALID_TAG)?;
    writeln!(out, "}};")?;
    writeln!(out)?;

    for instr in &data.instructions {
        write_instr_struct(out, pad, instr)?;
    }
    writeln!(out)?;

    writeln!(out, "union Instr {{")?;
    writeln!(out, "{p}InstrId id;")?;
    for instr in &data.instructions {
        writeln!(out, "{p}{} {};", instr.struct_name, instr.name)?;
    }
    writeln!(out)?;
    writeln!(out, "{p}Instr() : id(InstrId::{}) {{}}", names::INVALID_TAG)?;
    writeln!(out, "{p}Instr(const InstrId &arg) : id(arg) {{}}")?;
    for instr in &data.instructions {
        writeln!(
            out,
            "{p}Instr(const {} &arg) : {}(arg) {{}}",
            instr.struct_name, instr.name
        )?;
    }
    writeln!(out, "}};")?;
    writeln!(out)?;
    writeln!(out, "}} // namespace {}", opts.namespace)
}

fn write_predicate<W: Write>(out: &mut W, pad: Pad, predicate: &Predicate) -> fmt::Result {
    let raw = match predicate.half {
        Half::Lo => "rinstr.low",
        Half::Hi => "rinstr.high",
    };
    match &predicate.check {
        check if check.is_full() => {
            if let Check::Range { literal, .. } = check {
                writeln!(out, "{pad}assert({raw} == 0b{literal}U);")?;
            }
        }
        Check::Bit { bit, value } => {
            let value = *value as u8;
            writeln!(
                out,
                "{pad}assert((Bm16::IsolateBit<{bit}U>({raw})) == 0b{value}U);"
            )?;
        }
        Check::Range { high, low, literal } => {
            writeln!(
                out,
                "{pad}assert((Bm16::ExtractBits1R<{high}U, {low}U>({raw})) == 0b{literal}U);"
            )?;
        }
    }
    Ok(())
}

fn write_decoder<W: Write>(
    out: &mut W,
    pad: Pad,
    decoder: &Decoder,
    instr: Option<&Instruction>,
) -> fmt::Result {
    let p = pad.shift();
    let body = body_lines(decoder.fields.get("body"));

    writeln!(out, "{pad}{TEMPLATE}")?;
    writeln!(
        out,
        "{pad}static Result<Instr> {}{CALLBACK_ARGS} {{",
        decoder.callback_name
    )?;
    writeln!(
        out,
        "{p}static_cast<void>(cpua); // prevents warning when cpua is not used"
    )?;
    writeln!(out, "{p}const InstrId iid{{InstrId::{}}};", decoder.enum_tag)?;
    writeln!(out, "{p}u8 flags = 0x0U;")?;
    writeln!(out)?;

    for predicate in &decoder.predicates {
        write_predicate(out, p, predicate)?;
    }
    if body.is_empty() {
        writeln!(out, "{p}static_cast<void>(rinstr);")?;
    }

    if !decoder.flags.is_empty() || decoder.is_wide() || !body.is_empty() {
        writeln!(out)?;
    }
    for flag in &decoder.flags {
        writeln!(
            out,
            "{p}flags |= static_cast<InstrFlagsSet>(InstrFlags::k{});",
            names::pascal_case(flag)
        )?;
    }
    for line in &body {
        if line.is_empty() {
            writeln!(out)?;
        } else {
            writeln!(out, "{p}{line}")?;
        }
    }
    if decoder.is_wide() {
        writeln!(out, "{p}flags |= static_cast<u8>(InstrFlags::k32Bit);")?;
    }
    writeln!(out)?;

    write!(out, "{p}return Ok(Instr{{{}{{iid, flags", decoder.struct_name)?;
    for (name, _) in instr.into_iter().flat_map(instr_fields) {
        write!(out, ", {name}")?;
    }
    writeln!(out, "}}}});")?;
    writeln!(out, "{pad}}}")
}

fn write_splitter<W: Write>(out: &mut W, pad: Pad, splitter: &Splitter) -> fmt::Result {
    let p = pad.shift();
    let body = body_lines(splitter.fields.get("body"));

    writeln!(out, "{pad}{TEMPLATE}")?;
    writeln!(
        out,
        "{pad}static Result<Instr> {}{CALLBACK_ARGS} {{",
        splitter.callback_name
    )?;
    if body.is_empty() {
        writeln!(out, "{p}static_cast<void>(rinstr);")?;
        writeln!(out, "{p}static_cast<void>(cpua);")?;
    }
    for line in &body {
        if line.is_empty() {
            writeln!(out)?;
        } else {
            writeln!(out, "{p}{line}")?;
        }
    }
    writeln!(out, "{p}{UNKNOWN_OPCODE}")?;
    writeln!(out, "{pad}}}")
}

fn write_call_decoder<W: Write>(out: &mut W, pad: Pad, data: &GenData) -> fmt::Result {
    let p = pad.shift();
    let pp = p.shift();

    writeln!(out, "{pad}{TEMPLATE}")?;
    writeln!(out, "{pad}static Result<Instr> call_decoder{CALLBACK_ARGS} {{")?;
    writeln!(
        out,
        "{p}const u16 opc = Bm32::ExtractBits1R<kDecodersOpCodeLast, kDecodersOpCodeFirst>(rinstr.low);"
    )?;
    writeln!(out, "{p}switch (opc) {{")?;
    for entry in &data.opcodes {
        writeln!(out, "{p}case 0b{}U: {{", entry.bin)?;
        writeln!(
            out,
            "{pp}return {}<TCpuAccessor, TItOps>(rinstr, cpua);",
            entry.name_decoder
        )?;
        writeln!(out, "{p}}}")?;
    }
    writeln!(out, "{p}default: {{")?;
    writeln!(out, "{pp}assert(false);")?;
    writeln!(out, "{pp}// should not happen")?;
    writeln!(out, "{pp}break;")?;
    writeln!(out, "{p}}}")?;
    writeln!(out, "{p}}}")?;
    writeln!(
        out,
        "{p}return {}<TCpuAccessor, TItOps>(rinstr, cpua);",
        names::INVALID_DECODER
    )?;
    writeln!(out, "{pad}}}")
}

pub fn write_op_decoders<W: Write>(
    out: &mut W,
    data: &GenData,
    opts: &RenderOptions,
) -> fmt::Result {
    if !opts.is_valid() {
        return Err(fmt::Error);
    }

    let pad = Pad::default();
    let p = pad.shift();

    writeln!(out, "{HEADER_NOTE}")?;
    writeln!(out, "#pragma once")?;
    writeln!(out)?;
    writeln!(out, "#include \"{}\"", opts.instr_header)?;
    write_includes(out, DECODER_INCLUDES)?;
    writeln!(out, "#include <assert.h>")?;
    writeln!(out, "#include <cstdint>")?;
    writeln!(out)?;
    writeln!(out, "namespace {} {{", opts.namespace)?;
    writeln!(out)?;
    writeln!(out, "using Bm8 = BitManip<u8>;")?;
    writeln!(out, "using Bm16 = BitManip<u16>;")?;
    writeln!(out, "using Bm32 = BitManip<u32>;")?;
    writeln!(out)?;
    writeln!(
        out,
        "static constexpr u32 kDecodersOpCodeLast = {}U;",
        opts.opcode_last()
    )?;
    writeln!(
        out,
        "static constexpr u32 kDecodersOpCodeFirst = {}U;",
        opts.opcode_first
    )?;
    writeln!(out)?;

    writeln!(out, "{pad}{TEMPLATE}")?;
    writeln!(
        out,
        "{pad}static Result<Instr> {}{CALLBACK_ARGS} {{",
        names::INVALID_DECODER
    )?;
    writeln!(out, "{p}static_cast<void>(rinstr);")?;
    writeln!(
        out,
        "{p}static_cast<void>(cpua); // prevents warning when cpua is not used"
    )?;
    writeln!(out, "{p}{UNKNOWN_OPCODE}")?;
    writeln!(out, "{pad}}}")?;

    for decoder in &data.decoders {
        writeln!(out)?;
        let instr = data.instructions.get(&decoder.instruction);
        write_decoder(out, pad, decoder, instr)?;
    }

    for splitter in &data.splitters {
        writeln!(out)?;
        write_splitter(out, pad, splitter)?;
    }

    writeln!(out)?;
    write_call_decoder(out, pad, data)?;
    writeln!(out)?;
    writeln!(out, "}} // namespace {}", opts.namespace)
}

/// Renders the instruction header.
pub fn render_instr(data: &GenData, opts: &RenderOptions) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_instr(&mut out, data, opts)?;
    Ok(out)
}

/// Renders the opcode decoder header.
pub fn render_op_decoders(data: &GenData, opts: &RenderOptions) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_op_decoders(&mut out, data, opts)?;
    Ok(out)
}
