use std::collections::HashSet;

use decgen::{
    opcode::{OpcodeKind, SELECTOR_COUNT},
    render, GenData, RenderOptions, SpecDocument,
};

const ARMV7M: &str = include_str!("../../specs/armv7m.json");

const MOV_REG: &str = r#"{
    "instructions": { "mov_reg": {} },
    "decoders": {
        "mov_reg_dec": { "instruction": "mov_reg", "flags": [], "pattern": { "lo": "0001xxxxxxxxxxxx" } }
    },
    "splitters": {},
    "opcodes": { "00000": { "decoder": "mov_reg_dec" } }
}"#;

fn build(src: &str) -> GenData {
    let doc: SpecDocument = src.parse().unwrap();
    GenData::build(&doc).unwrap()
}

#[test]
fn total_coverage() {
    for src in [MOV_REG, ARMV7M] {
        let data = build(src);
        assert_eq!(data.opcodes.len(), SELECTOR_COUNT);
        for (i, entry) in data.opcodes.iter().enumerate() {
            assert_eq!(entry.index as usize, i);
            assert_eq!(entry.bin, format!("{i:05b}"));
            assert!(!entry.name_decoder.is_empty());
        }
    }
}

#[test]
fn referential_integrity() {
    let data = build(ARMV7M);
    for decoder in &data.decoders {
        let instr = data.instructions.get(&decoder.instruction).unwrap();
        assert_eq!(decoder.struct_name, instr.struct_name);
        assert_eq!(decoder.enum_tag, instr.enum_tag);
    }

    let callbacks: HashSet<_> = data
        .decoders
        .iter()
        .map(|i| i.callback_name.as_str())
        .chain(data.splitters.iter().map(|i| i.callback_name.as_str()))
        .collect();
    for entry in &data.opcodes {
        match entry.kind {
            OpcodeKind::Invalid => assert_eq!(entry.name_decoder, "InvalidInstrDecoder"),
            _ => assert!(callbacks.contains(entry.name_decoder.as_str())),
        }
    }
}

#[test]
fn fallback() {
    let data = build(ARMV7M);
    let entry = data.opcodes.get(3).unwrap();
    assert_eq!(entry.bin, "00011");
    assert_eq!(entry.kind, OpcodeKind::Invalid);
    assert_eq!(entry.name_decoder, "InvalidInstrDecoder");
    assert!(entry.flags.is_empty());
    assert!(entry.fields.is_empty());

    assert_eq!(data.opcodes.count(OpcodeKind::Decoder), 5);
    assert_eq!(data.opcodes.count(OpcodeKind::Splitter), 3);
    assert_eq!(data.opcodes.count(OpcodeKind::Invalid), 24);
}

#[test]
fn splitters() {
    let data = build(ARMV7M);
    let entry = data.opcodes.get(0b10111).unwrap();
    assert_eq!(entry.kind, OpcodeKind::Splitter);
    assert_eq!(entry.name_decoder, "Splitter16bit_op10111");

    let entry = data.opcodes.get(0b11110).unwrap();
    assert_eq!(entry.name_decoder, "Splitter32bit_op11110");

    let entry = data.opcodes.get(0b10100).unwrap();
    assert_eq!(entry.kind, OpcodeKind::Decoder);
    assert_eq!(entry.name_decoder, "AddPcPlusImmediateT1Decoder");
    assert!(entry.flags.contains("add"));
}

#[test]
fn idempotent() {
    let a = build(ARMV7M);
    let b = build(ARMV7M);
    assert_eq!(a, b);

    let opts = RenderOptions::default();
    assert_eq!(
        render::render_instr(&a, &opts).unwrap(),
        render::render_instr(&b, &opts).unwrap()
    );
    assert_eq!(
        render::render_op_decoders(&a, &opts).unwrap(),
        render::render_op_decoders(&b, &opts).unwrap()
    );
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
}

#[test]
fn mov_reg() {
    let data = build(MOV_REG);

    let entry = data.opcodes.get(0).unwrap();
    assert_eq!(entry.kind, OpcodeKind::Decoder);
    assert_eq!(entry.name_decoder, "MovRegDecDecoder");
    for entry in data.opcodes.iter().skip(1) {
        assert_eq!(entry.kind, OpcodeKind::Invalid);
        assert_eq!(entry.name_decoder, "InvalidInstrDecoder");
    }

    let decoder = data.decoders.get("mov_reg_dec").unwrap();
    assert_eq!(decoder.struct_name, "InstrMovReg");
    assert_eq!(decoder.enum_tag, "kMovReg");
    assert_eq!(decoder.predicates.len(), 1);
    assert_eq!(decoder.predicates[0].to_string(), "lo[15:12] == 0b0001");
    assert!(!decoder.is_wide());
}

#[test]
fn wide_decoders() {
    let data = build(ARMV7M);
    let bl = data.decoders.get("bl_t1").unwrap();
    assert!(bl.is_wide());
    let p: Vec<_> = bl.predicates.iter().map(|p| p.to_string()).collect();
    assert_eq!(
        p,
        ["lo[15:11] == 0b11110", "hi[15:14] == 0b11", "hi[12] == 0b1"]
    );
    assert!(!data.decoders.get("b_t2").unwrap().is_wide());
}

#[test]
fn document_order() {
    let data = build(ARMV7M);
    let names: Vec<_> = data.instructions.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names[..3], ["nop", "dmb", "add_pc_plus_immediate"]);
    let names: Vec<_> = data.splitters.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["16bit_op00000", "16bit_op10111", "32bit_op11110"]);
}

#[test]
fn json_view() {
    let json = build(MOV_REG).to_json().unwrap();
    assert!(json.contains("\"name_decoder\": \"MovRegDecDecoder\""));
    assert!(json.contains("\"struct_name\": \"InstrMovReg\""));
    assert!(json.contains("\"kind\": \"range\""));
}
