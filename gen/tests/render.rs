use std::{fs, path::PathBuf};

use decgen::{render, GenData, Generator, RenderOptions, SpecDocument};
use decgen_test::utils::check;

const ARMV7M: &str = include_str!("../../specs/armv7m.json");

const MOV_REG: &str = r#"{
    "instructions": { "mov_reg": { "fields": { "d": "u8", "m": "u8" } } },
    "decoders": {
        "mov_reg_dec": {
            "instruction": "mov_reg",
            "flags": ["set_flags"],
            "pattern": { "lo": "0001xxxxxxxxxxxx" },
            "body": [
                "const u8 d = static_cast<u8>(Bm16::ExtractBits1R<2U, 0U>(rinstr.low));",
                "const u8 m = static_cast<u8>(Bm16::ExtractBits1R<5U, 3U>(rinstr.low));"
            ]
        }
    },
    "splitters": { "16bit_op00001": {} },
    "opcodes": {
        "00000": { "decoder": "mov_reg_dec" },
        "00001": { "decoder": "16bit_op00001" }
    }
}"#;

fn build(src: &str) -> GenData {
    let doc: SpecDocument = src.parse().unwrap();
    GenData::build(&doc).unwrap()
}

fn tmp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("decgen-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn instr_header() -> Result<(), String> {
    let data = build(MOV_REG);
    let out = render::render_instr(&data, &RenderOptions::default()).unwrap();
    check(
        "golden/mov_reg_instr.h",
        1,
        include_str!("golden/mov_reg_instr.h"),
        &out,
    )
}

#[test]
fn op_decoders_header() -> Result<(), String> {
    let data = build(MOV_REG);
    let out = render::render_op_decoders(&data, &RenderOptions::default()).unwrap();
    check(
        "golden/mov_reg_op_decoders.h",
        1,
        include_str!("golden/mov_reg_op_decoders.h"),
        &out,
    )
}

#[test]
fn options() {
    let data = build(MOV_REG);
    let opts = RenderOptions::default()
        .namespace("emu")
        .opcode_first(0)
        .instr_header("emu/instr.h");
    let out = render::render_op_decoders(&data, &opts).unwrap();
    assert!(out.contains("#include \"emu/instr.h\"\n"));
    assert!(out.contains("namespace emu {\n"));
    assert!(out.contains("} // namespace emu\n"));
    assert!(out.contains("static constexpr u32 kDecodersOpCodeLast = 4U;\n"));
    assert!(out.contains("static constexpr u32 kDecodersOpCodeFirst = 0U;\n"));
}

#[test]
fn bundled_spec() {
    let data = build(ARMV7M);
    let opts = RenderOptions::default();

    let instr = render::render_instr(&data, &opts).unwrap();
    assert!(instr.contains("  kBl,\n  kInvalid\n};\n"));
    assert!(instr.contains("  ThumbImmediateResult imm32_carry;\n"));
    assert!(instr.contains("  Instr(const InstrAddPcPlusImmediate &arg) : add_pc_plus_immediate(arg) {}\n"));
    assert!(instr.contains("  Instr() : id(InstrId::kInvalid) {}\n"));
    assert!(instr.contains("  Instr(const InstrId &arg) : id(arg) {}\n"));

    let decoders = render::render_op_decoders(&data, &opts).unwrap();
    for line in [
        "static Result<Instr> NopT1Decoder(const RawInstr &rinstr, TCpuAccessor &cpua) {",
        "  assert(rinstr.low == 0b1011111100000000U);",
        "  assert((Bm16::ExtractBits1R<15U, 4U>(rinstr.high)) == 0b100011110101U);",
        "  assert((Bm16::IsolateBit<12U>(rinstr.high)) == 0b1U);",
        "  flags |= static_cast<u8>(InstrFlags::k32Bit);",
        "  flags |= static_cast<InstrFlagsSet>(InstrFlags::kAdd);",
        "  return Ok(Instr{InstrBl{iid, flags, imm32}});",
        "  return Ok(Instr{InstrNop{iid, flags}});",
        "static Result<Instr> Splitter32bit_op11110(const RawInstr &rinstr, TCpuAccessor &cpua) {",
        "    return BlT1Decoder<TCpuAccessor, TItOps>(rinstr, cpua);",
        "  case 0b11100U: {",
        "    return BT2Decoder<TCpuAccessor, TItOps>(rinstr, cpua);",
    ] {
        assert!(decoders.lines().any(|i| i == line), "missing line: {line}");
    }
    assert_eq!(decoders.matches("  case 0b").count(), 32);
}

#[test]
fn generate_and_check() {
    let dir = tmp_dir("generate");
    let source = dir.join("armv7m.json");
    fs::write(&source, ARMV7M).unwrap();
    let out = dir.join("include");

    let gen = Generator::new(&source).output_dir(&out);
    let stale = gen.check().unwrap();
    assert_eq!(stale.len(), 2);
    assert!(stale.iter().all(|i| i.current.is_empty()));

    let written = gen.generate().unwrap();
    assert_eq!(written, [out.join("op_decoders.h"), out.join("instr.h")]);
    assert!(gen.check().unwrap().is_empty());
    assert!(!out.join("instr.h.tmp").exists());

    let data = gen.build().unwrap();
    let instr = render::render_instr(&data, &RenderOptions::default()).unwrap();
    assert_eq!(fs::read_to_string(out.join("instr.h")).unwrap(), instr);

    fs::write(out.join("instr.h"), "// edited\n").unwrap();
    let stale = gen.check().unwrap();
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].path, out.join("instr.h"));
    assert_eq!(stale[0].current, "// edited\n");
    assert_eq!(stale[0].expect, instr);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn custom_names() {
    let dir = tmp_dir("names");
    let source = dir.join("spec.json");
    fs::write(&source, MOV_REG).unwrap();

    let written = Generator::new(&source)
        .output_dir(&dir)
        .instr_output("instr_gen.h")
        .decoders_output("decoders_gen.h")
        .render_options(RenderOptions::default().namespace("emu"))
        .generate()
        .unwrap();
    assert_eq!(written, [dir.join("decoders_gen.h"), dir.join("instr_gen.h")]);
    let text = fs::read_to_string(dir.join("instr_gen.h")).unwrap();
    assert!(text.contains("namespace emu {"));

    let _ = fs::remove_dir_all(&dir);
}
