//! Identifier derivation shared by every catalog.

pub const STRUCT_PREFIX: &str = "Instr";
pub const ENUM_PREFIX: &str = "k";
pub const DECODER_SUFFIX: &str = "Decoder";
pub const SPLITTER_PREFIX: &str = "Splitter";

/// Callback name bound to selector values without an opcode entry.
pub const INVALID_DECODER: &str = "InvalidInstrDecoder";

/// Enum tag of the default constructed instruction.
pub const INVALID_TAG: &str = "kInvalid";

/// Converts `snake_case` into `PascalCase`.
///
/// Only the first character of each segment is changed, so `"tbb_h"` becomes
/// `"TbbH"` and `"cb_n_z"` becomes `"CbNZ"`. Empty segments are dropped.
pub fn pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for segment in name.split('_').filter(|i| !i.is_empty()) {
        let mut chars = segment.chars();
        if let Some(c) = chars.next() {
            out.extend(c.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

pub fn struct_name(name: &str) -> String {
    format!("{STRUCT_PREFIX}{}", pascal_case(name))
}

pub fn enum_tag(name: &str) -> String {
    format!("{ENUM_PREFIX}{}", pascal_case(name))
}

pub fn callback_name(name: &str) -> String {
    format!("{}{DECODER_SUFFIX}", pascal_case(name))
}

/// Splitter names are used verbatim, e.g. `16bit_op00000`.
pub fn splitter_callback(name: &str) -> String {
    format!("{SPLITTER_PREFIX}{name}")
}
