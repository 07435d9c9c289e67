//! Human readable views of the opcode table and of header diffs.

use std::{
    fmt::{self, Display},
    io::{self, Write},
};

use decgen::{
    opcode::{OpcodeEntry, OpcodeKind},
    GenData,
};

use crate::cli::Color;

#[derive(Copy, Clone, Debug)]
enum Style {
    Opcode,
    Decoder,
    Splitter,
    Invalid,
    Flags,
    Removed,
    Added,
}

struct Styled<T> {
    #[cfg_attr(not(feature = "color"), allow(dead_code))]
    color: Color,
    #[cfg_attr(not(feature = "color"), allow(dead_code))]
    style: Style,
    display: T,
}

impl<T: Display> Display for Styled<T> {
    #[cfg(feature = "color")]
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        use owo_colors::OwoColorize;

        let display = &self.display;
        match self.color {
            Color::Off => display.fmt(fmt),
            Color::On => match self.style {
                Style::Opcode => display.magenta().fmt(fmt),
                Style::Decoder => display.yellow().fmt(fmt),
                Style::Splitter => display.blue().fmt(fmt),
                Style::Invalid => display.dimmed().fmt(fmt),
                Style::Flags => display.green().fmt(fmt),
                Style::Removed => display.red().fmt(fmt),
                Style::Added => display.green().fmt(fmt),
            },
        }
    }

    #[cfg(not(feature = "color"))]
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        self.display.fmt(fmt)
    }
}

fn styled<T: Display>(color: Color, style: Style, display: T) -> Styled<T> {
    Styled {
        color,
        style,
        display,
    }
}

fn kind(kind: OpcodeKind) -> (&'static str, Style) {
    match kind {
        OpcodeKind::Decoder => ("decoder", Style::Decoder),
        OpcodeKind::Splitter => ("splitter", Style::Splitter),
        OpcodeKind::Invalid => ("invalid", Style::Invalid),
    }
}

fn print_entry(
    out: &mut impl Write,
    entry: &OpcodeEntry,
    width: usize,
    color: Color,
) -> io::Result<()> {
    let (name, style) = kind(entry.kind);
    write!(
        out,
        "{}  {:<8}  {}",
        styled(color, Style::Opcode, format_args!("0b{}", entry.bin)),
        name,
        styled(color, style, format_args!("{:<width$}", entry.name_decoder)),
    )?;
    if !entry.flags.is_empty() {
        let flags = entry.flags.iter().map(String::as_str).collect::<Vec<_>>();
        write!(out, "  {}", styled(color, Style::Flags, flags.join(",")))?;
    }
    writeln!(out)
}

/// Prints one line per selector value followed by a summary line.
pub fn print(out: &mut impl Write, data: &GenData, color: Color) -> io::Result<()> {
    let width = data
        .opcodes
        .iter()
        .map(|i| i.name_decoder.len())
        .max()
        .unwrap_or(0);
    for entry in &data.opcodes {
        print_entry(out, entry, width, color)?;
    }
    writeln!(
        out,
        "{} decoders, {} splitters, {} invalid",
        data.opcodes.count(OpcodeKind::Decoder),
        data.opcodes.count(OpcodeKind::Splitter),
        data.opcodes.count(OpcodeKind::Invalid),
    )
}

pub fn removed(out: &mut impl Write, color: Color, line: &str) -> io::Result<()> {
    writeln!(out, "{}", styled(color, Style::Removed, format_args!("-{line}")))
}

pub fn added(out: &mut impl Write, color: Color, line: &str) -> io::Result<()> {
    writeln!(out, "{}", styled(color, Style::Added, format_args!("+{line}")))
}
