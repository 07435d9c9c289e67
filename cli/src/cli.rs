use std::{fmt, path::PathBuf, str::FromStr};

use bpaf::*;
use decgen::RenderOptions;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Color {
    Off,
    On,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Emit {
    Headers,
    Json,
    Table,
}

impl fmt::Display for Emit {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Emit::Headers => "headers",
            Emit::Json => "json",
            Emit::Table => "table",
        };
        fmt.write_str(s)
    }
}

impl FromStr for Emit {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "headers" => Ok(Emit::Headers),
            "json" => Ok(Emit::Json),
            "table" => Ok(Emit::Table),
            _ => Err("invalid output kind, expected headers, json or table"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Cli {
    pub output_dir: PathBuf,
    pub instr_output: PathBuf,
    pub decoders_output: PathBuf,
    pub namespace: String,
    pub opcode_first: u32,
    pub instr_header: String,
    pub emit: Emit,
    pub check: bool,
    pub color: Color,
    pub spec: PathBuf,
}

impl Cli {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::default()
            .namespace(&self.namespace)
            .opcode_first(self.opcode_first)
            .instr_header(&self.instr_header)
    }
}

fn options() -> OptionParser<Cli> {
    let defaults = RenderOptions::default();

    let output_dir = short('o')
        .long("output-dir")
        .help("Write generated headers to DIR [default: .]")
        .argument::<PathBuf>("DIR")
        .fallback(PathBuf::from("."));

    let instr_output = long("instr-output")
        .help("File name of the instruction header [default: instr.h]")
        .argument::<PathBuf>("NAME")
        .fallback(PathBuf::from("instr.h"));

    let decoders_output = long("decoders-output")
        .help("File name of the decoder header [default: op_decoders.h]")
        .argument::<PathBuf>("NAME")
        .fallback(PathBuf::from("op_decoders.h"));

    let namespace_help = &*format!(
        "C++ namespace of the generated code [default: {}]",
        defaults.namespace
    );
    let namespace = long("namespace")
        .help(namespace_help)
        .argument::<String>("NS")
        .fallback(defaults.namespace.clone());

    let opcode_first_help = &*format!(
        "Lowest bit of the 5-bit opcode field [default: {}, max: {}]",
        defaults.opcode_first,
        RenderOptions::OPCODE_FIRST_MAX
    );
    let opcode_first = long("opcode-first")
        .help(opcode_first_help)
        .argument::<u32>("BIT")
        .guard(
            |&i| i <= RenderOptions::OPCODE_FIRST_MAX,
            "opcode field does not fit in 16 bits",
        )
        .fallback(defaults.opcode_first);

    let instr_header = long("instr-header")
        .help("Include path of the instruction header used by the decoder header")
        .argument::<String>("PATH")
        .fallback(defaults.instr_header.clone());

    let emit = long("emit")
        .help("Output kind [default: headers, valid kinds: headers, json, table]")
        .argument::<Emit>("KIND")
        .fallback(Emit::Headers);

    let check = long("check")
        .help("Do not write anything, fail if generated headers are out of date")
        .switch();

    #[cfg(feature = "color")]
    let auto_color =
        supports_color::on(supports_color::Stream::Stdout).map_or(Color::Off, |_| Color::On);

    #[cfg(not(feature = "color"))]
    let auto_color = Color::Off;

    let color = long("color")
        .help("Enable or disable color output [default: auto, valid modes: off, on, auto]")
        .argument::<String>("MODE")
        .parse(move |s| match s.as_str() {
            "off" => Ok(Color::Off),
            "on" => Ok(Color::On),
            "auto" => Ok(auto_color),
            _ => Err(format!("invalid color {s}")),
        })
        .fallback(auto_color);

    let spec = positional::<PathBuf>("SPEC").help("Specification document to process");

    construct!(Cli {
        output_dir,
        instr_output,
        decoders_output,
        namespace,
        opcode_first,
        instr_header,
        emit,
        check,
        color,
        spec,
    })
    .to_options()
    .version(env!("CARGO_PKG_VERSION"))
    .descr("Generates C++ opcode decoder tables from a JSON specification")
}

pub fn parse_cli() -> Cli {
    options().run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, String> {
        options()
            .run_inner(args)
            .map_err(|err| err.unwrap_stderr())
    }

    #[test]
    fn defaults() {
        let cli = parse(&["armv7m.json"]).unwrap();
        assert_eq!(cli.spec, PathBuf::from("armv7m.json"));
        assert_eq!(cli.output_dir, PathBuf::from("."));
        assert_eq!(cli.emit, Emit::Headers);
        assert!(!cli.check);
        assert_eq!(cli.render_options(), RenderOptions::default());
    }

    #[test]
    fn render_flags() {
        let cli = parse(&[
            "-o",
            "include",
            "--namespace",
            "emu",
            "--opcode-first",
            "0",
            "--emit",
            "table",
            "--color",
            "off",
            "armv7m.json",
        ])
        .unwrap();
        assert_eq!(cli.output_dir, PathBuf::from("include"));
        assert_eq!(cli.emit, Emit::Table);
        assert_eq!(cli.color, Color::Off);
        let opts = cli.render_options();
        assert_eq!(opts.namespace, "emu");
        assert_eq!(opts.opcode_last(), 4);
    }

    #[test]
    fn invalid() {
        assert!(parse(&["--opcode-first", "12", "armv7m.json"]).is_err());
        assert!(parse(&["--emit", "yaml", "armv7m.json"]).is_err());
        assert!(parse(&["--color", "extended", "armv7m.json"]).is_err());
        assert!(parse(&[]).is_err());
    }
}
