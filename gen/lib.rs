#[macro_use]
extern crate log;

pub mod decoder;
pub mod error;
pub mod instr;
pub mod names;
pub mod opcode;
pub mod output;
pub mod pattern;
pub mod render;
pub mod spec;
pub mod splitter;

use std::{
    fmt,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

pub use crate::{
    error::{PatternError, SpecError},
    output::GenData,
    render::RenderOptions,
    spec::SpecDocument,
};

#[derive(Debug)]
pub enum ErrorKind {
    SourceFile(io::Error),
    Parse(serde_json::Error),
    Spec(SpecError),
    Render(fmt::Error),
    /// Lowest selector bit leaves no room for the 5-bit field.
    OpcodeRange(u32),
    OutputDir(io::Error),
    OutputFile(io::Error),
    Generate(io::Error),
}

#[derive(Debug)]
pub struct Error {
    path: PathBuf,
    kind: ErrorKind,
}

impl Error {
    fn new<S: Into<PathBuf>>(path: S, kind: ErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the specification error, if this is one.
    pub fn spec_error(&self) -> Option<&SpecError> {
        match &self.kind {
            ErrorKind::Spec(error) => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        use ErrorKind as E;

        let path = self.path.display();
        match &self.kind {
            E::SourceFile(error) => {
                write!(fmt, "failed to read source file \"{path}\", {error}")
            }
            E::Parse(error) => write!(fmt, "failed to parse \"{path}\", {error}"),
            E::Spec(error) => write!(fmt, "{path}: {error}"),
            E::Render(_) => write!(fmt, "failed to render \"{path}\""),
            E::OpcodeRange(first) => write!(
                fmt,
                "failed to render \"{path}\", opcode field at bit {first} does not fit in 16 bits, \
                 expected at most {}",
                RenderOptions::OPCODE_FIRST_MAX
            ),
            E::OutputDir(error) => {
                write!(fmt, "failed to create output directory \"{path}\", {error}")
            }
            E::OutputFile(error) => {
                write!(fmt, "failed to create output file \"{path}\", {error}")
            }
            E::Generate(error) => {
                write!(fmt, "failed to generate output file \"{path}\", {error}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use ErrorKind as E;

        match &self.kind {
            E::SourceFile(error)
            | E::OutputDir(error)
            | E::OutputFile(error)
            | E::Generate(error) => Some(error),
            E::Parse(error) => Some(error),
            E::Spec(error) => Some(error),
            E::Render(error) => Some(error),
            E::OpcodeRange(_) => None,
        }
    }
}

/// Rendered artifact waiting to be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub text: String,
}

/// Result of comparing an artifact with the file on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stale {
    pub path: PathBuf,
    /// Current content, empty if the file does not exist.
    pub current: String,
    pub expect: String,
}

/// Loads a specification, builds the tables and writes the headers.
///
/// ```no_run
/// use decgen::Generator;
///
/// let out_dir = std::env::var("OUT_DIR").unwrap();
/// if let Err(err) = Generator::new("armv7m.json").output_dir(out_dir).generate() {
///     eprintln!("{err}");
///     std::process::exit(1);
/// }
/// ```
pub struct Generator {
    source: PathBuf,
    out_dir: PathBuf,
    instr_output: PathBuf,
    decoders_output: PathBuf,
    opts: RenderOptions,
    rerun_if_changed: bool,
}

impl Generator {
    pub fn new(source: impl AsRef<Path>) -> Self {
        Self {
            source: source.as_ref().into(),
            out_dir: PathBuf::from("."),
            instr_output: PathBuf::from("instr.h"),
            decoders_output: PathBuf::from("op_decoders.h"),
            opts: RenderOptions::default(),
            rerun_if_changed: false,
        }
    }

    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.out_dir = dir.as_ref().into();
        self
    }

    pub fn instr_output(mut self, name: impl AsRef<Path>) -> Self {
        self.instr_output = name.as_ref().into();
        self
    }

    pub fn decoders_output(mut self, name: impl AsRef<Path>) -> Self {
        self.decoders_output = name.as_ref().into();
        self
    }

    pub fn render_options(mut self, opts: RenderOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Print `cargo:rerun-if-changed` for the source, for use in build scripts.
    pub fn rerun_if_changed(mut self, enabled: bool) -> Self {
        self.rerun_if_changed = enabled;
        self
    }

    pub fn load(&self) -> Result<SpecDocument, Error> {
        let source = &self.source;
        if self.rerun_if_changed {
            println!("cargo:rerun-if-changed={}", source.display());
        }
        let src = fs::read_to_string(source)
            .map_err(|error| Error::new(source, ErrorKind::SourceFile(error)))?;
        src.parse()
            .map_err(|error| Error::new(source, ErrorKind::Parse(error)))
    }

    pub fn build(&self) -> Result<GenData, Error> {
        let doc = self.load()?;
        GenData::build(&doc).map_err(|error| Error::new(&self.source, ErrorKind::Spec(error)))
    }

    /// Renders every artifact in memory without touching the file system.
    pub fn render(&self, data: &GenData) -> Result<Vec<Artifact>, Error> {
        let instr_path = self.out_dir.join(&self.instr_output);
        let instr = render::render_instr(data, &self.opts)
            .map_err(|error| Error::new(&instr_path, ErrorKind::Render(error)))?;

        let decoders_path = self.out_dir.join(&self.decoders_output);
        if !self.opts.is_valid() {
            let first = self.opts.opcode_first;
            return Err(Error::new(&decoders_path, ErrorKind::OpcodeRange(first)));
        }
        let decoders = render::render_op_decoders(data, &self.opts)
            .map_err(|error| Error::new(&decoders_path, ErrorKind::Render(error)))?;

        Ok(vec![
            Artifact {
                path: decoders_path,
                text: decoders,
            },
            Artifact {
                path: instr_path,
                text: instr,
            },
        ])
    }

    /// Builds, renders and writes all artifacts.
    ///
    /// Nothing is written unless every artifact rendered successfully.
    pub fn generate(&self) -> Result<Vec<PathBuf>, Error> {
        let data = self.build()?;
        let artifacts = self.render(&data)?;
        write_artifacts(&artifacts)?;
        Ok(artifacts.into_iter().map(|i| i.path).collect())
    }

    /// Returns artifacts whose files are missing or differ from the rendered text.
    pub fn check(&self) -> Result<Vec<Stale>, Error> {
        let data = self.build()?;
        let mut stale = Vec::new();
        for artifact in self.render(&data)? {
            let current = match fs::read_to_string(&artifact.path) {
                Ok(s) => s,
                Err(error) if error.kind() == io::ErrorKind::NotFound => String::new(),
                Err(error) => {
                    return Err(Error::new(&artifact.path, ErrorKind::SourceFile(error)));
                }
            };
            if current != artifact.text {
                debug!("stale: {}", artifact.path.display());
                stale.push(Stale {
                    path: artifact.path,
                    current,
                    expect: artifact.text,
                });
            }
        }
        Ok(stale)
    }
}

fn create_file(path: &Path) -> Result<File, Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|error| Error::new(parent, ErrorKind::OutputDir(error)))?;
    }
    File::create(path).map_err(|error| Error::new(path, ErrorKind::OutputFile(error)))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf().into_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn write_tmp(artifact: &Artifact) -> Result<PathBuf, Error> {
    let tmp = tmp_path(&artifact.path);
    let mut out = create_file(&tmp).map(BufWriter::new)?;
    out.write_all(artifact.text.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|error| Error::new(&artifact.path, ErrorKind::Generate(error)))?;
    Ok(tmp)
}

/// Writes all artifacts or none of them.
///
/// Every artifact is first written to a temporary sibling file, the files are
/// renamed into place only after all of them were written. Temporary files
/// are removed on failure, artifacts renamed before a failed rename stay.
pub fn write_artifacts(artifacts: &[Artifact]) -> Result<(), Error> {
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        match write_tmp(artifact) {
            Ok(tmp) => written.push(tmp),
            Err(error) => {
                for tmp in &written {
                    let _ = fs::remove_file(tmp);
                }
                let _ = fs::remove_file(tmp_path(&artifact.path));
                return Err(error);
            }
        }
    }

    for (i, (tmp, artifact)) in written.iter().zip(artifacts).enumerate() {
        if let Err(error) = fs::rename(tmp, &artifact.path) {
            for tmp in &written[i..] {
                let _ = fs::remove_file(tmp);
            }
            return Err(Error::new(&artifact.path, ErrorKind::Generate(error)));
        }
        info!("generated {}", artifact.path.display());
    }
    Ok(())
}
