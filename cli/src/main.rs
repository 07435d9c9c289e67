#[macro_use]
extern crate log;

mod cli;
mod table;

use std::{
    error::Error,
    io::{self, Write},
    process,
};

use decgen::{Generator, Stale};

use crate::cli::{Cli, Color, Emit};

// ignore broken pipe error
fn helper(result: io::Result<()>) -> io::Result<()> {
    if matches!(result, Err(ref e) if e.kind() == io::ErrorKind::BrokenPipe) {
        Ok(())
    } else {
        result
    }
}

fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("error: {err}");
    process::exit(1);
}

fn print_diff(out: &mut impl Write, stale: &Stale, color: Color) -> io::Result<()> {
    use diff::Result as E;

    writeln!(out, "--- {}", stale.path.display())?;
    writeln!(out, "+++ {} (generated)", stale.path.display())?;
    for diff in diff::lines(&stale.current, &stale.expect) {
        match diff {
            E::Left(l) => table::removed(out, color, l)?,
            E::Right(r) => table::added(out, color, r)?,
            E::Both(..) => {}
        }
    }
    Ok(())
}

struct App {
    gen: Generator,
    color: Color,
}

impl App {
    fn new(cli: &Cli) -> Self {
        let gen = Generator::new(&cli.spec)
            .output_dir(&cli.output_dir)
            .instr_output(&cli.instr_output)
            .decoders_output(&cli.decoders_output)
            .render_options(cli.render_options());
        Self {
            gen,
            color: cli.color,
        }
    }

    fn check(&self) -> Result<bool, Box<dyn Error>> {
        let stale = self.gen.check()?;
        if stale.is_empty() {
            return Ok(true);
        }
        let mut out = io::stdout().lock();
        for i in &stale {
            eprintln!("error: {} is out of date", i.path.display());
            helper(print_diff(&mut out, i, self.color))?;
        }
        Ok(false)
    }

    fn headers(&self) -> Result<(), Box<dyn Error>> {
        let written = self.gen.generate()?;
        debug!("wrote {} files", written.len());
        Ok(())
    }

    fn json(&self) -> Result<(), Box<dyn Error>> {
        let data = self.gen.build()?;
        let json = data.to_json()?;
        helper(writeln!(io::stdout().lock(), "{json}"))?;
        Ok(())
    }

    fn table(&self) -> Result<(), Box<dyn Error>> {
        let data = self.gen.build()?;
        let mut out = io::stdout().lock();
        helper(table::print(&mut out, &data, self.color))?;
        Ok(())
    }

    /// Returns `false` if generated headers are out of date.
    fn run(&self, cli: &Cli) -> Result<bool, Box<dyn Error>> {
        if cli.check {
            return self.check();
        }
        match cli.emit {
            Emit::Headers => self.headers()?,
            Emit::Json => self.json()?,
            Emit::Table => self.table()?,
        }
        Ok(true)
    }
}

fn main() {
    env_logger::init();

    let cli = cli::parse_cli();
    match App::new(&cli).run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => fail(err),
    }
}
