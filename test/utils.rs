use std::fmt::{self, Write as _};

/// Shows tabs and trailing whitespace of a line.
struct Escape<'a>(&'a str);

impl fmt::Display for Escape<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let trailing = self.0.len() - self.0.trim_end().len();
        let (head, tail) = self.0.split_at(self.0.len() - trailing);
        for c in head.chars() {
            match c {
                '\t' => fmt.write_char('→')?,
                _ => fmt.write_char(c)?,
            }
        }
        // make trailing whitespace visible
        for c in tail.chars() {
            match c {
                '\t' => fmt.write_char('→')?,
                ' ' => fmt.write_char('•')?,
                _ => fmt.write_char(c)?,
            }
        }
        Ok(())
    }
}

/// Line diff of an expected and an actual text.
pub struct Diff<'a> {
    file: &'a str,
    line: usize,
    expect: &'a str,
    result: &'a str,
}

impl<'a> Diff<'a> {
    pub fn new(file: &'a str, line: usize, expect: &'a str, result: &'a str) -> Self {
        Self {
            file,
            line,
            expect,
            result,
        }
    }
}

impl fmt::Display for Diff<'_> {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        use diff::Result as E;
        let w = 5;
        if !self.file.is_empty() {
            writeln!(out, "{:w$}--> {}", ' ', self.file)?;
        }
        let mut ln = std::cmp::max(self.line, 1);
        let mut ln2 = ln;
        for diff in diff::lines(self.expect, self.result) {
            match diff {
                E::Left(l) => {
                    writeln!(out, "{ln:w$} - {}↴", Escape(l))?;
                    ln += 1;
                }
                E::Both(l, _) => {
                    writeln!(out, "{ln:w$} | {}↴", Escape(l))?;
                    ln += 1;
                    ln2 = ln;
                }
                E::Right(r) => {
                    writeln!(out, "{ln2:w$} + {}↴", Escape(r))?;
                    ln2 += 1;
                }
            }
        }
        Ok(())
    }
}

pub fn check(file: &str, line: usize, left: &str, right: &str) -> Result<(), String> {
    if left != right {
        let err = "invalid result";
        eprintln!("error: {err}");
        eprintln!("{}", Diff::new(file, line, left, right));
        return Err(err.to_string());
    }
    Ok(())
}
