//! Line-oriented edit scripts

use anyhow::{anyhow, bail, Context, Result};
use clap::ValueEnum;
use gridcalc::prelude::*;
use std::io::{BufRead, Write};
use tracing::debug;

/// Which representation of the cells to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PrintMode {
    Values,
    Texts,
}

/// One script line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set { pos: Position, text: String },
    Clear(Position),
    Value(Position),
    Text(Position),
    Refs(Position),
    Size,
    Print(PrintMode),
}

fn position(arg: Option<&str>) -> Result<Position> {
    let arg = arg.ok_or_else(|| anyhow!("missing cell position"))?;
    Ok(Position::parse(arg)?)
}

fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (s, ""),
    }
}

impl Command {
    /// Parse a script line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        if trimmed.trim_end().is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let (name, rest) = split_word(trimmed);
        let command = match name {
            "set" => {
                // Everything after the position is the cell text, spaces included
                let (cell, text) = split_word(rest.trim_start());
                Command::Set {
                    pos: position(Some(cell).filter(|c| !c.is_empty()))?,
                    text: text.to_string(),
                }
            }
            "clear" => Command::Clear(position(rest.split_whitespace().next())?),
            "value" => Command::Value(position(rest.split_whitespace().next())?),
            "text" => Command::Text(position(rest.split_whitespace().next())?),
            "refs" => Command::Refs(position(rest.split_whitespace().next())?),
            "size" => Command::Size,
            "print" => {
                let mode = rest.trim();
                Command::Print(
                    PrintMode::from_str(mode, true)
                        .map_err(|_| anyhow!("expected 'values' or 'texts', got '{}'", mode))?,
                )
            }
            other => bail!("unknown command '{}'", other),
        };
        Ok(Some(command))
    }

    /// Apply the command to `sheet`, writing any output to `out`
    pub fn execute<W: Write>(&self, sheet: &mut Sheet, out: &mut W) -> Result<()> {
        match self {
            Command::Set { pos, text } => sheet.set_cell(*pos, text)?,
            Command::Clear(pos) => sheet.clear_cell(*pos)?,
            Command::Value(pos) => {
                let value = sheet.get_cell(*pos)?.map(|cell| cell.value().to_string());
                writeln!(out, "{}", value.unwrap_or_default())?;
            }
            Command::Text(pos) => {
                let text = sheet.get_cell(*pos)?.map_or("", |cell| cell.text());
                writeln!(out, "{}", text)?;
            }
            Command::Refs(pos) => {
                let refs = sheet
                    .get_cell(*pos)?
                    .map(|cell| cell.referenced_cells())
                    .unwrap_or_default();
                let refs: Vec<String> = refs.iter().map(|p| p.to_string()).collect();
                writeln!(out, "{}", refs.join(" "))?;
            }
            Command::Size => {
                let size = sheet.printable_size();
                writeln!(out, "{} {}", size.rows, size.cols)?;
            }
            Command::Print(PrintMode::Values) => sheet.print_values(out)?,
            Command::Print(PrintMode::Texts) => sheet.print_texts(out)?,
        }
        Ok(())
    }
}

/// Run every line of `input` against `sheet`.
///
/// A failing line is reported to `errors` with its line number and the
/// script carries on. Returns the number of failed lines.
pub fn run_script<R, W, E>(sheet: &mut Sheet, input: R, out: &mut W, errors: &mut E) -> Result<usize>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut failures = 0;

    for (index, line) in input.lines().enumerate() {
        let number = index + 1;
        let line = line.with_context(|| format!("Failed to read line {}", number))?;

        let result = Command::parse(&line).and_then(|command| match command {
            Some(command) => {
                debug!(line = number, ?command, "executing");
                command.execute(sheet, out)
            }
            None => Ok(()),
        });

        if let Err(err) = result {
            failures += 1;
            writeln!(errors, "line {}: {:#}", number, err)?;
        }
    }

    Ok(failures)
}
