//! # Manual Path Choice
//!
//! [`PathChooser`] is the capability that picks one entry from a ranked
//! list. The selector calls it for interactive policies and nowhere else.
//!
//! [`PromptChooser`] is the terminal implementation: it prints the list
//! 1-indexed, reads one line at a time, and re-prompts until it gets a
//! number in range. Malformed input never escapes the chooser; only end of
//! input or an I/O failure does.

use std::io::{self, BufRead, Write};

use pathsel_core::PathCandidate;

use crate::error::SelectError;

/// Picks one entry of a ranked list.
pub trait PathChooser {
    /// Return the 0-based index of the chosen entry. `ranked` is never empty.
    /// An index past the end fails the selection with
    /// [`SelectError::InvalidChoice`].
    fn choose(&mut self, ranked: &[PathCandidate]) -> Result<usize, SelectError>;
}

/// Why a line of input was not accepted. Reported back to the user and
/// re-prompted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidSelection {
    NotANumber(String),
    OutOfRange { choice: usize, max: usize },
}

impl std::fmt::Display for InvalidSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotANumber(input) => write!(f, "{input:?} is not a number"),
            Self::OutOfRange { choice, max } => {
                write!(f, "{choice} is out of range, pick 1 to {max}")
            }
        }
    }
}

/// Parse one line of input as a 1-based choice among `count` entries.
pub fn parse_choice(line: &str, count: usize) -> Result<usize, InvalidSelection> {
    let trimmed = line.trim();
    let choice: usize = trimmed
        .parse()
        .map_err(|_| InvalidSelection::NotANumber(trimmed.to_string()))?;
    if choice == 0 || choice > count {
        return Err(InvalidSelection::OutOfRange { choice, max: count });
    }
    Ok(choice - 1)
}

/// Line-oriented prompt over any reader and writer.
pub struct PromptChooser<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptChooser<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn list(&mut self, ranked: &[PathCandidate]) -> io::Result<()> {
        writeln!(self.output, "Available paths:")?;
        for (i, c) in ranked.iter().enumerate() {
            writeln!(self.output, "[{:>2}] {c}", i + 1)?;
        }
        Ok(())
    }
}

impl PromptChooser<io::BufReader<io::Stdin>, io::Stdout> {
    /// Prompt on the process terminal.
    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> PathChooser for PromptChooser<R, W> {
    fn choose(&mut self, ranked: &[PathCandidate]) -> Result<usize, SelectError> {
        self.list(ranked)?;
        let mut line = String::new();
        loop {
            write!(self.output, "Choose path [1-{}]: ", ranked.len())?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Err(SelectError::InputClosed);
            }
            match parse_choice(&line, ranked.len()) {
                Ok(index) => return Ok(index),
                Err(invalid) => {
                    tracing::debug!(input = line.trim(), "rejected path choice");
                    writeln!(self.output, "Invalid selection: {invalid}")?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathsel_core::{PathFingerprint, RegionId};
    use std::io::Cursor;

    fn ranked() -> Vec<PathCandidate> {
        ["a", "b", "c"]
            .iter()
            .map(|fp| {
                PathCandidate::new(
                    PathFingerprint::new(*fp).unwrap(),
                    vec![RegionId::new(1).unwrap()],
                )
            })
            .collect()
    }

    #[test]
    fn parse_choice_bounds() {
        assert_eq!(parse_choice(" 2\n", 3), Ok(1));
        assert_eq!(parse_choice("1", 1), Ok(0));
        assert_eq!(
            parse_choice("0", 3),
            Err(InvalidSelection::OutOfRange { choice: 0, max: 3 })
        );
        assert_eq!(
            parse_choice("4", 3),
            Err(InvalidSelection::OutOfRange { choice: 4, max: 3 })
        );
        assert_eq!(
            parse_choice("-1", 3),
            Err(InvalidSelection::NotANumber("-1".to_string()))
        );
    }

    #[test]
    fn reprompts_until_valid() {
        let mut chooser = PromptChooser::new(Cursor::new("abc\n9\n\n3\n"), Vec::new());
        assert_eq!(chooser.choose(&ranked()).unwrap(), 2);

        let (_, out) = chooser.into_inner();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("[ 1] a [1] hops=1"));
        assert_eq!(out.matches("Invalid selection").count(), 3);
        assert_eq!(out.matches("Choose path [1-3]: ").count(), 4);
    }

    #[test]
    fn eof_is_input_closed() {
        let mut chooser = PromptChooser::new(Cursor::new("x\n"), Vec::new());
        let err = chooser.choose(&ranked()).unwrap_err();
        assert!(matches!(err, SelectError::InputClosed));
    }
}
