//! Stroke path parsing
//!
//! Freehand strokes are recorded as a command string made of `M x y`
//! (move-to) and `L x y` (line-to) commands. Coordinates are screen-space
//! floats separated by whitespace and/or commas; commands may be glued to
//! their first coordinate (`M10,20L30 40`).
//!
//! The parser is tolerant: a token that is not a finite number is skipped
//! and a coordinate left without its pair is dropped. It never deduplicates
//! or simplifies points.

use std::fmt::Write;

use super::types::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    MoveTo,
    LineTo,
}

impl Command {
    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'M' => Some(Self::MoveTo),
            'L' => Some(Self::LineTo),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Command(Command),
    Number(&'a str),
}

/// Splits a path string into command letters and numeric-looking tokens
struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn is_separator(ch: char) -> bool {
        ch.is_whitespace() || ch == ','
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        while let Some(ch) = self.peek() {
            if Self::is_separator(ch) {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }

        let first = self.peek()?;
        if let Some(command) = Command::from_letter(first) {
            self.pos += first.len_utf8();
            return Some(Token::Command(command));
        }

        let start = self.pos;
        while let Some(ch) = self.peek() {
            if Self::is_separator(ch) || Command::from_letter(ch).is_some() {
                break;
            }
            self.pos += ch.len_utf8();
        }

        Some(Token::Number(&self.input[start..self.pos]))
    }
}

/// Parse a stroke command string into its points, in order of appearance.
pub fn parse_path(path: &str) -> Vec<Point> {
    let mut points = Vec::new();
    let mut command: Option<Command> = None;
    let mut pending_x: Option<f64> = None;

    for token in Tokenizer::new(path) {
        match token {
            Token::Command(next) => {
                command = Some(next);
                pending_x = None;
            }
            Token::Number(raw) => {
                // Coordinates before the first command have no subpath
                if command.is_none() {
                    continue;
                }
                let value = match raw.parse::<f64>() {
                    Ok(v) if v.is_finite() => v,
                    _ => {
                        tracing::trace!("Skipping malformed path token {:?}", raw);
                        continue;
                    }
                };
                match pending_x.take() {
                    None => pending_x = Some(value),
                    Some(x) => points.push(Point::new(x, value)),
                }
            }
        }
    }

    points
}

/// Accumulates an in-progress stroke as command text
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    commands: String,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new subpath at `point`
    pub fn move_to(&mut self, point: Point) {
        self.push('M', point);
    }

    /// Extend the current subpath to `point`
    pub fn line_to(&mut self, point: Point) {
        self.push('L', point);
    }

    fn push(&mut self, command: char, point: Point) {
        if !self.commands.is_empty() {
            self.commands.push(' ');
        }
        // Writing into a String cannot fail.
        let _ = write!(self.commands, "{} {} {}", command, point.x, point.y);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.commands
    }

    pub fn into_string(self) -> String {
        self.commands
    }
}
