//! Parser for build.tock manifests.
//!
//! The format is line-oriented, in the spirit of .ninja files:
//!
//! ```text
//! # comment
//! file out.o: in.c
//!   command = cc -c in.c -o out.o
//! phony all: out.o
//! default all
//! ```
//!
//! Paths use `$ `, `$:` and `$$` to escape a space, a colon and a dollar
//! sign, and a `$` at the end of a line continues the statement onto the
//! next line.

use crate::canon::canon_path;
use crate::graph::TaskKind;
use crate::scanner::{ParseError, ParseResult, Scanner};
use std::path::Path;

/// A task declaration.
#[derive(Debug, PartialEq)]
pub struct TaskDecl {
    pub kind: TaskKind,
    pub line: usize,
    pub targets: Vec<String>,
    pub prereqs: Vec<String>,
    pub command: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum Statement {
    Task(TaskDecl),
    Default(Vec<String>),
}

pub struct Parser<'text> {
    scanner: Scanner<'text>,
    /// Paths are accumulated here, since escapes mean they can't always be
    /// sliced straight out of the input.
    path_buf: String,
}

fn is_ident_char(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' | '.')
}

fn is_path_char(c: char) -> bool {
    matches!(
      c,
      'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' | '.' | '/' | ',' | '+' | '@' | '=' | '~'
    )
}

impl<'text> Parser<'text> {
    pub fn new(buf: &'text [u8]) -> Parser<'text> {
        Parser {
            scanner: Scanner::new(buf),
            path_buf: String::with_capacity(64),
        }
    }

    pub fn format_parse_error(&self, filename: &Path, err: ParseError) -> String {
        self.scanner.format_parse_error(filename, err)
    }

    pub fn read(&mut self) -> ParseResult<Option<Statement>> {
        loop {
            match self.scanner.peek() {
                '\0' if self.scanner.at_end() => return Ok(None),
                '\n' | '\r' => self.scanner.next(),
                '#' => self.skip_comment(),
                ' ' | '\t' => return self.scanner.parse_error("unexpected whitespace"),
                _ => {
                    let ident = self.read_ident()?;
                    self.scanner.skip_spaces();
                    return Ok(Some(match ident {
                        "file" => Statement::Task(self.read_task(TaskKind::File)?),
                        "phony" => Statement::Task(self.read_task(TaskKind::Phony)?),
                        "default" => Statement::Default(self.read_default()?),
                        _ => {
                            return self
                                .scanner
                                .parse_error(format!("unexpected statement {:?}", ident))
                        }
                    }));
                }
            }
        }
    }

    /// Read all statements up to the end of input.
    pub fn read_all(&mut self) -> ParseResult<Vec<Statement>> {
        let mut stmts = Vec::new();
        while let Some(stmt) = self.read()? {
            stmts.push(stmt);
        }
        Ok(stmts)
    }

    fn read_task(&mut self, kind: TaskKind) -> ParseResult<TaskDecl> {
        let line = self.scanner.line;
        let targets = self.read_paths()?;
        if targets.is_empty() {
            return self.scanner.parse_error("expected target");
        }
        self.scanner.expect(':')?;
        let prereqs = self.read_paths()?;
        self.scanner.expect_eol()?;
        let command = self.read_attributes()?;
        Ok(TaskDecl {
            kind,
            line,
            targets,
            prereqs,
            command,
        })
    }

    /// Read the indented `key = value` lines following a task.
    /// `command` is the only attribute.
    fn read_attributes(&mut self) -> ParseResult<Option<String>> {
        let mut command = None;
        while matches!(self.scanner.peek(), ' ' | '\t') {
            self.scanner.skip_spaces();
            match self.scanner.peek() {
                // Blank line with trailing whitespace.
                '\n' | '\r' => {
                    self.scanner.expect_eol()?;
                    continue;
                }
                '\0' if self.scanner.at_end() => break,
                _ => {}
            }
            let key = self.read_ident()?;
            if key != "command" {
                return self
                    .scanner
                    .parse_error(format!("unexpected attribute {:?}", key));
            }
            if command.is_some() {
                return self.scanner.parse_error("duplicate command");
            }
            self.scanner.skip_spaces();
            self.scanner.expect('=')?;
            self.scanner.skip_spaces();
            command = Some(self.read_value()?);
            self.scanner.expect_eol()?;
        }
        Ok(command)
    }

    fn read_default(&mut self) -> ParseResult<Vec<String>> {
        let defaults = self.read_paths()?;
        if defaults.is_empty() {
            return self.scanner.parse_error("expected path");
        }
        self.scanner.expect_eol()?;
        Ok(defaults)
    }

    fn skip_comment(&mut self) {
        while !self.scanner.at_end() && self.scanner.read() != '\n' {}
    }

    fn read_ident(&mut self) -> ParseResult<&'text str> {
        let start = self.scanner.ofs;
        while is_ident_char(self.scanner.peek()) {
            self.scanner.next();
        }
        let end = self.scanner.ofs;
        if end == start {
            return self.scanner.parse_error("failed to scan ident");
        }
        Ok(self.scanner.slice(start, end))
    }

    /// The rest of the line, verbatim apart from surrounding whitespace.
    fn read_value(&mut self) -> ParseResult<String> {
        let start = self.scanner.ofs;
        while !self.scanner.at_end() && self.scanner.peek() != '\n' {
            self.scanner.next();
        }
        match self.scanner.text(start, self.scanner.ofs) {
            Ok(value) => Ok(value.trim().to_string()),
            Err(_) => {
                self.scanner.ofs = start;
                self.scanner.parse_error("invalid utf-8")
            }
        }
    }

    fn read_paths(&mut self) -> ParseResult<Vec<String>> {
        let mut paths = Vec::new();
        self.scanner.skip_spaces();
        while let Some(path) = self.read_path()? {
            paths.push(path);
            self.scanner.skip_spaces();
        }
        Ok(paths)
    }

    fn read_path(&mut self) -> ParseResult<Option<String>> {
        self.path_buf.clear();
        loop {
            let c = self.scanner.peek();
            if is_path_char(c) {
                self.path_buf.push(c);
                self.scanner.next();
                continue;
            }
            match c {
                '$' => {
                    self.scanner.next();
                    self.read_escape()?;
                }
                ':' | ' ' | '\t' | '\n' | '\r' | '\0' => break,
                c => {
                    return self
                        .scanner
                        .parse_error(format!("unexpected character {:?}", c));
                }
            }
        }
        if self.path_buf.is_empty() {
            return Ok(None);
        }
        Ok(Some(canon_path(self.path_buf.as_str())))
    }

    fn read_escape(&mut self) -> ParseResult<()> {
        match self.scanner.read() {
            '\n' => self.scanner.skip_spaces(),
            '\r' => {
                self.scanner.expect('\n')?;
                self.scanner.skip_spaces();
            }
            c @ ' ' | c @ '$' | c @ ':' => self.path_buf.push(c),
            c => {
                self.scanner.back();
                return self.scanner.parse_error(format!("bad $-escape {:?}", c));
            }
        }
        Ok(())
    }
}
