//! Scans an input string (source file) character by character.

use std::path::Path;

#[derive(Debug)]
pub struct ParseError {
    msg: String,
    ofs: usize,
}
pub type ParseResult<T> = Result<T, ParseError>;

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.msg)
    }
}

/// Reading past the end of the buffer yields '\0'.
pub struct Scanner<'a> {
    buf: &'a [u8],
    pub ofs: usize,
    pub line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Scanner {
            buf,
            ofs: 0,
            line: 1,
        }
    }

    /// Only for spans of ASCII already checked by the caller.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        std::str::from_utf8(&self.buf[start..end]).unwrap_or_default()
    }
    pub fn text(&self, start: usize, end: usize) -> Result<&'a str, std::str::Utf8Error> {
        std::str::from_utf8(&self.buf[start..end])
    }
    pub fn peek(&self) -> char {
        self.buf.get(self.ofs).map_or('\0', |&c| c as char)
    }
    pub fn at_end(&self) -> bool {
        self.ofs >= self.buf.len()
    }
    pub fn next(&mut self) {
        if self.at_end() {
            return;
        }
        if self.peek() == '\n' {
            self.line += 1;
        }
        self.ofs += 1;
    }
    pub fn back(&mut self) {
        if self.ofs == 0 {
            panic!("back at start")
        }
        self.ofs -= 1;
        if self.peek() == '\n' {
            self.line -= 1;
        }
    }
    pub fn read(&mut self) -> char {
        let c = self.peek();
        self.next();
        c
    }
    pub fn skip(&mut self, ch: char) -> bool {
        if self.peek() == ch {
            self.next();
            return true;
        }
        false
    }

    pub fn skip_spaces(&mut self) {
        while self.skip(' ') || self.skip('\t') {}
    }

    /// Consume a line ending: "\n", "\r\n", or the end of input.
    pub fn expect_eol(&mut self) -> ParseResult<()> {
        if self.at_end() {
            return Ok(());
        }
        self.skip('\r');
        self.expect('\n')
    }

    pub fn expect(&mut self, ch: char) -> ParseResult<()> {
        let r = self.peek();
        if r != ch {
            return self.parse_error(format!("expected {:?}, got {:?}", ch, r));
        }
        self.next();
        Ok(())
    }

    pub fn parse_error<T, S: Into<String>>(&self, msg: S) -> ParseResult<T> {
        Err(ParseError {
            msg: msg.into(),
            ofs: self.ofs,
        })
    }

    /// Render an error as "parse error: msg", then the offending line
    /// prefixed with "file:line: ", then a caret under the column.
    pub fn format_parse_error(&self, filename: &Path, err: ParseError) -> String {
        let ofs = err.ofs.min(self.buf.len());
        let line_start = self.buf[..ofs]
            .iter()
            .rposition(|&c| c == b'\n')
            .map_or(0, |i| i + 1);
        let line_end = self.buf[ofs..]
            .iter()
            .position(|&c| c == b'\n')
            .map_or(self.buf.len(), |i| ofs + i);
        let line_number = self.buf[..line_start].iter().filter(|&&c| c == b'\n').count() + 1;

        let mut msg = format!("parse error: {}\n", err.msg);
        let prefix = format!("{}:{}: ", filename.display(), line_number);
        msg.push_str(&prefix);

        let context = String::from_utf8_lossy(&self.buf[line_start..line_end]);
        let mut context: &str = context.trim_end_matches('\r');
        let mut col = ofs - line_start;
        if col > 40 && context.is_char_boundary(col - 20) {
            // Trim beginning of line to fit it on screen.
            msg.push_str("...");
            context = &context[col - 20..];
            col = 3 + 20;
        }
        if context.len() > 40 && context.is_char_boundary(40) {
            msg.push_str(&context[..40]);
            msg.push_str("...");
        } else {
            msg.push_str(context);
        }
        msg.push('\n');

        msg.push_str(&" ".repeat(prefix.len() + col));
        msg.push_str("^\n");
        msg
    }
}
