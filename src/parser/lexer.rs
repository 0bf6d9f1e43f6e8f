/// Opens any tag
pub const OPEN: &[u8] = b"{{";
/// Closes a tag
pub const CLOSE: &[u8] = b"}}";
/// Closes a `{{{ raw }}}` tag
pub const RAW_CLOSE: &[u8] = b"}}}";

/// What was skipped while looking for a delimiter
#[derive(Debug, PartialEq)]
pub enum Token<'a> {
    /// The bytes before the delimiter, which has been consumed
    Delimited(&'a [u8]),
    /// The delimiter was not found: everything left in the input
    Eof(&'a [u8]),
}

/// Cursor over the raw bytes of a template
#[derive(Debug)]
pub struct Lexer<'a> {
    input: &'a [u8],
    position: usize,
    /// 1-based, incremented for every `\n` the cursor moves past
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a [u8]) -> Lexer<'a> {
        Lexer { input, position: 0, line: 1 }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// The byte right under the cursor, without consuming it
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.position).copied()
    }

    /// The delimiter closing the tag whose `{{` was just consumed
    pub fn closing_delimiter(&self) -> &'static [u8] {
        if self.peek() == Some(b'{') {
            RAW_CLOSE
        } else {
            CLOSE
        }
    }

    /// Moves past the next occurrence of `delimiter`, returning what was skipped.
    /// If there is none, the cursor ends up at the end of the input.
    pub fn next_token(&mut self, delimiter: &[u8]) -> Token<'a> {
        let rest = &self.input[self.position..];

        match find(rest, delimiter) {
            Some(offset) => {
                let text = &rest[..offset];
                self.line += count_newlines(text);
                self.position += offset + delimiter.len();
                Token::Delimited(text)
            }
            None => {
                self.line += count_newlines(rest);
                self.position = self.input.len();
                Token::Eof(rest)
            }
        }
    }

    /// Consumes a single `\n` or `\r\n` if the cursor is on one
    pub fn skip_newline(&mut self) {
        let rest = &self.input[self.position..];
        if rest.starts_with(b"\n") {
            self.position += 1;
            self.line += 1;
        } else if rest.starts_with(b"\r\n") {
            self.position += 2;
            self.line += 1;
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn count_newlines(text: &[u8]) -> usize {
    text.iter().filter(|&&b| b == b'\n').count()
}
