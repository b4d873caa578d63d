//! Column-aware Ninja text emitter
//!
//! Long lines are wrapped with Ninja's `$` line continuation. A break is only
//! placed on a space that is not itself escaped (`$ `), so wrapping never
//! changes the meaning of a line. Comments carry no escapes and are
//! word-wrapped.

use crate::config::defaults::MINIMUM_COLUMNS_STRICT;

/// One level of indentation
pub const INDENT: &str = "  ";

/// Builds the text of a Ninja file
#[derive(Debug)]
pub struct Writer {
    out: String,
    columns: Option<usize>,
    strict: bool,
}

impl Writer {
    /// Create a writer wrapping at `columns`, or not at all for `None`.
    ///
    /// In strict mode the width is raised to at least
    /// [`MINIMUM_COLUMNS_STRICT`].
    pub fn new(columns: Option<usize>, strict: bool) -> Self {
        let columns = if strict {
            columns.map(|c| c.max(MINIMUM_COLUMNS_STRICT))
        } else {
            columns
        };
        Self {
            out: String::new(),
            columns,
            strict,
        }
    }

    /// Effective column width
    pub fn columns(&self) -> Option<usize> {
        self.columns
    }

    /// Whether hard breaks are allowed
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Emit an empty line
    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Emit a code line at `indent` levels, wrapping as needed
    pub fn line(&mut self, line: &str, indent: usize) {
        let mut indentation = INDENT.repeat(indent);
        let Some(columns) = self.columns else {
            self.push_line(&indentation, line, "");
            return;
        };

        let mut rest = line;
        let mut broken = false;
        while !rest.is_empty() && indentation.len() + rest.len() > columns {
            let width = columns.saturating_sub(indentation.len() + 2).max(1);

            let mut space = last_unescaped_space(rest, width);
            if space.is_none() && !self.strict {
                space = next_unescaped_space(rest, width);
            }

            if let Some(space) = space {
                self.push_line(&indentation, &rest[..space], " $");
                rest = &rest[space + 1..];
                if !broken {
                    broken = true;
                    indentation.push_str(INDENT);
                }
            } else if self.strict {
                let cut = hard_break(rest, width + 1);
                if cut >= rest.len() {
                    break;
                }
                self.push_line(&indentation, &rest[..cut], "$");
                rest = &rest[cut..];
            } else {
                break;
            }
        }

        self.push_line(&indentation, rest, "");
    }

    /// Emit a comment, word-wrapped to the column width
    pub fn comment(&mut self, text: &str) {
        match self.columns {
            None => self.push_line("# ", text, ""),
            Some(columns) => {
                let width = columns.saturating_sub(2);
                for segment in wrap_words(text, width, self.strict) {
                    self.push_line("# ", &segment, "");
                }
            }
        }
    }

    /// Text written so far
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Finish and take the text
    pub fn into_string(self) -> String {
        self.out
    }

    fn push_line(&mut self, prefix: &str, body: &str, suffix: &str) {
        self.out.push_str(prefix);
        self.out.push_str(body);
        self.out.push_str(suffix);
        self.out.push('\n');
    }
}

/// A space is escaped when preceded by an odd run of `$`
fn is_unescaped(line: &str, index: usize) -> bool {
    let dollars = line.as_bytes()[..index]
        .iter()
        .rev()
        .take_while(|&&b| b == b'$')
        .count();
    dollars % 2 == 0
}

/// Last unescaped space strictly before `end`
fn last_unescaped_space(line: &str, end: usize) -> Option<usize> {
    let end = end.min(line.len());
    line.as_bytes()[..end]
        .iter()
        .enumerate()
        .rev()
        .find(|&(i, &b)| b == b' ' && is_unescaped(line, i))
        .map(|(i, _)| i)
}

/// First unescaped space at or after `start`
fn next_unescaped_space(line: &str, start: usize) -> Option<usize> {
    line.as_bytes()
        .iter()
        .enumerate()
        .skip(start)
        .find(|&(i, &b)| b == b' ' && is_unescaped(line, i))
        .map(|(i, _)| i)
}

/// Cut point for a hard break of at most `width` bytes.
///
/// Stays on a char boundary, never leaves a dangling `$` that would pair with
/// the continuation marker, and never starts the remainder with a space
/// (Ninja drops leading whitespace after a continuation).
fn hard_break(line: &str, width: usize) -> usize {
    let mut cut = width.min(line.len());
    loop {
        while cut > 0 && !line.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut == 0 {
            break;
        }
        let dangling = !is_unescaped(line, cut);
        let leading_space = line.as_bytes().get(cut) == Some(&b' ');
        if dangling || leading_space {
            cut -= 1;
        } else {
            break;
        }
    }
    if cut == 0 {
        // Always make progress: take one character, or a whole `$x` escape.
        let mut chars = line.char_indices();
        cut = match chars.next() {
            Some((_, '$')) => chars.nth(1).map_or(line.len(), |(i, _)| i),
            Some(_) => chars.next().map_or(line.len(), |(i, _)| i),
            None => 0,
        };
    }
    cut
}

/// Greedy word wrap; long words are split only when `break_long` is set
fn wrap_words(text: &str, width: usize, break_long: bool) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
            continue;
        }
        if current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if break_long && word_len > width {
            let chars: Vec<char> = word.chars().collect();
            let mut chunks = chars.chunks(width).peekable();
            while let Some(chunk) = chunks.next() {
                if chunks.peek().is_some() {
                    lines.push(chunk.iter().collect());
                } else {
                    current = chunk.iter().collect();
                    current_len = chunk.len();
                }
            }
        } else {
            current.push_str(word);
            current_len = word_len;
        }
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}
