use std::borrow::Cow;

mod parsers;
mod scanner;

use parsers::is_separator_line;
use scanner::{Segment, SegmentKind, scan_digits, segments};

/// Target placeholder style for translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// PostgreSQL-style placeholders like `$1`.
    Postgres,
    /// SQLite-style placeholders like `?1`.
    Sqlite,
}

/// Translate placeholders between Postgres-style `$N` and SQLite-style `?N`.
///
/// Quoted strings, identifiers, comments, and dollar-quoted blocks are left untouched.
/// Returns a borrowed `Cow` when no changes are needed.
/// ```rust
/// use sql_gateway::translation::{PlaceholderStyle, translate_placeholders};
///
/// let sql = translate_placeholders("select * from t where a = ?1", PlaceholderStyle::Postgres);
/// assert_eq!(sql, "select * from t where a = $1");
/// ```
#[must_use]
pub fn translate_placeholders(sql: &str, target: PlaceholderStyle) -> Cow<'_, str> {
    let (from, to) = match target {
        PlaceholderStyle::Postgres => (b'?', '$'),
        PlaceholderStyle::Sqlite => (b'$', '?'),
    };

    let bytes = sql.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0;

    for segment in segments(sql) {
        if segment.kind != SegmentKind::Code {
            continue;
        }
        let mut idx = segment.start;
        while idx < segment.end {
            if bytes[idx] == from
                && let Some((digits_end, digits)) = scan_digits(&bytes[..segment.end], idx + 1)
            {
                let buf = out.get_or_insert_with(|| String::with_capacity(sql.len()));
                buf.push_str(&sql[copied..idx]);
                buf.push(to);
                buf.push_str(digits);
                copied = digits_end;
                idx = digits_end;
            } else {
                idx += 1;
            }
        }
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    }
}

/// How [`split_statements`] breaks a block of SQL text apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    /// When false the whole text is a single statement.
    pub split: bool,
    /// Drop `--` and `/* */` comments from the output.
    pub strip_comments: bool,
    /// Custom end delimiter. `None` splits on `;` and on standalone `GO` or `/` lines.
    pub delimiter: Option<String>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            split: true,
            strip_comments: false,
            delimiter: None,
        }
    }
}

/// Split SQL text into individual statements.
///
/// Delimiters inside quotes and comments are ignored. Pieces are trimmed and empty pieces
/// are dropped; the delimiter itself is not part of any piece.
/// ```rust
/// use sql_gateway::translation::{SplitOptions, split_statements};
///
/// let parts = split_statements("insert into t values ('a;b');\nGO\nselect 1", &SplitOptions::default());
/// assert_eq!(parts, vec!["insert into t values ('a;b')", "select 1"]);
/// ```
#[must_use]
pub fn split_statements(sql: &str, options: &SplitOptions) -> Vec<String> {
    let mut splitter = Splitter::default();

    for segment in segments(sql) {
        let text = &sql[segment.start..segment.end];
        match segment.kind {
            kind if kind.is_comment() && options.strip_comments => {
                // keep tokens on either side of a block comment apart
                if kind == SegmentKind::BlockComment {
                    splitter.current.push(' ');
                }
            }
            SegmentKind::Code if options.split => match &options.delimiter {
                Some(delimiter) if !delimiter.is_empty() => {
                    splitter.split_on_custom(text, delimiter);
                }
                _ => splitter.split_on_defaults(sql, &segment),
            },
            _ => splitter.current.push_str(text),
        }
    }

    splitter.flush();
    splitter.pieces
}

#[derive(Default)]
struct Splitter {
    current: String,
    pieces: Vec<String>,
}

impl Splitter {
    fn flush(&mut self) {
        let piece = self.current.trim();
        if !piece.is_empty() {
            self.pieces.push(piece.to_string());
        }
        self.current.clear();
    }

    fn split_on_custom(&mut self, text: &str, delimiter: &str) {
        let mut parts = text.split(delimiter).peekable();
        while let Some(part) = parts.next() {
            self.current.push_str(part);
            if parts.peek().is_some() {
                self.flush();
            }
        }
    }

    fn split_on_defaults(&mut self, sql: &str, segment: &Segment) {
        let bytes = sql.as_bytes();
        let mut line_start = segment.start;
        while line_start < segment.end {
            let line_end = sql[line_start..segment.end]
                .find('\n')
                .map_or(segment.end, |p| line_start + p);
            let line = &sql[line_start..line_end];

            // a separator line must span a whole physical line of the source
            let starts_line = line_start == 0 || bytes[line_start - 1] == b'\n';
            let ends_line = line_end == sql.len() || bytes[line_end] == b'\n';
            if starts_line && ends_line && is_separator_line(line) {
                self.flush();
            } else {
                for piece in SemicolonParts::new(line) {
                    match piece {
                        Part::Text(t) => self.current.push_str(t),
                        Part::Delimiter => self.flush(),
                    }
                }
            }

            if line_end < segment.end {
                self.current.push('\n');
            }
            line_start = line_end + 1;
        }
    }
}

enum Part<'a> {
    Text(&'a str),
    Delimiter,
}

struct SemicolonParts<'a> {
    rest: Option<&'a str>,
    pending_delimiter: bool,
}

impl<'a> SemicolonParts<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            rest: Some(line),
            pending_delimiter: false,
        }
    }
}

impl<'a> Iterator for SemicolonParts<'a> {
    type Item = Part<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending_delimiter {
            self.pending_delimiter = false;
            return Some(Part::Delimiter);
        }
        let rest = self.rest.take()?;
        match rest.split_once(';') {
            Some((head, tail)) => {
                self.rest = Some(tail);
                self.pending_delimiter = true;
                Some(Part::Text(head))
            }
            None => Some(Part::Text(rest)),
        }
    }
}
