use super::parsers::{
    is_block_comment_end, is_block_comment_start, is_line_comment_start, quoted_end,
    try_start_dollar_quote,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SegmentKind {
    Code,
    Quoted,
    LineComment,
    BlockComment,
}

impl SegmentKind {
    pub(super) fn is_comment(self) -> bool {
        matches!(self, SegmentKind::LineComment | SegmentKind::BlockComment)
    }
}

/// A byte range of the input with uniform lexical meaning.
///
/// Boundaries always fall on ASCII bytes, so slicing the source at them is safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Segment {
    pub kind: SegmentKind,
    pub start: usize,
    pub end: usize,
}

/// Split `sql` into code, quoted (string, identifier, dollar-quoted) and comment segments.
///
/// Unterminated quotes and comments run to the end of the input. The newline that ends a
/// line comment belongs to the following code segment.
pub(super) fn segments(sql: &str) -> Vec<Segment> {
    let bytes = sql.as_bytes();
    let mut out = Vec::new();
    let mut code_start = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        let special = match bytes[idx] {
            b'\'' => Some((SegmentKind::Quoted, quoted_end(bytes, idx, b'\''))),
            b'"' => Some((SegmentKind::Quoted, quoted_end(bytes, idx, b'"'))),
            b'$' => try_start_dollar_quote(bytes, idx)
                .map(|(tag, tag_end)| (SegmentKind::Quoted, dollar_end(sql, tag_end, &tag))),
            _ if is_line_comment_start(bytes, idx) => {
                let end = bytes[idx..]
                    .iter()
                    .position(|b| *b == b'\n')
                    .map_or(bytes.len(), |p| idx + p);
                Some((SegmentKind::LineComment, end))
            }
            _ if is_block_comment_start(bytes, idx) => {
                Some((SegmentKind::BlockComment, block_comment_end(bytes, idx)))
            }
            _ => None,
        };

        match special {
            Some((kind, end)) => {
                if code_start < idx {
                    out.push(Segment {
                        kind: SegmentKind::Code,
                        start: code_start,
                        end: idx,
                    });
                }
                out.push(Segment {
                    kind,
                    start: idx,
                    end,
                });
                idx = end;
                code_start = end;
            }
            None => idx += 1,
        }
    }

    if code_start < bytes.len() {
        out.push(Segment {
            kind: SegmentKind::Code,
            start: code_start,
            end: bytes.len(),
        });
    }
    out
}

fn block_comment_end(bytes: &[u8], start: usize) -> usize {
    let mut depth = 1u32;
    let mut idx = start + 2;
    while idx < bytes.len() {
        if is_block_comment_start(bytes, idx) {
            depth += 1;
            idx += 2;
        } else if is_block_comment_end(bytes, idx) {
            depth -= 1;
            idx += 2;
            if depth == 0 {
                return idx;
            }
        } else {
            idx += 1;
        }
    }
    bytes.len()
}

fn dollar_end(sql: &str, tag_end: usize, tag: &str) -> usize {
    let closing = format!("${tag}$");
    sql[tag_end + 1..]
        .find(&closing)
        .map_or(sql.len(), |pos| tag_end + 1 + pos + closing.len())
}

pub(super) fn scan_digits(bytes: &[u8], start: usize) -> Option<(usize, &str)> {
    let mut idx = start;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    if idx == start {
        None
    } else {
        std::str::from_utf8(&bytes[start..idx])
            .ok()
            .map(|digits| (idx, digits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(sql: &str) -> Vec<(SegmentKind, &str)> {
        segments(sql)
            .into_iter()
            .map(|s| (s.kind, &sql[s.start..s.end]))
            .collect()
    }

    #[test]
    fn classifies_segments() {
        let sql = "select 'a;b', \"c\" -- x\n/* y /* z */ */ $q$ ; $q$ end";
        assert_eq!(
            kinds(sql),
            vec![
                (SegmentKind::Code, "select "),
                (SegmentKind::Quoted, "'a;b'"),
                (SegmentKind::Code, ", "),
                (SegmentKind::Quoted, "\"c\""),
                (SegmentKind::Code, " "),
                (SegmentKind::LineComment, "-- x"),
                (SegmentKind::Code, "\n"),
                (SegmentKind::BlockComment, "/* y /* z */ */"),
                (SegmentKind::Code, " "),
                (SegmentKind::Quoted, "$q$ ; $q$"),
                (SegmentKind::Code, " end"),
            ]
        );
    }

    #[test]
    fn escaped_quotes_stay_inside() {
        assert_eq!(
            kinds("'it''s' x"),
            vec![(SegmentKind::Quoted, "'it''s'"), (SegmentKind::Code, " x")]
        );
    }

    #[test]
    fn unterminated_runs_to_end() {
        assert_eq!(kinds("a 'open"), vec![
            (SegmentKind::Code, "a "),
            (SegmentKind::Quoted, "'open")
        ]);
    }

    #[test]
    fn positional_dollar_is_code() {
        assert_eq!(kinds("a = $1"), vec![(SegmentKind::Code, "a = $1")]);
    }
}
