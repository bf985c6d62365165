//! String literal contents: interpolation splitting and escape decoding.
//!
//! Works on the raw text the lexer keeps between the quotes.

/// A run of a raw string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece<'a> {
    /// Literal text, still in raw (escaped) form.
    Text(&'a str),
    /// The code between `{` and `}`; `offset` is its char offset in the literal.
    Code { source: &'a str, offset: usize },
}

pub fn has_interpolation(raw: &str) -> bool {
    split(raw).iter().any(|piece| matches!(piece, Piece::Code { .. }))
}

/// Split a raw literal into text and `{code}` pieces. Empty text runs are
/// dropped; an unmatched `{` is kept as text.
pub fn split(raw: &str) -> Vec<Piece<'_>> {
    let chars: Vec<(usize, char)> = raw.char_indices().collect();
    let mut pieces = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < chars.len() {
        match chars[i].1 {
            '\\' => i += 2,
            '{' => {
                let Some(close) = matching_brace(&chars, i) else {
                    break;
                };
                let open_byte = chars[i].0;
                if text_start < open_byte {
                    pieces.push(Piece::Text(&raw[text_start..open_byte]));
                }
                let code_start = open_byte + 1;
                let code_end = chars[close].0;
                pieces.push(Piece::Code {
                    source: &raw[code_start..code_end],
                    offset: i + 1,
                });
                text_start = code_end + 1;
                i = close + 1;
            }
            _ => i += 1,
        }
    }
    if text_start < raw.len() {
        pieces.push(Piece::Text(&raw[text_start..]));
    }
    pieces
}

fn matching_brace(chars: &[(usize, char)], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut i = open;
    while i < chars.len() {
        let c = chars[i].1;
        match (quote, c) {
            (Some(_), '\\') => i += 1,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '{') => depth += 1,
            (None, '}') => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Decode `\n`, `\t`, `\\`, `\"`, `\'`, `\{` and `\}`. Unknown escapes are
/// kept as written.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(c @ ('\\' | '"' | '\'' | '{' | '}')) => out.push(c),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
