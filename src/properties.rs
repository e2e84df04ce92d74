//! Line-oriented `key=value` text, the classic `.properties` layout.
//!
//! Reading accepts `=`, `:` or whitespace as separator, `#`/`!` comments,
//! blank lines, backslash continuations and `\uXXXX` escapes. Writing emits
//! one sorted `key=value` per line and escapes whatever would not read back
//! verbatim, so any string (newlines included) round-trips.
use crate::prelude::*;

/// Parse the whole text into a mapping. Later duplicates win.
pub fn parse(text: &str) -> IResult<Properties> {
    let mut props = Properties::new();
    let mut lines = Lines::new(text);

    while let Some((line_no, logical)) = lines.next_logical() {
        let (key, value) = split(&logical);
        let key = unescape(key, line_no)?;
        let value = unescape(value, line_no)?;
        props.insert(key, value);
    }

    Ok(props)
}

/// Render a mapping, one entry per line, keys in order.
pub fn render(props: &Properties) -> String {
    let mut out = String::new();
    for (key, value) in props {
        escape_into(&mut out, key, true);
        out.push('=');
        escape_into(&mut out, value, false);
        out.push('\n');
    }
    out
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\x0c'
}

/// Natural lines joined into logical ones, comments and blanks dropped.
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self { inner: text.lines().enumerate() }
    }

    /// Next logical line with the 1-based number it starts on.
    fn next_logical(&mut self) -> Option<(usize, String)> {
        loop {
            let (idx, raw) = self.inner.next()?;
            let line = strip_cr(raw).trim_start_matches(is_blank);

            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue
            }

            let mut logical = String::new();
            let mut current = line;
            while continues(current) {
                logical.push_str(&current[..current.len() - 1]);
                match self.inner.next() {
                    Some((_, next)) => current = strip_cr(next).trim_start_matches(is_blank),
                    None => {
                        current = "";
                        break
                    }
                }
            }
            logical.push_str(current);

            return Some((idx + 1, logical))
        }
    }
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// An odd run of trailing backslashes means the line goes on.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line into its raw (still escaped) key and value.
fn split(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    let mut has_sep = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                has_sep = true;
                break
            }
            c if is_blank(c) => {
                key_end = i;
                break
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = &line[key_end..];
    if has_sep {
        rest = &rest[1..];
    } else {
        rest = rest.trim_start_matches(is_blank);
        if let Some(stripped) = rest.strip_prefix(|c: char| c == '=' || c == ':') {
            rest = stripped;
        }
    }

    (key, rest.trim_start_matches(is_blank))
}

fn unescape(raw: &str, line: usize) -> IResult<String> {
    if !raw.contains('\\') {
        return Ok(raw.to_owned())
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let mut units = vec![hex4(&mut chars, line)?];
                // a high surrogate may be followed by its `\uXXXX` low half
                if (0xD800..0xDC00).contains(&units[0]) {
                    let mut ahead = chars.clone();
                    if ahead.next() == Some('\\') && ahead.next() == Some('u') {
                        let low = hex4(&mut ahead, line)?;
                        if (0xDC00..0xE000).contains(&low) {
                            units.push(low);
                            chars = ahead;
                        }
                    }
                }
                // unpaired halves cannot stand alone in a String
                out.extend(
                    std::char::decode_utf16(units)
                        .map(|c| c.unwrap_or(std::char::REPLACEMENT_CHARACTER)),
                );
            }
            Some(other) => out.push(other),
            // a dangling backslash is dropped
            None => {}
        }
    }

    Ok(out)
}

fn hex4(chars: &mut std::str::Chars<'_>, line: usize) -> IResult<u16> {
    let mut unit = 0u16;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|h| h.to_digit(16))
            .ok_or(Error::Malformed { line, reason: "bad \\uXXXX escape" })?;
        unit = unit * 16 + digit as u16;
    }
    Ok(unit)
}

fn escape_into(out: &mut String, raw: &str, is_key: bool) {
    for (i, c) in raw.chars().enumerate() {
        match c {
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
}
