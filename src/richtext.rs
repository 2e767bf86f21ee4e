//! Inline styled text for report paragraphs.
//!
//! Report prose is written with a tiny markup (`**bold**`, `*italic*`) and
//! turned into [`Span`]s that map onto `genpdf` [`StyledString`]s. Values taken from the data set (theme names) go through
//! [`escape_markup`] first so they are always printed literally.

use std::fmt;

use genpdf::style::{Style, StyledString};

/// A run of text sharing one inline style.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    italic: bool,
}

impl Span {
    /// Plain, unstyled span.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// The span's text without markup.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the span is printed bold.
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Whether the span is printed italic.
    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Marks the span bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Marks the span italic.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Converts the span into a `genpdf` string, layering its flags over `base`.
    pub fn to_styled_string(&self, base: Style) -> StyledString {
        let mut style = base;
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        StyledString::new(self.text.clone(), style)
    }
}

/// Error returned by [`parse_markup`] for malformed input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkupError {
    index: usize,
    message: String,
}

impl MarkupError {
    fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }

    /// Byte offset of the problem in the input.
    pub fn index(&self) -> usize {
        self.index
    }

    /// What went wrong, without the position.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for MarkupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.index)
    }
}

impl std::error::Error for MarkupError {}

#[derive(Clone, Copy, Debug, Default)]
struct Inline {
    bold: bool,
    italic: bool,
}

impl Inline {
    fn span(self, text: String) -> Span {
        Span {
            text,
            bold: self.bold,
            italic: self.italic,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
    Bold,
    Italic,
}

impl Marker {
    fn closing(self) -> &'static str {
        match self {
            Marker::Bold => "**",
            Marker::Italic => "*",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Marker::Bold => "bold span",
            Marker::Italic => "italic span",
        }
    }
}

const SPECIAL: [char; 2] = ['\\', '*'];

/// Parses report markup into spans.
///
/// Supported: `**bold**`, `*italic*` and backslash escapes for `\` and `*`.
pub fn parse_markup(input: &str) -> Result<Vec<Span>, MarkupError> {
    let (spans, end) = parse_run(input, 0, Inline::default(), None)?;
    debug_assert_eq!(end, input.len());
    Ok(spans)
}

/// Escapes `text` so [`parse_markup`] yields it unchanged as a single plain span.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if SPECIAL.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn parse_run(
    input: &str,
    mut index: usize,
    inline: Inline,
    closing: Option<Marker>,
) -> Result<(Vec<Span>, usize), MarkupError> {
    let mut spans = Vec::new();
    let mut buffer = String::new();

    while let Some(ch) = input[index..].chars().next() {
        let rest = &input[index..];

        if ch == '\\' {
            match rest[1..].chars().next() {
                Some(next) if SPECIAL.contains(&next) => {
                    buffer.push(next);
                    index += 1 + next.len_utf8();
                    continue;
                }
                _ => return Err(MarkupError::new(index, "dangling escape")),
            }
        }

        if let Some(marker) = closing {
            if rest.starts_with(marker.closing()) {
                flush(&mut buffer, &mut spans, inline);
                return Ok((spans, index + marker.closing().len()));
            }
        }

        let opened = if rest.starts_with("**") {
            Some((Marker::Bold, index + 2, Inline { bold: true, ..inline }))
        } else if ch == '*' {
            Some((Marker::Italic, index + 1, Inline { italic: true, ..inline }))
        } else {
            None
        };

        if let Some((marker, start, nested)) = opened {
            flush(&mut buffer, &mut spans, inline);
            let (inner, end) = parse_run(input, start, nested, Some(marker))?;
            spans.extend(inner);
            index = end;
            continue;
        }

        buffer.push(ch);
        index += ch.len_utf8();
    }

    if let Some(marker) = closing {
        return Err(MarkupError::new(index, format!("unterminated {}", marker.name())));
    }
    flush(&mut buffer, &mut spans, inline);
    Ok((spans, index))
}

fn flush(buffer: &mut String, spans: &mut Vec<Span>, inline: Inline) {
    if !buffer.is_empty() {
        spans.push(inline.span(std::mem::take(buffer)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_one_span() {
        let spans = parse_markup("Sets released in 1999").unwrap();
        assert_eq!(spans, vec![Span::new("Sets released in 1999")]);
    }

    #[test]
    fn bold_value_inside_sentence() {
        let spans = parse_markup("Licensed share: **26%**.").unwrap();
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[1].text(), "26%");
        assert!(spans[1].is_bold());
        assert!(!spans[2].is_bold());
    }

    #[test]
    fn nested_italic_in_bold() {
        let spans = parse_markup("**big *and* small**").unwrap();
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[1], Span::new("and").bold().italic());
    }

    #[test]
    fn brackets_and_braces_are_plain_text() {
        let spans = parse_markup("Star Wars [UCS] {2007}").unwrap();
        assert_eq!(spans, vec![Span::new("Star Wars [UCS] {2007}")]);
        assert_eq!(escape_markup("[UCS] {2007}"), "[UCS] {2007}");
        let directive = parse_markup("[color=#294c60]{Town}").unwrap();
        assert_eq!(directive, vec![Span::new("[color=#294c60]{Town}")]);
    }

    #[test]
    fn escaped_names_round_trip_literally() {
        let name = r"Stars*Wars [Ultimate] \ {x}";
        let spans = parse_markup(&escape_markup(name)).unwrap();
        assert_eq!(spans, vec![Span::new(name)]);
    }

    #[test]
    fn errors_carry_positions() {
        assert!(parse_markup("**open").unwrap_err().message().contains("unterminated bold"));
        assert!(parse_markup("*open").unwrap_err().message().contains("unterminated italic"));
        assert_eq!(parse_markup("trailing \\").unwrap_err().index(), 9);
        assert_eq!(parse_markup(r"\x").unwrap_err().index(), 0);
    }
}
