//! Output styling contract
//!
//! The core only decides *which* parts of a text are highlighted; how that
//! looks on the wire (escape sequences, markup, nothing at all) belongs to
//! the [`OutputAdapter`] stored in the session.

use std::fmt;

/// One run of text with a single style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub highlighted: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlighted: false,
        }
    }

    pub fn highlighted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlighted: true,
        }
    }
}

/// Text made of plain and highlighted spans
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledText {
    spans: Vec<Span>,
}

impl StyledText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole text unstyled
    pub fn plain(text: impl Into<String>) -> Self {
        let mut styled = Self::new();
        styled.push(Span::plain(text));
        styled
    }

    /// Split `text` so that every occurrence of `term` becomes a highlighted span
    ///
    /// Occurrences are found left to right without overlap; an empty term
    /// leaves the text untouched.
    pub fn highlight(text: &str, term: &str) -> Self {
        if term.is_empty() {
            return Self::plain(text);
        }

        let mut styled = Self::new();
        let mut rest = text;
        while let Some(pos) = rest.find(term) {
            styled.push(Span::plain(&rest[..pos]));
            styled.push(Span::highlighted(term));
            rest = &rest[pos + term.len()..];
        }
        styled.push(Span::plain(rest));
        styled
    }

    /// Append a span, merging consecutive plain spans
    ///
    /// Highlighted spans are never merged: each occurrence keeps its own span.
    pub fn push(&mut self, span: Span) {
        if span.text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if !last.highlighted && !span.highlighted => last.text.push_str(&span.text),
            _ => self.spans.push(span),
        }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Number of highlighted spans
    pub fn highlight_count(&self) -> usize {
        self.spans.iter().filter(|s| s.highlighted).count()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

impl fmt::Display for StyledText {
    /// Unstyled text
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for span in &self.spans {
            f.write_str(&span.text)?;
        }
        Ok(())
    }
}

/// Renders styled text for a concrete terminal or channel
pub trait OutputAdapter: Send + Sync {
    /// Adapter name (debugging)
    fn name(&self) -> &str;

    /// Render styled text into the string that is written to the session
    fn render(&self, text: &StyledText) -> String;
}

/// Adapter that drops all styling
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainAdapter;

impl OutputAdapter for PlainAdapter {
    fn name(&self) -> &str {
        "plain"
    }

    fn render(&self, text: &StyledText) -> String {
        text.to_string()
    }
}

/// Adapter that wraps highlighted spans in fixed markers
///
/// Useful for transports without escape sequence support (and for tests).
#[derive(Debug, Clone)]
pub struct MarkerAdapter {
    open: String,
    close: String,
}

impl MarkerAdapter {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

impl Default for MarkerAdapter {
    fn default() -> Self {
        Self::new("[", "]")
    }
}

impl OutputAdapter for MarkerAdapter {
    fn name(&self) -> &str {
        "marker"
    }

    fn render(&self, text: &StyledText) -> String {
        let mut out = String::new();
        for span in text.spans() {
            if span.highlighted {
                out.push_str(&self.open);
                out.push_str(&span.text);
                out.push_str(&self.close);
            } else {
                out.push_str(&span.text);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_every_occurrence() {
        let styled = StyledText::highlight("exit: exit the shell (exit)", "exit");
        assert_eq!(styled.highlight_count(), 3);
        assert_eq!(styled.to_string(), "exit: exit the shell (exit)");

        let rendered = MarkerAdapter::new("<", ">").render(&styled);
        assert_eq!(rendered, "<exit>: <exit> the shell (<exit>)");
    }

    #[test]
    fn test_highlight_missing_term() {
        let styled = StyledText::highlight("nothing here", "exit");
        assert_eq!(styled.highlight_count(), 0);
        assert_eq!(styled.spans(), &[Span::plain("nothing here")]);
    }

    #[test]
    fn test_highlight_adjacent_occurrences() {
        let styled = StyledText::highlight("aaaa", "aa");
        assert_eq!(styled.highlight_count(), 2);
        assert_eq!(MarkerAdapter::default().render(&styled), "[aa][aa]");

        let styled = StyledText::highlight("exitexit", "exit");
        assert_eq!(MarkerAdapter::default().render(&styled), "[exit][exit]");
    }

    #[test]
    fn test_empty_term_is_plain() {
        let styled = StyledText::highlight("text", "");
        assert_eq!(PlainAdapter.render(&styled), "text");
        assert_eq!(styled.highlight_count(), 0);
    }
}
