use std::fmt::Display;

/// A byte offset into the source text
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BytePos(usize);

impl BytePos {
    pub fn new(pos: usize) -> Self {
        BytePos(pos)
    }

    pub fn shift(self, ch: char) -> Self {
        BytePos(self.0 + ch.len_utf8())
    }

    pub fn offset(self) -> usize {
        self.0
    }
}

impl Display for BytePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A half-open byte range `start..end` of the source text
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    start: BytePos,
    end: BytePos,
}

impl Span {
    pub fn new(start: BytePos, end: BytePos) -> Span {
        Span { start, end }
    }

    /// Convert the span to the "(at 4..7)" format
    pub fn at_str(&self) -> String {
        format!("(at {})", self)
    }

    /// Render a marker line pointing at this span, meant to be printed under
    /// the (single line) source it was taken from.
    ///
    /// Empty spans (such as the one of the end of input) still get one caret.
    pub fn underline(&self, source: &str) -> String {
        let start = self.start.offset().min(source.len());
        let end = self.end.offset().min(source.len()).max(start);

        let padding = source
            .get(..start)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(start);
        let width = source
            .get(start..end)
            .map(|text| text.chars().count())
            .unwrap_or(0)
            .max(1);

        format!("{}{}", " ".repeat(padding), "^".repeat(width))
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithSpan<T> {
    pub value: T,
    pub span: Span,
}

impl<T> WithSpan<T> {
    pub fn new(value: T, span: Span) -> WithSpan<T> {
        WithSpan { value, span }
    }
}
