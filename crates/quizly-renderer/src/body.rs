//! Output body with scoped capture.

/// Ordered sequence of markup strings produced by a render pass.
///
/// Visitors that need the exact markup they emitted (for example to store it
/// elsewhere) open a [`Capture`] before rendering and close it afterwards:
///
/// ```
/// use quizly_renderer::Body;
///
/// let mut body = Body::new();
/// body.push("<p>before</p>");
///
/// let capture = body.begin_capture();
/// body.push("<div>");
/// body.push("</div>");
/// assert_eq!(body.end_capture(capture), "<div></div>");
///
/// assert_eq!(body.to_html(), "<p>before</p><div></div>");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Body {
    parts: Vec<String>,
}

/// Position in a [`Body`] where a capture started.
///
/// Captures nest: an inner capture's output is also part of every enclosing
/// capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a capture does nothing unless passed to `Body::end_capture`"]
pub struct Capture {
    start: usize,
}

impl Body {
    /// Create an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a markup string.
    pub fn push(&mut self, part: impl Into<String>) {
        self.parts.push(part.into());
    }

    /// Mark the current end of the body.
    pub fn begin_capture(&self) -> Capture {
        Capture {
            start: self.parts.len(),
        }
    }

    /// Concatenate everything pushed since `capture` was taken.
    ///
    /// The body itself is left untouched.
    #[must_use]
    pub fn end_capture(&self, capture: Capture) -> String {
        self.parts
            .get(capture.start..)
            .map(|parts| parts.concat())
            .unwrap_or_default()
    }

    /// Number of markup strings pushed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether nothing has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The markup strings in push order.
    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Concatenate the whole body.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.parts.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_capture() {
        let mut body = Body::new();
        body.push("a");
        let capture = body.begin_capture();
        assert_eq!(body.end_capture(capture), "");
    }

    #[test]
    fn test_capture_leaves_body_intact() {
        let mut body = Body::new();
        body.push("a");
        let capture = body.begin_capture();
        body.push("b");
        body.push("c");

        assert_eq!(body.end_capture(capture), "bc");
        assert_eq!(body.parts(), ["a", "b", "c"]);
        assert_eq!(body.len(), 3);
    }

    #[test]
    fn test_nested_captures() {
        let mut body = Body::new();
        let outer = body.begin_capture();
        body.push("<outer>");
        let inner = body.begin_capture();
        body.push("<inner/>");
        assert_eq!(body.end_capture(inner), "<inner/>");
        body.push("</outer>");
        assert_eq!(body.end_capture(outer), "<outer><inner/></outer>");
    }

    #[test]
    fn test_capture_is_repeatable() {
        let mut body = Body::new();
        let capture = body.begin_capture();
        body.push("x");
        assert_eq!(body.end_capture(capture), body.end_capture(capture));
    }

    #[test]
    fn test_to_html() {
        let mut body = Body::new();
        assert!(body.is_empty());
        body.push("<p>");
        body.push(String::from("text"));
        body.push("</p>");
        assert_eq!(body.to_html(), "<p>text</p>");
    }
}
