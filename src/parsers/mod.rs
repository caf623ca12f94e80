pub mod html;


/// An `<a href>` found in a document, before resolution or filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    /// Visible text of the anchor, whitespace-normalized
    pub text: String,
}

/// Result of parsing an HTML document
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Contents of `<title>`, if any
    pub title: Option<String>,
    /// Body text, whitespace-normalized
    pub text: String,
    /// Anchors in document order
    pub anchors: Vec<Anchor>,
}
