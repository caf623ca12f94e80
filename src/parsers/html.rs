use crate::parsers::{Anchor, ParsedPage};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selectors are valid")
}

/// Parses an HTML document into its title, body text and anchors
pub fn parse(html: &str) -> ParsedPage {
    let doc = Html::parse_document(html);

    let title = doc
        .select(&TITLE)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty());

    let text = doc
        .select(&BODY)
        .map(element_text)
        .collect::<Vec<_>>()
        .join(" ");

    let anchors = doc
        .select(&ANCHOR)
        .filter_map(|e| {
            e.value().attr("href").map(|href| Anchor {
                href: href.trim().to_string(),
                text: element_text(e),
            })
        })
        .filter(|a| !a.href.is_empty())
        .collect::<Vec<_>>();

    ::log::debug!("HTML parser found {} anchors", anchors.len());

    ParsedPage {
        title,
        text,
        anchors,
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
