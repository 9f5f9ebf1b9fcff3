//! Thin DOM-query facade over the `scraper` crate
//!
//! Extraction code goes through [`DomDocument`] and [`DomNode`] only, so the
//! parsing engine stays swappable behind this one module. The interface is
//! deliberately small: select-all, attribute, descendant text, and own text.

use scraper::{ElementRef, Html, Selector};

/// A parsed HTML document
pub struct DomDocument {
    html: Html,
}

impl DomDocument {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// All elements matching a CSS selector, in document order.
    ///
    /// Selectors are program constants; an invalid one is a programming error.
    pub fn select_all(&self, selector: &str) -> Vec<DomNode<'_>> {
        let selector = parse_selector(selector);
        self.html
            .select(&selector)
            .map(|el| DomNode { el })
            .collect()
    }
}

/// A single element within a [`DomDocument`]
#[derive(Clone, Copy)]
pub struct DomNode<'a> {
    el: ElementRef<'a>,
}

impl<'a> DomNode<'a> {
    pub fn select_all(&self, selector: &str) -> Vec<DomNode<'a>> {
        let selector = parse_selector(selector);
        self.el.select(&selector).map(|el| DomNode { el }).collect()
    }

    pub fn select_first(&self, selector: &str) -> Option<DomNode<'a>> {
        let selector = parse_selector(selector);
        self.el.select(&selector).next().map(|el| DomNode { el })
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.el.value().attr(name)
    }

    /// Concatenated descendant text, trimmed
    pub fn text(&self) -> String {
        self.el.text().collect::<String>().trim().to_string()
    }

    /// Direct text children only, trimmed; nested element markup is skipped.
    ///
    /// Guards team-name extraction against badge or score sub-elements being
    /// folded into the label.
    pub fn own_text(&self) -> String {
        let mut out = String::new();
        for child in self.el.children() {
            if let Some(text) = child.value().as_text() {
                out.push_str(&text.text);
            }
        }
        out.trim().to_string()
    }
}

fn parse_selector(selector: &str) -> Selector {
    Selector::parse(selector).expect("CSS selector constants must be valid")
}
