//! Narrow query layer over `scraper`.
//!
//! Extraction code only needs three things from markup: find elements by CSS
//! selector (optionally inside an earlier match), read their text, and read
//! an attribute. Keeping the surface this small lets extractors run against
//! fixture documents without any network involved.

use crate::error::{CartFetchError, Result};
use scraper::{ElementRef, Html, Selector};

/// A parsed HTML document.
pub struct Page {
    html: Html,
}

/// Elements matched by a selector, in document order.
#[derive(Clone)]
pub struct Selection<'a> {
    nodes: Vec<ElementRef<'a>>,
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| CartFetchError::selector(format!("{}: {:?}", css, e)))
}

impl Page {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    pub fn find(&self, css: &str) -> Result<Selection<'_>> {
        let selector = parse_selector(css)?;
        Ok(Selection {
            nodes: self.html.select(&selector).collect(),
        })
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page").finish_non_exhaustive()
    }
}

impl<'a> Selection<'a> {
    /// Descendants of every matched element that match `css`. An element
    /// reachable from two matches is returned once.
    pub fn find(&self, css: &str) -> Result<Selection<'a>> {
        let selector = parse_selector(css)?;
        let mut nodes: Vec<ElementRef<'a>> = Vec::new();
        for node in &self.nodes {
            for found in node.select(&selector) {
                if !nodes.iter().any(|n| n.id() == found.id()) {
                    nodes.push(found);
                }
            }
        }
        Ok(Selection { nodes })
    }

    /// Text content of all matched elements, concatenated and trimmed.
    pub fn text(&self) -> String {
        self.nodes
            .iter()
            .flat_map(|node| node.text())
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Attribute of the first matched element.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.nodes.first().and_then(|node| node.value().attr(name))
    }

    /// Inner HTML of the first matched element.
    pub fn inner_html(&self) -> Option<String> {
        self.nodes.first().map(|node| node.inner_html())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Each matched element as its own single-element selection.
    pub fn iter(&self) -> impl Iterator<Item = Selection<'a>> + '_ {
        self.nodes.iter().map(|node| Selection { nodes: vec![*node] })
    }
}
