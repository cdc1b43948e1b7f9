//! Structural queries over a fetched round page.
//!
//! Extraction only talks to [`RoundPage`] and [`PageNode`]; [`HtmlPage`] is the
//! `scraper` backed adapter. Queries never fail: a selector that matches
//! nothing, or does not parse, gives back an empty result.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

pub trait PageNode<'a>: Sized + Copy {
    fn find_first(&self, selector: &str) -> Option<Self>;
    fn find_all(&self, selector: &str) -> Vec<Self>;
    /// Concatenated descendant text, trimmed.
    fn text(&self) -> String;
    fn attr(&self, name: &str) -> Option<&'a str>;
}

pub trait RoundPage {
    type Node<'a>: PageNode<'a>
    where
        Self: 'a;

    fn find_first(&self, selector: &str) -> Option<Self::Node<'_>>;
    fn find_all(&self, selector: &str) -> Vec<Self::Node<'_>>;
    /// Every text node of the document, in document order.
    fn text_nodes(&self) -> Vec<&str>;

    /// `content` of `<meta name="description">`.
    fn meta_description(&self) -> Option<&str> {
        self.find_first(r#"meta[name="description"]"#)
            .and_then(|meta| meta.attr("content"))
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("ignoring unparsable selector {:?}: {}", selector, e);
            None
        }
    }
}

pub struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }
}

impl RoundPage for HtmlPage {
    type Node<'a> = ElementRef<'a>;

    fn find_first(&self, selector: &str) -> Option<ElementRef<'_>> {
        let selector = parse_selector(selector)?;
        self.document.select(&selector).next()
    }

    fn find_all(&self, selector: &str) -> Vec<ElementRef<'_>> {
        let Some(selector) = parse_selector(selector) else {
            return Vec::new();
        };
        self.document.select(&selector).collect()
    }

    fn text_nodes(&self) -> Vec<&str> {
        self.document.root_element().text().collect()
    }
}

impl<'a> PageNode<'a> for ElementRef<'a> {
    fn find_first(&self, selector: &str) -> Option<Self> {
        let selector = parse_selector(selector)?;
        self.select(&selector).next()
    }

    fn find_all(&self, selector: &str) -> Vec<Self> {
        let Some(selector) = parse_selector(selector) else {
            return Vec::new();
        };
        self.select(&selector).collect()
    }

    fn text(&self) -> String {
        ElementRef::text(self).collect::<String>().trim().to_string()
    }

    fn attr(&self, name: &str) -> Option<&'a str> {
        self.value().attr(name)
    }
}
