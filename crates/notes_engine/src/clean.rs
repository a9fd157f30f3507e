//! Citation scrubbing and link normalization on a private copy of a subtree.
use std::sync::LazyLock;

use ego_tree::{NodeId, NodeRef};
use regex::Regex;
use scraper::node::{Element, Node};
use scraper::{ElementRef, Html, Selector};

use crate::text;

static BUTTONS: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("button").ok());
static ANCHORS: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("a").ok());
static TEXT_BLOCKS: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse("p, li, h1, h2, h3, h4, h5, h6").ok());
static SUPERSCRIPTS: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("sup").ok());

/// Text blocks matching any of these are citation scaffolding: a "Sources:"
/// heading, a full URL, or a bare `host/path.ext` reference.
static CITATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^sources?:?",
        r"(?i)\bhttps?://",
        r"(?i)\b[a-z0-9_.-]+/[a-z0-9_./-]+\.[a-z]{1,5}(?::\d+)?",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanOptions {
    pub scrub_citations: bool,
}

impl CleanOptions {
    pub const SCRUBBED: Self = Self {
        scrub_citations: true,
    };
    pub const RAW: Self = Self {
        scrub_citations: false,
    };
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self::SCRUBBED
    }
}

/// A deep copy of one element, optionally scrubbed of citations.
///
/// The live document is never touched. Anchors are rendered with
/// `target="_blank"` and `rel="noopener noreferrer"`.
pub struct CleanedFragment {
    doc: Html,
    root: NodeId,
}

impl CleanedFragment {
    pub fn new(element: ElementRef<'_>, options: CleanOptions) -> Self {
        let doc = Html::parse_fragment(&element.html());
        let root = doc
            .root_element()
            .children()
            .find_map(ElementRef::wrap)
            .map(|el| el.id())
            .unwrap_or_else(|| doc.root_element().id());
        let mut fragment = Self { doc, root };
        if options.scrub_citations {
            fragment.scrub_citations();
        }
        fragment
    }

    /// Rendered text of the copy, trimmed.
    pub fn inner_text(&self) -> String {
        self.root()
            .map(|root| text::inner_text(root).trim().to_string())
            .unwrap_or_default()
    }

    /// Serialized children of the copy.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root() {
            let raw = RAW_TEXT_ELEMENTS.contains(&root.value().name());
            for child in root.children() {
                write_node(&mut out, child, raw);
            }
        }
        out
    }

    fn root(&self) -> Option<ElementRef<'_>> {
        self.element(self.root)
    }

    fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.doc.tree.get(id).and_then(ElementRef::wrap)
    }

    fn select_ids(&self, selector: &Option<Selector>) -> Vec<NodeId> {
        match (self.root(), selector.as_ref()) {
            (Some(root), Some(selector)) => root.select(selector).map(|el| el.id()).collect(),
            _ => Vec::new(),
        }
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(mut node) = self.doc.tree.get_mut(id) {
            node.detach();
        }
    }

    // Passes run in order against the progressively pruned copy.
    fn scrub_citations(&mut self) {
        for id in self.select_ids(&BUTTONS) {
            self.detach(id);
        }

        for id in self.select_ids(&ANCHORS) {
            let target = match self.element(id) {
                Some(anchor) => self
                    .enclosing_block(anchor)
                    .filter(|block| trimmed_text(*block) == trimmed_text(anchor))
                    .map(|block| block.id())
                    .unwrap_or(id),
                None => continue,
            };
            self.detach(target);
        }

        for id in self.select_ids(&TEXT_BLOCKS) {
            let remove = self
                .element(id)
                .map(|block| is_citation_text(&trimmed_text(block)))
                .unwrap_or(false);
            if remove {
                self.detach(id);
            }
        }

        for id in self.select_ids(&SUPERSCRIPTS) {
            let numeric = self
                .element(id)
                .map(|sup| {
                    let text = trimmed_text(sup);
                    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
                })
                .unwrap_or(false);
            if numeric {
                self.detach(id);
            }
        }
    }

    /// Nearest `li` or `p` ancestor strictly inside the copied root.
    fn enclosing_block<'a>(&'a self, anchor: ElementRef<'a>) -> Option<ElementRef<'a>> {
        anchor
            .ancestors()
            .take_while(|node| node.id() != self.root)
            .filter_map(ElementRef::wrap)
            .find(|el| matches!(el.value().name(), "li" | "p"))
    }
}

/// Rendered text of `element` after optional scrubbing; empty for no element.
pub fn extract_clean_text(element: Option<ElementRef<'_>>, options: CleanOptions) -> String {
    element
        .map(|el| CleanedFragment::new(el, options).inner_text())
        .unwrap_or_default()
}

/// Whether a trimmed block text looks like a citation line.
pub fn is_citation_text(text: &str) -> bool {
    !text.is_empty() && CITATION_PATTERNS.iter().any(|re| re.is_match(text))
}

fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn write_node(out: &mut String, node: NodeRef<'_, Node>, raw_text: bool) {
    match node.value() {
        Node::Text(text) => {
            if raw_text {
                out.push_str(text);
            } else {
                escape_into(out, text, false);
            }
        }
        Node::Element(element) => write_element(out, node, element),
        _ => {}
    }
}

fn write_element(out: &mut String, node: NodeRef<'_, Node>, element: &Element) {
    let name = element.name();
    let is_anchor = name == "a";
    let mut has_target = false;
    let mut has_rel = false;

    out.push('<');
    out.push_str(name);
    for (attr, value) in element.attrs() {
        let value = match attr {
            "target" if is_anchor => {
                has_target = true;
                "_blank"
            }
            "rel" if is_anchor => {
                has_rel = true;
                "noopener noreferrer"
            }
            _ => value,
        };
        write_attr(out, attr, value);
    }
    if is_anchor && !has_target {
        write_attr(out, "target", "_blank");
    }
    if is_anchor && !has_rel {
        write_attr(out, "rel", "noopener noreferrer");
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }
    let raw = RAW_TEXT_ELEMENTS.contains(&name);
    for child in node.children() {
        write_node(out, child, raw);
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    escape_into(out, value, true);
    out.push('"');
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
