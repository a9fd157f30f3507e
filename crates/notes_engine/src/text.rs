//! Plain-text rendering of an element subtree, close to what `innerText` yields
//! for the markup chat pages produce.
use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::ElementRef;

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "caption", "dd", "details", "dialog", "div",
    "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "header", "hgroup", "hr", "li", "main", "nav", "ol", "section", "summary",
    "table", "tbody", "tfoot", "thead", "tr", "ul",
];

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Renders the children of `root` as text. Whitespace runs collapse to one
/// space outside `<pre>`, blocks start on their own line and paragraphs are
/// separated by a blank line. The result is not trimmed.
pub(crate) fn inner_text(root: ElementRef<'_>) -> String {
    let mut ctx = TextContext::default();
    for child in root.children() {
        visit(child, &mut ctx);
    }
    ctx.finish()
}

enum Chunk {
    Inline(String),
    Verbatim(String),
    LineBreak,
    /// Required line break count between blocks; adjacent requirements merge.
    Gap(usize),
}

#[derive(Default)]
struct TextContext {
    chunks: Vec<Chunk>,
    preformatted: usize,
}

impl TextContext {
    fn push_text(&mut self, raw: &str) {
        if self.preformatted > 0 {
            self.chunks.push(Chunk::Verbatim(raw.to_string()));
            return;
        }
        let collapsed = collapse_whitespace(raw);
        if !collapsed.is_empty() {
            self.chunks.push(Chunk::Inline(collapsed));
        }
    }

    fn gap(&mut self, lines: usize) {
        self.chunks.push(Chunk::Gap(lines));
    }

    fn finish(self) -> String {
        let mut out = String::new();
        let mut pending = 0usize;
        for chunk in self.chunks {
            match chunk {
                Chunk::Gap(lines) => pending = pending.max(lines),
                Chunk::LineBreak => {
                    flush_gap(&mut out, &mut pending);
                    trim_trailing_spaces(&mut out);
                    out.push('\n');
                }
                Chunk::Verbatim(text) => {
                    flush_gap(&mut out, &mut pending);
                    out.push_str(&text);
                }
                Chunk::Inline(text) => {
                    flush_gap(&mut out, &mut pending);
                    let at_line_start = out.is_empty() || out.ends_with('\n');
                    let text = if at_line_start || out.ends_with(' ') {
                        text.trim_start_matches(' ')
                    } else {
                        text.as_str()
                    };
                    out.push_str(text);
                }
            }
        }
        out
    }
}

fn flush_gap(out: &mut String, pending: &mut usize) {
    if *pending == 0 {
        return;
    }
    if !out.is_empty() {
        trim_trailing_spaces(out);
        let existing = out.chars().rev().take_while(|c| *c == '\n').count();
        for _ in existing..*pending {
            out.push('\n');
        }
    }
    *pending = 0;
}

fn trim_trailing_spaces(out: &mut String) {
    let kept = out.trim_end_matches(' ').len();
    out.truncate(kept);
}

fn visit(node: NodeRef<'_, Node>, ctx: &mut TextContext) {
    match node.value() {
        Node::Text(text) => ctx.push_text(text),
        Node::Element(element) => {
            let tag = element.name();
            if HIDDEN_ELEMENTS.contains(&tag) {
                return;
            }
            match tag {
                "br" => ctx.chunks.push(Chunk::LineBreak),
                "p" => {
                    ctx.gap(2);
                    visit_children(node, ctx);
                    ctx.gap(2);
                }
                "pre" => {
                    ctx.gap(1);
                    ctx.preformatted += 1;
                    visit_children(node, ctx);
                    ctx.preformatted -= 1;
                    ctx.gap(1);
                }
                "td" | "th" => {
                    let follows_cell = node
                        .prev_siblings()
                        .filter_map(ElementRef::wrap)
                        .any(|sibling| matches!(sibling.value().name(), "td" | "th"));
                    if follows_cell {
                        ctx.chunks.push(Chunk::Verbatim("\t".to_string()));
                    }
                    visit_children(node, ctx);
                }
                _ if BLOCK_ELEMENTS.contains(&tag) => {
                    ctx.gap(1);
                    visit_children(node, ctx);
                    ctx.gap(1);
                }
                _ => visit_children(node, ctx),
            }
        }
        _ => {}
    }
}

fn visit_children(node: NodeRef<'_, Node>, ctx: &mut TextContext) {
    for child in node.children() {
        visit(child, ctx);
    }
}

/// Collapses every whitespace run (except non-breaking spaces) to one space.
fn collapse_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_space = false;
    for c in raw.chars() {
        if c.is_whitespace() && c != '\u{a0}' {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}
