//! String-backed page model.
//!
//! A [`Document`] keeps the page as HTML text and edits it in place. Elements
//! are addressed with a [`Selector`] (id, class or tag name), always resolving
//! to the first match in document order, so markup injected by one routine
//! is immediately addressable by the next.

use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is text up to their own end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Elements whose end tag may be left out; the next sibling of the same
/// type closes them.
const OPTIONAL_END_ELEMENTS: &[&str] = &["p", "li", "option", "dt", "dd", "tr", "td", "th"];

/// Block elements that close an open `<p>`.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "div", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "nav", "ol", "p", "section", "table", "ul",
];

/// How an element is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<'a> {
    /// `#id`
    Id(&'a str),
    /// `.class`
    Class(&'a str),
    /// `tag`
    Tag(&'a str),
}

impl fmt::Display for Selector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Class(class) => write!(f, ".{class}"),
            Self::Tag(tag) => write!(f, "{tag}"),
        }
    }
}

/// Escape text for inclusion in HTML content or a quoted attribute.
#[must_use]
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Reverse [`html_escape`] plus the apostrophe and non-breaking space.
fn html_unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

fn open_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^<([a-zA-Z][a-zA-Z0-9-]*)((?:\s+[^\s=>/"']+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>"']+))?)*)\s*(/?)>"#,
        )
        .expect("Invalid open tag regex")
    })
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([^\s=>/"']+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+)))?"#)
            .expect("Invalid attribute regex")
    })
}

fn markup_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid markup regex"))
}

/// An element located in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    tag: String,
    attrs: Vec<(String, Option<String>)>,
    open: Range<usize>,
    /// Content between the tags; `None` for void or self-closing elements.
    inner: Option<Range<usize>>,
    self_closing: bool,
}

impl Node {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    fn matches(&self, selector: Selector<'_>) -> bool {
        match selector {
            Selector::Id(id) => self.attr("id") == Some(id),
            Selector::Class(class) => self
                .attr("class")
                .is_some_and(|c| c.split_whitespace().any(|c| c == class)),
            Selector::Tag(tag) => self.tag.eq_ignore_ascii_case(tag),
        }
    }

    fn render_open(&self) -> String {
        let mut out = format!("<{}", self.tag);
        for (name, value) in &self.attrs {
            match value {
                Some(v) => out.push_str(&format!(" {name}=\"{v}\"")),
                None => out.push_str(&format!(" {name}")),
            }
        }
        out.push_str(if self.self_closing { " />" } else { ">" });
        out
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        let escaped = html_escape(value);
        match self
            .attrs
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = Some(escaped),
            None => self.attrs.push((name.to_string(), Some(escaped))),
        }
    }
}

fn parse_attrs(raw: &str) -> Vec<(String, Option<String>)> {
    attribute_regex()
        .captures_iter(raw)
        .map(|caps| {
            // Stored values are always safe inside double quotes.
            let value = caps
                .get(2)
                .map(|m| m.as_str().to_string())
                .or_else(|| caps.get(3).map(|m| m.as_str().replace('"', "&quot;")))
                .or_else(|| caps.get(4).map(|m| m.as_str().to_string()));
            (caps[1].to_string(), value)
        })
        .collect()
}

/// Parse a `style` attribute into ordered declarations.
fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim();
            (!prop.is_empty()).then(|| (prop.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

fn render_style(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(p, v)| format!("{p}: {v};"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Index every element of `html` in one pass. Comments and declarations are
/// skipped, raw-text bodies are not searched for tags, and elements left open
/// are closed by their parent's end tag or run to the end of the document.
fn scan(html: &str) -> Vec<Node> {
    let bytes = html.as_bytes();
    let mut nodes: Vec<Node> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut pos = 0;

    while let Some(offset) = html[pos..].find('<') {
        let at = pos + offset;
        let rest = &html[at..];

        if rest.starts_with("<!--") {
            pos = rest[4..].find("-->").map_or(html.len(), |end| at + 4 + end + 3);
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            pos = rest.find('>').map_or(html.len(), |end| at + end + 1);
            continue;
        }
        if let Some(name) = rest.strip_prefix("</") {
            let len = name
                .bytes()
                .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-')
                .count();
            let tag = name[..len].to_ascii_lowercase();
            if let Some(depth) = open.iter().rposition(|&i| nodes[i].tag == tag) {
                for i in open.drain(depth..) {
                    close(&mut nodes[i], at);
                }
            }
            pos = rest.find('>').map_or(html.len(), |end| at + end + 1);
            continue;
        }

        let Some(caps) = open_tag_regex().captures(rest) else {
            pos = at + 1;
            continue;
        };
        let end = at + caps[0].len();
        let tag = caps[1].to_ascii_lowercase();
        let self_closing = !caps[3].is_empty();

        if let Some(&top) = open.last() {
            let implied = (nodes[top].tag == tag && OPTIONAL_END_ELEMENTS.contains(&tag.as_str()))
                || (nodes[top].tag == "p" && CLOSES_PARAGRAPH.contains(&tag.as_str()));
            if implied {
                open.pop();
                close(&mut nodes[top], at);
            }
        }

        let has_content = !self_closing && !VOID_ELEMENTS.contains(&tag.as_str());
        let raw_text = has_content && RAW_TEXT_ELEMENTS.contains(&tag.as_str());
        let inner = has_content.then_some(end..html.len());
        nodes.push(Node {
            attrs: parse_attrs(caps.get(2).map_or("", |m| m.as_str())),
            tag,
            open: at..end,
            inner,
            self_closing,
        });

        pos = end;
        if raw_text {
            let index = nodes.len() - 1;
            let close_at = find_end_tag(bytes, end, &nodes[index].tag);
            close(&mut nodes[index], close_at);
            pos = html[close_at..].find('>').map_or(html.len(), |gt| close_at + gt + 1);
        } else if has_content {
            open.push(nodes.len() - 1);
        }
    }
    nodes
}

fn close(node: &mut Node, at: usize) {
    if let Some(inner) = node.inner.as_mut() {
        inner.end = at;
    }
}

/// Start of the first `</tag` at or after `from`, or the end of the input.
fn find_end_tag(bytes: &[u8], from: usize, tag: &str) -> usize {
    let mut pos = from;
    while pos + 2 + tag.len() <= bytes.len() {
        if bytes[pos] == b'<'
            && bytes[pos + 1] == b'/'
            && bytes[pos + 2..pos + 2 + tag.len()].eq_ignore_ascii_case(tag.as_bytes())
        {
            return pos;
        }
        pos += 1;
    }
    bytes.len()
}

/// The page being assembled.
#[derive(Debug, Clone, Default)]
pub struct Document {
    html: String,
    /// Elements of `html`, built on first lookup and dropped on every edit.
    index: OnceLock<Vec<Node>>,
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.html == other.html
    }
}

impl Eq for Document {}

impl Document {
    /// Wrap existing page markup.
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            index: OnceLock::new(),
        }
    }

    /// The current markup.
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Consume the document, returning its markup.
    #[must_use]
    pub fn into_html(self) -> String {
        self.html
    }

    /// Every element in document order.
    fn nodes(&self) -> &[Node] {
        self.index.get_or_init(|| scan(&self.html))
    }

    fn edit(&mut self, range: Range<usize>, replacement: &str) {
        self.html.replace_range(range, replacement);
        self.index = OnceLock::new();
    }

    fn find(&self, selector: Selector<'_>) -> Option<&Node> {
        self.nodes().iter().find(|n| n.matches(selector))
    }

    fn find_within(&self, container: Selector<'_>, target: Selector<'_>) -> Option<&Node> {
        let nodes = self.nodes();
        let scope = nodes.iter().find(|n| n.matches(container))?.inner.clone()?;
        nodes
            .iter()
            .find(|n| n.open.start >= scope.start && n.open.end <= scope.end && n.matches(target))
    }

    fn rewrite_open(&mut self, node: &Node) {
        self.edit(node.open.clone(), &node.render_open());
    }

    /// Check whether any element matches.
    #[must_use]
    pub fn contains(&self, selector: Selector<'_>) -> bool {
        self.find(selector).is_some()
    }

    /// Number of matching elements.
    #[must_use]
    pub fn count(&self, selector: Selector<'_>) -> usize {
        self.nodes().iter().filter(|n| n.matches(selector)).count()
    }

    /// Markup between the element's tags.
    #[must_use]
    pub fn inner_html(&self, selector: Selector<'_>) -> Option<&str> {
        let inner = self.find(selector)?.inner.clone()?;
        Some(&self.html[inner])
    }

    /// Replace the element's content. Returns `false` if nothing matched.
    pub fn set_inner_html(&mut self, selector: Selector<'_>, html: &str) -> bool {
        match self.find(selector).and_then(|n| n.inner.clone()) {
            Some(inner) => {
                self.edit(inner, html);
                true
            }
            None => false,
        }
    }

    /// Text content with markup removed.
    #[must_use]
    pub fn text(&self, selector: Selector<'_>) -> Option<String> {
        let inner = self.inner_html(selector)?;
        Some(html_unescape(&markup_regex().replace_all(inner, "")))
    }

    /// Replace the element's content with escaped text.
    pub fn set_text(&mut self, selector: Selector<'_>, text: &str) -> bool {
        self.set_inner_html(selector, &html_escape(text))
    }

    /// Attribute value, unescaped. Bare attributes read as `""`.
    #[must_use]
    pub fn attribute(&self, selector: Selector<'_>, name: &str) -> Option<String> {
        self.find(selector)?.attr(name).map(html_unescape)
    }

    /// Set or add an attribute.
    pub fn set_attribute(&mut self, selector: Selector<'_>, name: &str, value: &str) -> bool {
        let Some(mut node) = self.find(selector).cloned() else {
            return false;
        };
        node.set_attr(name, value);
        self.rewrite_open(&node);
        true
    }

    /// Remove an attribute. Returns `false` if the element was not found.
    pub fn remove_attribute(&mut self, selector: Selector<'_>, name: &str) -> bool {
        let Some(mut node) = self.find(selector).cloned() else {
            return false;
        };
        node.attrs.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.rewrite_open(&node);
        true
    }

    /// Check the element's class list.
    #[must_use]
    pub fn has_class(&self, selector: Selector<'_>, class: &str) -> bool {
        self.find(selector)
            .and_then(|n| n.attr("class").map(str::to_string))
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    /// Add a class if absent.
    pub fn add_class(&mut self, selector: Selector<'_>, class: &str) -> bool {
        let Some(mut node) = self.find(selector).cloned() else {
            return false;
        };
        let mut classes: Vec<String> = node
            .attr("class")
            .unwrap_or("")
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
            node.set_attr("class", &classes.join(" "));
            self.rewrite_open(&node);
        }
        true
    }

    /// Remove a class if present.
    pub fn remove_class(&mut self, selector: Selector<'_>, class: &str) -> bool {
        let Some(mut node) = self.find(selector).cloned() else {
            return false;
        };
        let current = node.attr("class").unwrap_or("").to_string();
        let kept: Vec<&str> = current.split_whitespace().filter(|c| *c != class).collect();
        if kept.len() != current.split_whitespace().count() {
            node.set_attr("class", &kept.join(" "));
            self.rewrite_open(&node);
        }
        true
    }

    /// Inline style property value.
    #[must_use]
    pub fn style(&self, selector: Selector<'_>, property: &str) -> Option<String> {
        let node = self.find(selector)?;
        parse_style(&html_unescape(node.attr("style")?))
            .into_iter()
            .find(|(p, _)| p.eq_ignore_ascii_case(property))
            .map(|(_, v)| v)
    }

    /// Set an inline style property.
    pub fn set_style(&mut self, selector: Selector<'_>, property: &str, value: &str) -> bool {
        match self.find(selector).cloned() {
            Some(node) => {
                self.apply_style(node, property, value);
                true
            }
            None => false,
        }
    }

    /// Set an inline style property on the first `target` inside `container`.
    pub fn set_style_within(
        &mut self,
        container: Selector<'_>,
        target: Selector<'_>,
        property: &str,
        value: &str,
    ) -> bool {
        match self.find_within(container, target).cloned() {
            Some(node) => {
                self.apply_style(node, property, value);
                true
            }
            None => false,
        }
    }

    fn apply_style(&mut self, mut node: Node, property: &str, value: &str) {
        let mut decls = parse_style(&html_unescape(node.attr("style").unwrap_or("")));
        let property = property.to_ascii_lowercase();
        match decls.iter_mut().find(|(p, _)| *p == property) {
            Some((_, v)) => *v = value.to_string(),
            None => decls.push((property, value.to_string())),
        }
        node.set_attr("style", &render_style(&decls));
        self.rewrite_open(&node);
    }
}
