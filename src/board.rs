//! The rendered document of one page: named containers holding elements.
//!
//! A render pass replaces a container's elements wholesale. The search filter
//! only flips [`Element`] visibility, so elements keep their position and
//! identity across filter changes.

use std::fmt::Write as _;

use crate::render::esc;

/// How a container wraps its elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// `<table>` with a header row; elements are `<tr>` rows.
    Table { headers: Vec<&'static str> },
    /// `<div>` holding block elements (cards, character blocks).
    Block,
    /// A single inline value.
    Label,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: &'static str,
    class: String,
    search: Option<String>,
    inner: String,
    visible: bool,
}

impl Element {
    /// `inner` is markup and must already be escaped.
    pub fn new(tag: &'static str, inner: impl Into<String>) -> Self {
        Self {
            tag,
            class: String::new(),
            search: None,
            inner: inner.into(),
            visible: true,
        }
    }

    pub fn row(inner: impl Into<String>) -> Self {
        Self::new("tr", inner)
    }

    pub fn block(inner: impl Into<String>) -> Self {
        Self::new("div", inner)
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    /// Attaches the searchable string, lower-cased here once.
    pub fn searchable(mut self, text: &str) -> Self {
        self.search = Some(text.to_lowercase());
        self
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn inner(&self) -> &str {
        &self.inner
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        if !self.class.is_empty() {
            let _ = write!(out, r#" class="{}""#, esc(&self.class));
        }
        if let Some(search) = &self.search {
            let _ = write!(out, r#" data-search="{}""#, esc(search));
        }
        if !self.visible {
            out.push_str(r#" style="display: none""#);
        }
        let _ = write!(out, ">{}</{}>", self.inner, self.tag);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    id: &'static str,
    layout: Layout,
    elements: Vec<Element>,
}

impl Container {
    pub fn new(id: &'static str, layout: Layout) -> Self {
        Self {
            id,
            layout,
            elements: Vec::new(),
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut [Element] {
        &mut self.elements
    }

    pub fn replace(&mut self, elements: Vec<Element>) {
        self.elements = elements;
    }

    fn write_html(&self, out: &mut String) {
        match &self.layout {
            Layout::Table { headers } => {
                let _ = write!(out, r#"<table id="{}"><thead><tr>"#, self.id);
                for header in headers {
                    let _ = write!(out, "<th>{}</th>", esc(header));
                }
                out.push_str("</tr></thead><tbody>");
                self.write_elements(out);
                out.push_str("</tbody></table>");
            }
            Layout::Block => {
                let _ = write!(out, r#"<div id="{}">"#, self.id);
                self.write_elements(out);
                out.push_str("</div>");
            }
            Layout::Label => {
                let _ = write!(out, r#"<span id="{}">"#, self.id);
                for element in &self.elements {
                    out.push_str(&element.inner);
                }
                out.push_str("</span>");
            }
        }
    }

    fn write_elements(&self, out: &mut String) {
        for element in &self.elements {
            element.write_html(out);
        }
    }
}

/// All containers of one page, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    containers: Vec<Container>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: &'static str, layout: Layout) -> Self {
        self.containers.push(Container::new(id, layout));
        self
    }

    pub fn container(&self, id: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.id == id)
    }

    pub fn container_mut(&mut self, id: &str) -> Option<&mut Container> {
        self.containers.iter_mut().find(|c| c.id == id)
    }

    /// Replaces the contents of `id`, declaring it as a block when the page
    /// layout did not.
    pub fn replace(&mut self, id: &'static str, elements: Vec<Element>) {
        match self.container_mut(id) {
            Some(container) => container.replace(elements),
            None => {
                tracing::debug!(container = id, "container not declared, adding as block");
                let mut container = Container::new(id, Layout::Block);
                container.replace(elements);
                self.containers.push(container);
            }
        }
    }

    /// Sets a single escaped text value.
    pub fn set_label(&mut self, id: &'static str, text: &str) {
        self.replace(id, vec![Element::new("span", esc(text).to_string())]);
    }

    #[cfg(test)]
    pub fn label(&self, id: &str) -> Option<&str> {
        self.container(id)
            .and_then(|c| c.elements.first())
            .map(Element::inner)
    }

    /// Shows an inline error in place of the container's content.
    pub fn show_error(&mut self, id: &'static str, message: &str) {
        self.replace(
            id,
            vec![Element::new("p", esc(message).to_string()).with_class("error")],
        );
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for container in &self.containers {
            container.write_html(&mut out);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Board {
        Board::new()
            .with("games", Layout::Table { headers: vec!["Name", "Players"] })
            .with("count", Layout::Label)
    }

    #[test]
    fn table_html_wraps_rows() {
        let mut board = sample();
        board.replace(
            "games",
            vec![Element::row("<td>Baal</td><td>3</td>").searchable("Baal Run")],
        );
        board.set_label("count", "1");
        assert_eq!(
            board.to_html(),
            "<table id=\"games\"><thead><tr><th>Name</th><th>Players</th></tr></thead>\
             <tbody><tr data-search=\"baal run\"><td>Baal</td><td>3</td></tr></tbody></table>\n\
             <span id=\"count\">1</span>\n"
        );
    }

    #[test]
    fn hidden_elements_stay_in_output() {
        let mut board = sample();
        board.replace("games", vec![Element::row("<td>x</td>")]);
        board.container_mut("games").unwrap().elements_mut()[0].set_visible(false);
        assert!(board.to_html().contains(r#"<tr style="display: none"><td>x</td></tr>"#));
    }

    #[test]
    fn labels_are_escaped() {
        let mut board = sample();
        board.set_label("count", "<3");
        assert_eq!(board.label("count"), Some("&lt;3"));
    }

    #[test]
    fn undeclared_container_is_added_as_block() {
        let mut board = sample();
        board.show_error("status", "Error: Could not load data from <x>");
        let html = board.to_html();
        assert!(html.contains(
            r#"<div id="status"><p class="error">Error: Could not load data from &lt;x&gt;</p></div>"#
        ));
    }
}
