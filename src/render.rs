//! Self-contained HTML export.
//!
//! The page nests every node inside a collapsible container belonging to its
//! parent, so sections can be folded in the browser. Text is escaped, except
//! that `<br>` markers inside data attributes become real line breaks.

use std::fmt;

use crate::domain::{Document, Kind, NodeView};

/// Stylesheet used when the project does not provide its own.
pub const DEFAULT_STYLESHEET: &str = include_str!("render/default.css");

const SCRIPT: &str = include_str!("render/script.js");

/// Deepest indent with its own CSS class; deeper nodes share it.
const MAX_INDENT_CLASS: usize = 10;

/// Page written for an empty document.
const EMPTY_PAGE: &str = "<html><body><h1>No content to display</h1></body></html>\n";

/// Marker the data attribute text uses for line breaks.
const LINE_BREAK: &str = "<br>";

/// An HTML rendering of a document.
///
/// Formatting the page with [`Display`](fmt::Display) produces the complete
/// HTML text.
#[derive(Debug, Clone, Copy)]
pub struct HtmlPage<'a> {
    document: &'a Document,
    title: &'a str,
    stylesheet: &'a str,
}

impl<'a> HtmlPage<'a> {
    /// Creates a page using the built-in stylesheet.
    #[must_use]
    pub const fn new(document: &'a Document, title: &'a str) -> Self {
        Self {
            document,
            title,
            stylesheet: DEFAULT_STYLESHEET,
        }
    }

    /// Replaces the built-in stylesheet.
    #[must_use]
    pub const fn with_stylesheet(mut self, stylesheet: &'a str) -> Self {
        self.stylesheet = stylesheet;
        self
    }
}

/// The text of the document's first title, if it has one.
#[must_use]
pub fn document_title(document: &Document) -> Option<&str> {
    document
        .iter()
        .find(|view| view.kind() == Kind::Title)
        .map(|view| view.node.text.as_str())
}

impl fmt::Display for HtmlPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.document.is_empty() {
            return f.write_str(EMPTY_PAGE);
        }

        writeln!(f, "<!DOCTYPE html>")?;
        writeln!(f, "<html lang=\"en\">")?;
        writeln!(f, "<head>")?;
        writeln!(f, "    <meta charset=\"UTF-8\">")?;
        writeln!(
            f,
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
        )?;
        writeln!(f, "    <title>{}</title>", html_escape::encode_text(self.title))?;
        writeln!(f, "    <style>\n{}\n    </style>", self.stylesheet)?;
        writeln!(f, "</head>")?;
        writeln!(f, "<body>")?;
        writeln!(f, "<div class=\"container\">")?;
        write_controls(f)?;
        self.write_nodes(f)?;
        writeln!(f, "</div>")?;
        writeln!(f, "<script>\n{SCRIPT}</script>")?;
        writeln!(f, "</body>")?;
        writeln!(f, "</html>")
    }
}

impl HtmlPage<'_> {
    /// Writes the nodes in document order, opening a container after each
    /// node with children and closing containers as the walk leaves their
    /// subtree.
    fn write_nodes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // (position, whether a container div was opened)
        let mut open: Vec<(usize, bool)> = Vec::new();

        for view in self.document.iter() {
            while let Some(&(position, wrapped)) = open.last() {
                if Some(position) == view.parent {
                    break;
                }
                open.pop();
                if wrapped {
                    writeln!(f, "</div>")?;
                }
            }

            write_node(f, &view)?;

            if !view.children.is_empty() {
                // titles keep their children unfolded
                let wrapped = view.kind() != Kind::Title;
                if wrapped {
                    writeln!(
                        f,
                        "<div class=\"collapsible-content expanded\" id=\"content-{}\">",
                        view.position
                    )?;
                }
                open.push((view.position, wrapped));
            }
        }

        for (_, wrapped) in open.into_iter().rev() {
            if wrapped {
                writeln!(f, "</div>")?;
            }
        }
        Ok(())
    }
}

fn write_controls(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "<div class=\"controls\">")?;
    writeln!(
        f,
        "    <button class=\"expand-btn\" onclick=\"expandAll()\">Expand All</button>"
    )?;
    writeln!(
        f,
        "    <button class=\"collapse-btn\" onclick=\"collapseAll()\">Collapse All</button>"
    )?;
    writeln!(
        f,
        "    <button class=\"toggle-btn\" id=\"toggle-line-numbers\" onclick=\"toggleLineNumbers()\">Hide Line Numbers</button>"
    )?;
    writeln!(
        f,
        "    <button class=\"print-btn\" onclick=\"printToPdf()\">Print as PDF</button>"
    )?;
    writeln!(f, "</div>")
}

fn write_node(f: &mut fmt::Formatter<'_>, view: &NodeView<'_>) -> fmt::Result {
    let kind = view.kind();
    let class = match kind {
        Kind::Title => "title",
        Kind::Subtitle => "subtitle",
        Kind::Requirement => "requirement",
        Kind::Comment => "comment",
        Kind::Dattr => "dattr",
        Kind::Unknown => "unknown",
    };
    let indent = view.indent().min(MAX_INDENT_CLASS);

    write!(f, "<div class=\"{class} indent-{indent}")?;
    if kind != Kind::Title && !view.children.is_empty() {
        write!(f, " collapsible\" onclick=\"toggleCollapse(this)")?;
    }
    write!(f, "\" data-line=\"{}\">", view.position)?;

    write!(f, "<span class=\"line-number\">[{}]</span>", view.position)?;
    if let (Some(id), Some(keyword)) = (view.id(), kind.keyword()) {
        write!(f, "<span class=\"req-id\">{id} {keyword}:</span>")?;
    }

    if kind == Kind::Dattr {
        for (index, part) in view.text().split(LINE_BREAK).enumerate() {
            if index > 0 {
                f.write_str(LINE_BREAK)?;
            }
            f.write_str(&html_escape::encode_safe(part))?;
        }
    } else {
        f.write_str(&html_escape::encode_safe(view.text()))?;
    }

    writeln!(f, "</div>")
}
