//! Line-oriented rendering of documents for the terminal.

use reqedit::{DisplayMode, Document, NodeView};

use super::terminal::{Colorize, paint_kind, width};

/// Narrowest text column compact mode will shrink to.
const MIN_TEXT_WIDTH: usize = 10;

/// Short upper-case tag shown for each kind, e.g. `[REQU]`.
fn kind_tag(view: &NodeView<'_>) -> String {
    let name = view.kind().as_str();
    format!("[{}]", &name[..name.len().min(4)])
}

/// Shortens `text` to at most `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

/// Formats one node as a listing line.
///
/// Compact mode truncates the text so that the line fits `columns`; full
/// mode shows the whole text and the number of children.
pub fn format_line(view: &NodeView<'_>, mode: DisplayMode, columns: usize) -> String {
    let indent = "  ".repeat(view.indent());
    let tag = kind_tag(view);
    let id = view.id().map(|id| format!(" {id}")).unwrap_or_default();

    let prefix_width = 5 + indent.len() + tag.len() + id.len() + 1;
    let text = match mode {
        DisplayMode::Compact => {
            truncate(view.text(), columns.saturating_sub(prefix_width).max(MIN_TEXT_WIDTH))
        }
        DisplayMode::Full => view.text().to_string(),
    };

    let mut line = format!(
        "{}│ {indent}{} {text}",
        format!("{:>4}", view.position).dim(),
        paint_kind(view.kind(), &format!("{tag}{id}")),
    );

    if mode == DisplayMode::Full && !view.children.is_empty() {
        line.push_str(&format!(" [+{}]", view.children.len()).info());
    }
    line
}

/// Prints the lines from `start` to `end` (inclusive, clamped to the
/// document).
pub fn print_listing(document: &Document, mode: DisplayMode, start: usize, end: Option<usize>) {
    if document.is_empty() {
        println!("{}", "Document is empty.".info());
        return;
    }

    let end = end.unwrap_or(document.len()).min(document.len());
    let columns = width();

    for view in document
        .iter()
        .filter(|view| (start..=end).contains(&view.position))
    {
        println!("{}", format_line(&view, mode, columns));
    }

    println!();
    println!(
        "{}",
        format!("Displaying lines {start}-{end} of {}", document.len()).dim()
    );
}

/// Prints one node with its parent and children.
pub fn print_details(document: &Document, view: &NodeView<'_>) {
    println!("{}", format_line(view, DisplayMode::Full, width()));

    if let Some(parent) = view.parent.and_then(|parent| document.node(parent)) {
        println!(
            "  {}",
            format!(
                "Parent: line {} - {}",
                parent.position,
                truncate(parent.text(), 30)
            )
            .info()
        );
    }

    if !view.children.is_empty() {
        let children: Vec<String> = view.children.iter().map(ToString::to_string).collect();
        println!(
            "  {}",
            format!("Children: lines {}", children.join(", ")).info()
        );
    }
}
