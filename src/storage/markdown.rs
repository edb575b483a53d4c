//! The indented markdown dialect.
//!
//! Each non-blank line becomes one node. Depth is encoded as a run of `&nbsp;`
//! entities, two per level:
//!
//! ```text
//! # Title
//!
//! &nbsp;&nbsp;**Section**
//!
//! &nbsp;&nbsp;&nbsp;&nbsp;1001 Req: A requirement
//!
//! &nbsp;&nbsp;&nbsp;&nbsp;1002 Comm: *A comment*
//!
//! &nbsp;&nbsp;1003 Dattr: Created: 2025-07-09 14:40<br>Modified: 2025-07-09 14:40
//! ```
//!
//! Classification never fails: anything unrecognised is kept verbatim as an
//! [`Kind::Unknown`] node.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
    sync::LazyLock,
};

use regex::Regex;

use crate::domain::{Document, ItemId, Kind, Node};

/// The indentation entity. Two of them make one indent level.
pub const INDENT_MARKER: &str = "&nbsp;";

/// Written between consecutive lines so the output stays readable as markdown.
const LINE_SEPARATOR: &str = "\n\n";

static SUBTITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*(.*)\*\*$").expect("static pattern is valid"));

static ROLE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+(Req|Comm|Dattr):(?:\s+(.*))?$").expect("static pattern is valid")
});

/// Classifies a single raw line.
///
/// Returns `None` for blank or whitespace-only lines, which never become
/// nodes.
#[must_use]
pub fn classify(line: &str) -> Option<Node> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(title) = line.strip_prefix('#') {
        return Some(Node::title(title.trim()));
    }

    let mut rest = line;
    let mut markers = 0;
    while let Some(stripped) = rest.strip_prefix(INDENT_MARKER) {
        markers += 1;
        rest = stripped;
    }
    let indent = markers / 2;
    let rest = rest.trim();

    if let Some(captures) = SUBTITLE.captures(rest) {
        return Some(Node::new(Kind::Subtitle, indent, None, captures[1].trim()));
    }

    if let Some(captures) = ROLE_LINE.captures(rest) {
        // an id too large for the numeric range falls through to unknown
        if let (Ok(id), Some(kind)) = (
            captures[1].parse::<ItemId>(),
            Kind::from_keyword(&captures[2]),
        ) {
            let description = captures.get(3).map_or("", |m| m.as_str());
            let text = if kind == Kind::Comment {
                strip_emphasis(description)
            } else {
                description
            };
            return Some(Node::new(kind, indent, Some(id), text));
        }
    }

    Some(Node::new(Kind::Unknown, indent, None, rest))
}

/// Removes one pair of wrapping asterisks from a comment description.
fn strip_emphasis(text: &str) -> &str {
    match text.strip_prefix('*').and_then(|t| t.strip_suffix('*')) {
        Some(inner) if text.len() > 1 => inner,
        _ => text,
    }
}

/// Parses markdown content into a document.
///
/// Empty input yields an empty document.
#[must_use]
pub fn parse(content: &str) -> Document {
    Document::from_nodes(content.lines().filter_map(classify).collect())
}

/// Renders a single node as one line of the dialect.
#[must_use]
pub fn format_line(node: &Node) -> String {
    if node.kind == Kind::Title {
        return format!("# {}", node.text);
    }

    let indent = INDENT_MARKER.repeat(node.indent * 2);
    let id = node.id.map(|id| id.to_string()).unwrap_or_default();

    match node.kind {
        Kind::Subtitle => format!("{indent}**{}**", node.text),
        Kind::Requirement => format!("{indent}{id} Req: {}", node.text),
        Kind::Comment => format!("{indent}{id} Comm: *{}*", node.text),
        Kind::Dattr => format!("{indent}{id} Dattr: {}", node.text),
        Kind::Title | Kind::Unknown => format!("{indent}{}", node.text),
    }
}

/// Serializes nodes to the dialect, one line per node with a blank line in
/// between.
#[must_use]
pub fn serialize(nodes: &[Node]) -> String {
    let mut output = nodes
        .iter()
        .map(format_line)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR);
    if !output.is_empty() {
        output.push('\n');
    }
    output
}

/// Reads a document from a buffered reader.
///
/// # Errors
///
/// Returns an error if reading fails or the input is not valid UTF-8.
pub fn read<R: BufRead>(reader: &mut R) -> Result<Document, LoadError> {
    let mut nodes = Vec::new();
    for line in reader.lines() {
        if let Some(node) = classify(&line?) {
            nodes.push(node);
        }
    }
    Ok(Document::from_nodes(nodes))
}

/// Writes a document to a writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write<W: Write>(document: &Document, writer: &mut W) -> io::Result<()> {
    writer.write_all(serialize(document.nodes()).as_bytes())?;
    writer.flush()
}

/// Loads a document from a markdown file.
///
/// # Errors
///
/// Returns [`LoadError::NotFound`] if the file does not exist, or
/// [`LoadError::Io`] for any other read failure.
pub fn load(path: &Path) -> Result<Document, LoadError> {
    let file = File::open(path).map_err(|io_error| match io_error.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound,
        _ => LoadError::Io(io_error),
    })?;

    let document = read(&mut BufReader::new(file))?;
    tracing::info!("Loaded {} lines from {}", document.len(), path.display());
    Ok(document)
}

/// Writes a document to a markdown file.
///
/// Parent directories are created automatically if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn save(document: &Document, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(document, &mut writer)?;

    tracing::info!("Saved {} lines to {}", document.len(), path.display());
    Ok(())
}

/// Errors that can occur when loading a document from markdown.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The markdown file was not found.
    #[error("markdown file not found")]
    NotFound,
    /// An I/O error occurred.
    #[error("failed to read from markdown")]
    Io(#[from] io::Error),
}
