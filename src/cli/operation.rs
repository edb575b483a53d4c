//! Commands that act on an open document.
//!
//! The same subcommands are reachable from the command line (operating on
//! `--file`) and from the interactive shell.

use std::path::PathBuf;

use reqedit::{
    DeleteMode, DisplayMode, HtmlPage, ItemId, Kind, Placement, render::document_title,
    storage::project::format_timestamp,
};
use tracing::instrument;

use super::{
    display,
    session::Session,
    status::Status,
    terminal::{Colorize, paint_kind},
};

/// Number of search hits shown in full.
const MAX_FIND_RESULTS: usize = 5;

#[derive(Debug, clap::Subcommand)]
pub enum Operation {
    /// Display the document, optionally only a range of lines
    List {
        /// First line to show
        #[arg(default_value_t = 1)]
        start: usize,
        /// Last line to show
        end: Option<usize>,
    },

    /// Show one line with its parent and children
    #[command(alias = "goto")]
    Show {
        /// Line number
        line: usize,
    },

    /// Search the text of every line
    Find {
        /// Match case exactly
        #[arg(long, short)]
        case_sensitive: bool,
        /// Text to search for
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Find the line carrying an id
    #[command(alias = "findid")]
    FindId {
        /// The id to look for
        id: ItemId,
        /// Only match lines of this type
        #[arg(long, short)]
        kind: Option<Kind>,
    },

    /// Show document statistics
    Status(Status),

    /// Insert a new line before, after or under an existing one
    ///
    /// Types: TITLE (TIT), SUBTITLE (SUB), REQUIREMENT (REQ), COMMENT (COM),
    /// DATTR, UNKNOWN.
    Add {
        /// Where to insert relative to the target line
        placement: Placement,
        /// The target line
        target: usize,
        /// Type of the new line
        kind: Kind,
        /// Use this id instead of allocating one
        #[arg(long)]
        id: Option<ItemId>,
        /// Text of the new line
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Move a line and everything nested under it
    Move {
        /// The line to move
        source: usize,
        /// Where to put it relative to the target line
        placement: Placement,
        /// The target line
        target: usize,
    },

    /// Delete a line and everything nested under it
    Delete {
        /// The line to delete
        line: usize,
        /// Keep the nested lines, moving them up one level
        #[arg(long)]
        keep_children: bool,
    },

    /// Replace the text of a line
    Edit {
        /// The line to edit
        line: usize,
        /// The new text
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Change the type of a line
    Type {
        /// The line to change
        line: usize,
        /// The new type
        kind: Kind,
        /// Id to assign, for types that carry one
        id: Option<ItemId>,
    },

    /// Export the document as interactive HTML
    Export {
        /// Output file
        output: PathBuf,
    },

    /// Show the project configuration
    Project,

    /// Set or clear the stylesheet used for HTML export
    Style {
        #[command(subcommand)]
        action: StyleAction,
    },

    /// Show or set the display mode
    Mode {
        /// The new mode
        mode: Option<DisplayMode>,
    },
}

#[derive(Debug, clap::Subcommand)]
pub enum StyleAction {
    /// Use a custom CSS file
    Set {
        /// Path to the stylesheet
        path: PathBuf,
    },
    /// Go back to the built-in stylesheet
    Clear,
}

/// Whether an operation changed the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    Modified,
}

impl Operation {
    #[instrument(level = "debug", skip(session))]
    pub fn run(self, session: &mut Session) -> anyhow::Result<Outcome> {
        match self {
            Self::List { start, end } => {
                display::print_listing(session.document(), session.display_mode(), start, end);
            }
            Self::Show { line } => {
                let document = session.document();
                let view = document
                    .node(line)
                    .ok_or_else(|| anyhow::anyhow!("line {line} not found"))?;
                display::print_details(document, &view);
            }
            Self::Find {
                case_sensitive,
                text,
            } => find(session, &text.join(" "), case_sensitive),
            Self::FindId { id, kind } => find_id(session, id, kind),
            Self::Status(status) => status.run(session)?,
            Self::Add {
                placement,
                target,
                kind,
                id,
                text,
            } => {
                let position =
                    session
                        .document_mut()
                        .add(placement, target, kind, &text.join(" "), id)?;
                println!(
                    "{}",
                    format!("✅ Added {kind} at line {position}").success()
                );
                return Ok(modified(session));
            }
            Self::Move {
                source,
                placement,
                target,
            } => {
                let position = session.document_mut().move_node(source, placement, target)?;
                println!(
                    "{}",
                    format!("✅ Moved line {source} {placement} line {target} (now line {position})")
                        .success()
                );
                return Ok(modified(session));
            }
            Self::Delete {
                line,
                keep_children,
            } => {
                let mode = if keep_children {
                    DeleteMode::KeepChildren
                } else {
                    DeleteMode::Cascade
                };
                let removed = session.document_mut().delete(line, mode)?;
                println!(
                    "{}",
                    format!("✅ Deleted {} line(s) starting at line {line}", removed.len())
                        .success()
                );
                return Ok(modified(session));
            }
            Self::Edit { line, text } => {
                session.document_mut().edit_text(line, &text.join(" "))?;
                println!("{}", format!("✅ Updated line {line}").success());
                return Ok(modified(session));
            }
            Self::Type { line, kind, id } => {
                let id = session.document_mut().retype(line, kind, id)?;
                let id = id.map(|id| format!(" (id {id})")).unwrap_or_default();
                println!(
                    "{}",
                    format!("✅ Line {line} is now {kind}{id}").success()
                );
                return Ok(modified(session));
            }
            Self::Export { output } => export(session, &output)?,
            Self::Project => print_project(session),
            Self::Style { action } => match action {
                StyleAction::Set { path } => {
                    session.set_style_template(Some(path.clone()))?;
                    println!(
                        "{}",
                        format!("✅ Stylesheet set to {}", path.display()).success()
                    );
                }
                StyleAction::Clear => {
                    session.set_style_template(None)?;
                    println!("{}", "✅ Stylesheet cleared (using default)".success());
                }
            },
            Self::Mode { mode } => match mode {
                None => println!("Current mode: {}", session.display_mode()),
                Some(mode) => {
                    if session.set_display_mode(mode)? {
                        println!(
                            "{}",
                            format!("✅ Display mode set to {mode} and saved to project configuration")
                                .success()
                        );
                    } else {
                        println!("{}", format!("✅ Display mode set to {mode}").success());
                        println!("{}", "Save the document to persist this setting.".dim());
                    }
                }
            },
        }
        Ok(Outcome::Unchanged)
    }
}

const fn modified(session: &mut Session) -> Outcome {
    session.mark_modified();
    Outcome::Modified
}

fn find(session: &Session, pattern: &str, case_sensitive: bool) {
    let document = session.document();
    let results = document.find_by_text(pattern, case_sensitive);

    if results.is_empty() {
        println!("{}", format!("No matches found for '{pattern}'").warning());
        return;
    }

    let lines: Vec<String> = results.iter().map(ToString::to_string).collect();
    println!(
        "{}",
        format!("Found {} matches: lines {}", results.len(), lines.join(", ")).success()
    );

    let columns = super::terminal::width();
    for view in results
        .iter()
        .take(MAX_FIND_RESULTS)
        .filter_map(|&position| document.node(position))
    {
        println!(
            "  {}",
            display::format_line(&view, session.display_mode(), columns)
        );
    }
    if results.len() > MAX_FIND_RESULTS {
        println!(
            "{}",
            format!("  ... and {} more", results.len() - MAX_FIND_RESULTS).dim()
        );
    }
}

fn find_id(session: &Session, id: ItemId, kind: Option<Kind>) {
    let document = session.document();
    match document
        .find_by_id(id, kind)
        .and_then(|position| document.node(position))
    {
        Some(view) => {
            println!(
                "{}",
                format!("Found id {id} at line {}:", view.position).success()
            );
            println!(
                "  {}",
                display::format_line(&view, DisplayMode::Full, super::terminal::width())
            );
        }
        None => println!("{}", format!("Id {id} not found").warning()),
    }
}

fn export(session: &Session, output: &std::path::Path) -> anyhow::Result<()> {
    use anyhow::Context;

    let document = session.document();
    let fallback = session
        .path()
        .and_then(|path| path.file_stem())
        .map_or_else(
            || "Requirement Document".to_string(),
            |stem| stem.to_string_lossy().into_owned(),
        );
    let title = document_title(document).unwrap_or(&fallback);

    let stylesheet = session.stylesheet()?;
    let page = HtmlPage::new(document, title);
    let page = match &stylesheet {
        Some(css) => page.with_stylesheet(css),
        None => page,
    };

    std::fs::write(output, page.to_string())
        .with_context(|| format!("failed to write {}", output.display()))?;

    tracing::info!("Exported {} lines to {}", document.len(), output.display());
    println!(
        "{}",
        format!("✅ Exported to {}", output.display()).success()
    );
    Ok(())
}

fn print_project(session: &Session) {
    let Some(project) = session.project() else {
        println!(
            "{}",
            "No project configuration loaded. Save the document first.".warning()
        );
        return;
    };
    let config = &project.config;

    println!("{}", paint_kind(Kind::Title, "Project configuration"));
    println!("{}", "─────────────────────".dim());
    println!("Input file:      {}", config.input_file().display());
    println!("Created:         {}", format_timestamp(config.created()));
    println!("Last modified:   {}", format_timestamp(config.modified()));
    println!("App version:     {}", config.application_version());
    println!(
        "Style template:  {}",
        config
            .style_template()
            .map_or_else(|| "default".to_string(), |path| path.display().to_string())
    );
    println!("Display mode:    {}", config.display_mode());
    println!("Config file:     {}", project.path.display());
}
