//! The interactive editing loop.

use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use reqedit::domain::DEFAULT_TITLE;
use tracing::instrument;

use super::{
    display,
    operation::{Operation, Outcome},
    session::Session,
    terminal::Colorize,
};

const PROMPT: &str = "reqedit> ";

/// One line typed into the shell.
#[derive(Debug, Parser)]
#[command(
    no_binary_name = true,
    disable_version_flag = true,
    help_template = "{subcommands}"
)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, clap::Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    Operation(Operation),

    /// Start a new document
    New,

    /// Load a markdown file
    Load {
        /// File to load
        file: PathBuf,
    },

    /// Save the current document
    Save,

    /// Save under a new file name
    #[command(name = "saveas")]
    SaveAs {
        /// File to save to
        file: PathBuf,
    },

    /// Leave the editor
    #[command(alias = "exit")]
    Quit,
}

/// Whether the loop should keep going after a command.
enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    session: Session,
}

impl Shell {
    /// Opens `file` if it exists, otherwise starts a new document that will be
    /// saved there.
    pub fn start(file: &Path) -> anyhow::Result<Self> {
        let session = if file.exists() {
            Session::open(file)?
        } else {
            println!(
                "{}",
                format!("{} does not exist yet, starting a new document.", file.display()).info()
            );
            Session::new_document(Some(file.to_path_buf()), DEFAULT_TITLE)
        };
        Ok(Self { session })
    }

    #[instrument(level = "debug", skip(self))]
    pub fn run(mut self) -> anyhow::Result<()> {
        println!("{}", "Requirement editor. Type 'help' for commands, 'quit' to exit.".info());
        self.list();

        let stdin = io::stdin();
        let mut input = String::new();

        loop {
            print!("{PROMPT}");
            io::stdout().flush()?;

            input.clear();
            if stdin.lock().read_line(&mut input)? == 0 {
                println!();
                break;
            }

            let words: Vec<&str> = input.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }

            let command = match ShellLine::try_parse_from(words) {
                Ok(line) => line.command,
                Err(error) => {
                    // help output also arrives here
                    let _ = error.print();
                    continue;
                }
            };

            match self.execute(command) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(error) => println!("{}", format!("❌ {error:#}").error()),
            }
        }

        println!("{}", "Goodbye!".info());
        Ok(())
    }

    fn execute(&mut self, command: ShellCommand) -> anyhow::Result<Flow> {
        match command {
            ShellCommand::Operation(operation) => {
                if operation.run(&mut self.session)? == Outcome::Modified {
                    self.list();
                }
            }
            ShellCommand::New => {
                if self.confirm_discard()? {
                    self.session = Session::new_document(None, DEFAULT_TITLE);
                    println!("{}", "✅ New document created.".success());
                    self.list();
                }
            }
            ShellCommand::Load { file } => {
                if self.confirm_discard()? {
                    self.session = Session::open(&file)?;
                    println!(
                        "{}",
                        format!(
                            "✅ Loaded {} lines from {}",
                            self.session.document().len(),
                            file.display()
                        )
                        .success()
                    );
                    self.list();
                }
            }
            ShellCommand::Save => {
                let path = self.session.save()?;
                println!("{}", format!("✅ Saved to {}", path.display()).success());
            }
            ShellCommand::SaveAs { file } => {
                let file = with_markdown_extension(file);
                self.session.save_as(&file)?;
                println!("{}", format!("✅ Saved to {}", file.display()).success());
            }
            ShellCommand::Quit => {
                if self.confirm_discard()? {
                    return Ok(Flow::Quit);
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// Asks before throwing away unsaved changes.
    fn confirm_discard(&self) -> anyhow::Result<bool> {
        if !self.session.is_modified() {
            return Ok(true);
        }
        dialoguer::Confirm::new()
            .with_prompt("Document has unsaved changes. Discard them?")
            .default(false)
            .interact()
            .context("failed to read confirmation")
    }

    fn list(&self) {
        display::print_listing(
            self.session.document(),
            self.session.display_mode(),
            1,
            None,
        );
    }
}

/// Appends `.md` to file names given without an extension.
fn with_markdown_extension(file: PathBuf) -> PathBuf {
    if file.extension().is_some() {
        file
    } else {
        file.with_extension("md")
    }
}
