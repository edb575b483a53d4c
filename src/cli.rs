use std::path::{Path, PathBuf};

mod display;
mod operation;
mod session;
mod shell;
mod status;
mod terminal;

use anyhow::Context;
use clap::ArgAction;
use operation::{Operation, Outcome};
use reqedit::domain::DEFAULT_TITLE;
use session::Session;
use shell::Shell;
use terminal::Colorize;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The markdown requirement document to work on
    #[arg(short, long, default_value = "requirements.md", global = true)]
    file: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or(Command::Operation(Operation::List {
                start: 1,
                end: None,
            }))
            .run(&self.file)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Create a new requirement document (and its project file)
    New(New),

    /// Edit the document interactively
    Shell,

    #[command(flatten)]
    Operation(Operation),
}

impl Command {
    fn run(self, file: &Path) -> anyhow::Result<()> {
        match self {
            Self::New(command) => command.run(file)?,
            Self::Shell => Shell::start(file)?.run()?,
            Self::Operation(operation) => {
                let mut session = Session::open(file)?;
                if operation.run(&mut session)? == Outcome::Modified {
                    session.save()?;
                    tracing::info!("Saved changes to {}", file.display());
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct New {
    /// Title of the new document
    #[arg(long, short)]
    title: Option<String>,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

impl New {
    #[instrument]
    fn run(self, file: &Path) -> anyhow::Result<()> {
        if file.exists() && !self.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                file.display()
            );
        }

        let title = self.title.as_deref().unwrap_or(DEFAULT_TITLE);
        let mut session = Session::new_document(Some(file.to_path_buf()), title);
        session
            .save()
            .with_context(|| format!("failed to create {}", file.display()))?;

        println!(
            "{}",
            format!("✅ Created '{title}' in {}", file.display()).success()
        );
        Ok(())
    }
}
