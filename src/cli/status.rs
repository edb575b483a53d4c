use std::collections::BTreeMap;

use clap::Parser;
use reqedit::Kind;
use tracing::instrument;

use super::{
    session::Session,
    terminal::{Colorize, is_narrow, paint_kind},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show line counts per type and the document state")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Status {
    #[instrument(level = "debug", skip(self, session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let counts = session.document().count_by_kind();
        let total: usize = counts.values().sum();
        let file = session
            .path()
            .map_or_else(|| "Untitled".to_string(), |path| path.display().to_string());

        match self.output {
            OutputFormat::Json => Self::output_json(&counts, total, &file, session.is_modified())?,
            OutputFormat::Table => {
                if self.quiet {
                    Self::output_quiet(&counts, total);
                } else {
                    Self::output_table(&counts, total, &file, session.is_modified());
                }
            }
        }

        Ok(())
    }

    fn output_json(
        counts: &BTreeMap<Kind, usize>,
        total: usize,
        file: &str,
        modified: bool,
    ) -> anyhow::Result<()> {
        use serde_json::json;

        let kinds: Vec<_> = counts
            .iter()
            .map(|(kind, count)| {
                json!({
                    "kind": kind,
                    "count": count,
                })
            })
            .collect();

        let output = json!({
            "file": file,
            "modified": modified,
            "kinds": kinds,
            "total": total,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_quiet(counts: &BTreeMap<Kind, usize>, total: usize) {
        let per_kind: Vec<String> = counts
            .iter()
            .map(|(kind, count)| format!("{}={count}", kind.as_str().to_lowercase()))
            .collect();
        println!("total={total} {}", per_kind.join(" "));
    }

    fn output_table(counts: &BTreeMap<Kind, usize>, total: usize, file: &str, modified: bool) {
        println!("File:     {file}");
        if modified {
            println!("Modified: {}", "yes".warning());
        } else {
            println!("Modified: {}", "no".success());
        }
        println!();

        println!("Line counts");
        println!("{}", "───────────".dim());

        if is_narrow() {
            for (kind, count) in counts {
                println!("{}: {count}", paint_kind(*kind, kind.as_str()));
            }
            println!("Total: {total}");
        } else {
            println!("{:<12} Count", "Type");
            for (kind, count) in counts {
                println!("{} {count}", paint_kind(*kind, &format!("{:<12}", kind.as_str())));
            }
            println!("{:<12} {total}", "Total");
        }
    }
}
