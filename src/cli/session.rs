//! An open document together with its file and project state.

use std::path::{Path, PathBuf};

use anyhow::Context;
use reqedit::{
    DisplayMode, Document, LoadError, ProjectConfig, ProjectError,
    storage::{markdown, project},
};

/// The editing state shared by one-shot commands and the shell.
#[derive(Debug)]
pub struct Session {
    document: Document,
    path: Option<PathBuf>,
    project: Option<Project>,
    display_mode: DisplayMode,
    modified: bool,
}

/// A loaded project file and where it lives.
#[derive(Debug)]
pub struct Project {
    pub path: PathBuf,
    pub config: ProjectConfig,
}

impl Session {
    /// A fresh document from the new-document template, not yet saved.
    pub fn new_document(path: Option<PathBuf>, title: &str) -> Self {
        let timestamp = project::format_timestamp(project::now());
        Self {
            document: Document::with_template(title, &timestamp),
            path,
            project: None,
            display_mode: DisplayMode::default(),
            modified: true,
        }
    }

    /// Loads a markdown file and, if present, its project file.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let document = markdown::load(path).map_err(|error| match error {
            LoadError::NotFound => anyhow::anyhow!(
                "{} not found. Create it with 'reqedit new'.",
                path.display()
            ),
            LoadError::Io(_) => {
                anyhow::Error::new(error).context(format!("failed to load {}", path.display()))
            }
        })?;

        let project = load_project(path)?;
        let display_mode = project
            .as_ref()
            .map_or_else(DisplayMode::default, |project| project.config.display_mode());

        Ok(Self {
            document,
            path: Some(path.to_path_buf()),
            project,
            display_mode,
            modified: false,
        })
    }

    pub const fn document(&self) -> &Document {
        &self.document
    }

    pub const fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub const fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub const fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    pub const fn mark_modified(&mut self) {
        self.modified = true;
    }

    /// Changes the display mode, persisting it when a project file exists.
    ///
    /// Returns whether the setting was written to the project file.
    pub fn set_display_mode(&mut self, mode: DisplayMode) -> anyhow::Result<bool> {
        self.display_mode = mode;
        self.update_project(|config| config.set_display_mode(mode, project::now()))
    }

    /// Sets or clears the project's stylesheet.
    pub fn set_style_template(&mut self, path: Option<PathBuf>) -> anyhow::Result<()> {
        if let Some(path) = &path {
            anyhow::ensure!(
                path.is_file(),
                "stylesheet file not found: {}",
                path.display()
            );
        }

        let saved = self.update_project(|config| config.set_style_template(path, project::now()))?;
        anyhow::ensure!(saved, "no project configuration yet. Save the document first.");
        Ok(())
    }

    /// Reads the project's custom stylesheet, if one is configured.
    pub fn stylesheet(&self) -> anyhow::Result<Option<String>> {
        let Some(template) = self
            .project
            .as_ref()
            .and_then(|project| project.config.style_template())
        else {
            return Ok(None);
        };

        match std::fs::read_to_string(template) {
            Ok(css) => Ok(Some(css)),
            Err(error) => {
                tracing::warn!(
                    "Failed to read stylesheet {}, using the default: {error}",
                    template.display()
                );
                Ok(None)
            }
        }
    }

    /// Saves to the current path.
    pub fn save(&mut self) -> anyhow::Result<PathBuf> {
        let path = self
            .path
            .clone()
            .context("no file name yet. Use 'saveas <file>'.")?;
        self.save_as(&path)?;
        Ok(path)
    }

    /// Saves to `path`, which becomes the current path.
    ///
    /// The data attribute timestamps and the project file are updated as part
    /// of every save.
    pub fn save_as(&mut self, path: &Path) -> anyhow::Result<()> {
        let now = project::now();
        let mut stamped = self.document.clone();
        stamped.stamp_modified(&project::format_timestamp(now));

        markdown::save(&stamped, path)
            .with_context(|| format!("failed to save {}", path.display()))?;
        self.document = stamped;

        let mut project = match self.project.take() {
            Some(mut project) => {
                project.config.set_input_file(path, now);
                project
            }
            None => Project {
                path: ProjectConfig::default_path(path),
                config: ProjectConfig::new(path, now),
            },
        };
        project.config.set_display_mode(self.display_mode, now);
        project
            .config
            .save(&project.path)
            .with_context(|| format!("failed to save {}", project.path.display()))?;

        self.project = Some(project);
        self.path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    fn update_project(
        &mut self,
        update: impl FnOnce(&mut ProjectConfig),
    ) -> anyhow::Result<bool> {
        let Some(project) = self.project.as_mut() else {
            return Ok(false);
        };
        update(&mut project.config);
        project
            .config
            .save(&project.path)
            .with_context(|| format!("failed to save {}", project.path.display()))?;
        Ok(true)
    }
}

/// Finds the project file for a markdown document.
///
/// `<stem>_config.json` is tried first. Failing that, any `*_config.json` in
/// the same directory whose input file is this document is used.
fn load_project(markdown: &Path) -> anyhow::Result<Option<Project>> {
    let path = ProjectConfig::default_path(markdown);
    match ProjectConfig::load(&path) {
        Ok(config) => return Ok(Some(Project { path, config })),
        Err(ProjectError::NotFound) => {
            tracing::debug!("No project configuration at {}", path.display());
        }
        Err(error) => {
            return Err(
                anyhow::Error::new(error).context(format!("failed to load {}", path.display()))
            );
        }
    }

    let directory = match markdown.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let Ok(entries) = std::fs::read_dir(directory) else {
        return Ok(None);
    };

    for path in entries.filter_map(Result::ok).map(|entry| entry.path()) {
        let is_config = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(CONFIG_SUFFIX));
        if !is_config {
            continue;
        }
        match ProjectConfig::load(&path) {
            Ok(config) if same_file(config.input_file(), markdown) => {
                tracing::info!("Using project configuration {}", path.display());
                return Ok(Some(Project { path, config }));
            }
            Ok(_) => {}
            Err(error) => tracing::debug!("Skipping {}: {error}", path.display()),
        }
    }
    Ok(None)
}

const CONFIG_SUFFIX: &str = "_config.json";

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
