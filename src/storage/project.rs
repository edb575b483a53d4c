//! Per-document project configuration.
//!
//! A project file is a small JSON document stored next to the markdown file
//! (`requirements.md` is paired with `requirements_config.json`):
//!
//! ```json
//! {
//!   "input_md_file_path": "requirements.md",
//!   "project_creation_date": "2025-07-09 14:40",
//!   "project_last_modification_date": "2025-07-09 15:20",
//!   "application_version": "1.0.0",
//!   "style_template_path": null,
//!   "editor_settings": {
//!     "display_mode": "compact"
//!   }
//! }
//! ```

use std::{
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Version recorded in newly created project files.
pub const APPLICATION_VERSION: &str = "1.0.0";

/// Format of every timestamp the editor writes, e.g. `2025-07-09 14:40`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Suffix appended to the markdown file stem to name its project file.
const CONFIG_SUFFIX: &str = "_config.json";

/// The current local time, truncated to the minute.
#[must_use]
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0)
        .and_then(|time| time.with_second(0))
        .unwrap_or(now)
}

/// Formats a timestamp with [`TIMESTAMP_FORMAT`].
#[must_use]
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// How the terminal listing shows each line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// One line per node, truncated to the terminal width.
    #[default]
    Compact,
    /// Full text with id and kind details.
    Full,
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Compact => "compact",
            Self::Full => "full",
        })
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "full" => Ok(Self::Full),
            other => Err(format!("invalid display mode '{other}' (expected compact or full)")),
        }
    }
}

/// Project metadata persisted alongside a requirement document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProjectFile", into = "ProjectFile")]
pub struct ProjectConfig {
    input_file: PathBuf,
    created: NaiveDateTime,
    modified: NaiveDateTime,
    application_version: String,
    style_template: Option<PathBuf>,
    display_mode: DisplayMode,
}

impl ProjectConfig {
    /// Creates the configuration for a new project.
    #[must_use]
    pub fn new(input_file: impl Into<PathBuf>, created: NaiveDateTime) -> Self {
        Self {
            input_file: input_file.into(),
            created,
            modified: created,
            application_version: APPLICATION_VERSION.to_string(),
            style_template: None,
            display_mode: DisplayMode::default(),
        }
    }

    /// The default project file for a markdown document: `<stem>_config.json`
    /// in the same directory.
    #[must_use]
    pub fn default_path(markdown: &Path) -> PathBuf {
        let stem = markdown
            .file_stem()
            .map_or_else(|| "requirements".into(), |stem| stem.to_string_lossy());
        markdown.with_file_name(format!("{stem}{CONFIG_SUFFIX}"))
    }

    /// Normalises a user-supplied project file name.
    ///
    /// Any directory components are dropped, so the file lands in the working
    /// directory, and `.json` is appended when missing.
    #[must_use]
    pub fn file_name_from(name: &str) -> PathBuf {
        let base = Path::new(name)
            .file_name()
            .map_or_else(|| name.to_string(), |base| base.to_string_lossy().into_owned());
        if base.ends_with(".json") {
            PathBuf::from(base)
        } else {
            PathBuf::from(format!("{base}.json"))
        }
    }

    /// Loads a project file.
    ///
    /// # Errors
    ///
    /// - [`ProjectError::NotFound`] if the file does not exist
    /// - [`ProjectError::Io`] if it cannot be read
    /// - [`ProjectError::Json`] if it is malformed or lacks required fields
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let file = File::open(path).map_err(|io_error| match io_error.kind() {
            io::ErrorKind::NotFound => ProjectError::NotFound,
            _ => ProjectError::Io(io_error),
        })?;

        let config = serde_json::from_reader(BufReader::new(file))?;
        tracing::debug!("Loaded project configuration from {}", path.display());
        Ok(config)
    }

    /// Writes the project file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save(&self, path: &Path) -> Result<(), ProjectError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::debug!("Saved project configuration to {}", path.display());
        Ok(())
    }

    /// Path of the markdown document this project describes.
    #[must_use]
    pub fn input_file(&self) -> &Path {
        &self.input_file
    }

    /// When the project was created.
    #[must_use]
    pub const fn created(&self) -> NaiveDateTime {
        self.created
    }

    /// When the project was last modified.
    #[must_use]
    pub const fn modified(&self) -> NaiveDateTime {
        self.modified
    }

    /// The editor version that wrote the file.
    #[must_use]
    pub fn application_version(&self) -> &str {
        &self.application_version
    }

    /// Custom stylesheet for HTML export, if any.
    #[must_use]
    pub fn style_template(&self) -> Option<&Path> {
        self.style_template.as_deref()
    }

    /// Terminal display preference.
    #[must_use]
    pub const fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    /// Records a modification at `at`.
    pub const fn touch(&mut self, at: NaiveDateTime) {
        self.modified = at;
    }

    /// Points the project at a different markdown document.
    pub fn set_input_file(&mut self, path: impl Into<PathBuf>, at: NaiveDateTime) {
        self.input_file = path.into();
        self.touch(at);
    }

    /// Sets or clears the custom stylesheet.
    pub fn set_style_template(&mut self, path: Option<PathBuf>, at: NaiveDateTime) {
        self.style_template = path;
        self.touch(at);
    }

    /// Changes the terminal display preference.
    pub const fn set_display_mode(&mut self, mode: DisplayMode, at: NaiveDateTime) {
        self.display_mode = mode;
        self.touch(at);
    }
}

/// Errors that can occur when reading or writing a project file.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// The project file was not found.
    #[error("project configuration not found")]
    NotFound,
    /// An I/O error occurred.
    #[error("failed to access project configuration")]
    Io(#[from] io::Error),
    /// The file is not a valid project configuration.
    #[error("invalid project configuration")]
    Json(#[from] serde_json::Error),
}

/// On-disk layout of the project file.
#[derive(Debug, Serialize, Deserialize)]
struct ProjectFile {
    input_md_file_path: PathBuf,
    project_creation_date: String,
    project_last_modification_date: String,
    application_version: String,
    #[serde(default)]
    style_template_path: Option<PathBuf>,
    #[serde(default)]
    editor_settings: EditorSettings,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct EditorSettings {
    #[serde(default)]
    display_mode: DisplayMode,
}

impl TryFrom<ProjectFile> for ProjectConfig {
    type Error = chrono::ParseError;

    fn try_from(file: ProjectFile) -> Result<Self, Self::Error> {
        Ok(Self {
            input_file: file.input_md_file_path,
            created: NaiveDateTime::parse_from_str(&file.project_creation_date, TIMESTAMP_FORMAT)?,
            modified: NaiveDateTime::parse_from_str(
                &file.project_last_modification_date,
                TIMESTAMP_FORMAT,
            )?,
            application_version: file.application_version,
            style_template: file.style_template_path,
            display_mode: file.editor_settings.display_mode,
        })
    }
}

impl From<ProjectConfig> for ProjectFile {
    fn from(config: ProjectConfig) -> Self {
        Self {
            input_md_file_path: config.input_file,
            project_creation_date: format_timestamp(config.created),
            project_last_modification_date: format_timestamp(config.modified),
            application_version: config.application_version,
            style_template_path: config.style_template,
            editor_settings: EditorSettings {
                display_mode: config.display_mode,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;
    use test_case::test_case;

    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 9)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn new_project_defaults() {
        let config = ProjectConfig::new("requirements.md", at(14, 40));

        assert_eq!(config.created(), config.modified());
        assert_eq!(config.application_version(), APPLICATION_VERSION);
        assert_eq!(config.style_template(), None);
        assert_eq!(config.display_mode(), DisplayMode::Compact);
    }

    #[test_case("requirements.md", "requirements_config.json"; "bare file")]
    #[test_case("docs/plan.md", "docs/plan_config.json"; "nested file")]
    #[test_case("notes", "notes_config.json"; "no extension")]
    fn default_path(markdown: &str, expected: &str) {
        assert_eq!(
            ProjectConfig::default_path(Path::new(markdown)),
            PathBuf::from(expected)
        );
    }

    #[test_case("my_project", "my_project.json"; "extension appended")]
    #[test_case("my_project.json", "my_project.json"; "extension kept")]
    #[test_case("/tmp/elsewhere/config.json", "config.json"; "directories dropped")]
    fn file_name_from(name: &str, expected: &str) {
        assert_eq!(ProjectConfig::file_name_from(name), PathBuf::from(expected));
    }

    #[test]
    fn serializes_to_the_documented_schema() {
        let mut config = ProjectConfig::new("requirements.md", at(14, 40));
        config.set_display_mode(DisplayMode::Full, at(15, 20));

        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "input_md_file_path": "requirements.md",
                "project_creation_date": "2025-07-09 14:40",
                "project_last_modification_date": "2025-07-09 15:20",
                "application_version": "1.0.0",
                "style_template_path": null,
                "editor_settings": { "display_mode": "full" }
            })
        );
    }

    #[test]
    fn optional_fields_take_defaults() {
        let json = r#"{
            "input_md_file_path": "old.md",
            "project_creation_date": "2024-01-01 09:00",
            "project_last_modification_date": "2024-01-02 10:30",
            "application_version": "0.9.0"
        }"#;

        let config: ProjectConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.input_file(), Path::new("old.md"));
        assert_eq!(config.style_template(), None);
        assert_eq!(config.display_mode(), DisplayMode::Compact);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let json = r#"{ "input_md_file_path": "old.md" }"#;
        assert!(serde_json::from_str::<ProjectConfig>(json).is_err());
    }

    #[test]
    fn malformed_timestamp_is_rejected() {
        let json = r#"{
            "input_md_file_path": "a.md",
            "project_creation_date": "yesterday",
            "project_last_modification_date": "2024-01-02 10:30",
            "application_version": "1.0.0"
        }"#;
        assert!(serde_json::from_str::<ProjectConfig>(json).is_err());
    }

    #[test]
    fn setters_touch_modification_date() {
        let mut config = ProjectConfig::new("a.md", at(9, 0));

        config.set_style_template(Some(PathBuf::from("custom.css")), at(9, 5));
        assert_eq!(config.modified(), at(9, 5));
        assert_eq!(config.style_template(), Some(Path::new("custom.css")));

        config.set_input_file("b.md", at(9, 10));
        assert_eq!(config.modified(), at(9, 10));
        assert_eq!(config.created(), at(9, 0));
    }

    #[test]
    fn save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sub").join("doc_config.json");
        let mut config = ProjectConfig::new("doc.md", at(14, 40));
        config.set_style_template(Some(PathBuf::from("style.css")), at(14, 45));

        config.save(&path).unwrap();
        let loaded = ProjectConfig::load(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_missing_and_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");

        assert!(matches!(
            ProjectConfig::load(&path),
            Err(ProjectError::NotFound)
        ));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            ProjectConfig::load(&path),
            Err(ProjectError::Json(_))
        ));
    }

    #[test]
    fn display_mode_parsing() {
        assert_eq!("FULL".parse::<DisplayMode>().unwrap(), DisplayMode::Full);
        assert!("wide".parse::<DisplayMode>().is_err());
    }

    #[test]
    fn now_is_truncated_to_the_minute() {
        let now = now();
        assert_eq!(now.second(), 0);
        assert_eq!(now.nanosecond(), 0);
    }
}
