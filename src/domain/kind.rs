use std::{fmt, str::FromStr};

use serde::Serialize;

/// The closed set of line kinds a requirement document is made of.
///
/// All kinds share one node shape. The handful of kind-specific behaviours
/// (whether an id is carried, whether text is user-editable, the markdown
/// keyword) are looked up through the methods below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Kind {
    /// Document title (`# text`), always at indent 0.
    Title,
    /// Section heading (`**text**`).
    Subtitle,
    /// Numbered requirement (`<id> Req: text`).
    Requirement,
    /// Numbered comment (`<id> Comm: *text*`).
    Comment,
    /// System-managed data attribute (`<id> Dattr: text`).
    Dattr,
    /// Anything the classifier did not recognise, kept verbatim.
    Unknown,
}

impl Kind {
    /// Every kind, in display order.
    pub const ALL: [Self; 6] = [
        Self::Title,
        Self::Subtitle,
        Self::Requirement,
        Self::Comment,
        Self::Dattr,
        Self::Unknown,
    ];

    /// Whether nodes of this kind carry a numeric id.
    #[must_use]
    pub const fn has_id(self) -> bool {
        matches!(self, Self::Requirement | Self::Comment | Self::Dattr)
    }

    /// Whether user edits to the text of this kind are rejected.
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::Dattr)
    }

    /// The role keyword used in the markdown dialect, for id-carrying kinds.
    #[must_use]
    pub const fn keyword(self) -> Option<&'static str> {
        match self {
            Self::Requirement => Some("Req"),
            Self::Comment => Some("Comm"),
            Self::Dattr => Some("Dattr"),
            Self::Title | Self::Subtitle | Self::Unknown => None,
        }
    }

    /// Looks up the kind for a role keyword (`Req`, `Comm`, `Dattr`).
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "Req" => Some(Self::Requirement),
            "Comm" => Some(Self::Comment),
            "Dattr" => Some(Self::Dattr),
            _ => None,
        }
    }

    /// The upper-case name of the kind, e.g. `REQUIREMENT`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "TITLE",
            Self::Subtitle => "SUBTITLE",
            Self::Requirement => "REQUIREMENT",
            Self::Comment => "COMMENT",
            Self::Dattr => "DATTR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known kind.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown item type '{0}' (expected TITLE, SUBTITLE, REQUIREMENT, COMMENT, DATTR or UNKNOWN)")]
pub struct InvalidKindError(String);

impl FromStr for Kind {
    type Err = InvalidKindError;

    /// Parses a kind name case-insensitively.
    ///
    /// The short aliases `TIT`, `SUB`, `REQ` and `COM` are accepted as well.
    /// `DATTR` deliberately has no alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TITLE" | "TIT" => Ok(Self::Title),
            "SUBTITLE" | "SUB" => Ok(Self::Subtitle),
            "REQUIREMENT" | "REQ" => Ok(Self::Requirement),
            "COMMENT" | "COM" => Ok(Self::Comment),
            "DATTR" => Ok(Self::Dattr),
            "UNKNOWN" => Ok(Self::Unknown),
            _ => Err(InvalidKindError(s.to_string())),
        }
    }
}
