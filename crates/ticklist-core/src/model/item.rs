use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Display status derived from a [`TodoItem`]'s completion flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Done,
}

impl Status {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
        }
    }

    /// Markdown checkbox marker for this status.
    #[must_use]
    pub const fn checkbox(self) -> &'static str {
        match self {
            Self::Pending => "[ ]",
            Self::Done => "[x]",
        }
    }

    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

impl From<bool> for Status {
    fn from(completed: bool) -> Self {
        if completed { Self::Done } else { Self::Pending }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" | "todo" | "open" => Ok(Self::Pending),
            "done" | "completed" => Ok(Self::Done),
            _ => Err(ParseStatusError { got: s.to_string() }),
        }
    }
}

/// Error returned when parsing a [`Status`] from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    pub got: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid status: '{}' (expected pending or done)", self.got)
    }
}

impl std::error::Error for ParseStatusError {}

/// One task: free text plus a completion flag.
///
/// Any string is accepted as text, including the empty string. An item has no
/// identity beyond its position in the owning list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TodoItem {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl TodoItem {
    /// A new pending item.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }

    /// An item with an explicit completion flag.
    #[must_use]
    pub fn with_completed(text: impl Into<String>, completed: bool) -> Self {
        Self {
            text: text.into(),
            completed,
        }
    }

    #[must_use]
    pub fn status(&self) -> Status {
        Status::from(self.completed)
    }

    /// Flip the completion flag and return the new value.
    pub const fn toggle(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_items_start_pending() {
        let item = TodoItem::new("buy milk");
        assert_eq!(item.text, "buy milk");
        assert!(!item.completed);
        assert_eq!(item.status(), Status::Pending);
    }

    #[test]
    fn empty_text_is_allowed() {
        let item = TodoItem::new("");
        assert!(item.text.is_empty());
    }

    #[test]
    fn toggle_flips_and_reports_new_value() {
        let mut item = TodoItem::new("x");
        assert!(item.toggle());
        assert_eq!(item.status(), Status::Done);
        assert!(!item.toggle());
        assert_eq!(item.status(), Status::Pending);
    }

    #[test]
    fn status_parses_aliases() {
        assert_eq!("pending".parse::<Status>().unwrap(), Status::Pending);
        assert_eq!("DONE".parse::<Status>().unwrap(), Status::Done);
        assert_eq!(" completed ".parse::<Status>().unwrap(), Status::Done);
        let err = "later".parse::<Status>().unwrap_err();
        assert_eq!(err.got, "later");
        assert!(err.to_string().contains("later"));
    }

    #[test]
    fn checkbox_markers() {
        assert_eq!(Status::Pending.checkbox(), "[ ]");
        assert_eq!(Status::Done.checkbox(), "[x]");
        assert!(Status::Done.is_done());
    }

    #[test]
    fn item_serializes_as_plain_record() {
        let item = TodoItem::with_completed("say \"hi\"", true);
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"text":"say \"hi\"","completed":true}"#);
    }

    #[test]
    fn unknown_item_fields_are_rejected() {
        let parsed: Result<TodoItem, _> =
            serde_json::from_str(r#"{"text":"a","completed":false,"due":"soon"}"#);
        assert!(parsed.is_err());
    }
}
