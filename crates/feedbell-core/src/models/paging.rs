use std::fmt;

use serde::{Deserialize, Serialize};

/// Partition of the feed being browsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TabMode {
    #[default]
    Unread,
    Read,
}

impl TabMode {
    /// Value of the `status` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            TabMode::Unread => "UNREAD",
            TabMode::Read => "READ",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TabMode::Unread => "Unread",
            TabMode::Read => "Read",
        }
    }

    pub fn toggled(&self) -> TabMode {
        match self {
            TabMode::Unread => TabMode::Read,
            TabMode::Read => TabMode::Unread,
        }
    }
}

impl std::str::FromStr for TabMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unread" => Ok(TabMode::Unread),
            "read" => Ok(TabMode::Read),
            other => Err(format!("unknown tab '{}', expected unread or read", other)),
        }
    }
}

impl fmt::Display for TabMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Opaque continuation token: the identity of the last item of the most
/// recently fetched page. Only meaningful within one tab mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A full page means more may follow; a short page is the last one.
/// An exactly-full last page therefore costs one extra, empty fetch.
pub fn has_next_page(returned: usize, requested: usize) -> bool {
    requested > 0 && returned >= requested
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_next_heuristic() {
        assert!(has_next_page(5, 5));
        assert!(!has_next_page(3, 5));
        assert!(!has_next_page(0, 5));
        assert!(!has_next_page(0, 0));
    }

    #[test]
    fn test_tab_mode_parse() {
        assert_eq!("UNREAD".parse::<TabMode>(), Ok(TabMode::Unread));
        assert_eq!("read".parse::<TabMode>(), Ok(TabMode::Read));
        assert!("archived".parse::<TabMode>().is_err());
        assert_eq!(TabMode::Unread.toggled(), TabMode::Read);
    }
}
