//! History store collaborator interface.
//!
//! The UI records an entry after a successful generation; the
//! clients never call the sink themselves.

use serde::{Deserialize, Serialize};

/// Default summary length for history rows
pub const DEFAULT_SUMMARY_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind
{   Ai
}

/// One lightweight usage record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry
{   /// Screen route the tool lives under
    pub path: String
  , /// Tool display name
    pub name: String
  , /// Short summary of what was produced
    pub result: String
  , #[serde(rename = "type")]
    pub kind: EntryKind
}

impl HistoryEntry
{   pub fn for_generation(path: &str, name: &str, output: &str) -> Self
    {   HistoryEntry
        {   path: path.to_string()
          , name: name.to_string()
          , result: result_summary(output, DEFAULT_SUMMARY_CHARS)
          , kind: EntryKind::Ai
        }
    }
}

/// Implemented by whatever persists history
pub trait HistorySink: Send + Sync
{   fn record(&self, entry: HistoryEntry)
      -> Result<(), crate::error::Error>;
}

/// Single-line summary of at most `max_chars` characters
pub fn result_summary(output: &str, max_chars: usize) -> String
{   let collapsed = output.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars
    {   return collapsed;
    }
    let mut summary: String = collapsed
      .chars()
      .take(max_chars.saturating_sub(1))
      .collect();
    summary.truncate(summary.trim_end().len());
    summary.push('…');
    summary
}
