//! Best-effort extraction of labelled fields from completions.
//!
//! A missing field means "unset"; it is never an error.

use std::collections::HashMap;
use log::trace;
use regex::Regex;

/// Value following `label:` on its own line, if present.
///
/// Matching is case-insensitive and tolerates markdown bold
/// (`**Title:** value`) and list bullets.
pub fn extract_labeled_field(text: &str, label: &str) -> Option<String>
{   let pattern = format!(
      r"(?im)^[\s>*\-]*\**{}\**\s*:\**\s*(.+?)\s*$",
      regex::escape(label.trim())
    );
    let re = Regex::new(&pattern).ok()?;
    let value = re
      .captures(text)
      .and_then(|c| c.get(1))
      .map(|m| m.as_str().trim_matches('*').trim().to_string())
      .filter(|v| !v.is_empty());
    trace!("extract {:?} -> {:?}", label, value);
    value
}

/// All of `labels` that are present in `text`
pub fn extract_labeled_fields(text: &str, labels: &[&str])
  -> HashMap<String, String>
{   labels
      .iter()
      .filter_map(|label| {
        extract_labeled_field(text, label)
          .map(|v| (label.to_string(), v))
      })
      .collect()
}
