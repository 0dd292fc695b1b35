//! Configuration for the generation clients

use std::fmt;
use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use log::{debug, warn};

pub const DEFAULT_IMAGE_BASE_URL: &str
  = "https://image.pollinations.ai";
pub const DEFAULT_TEXT_ENDPOINT: &str
  = "https://text.pollinations.ai/";
pub const DEFAULT_PER_ATTEMPT_TIMEOUT_MS: u64 = 90_000;
pub const DEFAULT_TEXT_TIMEOUT_MS: u64 = 60_000;

pub const ENV_API_KEY: &str = "TOOLGEN_API_KEY";
pub const ENV_IMAGE_BASE_URL: &str = "TOOLGEN_IMAGE_BASE_URL";
pub const ENV_TEXT_ENDPOINT: &str = "TOOLGEN_TEXT_ENDPOINT";

/// Image models, best quality first
pub fn default_candidates() -> Vec<String>
{   ["flux-realism", "flux", "turbo"]
      .iter()
      .map(|m| m.to_string())
      .collect()
}

/// Generation client configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenConfig
{   /// Provider key; absent means unauthenticated calls
    pub api_key: Option<String>
  , /// Ordered image model identifiers
    pub candidates: Vec<String>
  , /// Timeout for a single image attempt
    pub per_attempt_timeout_ms: u64
  , /// Host serving `/image/<prompt>`
    pub image_base_url: String
  , /// Completion endpoint for text generation
    pub text_endpoint: String
  , /// Timeout for the single text request
    pub text_timeout_ms: u64
}

impl Default for GenConfig
{   fn default() -> Self
    {   GenConfig
        {   api_key: None
          , candidates: default_candidates()
          , per_attempt_timeout_ms: DEFAULT_PER_ATTEMPT_TIMEOUT_MS
          , image_base_url: DEFAULT_IMAGE_BASE_URL.to_string()
          , text_endpoint: DEFAULT_TEXT_ENDPOINT.to_string()
          , text_timeout_ms: DEFAULT_TEXT_TIMEOUT_MS
        }
    }
}

// Keep the key out of logs.
impl fmt::Debug for GenConfig
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("GenConfig")
          .field(
            "api_key",
            &self.api_key.as_ref().map(|_| "<redacted>")
          )
          .field("candidates", &self.candidates)
          .field("per_attempt_timeout_ms", &self.per_attempt_timeout_ms)
          .field("image_base_url", &self.image_base_url)
          .field("text_endpoint", &self.text_endpoint)
          .field("text_timeout_ms", &self.text_timeout_ms)
          .finish()
    }
}

impl GenConfig
{   /// Defaults overlaid with process environment
    pub fn from_env() -> Self
    {   let mut config = GenConfig::default();
        config.api_key = non_blank_env(ENV_API_KEY);
        if let Some(base) = non_blank_env(ENV_IMAGE_BASE_URL)
        {   config.image_base_url = base;
        }
        if let Some(endpoint) = non_blank_env(ENV_TEXT_ENDPOINT)
        {   config.text_endpoint = endpoint;
        }
        debug!(
          "Loaded config from env (api key present: {})",
          config.api_key.is_some()
        );
        config
    }

    pub fn from_json_str(json: &str)
      -> Result<Self, crate::error::Error>
    {   serde_json::from_str(json).map_err(|e| {
          crate::error::Error::InvalidConfiguration(
            format!("bad config json: {}", e)
          )
        })
    }

    pub fn from_json_file(path: impl AsRef<Path>)
      -> Result<Self, crate::error::Error>
    {   let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
          crate::error::Error::InvalidConfiguration(
            format!("cannot read {}: {}", path.display(), e)
          )
        })?;
        Self::from_json_str(&raw)
    }

    /// Builder-style key override
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self
    {   let key = key.into();
        self.api_key = if key.trim().is_empty()
        {   None
        } else
        {   Some(key)
        };
        self
    }

    pub fn with_candidates<I, S>(mut self, candidates: I) -> Self
    where
      I: IntoIterator<Item = S>
    , S: Into<String>
    {   self.candidates
          = candidates.into_iter().map(Into::into).collect();
        self
    }

    pub fn per_attempt_timeout(&self) -> Duration
    {   Duration::from_millis(self.per_attempt_timeout_ms)
    }

    pub fn text_timeout(&self) -> Duration
    {   Duration::from_millis(self.text_timeout_ms)
    }

    /// Key with blank values treated as absent
    pub fn effective_api_key(&self) -> Option<&str>
    {   self.api_key
          .as_deref()
          .filter(|k| !k.trim().is_empty())
    }

    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.candidates.is_empty()
        {   return Err(crate::error::Error::InvalidConfiguration(
              "candidate list is empty".to_string()
            ));
        }
        if self.candidates.iter().any(|c| c.trim().is_empty())
        {   return Err(crate::error::Error::InvalidConfiguration(
              "candidate names must not be blank".to_string()
            ));
        }
        if self.per_attempt_timeout_ms == 0
          || self.text_timeout_ms == 0
        {   return Err(crate::error::Error::InvalidConfiguration(
              "timeouts must be positive".to_string()
            ));
        }
        for (name, raw) in [
          ("image_base_url", &self.image_base_url)
        , ("text_endpoint", &self.text_endpoint)
        ]
        {   url::Url::parse(raw).map_err(|e| {
              crate::error::Error::InvalidConfiguration(
                format!("{} is not a valid URL: {}", name, e)
              )
            })?;
        }
        Ok(())
    }
}

fn non_blank_env(name: &str) -> Option<String>
{   match std::env::var(name)
    {   Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string())
      , Ok(_) => {
          warn!("{} is set but blank, ignoring", name);
          None
        }
      , Err(_) => None
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn default_config_is_valid()
    {   let config = GenConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.per_attempt_timeout(), Duration::from_secs(90));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn empty_candidates_rejected()
    {   let config = GenConfig::default()
          .with_candidates(Vec::<String>::new());
        assert!(matches!(
          config.validate(),
          Err(crate::error::Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn json_fills_missing_fields_with_defaults()
    {   let config = GenConfig::from_json_str(
          r#"{"apiKey":"k-1","candidates":["a","b"],"perAttemptTimeoutMs":500}"#
        ).unwrap();
        assert_eq!(config.candidates, vec!["a", "b"]);
        assert_eq!(config.per_attempt_timeout_ms, 500);
        assert_eq!(config.effective_api_key(), Some("k-1"));
        assert_eq!(config.image_base_url, DEFAULT_IMAGE_BASE_URL);
    }

    #[test]
    fn debug_redacts_key()
    {   let config = GenConfig::default().with_api_key("sk-very-secret");
        let dbg = format!("{:?}", config);
        assert!(!dbg.contains("sk-very-secret"));
        assert!(dbg.contains("redacted"));
    }

    #[test]
    fn blank_key_is_absent()
    {   let config = GenConfig::default().with_api_key("   ");
        assert_eq!(config.effective_api_key(), None);
    }
}
