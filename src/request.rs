//! Request and result types for text and image generation

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Upper bound (exclusive) for generated seeds
pub const SEED_RANGE: u64 = 1_000_000;

/// Sampling options forwarded verbatim to the completion endpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOptions
{   /// Expected in [0, 2]; not clamped here
    pub temperature: f64
  , pub max_tokens: u32
}

impl Default for TextOptions
{   fn default() -> Self
    {   TextOptions
        {   temperature: 0.7
          , max_tokens: 1024
        }
    }
}

/// Wire payload for one completion call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRequest
{   pub prompt: String
  , pub system_prompt: String
  , pub temperature: f64
  , pub max_tokens: u32
}

impl TextRequest
{   pub fn new(
      prompt: &str
    , system_prompt: &str
    , options: TextOptions
    ) -> Result<Self, crate::error::Error>
    {   if prompt.trim().is_empty()
        {   return Err(crate::error::Error::Invalid(
              "prompt is empty".to_string()
            ));
        }
        if system_prompt.trim().is_empty()
        {   return Err(crate::error::Error::Invalid(
              "system prompt is empty".to_string()
            ));
        }
        Ok(TextRequest
        {   prompt: prompt.to_string()
          , system_prompt: system_prompt.to_string()
          , temperature: options.temperature
          , max_tokens: options.max_tokens
        })
    }
}

/// Caller-facing image options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOptions
{   pub width: u32
  , pub height: u32
  , /// Random per call when absent
    pub seed: Option<u64>
}

impl Default for ImageOptions
{   fn default() -> Self
    {   ImageOptions
        {   width: 1024
          , height: 1024
          , seed: None
        }
    }
}

impl ImageOptions
{   pub fn with_seed(mut self, seed: u64) -> Self
    {   self.seed = Some(seed);
        self
    }
}

/// Resolved image request; the seed is fixed for the whole cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest
{   pub prompt: String
  , pub width: u32
  , pub height: u32
  , pub seed: u64
}

impl ImageRequest
{   pub fn new(prompt: &str, options: ImageOptions)
      -> Result<Self, crate::error::Error>
    {   if prompt.trim().is_empty()
        {   return Err(crate::error::Error::Invalid(
              "prompt is empty".to_string()
            ));
        }
        if is_dot_segment(prompt)
        {   return Err(crate::error::Error::Invalid(
              "prompt cannot be only dots".to_string()
            ));
        }
        if options.width == 0 || options.height == 0
        {   return Err(crate::error::Error::Invalid(format!(
              "image size must be positive, got {}x{}",
              options.width, options.height
            )));
        }
        let seed = options
          .seed
          .unwrap_or_else(|| rand::thread_rng().gen_range(0..SEED_RANGE));
        Ok(ImageRequest
        {   prompt: prompt.to_string()
          , width: options.width
          , height: options.height
          , seed
        })
    }
}

/// `.` and `..` vanish when pushed as URL path segments
pub(crate) fn is_dot_segment(prompt: &str) -> bool
{   prompt == "." || prompt == ".."
}

/// Successful image generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult
{   /// URL of the winning attempt without the API key
    pub locator: String
  , /// Candidate that produced it (logs/diagnostics only)
    pub model: String
  , pub seed: u64
  , pub width: u32
  , pub height: u32
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn text_request_serialises_camel_case()
    {   let req = TextRequest::new(
          "hi", "be brief", TextOptions { temperature: 1.5, max_tokens: 64 }
        ).unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["systemPrompt"], "be brief");
        assert_eq!(json["maxTokens"], 64);
        assert_eq!(json["temperature"], 1.5);
    }

    #[test]
    fn blank_prompts_rejected()
    {   assert!(TextRequest::new(" ", "sys", TextOptions::default()).is_err());
        assert!(TextRequest::new("p", "", TextOptions::default()).is_err());
        assert!(ImageRequest::new("", ImageOptions::default()).is_err());
    }

    #[test]
    fn dot_only_prompts_rejected()
    {   for prompt in [".", ".."]
        {   assert!(matches!(
              ImageRequest::new(prompt, ImageOptions::default()),
              Err(crate::error::Error::Invalid(_))
            ));
        }
        assert!(ImageRequest::new("...", ImageOptions::default()).is_ok());
    }

    #[test]
    fn zero_size_rejected()
    {   let opts = ImageOptions { width: 0, height: 512, seed: None };
        assert!(matches!(
          ImageRequest::new("cat", opts),
          Err(crate::error::Error::Invalid(_))
        ));
    }

    #[test]
    fn explicit_seed_kept_and_random_seed_in_range()
    {   let fixed = ImageRequest::new(
          "cat", ImageOptions::default().with_seed(42)
        ).unwrap();
        assert_eq!(fixed.seed, 42);

        let random = ImageRequest::new("cat", ImageOptions::default())
          .unwrap();
        assert!(random.seed < SEED_RANGE);
    }
}
