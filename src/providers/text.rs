use std::sync::Arc;
use log::{debug, error, trace, warn};

use crate::connectivity::{AlwaysOnline, ConnectivityProbe};
use crate::request::{TextOptions, TextRequest};

/// Longest slice of an error body kept for diagnostics
const ERROR_BODY_LIMIT: usize = 200;

/// Single-attempt completion client.
///
/// Each `complete` call performs at most one HTTP request. Retrying
/// ("regenerate") is left to the caller.
pub struct TextClient
{   endpoint: String
  , api_key: Option<String>
  , timeout: std::time::Duration
  , http_client: reqwest::Client
  , probe: Arc<dyn ConnectivityProbe>
}

impl TextClient
{   pub fn new(config: &crate::config::GenConfig)
      -> Result<Self, crate::error::Error>
    {   Self::with_probe(config, Arc::new(AlwaysOnline))
    }

    pub fn with_probe(
      config: &crate::config::GenConfig
    , probe: Arc<dyn ConnectivityProbe>
    ) -> Result<Self, crate::error::Error>
    {   Self::with_http_client(config, probe, reqwest::Client::new())
    }

    pub fn with_http_client(
      config: &crate::config::GenConfig
    , probe: Arc<dyn ConnectivityProbe>
    , http_client: reqwest::Client
    ) -> Result<Self, crate::error::Error>
    {   config.validate()?;
        debug!("Creating TextClient for {}", config.text_endpoint);
        Ok(TextClient
        {   endpoint: config.text_endpoint.clone()
          , api_key: config.effective_api_key().map(str::to_string)
          , timeout: config.text_timeout()
          , http_client
          , probe
        })
    }

    /// Send one prompt/system-prompt pair and return the raw completion
    pub async fn complete(
      &self
    , prompt: &str
    , system_prompt: &str
    , options: TextOptions
    ) -> Result<String, crate::error::Error>
    {   let request = TextRequest::new(prompt, system_prompt, options)?;
        self.send(&request).await
    }

    pub async fn send(
      &self
    , request: &TextRequest
    ) -> Result<String, crate::error::Error>
    {   if !self.probe.is_online()
        {   warn!("Text generation skipped: device offline");
            return Err(crate::error::Error::Offline);
        }

        trace!(
          "Text request: temperature={} max_tokens={}",
          request.temperature, request.max_tokens
        );

        let mut builder = self.http_client
          .post(&self.endpoint)
          .timeout(self.timeout)
          .json(request);
        if let Some(key) = &self.api_key
        {   builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
          self.classify_transport_error(e)
        })?;

        let status = response.status();
        trace!("Text response status: {}", status);

        if !status.is_success()
        {   let body = response.text().await
              .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
              "Completion endpoint returned {}: {}",
              status, truncate(&body, ERROR_BODY_LIMIT)
            );
            return Err(crate::error::Error::RemoteFailure(format!(
              "status {}: {}",
              status, truncate(&body, ERROR_BODY_LIMIT)
            )));
        }

        let text = response.text().await.map_err(|e| {
          error!("Unreadable completion body: {}", e);
          crate::error::Error::RemoteFailure(
            format!("unreadable body: {}", e)
          )
        })?;

        if text.trim().is_empty()
        {   error!("Completion endpoint returned an empty body");
            return Err(crate::error::Error::RemoteFailure(
              "empty completion".to_string()
            ));
        }

        debug!("Completion received ({} bytes)", text.len());
        Ok(text)
    }

    fn classify_transport_error(
      &self
    , e: reqwest::Error
    ) -> crate::error::Error
    {   if e.is_connect() || !self.probe.is_online()
        {   warn!("Text request failed, treating as offline: {}", e);
            crate::error::Error::Offline
        } else if e.is_timeout()
        {   error!("Text request timed out: {}", e);
            crate::error::Error::RemoteFailure(
              "request timed out".to_string()
            )
        } else
        {   error!("HTTP error: {}", e);
            crate::error::Error::RemoteFailure(e.to_string())
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> &str
{   match s.char_indices().nth(max_chars)
    {   Some((idx, _)) => &s[..idx]
      , None => s
    }
}
