use std::sync::Arc;
use std::time::Duration;
use log::{debug, info, trace, warn};
use reqwest::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::connectivity::{AlwaysOnline, ConnectivityProbe};
use crate::failover::{run_cascade, AttemptOutcome, CandidateSequence, ModelCandidate};
use crate::request::{is_dot_segment, ImageOptions, ImageRequest, ImageResult};

/// Image generation across ranked models with per-attempt timeouts.
pub struct ImageClient
{   base_url: Url
  , api_key: Option<String>
  , candidates: CandidateSequence
  , per_attempt_timeout: Duration
  , http_client: reqwest::Client
  , probe: Arc<dyn ConnectivityProbe>
}

impl ImageClient
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
        let base_url = Url::parse(&config.image_base_url).map_err(|e| {
          crate::error::Error::InvalidConfiguration(e.to_string())
        })?;
        if base_url.cannot_be_a_base()
        {   return Err(crate::error::Error::InvalidConfiguration(
              format!("{} cannot carry a path", base_url)
            ));
        }
        debug!(
          "Creating ImageClient with {} candidates",
          config.candidates.len()
        );
        Ok(ImageClient
        {   base_url
          , api_key: config.effective_api_key().map(str::to_string)
          , candidates: CandidateSequence::new(config.candidates.clone())
          , per_attempt_timeout: config.per_attempt_timeout()
          , http_client
          , probe
        })
    }

    pub async fn generate_image(
      &self
    , prompt: &str
    , options: ImageOptions
    ) -> Result<ImageResult, crate::error::Error>
    {   self.generate_image_with_cancel(
          prompt, options, &CancellationToken::new()
        ).await
    }

    /// Like `generate_image`, aborting when `cancel` fires.
    ///
    /// Cancelling drops the in-flight attempt and skips every
    /// remaining candidate.
    pub async fn generate_image_with_cancel(
      &self
    , prompt: &str
    , options: ImageOptions
    , cancel: &CancellationToken
    ) -> Result<ImageResult, crate::error::Error>
    {   let request = ImageRequest::new(prompt, options)?;
        debug!(
          "Generating {}x{} image with seed {}",
          request.width, request.height, request.seed
        );

        let (locator, model) = run_cascade(
          &self.candidates,
          cancel,
          |candidate| self.attempt(candidate, &request, cancel)
        ).await?;

        info!("Image generated by {}", model.name);
        Ok(ImageResult
        {   locator: locator.to_string()
          , model: model.name
          , seed: request.seed
          , width: request.width
          , height: request.height
        })
    }

    /// Provider URL for one attempt; the key is appended when configured
    pub fn attempt_url(
      &self
    , request: &ImageRequest
    , model: &str
    ) -> Result<Url, crate::error::Error>
    {   Ok(self.with_key(self.locator_url(request, model)?))
    }

    fn with_key(&self, mut url: Url) -> Url
    {   if let Some(key) = &self.api_key
        {   url.query_pairs_mut().append_pair("key", key);
        }
        url
    }

    /// Same URL without the key; safe to hand to the UI or clipboard
    pub fn locator_url(
      &self
    , request: &ImageRequest
    , model: &str
    ) -> Result<Url, crate::error::Error>
    {   // Path segments "." and ".." would be dropped by the URL parser.
        if is_dot_segment(&request.prompt)
        {   return Err(crate::error::Error::Invalid(
              "prompt cannot be only dots".to_string()
            ));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
          .map_err(|_| crate::error::Error::InvalidConfiguration(
            "image base URL cannot carry a path".to_string()
          ))?
          .pop_if_empty()
          .push("image")
          .push(&request.prompt);
        {   let mut query = url.query_pairs_mut();
            query
              .append_pair("width", &request.width.to_string())
              .append_pair("height", &request.height.to_string())
              .append_pair("seed", &request.seed.to_string())
              .append_pair("nologo", "true")
              .append_pair("model", model);
        }
        Ok(url)
    }

    async fn attempt(
      &self
    , candidate: ModelCandidate
    , request: &ImageRequest
    , cancel: &CancellationToken
    ) -> AttemptOutcome<Url>
    {   if !self.probe.is_online()
        {   return AttemptOutcome::HardFailure(crate::error::Error::Offline);
        }

        let locator = match self.locator_url(request, &candidate.name)
        {   Ok(url) => url
          , Err(e) => return AttemptOutcome::HardFailure(e)
        };

        // Released on every exit path; the request future is dropped
        // with it, which aborts the connection.
        let attempt_token = cancel.child_token();
        let _guard = attempt_token.clone().drop_guard();

        tokio::select!
        {   biased;
            _ = attempt_token.cancelled() => {
              debug!("Attempt on {} cancelled by caller", candidate.name);
              AttemptOutcome::HardFailure(crate::error::Error::Cancelled)
            }
          , _ = tokio::time::sleep(self.per_attempt_timeout) => {
              attempt_token.cancel();
              AttemptOutcome::SoftFailure(format!(
                "timed out after {}ms",
                self.per_attempt_timeout.as_millis()
              ))
            }
          , outcome = self.fetch(locator) => outcome
        }
    }

    /// Request `locator` (plus key) and hand it back on success
    async fn fetch(&self, locator: Url) -> AttemptOutcome<Url>
    {   let response = match self.http_client
          .get(self.with_key(locator.clone()))
          .send()
          .await
        {   Ok(response) => response
          , Err(e) => {
              let e = e.without_url();
              // Every candidate shares one host, so a refused
              // connection means none of them can be reached.
              if e.is_connect() || !self.probe.is_online()
              {   warn!("Image request failed, treating as offline: {}", e);
                  return AttemptOutcome::HardFailure(
                    crate::error::Error::Offline
                  );
              }
              return AttemptOutcome::SoftFailure(
                format!("request failed: {}", e)
              );
            }
        };

        let status = response.status();
        let content_type = response
          .headers()
          .get(CONTENT_TYPE)
          .and_then(|v| v.to_str().ok())
          .unwrap_or("")
          .to_ascii_lowercase();
        trace!("Image response: {} ({})", status, content_type);

        if !status.is_success()
        {   return AttemptOutcome::SoftFailure(
              format!("HTTP {}", status)
            );
        }
        if !content_type.starts_with("image/")
        {   let shown = if content_type.is_empty()
            {   "none"
            } else
            {   content_type.as_str()
            };
            return AttemptOutcome::SoftFailure(
              format!("unexpected content type: {}", shown)
            );
        }
        AttemptOutcome::Success(locator)
    }
}

