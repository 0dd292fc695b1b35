use std::fmt;

/// Custom error type for toolgen operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Device has no network connectivity
    Offline
  , /// Endpoint reachable but the attempt was unusable
    RemoteFailure(String)
  , /// Every image candidate soft-failed
    AllProvidersExhausted(crate::failover::DiagnosticTrail)
  , /// Request rejected before any network call
    Invalid(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Caller aborted the call
    Cancelled
  , /// Generic error
    Other(String)
}

impl Error
{   /// True when the failure is a connectivity problem on our side
    pub fn is_offline(&self) -> bool
    {   matches!(self, Error::Offline)
    }

    /// Non-technical text safe to show the end user.
    ///
    /// Never contains status codes, model identifiers or
    /// transport detail; those belong in logs via `Display`.
    pub fn user_message(&self) -> &'static str
    {   match self
        {   Error::Offline => {
              "You appear to be offline. Please check your \
               network connection and try again."
            }
          , Error::AllProvidersExhausted(_) => {
              "Image generation is temporarily unavailable. \
               Please try again shortly."
            }
          , Error::Invalid(_) => {
              "Please check your input and try again."
            }
          , Error::Cancelled => {
              "Generation was cancelled."
            }
          , Error::RemoteFailure(_)
          | Error::InvalidConfiguration(_)
          | Error::Other(_) => {
              "Something went wrong while generating. \
               Please try again."
            }
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::Offline => {
              write!(f, "Network connectivity unavailable")
            }
          , Error::RemoteFailure(msg) => {
              write!(f, "Remote failure: {}", msg)
            }
          , Error::AllProvidersExhausted(trail) => {
              write!(f,
                "All {} candidates failed: {}",
                trail.len(),
                trail
              )
            }
          , Error::Invalid(msg) => {
              write!(f, "Invalid request: {}", msg)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Cancelled => {
              write!(f, "Generation cancelled")
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}
