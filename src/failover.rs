//! Candidate ordering and the sequential fallback cascade

use std::fmt;
use std::future::Future;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

/// One named backend, ranked best-quality-first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidate
{   pub name: String
  , /// Zero is tried first
    pub rank: usize
}

/// Result of a single attempt against one candidate
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome<T>
{   Success(T)
  , /// Try the next candidate
    SoftFailure(String)
  , /// Abort the cascade
    HardFailure(crate::error::Error)
}

/// A soft failure recorded against the candidate that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure
{   pub model: String
  , pub reason: String
}

/// Ordered soft-failure reasons of one cascade
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticTrail(Vec<AttemptFailure>);

impl DiagnosticTrail
{   pub fn push(&mut self, model: &str, reason: String)
    {   self.0.push(AttemptFailure
        {   model: model.to_string()
          , reason
        });
    }

    pub fn entries(&self) -> &[AttemptFailure]
    {   &self.0
    }

    pub fn len(&self) -> usize
    {   self.0.len()
    }

    pub fn is_empty(&self) -> bool
    {   self.0.is_empty()
    }
}

impl From<Vec<AttemptFailure>> for DiagnosticTrail
{   fn from(entries: Vec<AttemptFailure>) -> Self
    {   DiagnosticTrail(entries)
    }
}

impl fmt::Display for DiagnosticTrail
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   for (i, failure) in self.0.iter().enumerate()
        {   if i > 0
            {   write!(f, "; ")?;
            }
            write!(f, "{}: {}", failure.model, failure.reason)?;
        }
        Ok(())
    }
}

/// Fixed, priority-ordered candidate list with a cursor
#[derive(Debug, Clone)]
pub struct CandidateSequence
{   pub candidates: Vec<ModelCandidate>
  , pub current_index: usize
}

impl CandidateSequence
{   pub fn new<I, S>(names: I) -> Self
    where
      I: IntoIterator<Item = S>
    , S: Into<String>
    {   let candidates: Vec<ModelCandidate> = names
          .into_iter()
          .enumerate()
          .map(|(rank, name)| ModelCandidate
          {   name: name.into()
            , rank
          })
          .collect();
        debug!(
          "Creating candidate sequence with {} models",
          candidates.len()
        );
        CandidateSequence
        {   candidates
          , current_index: 0
        }
    }

    pub fn current(&self) -> Option<&ModelCandidate>
    {   self.candidates.get(self.current_index)
    }

    /// Move to the next candidate
    pub fn next(&mut self) -> Option<&ModelCandidate>
    {   self.current_index += 1;
        self.current()
    }

    pub fn reset(&mut self)
    {   self.current_index = 0;
    }

    pub fn len(&self) -> usize
    {   self.candidates.len()
    }

    pub fn is_empty(&self) -> bool
    {   self.candidates.is_empty()
    }
}

/// Drive `attempt` over the candidates, one at a time, in order.
///
/// Stops at the first success, the first hard failure, or when
/// `cancel` fires. When every candidate soft-fails the call ends
/// in `AllProvidersExhausted` with one trail entry per candidate.
pub async fn run_cascade<T, F, Fut>(
  candidates: &CandidateSequence
, cancel: &CancellationToken
, mut attempt: F
) -> Result<(T, ModelCandidate), crate::error::Error>
where
  F: FnMut(ModelCandidate) -> Fut
, Fut: Future<Output = AttemptOutcome<T>>
{   if candidates.is_empty()
    {   return Err(crate::error::Error::InvalidConfiguration(
          "no candidates to try".to_string()
        ));
    }
    let mut sequence = candidates.clone();
    sequence.reset();
    let mut trail = DiagnosticTrail::default();
    let total = sequence.len();

    let mut candidate = sequence.current().cloned();
    while let Some(model) = candidate
    {   if cancel.is_cancelled()
        {   info!(
              "Cascade cancelled before {} ({}/{})",
              model.name, model.rank + 1, total
            );
            return Err(crate::error::Error::Cancelled);
        }

        debug!(
          "Attempting candidate {} ({}/{})",
          model.name, model.rank + 1, total
        );
        match attempt(model.clone()).await
        {   AttemptOutcome::Success(value) => {
              if !trail.is_empty()
              {   info!(
                    "Fallback succeeded on {} after {} failures",
                    model.name, trail.len()
                  );
              }
              return Ok((value, model));
            }
          , AttemptOutcome::SoftFailure(reason) => {
              warn!("Candidate {} failed: {}", model.name, reason);
              trail.push(&model.name, reason);
            }
          , AttemptOutcome::HardFailure(err) => {
              warn!(
                "Candidate {} aborted the cascade: {}",
                model.name, err
              );
              return Err(err);
            }
        }
        candidate = sequence.next().cloned();
    }

    warn!("All {} candidates exhausted: {}", total, trail);
    Err(crate::error::Error::AllProvidersExhausted(trail))
}
