use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use log::{debug, error, info};
use crate::GenFoot;

/// Shared state owned by the backend task
pub struct GenBackendState
{   pub text_client: Arc<crate::providers::TextClient>
  , pub image_client: Arc<crate::providers::ImageClient>
  , /// Parent of every call's token; cancelled on shutdown
    pub shutdown_token: CancellationToken
}

impl GenBackendState
{   pub fn new(
      config: &crate::config::GenConfig
    , probe: Arc<dyn crate::connectivity::ConnectivityProbe>
    ) -> Result<Self, crate::error::Error>
    {   debug!("Initializing GenBackendState");
        let http_client = reqwest::Client::new();
        Ok(GenBackendState
        {   text_client: Arc::new(
              crate::providers::TextClient::with_http_client(
                config, probe.clone(), http_client.clone()
              )?
            )
          , image_client: Arc::new(
              crate::providers::ImageClient::with_http_client(
                config, probe, http_client
              )?
            )
          , shutdown_token: CancellationToken::new()
        })
    }
}

/// Image call in flight
pub struct PendingImage
{   pub reply: mpsc::UnboundedReceiver<crate::GenerateImageReply>
  , pub cancel: CancellationToken
}

impl PendingImage
{   /// Abort the in-flight attempt and skip the remaining candidates
    pub fn abort(&self)
    {   self.cancel.cancel();
    }

    pub async fn result(mut self) -> crate::GenerateImageReply
    {   self.reply.recv().await.unwrap_or_else(|| {
          Err(crate::error::Error::Other(
            "Backend dropped the request".to_string()
          ))
        })
    }
}

/// Public API for the generation backend - owns the task
pub struct GenBackend
{   hand: crate::GenHand
  , _task_handle: tokio::task::JoinHandle<()>
}

impl GenBackend
{   /// Validate config, then spawn the backend task
    pub fn new(config: crate::config::GenConfig)
      -> Result<Self, crate::error::Error>
    {   Self::with_probe(
          config,
          Arc::new(crate::connectivity::AlwaysOnline)
        )
    }

    pub fn with_probe(
      config: crate::config::GenConfig
    , probe: Arc<dyn crate::connectivity::ConnectivityProbe>
    ) -> Result<Self, crate::error::Error>
    {   debug!("Creating GenBackend with task ownership");
        let state = GenBackendState::new(&config, probe)?;

        let (generate_text_tx, generate_text_rx)
          = mpsc::unbounded_channel();
        let (generate_image_tx, generate_image_rx)
          = mpsc::unbounded_channel();
        let (kill_process_tx, kill_process_rx)
          = mpsc::unbounded_channel();

        let hand = crate::GenHand
        {   generate_text_tx
          , generate_image_tx
          , kill_process_tx
        };

        let foot = crate::GenFoot
        {   generate_text_rx
          , generate_image_rx
          , kill_process_rx
        };

        let _task_handle = tokio::spawn(async move {
          run_backend_loop(foot, state).await
        });

        Ok(GenBackend
        {   hand
          , _task_handle
        })
    }

    /// Queue a text completion - returns immediately
    pub fn generate_text(
      &self
    , prompt: String
    , system_prompt: String
    , options: crate::request::TextOptions
    ) -> Result<
        mpsc::UnboundedReceiver<crate::GenerateTextReply>,
        crate::error::Error
      >
    {   debug!("generate_text queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::GenerateTextArgs
        {   prompt
          , system_prompt
          , options
          , reply: reply_tx
        };

        self.hand.generate_text_tx
          .send(cmd)
          .map_err(|_| backend_closed())?;

        Ok(reply_rx)
    }

    /// Queue an image generation - returns immediately
    pub fn generate_image(
      &self
    , prompt: String
    , options: crate::request::ImageOptions
    ) -> Result<PendingImage, crate::error::Error>
    {   debug!("generate_image queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let cmd = crate::GenerateImageArgs
        {   prompt
          , options
          , cancel: cancel.clone()
          , reply: reply_tx
        };

        self.hand.generate_image_tx
          .send(cmd)
          .map_err(|_| backend_closed())?;

        Ok(PendingImage
        {   reply: reply_rx
          , cancel
        })
    }

    /// Cancel outstanding calls and stop the backend
    pub async fn shutdown(self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down GenBackend");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::KillProcessArgs
        {   reply: reply_tx
        };

        self.hand.kill_process_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel already closed");
            crate::error::Error::Other(
              "Backend already shutdown".to_string()
            )
          })?;

        match reply_rx.recv().await
        {   Some(result) => {
              debug!("Backend shutdown confirmed");
              result
            }
          , None => {
              error!("Backend exited without confirming shutdown");
              Err(crate::error::Error::Other(
                "Backend shutdown not confirmed".to_string()
              ))
            }
        }
    }
}

fn backend_closed() -> crate::error::Error
{   error!("Backend channel closed");
    crate::error::Error::Other("Backend disconnected".to_string())
}

/// Main backend event loop
///
/// Each generation is spawned onto its own task, so concurrent
/// calls run as independent cascades with no coordination.
async fn run_backend_loop(
  foot: crate::GenFoot
, state: GenBackendState
)
{   debug!("Starting GenBackend event loop");
    let GenFoot
    {   mut generate_text_rx
      , mut generate_image_rx
      , mut kill_process_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = generate_text_rx.recv() => {
          debug!("Received GenerateText");
          let client = state.text_client.clone();
          let shutdown = state.shutdown_token.clone();
          tokio::spawn(async move {
            let result = tokio::select!
            {   _ = shutdown.cancelled() => {
                  Err(crate::error::Error::Cancelled)
                }
              , r = client.complete(
                  &cmd.prompt, &cmd.system_prompt, cmd.options
                ) => r
            };
            let _ = cmd.reply.send(result);
          });
        }
      , Some(cmd) = generate_image_rx.recv() => {
          debug!("Received GenerateImage");
          let client = state.image_client.clone();
          let shutdown = state.shutdown_token.clone();
          tokio::spawn(async move {
            // Either the caller or shutdown aborts the cascade.
            let call_token = shutdown.child_token();
            let caller = cmd.cancel.clone();
            let forward = call_token.clone();
            let watcher = tokio::spawn(async move {
              caller.cancelled().await;
              forward.cancel();
            });
            let result = client
              .generate_image_with_cancel(
                &cmd.prompt, cmd.options, &call_token
              )
              .await;
            watcher.abort();
            let _ = cmd.reply.send(result);
          });
        }
      , Some(cmd) = kill_process_rx.recv() => {
          debug!("Received KillProcess");
          state.shutdown_token.cancel();
          let _ = cmd.reply.send(Ok(()));
          info!("GenBackend shutting down");
          break;
        }
      , else => {
          debug!("All command channels closed");
          state.shutdown_token.cancel();
          break;
        }
      }
    }
}
