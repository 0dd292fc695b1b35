pub mod error;
pub mod config;
pub mod connectivity;
pub mod request;
pub mod failover;
pub mod providers;
pub mod history;
pub mod extract;
pub mod client;

pub use client::{GenBackend, PendingImage};
pub use config::GenConfig;
pub use error::Error;
pub use providers::{ImageClient, TextClient};
pub use request::{ImageOptions, ImageResult, TextOptions};

/*

toolgen: the generation core behind the tool hub's AI screens.
One text completion per call; image generation cascades across
ranked models until one of them returns an image.

toolgen/
├── Cargo.toml
├── src/
│   ├── lib.rs           # Re-exports and backend API interface
│   ├── error.rs         # Error taxonomy and user-facing messages
│   ├── config.rs        # GenConfig (key, candidates, timeouts)
│   ├── connectivity.rs  # ConnectivityProbe contract
│   ├── request.rs       # Text/image request and result types
│   ├── failover.rs      # Candidate sequence and cascade driver
│   ├── providers/
│   │   ├── mod.rs
│   │   ├── text.rs      # Single-attempt completion client
│   │   └── image.rs     # Cascading image client
│   ├── history.rs       # History store collaborator interface
│   ├── extract.rs       # Caller-side field extraction
│   └── client.rs        # GenBackend actor
└── tests/

*/

/// Initialise `env_logger` once; honours `RUST_LOG`, defaults to info.
pub fn init_logging()
{   let _ = env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).try_init();
}

/// TOOLGEN API INTERFACE:

// ===== GenerateText =====

pub type GenerateTextReply = Result<String, crate::error::Error>;
pub type GenerateTextReplySender
  = tokio::sync::mpsc::UnboundedSender<GenerateTextReply>;

pub struct GenerateTextArgs
{   pub prompt: String
  , pub system_prompt: String
  , pub options: crate::request::TextOptions
  , pub reply: GenerateTextReplySender
}

// ===== GenerateImage =====

pub type GenerateImageReply
  = Result<crate::request::ImageResult, crate::error::Error>;
pub type GenerateImageReplySender
  = tokio::sync::mpsc::UnboundedSender<GenerateImageReply>;

pub struct GenerateImageArgs
{   pub prompt: String
  , pub options: crate::request::ImageOptions
  , pub cancel: tokio_util::sync::CancellationToken
  , pub reply: GenerateImageReplySender
}

// ===== KillProcess =====

pub type KillProcessReply = Result<(), crate::error::Error>;
pub type KillProcessReplySender
  = tokio::sync::mpsc::UnboundedSender<KillProcessReply>;

pub struct KillProcessArgs
{   pub reply: KillProcessReplySender
}

// ===== GenHand (sender side) =====

pub struct GenHand
{   pub generate_text_tx
      : tokio::sync::mpsc::UnboundedSender<GenerateTextArgs>
  , pub generate_image_tx
      : tokio::sync::mpsc::UnboundedSender<GenerateImageArgs>
  , pub kill_process_tx
      : tokio::sync::mpsc::UnboundedSender<KillProcessArgs>
}

// ===== GenFoot (receiver side) =====

pub struct GenFoot
{   pub generate_text_rx
      : tokio::sync::mpsc::UnboundedReceiver<GenerateTextArgs>
  , pub generate_image_rx
      : tokio::sync::mpsc::UnboundedReceiver<GenerateImageArgs>
  , pub kill_process_rx
      : tokio::sync::mpsc::UnboundedReceiver<KillProcessArgs>
}
