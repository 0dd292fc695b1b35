//! Connectivity checks consulted before and after network attempts

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Platform-reported network state.
///
/// Clients ask this before every attempt and again after any
/// transport error, so an offline device is reported as
/// `Error::Offline` rather than a generic failure.
pub trait ConnectivityProbe: Send + Sync
{   fn is_online(&self) -> bool;
}

/// Used when the host platform offers no signal
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl ConnectivityProbe for AlwaysOnline
{   fn is_online(&self) -> bool
    {   true
    }
}

/// Shared flag a platform bridge flips on network change events
#[derive(Debug, Clone)]
pub struct ConnectivityFlag
{   online: Arc<AtomicBool>
}

impl ConnectivityFlag
{   pub fn new(online: bool) -> Self
    {   ConnectivityFlag
        {   online: Arc::new(AtomicBool::new(online))
        }
    }

    pub fn set_online(&self, online: bool)
    {   self.online.store(online, Ordering::SeqCst);
    }
}

impl Default for ConnectivityFlag
{   fn default() -> Self
    {   ConnectivityFlag::new(true)
    }
}

impl ConnectivityProbe for ConnectivityFlag
{   fn is_online(&self) -> bool
    {   self.online.load(Ordering::SeqCst)
    }
}
