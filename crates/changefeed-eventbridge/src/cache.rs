//! Client reuse policy.
//!
//! Building a transport client is comparatively expensive, so a warm
//! process may keep one around for a while. Reuse is an optimization only:
//! clients hold no per-call state, and a fresh client behaves identically.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use changefeed_core::clock::{Clock, SystemClock};
use changefeed_core::error::ProviderError;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::client::PutEventsClient;
use crate::wire::{PutEventsRequest, PutEventsResponse};

/// How long a cached client is reused unless configured otherwise.
pub const DEFAULT_CLIENT_TTL_SECS: i64 = 300;

/// Whether and for how long a client handle is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientReuse {
    /// Build a new client for every call.
    PerCall,
    /// Reuse one client until it is older than `ttl`.
    Cached {
        /// Maximum age of a reused client.
        ttl: TimeDelta,
    },
}

impl ClientReuse {
    /// Caches for `secs` seconds; zero means [`ClientReuse::PerCall`].
    #[must_use]
    pub fn from_secs(secs: u32) -> Self {
        if secs == 0 {
            Self::PerCall
        } else {
            Self::Cached {
                ttl: TimeDelta::seconds(i64::from(secs)),
            }
        }
    }
}

impl Default for ClientReuse {
    fn default() -> Self {
        Self::Cached {
            ttl: TimeDelta::seconds(DEFAULT_CLIENT_TTL_SECS),
        }
    }
}

type ClientFactory<C> = Box<dyn Fn() -> Result<C, ProviderError> + Send + Sync>;

struct CachedClient<C> {
    client: Arc<C>,
    created_at: DateTime<Utc>,
}

/// A `PutEventsClient` that builds its inner client on demand and reuses it
/// according to a [`ClientReuse`] policy.
pub struct ReusableClient<C> {
    factory: ClientFactory<C>,
    reuse: ClientReuse,
    clock: Arc<dyn Clock>,
    slot: Mutex<Option<CachedClient<C>>>,
}

impl<C> ReusableClient<C> {
    /// Creates a reusable client backed by `factory`.
    pub fn new(
        reuse: ClientReuse,
        factory: impl Fn() -> Result<C, ProviderError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            factory: Box::new(factory),
            reuse,
            clock: Arc::new(SystemClock),
            slot: Mutex::new(None),
        }
    }

    /// Replaces the clock used to age cached clients.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The configured reuse policy.
    #[must_use]
    pub fn reuse(&self) -> ClientReuse {
        self.reuse
    }

    /// Returns a client handle, building a new one when none is cached or the
    /// cached one has expired.
    ///
    /// # Errors
    ///
    /// Returns the factory's error, or `ProviderError::Transport` if the
    /// cache lock is poisoned.
    pub fn handle(&self) -> Result<Arc<C>, ProviderError> {
        let ttl = match self.reuse {
            ClientReuse::PerCall => return Ok(Arc::new((self.factory)()?)),
            ClientReuse::Cached { ttl } => ttl,
        };

        let now = self.clock.now();
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| ProviderError::transport("client cache lock poisoned"))?;

        if let Some(cached) = slot.as_ref()
            && now.signed_duration_since(cached.created_at) < ttl
        {
            return Ok(Arc::clone(&cached.client));
        }

        let client = Arc::new((self.factory)()?);
        *slot = Some(CachedClient {
            client: Arc::clone(&client),
            created_at: now,
        });
        debug!(ttl_secs = ttl.num_seconds(), "bus client created");

        Ok(client)
    }
}

#[async_trait]
impl<C: PutEventsClient + 'static> PutEventsClient for ReusableClient<C> {
    async fn put_events(
        &self,
        request: &PutEventsRequest,
    ) -> Result<PutEventsResponse, ProviderError> {
        let client = self.handle()?;
        client.put_events(request).await
    }
}
