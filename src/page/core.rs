//! Page context: one document's bridge instance.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{ApiBinding, U2fApi};
use crate::engine::ProtocolEngine;
use crate::error::Result;
use crate::identifiers::Origin;
use crate::transport::{ChannelAdapter, HostConnection, PageSurface};

use super::builder::PageContextBuilder;

// ============================================================================
// PageContext
// ============================================================================

/// Everything the bridge owns for one document.
///
/// Owns the page surface, the engine, the adapter task and the `u2f`
/// binding. Dropping the context stops both listener tasks.
pub struct PageContext {
    /// Origin of the document.
    origin: Origin,
    /// Page message surface.
    surface: PageSurface,
    /// Protocol engine shared with the API handle.
    engine: Arc<ProtocolEngine>,
    /// The page's `u2f` binding.
    binding: Arc<ApiBinding>,
    /// The installed API.
    api: U2fApi,
    /// Adapter relay task.
    adapter_task: JoinHandle<()>,
    /// Engine listener task.
    engine_task: JoinHandle<()>,
}

impl PageContext {
    /// Creates a builder for configuring a page context.
    #[inline]
    #[must_use]
    pub fn builder() -> PageContextBuilder {
        PageContextBuilder::new()
    }

    /// Wires the components and spawns the listeners.
    pub(crate) fn start(
        origin: Origin,
        host: HostConnection,
        surface_capacity: usize,
        binding: Arc<ApiBinding>,
        runtime: &Handle,
    ) -> Self {
        let surface = PageSurface::new(surface_capacity);

        // Subscribe both listeners before anything can be posted.
        let adapter_rx = surface.subscribe();
        let engine_rx = surface.subscribe();

        let engine = Arc::new(ProtocolEngine::new(origin.clone(), surface.clone()));
        let adapter = ChannelAdapter::new(origin.clone(), surface.clone(), host.link);

        let adapter_task = runtime.spawn(adapter.run(adapter_rx, host.inbound));
        let engine_task = runtime.spawn(Arc::clone(&engine).listen(engine_rx));

        let api = U2fApi::new(Arc::clone(&engine));
        if !binding.install(api.clone()) {
            warn!(%origin, "u2f binding already held another bridge");
        }

        info!(%origin, "U2F bridge loaded");

        Self {
            origin,
            surface,
            engine,
            binding,
            api,
            adapter_task,
            engine_task,
        }
    }

    /// Returns the document origin.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Returns the installed `u2f` API.
    #[inline]
    #[must_use]
    pub fn api(&self) -> &U2fApi {
        &self.api
    }

    /// Returns the page's `u2f` binding.
    #[inline]
    #[must_use]
    pub fn binding(&self) -> &ApiBinding {
        &self.binding
    }

    /// Returns `true` if an operation is in flight.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.engine.is_pending()
    }

    /// Returns a handle to the page message surface.
    #[inline]
    #[must_use]
    pub fn surface(&self) -> &PageSurface {
        &self.surface
    }

    /// Posts `data` on the page surface as the document itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`](crate::Error::ChannelClosed) if both
    /// listeners have stopped.
    pub fn post_message(&self, data: Value) -> Result<()> {
        self.surface.post(self.origin.clone(), data)
    }

    /// Stops both listener tasks.
    pub fn shutdown(&self) {
        debug!(origin = %self.origin, "Shutting down page context");
        self.adapter_task.abort();
        self.engine_task.abort();
    }
}

impl Drop for PageContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for PageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageContext")
            .field("origin", &self.origin)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
