// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0

//! Session bootstrap: one connection to the automation service, one toolkit,
//! one desktop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::OnceCell;
use tracing::info;

use crate::core::{Error, Result, Size};
use crate::remote::api::{
    self, RemoteObject, ServiceFactory, SERVICE_DESKTOP, SERVICE_TOOLKIT,
};

/// A connection to the automation service.
///
/// The handshake (instantiating the toolkit and desktop services) runs at
/// most once per session, on first use. Concurrent first callers race; one
/// performs the bootstrap and the rest observe its outcome. A failed
/// handshake is cached: every later call reports the same [`Error::Bootstrap`]
/// without retrying.
///
/// Sessions are cheap to clone and share one underlying connection.
#[derive(Clone)]
pub struct RemoteSession {
    inner: Arc<SessionCore>,
}

impl std::fmt::Debug for RemoteSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSession")
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

struct SessionCore {
    factory: Arc<dyn ServiceFactory>,
    handles: OnceCell<Result<SessionHandles>>,
    terminated: AtomicBool,
}

#[derive(Clone)]
struct SessionHandles {
    toolkit: RemoteObject,
    desktop: RemoteObject,
}

impl RemoteSession {
    /// Wraps a backend without connecting. The handshake runs on first use.
    pub fn new(factory: Arc<dyn ServiceFactory>) -> Self {
        Self {
            inner: Arc::new(SessionCore {
                factory,
                handles: OnceCell::new(),
                terminated: AtomicBool::new(false),
            }),
        }
    }

    /// Wraps a backend and performs the handshake eagerly.
    pub fn connect(factory: Arc<dyn ServiceFactory>) -> Result<Self> {
        let session = Self::new(factory);
        session.handles()?;
        Ok(session)
    }

    fn handles(&self) -> Result<&SessionHandles> {
        let outcome = self
            .inner
            .handles
            .get_or_init(|| bootstrap(&self.inner.factory));
        match outcome {
            Ok(handles) => Ok(handles),
            Err(error) => Err(error.clone()),
        }
    }

    /// Whether the handshake has run and succeeded.
    pub fn is_connected(&self) -> bool {
        matches!(self.inner.handles.get(), Some(Ok(_)))
    }

    pub fn factory(&self) -> &Arc<dyn ServiceFactory> {
        &self.inner.factory
    }

    /// The toolkit service instance, bootstrapping on first use.
    pub fn toolkit(&self) -> Result<RemoteObject> {
        Ok(self.handles()?.toolkit.clone())
    }

    /// The desktop singleton, bootstrapping on first use.
    pub fn desktop(&self) -> Result<RemoteObject> {
        Ok(self.handles()?.desktop.clone())
    }

    /// Asks the desktop to terminate. Idempotent: the second and later calls
    /// return without another remote round trip.
    pub fn terminate(&self) -> Result<()> {
        if self.inner.terminated.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let desktop = self.desktop()?;
        api::desktop(&desktop)?.terminate()?;
        Ok(())
    }

    /// The desktop extent reported to monitor queries.
    // The container-window query needs a loaded frame, which this layer never
    // has; report a fixed extent instead.
    pub fn screen_size(&self) -> Size {
        Size::new(1920, 1080)
    }
}

fn bootstrap(factory: &Arc<dyn ServiceFactory>) -> Result<SessionHandles> {
    let toolkit = factory
        .create_instance(SERVICE_TOOLKIT)
        .map_err(|error| Error::Bootstrap(error.to_string()))?;
    api::toolkit(&toolkit).map_err(|error| Error::Bootstrap(error.to_string()))?;

    let desktop = factory
        .create_instance(SERVICE_DESKTOP)
        .map_err(|error| Error::Bootstrap(error.to_string()))?;
    api::desktop(&desktop).map_err(|error| Error::Bootstrap(error.to_string()))?;

    info!("connected to a running automation service");
    Ok(SessionHandles { toolkit, desktop })
}
