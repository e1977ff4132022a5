//! Embed Viewer - Load-monitored frame with typed fallback states.
//!
//! Wraps one embedded frame in a load-state tracker. Recovery is always a
//! fresh mount: retrying bumps an instance key so the frame is recreated
//! from scratch instead of attempting in-place repair.
//!
//! Sandbox permissions are modeled explicitly so the ceiling is checkable
//! in code: a third-party frame never gets more than
//! `ALLOW_SCRIPTS | ALLOW_SAME_ORIGIN | ALLOW_PRESENTATION`.

use bitflags::bitflags;
use spark_signals::{Signal, signal};
use tracing::warn;

use super::{EmbedDescriptor, Platform, classify, embed_source, validate_embed_url};

bitflags! {
    /// Sandbox grants for an embedded frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SandboxPermissions: u8 {
        const ALLOW_SCRIPTS = 1 << 0;
        const ALLOW_SAME_ORIGIN = 1 << 1;
        const ALLOW_PRESENTATION = 1 << 2;
    }
}

impl SandboxPermissions {
    /// The most any third-party frame is ever granted.
    pub const CEILING: Self = Self::ALLOW_SCRIPTS
        .union(Self::ALLOW_SAME_ORIGIN)
        .union(Self::ALLOW_PRESENTATION);
}

/// Load lifecycle of one mounted frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    Error(String),
}

/// Load-state tracker for a single embed.
///
/// Created from a descriptor; if the URL fails validation or the
/// platform is unsupported there is no source and the viewer reports a
/// permanent fallback (it never enters the loading state).
#[derive(Clone)]
pub struct EmbedViewer {
    descriptor: EmbedDescriptor,
    platform: Platform,
    source: Option<String>,
    state: Signal<LoadState>,
    /// Bumped on retry; consumers key the frame on this so a retry
    /// re-mounts a fresh instance.
    instance_key: Signal<u32>,
}

impl EmbedViewer {
    pub fn new(descriptor: EmbedDescriptor, production: bool) -> Self {
        let (platform, source) = match validate_embed_url(&descriptor.url, production) {
            Ok(()) => {
                let platform = classify(&descriptor.url);
                (platform, embed_source(&descriptor.url))
            }
            Err(reason) => {
                warn!(url = %descriptor.url, %reason, "rejected embed URL");
                (Platform::Unsupported, None)
            }
        };
        Self {
            descriptor,
            platform,
            source,
            state: signal(LoadState::Loading),
            instance_key: signal(0),
        }
    }

    pub fn descriptor(&self) -> &EmbedDescriptor {
        &self.descriptor
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The embeddable source URL, when the viewer can embed at all.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Whether a frame should be mounted (vs. the fallback card).
    pub fn can_embed(&self) -> bool {
        self.source.is_some()
    }

    /// Permissions for the mounted frame. Always the fixed ceiling -
    /// recognized platforms do not earn extra grants.
    pub fn sandbox(&self) -> SandboxPermissions {
        SandboxPermissions::CEILING
    }

    pub fn state(&self) -> LoadState {
        self.state.get()
    }

    pub fn state_signal(&self) -> Signal<LoadState> {
        self.state.clone()
    }

    /// Frame identity; changes force a fresh mount.
    pub fn instance_key(&self) -> u32 {
        self.instance_key.get()
    }

    /// Content-load signal from the platform: success.
    pub fn mark_loaded(&self) {
        self.state.set(LoadState::Loaded);
    }

    /// Content-load signal from the platform: failure.
    pub fn mark_error(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(url = %self.descriptor.url, error = %message, "embed failed to load");
        self.state.set(LoadState::Error(message));
    }

    /// Retry after an error: back to loading, new instance key. The old
    /// frame is discarded rather than recovered in place.
    pub fn retry(&self) {
        self.state.set(LoadState::Loading);
        self.instance_key.set(self.instance_key.get() + 1);
    }
}

// =============================================================================
// TESTS
// =============================================================================
