//! Reply visibility toggle (`/private`, `/public`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::queue::{acknowledge, handler, Handler};

/// Process-wide choice between in-channel and requester-only replies.
#[derive(Debug, Default)]
pub struct ReplyVisibility {
    private: AtomicBool,
}

impl ReplyVisibility {
    /// Create with the given initial mode.
    #[must_use]
    pub fn new(private: bool) -> Self {
        Self {
            private: AtomicBool::new(private),
        }
    }

    /// Whether replies currently go only to the requester.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.private.load(Ordering::Acquire)
    }

    /// Switch mode. Returns `true` if the mode changed.
    pub fn set_private(&self, private: bool) -> bool {
        self.private.swap(private, Ordering::AcqRel) != private
    }
}

/// Handler for `/private`.
#[must_use]
pub fn private_handler(visibility: Arc<ReplyVisibility>) -> Handler {
    toggle_handler(visibility, true)
}

/// Handler for `/public`.
#[must_use]
pub fn public_handler(visibility: Arc<ReplyVisibility>) -> Handler {
    toggle_handler(visibility, false)
}

fn toggle_handler(visibility: Arc<ReplyVisibility>, private: bool) -> Handler {
    handler(move |invocation, input| {
        let visibility = Arc::clone(&visibility);
        async move {
            acknowledge(invocation.as_ref()).await?;
            let changed = visibility.set_private(private);
            if changed {
                warn!(user = %input.user_id, private, "reply visibility switched");
            } else {
                info!(user = %input.user_id, private, "reply visibility unchanged");
            }
            invocation.follow_up(toggle_message(private, changed)).await
        }
    })
}

/// Confirmation text for a visibility toggle.
#[must_use]
pub fn toggle_message(private: bool, changed: bool) -> String {
    match (private, changed) {
        (true, true) => "> **Info: Next, the response will be sent privately. \
                         If you want to switch back to public mode, use `/public`**"
            .into(),
        (true, false) => "> **Warn: You are already on private mode. \
                          If you want to switch to public mode, use `/public`**"
            .into(),
        (false, true) => "> **Info: Next, the response will be sent to the channel directly. \
                          If you want to switch back to private mode, use `/private`**"
            .into(),
        (false, false) => "> **Warn: You are already on public mode. \
                           If you want to switch to private mode, use `/private`**"
            .into(),
    }
}
