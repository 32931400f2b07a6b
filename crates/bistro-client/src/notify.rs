//! User-facing notices for save and CRUD outcomes.
//!
//! The engine fires a notice on both the success and failure path of every
//! remote call and never waits on, or looks at, what the sink does with it.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{error, info};

use crate::constants::NOTICE_CHANNEL_CAPACITY;

/// Severity of a notice, mapped by the UI to toast styling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Success,
    Error,
    Info,
}

impl NoticeVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeVariant::Success => "success",
            NoticeVariant::Error => "error",
            NoticeVariant::Info => "info",
        }
    }
}

impl std::fmt::Display for NoticeVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single notice as delivered to subscribers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub variant: NoticeVariant,
    pub message: String,
}

/// Fire-and-forget notification sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, variant: NoticeVariant, message: &str);
}

/// Writes notices to the log. The default sink for headless use.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, variant: NoticeVariant, message: &str) {
        match variant {
            NoticeVariant::Error => error!(target: "bistro::notice", "{message}"),
            _ => info!(target: "bistro::notice", %variant, "{message}"),
        }
    }
}

/// Fans notices out over a tokio broadcast channel.
///
/// Subscribers that fall behind see `RecvError::Lagged` and skip ahead; with
/// no subscribers the notice is dropped.
#[derive(Clone, Debug)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<Notice>,
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(NOTICE_CHANNEL_CAPACITY)
    }
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, variant: NoticeVariant, message: &str) {
        let _ = self.tx.send(Notice {
            variant,
            message: message.to_owned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_delivers_to_each_subscriber() {
        let notifier = BroadcastNotifier::default();
        let mut a = notifier.subscribe();
        let mut b = notifier.subscribe();

        notifier.notify(NoticeVariant::Success, "Website saved");

        let expected = Notice {
            variant: NoticeVariant::Success,
            message: "Website saved".into(),
        };
        assert_eq!(a.try_recv().unwrap(), expected);
        assert_eq!(b.try_recv().unwrap(), expected);
    }

    #[test]
    fn test_broadcast_without_subscribers_is_silent() {
        let notifier = BroadcastNotifier::new(4);
        notifier.notify(NoticeVariant::Error, "nobody listening");
        let mut late = notifier.subscribe();
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn test_variant_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&NoticeVariant::Info).unwrap(),
            "\"info\""
        );
    }
}
