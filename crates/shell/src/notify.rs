use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

/// One user-visible toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// One-way observer for toasts. Nothing is returned to the caller.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Forwards notifications to whoever renders them.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    events: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (Self { events }, receiver)
    }
}

impl NotificationSink for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if self.events.send(notification).is_err() {
            tracing::debug!("notification dropped: renderer is gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_notifier_delivers_in_order_and_survives_a_closed_receiver() {
        let (notifier, mut receiver) = ChannelNotifier::new();
        notifier.notify(Notification::warning("first"));
        notifier.notify(Notification::error("second"));

        assert_eq!(receiver.try_recv().ok(), Some(Notification::warning("first")));
        assert_eq!(receiver.try_recv().ok(), Some(Notification::error("second")));
        assert!(receiver.try_recv().is_err());

        drop(receiver);
        notifier.notify(Notification::success("ignored"));
    }
}
