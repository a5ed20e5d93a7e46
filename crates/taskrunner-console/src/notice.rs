/*
[INPUT]:  Outcomes of user actions (success, informational, failure)
[OUTPUT]: Transient Notice values on an mpsc channel for the rendering layer
[POS]:    Rendering contract - user-visible notifications
[UPDATE]: When adding notice kinds or changing delivery
*/

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

/// A transient user-visible notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Sending half of the notice channel, cloned into each component
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn success(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(%message, "notice");
        self.emit(NoticeKind::Success, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(%message, "notice");
        self.emit(NoticeKind::Info, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "error notice");
        self.emit(NoticeKind::Error, message);
    }

    fn emit(&self, kind: NoticeKind, message: String) {
        // Rendering layer may already be gone during shutdown
        let _ = self.tx.send(Notice { kind, message });
    }
}

/// Drain every notice currently queued
pub fn drain(rx: &mut mpsc::UnboundedReceiver<Notice>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}
