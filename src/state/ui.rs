//! Transient UI feedback state (notices).
//!
//! DESIGN
//! ======
//! Notices carry a sequence number so the same message raised twice in a row
//! is still observable as a new notice, while an unchanged state is not.

#[cfg(test)]
#[path = "ui_test.rs"]
mod ui_test;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub seq: u64,
    pub kind: NoticeKind,
    pub message: String,
}

/// UI feedback state provided via context as `RwSignal<UiState>`.
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub notice: Option<Notice>,
    pub notice_seq: u64,
    pub busy: bool,
}

impl UiState {
    /// Replace the visible notice with a new one.
    pub fn push_notice(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notice_seq += 1;
        self.notice = Some(Notice { seq: self.notice_seq, kind, message: message.into() });
    }

    /// Dismiss the notice with `seq`; a newer notice stays visible.
    pub fn dismiss_notice(&mut self, seq: u64) {
        if self.notice.as_ref().is_some_and(|n| n.seq == seq) {
            self.notice = None;
        }
    }
}
