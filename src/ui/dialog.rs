//! Modal dialog subsystem.
//!
//! `DialogHost::show_dialog` registers a request and hands back a
//! [`DialogReply`], a future that resolves to exactly one boolean once the
//! user answers. The UI renders [`DialogHost::current`] and forwards clicks
//! to [`DialogHost::respond`]. Requests issued while another dialog is open
//! wait in FIFO order.

use super::markup;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Warning,
    Error,
    Info,
    Confirm,
}

impl DialogKind {
    pub fn default_title(&self) -> &'static str {
        match self {
            DialogKind::Warning => "Warning",
            DialogKind::Error => "Error",
            DialogKind::Info => "Info",
            DialogKind::Confirm => "Confirm",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            DialogKind::Warning => "⚠",
            DialogKind::Error => "❌",
            DialogKind::Info => "ℹ",
            DialogKind::Confirm => "❓",
        }
    }

    /// Result produced by a user action on a dialog of this kind.
    ///
    /// Only confirm dialogs can be answered negatively; every other kind is
    /// acknowledged by any action, including a backdrop click.
    pub fn resolve(&self, action: DialogAction) -> bool {
        match (self, action) {
            (DialogKind::Confirm, DialogAction::Affirm) => true,
            (DialogKind::Confirm, _) => false,
            _ => true,
        }
    }
}

/// User action that closes a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Affirm,
    Cancel,
    Backdrop,
}

#[derive(Debug, Clone, Default)]
pub struct DialogOptions {
    /// Overrides the kind-derived title
    pub title: Option<String>,
}

impl DialogOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        DialogOptions { title: Some(title.into()) }
    }
}

/// Render-ready snapshot of the front dialog. Title and message are escaped markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogView {
    pub id: u64,
    pub kind: DialogKind,
    pub icon: &'static str,
    pub title: String,
    pub message: String,
    pub affirm_label: &'static str,
    pub cancel_label: Option<&'static str>,
}

struct PendingDialog {
    id: u64,
    kind: DialogKind,
    title: String,
    message: String,
    reply: oneshot::Sender<bool>,
}

#[derive(Default)]
struct DialogQueue {
    next_id: u64,
    pending: VecDeque<PendingDialog>,
}

/// Shared handle to the dialog queue; clones address the same queue.
#[derive(Clone, Default)]
pub struct DialogHost {
    queue: Arc<Mutex<DialogQueue>>,
}

impl DialogHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DialogQueue> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Open a dialog. The request is queued immediately; awaiting the reply
    /// suspends only the caller.
    pub fn show_dialog(&self, kind: DialogKind, message: impl Into<String>, options: DialogOptions) -> DialogReply {
        let (tx, rx) = oneshot::channel();
        let message = message.into();
        let title = options.title.unwrap_or_else(|| kind.default_title().to_string());

        let mut queue = self.lock();
        queue.next_id += 1;
        let id = queue.next_id;
        log::debug!("[Dialog] Open #{} {:?}: {}", id, kind, message);
        queue.pending.push_back(PendingDialog { id, kind, title, message, reply: tx });

        DialogReply { kind, rx }
    }

    pub fn alert(&self, message: impl Into<String>) -> DialogReply {
        self.show_dialog(DialogKind::Warning, message, DialogOptions::default())
    }

    pub fn error(&self, message: impl Into<String>) -> DialogReply {
        self.show_dialog(DialogKind::Error, message, DialogOptions::default())
    }

    pub fn info(&self, message: impl Into<String>) -> DialogReply {
        self.show_dialog(DialogKind::Info, message, DialogOptions::default())
    }

    pub fn confirm(&self, message: impl Into<String>) -> DialogReply {
        self.show_dialog(DialogKind::Confirm, message, DialogOptions::default())
    }

    /// The dialog that should be on screen, if any.
    pub fn current(&self) -> Option<DialogView> {
        let queue = self.lock();
        queue.pending.front().map(|d| {
            let is_confirm = d.kind == DialogKind::Confirm;
            DialogView {
                id: d.id,
                kind: d.kind,
                icon: d.kind.icon(),
                title: markup::escape(&d.title),
                message: markup::escape(&d.message),
                affirm_label: if is_confirm { "OK" } else { "Got it" },
                cancel_label: if is_confirm { Some("Cancel") } else { None },
            }
        })
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_open(&self) -> bool {
        !self.lock().pending.is_empty()
    }

    /// Answer the front dialog. Returns the delivered result, or `None` when
    /// no dialog is open.
    pub fn respond(&self, action: DialogAction) -> Option<bool> {
        let dialog = self.lock().pending.pop_front()?;
        let result = dialog.kind.resolve(action);
        log::debug!("[Dialog] Close #{} via {:?} -> {}", dialog.id, action, result);
        // The caller may have stopped waiting; nothing else to do then.
        let _ = dialog.reply.send(result);
        Some(result)
    }
}

/// Deferred result of one dialog.
///
/// A dialog discarded without an answer resolves like a dismissal: `false`
/// for a confirm, an acknowledgement for every other kind.
pub struct DialogReply {
    kind: DialogKind,
    rx: oneshot::Receiver<bool>,
}

impl Future for DialogReply {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        let dismissed = self.kind.resolve(DialogAction::Backdrop);
        Pin::new(&mut self.rx).poll(cx).map(|result| result.unwrap_or(dismissed))
    }
}
