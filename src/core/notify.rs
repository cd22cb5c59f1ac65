//! # User Notifications
//!
//! The transport reports every failure it raises to a [`Notifier`] before
//! returning it, so call sites don't each need their own user messaging.
//! Front ends plug in whatever surface they have (a toast, a status bar);
//! the default just logs.
//!
//! Only final errors are reported. Retried attempts stay in the log.

use log::error;

pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        error!("{message}");
    }
}
