//! Widget host boundary
//!
//! The host is whoever opened the widget (the account-creation flow, the
//! HTTP session table, the interactive CLI). It receives the confirmed
//! address and close requests, nothing else.

use crate::address::ResolvedAddress;
use tokio::sync::mpsc;

/// Callbacks the resolver invokes on its host
pub trait AddressHost: Send + 'static {
    /// Called exactly once per confirm action, never on cancel
    fn address_selected(&mut self, address: ResolvedAddress);

    /// The widget wants to be closed (after confirm or cancel)
    fn request_close(&mut self);
}

/// Host callbacks as values, for hosts that consume them elsewhere
#[derive(Debug, Clone, PartialEq)]
pub enum HostNotification {
    AddressSelected(ResolvedAddress),
    RequestClose,
}

impl AddressHost for mpsc::UnboundedSender<HostNotification> {
    fn address_selected(&mut self, address: ResolvedAddress) {
        let _ = self.send(HostNotification::AddressSelected(address));
    }

    fn request_close(&mut self) {
        let _ = self.send(HostNotification::RequestClose);
    }
}

/// Create a channel-backed host and the receiver for its notifications
pub fn channel_host() -> (
    mpsc::UnboundedSender<HostNotification>,
    mpsc::UnboundedReceiver<HostNotification>,
) {
    mpsc::unbounded_channel()
}
