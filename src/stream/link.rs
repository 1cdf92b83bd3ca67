//! Connection state for the notification stream
//!
//! The radio stack's lifecycle callbacks do not mutate shared state
//! directly; they post [`LinkEvent`]s into a bounded inbox, and events
//! are applied to [`LinkState`] under the stream's state lock by
//! whichever path next drains the inbox.

/// Depth of the lifecycle-event inbox.
///
/// The radio stack serializes connect/disconnect/subscribe edges, so a
/// short inbox is sufficient; the posting path drains inline if it ever
/// fills (see `LogStream::post`), so no event is lost either way.
pub(crate) const EVENT_INBOX_DEPTH: usize = 8;

/// A connection-lifecycle edge reported by the radio adapter.
#[derive(Clone, Debug)]
pub enum LinkEvent<P> {
    /// A peer connected. The previously held handle (if any) is released.
    Connected(P),
    /// The peer disconnected, for any reason.
    Disconnected,
    /// The peer toggled notification delivery on the stream characteristic.
    Subscribed(bool),
}

/// The single peer connection and its subscription flag.
pub(crate) struct LinkState<P> {
    peer: Option<P>,
    subscribed: bool,
}

impl<P: Clone> LinkState<P> {
    pub(crate) const fn new() -> Self {
        Self {
            peer: None,
            subscribed: false,
        }
    }

    /// Apply one lifecycle edge. These are terminal transitions; there
    /// are no retries.
    pub(crate) fn apply(&mut self, event: LinkEvent<P>) {
        match event {
            // Replacing the option releases any previously held handle.
            LinkEvent::Connected(peer) => self.peer = Some(peer),
            LinkEvent::Disconnected => {
                self.peer = None;
                self.subscribed = false;
            }
            LinkEvent::Subscribed(enabled) => self.subscribed = enabled,
        }
    }

    /// The peer to deliver to, present only while connected and
    /// subscribed.
    pub(crate) fn delivery_peer(&self) -> Option<P> {
        if self.subscribed {
            self.peer.clone()
        } else {
            None
        }
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.peer.is_some()
    }

    pub(crate) fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnect_clears_subscription() {
        let mut state: LinkState<u8> = LinkState::new();
        state.apply(LinkEvent::Connected(1));
        state.apply(LinkEvent::Subscribed(true));
        assert!(state.delivery_peer().is_some());

        state.apply(LinkEvent::Disconnected);
        assert!(!state.is_connected());
        assert!(!state.is_subscribed());
        assert!(state.delivery_peer().is_none());
    }

    #[test]
    fn test_new_connection_supersedes_old() {
        let mut state: LinkState<u8> = LinkState::new();
        state.apply(LinkEvent::Connected(1));
        state.apply(LinkEvent::Connected(2));
        assert_eq!(state.peer, Some(2));
    }

    #[test]
    fn test_subscription_without_connection_does_not_deliver() {
        let mut state: LinkState<u8> = LinkState::new();
        state.apply(LinkEvent::Subscribed(true));
        assert!(state.delivery_peer().is_none());
    }

    #[test]
    fn test_connected_but_unsubscribed_does_not_deliver() {
        let mut state: LinkState<u8> = LinkState::new();
        state.apply(LinkEvent::Connected(7));
        assert!(state.is_connected());
        assert!(state.delivery_peer().is_none());
    }
}
