//! Streaming notification transport & logging sink
//!
//! This is the delivery core of the firmware: arbitrary-length byte
//! payloads from multiple concurrent producers (polling tasks, ad-hoc
//! callers, the log pump) are segmented to the link's negotiated
//! capacity and delivered, in order, to at most one subscribed peer.
//!
//! ```text
//! sensor tasks ──┐
//!                ├── StreamSender::send ──► NotificationLink::notify
//! log pump ──────┘         │
//!                          ├── LinkState (peer + subscription, event inbox)
//!                          └── LastValue (pull-read cache)
//! ```
//!
//! All shared state lives in a [`LogStream`] context constructed once
//! at startup (typically in a `static`) and passed by reference to
//! every component; there are no library-level singletons.

pub mod cache;
pub mod link;
pub mod log_sink;
pub mod sender;

pub use cache::LAST_VALUE_CAPACITY;
pub use link::LinkEvent;
pub use log_sink::LinkLogSink;
pub use sender::{SendError, StreamConfig, StreamSender};

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::channel::{Channel, TrySendError};
use embassy_sync::mutex::Mutex;

use crate::ports::link::NotificationLink;
use cache::LastValue;
use link::{LinkState, EVENT_INBOX_DEPTH};

/// Shared context of the notification stream.
///
/// `P` is the radio stack's peer handle type. The struct is
/// const-constructible so it can live in a caller-owned `static`:
///
/// ```ignore
/// static STREAM: LogStream<Connection<'static>> = LogStream::new();
///
/// let sender = STREAM.sender(&gatt_link);
/// spawner.spawn(thermometer_task(sender, ...))?;
/// ```
pub struct LogStream<P: Clone> {
    state: BlockingMutex<CriticalSectionRawMutex, RefCell<LinkState<P>>>,
    events: Channel<CriticalSectionRawMutex, LinkEvent<P>, EVENT_INBOX_DEPTH>,
    /// Held for the duration of one logical message so chunks of
    /// concurrent sends cannot interleave.
    message_lock: Mutex<CriticalSectionRawMutex, ()>,
    last: BlockingMutex<CriticalSectionRawMutex, RefCell<LastValue>>,
    config: StreamConfig,
}

impl<P: Clone> LogStream<P> {
    /// Create a stream context with the default [`StreamConfig`].
    pub const fn new() -> Self {
        Self::with_config(StreamConfig::DEFAULT)
    }

    /// Create a stream context with explicit sender tuning.
    pub const fn with_config(config: StreamConfig) -> Self {
        Self {
            state: BlockingMutex::new(RefCell::new(LinkState::new())),
            events: Channel::new(),
            message_lock: Mutex::new(()),
            last: BlockingMutex::new(RefCell::new(LastValue::new())),
            config,
        }
    }

    /// Pair this context with a link into a producer-facing sender.
    pub fn sender<'a, L>(&'a self, link: &'a L) -> StreamSender<'a, L>
    where
        L: NotificationLink<Peer = P>,
    {
        StreamSender::new(self, link)
    }

    // ------------------------------------------------------------------
    // Lifecycle callbacks (radio adapter side)
    // ------------------------------------------------------------------

    /// A peer connected. Call only for successful connect events;
    /// errored connects must be dropped by the adapter.
    pub fn on_connect(&self, peer: P) {
        self.post(LinkEvent::Connected(peer));
    }

    /// The peer disconnected, for any reason. Also clears the
    /// subscription flag.
    pub fn on_disconnect(&self) {
        self.post(LinkEvent::Disconnected);
    }

    /// The peer toggled notification delivery on the stream
    /// characteristic.
    pub fn on_subscription(&self, enabled: bool) {
        self.post(LinkEvent::Subscribed(enabled));
    }

    /// Post one lifecycle event into the inbox.
    ///
    /// Callback contexts must return quickly, so this never waits: if
    /// the inbox is full, the backlog and the new event are applied
    /// inline under the state lock instead. Either way no event is
    /// lost and application order matches posting order.
    fn post(&self, event: LinkEvent<P>) {
        if let Err(TrySendError::Full(event)) = self.events.try_send(event) {
            self.state.lock(|state| {
                let mut state = state.borrow_mut();
                while let Ok(queued) = self.events.try_receive() {
                    state.apply(queued);
                }
                state.apply(event);
            });
        }
    }

    // ------------------------------------------------------------------
    // State queries
    // ------------------------------------------------------------------

    /// Whether a peer connection is currently held.
    pub fn is_connected(&self) -> bool {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            self.drain_into(&mut state);
            state.is_connected()
        })
    }

    /// Whether the peer has notification delivery enabled.
    pub fn is_subscribed(&self) -> bool {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            self.drain_into(&mut state);
            state.is_subscribed()
        })
    }

    /// Snapshot the peer to deliver to, applying any pending lifecycle
    /// events first. `None` while disconnected or unsubscribed.
    pub(crate) fn delivery_peer(&self) -> Option<P> {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            self.drain_into(&mut state);
            state.delivery_peer()
        })
    }

    fn drain_into(&self, state: &mut LinkState<P>) {
        while let Ok(event) = self.events.try_receive() {
            state.apply(event);
        }
    }

    // ------------------------------------------------------------------
    // Last-value cache
    // ------------------------------------------------------------------

    /// Read the most recently transmitted buffer (truncated to
    /// [`LAST_VALUE_CAPACITY`]) into `out`, returning the byte count.
    pub fn read_last(&self, out: &mut [u8]) -> usize {
        self.last.lock(|last| last.borrow().read_into(out))
    }

    /// Length of the cached buffer.
    pub fn last_len(&self) -> usize {
        self.last.lock(|last| last.borrow().len())
    }

    pub(crate) fn record_last(&self, data: &[u8]) {
        self.last.lock(|last| last.borrow_mut().record(data));
    }
}

impl<P: Clone> Default for LogStream<P> {
    fn default() -> Self {
        Self::new()
    }
}
