//! Chunked sender for the notification stream
//!
//! Segments an arbitrary-length message into notification frames sized
//! to the link's negotiated capacity and transmits them in order, with
//! bounded retry on transient backpressure and a cooperative yield
//! between frames.

use embassy_futures::yield_now;
use embassy_time::{Duration, Timer};

use crate::ports::link::{LinkError, NotificationLink};
use crate::stream::LogStream;

/// Tuning for the chunked sender.
///
/// The defaults are the values the transport was tuned with on hardware;
/// both the retry bound and the backoff interval are deployment knobs,
/// not protocol constants.
#[derive(Clone, Copy, Debug, defmt::Format)]
pub struct StreamConfig {
    /// Notification attempts per frame before the transient-full
    /// condition escalates to a hard failure.
    pub retry_limit: u32,
    /// Sleep between attempts while the link reports it is full.
    pub retry_backoff: Duration,
    /// Frame size used when the link has no connection-specific
    /// capacity value (the 23-byte default ATT MTU minus its 3-byte
    /// notification header).
    pub fallback_chunk: usize,
}

impl StreamConfig {
    pub const DEFAULT: Self = Self {
        retry_limit: 10,
        retry_backoff: Duration::from_millis(5),
        fallback_chunk: 20,
    };
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Hard transport failure partway through a message.
///
/// `written` is the number of bytes delivered by the frames that
/// completed before the failing one; it is always strictly less than
/// the message length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct SendError {
    /// Bytes accepted by the link before the failure.
    pub written: usize,
}

/// Cheap, copyable handle pairing a [`LogStream`] with the link it
/// delivers over. Every producer (polling task, log pump, ad-hoc
/// caller) holds one.
pub struct StreamSender<'a, L: NotificationLink> {
    stream: &'a LogStream<L::Peer>,
    link: &'a L,
}

impl<'a, L: NotificationLink> Clone for StreamSender<'a, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, L: NotificationLink> Copy for StreamSender<'a, L> {}

impl<'a, L: NotificationLink> StreamSender<'a, L> {
    pub(crate) fn new(stream: &'a LogStream<L::Peer>, link: &'a L) -> Self {
        Self { stream, link }
    }

    /// The stream context this sender delivers for.
    pub fn stream(&self) -> &'a LogStream<L::Peer> {
        self.stream
    }

    /// Deliver `data` to the subscribed peer as an ordered sequence of
    /// notification frames.
    ///
    /// Returns the number of bytes accepted: `data.len()` on full
    /// delivery, `0` when the input is empty or no subscribed peer is
    /// connected (an expected state, not an error). A hard transport
    /// failure aborts the remaining frames and reports the bytes that
    /// made it out in [`SendError::written`].
    ///
    /// The whole message holds the stream's message lock, so frames of
    /// concurrent messages never interleave on the wire; per-call frame
    /// order is the only ordering guarantee.
    pub async fn send(&self, data: &[u8]) -> Result<usize, SendError> {
        if data.is_empty() {
            return Ok(0);
        }

        let _message = self.stream.message_lock.lock().await;

        let Some(peer) = self.stream.delivery_peer() else {
            return Ok(0);
        };

        // Capacity is re-queried on every message so a value negotiated
        // on a previous connection is never reused.
        let capacity = self.link.payload_capacity(&peer);
        let chunk = if capacity == 0 {
            self.stream.config.fallback_chunk
        } else {
            capacity
        };

        // The cache reflects this message from here on, whatever the
        // delivery outcome.
        self.stream.record_last(data);

        let mut written = 0;
        for frame in data.chunks(chunk) {
            let mut attempts = 0;
            loop {
                match self.link.notify(&peer, frame).await {
                    Ok(()) => break,
                    Err(LinkError::Full) => {
                        attempts += 1;
                        if attempts >= self.stream.config.retry_limit {
                            return Err(SendError { written });
                        }
                        Timer::after(self.stream.config.retry_backoff).await;
                    }
                    Err(_) => return Err(SendError { written }),
                }
            }
            written += frame.len();
            // Give other ready tasks the quantum before the next frame.
            yield_now().await;
        }

        Ok(written)
    }
}
