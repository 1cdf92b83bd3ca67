//! Notification link port - abstraction for the wireless log stream
//!
//! This trait allows the streaming core to push notification frames
//! without knowing the specific radio stack (BLE GATT, mock, etc.)

/// Error type for link operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum LinkError {
    /// Transmit buffering temporarily exhausted; expected to clear shortly
    Full,
    /// The peer went away while the frame was being queued
    Detached,
    /// Any other transport-level failure
    Failed,
}

/// Port for the connection-oriented notification channel
///
/// The link delivers individual frames of at most `payload_capacity`
/// bytes to the peer identified by a stack-owned handle. Segmentation,
/// retry and ordering live above this port in the streaming core.
///
/// # Example Implementation
///
/// ```ignore
/// struct GattLink<'a> {
///     server: &'a Server<'a>,
/// }
///
/// impl NotificationLink for GattLink<'_> {
///     type Peer = Connection;
///
///     async fn enable(&self) -> Result<(), LinkError> {
///         // start connectable advertising
///     }
///
///     fn payload_capacity(&self, peer: &Connection) -> usize {
///         peer.att_mtu().saturating_sub(ATT_HEADER_LEN)
///     }
///
///     async fn notify(&self, peer: &Connection, frame: &[u8]) -> Result<(), LinkError> {
///         self.server.notify(&self.stream_handle, peer, frame).await
///     }
/// }
/// ```
pub trait NotificationLink {
    /// Handle to the remote peer.
    ///
    /// Cloning must be cheap (a ref-counted stack handle); dropping the
    /// last clone releases the stack's reference.
    type Peer: Clone;

    /// Bring the wireless stack up and start connectable advertising.
    ///
    /// Called once at startup before any producer is started.
    fn enable(&self) -> impl core::future::Future<Output = Result<(), LinkError>>;

    /// Maximum payload a single notification frame may carry for `peer`.
    ///
    /// Queried at send time so a renegotiated value is never cached
    /// stale across reconnects. Returns 0 when no connection-specific
    /// value is available; the sender then falls back to its configured
    /// minimum.
    fn payload_capacity(&self, peer: &Self::Peer) -> usize;

    /// Queue one notification frame for transmission.
    ///
    /// `LinkError::Full` is the transient backpressure signal; any other
    /// error is terminal for the frame.
    fn notify(
        &self,
        peer: &Self::Peer,
        frame: &[u8],
    ) -> impl core::future::Future<Output = Result<(), LinkError>>;
}
