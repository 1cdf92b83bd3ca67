//! BLE GATT adapter for the notification link
//!
//! Implements the NotificationLink port on top of a `trouble-host`
//! GATT server: one service with a single characteristic that carries
//! the chunked text stream as notifications and serves the last sent
//! buffer to reads.
//!
//! Board bring-up owns the controller and the host stack:
//!
//! ```ignore
//! static RESOURCES: StaticCell<BandResources<MyController>> = StaticCell::new();
//! let (stack, peripheral, _central, runner) =
//!     trouble_host::new(controller, RESOURCES.init(BandResources::new(PacketQos::None)))
//!         .set_random_address(address)
//!         .build();
//!
//! static STREAM: LogStream<Connection<'static>> = LogStream::new();
//! let link = GattLink::new("bandlink")?;
//! // spawn host_task(runner) and advertise_loop(...), then hand
//! // STREAM.sender(&link) to the producers.
//! ```

use embassy_time::{Duration, Timer};
use trouble_host::prelude::*;

use crate::ports::link::{LinkError, NotificationLink};
use crate::stream::{LogStream, LAST_VALUE_CAPACITY};

/// The band talks to one observing client at a time.
pub const CONNECTIONS_MAX: usize = 1;

/// Signalling + ATT
pub const L2CAP_CHANNELS_MAX: usize = 2;

/// L2CAP packet size; the negotiated ATT MTU is this minus 4.
pub const L2CAP_MTU: usize = 251;

/// Notification payload bound: L2CAP MTU less the 4-byte L2CAP header
/// and the 3-byte ATT notification header.
pub const NOTIFY_CAPACITY: usize = L2CAP_MTU - 4 - 3;

/// Host resources sized for the band's single-peer profile.
pub type BandResources<C> = HostResources<C, CONNECTIONS_MAX, L2CAP_CHANNELS_MAX, L2CAP_MTU>;

#[gatt_server]
pub struct LogServer {
    pub log: LogStreamService,
}

/// Log stream service
#[gatt_service(uuid = "9f7b0000-6c35-4d2c-9c85-4a8c1a2b3c4d")]
pub struct LogStreamService {
    /// Chunked text stream; notify for push delivery, read for the
    /// most recent buffer
    #[characteristic(uuid = "9f7b0001-6c35-4d2c-9c85-4a8c1a2b3c4d", read, notify)]
    pub stream: heapless::Vec<u8, NOTIFY_CAPACITY>,
}

/// GATT-backed notification link
pub struct GattLink<'d> {
    server: LogServer<'d>,
}

impl GattLink<'static> {
    /// Build the GATT server with the log service registered.
    pub fn new(name: &'static str) -> Result<Self, Error> {
        let server = LogServer::new_with_config(GapConfig::Peripheral(PeripheralConfig {
            name,
            appearance: &appearance::watch::GENERIC_WATCH,
        }))?;
        Ok(Self { server })
    }

    pub fn server(&self) -> &LogServer<'static> {
        &self.server
    }
}

impl NotificationLink for GattLink<'static> {
    type Peer = Connection<'static>;

    /// Advertising is owned by [`advertise_loop`]; constructing the
    /// server is all the one-time setup this adapter needs.
    async fn enable(&self) -> Result<(), LinkError> {
        Ok(())
    }

    fn payload_capacity(&self, _peer: &Connection<'static>) -> usize {
        NOTIFY_CAPACITY
    }

    async fn notify(
        &self,
        peer: &Connection<'static>,
        frame: &[u8],
    ) -> Result<(), LinkError> {
        let mut value: heapless::Vec<u8, NOTIFY_CAPACITY> = heapless::Vec::new();
        let n = frame.len().min(NOTIFY_CAPACITY);
        let _ = value.extend_from_slice(&frame[..n]);
        self.server
            .notify(&self.server.log.stream, peer, &value)
            .await
            .map_err(|_| LinkError::Failed)
    }
}

/// Advertise, accept one connection at a time, and feed its lifecycle
/// into the stream context until it drops.
pub async fn advertise_loop<C: Controller>(
    name: &str,
    link: &GattLink<'static>,
    stream: &LogStream<Connection<'static>>,
    peripheral: &mut Peripheral<'static, C>,
) -> ! {
    loop {
        match advertise(name, peripheral).await {
            Ok(conn) => {
                stream.on_connect(conn.clone());
                serve_connection(link, stream, &conn).await;
                stream.on_disconnect();
            }
            Err(_) => Timer::after(Duration::from_secs(1)).await,
        }
    }
}

/// Run the host stack. Spawn once next to the advertise loop.
pub async fn host_task<C: Controller>(mut runner: Runner<'static, C>) -> ! {
    loop {
        if runner.run().await.is_err() {
            Timer::after(Duration::from_secs(1)).await;
        }
    }
}

async fn advertise<'d, C: Controller>(
    name: &str,
    peripheral: &mut Peripheral<'d, C>,
) -> Result<Connection<'d>, BleHostError<C::Error>> {
    let mut adv_data = [0u8; 31];
    let len = AdStructure::encode_slice(
        &[
            AdStructure::Flags(LE_GENERAL_DISCOVERABLE | BR_EDR_NOT_SUPPORTED),
            AdStructure::CompleteLocalName(name.as_bytes()),
        ],
        &mut adv_data[..],
    )?;
    let advertiser = peripheral
        .advertise(
            &Default::default(),
            Advertisement::ConnectableScannableUndirected {
                adv_data: &adv_data[..len],
                scan_data: &[],
            },
        )
        .await?;
    let conn = advertiser.accept().await?;
    Ok(conn)
}

/// Process GATT traffic for one connection. Subscription toggles are
/// forwarded from CCCD writes; the readable value is refreshed from
/// the last-value cache after each processed event, so a read observes
/// the cache as of the previous event.
async fn serve_connection(
    link: &GattLink<'static>,
    stream: &LogStream<Connection<'static>>,
    conn: &Connection<'static>,
) {
    loop {
        match conn.next().await {
            ConnectionEvent::Disconnected { reason: _ } => break,
            ConnectionEvent::Gatt { data } => {
                if let Ok(Some(GattEvent::Write(event))) = data.process(&link.server).await {
                    if Some(event.handle()) == link.server.log.stream.cccd_handle {
                        let enabled = event.data().first().is_some_and(|b| b & 0x01 != 0);
                        stream.on_subscription(enabled);
                    }
                }

                let mut value: heapless::Vec<u8, NOTIFY_CAPACITY> = heapless::Vec::new();
                let _ = value.resize_default(LAST_VALUE_CAPACITY);
                let n = stream.read_last(&mut value);
                value.truncate(n);
                let _ = link.server.set(&link.server.log.stream, &value);
            }
        }
    }
}
