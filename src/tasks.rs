//! Polling task bodies
//!
//! Generic loops for the band's producers. Board bring-up wraps these
//! in `#[embassy_executor::task]` functions with concrete bus types and
//! spawns one per sensor; each runs independently. Every stream outcome
//! is treated as best-effort: a disconnected peer or a failed send
//! never interrupts a sensing or storage duty.

use embassy_time::{Duration, Instant, Timer};
use embedded_hal_async::spi::SpiDevice;
use heapless::String;
use log::{info, warn};

use crate::adapters::w25n01::{FlashError, W25n01, PAGES_PER_BLOCK};
use crate::domain::MAX_LINE_LEN;
use crate::ports::link::NotificationLink;
use crate::ports::sensor::{SensorError, SensorPort};
use crate::stream::StreamSender;

/// Thermometer cadence
pub const THERMOMETER_INTERVAL: Duration = Duration::from_secs(1);
/// IMU cadence
pub const INERTIAL_INTERVAL: Duration = Duration::from_millis(200);
/// Pulse-oximeter FIFO poll cadence
pub const PULSE_INTERVAL: Duration = Duration::from_millis(50);
/// Electrodermal cadence (4 Hz)
pub const ELECTRODERMAL_INTERVAL: Duration = Duration::from_millis(250);
/// Flash self-check cadence
pub const FLASH_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Poll `sensor` forever, pushing each rendered measurement line
/// through the stream.
///
/// Initialize the adapter (probe, configure) before handing it over;
/// sampling errors are logged and the loop keeps its cadence.
pub async fn run_sampler<L, S>(
    sender: StreamSender<'_, L>,
    sensor: &mut S,
    interval: Duration,
) -> !
where
    L: NotificationLink,
    S: SensorPort,
{
    info!("{} sampler started", sensor.kind().as_str());
    loop {
        match sensor.sample().await {
            Ok(measurement) => {
                let mut line: String<MAX_LINE_LEN> = String::new();
                measurement.render_line(Instant::now().as_millis(), &mut line);
                let _ = sender.send(line.as_bytes()).await;
            }
            // An empty FIFO is a normal idle cycle.
            Err(SensorError::NotReady) => {}
            Err(error) => warn!("{} sample failed: {:?}", sensor.kind().as_str(), error),
        }
        Timer::after(interval).await;
    }
}

/// Block used by the flash self-check; block 0 holds the parameter
/// page and is left alone.
const CHECK_BLOCK: u32 = 1;
const CHECK_PAGE: u32 = CHECK_BLOCK * PAGES_PER_BLOCK;
const CHECK_PATTERN: &[u8] = b"HELLO NAND";

/// Exercise the NAND part forever: erase, program, read back, verify,
/// every [`FLASH_CHECK_INTERVAL`]. Results go to the log stream.
pub async fn run_flash_check<SPI: SpiDevice>(flash: &mut W25n01<SPI>) -> ! {
    // Give the observer time to connect before the first cycle.
    Timer::after(Duration::from_secs(8)).await;

    let bring_up = async {
        flash.reset().await?;
        flash.disable_protection().await
    };
    if let Err(error) = bring_up.await {
        warn!("flash bring-up failed: {:?}", error);
        loop {
            Timer::after(Duration::from_secs(3600)).await;
        }
    }
    info!("flash self-check armed (block {}, every 30s)", CHECK_BLOCK);

    loop {
        match check_cycle(flash).await {
            Ok(true) => info!("flash self-check: PASS"),
            Ok(false) => warn!("flash self-check: FAIL (pattern mismatch)"),
            Err(error) => warn!("flash self-check aborted: {:?}", error),
        }
        Timer::after(FLASH_CHECK_INTERVAL).await;
    }
}

async fn check_cycle<SPI: SpiDevice>(flash: &mut W25n01<SPI>) -> Result<bool, FlashError> {
    flash.erase_block(CHECK_PAGE).await?;
    flash.program_page(CHECK_PAGE, CHECK_PATTERN).await?;
    flash.load_page(CHECK_PAGE).await?;

    let mut readback = [0u8; 16];
    flash.read_buffer(0, &mut readback).await?;
    Ok(&readback[..CHECK_PATTERN.len()] == CHECK_PATTERN)
}
