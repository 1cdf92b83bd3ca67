//! Log sink forwarding the firmware's log stream over the link
//!
//! [`LinkLogSink`] registers as the global `log` sink. Records are
//! formatted in the producer's context into a fixed-size scratch line
//! and pushed into a bounded queue; a pump task drains the queue
//! through the chunked sender. Records that arrive while the queue is
//! full are counted and later reported as a `[DROPPED=N]` marker line
//! instead of their content.
//!
//! The `log` callback runs under hard constraints: it must not block,
//! must not allocate, and nothing reachable from it may emit log
//! records itself (the pump and the sender below it are log-free for
//! that reason; a violation would recurse straight back into this
//! sink).

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Instant;
use heapless::Vec;

use crate::ports::link::NotificationLink;
use crate::stream::sender::StreamSender;

/// Scratch capacity for one formatted record; longer records are
/// silently truncated.
pub const SCRATCH_CAPACITY: usize = 256;

/// Records the queue holds while the pump catches up; arrivals beyond
/// this are dropped and counted.
pub const QUEUE_DEPTH: usize = 16;

type Line = Vec<u8, SCRATCH_CAPACITY>;

/// Byte sink over a fixed line buffer. Overflow is dropped, not an
/// error, so formatting always completes with a truncated line.
struct Scratch<'a>(&'a mut Line);

impl fmt::Write for Scratch<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if self.0.push(byte).is_err() {
                break;
            }
        }
        Ok(())
    }
}

fn level_tag(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "err",
        log::Level::Warn => "wrn",
        log::Level::Info => "inf",
        log::Level::Debug => "dbg",
        log::Level::Trace => "trc",
    }
}

/// The firmware's log backend.
///
/// Const-constructible so it can live in a `static` next to the
/// [`LogStream`](crate::stream::LogStream) it feeds:
///
/// ```ignore
/// static LOG_SINK: LinkLogSink = LinkLogSink::new();
///
/// LOG_SINK.init(log::LevelFilter::Info);
/// spawner.spawn(log_pump_task(sender))?;
/// ```
pub struct LinkLogSink {
    queue: Channel<CriticalSectionRawMutex, Line, QUEUE_DEPTH>,
    dropped: AtomicU32,
}

impl LinkLogSink {
    pub const fn new() -> Self {
        Self {
            queue: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Register this sink as the global logger with the given level.
    ///
    /// Only effective once; later calls (and later registrations by
    /// anything else) are ignored by the `log` crate.
    pub fn init(&'static self, level: log::LevelFilter) {
        #[cfg(not(feature = "std"))]
        critical_section::with(|_| unsafe {
            _ = log::set_logger_racy(self);
            log::set_max_level_racy(level);
        });
        #[cfg(feature = "std")]
        {
            _ = log::set_logger(self);
            log::set_max_level(level);
        }
    }

    /// Records dropped so far because the queue was full. Reset when
    /// the pump reports them.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Forward the next queued record through `sender`, then report
    /// any accumulated drops. Outcomes are swallowed: logging is
    /// best-effort and must never fail a producer.
    pub async fn process_next<L: NotificationLink>(&self, sender: &StreamSender<'_, L>) {
        let line = self.queue.receive().await;
        let _ = sender.send(&line).await;
        self.flush_dropped(sender).await;
    }

    /// Drain records through `sender` forever.
    pub async fn run<L: NotificationLink>(&self, sender: StreamSender<'_, L>) -> ! {
        loop {
            self.process_next(&sender).await;
        }
    }

    /// Emit a `[DROPPED=N]` marker if records were lost since the last
    /// check.
    async fn flush_dropped<L: NotificationLink>(&self, sender: &StreamSender<'_, L>) {
        let count = self.dropped.swap(0, Ordering::AcqRel);
        if count > 0 {
            let mut line = Line::new();
            let _ = write!(Scratch(&mut line), "[DROPPED={}]\r\n", count);
            let _ = sender.send(&line).await;
        }
    }
}

impl Default for LinkLogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for LinkLogSink {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        // Producer context: format into the fixed scratch and hand off
        // without waiting.
        let uptime = Instant::now().as_millis();
        let mut line = Line::new();
        let _ = write!(
            Scratch(&mut line),
            "[{:02}:{:02}:{:02}.{:03}] <{}> {}: {}\r\n",
            uptime / 3_600_000,
            (uptime / 60_000) % 60,
            (uptime / 1_000) % 60,
            uptime % 1_000,
            level_tag(record.level()),
            record.target(),
            record.args()
        );
        if self.queue.try_send(line).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::testutil::MockLink;
    use crate::stream::LogStream;
    use log::Log;

    fn record(level: log::Level, target: &str, args: fmt::Arguments<'_>) -> Line {
        let sink = LinkLogSink::new();
        sink.log(
            &log::Record::builder()
                .level(level)
                .target(target)
                .args(args)
                .build(),
        );
        sink.queue.try_receive().unwrap()
    }

    #[test]
    fn test_record_format() {
        let line = record(log::Level::Info, "pulse", format_args!("sensor up"));
        let text = core::str::from_utf8(&line).unwrap();
        assert!(text.contains("<inf> pulse: sensor up"));
        assert!(text.starts_with('['));
        assert!(text.ends_with("\r\n"));
    }

    #[test]
    fn test_level_tags() {
        let line = record(log::Level::Error, "t", format_args!("x"));
        assert!(core::str::from_utf8(&line).unwrap().contains("<err>"));
        let line = record(log::Level::Warn, "t", format_args!("x"));
        assert!(core::str::from_utf8(&line).unwrap().contains("<wrn>"));
    }

    #[test]
    fn test_oversized_record_is_truncated() {
        let sink = LinkLogSink::new();
        let long = "x".repeat(SCRATCH_CAPACITY * 2);
        sink.log(
            &log::Record::builder()
                .level(log::Level::Info)
                .target("big")
                .args(format_args!("{}", long))
                .build(),
        );
        let line = sink.queue.try_receive().unwrap();
        assert_eq!(line.len(), SCRATCH_CAPACITY);
    }

    #[test]
    fn test_queue_overflow_counts_drops() {
        let sink = LinkLogSink::new();
        for i in 0..(QUEUE_DEPTH + 7) {
            sink.log(
                &log::Record::builder()
                    .level(log::Level::Info)
                    .target("t")
                    .args(format_args!("{}", i))
                    .build(),
            );
        }
        assert_eq!(sink.dropped(), 7);
    }

    #[tokio::test]
    async fn test_pump_forwards_and_reports_drops() {
        let stream: LogStream<()> = LogStream::new();
        stream.on_connect(());
        stream.on_subscription(true);
        let link = MockLink::new(SCRATCH_CAPACITY);
        let sender = stream.sender(&link);

        let sink = LinkLogSink::new();
        for i in 0..(QUEUE_DEPTH + 7) {
            sink.log(
                &log::Record::builder()
                    .level(log::Level::Info)
                    .target("t")
                    .args(format_args!("{}", i))
                    .build(),
            );
        }

        for _ in 0..QUEUE_DEPTH {
            sink.process_next(&sender).await;
        }
        assert_eq!(sink.dropped(), 0);

        // 16 records + 1 marker.
        assert_eq!(link.frames.borrow().len(), QUEUE_DEPTH + 1);
        let wire = link.data.borrow();
        let text = core::str::from_utf8(&wire).unwrap();
        assert!(text.contains("<inf> t: 0"));
        assert!(text.contains("[DROPPED=7]\r\n"));
        assert!(text.contains("<inf> t: 15"));
    }

    #[tokio::test]
    async fn test_pump_swallows_disconnected_sends() {
        let stream: LogStream<()> = LogStream::new();
        let link = MockLink::new(32);
        let sender = stream.sender(&link);

        let sink = LinkLogSink::new();
        sink.log(
            &log::Record::builder()
                .level(log::Level::Info)
                .target("t")
                .args(format_args!("nobody listening"))
                .build(),
        );
        sink.process_next(&sender).await;
        assert_eq!(link.attempts.get(), 0);
    }
}
