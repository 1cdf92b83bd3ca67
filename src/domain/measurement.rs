//! Measurement domain entities
//!
//! This module defines the core domain entities for sensor measurements.
//! It has no knowledge of how measurements are transported or logged.

use core::fmt::Write;

use heapless::String;

/// Maximum rendered line length for a single measurement.
///
/// The inertial measurement renders as two lines and is the longest.
pub const MAX_LINE_LEN: usize = 192;

/// A single measurement from one of the band's sensors.
///
/// Each variant carries both the converted value and the raw register
/// data it came from, so rendered lines can show both.
#[derive(Clone, Copy, Debug, PartialEq, defmt::Format)]
pub enum Measurement {
    /// Skin temperature from the digital thermometer
    Temperature {
        /// Temperature in Celsius
        celsius: f32,
        /// Raw 16-bit register value
        raw: u16,
    },
    /// Accelerometer + gyroscope sample from the IMU
    Inertial {
        /// Acceleration in milli-g, X/Y/Z
        accel_mg: [i32; 3],
        /// Angular rate in milli-degrees-per-second, X/Y/Z
        gyro_mdps: [i32; 3],
        /// Raw accelerometer counts, X/Y/Z
        accel_raw: [i16; 3],
        /// Raw gyroscope counts, X/Y/Z
        gyro_raw: [i16; 3],
    },
    /// One photoplethysmography frame (red/infrared/green channels)
    Pulse {
        /// 18-bit red channel sample
        red: u32,
        /// 18-bit infrared channel sample
        ir: u32,
        /// 18-bit green channel sample
        green: u32,
        /// FIFO samples still pending after this frame
        pending: u8,
    },
    /// Electrodermal activity voltage sample
    Electrodermal {
        /// Raw signed ADC counts
        raw: i16,
        /// Converted value in millivolts
        millivolts: i32,
        /// Change in raw counts since the previous sample
        delta: i16,
        /// True when the signal has been flat long enough to suggest a
        /// disconnected electrode
        flatline: bool,
    },
}

impl Measurement {
    /// Render this measurement as the line(s) pushed over the stream.
    ///
    /// Output is CRLF-terminated. Anything past the buffer capacity is
    /// silently truncated.
    pub fn render_line(&self, uptime_ms: u64, out: &mut String<MAX_LINE_LEN>) {
        let _ = match *self {
            Measurement::Temperature { celsius, raw } => write!(
                out,
                "[AS6221] t={:.2} C | raw={} | uptime={} ms\r\n",
                celsius, raw, uptime_ms
            ),
            Measurement::Inertial {
                accel_mg: a,
                gyro_mdps: g,
                accel_raw: ar,
                gyro_raw: gr,
            } => write!(
                out,
                "[LSM6DSO] G RAW [{:6} {:6} {:6}] mdps [{:6} {:6} {:6}]\r\n\
                 [LSM6DSO] A RAW [{:6} {:6} {:6}]  mg [{:6} {:6} {:6}]\r\n",
                gr[0], gr[1], gr[2], g[0], g[1], g[2], ar[0], ar[1], ar[2], a[0], a[1], a[2]
            ),
            Measurement::Pulse {
                red,
                ir,
                green,
                pending,
            } => write!(
                out,
                "PPG FIFO | RED={} | IR={} | GREEN={} | avail={}\r\n",
                red, ir, green, pending
            ),
            Measurement::Electrodermal {
                raw,
                millivolts,
                delta,
                flatline,
            } => write!(
                out,
                "EDA t={}ms raw={} mv={} dRaw={}{}\r\n",
                uptime_ms,
                raw,
                millivolts,
                delta,
                if flatline { " FLATLINE" } else { "" }
            ),
        };
    }
}

/// Sensor identifier (memory-efficient representation)
///
/// Uses a single byte to identify sensors, with predefined constants
/// for the sensors populated on the band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct SensorKind(pub u8);

impl SensorKind {
    /// AS6221 digital thermometer
    pub const THERMOMETER: SensorKind = SensorKind(0);

    /// LSM6DSO inertial measurement unit
    pub const INERTIAL: SensorKind = SensorKind(1);

    /// MAX30101 pulse oximeter
    pub const PULSE: SensorKind = SensorKind(2);

    /// ADS1113 electrodermal activity front-end
    pub const ELECTRODERMAL: SensorKind = SensorKind(3);

    /// Test/mock sensor
    pub const TEST: SensorKind = SensorKind(255);

    /// Create a new sensor kind from a raw value
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the string representation of this sensor kind
    pub const fn as_str(&self) -> &'static str {
        match self.0 {
            0 => "as6221",
            1 => "lsm6dso",
            2 => "max30101",
            3 => "ads1113",
            255 => "test",
            _ => "unknown",
        }
    }

    /// Get the raw ID value
    pub const fn value(&self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_line() {
        let m = Measurement::Temperature {
            celsius: 25.5,
            raw: 2550,
        };
        let mut line = String::new();
        m.render_line(1234, &mut line);
        assert_eq!(
            line.as_str(),
            "[AS6221] t=25.50 C | raw=2550 | uptime=1234 ms\r\n"
        );
    }

    #[test]
    fn test_inertial_renders_two_lines() {
        let m = Measurement::Inertial {
            accel_mg: [0, 0, 1000],
            gyro_mdps: [0, 0, 0],
            accel_raw: [0, 0, 16393],
            gyro_raw: [0, 0, 0],
        };
        let mut line = String::new();
        m.render_line(0, &mut line);
        assert_eq!(line.matches("\r\n").count(), 2);
        assert!(line.starts_with("[LSM6DSO] G RAW"));
        assert!(line.contains("[LSM6DSO] A RAW"));
    }

    #[test]
    fn test_flatline_suffix() {
        let m = Measurement::Electrodermal {
            raw: 100,
            millivolts: 12,
            delta: 0,
            flatline: true,
        };
        let mut line = String::new();
        m.render_line(5000, &mut line);
        assert!(line.ends_with(" FLATLINE\r\n"));
    }

    #[test]
    fn test_sensor_kind_names() {
        assert_eq!(SensorKind::THERMOMETER.as_str(), "as6221");
        assert_eq!(SensorKind::new(42).as_str(), "unknown");
    }
}
