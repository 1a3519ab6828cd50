use std::fmt;
use thiserror::Error;

/// Available gains for the sensor
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Gain {
    /// gain of 1x
    Low,
    /// gain of 25x
    Med,
    /// gain of 428x
    High,
    /// gain of 9876x
    Max,
}

impl Gain {
    /// Analog amplification applied to the photodiode signal before
    /// digitization.
    pub fn multiplier(&self) -> f32 {
        match *self {
            Gain::Low => 1.0,
            Gain::Med => 25.0,
            Gain::High => 428.0,
            Gain::Max => 9876.0,
        }
    }
}

impl fmt::Display for Gain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Gain::Low => write!(f, "LOW (1x)"),
            Gain::Med => write!(f, "MED (25x)"),
            Gain::High => write!(f, "HIGH (428x)"),
            Gain::Max => write!(f, "MAX (9876x)"),
        }
    }
}

/// Available integration times for the sensor. Longer times trade latency
/// for sensitivity in low light.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IntegrationTime {
    /// 100ms integration time
    Time100ms,
    /// 200ms integration time
    Time200ms,
    /// 300ms integration time
    Time300ms,
    /// 400ms integration time
    Time400ms,
    /// 500ms integration time
    Time500ms,
    /// 600ms integration time
    Time600ms,
}

impl IntegrationTime {
    pub fn as_millis(&self) -> u64 {
        match *self {
            IntegrationTime::Time100ms => 100,
            IntegrationTime::Time200ms => 200,
            IntegrationTime::Time300ms => 300,
            IntegrationTime::Time400ms => 400,
            IntegrationTime::Time500ms => 500,
            IntegrationTime::Time600ms => 600,
        }
    }

    /// Map a duration in milliseconds to its setting, `None` when the
    /// sensor has no such step.
    pub fn from_millis(ms: u64) -> Option<IntegrationTime> {
        let timing = match ms {
            100 => IntegrationTime::Time100ms,
            200 => IntegrationTime::Time200ms,
            300 => IntegrationTime::Time300ms,
            400 => IntegrationTime::Time400ms,
            500 => IntegrationTime::Time500ms,
            600 => IntegrationTime::Time600ms,
            _ => return None,
        };
        Some(timing)
    }
}

impl fmt::Display for IntegrationTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}ms", self.as_millis())
    }
}

/// Number of consecutive out-of-window samples required before the ALS
/// interrupt latches, used for debouncing light level changes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Persist {
    /// Latch on every cycle, whether or not the sample left the window
    Every,
    /// Latch on any sample outside the window
    Any,
    Samples2,
    Samples3,
    Samples5,
    Samples10,
    Samples15,
    Samples20,
    Samples25,
    Samples30,
    Samples35,
    Samples40,
    Samples45,
    Samples50,
    Samples55,
    Samples60,
}

impl Persist {
    /// Debounce count enforced by the sensor. `Every` does not look at the
    /// window at all, `Any` fires on the first excursion.
    pub fn consecutive_samples(&self) -> u16 {
        match *self {
            Persist::Every => 0,
            Persist::Any => 1,
            Persist::Samples2 => 2,
            Persist::Samples3 => 3,
            Persist::Samples5 => 5,
            Persist::Samples10 => 10,
            Persist::Samples15 => 15,
            Persist::Samples20 => 20,
            Persist::Samples25 => 25,
            Persist::Samples30 => 30,
            Persist::Samples35 => 35,
            Persist::Samples40 => 40,
            Persist::Samples45 => 45,
            Persist::Samples50 => 50,
            Persist::Samples55 => 55,
            Persist::Samples60 => 60,
        }
    }

    /// Map a debounce count to its setting, `None` when the sensor has no
    /// such step.
    pub fn from_samples(samples: u16) -> Option<Persist> {
        let persist = match samples {
            0 => Persist::Every,
            1 => Persist::Any,
            2 => Persist::Samples2,
            3 => Persist::Samples3,
            5 => Persist::Samples5,
            10 => Persist::Samples10,
            15 => Persist::Samples15,
            20 => Persist::Samples20,
            25 => Persist::Samples25,
            30 => Persist::Samples30,
            35 => Persist::Samples35,
            40 => Persist::Samples40,
            45 => Persist::Samples45,
            50 => Persist::Samples50,
            55 => Persist::Samples55,
            60 => Persist::Samples60,
            _ => return None,
        };
        Some(persist)
    }
}

impl fmt::Display for Persist {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Persist::Every => write!(f, "every cycle"),
            Persist::Any => write!(f, "any sample"),
            other => write!(f, "{} samples", other.consecutive_samples()),
        }
    }
}

/// One complete retrieval from the sensor: both raw channels, the derived
/// visible channel and the computed illuminance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Infrared channel, raw 16-bit count
    pub infrared: u16,
    /// IR + visible channel, raw 16-bit count
    pub full_spectrum: u16,
    /// Difference between the full spectrum and infrared channels. The
    /// subtraction wraps when `infrared` exceeds `full_spectrum`; such a
    /// reading means the two channels disagree and should be treated as
    /// suspect rather than silently clamped.
    pub visible: u16,
    /// Illuminance computed by the driver from the two raw channels
    pub lux: f32,
}

/// Window threshold interrupt settings. A full spectrum sample outside
/// `[lower, upper]` is a candidate trigger; the interrupt latches once
/// `persist` consecutive candidates have been seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptConfig {
    pub lower: u16,
    pub upper: u16,
    pub persist: Persist,
}

const STATUS_ALS_INTERRUPT: u8 = 0x10;
const STATUS_NO_PERSIST_INTERRUPT: u8 = 0x20;

/// Latched interrupt status, produced fresh on each [`read_status`] call.
///
/// [`read_status`]: crate::SensorSession::read_status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFlags(u8);

impl StatusFlags {
    pub fn from_bits(bits: u8) -> StatusFlags {
        StatusFlags(bits)
    }

    /// Raw status byte as reported by the sensor
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// The window threshold interrupt latched (bit 4)
    pub fn als_interrupt(&self) -> bool {
        self.0 & STATUS_ALS_INTERRUPT != 0
    }

    /// The no-persist interrupt latched (bit 5)
    pub fn no_persist_interrupt(&self) -> bool {
        self.0 & STATUS_NO_PERSIST_INTERRUPT != 0
    }

    pub fn is_clear(&self) -> bool {
        self.0 & (STATUS_ALS_INTERRUPT | STATUS_NO_PERSIST_INTERRUPT) == 0
    }
}

/// Errors when driving the sensor session
#[derive(Debug, Error)]
pub enum SessionError<E: fmt::Debug> {
    /// No device answered the handshake on the bus
    #[error("no ambient light sensor answered the handshake")]
    SensorUnavailable,
    /// Threshold window rejected before reaching the driver
    #[error("invalid threshold window: lower bound {lower} is not below upper bound {upper}")]
    InvalidThresholdWindow { lower: u16, upper: u16 },
    /// Errors that occur inside the driver collaborator
    #[error("sensor driver error: {0:?}")]
    Driver(E),
}

impl<E: fmt::Debug> From<E> for SessionError<E> {
    fn from(err: E) -> SessionError<E> {
        SessionError::Driver(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_steps_round_trip() {
        for &samples in &[0, 1, 2, 3, 5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60] {
            let persist = Persist::from_samples(samples).unwrap();
            assert_eq!(persist.consecutive_samples(), samples);
        }
        assert_eq!(Persist::from_samples(4), None);
        assert_eq!(Persist::from_samples(61), None);
    }

    #[test]
    fn integration_time_steps_round_trip() {
        for &ms in &[100, 200, 300, 400, 500, 600] {
            assert_eq!(IntegrationTime::from_millis(ms).unwrap().as_millis(), ms);
        }
        assert_eq!(IntegrationTime::from_millis(150), None);
    }

    #[test]
    fn status_bits_are_independent() {
        let als = StatusFlags::from_bits(0x10);
        assert!(als.als_interrupt() && !als.no_persist_interrupt());

        let no_persist = StatusFlags::from_bits(0x20);
        assert!(!no_persist.als_interrupt() && no_persist.no_persist_interrupt());

        assert!(StatusFlags::from_bits(0x00).is_clear());
        // The valid bit does not count as a latched interrupt.
        assert!(StatusFlags::from_bits(0x01).is_clear());
    }
}
