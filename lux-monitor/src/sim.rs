//! In-process stand-in for the hardware sensor.
//!
//! Cycles through a fixed sequence of full spectrum levels and models the
//! window threshold interrupt engine, so the monitor loop and the
//! persistence behavior can run on machines without the device attached.

use als_session::{AlsDriver, Gain, IntegrationTime, Persist};
use std::convert::Infallible;

/// Identification byte reported by the simulated device.
pub const DEVICE_ID: u8 = 0x50;

const STATUS_ALS_INTERRUPT: u8 = 0x10;

#[derive(Debug)]
pub struct SimulatedSensor {
    present: bool,
    levels: Vec<u16>,
    cursor: usize,
    gain: Gain,
    timing: IntegrationTime,
    window: Option<(u16, u16, Persist)>,
    out_of_window_run: u16,
    status: u8,
}

impl SimulatedSensor {
    /// Sensor cycling through the given full spectrum levels, one per poll.
    pub fn new(levels: Vec<u16>) -> SimulatedSensor {
        let levels = if levels.is_empty() { vec![0] } else { levels };

        SimulatedSensor {
            present: true,
            levels,
            cursor: 0,
            gain: Gain::Med,
            timing: IntegrationTime::Time100ms,
            window: None,
            out_of_window_run: 0,
            status: 0,
        }
    }

    /// A device that never answers the handshake.
    pub fn absent() -> SimulatedSensor {
        SimulatedSensor {
            present: false,
            ..SimulatedSensor::new(Vec::new())
        }
    }

    /// Light profile ramping from darkness up to `peak` and back, so a
    /// threshold window placed anywhere in between is crossed from both
    /// sides.
    pub fn triangle(peak: u16, step: u16) -> SimulatedSensor {
        let step = step.max(1);
        let mut levels = Vec::new();

        let mut level = 0u16;
        while level < peak {
            levels.push(level);
            level = level.saturating_add(step).min(peak);
        }
        levels.push(peak);

        let mut level = peak.saturating_sub(step);
        while level > 0 {
            levels.push(level);
            level = level.saturating_sub(step);
        }

        SimulatedSensor::new(levels)
    }

    fn advance(&mut self) -> u16 {
        let level = self.levels[self.cursor];
        self.cursor = (self.cursor + 1) % self.levels.len();
        level
    }

    // The device evaluates the window once per ALS cycle. Clearing the
    // latch does not reset the run counter: while the light level stays
    // outside the window, the condition re-latches on the next cycle.
    fn update_interrupt(&mut self, sample: u16) {
        let (lower, upper, persist) = match self.window {
            Some(window) => window,
            None => return,
        };

        if let Persist::Every = persist {
            self.status |= STATUS_ALS_INTERRUPT;
            return;
        }

        if sample < lower || sample > upper {
            self.out_of_window_run = self.out_of_window_run.saturating_add(1);
            if self.out_of_window_run >= persist.consecutive_samples() {
                self.status |= STATUS_ALS_INTERRUPT;
            }
        } else {
            self.out_of_window_run = 0;
        }
    }
}

impl AlsDriver for SimulatedSensor {
    type Error = Infallible;

    fn begin(&mut self) -> Result<bool, Infallible> {
        Ok(self.present)
    }

    fn id(&mut self) -> Result<u8, Infallible> {
        Ok(DEVICE_ID)
    }

    fn set_gain(&mut self, gain: Gain) -> Result<(), Infallible> {
        self.gain = gain;
        Ok(())
    }

    fn gain(&mut self) -> Result<Gain, Infallible> {
        Ok(self.gain)
    }

    fn set_timing(&mut self, timing: IntegrationTime) -> Result<(), Infallible> {
        self.timing = timing;
        Ok(())
    }

    fn timing(&mut self) -> Result<IntegrationTime, Infallible> {
        Ok(self.timing)
    }

    fn full_luminosity(&mut self) -> Result<u32, Infallible> {
        let full = self.advance();
        // Fixed channel ratio, enough for a bench profile.
        let infrared = full / 3;
        self.update_interrupt(full);

        Ok((infrared as u32) << 16 | full as u32)
    }

    fn calculate_lux(&self, full_spectrum: u16, infrared: u16) -> f32 {
        // Counts-per-lux scaling in the shape of the usual empirical
        // formula. Not a calibration, just plausible magnitudes.
        let cpl = (self.timing.as_millis() as f32 * self.gain.multiplier()) / 408.0;
        (full_spectrum as f32 - infrared as f32) / cpl
    }

    fn status(&mut self) -> Result<u8, Infallible> {
        Ok(self.status)
    }

    fn clear_interrupt(&mut self) -> Result<(), Infallible> {
        self.status = 0;
        Ok(())
    }

    fn register_interrupt(
        &mut self,
        lower: u16,
        upper: u16,
        persist: Persist,
    ) -> Result<(), Infallible> {
        self.window = Some((lower, upper, persist));
        self.out_of_window_run = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use als_session::{InterruptConfig, SensorSession, SessionError};

    fn session_with_window(
        levels: Vec<u16>,
        persist: Persist,
    ) -> SensorSession<SimulatedSensor> {
        let mut session = SensorSession::new(SimulatedSensor::new(levels)).unwrap();
        session
            .configure_interrupt(InterruptConfig {
                lower: 100,
                upper: 1500,
                persist,
            })
            .unwrap();
        session
    }

    #[test]
    fn absent_device_fails_the_handshake() {
        let err = SensorSession::new(SimulatedSensor::absent()).unwrap_err();
        assert!(matches!(err, SessionError::SensorUnavailable));
    }

    #[test]
    fn stays_clear_while_samples_are_in_window() {
        let mut session = session_with_window(vec![800], Persist::Any);

        for _ in 0..10 {
            session.poll().unwrap();
        }
        assert!(session.read_status().unwrap().is_clear());
    }

    #[test]
    fn any_latches_on_the_first_excursion() {
        let mut session = session_with_window(vec![2000], Persist::Any);

        session.poll().unwrap();
        assert!(session.read_status().unwrap().als_interrupt());

        // Cleared by the read, nothing new latched since.
        assert!(session.read_status().unwrap().is_clear());
    }

    #[test]
    fn latches_only_after_the_persistence_run() {
        let mut session = session_with_window(vec![2000], Persist::Samples5);

        for _ in 0..4 {
            session.poll().unwrap();
        }
        assert!(session.read_status().unwrap().is_clear());

        session.poll().unwrap();
        assert!(session.read_status().unwrap().als_interrupt());
    }

    #[test]
    fn an_in_window_sample_resets_the_run() {
        let levels = vec![2000, 2000, 800, 2000, 2000, 2000];
        let mut session = session_with_window(levels, Persist::Samples3);

        for _ in 0..5 {
            session.poll().unwrap();
        }
        assert!(session.read_status().unwrap().is_clear());

        // Third consecutive excursion since the reset.
        session.poll().unwrap();
        assert!(session.read_status().unwrap().als_interrupt());
    }

    #[test]
    fn every_latches_regardless_of_the_window() {
        let mut session = session_with_window(vec![800], Persist::Every);

        session.poll().unwrap();
        assert!(session.read_status().unwrap().als_interrupt());
    }

    #[test]
    fn triangle_profile_sweeps_up_and_back_down() {
        let mut sensor = SimulatedSensor::triangle(500, 250);

        let full: Vec<u16> = (0..5)
            .map(|_| (sensor.full_luminosity().unwrap() & 0xFFFF) as u16)
            .collect();
        assert_eq!(full, vec![0, 250, 500, 250, 0]);
    }

    #[test]
    fn combined_reading_carries_infrared_in_the_high_half() {
        let mut sensor = SimulatedSensor::new(vec![900]);

        let combined = sensor.full_luminosity().unwrap();
        assert_eq!(combined & 0xFFFF, 900);
        assert_eq!(combined >> 16, 300);
    }
}
