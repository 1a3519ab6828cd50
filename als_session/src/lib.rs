//! Session layer over a TSL2591-class ambient light sensor.
//!
//! The register protocol and the two-wire bus stay inside an external
//! driver, abstracted here as [`AlsDriver`]. This crate owns everything on
//! top of it: applying a gain/integration-time configuration, programming
//! the window threshold interrupt, polling readings and interpreting the
//! latched interrupt status.
use log::{debug, trace};
use std::fmt::Debug;

mod types;
pub use types::{
    Gain, IntegrationTime, InterruptConfig, Persist, Reading, SessionError, StatusFlags,
};

/// Contract of the external sensor driver.
///
/// Implementors own the bus handle, which is supplied at their
/// construction; none of these operations expose it. The driver powers on
/// with a gain of 25x and a 100ms integration time.
pub trait AlsDriver {
    type Error: Debug;

    /// Handshake with the device. `Ok(false)` means the bus answered but no
    /// sensor is present.
    fn begin(&mut self) -> Result<bool, Self::Error>;

    /// Device identification byte
    fn id(&mut self) -> Result<u8, Self::Error>;

    fn set_gain(&mut self, gain: Gain) -> Result<(), Self::Error>;

    fn gain(&mut self) -> Result<Gain, Self::Error>;

    fn set_timing(&mut self, timing: IntegrationTime) -> Result<(), Self::Error>;

    fn timing(&mut self) -> Result<IntegrationTime, Self::Error>;

    /// One combined reading: infrared channel in the high 16 bits, full
    /// spectrum channel in the low 16 bits. Blocks until the current
    /// integration window has produced data, up to the configured
    /// integration time.
    fn full_luminosity(&mut self) -> Result<u32, Self::Error>;

    /// Illuminance from the two raw channels, per the driver's calibration
    /// curve.
    fn calculate_lux(&self, full_spectrum: u16, infrared: u16) -> f32;

    /// Raw latched status byte
    fn status(&mut self) -> Result<u8, Self::Error>;

    fn clear_interrupt(&mut self) -> Result<(), Self::Error>;

    /// Program the window threshold interrupt on the full spectrum channel.
    fn register_interrupt(
        &mut self,
        lower: u16,
        upper: u16,
        persist: Persist,
    ) -> Result<(), Self::Error>;
}

/// Exclusive session over one ambient light sensor.
///
/// The driver is owned for the lifetime of the session, there is exactly
/// one consumer and no locking discipline.
#[derive(Debug)]
pub struct SensorSession<D> {
    driver: D,
    gain: Gain,
    integration_time: IntegrationTime,
}

impl<D: AlsDriver> SensorSession<D> {
    /// Open a session on the given driver.
    ///
    /// Performs the handshake; an absent sensor is reported as
    /// [`SessionError::SensorUnavailable`] rather than retried or waited
    /// on. On success the session mirrors the driver's power-on defaults
    /// until [`configure`] is called.
    ///
    /// [`configure`]: SensorSession::configure
    pub fn new(driver: D) -> Result<SensorSession<D>, SessionError<D::Error>> {
        let mut session = SensorSession {
            driver,
            gain: Gain::Med,
            integration_time: IntegrationTime::Time100ms,
        };

        if !session.driver.begin()? {
            return Err(SessionError::SensorUnavailable);
        }

        debug!("sensor session opened");
        Ok(session)
    }

    /// End the session, returning the driver so the caller can reclaim the
    /// bus.
    pub fn release(self) -> D {
        self.driver
    }

    /// Apply a gain and integration time.
    ///
    /// Both values come from the enumerated sets the sensor supports, so no
    /// further validation happens here; rejecting an unsupported
    /// combination is the driver's business.
    pub fn configure(
        &mut self,
        gain: Gain,
        timing: IntegrationTime,
    ) -> Result<(), SessionError<D::Error>> {
        self.driver.set_gain(gain)?;
        self.driver.set_timing(timing)?;
        self.gain = gain;
        self.integration_time = timing;

        debug!("configured gain {} and integration time {}", gain, timing);
        Ok(())
    }

    /// Program the window threshold interrupt.
    ///
    /// A window with `lower >= upper` is undefined at the device, so it is
    /// rejected here before any driver call. Any previously latched
    /// interrupt is cleared before the new window is registered.
    pub fn configure_interrupt(
        &mut self,
        config: InterruptConfig,
    ) -> Result<(), SessionError<D::Error>> {
        if config.lower >= config.upper {
            return Err(SessionError::InvalidThresholdWindow {
                lower: config.lower,
                upper: config.upper,
            });
        }

        self.driver.clear_interrupt()?;
        self.driver
            .register_interrupt(config.lower, config.upper, config.persist)?;

        debug!(
            "interrupt window {} to {}, persistence {}",
            config.lower, config.upper, config.persist
        );
        Ok(())
    }

    /// Retrieve one reading.
    ///
    /// May block for up to the configured integration time while the sensor
    /// integrates light. The visible channel is the wrapping difference of
    /// the two raw channels, see [`Reading::visible`].
    pub fn poll(&mut self) -> Result<Reading, SessionError<D::Error>> {
        let combined = self.driver.full_luminosity()?;
        let infrared = (combined >> 16) as u16;
        let full_spectrum = (combined & 0xFFFF) as u16;
        let visible = full_spectrum.wrapping_sub(infrared);
        let lux = self.driver.calculate_lux(full_spectrum, infrared);

        let reading = Reading {
            infrared,
            full_spectrum,
            visible,
            lux,
        };
        trace!(
            "reading {:?} at gain {}, integration time {}",
            reading,
            self.gain,
            self.integration_time
        );
        Ok(reading)
    }

    /// Read the latched interrupt status and clear it at the sensor in one
    /// step, so each call observes only interrupts latched since the
    /// previous one. Leaving the latch set would keep stale flags around
    /// forever.
    pub fn read_status(&mut self) -> Result<StatusFlags, SessionError<D::Error>> {
        let bits = self.driver.status()?;
        self.driver.clear_interrupt()?;
        Ok(StatusFlags::from_bits(bits))
    }

    /// Gain currently configured on the sensor, answered by the driver
    /// rather than the session's own mirror.
    pub fn gain(&mut self) -> Result<Gain, SessionError<D::Error>> {
        Ok(self.driver.gain()?)
    }

    /// Integration time currently configured on the sensor.
    pub fn integration_time(&mut self) -> Result<IntegrationTime, SessionError<D::Error>> {
        Ok(self.driver.timing()?)
    }

    /// Device identification byte, as reported by the driver.
    pub fn device_id(&mut self) -> Result<u8, SessionError<D::Error>> {
        Ok(self.driver.id()?)
    }
}
