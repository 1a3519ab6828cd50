//! Fixed cadence polling loop printing readings and latched interrupt
//! status to the console.

use crate::configuration::Configuration;
use als_session::{AlsDriver, SensorSession, SessionError, StatusFlags};
use log::debug;
use std::thread;

/// Configure the session and poll it forever.
///
/// Runs until the process is terminated or the sensor fails; every failure
/// is returned to the caller rather than retried here.
pub fn run<D: AlsDriver>(
    mut session: SensorSession<D>,
    config: &Configuration,
) -> Result<(), SessionError<D::Error>> {
    println!("------------------------------------");
    println!("ID:           {:#04x}", session.device_id()?);

    session.configure(config.gain, config.integration_time)?;

    // Report what the sensor ended up with, not what we asked for.
    println!("Gain:         {}", session.gain()?);
    println!("Timing:       {}", session.integration_time()?);
    println!("------------------------------------");

    session.configure_interrupt(config.interrupt)?;
    println!(
        "Interrupt Threshold Window: {} to {} ({})",
        config.interrupt.lower, config.interrupt.upper, config.interrupt.persist
    );

    loop {
        step(&mut session)?;
        thread::sleep(config.poll_interval);
    }
}

/// One poll plus the coupled status read, with the console lines for both.
fn step<D: AlsDriver>(
    session: &mut SensorSession<D>,
) -> Result<StatusFlags, SessionError<D::Error>> {
    let reading = session.poll()?;
    println!(
        "IR: {}  Full: {}  Visible: {}  Lux: {:.4}",
        reading.infrared, reading.full_spectrum, reading.visible, reading.lux
    );

    let status = session.read_status()?;
    debug!("status byte {:#04x}", status.bits());
    if status.als_interrupt() {
        println!("ALS interrupt latched");
    }
    if status.no_persist_interrupt() {
        println!("No-persist interrupt latched");
    }

    Ok(status)
}
