use als_session::SensorSession;
use lux_monitor::configuration::Configuration;
use lux_monitor::{monitor, sim::SimulatedSensor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => Configuration::from_file(path)?,
        None => Configuration::default(),
    };

    println!("Starting luminosity monitor");

    // Bench profile sweeping through the interrupt window from both sides,
    // so both in-window and out-of-window cycles show up on the console.
    let sensor = SimulatedSensor::triangle(config.interrupt.upper.saturating_add(500), 100);

    // An absent sensor surfaces here as an error and a nonzero exit.
    let session = SensorSession::new(sensor)?;

    monitor::run(session, &config)?;
    Ok(())
}
