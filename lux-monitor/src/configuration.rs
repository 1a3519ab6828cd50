use als_session::{Gain, IntegrationTime, InterruptConfig, Persist};
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs::File, io::BufReader, path::Path};

/// Runtime settings for the monitor, resolved from a JSON file or from the
/// built-in defaults.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub gain: Gain,
    pub integration_time: IntegrationTime,
    pub poll_interval: Duration,
    pub interrupt: InterruptConfig,
}

impl Configuration {
    pub fn from_file<P: AsRef<Path>>(p: P) -> Result<Configuration, Box<dyn std::error::Error>> {
        let file: ConfigurationFile = read_json_from_file(p)?;
        resolve(file)
    }
}

impl Default for Configuration {
    fn default() -> Configuration {
        Configuration {
            gain: Gain::Med,
            integration_time: IntegrationTime::Time300ms,
            poll_interval: Duration::from_millis(500),
            interrupt: InterruptConfig {
                lower: 100,
                upper: 1500,
                persist: Persist::Samples60,
            },
        }
    }
}

fn read_json_from_file<P: AsRef<Path>, T: serde::de::DeserializeOwned>(
    path: P,
) -> Result<T, Box<dyn std::error::Error>> {
    // Open the file in read-only mode with buffer.
    debug!("reading configuration file: {:?}", path.as_ref());
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let t = serde_json::from_reader(reader)?;

    Ok(t)
}

fn resolve(file: ConfigurationFile) -> Result<Configuration, Box<dyn std::error::Error>> {
    let gain = gain_from_name(&file.gain)?;
    let integration_time = IntegrationTime::from_millis(file.integration_time_ms).ok_or_else(
        || -> Box<dyn std::error::Error> {
            format!(
                "unsupported integration time {}ms, expected 100 to 600 in 100ms steps",
                file.integration_time_ms
            )
            .into()
        },
    )?;
    let persist = Persist::from_samples(file.interrupt.persistence).ok_or_else(
        || -> Box<dyn std::error::Error> {
            format!(
                "unsupported persistence {}, the sensor has no such step",
                file.interrupt.persistence
            )
            .into()
        },
    )?;

    Ok(Configuration {
        gain,
        integration_time,
        poll_interval: Duration::from_millis(file.poll_interval_ms),
        interrupt: InterruptConfig {
            lower: file.interrupt.lower_threshold,
            upper: file.interrupt.upper_threshold,
            persist,
        },
    })
}

fn gain_from_name(name: &str) -> Result<Gain, Box<dyn std::error::Error>> {
    match name {
        "low" => Ok(Gain::Low),
        "med" => Ok(Gain::Med),
        "high" => Ok(Gain::High),
        "max" => Ok(Gain::Max),
        other => Err(format!("unsupported gain '{}', expected low, med, high or max", other).into()),
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ConfigurationFile {
    gain: String,
    integration_time_ms: u64,
    poll_interval_ms: u64,
    interrupt: InterruptFile,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct InterruptFile {
    lower_threshold: u16,
    upper_threshold: u16,
    persistence: u16,
}
