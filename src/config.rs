use std::{net::SocketAddr, path::Path};

use crate::clock::SystemClock;

/// Service configuration, read from the `psnet` section of a YAML file.
#[derive(
    Debug,
    Clone,
    PartialEq,
    typed_builder::TypedBuilder,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(default)]
pub struct Config {
    /// Multiplier applied to wall-clock time. Values above one speed up simulated transfers.
    #[builder(default = 1.0)]
    pub time_dilation: f64,
    /// Address the HTTP server binds to.
    #[builder(default = default_listen())]
    pub listen: SocketAddr,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.time_dilation > 0.0 && self.time_dilation.is_finite()) {
            return Err(Error::InvalidDilation(self.time_dilation));
        }
        Ok(())
    }

    /// Applies command-line values on top of the file contents.
    pub fn apply_overrides(&mut self, listen: Option<SocketAddr>, time_dilation: Option<f64>) {
        if let Some(listen) = listen {
            self.listen = listen;
        }
        if let Some(dilation) = time_dilation {
            self.time_dilation = dilation;
        }
    }

    /// The clock all connections are timed against.
    pub fn clock(&self) -> Result<SystemClock, Error> {
        self.validate()?;
        Ok(SystemClock::new(self.time_dilation))
    }
}

#[derive(Debug, Default, serde::Deserialize)]
struct ConfigFile {
    #[serde(default)]
    psnet: Config,
}

/// Parses a YAML document. A missing `psnet` section or missing keys take their defaults.
pub fn parse_config(s: &str) -> Result<Config, Error> {
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    let file: Option<ConfigFile> = serde_yaml::from_str(s)?;
    let cfg = file.unwrap_or_default().psnet;
    cfg.validate()?;
    Ok(cfg)
}

/// Reads the configuration at `path`, falling back to defaults if the file does not exist.
pub fn read_config(path: impl AsRef<Path>) -> Result<Config, Error> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(s) => parse_config(&s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("no config at {}, using defaults", path.display());
            Ok(Config::default())
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse YAML config")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("time dilation must be positive and finite, got {0}")]
    InvalidDilation(f64),
}
