pub mod clock;
pub mod config;
pub mod logging;
pub mod server;
pub mod time;
pub mod units;

pub(crate) mod connection;
pub(crate) mod data;
pub(crate) mod error;
pub(crate) mod registry;
pub(crate) mod segment;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use connection::{Connection, ConnectionKey};
pub use data::Progress;
pub use error::Error;
pub use registry::Registry;
pub use segment::{Segment, Segments};
