pub mod config;
pub mod error;
pub mod scenario;
pub mod transport;

pub use config::DemoConfig;
pub use error::NodeError;
pub use scenario::{run_demo, DemoReport};
pub use transport::Bus;
