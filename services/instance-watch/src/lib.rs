pub mod client;
pub mod config;
pub mod pump;
pub mod report;

pub use client::ControlPlaneClient;
pub use config::Config;
