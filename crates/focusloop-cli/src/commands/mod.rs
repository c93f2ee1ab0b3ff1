pub mod config;
pub mod stats;
pub mod tags;
pub mod timer;
