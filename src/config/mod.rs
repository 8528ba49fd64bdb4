//! Configuration management for the arbitrage bot

pub mod chains;
pub mod settings;

pub use chains::*;
pub use settings::*;

use lazy_static::lazy_static;

lazy_static! {
    pub static ref CONFIG: Config = Config::load();
}
