//! Gas price estimation

pub mod oracle;

pub use oracle::*;
