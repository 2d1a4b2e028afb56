//! Reader protocol vocabulary: memory banks, PC words, filters

pub mod constants;
pub mod filter;
