#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod protocol;
pub mod units;
pub mod values;
