#![cfg_attr(not(test), no_std)]

pub mod block;
pub mod config;
pub mod drivers;
pub mod isa;
pub mod logger;
pub mod time;
