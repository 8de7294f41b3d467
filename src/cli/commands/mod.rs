pub mod config;
pub mod dispenser;
pub mod export;
pub mod init;
pub mod level;
pub mod log;
pub mod refill;
pub mod schedule;
