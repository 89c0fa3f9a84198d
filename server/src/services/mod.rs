//! Generation and storage services behind the HTTP handlers.

pub mod generator;
pub mod storage;
