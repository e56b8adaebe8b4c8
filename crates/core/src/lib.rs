//! Core library: file discovery, fingerprint tactics, batch scheduling.

pub mod classifier;
pub mod config;
pub mod error;
pub mod hasher;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod scanner;
pub mod scheduler;
pub mod strategy;
