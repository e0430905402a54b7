//! Sensor service - CRUD persistence for site sensors, plus a gRPC transport
//! bootstrap with optional mutual TLS.
//!
//! This library exposes the core modules for testing and reuse.

pub mod common;
pub mod config;
pub mod entity;
pub mod error;
pub mod routes;
pub mod sensors;
pub mod transport;
