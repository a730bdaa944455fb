//! Trispin - spinning triangle demo
//!
//! Library surface for the binary's support modules, exposed so the
//! integration tests can exercise configuration loading.

pub mod config;
