//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod checkpoint;
pub mod harness;
pub mod http_client;
