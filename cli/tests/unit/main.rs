//! Unit tests for the adirf CLI
//!
//! Services run against an in-memory device, so these tests are fast and
//! need neither a phone nor the network.

mod installer_service;
mod property_tests;
mod reconciler_service;
mod resolver_service;
