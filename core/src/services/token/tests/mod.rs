//! Token lifecycle tests against the in-memory repositories

mod common;
mod issuer_tests;
mod recycling_tests;
mod rotation_tests;
