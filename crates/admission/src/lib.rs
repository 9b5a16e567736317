//! Admission pool determination, eligibility rules and submission confirmation elements.

pub mod calendar;
pub mod config;
pub mod error;
pub mod inscription;
pub mod telemetry;
