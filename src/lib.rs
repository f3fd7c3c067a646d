//! Onboarding Form — guided profile setup with live validation.

pub mod cli;
pub mod config;
pub mod error;
pub mod navigation;
pub mod onboarding;
pub mod session;
pub mod store;
