//! Core library for the job-board matching service: domain model, store
//! seams, the recommendation engine, and the swipe session workflow.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
