//! Applicant-tracking and hiring-workflow service.
//!
//! The crate is split between [`intake`], the public application submission
//! pipeline (spam heuristic, sanitization, upload validation, virus scan
//! adapter), and [`hiring`], the role-scoped CRUD surface over jobs,
//! applicants, offers, interviews, users, events, and notifications.

pub mod config;
pub mod error;
pub mod hiring;
pub mod intake;
pub mod telemetry;
