//! Hiring workflow: jobs, applicants, interviews, offers and the staff
//! directory, plus the repository seam the HTTP layer is built over.

pub mod auth;
pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{Applicant, Job, Offer, Role, Stage, User};
pub use memory::InMemoryHiringRepository;
pub use repository::{HiringRepository, Page, PageOf};
pub use router::hiring_router;
pub use service::HiringService;

#[cfg(test)]
mod tests;
