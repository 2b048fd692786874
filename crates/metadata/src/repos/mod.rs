//! Repository traits for metadata operations.

pub mod catalog;
pub mod enrollments;
pub mod progress;
pub mod users;

pub use catalog::CatalogRepo;
pub use enrollments::EnrollmentRepo;
pub use progress::{ProgressRepo, ProgressUpdate};
pub use users::UserRepo;
