// Image service: register, replace and delete product images
//
// Coordinates the upload service and the sheet for one row at a time. Callers
// get a report of what ran instead of an error for upstream failures.

pub mod mutation;
pub mod outcome;
pub mod routes;

pub use mutation::{ImageService, ImageSource, RegisterWrite};
pub use outcome::{MutationError, MutationKind, MutationReport, Outcome};
pub use routes::{UploadLimits, UploadMetadata, UploadRoute};
