mod gate;
mod metadata;
mod walk;

pub use gate::{AdmissionGate, DEFAULT_CONCURRENCY, Permit};
pub use metadata::{get_custom_metadata, set_custom_metadata};
pub use walk::Walker;
