// Model-side CRUD operations: the trait an entity implements to be served

pub mod traits;

pub use traits::{CrudModel, DEFAULT_ALLOWED_METHODS};
