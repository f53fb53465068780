// Service layer: never-failing wrappers over the backend API.
// Every function here substitutes fixture data instead of returning an error.

pub mod completeness;
pub mod homepage;
