//! CrudService: generic CRUD over catalog resources.

mod crud;
mod validation;
pub use crud::CrudService;
pub use validation::RequestValidator;
