pub mod route;
pub mod validation;
