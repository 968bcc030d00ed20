pub mod build;
pub mod methods;
pub mod validate;
