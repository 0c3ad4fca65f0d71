pub mod naming;
pub mod validation;
