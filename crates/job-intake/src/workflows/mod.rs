pub mod applications;
pub mod form;
pub mod validation;
pub mod wizard;
