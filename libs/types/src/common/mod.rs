//! Common identifier and observation types

pub mod errors;
pub mod observation;
pub mod password;
pub mod reference;
