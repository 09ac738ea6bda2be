pub mod credentials;
pub mod topics;

pub use credentials::*;
