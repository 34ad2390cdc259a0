pub mod credentials;
pub mod service;
