pub mod configuration;
pub mod status;
pub mod submit;
