pub mod application_service;
pub mod background;
