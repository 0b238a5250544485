pub mod cors;

pub use cors::careers_cors;
