pub mod flatten;
pub mod sheets;
