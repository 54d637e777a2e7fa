pub mod analysis;
pub mod insights;
