pub mod diagnose;
pub mod inquiries;
