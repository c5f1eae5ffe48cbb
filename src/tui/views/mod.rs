//! Views of the dashboard

pub mod dashboard;
pub mod help;

// vim: ts=4
