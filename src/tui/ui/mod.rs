//! Shared rendering helpers

pub mod layout;
pub mod theme;

// vim: ts=4
