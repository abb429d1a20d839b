//! Edges of the command-line driver: CSV cart input, JSON order output and
//! console-backed navigation and notifications.

pub mod console;
pub mod csv;
pub mod json;
