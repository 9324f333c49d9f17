//! Foundation module
//!
//! Vector math helpers and the logging facade shared by the rest of the crate.

pub mod math;
pub mod logging;
