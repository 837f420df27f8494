//! Tool definitions module.
//!
//! Each tool is defined in its own file for better maintainability.

pub mod add;
pub mod calculate;
pub mod common;

pub use add::{AddParams, AddTool};
pub use calculate::{CalculateParams, CalculateTool, Operation};
