//! Error types for the menu engine.
//!
//! The engine favors silent rejection over errors for routine UI races
//! (adding an invisible-priority item, selecting an unselectable item,
//! mutating a destroyed menu). The errors here cover the one raised
//! condition: structural misuse by integrating code, caught at
//! construction time.

use std::fmt;

/// Construction-time errors for menu instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    /// The supplied configuration is contradictory or degenerate.
    InvalidConfig(&'static str),
    /// A wrapper was handed a menu that has already been destroyed.
    DestroyedMenu,
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(reason) => write!(f, "Invalid menu configuration: {reason}"),
            Self::DestroyedMenu => write!(f, "Menu has already been destroyed"),
        }
    }
}

impl std::error::Error for MenuError {}

/// A specialized Result type for menu operations.
pub type Result<T> = std::result::Result<T, MenuError>;
