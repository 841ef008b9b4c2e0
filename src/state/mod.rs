/// State management module
///
/// This module handles all application state, including:
/// - The nine-grid upload slots (slots.rs)
/// - The model-produced gallery analysis (analysis.rs)

pub mod analysis;
pub mod slots;
