/// UI module
///
/// This module builds the screens of the app:
/// - `composer.rs` - the nine-grid uploader (Composing state)
/// - `dashboard.rs` - the annotated post (Reviewing state)
/// - `loading.rs` - the progress screen while analysis is outstanding
/// - `overlay.rs` - canvas programs and geometry for hotspots and framing

pub mod composer;
pub mod dashboard;
pub mod loading;
pub mod overlay;
