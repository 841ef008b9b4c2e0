/// Gallery analysis result produced by the model
///
/// This is the domain side of the wire contract: the model answers with a
/// JSON document that deserializes into `GalleryAnalysis`. Field names are
/// camelCase on the wire to match the declared response schema.

use serde::{Deserialize, Serialize};

/// A model-asserted link between the main image and one other submitted
/// image. All indices refer to the submitted image list (populated slots in
/// slot order), not raw slot positions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Index of the linked image in the submitted list
    pub target_index: usize,
    /// Hotspot position on the main image, percentage of width (0-100)
    pub x: f32,
    /// Hotspot position on the main image, percentage of height (0-100)
    pub y: f32,
    /// Subject center within the target image, percentage of width (0-100)
    pub focus_x: f32,
    /// Subject center within the target image, percentage of height (0-100)
    pub focus_y: f32,
    /// Short label (e.g., "绝美特写")
    pub relationship: String,
    /// Longer narrative for the detail card
    pub interpretation: String,
}

/// The complete analysis of one submitted gallery.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GalleryAnalysis {
    /// Index of the chosen cover image in the submitted list
    pub main_photo_index: usize,
    /// XiaoHongShu-style narrative summary
    pub summary: String,
    /// One entry per non-main image (expected, not enforced)
    pub connections: Vec<Connection>,
}

impl GalleryAnalysis {
    /// Parse from the model's JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check the parsed document against the submitted image list.
    ///
    /// The main index must point at a submitted image, the summary must not
    /// be empty, and every connection must target a submitted image other
    /// than the main one. Coordinates are deliberately not range-checked:
    /// an out-of-range hotspot just lands outside the visible image, which
    /// is harmless.
    pub fn validate(&self, image_count: usize) -> Result<(), String> {
        if self.main_photo_index >= image_count {
            return Err(format!(
                "mainPhotoIndex {} out of range for {} images",
                self.main_photo_index, image_count
            ));
        }
        if self.summary.trim().is_empty() {
            return Err("summary is empty".to_string());
        }
        for conn in &self.connections {
            if conn.target_index >= image_count {
                return Err(format!(
                    "connection targetIndex {} out of range for {} images",
                    conn.target_index, image_count
                ));
            }
            if conn.target_index == self.main_photo_index {
                return Err(format!(
                    "connection targetIndex {} is the main image",
                    conn.target_index
                ));
            }
        }
        Ok(())
    }
}
