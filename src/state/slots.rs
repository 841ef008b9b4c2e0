/// Nine-grid upload slots
///
/// The composer works on a fixed grid of nine slots. Each slot is either
/// empty or holds one ingested image: the picked file's name, its declared
/// MIME type, the base64 transport payload, and a decoded preview handle.
/// Payload and preview always come from the same bytes, so they live
/// together in `SlotImage` and can never get out of sync.

use iced::widget::image::Handle;

/// Number of upload slots in the grid.
pub const SLOT_COUNT: usize = 9;

/// The populated contents of one slot.
///
/// Dropping a `SlotImage` releases its preview handle, so overwriting or
/// clearing a slot frees the previous preview automatically.
#[derive(Debug, Clone)]
pub struct SlotImage {
    /// Filename only (e.g., "IMG_0412.jpg"), for display
    pub file_name: String,
    /// Declared MIME type sent to the model (e.g., "image/jpeg")
    pub mime_type: String,
    /// Base64 payload of the raw file bytes (no data-URL prefix)
    pub encoded: String,
    /// Pixel dimensions, (0, 0) if the bytes could not be identified
    pub dimensions: (u32, u32),
    /// Decoded preview for the grid and the annotated post
    pub preview: Handle,
}

/// One of the nine fixed upload positions.
#[derive(Debug, Clone)]
pub struct ImageSlot {
    index: usize,
    content: Option<SlotImage>,
}

impl ImageSlot {
    fn empty(index: usize) -> Self {
        ImageSlot { index, content: None }
    }

    /// Stable identity, "slot-0" through "slot-8"
    pub fn id(&self) -> String {
        format!("slot-{}", self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn content(&self) -> Option<&SlotImage> {
        self.content.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }
}

/// The fixed collection of nine slots. Slots are created empty at startup
/// and are never reordered; only their contents change.
#[derive(Debug, Clone)]
pub struct SlotStore {
    slots: Vec<ImageSlot>,
}

impl Default for SlotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotStore {
    pub fn new() -> Self {
        SlotStore {
            slots: (0..SLOT_COUNT).map(ImageSlot::empty).collect(),
        }
    }

    /// Replace the contents of one slot. The previous contents (and its
    /// preview handle) are dropped first. Out-of-bounds indices are a
    /// silent no-op.
    pub fn set(&mut self, index: usize, image: SlotImage) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.content = Some(image);
        }
    }

    /// Reset one slot to empty, dropping its preview handle.
    pub fn clear(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            if slot.content.take().is_some() {
                println!("🧹 Cleared {}", slot.id());
            }
        }
    }

    /// Reset all nine slots to empty.
    pub fn clear_all(&mut self) {
        for slot in &mut self.slots {
            slot.content = None;
        }
        println!("🧹 Cleared all slots");
    }

    /// Fill slots 0..n in order from a batch pick. At most nine images are
    /// taken; slots beyond the batch keep their prior contents. Overwritten
    /// slots drop their old contents before taking the new image.
    pub fn bulk_set(&mut self, images: Vec<SlotImage>) {
        for (index, image) in images.into_iter().take(SLOT_COUNT).enumerate() {
            self.set(index, image);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageSlot> {
        self.slots.iter()
    }

    /// Populated slot contents in slot order. This is the exact image list
    /// submitted to analysis, so indices returned by the model index into
    /// this view.
    pub fn populated(&self) -> Vec<&SlotImage> {
        self.slots.iter().filter_map(|s| s.content()).collect()
    }

    pub fn populated_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }
}
