use serde::{Deserialize, Serialize};

/// Seats per section in the reference deployment
pub const DEFAULT_SECTION_CAPACITY: u32 = 20;

/// One named section and how many seats it holds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionLayout {
    pub name: String,
    pub capacity: u32,
}

impl SectionLayout {
    pub fn new(name: impl Into<String>, capacity: u32) -> Self {
        Self {
            name: name.into(),
            capacity,
        }
    }

    /// Sections "A" and "B", twenty seats each
    pub fn default_layout() -> Vec<SectionLayout> {
        vec![
            SectionLayout::new("A", DEFAULT_SECTION_CAPACITY),
            SectionLayout::new("B", DEFAULT_SECTION_CAPACITY),
        ]
    }
}
