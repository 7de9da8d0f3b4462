// Element name registry
// Maps the names of packed pixel formats to their layout metadata

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::types::{DataKind, DataType};

/// Layout metadata of a registered element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementInfo {
    pub kind: DataKind,
    pub data_type: DataType,
    pub normalized: bool,
    /// 1 for scalar elements, the component count for vector elements
    pub vector_size: u32,
}

impl ElementInfo {
    pub const fn new(kind: DataKind, data_type: DataType, normalized: bool, vector_size: u32) -> Self {
        Self {
            kind,
            data_type,
            normalized,
            vector_size,
        }
    }

    pub fn is_primitive(&self) -> bool {
        self.vector_size == 1
    }
}

/// Compiled-in element table
pub const ELEMENT_TABLE: &[(&str, ElementInfo)] = &[
    ("rs_pixel_l", ElementInfo::new(DataKind::PixelL, DataType::Unsigned8, true, 1)),
    ("rs_pixel_a", ElementInfo::new(DataKind::PixelA, DataType::Unsigned8, true, 1)),
    ("rs_pixel_la", ElementInfo::new(DataKind::PixelLA, DataType::Unsigned8, true, 2)),
    ("rs_pixel_rgb", ElementInfo::new(DataKind::PixelRGB, DataType::Unsigned8, true, 3)),
    ("rs_pixel_rgba", ElementInfo::new(DataKind::PixelRGBA, DataType::Unsigned8, true, 4)),
    ("rs_pixel_rgb565", ElementInfo::new(DataKind::PixelRGB, DataType::Unsigned565, true, 1)),
    ("rs_pixel_rgba5551", ElementInfo::new(DataKind::PixelRGBA, DataType::Unsigned5551, true, 1)),
    ("rs_pixel_rgba4444", ElementInfo::new(DataKind::PixelRGBA, DataType::Unsigned4444, true, 1)),
];

static ELEMENT_REGISTRY: OnceLock<ElementRegistry> = OnceLock::new();

/// Read-only table from element names to [`ElementInfo`]
#[derive(Debug, Clone)]
pub struct ElementRegistry {
    elements: HashMap<String, ElementInfo>,
}

impl ElementRegistry {
    /// Builds the process-wide registry from [`ELEMENT_TABLE`] on the first
    /// call and returns it. Later calls, from any thread, return the same
    /// instance.
    pub fn initialize() -> &'static ElementRegistry {
        ELEMENT_REGISTRY.get_or_init(|| Self::from_table(ELEMENT_TABLE))
    }

    /// The process-wide registry, if it was initialized
    pub fn global() -> Option<&'static ElementRegistry> {
        ELEMENT_REGISTRY.get()
    }

    /// Builds a standalone registry. When a name repeats, the first entry
    /// is kept.
    pub fn from_table(table: &[(&str, ElementInfo)]) -> Self {
        let mut elements: HashMap<String, ElementInfo> = HashMap::with_capacity(table.len());
        for (name, info) in table {
            if elements.contains_key(*name) {
                log::warn!("duplicate element '{}' ignored", name);
                continue;
            }
            elements.insert(name.to_string(), *info);
        }
        log::debug!("element registry built with {} entries", elements.len());
        Self { elements }
    }

    pub fn lookup(&self, name: &str) -> Option<ElementInfo> {
        self.elements.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.elements.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.elements.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ElementInfo)> + '_ {
        self.elements.iter().map(|(name, info)| (name.as_str(), *info))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Looks `name` up in the process-wide registry, initializing it if needed
pub fn lookup(name: &str) -> Option<ElementInfo> {
    ElementRegistry::initialize().lookup(name)
}
