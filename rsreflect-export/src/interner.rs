use dashmap::DashMap;
use std::sync::Arc;

use crate::types::ExportType;

/// Shares one allocation between equal export types
#[derive(Debug, Default)]
pub struct ExportTypeInterner {
    cache: DashMap<ExportType, Arc<ExportType>>,
}

impl ExportTypeInterner {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    pub fn intern(&self, ty: ExportType) -> Arc<ExportType> {
        if let Some(existing) = self.cache.get(&ty) {
            return Arc::clone(existing.value());
        }
        self.cache
            .entry(ty.clone())
            .or_insert_with(|| Arc::new(ty))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
