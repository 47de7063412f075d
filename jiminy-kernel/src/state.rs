use crate::models::{DeviceRecord, DevicesMap};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Registre partagé des devices : lecteurs multiples, écrivain exclusif.
/// Toute exposition externe passe par `snapshot()`, jamais par une référence
/// vivante sur la map interne.
#[derive(Clone)]
pub struct DeviceRegistry {
    inner: Arc<RwLock<DevicesMap>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn get(&self, id: &str) -> Option<DeviceRecord> {
        self.inner.read().get(id).cloned()
    }

    /// Remplace (ou insère) l'enregistrement du device, de façon atomique.
    pub fn set(&self, id: &str, record: DeviceRecord) {
        self.inner.write().insert(id.to_string(), record);
    }

    /// Copie indépendante de l'état courant, figée au moment de l'appel.
    pub fn snapshot(&self) -> DevicesMap {
        self.inner.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
