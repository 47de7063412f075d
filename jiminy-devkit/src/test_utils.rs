/*!
Utilitaires de test pour le kernel Jiminy

- Init logging pour les tests (best-effort, idempotent)
- FakeDevice : device simulé qui répond aux sondes `<PING>` avec un
  compteur croissant, comme le ferait un device réel du parc.
*/

use crate::mqtt_stub::PacketBuilder;

/// Init logging pour tests, sans paniquer si déjà initialisé
pub fn init_test_logging() {
    env_logger::try_init().ok();
}

/// Device simulé : répond à chaque sonde par un PONG au compteur croissant
pub struct FakeDevice {
    id: String,
    count: i64,
}

impl FakeDevice {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self { id: id.into(), count: 0 }
    }

    /// Réaction à un paquet broadcast : un `<PING>` produit la réponse
    /// `<PONG|id|n>`, tout autre paquet est ignoré (None)
    pub fn handle_probe(&mut self, raw: &str) -> Option<String> {
        if raw != "<PING>" {
            return None;
        }
        self.count += 1;
        Some(PacketBuilder::pong(self.id.clone(), self.count))
    }

    pub fn count(&self) -> i64 {
        self.count
    }
}
