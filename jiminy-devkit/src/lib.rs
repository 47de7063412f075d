/*!
# Jiminy DevKit - Stubs et Utilitaires pour Développement

Bibliothèque facilitant le développement autour du kernel Jiminy avec:
- Stub MQTT pour tests sans broker
- Builders de paquets du protocole `<CMD|ARG|...>`
- Simulation de devices répondant aux sondes
*/

pub mod mqtt_stub;
pub mod test_utils;

pub use mqtt_stub::{MockMqttClient, PacketBuilder};
pub use test_utils::{init_test_logging, FakeDevice};
