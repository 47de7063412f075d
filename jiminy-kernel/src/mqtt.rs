/**
 * BUS MQTT JIMINY - Connexion broker, écoute des réponses devices
 *
 * RÔLE :
 * Ce module porte tout le trafic bus du kernel : création du client MQTT,
 * abonnement au topic de réponse, et ingestion des PONG devices dans le
 * registre partagé.
 *
 * FONCTIONNEMENT :
 * - Topic de réponse (/jiminy/reply) écouté en QoS 0 (at-most-once)
 * - Chaque PONG bien formé écrase l'enregistrement du device émetteur
 * - Paquet malformé = ignoré silencieusement, jamais d'arrêt du traitement
 *
 * UTILITÉ DANS JIMINY :
 * 🎯 Ingestion télémétrie : seul point d'écriture du registre devices
 * 🎯 Tolérance : un device bavard ou bogué ne fait pas tomber le kernel
 */

use crate::config::KernelConfig;
use crate::models::DeviceRecord;
use crate::packet;
use crate::state::DeviceRegistry;
use rumqttc::{AsyncClient, ClientError, Event, EventLoop, Incoming, MqttOptions, QoS};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::task;

/// Échecs du cycle de vie bus que le kernel remonte sans les masquer.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("subscribe {topic} failed: {source}")]
    Subscribe { topic: String, source: ClientError },
    #[error("unsubscribe {topic} failed: {source}")]
    Unsubscribe { topic: String, source: ClientError },
}

/// Client MQTT partagé entre l'écouteur et l'émetteur de sondes.
pub fn create_mqtt_client(cfg: &KernelConfig, client_id: &str) -> (AsyncClient, EventLoop) {
    let mqtt_cfg = cfg.mqtt();
    let mut opts = MqttOptions::new(client_id, &mqtt_cfg.host, mqtt_cfg.port);
    opts.set_keep_alive(Duration::from_secs(15));
    AsyncClient::new(opts, 10)
}

pub async fn subscribe_reply(client: &AsyncClient, topic: &str) -> Result<(), BusError> {
    client
        .subscribe(topic, QoS::AtMostOnce)
        .await
        .map_err(|source| BusError::Subscribe { topic: topic.to_string(), source })
}

pub async fn unsubscribe_reply(client: &AsyncClient, topic: &str) -> Result<(), BusError> {
    client
        .unsubscribe(topic)
        .await
        .map_err(|source| BusError::Unsubscribe { topic: topic.to_string(), source })
}

/// Boucle d'événements MQTT : route les publications du topic de réponse
/// vers `handle_reply`. Une erreur avant la première connexion est fatale
/// (broker injoignable au démarrage) ; ensuite rumqttc retente et on
/// temporise simplement entre deux polls.
pub fn spawn_mqtt_listener(mut eventloop: EventLoop, registry: DeviceRegistry, reply_topic: String) {
    task::spawn(async move {
        let mut connected = false;
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                    connected = true;
                    println!("[mqtt] connecté au broker");
                }
                Ok(Event::Incoming(Incoming::Publish(p))) if p.topic == reply_topic => {
                    handle_reply(&registry, &p.payload);
                }
                Ok(_) => {}
                Err(e) if !connected => {
                    eprintln!("[mqtt] connexion broker impossible: {e:?}");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("[mqtt] erreur: {e:?}");
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    });
}

/// Ingestion d'une réponse device. Une écriture registre par PONG bien
/// formé, aucune sinon ; tout paquet non conforme est jeté sans bruit.
pub fn handle_reply(registry: &DeviceRegistry, payload: &[u8]) {
    let Ok(txt) = std::str::from_utf8(payload) else {
        return;
    };

    let (cmd, args) = packet::decode(txt);
    match cmd.as_str() {
        "PONG" => {
            // <PONG|id|compteur> : accès borné, un PONG tronqué est jeté
            let (Some(id), Some(raw_count)) = (args.first(), args.get(1)) else {
                return;
            };
            let Ok(count) = raw_count.parse::<i64>() else {
                return;
            };
            registry.set(id, DeviceRecord {
                id: id.clone(),
                count,
                last_seen: OffsetDateTime::now_utc(),
            });
            println!("[mqtt] PONG {id} count={count}");
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiminy_devkit::{FakeDevice, MockMqttClient, PacketBuilder};
    use time::OffsetDateTime;

    #[test]
    fn well_formed_pong_updates_registry() {
        let registry = DeviceRegistry::new();
        let before = OffsetDateTime::now_utc();

        handle_reply(&registry, PacketBuilder::pong("dev1", 42).as_bytes());

        let stored = registry.get("dev1").expect("record stored");
        assert_eq!(stored.id, "dev1");
        assert_eq!(stored.count, 42);
        assert!(stored.last_seen >= before);
        assert!(stored.last_seen <= OffsetDateTime::now_utc());
    }

    #[test]
    fn latest_pong_overwrites_previous_state() {
        let registry = DeviceRegistry::new();
        handle_reply(&registry, PacketBuilder::pong("deviceA", 1).as_bytes());
        handle_reply(&registry, PacketBuilder::pong("deviceA", 2).as_bytes());

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("deviceA").unwrap().count, 2);
    }

    #[test]
    fn non_numeric_count_is_discarded() {
        let registry = DeviceRegistry::new();
        handle_reply(&registry, PacketBuilder::pong("dev1", 42).as_bytes());
        let before = registry.get("dev1").unwrap();

        handle_reply(&registry, b"<PONG|dev1|notanumber>");

        assert_eq!(registry.get("dev1").unwrap(), before);
    }

    #[test]
    fn truncated_pong_does_not_panic_nor_write() {
        let registry = DeviceRegistry::new();

        handle_reply(&registry, b"<PONG|dev1>");
        handle_reply(&registry, b"<PONG>");

        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn simulated_probe_reply_cycle_reaches_the_registry() {
        jiminy_devkit::init_test_logging();
        let bus = MockMqttClient::new();
        let mut delivery = bus.setup_receiver();
        let mut device = FakeDevice::new("dev9");
        let registry = DeviceRegistry::new();

        // sonde du kernel sur le broadcast
        bus.publish("/jiminy/c/all", QoS::AtMostOnce, false, packet::encode("PING", &[]).into_bytes())
            .await
            .unwrap();

        // le device voit la sonde et répond sur le topic de réponse
        let probe = bus.last_packet_on("/jiminy/c/all").unwrap();
        let reply = device.handle_probe(&probe).unwrap();
        bus.simulate_incoming("/jiminy/reply", reply.into_bytes()).await.unwrap();

        // livraison bus vers le handler
        while let Ok(msg) = delivery.try_recv() {
            if msg.topic == "/jiminy/reply" {
                handle_reply(&registry, &msg.payload);
            }
        }

        assert_eq!(registry.get("dev9").unwrap().count, 1);
    }

    #[test]
    fn unknown_commands_and_garbage_are_ignored() {
        let registry = DeviceRegistry::new();

        handle_reply(&registry, b"<HELLO|dev1|42>");
        handle_reply(&registry, b"PONG|dev1|42");
        handle_reply(&registry, b"<>");
        handle_reply(&registry, b"");
        handle_reply(&registry, &[0xff, 0xfe, 0x3c]);

        assert!(registry.is_empty());
    }
}
