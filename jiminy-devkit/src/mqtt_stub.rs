/*!
Mock MQTT Client pour développement sans broker

Permet de développer et tester le kernel Jiminy sans démarrer un broker MQTT
réel. Enregistre tous les messages publiés et permet de simuler la réception
de réponses devices.
*/

use anyhow::Result;
use rumqttc::QoS;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct MockMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QoS,
    pub retain: bool,
}

/// Mock MQTT Client qui simule rumqttc::AsyncClient
#[derive(Clone)]
pub struct MockMqttClient {
    published_messages: Arc<Mutex<Vec<MockMessage>>>,
    subscriptions: Arc<Mutex<Vec<String>>>,
    message_sender: Arc<Mutex<Option<mpsc::UnboundedSender<MockMessage>>>>,
}

impl MockMqttClient {
    pub fn new() -> Self {
        Self {
            published_messages: Arc::new(Mutex::new(Vec::new())),
            subscriptions: Arc::new(Mutex::new(Vec::new())),
            message_sender: Arc::new(Mutex::new(None)),
        }
    }

    /// Configuration d'un channel pour recevoir les messages simulés
    pub fn setup_receiver(&self) -> mpsc::UnboundedReceiver<MockMessage> {
        let (sender, receiver) = mpsc::unbounded_channel();
        *self.message_sender.lock().unwrap() = Some(sender);
        receiver
    }

    /// Simule la publication d'un message (compatible avec AsyncClient)
    pub async fn publish<S, V>(&self, topic: S, qos: QoS, retain: bool, payload: V) -> Result<()>
    where
        S: Into<String>,
        V: Into<Vec<u8>>,
    {
        let message = MockMessage {
            topic: topic.into(),
            payload: payload.into(),
            qos,
            retain,
        };

        // Enregistrer le message
        self.published_messages.lock().unwrap().push(message.clone());

        log::info!("📤 [MOCK] Published to {}: {} bytes", message.topic, message.payload.len());
        Ok(())
    }

    /// Simule l'abonnement à un topic (compatible avec AsyncClient)
    pub async fn subscribe<S: Into<String>>(&self, topic: S, _qos: QoS) -> Result<()> {
        let topic = topic.into();
        self.subscriptions.lock().unwrap().push(topic.clone());
        log::info!("📥 [MOCK] Subscribed to {}", topic);
        Ok(())
    }

    /// Simule la réception d'un message (pour tests)
    pub async fn simulate_incoming<S, V>(&self, topic: S, payload: V) -> Result<()>
    where
        S: Into<String>,
        V: Into<Vec<u8>>,
    {
        let message = MockMessage {
            topic: topic.into(),
            payload: payload.into(),
            qos: QoS::AtMostOnce,
            retain: false,
        };

        if let Some(sender) = self.message_sender.lock().unwrap().as_ref() {
            sender.send(message.clone()).map_err(|e| anyhow::anyhow!("Send error: {}", e))?;
        }

        log::info!("📨 [MOCK] Simulated incoming: {}", message.topic);
        Ok(())
    }

    /// Récupère tous les messages publiés (pour assertions de tests)
    pub fn get_published_messages(&self) -> Vec<MockMessage> {
        self.published_messages.lock().unwrap().clone()
    }

    /// Récupère les abonnements (pour assertions de tests)
    pub fn get_subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().unwrap().clone()
    }

    /// Trouve les messages publiés sur un topic donné
    pub fn find_messages_by_topic(&self, topic: &str) -> Vec<MockMessage> {
        self.published_messages
            .lock()
            .unwrap()
            .iter()
            .filter(|msg| msg.topic == topic)
            .cloned()
            .collect()
    }

    /// Dernier paquet texte publié sur un topic (les paquets Jiminy sont UTF-8)
    pub fn last_packet_on(&self, topic: &str) -> Option<String> {
        self.find_messages_by_topic(topic)
            .last()
            .map(|msg| String::from_utf8_lossy(&msg.payload).into_owned())
    }

}

impl Default for MockMqttClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper pour construire des paquets au format du bus Jiminy
pub struct PacketBuilder;

impl PacketBuilder {
    /// Sonde broadcast du kernel, sans argument
    pub fn ping() -> String {
        "<PING>".to_string()
    }

    /// Réponse device : identifiant + compteur
    pub fn pong<S: Into<String>>(device_id: S, count: i64) -> String {
        format!("<PONG|{}|{}>", device_id.into(), count)
    }

    /// Paquet arbitraire, pour tester la tolérance du décodeur
    pub fn raw<S: Into<String>>(cmd: S, args: &[&str]) -> String {
        let cmd = cmd.into();
        if args.is_empty() {
            format!("<{cmd}>")
        } else {
            format!("<{}|{}>", cmd, args.join("|"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_publish_subscribe() {
        let client = MockMqttClient::new();

        // Test abonnement
        client.subscribe("/jiminy/reply", QoS::AtMostOnce).await.unwrap();
        assert_eq!(client.get_subscriptions(), vec!["/jiminy/reply"]);

        // Test publication
        client.publish("/jiminy/c/all", QoS::AtMostOnce, false, PacketBuilder::ping().into_bytes())
            .await
            .unwrap();

        // Vérifier le message publié
        let messages = client.get_published_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].topic, "/jiminy/c/all");
        assert!(!messages[0].retain);
        assert_eq!(client.last_packet_on("/jiminy/c/all").unwrap(), "<PING>");
    }

    #[tokio::test]
    async fn test_simulated_incoming_reaches_receiver() {
        let client = MockMqttClient::new();
        let mut receiver = client.setup_receiver();

        client.simulate_incoming("/jiminy/reply", PacketBuilder::pong("dev1", 3).into_bytes())
            .await
            .unwrap();

        let msg = receiver.try_recv().unwrap();
        assert_eq!(msg.topic, "/jiminy/reply");
        assert_eq!(msg.payload, b"<PONG|dev1|3>");
    }

    #[test]
    fn test_packet_builders() {
        assert_eq!(PacketBuilder::ping(), "<PING>");
        assert_eq!(PacketBuilder::pong("device-42", 17), "<PONG|device-42|17>");
        assert_eq!(PacketBuilder::raw("HELLO", &["a", "b"]), "<HELLO|a|b>");
        assert_eq!(PacketBuilder::raw("NOP", &[]), "<NOP>");
    }
}
