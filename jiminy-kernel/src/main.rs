/**
 * JIMINY KERNEL - Point d'entrée du serveur de présence devices
 *
 * RÔLE : Orchestration des modules : config, identité MQTT, bus, sondes, HTTP.
 * Bootstrap complet puis attente d'un signal d'arrêt.
 *
 * ARCHITECTURE : Sonde <PING> broadcast périodique + ingestion des <PONG>
 * devices dans un registre partagé + API REST de consultation.
 * UTILITÉ : Vue temps réel du parc de devices sur le réseau local.
 */

mod config;
mod http;
mod identity;
mod models;
mod mqtt;
mod packet;
mod probe;
mod state;

use crate::http::AppState;
use crate::state::DeviceRegistry;

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};

#[tokio::main]
async fn main() {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    let cfg = config::load_config().await;
    let registry = DeviceRegistry::new();

    // Identité client dérivée de la MAC de la machine
    let client_id = match identity::primary_mac() {
        Ok(mac) => mac,
        Err(e) => {
            eprintln!("[kernel] pas de MAC utilisable ({e}), client id par défaut");
            "jiminy-kernel".to_string()
        }
    };

    let topics = cfg.topics();
    let (client, eventloop) = mqtt::create_mqtt_client(&cfg, &client_id);

    if let Err(e) = mqtt::subscribe_reply(&client, &topics.reply).await {
        eprintln!("[kernel] {e}");
        std::process::exit(1);
    }

    // Le bus remplit le registre ; l'émetteur sonde le parc
    mqtt::spawn_mqtt_listener(eventloop, registry.clone(), topics.reply.clone());
    probe::spawn_probe_emitter(
        client.clone(),
        topics.broadcast.clone(),
        Duration::from_secs(cfg.probe().interval_secs),
    );

    // HTTP
    let app = http::build_router(AppState { registry });
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.http().port));
    println!("[kernel] listening on http://{addr}");
    let listener = TcpListener::bind(addr).await.unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    wait_for_shutdown().await;

    // Désabonnement du topic de réponse ; un échec est signalé mais
    // n'empêche pas l'arrêt
    if let Err(e) = mqtt::unsubscribe_reply(&client, &topics.reply).await {
        eprintln!("[kernel] {e}");
    }
    println!("[kernel] arrêt");
}

async fn wait_for_shutdown() {
    let mut sigint = signal(SignalKind::interrupt()).unwrap();
    let mut sigterm = signal(SignalKind::terminate()).unwrap();

    tokio::select! {
        _ = sigint.recv() => println!("[kernel] SIGINT"),
        _ = sigterm.recv() => println!("[kernel] SIGTERM"),
    }
}
