use crate::packet;
use rumqttc::{AsyncClient, QoS};
use std::time::Duration;
use tokio::task;
use tokio::time::MissedTickBehavior;

/// Émetteur de sondes : publie `<PING>` en broadcast à intervalle fixe,
/// première sonde immédiate. Publication fire-and-forget : un échec est
/// loggé puis la boucle continue, sans retry. La tâche vit jusqu'à la fin
/// du process.
pub fn spawn_probe_emitter(client: AsyncClient, topic: String, period: Duration) {
    task::spawn(async move {
        println!("[probe] sonde toutes les {}s sur {topic}", period.as_secs());
        let mut ticker = probe_schedule(period);
        loop {
            ticker.tick().await;
            let payload = packet::encode("PING", &[]);
            if let Err(e) = client.publish(&topic, QoS::AtMostOnce, false, payload).await {
                eprintln!("[probe] publish failed: {e}");
            }
        }
    });
}

/// Cadence des sondes : le premier tick part immédiatement, les suivants
/// toutes les `period`.
fn probe_schedule(period: Duration) -> tokio::time::Interval {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_payload_is_a_bare_ping() {
        assert_eq!(packet::encode("PING", &[]), "<PING>");
    }

    #[tokio::test(start_paused = true)]
    async fn first_probe_fires_immediately_then_every_period() {
        let start = tokio::time::Instant::now();
        let mut ticker = probe_schedule(Duration::from_secs(10));

        ticker.tick().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        ticker.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(10));

        ticker.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }
}
