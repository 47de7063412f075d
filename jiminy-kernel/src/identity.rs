//! Client identity for the MQTT connection.
//!
//! The kernel identifies itself to the broker with the MAC address of the
//! first up, non-loopback interface that actually carries one, so that the
//! client id stays stable across restarts of the same machine.

use anyhow::{Context, Result};
use if_addrs::get_if_addrs;

/// MAC address of the first usable interface, formatted `aa:bb:cc:dd:ee:ff`.
pub fn primary_mac() -> Result<String> {
    let if_addrs = get_if_addrs().context("failed to enumerate network interfaces")?;

    for if_addr in if_addrs {
        if if_addr.is_loopback() {
            continue;
        }
        match mac_address::mac_address_by_name(&if_addr.name) {
            Ok(Some(mac)) => {
                let b = mac.bytes();
                return Ok(format!(
                    "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
                    b[0], b[1], b[2], b[3], b[4], b[5]
                ));
            }
            Ok(None) => continue,
            Err(_) => continue,
        }
    }

    anyhow::bail!("no active hardware interface found")
}
