use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::OffsetDateTime;

/// Dernier état connu d'un device, écrasé à chaque PONG reçu.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DeviceRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Count")]
    pub count: i64,
    #[serde(rename = "LastSeen", with = "time::serde::rfc3339")]
    pub last_seen: OffsetDateTime,
}

pub type DevicesMap = HashMap<String, DeviceRecord>;
