use serde::{Deserialize, Serialize};

/// Raw billing payload stored verbatim alongside a booking, one-to-one.
///
/// Stored unencrypted and unredacted. This reproduces the educational
/// anti-pattern of the original site; keep the store disabled unless the
/// deployment exists to demonstrate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivePayload {
    pub customer: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
