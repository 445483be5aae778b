//! Paystack integration via REST API (no SDK dependency)
//!
//! Two calls are used: `POST /transaction/initialize` when an order or
//! booking is created, and `GET /transaction/verify/{reference}` before any
//! state transition (webhook payloads are never trusted on their own).

use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::Sha512;
use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_BASE_URL: &str = "https://api.paystack.co";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of initializing a transaction
#[derive(Debug, Clone)]
pub struct InitializedTransaction {
    pub authorization_url: String,
    pub reference: String,
}

/// Result of verifying a transaction by reference
#[derive(Debug, Clone)]
pub struct VerifiedTransaction {
    /// Gateway-side status, `"success"` when the charge went through
    pub status: String,
    /// Charged amount in minor units (kobo)
    pub amount_minor: i64,
    pub reference: String,
}

impl VerifiedTransaction {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// HTTP client for the Paystack API
#[derive(Clone)]
pub struct PaystackClient {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl PaystackClient {
    pub fn new(secret_key: impl Into<String>) -> Result<Self, BoxError> {
        Self::with_base_url(secret_key, DEFAULT_BASE_URL)
    }

    /// Injectable base URL (tests point this at a local stub)
    pub fn with_base_url(
        secret_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, BoxError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            secret_key: secret_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a transaction and return the hosted checkout URL
    pub async fn initialize_transaction(
        &self,
        email: &str,
        amount_minor: i64,
        reference: &str,
        callback_url: &str,
        metadata: Value,
    ) -> Result<InitializedTransaction, BoxError> {
        let resp: Value = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&json!({
                "email": email,
                "amount": amount_minor,
                "reference": reference,
                "callback_url": callback_url,
                "metadata": metadata,
            }))
            .send()
            .await?
            .json()
            .await?;

        if !resp["status"].as_bool().unwrap_or(false) {
            return Err(format!("Paystack initialize failed: {resp}").into());
        }

        let authorization_url = resp["data"]["authorization_url"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| format!("Paystack initialize missing authorization_url: {resp}"))?;

        Ok(InitializedTransaction {
            authorization_url,
            reference: reference.to_string(),
        })
    }

    /// Query the gateway's own record of a transaction
    pub async fn verify_transaction(
        &self,
        reference: &str,
    ) -> Result<VerifiedTransaction, BoxError> {
        let resp: Value = self
            .client
            .get(format!("{}/transaction/verify/{reference}", self.base_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await?
            .json()
            .await?;

        if !resp["status"].as_bool().unwrap_or(false) {
            return Err(format!("Paystack verify failed: {resp}").into());
        }

        let data = &resp["data"];
        let status = data["status"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| format!("Paystack verify missing status: {resp}"))?;
        let amount_minor = data["amount"]
            .as_i64()
            .ok_or_else(|| format!("Paystack verify missing amount: {resp}"))?;
        let reference = data["reference"]
            .as_str()
            .unwrap_or(reference)
            .to_string();

        Ok(VerifiedTransaction {
            status,
            amount_minor,
            reference,
        })
    }
}

/// Verify a Paystack webhook signature (HMAC-SHA512 over the raw body)
///
/// The signature header is hex; comparison is constant-time via
/// `Mac::verify_slice`. Must be called with the raw, unparsed body bytes.
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<(), &'static str> {
    let mut mac =
        Hmac::<Sha512>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(payload);

    let sig_bytes = hex::decode(sig_header.trim()).map_err(|_| "Invalid signature hex")?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| "Webhook signature mismatch")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(payload: &[u8], secret: &str) -> String {
        let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_accepted() {
        let payload = br#"{"event":"charge.success","data":{"reference":"ORD-1-2"}}"#;
        let sig = sign(payload, "sk_test_secret");
        assert!(verify_webhook_signature(payload, &sig, "sk_test_secret").is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let payload = br#"{"event":"charge.success","data":{"reference":"ORD-1-2"}}"#;
        let sig = sign(payload, "sk_test_secret");
        let tampered = br#"{"event":"charge.success","data":{"reference":"ORD-9-9"}}"#;
        assert!(verify_webhook_signature(tampered, &sig, "sk_test_secret").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = br#"{"event":"charge.success"}"#;
        let sig = sign(payload, "sk_test_secret");
        assert!(verify_webhook_signature(payload, &sig, "sk_other_secret").is_err());
    }

    #[test]
    fn test_non_hex_header_rejected() {
        assert_eq!(
            verify_webhook_signature(b"{}", "not-hex!", "sk_test_secret"),
            Err("Invalid signature hex")
        );
    }
}
