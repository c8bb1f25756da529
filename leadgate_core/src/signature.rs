//! Webhook signature verification (HMAC-SHA256 over the raw request body).

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the sender's signature, as raw hex or `sha256=<hex>`.
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

#[derive(Debug, Clone, Default)]
pub struct SignatureConfig {
    pub secret: Option<String>,
}

impl SignatureConfig {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }
}

/// Gate an inbound body behind signature verification when a secret is
/// configured.
///
/// With no secret, verification is skipped entirely and logged as a warning
/// (fail-open).
#[tracing::instrument(level = "debug", skip_all)]
pub fn verify_if_configured(
    cfg: &SignatureConfig,
    signature_header: Option<&str>,
    body: &[u8],
) -> Result<()> {
    let Some(secret) = cfg.secret.as_deref() else {
        tracing::warn!("webhook signature verification skipped: no secret configured");
        return Ok(());
    };

    let Some(signature_header) = signature_header else {
        return Err(Error::SignatureVerificationFailed);
    };
    verify_signature(secret, signature_header, body)
}

/// Verify an inbound webhook signature.
///
/// Accepts either raw hex or `sha256=<hex>` header format.
#[tracing::instrument(level = "debug", skip(body))]
pub fn verify_signature(secret: &str, signature_header: &str, body: &[u8]) -> Result<()> {
    let sig = signature_header.trim();
    let sig_hex = sig.strip_prefix("sha256=").unwrap_or(sig);
    let provided = hex::decode(sig_hex).map_err(|_| Error::SignatureVerificationFailed)?;

    // `hmac` provides constant-time verification.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| Error::SignatureVerificationFailed)?;
    mac.update(body);
    mac.verify_slice(&provided)
        .map_err(|_| Error::SignatureVerificationFailed)?;

    Ok(())
}

/// Compute the signature header value for `body`, as the senders do.
///
/// Format: hex HMAC-SHA256 of the exact serialized body.
#[tracing::instrument(level = "debug", skip(body))]
pub fn sign_body(secret: &str, body: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| Error::SignatureVerificationFailed)?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}
