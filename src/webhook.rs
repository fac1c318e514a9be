// Copyright 2023 rust-dns-sdk authors
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Verification of webhook deliveries.
//!
//! When a [`WebhookEndpoint`](crate::models::WebhookEndpoint) has a secret, the
//! server sends the hex-encoded HMAC-SHA256 of the raw request body in the
//! [`SIGNATURE_HEADER`] header. Receivers should check it against the exact
//! bytes they received, before parsing.

use hex::encode as hex_encode;
use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of the delivery body.
pub const SIGNATURE_HEADER: &str = "X-Atlas-Signature";
/// Event type of the (first) event in the delivery.
pub const EVENT_HEADER: &str = "X-Atlas-Event";
/// Unique delivery ID, stable across redeliveries.
pub const DELIVERY_HEADER: &str = "X-Atlas-Delivery";

fn mac_for(secret: &str) -> Option<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes()).ok()
}

/// Computes the signature the server attaches to `payload`.
pub fn sign(secret: &str, payload: &[u8]) -> String {
    match mac_for(secret) {
        Some(mut mac) => {
            mac.update(payload);
            hex_encode(mac.finalize().into_bytes())
        }
        None => String::new(),
    }
}

/// Checks a received signature in constant time.
///
/// Returns `false` for malformed (non-hex) signatures.
pub fn verify(secret: &str, payload: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Some(mut mac) = mac_for(secret) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"event_type":"ZoneCreated","zone":"example.com"}"#;

    #[test]
    fn signature_is_hex_sha256_length() {
        let signature = sign("s3cret", BODY);
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn known_vector() {
        // RFC 4231 test case 2.
        assert_eq!(
            sign("Jefe", b"what do ya want for nothing?"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn verify_accepts_own_signature() {
        let signature = sign("s3cret", BODY);
        assert!(verify("s3cret", BODY, &signature));
        assert!(verify("s3cret", BODY, &signature.to_uppercase()));
    }

    #[test]
    fn verify_rejects_tampering() {
        let signature = sign("s3cret", BODY);
        assert!(!verify("other", BODY, &signature));
        assert!(!verify("s3cret", b"{}", &signature));
        assert!(!verify("s3cret", BODY, "not-hex"));
        assert!(!verify("s3cret", BODY, &signature[..32]));
    }
}
