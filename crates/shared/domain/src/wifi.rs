//! WiFi provisioning helpers: QR payloads and generated passwords.

use rand::Rng;
use url::Url;

use crate::constants::{QR_IMAGE_SIZE, WIFI_PASSWORD_ALPHABET, WIFI_PASSWORD_LENGTH};
use crate::error::{DomainError, DomainResult};

/// Payload understood by phone cameras: `WIFI:S:<ssid>;T:WPA;P:<password>;;`
pub fn qr_payload(ssid: &str, password: &str) -> String {
    format!("WIFI:S:{};T:WPA;P:{};;", ssid, password)
}

/// URL of the rendered QR image for the given network.
///
/// Rendering is delegated to `service_url`; the payload travels URL-encoded
/// in the `data` parameter.
pub fn qr_image_url(service_url: &str, ssid: &str, password: &str) -> DomainResult<String> {
    let payload = qr_payload(ssid, password);
    let url = Url::parse_with_params(
        service_url,
        &[("size", QR_IMAGE_SIZE), ("data", payload.as_str())],
    )
    .map_err(|e| DomainError::validation(format!("Invalid QR service URL: {}", e)))?;
    Ok(url.into())
}

/// Random WiFi password from an alphabet without look-alike glyphs.
pub fn generate_password() -> String {
    let mut rng = rand::thread_rng();
    (0..WIFI_PASSWORD_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..WIFI_PASSWORD_ALPHABET.len());
            WIFI_PASSWORD_ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_QR_SERVICE_URL;

    #[test]
    fn test_qr_payload() {
        assert_eq!(
            qr_payload("Residencial_A101", "Perez2026"),
            "WIFI:S:Residencial_A101;T:WPA;P:Perez2026;;"
        );
    }

    #[test]
    fn test_qr_image_url_encodes_payload() {
        let url = qr_image_url(DEFAULT_QR_SERVICE_URL, "Casa 1", "a;b").unwrap();

        assert!(url.starts_with("https://api.qrserver.com/v1/create-qr-code/?size=200x200&data="));
        assert!(url.contains("WIFI%3AS%3ACasa+1%3BT%3AWPA%3BP%3Aa%3Bb%3B%3B"));
    }

    #[test]
    fn test_qr_image_url_rejects_bad_base() {
        assert!(qr_image_url("not a url", "ssid", "pass").is_err());
    }

    #[test]
    fn test_generate_password() {
        let password = generate_password();

        assert_eq!(password.len(), WIFI_PASSWORD_LENGTH);
        assert!(password.bytes().all(|b| WIFI_PASSWORD_ALPHABET.contains(&b)));
    }
}
