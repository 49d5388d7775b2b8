//! Decoding of XOR-protected email addresses
//!
//! Some CDNs replace addresses with a hex payload, either in a
//! `data-cfemail` attribute or in an `/cdn-cgi/l/email-protection#<hex>`
//! link. The first byte of the payload is the key; every following byte is
//! the address XOR the key.

use crate::email::normalize_email;
use crate::ParseError;

/// Substring present in pages that carry protected addresses
pub const PROTECTION_MARKER: &str = "email-protection";

/// Decodes a hex payload into a plain, lower-cased email
///
/// # Errors
///
/// Returns `ParseError::Obfuscation` when the payload is not valid hex, is
/// too short, or does not decode to a well-formed address.
pub fn decode_cfemail(payload: &str) -> Result<String, ParseError> {
    let payload = payload.trim();
    if payload.len() < 4 || payload.len() % 2 != 0 {
        return Err(ParseError::Obfuscation(format!(
            "payload has invalid length {}",
            payload.len()
        )));
    }

    let bytes = hex::decode(payload)
        .map_err(|e| ParseError::Obfuscation(format!("invalid hex: {}", e)))?;

    let key = bytes[0];
    let decoded: Vec<u8> = bytes[1..].iter().map(|b| b ^ key).collect();
    let text = String::from_utf8(decoded)
        .map_err(|_| ParseError::Obfuscation("decoded bytes are not UTF-8".to_string()))?;

    normalize_email(&text)
        .ok_or_else(|| ParseError::Obfuscation(format!("decoded value is not an email: {}", text)))
}

/// Returns the hex payload of an email-protection link
pub fn payload_from_href(href: &str) -> Option<&str> {
    let (_, fragment) = href.split_once("email-protection#")?;
    let payload = fragment.split(|c: char| !c.is_ascii_hexdigit()).next()?;
    if payload.is_empty() {
        None
    } else {
        Some(payload)
    }
}

#[cfg(test)]
pub(crate) fn encode_cfemail(email: &str, key: u8) -> String {
    let mut bytes = vec![key];
    bytes.extend(email.bytes().map(|b| b ^ key));
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_payload() {
        let payload = encode_cfemail("hello@firm.com", 0x1a);
        assert!(payload.starts_with("1a"));
        assert_eq!(decode_cfemail(&payload).unwrap(), "hello@firm.com");
    }

    #[test]
    fn test_decode_uppercase_hex() {
        let payload = encode_cfemail("Jane.Doe@Example.org", 0x5c).to_uppercase();
        assert_eq!(decode_cfemail(&payload).unwrap(), "jane.doe@example.org");
    }

    #[test]
    fn test_malformed_payloads_yield_errors() {
        assert!(decode_cfemail("").is_err());
        assert!(decode_cfemail("1a").is_err());
        assert!(decode_cfemail("1a2").is_err());
        assert!(decode_cfemail("zz1234").is_err());
        // valid hex, but not an email once decoded
        assert!(matches!(
            decode_cfemail(&encode_cfemail("nobody", 0x1a)),
            Err(ParseError::Obfuscation(_))
        ));
    }

    #[test]
    fn test_payload_from_href() {
        assert_eq!(
            payload_from_href("/cdn-cgi/l/email-protection#1a2b3c"),
            Some("1a2b3c")
        );
        assert_eq!(
            payload_from_href("https://x.com/cdn-cgi/l/email-protection#abcd?x=1"),
            Some("abcd")
        );
        assert_eq!(payload_from_href("/cdn-cgi/l/email-protection"), None);
        assert_eq!(payload_from_href("/contact#team"), None);
    }
}
