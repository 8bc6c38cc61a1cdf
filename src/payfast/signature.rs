//! PayFast request signatures
//!
//! The signature is the lowercase hex MD5 of `key=value` pairs joined by `&`,
//! with values trimmed and form-urlencoded (spaces as `+`), empty values and
//! the `signature` field left out, and `passphrase` appended last when set.
//!
//! Checkout signs fields in the order they are sent ([`FieldOrder::AsGiven`]);
//! notification verification sorts keys first ([`FieldOrder::Alphabetical`]).
//! Both paths must stay as they are for the gateway to accept them.

use md5::{Digest, Md5};
use serde::ser::{Serialize, SerializeMap, Serializer};
use url::form_urlencoded;

pub const SIGNATURE_FIELD: &str = "signature";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldOrder {
    AsGiven,
    Alphabetical,
}

/// Ordered name/value pairs as sent to or received from the gateway
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaymentFields(Vec<(String, String)>);

impl PaymentFields {
    pub fn new() -> Self { Self(Vec::new()) }

    /// Appends a field. A later push with the same name replaces the value in place.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn push_opt(&mut self, name: impl Into<String>, value: Option<impl Into<String>>) {
        if let Some(value) = value { self.push(name, value); }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> { self.0.iter().map(|(n, v)| (n.as_str(), v.as_str())) }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Parses an `application/x-www-form-urlencoded` body, keeping field order.
    pub fn from_form(body: &[u8]) -> Self {
        Self(form_urlencoded::parse(body).map(|(k, v)| (k.into_owned(), v.into_owned())).collect())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PaymentFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (k, v) in iter { fields.push(k, v); }
        fields
    }
}

/// Serializes as a JSON object whose keys keep field order.
impl Serialize for PaymentFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.trim().as_bytes()).collect()
}

/// The exact string that gets hashed.
pub fn signature_string(fields: &PaymentFields, order: FieldOrder, passphrase: Option<&str>) -> String {
    let mut pairs: Vec<(&str, &str)> = fields
        .iter()
        .filter(|(name, value)| *name != SIGNATURE_FIELD && !value.trim().is_empty())
        .collect();
    if order == FieldOrder::Alphabetical {
        pairs.sort_by(|a, b| a.0.cmp(b.0));
    }

    let mut out = pairs.iter().map(|(name, value)| format!("{}={}", name, encode(value))).collect::<Vec<_>>().join("&");
    if let Some(passphrase) = passphrase.map(str::trim).filter(|p| !p.is_empty()) {
        if !out.is_empty() { out.push('&'); }
        out.push_str("passphrase=");
        out.push_str(&encode(passphrase));
    }
    out
}

pub fn generate_signature(fields: &PaymentFields, order: FieldOrder, passphrase: Option<&str>) -> String {
    hex::encode(Md5::digest(signature_string(fields, order, passphrase).as_bytes()))
}

/// Checks the `signature` field of an inbound notification.
pub fn verify_signature(fields: &PaymentFields, passphrase: Option<&str>) -> bool {
    match fields.get(SIGNATURE_FIELD) {
        Some(received) if !received.trim().is_empty() => {
            generate_signature(fields, FieldOrder::Alphabetical, passphrase).eq_ignore_ascii_case(received.trim())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PaymentFields {
        [
            ("merchant_id", "10000100"),
            ("merchant_key", "46f0cd694581a"),
            ("return_url", "https://shop.example.com/return"),
            ("m_payment_id", "ORD-1"),
            ("amount", "250.00"),
            ("item_name", "Rose & Oud Serum"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_signature_string_encoding() {
        let s = signature_string(&sample(), FieldOrder::AsGiven, Some("jt7NOE43FZPn"));
        assert_eq!(
            s,
            "merchant_id=10000100&merchant_key=46f0cd694581a&return_url=https%3A%2F%2Fshop.example.com%2Freturn\
             &m_payment_id=ORD-1&amount=250.00&item_name=Rose+%26+Oud+Serum&passphrase=jt7NOE43FZPn"
        );
    }

    #[test]
    fn test_md5_hex_digest() {
        let blank: PaymentFields = [("name_first", " ")].into_iter().collect();
        assert_eq!(generate_signature(&blank, FieldOrder::AsGiven, None), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(signature_string(&blank, FieldOrder::AsGiven, Some("pp")), "passphrase=pp");
    }

    #[test]
    fn test_deterministic() {
        let a = generate_signature(&sample(), FieldOrder::AsGiven, Some("secret"));
        let b = generate_signature(&sample(), FieldOrder::AsGiven, Some("secret"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert_ne!(a, generate_signature(&sample(), FieldOrder::AsGiven, Some("other")));
    }

    #[test]
    fn test_empty_values_do_not_change_signature() {
        let base = generate_signature(&sample(), FieldOrder::AsGiven, None);
        let mut with_blank = sample();
        with_blank.push("name_last", "");
        with_blank.push("cell_number", "   ");
        assert_eq!(generate_signature(&with_blank, FieldOrder::AsGiven, None), base);
        assert_eq!(generate_signature(&with_blank, FieldOrder::Alphabetical, None), generate_signature(&sample(), FieldOrder::Alphabetical, None));
    }

    #[test]
    fn test_signature_field_is_excluded() {
        let base = generate_signature(&sample(), FieldOrder::Alphabetical, Some("pp"));
        let mut signed = sample();
        signed.push(SIGNATURE_FIELD, "deadbeef");
        assert_eq!(generate_signature(&signed, FieldOrder::Alphabetical, Some("pp")), base);
    }

    #[test]
    fn test_alphabetical_order() {
        let s = signature_string(&sample(), FieldOrder::Alphabetical, None);
        let keys: Vec<&str> = s.split('&').map(|p| p.split('=').next().unwrap()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys.first(), Some(&"amount"));
        // Checkout order is the caller's order, so the two differ.
        assert_ne!(s, signature_string(&sample(), FieldOrder::AsGiven, None));
    }

    #[test]
    fn test_verify_signature() {
        let mut fields = sample();
        let sig = generate_signature(&fields, FieldOrder::Alphabetical, Some("pp"));
        fields.push(SIGNATURE_FIELD, sig.to_uppercase());
        assert!(verify_signature(&fields, Some("pp")));
        assert!(!verify_signature(&fields, Some("wrong")));
        assert!(!verify_signature(&sample(), Some("pp")));
    }

    #[test]
    fn test_serializes_in_field_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.starts_with(r#"{"merchant_id":"10000100","merchant_key":"46f0cd694581a","return_url""#));
        assert!(json.ends_with(r#""item_name":"Rose & Oud Serum"}"#));
    }

    #[test]
    fn test_from_form_keeps_order() {
        let fields = PaymentFields::from_form(b"z=1&a=two+words&m=%26");
        let names: Vec<&str> = fields.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["z", "a", "m"]);
        assert_eq!(fields.get("a"), Some("two words"));
        assert_eq!(fields.get("m"), Some("&"));
    }
}
