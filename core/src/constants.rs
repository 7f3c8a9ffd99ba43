//! constants.rs
//! Runtime tunables for the header container.

/// Capacity of the channel between an iteration producer and its consumer.
/// Kept at one so a producer never runs far ahead of a consumer that may stop.
pub const ITERATOR_BUFFER_SIZE: usize = 1;

/// Base64 engines used for byte-valued header fields.
pub mod base64_engines {
    use base64::engine::general_purpose;
    use base64::engine::GeneralPurpose;

    /// Canonical wire encoding: URL-safe alphabet, no padding.
    pub const WIRE: GeneralPurpose = general_purpose::URL_SAFE_NO_PAD;
    /// Standard alphabet without padding, tolerated on decode.
    pub const STANDARD_NO_PAD: GeneralPurpose = general_purpose::STANDARD_NO_PAD;
}

/// Key types accepted for the `jwk` header parameter (RFC 7518 section 6.1, RFC 8037).
pub const SUPPORTED_KEY_TYPES: &[&str] = &["EC", "RSA", "oct", "OKP"];

/// Curves accepted for `epk` (RFC 7518 section 6.2.1.1).
pub const SUPPORTED_EC_CURVES: &[&str] = &["P-256", "P-384", "P-521"];
