use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::{Error, Result};

/// Length of the canonical textual GUID form.
pub const GUID_TEXT_LEN: usize = 32;

/// Class identifier of a joystick model.
///
/// GUIDs identify *kinds* of devices, not physical instances: two identical
/// pads plugged in at the same time share one GUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Guid([u8; 16]);

impl Guid {
    /// Sentinel returned for malformed text.
    pub const ZERO: Guid = Guid([0; 16]);

    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 16]
    }

    /// Lenient parse. Anything that is not exactly 32 hex digits
    /// becomes [`Guid::ZERO`].
    pub fn from_text(text: &str) -> Self {
        text.parse().unwrap_or(Self::ZERO)
    }

    /// Canonical 32-character lowercase hex form.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl FromStr for Guid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // try_parse also accepts hyphenated and braced forms, which never
        // appear in mapping strings.
        if s.len() != GUID_TEXT_LEN {
            return Err(Error::InvalidGuid(s.to_string()));
        }
        Uuid::try_parse(s)
            .map(|uuid| Self(*uuid.as_bytes()))
            .map_err(|_| Error::InvalidGuid(s.to_string()))
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Uuid::from_bytes(self.0).simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XBOX_360: &str = "030000005e0400008e02000014010000";

    #[test]
    fn text_form_is_lowercase_hex() {
        let guid: Guid = XBOX_360.parse().expect("valid guid");
        assert_eq!(guid.as_bytes()[0], 0x03);
        assert_eq!(guid.as_bytes()[4], 0x5e);
        assert_eq!(guid.to_text(), XBOX_360);
        assert_eq!(guid.to_text().len(), GUID_TEXT_LEN);
    }

    #[test]
    fn uppercase_input_is_canonicalized() {
        let guid = Guid::from_text("030000005E0400008E02000014010000");
        assert_eq!(guid.to_text(), XBOX_360);
    }

    #[test]
    fn malformed_text_yields_zero() {
        assert!(Guid::from_text("short").is_zero());
        assert!(Guid::from_text("zz0000005e0400008e02000014010000").is_zero());
        assert!(Guid::from_text("03000000-5e04-0000-8e02-000014010000").is_zero());
        assert!(Guid::from_text("").is_zero());
    }

    #[test]
    fn strict_parse_reports_invalid_guid() {
        match "short".parse::<Guid>() {
            Err(Error::InvalidGuid(text)) => assert_eq!(text, "short"),
            other => panic!("expected InvalidGuid, got {other:?}"),
        }
    }

    #[test]
    fn zero_guid_prints_as_zeros() {
        assert_eq!(Guid::ZERO.to_text(), "0".repeat(GUID_TEXT_LEN));
    }
}
