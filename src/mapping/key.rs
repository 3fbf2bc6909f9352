//! # Mapping Keys
//!
//! A [`MappingKey`] identifies one bindable input: the section of the
//! controller it belongs to plus a short label such as `"A"` or `"Up"`.
//!
//! Keys are persisted as a single string `"<Section>|<Label>"`. Decoding is
//! lenient: anything that does not split into a known section and a label
//! decodes to `None`, so stale entries in an older profile simply drop out.
//!
//! ```
//! use gamepad_mapper::mapping::{MappingKey, Section};
//!
//! let key = MappingKey::new(Section::Buttons, "A");
//! assert_eq!(key.encode(), "Buttons|A");
//! assert_eq!(MappingKey::decode("Buttons|A"), Some(key));
//! assert_eq!(MappingKey::decode("Bogus|A"), None);
//! ```

use std::fmt;
use std::str::FromStr;

/// Separator between section and label in the encoded form.
pub const KEY_SEPARATOR: char = '|';

/// Region of the controller a binding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    /// Face, shoulder, trigger, stick-click and menu buttons.
    Buttons,
    /// The digital direction pad.
    DPad,
    /// Left analog stick used as a virtual direction pad.
    LeftStick,
    /// Right analog stick used as a virtual direction pad.
    RightStick,
}

impl Section {
    /// All sections in display order.
    pub const ALL: [Section; 4] = [
        Section::Buttons,
        Section::DPad,
        Section::LeftStick,
        Section::RightStick,
    ];

    /// Stable name used in the encoded key and in log lines.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Buttons => "Buttons",
            Section::DPad => "DPad",
            Section::LeftStick => "LeftStick",
            Section::RightStick => "RightStick",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or(())
    }
}

/// Identity of a bindable input: `(section, label)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MappingKey {
    /// Controller region.
    pub section: Section,
    /// Free-form short label, e.g. `"A"`, `"Left 1"`, `"Up"`.
    pub label: String,
}

impl MappingKey {
    /// Creates a key from a section and label.
    #[must_use]
    pub fn new(section: Section, label: impl Into<String>) -> Self {
        Self {
            section,
            label: label.into(),
        }
    }

    /// Encodes the key as `"<Section>|<Label>"`.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.section, KEY_SEPARATOR, self.label)
    }

    /// Decodes `"<Section>|<Label>"`.
    ///
    /// Returns `None` for an unknown section, a missing separator, an empty
    /// label, or more than one separator.
    #[must_use]
    pub fn decode(encoded: &str) -> Option<Self> {
        let (section, label) = encoded.split_once(KEY_SEPARATOR)?;
        if label.is_empty() || label.contains(KEY_SEPARATOR) {
            return None;
        }
        let section = section.parse().ok()?;
        Some(Self::new(section, label))
    }
}

impl fmt::Display for MappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.section, KEY_SEPARATOR, self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_buttons_key() {
        let key = MappingKey::new(Section::Buttons, "A");
        assert_eq!(key.encode(), "Buttons|A");
        assert_eq!(key.to_string(), "Buttons|A");
    }

    #[test]
    fn test_decode_roundtrip_every_section() {
        for section in Section::ALL {
            let key = MappingKey::new(section, "Left 1");
            assert_eq!(MappingKey::decode(&key.encode()), Some(key));
        }
    }

    #[test]
    fn test_decode_unknown_section_is_absent() {
        assert_eq!(MappingKey::decode("Bogus|A"), None);
    }

    #[test]
    fn test_decode_malformed_is_absent() {
        assert_eq!(MappingKey::decode(""), None);
        assert_eq!(MappingKey::decode("Buttons"), None);
        assert_eq!(MappingKey::decode("Buttons|"), None);
        assert_eq!(MappingKey::decode("Buttons|A|B"), None);
        assert_eq!(MappingKey::decode("|A"), None);
        // Section names are case sensitive
        assert_eq!(MappingKey::decode("buttons|A"), None);
    }

    #[test]
    fn test_keys_compare_on_both_fields() {
        let a = MappingKey::new(Section::Buttons, "Up");
        let b = MappingKey::new(Section::DPad, "Up");
        assert_ne!(a, b);
        assert_eq!(a, MappingKey::new(Section::Buttons, "Up"));
    }

    #[test]
    fn test_section_from_str() {
        assert_eq!("LeftStick".parse::<Section>(), Ok(Section::LeftStick));
        assert!("Triggers".parse::<Section>().is_err());
    }
}
