//! Presentational icon keys for catalog items.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Key into the fixed set of presentational glyphs the site ships.
///
/// Stored documents carry the key as a plain string. Decoding is lenient:
/// an absent or unrecognized key falls back to [`IconKey::Package`], the
/// generic glyph, so stale documents never fail to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IconKey {
    /// Generic parcel glyph, the fallback for anything unrecognized.
    #[default]
    Package,
    Wrench,
    Palette,
    Printer,
    Globe,
    Video,
    Crown,
    TShirt,
    Coffee,
    Notebook,
    Watch,
    Drop,
    Circle,
    Usb,
    Umbrella,
    Camera,
    Briefcase,
    Megaphone,
}

impl IconKey {
    /// Every key, in the order the admin form offers them.
    pub const ALL: &'static [Self] = &[
        Self::Package,
        Self::Wrench,
        Self::Palette,
        Self::Printer,
        Self::Globe,
        Self::Video,
        Self::Crown,
        Self::TShirt,
        Self::Coffee,
        Self::Notebook,
        Self::Watch,
        Self::Drop,
        Self::Circle,
        Self::Usb,
        Self::Umbrella,
        Self::Camera,
        Self::Briefcase,
        Self::Megaphone,
    ];

    /// The stored string form of the key (also the CSS glyph class suffix).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::Wrench => "wrench",
            Self::Palette => "palette",
            Self::Printer => "printer",
            Self::Globe => "globe",
            Self::Video => "video",
            Self::Crown => "crown",
            Self::TShirt => "tshirt",
            Self::Coffee => "coffee",
            Self::Notebook => "notebook",
            Self::Watch => "watch",
            Self::Drop => "drop",
            Self::Circle => "circle",
            Self::Usb => "usb",
            Self::Umbrella => "umbrella",
            Self::Camera => "camera",
            Self::Briefcase => "briefcase",
            Self::Megaphone => "megaphone",
        }
    }

    /// Strict parse of a stored key string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.as_str() == s)
    }

    /// Lenient parse: unknown keys become the generic [`IconKey::Package`].
    #[must_use]
    pub fn parse_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }
}

impl fmt::Display for IconKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for IconKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IconKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse_or_default(&s))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_all_keys() {
        for key in IconKey::ALL {
            assert_eq!(IconKey::parse(key.as_str()), Some(*key));
        }
    }

    #[test]
    fn test_unknown_key_falls_back_to_package() {
        assert_eq!(IconKey::parse_or_default("sparkles"), IconKey::Package);
        assert_eq!(IconKey::parse_or_default(""), IconKey::Package);
    }

    #[test]
    fn test_lenient_deserialize() {
        let known: IconKey = serde_json::from_str("\"wrench\"").unwrap();
        assert_eq!(known, IconKey::Wrench);

        let unknown: IconKey = serde_json::from_str("\"not-a-glyph\"").unwrap();
        assert_eq!(unknown, IconKey::Package);
    }

    #[test]
    fn test_serialize_is_stored_form() {
        let json = serde_json::to_string(&IconKey::TShirt).unwrap();
        assert_eq!(json, "\"tshirt\"");
    }
}
