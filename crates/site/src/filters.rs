//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use allin_core::IconKey;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the content hash for main.css.
///
/// The hash is computed at build time from the CSS file content.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Maps a stored icon key to the glyph the catalog cards render.
///
/// Unknown keys fall back to the parcel glyph, mirroring the lenient
/// decode in [`IconKey::parse_or_default`].
///
/// Usage in templates: `{{ product.icon|icon_glyph }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn icon_glyph(key: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(glyph_for(IconKey::parse_or_default(&key.to_string())))
}

/// The glyph shipped for each icon key.
#[must_use]
pub const fn glyph_for(key: IconKey) -> &'static str {
    match key {
        IconKey::Package => "\u{1f4e6}",   // 📦
        IconKey::Wrench => "\u{1f527}",    // 🔧
        IconKey::Palette => "\u{1f3a8}",   // 🎨
        IconKey::Printer => "\u{1f5a8}\u{fe0f}", // 🖨️
        IconKey::Globe => "\u{1f310}",     // 🌐
        IconKey::Video => "\u{1f3a5}",     // 🎥
        IconKey::Crown => "\u{1f451}",     // 👑
        IconKey::TShirt => "\u{1f455}",    // 👕
        IconKey::Coffee => "\u{2615}",     // ☕
        IconKey::Notebook => "\u{1f4d3}",  // 📓
        IconKey::Watch => "\u{231a}",      // ⌚
        IconKey::Drop => "\u{1f4a7}",      // 💧
        IconKey::Circle => "\u{2b55}",     // ⭕
        IconKey::Usb => "\u{1f50c}",       // 🔌
        IconKey::Umbrella => "\u{2602}\u{fe0f}", // ☂️
        IconKey::Camera => "\u{1f4f7}",    // 📷
        IconKey::Briefcase => "\u{1f4bc}", // 💼
        IconKey::Megaphone => "\u{1f4e3}", // 📣
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_has_a_glyph() {
        for key in IconKey::ALL {
            assert!(!glyph_for(*key).is_empty());
        }
    }

    #[test]
    fn test_unknown_key_renders_parcel() {
        assert_eq!(
            glyph_for(IconKey::parse_or_default("sparkles")),
            glyph_for(IconKey::Package)
        );
    }
}
