//! Property-name normalization and declaration rendering.

/// Normalize a property key to its CSS name.
///
/// Everything from the first underscore onward is dropped (so `color_2`
/// renders as `color`), then every upper-case letter becomes a hyphen followed
/// by its lower-case form: `backgroundColor` → `background-color`,
/// `MozBoxSizing` → `-moz-box-sizing`.
pub fn normalize_property(key: &str) -> String {
    let base = key.split('_').next().unwrap_or(key);
    let mut name = String::with_capacity(base.len() + 4);
    for ch in base.chars() {
        if ch.is_ascii_uppercase() {
            name.push('-');
            name.push(ch.to_ascii_lowercase());
        } else {
            name.push(ch);
        }
    }
    name
}

/// Render a single declaration: `name: value;`.
pub fn declaration(key: &str, value: &str) -> String {
    format!("{}: {};", normalize_property(key), value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_becomes_kebab_case() {
        assert_eq!(normalize_property("backgroundColor"), "background-color");
        assert_eq!(normalize_property("borderTopLeftRadius"), "border-top-left-radius");
    }

    #[test]
    fn vendor_prefix_gets_leading_hyphen() {
        assert_eq!(normalize_property("MozBoxSizing"), "-moz-box-sizing");
        assert_eq!(normalize_property("WebkitAppearance"), "-webkit-appearance");
    }

    #[test]
    fn underscore_suffix_is_stripped() {
        assert_eq!(normalize_property("color_fallback"), "color");
        assert_eq!(normalize_property("display_2_b"), "display");
        assert_eq!(normalize_property("fontSize_old"), "font-size");
    }

    #[test]
    fn kebab_and_custom_properties_pass_through() {
        assert_eq!(normalize_property("font-weight"), "font-weight");
        assert_eq!(normalize_property("--accent"), "--accent");
    }

    #[test]
    fn declaration_format() {
        assert_eq!(declaration("fontWeight", "bold"), "font-weight: bold;");
    }
}
