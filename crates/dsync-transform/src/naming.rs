//! Remote variable names to token names.

use dsync_types::Typography;

/// Separator of remote name groups.
pub const GROUP_SEPARATOR: char = '/';

/// Normalize a remote variable name to a camelCase token name.
///
/// Anything that is not a letter or digit separates words. A word written
/// entirely in upper case is lowered first, so `LARGE_SIZE` becomes
/// `largeSize` while `primaryColor` is left alone.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for word in name.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        let word = if word.chars().any(char::is_lowercase) {
            word.to_string()
        } else {
            word.to_lowercase()
        };
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if out.is_empty() {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Split `group/field` when `field` is a typography field name.
pub fn typography_part(name: &str) -> Option<(&str, &'static str)> {
    let (group, field) = name.rsplit_once(GROUP_SEPARATOR)?;
    let field = Typography::FIELDS.iter().find(|f| **f == field)?;
    (!group.is_empty()).then_some((group, *field))
}

/// Remote name of one decomposed typography field.
pub fn typography_variable_name(group: &str, field: &str) -> String {
    format!("{group}{GROUP_SEPARATOR}{field}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_examples() {
        assert_eq!(camel_case("Primary Color"), "primaryColor");
        assert_eq!(camel_case("base-spacing"), "baseSpacing");
        assert_eq!(camel_case("LARGE_SIZE"), "largeSize");
        assert_eq!(camel_case("primaryColor"), "primaryColor");
        assert_eq!(camel_case("brand/Primary"), "brandPrimary");
        assert_eq!(camel_case("space 2x"), "space2x");
        assert_eq!(camel_case("  "), "");
    }

    #[test]
    fn camel_case_is_idempotent() {
        for name in ["Primary Color", "base-spacing", "LARGE_SIZE", "a/b/c"] {
            let once = camel_case(name);
            assert_eq!(camel_case(&once), once);
        }
    }

    #[test]
    fn typography_parts() {
        assert_eq!(typography_part("heading/fontSize"), Some(("heading", "fontSize")));
        assert_eq!(typography_part("Heading Large/fontFamily"), Some(("Heading Large", "fontFamily")));
        assert_eq!(typography_part("heading/color"), None);
        assert_eq!(typography_part("fontSize"), None);
        assert_eq!(typography_part("/fontSize"), None);
        assert_eq!(typography_variable_name("heading", "fontWeight"), "heading/fontWeight");
    }
}
