//! URL slugs for categories.

/// Derive a slug from a display name.
///
/// Lowercases, folds Romanian diacritics to ASCII, turns `&` into `si`,
/// and collapses every other run of non-alphanumerics into a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        let mapped: &str = match ch {
            'ă' | 'â' | 'Ă' | 'Â' => "a",
            'î' | 'Î' => "i",
            'ș' | 'ş' | 'Ș' | 'Ş' => "s",
            'ț' | 'ţ' | 'Ț' | 'Ţ' => "t",
            '&' => "si",
            c if c.is_ascii_alphanumeric() => {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c.to_ascii_lowercase());
                continue;
            }
            _ => {
                pending_dash = true;
                continue;
            }
        };
        if pending_dash && !slug.is_empty() {
            slug.push('-');
        }
        pending_dash = false;
        slug.push_str(mapped);
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(slugify("Electronics"), "electronics");
    }

    #[test]
    fn test_spaces_and_punctuation_collapse() {
        assert_eq!(slugify("Auto, Moto  și Ambarcațiuni"), "auto-moto-si-ambarcatiuni");
    }

    #[test]
    fn test_ampersand() {
        assert_eq!(slugify("IT & Programming"), "it-si-programming");
    }

    #[test]
    fn test_no_leading_or_trailing_dash() {
        assert_eq!(slugify("  Casă și Grădină! "), "casa-si-gradina");
    }

    #[test]
    fn test_empty() {
        assert_eq!(slugify(""), "");
    }
}
