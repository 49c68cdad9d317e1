//! Phone subject normalization and masking utilities

/// Normalize a raw phone identifier into the canonical subject key.
///
/// Strips all whitespace and hyphens, then a single leading `+`, so that
/// equivalent spellings of the same number collide to one key. Pure and
/// total; this is the sole determinant of key identity and must be applied
/// on every store access.
pub fn normalize_subject(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    match stripped.strip_prefix('+') {
        Some(rest) => rest.to_string(),
        None => stripped,
    }
}

/// Mask a subject for logging (show only last 4 characters).
///
/// Raw phone numbers must never appear in log output. Counts characters
/// rather than bytes: normalization is total, so a subject may carry
/// multibyte characters and slicing by byte offset could split one.
pub fn mask_subject(subject: &str) -> String {
    let char_count = subject.chars().count();
    if char_count <= 4 {
        "****".to_string()
    } else {
        let suffix: String = subject.chars().skip(char_count - 4).collect();
        format!("***{}", suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_subject() {
        assert_eq!(normalize_subject("233-555-000-111"), "233555000111");
        assert_eq!(normalize_subject("+233 555 000 111"), "233555000111");
        assert_eq!(normalize_subject("233555000111"), "233555000111");
        assert_eq!(normalize_subject("\t233 555\n000 111 "), "233555000111");
    }

    #[test]
    fn test_normalize_strips_only_leading_plus() {
        // Only one leading plus is removed; anything else is left alone
        assert_eq!(normalize_subject("++233555000111"), "+233555000111");
        assert_eq!(normalize_subject("233+555"), "233+555");
    }

    #[test]
    fn test_equivalent_spellings_collide() {
        let spellings = ["+233555000111", "233 555 000 111", "233-555-000-111"];
        let keys: Vec<String> = spellings.iter().map(|s| normalize_subject(s)).collect();
        assert!(keys.iter().all(|k| k == "233555000111"));
    }

    #[test]
    fn test_normalize_is_total() {
        assert_eq!(normalize_subject(""), "");
        assert_eq!(normalize_subject("+"), "");
        assert_eq!(normalize_subject(" - "), "");
    }

    #[test]
    fn test_mask_subject() {
        assert_eq!(mask_subject("233555000111"), "***0111");
        assert_eq!(mask_subject("567890"), "***7890");
        assert_eq!(mask_subject("1234"), "****");
        assert_eq!(mask_subject(""), "****");
    }

    #[test]
    fn test_mask_subject_multibyte() {
        // Fullwidth digits survive normalization; masking must cut on
        // character boundaries, not byte offsets.
        assert_eq!(mask_subject("２３３５５５０００１１１"), "***０１１１");
        assert_eq!(mask_subject("１２３４"), "****");
        assert_eq!(mask_subject("233555０１１１"), "***０１１１");
    }
}
