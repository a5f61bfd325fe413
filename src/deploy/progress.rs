//! Indentation for nested deployment progress.

/// Prefix for a progress line at the given dependency depth.
///
/// Depth 0 has no prefix; deeper levels get one `#` per level.
pub(crate) fn indent(hierarchy: usize) -> String {
    if hierarchy == 0 {
        String::new()
    } else {
        format!("{} ", "#".repeat(hierarchy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(1), "# ");
        assert_eq!(indent(3), "### ");
    }
}
