//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate a relative C source path (one to three lowercase directories
    /// deep, no hidden components)
    pub fn relative_path() -> impl Strategy<Value = String> {
        "[a-z]{1,8}(/[a-z]{1,8}){0,2}".prop_map(|stem| format!("{stem}.c"))
    }

    /// Generate a Ninja code line: tokens separated by single unescaped
    /// spaces, using `$$`, `$ ` and `$:` escapes inside tokens
    pub fn ninja_line() -> impl Strategy<Value = String> {
        prop::collection::vec(r"([a-z0-9._/]|\$\$|\$ |\$:){1,10}", 1..15)
            .prop_map(|tokens| tokens.join(" "))
    }

    /// Keys used by [`context_chain`]
    pub const CHAIN_KEYS: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

    /// Generate a chain of one to six contexts, root first; each level sets
    /// some of [`CHAIN_KEYS`] (by index) to an integer
    pub fn context_chain() -> impl Strategy<Value = Vec<Vec<(usize, i64)>>> {
        prop::collection::vec(
            prop::collection::vec((0..CHAIN_KEYS.len() - 1, any::<i64>()), 0..4),
            1..7,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    /// Whether the last character is a space not escaped by an odd run of `$`
    fn ends_with_unescaped_space(line: &str) -> bool {
        match line.strip_suffix(' ') {
            Some(body) => (body.len() - body.trim_end_matches('$').len()) % 2 == 0,
            None => false,
        }
    }

    /// Spaces not escaped by an odd run of `$`
    fn unescaped_spaces(line: &str) -> usize {
        let mut count = 0;
        let mut dollars = 0;
        for c in line.chars() {
            match c {
                '$' => dollars += 1,
                ' ' if dollars % 2 == 0 => {
                    count += 1;
                    dollars = 0;
                }
                _ => dollars = 0,
            }
        }
        count
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_relative_path_generator(path in relative_path()) {
            prop_assert!(path.ends_with(".c"));
            prop_assert!(!path.starts_with('/'));
            prop_assert!(path.split('/').all(|part| !part.is_empty() && !part.starts_with('.')));
        }

        #[test]
        fn test_context_chain_generator(chain in context_chain()) {
            prop_assert!(!chain.is_empty() && chain.len() <= 6);
            // The last key is never set, so every chain has a missing key.
            prop_assert!(chain.iter().flatten().all(|(key, _)| *key < CHAIN_KEYS.len() - 1));
        }

        #[test]
        fn test_ninja_line_generator(line in ninja_line()) {
            prop_assert!(!line.starts_with(' '));
            prop_assert!(!ends_with_unescaped_space(&line));
            prop_assert!(unescaped_spaces(&line) < 15);
        }
    }
}
