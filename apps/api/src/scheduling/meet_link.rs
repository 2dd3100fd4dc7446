use rand::{distributions::Alphanumeric, Rng};

/// Number of random characters appended to the base URL.
const LINK_LEN: usize = 16;

/// Generates a meeting link: the configured base URL plus 16 characters
/// drawn uniformly from letters and digits. `ThreadRng` is a CSPRNG, which
/// is more than the collision-avoidance here requires.
pub fn generate(base_url: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(LINK_LEN)
        .map(char::from)
        .collect();
    format!("{base_url}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const BASE: &str = "https://meet.google.com/";

    #[test]
    fn test_link_has_base_prefix_and_16_char_suffix() {
        let link = generate(BASE);
        let suffix = link.strip_prefix(BASE).unwrap();
        assert_eq!(suffix.len(), LINK_LEN);
    }

    #[test]
    fn test_suffix_is_alphanumeric() {
        let link = generate(BASE);
        let suffix = link.strip_prefix(BASE).unwrap();
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_10_000_links_are_unique() {
        let links: HashSet<String> = (0..10_000).map(|_| generate(BASE)).collect();
        assert_eq!(links.len(), 10_000);
    }
}
