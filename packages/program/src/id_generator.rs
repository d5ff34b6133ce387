//! Stable node id generation.
//!
//! Ids are `{seed}-{n}` where the seed is derived from the program name
//! and `n` counts up from 1. Uniqueness within a forest is the editor's
//! invariant; the generator only promises never to mint the same id
//! twice for one seed.

pub fn get_program_id(name: &str) -> String {
    format!("{:x}", crc32fast::hash(name.as_bytes()))
}

#[derive(Debug, Clone)]
pub struct IDGenerator {
    seed: String,
    count: u32,
}

impl IDGenerator {
    pub fn new(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Bumps the counter past `id` if it was minted from this seed.
    ///
    /// Called for every node of a loaded program so fresh ids never
    /// collide with persisted ones.
    pub fn advance_past(&mut self, id: &str) {
        if let Some(rest) = id.strip_prefix(self.seed.as_str()) {
            if let Some(count) = rest.strip_prefix('-').and_then(|n| n.parse::<u32>().ok()) {
                self.count = self.count.max(count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_count_up_from_seed() {
        let mut ids = IDGenerator::new(get_program_id("demo"));
        let first = ids.new_id();
        let second = ids.new_id();
        assert_ne!(first, second);
        assert!(first.ends_with("-1"));
        assert!(second.ends_with("-2"));
        assert!(first.starts_with(ids.seed()));
    }

    #[test]
    fn test_distinct_names_yield_distinct_seeds() {
        assert_ne!(get_program_id("a"), get_program_id("b"));
        assert_eq!(get_program_id("a"), get_program_id("a"));
    }

    #[test]
    fn test_advance_past_resumes_after_load() {
        let mut ids = IDGenerator::new("abc123".to_string());
        ids.advance_past("abc123-7");
        assert_eq!(ids.new_id(), "abc123-8");
    }

    #[test]
    fn test_advance_past_ignores_foreign_ids() {
        let mut ids = IDGenerator::new("abc123".to_string());
        ids.advance_past("other-99");
        ids.advance_past("not-numeric-x");
        assert_eq!(ids.new_id(), "abc123-1");
    }
}
