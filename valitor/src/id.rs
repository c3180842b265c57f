//! Transaction lifecycle id generation.

/// Produces unique transaction lifecycle ids.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh id.
    fn generate(&self) -> String;
}

/// Random (v4) UUIDs in hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_ids_are_distinct_and_hyphenated() {
        let first = UuidGenerator.generate();
        let second = UuidGenerator.generate();
        assert_ne!(first, second);
        assert_eq!(first.len(), 36);
        assert_eq!(first.matches('-').count(), 4);
    }

    #[test]
    fn test_closure_generator() {
        let fixed = || "fixed-id".to_owned();
        assert_eq!(fixed.generate(), "fixed-id");
    }
}
