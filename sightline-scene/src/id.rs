/// Hands out packet identifiers. Generators take one by mutable reference so
/// the caller owns the numbering.
pub trait IdGenerator {
    fn next_id(&mut self, label: &str) -> String;
}

impl<F> IdGenerator for F
where
    F: FnMut(&str) -> String,
{
    fn next_id(&mut self, label: &str) -> String {
        self(label)
    }
}

/// `label-0`, `label-1`, ... with one counter shared across labels.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }

    pub fn issued(&self) -> u64 {
        self.next
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, label: &str) -> String {
        let id = format!("{label}-{}", self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_and_reset() {
        let mut ids = SequentialIds::new();
        assert_eq!(ids.next_id("edge"), "edge-0");
        assert_eq!(ids.next_id("arc"), "arc-1");
        assert_eq!(ids.issued(), 2);
        ids.reset();
        assert_eq!(ids.next_id("edge"), "edge-0");
    }

    #[test]
    fn closures_generate_ids() {
        let mut count = 0;
        let mut ids = |label: &str| {
            count += 1;
            format!("{label}#{count}")
        };
        let generator: &mut dyn IdGenerator = &mut ids;
        assert_eq!(generator.next_id("cell"), "cell#1");
        assert_eq!(generator.next_id("cell"), "cell#2");
    }
}
