use uuid::Uuid;

/// Source of element ids
///
/// Production sessions use random UUIDs; tests use the sequential variant
/// so ids are predictable.
#[derive(Debug, Clone)]
pub enum IdGenerator {
    Random,
    Sequential { seed: String, count: u32 },
}

impl IdGenerator {
    pub fn random() -> Self {
        IdGenerator::Random
    }

    pub fn sequential(seed: impl Into<String>) -> Self {
        IdGenerator::Sequential {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate the next id; never repeats within one generator
    pub fn new_id(&mut self) -> String {
        match self {
            IdGenerator::Random => Uuid::new_v4().to_string(),
            IdGenerator::Sequential { seed, count } => {
                *count += 1;
                format!("{}-{}", seed, count)
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::random()
    }
}
