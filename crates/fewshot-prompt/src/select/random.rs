use std::sync::Mutex;

use async_trait::async_trait;
use rand::SeedableRng as _;
use rand::rngs::StdRng;
use rand::seq::index::sample as index_sample;

use fewshot_core::{Error, Example, ExampleSelector, Result};

/// Selector that draws a fresh uniform sample on every invocation.
///
/// The example list grows only by explicit appends; nothing is removed.
pub struct RandomExampleSelector {
    /// Stored population.
    examples: Vec<Example>,
    /// Number of examples per draw.
    sample_size: usize,
    /// Sampler state, locked per draw so `select` can take `&self`.
    rng: Mutex<StdRng>,
}

impl RandomExampleSelector {
    /// Creates a selector over the given examples.
    #[must_use]
    pub fn new(examples: Vec<Example>, sample_size: usize) -> Self {
        Self {
            examples,
            sample_size,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a selector with a deterministic sampler.
    #[must_use]
    pub fn with_seed(examples: Vec<Example>, sample_size: usize, seed: u64) -> Self {
        Self {
            examples,
            sample_size,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Appends an example to the population.
    pub fn add_example(&mut self, example: Example) {
        self.examples.push(example);
    }
}

#[async_trait]
impl ExampleSelector for RandomExampleSelector {
    async fn select(&self, _query: &str) -> Result<Vec<Example>> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| Error::Other("sampler lock poisoned".to_owned()))?;
        sample_without_replacement(&mut rng, &self.examples, self.sample_size)
    }
}

/// Draws a uniform sample without replacement.
///
/// # Errors
/// Returns [`Error::Precondition`] if the sample size exceeds the
/// population; samples are never silently truncated.
fn sample_without_replacement(
    rng: &mut StdRng,
    examples: &[Example],
    sample_size: usize,
) -> Result<Vec<Example>> {
    if sample_size > examples.len() {
        return Err(Error::Precondition(format!(
            "requested a sample of {sample_size} from a population of {}",
            examples.len()
        )));
    }

    Ok(index_sample(rng, examples.len(), sample_size)
        .iter()
        .map(|index| examples[index].clone())
        .collect())
}

/// Draws one uniform sample at setup time.
///
/// The result is a static list: every prompt render sees the same subset.
///
/// # Errors
/// Returns [`Error::Precondition`] if the sample size exceeds the population.
pub fn fixed_sample(examples: &[Example], sample_size: usize) -> Result<Vec<Example>> {
    let mut rng = StdRng::from_os_rng();
    sample_without_replacement(&mut rng, examples, sample_size)
}

/// Deterministic variant of [`fixed_sample`].
///
/// # Errors
/// Returns [`Error::Precondition`] if the sample size exceeds the population.
pub fn fixed_sample_with_seed(
    examples: &[Example],
    sample_size: usize,
    seed: u64,
) -> Result<Vec<Example>> {
    let mut rng = StdRng::seed_from_u64(seed);
    sample_without_replacement(&mut rng, examples, sample_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn population(count: usize) -> Vec<Example> {
        (0..count)
            .map(|index| Example::new(format!("request {index}")))
            .collect()
    }

    #[tokio::test]
    async fn draws_are_distinct_and_from_population() {
        let examples = population(10);
        let selector = RandomExampleSelector::new(examples.clone(), 4);

        let selected = selector.select("anything").await.unwrap();
        assert_eq!(selected.len(), 4);

        for example in &selected {
            assert!(examples.contains(example));
        }

        let distinct: HashSet<&str> = selected
            .iter()
            .map(|example| example.intention.as_str())
            .collect();
        assert_eq!(distinct.len(), selected.len());
    }

    #[tokio::test]
    async fn oversized_sample_fails() {
        let selector = RandomExampleSelector::new(population(3), 5);
        let result = selector.select("anything").await;
        assert!(matches!(result, Err(Error::Precondition(_))));
    }

    #[tokio::test]
    async fn appended_examples_join_the_population() {
        let mut selector = RandomExampleSelector::new(population(1), 2);
        assert!(selector.select("anything").await.is_err());

        selector.add_example(Example::new("request appended"));
        let selected = selector.select("anything").await.unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn seeded_fixed_sample_is_deterministic() {
        let examples = population(20);

        let first = fixed_sample_with_seed(&examples, 5, 42).unwrap();
        let second = fixed_sample_with_seed(&examples, 5, 42).unwrap();
        assert_eq!(first, second);

        let other_seed = fixed_sample_with_seed(&examples, 5, 43).unwrap();
        assert_eq!(other_seed.len(), 5);
    }

    #[test]
    fn zero_sample_is_empty() {
        let examples = population(3);
        assert!(fixed_sample(&examples, 0).unwrap().is_empty());
    }
}
