use rand::Rng;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot sample {requested} items from a population of {available}")]
pub struct SampleSizeError {
    pub requested: usize,
    pub available: usize,
}

/// Draws `amount` items uniformly at random without replacement.
///
/// Every subset of size `amount` is equally likely and the result order is
/// random. Fails when `amount` exceeds `items.len()`; `amount == 0` yields
/// an empty vector.
pub fn sample_without_replacement<T, R>(
    rng: &mut R,
    items: &[T],
    amount: usize,
) -> Result<Vec<T>, SampleSizeError>
where
    T: Clone,
    R: Rng + ?Sized,
{
    if amount > items.len() {
        return Err(SampleSizeError {
            requested: amount,
            available: items.len(),
        });
    }

    Ok(rand::seq::index::sample(rng, items.len(), amount)
        .into_iter()
        .map(|i| items[i].clone())
        .collect())
}
