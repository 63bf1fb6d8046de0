//! Order averaging for the recursion.
//!
//! A single sweep depends on the order of the observations. Concatenating
//! several independently shuffled copies of the data damps that dependence
//! at the cost of a proportionally longer sweep.

use rand::seq::SliceRandom;
use rand::Rng;

/// `replicates` copies of `z`, each in an independent random order.
///
/// One replicate is a single shuffle of the data. Zero replicates yields an
/// empty stream.
pub fn replicate_shuffled<R: Rng + ?Sized>(z: &[f64], replicates: usize, rng: &mut R) -> Vec<f64> {
    let mut stream = Vec::with_capacity(z.len() * replicates);
    for _ in 0..replicates {
        let start = stream.len();
        stream.extend_from_slice(z);
        stream[start..].shuffle(rng);
    }
    stream
}
