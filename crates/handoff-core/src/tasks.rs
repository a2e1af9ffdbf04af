//! Sample task bodies.

use rand::Rng;

use crate::completion::Outcome;

/// Exclusive upper bound of [`random_value`].
pub const RANDOM_UPPER_BOUND: u32 = 100;

/// A pseudo-random integer in `[0, RANDOM_UPPER_BOUND)`.
pub fn random_value() -> Outcome<u32> {
    Ok(rand::thread_rng().gen_range(0..RANDOM_UPPER_BOUND))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_value_stays_in_range() {
        for _ in 0..1000 {
            let value = random_value().unwrap();
            assert!(value < RANDOM_UPPER_BOUND);
        }
    }
}
