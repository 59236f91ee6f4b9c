//! Dense candidate generation.

use crate::types::Candidate;

/// All `n1 * n2` index pairs, set-1 index ascending, set-2 index varying
/// fastest.
pub fn generate_candidates(n1: usize, n2: usize) -> Vec<Candidate> {
    let mut out = Vec::with_capacity(n1 * n2);
    for first in 0..n1 {
        for second in 0..n2 {
            out.push(Candidate::new(first, second));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn length_is_product_of_set_sizes() {
        for n1 in 0..5 {
            for n2 in 0..5 {
                assert_eq!(generate_candidates(n1, n2).len(), n1 * n2);
            }
        }
    }

    #[test]
    fn empty_set_yields_no_candidates() {
        assert!(generate_candidates(0, 7).is_empty());
        assert!(generate_candidates(4, 0).is_empty());
    }

    #[test]
    fn second_index_varies_fastest() {
        let list = generate_candidates(2, 3);
        let pairs: Vec<(usize, usize)> = list.into_iter().map(Into::into).collect();
        assert_eq!(pairs, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
    }

    #[test]
    fn every_pair_appears_exactly_once() {
        let list = generate_candidates(4, 6);
        let unique: HashSet<_> = list.iter().copied().collect();
        assert_eq!(unique.len(), list.len());
        assert_eq!(list, generate_candidates(4, 6));
    }
}
