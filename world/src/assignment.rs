//! Random assignment of role tags, Perfection strains, and tower elements.
//!
//! Every shuffle is a Fisher-Yates pass over an explicit array driven by the
//! world's seeded generator, so identical seeds reproduce identical sessions.

use concept_trainer_core::{
    ConceptionKind, RoleTag, Strain, ALL_ROLE_TAGS, ENTITY_COUNT, SUCCESS_CONCEPTIONS,
};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Produces a uniformly shuffled permutation of the 8 role tags.
pub(crate) fn shuffled_tags(rng: &mut ChaCha8Rng) -> [RoleTag; ENTITY_COUNT] {
    let mut tags = ALL_ROLE_TAGS;
    tags.shuffle(rng);
    tags
}

/// Produces a uniformly shuffled permutation of the three strains.
pub(crate) fn shuffled_strains(rng: &mut ChaCha8Rng) -> [Strain; 3] {
    let mut strains = [Strain::Alpha, Strain::Beta, Strain::Gamma];
    strains.shuffle(rng);
    strains
}

/// Picks the Conception kind the entering phase's towers will demand.
pub(crate) fn required_conception(rng: &mut ChaCha8Rng) -> ConceptionKind {
    SUCCESS_CONCEPTIONS
        .choose(rng)
        .copied()
        .unwrap_or(ConceptionKind::Winged)
}

/// Builds the six-strain pool handed out at the final phase's entry.
///
/// Two copies of each component strain of `required` plus two copies of the
/// leftover strain, uniformly shuffled.
pub(crate) fn shuffled_strain_pool(rng: &mut ChaCha8Rng, required: ConceptionKind) -> [Strain; 6] {
    let (first, second) = required.components();
    let leftover = [Strain::Alpha, Strain::Beta, Strain::Gamma]
        .into_iter()
        .find(|strain| *strain != first && *strain != second)
        .unwrap_or(Strain::Gamma);

    let mut pool = [first, first, second, second, leftover, leftover];
    pool.shuffle(rng);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    #[test]
    fn shuffled_tags_always_form_a_permutation() {
        for seed in 0..64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let tags = shuffled_tags(&mut rng);
            let unique: BTreeSet<RoleTag> = tags.iter().copied().collect();
            assert_eq!(unique.len(), ALL_ROLE_TAGS.len());
        }
    }

    #[test]
    fn shuffled_strains_cover_all_three() {
        for seed in 0..64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let strains = shuffled_strains(&mut rng);
            let unique: BTreeSet<Strain> = strains.iter().copied().collect();
            assert_eq!(unique.len(), 3);
        }
    }

    #[test]
    fn required_conception_is_always_a_success_kind() {
        for seed in 0..64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            assert!(required_conception(&mut rng).is_success());
        }
    }

    #[test]
    fn strain_pool_holds_two_of_each_strain() {
        for seed in 0..64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let pool = shuffled_strain_pool(&mut rng, ConceptionKind::Aquatic);
            for strain in [Strain::Alpha, Strain::Beta, Strain::Gamma] {
                let count = pool.iter().filter(|member| **member == strain).count();
                assert_eq!(count, 2);
            }
        }
    }

    #[test]
    fn identical_seeds_reproduce_identical_assignments() {
        let mut first = ChaCha8Rng::seed_from_u64(42);
        let mut second = ChaCha8Rng::seed_from_u64(42);
        assert_eq!(shuffled_tags(&mut first), shuffled_tags(&mut second));
        assert_eq!(shuffled_strains(&mut first), shuffled_strains(&mut second));
    }
}
