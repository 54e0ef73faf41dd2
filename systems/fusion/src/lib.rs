#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that finds the next fusable Perfection pair.
//!
//! The search is first-match, not globally optimal: unordered pairs are
//! enumerated in ascending id order and the first eligible pair wins, so at
//! most one fusion is proposed per invocation. Repeated invocations resolve
//! further pairs. The first-match order is part of the engine's observable
//! behaviour and must be kept as-is.

use concept_trainer_core::{
    within, ConceptionKind, EntityId, EntityView, Position, Strain, FUSION_RADIUS,
};

/// Strain restriction applied to the fusion candidate pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrainFilter {
    /// Every unfused Perfection holder is a candidate.
    Any,
    /// Only holders of the two listed strains are candidates.
    Restricted(Strain, Strain),
}

impl StrainFilter {
    /// Builds the restriction matching the components of `required`.
    #[must_use]
    pub const fn for_required(required: ConceptionKind) -> Self {
        let (first, second) = required.components();
        Self::Restricted(first, second)
    }

    /// Reports whether a holder of `strain` may participate in fusion.
    #[must_use]
    pub fn admits(&self, strain: Strain) -> bool {
        match self {
            Self::Any => true,
            Self::Restricted(first, second) => strain == *first || strain == *second,
        }
    }
}

/// Fusion proposed by the resolver; committed by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FusionProposal {
    /// Lower-id member of the pair.
    pub first: EntityId,
    /// Higher-id member of the pair.
    pub second: EntityId,
    /// Conception kind the fusion will produce.
    pub kind: ConceptionKind,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    id: EntityId,
    strain: Strain,
    position: Position,
}

/// Finds the first fusable pair among unfused Perfection holders.
///
/// Returns at most one proposal; `None` when no admitted pair stands within
/// the fusion radius.
#[must_use]
pub fn find_fusion(entities: &EntityView, filter: StrainFilter) -> Option<FusionProposal> {
    let candidates = collect_candidates(entities, filter);

    for (index, first) in candidates.iter().enumerate() {
        for second in candidates.iter().skip(index + 1) {
            if within(first.position, second.position, FUSION_RADIUS) {
                return Some(FusionProposal {
                    first: first.id,
                    second: second.id,
                    kind: ConceptionKind::from_fusion(first.strain, second.strain),
                });
            }
        }
    }

    None
}

fn collect_candidates(entities: &EntityView, filter: StrainFilter) -> Vec<Candidate> {
    entities
        .iter()
        .filter_map(|snapshot| {
            snapshot.perfection().map(|strain| Candidate {
                id: snapshot.id,
                strain,
                position: snapshot.position,
            })
        })
        .filter(|candidate| filter.admits(candidate.strain))
        .collect()
}
