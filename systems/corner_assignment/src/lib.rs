#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that reserves corners for the three diagonal roles.
//!
//! The assignment is recomputed from the entity view alone on every call, so
//! the validator and the auto-solver always derive the same expected layout.
//! The unused-Perfection holder reserves its strain's home corner
//! unconditionally; Multisplice then walks the corners clockwise and
//! Supersplice counter-clockwise, each taking the first free corner.

use concept_trainer_core::{Corner, EntityId, EntityView, RoleTag, CLOCKWISE, COUNTER_CLOCKWISE};

/// Corner reservation computed for a single diagonal role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiagonalSlot {
    /// Entity filling the role.
    pub entity: EntityId,
    /// Reserved corner, or `None` when the role's walk found every corner
    /// already taken.
    pub corner: Option<Corner>,
}

/// Complete corner assignment for the reposition step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CornerAssignment {
    /// Slot of the unused-Perfection holder; absent when no unfused holder
    /// remains.
    pub priority: Option<DiagonalSlot>,
    /// Slot of the Multisplice entity (clockwise walk).
    pub multisplice: Option<DiagonalSlot>,
    /// Slot of the Supersplice entity (counter-clockwise walk).
    pub supersplice: Option<DiagonalSlot>,
}

/// Derives the corner assignment from current tags and buffs.
///
/// Idempotent: identical views always produce identical assignments.
#[must_use]
pub fn resolve(entities: &EntityView) -> CornerAssignment {
    let mut taken: Vec<Corner> = Vec::with_capacity(3);
    let mut assignment = CornerAssignment::default();

    // The view iterates in id order, so the lowest-id unfused holder is the
    // priority entity even in degenerate multi-holder states.
    let priority = entities
        .iter()
        .find_map(|snapshot| snapshot.perfection().map(|strain| (snapshot.id, strain)));
    if let Some((entity, strain)) = priority {
        let corner = Corner::for_strain(strain);
        taken.push(corner);
        assignment.priority = Some(DiagonalSlot {
            entity,
            corner: Some(corner),
        });
    }

    assignment.multisplice =
        reserve_walk(entities, RoleTag::Multisplice, &CLOCKWISE, &mut taken);
    assignment.supersplice =
        reserve_walk(entities, RoleTag::Supersplice, &COUNTER_CLOCKWISE, &mut taken);

    assignment
}

fn reserve_walk(
    entities: &EntityView,
    tag: RoleTag,
    order: &[Corner; 3],
    taken: &mut Vec<Corner>,
) -> Option<DiagonalSlot> {
    let entity = entities
        .iter()
        .find(|snapshot| snapshot.tag == tag)
        .map(|snapshot| snapshot.id)?;

    let corner = order.iter().copied().find(|corner| !taken.contains(corner));
    if let Some(corner) = corner {
        taken.push(corner);
    }

    Some(DiagonalSlot { entity, corner })
}

#[cfg(test)]
mod tests {
    use super::{resolve, CornerAssignment};
    use concept_trainer_core::{
        Buff, ConceptionKind, Corner, EntityId, EntitySnapshot, EntityView, Position, Role,
        RoleTag, Strain,
    };

    fn snapshot(id: u32, tag: RoleTag, buff: Option<Buff>) -> EntitySnapshot {
        EntitySnapshot {
            id: EntityId::new(id),
            name: "D1",
            role: Role::Dps,
            tag,
            position: Position::new(275.0, 275.0),
            buff,
            fusion_partner: None,
        }
    }

    fn view_with_priority(strain: Strain) -> EntityView {
        EntityView::from_snapshots(vec![
            snapshot(0, RoleTag::AlphaShort, Some(Buff::Perfection(strain))),
            snapshot(1, RoleTag::Multisplice, None),
            snapshot(2, RoleTag::Supersplice, None),
        ])
    }

    fn corner_of(slot: Option<super::DiagonalSlot>) -> Option<Corner> {
        slot.and_then(|slot| slot.corner)
    }

    #[test]
    fn gamma_priority_pushes_multisplice_clockwise_from_a() {
        let assignment = resolve(&view_with_priority(Strain::Gamma));
        assert_eq!(corner_of(assignment.priority), Some(Corner::C));
        assert_eq!(corner_of(assignment.multisplice), Some(Corner::A));
        assert_eq!(corner_of(assignment.supersplice), Some(Corner::B));
    }

    #[test]
    fn alpha_priority_displaces_both_walks() {
        let assignment = resolve(&view_with_priority(Strain::Alpha));
        assert_eq!(corner_of(assignment.priority), Some(Corner::A));
        assert_eq!(corner_of(assignment.multisplice), Some(Corner::B));
        assert_eq!(corner_of(assignment.supersplice), Some(Corner::C));
    }

    #[test]
    fn beta_priority_splits_the_walks_apart() {
        let assignment = resolve(&view_with_priority(Strain::Beta));
        assert_eq!(corner_of(assignment.priority), Some(Corner::B));
        assert_eq!(corner_of(assignment.multisplice), Some(Corner::A));
        assert_eq!(corner_of(assignment.supersplice), Some(Corner::C));
    }

    #[test]
    fn missing_priority_leaves_walks_unobstructed() {
        let view = EntityView::from_snapshots(vec![
            snapshot(0, RoleTag::AlphaShort, Some(Buff::Conception(ConceptionKind::Winged))),
            snapshot(1, RoleTag::Multisplice, None),
            snapshot(2, RoleTag::Supersplice, None),
        ]);

        let assignment = resolve(&view);
        assert_eq!(assignment.priority, None);
        assert_eq!(corner_of(assignment.multisplice), Some(Corner::A));
        assert_eq!(corner_of(assignment.supersplice), Some(Corner::C));
    }

    #[test]
    fn missing_splicers_produce_empty_slots() {
        let view = EntityView::from_snapshots(vec![snapshot(
            0,
            RoleTag::AlphaShort,
            Some(Buff::Perfection(Strain::Beta)),
        )]);

        let assignment = resolve(&view);
        assert_eq!(corner_of(assignment.priority), Some(Corner::B));
        assert_eq!(assignment.multisplice, None);
        assert_eq!(assignment.supersplice, None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let view = view_with_priority(Strain::Gamma);
        let first: CornerAssignment = resolve(&view);
        let second: CornerAssignment = resolve(&view);
        assert_eq!(first, second);
    }
}
