#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic placement system mirroring each validator rule.
//!
//! For the active step it computes, from views alone, a position for every
//! entity that the validator will accept. Tags and buffs are never touched.
//! Kept in lock-step with the validator: any rule change there must be
//! reflected here, or solving and re-checking stops passing.

use concept_trainer_core::{
    Command, ConceptionKind, Corner, EntityId, EntityView, MechanicStep, PhaseView, Position,
    Strain, TagTimer, TowerView,
};
use concept_trainer_system_corner_assignment as corner_assignment;

/// Spots the first fusion pair is parked on, mid-arena between the towers.
const FUSION_SPOTS: [Position; 2] = [Position::new(205.0, 275.0), Position::new(265.0, 275.0)];

/// Spots for the two second-fusion pairs; pairs are internally inside the
/// fusion radius and mutually far outside it.
const PAIR_SPOTS: [[Position; 2]; 2] = [
    [Position::new(100.0, 250.0), Position::new(100.0, 310.0)],
    [Position::new(450.0, 250.0), Position::new(450.0, 310.0)],
];

/// Shelter spots inside the safe region for fused pairs.
const SAFE_SPOTS: [Position; 3] = [
    Position::new(60.0, 60.0),
    Position::new(130.0, 60.0),
    Position::new(60.0, 130.0),
];

/// Computes a passing position for every entity in the current step.
///
/// Returns one `MoveEntity` command per entity, in entity-id order.
#[must_use]
pub fn solve(entities: &EntityView, towers: &TowerView, phase: PhaseView) -> Vec<Command> {
    let placements = match phase.step {
        MechanicStep::Spread => solve_spread(entities),
        MechanicStep::FirstFusion => solve_first_fusion(entities, phase),
        MechanicStep::FirstSoak | MechanicStep::FinalSoak => solve_soak(entities, towers),
        MechanicStep::Reposition => solve_reposition(entities),
        MechanicStep::SecondFusion => solve_second_fusion(entities, phase),
    };

    placements
        .into_iter()
        .map(|(entity, position)| Command::MoveEntity {
            entity,
            x: position.x(),
            y: position.y(),
        })
        .collect()
}

fn solve_spread(entities: &EntityView) -> Vec<(EntityId, Position)> {
    entities
        .iter()
        .map(|snapshot| (snapshot.id, snapshot.tag.spread_waymark().position()))
        .collect()
}

fn solve_first_fusion(entities: &EntityView, phase: PhaseView) -> Vec<(EntityId, Position)> {
    let holders = perfection_holders(entities);
    let pair = preferred_pair(&holders, phase.required_conception);

    let mut idle = IdleRow::new();
    entities
        .iter()
        .map(|snapshot| {
            let position = match pair {
                Some((first, _)) if snapshot.id == first => FUSION_SPOTS[0],
                Some((_, second)) if snapshot.id == second => FUSION_SPOTS[1],
                _ => idle.next_spot(),
            };
            (snapshot.id, position)
        })
        .collect()
}

fn solve_second_fusion(entities: &EntityView, phase: PhaseView) -> Vec<(EntityId, Position)> {
    let holders = perfection_holders(entities);
    let mut pairs: Vec<(EntityId, EntityId)> = Vec::new();

    if let Some((first_strain, second_strain)) =
        phase.required_conception.map(|required| required.components())
    {
        let first_pool = holders
            .iter()
            .filter(|(_, strain)| *strain == first_strain)
            .map(|(id, _)| *id);
        let second_pool = holders
            .iter()
            .filter(|(_, strain)| *strain == second_strain)
            .map(|(id, _)| *id);
        pairs = first_pool
            .zip(second_pool)
            .take(PAIR_SPOTS.len())
            .collect();
    }

    let mut idle = IdleRow::new();
    entities
        .iter()
        .map(|snapshot| {
            let slot = pairs.iter().enumerate().find_map(|(index, (first, second))| {
                if snapshot.id == *first {
                    Some(PAIR_SPOTS[index][0])
                } else if snapshot.id == *second {
                    Some(PAIR_SPOTS[index][1])
                } else {
                    None
                }
            });
            let position = slot.unwrap_or_else(|| idle.next_spot());
            (snapshot.id, position)
        })
        .collect()
}

fn solve_soak(entities: &EntityView, towers: &TowerView) -> Vec<(EntityId, Position)> {
    let tower_positions: Vec<Position> = towers.iter().map(|tower| tower.position).collect();
    let soakers: Vec<EntityId> = entities
        .iter()
        .filter(|snapshot| snapshot.conception().is_some())
        .map(|snapshot| snapshot.id)
        .collect();

    let mut idle = IdleRow::new();
    entities
        .iter()
        .map(|snapshot| {
            let position = soakers
                .iter()
                .position(|soaker| *soaker == snapshot.id)
                .and_then(|index| tower_positions.get(index).copied())
                .unwrap_or_else(|| idle.next_spot());
            (snapshot.id, position)
        })
        .collect()
}

fn solve_reposition(entities: &EntityView) -> Vec<(EntityId, Position)> {
    let assignment = corner_assignment::resolve(entities);
    let diagonal_of = |entity: EntityId| {
        [
            assignment.priority,
            assignment.multisplice,
            assignment.supersplice,
        ]
        .into_iter()
        .flatten()
        .find(|slot| slot.entity == entity)
        .and_then(|slot| slot.corner)
        .map(|corner| corner.diagonal())
    };

    let mut safe_spots = SAFE_SPOTS.iter().copied();
    let mut idle = IdleRow::new();
    entities
        .iter()
        .map(|snapshot| {
            let position = if snapshot.tag.timer() == Some(TagTimer::Long) {
                snapshot
                    .tag
                    .strain()
                    .map(|strain| Corner::for_strain(strain).position())
                    .unwrap_or_else(|| idle.next_spot())
            } else if let Some(diagonal) = diagonal_of(snapshot.id) {
                diagonal
            } else if snapshot.conception().is_some() {
                safe_spots.next().unwrap_or_else(|| idle.next_spot())
            } else {
                idle.next_spot()
            };
            (snapshot.id, position)
        })
        .collect()
}

fn perfection_holders(entities: &EntityView) -> Vec<(EntityId, Strain)> {
    entities
        .iter()
        .filter_map(|snapshot| snapshot.perfection().map(|strain| (snapshot.id, strain)))
        .collect()
}

fn preferred_pair(
    holders: &[(EntityId, Strain)],
    required: Option<ConceptionKind>,
) -> Option<(EntityId, EntityId)> {
    if let Some((first_strain, second_strain)) = required.map(|kind| kind.components()) {
        let first = holders
            .iter()
            .find(|(_, strain)| *strain == first_strain)
            .map(|(id, _)| *id);
        let second = holders
            .iter()
            .find(|(id, strain)| *strain == second_strain && Some(*id) != first)
            .map(|(id, _)| *id);
        if let (Some(first), Some(second)) = (first, second) {
            return Some((first, second));
        }
    }

    match holders {
        [(first, _), (second, _), ..] => Some((*first, *second)),
        _ => None,
    }
}

/// Parking line along the south edge, clear of every tower radius.
struct IdleRow {
    next: usize,
}

impl IdleRow {
    const fn new() -> Self {
        Self { next: 0 }
    }

    fn next_spot(&mut self) -> Position {
        let spot = Position::new(30.0 + 65.0 * self.next as f32, 530.0);
        self.next += 1;
        spot
    }
}

#[cfg(test)]
mod tests {
    use super::solve;
    use concept_trainer_core::{
        within, Buff, Command, ConceptionKind, EntityId, EntitySnapshot, EntityView, MechanicStep,
        PhaseView, Position, Role, RoleTag, Strain, TowerElement, TowerId, TowerSnapshot,
        TowerView, ALL_ROLE_TAGS, ANCHOR_TOLERANCE, FUSION_RADIUS, ROSTER,
    };

    fn party() -> Vec<EntitySnapshot> {
        ALL_ROLE_TAGS
            .iter()
            .enumerate()
            .map(|(index, tag)| EntitySnapshot {
                id: EntityId::new(index as u32),
                name: ROSTER[index].name,
                role: ROSTER[index].role,
                tag: *tag,
                position: Position::new(275.0, 275.0),
                buff: None,
                fusion_partner: None,
            })
            .collect()
    }

    fn phase(step: MechanicStep, required: Option<ConceptionKind>) -> PhaseView {
        PhaseView {
            step,
            solved: false,
            required_conception: required,
        }
    }

    fn position_of(commands: &[Command], entity: u32) -> Position {
        commands
            .iter()
            .find_map(|command| match command {
                Command::MoveEntity { entity: id, x, y } if id.get() == entity => {
                    Some(Position::new(*x, *y))
                }
                _ => None,
            })
            .expect("every entity is placed")
    }

    #[test]
    fn every_step_places_all_eight_entities() {
        let view = EntityView::from_snapshots(party());
        for step in [
            MechanicStep::Spread,
            MechanicStep::FirstFusion,
            MechanicStep::FirstSoak,
            MechanicStep::Reposition,
            MechanicStep::SecondFusion,
            MechanicStep::FinalSoak,
        ] {
            let commands = solve(&view, &TowerView::default(), phase(step, None));
            assert_eq!(commands.len(), 8, "step {step:?}");
        }
    }

    #[test]
    fn spread_places_every_tag_on_its_waymark() {
        let view = EntityView::from_snapshots(party());
        let commands = solve(&view, &TowerView::default(), phase(MechanicStep::Spread, None));

        for snapshot in view.iter() {
            let placed = position_of(&commands, snapshot.id.get());
            assert_eq!(placed, snapshot.tag.spread_waymark().position());
        }
    }

    #[test]
    fn first_fusion_parks_the_required_pair_together_and_the_rest_apart() {
        let mut snapshots = party();
        let strains = [
            (RoleTag::AlphaShort, Strain::Alpha),
            (RoleTag::BetaShort, Strain::Beta),
            (RoleTag::GammaShort, Strain::Gamma),
        ];
        for snapshot in snapshots.iter_mut() {
            if let Some((_, strain)) = strains.iter().find(|(tag, _)| *tag == snapshot.tag) {
                snapshot.buff = Some(Buff::Perfection(*strain));
            }
        }
        let view = EntityView::from_snapshots(snapshots);

        let commands = solve(
            &view,
            &TowerView::default(),
            phase(MechanicStep::FirstFusion, Some(ConceptionKind::Shocking)),
        );

        // Shocking fuses Beta + Gamma; the Alpha holder must stay out of reach.
        let beta = position_of(&commands, 2);
        let gamma = position_of(&commands, 4);
        let alpha = position_of(&commands, 0);
        assert!(within(beta, gamma, FUSION_RADIUS));
        assert!(!within(alpha, beta, FUSION_RADIUS));
        assert!(!within(alpha, gamma, FUSION_RADIUS));
    }

    #[test]
    fn soak_assigns_conception_holders_to_towers_and_idles_the_rest() {
        let mut snapshots = party();
        snapshots[0].buff = Some(Buff::Conception(ConceptionKind::Winged));
        snapshots[0].fusion_partner = Some(EntityId::new(2));
        snapshots[2].buff = Some(Buff::Conception(ConceptionKind::Winged));
        snapshots[2].fusion_partner = Some(EntityId::new(0));
        let view = EntityView::from_snapshots(snapshots);

        let towers = TowerView::from_snapshots(vec![
            TowerSnapshot {
                id: TowerId::new(0),
                name: "North Tower",
                position: Position::new(270.0, 120.0),
                element: TowerElement::Wind,
            },
            TowerSnapshot {
                id: TowerId::new(1),
                name: "South Tower",
                position: Position::new(270.0, 380.0),
                element: TowerElement::Wind,
            },
        ]);

        let commands = solve(&view, &towers, phase(MechanicStep::FirstSoak, None));

        assert_eq!(position_of(&commands, 0), Position::new(270.0, 120.0));
        assert_eq!(position_of(&commands, 2), Position::new(270.0, 380.0));
        for tower in towers.iter() {
            for entity in [1u32, 3, 4, 5, 6, 7] {
                assert!(!within(
                    position_of(&commands, entity),
                    tower.position,
                    ANCHOR_TOLERANCE
                ));
            }
        }
    }

    #[test]
    fn second_fusion_builds_two_mutually_distant_pairs() {
        let mut snapshots = party();
        // Required Winged: Alpha and Beta fuse, Gamma is incompatible.
        let deals = [
            (RoleTag::AlphaShort, Strain::Alpha),
            (RoleTag::AlphaLong, Strain::Alpha),
            (RoleTag::BetaShort, Strain::Beta),
            (RoleTag::BetaLong, Strain::Beta),
            (RoleTag::GammaShort, Strain::Gamma),
            (RoleTag::GammaLong, Strain::Gamma),
        ];
        for snapshot in snapshots.iter_mut() {
            if let Some((_, strain)) = deals.iter().find(|(tag, _)| *tag == snapshot.tag) {
                snapshot.buff = Some(Buff::Perfection(*strain));
            }
        }
        let view = EntityView::from_snapshots(snapshots);

        let commands = solve(
            &view,
            &TowerView::default(),
            phase(MechanicStep::SecondFusion, Some(ConceptionKind::Winged)),
        );

        // Alpha holders are entities 0 and 1, Beta holders 2 and 3.
        let pair_one = (position_of(&commands, 0), position_of(&commands, 2));
        let pair_two = (position_of(&commands, 1), position_of(&commands, 3));
        assert!(within(pair_one.0, pair_one.1, FUSION_RADIUS));
        assert!(within(pair_two.0, pair_two.1, FUSION_RADIUS));
        assert!(!within(pair_one.0, pair_two.0, FUSION_RADIUS));
        assert!(!within(pair_one.1, pair_two.1, FUSION_RADIUS));
    }
}
