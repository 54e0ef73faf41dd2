#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Concept Trainer.
//!
//! The world owns the entity pool, the tower board, and the phase machine.
//! It mutates exclusively through [`apply`], broadcasting [`Event`] values
//! that describe what actually happened, and exposes read-only state through
//! the [`query`] module.

mod assignment;
mod towers;

use concept_trainer_core::{
    within, AdvanceError, Buff, Command, ConceptionKind, EntityId, Event, FusionError,
    MechanicStep, MoveError, Position, Role, RoleTag, Strain, TagTimer, TowerElement,
    ARENA_CENTER, FUSION_RADIUS, ROSTER,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use towers::TowerBoard;

const ROLE_ASSIGNMENT_SEED: u64 = 0x7a1e_5eed_90c3_41d7;

/// Radius of the circle entities spawn on after a reset.
const SPAWN_RADIUS: f32 = 200.0;

/// Represents the authoritative Concept Trainer world state.
#[derive(Debug)]
pub struct World {
    entities: Vec<Entity>,
    towers: TowerBoard,
    step: MechanicStep,
    solved: bool,
    required_conception: Option<ConceptionKind>,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a new world seeded with the default assignment seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(ROLE_ASSIGNMENT_SEED)
    }

    /// Creates a new world whose random assignments derive from `seed`.
    ///
    /// Identical seeds reproduce identical sessions.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let mut world = Self {
            entities: Vec::new(),
            towers: TowerBoard::new(),
            step: MechanicStep::Spread,
            solved: false,
            required_conception: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        world.reset_session();
        world
    }

    fn reset_session(&mut self) {
        let tags = assignment::shuffled_tags(&mut self.rng);
        self.entities = ROSTER
            .iter()
            .enumerate()
            .map(|(index, entry)| Entity {
                id: EntityId::new(index as u32),
                name: entry.name,
                role: entry.role,
                tag: tags[index],
                position: spawn_position(index),
                buff: None,
                fusion_partner: None,
            })
            .collect();
        self.towers.reset();
        self.step = MechanicStep::Spread;
        self.solved = false;
        self.required_conception = None;
    }

    fn entity(&self, entity: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|candidate| candidate.id == entity)
    }

    fn entity_mut(&mut self, entity: EntityId) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .find(|candidate| candidate.id == entity)
    }

    fn validate_fusion(
        &self,
        first: EntityId,
        second: EntityId,
    ) -> Result<ConceptionKind, FusionError> {
        if first == second {
            return Err(FusionError::SelfFusion);
        }

        let first_entity = self.entity(first).ok_or(FusionError::UnknownEntity)?;
        let second_entity = self.entity(second).ok_or(FusionError::UnknownEntity)?;

        let first_strain = perfection_strain(first_entity)?;
        let second_strain = perfection_strain(second_entity)?;

        if !within(first_entity.position, second_entity.position, FUSION_RADIUS) {
            return Err(FusionError::OutOfRange);
        }

        Ok(ConceptionKind::from_fusion(first_strain, second_strain))
    }

    fn enter_gamma_phase(&mut self, out_events: &mut Vec<Event>) {
        let strains = assignment::shuffled_strains(&mut self.rng);
        let mut next_strain = strains.into_iter();
        for entity in self.entities.iter_mut() {
            if entity.tag.timer() == Some(TagTimer::Short) {
                if let Some(strain) = next_strain.next() {
                    entity.buff = Some(Buff::Perfection(strain));
                }
            }
        }

        let required = assignment::required_conception(&mut self.rng);
        let element = required.element().unwrap_or(TowerElement::Wind);
        self.required_conception = Some(required);
        self.towers.spawn_first_set(element);
        self.step = MechanicStep::FirstFusion;
        self.solved = false;

        out_events.push(Event::StepEntered { step: self.step });
        out_events.push(Event::TowersSpawned { count: 2, element });
    }

    fn enter_final_phase(&mut self, out_events: &mut Vec<Event>) {
        for entity in self.entities.iter_mut() {
            entity.buff = None;
            entity.fusion_partner = None;
        }

        let required = assignment::required_conception(&mut self.rng);
        let pool = assignment::shuffled_strain_pool(&mut self.rng, required);
        let mut next_strain = pool.into_iter();
        for entity in self.entities.iter_mut() {
            if entity.tag.strain().is_some() {
                if let Some(strain) = next_strain.next() {
                    entity.buff = Some(Buff::Perfection(strain));
                }
            }
        }

        let element = required.element().unwrap_or(TowerElement::Wind);
        self.required_conception = Some(required);
        self.towers.spawn_final_set(element);
        self.step = MechanicStep::SecondFusion;
        self.solved = false;

        out_events.push(Event::StepEntered { step: self.step });
        out_events.push(Event::TowersSpawned { count: 4, element });
    }
}

fn perfection_strain(entity: &Entity) -> Result<Strain, FusionError> {
    match entity.buff {
        Some(Buff::Perfection(strain)) => Ok(strain),
        Some(Buff::Conception(_)) => Err(FusionError::AlreadyFused),
        None => Err(FusionError::MissingPerfection),
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::MoveEntity { entity, x, y } => match world.entity_mut(entity) {
            Some(found) => {
                found.position = Position::new(x, y);
                out_events.push(Event::EntityMoved {
                    entity,
                    position: found.position,
                });
            }
            None => out_events.push(Event::MoveRejected {
                entity,
                reason: MoveError::UnknownEntity,
            }),
        },
        Command::CommitFusion { first, second } => match world.validate_fusion(first, second) {
            Ok(kind) => {
                if let Some(entity) = world.entity_mut(first) {
                    entity.buff = Some(Buff::Conception(kind));
                    entity.fusion_partner = Some(second);
                }
                if let Some(entity) = world.entity_mut(second) {
                    entity.buff = Some(Buff::Conception(kind));
                    entity.fusion_partner = Some(first);
                }
                out_events.push(Event::FusionCommitted {
                    first,
                    second,
                    kind,
                });
            }
            Err(reason) => out_events.push(Event::FusionRejected {
                first,
                second,
                reason,
            }),
        },
        Command::EnterStep { step } => {
            world.step = step;
            world.solved = false;
            out_events.push(Event::StepEntered { step });
        }
        Command::MarkSolved => {
            if matches!(
                world.step,
                MechanicStep::Spread | MechanicStep::Reposition | MechanicStep::FinalSoak
            ) {
                world.solved = true;
                out_events.push(Event::StepSolved { step: world.step });
            }
        }
        Command::ClearTowers => {
            world.towers.clear();
            out_events.push(Event::TowersCleared);
        }
        Command::AdvancePhase => {
            if !world.solved {
                out_events.push(Event::PhaseAdvanceRejected {
                    reason: AdvanceError::NotSolved,
                });
            } else {
                match world.step {
                    MechanicStep::Spread => world.enter_gamma_phase(out_events),
                    MechanicStep::Reposition => world.enter_final_phase(out_events),
                    MechanicStep::FinalSoak => out_events.push(Event::PhaseAdvanceRejected {
                        reason: AdvanceError::MechanicComplete,
                    }),
                    MechanicStep::FirstFusion
                    | MechanicStep::FirstSoak
                    | MechanicStep::SecondFusion => {
                        out_events.push(Event::PhaseAdvanceRejected {
                            reason: AdvanceError::NotSolved,
                        });
                    }
                }
            }
        }
        Command::Reset => {
            world.reset_session();
            out_events.push(Event::SessionReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use concept_trainer_core::{EntitySnapshot, EntityView, PhaseView, TowerView};

    /// Captures a read-only view of the entities participating in the mechanic.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        let snapshots: Vec<EntitySnapshot> = world
            .entities
            .iter()
            .map(|entity| EntitySnapshot {
                id: entity.id,
                name: entity.name,
                role: entity.role,
                tag: entity.tag,
                position: entity.position,
                buff: entity.buff,
                fusion_partner: entity.fusion_partner,
            })
            .collect();
        EntityView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of the towers currently on the board.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.snapshots())
    }

    /// Captures the phase machine descriptor for display and systems.
    #[must_use]
    pub fn phase_view(world: &World) -> PhaseView {
        PhaseView {
            step: world.step,
            solved: world.solved,
            required_conception: world.required_conception,
        }
    }
}

/// Test-only rigging utilities for deterministic system tests.
///
/// Enabled through the `trainer_scaffolding` feature; never part of the
/// production surface.
#[cfg(feature = "trainer_scaffolding")]
pub mod scaffolding {
    use super::World;
    use concept_trainer_core::{
        Buff, ConceptionKind, EntityId, MechanicStep, RoleTag, TowerElement, ENTITY_COUNT,
    };

    /// Overwrites every entity's role tag in entity-id order.
    pub fn assign_tags(world: &mut World, tags: [RoleTag; ENTITY_COUNT]) {
        for (entity, tag) in world.entities.iter_mut().zip(tags) {
            entity.tag = tag;
        }
    }

    /// Overwrites the buff carried by the provided entity.
    pub fn set_buff(world: &mut World, entity: EntityId, buff: Option<Buff>) {
        if let Some(found) = world.entity_mut(entity) {
            found.buff = buff;
        }
    }

    /// Records a symmetric fusion partnership between two entities.
    pub fn link_partners(world: &mut World, first: EntityId, second: EntityId) {
        if let Some(found) = world.entity_mut(first) {
            found.fusion_partner = Some(second);
        }
        if let Some(found) = world.entity_mut(second) {
            found.fusion_partner = Some(first);
        }
    }

    /// Forces the phase machine onto the provided step.
    pub fn set_step(world: &mut World, step: MechanicStep) {
        world.step = step;
        world.solved = false;
    }

    /// Marks the current step as solved.
    pub fn mark_solved(world: &mut World) {
        world.solved = true;
    }

    /// Overwrites the Conception kind the current phase demands.
    pub fn set_required_conception(world: &mut World, kind: Option<ConceptionKind>) {
        world.required_conception = kind;
    }

    /// Spawns the two-tower set with the provided element.
    pub fn spawn_first_towers(world: &mut World, element: TowerElement) {
        world.towers.spawn_first_set(element);
    }

    /// Spawns the four-tower set with the provided element.
    pub fn spawn_final_towers(world: &mut World, element: TowerElement) {
        world.towers.spawn_final_set(element);
    }

    /// Removes every tower from the board.
    pub fn clear_towers(world: &mut World) {
        world.towers.clear();
    }
}

#[derive(Clone, Copy, Debug)]
struct Entity {
    id: EntityId,
    name: &'static str,
    role: Role,
    tag: RoleTag,
    position: Position,
    buff: Option<Buff>,
    fusion_partner: Option<EntityId>,
}

fn spawn_position(index: usize) -> Position {
    let angle = (index as f32 / ROSTER.len() as f32) * std::f32::consts::TAU;
    Position::new(
        ARENA_CENTER.x() + angle.cos() * SPAWN_RADIUS,
        ARENA_CENTER.y() + angle.sin() * SPAWN_RADIUS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use concept_trainer_core::ALL_ROLE_TAGS;
    use std::collections::BTreeSet;

    fn find_by_tag(world: &World, tag: RoleTag) -> EntityId {
        world
            .entities
            .iter()
            .find(|entity| entity.tag == tag)
            .map(|entity| entity.id)
            .expect("tag is always assigned")
    }

    #[test]
    fn reset_assigns_a_full_tag_permutation() {
        let world = World::with_seed(7);
        let tags: BTreeSet<RoleTag> = world.entities.iter().map(|entity| entity.tag).collect();
        assert_eq!(tags.len(), ALL_ROLE_TAGS.len());
    }

    #[test]
    fn identical_seeds_produce_identical_sessions() {
        let first = World::with_seed(99);
        let second = World::with_seed(99);
        let first_tags: Vec<RoleTag> = first.entities.iter().map(|entity| entity.tag).collect();
        let second_tags: Vec<RoleTag> = second.entities.iter().map(|entity| entity.tag).collect();
        assert_eq!(first_tags, second_tags);
    }

    #[test]
    fn move_entity_updates_the_position() {
        let mut world = World::with_seed(1);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveEntity {
                entity: EntityId::new(3),
                x: 120.0,
                y: 340.0,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::EntityMoved {
                entity: EntityId::new(3),
                position: Position::new(120.0, 340.0),
            }]
        );
    }

    #[test]
    fn moving_an_unknown_entity_fails_fast() {
        let mut world = World::with_seed(1);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveEntity {
                entity: EntityId::new(42),
                x: 0.0,
                y: 0.0,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::MoveRejected {
                entity: EntityId::new(42),
                reason: MoveError::UnknownEntity,
            }]
        );
    }

    #[test]
    fn advancing_an_unsolved_phase_is_rejected_without_mutation() {
        let mut world = World::with_seed(1);
        let mut events = Vec::new();

        apply(&mut world, Command::AdvancePhase, &mut events);

        assert_eq!(
            events,
            vec![Event::PhaseAdvanceRejected {
                reason: AdvanceError::NotSolved,
            }]
        );
        assert_eq!(world.step, MechanicStep::Spread);
        assert!(world.entities.iter().all(|entity| entity.buff.is_none()));
    }

    #[test]
    fn solved_spread_advance_seeds_perfection_and_towers() {
        let mut world = World::with_seed(5);
        let mut events = Vec::new();

        apply(&mut world, Command::MarkSolved, &mut events);
        apply(&mut world, Command::AdvancePhase, &mut events);

        assert_eq!(world.step, MechanicStep::FirstFusion);
        assert!(!world.solved);

        let holders: Vec<&Entity> = world
            .entities
            .iter()
            .filter(|entity| matches!(entity.buff, Some(Buff::Perfection(_))))
            .collect();
        assert_eq!(holders.len(), 3);
        assert!(holders
            .iter()
            .all(|entity| entity.tag.timer() == Some(TagTimer::Short)));

        let strains: BTreeSet<Strain> = holders
            .iter()
            .filter_map(|entity| match entity.buff {
                Some(Buff::Perfection(strain)) => Some(strain),
                _ => None,
            })
            .collect();
        assert_eq!(strains.len(), 3);

        let required = world.required_conception.expect("required kind derived");
        assert!(required.is_success());
        assert_eq!(world.towers.snapshots().len(), 2);
        assert!(world
            .towers
            .snapshots()
            .iter()
            .all(|tower| Some(tower.element) == required.element()));
    }

    #[test]
    fn fusion_commits_symmetrically_within_range() {
        let mut world = World::with_seed(5);
        let mut events = Vec::new();
        apply(&mut world, Command::MarkSolved, &mut events);
        apply(&mut world, Command::AdvancePhase, &mut events);

        let first = find_by_tag(&world, RoleTag::AlphaShort);
        let second = find_by_tag(&world, RoleTag::BetaShort);
        let strain_of = |world: &World, entity: EntityId| match world
            .entity(entity)
            .and_then(|entity| entity.buff)
        {
            Some(Buff::Perfection(strain)) => strain,
            other => panic!("short tags hold Perfection at phase entry, got {other:?}"),
        };
        let expected = ConceptionKind::from_fusion(
            strain_of(&world, first),
            strain_of(&world, second),
        );

        apply(
            &mut world,
            Command::MoveEntity {
                entity: first,
                x: 250.0,
                y: 250.0,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MoveEntity {
                entity: second,
                x: 300.0,
                y: 250.0,
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::CommitFusion { first, second },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::FusionCommitted {
                first,
                second,
                kind: expected,
            }]
        );
        assert!(expected.is_success(), "distinct strains fuse successfully");

        let first_entity = world.entity(first).expect("entity exists");
        let second_entity = world.entity(second).expect("entity exists");
        assert_eq!(first_entity.buff, Some(Buff::Conception(expected)));
        assert_eq!(first_entity.fusion_partner, Some(second));
        assert_eq!(second_entity.fusion_partner, Some(first));
    }

    #[test]
    fn fusion_out_of_range_is_rejected() {
        let mut world = World::with_seed(5);
        let mut events = Vec::new();
        apply(&mut world, Command::MarkSolved, &mut events);
        apply(&mut world, Command::AdvancePhase, &mut events);

        let first = find_by_tag(&world, RoleTag::AlphaShort);
        let second = find_by_tag(&world, RoleTag::BetaShort);
        apply(
            &mut world,
            Command::MoveEntity {
                entity: first,
                x: 0.0,
                y: 0.0,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MoveEntity {
                entity: second,
                x: 500.0,
                y: 500.0,
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::CommitFusion { first, second },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::FusionRejected {
                first,
                second,
                reason: FusionError::OutOfRange,
            }]
        );
        assert!(world
            .entity(first)
            .is_some_and(|entity| entity.fusion_partner.is_none()));
    }

    #[test]
    fn final_phase_entry_deals_two_of_each_strain_to_strain_tags() {
        let mut world = World::with_seed(11);
        let mut events = Vec::new();
        apply(&mut world, Command::MarkSolved, &mut events);
        apply(&mut world, Command::AdvancePhase, &mut events);

        // Walk the machine to the reposition step before advancing again.
        apply(
            &mut world,
            Command::EnterStep {
                step: MechanicStep::Reposition,
            },
            &mut events,
        );
        apply(&mut world, Command::MarkSolved, &mut events);
        apply(&mut world, Command::AdvancePhase, &mut events);

        assert_eq!(world.step, MechanicStep::SecondFusion);
        assert_eq!(world.towers.snapshots().len(), 4);

        let mut counts = std::collections::BTreeMap::new();
        for entity in &world.entities {
            match entity.buff {
                Some(Buff::Perfection(strain)) => {
                    *counts.entry(strain).or_insert(0usize) += 1;
                    assert!(entity.tag.strain().is_some());
                }
                Some(Buff::Conception(_)) => panic!("no conception at phase entry"),
                None => assert!(entity.tag.is_splicer()),
            }
        }
        assert_eq!(counts.len(), 3);
        assert!(counts.values().all(|count| *count == 2));
    }

    #[test]
    fn reset_clears_buffs_towers_and_phase_state() {
        let mut world = World::with_seed(13);
        let mut events = Vec::new();
        apply(&mut world, Command::MarkSolved, &mut events);
        apply(&mut world, Command::AdvancePhase, &mut events);
        events.clear();

        apply(&mut world, Command::Reset, &mut events);

        assert_eq!(events, vec![Event::SessionReset]);
        assert_eq!(world.step, MechanicStep::Spread);
        assert!(!world.solved);
        assert_eq!(world.required_conception, None);
        assert!(world.towers.snapshots().is_empty());
        assert!(world.entities.iter().all(|entity| entity.buff.is_none()));
    }

    #[test]
    fn mark_solved_is_ignored_mid_phase() {
        let mut world = World::with_seed(17);
        let mut events = Vec::new();
        apply(&mut world, Command::MarkSolved, &mut events);
        apply(&mut world, Command::AdvancePhase, &mut events);
        events.clear();

        apply(&mut world, Command::MarkSolved, &mut events);

        assert!(events.is_empty());
        assert!(!world.solved);
    }
}
