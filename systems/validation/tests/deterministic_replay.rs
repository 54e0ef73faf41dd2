use concept_trainer_core::{Command, Event, MechanicStep};
use concept_trainer_system_validation as validation;
use concept_trainer_world::{self as world, query, World};

/// Replays a scripted session: park everyone on their spread waymark, check,
/// advance, and run one fusion check. Identical seeds must produce identical
/// event logs and final states.
fn replay(seed: u64) -> ReplayOutcome {
    let mut world = World::with_seed(seed);
    let mut log: Vec<String> = Vec::new();

    let moves: Vec<Command> = query::entity_view(&world)
        .into_vec()
        .into_iter()
        .map(|snapshot| {
            let target = snapshot.tag.spread_waymark().position();
            Command::MoveEntity {
                entity: snapshot.id,
                x: target.x(),
                y: target.y(),
            }
        })
        .collect();
    run(&mut world, moves, &mut log);

    run_check(&mut world, &mut log);
    run(&mut world, vec![Command::AdvancePhase], &mut log);
    run_check(&mut world, &mut log);

    let entities: Vec<String> = query::entity_view(&world)
        .into_vec()
        .into_iter()
        .map(|snapshot| format!("{snapshot:?}"))
        .collect();

    ReplayOutcome {
        step: query::phase_view(&world).step,
        entities,
        log,
    }
}

fn run(world: &mut World, commands: Vec<Command>, log: &mut Vec<String>) {
    for command in commands {
        let mut events: Vec<Event> = Vec::new();
        world::apply(world, command, &mut events);
        log.extend(events.iter().map(|event| format!("{event:?}")));
    }
}

fn run_check(world: &mut World, log: &mut Vec<String>) {
    let outcome = validation::check(
        &query::entity_view(world),
        &query::tower_view(world),
        query::phase_view(world),
    );
    log.extend(
        outcome
            .report
            .violations
            .iter()
            .map(|violation| violation.to_string()),
    );
    run(world, outcome.commands, log);
}

#[test]
fn deterministic_replay_produces_identical_outcomes() {
    let first = replay(2024);
    let second = replay(2024);
    assert_eq!(first, second, "replay diverged between runs");
}

#[test]
fn the_scripted_session_reaches_the_fusion_phase() {
    let outcome = replay(2024);
    assert!(matches!(
        outcome.step,
        MechanicStep::FirstFusion | MechanicStep::FirstSoak
    ));
}

#[derive(Debug, PartialEq, Eq)]
struct ReplayOutcome {
    step: MechanicStep,
    entities: Vec<String>,
    log: Vec<String>,
}
