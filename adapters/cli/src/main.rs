#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a Concept Trainer session.
//!
//! The adapter owns the synchronous wiring between the authoritative world
//! and the pure systems: it submits commands, renders broadcast events and
//! validation reports as text, and never computes rules itself.

mod layout_transfer;

use std::io::{self, BufRead, Write as _};

use anyhow::{Context, Result};
use clap::Parser;
use concept_trainer_core::{
    Buff, Classification, Command, EntityId, Event, MechanicStep, POSITION_MAX, POSITION_MIN,
};
use concept_trainer_system_auto_solver as auto_solver;
use concept_trainer_system_validation as validation;
use concept_trainer_world::{self as world, query, World};
use layout_transfer::ArrangementSnapshot;

/// Interactive trainer for the High Concept positioning mechanic.
#[derive(Debug, Parser)]
#[command(name = "concept-trainer", version, about)]
struct Args {
    /// Seed for the session's random assignments; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut session = Session::new(seed);
    println!("Concept Trainer (seed {seed})");
    println!("Type 'help' for the command list.");
    session.show();

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush().context("flushing the prompt")?;
        line.clear();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("reading a command")?;
        if read == 0 {
            break;
        }
        if !session.dispatch(line.trim()) {
            break;
        }
    }

    Ok(())
}

struct Session {
    world: World,
}

impl Session {
    fn new(seed: u64) -> Self {
        Self {
            world: World::with_seed(seed),
        }
    }

    /// Executes one REPL line; returns false when the session should end.
    fn dispatch(&mut self, line: &str) -> bool {
        let mut parts = line.split_whitespace();
        match parts.next() {
            None => true,
            Some("help") => {
                print_help();
                true
            }
            Some("show") => {
                self.show();
                true
            }
            Some("move") => {
                self.move_entity(parts.next(), parts.next(), parts.next());
                true
            }
            Some("check") => {
                self.check();
                true
            }
            Some("next") => {
                self.advance();
                true
            }
            Some("solve") => {
                self.solve();
                true
            }
            Some("reset") => {
                let _ = self.apply(Command::Reset);
                self.show();
                true
            }
            Some("export") => {
                self.export();
                true
            }
            Some("import") => {
                self.import(parts.next());
                true
            }
            Some("quit") | Some("exit") => false,
            Some(other) => {
                println!("Unknown command '{other}'; type 'help'.");
                true
            }
        }
    }

    fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        for event in &events {
            log::debug!("event: {event:?}");
            if let Some(feedback) = self.describe(event) {
                println!("{feedback}");
            }
        }
        events
    }

    fn move_entity(&mut self, name: Option<&str>, x: Option<&str>, y: Option<&str>) {
        let (Some(name), Some(x), Some(y)) = (name, x, y) else {
            println!("Usage: move <entity> <x> <y>");
            return;
        };
        let Some(entity) = self.lookup(name) else {
            println!("No entity named '{name}'.");
            return;
        };
        let (Ok(x), Ok(y)) = (x.parse::<f32>(), y.parse::<f32>()) else {
            println!("Coordinates must be numbers.");
            return;
        };

        // The engine expects pre-clamped coordinates.
        let x = x.clamp(POSITION_MIN, POSITION_MAX);
        let y = y.clamp(POSITION_MIN, POSITION_MAX);
        let _ = self.apply(Command::MoveEntity { entity, x, y });
    }

    fn check(&mut self) {
        let outcome = validation::check(
            &query::entity_view(&self.world),
            &query::tower_view(&self.world),
            query::phase_view(&self.world),
        );
        for command in outcome.commands {
            let _ = self.apply(command);
        }

        if outcome.report.passed {
            let phase = query::phase_view(&self.world);
            if phase.step == MechanicStep::FinalSoak && phase.solved {
                println!("Perfect! High Concept complete!");
            } else if phase.solved {
                println!("Correct! Type 'next' to continue.");
            } else {
                println!("Correct so far; keep going.");
            }
        } else {
            println!("Issues found:");
            for violation in &outcome.report.violations {
                println!("  - {violation}");
            }
        }

        let marks: Vec<String> = outcome
            .report
            .classifications
            .iter()
            .filter(|(_, class)| *class != Classification::Neutral)
            .map(|(entity, class)| {
                let name = self.name_of(*entity);
                match class {
                    Classification::Correct => format!("{name}+"),
                    Classification::Incorrect => format!("{name}-"),
                    Classification::Neutral => name,
                }
            })
            .collect();
        if !marks.is_empty() {
            println!("  [{}]", marks.join(" "));
        }
    }

    fn advance(&mut self) {
        let _ = self.apply(Command::AdvancePhase);
        self.show();
    }

    fn solve(&mut self) {
        let moves = auto_solver::solve(
            &query::entity_view(&self.world),
            &query::tower_view(&self.world),
            query::phase_view(&self.world),
        );
        for command in moves {
            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events);
        }
        println!("Entities moved into a passing arrangement.");
        self.show();
    }

    fn export(&mut self) {
        let snapshot = ArrangementSnapshot::capture(
            &query::entity_view(&self.world),
            query::phase_view(&self.world),
        );
        println!("{}", snapshot.encode());
    }

    fn import(&mut self, code: Option<&str>) {
        let Some(code) = code else {
            println!("Usage: import <layout-string>");
            return;
        };
        match ArrangementSnapshot::decode(code) {
            Ok(snapshot) => {
                for placement in snapshot.placements() {
                    let _ = self.apply(Command::MoveEntity {
                        entity: EntityId::new(placement.entity),
                        x: placement.x.clamp(POSITION_MIN, POSITION_MAX),
                        y: placement.y.clamp(POSITION_MIN, POSITION_MAX),
                    });
                }
                println!("Arrangement imported.");
                self.show();
            }
            Err(error) => println!("Import failed: {error}"),
        }
    }

    fn show(&self) {
        let phase = query::phase_view(&self.world);
        println!(
            "Phase {}.{} - {}{}",
            phase.step.phase(),
            phase.step.sub_phase(),
            phase.step.title(),
            if phase.solved { " [solved]" } else { "" },
        );
        if let Some(required) = phase.required_conception {
            println!("Required Conception: {required}");
        }

        let towers = query::tower_view(&self.world);
        for tower in towers.iter() {
            println!(
                "  Tower {} ({}) at ({:.0}, {:.0})",
                tower.name,
                tower.element,
                tower.position.x(),
                tower.position.y(),
            );
        }

        for snapshot in query::entity_view(&self.world).iter() {
            let buff = match snapshot.buff {
                Some(Buff::Perfection(strain)) => format!(" [{strain} Perfection]"),
                Some(Buff::Conception(kind)) => format!(" [{kind} Conception]"),
                None => String::new(),
            };
            println!(
                "  {:<3} {:<12} at ({:.0}, {:.0}){}",
                snapshot.name,
                snapshot.tag.to_string(),
                snapshot.position.x(),
                snapshot.position.y(),
                buff,
            );
        }
    }

    fn describe(&self, event: &Event) -> Option<String> {
        match event {
            Event::FusionCommitted {
                first,
                second,
                kind,
            } => Some(format!(
                "{} and {} fused into a {kind} Conception!",
                self.name_of(*first),
                self.name_of(*second),
            )),
            Event::FusionRejected { reason, .. } => Some(format!("Fusion failed: {reason}")),
            Event::MoveRejected { entity, reason } => {
                Some(format!("Cannot move entity {}: {reason}", entity.get()))
            }
            Event::PhaseAdvanceRejected { reason } => Some(format!("Cannot advance: {reason}")),
            Event::TowersSpawned { count, element } => {
                Some(format!("{count} {element} towers spawned."))
            }
            Event::TowersCleared => Some("Towers cleared.".to_owned()),
            Event::SessionReset => Some("Session reset; debuffs reshuffled.".to_owned()),
            Event::StepEntered { step } => Some(format!("Now at: {}", step.title())),
            Event::StepSolved { .. } | Event::EntityMoved { .. } => None,
        }
    }

    fn lookup(&self, name: &str) -> Option<EntityId> {
        let view = query::entity_view(&self.world);
        if let Ok(id) = name.parse::<u32>() {
            return view.get(EntityId::new(id)).map(|snapshot| snapshot.id);
        }
        let result = view.iter()
            .find(|snapshot| snapshot.name.eq_ignore_ascii_case(name))
            .map(|snapshot| snapshot.id);
        result
    }

    fn name_of(&self, entity: EntityId) -> String {
        query::entity_view(&self.world)
            .get(entity)
            .map_or_else(|| format!("#{}", entity.get()), |snapshot| snapshot.name.to_owned())
    }
}

fn print_help() {
    println!("Commands:");
    println!("  show                 print the phase, towers, and entities");
    println!("  move <entity> <x> <y>  drag an entity (names like MT, H1, D3)");
    println!("  check                validate the current arrangement");
    println!("  next                 advance to the next phase once solved");
    println!("  solve                place everyone in a passing arrangement");
    println!("  reset                reshuffle debuffs and start over");
    println!("  export               print a shareable arrangement string");
    println!("  import <string>      restore a shared arrangement");
    println!("  quit                 leave the trainer");
}
