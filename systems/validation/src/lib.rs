#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure phase validator for the Concept Trainer mechanic.
//!
//! One independent rule set per mechanic step. Each check consumes immutable
//! views, never mutates, and answers with a [`CheckReport`] plus the command
//! batch that commits fusions, auto-transitions sub-phases, clears towers,
//! and marks steps solved. The caller applies the batch to the world.

use concept_trainer_core::{
    within, Classification, Command, Corner, EntityId, EntitySnapshot, EntityView, MechanicStep,
    PhaseView, Strain, TagTimer, TowerView, Violation, Waymark, ANCHOR_TOLERANCE, FUSION_RADIUS,
    SAFE_REGION_BOUND,
};
use concept_trainer_system_corner_assignment as corner_assignment;
use concept_trainer_system_fusion::{find_fusion, StrainFilter};

/// Result of validating the current arrangement.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckReport {
    /// True exactly when no violation was found.
    pub passed: bool,
    /// Ordered human-readable violations.
    pub violations: Vec<Violation>,
    /// Per-entity outcome classes in entity-id order.
    pub classifications: Vec<(EntityId, Classification)>,
}

/// Report plus the command batch that commits the check's side effects.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckOutcome {
    /// Validation result for the caller's feedback collaborator.
    pub report: CheckReport,
    /// Commands the caller must apply to the world, in order.
    pub commands: Vec<Command>,
}

/// Validates the current arrangement against the active step's rule set.
#[must_use]
pub fn check(entities: &EntityView, towers: &TowerView, phase: PhaseView) -> CheckOutcome {
    match phase.step {
        MechanicStep::Spread => check_spread(entities),
        MechanicStep::FirstFusion => check_fusion(
            entities,
            towers,
            StrainFilter::Any,
            2,
            MechanicStep::FirstSoak,
        ),
        MechanicStep::FirstSoak => check_soak(entities, towers, phase),
        MechanicStep::Reposition => check_reposition(entities),
        MechanicStep::SecondFusion => check_fusion(
            entities,
            towers,
            restriction(phase),
            4,
            MechanicStep::FinalSoak,
        ),
        MechanicStep::FinalSoak => check_soak(entities, towers, phase),
    }
}

fn restriction(phase: PhaseView) -> StrainFilter {
    phase
        .required_conception
        .map_or(StrainFilter::Any, StrainFilter::for_required)
}

fn check_spread(entities: &EntityView) -> CheckOutcome {
    let mut violations = Vec::new();
    let mut classifier = Classifier::new(entities);

    for snapshot in entities.iter() {
        let waymark = snapshot.tag.spread_waymark();
        if within(snapshot.position, waymark.position(), ANCHOR_TOLERANCE) {
            classifier.correct(snapshot.id);
        } else {
            classifier.incorrect(snapshot.id);
            violations.push(Violation::MisplacedTag {
                name: snapshot.name.to_owned(),
                tag: snapshot.tag,
                waymark,
            });
        }
    }

    // The stack waymarks host an exact head-count; anyone else inside the
    // radius would soak a stack they are not assigned to.
    for waymark in [Waymark::Two, Waymark::Three] {
        for snapshot in entities.iter() {
            let assigned = snapshot.tag.spread_waymark() == waymark;
            if !assigned && within(snapshot.position, waymark.position(), ANCHOR_TOLERANCE) {
                classifier.incorrect(snapshot.id);
                violations.push(Violation::UnexpectedStacker {
                    name: snapshot.name.to_owned(),
                    waymark,
                });
            }
        }
    }

    let passed = violations.is_empty();
    let commands = if passed {
        vec![Command::MarkSolved]
    } else {
        Vec::new()
    };

    CheckOutcome {
        report: CheckReport {
            passed,
            violations,
            classifications: classifier.into_vec(),
        },
        commands,
    }
}

fn check_fusion(
    entities: &EntityView,
    towers: &TowerView,
    filter: StrainFilter,
    threshold: usize,
    next_step: MechanicStep,
) -> CheckOutcome {
    let mut violations = Vec::new();
    let mut classifier = Classifier::new(entities);
    let mut commands = Vec::new();

    let proposal = find_fusion(entities, filter);
    if let Some(proposal) = proposal {
        commands.push(Command::CommitFusion {
            first: proposal.first,
            second: proposal.second,
        });
        classifier.correct(proposal.first);
        classifier.correct(proposal.second);
    }

    let mut conception_count = 0;
    for snapshot in entities.iter() {
        if snapshot.conception().is_some() {
            conception_count += 1;
            classifier.correct(snapshot.id);
        }
    }
    if proposal.is_some() {
        conception_count += 2;
    }

    // Holders left over after the proposed fusion. A holder standing within
    // fusion range of another is pending, not a violation; an isolated
    // holder is stranded.
    let remaining: Vec<(&EntitySnapshot, Strain)> = entities
        .iter()
        .filter_map(|snapshot| snapshot.perfection().map(|strain| (snapshot, strain)))
        .filter(|(_, strain)| filter.admits(*strain))
        .filter(|(snapshot, _)| {
            proposal.map_or(true, |proposal| {
                snapshot.id != proposal.first && snapshot.id != proposal.second
            })
        })
        .collect();

    if conception_count < threshold {
        for (holder, strain) in &remaining {
            let in_reach = remaining.iter().any(|(other, _)| {
                other.id != holder.id && within(holder.position, other.position, FUSION_RADIUS)
            });
            if !in_reach {
                classifier.incorrect(holder.id);
                violations.push(Violation::StrandedPerfection {
                    name: holder.name.to_owned(),
                    strain: *strain,
                });
            }
        }
    }

    if let StrainFilter::Restricted(..) = filter {
        flag_incompatible_near_towers(entities, towers, filter, &mut classifier, &mut violations);
    }

    let passed = violations.is_empty();
    if passed && conception_count >= threshold {
        commands.push(Command::EnterStep { step: next_step });
    }

    CheckOutcome {
        report: CheckReport {
            passed,
            violations,
            classifications: classifier.into_vec(),
        },
        commands,
    }
}

fn check_soak(entities: &EntityView, towers: &TowerView, phase: PhaseView) -> CheckOutcome {
    let mut violations = Vec::new();
    let mut classifier = Classifier::new(entities);

    if towers.is_empty() {
        violations.push(Violation::TowersMissing);
        return CheckOutcome {
            report: CheckReport {
                passed: false,
                violations,
                classifications: classifier.into_vec(),
            },
            commands: Vec::new(),
        };
    }

    for tower in towers.iter() {
        let occupants: Vec<&EntitySnapshot> = entities
            .iter()
            .filter(|snapshot| within(snapshot.position, tower.position, ANCHOR_TOLERANCE))
            .collect();

        match occupants.as_slice() {
            [] => violations.push(Violation::TowerUnsoaked {
                tower: tower.name.to_owned(),
                element: tower.element,
            }),
            [occupant] => match occupant.conception() {
                None => {
                    classifier.incorrect(occupant.id);
                    violations.push(Violation::MissingConception {
                        name: occupant.name.to_owned(),
                        tower: tower.name.to_owned(),
                    });
                }
                Some(kind) if kind.element() != Some(tower.element) => {
                    classifier.incorrect(occupant.id);
                    violations.push(Violation::WrongElement {
                        name: occupant.name.to_owned(),
                        kind,
                        tower: tower.name.to_owned(),
                        element: tower.element,
                    });
                }
                Some(_) => classifier.correct(occupant.id),
            },
            crowd => {
                for occupant in crowd {
                    classifier.incorrect(occupant.id);
                }
                violations.push(Violation::TowerCrowded {
                    tower: tower.name.to_owned(),
                    count: crowd.len(),
                });
            }
        }
    }

    if phase.step == MechanicStep::FinalSoak {
        flag_incompatible_near_towers(
            entities,
            towers,
            restriction(phase),
            &mut classifier,
            &mut violations,
        );
    }

    let passed = violations.is_empty();
    let commands = if !passed {
        Vec::new()
    } else if phase.step == MechanicStep::FirstSoak {
        vec![
            Command::ClearTowers,
            Command::EnterStep {
                step: MechanicStep::Reposition,
            },
        ]
    } else {
        vec![Command::MarkSolved]
    };

    CheckOutcome {
        report: CheckReport {
            passed,
            violations,
            classifications: classifier.into_vec(),
        },
        commands,
    }
}

fn check_reposition(entities: &EntityView) -> CheckOutcome {
    let mut violations = Vec::new();
    let mut classifier = Classifier::new(entities);

    for snapshot in entities.iter() {
        if snapshot.tag.timer() != Some(TagTimer::Long) {
            continue;
        }
        let Some(strain) = snapshot.tag.strain() else {
            continue;
        };
        let corner = Corner::for_strain(strain);
        if within(snapshot.position, corner.position(), ANCHOR_TOLERANCE) {
            classifier.correct(snapshot.id);
        } else {
            classifier.incorrect(snapshot.id);
            violations.push(Violation::MisplacedCorner {
                name: snapshot.name.to_owned(),
                tag: snapshot.tag,
                corner,
            });
        }
    }

    let assignment = corner_assignment::resolve(entities);
    for slot in [
        assignment.priority,
        assignment.multisplice,
        assignment.supersplice,
    ]
    .into_iter()
    .flatten()
    {
        let Some(snapshot) = entities.get(slot.entity) else {
            continue;
        };
        match slot.corner {
            None => {
                classifier.incorrect(snapshot.id);
                violations.push(Violation::NoCornerAvailable {
                    name: snapshot.name.to_owned(),
                });
            }
            Some(corner) => {
                if within(snapshot.position, corner.diagonal(), ANCHOR_TOLERANCE) {
                    classifier.correct(snapshot.id);
                } else {
                    classifier.incorrect(snapshot.id);
                    violations.push(Violation::MissedDiagonal {
                        name: snapshot.name.to_owned(),
                        corner,
                    });
                }
            }
        }
    }

    for snapshot in entities.iter() {
        if snapshot.conception().is_none() {
            continue;
        }
        if snapshot.position.x() < SAFE_REGION_BOUND && snapshot.position.y() < SAFE_REGION_BOUND {
            classifier.correct(snapshot.id);
        } else {
            classifier.incorrect(snapshot.id);
            violations.push(Violation::OutsideSafeRegion {
                name: snapshot.name.to_owned(),
            });
        }
    }

    let passed = violations.is_empty();
    let commands = if passed {
        vec![Command::MarkSolved]
    } else {
        Vec::new()
    };

    CheckOutcome {
        report: CheckReport {
            passed,
            violations,
            classifications: classifier.into_vec(),
        },
        commands,
    }
}

fn flag_incompatible_near_towers(
    entities: &EntityView,
    towers: &TowerView,
    filter: StrainFilter,
    classifier: &mut Classifier,
    violations: &mut Vec<Violation>,
) {
    for snapshot in entities.iter() {
        let Some(strain) = snapshot.perfection() else {
            continue;
        };
        if filter.admits(strain) {
            continue;
        }
        let intruded = towers
            .iter()
            .find(|tower| within(snapshot.position, tower.position, ANCHOR_TOLERANCE));
        if let Some(tower) = intruded {
            classifier.incorrect(snapshot.id);
            violations.push(Violation::IncompatibleNearTower {
                name: snapshot.name.to_owned(),
                strain,
                tower: tower.name.to_owned(),
            });
        }
    }
}

struct Classifier {
    entries: Vec<(EntityId, Classification)>,
}

impl Classifier {
    fn new(entities: &EntityView) -> Self {
        Self {
            entries: entities
                .iter()
                .map(|snapshot| (snapshot.id, Classification::Neutral))
                .collect(),
        }
    }

    fn correct(&mut self, entity: EntityId) {
        if let Some(entry) = self.entries.iter_mut().find(|(id, _)| *id == entity) {
            if entry.1 != Classification::Incorrect {
                entry.1 = Classification::Correct;
            }
        }
    }

    fn incorrect(&mut self, entity: EntityId) {
        if let Some(entry) = self.entries.iter_mut().find(|(id, _)| *id == entity) {
            entry.1 = Classification::Incorrect;
        }
    }

    fn into_vec(self) -> Vec<(EntityId, Classification)> {
        self.entries
    }
}
