#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Concept Trainer engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! actually happened. Systems consume immutable snapshots and respond
//! exclusively with new command batches.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of entities participating in the mechanic.
pub const ENTITY_COUNT: usize = 8;

/// Largest coordinate a collaborator may submit on either axis.
pub const POSITION_MAX: f32 = 550.0;

/// Smallest coordinate a collaborator may submit on either axis.
pub const POSITION_MIN: f32 = 0.0;

/// Centre of the square arena in world units.
pub const ARENA_CENTER: Position = Position::new(275.0, 275.0);

/// Proximity tolerance applied to waymark, corner, and tower checks.
pub const ANCHOR_TOLERANCE: f32 = 80.0;

/// Maximum distance at which two Perfection holders may fuse.
pub const FUSION_RADIUS: f32 = 100.0;

/// Exclusive upper bound of the safe region on both axes.
pub const SAFE_REGION_BOUND: f32 = 150.0;

/// Unique identifier assigned to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Party role attached to an entity; display-only to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Main or off tank.
    Tank,
    /// Party healer.
    Healer,
    /// Damage dealer.
    Dps,
}

/// Fixed roster entry pairing a display name with a party role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RosterEntry {
    /// Display name shown by rendering collaborators.
    pub name: &'static str,
    /// Party role of the entry.
    pub role: Role,
}

/// The fixed 8-entry roster, indexed by entity id.
pub const ROSTER: [RosterEntry; ENTITY_COUNT] = [
    RosterEntry {
        name: "MT",
        role: Role::Tank,
    },
    RosterEntry {
        name: "OT",
        role: Role::Tank,
    },
    RosterEntry {
        name: "H1",
        role: Role::Healer,
    },
    RosterEntry {
        name: "H2",
        role: Role::Healer,
    },
    RosterEntry {
        name: "D1",
        role: Role::Dps,
    },
    RosterEntry {
        name: "D2",
        role: Role::Dps,
    },
    RosterEntry {
        name: "D3",
        role: Role::Dps,
    },
    RosterEntry {
        name: "D4",
        role: Role::Dps,
    },
];

/// One of the three debuff strains; doubles as the Perfection kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strain {
    /// Alpha strain.
    Alpha,
    /// Beta strain.
    Beta,
    /// Gamma strain.
    Gamma,
}

impl std::fmt::Display for Strain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Alpha => "Alpha",
            Self::Beta => "Beta",
            Self::Gamma => "Gamma",
        };
        f.write_str(label)
    }
}

/// Timer class carried by a strain debuff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagTimer {
    /// Short timer; resolves during the opening spread.
    Short,
    /// Long timer; resolves after the first towers.
    Long,
}

/// Initial role tag assigned to an entity once per reset.
///
/// Across the 8 entities the assigned tags always form a permutation of this
/// enum's variants: no duplicates, none missing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoleTag {
    /// Short-timer Alpha debuff.
    AlphaShort,
    /// Long-timer Alpha debuff.
    AlphaLong,
    /// Short-timer Beta debuff.
    BetaShort,
    /// Long-timer Beta debuff.
    BetaLong,
    /// Short-timer Gamma debuff.
    GammaShort,
    /// Long-timer Gamma debuff.
    GammaLong,
    /// Two-entity stack marker.
    Multisplice,
    /// Three-entity stack marker.
    Supersplice,
}

/// All role tags in canonical order; the shuffle source for assignment.
pub const ALL_ROLE_TAGS: [RoleTag; ENTITY_COUNT] = [
    RoleTag::AlphaShort,
    RoleTag::AlphaLong,
    RoleTag::BetaShort,
    RoleTag::BetaLong,
    RoleTag::GammaShort,
    RoleTag::GammaLong,
    RoleTag::Multisplice,
    RoleTag::Supersplice,
];

impl RoleTag {
    /// Strain of the tag, or `None` for the splice markers.
    #[must_use]
    pub const fn strain(&self) -> Option<Strain> {
        match self {
            Self::AlphaShort | Self::AlphaLong => Some(Strain::Alpha),
            Self::BetaShort | Self::BetaLong => Some(Strain::Beta),
            Self::GammaShort | Self::GammaLong => Some(Strain::Gamma),
            Self::Multisplice | Self::Supersplice => None,
        }
    }

    /// Timer class of the tag, or `None` for the splice markers.
    #[must_use]
    pub const fn timer(&self) -> Option<TagTimer> {
        match self {
            Self::AlphaShort | Self::BetaShort | Self::GammaShort => Some(TagTimer::Short),
            Self::AlphaLong | Self::BetaLong | Self::GammaLong => Some(TagTimer::Long),
            Self::Multisplice | Self::Supersplice => None,
        }
    }

    /// Reports whether the tag is one of the two splice markers.
    #[must_use]
    pub const fn is_splicer(&self) -> bool {
        matches!(self, Self::Multisplice | Self::Supersplice)
    }

    /// Waymark the tag resolves at during the opening spread.
    #[must_use]
    pub const fn spread_waymark(&self) -> Waymark {
        match self {
            Self::AlphaShort => Waymark::A,
            Self::BetaShort => Waymark::B,
            Self::GammaShort => Waymark::C,
            Self::Multisplice | Self::AlphaLong => Waymark::Two,
            Self::Supersplice | Self::BetaLong | Self::GammaLong => Waymark::Three,
        }
    }
}

impl std::fmt::Display for RoleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::AlphaShort => "Short Alpha",
            Self::AlphaLong => "Long Alpha",
            Self::BetaShort => "Short Beta",
            Self::BetaLong => "Long Beta",
            Self::GammaShort => "Short Gamma",
            Self::GammaLong => "Long Gamma",
            Self::Multisplice => "Multisplice",
            Self::Supersplice => "Supersplice",
        };
        f.write_str(label)
    }
}

/// Conception produced by fusing two Perfection holders.
///
/// The three success kinds each match one tower element; the three failure
/// kinds arise only from same-strain pairings and match no tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConceptionKind {
    /// Wind Conception (Alpha + Beta).
    Winged,
    /// Water Conception (Alpha + Gamma).
    Aquatic,
    /// Lightning Conception (Beta + Gamma).
    Shocking,
    /// Fire Conception (Alpha + Alpha); failure state.
    Fiery,
    /// Poison Conception (Beta + Beta); failure state.
    Toxic,
    /// Plant Conception (Gamma + Gamma); failure state.
    Growing,
}

/// The three success Conceptions in canonical order.
pub const SUCCESS_CONCEPTIONS: [ConceptionKind; 3] = [
    ConceptionKind::Winged,
    ConceptionKind::Aquatic,
    ConceptionKind::Shocking,
];

impl ConceptionKind {
    /// Derives the Conception produced by fusing the provided strain pair.
    ///
    /// Pure in the unordered pair: `from_fusion(a, b) == from_fusion(b, a)`.
    #[must_use]
    pub const fn from_fusion(first: Strain, second: Strain) -> Self {
        match (first, second) {
            (Strain::Alpha, Strain::Alpha) => Self::Fiery,
            (Strain::Beta, Strain::Beta) => Self::Toxic,
            (Strain::Gamma, Strain::Gamma) => Self::Growing,
            (Strain::Alpha, Strain::Beta) | (Strain::Beta, Strain::Alpha) => Self::Winged,
            (Strain::Alpha, Strain::Gamma) | (Strain::Gamma, Strain::Alpha) => Self::Aquatic,
            (Strain::Beta, Strain::Gamma) | (Strain::Gamma, Strain::Beta) => Self::Shocking,
        }
    }

    /// The sorted strain pair whose fusion produces this Conception.
    #[must_use]
    pub const fn components(&self) -> (Strain, Strain) {
        match self {
            Self::Winged => (Strain::Alpha, Strain::Beta),
            Self::Aquatic => (Strain::Alpha, Strain::Gamma),
            Self::Shocking => (Strain::Beta, Strain::Gamma),
            Self::Fiery => (Strain::Alpha, Strain::Alpha),
            Self::Toxic => (Strain::Beta, Strain::Beta),
            Self::Growing => (Strain::Gamma, Strain::Gamma),
        }
    }

    /// Reports whether this Conception can soak a tower.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Winged | Self::Aquatic | Self::Shocking)
    }

    /// Tower element the Conception soaks, or `None` for failure kinds.
    #[must_use]
    pub const fn element(&self) -> Option<TowerElement> {
        match self {
            Self::Winged => Some(TowerElement::Wind),
            Self::Aquatic => Some(TowerElement::Water),
            Self::Shocking => Some(TowerElement::Lightning),
            Self::Fiery | Self::Toxic | Self::Growing => None,
        }
    }
}

impl std::fmt::Display for ConceptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Winged => "Winged",
            Self::Aquatic => "Aquatic",
            Self::Shocking => "Shocking",
            Self::Fiery => "Fiery",
            Self::Toxic => "Toxic",
            Self::Growing => "Growing",
        };
        f.write_str(label)
    }
}

/// Element demanded by a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerElement {
    /// Wind tower; soaked by a Winged Conception.
    Wind,
    /// Water tower; soaked by an Aquatic Conception.
    Water,
    /// Lightning tower; soaked by a Shocking Conception.
    Lightning,
}

impl std::fmt::Display for TowerElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Wind => "wind",
            Self::Water => "water",
            Self::Lightning => "lightning",
        };
        f.write_str(label)
    }
}

/// Transient buff carried by an entity.
///
/// Conception is only ever produced by the fusion resolver from a prior
/// Perfection; it is never assigned directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Buff {
    /// Pre-fusion buff of the given strain.
    Perfection(Strain),
    /// Post-fusion buff of the given kind.
    Conception(ConceptionKind),
}

/// Planar position expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new position from explicit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate of the position.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate of the position.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Computes the Euclidean distance to another position.
    #[must_use]
    pub fn distance_to(&self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Reports whether `position` lies strictly inside `tolerance` of `anchor`.
///
/// A point exactly at the tolerance boundary is outside.
#[must_use]
pub fn within(position: Position, anchor: Position, tolerance: f32) -> bool {
    position.distance_to(anchor) < tolerance
}

/// Named reference point used as a spread target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Waymark {
    /// Northeast corner.
    A,
    /// Southeast corner.
    B,
    /// Southwest corner.
    C,
    /// North wall intersection; hosts the two-entity stack.
    Two,
    /// West wall intersection; hosts the three-entity stack.
    Three,
}

impl Waymark {
    /// Arena position of the waymark.
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::A => Corner::A.position(),
            Self::B => Corner::B.position(),
            Self::C => Corner::C.position(),
            Self::Two => Position::new(150.0, 50.0),
            Self::Three => Position::new(50.0, 150.0),
        }
    }

    /// Exact number of entities the waymark must host during the spread,
    /// or `None` for the single-entity corners.
    #[must_use]
    pub const fn stack_size(&self) -> Option<usize> {
        match self {
            Self::Two => Some(2),
            Self::Three => Some(3),
            Self::A | Self::B | Self::C => None,
        }
    }
}

impl std::fmt::Display for Waymark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::A => "A (NE corner)",
            Self::B => "B (SE corner)",
            Self::C => "C (SW corner)",
            Self::Two => "Marker 2 (north wall)",
            Self::Three => "Marker 3 (west wall)",
        };
        f.write_str(label)
    }
}

/// One of the three arena corners used for reposition targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Corner {
    /// Northeast corner, shared with waymark A.
    A,
    /// Southeast corner, shared with waymark B.
    B,
    /// Southwest corner, shared with waymark C.
    C,
}

/// Clockwise traversal order over the corners.
pub const CLOCKWISE: [Corner; 3] = [Corner::A, Corner::B, Corner::C];

/// Counter-clockwise traversal order over the corners.
pub const COUNTER_CLOCKWISE: [Corner; 3] = [Corner::C, Corner::B, Corner::A];

impl Corner {
    /// Arena position of the corner itself.
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::A => Position::new(550.0, 50.0),
            Self::B => Position::new(550.0, 550.0),
            Self::C => Position::new(50.0, 550.0),
        }
    }

    /// Diagonal position derived from the corner: the midpoint between the
    /// arena centre and the corner.
    #[must_use]
    pub fn diagonal(&self) -> Position {
        let corner = self.position();
        Position::new(
            (ARENA_CENTER.x() + corner.x()) / 2.0,
            (ARENA_CENTER.y() + corner.y()) / 2.0,
        )
    }

    /// Home corner of the provided strain.
    #[must_use]
    pub const fn for_strain(strain: Strain) -> Self {
        match strain {
            Strain::Alpha => Self::A,
            Strain::Beta => Self::B,
            Strain::Gamma => Self::C,
        }
    }
}

impl std::fmt::Display for Corner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::A => "corner A",
            Self::B => "corner B",
            Self::C => "corner C",
        };
        f.write_str(label)
    }
}

/// Flat state of the mechanic's phase machine.
///
/// Each variant is one (phase, sub-phase) pair of the mechanic; only the
/// middle phase has all three sub-phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MechanicStep {
    /// Phase 0: the opening spread onto fixed waymarks.
    Spread,
    /// Phase 1, sub-phase 0: first Perfection fusion.
    FirstFusion,
    /// Phase 1, sub-phase 1: two-tower soak.
    FirstSoak,
    /// Phase 1, sub-phase 2: corner/diagonal reposition.
    Reposition,
    /// Phase 2, sub-phase 0: second, restricted fusion.
    SecondFusion,
    /// Phase 2, sub-phase 1: four-tower soak (terminal).
    FinalSoak,
}

impl MechanicStep {
    /// Zero-based phase index of the step.
    #[must_use]
    pub const fn phase(&self) -> u8 {
        match self {
            Self::Spread => 0,
            Self::FirstFusion | Self::FirstSoak | Self::Reposition => 1,
            Self::SecondFusion | Self::FinalSoak => 2,
        }
    }

    /// Zero-based sub-phase index within the step's phase.
    #[must_use]
    pub const fn sub_phase(&self) -> u8 {
        match self {
            Self::Spread | Self::FirstFusion | Self::SecondFusion => 0,
            Self::FirstSoak | Self::FinalSoak => 1,
            Self::Reposition => 2,
        }
    }

    /// Human-readable step title for the display collaborator.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Spread => "Alpha Resolution",
            Self::FirstFusion => "Gamma Resolution: fusion",
            Self::FirstSoak => "Gamma Resolution: tower soak",
            Self::Reposition => "Gamma Resolution: reposition",
            Self::SecondFusion => "Tower Soaking: second fusion",
            Self::FinalSoak => "Tower Soaking: four towers",
        }
    }
}

/// Outcome class assigned to each entity by a solution check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Classification {
    /// The entity satisfies every rule that applies to it.
    Correct,
    /// The entity violates at least one rule.
    Incorrect,
    /// No rule applies to the entity in the current step.
    #[default]
    Neutral,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Moves an entity to the provided coordinates.
    ///
    /// Coordinates are pre-clamped to the arena bounds by the submitting
    /// collaborator.
    MoveEntity {
        /// Identifier of the entity to move.
        entity: EntityId,
        /// New horizontal coordinate.
        x: f32,
        /// New vertical coordinate.
        y: f32,
    },
    /// Fuses two unfused Perfection holders into a Conception pair.
    CommitFusion {
        /// Lower-id member of the pair.
        first: EntityId,
        /// Higher-id member of the pair.
        second: EntityId,
    },
    /// Transitions the phase machine to the provided step.
    EnterStep {
        /// Step that becomes active.
        step: MechanicStep,
    },
    /// Marks the current step as solved.
    MarkSolved,
    /// Removes every tower from the board.
    ClearTowers,
    /// Advances to the next phase, applying its entry side effects.
    AdvancePhase,
    /// Returns the session to a fresh randomized state.
    Reset,
}

/// Reasons an entity move request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum MoveError {
    /// No entity with the provided identifier exists.
    #[error("unknown entity")]
    UnknownEntity,
}

/// Reasons a fusion commit may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum FusionError {
    /// One of the referenced entities does not exist.
    #[error("unknown entity")]
    UnknownEntity,
    /// Both members of the pair refer to the same entity.
    #[error("an entity cannot fuse with itself")]
    SelfFusion,
    /// One of the entities does not hold a Perfection buff.
    #[error("entity holds no Perfection")]
    MissingPerfection,
    /// One of the entities has already fused.
    #[error("entity has already fused")]
    AlreadyFused,
    /// The entities are not within fusion range of each other.
    #[error("entities are out of fusion range")]
    OutOfRange,
}

/// Reasons a phase advance request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum AdvanceError {
    /// The current step has not been solved yet.
    #[error("solve the current phase first")]
    NotSolved,
    /// The mechanic is already at its terminal step.
    #[error("already at the final phase")]
    MechanicComplete,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that an entity moved to a new position.
    EntityMoved {
        /// Identifier of the entity that moved.
        entity: EntityId,
        /// Position the entity now occupies.
        position: Position,
    },
    /// Reports that an entity move request was rejected.
    MoveRejected {
        /// Identifier provided in the rejected request.
        entity: EntityId,
        /// Specific reason the move failed.
        reason: MoveError,
    },
    /// Confirms that two entities fused into a Conception pair.
    FusionCommitted {
        /// Lower-id member of the pair.
        first: EntityId,
        /// Higher-id member of the pair.
        second: EntityId,
        /// Conception kind produced by the fusion.
        kind: ConceptionKind,
    },
    /// Reports that a fusion commit was rejected.
    FusionRejected {
        /// Lower-id member of the rejected pair.
        first: EntityId,
        /// Higher-id member of the rejected pair.
        second: EntityId,
        /// Specific reason the fusion failed.
        reason: FusionError,
    },
    /// Announces that the phase machine entered a new step.
    StepEntered {
        /// Step that became active.
        step: MechanicStep,
    },
    /// Announces that the current step was solved.
    StepSolved {
        /// Step that was solved.
        step: MechanicStep,
    },
    /// Confirms that a new tower set spawned.
    TowersSpawned {
        /// Number of towers in the set.
        count: u32,
        /// Element shared by every tower in the set.
        element: TowerElement,
    },
    /// Confirms that all towers were removed from the board.
    TowersCleared,
    /// Reports that a phase advance request was rejected.
    PhaseAdvanceRejected {
        /// Specific reason the advance failed.
        reason: AdvanceError,
    },
    /// Confirms that the session returned to a fresh randomized state.
    SessionReset,
}

/// Positioning violation discovered by a solution check.
///
/// Violations are recoverable: the caller repositions entities and checks
/// again. Their `Display` output is the human-readable feedback line.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Violation {
    /// An entity is outside its assigned spread waymark.
    #[error("{name} ({tag}) should be at {waymark}")]
    MisplacedTag {
        /// Display name of the entity.
        name: String,
        /// Tag that determines the target.
        tag: RoleTag,
        /// Waymark the entity should occupy.
        waymark: Waymark,
    },
    /// An entity intrudes on a stack waymark it is not assigned to.
    #[error("{name} must stay clear of {waymark}")]
    UnexpectedStacker {
        /// Display name of the intruding entity.
        name: String,
        /// Stack waymark being crowded.
        waymark: Waymark,
    },
    /// A Perfection holder has no unfused partner within fusion range.
    #[error("{name} carries {strain} Perfection with no fusion partner in reach")]
    StrandedPerfection {
        /// Display name of the stranded holder.
        name: String,
        /// Strain of the stranded Perfection.
        strain: Strain,
    },
    /// The step requires towers that have not spawned.
    #[error("towers have not spawned for this step")]
    TowersMissing,
    /// A tower has no entity inside its radius.
    #[error("{tower} ({element}) is not being soaked")]
    TowerUnsoaked {
        /// Name of the unsoaked tower.
        tower: String,
        /// Element the tower demands.
        element: TowerElement,
    },
    /// A tower has more than one entity inside its radius.
    #[error("{tower} has too many entities ({count})")]
    TowerCrowded {
        /// Name of the crowded tower.
        tower: String,
        /// Number of entities inside the radius.
        count: usize,
    },
    /// The entity soaking a tower holds no Conception.
    #[error("{name} at {tower} has no Conception")]
    MissingConception {
        /// Display name of the soaking entity.
        name: String,
        /// Name of the tower being soaked.
        tower: String,
    },
    /// The entity soaking a tower holds a non-matching Conception.
    #[error("{name} has {kind} Conception but {tower} requires {element}")]
    WrongElement {
        /// Display name of the soaking entity.
        name: String,
        /// Conception the entity holds.
        kind: ConceptionKind,
        /// Name of the mismatched tower.
        tower: String,
        /// Element the tower demands.
        element: TowerElement,
    },
    /// A long-tag entity is outside its home corner.
    #[error("{name} ({tag}) should be at {corner}")]
    MisplacedCorner {
        /// Display name of the entity.
        name: String,
        /// Long tag that determines the corner.
        tag: RoleTag,
        /// Home corner of the tag's strain.
        corner: Corner,
    },
    /// A diagonal role's walk found every corner already reserved.
    #[error("{name} has no free corner to take")]
    NoCornerAvailable {
        /// Display name of the entity without a corner.
        name: String,
    },
    /// A diagonal role is outside its assigned diagonal position.
    #[error("{name} should hold the {corner} diagonal")]
    MissedDiagonal {
        /// Display name of the entity.
        name: String,
        /// Corner whose diagonal the entity should occupy.
        corner: Corner,
    },
    /// A Conception holder is outside the safe region.
    #[error("{name} must shelter in the safe region (x < 150, y < 150)")]
    OutsideSafeRegion {
        /// Display name of the entity.
        name: String,
    },
    /// An incompatible-strain holder stands inside a tower radius.
    #[error("{name} ({strain} Perfection) cannot soak and must stay clear of {tower}")]
    IncompatibleNearTower {
        /// Display name of the entity.
        name: String,
        /// Incompatible strain the entity carries.
        strain: Strain,
        /// Tower whose radius the entity intrudes on.
        tower: String,
    },
}

/// Immutable representation of a single entity's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Unique identifier assigned to the entity.
    pub id: EntityId,
    /// Display name from the fixed roster.
    pub name: &'static str,
    /// Party role from the fixed roster.
    pub role: Role,
    /// Role tag assigned at reset; immutable thereafter.
    pub tag: RoleTag,
    /// Position the entity currently occupies.
    pub position: Position,
    /// Transient buff the entity carries, if any.
    pub buff: Option<Buff>,
    /// Fusion partner of the entity, if it has fused.
    pub fusion_partner: Option<EntityId>,
}

impl EntitySnapshot {
    /// Reports whether the entity has completed a fusion.
    #[must_use]
    pub const fn fused(&self) -> bool {
        matches!(self.buff, Some(Buff::Conception(_))) && self.fusion_partner.is_some()
    }

    /// Strain of the entity's Perfection buff, if it holds one unfused.
    #[must_use]
    pub const fn perfection(&self) -> Option<Strain> {
        match self.buff {
            Some(Buff::Perfection(strain)) => Some(strain),
            _ => None,
        }
    }

    /// Kind of the entity's Conception buff, if it has fused.
    #[must_use]
    pub const fn conception(&self) -> Option<ConceptionKind> {
        match self.buff {
            Some(Buff::Conception(kind)) => Some(kind),
            _ => None,
        }
    }
}

/// Read-only snapshot describing every entity in the mechanic.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic id order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of the provided entity, if it exists.
    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<&EntitySnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == entity)
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no snapshots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Display name of the tower.
    pub name: &'static str,
    /// Position the tower occupies.
    pub position: Position,
    /// Element the tower demands from its soaker.
    pub element: TowerElement,
}

/// Read-only snapshot describing every tower on the board.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic id order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the board holds no towers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Read-only descriptor of the phase machine for display and systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PhaseView {
    /// Step the machine currently occupies.
    pub step: MechanicStep,
    /// Whether the current step has been solved.
    pub solved: bool,
    /// Conception kind the current phase's towers demand, if any.
    pub required_conception: Option<ConceptionKind>,
}
