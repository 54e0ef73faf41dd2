#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use concept_trainer_core::{EntityView, PhaseView};
use serde::{Deserialize, Serialize};

const SNAPSHOT_DOMAIN: &str = "hc1";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded arrangement payload.
pub(crate) const SNAPSHOT_HEADER: &str = "hc1:v1";
/// Delimiter used to separate the prefix, phase digits and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of every entity's position plus the phase it was captured in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ArrangementSnapshot {
    /// Phase index the arrangement was captured in.
    pub(crate) phase: u8,
    /// Sub-phase index the arrangement was captured in.
    pub(crate) sub_phase: u8,
    /// Entity placements composing the arrangement.
    pub(crate) placements: Vec<EntityPlacement>,
}

/// Position of a single entity captured within an arrangement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct EntityPlacement {
    /// Numeric entity identifier.
    pub(crate) entity: u32,
    /// Horizontal coordinate of the entity.
    pub(crate) x: f32,
    /// Vertical coordinate of the entity.
    pub(crate) y: f32,
}

impl ArrangementSnapshot {
    /// Captures the current arrangement from the provided views.
    pub(crate) fn capture(entities: &EntityView, phase: PhaseView) -> Self {
        Self {
            phase: phase.step.phase(),
            sub_phase: phase.step.sub_phase(),
            placements: entities
                .iter()
                .map(|snapshot| EntityPlacement {
                    entity: snapshot.id.get(),
                    x: snapshot.position.x(),
                    y: snapshot.position.y(),
                })
                .collect(),
        }
    }

    /// Entity placements composing the arrangement.
    pub(crate) fn placements(&self) -> &[EntityPlacement] {
        &self.placements
    }

    /// Encodes the snapshot into a single-line string suitable for sharing.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializableArrangement {
            placements: self.placements.clone(),
        };
        let json =
            serde_json::to_vec(&payload).expect("arrangement serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!(
            "{SNAPSHOT_HEADER}:{}.{}:{encoded}",
            self.phase, self.sub_phase
        )
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, ArrangementTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ArrangementTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(ArrangementTransferError::MissingPrefix)?;
        let version = parts
            .next()
            .ok_or(ArrangementTransferError::MissingVersion)?;
        let phase = parts.next().ok_or(ArrangementTransferError::MissingPhase)?;
        let payload = parts
            .next()
            .ok_or(ArrangementTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(ArrangementTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(ArrangementTransferError::UnsupportedVersion(
                version.to_owned(),
            ));
        }

        let (phase, sub_phase) = parse_phase(phase)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(ArrangementTransferError::InvalidEncoding)?;
        let decoded: SerializableArrangement =
            serde_json::from_slice(&bytes).map_err(ArrangementTransferError::InvalidPayload)?;

        Ok(Self {
            phase,
            sub_phase,
            placements: decoded.placements,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableArrangement {
    placements: Vec<EntityPlacement>,
}

/// Errors that can occur while decoding arrangement transfer strings.
#[derive(Debug)]
pub(crate) enum ArrangementTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded arrangement.
    MissingPrefix,
    /// The encoded arrangement did not contain a version segment.
    MissingVersion,
    /// The encoded arrangement did not include the phase digits.
    MissingPhase,
    /// The encoded arrangement did not include the payload segment.
    MissingPayload,
    /// The encoded arrangement used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded arrangement used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The phase digits could not be parsed from the encoded arrangement.
    InvalidPhase(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for ArrangementTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "arrangement payload was empty"),
            Self::MissingPrefix => write!(f, "arrangement string is missing the prefix"),
            Self::MissingVersion => write!(f, "arrangement string is missing the version"),
            Self::MissingPhase => write!(f, "arrangement string is missing the phase digits"),
            Self::MissingPayload => write!(f, "arrangement string is missing the payload"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "arrangement prefix '{prefix}' is not supported")
            }
            Self::UnsupportedVersion(version) => {
                write!(f, "arrangement version '{version}' is not supported")
            }
            Self::InvalidPhase(phase) => {
                write!(f, "could not parse phase digits '{phase}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode arrangement payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse arrangement payload: {error}")
            }
        }
    }
}

impl Error for ArrangementTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_phase(phase: &str) -> Result<(u8, u8), ArrangementTransferError> {
    let (major, minor) = phase
        .split_once('.')
        .ok_or_else(|| ArrangementTransferError::InvalidPhase(phase.to_owned()))?;

    let major = major
        .trim()
        .parse::<u8>()
        .map_err(|_| ArrangementTransferError::InvalidPhase(phase.to_owned()))?;
    let minor = minor
        .trim()
        .parse::<u8>()
        .map_err(|_| ArrangementTransferError::InvalidPhase(phase.to_owned()))?;

    if major > 2 || minor > 2 {
        return Err(ArrangementTransferError::InvalidPhase(phase.to_owned()));
    }

    Ok((major, minor))
}
