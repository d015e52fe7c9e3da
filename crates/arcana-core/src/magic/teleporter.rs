//! Translocator gate registry
//!
//! Each explorable region keeps the gates it has discovered, keyed by region
//! coordinate and kept in discovery order. Long-range teleport spells pick
//! one of them as a destination.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ui::Selector;
use crate::world::{CreatureId, CreatureKind, SpellWorld, Tripoint};

pub const MSG_NO_GATE_KNOWN: &str = "No translocator target known.";
pub const MSG_TELEPORT_CANCELED: &str = "Teleport canceled.";
pub const MSG_GATE_OBSTRUCTED: &str = "Failed to teleport.  Teleporter obstructed or destroyed.";
pub const MSG_NO_VALID_TARGETS: &str = "No valid targets to teleport.";

/// Saved form of one gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSave {
    pub position: Tripoint,
    pub name: String,
}

/// Saved form of a region's gate registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeleporterListSave {
    pub known_teleporters: Vec<GateSave>,
}

/// Discovered gates of one region
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TeleporterListSave", into = "TeleporterListSave")]
pub struct TeleporterList {
    known: Vec<(Tripoint, String)>,
}

impl From<TeleporterListSave> for TeleporterList {
    fn from(save: TeleporterListSave) -> Self {
        let mut list = TeleporterList::default();
        for gate in save.known_teleporters {
            if !list.knows(gate.position) {
                list.known.push((gate.position, gate.name));
            }
        }
        list
    }
}

impl From<TeleporterList> for TeleporterListSave {
    fn from(list: TeleporterList) -> Self {
        TeleporterListSave {
            known_teleporters: list
                .known
                .into_iter()
                .map(|(position, name)| GateSave { position, name })
                .collect(),
        }
    }
}

/// What happened during a translocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslocateResult {
    pub messages: Vec<String>,
    /// Creatures that arrived at the destination
    pub moved: Vec<CreatureId>,
    pub destination: Option<Tripoint>,
}

impl TranslocateResult {
    fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.messages.push(msg.into());
        self
    }
}

impl TeleporterList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    pub fn knows(&self, region: Tripoint) -> bool {
        self.known.iter().any(|(p, _)| *p == region)
    }

    pub fn name_of(&self, region: Tripoint) -> Option<&str> {
        self.known
            .iter()
            .find(|(p, _)| *p == region)
            .map(|(_, name)| name.as_str())
    }

    /// Gates in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (Tripoint, &str)> {
        self.known.iter().map(|(p, name)| (*p, name.as_str()))
    }

    /// Register a newly found gate, asking the player for its name.
    ///
    /// Returns false without prompting when the gate is already known.
    /// A canceled prompt names the gate after its coordinate.
    pub fn activate(&mut self, region: Tripoint, selector: &mut dyn Selector) -> bool {
        if self.knows(region) {
            return false;
        }
        let name = selector
            .query_string("Name this gate.")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| region.to_string());
        debug!(%region, gate = %name, "gate activated");
        self.known.push((region, name));
        true
    }

    /// Forget a gate; unknown gates are ignored
    pub fn deactivate(&mut self, region: Tripoint) -> bool {
        let before = self.known.len();
        self.known.retain(|(p, _)| *p != region);
        let removed = self.known.len() != before;
        if removed {
            debug!(%region, "gate deactivated");
        }
        removed
    }

    /// Let the player pick a known gate
    pub fn choose_destination(&self, selector: &mut dyn Selector) -> Option<Tripoint> {
        if self.known.is_empty() {
            return None;
        }
        let labels: Vec<String> = self
            .known
            .iter()
            .map(|(p, name)| format!("{} {}", name, p))
            .collect();
        let choice = selector.select("Choose Translocator Gate", &labels)?;
        self.known.get(choice).map(|(p, _)| *p)
    }

    /// Send the player standing on any of `targets` to a chosen gate.
    ///
    /// A gate with no free landing cell is treated as destroyed and
    /// forgotten.
    pub fn translocate(
        &mut self,
        targets: &BTreeSet<Tripoint>,
        world: &mut dyn SpellWorld,
        selector: &mut dyn Selector,
    ) -> TranslocateResult {
        let result = TranslocateResult::default();
        if self.known.is_empty() {
            return result.with_message(MSG_NO_GATE_KNOWN);
        }
        let Some(dest) = self.choose_destination(selector) else {
            return result.with_message(MSG_TELEPORT_CANCELED);
        };

        let mut result = TranslocateResult {
            destination: Some(dest),
            ..result
        };
        let mut valid_targets = false;
        for p in targets {
            let Some(creature) = world.creature_at(*p) else {
                continue;
            };
            if creature.kind != CreatureKind::Avatar {
                continue;
            }
            valid_targets = true;
            let landed = world
                .find_gate_landing(dest)
                .is_some_and(|landing| world.relocate_to_region(creature.id, dest, landing));
            if landed {
                result.moved.push(creature.id);
            } else {
                result.messages.push(MSG_GATE_OBSTRUCTED.to_string());
                self.deactivate(dest);
            }
        }

        if !valid_targets {
            result.messages.push(MSG_NO_VALID_TARGETS.to_string());
        }
        result
    }
}
