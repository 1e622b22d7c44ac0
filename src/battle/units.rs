use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::abilities::{self, StatusKind};
use crate::store::documents::CardDoc;

/// A status condition active on a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStatus {
    pub kind: StatusKind,
    pub magnitude: i64,
    pub remaining: u32,
}

/// A card lifted into battle. Lives only inside a session; the card document
/// is never touched while a battle runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleUnit {
    pub card_id: u64,
    pub owner_id: u64,
    pub name: String,
    pub level: u32,
    pub current_hp: i64,
    pub max_hp: i64,
    pub attack: i64,
    pub defense: i64,
    pub speed: i64,
    pub ability_ids: Vec<String>,
    /// Remaining cooldown turns per ability id.
    pub cooldowns: HashMap<String, u32>,
    pub statuses: Vec<ActiveStatus>,
}

impl BattleUnit {
    pub fn from_card(card: &CardDoc) -> Self {
        let ability_ids = if card.ability_ids.is_empty() {
            vec![abilities::BASIC_ATTACK.to_string()]
        } else {
            card.ability_ids.clone()
        };
        BattleUnit {
            card_id: card.id,
            owner_id: card.owner_id,
            name: card.character.name.clone(),
            level: card.level,
            current_hp: card.stats.hp,
            max_hp: card.stats.hp,
            attack: card.stats.attack,
            defense: card.stats.defense,
            speed: card.stats.speed,
            ability_ids,
            cooldowns: HashMap::new(),
            statuses: Vec::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    pub fn cooldown_of(&self, ability_id: &str) -> u32 {
        self.cooldowns.get(ability_id).copied().unwrap_or(0)
    }

    /// Ability ids currently usable (known and off cooldown).
    pub fn ready_abilities(&self) -> Vec<&str> {
        self.ability_ids
            .iter()
            .filter(|id| self.cooldown_of(id) == 0)
            .map(|id| id.as_str())
            .collect()
    }

    /// Sum of active shield magnitudes, applied as flat damage reduction.
    pub fn shield_total(&self) -> i64 {
        self.statuses
            .iter()
            .filter(|s| s.kind == StatusKind::Shield)
            .map(|s| s.magnitude)
            .sum()
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.statuses.iter().any(|s| s.kind == kind)
    }

    /// Take damage after shield reduction; HP floors at 0. Returns the
    /// amount actually dealt.
    pub fn take_damage(&mut self, amount: i64) -> i64 {
        let reduced = (amount - self.shield_total()).max(1);
        let dealt = reduced.min(self.current_hp);
        self.current_hp -= dealt;
        dealt
    }

    /// Heal, capped at max HP. Returns the amount actually restored.
    pub fn heal(&mut self, amount: i64) -> i64 {
        let healed = amount.min(self.max_hp - self.current_hp).max(0);
        self.current_hp += healed;
        healed
    }
}
