//! Static ability table and combat formulas.
//!
//! Abilities are data: a named entry with a cooldown and a list of effects.
//! The battle engine interprets them; nothing here touches session state.

use serde::{Deserialize, Serialize};

/// Stats a buff or debuff can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuffStat {
    Attack,
    Defense,
    Speed,
}

/// Status conditions an ability can inflict or grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusKind {
    /// Damage at the start of each of the victim's turns.
    Burn,
    /// Skip the victim's action.
    Stun,
    /// Heal at the start of each of the bearer's turns.
    Regen,
    /// Flat damage reduction while active.
    Shield,
}

impl StatusKind {
    pub fn label(&self) -> &'static str {
        match self {
            StatusKind::Burn => "Burn",
            StatusKind::Stun => "Stun",
            StatusKind::Regen => "Regen",
            StatusKind::Shield => "Shield",
        }
    }
}

/// One effect of an ability. Abilities may carry several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityEffect {
    Damage {
        power: i64,
    },
    Heal {
        power: i64,
    },
    /// Buff (`on_self`) or debuff (`!on_self`) a stat for the rest of the battle.
    StatChange {
        stat: BuffStat,
        amount: i64,
        on_self: bool,
    },
    /// Chance-gated status application on the opponent (or self for Regen/Shield).
    Status {
        kind: StatusKind,
        magnitude: i64,
        duration: u32,
        chance_percent: u32,
    },
}

/// A static ability table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ability {
    pub id: &'static str,
    pub name: &'static str,
    pub cooldown: u32,
    pub effects: &'static [AbilityEffect],
    pub description: &'static str,
}

/// The full ability table. Ids are stable; card documents reference them.
pub const ABILITIES: &[Ability] = &[
    Ability {
        id: "strike",
        name: "Strike",
        cooldown: 0,
        effects: &[AbilityEffect::Damage { power: 12 }],
        description: "A plain attack.",
    },
    Ability {
        id: "heavy_blow",
        name: "Heavy Blow",
        cooldown: 2,
        effects: &[AbilityEffect::Damage { power: 26 }],
        description: "Slow, heavy hit.",
    },
    Ability {
        id: "flame_burst",
        name: "Flame Burst",
        cooldown: 3,
        effects: &[
            AbilityEffect::Damage { power: 18 },
            AbilityEffect::Status {
                kind: StatusKind::Burn,
                magnitude: 6,
                duration: 3,
                chance_percent: 80,
            },
        ],
        description: "Fire damage with a strong chance to burn.",
    },
    Ability {
        id: "stunning_palm",
        name: "Stunning Palm",
        cooldown: 4,
        effects: &[
            AbilityEffect::Damage { power: 10 },
            AbilityEffect::Status {
                kind: StatusKind::Stun,
                magnitude: 0,
                duration: 1,
                chance_percent: 50,
            },
        ],
        description: "Light hit that can stun for a turn.",
    },
    Ability {
        id: "mend",
        name: "Mend",
        cooldown: 3,
        effects: &[AbilityEffect::Heal { power: 20 }],
        description: "Restore health.",
    },
    Ability {
        id: "second_wind",
        name: "Second Wind",
        cooldown: 5,
        effects: &[
            AbilityEffect::Heal { power: 10 },
            AbilityEffect::Status {
                kind: StatusKind::Regen,
                magnitude: 8,
                duration: 3,
                chance_percent: 100,
            },
        ],
        description: "Small heal plus regeneration.",
    },
    Ability {
        id: "war_cry",
        name: "War Cry",
        cooldown: 4,
        effects: &[AbilityEffect::StatChange {
            stat: BuffStat::Attack,
            amount: 8,
            on_self: true,
        }],
        description: "Raise own attack.",
    },
    Ability {
        id: "iron_wall",
        name: "Iron Wall",
        cooldown: 4,
        effects: &[
            AbilityEffect::StatChange {
                stat: BuffStat::Defense,
                amount: 8,
                on_self: true,
            },
            AbilityEffect::Status {
                kind: StatusKind::Shield,
                magnitude: 5,
                duration: 2,
                chance_percent: 100,
            },
        ],
        description: "Raise defense and shield incoming hits.",
    },
    Ability {
        id: "intimidate",
        name: "Intimidate",
        cooldown: 3,
        effects: &[AbilityEffect::StatChange {
            stat: BuffStat::Attack,
            amount: -6,
            on_self: false,
        }],
        description: "Lower the opponent's attack.",
    },
    Ability {
        id: "slow_field",
        name: "Slow Field",
        cooldown: 3,
        effects: &[AbilityEffect::StatChange {
            stat: BuffStat::Speed,
            amount: -5,
            on_self: false,
        }],
        description: "Lower the opponent's speed.",
    },
];

/// Look up an ability by id.
pub fn lookup(id: &str) -> Option<&'static Ability> {
    ABILITIES.iter().find(|a| a.id == id)
}

/// Every card knows this ability even if its kit omits it.
pub const BASIC_ATTACK: &str = "strike";

/// Derive a deterministic default kit for a character: the basic attack plus
/// three abilities picked by a stable hash of the character's name. The same
/// character always rolls the same kit.
pub fn default_kit(character_name: &str) -> Vec<String> {
    let pool: Vec<&Ability> = ABILITIES.iter().filter(|a| a.id != BASIC_ATTACK).collect();
    let mut hash: u64 = 1469598103934665603;
    for b in character_name.bytes() {
        hash = hash.wrapping_mul(31).wrapping_add(b as u64);
    }
    let mut kit = vec![BASIC_ATTACK.to_string()];
    let mut picked: Vec<usize> = Vec::new();
    let mut cursor = hash;
    while picked.len() < 3 {
        let idx = (cursor % pool.len() as u64) as usize;
        if !picked.contains(&idx) {
            picked.push(idx);
            kit.push(pool[idx].id.to_string());
        }
        cursor = cursor.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    }
    kit
}

/// Damage dealt by a hit: ability power plus attack scaling, less defense
/// mitigation, never below 1.
pub fn damage_formula(power: i64, attack: i64, defense: i64) -> i64 {
    (power + attack / 2 - defense / 3).max(1)
}

/// Healing restored: ability power plus level scaling.
pub fn heal_formula(power: i64, level: u32) -> i64 {
    power + 2 * level as i64
}

/// Check the table for duplicate ids or unusable entries.
pub fn validate_table() -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    for (i, ability) in ABILITIES.iter().enumerate() {
        if ability.effects.is_empty() {
            errors.push(format!("ability {} has no effects", ability.id));
        }
        for other in &ABILITIES[i + 1..] {
            if other.id == ability.id {
                errors.push(format!("duplicate ability id {}", ability.id));
            }
        }
        for effect in ability.effects {
            if let AbilityEffect::Status { chance_percent, .. } = effect {
                if *chance_percent > 100 {
                    errors.push(format!("ability {} has chance > 100", ability.id));
                }
            }
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_validates() {
        assert_eq!(validate_table(), Ok(()));
    }

    #[test]
    fn lookup_finds_basic_attack() {
        let ability = lookup(BASIC_ATTACK).expect("basic attack in table");
        assert_eq!(ability.cooldown, 0);
    }

    #[test]
    fn default_kit_is_stable_and_distinct() {
        let a = default_kit("Rem");
        let b = default_kit("Rem");
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
        let mut sorted = a.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 4, "kit abilities must be distinct");
    }

    #[test]
    fn damage_never_below_one() {
        assert_eq!(damage_formula(1, 0, 1000), 1);
        assert!(damage_formula(20, 30, 10) > 1);
    }
}
