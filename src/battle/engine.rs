//! Deterministic turn resolution.
//!
//! Pure-data functions over [`BattleUnit`]s and a seeded RNG. A battle
//! replays identically from its seed and action sequence; nothing here does
//! I/O or touches the store.

use rand::RngCore;
use rand_pcg::Lcg64Xsh32;
use serde::{Deserialize, Serialize};

use super::units::{ActiveStatus, BattleUnit};
use crate::abilities::{self, Ability, AbilityEffect, BuffStat, StatusKind};
use crate::store::documents::BattleOutcome;

/// Rounds after which a battle is forced to a draw.
pub const ROUND_CAP: u64 = 50;

/// The two sides of a 1v1 battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Challenger,
    Opponent,
}

impl Side {
    pub fn other(&self) -> Side {
        match self {
            Side::Challenger => Side::Opponent,
            Side::Opponent => Side::Challenger,
        }
    }
}

/// Snapshot of a running 1v1 battle. Pure data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleState {
    pub round: u64,
    /// Turn order for the current round, recomputed each round so speed
    /// changes take effect.
    pub order: [Side; 2],
    /// Index into `order` of the side acting next.
    pub turn_index: usize,
    pub challenger: BattleUnit,
    pub opponent: BattleUnit,
    pub is_finished: bool,
    pub outcome: Option<BattleOutcome>,
    pub transcript: Vec<String>,
}

impl BattleState {
    pub fn new(challenger: BattleUnit, opponent: BattleUnit) -> Self {
        let order = speed_order(&challenger, &opponent);
        BattleState {
            round: 1,
            order,
            turn_index: 0,
            challenger,
            opponent,
            is_finished: false,
            outcome: None,
            transcript: Vec::new(),
        }
    }

    pub fn unit(&self, side: Side) -> &BattleUnit {
        match side {
            Side::Challenger => &self.challenger,
            Side::Opponent => &self.opponent,
        }
    }

    /// The side whose turn it is, or None once finished.
    pub fn current_side(&self) -> Option<Side> {
        if self.is_finished {
            None
        } else {
            Some(self.order[self.turn_index])
        }
    }
}

/// Turn order for a round: faster unit first, challenger on ties.
pub fn speed_order(challenger: &BattleUnit, opponent: &BattleUnit) -> [Side; 2] {
    if opponent.speed > challenger.speed {
        [Side::Opponent, Side::Challenger]
    } else {
        [Side::Challenger, Side::Opponent]
    }
}

/// What the start-of-turn phase decided about the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnGate {
    pub skip_action: bool,
    pub died: bool,
}

/// Start-of-turn upkeep for one unit: cooldowns tick down, burn and regen
/// fire, stun consumes the action.
pub fn start_of_turn(unit: &mut BattleUnit, transcript: &mut Vec<String>) -> TurnGate {
    for cd in unit.cooldowns.values_mut() {
        *cd = cd.saturating_sub(1);
    }

    let mut skip_action = false;
    for status in unit.statuses.clone() {
        match status.kind {
            StatusKind::Burn => {
                let dealt = unit.take_damage(status.magnitude);
                transcript.push(format!("{} suffers {} burn damage", unit.name, dealt));
            }
            StatusKind::Regen => {
                let healed = unit.heal(status.magnitude);
                if healed > 0 {
                    transcript.push(format!("{} regenerates {} HP", unit.name, healed));
                }
            }
            StatusKind::Stun => {
                skip_action = true;
                transcript.push(format!("{} is stunned and loses the turn", unit.name));
            }
            StatusKind::Shield => {}
        }
    }

    TurnGate {
        skip_action,
        died: !unit.is_alive(),
    }
}

/// End-of-turn upkeep: status durations tick down and expired ones drop.
pub fn end_of_turn(unit: &mut BattleUnit) {
    for status in unit.statuses.iter_mut() {
        status.remaining = status.remaining.saturating_sub(1);
    }
    unit.statuses.retain(|s| s.remaining > 0);
}

/// Resolve one ability from `actor` against `target`. Damage carries a
/// 90–110% variance roll; status effects are chance-gated. Both rolls come
/// from the session RNG.
pub fn apply_ability(
    actor: &mut BattleUnit,
    target: &mut BattleUnit,
    ability: &Ability,
    rng: &mut Lcg64Xsh32,
    transcript: &mut Vec<String>,
) {
    for effect in ability.effects {
        match effect {
            AbilityEffect::Damage { power } => {
                let base = abilities::damage_formula(*power, actor.attack, target.defense);
                let variance = 90 + rng.next_u64() % 21;
                let rolled = (base * variance as i64) / 100;
                let dealt = target.take_damage(rolled.max(1));
                transcript.push(format!(
                    "{} uses {} on {} for {} damage",
                    actor.name, ability.name, target.name, dealt
                ));
            }
            AbilityEffect::Heal { power } => {
                let healed = actor.heal(abilities::heal_formula(*power, actor.level));
                transcript.push(format!(
                    "{} uses {} and restores {} HP",
                    actor.name, ability.name, healed
                ));
            }
            AbilityEffect::StatChange {
                stat,
                amount,
                on_self,
            } => {
                let unit = if *on_self { &mut *actor } else { &mut *target };
                let slot = match stat {
                    BuffStat::Attack => &mut unit.attack,
                    BuffStat::Defense => &mut unit.defense,
                    BuffStat::Speed => &mut unit.speed,
                };
                *slot = (*slot + amount).max(1);
                let unit_name = unit.name.clone();
                let verb = if *amount >= 0 { "raises" } else { "lowers" };
                transcript.push(format!(
                    "{} {} {}'s {:?} by {}",
                    actor.name,
                    verb,
                    unit_name,
                    stat,
                    amount.abs()
                ));
            }
            AbilityEffect::Status {
                kind,
                magnitude,
                duration,
                chance_percent,
            } => {
                let roll = rng.next_u64() % 100;
                if roll >= *chance_percent as u64 {
                    transcript.push(format!("{}'s {} fails to land", actor.name, kind.label()));
                    continue;
                }
                // Beneficial statuses stick to the caster.
                let unit = match kind {
                    StatusKind::Regen | StatusKind::Shield => &mut *actor,
                    StatusKind::Burn | StatusKind::Stun => &mut *target,
                };
                unit.statuses.push(ActiveStatus {
                    kind: *kind,
                    magnitude: *magnitude,
                    remaining: *duration,
                });
                transcript.push(format!("{} is affected by {}", unit.name, kind.label()));
            }
        }
    }
}

fn finish(state: &mut BattleState) {
    let challenger_alive = state.challenger.is_alive();
    let opponent_alive = state.opponent.is_alive();
    state.is_finished = true;
    state.outcome = Some(if challenger_alive && !opponent_alive {
        BattleOutcome::ChallengerWon
    } else if opponent_alive && !challenger_alive {
        BattleOutcome::OpponentWon
    } else {
        BattleOutcome::Draw
    });
}

fn check_battle_end(state: &mut BattleState) {
    if !state.challenger.is_alive() || !state.opponent.is_alive() {
        finish(state);
    }
}

/// Advance the turn cursor; when both sides have acted the round ends, turn
/// order is recomputed, and the round cap forces a draw.
fn advance_turn(state: &mut BattleState) {
    state.turn_index += 1;
    if state.turn_index >= state.order.len() {
        state.turn_index = 0;
        state.round += 1;
        state.order = speed_order(&state.challenger, &state.opponent);
        if state.round > ROUND_CAP {
            state
                .transcript
                .push(format!("Round cap of {ROUND_CAP} reached"));
            state.is_finished = true;
            state.outcome = Some(BattleOutcome::Draw);
        }
    }
}

/// Play the current actor's turn with the chosen ability.
///
/// Errors when the battle is over, the side acts out of turn, or the ability
/// is unknown/not ready; the state is unchanged on error.
pub fn play_turn(
    state: &mut BattleState,
    side: Side,
    ability_id: &str,
    rng: &mut Lcg64Xsh32,
) -> Result<(), String> {
    if state.is_finished {
        return Err("battle is already finished".to_string());
    }
    if state.current_side() != Some(side) {
        return Err("not this side's turn".to_string());
    }

    let ability = abilities::lookup(ability_id)
        .ok_or_else(|| format!("unknown ability: {ability_id}"))?;

    {
        let actor = match side {
            Side::Challenger => &state.challenger,
            Side::Opponent => &state.opponent,
        };
        if !actor.ability_ids.iter().any(|id| id == ability_id) {
            return Err(format!("{} does not know {}", actor.name, ability.name));
        }
        if actor.cooldown_of(ability_id) > 1 {
            // Cooldowns tick at the start of this turn, so only a value that
            // stays positive after the tick blocks the play.
            return Err(format!(
                "{} is on cooldown for {} more turns",
                ability.name,
                actor.cooldown_of(ability_id) - 1
            ));
        }
    }

    let BattleState {
        challenger,
        opponent,
        transcript,
        ..
    } = state;
    let (actor, target) = match side {
        Side::Challenger => (&mut *challenger, &mut *opponent),
        Side::Opponent => (&mut *opponent, &mut *challenger),
    };

    let gate = start_of_turn(actor, transcript);
    if gate.died {
        end_of_turn(actor);
        check_battle_end(state);
        if !state.is_finished {
            advance_turn(state);
        }
        return Ok(());
    }

    if !gate.skip_action {
        apply_ability(actor, target, ability, rng, transcript);
        actor.cooldowns.insert(ability_id.to_string(), ability.cooldown);
    }
    end_of_turn(actor);

    check_battle_end(state);
    if !state.is_finished {
        advance_turn(state);
    }
    Ok(())
}

/// Run a scripted battle to completion from a seed: each entry is the
/// ability the acting side plays. Used by tests and replay verification.
pub fn simulate(
    mut state: BattleState,
    seed: u64,
    script: &[&str],
) -> BattleState {
    use rand::SeedableRng;

    let mut seed_bytes = [0u8; 16];
    seed_bytes[0..8].copy_from_slice(&seed.to_le_bytes());
    seed_bytes[8..16].copy_from_slice(&seed.to_le_bytes());
    let mut rng = Lcg64Xsh32::from_seed(seed_bytes);

    for ability_id in script {
        let Some(side) = state.current_side() else {
            break;
        };
        if play_turn(&mut state, side, ability_id, &mut rng).is_err() {
            break;
        }
    }
    state
}
