//! Automated team battles.
//!
//! Two teams of up to five units fight without player input: the active
//! units duel under the normal engine rules and fallen units are replaced by
//! the next team member. The actor heuristic is deliberately simple: heal
//! when hurt and a heal is ready, otherwise the hardest-hitting ready
//! ability.

use rand_pcg::Lcg64Xsh32;

use super::engine::{self, ROUND_CAP};
use super::units::BattleUnit;
use crate::abilities::{self, Ability, AbilityEffect};
use crate::store::documents::BattleOutcome;

/// Maximum units per side.
pub const TEAM_SIZE: usize = 5;

/// Result of a finished team battle, from the challenger team's view.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamBattleReport {
    pub outcome: BattleOutcome,
    pub rounds: u64,
    pub challenger_survivors: usize,
    pub opponent_survivors: usize,
    pub transcript: Vec<String>,
}

fn total_damage_power(ability: &Ability) -> i64 {
    ability
        .effects
        .iter()
        .map(|e| match e {
            AbilityEffect::Damage { power } => *power,
            _ => 0,
        })
        .sum()
}

fn has_heal(ability: &Ability) -> bool {
    ability
        .effects
        .iter()
        .any(|e| matches!(e, AbilityEffect::Heal { .. }))
}

/// Pick the ability a unit plays this turn.
///
/// Below 35% HP a ready heal wins; otherwise the ready ability with the
/// highest damage power, falling back to the basic attack.
pub fn choose_ability(unit: &BattleUnit) -> &'static Ability {
    let ready: Vec<&'static Ability> = unit
        .ready_abilities()
        .iter()
        .filter_map(|id| abilities::lookup(id))
        .collect();

    if unit.current_hp * 100 < unit.max_hp * 35 {
        if let Some(heal) = ready.iter().copied().find(|a| has_heal(a)) {
            return heal;
        }
    }

    ready
        .iter()
        .max_by_key(|a| total_damage_power(a))
        .copied()
        .unwrap_or_else(|| {
            abilities::lookup(abilities::BASIC_ATTACK).expect("basic attack in table")
        })
}

fn first_alive(team: &[BattleUnit]) -> Option<usize> {
    team.iter().position(|u| u.is_alive())
}

fn alive_count(team: &[BattleUnit]) -> usize {
    team.iter().filter(|u| u.is_alive()).count()
}

/// Run a team battle to completion. Deterministic for a given seed and
/// team composition.
pub fn run_team_battle(
    mut challenger_team: Vec<BattleUnit>,
    mut opponent_team: Vec<BattleUnit>,
    seed: u64,
) -> Result<TeamBattleReport, String> {
    if challenger_team.is_empty() || opponent_team.is_empty() {
        return Err("both teams need at least one unit".to_string());
    }
    if challenger_team.len() > TEAM_SIZE || opponent_team.len() > TEAM_SIZE {
        return Err(format!("teams are capped at {TEAM_SIZE} units"));
    }

    let mut rng: Lcg64Xsh32 = super::seeded_rng(seed);
    let mut transcript: Vec<String> = Vec::new();
    let mut round: u64 = 1;

    while round <= ROUND_CAP {
        let (Some(ci), Some(oi)) = (first_alive(&challenger_team), first_alive(&opponent_team))
        else {
            break;
        };

        transcript.push(format!(
            "-- Round {round}: {} vs {}",
            challenger_team[ci].name, opponent_team[oi].name
        ));

        // Faster active unit acts first; challenger wins ties.
        let challenger_first = challenger_team[ci].speed >= opponent_team[oi].speed;
        let acts: [bool; 2] = if challenger_first {
            [true, false]
        } else {
            [false, true]
        };

        for challenger_acts in acts {
            let (actor, target) = if challenger_acts {
                (&mut challenger_team[ci], &mut opponent_team[oi])
            } else {
                (&mut opponent_team[oi], &mut challenger_team[ci])
            };
            if !actor.is_alive() || !target.is_alive() {
                continue;
            }

            let gate = engine::start_of_turn(actor, &mut transcript);
            if !gate.died && !gate.skip_action {
                let ability = choose_ability(actor);
                engine::apply_ability(actor, target, ability, &mut rng, &mut transcript);
                actor
                    .cooldowns
                    .insert(ability.id.to_string(), ability.cooldown);
            }
            engine::end_of_turn(actor);
        }

        // Announce knockouts and replacements after the exchanges.
        if !challenger_team[ci].is_alive() {
            transcript.push(format!("{} is defeated", challenger_team[ci].name));
            if let Some(next) = first_alive(&challenger_team) {
                transcript.push(format!("{} steps in", challenger_team[next].name));
            }
        }
        if !opponent_team[oi].is_alive() {
            transcript.push(format!("{} is defeated", opponent_team[oi].name));
            if let Some(next) = first_alive(&opponent_team) {
                transcript.push(format!("{} steps in", opponent_team[next].name));
            }
        }

        if alive_count(&challenger_team) == 0 || alive_count(&opponent_team) == 0 {
            break;
        }
        round += 1;
    }

    let challenger_survivors = alive_count(&challenger_team);
    let opponent_survivors = alive_count(&opponent_team);
    let outcome = if challenger_survivors > 0 && opponent_survivors == 0 {
        BattleOutcome::ChallengerWon
    } else if opponent_survivors > 0 && challenger_survivors == 0 {
        BattleOutcome::OpponentWon
    } else {
        BattleOutcome::Draw
    };
    transcript.push(match outcome {
        BattleOutcome::ChallengerWon => "Challenger team wins".to_string(),
        BattleOutcome::OpponentWon => "Opponent team wins".to_string(),
        BattleOutcome::Draw => "The battle ends in a draw".to_string(),
    });

    Ok(TeamBattleReport {
        outcome,
        rounds: round.min(ROUND_CAP),
        challenger_survivors,
        opponent_survivors,
        transcript,
    })
}
