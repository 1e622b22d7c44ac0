use std::time::Duration;

use chrono::Utc;
use poise::serenity_prelude as serenity;
use rand::RngCore;
use tracing::warn;

use super::{Context, Error};
use crate::abilities;
use crate::battle::{auto as team_battle, engine::BattleState, units::BattleUnit, BattleSession};
use crate::progression;
use crate::render;
use crate::store::documents::{
    ActionPayload, BattleOutcome, BattleRecord, CardDoc,
};
use crate::store::Store;

/// How long a participant gets to pick an ability.
const TURN_TIMEOUT: Duration = Duration::from_secs(180);

/// Card battles.
#[poise::command(slash_command, subcommands("challenge", "auto"))]
pub async fn battle(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

fn strongest_card(store: &Store, user_id: u64) -> Result<CardDoc, String> {
    store
        .cards_of(user_id)
        .into_iter()
        .max_by_key(|c| (c.level, c.id))
        .cloned()
        .ok_or_else(|| format!("user {user_id} has no cards"))
}

fn unit_line(unit: &BattleUnit) -> String {
    let statuses: Vec<String> = unit
        .statuses
        .iter()
        .map(|s| format!("{}({})", s.kind.label(), s.remaining))
        .collect();
    let status_suffix = if statuses.is_empty() {
        String::new()
    } else {
        format!("  [{}]", statuses.join(" "))
    };
    format!(
        "**{}** Lv. {} — {} / {} HP{}",
        unit.name,
        unit.level,
        unit.current_hp.max(0),
        unit.max_hp,
        status_suffix
    )
}

fn battle_embed(state: &BattleState, turn_user: Option<u64>) -> serenity::CreateEmbed {
    let transcript_tail: Vec<&String> = state.transcript.iter().rev().take(6).rev().collect();
    let mut description = format!(
        "{}\n{}\n",
        unit_line(&state.challenger),
        unit_line(&state.opponent)
    );
    if !transcript_tail.is_empty() {
        description.push('\n');
        for line in transcript_tail {
            description.push_str(line);
            description.push('\n');
        }
    }
    let mut embed = serenity::CreateEmbed::new()
        .title(format!("Battle — Round {}", state.round))
        .colour(serenity::Colour::new(0xe67e22))
        .description(description);
    if let Some(user) = turn_user {
        embed = embed.field("Turn", format!("<@{user}> picks an ability"), false);
    }
    embed
}

fn ability_rows(unit: &BattleUnit, prefix: &str) -> Vec<serenity::CreateActionRow> {
    let buttons: Vec<serenity::CreateButton> = unit
        .ability_ids
        .iter()
        .take(5)
        .filter_map(|id| abilities::lookup(id))
        .map(|ability| {
            let cooldown = unit.cooldown_of(ability.id);
            let label = if cooldown > 1 {
                format!("{} ({})", ability.name, cooldown - 1)
            } else {
                ability.name.to_string()
            };
            serenity::CreateButton::new(format!("{prefix}{}", ability.id))
                .label(label)
                .style(serenity::ButtonStyle::Primary)
                .disabled(cooldown > 1)
        })
        .collect();
    vec![serenity::CreateActionRow::Buttons(buttons)]
}

/// Apply a terminated session to the store and return the closing text.
async fn settle_battle(ctx: Context<'_>, session: &BattleSession) -> String {
    let state = &session.state;
    let outcome = state.outcome.unwrap_or(BattleOutcome::Draw);
    let record = BattleRecord {
        challenger_id: session.challenger_id,
        opponent_id: session.opponent_id,
        outcome,
        rounds: state.round,
        finished_at: Utc::now(),
    };
    let winner = match outcome {
        BattleOutcome::ChallengerWon => {
            Some((session.challenger_id, state.challenger.card_id, state.opponent.level))
        }
        BattleOutcome::OpponentWon => {
            Some((session.opponent_id, state.opponent.card_id, state.challenger.level))
        }
        BattleOutcome::Draw => None,
    };

    let mut store = ctx.data().store.lock().await;
    match winner {
        Some((winner_id, winner_card, loser_level)) => {
            let coins = progression::battle_coin_reward(state.round);
            let xp = progression::battle_xp_reward(loser_level);
            store.apply_battle_outcome(record, Some((winner_id, winner_card)), coins, xp);
            format!("<@{winner_id}> wins! +{coins} coins, +{xp} card XP")
        }
        None => {
            store.apply_battle_outcome(record, None, 0, 0);
            "The battle ends in a draw.".to_string()
        }
    }
}

/// Challenge another user to a 1v1 card battle.
#[poise::command(slash_command)]
pub async fn challenge(
    ctx: Context<'_>,
    #[description = "Who to challenge"] opponent: serenity::User,
    #[description = "Your card id (defaults to your strongest)"] card_id: Option<u64>,
) -> Result<(), Error> {
    let challenger_id = ctx.author().id.get();
    let opponent_id = opponent.id.get();
    if opponent.bot {
        return Err("bots don't collect cards".into());
    }
    if opponent_id == challenger_id {
        return Err("you can't battle yourself".into());
    }

    let data = ctx.data();
    let session = {
        let store = data.store.lock().await;
        let mut rng = data.rng.lock().await;
        let challenger_card = match card_id {
            Some(id) => {
                let card = store.card(id).cloned().ok_or(format!("no card #{id}"))?;
                if card.owner_id != challenger_id {
                    return Err(format!("card #{id} is not yours").into());
                }
                card
            }
            None => strongest_card(&store, challenger_id)
                .map_err(|_| "you have no cards; try /drop first")?,
        };
        let opponent_card = strongest_card(&store, opponent_id)
            .map_err(|_| "your opponent has no cards yet")?;
        let seed = rng.next_u64();
        store
            .action_log
            .append("SetSeed", ActionPayload::SetSeed { seed }, Some(challenger_id));
        BattleSession::new(challenger_id, opponent_id, &challenger_card, &opponent_card, seed)
    };

    {
        let mut sessions = data.sessions.lock().await;
        sessions.start(session)?;
    }

    let prefix = format!("bt{}:", ctx.id());

    // Initial message.
    let (embed, rows) = {
        let mut sessions = data.sessions.lock().await;
        let session = sessions
            .get_mut_by_user(challenger_id)
            .ok_or("battle session vanished")?;
        let turn_user = session.current_user();
        let side = session.state.current_side().ok_or("battle already over")?;
        let rows = ability_rows(session.state.unit(side), &prefix);
        (battle_embed(&session.state, turn_user), rows)
    };
    let handle = ctx
        .send(
            poise::CreateReply::default()
                .embed(embed)
                .components(rows),
        )
        .await?;

    loop {
        let collector = serenity::ComponentInteractionCollector::new(ctx)
            .channel_id(ctx.channel_id())
            .timeout(TURN_TIMEOUT)
            .filter({
                let prefix = prefix.clone();
                move |press| press.data.custom_id.starts_with(&prefix)
            });

        let Some(press) = collector.await else {
            // Nobody moved in time; the battle is abandoned unrecorded.
            let mut sessions = data.sessions.lock().await;
            sessions.remove_by_user(challenger_id);
            drop(sessions);
            handle
                .edit(
                    ctx,
                    poise::CreateReply::default()
                        .embed(
                            serenity::CreateEmbed::new()
                                .title("Battle abandoned")
                                .description("No one picked an ability in time."),
                        )
                        .components(Vec::new()),
                )
                .await?;
            return Ok(());
        };

        let ability_id = press.data.custom_id[prefix.len()..].to_string();
        let presser_id = press.user.id.get();

        let play_result = {
            let mut sessions = data.sessions.lock().await;
            match sessions.get_mut_by_user(challenger_id) {
                Some(session) => session.play(presser_id, &ability_id),
                None => Err("this battle is over".to_string()),
            }
        };

        if let Err(e) = play_result {
            press
                .create_response(
                    ctx.serenity_context(),
                    serenity::CreateInteractionResponse::Message(
                        serenity::CreateInteractionResponseMessage::new()
                            .content(e)
                            .ephemeral(true),
                    ),
                )
                .await?;
            continue;
        }

        press
            .create_response(
                ctx.serenity_context(),
                serenity::CreateInteractionResponse::Acknowledge,
            )
            .await?;

        // Snapshot the state for display; settle if finished.
        let finished_session = {
            let mut sessions = data.sessions.lock().await;
            let session = sessions
                .get_mut_by_user(challenger_id)
                .ok_or("battle session vanished")?;
            if session.state.is_finished {
                sessions.remove_by_user(challenger_id)
            } else {
                None
            }
        };

        if let Some(session) = finished_session {
            let closing = settle_battle(ctx, &session).await;
            let mut reply = poise::CreateReply::default()
                .embed(
                    battle_embed(&session.state, None)
                        .field("Result", closing, false),
                )
                .components(Vec::new());
            match render::battle::render_battle(&session.state) {
                Ok(bytes) => {
                    reply =
                        reply.attachment(serenity::CreateAttachment::bytes(bytes, "battle.png"));
                }
                Err(e) => warn!("battle render unavailable: {e}"),
            }
            handle.edit(ctx, reply).await?;
            return Ok(());
        }

        let (embed, rows) = {
            let mut sessions = data.sessions.lock().await;
            let session = sessions
                .get_mut_by_user(challenger_id)
                .ok_or("battle session vanished")?;
            let turn_user = session.current_user();
            let side = session.state.current_side().ok_or("battle already over")?;
            let rows = ability_rows(session.state.unit(side), &prefix);
            (battle_embed(&session.state, turn_user), rows)
        };
        handle
            .edit(
                ctx,
                poise::CreateReply::default().embed(embed).components(rows),
            )
            .await?;
    }
}

/// Pit your top five cards against another user's in an automated battle.
#[poise::command(slash_command)]
pub async fn auto(
    ctx: Context<'_>,
    #[description = "Whose team to fight"] opponent: serenity::User,
) -> Result<(), Error> {
    let challenger_id = ctx.author().id.get();
    let opponent_id = opponent.id.get();
    if opponent_id == challenger_id {
        return Err("you can't battle yourself".into());
    }

    let data = ctx.data();
    let (report, challenger_card) = {
        let store = data.store.lock().await;
        let mut rng = data.rng.lock().await;

        let team_of = |user_id: u64| -> Vec<BattleUnit> {
            let mut cards = store.cards_of(user_id);
            cards.sort_by_key(|c| (std::cmp::Reverse(c.level), c.id));
            cards
                .into_iter()
                .take(team_battle::TEAM_SIZE)
                .map(BattleUnit::from_card)
                .collect()
        };
        let challenger_team = team_of(challenger_id);
        let opponent_team = team_of(opponent_id);
        if challenger_team.is_empty() {
            return Err("you have no cards; try /drop first".into());
        }
        if opponent_team.is_empty() {
            return Err("your opponent has no cards yet".into());
        }
        let challenger_card = challenger_team[0].card_id;

        let seed = rng.next_u64();
        store
            .action_log
            .append("SetSeed", ActionPayload::SetSeed { seed }, Some(challenger_id));
        (
            team_battle::run_team_battle(challenger_team, opponent_team, seed)?,
            challenger_card,
        )
    };

    // One store call applies the record and any rewards.
    {
        let mut store = data.store.lock().await;
        let record = BattleRecord {
            challenger_id,
            opponent_id,
            outcome: report.outcome,
            rounds: report.rounds,
            finished_at: Utc::now(),
        };
        let winner = match report.outcome {
            BattleOutcome::ChallengerWon => Some((challenger_id, challenger_card)),
            BattleOutcome::OpponentWon => {
                let opponent_card = strongest_card(&store, opponent_id)
                    .map(|c| c.id)
                    .unwrap_or(0);
                Some((opponent_id, opponent_card))
            }
            BattleOutcome::Draw => None,
        };
        let coins = progression::battle_coin_reward(report.rounds);
        store.apply_battle_outcome(record, winner, coins, progression::battle_xp_reward(10));
    }

    let mut tail = String::new();
    for line in report.transcript.iter().rev().take(18).rev() {
        if tail.len() + line.len() > 3500 {
            break;
        }
        tail.push_str(line);
        tail.push('\n');
    }
    let embed = serenity::CreateEmbed::new()
        .title(format!(
            "Auto battle — {} survivors vs {}",
            report.challenger_survivors, report.opponent_survivors
        ))
        .colour(serenity::Colour::new(0xe67e22))
        .description(tail)
        .field(
            "Result",
            match report.outcome {
                BattleOutcome::ChallengerWon => format!("<@{challenger_id}> wins"),
                BattleOutcome::OpponentWon => format!("<@{opponent_id}> wins"),
                BattleOutcome::Draw => "Draw".to_string(),
            },
            false,
        );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
