//! Rankings and game-over checks
//!
//! Computes the scoreboard views and decides when a limit ends the game.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::game::state::{GameState, GameType, Slot};

/// One row of the scoreboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    pub slot: Slot,
    pub name: String,
    pub rank: u32,
    pub kills: i32,
    pub deaths: u32,
    pub hit_points: i32,
    pub oxygen: i32,
}

/// Summed score of one team
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamTotal {
    pub team_id: u8,
    pub kills: i32,
    pub members: usize,
}

/// Limits that end a game, `None` when disabled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    pub kill_limit: Option<i32>,
    pub time_limit: Option<Duration>,
}

/// Reason why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    KillLimit,
    TimeLimit,
}

impl GameOverReason {
    pub fn message(self) -> &'static str {
        match self {
            GameOverReason::KillLimit => "Kill limit reached, game over!",
            GameOverReason::TimeLimit => "Time limit reached, game over!",
        }
    }
}

/// Live worms sorted by kills (desc), deaths (asc), then slot
pub fn rankings(state: &GameState) -> Vec<Ranking> {
    let mut rankings: Vec<Ranking> = state
        .live_worms()
        .map(|(slot, worm)| Ranking {
            slot,
            name: worm.name.clone(),
            rank: 0,
            kills: worm.kills,
            deaths: worm.deaths,
            hit_points: worm.hit_points,
            oxygen: worm.oxygen,
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.kills
            .cmp(&a.kills)
            .then_with(|| a.deaths.cmp(&b.deaths))
            .then_with(|| a.slot.cmp(&b.slot))
    });

    for (i, ranking) in rankings.iter_mut().enumerate() {
        ranking.rank = (i + 1) as u32;
    }
    rankings
}

/// Kill sums per team, best team first (ties by team id)
pub fn team_totals(state: &GameState) -> Vec<TeamTotal> {
    let mut totals: Vec<TeamTotal> = Vec::new();
    for (_, worm) in state.live_worms() {
        match totals.iter_mut().find(|t| t.team_id == worm.team_id()) {
            Some(total) => {
                total.kills += worm.kills;
                total.members += 1;
            }
            None => totals.push(TeamTotal {
                team_id: worm.team_id(),
                kills: worm.kills,
                members: 1,
            }),
        }
    }
    totals.sort_by(|a, b| b.kills.cmp(&a.kills).then_with(|| a.team_id.cmp(&b.team_id)));
    totals
}

/// Score the kill limit is measured against: the best individual score in
/// free-for-all, the best team sum in team melee. Never below zero.
pub fn leading_score(state: &GameState) -> i32 {
    let best = match state.rules.game_type {
        GameType::FreeForAll => state.live_worms().map(|(_, worm)| worm.kills).max(),
        GameType::TeamMelee => team_totals(state).first().map(|total| total.kills),
    };
    best.unwrap_or(0).max(0)
}

/// Check if a limit has been reached. The kill limit is checked first.
pub fn check_game_over(state: &GameState, limits: &Limits, elapsed: Duration) -> Option<GameOverReason> {
    if let Some(kill_limit) = limits.kill_limit {
        if leading_score(state) >= kill_limit {
            return Some(GameOverReason::KillLimit);
        }
    }
    if let Some(time_limit) = limits.time_limit {
        if elapsed >= time_limit {
            return Some(GameOverReason::TimeLimit);
        }
    }
    None
}
