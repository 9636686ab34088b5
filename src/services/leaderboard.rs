// src/services/leaderboard.rs

//! Leaderboard ranking.
//!
//! Entries are sorted by score, highest first. Ties keep their input order
//! (the sort is stable) and receive consecutive ranks, so `[b:90, c:90]`
//! ranks b 1st and c 2nd. There is no shared-rank ("1, 1, 3") handling.

use std::{cmp::Ordering, collections::HashMap};

use crate::models::student::{LeaderboardEntry, Movement, RankedEntry, Student};

/// Sorts and rank-annotates `entries`. Pure and idempotent.
pub fn rank(mut entries: Vec<LeaderboardEntry>) -> Vec<RankedEntry> {
    entries.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let rank = index as u32 + 1;
            let movement = entry
                .previous_rank
                .map(|previous| i64::from(previous) - i64::from(rank))
                .unwrap_or(0);
            let direction = match movement.cmp(&0) {
                Ordering::Greater => Movement::Up,
                Ordering::Less => Movement::Down,
                Ordering::Equal => Movement::None,
            };

            RankedEntry {
                entry,
                rank,
                movement,
                direction,
            }
        })
        .collect()
}

/// Builds leaderboard rows from the roster, scoring by overall progress.
pub fn entries_from_students(
    students: &[Student],
    previous_ranks: &HashMap<String, u32>,
) -> Vec<LeaderboardEntry> {
    students
        .iter()
        .map(|s| LeaderboardEntry {
            id: s.id.clone(),
            name: s.name.clone(),
            score: s.progress,
            previous_rank: previous_ranks.get(&s.id).copied(),
            avatar: s.avatar.clone(),
            subjects: (!s.subject_scores.is_empty()).then(|| s.subject_scores.clone()),
        })
        .collect()
}

/// Current rank of every student, used as the next cycle's `previous_rank`.
pub fn rank_snapshot(students: &[Student]) -> HashMap<String, u32> {
    rank(entries_from_students(students, &HashMap::new()))
        .into_iter()
        .map(|r| (r.entry.id, r.rank))
        .collect()
}
