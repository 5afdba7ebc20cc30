// SPDX-License-Identifier: MIT
//! Consecutive-day study streak, tracked over two scalar keys
//! (`lastQuizDate`, `streakCount`) at calendar-day granularity (UTC).

use anyhow::{Context as _, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::storage::{keys, Storage};

const DATE_FMT: &str = "%Y-%m-%d";

/// Result of applying one submission timestamp to the streak state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    /// Streak length after this submission.
    pub streak: u32,
    /// The streak length that was lost, when a gap of more than one day
    /// forced a reset. `None` on first-ever, same-day, and consecutive-day
    /// submissions.
    pub reset_from: Option<u32>,
}

async fn read_state(storage: &Storage) -> Result<(Option<NaiveDate>, u32)> {
    let last = match storage.get(keys::LAST_QUIZ_DATE).await? {
        Some(raw) => Some(
            NaiveDate::parse_from_str(&raw, DATE_FMT)
                .with_context(|| format!("parse stored lastQuizDate {raw:?}"))?,
        ),
        None => None,
    };
    let count = match storage.get(keys::STREAK_COUNT).await? {
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("parse stored streakCount {raw:?}"))?,
        None => 0,
    };
    Ok((last, count))
}

/// Advance the streak for a quiz completed at `now`.
///
/// First-ever quiz starts the streak at 1; a second quiz on the same
/// calendar day leaves it unchanged; the next calendar day extends it by
/// one; any larger gap resets it to 1.
pub async fn update_streak(storage: &Storage, now: DateTime<Utc>) -> Result<StreakUpdate> {
    // STREAK_COUNT is the designated lock for the (date, count) pair; both
    // keys are only ever written on this path.
    let _guard = storage.lock_key(keys::STREAK_COUNT).await;

    let today = now.date_naive();
    let (last, count) = read_state(storage).await?;

    let update = match last {
        None => StreakUpdate {
            streak: 1,
            reset_from: None,
        },
        Some(last) => {
            let gap = (today - last).num_days();
            match gap {
                // A timestamp from earlier than the stored day can only come
                // from a clock rollback; treat it like a same-day quiz.
                i64::MIN..=0 => {
                    return Ok(StreakUpdate {
                        streak: count.max(1),
                        reset_from: None,
                    });
                }
                1 => StreakUpdate {
                    streak: count + 1,
                    reset_from: None,
                },
                _ => StreakUpdate {
                    streak: 1,
                    reset_from: Some(count),
                },
            }
        }
    };

    storage
        .set(keys::LAST_QUIZ_DATE, &today.format(DATE_FMT).to_string())
        .await?;
    storage
        .set(keys::STREAK_COUNT, &update.streak.to_string())
        .await?;
    Ok(update)
}

/// Read the streak as of `now` without writing anything.
///
/// When more than one day has passed since the last quiz the streak is
/// already broken, so this reports 0 — but the stored value is left alone
/// (it is corrected by the next [`update_streak`]). The read-only view can
/// therefore disagree with the stored scalar.
pub async fn current_streak(storage: &Storage, now: DateTime<Utc>) -> Result<u32> {
    let (last, count) = read_state(storage).await?;
    let Some(last) = last else {
        return Ok(0);
    };
    let gap = (now.date_naive() - last).num_days();
    if gap > 1 {
        return Ok(0);
    }
    Ok(count)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
