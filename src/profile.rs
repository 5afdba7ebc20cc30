// SPDX-License-Identifier: MIT
//! Load/save helpers for the singleton `userProfile` blob.
//!
//! The profile is lazily created with defaults on first read, with the full
//! award catalogue seeded in. Callers that mutate the profile must hold the
//! `userProfile` key lock across load and save; nothing here locks, so these
//! helpers can run inside a caller's read-modify-write cycle.

use anyhow::Result;
use chrono::{DateTime, Utc, Weekday};

use crate::achievements::catalog;
use crate::model::UserProfile;
use crate::storage::{keys, Storage};

/// Monday of the ISO week containing `now`, `%Y-%m-%d`. Used as the reset
/// anchor for the weekly quiz counter.
pub fn week_anchor(now: DateTime<Utc>) -> String {
    now.date_naive()
        .week(Weekday::Mon)
        .first_day()
        .format("%Y-%m-%d")
        .to_string()
}

/// Read the profile, creating and persisting a default one on first read.
///
/// Awards added to the catalogue after a profile was first persisted are
/// merged in (locked, zero progress) so older profiles keep working.
pub async fn load_or_init(storage: &Storage, now: DateTime<Utc>) -> Result<UserProfile> {
    if let Some(mut profile) = storage.get_json::<UserProfile>(keys::USER_PROFILE).await? {
        catalog::merge_missing(&mut profile.awards);
        return Ok(profile);
    }

    let profile = UserProfile {
        stats: crate::model::UserStats {
            weekly_anchor: week_anchor(now),
            ..Default::default()
        },
        level: 1,
        level_progress: 0,
        awards: catalog::seed_awards(),
    };
    save(storage, &profile).await?;
    Ok(profile)
}

pub async fn save(storage: &Storage, profile: &UserProfile) -> Result<()> {
    storage.set_json(keys::USER_PROFILE, profile).await
}

// ─── Tests ────────────────────────────────────────────────────────────────────
