//! Ranking entries, their ordering, and the ranked views built from them.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingType {
    Daily,
    Weekly,
    Monthly,
    AllTime,
}

impl RankingType {
    pub const ALL: [RankingType; 4] = [
        RankingType::Daily,
        RankingType::Weekly,
        RankingType::Monthly,
        RankingType::AllTime,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            RankingType::Daily => "daily",
            RankingType::Weekly => "weekly",
            RankingType::Monthly => "monthly",
            RankingType::AllTime => "all_time",
        }
    }
}

impl fmt::Display for RankingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RankingType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::InvalidRankingType,
                    format!("Unknown ranking type: {s}"),
                )
            })
    }
}

/// Pruning tier; `Candidate` until the first scheduled prune classifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionLevel {
    Candidate,
    Current,
    Previous,
    Older,
    Archive,
}

impl RetentionLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            RetentionLevel::Candidate => "candidate",
            RetentionLevel::Current => "current",
            RetentionLevel::Previous => "previous",
            RetentionLevel::Older => "older",
            RetentionLevel::Archive => "archive",
        }
    }
}

impl FromStr for RetentionLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candidate" => Ok(RetentionLevel::Candidate),
            "current" => Ok(RetentionLevel::Current),
            "previous" => Ok(RetentionLevel::Previous),
            "older" => Ok(RetentionLevel::Older),
            "archive" => Ok(RetentionLevel::Archive),
            other => Err(DomainError::validation_other(format!(
                "Unknown retention level: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub id: String,
    pub user_id: String,
    pub display_name: String,
    pub score: u32,
    pub correct_answers: u32,
    pub total_cards: u32,
    pub time_elapsed: u32,
    pub ranking_type: RankingType,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub retention_level: RetentionLevel,
    pub rank: Option<u32>,
}

/// Score to submit, as reported by a finished player.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub score: u32,
    pub correct_answers: u32,
    pub total_cards: u32,
    pub time_elapsed: u32,
    pub ranking_type: RankingType,
}

impl ScoreSubmission {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.correct_answers > self.total_cards || self.score > self.total_cards {
            return Err(DomainError::validation(
                ValidationKind::InvalidScore,
                "score and correct answers cannot exceed total cards",
            ));
        }
        Ok(())
    }
}

/// Score descending, then time ascending, then `created_at` ascending, then id.
pub fn compare_entries(a: &RankingEntry, b: &RankingEntry) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.time_elapsed.cmp(&b.time_elapsed))
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_entries(entries: &mut [RankingEntry]) {
    entries.sort_by(compare_entries);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingView {
    pub top: Vec<RankingEntry>,
    pub user_rank: Option<u32>,
    pub user_context: Vec<RankingEntry>,
    pub total_count: u64,
}

/// Build a view over `entries` (already ordered), assigning 1-based ranks.
///
/// `user_context` is only filled when the user's best rank lies beyond
/// `keep_top`; it spans `context_range` places on either side.
pub fn build_view(
    mut entries: Vec<RankingEntry>,
    user_id: Option<&str>,
    keep_top: usize,
    context_range: usize,
    total_count: u64,
) -> RankingView {
    for (i, e) in entries.iter_mut().enumerate() {
        e.rank = Some(i as u32 + 1);
    }

    let user_index = user_id.and_then(|uid| entries.iter().position(|e| e.user_id == uid));
    let user_context = match user_index {
        Some(idx) if idx >= keep_top => {
            let start = idx.saturating_sub(context_range);
            let end = (idx + context_range + 1).min(entries.len());
            entries[start..end].to_vec()
        }
        _ => Vec::new(),
    };

    entries.truncate(keep_top);
    RankingView {
        top: entries,
        user_rank: user_index.map(|i| i as u32 + 1),
        user_context,
        total_count,
    }
}

/// Offset of the first entry an on-submit trim may remove.
pub fn trim_offset(keep_top: usize, context_range: usize) -> usize {
    keep_top + 2 * context_range
}
