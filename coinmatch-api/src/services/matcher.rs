//! Match generation: attribute-overlap scoring of museum coins against
//! marketplace listings.
//!
//! The score is a deterministic weighted sum over four attributes; no
//! fuzzy string distance, no partial credit. Two candidates with the
//! same attribute overlap always receive the same score.

use crate::db;
use crate::db::matches::NewMatchRecord;
use coinmatch_common::db::models::{MatchStatus, MuseumCoin, OnlineCoin};
use coinmatch_common::db::now_timestamp;
use coinmatch_common::Result;
use sqlx::SqliteConnection;
use tracing::debug;

/// Attribute weights
const WEIGHT_MINT: f64 = 0.35;
const WEIGHT_AUTHORITY: f64 = 0.30;
const WEIGHT_DENOMINATION: f64 = 0.25;
const WEIGHT_METAL: f64 = 0.10;

/// Every candidate keeps nonzero relevance
pub const SCORE_FLOOR: f64 = 0.15;
/// 1.0 is reserved for "identical/confirmed" semantics outside this module
pub const SCORE_CEILING: f64 = 0.99;

/// Case-insensitive exact match; empty or missing fields never match
fn attributes_equal(museum: &str, candidate: Option<&str>) -> bool {
    if museum.is_empty() {
        return false;
    }
    match candidate {
        Some(value) if !value.is_empty() => museum.to_lowercase() == value.to_lowercase(),
        _ => false,
    }
}

/// Similarity score for a (museum coin, candidate listing) pair.
///
/// Pure function of the four compared attributes: weighted overlap sum,
/// clamped to [[`SCORE_FLOOR`], [`SCORE_CEILING`]], rounded to 4 decimal
/// digits.
pub fn compute_score(museum_coin: &MuseumCoin, candidate: &OnlineCoin) -> f64 {
    let mut overlap = 0.0;
    if attributes_equal(&museum_coin.mint, candidate.mint.as_deref()) {
        overlap += WEIGHT_MINT;
    }
    if attributes_equal(&museum_coin.authority, candidate.authority.as_deref()) {
        overlap += WEIGHT_AUTHORITY;
    }
    if attributes_equal(&museum_coin.denomination, candidate.denomination.as_deref()) {
        overlap += WEIGHT_DENOMINATION;
    }
    if attributes_equal(&museum_coin.metal, candidate.metal.as_deref()) {
        overlap += WEIGHT_METAL;
    }

    let score = overlap.clamp(SCORE_FLOOR, SCORE_CEILING);
    (score * 10_000.0).round() / 10_000.0
}

/// Regenerate match candidates and scores.
///
/// For each museum coin (all coins when `museum_coins` is None):
/// prefilter candidates, skip pairs whose match row is already Accepted
/// (curator decisions are frozen against rescoring), otherwise write the
/// fresh score onto the candidate row and upsert the match row. Returns
/// the number of match rows created or updated.
///
/// Runs on the caller's connection; atomicity is the caller's concern.
pub async fn generate_matches(
    conn: &mut SqliteConnection,
    museum_coins: Option<Vec<MuseumCoin>>,
) -> Result<u64> {
    let coins = match museum_coins {
        Some(coins) => coins,
        None => db::coins::list_all_coins(conn).await?,
    };

    let mut updated = 0u64;
    for coin in &coins {
        let candidates = db::candidates::prefilter_candidates(conn, coin).await?;
        debug!(
            coin_id = %coin.coin_id,
            candidates = candidates.len(),
            "Scoring prefiltered candidates"
        );

        for candidate in candidates {
            let existing = db::matches::find_pair(conn, &coin.coin_id, Some(&candidate.id)).await?;
            if let Some(record) = &existing {
                if record.status == MatchStatus::Accepted {
                    continue;
                }
            }

            let score = compute_score(coin, &candidate);
            db::candidates::set_similarity_score(conn, &candidate.id, score).await?;

            match existing {
                Some(record) => {
                    db::matches::update_generated_score(
                        conn,
                        record.id,
                        score,
                        Some(&candidate.listing_reference),
                        &now_timestamp(),
                    )
                    .await?;
                }
                None => {
                    db::matches::insert_record(
                        conn,
                        &NewMatchRecord {
                            museum_coin_id: coin.coin_id.clone(),
                            candidate_id: Some(candidate.id.clone()),
                            similarity_score: score,
                            status: MatchStatus::Pending,
                            notes: None,
                            source: Some(candidate.listing_reference.clone()),
                            saved_at: now_timestamp(),
                            decided_by: None,
                        },
                    )
                    .await?;
                }
            }
            updated += 1;
        }
    }

    Ok(updated)
}
