//! Online coin (candidate listing) queries

use coinmatch_common::db::models::{MuseumCoin, OnlineCoin};
use coinmatch_common::Result;
use sqlx::SqliteConnection;

/// Upper bound on candidates considered per museum coin
pub const PREFILTER_LIMIT: i64 = 200;

/// Result cap for curator-facing search
pub const SEARCH_LIMIT: i64 = 20;

/// Load a candidate listing by id
pub async fn get_candidate(conn: &mut SqliteConnection, id: &str) -> Result<Option<OnlineCoin>> {
    let candidate = sqlx::query_as::<_, OnlineCoin>("SELECT * FROM online_coins WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(candidate)
}

/// Coarse recall-oriented prefilter for match generation.
///
/// Returns up to [`PREFILTER_LIMIT`] listings, most recently fetched
/// first. Each of mint / denomination / metal / authority constrains the
/// result only when the museum coin's field is non-empty; the comparison
/// is a case-insensitive substring match.
pub async fn prefilter_candidates(
    conn: &mut SqliteConnection,
    museum_coin: &MuseumCoin,
) -> Result<Vec<OnlineCoin>> {
    let candidates = sqlx::query_as::<_, OnlineCoin>(
        r#"
        SELECT * FROM online_coins
        WHERE (?1 = '' OR LOWER(COALESCE(mint, '')) LIKE '%' || LOWER(?1) || '%')
          AND (?2 = '' OR LOWER(COALESCE(denomination, '')) LIKE '%' || LOWER(?2) || '%')
          AND (?3 = '' OR LOWER(COALESCE(metal, '')) LIKE '%' || LOWER(?3) || '%')
          AND (?4 = '' OR LOWER(COALESCE(authority, '')) LIKE '%' || LOWER(?4) || '%')
        ORDER BY fetched_at DESC
        LIMIT ?5
        "#,
    )
    .bind(&museum_coin.mint)
    .bind(&museum_coin.denomination)
    .bind(&museum_coin.metal)
    .bind(&museum_coin.authority)
    .bind(PREFILTER_LIMIT)
    .fetch_all(conn)
    .await?;
    Ok(candidates)
}

/// Curator search over listings.
///
/// Optional filters: linked museum coin id, case-insensitive substring
/// over metadata_json / listing_reference, and a minimum similarity
/// score. Ordered best-score-first, capped at [`SEARCH_LIMIT`].
pub async fn search_candidates(
    conn: &mut SqliteConnection,
    museum_coin_id: Option<&str>,
    query_text: Option<&str>,
    min_score: f64,
) -> Result<Vec<OnlineCoin>> {
    let candidates = sqlx::query_as::<_, OnlineCoin>(
        r#"
        SELECT * FROM online_coins
        WHERE (?1 = '' OR museum_coin_id = ?1)
          AND (?2 = ''
               OR LOWER(COALESCE(metadata_json, '')) LIKE '%' || LOWER(?2) || '%'
               OR LOWER(listing_reference) LIKE '%' || LOWER(?2) || '%')
          AND similarity_score >= ?3
        ORDER BY similarity_score DESC
        LIMIT ?4
        "#,
    )
    .bind(museum_coin_id.unwrap_or(""))
    .bind(query_text.unwrap_or(""))
    .bind(min_score)
    .bind(SEARCH_LIMIT)
    .fetch_all(conn)
    .await?;
    Ok(candidates)
}

/// Write a freshly computed similarity score onto the live listing row
pub async fn set_similarity_score(
    conn: &mut SqliteConnection,
    id: &str,
    score: f64,
) -> Result<()> {
    sqlx::query("UPDATE online_coins SET similarity_score = ? WHERE id = ?")
        .bind(score)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Set the weak museum-coin link on a listing
pub async fn link_to_museum_coin(
    conn: &mut SqliteConnection,
    id: &str,
    museum_coin_id: &str,
) -> Result<()> {
    sqlx::query("UPDATE online_coins SET museum_coin_id = ? WHERE id = ?")
        .bind(museum_coin_id)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Insert or update a candidate listing (full-row upsert)
pub async fn save_candidate(conn: &mut SqliteConnection, candidate: &OnlineCoin) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO online_coins (
            id, museum_coin_id, similarity_score, listing_reference, sale_date,
            estimate_value, sale_price, listing_url, metadata_json, mint,
            authority, date_range, denomination, metal, weight, diameter,
            die_axis, obverse_description, reverse_description,
            obverse_inscription, reverse_inscription, monograms, reference_list,
            catalog_number, source_database, provenance_text, previous_owners,
            auction_history, obverse_image_key, reverse_image_key,
            lot_description_raw, lot_description_en, fetched_at, source_name
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            museum_coin_id = excluded.museum_coin_id,
            similarity_score = excluded.similarity_score,
            listing_reference = excluded.listing_reference,
            sale_date = excluded.sale_date,
            estimate_value = excluded.estimate_value,
            sale_price = excluded.sale_price,
            listing_url = excluded.listing_url,
            metadata_json = excluded.metadata_json,
            mint = excluded.mint,
            authority = excluded.authority,
            date_range = excluded.date_range,
            denomination = excluded.denomination,
            metal = excluded.metal,
            weight = excluded.weight,
            diameter = excluded.diameter,
            die_axis = excluded.die_axis,
            obverse_description = excluded.obverse_description,
            reverse_description = excluded.reverse_description,
            obverse_inscription = excluded.obverse_inscription,
            reverse_inscription = excluded.reverse_inscription,
            monograms = excluded.monograms,
            reference_list = excluded.reference_list,
            catalog_number = excluded.catalog_number,
            source_database = excluded.source_database,
            provenance_text = excluded.provenance_text,
            previous_owners = excluded.previous_owners,
            auction_history = excluded.auction_history,
            obverse_image_key = excluded.obverse_image_key,
            reverse_image_key = excluded.reverse_image_key,
            lot_description_raw = excluded.lot_description_raw,
            lot_description_en = excluded.lot_description_en,
            fetched_at = excluded.fetched_at,
            source_name = excluded.source_name
        "#,
    )
    .bind(&candidate.id)
    .bind(&candidate.museum_coin_id)
    .bind(candidate.similarity_score)
    .bind(&candidate.listing_reference)
    .bind(&candidate.sale_date)
    .bind(&candidate.estimate_value)
    .bind(&candidate.sale_price)
    .bind(&candidate.listing_url)
    .bind(&candidate.metadata_json)
    .bind(&candidate.mint)
    .bind(&candidate.authority)
    .bind(&candidate.date_range)
    .bind(&candidate.denomination)
    .bind(&candidate.metal)
    .bind(candidate.weight)
    .bind(candidate.diameter)
    .bind(&candidate.die_axis)
    .bind(&candidate.obverse_description)
    .bind(&candidate.reverse_description)
    .bind(&candidate.obverse_inscription)
    .bind(&candidate.reverse_inscription)
    .bind(&candidate.monograms)
    .bind(&candidate.reference_list)
    .bind(&candidate.catalog_number)
    .bind(&candidate.source_database)
    .bind(&candidate.provenance_text)
    .bind(&candidate.previous_owners)
    .bind(&candidate.auction_history)
    .bind(&candidate.obverse_image_key)
    .bind(&candidate.reverse_image_key)
    .bind(&candidate.lot_description_raw)
    .bind(&candidate.lot_description_en)
    .bind(&candidate.fetched_at)
    .bind(&candidate.source_name)
    .execute(conn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinmatch_common::db::models::{
        merge_museum_coin, merge_online_coin, MuseumCoinPatch, OnlineCoinPatch,
    };
    use sqlx::SqlitePool;

    async fn setup() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("in-memory database");
        coinmatch_common::db::create_schema(&pool).await.unwrap();
        pool
    }

    fn listing(id: &str, mint: &str, fetched_at: &str) -> OnlineCoin {
        let patch = OnlineCoinPatch {
            mint: Some(mint.to_string()),
            listing_reference: Some(format!("ref-{}", id)),
            ..Default::default()
        };
        merge_online_coin(None, id, patch, fetched_at)
    }

    fn museum(mint: &str, denomination: &str) -> MuseumCoin {
        let patch = MuseumCoinPatch {
            mint: Some(mint.to_string()),
            denomination: Some(denomination.to_string()),
            ..Default::default()
        };
        merge_museum_coin(None, "coin-1", patch, "2026-01-01T00:00:00Z")
    }

    #[tokio::test]
    async fn test_prefilter_substring_and_order() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();

        save_candidate(&mut conn, &listing("cand-1", "Tarentum", "2026-01-01T00:00:00Z"))
            .await
            .unwrap();
        save_candidate(&mut conn, &listing("cand-2", "Tarentum mint", "2026-01-02T00:00:00Z"))
            .await
            .unwrap();
        save_candidate(&mut conn, &listing("cand-3", "Alexandria", "2026-01-03T00:00:00Z"))
            .await
            .unwrap();

        // Empty denomination imposes no constraint; mint narrows to two,
        // most recently fetched first
        let museum_coin = museum("tarentum", "");
        let candidates = prefilter_candidates(&mut conn, &museum_coin).await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id, "cand-2");
        assert_eq!(candidates[1].id, "cand-1");
    }

    #[tokio::test]
    async fn test_prefilter_empty_fields_match_everything() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();

        save_candidate(&mut conn, &listing("cand-1", "Tarentum", "2026-01-01T00:00:00Z"))
            .await
            .unwrap();
        save_candidate(&mut conn, &listing("cand-2", "Alexandria", "2026-01-02T00:00:00Z"))
            .await
            .unwrap();

        let museum_coin = museum("", "");
        let candidates = prefilter_candidates(&mut conn, &museum_coin).await.unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[tokio::test]
    async fn test_search_candidates_min_score_and_text() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();

        let mut high = listing("cand-1", "Tarentum", "2026-01-01T00:00:00Z");
        high.similarity_score = 0.9;
        let mut low = listing("cand-2", "Tarentum", "2026-01-01T00:00:00Z");
        low.similarity_score = 0.2;
        save_candidate(&mut conn, &high).await.unwrap();
        save_candidate(&mut conn, &low).await.unwrap();

        let results = search_candidates(&mut conn, None, None, 0.5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "cand-1");

        let results = search_candidates(&mut conn, None, Some("REF-CAND-2"), 0.0)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "cand-2");
    }
}
