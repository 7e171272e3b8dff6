//! Museum coin catalog queries

use coinmatch_common::db::models::MuseumCoin;
use coinmatch_common::Result;
use sqlx::SqliteConnection;

/// Filters for catalog listing
#[derive(Debug, Clone, Default)]
pub struct CoinFilter {
    /// Case-insensitive substring match on mint
    pub mint: Option<String>,
    /// Case-insensitive substring match on authority
    pub authority: Option<String>,
    /// Free-text search over catalog number, mint, authority, denomination
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Load a museum coin by id
pub async fn get_coin(conn: &mut SqliteConnection, coin_id: &str) -> Result<Option<MuseumCoin>> {
    let coin = sqlx::query_as::<_, MuseumCoin>("SELECT * FROM museum_coins WHERE coin_id = ?")
        .bind(coin_id)
        .fetch_optional(conn)
        .await?;
    Ok(coin)
}

/// List catalog coins with optional filters, ordered by catalog number
pub async fn list_coins(conn: &mut SqliteConnection, filter: &CoinFilter) -> Result<Vec<MuseumCoin>> {
    let coins = sqlx::query_as::<_, MuseumCoin>(
        r#"
        SELECT * FROM museum_coins
        WHERE (?1 = '' OR LOWER(mint) LIKE '%' || LOWER(?1) || '%')
          AND (?2 = '' OR LOWER(authority) LIKE '%' || LOWER(?2) || '%')
          AND (?3 = ''
               OR LOWER(COALESCE(catalog_number, '')) LIKE '%' || LOWER(?3) || '%'
               OR LOWER(mint) LIKE '%' || LOWER(?3) || '%'
               OR LOWER(authority) LIKE '%' || LOWER(?3) || '%'
               OR LOWER(denomination) LIKE '%' || LOWER(?3) || '%')
        ORDER BY catalog_number
        LIMIT ?4 OFFSET ?5
        "#,
    )
    .bind(filter.mint.as_deref().unwrap_or(""))
    .bind(filter.authority.as_deref().unwrap_or(""))
    .bind(filter.search.as_deref().unwrap_or(""))
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(conn)
    .await?;
    Ok(coins)
}

/// Load all catalog coins (match generation default scope)
pub async fn list_all_coins(conn: &mut SqliteConnection) -> Result<Vec<MuseumCoin>> {
    let coins = sqlx::query_as::<_, MuseumCoin>("SELECT * FROM museum_coins ORDER BY coin_id")
        .fetch_all(conn)
        .await?;
    Ok(coins)
}

/// First catalog coin in coin_id order (weak-link target for the search linker)
pub async fn first_coin(conn: &mut SqliteConnection) -> Result<Option<MuseumCoin>> {
    let coin =
        sqlx::query_as::<_, MuseumCoin>("SELECT * FROM museum_coins ORDER BY coin_id LIMIT 1")
            .fetch_optional(conn)
            .await?;
    Ok(coin)
}

/// Insert or update a museum coin (full-row upsert; `created_at` is kept)
pub async fn save_coin(conn: &mut SqliteConnection, coin: &MuseumCoin) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO museum_coins (
            coin_id, mint, authority, date_range, denomination, metal,
            weight, diameter, die_axis, obverse_description, reverse_description,
            obverse_inscription, reverse_inscription, monograms, reference_list,
            catalog_number, source_database, provenance_text, previous_owners,
            auction_history, estimate_value, sale_price, obverse_image_key,
            reverse_image_key, lot_description_raw, lot_description_en,
            created_at, updated_at, source_type
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(coin_id) DO UPDATE SET
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
            estimate_value = excluded.estimate_value,
            sale_price = excluded.sale_price,
            obverse_image_key = excluded.obverse_image_key,
            reverse_image_key = excluded.reverse_image_key,
            lot_description_raw = excluded.lot_description_raw,
            lot_description_en = excluded.lot_description_en,
            updated_at = excluded.updated_at,
            source_type = excluded.source_type
        "#,
    )
    .bind(&coin.coin_id)
    .bind(&coin.mint)
    .bind(&coin.authority)
    .bind(&coin.date_range)
    .bind(&coin.denomination)
    .bind(&coin.metal)
    .bind(coin.weight)
    .bind(coin.diameter)
    .bind(&coin.die_axis)
    .bind(&coin.obverse_description)
    .bind(&coin.reverse_description)
    .bind(&coin.obverse_inscription)
    .bind(&coin.reverse_inscription)
    .bind(&coin.monograms)
    .bind(&coin.reference_list)
    .bind(&coin.catalog_number)
    .bind(&coin.source_database)
    .bind(&coin.provenance_text)
    .bind(&coin.previous_owners)
    .bind(&coin.auction_history)
    .bind(&coin.estimate_value)
    .bind(&coin.sale_price)
    .bind(&coin.obverse_image_key)
    .bind(&coin.reverse_image_key)
    .bind(&coin.lot_description_raw)
    .bind(&coin.lot_description_en)
    .bind(&coin.created_at)
    .bind(&coin.updated_at)
    .bind(&coin.source_type)
    .execute(conn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinmatch_common::db::models::{merge_museum_coin, MuseumCoinPatch};
    use sqlx::SqlitePool;

    async fn setup() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("in-memory database");
        coinmatch_common::db::create_schema(&pool).await.unwrap();
        pool
    }

    fn coin(coin_id: &str, mint: &str, catalog_number: &str) -> MuseumCoin {
        let patch = MuseumCoinPatch {
            mint: Some(mint.to_string()),
            catalog_number: Some(catalog_number.to_string()),
            ..Default::default()
        };
        merge_museum_coin(None, coin_id, patch, "2026-01-01T00:00:00Z")
    }

    #[tokio::test]
    async fn test_save_and_get_coin() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();

        save_coin(&mut conn, &coin("coin-4224", "Tarentum", "HAM Dewing 4224"))
            .await
            .unwrap();

        let loaded = get_coin(&mut conn, "coin-4224").await.unwrap().unwrap();
        assert_eq!(loaded.mint, "Tarentum");
        assert!(get_coin(&mut conn, "coin-9999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_coins_filters() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();

        save_coin(&mut conn, &coin("coin-1", "Tarentum", "HAM 1")).await.unwrap();
        save_coin(&mut conn, &coin("coin-2", "Alexandria", "HAM 2")).await.unwrap();

        let filter = CoinFilter {
            mint: Some("tarent".to_string()),
            limit: 100,
            ..Default::default()
        };
        let coins = list_coins(&mut conn, &filter).await.unwrap();
        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].coin_id, "coin-1");

        // No filters returns everything
        let all = list_coins(
            &mut conn,
            &CoinFilter { limit: 100, ..Default::default() },
        )
        .await
        .unwrap();
        assert_eq!(all.len(), 2);
    }
}
