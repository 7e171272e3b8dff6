//! Museum coin catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use coinmatch_common::db::models::MuseumCoin;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::coins::CoinFilter;
use crate::{ApiError, AppState};

const MAX_PAGE_SIZE: i64 = 200;
const DEFAULT_PAGE_SIZE: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct CoinListQuery {
    pub mint: Option<String>,
    pub authority: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Catalog coin as served to the curator UI. `auction_history` is stored
/// as a JSON string and parsed out here so clients get structure, not a
/// quoted blob.
#[derive(Debug, Serialize)]
pub struct CoinResponse {
    pub coin_id: String,
    pub mint: String,
    pub authority: String,
    pub date_range: String,
    pub denomination: String,
    pub metal: String,
    pub weight: Option<f64>,
    pub diameter: Option<f64>,
    pub die_axis: Option<String>,
    pub obverse_description: String,
    pub reverse_description: String,
    pub obverse_inscription: Option<String>,
    pub reverse_inscription: Option<String>,
    pub monograms: Option<String>,
    pub reference_list: Option<String>,
    pub catalog_number: Option<String>,
    pub source_database: Option<String>,
    pub provenance_text: Option<String>,
    pub previous_owners: Option<String>,
    pub auction_history: Option<Value>,
    pub estimate_value: Option<String>,
    pub sale_price: Option<String>,
    pub obverse_image_url: Option<String>,
    pub reverse_image_url: Option<String>,
    pub lot_description_raw: Option<String>,
    #[serde(rename = "lot_description_EN")]
    pub lot_description_en: Option<String>,
    pub source_type: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<MuseumCoin> for CoinResponse {
    fn from(coin: MuseumCoin) -> Self {
        Self {
            coin_id: coin.coin_id,
            mint: coin.mint,
            authority: coin.authority,
            date_range: coin.date_range,
            denomination: coin.denomination,
            metal: coin.metal,
            weight: coin.weight,
            diameter: coin.diameter,
            die_axis: coin.die_axis,
            obverse_description: coin.obverse_description,
            reverse_description: coin.reverse_description,
            obverse_inscription: coin.obverse_inscription,
            reverse_inscription: coin.reverse_inscription,
            monograms: coin.monograms,
            reference_list: coin.reference_list,
            catalog_number: coin.catalog_number,
            source_database: coin.source_database,
            provenance_text: coin.provenance_text,
            previous_owners: coin.previous_owners,
            auction_history: parse_json_field(coin.auction_history),
            estimate_value: coin.estimate_value,
            sale_price: coin.sale_price,
            obverse_image_url: coin.obverse_image_key.map(image_url),
            reverse_image_url: coin.reverse_image_key.map(image_url),
            lot_description_raw: coin.lot_description_raw,
            lot_description_en: coin.lot_description_en,
            source_type: coin.source_type,
            created_at: coin.created_at,
            updated_at: coin.updated_at,
        }
    }
}

/// Parse a stored JSON string; a value that does not parse is passed
/// through as a plain string rather than dropped.
fn parse_json_field(raw: Option<String>) -> Option<Value> {
    raw.map(|s| serde_json::from_str(&s).unwrap_or(Value::String(s)))
}

fn image_url(key: String) -> String {
    format!("/images/{}", key)
}

/// GET /api/museum-coins
pub async fn list_coins(
    State(state): State<AppState>,
    Query(query): Query<CoinListQuery>,
) -> Result<Json<Vec<CoinResponse>>, ApiError> {
    let filter = CoinFilter {
        mint: query.mint,
        authority: query.authority,
        search: query.search,
        limit: query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE),
        offset: query.offset.unwrap_or(0).max(0),
    };

    let mut conn = state.db.acquire().await?;
    let coins = crate::db::coins::list_coins(&mut conn, &filter).await?;
    Ok(Json(coins.into_iter().map(CoinResponse::from).collect()))
}

/// GET /api/museum-coins/:coin_id
pub async fn coin_detail(
    State(state): State<AppState>,
    Path(coin_id): Path<String>,
) -> Result<Json<CoinResponse>, ApiError> {
    let mut conn = state.db.acquire().await?;
    let coin = crate::db::coins::get_coin(&mut conn, &coin_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Museum coin not found: {}", coin_id)))?;
    Ok(Json(coin.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_field() {
        let parsed = parse_json_field(Some(r#"[{"sale":"Triton XX"}]"#.to_string()));
        assert!(parsed.unwrap().is_array());

        let fallback = parse_json_field(Some("not json".to_string()));
        assert_eq!(fallback, Some(Value::String("not json".to_string())));

        assert_eq!(parse_json_field(None), None);
    }
}
