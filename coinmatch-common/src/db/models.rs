//! Record models for the CoinMatch schema
//!
//! Coin upserts go through the explicit merge functions here: the new
//! record is `patch value, else existing value, else default`, computed
//! in one place so the field-by-field logic is testable in isolation.

use serde::{Deserialize, Serialize};

/// Curator decision state for a match record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "Pending",
            MatchStatus::Accepted => "Accepted",
            MatchStatus::Rejected => "Rejected",
        }
    }

    /// Normalize a free-text curator decision into a status.
    ///
    /// Returns `None` for unrecognized input; the caller decides whether
    /// to fall back to Pending or reject (strict mode).
    pub fn normalize_decision(decision: &str) -> Option<MatchStatus> {
        match decision.trim().to_lowercase().as_str() {
            "accept" | "accepted" | "approve" => Some(MatchStatus::Accepted),
            "reject" | "rejected" => Some(MatchStatus::Rejected),
            "pending" | "save" | "save for later" | "hold" => Some(MatchStatus::Pending),
            _ => None,
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalogued museum-held coin. Mutable (updated on re-ingest), never deleted.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MuseumCoin {
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
    pub auction_history: Option<String>,
    pub estimate_value: Option<String>,
    pub sale_price: Option<String>,
    pub obverse_image_key: Option<String>,
    pub reverse_image_key: Option<String>,
    pub lot_description_raw: Option<String>,
    pub lot_description_en: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub source_type: String,
}

impl MuseumCoin {
    /// Empty record for a coin id, used as the merge base on first insert
    pub fn new(coin_id: &str, now: &str) -> Self {
        Self {
            coin_id: coin_id.to_string(),
            mint: String::new(),
            authority: String::new(),
            date_range: String::new(),
            denomination: String::new(),
            metal: String::new(),
            weight: None,
            diameter: None,
            die_axis: None,
            obverse_description: String::new(),
            reverse_description: String::new(),
            obverse_inscription: None,
            reverse_inscription: None,
            monograms: None,
            reference_list: None,
            catalog_number: None,
            source_database: None,
            provenance_text: None,
            previous_owners: None,
            auction_history: None,
            estimate_value: None,
            sale_price: None,
            obverse_image_key: None,
            reverse_image_key: None,
            lot_description_raw: None,
            lot_description_en: None,
            created_at: now.to_string(),
            updated_at: now.to_string(),
            source_type: "museum".to_string(),
        }
    }
}

/// Partial museum-coin update, as deserialized from an ingestion payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MuseumCoinPatch {
    pub mint: Option<String>,
    pub authority: Option<String>,
    pub date_range: Option<String>,
    pub denomination: Option<String>,
    pub metal: Option<String>,
    pub weight: Option<f64>,
    pub diameter: Option<f64>,
    pub die_axis: Option<String>,
    pub obverse_description: Option<String>,
    pub reverse_description: Option<String>,
    pub obverse_inscription: Option<String>,
    pub reverse_inscription: Option<String>,
    pub monograms: Option<String>,
    pub reference_list: Option<String>,
    pub catalog_number: Option<String>,
    pub source_database: Option<String>,
    pub provenance_text: Option<String>,
    pub previous_owners: Option<String>,
    pub auction_history: Option<String>,
    pub estimate_value: Option<String>,
    pub sale_price: Option<String>,
    pub obverse_image_key: Option<String>,
    pub reverse_image_key: Option<String>,
    pub lot_description_raw: Option<String>,
    #[serde(alias = "lot_description_EN")]
    pub lot_description_en: Option<String>,
    pub source_type: Option<String>,
}

/// Merge a partial update onto an existing record (or an empty base when
/// the coin is new). Patch wins, existing value is kept otherwise, and
/// `updated_at` is always refreshed.
pub fn merge_museum_coin(
    existing: Option<MuseumCoin>,
    coin_id: &str,
    patch: MuseumCoinPatch,
    now: &str,
) -> MuseumCoin {
    let base = existing.unwrap_or_else(|| MuseumCoin::new(coin_id, now));
    MuseumCoin {
        coin_id: coin_id.to_string(),
        mint: patch.mint.unwrap_or(base.mint),
        authority: patch.authority.unwrap_or(base.authority),
        date_range: patch.date_range.unwrap_or(base.date_range),
        denomination: patch.denomination.unwrap_or(base.denomination),
        metal: patch.metal.unwrap_or(base.metal),
        weight: patch.weight.or(base.weight),
        diameter: patch.diameter.or(base.diameter),
        die_axis: patch.die_axis.or(base.die_axis),
        obverse_description: patch.obverse_description.unwrap_or(base.obverse_description),
        reverse_description: patch.reverse_description.unwrap_or(base.reverse_description),
        obverse_inscription: patch.obverse_inscription.or(base.obverse_inscription),
        reverse_inscription: patch.reverse_inscription.or(base.reverse_inscription),
        monograms: patch.monograms.or(base.monograms),
        reference_list: patch.reference_list.or(base.reference_list),
        catalog_number: patch.catalog_number.or(base.catalog_number),
        source_database: patch.source_database.or(base.source_database),
        provenance_text: patch.provenance_text.or(base.provenance_text),
        previous_owners: patch.previous_owners.or(base.previous_owners),
        auction_history: patch.auction_history.or(base.auction_history),
        estimate_value: patch.estimate_value.or(base.estimate_value),
        sale_price: patch.sale_price.or(base.sale_price),
        obverse_image_key: patch.obverse_image_key.or(base.obverse_image_key),
        reverse_image_key: patch.reverse_image_key.or(base.reverse_image_key),
        lot_description_raw: patch.lot_description_raw.or(base.lot_description_raw),
        lot_description_en: patch.lot_description_en.or(base.lot_description_en),
        created_at: base.created_at,
        updated_at: now.to_string(),
        source_type: patch.source_type.unwrap_or(base.source_type),
    }
}

/// Marketplace listing that may match a museum coin.
///
/// `museum_coin_id` is a weak link set by the search linker, not an
/// ownership relation. `similarity_score` is rewritten by the generator.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OnlineCoin {
    pub id: String,
    pub museum_coin_id: Option<String>,
    pub similarity_score: f64,
    pub listing_reference: String,
    pub sale_date: Option<String>,
    pub estimate_value: Option<String>,
    pub sale_price: Option<String>,
    pub listing_url: Option<String>,
    pub metadata_json: Option<String>,
    pub mint: Option<String>,
    pub authority: Option<String>,
    pub date_range: Option<String>,
    pub denomination: Option<String>,
    pub metal: Option<String>,
    pub weight: Option<f64>,
    pub diameter: Option<f64>,
    pub die_axis: Option<String>,
    pub obverse_description: Option<String>,
    pub reverse_description: Option<String>,
    pub obverse_inscription: Option<String>,
    pub reverse_inscription: Option<String>,
    pub monograms: Option<String>,
    pub reference_list: Option<String>,
    pub catalog_number: Option<String>,
    pub source_database: Option<String>,
    pub provenance_text: Option<String>,
    pub previous_owners: Option<String>,
    pub auction_history: Option<String>,
    pub obverse_image_key: Option<String>,
    pub reverse_image_key: Option<String>,
    pub lot_description_raw: Option<String>,
    pub lot_description_en: Option<String>,
    pub fetched_at: String,
    pub source_name: Option<String>,
}

impl OnlineCoin {
    /// Empty listing for an id, used as the merge base on first insert
    pub fn new(id: &str, now: &str) -> Self {
        Self {
            id: id.to_string(),
            museum_coin_id: None,
            similarity_score: 0.0,
            listing_reference: String::new(),
            sale_date: None,
            estimate_value: None,
            sale_price: None,
            listing_url: None,
            metadata_json: None,
            mint: None,
            authority: None,
            date_range: None,
            denomination: None,
            metal: None,
            weight: None,
            diameter: None,
            die_axis: None,
            obverse_description: None,
            reverse_description: None,
            obverse_inscription: None,
            reverse_inscription: None,
            monograms: None,
            reference_list: None,
            catalog_number: None,
            source_database: None,
            provenance_text: None,
            previous_owners: None,
            auction_history: None,
            obverse_image_key: None,
            reverse_image_key: None,
            lot_description_raw: None,
            lot_description_en: None,
            fetched_at: now.to_string(),
            source_name: None,
        }
    }
}

/// Partial listing update, as deserialized from an ingestion payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OnlineCoinPatch {
    pub museum_coin_id: Option<String>,
    pub similarity_score: Option<f64>,
    pub listing_reference: Option<String>,
    pub sale_date: Option<String>,
    pub estimate_value: Option<String>,
    pub sale_price: Option<String>,
    pub listing_url: Option<String>,
    pub metadata_json: Option<String>,
    pub mint: Option<String>,
    pub authority: Option<String>,
    pub date_range: Option<String>,
    pub denomination: Option<String>,
    pub metal: Option<String>,
    pub weight: Option<f64>,
    pub diameter: Option<f64>,
    pub die_axis: Option<String>,
    pub obverse_description: Option<String>,
    pub reverse_description: Option<String>,
    pub obverse_inscription: Option<String>,
    pub reverse_inscription: Option<String>,
    pub monograms: Option<String>,
    pub reference_list: Option<String>,
    pub catalog_number: Option<String>,
    pub source_database: Option<String>,
    pub provenance_text: Option<String>,
    pub previous_owners: Option<String>,
    pub auction_history: Option<String>,
    pub obverse_image_key: Option<String>,
    pub reverse_image_key: Option<String>,
    pub lot_description_raw: Option<String>,
    #[serde(alias = "lot_description_EN")]
    pub lot_description_en: Option<String>,
    pub source_name: Option<String>,
}

/// Merge a partial update onto an existing listing (or an empty base).
///
/// `fetched_at` is always refreshed so re-ingested listings sort first
/// in the prefilter's most-recently-fetched ordering.
pub fn merge_online_coin(
    existing: Option<OnlineCoin>,
    id: &str,
    patch: OnlineCoinPatch,
    now: &str,
) -> OnlineCoin {
    let base = existing.unwrap_or_else(|| OnlineCoin::new(id, now));
    OnlineCoin {
        id: id.to_string(),
        museum_coin_id: patch.museum_coin_id.or(base.museum_coin_id),
        similarity_score: patch.similarity_score.unwrap_or(base.similarity_score),
        listing_reference: patch.listing_reference.unwrap_or(base.listing_reference),
        sale_date: patch.sale_date.or(base.sale_date),
        estimate_value: patch.estimate_value.or(base.estimate_value),
        sale_price: patch.sale_price.or(base.sale_price),
        listing_url: patch.listing_url.or(base.listing_url),
        metadata_json: patch.metadata_json.or(base.metadata_json),
        mint: patch.mint.or(base.mint),
        authority: patch.authority.or(base.authority),
        date_range: patch.date_range.or(base.date_range),
        denomination: patch.denomination.or(base.denomination),
        metal: patch.metal.or(base.metal),
        weight: patch.weight.or(base.weight),
        diameter: patch.diameter.or(base.diameter),
        die_axis: patch.die_axis.or(base.die_axis),
        obverse_description: patch.obverse_description.or(base.obverse_description),
        reverse_description: patch.reverse_description.or(base.reverse_description),
        obverse_inscription: patch.obverse_inscription.or(base.obverse_inscription),
        reverse_inscription: patch.reverse_inscription.or(base.reverse_inscription),
        monograms: patch.monograms.or(base.monograms),
        reference_list: patch.reference_list.or(base.reference_list),
        catalog_number: patch.catalog_number.or(base.catalog_number),
        source_database: patch.source_database.or(base.source_database),
        provenance_text: patch.provenance_text.or(base.provenance_text),
        previous_owners: patch.previous_owners.or(base.previous_owners),
        auction_history: patch.auction_history.or(base.auction_history),
        obverse_image_key: patch.obverse_image_key.or(base.obverse_image_key),
        reverse_image_key: patch.reverse_image_key.or(base.reverse_image_key),
        lot_description_raw: patch.lot_description_raw.or(base.lot_description_raw),
        lot_description_en: patch.lot_description_en.or(base.lot_description_en),
        fetched_at: now.to_string(),
        source_name: patch.source_name.or(base.source_name),
    }
}

/// Curator-facing decision artifact for a (museum coin, candidate) pair
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MatchRecord {
    pub id: i64,
    pub museum_coin_id: String,
    pub candidate_id: Option<String>,
    pub similarity_score: f64,
    pub status: MatchStatus,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub saved_at: String,
    pub decided_by: Option<i64>,
}

/// Curator account
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_salt: String,
    pub created_at: String,
}

/// Opaque session token issued at login
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionToken {
    pub id: String,
    pub user_id: i64,
    pub created_at: String,
    pub expires_at: String,
}

/// Ephemeral record of a search invocation (side-effect log only)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SearchJob {
    pub id: String,
    pub job_type: String,
    pub museum_coin_id: Option<String>,
    pub query_text: Option<String>,
    pub obverse_key: Option<String>,
    pub reverse_key: Option<String>,
    pub status: String,
    pub created_by: Option<i64>,
    pub created_at: String,
    pub completed_at: Option<String>,
    pub result_summary: Option<String>,
}
