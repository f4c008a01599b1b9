//! REST API for the card collection
//!
//! Every response uses the `{ success, data?, error? }` envelope. Store
//! calls are synchronous and run under the connection mutex; the guard is
//! never held across an `.await`.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_http::cors::CorsLayer;

use collection_common::{
    available_teams, best_value_by_label, best_value_for_players, cheapest_buy_option_total,
    collection_stats, filter_players, parse_choice, stats_by_tag, BuyOption, BuyOptionUpdate, Card,
    CardStatus, CardUpdate, CollectionStats, Money, NewBuyOption, NewCard, NewPlayer, NewSeller,
    Player, PlayerFilter, PlayerUpdate, PlayerWithCards, Seller, SellerUpdate, Sport, Tag,
    TagStats,
};

use crate::database::{self, get_card};
use crate::error::{Result, TrackerError};
use crate::image_store::{content_type_for, image_key, CardSide, ImageStore};
use crate::marketplace::{Listing, MarketplaceClient, SearchRequest, SearchResult};
use crate::team_logo::{resolve_team_logo, LogoLookup, LogoResolver};

/// Upload limit for card photos
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    images: Arc<ImageStore>,
    marketplace: Arc<MarketplaceClient>,
    logos: Arc<LogoResolver>,
    owner: Arc<str>,
}

impl AppState {
    pub fn new(
        db: Arc<Mutex<Connection>>,
        images: ImageStore,
        marketplace: MarketplaceClient,
        logos: LogoResolver,
        owner: &str,
    ) -> Self {
        Self {
            db,
            images: Arc::new(images),
            marketplace: Arc::new(marketplace),
            logos: Arc::new(logos),
            owner: Arc::from(owner),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// API response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, TrackerError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse {
        success: true,
        data: Some(data),
        error: None,
    }))
}

impl TrackerError {
    fn status_code(&self) -> StatusCode {
        match self {
            TrackerError::Validation(_) => StatusCode::BAD_REQUEST,
            TrackerError::NotFound { .. } => StatusCode::NOT_FOUND,
            e if e.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::warn!("Request rejected: {}", self);
        }

        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

// ── Players ────────────────────────────────────────────────────────────────

/// Player list query; `""` and `"all"` leave a criterion unset
#[derive(Debug, Default, Deserialize)]
struct PlayerQuery {
    #[serde(default)]
    search: String,
    #[serde(default)]
    sport: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    team: Option<String>,
}

impl PlayerQuery {
    fn to_filter(&self) -> Result<PlayerFilter> {
        let choice = |value: &Option<String>| value.as_deref().and_then(parse_choice);

        let sport = choice(&self.sport)
            .map(|s| Sport::from_str(&s))
            .transpose()?;
        let status = choice(&self.status)
            .map(|s| CardStatus::from_str(&s))
            .transpose()?;

        Ok(PlayerFilter {
            search: self.search.clone(),
            sport,
            status,
            tag_id: choice(&self.tag),
            team: choice(&self.team),
        })
    }
}

/// A card as sent to clients
///
/// `serial` is the printed numbering ("12/99"), or null unless the card is
/// numbered and both halves are known.
#[derive(Serialize)]
struct CardView {
    #[serde(flatten)]
    card: Card,
    serial: Option<String>,
}

impl From<Card> for CardView {
    fn from(card: Card) -> Self {
        Self {
            serial: card.serial().map(|s| s.to_string()),
            card,
        }
    }
}

/// A player as listed, with its best-value cards marked
#[derive(Serialize)]
struct PlayerView {
    #[serde(flatten)]
    player: Player,
    cards: Vec<CardView>,
    tags: Vec<Tag>,
    best_value_card_ids: Vec<String>,
}

impl PlayerView {
    fn new(player: PlayerWithCards, best: Option<&HashSet<String>>) -> Self {
        let mut best_value_card_ids: Vec<String> =
            best.map(|ids| ids.iter().cloned().collect()).unwrap_or_default();
        best_value_card_ids.sort();
        Self {
            player: player.player,
            cards: player.cards.into_iter().map(CardView::from).collect(),
            tags: player.tags,
            best_value_card_ids,
        }
    }
}

impl From<PlayerWithCards> for PlayerView {
    fn from(player: PlayerWithCards) -> Self {
        let best = best_value_by_label(&player.cards);
        Self::new(player, Some(&best))
    }
}

/// GET /api/players?search=&sport=&status=&tag=&team=
async fn list_players_handler(
    State(state): State<AppState>,
    Query(query): Query<PlayerQuery>,
) -> ApiResult<Vec<PlayerView>> {
    let filter = query.to_filter()?;
    let players = database::list_players_with_cards(&state.conn(), &state.owner)?;

    let best = best_value_for_players(&players);
    let views = filter_players(&players, &filter)
        .into_iter()
        .map(|p| PlayerView::new(p.clone(), best.get(&p.player.id)))
        .collect();
    ok(views)
}

/// POST /api/players
async fn create_player_handler(
    State(state): State<AppState>,
    Json(new): Json<NewPlayer>,
) -> ApiResult<PlayerView> {
    ok(database::create_player(&state.conn(), &state.owner, &new)?.into())
}

/// POST /api/players/bulk with a JSON array of players
///
/// All rows are created or none are.
async fn create_players_handler(
    State(state): State<AppState>,
    Json(new): Json<Vec<NewPlayer>>,
) -> ApiResult<Vec<PlayerView>> {
    let players = database::create_players(&mut state.conn(), &state.owner, &new)?;
    ok(players.into_iter().map(PlayerView::from).collect())
}

/// GET /api/players/{id}
async fn get_player_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PlayerView> {
    let player = database::get_player(&state.conn(), &state.owner, &id)?
        .ok_or_else(|| TrackerError::not_found("player", &id))?;
    ok(player.into())
}

/// PUT /api/players/{id}
async fn update_player_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<PlayerUpdate>,
) -> ApiResult<PlayerView> {
    ok(database::update_player(&state.conn(), &state.owner, &id, &update)?.into())
}

/// DELETE /api/players/{id}
///
/// Uploaded photos of the player's cards are removed as well.
async fn delete_player_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let conn = state.conn();
    let player = database::get_player(&conn, &state.owner, &id)?
        .ok_or_else(|| TrackerError::not_found("player", &id))?;
    database::delete_player(&conn, &state.owner, &id)?;
    drop(conn);

    for card in &player.cards {
        remove_card_images(&state, card);
    }
    ok(())
}

// ── Cards ──────────────────────────────────────────────────────────────────

/// POST /api/players/{id}/cards
async fn create_card_handler(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    Json(new): Json<NewCard>,
) -> ApiResult<CardView> {
    let card = database::create_card(&mut state.conn(), &state.owner, &player_id, &new)?;
    ok(card.into())
}

/// PUT /api/cards/{id}
async fn update_card_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<CardUpdate>,
) -> ApiResult<CardView> {
    let card = database::update_card(&mut state.conn(), &state.owner, &id, &update)?;
    ok(card.into())
}

/// POST /api/cards/{id}/apply-listing with a listing from a marketplace search
///
/// Copies the listing's price and link onto the card. An unparseable price
/// leaves the card's price untouched.
async fn apply_listing_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(listing): Json<Listing>,
) -> ApiResult<CardView> {
    log::info!("Applying listing {} to card {}", listing.item_id, id);
    let card = database::update_card(&mut state.conn(), &state.owner, &id, &listing.card_update())?;
    ok(card.into())
}

/// DELETE /api/cards/{id}
async fn delete_card_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let card = {
        let conn = state.conn();
        let card = get_card(&conn, &state.owner, &id)?
            .ok_or_else(|| TrackerError::not_found("card", &id))?;
        database::delete_card(&conn, &state.owner, &id)?;
        card
    };
    remove_card_images(&state, &card);
    ok(())
}

fn remove_card_images(state: &AppState, card: &Card) {
    for url in [&card.image_front, &card.image_back].into_iter().flatten() {
        if let Err(e) = state.images.delete_image(url) {
            log::warn!("Failed to delete image {} of card {}: {}", url, card.id, e);
        }
    }
}

fn parse_side(side: &str) -> Result<CardSide> {
    CardSide::parse(side)
        .ok_or_else(|| TrackerError::validation(format!("unknown card side: {}", side)))
}

fn image_update(side: CardSide, url: Option<String>) -> CardUpdate {
    match side {
        CardSide::Front => CardUpdate {
            image_front: Some(url),
            ..Default::default()
        },
        CardSide::Back => CardUpdate {
            image_back: Some(url),
            ..Default::default()
        },
    }
}

fn current_image(card: &Card, side: CardSide) -> Option<&str> {
    match side {
        CardSide::Front => card.image_front.as_deref(),
        CardSide::Back => card.image_back.as_deref(),
    }
}

/// PUT /api/cards/{id}/images/{side} with the raw image as body
async fn upload_card_image_handler(
    State(state): State<AppState>,
    Path((id, side)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<CardView> {
    let side = parse_side(&side)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| TrackerError::validation("missing Content-Type header"))?;

    let mut conn = state.conn();
    let card = get_card(&conn, &state.owner, &id)?
        .ok_or_else(|| TrackerError::not_found("card", &id))?;

    let key = image_key(&card.id, side, content_type)?;
    let url = state.images.upload_image(&state.owner, &key, &body)?;

    if let Some(old) = current_image(&card, side).filter(|old| *old != url) {
        if let Err(e) = state.images.delete_image(old) {
            log::warn!("Failed to delete replaced image {}: {}", old, e);
        }
    }

    let card = database::update_card(&mut conn, &state.owner, &id, &image_update(side, Some(url)))?;
    ok(card.into())
}

/// DELETE /api/cards/{id}/images/{side}
async fn delete_card_image_handler(
    State(state): State<AppState>,
    Path((id, side)): Path<(String, String)>,
) -> ApiResult<CardView> {
    let side = parse_side(&side)?;

    let mut conn = state.conn();
    let card = get_card(&conn, &state.owner, &id)?
        .ok_or_else(|| TrackerError::not_found("card", &id))?;
    if let Some(url) = current_image(&card, side) {
        state.images.delete_image(url)?;
    }

    let card = database::update_card(&mut conn, &state.owner, &id, &image_update(side, None))?;
    ok(card.into())
}

/// GET /images/{owner}/{key}
async fn image_handler(
    State(state): State<AppState>,
    Path((owner, key)): Path<(String, String)>,
) -> Result<Response> {
    let bytes = state
        .images
        .read_image(&owner, &key)?
        .ok_or_else(|| TrackerError::not_found("image", &key))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&key)),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        bytes,
    )
        .into_response())
}

// ── Tags ───────────────────────────────────────────────────────────────────

/// Body of tag create and rename requests
#[derive(Debug, Deserialize)]
struct TagName {
    name: String,
}

/// GET /api/tags
async fn list_tags_handler(State(state): State<AppState>) -> ApiResult<Vec<Tag>> {
    ok(database::list_tags(&state.conn(), &state.owner)?)
}

/// POST /api/tags
async fn create_tag_handler(
    State(state): State<AppState>,
    Json(new): Json<TagName>,
) -> ApiResult<Tag> {
    ok(database::create_tag(&state.conn(), &state.owner, &new.name)?)
}

/// PUT /api/tags/{id}
async fn update_tag_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<TagName>,
) -> ApiResult<Tag> {
    ok(database::update_tag(&state.conn(), &state.owner, &id, &body.name)?)
}

/// DELETE /api/tags/{id}
async fn delete_tag_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    ok(database::delete_tag(&state.conn(), &state.owner, &id)?)
}

/// PUT /api/players/{id}/tags/{tag_id}
async fn assign_tag_handler(
    State(state): State<AppState>,
    Path((player_id, tag_id)): Path<(String, String)>,
) -> ApiResult<()> {
    ok(database::assign_tag(
        &state.conn(),
        &state.owner,
        &player_id,
        &tag_id,
    )?)
}

/// DELETE /api/players/{id}/tags/{tag_id}
async fn unassign_tag_handler(
    State(state): State<AppState>,
    Path((player_id, tag_id)): Path<(String, String)>,
) -> ApiResult<()> {
    ok(database::unassign_tag(
        &state.conn(),
        &state.owner,
        &player_id,
        &tag_id,
    )?)
}

// ── Sellers and buy options ────────────────────────────────────────────────

/// GET /api/sellers
async fn list_sellers_handler(State(state): State<AppState>) -> ApiResult<Vec<Seller>> {
    ok(database::list_sellers(&state.conn(), &state.owner)?)
}

/// POST /api/sellers
async fn create_seller_handler(
    State(state): State<AppState>,
    Json(new): Json<NewSeller>,
) -> ApiResult<Seller> {
    ok(database::create_seller(&state.conn(), &state.owner, &new)?)
}

/// PUT /api/sellers/{id}
async fn update_seller_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<SellerUpdate>,
) -> ApiResult<Seller> {
    ok(database::update_seller(&state.conn(), &state.owner, &id, &update)?)
}

/// DELETE /api/sellers/{id}
async fn delete_seller_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    ok(database::delete_seller(&state.conn(), &state.owner, &id)?)
}

#[derive(Serialize)]
struct BuyOptionRow {
    #[serde(flatten)]
    option: BuyOption,
    total: Option<Money>,
    is_cheapest: bool,
}

#[derive(Serialize)]
struct BuyOptionList {
    options: Vec<BuyOptionRow>,
    lowest_total: Option<Money>,
}

/// GET /api/cards/{id}/buy-options
async fn list_buy_options_handler(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> ApiResult<BuyOptionList> {
    let options = database::list_buy_options(&state.conn(), &state.owner, &card_id)?;
    let lowest_total = cheapest_buy_option_total(&options);

    let options = options
        .into_iter()
        .map(|option| BuyOptionRow {
            total: option.total(),
            is_cheapest: option.is_cheapest(lowest_total),
            option,
        })
        .collect();
    ok(BuyOptionList {
        options,
        lowest_total,
    })
}

/// POST /api/cards/{id}/buy-options
async fn create_buy_option_handler(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
    Json(new): Json<NewBuyOption>,
) -> ApiResult<BuyOption> {
    ok(database::create_buy_option(
        &state.conn(),
        &state.owner,
        &card_id,
        &new,
    )?)
}

/// PUT /api/buy-options/{id}
async fn update_buy_option_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<BuyOptionUpdate>,
) -> ApiResult<BuyOption> {
    ok(database::update_buy_option(&state.conn(), &state.owner, &id, &update)?)
}

/// DELETE /api/buy-options/{id}
async fn delete_buy_option_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    ok(database::delete_buy_option(&state.conn(), &state.owner, &id)?)
}

// ── Dashboard ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StatsView {
    #[serde(flatten)]
    stats: CollectionStats,
    owned_percent: f64,
}

impl From<CollectionStats> for StatsView {
    fn from(stats: CollectionStats) -> Self {
        Self {
            owned_percent: stats.owned_percent(),
            stats,
        }
    }
}

/// GET /api/stats
async fn stats_handler(State(state): State<AppState>) -> ApiResult<StatsView> {
    let players = database::list_players_with_cards(&state.conn(), &state.owner)?;
    ok(collection_stats(&players).into())
}

/// GET /api/stats/tags
async fn tag_stats_handler(State(state): State<AppState>) -> ApiResult<Vec<TagStats>> {
    let players = database::list_players_with_cards(&state.conn(), &state.owner)?;
    ok(stats_by_tag(&players))
}

/// GET /api/teams
async fn teams_handler(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let players = database::list_players_with_cards(&state.conn(), &state.owner)?;
    ok(available_teams(&players))
}

// ── External lookups ───────────────────────────────────────────────────────

/// POST /api/marketplace/search
async fn marketplace_search_handler(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<SearchResult> {
    ok(state.marketplace.search_listings(&request).await?)
}

#[derive(Debug, Deserialize)]
struct TeamLogoQuery {
    team: String,
    #[serde(default)]
    sport: Option<String>,
}

/// GET /api/team-logo?team=&sport=
async fn team_logo_handler(
    State(state): State<AppState>,
    Query(query): Query<TeamLogoQuery>,
) -> ApiResult<LogoLookup> {
    let sport = match query.sport.as_deref().and_then(parse_choice) {
        Some(s) => Sport::from_str(&s)?,
        None => Sport::Other,
    };
    ok(resolve_team_logo(&state.db, &state.logos, &query.team, sport).await?)
}

/// Build the web server router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/players",
            get(list_players_handler).post(create_player_handler),
        )
        .route("/api/players/bulk", post(create_players_handler))
        .route(
            "/api/players/{id}",
            get(get_player_handler)
                .put(update_player_handler)
                .delete(delete_player_handler),
        )
        .route("/api/players/{id}/cards", post(create_card_handler))
        .route(
            "/api/players/{id}/tags/{tag_id}",
            put(assign_tag_handler).delete(unassign_tag_handler),
        )
        .route(
            "/api/cards/{id}",
            put(update_card_handler).delete(delete_card_handler),
        )
        .route("/api/cards/{id}/apply-listing", post(apply_listing_handler))
        .route(
            "/api/cards/{id}/images/{side}",
            put(upload_card_image_handler)
                .delete(delete_card_image_handler)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .route(
            "/api/cards/{id}/buy-options",
            get(list_buy_options_handler).post(create_buy_option_handler),
        )
        .route(
            "/api/buy-options/{id}",
            put(update_buy_option_handler).delete(delete_buy_option_handler),
        )
        .route("/api/tags", get(list_tags_handler).post(create_tag_handler))
        .route(
            "/api/tags/{id}",
            put(update_tag_handler).delete(delete_tag_handler),
        )
        .route(
            "/api/sellers",
            get(list_sellers_handler).post(create_seller_handler),
        )
        .route(
            "/api/sellers/{id}",
            put(update_seller_handler).delete(delete_seller_handler),
        )
        .route("/api/stats", get(stats_handler))
        .route("/api/stats/tags", get(tag_stats_handler))
        .route("/api/teams", get(teams_handler))
        .route("/api/marketplace/search", post(marketplace_search_handler))
        .route("/api/team-logo", get(team_logo_handler))
        .route("/images/{owner}/{key}", get(image_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
    log::info!("Shutting down web server");
}

/// Start the web server (async)
///
/// Binds to 0.0.0.0 (all interfaces) to work with Docker port mapping.
pub async fn serve(state: AppState, port: u16) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let addr = format!("0.0.0.0:{}", port);

    log::info!("API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(test)]
#[path = "web_tests.rs"]
mod tests;
