//! HTTP binding for the bet service

use crate::bet::service::BetService;
use crate::error::ApiError;
use crate::models::{
    CancelEventResponse, CreateEventRequest, CreateEventResponse, EventDetailsResponse,
    EventListResponse, FinalizeRequest, FinalizeResponse, HealthResponse, PlaceBetRequest,
    PlaceBetResponse, UserBetsResponse,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};

pub fn router(bets: BetService) -> Router {
    Router::new()
        .route("/bet/event", post(create_event))
        .route("/bet/events", get(get_active_events))
        .route("/bet/events/finished", get(get_finished_events))
        .route("/bet/place", post(place_bet))
        .route("/bet/finalize", post(finalize_event))
        .route(
            "/bet/event/:event_id",
            get(get_event_details).delete(cancel_event),
        )
        .route("/bet/user/:user_id", get(get_user_bets))
        .route("/health", get(health))
        .with_state(bets)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "bet-api",
    })
}

async fn create_event(
    State(bets): State<BetService>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<CreateEventResponse>, ApiError> {
    let event = bets
        .create_event(&req.title, &req.description, &req.option1, &req.option2)
        .await?;
    Ok(Json(CreateEventResponse {
        message: "Bet event created successfully".to_string(),
        event_id: event.id,
    }))
}

async fn get_active_events(
    State(bets): State<BetService>,
) -> Result<Json<EventListResponse>, ApiError> {
    let events = bets.active_events().await?;
    Ok(Json(EventListResponse { events }))
}

async fn get_finished_events(
    State(bets): State<BetService>,
) -> Result<Json<EventListResponse>, ApiError> {
    let events = bets.finished_events().await?;
    Ok(Json(EventListResponse { events }))
}

async fn place_bet(
    State(bets): State<BetService>,
    Json(req): Json<PlaceBetRequest>,
) -> Result<Json<PlaceBetResponse>, ApiError> {
    let bet = bets
        .place_bet(&req.user_id, req.bet_event_id, req.chosen_option, req.amount)
        .await?;
    Ok(Json(PlaceBetResponse {
        message: "Bet placed successfully".to_string(),
        bet_id: bet.id,
    }))
}

async fn finalize_event(
    State(bets): State<BetService>,
    Json(req): Json<FinalizeRequest>,
) -> Result<Json<FinalizeResponse>, ApiError> {
    let summary = bets.finalize(req.bet_event_id, req.winning_option).await?;
    let message = if summary.distributions.is_empty() {
        "Event finished with no winners".to_string()
    } else {
        "Event finalized successfully".to_string()
    };
    Ok(Json(FinalizeResponse {
        message,
        winning_option: summary.winning_option,
        total_pool: summary.total_pool,
        winners_count: summary.distributions.len(),
        distributions: summary.distributions,
    }))
}

async fn cancel_event(
    State(bets): State<BetService>,
    Path(event_id): Path<i64>,
) -> Result<Json<CancelEventResponse>, ApiError> {
    let summary = bets.cancel(event_id).await?;
    Ok(Json(CancelEventResponse {
        message: "Event cancelled successfully".to_string(),
        refunded_bets: summary.refunded_bets,
        total_refunded: summary.total_refunded,
    }))
}

async fn get_event_details(
    State(bets): State<BetService>,
    Path(event_id): Path<i64>,
) -> Result<Json<EventDetailsResponse>, ApiError> {
    let (event, wagers) = bets.event_details(event_id).await?;
    let option1_bets = wagers.iter().filter(|w| w.chosen_option == 1).count();
    let option2_bets = wagers.iter().filter(|w| w.chosen_option == 2).count();
    Ok(Json(EventDetailsResponse {
        event,
        total_bets: wagers.len(),
        option1_bets,
        option2_bets,
    }))
}

async fn get_user_bets(
    State(bets): State<BetService>,
    Path(user_id): Path<String>,
) -> Result<Json<UserBetsResponse>, ApiError> {
    let bets = bets.user_bets(&user_id).await?;
    Ok(Json(UserBetsResponse { bets }))
}
