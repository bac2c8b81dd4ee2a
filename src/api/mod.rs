/*
 * REST API module for gas price and swap quote reads
 */

use rocket::figment::Figment;
use rocket::http::{ContentType, Status};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{get, routes, Build, Rocket, State};
use std::sync::Arc;
use tracing::{error, info};
use crate::models::{ErrorResponse, GasPriceResponse, GaugeError, SwapQuoteResponse};
use crate::service::GaugeService;
use crate::utils::{parse_address, parse_amount};

pub struct ApiState {
    pub service: Arc<GaugeService>,
}

type ApiError = Custom<Json<ErrorResponse>>;

fn status_for(err: &GaugeError) -> Status {
    match err {
        GaugeError::InvalidInput(_) => Status::BadRequest,
        GaugeError::PoolNotFound { .. } => Status::NotFound,
        GaugeError::CalculationError(_) => Status::UnprocessableEntity,
        GaugeError::RpcError(_) | GaugeError::ContractError(_) => Status::BadGateway,
        GaugeError::ConfigError(_) | GaugeError::MetricsError(_) => Status::InternalServerError,
    }
}

fn api_error(err: &GaugeError) -> ApiError {
    let status = status_for(err);
    Custom(
        status,
        Json(ErrorResponse {
            status_code: status.code,
            message: err.to_string(),
        }),
    )
}

#[get("/gasPrice")]
pub async fn gas_price(state: &State<ApiState>) -> Json<GasPriceResponse> {
    Json(state.service.get_cached_gas_price().await)
}

#[get("/return/<from_token>/<to_token>/<amount_in>")]
pub async fn swap_return(
    from_token: &str,
    to_token: &str,
    amount_in: &str,
    state: &State<ApiState>,
) -> std::result::Result<Json<SwapQuoteResponse>, ApiError> {
    let parsed = parse_address(from_token).and_then(|from| {
        let to = parse_address(to_token)?;
        let amount = parse_amount(amount_in)?;
        Ok((from, to, amount))
    });

    let (from, to, amount) = parsed.map_err(|e| {
        state.service.record_rejected_quote();
        api_error(&e)
    })?;

    let quote = state
        .service
        .get_swap_quote(from, to, &amount)
        .await
        .map_err(|e| {
            match &e {
                GaugeError::PoolNotFound { .. } => info!("{e}"),
                _ => error!("Error computing swap quote: {e}"),
            }
            api_error(&e)
        })?;

    Ok(Json(quote))
}

#[get("/metrics")]
pub async fn prometheus_metrics(state: &State<ApiState>) -> std::result::Result<(ContentType, String), ApiError> {
    state
        .service
        .render_metrics()
        .await
        .map(|body| (ContentType::Plain, body))
        .map_err(|e| api_error(&e))
}

#[get("/health")]
pub async fn health_check() -> &'static str {
    "OK"
}

#[must_use]
pub fn create_rocket(figment: Figment, state: ApiState) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(state)
        .mount("/", routes![gas_price, swap_return, prometheus_metrics, health_check])
}
