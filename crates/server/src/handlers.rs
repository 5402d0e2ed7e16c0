use actix_web::{get, post, web, HttpResponse, Responder};
use log::{info, warn};

use crate::controller::{detail, listing, lock};
use crate::error::Result;
use crate::types::{AppState, CoinQuery, ErrorBody, ListingQuery, Timeframe};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(get_coins)
        .service(refresh_coins)
        .service(load_more_coins)
        .service(get_coin)
        .service(refresh_coin)
        .service(toggle_description)
        .service(select_coin)
        .service(back_to_listing);
}

fn parse_timeframe(raw: Option<&str>) -> Result<Option<Timeframe>> {
    match raw {
        Some(days) => Ok(Some(days.parse::<Timeframe>()?)),
        None => Ok(None),
    }
}

#[get("/health")]
pub async fn health_check() -> impl Responder {
    web::Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[get("/api/coins")]
pub async fn get_coins(query: web::Query<ListingQuery>, data: web::Data<AppState>) -> impl Responder {
    // No search parameter means the unfiltered list
    lock(&data.listing).set_search(query.search.as_deref().unwrap_or(""));
    let view = listing::activate(&data.listing, &*data.source).await;
    HttpResponse::Ok().json(view)
}

#[post("/api/coins/refresh")]
pub async fn refresh_coins(data: web::Data<AppState>) -> impl Responder {
    info!("Listing refresh requested");
    let view = listing::refresh(&data.listing, &*data.source).await;
    HttpResponse::Ok().json(view)
}

#[post("/api/coins/more")]
pub async fn load_more_coins(data: web::Data<AppState>) -> impl Responder {
    let view = listing::load_more(&data.listing, &*data.source).await;
    HttpResponse::Ok().json(view)
}

#[get("/api/coins/{id}")]
pub async fn get_coin(
    path: web::Path<String>,
    query: web::Query<CoinQuery>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let id = path.into_inner();
    let timeframe = match parse_timeframe(query.timeframe.as_deref()) {
        Ok(timeframe) => timeframe,
        Err(e) => {
            warn!("Rejected detail request for {}: {}", id, e);
            return HttpResponse::BadRequest().json(ErrorBody { error: e.to_string() });
        }
    };

    let view = detail::show(&data.detail, &*data.source, &id, timeframe).await;
    HttpResponse::Ok().json(view)
}

#[post("/api/coins/{id}/refresh")]
pub async fn refresh_coin(path: web::Path<String>, data: web::Data<AppState>) -> impl Responder {
    let id = path.into_inner();
    info!("Detail refresh requested for {}", id);
    let view = detail::refresh(&data.detail, &*data.source, &id).await;
    HttpResponse::Ok().json(view)
}

#[post("/api/coins/{id}/description/toggle")]
pub async fn toggle_description(path: web::Path<String>, data: web::Data<AppState>) -> impl Responder {
    let view = detail::toggle_description(&data.detail, &path.into_inner());
    HttpResponse::Ok().json(view)
}

#[post("/api/coins/{id}/select")]
pub async fn select_coin(path: web::Path<String>, data: web::Data<AppState>) -> HttpResponse {
    let id = path.into_inner();
    match lock(&data.listing).select(&id) {
        Some(navigation) => HttpResponse::Ok().json(navigation),
        None => HttpResponse::NotFound().json(ErrorBody {
            error: format!("Coin '{}' is not in the listing", id),
        }),
    }
}

#[post("/api/detail/back")]
pub async fn back_to_listing(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(lock(&data.detail).back())
}
