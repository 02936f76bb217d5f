// src/handlers.rs
use crate::{AppState, errors::BrandforgeError, models::*};
use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use chrono::Utc;
use futures_util::TryStreamExt;
use log::warn;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub session_id: Option<Uuid>,
    #[serde(flatten)]
    pub brief: BrandBrief,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteQuery {
    pub session_id: Uuid,
}

pub async fn generate_logos(
    body: web::Json<GenerateRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let GenerateRequest { session_id, brief } = body.into_inner();

    if brief.brand_name.trim().is_empty() {
        return Err(
            BrandforgeError::Validation("brand_name must not be empty".to_string()).into(),
        );
    }
    if brief.industry.trim().is_empty() {
        return Err(BrandforgeError::Validation("industry must not be empty".to_string()).into());
    }

    let session_id = session_id.unwrap_or_else(Uuid::new_v4);

    let batch = data.generator.generate_batch(&brief).await?;
    let images: Vec<String> = batch.images.iter().map(|img| img.to_data_uri()).collect();

    let item = HistoryItem {
        id: Uuid::new_v4(),
        session_id,
        brief,
        images: images.clone(),
        created_at: Utc::now(),
    };

    // History is best-effort; a storage hiccup must not lose the images.
    if let Err(e) = data.history.store_item(&item).await {
        warn!("failed to store history item {}: {}", item.id, e);
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": item.id,
        "session_id": session_id,
        "images": images,
        "failed_attempts": batch.failures.len()
    })))
}

pub async fn upload_reference(
    mut payload: Multipart,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    while let Some(mut field) = payload.try_next().await? {
        let mut image_data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            image_data.extend_from_slice(&chunk);
        }

        if image_data.is_empty() {
            continue;
        }

        let encoded = data.image_processor.prepare_reference(&image_data)?;

        return Ok(HttpResponse::Ok().json(serde_json::json!({
            "reference_image": encoded
        })));
    }

    Err(BrandforgeError::Validation("no image file in upload".to_string()).into())
}

/// Closed style set with its art direction, for populating the form.
pub async fn get_styles() -> HttpResponse {
    let styles: Vec<serde_json::Value> = LogoStyle::ALL
        .iter()
        .map(|style| {
            serde_json::json!({
                "name": style.name(),
                "directive": crate::services::prompt::style_directive(style)
            })
        })
        .collect();

    HttpResponse::Ok().json(serde_json::json!({ "styles": styles }))
}

pub async fn get_history(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session_id = path.into_inner();
    let items = data.history.list_session(&session_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "session_id": session_id,
        "count": items.len(),
        "items": items
    })))
}

pub async fn toggle_favorite(
    path: web::Path<Uuid>,
    query: web::Query<FavoriteQuery>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let item_id = path.into_inner();
    let favorite = data
        .history
        .toggle_favorite(&query.session_id, &item_id)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": item_id,
        "favorite": favorite
    })))
}

pub async fn get_favorites(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session_id = path.into_inner();
    let items = data.history.list_favorites(&session_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "session_id": session_id,
        "count": items.len(),
        "items": items
    })))
}
