//! User profile and delivery address handlers

use axum::Json;
use axum::extract::{Extension, Path, State};
use serde::Deserialize;
use serde_json::{Value, json};

use shared::models::{AddressDto, DeliveryAddress};
use shared::util::{new_id, now_millis};
use shared::{ApiResponse, AppError, AppResult, ErrorCode};

use crate::auth::CurrentUser;
use crate::db::{addresses, users};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

/// Address payload as the frontend sends it (`street_address` + optional
/// `apartment_number` are combined into the stored address line).
#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub street_address: String,
    pub apartment_number: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: Option<String>,
    #[serde(rename = "phoneNumber")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressRequest {
    fn full_address(&self) -> String {
        match &self.apartment_number {
            Some(apartment) if !apartment.is_empty() => {
                format!("{}, {}", self.street_address, apartment)
            }
            _ => self.street_address.clone(),
        }
    }
}

/// PUT /api/v1/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let user = users::update_profile(
        &state.pool,
        &current.id,
        req.first_name.as_deref(),
        req.last_name.as_deref(),
        req.phone_number.as_deref(),
    )
    .await?;

    Ok(Json(ApiResponse::ok_with_message(
        "Profile updated successfully",
        json!({
            "id": user.id,
            "firstName": user.first_name,
            "lastName": user.last_name,
            "email": user.email,
            "phoneNumber": user.phone_number,
        }),
    )))
}

/// POST /api/v1/users/addresses
pub async fn create_address(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<AddressRequest>,
) -> AppResult<Json<ApiResponse<AddressDto>>> {
    if req.street_address.trim().is_empty() || req.city.trim().is_empty() {
        return Err(AppError::validation("street_address and city are required"));
    }

    let address = DeliveryAddress {
        id: new_id(),
        user_id: current.id.clone(),
        address: req.full_address(),
        city: req.city,
        state: req.state,
        postal_code: req.zip_code,
        phone_number: req.phone_number,
        is_primary: req.is_default,
        created_at: now_millis(),
    };
    addresses::create(&state.pool, &address).await?;

    Ok(Json(ApiResponse::ok_with_message(
        "Address created successfully",
        address.into(),
    )))
}

/// PUT /api/v1/users/addresses/{id}
pub async fn update_address(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<AddressRequest>,
) -> AppResult<Json<ApiResponse<AddressDto>>> {
    let existing = addresses::find_for_user(&state.pool, &id, &current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AddressNotFound))?;

    let address = DeliveryAddress {
        id: existing.id,
        user_id: current.id.clone(),
        address: req.full_address(),
        city: req.city,
        state: req.state,
        postal_code: req.zip_code,
        phone_number: req.phone_number,
        is_primary: req.is_default,
        created_at: existing.created_at,
    };
    addresses::update(&state.pool, &address).await?;

    Ok(Json(ApiResponse::ok_with_message(
        "Address updated successfully",
        address.into(),
    )))
}
