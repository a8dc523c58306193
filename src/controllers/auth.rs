use crate::controllers::users::{self, UserForm};
use crate::errors::ApiError;
use actix_web::{post, web, HttpResponse};
use admin_dashboard_api::models::{Role, User, UserStatus};
use admin_dashboard_api::schema;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use diesel::{prelude::*, r2d2};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::env;
use validator::Validate;

type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

pub fn hash_password(raw: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))
}

pub fn verify_password(raw: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .and_then(|parsed| Argon2::default().verify_password(raw.as_bytes(), &parsed))
        .is_ok()
}

/// Signed token keyed by the user's email, valid for 24 hours.
pub fn issue_token(user_email: &str) -> Result<String, ApiError> {
    let secret =
        env::var("JWT_SECRET").map_err(|_| ApiError::Internal("JWT_SECRET must be set".into()))?;
    let claims = Claims {
        sub: user_email.to_string(),
        exp: (Utc::now() + Duration::hours(24)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token encoding failed: {}", e)))
}

pub fn authenticate(conn: &mut PgConnection, request: &LoginRequest) -> Result<User, ApiError> {
    use schema::users::dsl::*;

    let user = users
        .filter(email.eq(&request.email))
        .select(User::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".to_string()))?;

    if !verify_password(&request.password, &user.password) {
        return Err(ApiError::Unauthorized("invalid credentials".to_string()));
    }
    if user.status != UserStatus::Active {
        return Err(ApiError::Unauthorized("account is inactive".to_string()));
    }
    Ok(user)
}

#[post("/api/auth/login")]
async fn login(
    pool: web::Data<DbPool>,
    form: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    form.validate()?;
    let user = web::block(move || {
        let mut conn = pool.get()?;
        authenticate(&mut conn, &form)
    })
    .await??;

    let token = issue_token(&user.email)?;
    tracing::info!(user_id = user.id, "user logged in");
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    }))
}

#[post("/api/auth/register")]
async fn register(
    pool: web::Data<DbPool>,
    form: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    form.validate()?;
    let user = web::block(move || {
        let mut conn = pool.get()?;
        users::insert_new_user(
            &mut conn,
            &UserForm {
                name: form.name.clone(),
                email: form.email.clone(),
                password: Some(form.password.clone()),
                role: form.role,
                status: None,
            },
        )
    })
    .await??;

    let token = issue_token(&user.email)?;
    tracing::info!(user_id = user.id, "user registered");
    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    }))
}
