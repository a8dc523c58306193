use crate::controllers::analytics;
use crate::controllers::auth;
use crate::controllers::pagination::{total_pages, ListQuery};
use crate::errors::ApiError;
use crate::insertables::NewUser;
use actix_web::{delete, get, post, put, web, HttpResponse};
use admin_dashboard_api::models::{Role, User, UserStatus};
use admin_dashboard_api::schema;
use diesel::{prelude::*, r2d2};
use serde::{Deserialize, Serialize};
use validator::Validate;

type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

#[derive(Deserialize, Validate)]
pub struct UserForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

#[derive(Serialize)]
struct UserPage {
    users: Vec<User>,
    current_page: i64,
    total_items: i64,
    total_pages: i64,
}

#[derive(Serialize)]
struct UserStats {
    active_users: i64,
    admin_users: i64,
    customer_users: i64,
    moderator_users: i64,
}

pub fn get_all_users(conn: &mut PgConnection) -> Result<Vec<User>, ApiError> {
    use schema::users::dsl::*;
    let all_users = users.select(User::as_select()).load(conn)?;
    Ok(all_users)
}

pub fn list_users(
    conn: &mut PgConnection,
    query: &ListQuery,
) -> Result<(Vec<User>, i64), ApiError> {
    use schema::users::dsl::*;
    let pattern = query.like_pattern();

    let total: i64 = match &pattern {
        Some(p) => users
            .filter(name.ilike(p.clone()).or(email.ilike(p.clone())))
            .count()
            .get_result(conn)?,
        None => users.count().get_result(conn)?,
    };

    let mut stmt = users.select(User::as_select()).into_boxed();
    if let Some(p) = &pattern {
        stmt = stmt.filter(name.ilike(p.clone()).or(email.ilike(p.clone())));
    }
    stmt = match (query.sort_key("id"), query.descending(false)) {
        ("name", false) => stmt.order(name.asc()),
        ("name", true) => stmt.order(name.desc()),
        ("email", false) => stmt.order(email.asc()),
        ("email", true) => stmt.order(email.desc()),
        (_, true) => stmt.order(id.desc()),
        (_, false) => stmt.order(id.asc()),
    };
    let page_rows = stmt.offset(query.offset()).limit(query.limit()).load(conn)?;
    Ok((page_rows, total))
}

pub fn get_user_by_id(conn: &mut PgConnection, user_id: i32) -> Result<User, ApiError> {
    use schema::users::dsl::*;
    users
        .filter(id.eq(user_id))
        .select(User::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("user {} not found", user_id)))
}

pub fn insert_new_user(conn: &mut PgConnection, form: &UserForm) -> Result<User, ApiError> {
    use schema::users::dsl::*;
    let raw_password = form
        .password
        .as_deref()
        .ok_or_else(|| ApiError::Validation("password is required".to_string()))?;

    let existing: i64 = users
        .filter(email.eq(&form.email))
        .count()
        .get_result(conn)?;
    if existing > 0 {
        return Err(ApiError::Conflict(format!(
            "email {} is already registered",
            form.email
        )));
    }

    let new_user = NewUser {
        name: form.name.clone(),
        email: form.email.clone(),
        password: auth::hash_password(raw_password)?,
        role: form.role.unwrap_or(Role::Customer),
        status: form.status.unwrap_or(UserStatus::Active),
    };
    let user = diesel::insert_into(users)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(conn)?;
    Ok(user)
}

pub fn update_user_by_id(
    conn: &mut PgConnection,
    user_id: i32,
    form: &UserForm,
) -> Result<User, ApiError> {
    use schema::users::dsl::*;
    let current = get_user_by_id(conn, user_id)?;

    let taken: i64 = users
        .filter(email.eq(&form.email).and(id.ne(user_id)))
        .count()
        .get_result(conn)?;
    if taken > 0 {
        return Err(ApiError::Conflict(format!(
            "email {} is already registered",
            form.email
        )));
    }

    let new_role = form.role.unwrap_or(current.role);
    let new_status = form.status.unwrap_or(current.status);
    let updated = match form.password.as_deref().filter(|p| !p.is_empty()) {
        Some(raw) => diesel::update(users.filter(id.eq(user_id)))
            .set((
                name.eq(form.name.clone()),
                email.eq(form.email.clone()),
                password.eq(auth::hash_password(raw)?),
                role.eq(new_role),
                status.eq(new_status),
            ))
            .returning(User::as_returning())
            .get_result(conn)?,
        None => diesel::update(users.filter(id.eq(user_id)))
            .set((
                name.eq(form.name.clone()),
                email.eq(form.email.clone()),
                role.eq(new_role),
                status.eq(new_status),
            ))
            .returning(User::as_returning())
            .get_result(conn)?,
    };
    Ok(updated)
}

pub fn delete_user_by_id(conn: &mut PgConnection, user_id: i32) -> Result<(), ApiError> {
    use schema::users::dsl::*;
    let deleted = diesel::delete(users.filter(id.eq(user_id))).execute(conn)?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("user {} not found", user_id)));
    }
    Ok(())
}

#[get("/api/users")]
async fn get_users(
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let page_number = query.page.max(0);
    let page_size = query.limit();
    let (rows, total) = web::block(move || {
        let mut conn = pool.get()?;
        list_users(&mut conn, &query)
    })
    .await??;

    Ok(HttpResponse::Ok().json(UserPage {
        users: rows,
        current_page: page_number,
        total_items: total,
        total_pages: total_pages(total, page_size),
    }))
}

#[get("/api/users/stats")]
async fn get_user_stats(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let all_users = web::block(move || {
        let mut conn = pool.get()?;
        get_all_users(&mut conn)
    })
    .await??;

    let by_role = analytics::count_users_by_role(&all_users);
    Ok(HttpResponse::Ok().json(UserStats {
        active_users: analytics::active_user_count(&all_users),
        admin_users: by_role.get(&Role::Admin).copied().unwrap_or(0),
        customer_users: by_role.get(&Role::Customer).copied().unwrap_or(0),
        moderator_users: by_role.get(&Role::Moderator).copied().unwrap_or(0),
    }))
}

#[get("/api/users/{user_id}")]
async fn get_user(pool: web::Data<DbPool>, user_id: web::Path<i32>) -> Result<HttpResponse, ApiError> {
    let user = web::block(move || {
        let mut conn = pool.get()?;
        get_user_by_id(&mut conn, *user_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(user))
}

#[post("/api/users")]
async fn create_user(
    pool: web::Data<DbPool>,
    form: web::Json<UserForm>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    form.validate()?;
    let user = web::block(move || {
        let mut conn = pool.get()?;
        insert_new_user(&mut conn, &form)
    })
    .await??;
    tracing::info!(user_id = user.id, "user created");
    Ok(HttpResponse::Created().json(user))
}

#[put("/api/users/{user_id}")]
async fn update_user(
    pool: web::Data<DbPool>,
    user_id: web::Path<i32>,
    form: web::Json<UserForm>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    form.validate()?;
    let user = web::block(move || {
        let mut conn = pool.get()?;
        update_user_by_id(&mut conn, *user_id, &form)
    })
    .await??;
    Ok(HttpResponse::Ok().json(user))
}

#[delete("/api/users/{user_id}")]
async fn delete_user(
    pool: web::Data<DbPool>,
    user_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let removed_id = *user_id;
    web::block(move || {
        let mut conn = pool.get()?;
        delete_user_by_id(&mut conn, removed_id)
    })
    .await??;
    tracing::info!(user_id = removed_id, "user deleted");
    Ok(HttpResponse::NoContent().finish())
}
