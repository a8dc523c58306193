use crate::controllers::analytics;
use crate::errors::ApiError;
use crate::insertables::NewSalesData;
use actix_web::{delete, get, post, put, web, HttpResponse};
use admin_dashboard_api::models::SalesData;
use admin_dashboard_api::schema;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use diesel::{prelude::*, r2d2};
use schema::sales_data::dsl::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

#[derive(Deserialize, Validate)]
pub struct SalesDataForm {
    #[validate(length(min = 1, max = 20))]
    pub period: String,
    pub sales: BigDecimal,
    pub sale_date: NaiveDate,
    pub category: Option<String>,
}

#[derive(Deserialize)]
struct DateRangeQuery {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[derive(Serialize)]
struct SalesByCategory {
    sales_by_category: HashMap<String, BigDecimal>,
}

pub fn get_all_sales_data(conn: &mut PgConnection) -> Result<Vec<SalesData>, ApiError> {
    // newest first, matching the dashboard's sales overview
    let records = sales_data
        .order(sale_date.desc())
        .select(SalesData::as_select())
        .load(conn)?;
    Ok(records)
}

pub fn get_sales_data_by_id(conn: &mut PgConnection, record_id: i32) -> Result<SalesData, ApiError> {
    sales_data
        .filter(id.eq(record_id))
        .select(SalesData::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("sales record {} not found", record_id)))
}

pub fn get_sales_data_by_category(
    conn: &mut PgConnection,
    category_name: &str,
) -> Result<Vec<SalesData>, ApiError> {
    let records = sales_data
        .filter(category.eq(category_name))
        .select(SalesData::as_select())
        .load(conn)?;
    Ok(records)
}

pub fn insert_new_sales_data(
    conn: &mut PgConnection,
    form: &SalesDataForm,
) -> Result<SalesData, ApiError> {
    let new_record = NewSalesData {
        period: form.period.clone(),
        sales: form.sales.clone(),
        sale_date: form.sale_date,
        category: form.category.clone(),
    };
    let record = diesel::insert_into(sales_data)
        .values(&new_record)
        .returning(SalesData::as_returning())
        .get_result(conn)?;
    Ok(record)
}

pub fn update_sales_data_by_id(
    conn: &mut PgConnection,
    record_id: i32,
    form: &SalesDataForm,
) -> Result<SalesData, ApiError> {
    let updated = diesel::update(sales_data.filter(id.eq(record_id)))
        .set((
            period.eq(form.period.clone()),
            sales.eq(form.sales.clone()),
            sale_date.eq(form.sale_date),
            category.eq(form.category.clone()),
        ))
        .returning(SalesData::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("sales record {} not found", record_id)))?;
    Ok(updated)
}

pub fn delete_sales_data_by_id(conn: &mut PgConnection, record_id: i32) -> Result<(), ApiError> {
    let deleted = diesel::delete(sales_data.filter(id.eq(record_id))).execute(conn)?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!(
            "sales record {} not found",
            record_id
        )));
    }
    Ok(())
}

#[get("/api/sales")]
async fn get_sales(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let records = web::block(move || {
        let mut conn = pool.get()?;
        get_all_sales_data(&mut conn)
    })
    .await??;
    Ok(HttpResponse::Ok().json(records))
}

#[get("/api/sales/overview")]
async fn get_sales_overview(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let records = web::block(move || {
        let mut conn = pool.get()?;
        get_all_sales_data(&mut conn)
    })
    .await??;
    Ok(HttpResponse::Ok().json(records))
}

#[get("/api/sales/by-category")]
async fn get_sales_by_category(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let records = web::block(move || {
        let mut conn = pool.get()?;
        get_all_sales_data(&mut conn)
    })
    .await??;
    Ok(HttpResponse::Ok().json(SalesByCategory {
        sales_by_category: analytics::sales_by_category(&records),
    }))
}

#[get("/api/sales/date-range")]
async fn get_sales_by_date_range(
    pool: web::Data<DbPool>,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, ApiError> {
    let records = web::block(move || {
        let mut conn = pool.get()?;
        get_all_sales_data(&mut conn)
    })
    .await??;
    Ok(HttpResponse::Ok().json(analytics::sales_in_range(
        &records,
        query.start_date,
        query.end_date,
    )))
}

#[get("/api/sales/category/{category}")]
async fn get_sales_for_category(
    pool: web::Data<DbPool>,
    category_name: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let records = web::block(move || {
        let mut conn = pool.get()?;
        get_sales_data_by_category(&mut conn, &category_name)
    })
    .await??;
    Ok(HttpResponse::Ok().json(records))
}

#[get("/api/sales/{record_id}")]
async fn get_sales_record(
    pool: web::Data<DbPool>,
    record_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let record = web::block(move || {
        let mut conn = pool.get()?;
        get_sales_data_by_id(&mut conn, *record_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(record))
}

#[post("/api/sales")]
async fn create_sales_record(
    pool: web::Data<DbPool>,
    form: web::Json<SalesDataForm>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    form.validate()?;
    let record = web::block(move || {
        let mut conn = pool.get()?;
        insert_new_sales_data(&mut conn, &form)
    })
    .await??;
    Ok(HttpResponse::Created().json(record))
}

#[put("/api/sales/{record_id}")]
async fn update_sales_record(
    pool: web::Data<DbPool>,
    record_id: web::Path<i32>,
    form: web::Json<SalesDataForm>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    form.validate()?;
    let record = web::block(move || {
        let mut conn = pool.get()?;
        update_sales_data_by_id(&mut conn, *record_id, &form)
    })
    .await??;
    Ok(HttpResponse::Ok().json(record))
}

#[delete("/api/sales/{record_id}")]
async fn delete_sales_record(
    pool: web::Data<DbPool>,
    record_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let removed_id = *record_id;
    web::block(move || {
        let mut conn = pool.get()?;
        delete_sales_data_by_id(&mut conn, removed_id)
    })
    .await??;
    Ok(HttpResponse::NoContent().finish())
}
