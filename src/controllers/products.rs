use crate::controllers::analytics;
use crate::controllers::pagination::{total_pages, ListQuery};
use crate::errors::ApiError;
use crate::insertables::NewProduct;
use actix_web::{delete, get, post, put, web, HttpResponse};
use admin_dashboard_api::models::Product;
use admin_dashboard_api::schema;
use bigdecimal::{BigDecimal, Zero};
use diesel::{prelude::*, r2d2};
use schema::products::dsl::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;
const DEFAULT_TOP_SELLING_LIMIT: i64 = 5;

#[derive(Deserialize, Validate)]
pub struct ProductForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    pub price: BigDecimal,
    #[validate(range(min = 0))]
    pub stock: i32,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Deserialize)]
struct ThresholdQuery {
    threshold: Option<i32>,
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<i64>,
}

#[derive(Serialize)]
struct ProductPage {
    products: Vec<Product>,
    current_page: i64,
    total_items: i64,
    total_pages: i64,
}

#[derive(Serialize)]
struct ProductStats {
    total_products: i64,
    products_in_stock: i64,
    low_stock_products: i64,
    products_by_category: HashMap<String, i64>,
}

fn reject_negative_price(form: &ProductForm) -> Result<(), ApiError> {
    if form.price < BigDecimal::zero() {
        return Err(ApiError::Validation("price must not be negative".to_string()));
    }
    Ok(())
}

pub fn get_all_products(conn: &mut PgConnection) -> Result<Vec<Product>, ApiError> {
    let all_products = products.select(Product::as_select()).load(conn)?;
    Ok(all_products)
}

pub fn list_products(
    conn: &mut PgConnection,
    query: &ListQuery,
) -> Result<(Vec<Product>, i64), ApiError> {
    let pattern = query.like_pattern();

    let total: i64 = match &pattern {
        Some(p) => products
            .filter(name.ilike(p.clone()).or(category.ilike(p.clone())))
            .count()
            .get_result(conn)?,
        None => products.count().get_result(conn)?,
    };

    let mut stmt = products.select(Product::as_select()).into_boxed();
    if let Some(p) = &pattern {
        stmt = stmt.filter(name.ilike(p.clone()).or(category.ilike(p.clone())));
    }
    stmt = match (query.sort_key("id"), query.descending(false)) {
        ("name", false) => stmt.order(name.asc()),
        ("name", true) => stmt.order(name.desc()),
        ("category", false) => stmt.order(category.asc()),
        ("category", true) => stmt.order(category.desc()),
        ("price", false) => stmt.order(price.asc()),
        ("price", true) => stmt.order(price.desc()),
        ("stock", false) => stmt.order(stock.asc()),
        ("stock", true) => stmt.order(stock.desc()),
        ("sales", false) => stmt.order(sales.asc()),
        ("sales", true) => stmt.order(sales.desc()),
        (_, true) => stmt.order(id.desc()),
        (_, false) => stmt.order(id.asc()),
    };
    let page_rows = stmt.offset(query.offset()).limit(query.limit()).load(conn)?;
    Ok((page_rows, total))
}

pub fn get_product_by_id(conn: &mut PgConnection, product_id: i32) -> Result<Product, ApiError> {
    products
        .filter(id.eq(product_id))
        .select(Product::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("product {} not found", product_id)))
}

pub fn get_products_by_category(
    conn: &mut PgConnection,
    category_name: &str,
) -> Result<Vec<Product>, ApiError> {
    let matching = products
        .filter(category.eq(category_name))
        .select(Product::as_select())
        .load(conn)?;
    Ok(matching)
}

pub fn insert_new_product(
    conn: &mut PgConnection,
    form: &ProductForm,
) -> Result<Product, ApiError> {
    reject_negative_price(form)?;
    let new_product = NewProduct {
        name: form.name.clone(),
        category: form.category.clone(),
        price: form.price.clone(),
        stock: form.stock,
        sales: 0,
        description: form.description.clone(),
        image_url: form.image_url.clone(),
    };
    let product = diesel::insert_into(products)
        .values(&new_product)
        .returning(Product::as_returning())
        .get_result(conn)?;
    Ok(product)
}

pub fn update_product_by_id(
    conn: &mut PgConnection,
    product_id: i32,
    form: &ProductForm,
) -> Result<Product, ApiError> {
    reject_negative_price(form)?;
    get_product_by_id(conn, product_id)?;
    // sales is only ever advanced by order creation
    let updated = diesel::update(products.filter(id.eq(product_id)))
        .set((
            name.eq(form.name.clone()),
            category.eq(form.category.clone()),
            price.eq(form.price.clone()),
            stock.eq(form.stock),
            description.eq(form.description.clone()),
            image_url.eq(form.image_url.clone()),
        ))
        .returning(Product::as_returning())
        .get_result(conn)?;
    Ok(updated)
}

pub fn delete_product_by_id(conn: &mut PgConnection, product_id: i32) -> Result<(), ApiError> {
    let deleted = diesel::delete(products.filter(id.eq(product_id))).execute(conn)?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!(
            "product {} not found",
            product_id
        )));
    }
    Ok(())
}

#[get("/api/products")]
async fn get_products(
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let page_number = query.page.max(0);
    let page_size = query.limit();
    let (rows, total) = web::block(move || {
        let mut conn = pool.get()?;
        list_products(&mut conn, &query)
    })
    .await??;

    Ok(HttpResponse::Ok().json(ProductPage {
        products: rows,
        current_page: page_number,
        total_items: total,
        total_pages: total_pages(total, page_size),
    }))
}

#[get("/api/products/stats")]
async fn get_product_stats(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let all_products = web::block(move || {
        let mut conn = pool.get()?;
        get_all_products(&mut conn)
    })
    .await??;

    Ok(HttpResponse::Ok().json(ProductStats {
        total_products: all_products.len() as i64,
        products_in_stock: analytics::in_stock_count(&all_products),
        low_stock_products: analytics::low_stock(&all_products, DEFAULT_LOW_STOCK_THRESHOLD).len()
            as i64,
        products_by_category: analytics::count_products_by_category(&all_products),
    }))
}

#[get("/api/products/low-stock")]
async fn get_low_stock_products(
    pool: web::Data<DbPool>,
    query: web::Query<ThresholdQuery>,
) -> Result<HttpResponse, ApiError> {
    let threshold = query.threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    let all_products = web::block(move || {
        let mut conn = pool.get()?;
        get_all_products(&mut conn)
    })
    .await??;
    Ok(HttpResponse::Ok().json(analytics::low_stock(&all_products, threshold)))
}

#[get("/api/products/top-selling")]
async fn get_top_selling_products(
    pool: web::Data<DbPool>,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_SELLING_LIMIT);
    let all_products = web::block(move || {
        let mut conn = pool.get()?;
        get_all_products(&mut conn)
    })
    .await??;
    Ok(HttpResponse::Ok().json(analytics::top_selling(&all_products, limit)))
}

#[get("/api/products/category/{category}")]
async fn get_products_for_category(
    pool: web::Data<DbPool>,
    category_name: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let matching = web::block(move || {
        let mut conn = pool.get()?;
        get_products_by_category(&mut conn, &category_name)
    })
    .await??;
    Ok(HttpResponse::Ok().json(matching))
}

#[get("/api/products/{product_id}")]
async fn get_product(
    pool: web::Data<DbPool>,
    product_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let product = web::block(move || {
        let mut conn = pool.get()?;
        get_product_by_id(&mut conn, *product_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(product))
}

#[post("/api/products")]
async fn create_product(
    pool: web::Data<DbPool>,
    form: web::Json<ProductForm>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    form.validate()?;
    let product = web::block(move || {
        let mut conn = pool.get()?;
        insert_new_product(&mut conn, &form)
    })
    .await??;
    tracing::info!(product_id = product.id, "product created");
    Ok(HttpResponse::Created().json(product))
}

#[put("/api/products/{product_id}")]
async fn update_product(
    pool: web::Data<DbPool>,
    product_id: web::Path<i32>,
    form: web::Json<ProductForm>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    form.validate()?;
    let product = web::block(move || {
        let mut conn = pool.get()?;
        update_product_by_id(&mut conn, *product_id, &form)
    })
    .await??;
    Ok(HttpResponse::Ok().json(product))
}

#[delete("/api/products/{product_id}")]
async fn delete_product(
    pool: web::Data<DbPool>,
    product_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let removed_id = *product_id;
    web::block(move || {
        let mut conn = pool.get()?;
        delete_product_by_id(&mut conn, removed_id)
    })
    .await??;
    tracing::info!(product_id = removed_id, "product deleted");
    Ok(HttpResponse::NoContent().finish())
}
