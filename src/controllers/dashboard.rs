use crate::controllers::analytics;
use crate::errors::ApiError;
use actix_web::{get, web, HttpResponse};
use admin_dashboard_api::models::{Order, OrderStatus, Product, Role, SalesData, User};
use admin_dashboard_api::schema::{orders, products, sales_data, users};
use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};
use diesel::{prelude::*, r2d2};
use serde::Serialize;
use std::collections::HashMap;

type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

#[derive(Serialize)]
struct DashboardOverview {
    total_users: i64,
    active_users: i64,
    total_products: i64,
    products_in_stock: i64,
    total_orders: i64,
    pending_orders: i64,
    total_revenue: BigDecimal,
    recent_orders: i64,
    recent_revenue: BigDecimal,
}

#[derive(Serialize)]
struct DashboardAnalytics {
    sales_data: Vec<SalesData>,
    sales_by_category: HashMap<String, BigDecimal>,
    order_status_distribution: HashMap<OrderStatus, i64>,
    top_selling_products: Vec<Product>,
    low_stock_products: Vec<Product>,
    products_by_category: HashMap<String, i64>,
    user_role_distribution: HashMap<Role, i64>,
}

fn load_users(conn: &mut PgConnection) -> Result<Vec<User>, ApiError> {
    Ok(users::table.select(User::as_select()).load(conn)?)
}

fn load_products(conn: &mut PgConnection) -> Result<Vec<Product>, ApiError> {
    Ok(products::table.select(Product::as_select()).load(conn)?)
}

fn load_orders(conn: &mut PgConnection) -> Result<Vec<Order>, ApiError> {
    Ok(orders::table.select(Order::as_select()).load(conn)?)
}

fn load_sales(conn: &mut PgConnection) -> Result<Vec<SalesData>, ApiError> {
    Ok(sales_data::table
        .order(sales_data::sale_date.desc())
        .select(SalesData::as_select())
        .load(conn)?)
}

#[get("/api/dashboard/overview")]
async fn get_overview(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let overview = web::block(move || {
        let mut conn = pool.get()?;
        let all_users = load_users(&mut conn)?;
        let all_products = load_products(&mut conn)?;
        let all_orders = load_orders(&mut conn)?;

        let now = Utc::now().naive_utc();
        let thirty_days_ago = now - Duration::days(30);
        let status_counts = analytics::count_orders_by_status(&all_orders);

        Ok::<_, ApiError>(DashboardOverview {
            total_users: all_users.len() as i64,
            active_users: analytics::active_user_count(&all_users),
            total_products: all_products.len() as i64,
            products_in_stock: analytics::in_stock_count(&all_products),
            total_orders: all_orders.len() as i64,
            pending_orders: status_counts
                .get(&OrderStatus::Pending)
                .copied()
                .unwrap_or(0),
            total_revenue: analytics::total_revenue(&all_orders),
            recent_orders: analytics::orders_in_range(&all_orders, thirty_days_ago, now).len()
                as i64,
            recent_revenue: analytics::revenue_in_range(&all_orders, thirty_days_ago, now),
        })
    })
    .await??;

    Ok(HttpResponse::Ok().json(overview))
}

#[get("/api/dashboard/analytics")]
async fn get_analytics(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let report = web::block(move || {
        let mut conn = pool.get()?;
        let all_users = load_users(&mut conn)?;
        let all_products = load_products(&mut conn)?;
        let all_orders = load_orders(&mut conn)?;
        let all_sales = load_sales(&mut conn)?;

        Ok::<_, ApiError>(DashboardAnalytics {
            sales_by_category: analytics::sales_by_category(&all_sales),
            sales_data: all_sales,
            order_status_distribution: analytics::count_orders_by_status(&all_orders),
            top_selling_products: analytics::top_selling(&all_products, 5),
            low_stock_products: analytics::low_stock(&all_products, 10),
            products_by_category: analytics::count_products_by_category(&all_products),
            user_role_distribution: analytics::count_users_by_role(&all_users),
        })
    })
    .await??;

    Ok(HttpResponse::Ok().json(report))
}
