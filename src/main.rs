mod controllers {
    pub mod analytics;
    pub mod auth;
    pub mod dashboard;
    pub mod orders;
    pub mod pagination;
    pub mod products;
    pub mod sales;
    pub mod users;
}
mod errors;
mod insertables;

use actix_web::{web, App, HttpServer};
use controllers::auth;
use controllers::dashboard;
use controllers::orders;
use controllers::products;
use controllers::sales;
use controllers::users;
use diesel::{r2d2, PgConnection};
use dotenvy::dotenv;
use std::env;
use tracing_subscriber::EnvFilter;

type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let db_pool = initialize_db_pool();
    let port = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .expect("PORT must be a number");
    tracing::info!(port, "starting admin dashboard api");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .service(auth::login)
            .service(auth::register)
            // fixed paths are registered ahead of their `{id}` siblings
            .service(users::get_user_stats)
            .service(users::get_users)
            .service(users::get_user)
            .service(users::create_user)
            .service(users::update_user)
            .service(users::delete_user)
            .service(products::get_product_stats)
            .service(products::get_low_stock_products)
            .service(products::get_top_selling_products)
            .service(products::get_products_for_category)
            .service(products::get_products)
            .service(products::get_product)
            .service(products::create_product)
            .service(products::update_product)
            .service(products::delete_product)
            .service(orders::get_order_stats)
            .service(orders::get_revenue_stats)
            .service(orders::get_orders_by_date_range)
            .service(orders::get_orders_with_status)
            .service(orders::get_order_with_code)
            .service(orders::get_orders)
            .service(orders::get_order)
            .service(orders::create_order)
            .service(orders::update_order)
            .service(orders::update_order_status)
            .service(orders::delete_order)
            .service(sales::get_sales_overview)
            .service(sales::get_sales_by_category)
            .service(sales::get_sales_by_date_range)
            .service(sales::get_sales_for_category)
            .service(sales::get_sales)
            .service(sales::get_sales_record)
            .service(sales::create_sales_record)
            .service(sales::update_sales_record)
            .service(sales::delete_sales_record)
            .service(dashboard::get_overview)
            .service(dashboard::get_analytics)
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await
}

fn initialize_db_pool() -> DbPool {
    let conn_spec = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let manager = r2d2::ConnectionManager::<PgConnection>::new(conn_spec);
    r2d2::Pool::builder()
        .build(manager)
        .expect("failed to create database pool")
}
