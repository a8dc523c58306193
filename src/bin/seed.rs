use admin_dashboard_api::establish_connection;
use admin_dashboard_api::models::{OrderStatus, Role, UserStatus};
use admin_dashboard_api::schema::{orders, products, sales_data, users};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use diesel::insert_into;
use diesel::prelude::*;
use serde::Deserialize;
use std::fs;

#[derive(Deserialize)]
struct SeedUser {
    name: String,
    email: String,
    password: String,
    role: Role,
    status: UserStatus,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
struct UserRow {
    name: String,
    email: String,
    password: String,
    role: Role,
    status: UserStatus,
}

#[derive(Deserialize, Insertable)]
#[diesel(table_name = products)]
struct SeedProduct {
    name: String,
    category: String,
    price: BigDecimal,
    stock: i32,
    sales: i32,
    description: Option<String>,
    image_url: Option<String>,
}

#[derive(Deserialize, Insertable)]
#[diesel(table_name = orders)]
struct SeedOrder {
    order_code: String,
    customer: String,
    total: BigDecimal,
    status: OrderStatus,
    order_date: NaiveDateTime,
}

#[derive(Deserialize, Insertable)]
#[diesel(table_name = sales_data)]
struct SeedSalesData {
    period: String,
    sales: BigDecimal,
    sale_date: NaiveDate,
    category: Option<String>,
}

fn hash_password(raw: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .expect("password hashing failed")
        .to_string()
}

fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    let connection = &mut establish_connection();

    let existing_users: i64 = users::table
        .count()
        .get_result(connection)
        .expect("failed to count users");
    if existing_users == 0 {
        let seed_users: Vec<SeedUser> =
            serde_json::from_str(&fs::read_to_string("src/bin/users.json")?)
                .expect("invalid users.json");
        let rows: Vec<UserRow> = seed_users
            .into_iter()
            .map(|u| UserRow {
                name: u.name,
                email: u.email,
                password: hash_password(&u.password),
                role: u.role,
                status: u.status,
            })
            .collect();
        insert_into(users::table)
            .values(&rows)
            .execute(connection)
            .expect("failed to seed users");
        println!("seeded users (admin login: admin@example.com / admin123)");
    }

    let existing_products: i64 = products::table
        .count()
        .get_result(connection)
        .expect("failed to count products");
    if existing_products == 0 {
        let rows: Vec<SeedProduct> =
            serde_json::from_str(&fs::read_to_string("src/bin/products.json")?)
                .expect("invalid products.json");
        insert_into(products::table)
            .values(&rows)
            .execute(connection)
            .expect("failed to seed products");
        println!("seeded products");
    }

    let existing_orders: i64 = orders::table
        .count()
        .get_result(connection)
        .expect("failed to count orders");
    if existing_orders == 0 {
        let rows: Vec<SeedOrder> =
            serde_json::from_str(&fs::read_to_string("src/bin/orders.json")?)
                .expect("invalid orders.json");
        insert_into(orders::table)
            .values(&rows)
            .execute(connection)
            .expect("failed to seed orders");
        println!("seeded orders");
    }

    let existing_sales: i64 = sales_data::table
        .count()
        .get_result(connection)
        .expect("failed to count sales data");
    if existing_sales == 0 {
        let rows: Vec<SeedSalesData> =
            serde_json::from_str(&fs::read_to_string("src/bin/sales_data.json")?)
                .expect("invalid sales_data.json");
        insert_into(sales_data::table)
            .values(&rows)
            .execute(connection)
            .expect("failed to seed sales data");
        println!("seeded sales data");
    }

    Ok(())
}
