use admin_dashboard_api::models::{OrderStatus, Role, UserStatus};
use admin_dashboard_api::schema::{order_items, orders, products, sales_data, users};
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use diesel::Insertable;
use serde::{Deserialize, Serialize};

#[derive(Insertable, Serialize, Deserialize, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub status: UserStatus,
}

#[derive(Insertable, Serialize, Deserialize, Clone)]
#[diesel(table_name = products)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: BigDecimal,
    pub stock: i32,
    #[serde(default)]
    pub sales: i32,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Insertable, Clone)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub order_code: String,
    pub customer: String,
    pub total: BigDecimal,
    pub status: OrderStatus,
    pub order_date: NaiveDateTime,
}

#[derive(Insertable, Clone)]
#[diesel(table_name = order_items)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub subtotal: BigDecimal,
}

#[derive(Insertable, Serialize, Deserialize, Clone)]
#[diesel(table_name = sales_data)]
pub struct NewSalesData {
    pub period: String,
    pub sales: BigDecimal,
    pub sale_date: NaiveDate,
    pub category: Option<String>,
}
