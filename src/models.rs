use crate::schema::{order_items, orders, products, sales_data, users};
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// User role. Stored as uppercase text in the `role` column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Customer,
    Moderator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Customer => "CUSTOMER",
            Role::Moderator => "MODERATOR",
        }
    }
}

impl ToSql<Text, Pg> for Role {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for Role {
    fn from_sql(value: PgValue<'_>) -> deserialize::Result<Self> {
        match value.as_bytes() {
            b"ADMIN" => Ok(Role::Admin),
            b"CUSTOMER" => Ok(Role::Customer),
            b"MODERATOR" => Ok(Role::Moderator),
            other => Err(format!("unrecognized role: {}", String::from_utf8_lossy(other)).into()),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "ACTIVE",
            UserStatus::Inactive => "INACTIVE",
        }
    }
}

impl ToSql<Text, Pg> for UserStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for UserStatus {
    fn from_sql(value: PgValue<'_>) -> deserialize::Result<Self> {
        match value.as_bytes() {
            b"ACTIVE" => Ok(UserStatus::Active),
            b"INACTIVE" => Ok(UserStatus::Inactive),
            other => {
                Err(format!("unrecognized status: {}", String::from_utf8_lossy(other)).into())
            }
        }
    }
}

/// Order status. Any status may follow any other; there is no transition
/// graph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
        }
    }
}

impl ToSql<Text, Pg> for OrderStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for OrderStatus {
    fn from_sql(value: PgValue<'_>) -> deserialize::Result<Self> {
        match value.as_bytes() {
            b"PENDING" => Ok(OrderStatus::Pending),
            b"PROCESSING" => Ok(OrderStatus::Processing),
            b"SHIPPED" => Ok(OrderStatus::Shipped),
            b"DELIVERED" => Ok(OrderStatus::Delivered),
            other => {
                Err(format!("unrecognized order status: {}", String::from_utf8_lossy(other)).into())
            }
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, PartialEq, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    // never leaves the server
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub status: UserStatus,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, PartialEq, Clone)]
#[diesel(table_name = products)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub sales: i32,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, PartialEq, Clone)]
#[diesel(table_name = orders)]
pub struct Order {
    pub id: i32,
    pub order_code: String,
    pub customer: String,
    pub total: BigDecimal,
    pub status: OrderStatus,
    pub order_date: NaiveDateTime,
}

#[derive(
    Queryable, Selectable, Identifiable, Associations, Serialize, Debug, PartialEq, Clone,
)]
#[diesel(belongs_to(Order))]
#[diesel(belongs_to(Product))]
#[diesel(table_name = order_items)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub subtotal: BigDecimal,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, PartialEq, Clone)]
#[diesel(table_name = sales_data)]
pub struct SalesData {
    pub id: i32,
    pub period: String,
    pub sales: BigDecimal,
    pub sale_date: NaiveDate,
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_discriminants_serialize_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            "\"PROCESSING\""
        );
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"DELIVERED\"").unwrap(),
            OrderStatus::Delivered
        );
        assert_eq!(
            serde_json::from_str::<UserStatus>("\"INACTIVE\"").unwrap(),
            UserStatus::Inactive
        );
    }
}
