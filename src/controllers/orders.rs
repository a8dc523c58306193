use crate::controllers::analytics;
use crate::controllers::pagination::{total_pages, ListQuery};
use crate::errors::ApiError;
use crate::insertables::{NewOrder, NewOrderItem};
use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use admin_dashboard_api::models::{Order, OrderItem, OrderStatus};
use admin_dashboard_api::schema::{self, order_items, products};
use bigdecimal::{BigDecimal, Zero};
use chrono::{NaiveDateTime, Utc};
use diesel::{prelude::*, r2d2};
use schema::orders::dsl::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

#[derive(Deserialize, Validate)]
pub struct OrderItemInput {
    pub product_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Deserialize, Validate)]
pub struct OrderForm {
    #[validate(length(min = 1, max = 100))]
    pub customer: String,
    #[validate(nested)]
    pub items: Vec<OrderItemInput>,
    pub status: Option<OrderStatus>,
    pub order_date: Option<NaiveDateTime>,
}

#[derive(Deserialize, Validate)]
pub struct OrderUpdateForm {
    #[validate(length(min = 1, max = 100))]
    pub customer: String,
    pub total: BigDecimal,
    pub status: OrderStatus,
}

#[derive(Deserialize)]
struct StatusQuery {
    status: OrderStatus,
}

#[derive(Deserialize)]
struct DateRangeQuery {
    start_date: NaiveDateTime,
    end_date: NaiveDateTime,
}

#[derive(Deserialize)]
struct RevenueQuery {
    start_date: Option<NaiveDateTime>,
    end_date: Option<NaiveDateTime>,
}

#[derive(Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Serialize)]
struct OrderPage {
    orders: Vec<Order>,
    current_page: i64,
    total_items: i64,
    total_pages: i64,
}

#[derive(Serialize)]
struct RevenueStats {
    total_revenue: BigDecimal,
    period: &'static str,
}

#[derive(Serialize)]
struct OrderStats {
    total_orders: i64,
    pending_orders: i64,
    processing_orders: i64,
    shipped_orders: i64,
    delivered_orders: i64,
    total_revenue: BigDecimal,
    status_counts: HashMap<OrderStatus, i64>,
}

/// Subtotal of a single line item: unit price times quantity, decimal-exact.
pub fn item_subtotal(item: &OrderItemInput) -> BigDecimal {
    &item.unit_price * BigDecimal::from(item.quantity)
}

/// Authoritative order total: the sum of all line-item subtotals.
/// Zero items yield a zero total.
pub fn order_total(items: &[OrderItemInput]) -> BigDecimal {
    items
        .iter()
        .map(item_subtotal)
        .fold(BigDecimal::zero(), |acc, subtotal| acc + subtotal)
}

pub fn get_all_orders(conn: &mut PgConnection) -> Result<Vec<Order>, ApiError> {
    let all_orders = orders.select(Order::as_select()).load(conn)?;
    Ok(all_orders)
}

pub fn list_orders(
    conn: &mut PgConnection,
    query: &ListQuery,
) -> Result<(Vec<Order>, i64), ApiError> {
    let pattern = query.like_pattern();

    let total_count: i64 = match &pattern {
        Some(p) => orders
            .filter(order_code.ilike(p.clone()).or(customer.ilike(p.clone())))
            .count()
            .get_result(conn)?,
        None => orders.count().get_result(conn)?,
    };

    let mut stmt = orders.select(Order::as_select()).into_boxed();
    if let Some(p) = &pattern {
        stmt = stmt.filter(order_code.ilike(p.clone()).or(customer.ilike(p.clone())));
    }
    stmt = match (query.sort_key("order_date"), query.descending(true)) {
        ("customer", false) => stmt.order(customer.asc()),
        ("customer", true) => stmt.order(customer.desc()),
        ("total", false) => stmt.order(total.asc()),
        ("total", true) => stmt.order(total.desc()),
        ("id", false) => stmt.order(id.asc()),
        ("id", true) => stmt.order(id.desc()),
        (_, false) => stmt.order(order_date.asc()),
        (_, true) => stmt.order(order_date.desc()),
    };
    let page_rows = stmt.offset(query.offset()).limit(query.limit()).load(conn)?;
    Ok((page_rows, total_count))
}

fn load_items(conn: &mut PgConnection, order: &Order) -> Result<Vec<OrderItem>, ApiError> {
    let items = OrderItem::belonging_to(order)
        .select(OrderItem::as_select())
        .load(conn)?;
    Ok(items)
}

pub fn get_order_by_id(conn: &mut PgConnection, order_id: i32) -> Result<OrderWithItems, ApiError> {
    let order = orders
        .filter(id.eq(order_id))
        .select(Order::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("order {} not found", order_id)))?;
    let items = load_items(conn, &order)?;
    Ok(OrderWithItems { order, items })
}

pub fn get_order_by_code(conn: &mut PgConnection, code: &str) -> Result<OrderWithItems, ApiError> {
    let order = orders
        .filter(order_code.eq(code))
        .select(Order::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("order {} not found", code)))?;
    let items = load_items(conn, &order)?;
    Ok(OrderWithItems { order, items })
}

pub fn get_orders_by_status(
    conn: &mut PgConnection,
    wanted: OrderStatus,
) -> Result<Vec<Order>, ApiError> {
    let matching = orders
        .filter(status.eq(wanted))
        .select(Order::as_select())
        .load(conn)?;
    Ok(matching)
}

/// Creates an order from its line items inside one transaction: the order
/// row, its item rows and the per-product sales increments all commit
/// together or not at all. A missing product rolls the whole order back.
pub fn insert_new_order(
    conn: &mut PgConnection,
    form: &OrderForm,
) -> Result<OrderWithItems, ApiError> {
    for item in &form.items {
        if item.unit_price < BigDecimal::zero() {
            return Err(ApiError::Validation(
                "unit_price must not be negative".to_string(),
            ));
        }
    }

    conn.transaction(|conn| {
        let order: Order = diesel::insert_into(orders)
            .values(&NewOrder {
                order_code: String::new(),
                customer: form.customer.clone(),
                total: order_total(&form.items),
                status: form.status.unwrap_or(OrderStatus::Pending),
                order_date: form.order_date.unwrap_or_else(|| Utc::now().naive_utc()),
            })
            .returning(Order::as_returning())
            .get_result(conn)?;

        // human order code derived from the generated id
        let order: Order = diesel::update(orders.filter(id.eq(order.id)))
            .set(order_code.eq(format!("ORD{:03}", order.id)))
            .returning(Order::as_returning())
            .get_result(conn)?;

        let mut items = Vec::with_capacity(form.items.len());
        for item in &form.items {
            let saved: OrderItem = diesel::insert_into(order_items::table)
                .values(&NewOrderItem {
                    order_id: order.id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price: item.unit_price.clone(),
                    subtotal: item_subtotal(item),
                })
                .returning(OrderItem::as_returning())
                .get_result(conn)?;

            // in-database increment, safe under concurrent order creation
            let updated = diesel::update(products::table.filter(products::id.eq(item.product_id)))
                .set(products::sales.eq(products::sales + item.quantity))
                .execute(conn)?;
            if updated == 0 {
                return Err(ApiError::NotFound(format!(
                    "product {} not found",
                    item.product_id
                )));
            }
            items.push(saved);
        }

        Ok(OrderWithItems { order, items })
    })
}

pub fn update_order_by_id(
    conn: &mut PgConnection,
    order_id: i32,
    form: &OrderUpdateForm,
) -> Result<Order, ApiError> {
    let updated = diesel::update(orders.filter(id.eq(order_id)))
        .set((
            customer.eq(form.customer.clone()),
            total.eq(form.total.clone()),
            status.eq(form.status),
        ))
        .returning(Order::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("order {} not found", order_id)))?;
    Ok(updated)
}

pub fn update_order_status_by_id(
    conn: &mut PgConnection,
    order_id: i32,
    new_status: OrderStatus,
) -> Result<Order, ApiError> {
    let updated = diesel::update(orders.filter(id.eq(order_id)))
        .set(status.eq(new_status))
        .returning(Order::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("order {} not found", order_id)))?;
    Ok(updated)
}

pub fn delete_order_by_id(conn: &mut PgConnection, order_id: i32) -> Result<(), ApiError> {
    // items go with the order via ON DELETE CASCADE
    let deleted = diesel::delete(orders.filter(id.eq(order_id))).execute(conn)?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("order {} not found", order_id)));
    }
    Ok(())
}

#[get("/api/orders")]
async fn get_orders(
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let page_number = query.page.max(0);
    let page_size = query.limit();
    let (rows, total_count) = web::block(move || {
        let mut conn = pool.get()?;
        list_orders(&mut conn, &query)
    })
    .await??;

    Ok(HttpResponse::Ok().json(OrderPage {
        orders: rows,
        current_page: page_number,
        total_items: total_count,
        total_pages: total_pages(total_count, page_size),
    }))
}

#[get("/api/orders/stats")]
async fn get_order_stats(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let all_orders = web::block(move || {
        let mut conn = pool.get()?;
        get_all_orders(&mut conn)
    })
    .await??;

    let status_counts = analytics::count_orders_by_status(&all_orders);
    let count_for = |wanted: OrderStatus| status_counts.get(&wanted).copied().unwrap_or(0);
    Ok(HttpResponse::Ok().json(OrderStats {
        total_orders: all_orders.len() as i64,
        pending_orders: count_for(OrderStatus::Pending),
        processing_orders: count_for(OrderStatus::Processing),
        shipped_orders: count_for(OrderStatus::Shipped),
        delivered_orders: count_for(OrderStatus::Delivered),
        total_revenue: analytics::total_revenue(&all_orders),
        status_counts,
    }))
}

#[get("/api/orders/revenue")]
async fn get_revenue_stats(
    pool: web::Data<DbPool>,
    query: web::Query<RevenueQuery>,
) -> Result<HttpResponse, ApiError> {
    let all_orders = web::block(move || {
        let mut conn = pool.get()?;
        get_all_orders(&mut conn)
    })
    .await??;

    let stats = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => RevenueStats {
            total_revenue: analytics::revenue_in_range(&all_orders, start, end),
            period: "custom",
        },
        _ => RevenueStats {
            total_revenue: analytics::total_revenue(&all_orders),
            period: "all-time",
        },
    };
    Ok(HttpResponse::Ok().json(stats))
}

#[get("/api/orders/date-range")]
async fn get_orders_by_date_range(
    pool: web::Data<DbPool>,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, ApiError> {
    let all_orders = web::block(move || {
        let mut conn = pool.get()?;
        get_all_orders(&mut conn)
    })
    .await??;
    Ok(HttpResponse::Ok().json(analytics::orders_in_range(
        &all_orders,
        query.start_date,
        query.end_date,
    )))
}

#[get("/api/orders/status/{status}")]
async fn get_orders_with_status(
    pool: web::Data<DbPool>,
    wanted: web::Path<OrderStatus>,
) -> Result<HttpResponse, ApiError> {
    let wanted = wanted.into_inner();
    let matching = web::block(move || {
        let mut conn = pool.get()?;
        get_orders_by_status(&mut conn, wanted)
    })
    .await??;
    Ok(HttpResponse::Ok().json(matching))
}

#[get("/api/orders/order-code/{code}")]
async fn get_order_with_code(
    pool: web::Data<DbPool>,
    code: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let order = web::block(move || {
        let mut conn = pool.get()?;
        get_order_by_code(&mut conn, &code)
    })
    .await??;
    Ok(HttpResponse::Ok().json(order))
}

#[get("/api/orders/{order_id}")]
async fn get_order(
    pool: web::Data<DbPool>,
    order_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let order = web::block(move || {
        let mut conn = pool.get()?;
        get_order_by_id(&mut conn, *order_id)
    })
    .await??;
    Ok(HttpResponse::Ok().json(order))
}

#[post("/api/orders")]
async fn create_order(
    pool: web::Data<DbPool>,
    form: web::Json<OrderForm>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    form.validate()?;
    let order = web::block(move || {
        let mut conn = pool.get()?;
        insert_new_order(&mut conn, &form)
    })
    .await??;
    tracing::info!(order_id = order.order.id, code = %order.order.order_code, "order created");
    Ok(HttpResponse::Created().json(order))
}

#[put("/api/orders/{order_id}")]
async fn update_order(
    pool: web::Data<DbPool>,
    order_id: web::Path<i32>,
    form: web::Json<OrderUpdateForm>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    form.validate()?;
    let order = web::block(move || {
        let mut conn = pool.get()?;
        update_order_by_id(&mut conn, *order_id, &form)
    })
    .await??;
    Ok(HttpResponse::Ok().json(order))
}

#[patch("/api/orders/{order_id}/status")]
async fn update_order_status(
    pool: web::Data<DbPool>,
    order_id: web::Path<i32>,
    query: web::Query<StatusQuery>,
) -> Result<HttpResponse, ApiError> {
    let new_status = query.status;
    let order = web::block(move || {
        let mut conn = pool.get()?;
        update_order_status_by_id(&mut conn, *order_id, new_status)
    })
    .await??;
    Ok(HttpResponse::Ok().json(order))
}

#[delete("/api/orders/{order_id}")]
async fn delete_order(
    pool: web::Data<DbPool>,
    order_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let removed_id = *order_id;
    web::block(move || {
        let mut conn = pool.get()?;
        delete_order_by_id(&mut conn, removed_id)
    })
    .await??;
    tracing::info!(order_id = removed_id, "order deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product: i32, quantity: i32, unit_price: &str) -> OrderItemInput {
        OrderItemInput {
            product_id: product,
            quantity,
            unit_price: unit_price.parse().unwrap(),
        }
    }

    #[test]
    fn total_is_the_exact_sum_of_subtotals() {
        let items = vec![item(1, 2, "59.99"), item(2, 1, "39.99")];
        assert_eq!(order_total(&items), "159.97".parse::<BigDecimal>().unwrap());

        let by_hand: BigDecimal = items.iter().map(item_subtotal).sum();
        assert_eq!(order_total(&items), by_hand);
    }

    #[test]
    fn zero_items_yield_zero_total() {
        assert_eq!(order_total(&[]), BigDecimal::zero());
    }

    #[test]
    fn subtotal_multiplies_quantity_and_price() {
        assert_eq!(item_subtotal(&item(1, 3, "10.50")), "31.50".parse::<BigDecimal>().unwrap());
        assert_eq!(item_subtotal(&item(1, 1, "0.01")), "0.01".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn no_rounding_drift_over_many_items() {
        let items: Vec<OrderItemInput> = (0..100).map(|_| item(1, 1, "0.10")).collect();
        assert_eq!(order_total(&items), "10.00".parse::<BigDecimal>().unwrap());
    }
}
