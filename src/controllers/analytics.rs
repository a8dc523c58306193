//! Aggregation engine: reduces fetched entity rows to dashboard metrics.
//!
//! Every function here is a total, stateless computation over its input
//! collection. Nothing in this module touches the database.

use admin_dashboard_api::models::{Order, OrderStatus, Product, Role, SalesData, User, UserStatus};
use bigdecimal::{BigDecimal, Zero};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

pub fn count_orders_by_status(orders: &[Order]) -> HashMap<OrderStatus, i64> {
    let mut counts = HashMap::new();
    for order in orders {
        *counts.entry(order.status).or_insert(0) += 1;
    }
    counts
}

pub fn count_users_by_role(users: &[User]) -> HashMap<Role, i64> {
    let mut counts = HashMap::new();
    for user in users {
        *counts.entry(user.role).or_insert(0) += 1;
    }
    counts
}

pub fn count_products_by_category(products: &[Product]) -> HashMap<String, i64> {
    let mut counts = HashMap::new();
    for product in products {
        *counts.entry(product.category.clone()).or_insert(0) += 1;
    }
    counts
}

pub fn active_user_count(users: &[User]) -> i64 {
    users
        .iter()
        .filter(|u| u.status == UserStatus::Active)
        .count() as i64
}

pub fn in_stock_count(products: &[Product]) -> i64 {
    products.iter().filter(|p| p.stock > 0).count() as i64
}

/// Sum of `total` across all orders. Zero over an empty set.
pub fn total_revenue(orders: &[Order]) -> BigDecimal {
    orders
        .iter()
        .fold(BigDecimal::zero(), |acc, order| acc + &order.total)
}

/// Orders whose `order_date` falls in the closed interval `[start, end]`.
/// An inverted range matches nothing.
pub fn orders_in_range(orders: &[Order], start: NaiveDateTime, end: NaiveDateTime) -> Vec<Order> {
    orders
        .iter()
        .filter(|o| o.order_date >= start && o.order_date <= end)
        .cloned()
        .collect()
}

pub fn revenue_in_range(orders: &[Order], start: NaiveDateTime, end: NaiveDateTime) -> BigDecimal {
    orders
        .iter()
        .filter(|o| o.order_date >= start && o.order_date <= end)
        .fold(BigDecimal::zero(), |acc, order| acc + &order.total)
}

/// The `limit` best-selling products, by cumulative sales descending.
/// The sort is stable, so products tied on sales keep their retrieval order.
pub fn top_selling(products: &[Product], limit: i64) -> Vec<Product> {
    if limit <= 0 {
        return Vec::new();
    }
    let mut ranked = products.to_vec();
    ranked.sort_by(|a, b| b.sales.cmp(&a.sales));
    ranked.truncate(limit as usize);
    ranked
}

/// Products with stock strictly below `threshold`, ordered by id.
pub fn low_stock(products: &[Product], threshold: i32) -> Vec<Product> {
    let mut flagged: Vec<Product> = products
        .iter()
        .filter(|p| p.stock < threshold)
        .cloned()
        .collect();
    flagged.sort_by_key(|p| p.id);
    flagged
}

/// Per-category sums of `sales`. Uncategorized records are skipped;
/// categories with no records do not appear in the result.
pub fn sales_by_category(records: &[SalesData]) -> HashMap<String, BigDecimal> {
    let mut totals: HashMap<String, BigDecimal> = HashMap::new();
    for record in records {
        if let Some(cat) = &record.category {
            let entry = totals.entry(cat.clone()).or_insert_with(BigDecimal::zero);
            *entry += &record.sales;
        }
    }
    totals
}

/// Sales records whose `sale_date` falls in the closed interval `[start, end]`.
pub fn sales_in_range(records: &[SalesData], start: NaiveDate, end: NaiveDate) -> Vec<SalesData> {
    records
        .iter()
        .filter(|r| r.sale_date >= start && r.sale_date <= end)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i32, name: &str, category: &str, stock: i32, sales: i32) -> Product {
        Product {
            id,
            name: name.to_string(),
            category: category.to_string(),
            price: "9.99".parse().unwrap(),
            stock,
            sales,
            description: None,
            image_url: None,
        }
    }

    fn order(id: i32, code: &str, total: &str, status: OrderStatus, date: (i32, u32, u32)) -> Order {
        Order {
            id,
            order_code: code.to_string(),
            customer: "Customer".to_string(),
            total: total.parse().unwrap(),
            status,
            order_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        }
    }

    fn user(id: i32, role: Role, status: UserStatus) -> User {
        User {
            id,
            name: format!("User {}", id),
            email: format!("user{}@example.com", id),
            password: String::new(),
            role,
            status,
        }
    }

    fn sales_record(id: i32, amount: &str, date: (i32, u32, u32), category: Option<&str>) -> SalesData {
        SalesData {
            id,
            period: "Jul".to_string(),
            sales: amount.parse().unwrap(),
            sale_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn revenue_over_empty_set_is_zero() {
        assert_eq!(total_revenue(&[]), BigDecimal::zero());
    }

    #[test]
    fn revenue_sums_exactly() {
        let orders = vec![
            order(1, "ORD001", "235.40", OrderStatus::Delivered, (2023, 7, 1)),
            order(2, "ORD002", "412.00", OrderStatus::Processing, (2023, 7, 2)),
            order(3, "ORD003", "162.50", OrderStatus::Shipped, (2023, 7, 3)),
        ];
        assert_eq!(total_revenue(&orders), "809.90".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn revenue_in_range_is_boundary_inclusive() {
        let orders = vec![
            order(1, "ORD001", "235.40", OrderStatus::Delivered, (2023, 7, 1)),
            order(2, "ORD002", "412.00", OrderStatus::Processing, (2023, 7, 2)),
            order(3, "ORD003", "162.50", OrderStatus::Shipped, (2023, 7, 3)),
            order(4, "ORD004", "750.20", OrderStatus::Pending, (2023, 7, 4)),
        ];
        let start = NaiveDate::from_ymd_opt(2023, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 7, 3)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(revenue_in_range(&orders, start, end), "809.90".parse::<BigDecimal>().unwrap());
        assert_eq!(orders_in_range(&orders, start, end).len(), 3);
    }

    #[test]
    fn inverted_range_yields_nothing() {
        let orders = vec![order(1, "ORD001", "235.40", OrderStatus::Delivered, (2023, 7, 1))];
        let start = NaiveDate::from_ymd_opt(2023, 7, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(orders_in_range(&orders, start, end).is_empty());
        assert_eq!(revenue_in_range(&orders, start, end), BigDecimal::zero());
    }

    #[test]
    fn exact_boundary_instant_is_included() {
        let orders = vec![order(1, "ORD001", "100.00", OrderStatus::Pending, (2023, 7, 1))];
        let exact = orders[0].order_date;
        assert_eq!(orders_in_range(&orders, exact, exact).len(), 1);
    }

    #[test]
    fn top_selling_ranks_descending() {
        let products = vec![
            product(1, "Wireless Earbuds", "Electronics", 143, 1200),
            product(2, "Leather Wallet", "Accessories", 89, 800),
            product(3, "Smart Watch", "Electronics", 56, 650),
            product(4, "Yoga Mat", "Fitness", 210, 950),
            product(5, "Coffee Maker", "Home", 78, 720),
        ];
        let top = top_selling(&products, 3);
        let sales: Vec<i32> = top.iter().map(|p| p.sales).collect();
        assert_eq!(sales, vec![1200, 950, 800]);
    }

    #[test]
    fn top_selling_edge_limits() {
        let products = vec![
            product(1, "A", "X", 1, 10),
            product(2, "B", "X", 1, 30),
        ];
        assert!(top_selling(&products, 0).is_empty());
        assert!(top_selling(&products, -3).is_empty());
        let all = top_selling(&products, 100);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].sales, 30);
    }

    #[test]
    fn top_selling_preserves_order_among_ties() {
        let products = vec![
            product(7, "First", "X", 1, 500),
            product(3, "Second", "X", 1, 500),
            product(9, "Third", "X", 1, 500),
        ];
        let names: Vec<String> = top_selling(&products, 3)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn low_stock_splits_on_threshold() {
        let products = vec![
            product(1, "A", "X", 9, 0),
            product(2, "B", "X", 10, 0),
            product(3, "C", "X", 0, 0),
            product(4, "D", "X", 11, 0),
        ];
        let flagged = low_stock(&products, 10);
        let ids: Vec<i32> = flagged.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn counts_group_by_discriminant() {
        let orders = vec![
            order(1, "ORD001", "1.00", OrderStatus::Pending, (2023, 7, 1)),
            order(2, "ORD002", "1.00", OrderStatus::Pending, (2023, 7, 1)),
            order(3, "ORD003", "1.00", OrderStatus::Shipped, (2023, 7, 1)),
        ];
        let counts = count_orders_by_status(&orders);
        assert_eq!(counts.get(&OrderStatus::Pending), Some(&2));
        assert_eq!(counts.get(&OrderStatus::Shipped), Some(&1));
        assert_eq!(counts.get(&OrderStatus::Delivered), None);

        let users = vec![
            user(1, Role::Admin, UserStatus::Active),
            user(2, Role::Customer, UserStatus::Inactive),
            user(3, Role::Customer, UserStatus::Active),
        ];
        let roles = count_users_by_role(&users);
        assert_eq!(roles.get(&Role::Customer), Some(&2));
        assert_eq!(roles.get(&Role::Moderator), None);
        assert_eq!(active_user_count(&users), 2);
    }

    #[test]
    fn product_counts_and_stock() {
        let products = vec![
            product(1, "A", "Electronics", 5, 0),
            product(2, "B", "Electronics", 0, 0),
            product(3, "C", "Home", 2, 0),
        ];
        let counts = count_products_by_category(&products);
        assert_eq!(counts.get("Electronics"), Some(&2));
        assert_eq!(counts.get("Home"), Some(&1));
        assert_eq!(in_stock_count(&products), 2);
    }

    #[test]
    fn category_sums_only_cover_present_categories() {
        let records = vec![
            sales_record(1, "4200.00", (2023, 7, 1), Some("Electronics")),
            sales_record(2, "3800.00", (2023, 8, 1), Some("Electronics")),
            sales_record(3, "5100.00", (2023, 9, 1), Some("Home")),
            sales_record(4, "999.00", (2023, 10, 1), None),
        ];
        let sums = sales_by_category(&records);
        assert_eq!(sums.len(), 2);
        assert_eq!(sums.get("Electronics"), Some(&"8000.00".parse().unwrap()));
        assert_eq!(sums.get("Home"), Some(&"5100.00".parse().unwrap()));
    }

    #[test]
    fn sales_range_includes_boundary_dates() {
        let records = vec![
            sales_record(1, "1.00", (2023, 7, 1), None),
            sales_record(2, "1.00", (2023, 8, 1), None),
            sales_record(3, "1.00", (2023, 9, 1), None),
        ];
        let start = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 8, 1).unwrap();
        assert_eq!(sales_in_range(&records, start, end).len(), 2);
    }
}
