use admin_dashboard_api::establish_connection;
use admin_dashboard_api::models::Product;
use admin_dashboard_api::schema::products;
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use std::str::FromStr;
use std::thread;

// Exercises the in-database sales increment used by order creation: eight
// writers racing on one product must not lose any of their updates.
#[test]
#[ignore = "requires DATABASE_URL pointing at a migrated Postgres"]
fn concurrent_sales_increments_are_not_lost() {
    let conn = &mut establish_connection();
    let product: Product = diesel::insert_into(products::table)
        .values((
            products::name.eq("Concurrency Probe"),
            products::category.eq("Test"),
            products::price.eq(BigDecimal::from_str("1.00").unwrap()),
            products::stock.eq(100),
            products::sales.eq(0),
        ))
        .returning(Product::as_returning())
        .get_result(conn)
        .unwrap();

    let writers: Vec<_> = (0..8)
        .map(|_| {
            let target = product.id;
            thread::spawn(move || {
                let conn = &mut establish_connection();
                for _ in 0..25 {
                    diesel::update(products::table.filter(products::id.eq(target)))
                        .set(products::sales.eq(products::sales + 1))
                        .execute(conn)
                        .unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let sales_after: i32 = products::table
        .filter(products::id.eq(product.id))
        .select(products::sales)
        .first(conn)
        .unwrap();
    assert_eq!(sales_after, 200);

    diesel::delete(products::table.filter(products::id.eq(product.id)))
        .execute(conn)
        .unwrap();
}
