// Product reports

use crate::error::Result;
use crate::query::{Aggregate, Projection, SortKey};
use crate::source::DataSource;
use crate::storage::table::Table;

/// Products bought by fewer distinct customers than this are under-popular
pub const POPULARITY_THRESHOLD: i64 = 20;

/// Order lines and units ordered per product (ordered products only)
/// Columns: productName, numorders, totalunits (descending units)
pub fn product_order_volume(source: &dyn DataSource) -> Result<Table> {
    let products = source
        .scan("products", &["productCode", "productName"])?
        .qualify("p");
    let lines = source
        .scan("orderdetails", &["orderNumber", "productCode", "quantityOrdered"])?
        .qualify("od");

    products
        .inner_join(&lines, "p.productCode", "od.productCode")?
        .group_by(
            &["p.productCode"],
            &["p.productName"],
            &[
                Aggregate::count("od.orderNumber", "numorders"),
                Aggregate::sum("od.quantityOrdered", "totalunits"),
            ],
        )?
        .sort_by(&[SortKey::desc("totalunits")])?
        .project(&[
            Projection::column("p.productName", "productName"),
            Projection::column("numorders", "numorders"),
            Projection::column("totalunits", "totalunits"),
        ])
}

/// Distinct purchasing customers per ordered product, in product code order
/// Columns: p.productCode, p.productName, numpurchasers
fn purchaser_counts(source: &dyn DataSource) -> Result<Table> {
    let products = source
        .scan("products", &["productCode", "productName"])?
        .qualify("p");
    let lines = source
        .scan("orderdetails", &["orderNumber", "productCode"])?
        .qualify("od");
    let orders = source
        .scan("orders", &["orderNumber", "customerNumber"])?
        .qualify("o");

    products
        .inner_join(&lines, "p.productCode", "od.productCode")?
        .inner_join(&orders, "od.orderNumber", "o.orderNumber")?
        .group_by(
            &["p.productCode"],
            &["p.productName"],
            &[Aggregate::count_distinct("o.customerNumber", "numpurchasers")],
        )
}

/// Number of distinct customers who ordered each product
/// Columns: productName, productCode, numpurchasers (descending count)
pub fn product_purchasers(source: &dyn DataSource) -> Result<Table> {
    purchaser_counts(source)?
        .sort_by(&[SortKey::desc("numpurchasers")])?
        .project(&[
            Projection::column("p.productName", "productName"),
            Projection::column("p.productCode", "productCode"),
            Projection::column("numpurchasers", "numpurchasers"),
        ])
}

/// Employees whose customers ordered at least one under-popular product
/// Columns: employeeNumber, firstName, lastName, city, officeCode
/// (distinct, by employee number)
pub fn reps_of_under_popular_products(source: &dyn DataSource) -> Result<Table> {
    let under_popular = purchaser_counts(source)?
        .filter_column("numpurchasers", |v| {
            v.as_f64()
                .is_some_and(|count| count < POPULARITY_THRESHOLD as f64)
        })?
        .project(&[
            Projection::column("p.productCode", "productCode"),
            Projection::column("numpurchasers", "cust_count"),
        ])?
        .qualify("pcc");

    let employees = source
        .scan(
            "employees",
            &["employeeNumber", "firstName", "lastName", "officeCode"],
        )?
        .qualify("e");
    let offices = source.scan("offices", &["officeCode", "city"])?.qualify("o");
    let customers = source
        .scan("customers", &["customerNumber", "salesRepEmployeeNumber"])?
        .qualify("c");
    let orders = source
        .scan("orders", &["orderNumber", "customerNumber"])?
        .qualify("ord");
    let lines = source
        .scan("orderdetails", &["orderNumber", "productCode"])?
        .qualify("od");

    Ok(employees
        .inner_join(&offices, "e.officeCode", "o.officeCode")?
        .inner_join(&customers, "e.employeeNumber", "c.salesRepEmployeeNumber")?
        .inner_join(&orders, "c.customerNumber", "ord.customerNumber")?
        .inner_join(&lines, "ord.orderNumber", "od.orderNumber")?
        .semi_join(&under_popular, "od.productCode", "pcc.productCode")?
        .project(&[
            Projection::column("e.employeeNumber", "employeeNumber"),
            Projection::column("e.firstName", "firstName"),
            Projection::column("e.lastName", "lastName"),
            Projection::column("o.city", "city"),
            Projection::column("o.officeCode", "officeCode"),
        ])?
        .distinct()
        .sort_by(&[SortKey::asc("employeeNumber")])?)
}
