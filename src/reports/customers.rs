// Customer, payment and sales rep reports

use crate::error::Result;
use crate::query::{Aggregate, Projection, SortKey};
use crate::source::DataSource;
use crate::storage::table::Table;

/// Reps qualify when their customers' average credit limit is strictly above this
pub const CREDIT_LIMIT_THRESHOLD: f64 = 90_000.0;

/// Number of reps kept by `top_reps_by_credit`
pub const TOP_REPS: usize = 4;

/// Customers that never ordered but do have a sales rep
/// Columns: contactFirstName, contactLastName, phone, salesRepEmployeeNumber
/// (by contact last name)
pub fn customers_without_orders(source: &dyn DataSource) -> Result<Table> {
    let customers = source
        .scan(
            "customers",
            &[
                "customerNumber",
                "contactFirstName",
                "contactLastName",
                "phone",
                "salesRepEmployeeNumber",
            ],
        )?
        .qualify("c");
    let orders = source
        .scan("orders", &["orderNumber", "customerNumber"])?
        .qualify("o");

    let joined = customers.left_join(&orders, "c.customerNumber", "o.customerNumber")?;
    let order = joined.column_index("o.orderNumber")?;
    let rep = joined.column_index("c.salesRepEmployeeNumber")?;

    joined
        .filter(|row| row.values[order].is_null() && !row.values[rep].is_null())
        .project(&[
            Projection::column("c.contactFirstName", "contactFirstName"),
            Projection::column("c.contactLastName", "contactLastName"),
            Projection::column("c.phone", "phone"),
            Projection::column("c.salesRepEmployeeNumber", "salesRepEmployeeNumber"),
        ])?
        .sort_by(&[SortKey::asc("contactLastName")])
}

/// All payments, amount as a real number
/// Columns: customerName, checkNumber, paymentDate, amount (descending amount)
pub fn payments_by_amount(source: &dyn DataSource) -> Result<Table> {
    source
        .scan(
            "payments",
            &["customerName", "checkNumber", "paymentDate", "amount"],
        )?
        .qualify("p")
        .project(&[
            Projection::column("p.customerName", "customerName"),
            Projection::column("p.checkNumber", "checkNumber"),
            Projection::column("p.paymentDate", "paymentDate"),
            Projection::cast_real("p.amount", "amount"),
        ])?
        .sort_by(&[SortKey::desc("amount")])
}

/// Sales reps whose customers average more than `CREDIT_LIMIT_THRESHOLD` of
/// credit, with their customer count; the `TOP_REPS` largest books only
/// Columns: employeeNumber, firstName, lastName, num_customers
/// (descending count; ties keep employee number order)
pub fn top_reps_by_credit(source: &dyn DataSource) -> Result<Table> {
    let employees = source
        .scan("employees", &["employeeNumber", "firstName", "lastName"])?
        .qualify("e");
    let customers = source
        .scan(
            "customers",
            &["customerNumber", "salesRepEmployeeNumber", "creditLimit"],
        )?
        .qualify("c");

    Ok(employees
        .inner_join(&customers, "e.employeeNumber", "c.salesRepEmployeeNumber")?
        .group_by(
            &["e.employeeNumber"],
            &["e.firstName", "e.lastName"],
            &[
                Aggregate::count("c.customerNumber", "num_customers"),
                Aggregate::avg("c.creditLimit", "avg_credit_limit"),
            ],
        )?
        .filter_column("avg_credit_limit", |v| {
            v.as_f64().is_some_and(|avg| avg > CREDIT_LIMIT_THRESHOLD)
        })?
        .sort_by(&[SortKey::desc("num_customers")])?
        .project(&[
            Projection::column("e.employeeNumber", "employeeNumber"),
            Projection::column("e.firstName", "firstName"),
            Projection::column("e.lastName", "lastName"),
            Projection::column("num_customers", "num_customers"),
        ])?
        .limit(TOP_REPS))
}
