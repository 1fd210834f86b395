// Office and staffing reports

use crate::error::Result;
use crate::query::{Aggregate, Projection, SortKey};
use crate::source::DataSource;
use crate::storage::{table::Table, Value};

/// City whose employees are listed by `employees_in_city`
pub const TARGET_CITY: &str = "Boston";

/// Placeholder for an employee without a resolvable office location
pub const MISSING_LOCATION: &str = "N/A";

/// Employees working in an office located in `TARGET_CITY`
/// Columns: firstName, lastName, jobTitle (employee scan order)
pub fn employees_in_city(source: &dyn DataSource) -> Result<Table> {
    let employees = source
        .scan("employees", &["firstName", "lastName", "jobTitle", "officeCode"])?
        .qualify("e");
    let city = Value::text(TARGET_CITY);
    let offices = source
        .scan("offices", &["officeCode", "city"])?
        .qualify("o")
        .filter_column("o.city", |v| v.sql_eq(&city))?;

    employees.semi_join(&offices, "e.officeCode", "o.officeCode")?.project(&[
        Projection::column("e.firstName", "firstName"),
        Projection::column("e.lastName", "lastName"),
        Projection::column("e.jobTitle", "jobTitle"),
    ])
}

/// Offices with no employee assigned
/// Columns: officeCode, city (office code order)
pub fn offices_without_employees(source: &dyn DataSource) -> Result<Table> {
    let offices = source.scan("offices", &["officeCode", "city"])?.qualify("o");
    let employees = source
        .scan("employees", &["employeeNumber", "officeCode"])?
        .qualify("e");

    offices
        .left_join(&employees, "o.officeCode", "e.officeCode")?
        .group_by(
            &["o.officeCode"],
            &["o.city"],
            &[Aggregate::count("e.employeeNumber", "employee_count")],
        )?
        .filter_column("employee_count", |v| *v == Value::Integer(0))?
        .project(&[
            Projection::column("o.officeCode", "officeCode"),
            Projection::column("o.city", "city"),
        ])
}

/// Every employee with the city and state of their office, "N/A" when unknown
/// Columns: firstName, lastName, city, state (by first name, then last name)
pub fn employee_locations(source: &dyn DataSource) -> Result<Table> {
    let employees = source
        .scan("employees", &["firstName", "lastName", "officeCode"])?
        .qualify("e");
    let offices = source
        .scan("offices", &["officeCode", "city", "state"])?
        .qualify("o");

    employees
        .left_join(&offices, "e.officeCode", "o.officeCode")?
        .project(&[
            Projection::column("e.firstName", "firstName"),
            Projection::column("e.lastName", "lastName"),
            Projection::coalesce("o.city", Value::text(MISSING_LOCATION), "city"),
            Projection::coalesce("o.state", Value::text(MISSING_LOCATION), "state"),
        ])?
        .sort_by(&[SortKey::asc("firstName"), SortKey::asc("lastName")])
}

/// Number of customers served by each office's sales reps, zero included
/// Columns: officeCode, city, n_customers (descending count)
pub fn customers_per_office(source: &dyn DataSource) -> Result<Table> {
    let offices = source.scan("offices", &["officeCode", "city"])?.qualify("o");
    let employees = source
        .scan("employees", &["employeeNumber", "officeCode"])?
        .qualify("e");
    let customers = source
        .scan("customers", &["customerNumber", "salesRepEmployeeNumber"])?
        .qualify("c");

    offices
        .left_join(&employees, "o.officeCode", "e.officeCode")?
        .left_join(&customers, "e.employeeNumber", "c.salesRepEmployeeNumber")?
        .group_by(
            &["o.officeCode"],
            &["o.city"],
            &[Aggregate::count("c.customerNumber", "n_customers")],
        )?
        .sort_by(&[SortKey::desc("n_customers")])?
        .project(&[
            Projection::column("o.officeCode", "officeCode"),
            Projection::column("o.city", "city"),
            Projection::column("n_customers", "n_customers"),
        ])
}
