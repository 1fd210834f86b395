// Reports module - the fixed catalog of ten read-only reports
// Each report scans what it needs from a DataSource and returns one Table

pub mod customers;
pub mod offices;
pub mod products;
pub mod runner;

use crate::error::{ReportError, Result};
use crate::source::DataSource;
use crate::storage::table::Table;
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub use runner::{FailurePolicy, ReportOutput, ReportRunner, RunSummary};

/// Identifies one report of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportId {
    BostonEmployees,
    EmptyOffices,
    EmployeeLocations,
    CustomersWithoutOrders,
    PaymentsByAmount,
    TopCreditReps,
    ProductVolume,
    ProductPurchasers,
    CustomersPerOffice,
    UnderPopularProductReps,
}

impl ReportId {
    /// Every report, in catalog order
    pub const ALL: [ReportId; 10] = [
        ReportId::BostonEmployees,
        ReportId::EmptyOffices,
        ReportId::EmployeeLocations,
        ReportId::CustomersWithoutOrders,
        ReportId::PaymentsByAmount,
        ReportId::TopCreditReps,
        ReportId::ProductVolume,
        ReportId::ProductPurchasers,
        ReportId::CustomersPerOffice,
        ReportId::UnderPopularProductReps,
    ];

    /// 1-based position in the catalog
    pub fn number(&self) -> usize {
        Self::ALL
            .iter()
            .position(|id| id == self)
            .map_or(0, |i| i + 1)
    }

    /// Stable name used on the command line and for output files
    pub fn slug(&self) -> &'static str {
        match self {
            ReportId::BostonEmployees => "boston-employees",
            ReportId::EmptyOffices => "empty-offices",
            ReportId::EmployeeLocations => "employee-locations",
            ReportId::CustomersWithoutOrders => "customers-without-orders",
            ReportId::PaymentsByAmount => "payments-by-amount",
            ReportId::TopCreditReps => "top-credit-reps",
            ReportId::ProductVolume => "product-volume",
            ReportId::ProductPurchasers => "product-purchasers",
            ReportId::CustomersPerOffice => "customers-per-office",
            ReportId::UnderPopularProductReps => "under-popular-product-reps",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportId::BostonEmployees => "Employees in Boston with job titles",
            ReportId::EmptyOffices => "Offices with zero employees",
            ReportId::EmployeeLocations => "All employees with office city and state",
            ReportId::CustomersWithoutOrders => "Customers with a sales rep but no orders",
            ReportId::PaymentsByAmount => "Payments by amount, largest first",
            ReportId::TopCreditReps => "Top sales reps by customer credit limit",
            ReportId::ProductVolume => "Order lines and units per product",
            ReportId::ProductPurchasers => "Unique purchasers per product",
            ReportId::CustomersPerOffice => "Customers per office",
            ReportId::UnderPopularProductReps => "Employees selling under-popular products",
        }
    }

    /// Evaluate this report against `source`
    pub fn run(&self, source: &dyn DataSource) -> Result<Table> {
        let mut table = match self {
            ReportId::BostonEmployees => offices::employees_in_city(source)?,
            ReportId::EmptyOffices => offices::offices_without_employees(source)?,
            ReportId::EmployeeLocations => offices::employee_locations(source)?,
            ReportId::CustomersWithoutOrders => customers::customers_without_orders(source)?,
            ReportId::PaymentsByAmount => customers::payments_by_amount(source)?,
            ReportId::TopCreditReps => customers::top_reps_by_credit(source)?,
            ReportId::ProductVolume => products::product_order_volume(source)?,
            ReportId::ProductPurchasers => products::product_purchasers(source)?,
            ReportId::CustomersPerOffice => offices::customers_per_office(source)?,
            ReportId::UnderPopularProductReps => products::reps_of_under_popular_products(source)?,
        };

        table.name = self.slug().to_string();
        Ok(table)
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// A report that could not be produced, and why
#[derive(Error, Debug)]
#[error("report {number} ({report}) failed: {source}", number = .report.number())]
pub struct ReportFailure {
    pub report: ReportId,
    pub source: ReportError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_and_slugs() {
        assert_eq!(ReportId::BostonEmployees.number(), 1);
        assert_eq!(ReportId::UnderPopularProductReps.number(), 10);

        for id in ReportId::ALL {
            let parsed = ReportId::from_str(id.slug(), false).unwrap();
            assert_eq!(parsed, id);
        }
    }

    #[test]
    fn test_failure_message_names_report() {
        let failure = ReportFailure {
            report: ReportId::PaymentsByAmount,
            source: ReportError::DataAccess("no such table: payments".to_string()),
        };
        assert_eq!(
            failure.to_string(),
            "report 5 (payments-by-amount) failed: data access error: no such table: payments"
        );
    }
}
