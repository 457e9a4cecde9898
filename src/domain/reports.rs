//! Sample sales figures served by the bundled report routes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRow {
    pub region: String,
    pub units: u32,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesReport {
    pub quarter: String,
    pub title: String,
    pub rows: Vec<SalesRow>,
}

impl SalesReport {
    pub fn total_units(&self) -> u32 {
        self.rows.iter().map(|row| row.units).sum()
    }

    pub fn total_revenue(&self) -> f64 {
        self.rows.iter().map(|row| row.revenue).sum()
    }
}

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];

/// Look up the report for a quarter key such as `q1`.
pub fn sales_report(quarter: &str) -> Option<SalesReport> {
    let quarter = quarter.trim().to_ascii_lowercase();
    let index: u32 = match quarter.as_str() {
        "q1" => 1,
        "q2" => 2,
        "q3" => 3,
        "q4" => 4,
        _ => return None,
    };

    let rows = REGIONS
        .iter()
        .zip(1u32..)
        .map(|(region, offset)| {
            let units = 100 * index + 25 * offset;
            SalesRow {
                region: (*region).to_string(),
                units,
                revenue: f64::from(units) * 19.5,
            }
        })
        .collect();

    Some(SalesReport {
        title: format!("Sales {}", quarter.to_ascii_uppercase()),
        quarter,
        rows,
    })
}
