//! In-memory sample dataset backing the canned query results.

use serde::Serialize;

/// Data category; each intent reads exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sales,
    Inventory,
    Revenue,
    Salary,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Inventory => "inventory",
            Self::Revenue => "revenue",
            Self::Salary => "salary",
        }
    }

    /// Name of the dimension the category's rows are keyed by.
    pub fn dimension(&self) -> &'static str {
        match self {
            Self::Sales => "customer",
            Self::Inventory => "product",
            Self::Revenue => "region",
            Self::Salary => "department",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single sample data point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRow {
    pub category: Category,
    pub dimension: String,
    pub value: f64,
}

impl DatasetRow {
    fn new(category: Category, dimension: &str, value: f64) -> Self {
        Self {
            category,
            dimension: dimension.to_string(),
            value,
        }
    }
}

/// Fixed sample rows, built once and shared read-only.
#[derive(Debug, Clone)]
pub struct SampleDataset {
    rows: Vec<DatasetRow>,
}

impl Default for SampleDataset {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SampleDataset {
    /// The built-in demo dataset.
    pub fn builtin() -> Self {
        use Category::*;

        let rows = vec![
            // Total sales amount per customer.
            DatasetRow::new(Sales, "Acme Corp", 98_450.0),
            DatasetRow::new(Sales, "Globex", 87_120.0),
            DatasetRow::new(Sales, "Initech", 64_300.0),
            DatasetRow::new(Sales, "Umbrella", 59_875.0),
            DatasetRow::new(Sales, "Stark Industries", 51_240.0),
            DatasetRow::new(Sales, "Wayne Enterprises", 43_980.0),
            DatasetRow::new(Sales, "Hooli", 28_610.0),
            DatasetRow::new(Sales, "Vandelay Imports", 12_450.0),
            // Units on hand per product.
            DatasetRow::new(Inventory, "USB-C Cable", 42.0),
            DatasetRow::new(Inventory, "Desk Lamp", 87.0),
            DatasetRow::new(Inventory, "Wireless Mouse", 15.0),
            DatasetRow::new(Inventory, "Office Chair", 150.0),
            DatasetRow::new(Inventory, "27\" Monitor", 64.0),
            DatasetRow::new(Inventory, "Mechanical Keyboard", 230.0),
            DatasetRow::new(Inventory, "Standing Desk", 100.0),
            DatasetRow::new(Inventory, "Webcam", 310.0),
            // Customer revenue per region.
            DatasetRow::new(Revenue, "North", 412_500.0),
            DatasetRow::new(Revenue, "South", 298_750.0),
            DatasetRow::new(Revenue, "East", 356_200.0),
            DatasetRow::new(Revenue, "West", 389_900.0),
            // Average salary per department.
            DatasetRow::new(Salary, "Engineering", 118_000.0),
            DatasetRow::new(Salary, "Operations", 82_500.0),
            DatasetRow::new(Salary, "Marketing", 76_000.0),
            DatasetRow::new(Salary, "Finance", 91_250.0),
            DatasetRow::new(Salary, "Support", 58_400.0),
        ];

        Self { rows }
    }

    /// Rows of one category, in table order.
    pub fn rows(&self, category: Category) -> impl Iterator<Item = &DatasetRow> {
        self.rows.iter().filter(move |row| row.category == category)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
