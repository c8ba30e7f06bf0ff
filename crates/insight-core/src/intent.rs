//! Query intents and their keyword rules.
//!
//! The dispatcher is a static, priority-ordered list of rules. Each rule
//! pairs a set of keyword groups with a handler that shapes the dataset rows
//! for that intent. A rule matches when every one of its groups has at least
//! one synonym present as a substring of the normalized text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::dataset::{Category, DatasetRow, SampleDataset};

/// One of the fixed, recognized query categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Sales,
    Inventory,
    Revenue,
    Salary,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Inventory => "inventory",
            Self::Revenue => "revenue",
            Self::Salary => "salary",
        }
    }

    /// Dataset category read by this intent.
    pub fn category(&self) -> Category {
        match self {
            Self::Sales => Category::Sales,
            Self::Inventory => Category::Inventory,
            Self::Revenue => Category::Revenue,
            Self::Salary => Category::Salary,
        }
    }

    /// Human-readable description of the kind of question.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sales => "sales ranking",
            Self::Inventory => "inventory threshold",
            Self::Revenue => "revenue comparison",
            Self::Salary => "salary average",
        }
    }

    /// A phrasing this intent is known to accept.
    pub fn example(&self) -> &'static str {
        match self {
            Self::Sales => "Show the top 5 customers by sales",
            Self::Inventory => "List products with inventory under 100",
            Self::Revenue => "Compare revenue by region",
            Self::Salary => "What is the average salary by department",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A required concept and the substrings that count as mentioning it.
#[derive(Debug)]
pub struct KeywordGroup {
    /// Canonical name reported when the group is missing.
    pub name: &'static str,
    pub synonyms: &'static [&'static str],
}

impl KeywordGroup {
    /// First synonym found in `text`.
    pub fn find(&self, text: &str) -> Option<&'static str> {
        self.synonyms.iter().copied().find(|s| text.contains(s))
    }
}

/// Rows and presentation produced by an intent handler.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutput {
    pub rows: Vec<DatasetRow>,
    /// Illustrative SQL equivalent of the canned lookup.
    pub translated_query: String,
    /// One-sentence description of what the rows show.
    pub summary: String,
}

type Handler = fn(&SampleDataset, &str) -> HandlerOutput;

/// Keyword evaluation of one rule against a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Synonyms found, one per satisfied group.
    pub matched: Vec<&'static str>,
    /// Canonical names of unsatisfied groups.
    pub missing: Vec<&'static str>,
}

impl RuleMatch {
    pub fn is_full(&self) -> bool {
        self.missing.is_empty()
    }
}

/// An intent with its keyword groups and handler.
pub struct IntentRule {
    pub intent: Intent,
    pub groups: &'static [KeywordGroup],
    handler: Handler,
}

impl IntentRule {
    pub fn evaluate(&self, text: &str) -> RuleMatch {
        let mut matched = Vec::new();
        let mut missing = Vec::new();
        for group in self.groups {
            match group.find(text) {
                Some(keyword) => matched.push(keyword),
                None => missing.push(group.name),
            }
        }
        RuleMatch { matched, missing }
    }

    pub fn run(&self, dataset: &SampleDataset, text: &str) -> HandlerOutput {
        (self.handler)(dataset, text)
    }
}

/// All rules, in priority order. The first full match wins.
pub static RULES: [IntentRule; 4] = [
    IntentRule {
        intent: Intent::Sales,
        groups: &[KeywordGroup {
            name: "sales",
            synonyms: &["sales", "sale", "sold", "customer", "order", "purchase"],
        }],
        handler: sales_ranking,
    },
    IntentRule {
        intent: Intent::Inventory,
        groups: &[
            KeywordGroup {
                name: "inventory",
                synonyms: &["inventory", "stock"],
            },
            KeywordGroup {
                name: "threshold",
                synonyms: &[
                    "under",
                    "below",
                    "less than",
                    "fewer than",
                    "over",
                    "above",
                    "more than",
                    "greater than",
                ],
            },
        ],
        handler: inventory_threshold,
    },
    IntentRule {
        intent: Intent::Revenue,
        groups: &[
            KeywordGroup {
                name: "revenue",
                synonyms: &["revenue", "income", "earnings"],
            },
            KeywordGroup {
                name: "comparison",
                synonyms: &[
                    "compare",
                    "comparison",
                    "versus",
                    "vs",
                    "by region",
                    "per region",
                    "breakdown",
                ],
            },
        ],
        handler: revenue_comparison,
    },
    IntentRule {
        intent: Intent::Salary,
        groups: &[
            KeywordGroup {
                name: "salary",
                synonyms: &["salary", "salaries", "pay", "compensation", "wage"],
            },
            KeywordGroup {
                name: "average",
                synonyms: &["average", "avg", "mean"],
            },
        ],
        handler: salary_average,
    },
];

static RANKING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(top|bottom)\s+(\d+)\b").expect("ranking regex should compile")
});

static THRESHOLD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(under|below|less than|fewer than|over|above|more than|greater than)\s+(\d+(?:\.\d+)?)",
    )
    .expect("threshold regex should compile")
});

const REGIONS: &[&str] = &["north", "south", "east", "west"];

fn sort_descending(rows: &mut [DatasetRow]) {
    rows.sort_by(|a, b| b.value.total_cmp(&a.value));
}

fn sort_ascending(rows: &mut [DatasetRow]) {
    rows.sort_by(|a, b| a.value.total_cmp(&b.value));
}

/// Rows whose dimension is named in the text, or all rows when none is.
fn named_or_all(
    rows: Vec<DatasetRow>,
    text: &str,
    allowed: impl Fn(&str) -> bool,
) -> Vec<DatasetRow> {
    let named: Vec<DatasetRow> = rows
        .iter()
        .filter(|row| {
            let name = row.dimension.to_lowercase();
            allowed(name.as_str()) && text.contains(name.as_str())
        })
        .cloned()
        .collect();
    if named.is_empty() { rows } else { named }
}

fn sql_in_list(rows: &[DatasetRow]) -> String {
    rows.iter()
        .map(|row| format!("'{}'", row.dimension))
        .collect::<Vec<_>>()
        .join(", ")
}

fn human_list(rows: &[DatasetRow]) -> String {
    let names: Vec<&str> = rows.iter().map(|row| row.dimension.as_str()).collect();
    match names.as_slice() {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn sales_ranking(dataset: &SampleDataset, text: &str) -> HandlerOutput {
    let mut rows: Vec<DatasetRow> = dataset.rows(Category::Sales).cloned().collect();

    let ranking = RANKING_REGEX.captures(text).and_then(|caps| {
        let limit = caps[2].parse::<usize>().ok()?;
        Some((&caps[1] == "bottom", limit))
    });

    match ranking {
        Some((true, _)) => sort_ascending(&mut rows),
        _ => sort_descending(&mut rows),
    }

    let (order, limit_clause, summary) = match ranking {
        Some((bottom, limit)) => {
            rows.truncate(limit);
            let (order, word) = if bottom { ("ASC", "Bottom") } else { ("DESC", "Top") };
            (
                order,
                format!(" LIMIT {limit}"),
                format!("{word} {limit} customers by total sales."),
            )
        }
        None => ("DESC", String::new(), "Customers ranked by total sales.".to_string()),
    };

    HandlerOutput {
        rows,
        translated_query: format!(
            "SELECT customer, SUM(amount) AS total_sales FROM sales GROUP BY customer ORDER BY total_sales {order}{limit_clause}"
        ),
        summary,
    }
}

fn inventory_threshold(dataset: &SampleDataset, text: &str) -> HandlerOutput {
    let mut rows: Vec<DatasetRow> = dataset.rows(Category::Inventory).cloned().collect();

    let threshold = THRESHOLD_REGEX.captures(text).and_then(|caps| {
        let value = caps[2].parse::<f64>().ok()?;
        let below = matches!(&caps[1], "under" | "below" | "less than" | "fewer than");
        Some((below, value))
    });

    let (where_clause, summary) = match threshold {
        Some((below, value)) => {
            rows.retain(|row| if below { row.value < value } else { row.value > value });
            let (op, word) = if below { ("<", "below") } else { (">", "above") };
            (
                format!(" WHERE inventory {op} {value}"),
                format!("Products with inventory {word} {value} units."),
            )
        }
        None => (String::new(), "Inventory levels for all products.".to_string()),
    };
    sort_ascending(&mut rows);

    HandlerOutput {
        rows,
        translated_query: format!(
            "SELECT name, inventory FROM products{where_clause} ORDER BY inventory ASC"
        ),
        summary,
    }
}

fn revenue_comparison(dataset: &SampleDataset, text: &str) -> HandlerOutput {
    let rows: Vec<DatasetRow> = dataset.rows(Category::Revenue).cloned().collect();
    let total = rows.len();
    let mut rows = named_or_all(rows, text, |name| REGIONS.contains(&name));
    sort_descending(&mut rows);

    let (where_clause, summary) = if rows.len() < total {
        (
            format!(" WHERE region IN ({})", sql_in_list(&rows)),
            format!("Revenue compared across {}.", human_list(&rows)),
        )
    } else {
        (String::new(), "Revenue compared across all regions.".to_string())
    };

    HandlerOutput {
        rows,
        translated_query: format!(
            "SELECT region, SUM(revenue) AS total_revenue FROM customers{where_clause} GROUP BY region ORDER BY total_revenue DESC"
        ),
        summary,
    }
}

fn salary_average(dataset: &SampleDataset, text: &str) -> HandlerOutput {
    let rows: Vec<DatasetRow> = dataset.rows(Category::Salary).cloned().collect();
    let total = rows.len();
    let mut rows = named_or_all(rows, text, |_| true);
    sort_descending(&mut rows);

    let (where_clause, summary) = if rows.len() < total {
        (
            format!(" WHERE department IN ({})", sql_in_list(&rows)),
            format!("Average salary in {}.", human_list(&rows)),
        )
    } else {
        (String::new(), "Average salary per department.".to_string())
    };

    HandlerOutput {
        rows,
        translated_query: format!(
            "SELECT department, AVG(salary) AS avg_salary FROM employees{where_clause} GROUP BY department ORDER BY avg_salary DESC"
        ),
        summary,
    }
}
