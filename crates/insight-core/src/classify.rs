//! Query classification: `classify`, `explain`, and `validate`.
//!
//! All three share the same normalization and the same priority-ordered
//! keyword matching from [`crate::intent::RULES`]; they differ only in what
//! they return. None of them touch mutable state, so a single engine can be
//! shared across any number of concurrent requests.

use serde::Serialize;

use crate::dataset::{DatasetRow, SampleDataset};
use crate::error::QueryError;
use crate::intent::{Intent, IntentRule, RULES, RuleMatch};

/// Lowercase the text and collapse every whitespace run to a single space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Structured answer to a recognized query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub original_query: String,
    pub normalized_query: String,
    pub intent: Intent,
    pub matched_dimension: &'static str,
    /// Illustrative SQL for the lookup that produced `rows`.
    pub translated_query: String,
    pub rows: Vec<DatasetRow>,
    pub explanation: String,
}

/// Why a query was interpreted the way it was, without any data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub original_query: String,
    pub intent: Intent,
    pub matched_keywords: Vec<String>,
    pub explanation: String,
    pub steps: Vec<String>,
}

/// Feasibility report for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub original_query: String,
    pub feasible: bool,
    /// Matched intent when feasible, closest partial match otherwise.
    pub intent: Option<Intent>,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Keyword-driven dispatcher over the sample dataset.
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    dataset: SampleDataset,
}

impl QueryEngine {
    pub fn new(dataset: SampleDataset) -> Self {
        Self { dataset }
    }

    /// Match the query and return the canned rows for its intent.
    pub fn classify(&self, query: &str) -> Result<QueryResult, QueryError> {
        let normalized = normalized_input(query)?;
        let (rule, _) = first_match(&normalized)?;
        let output = rule.run(&self.dataset, &normalized);

        Ok(QueryResult {
            original_query: query.to_string(),
            intent: rule.intent,
            matched_dimension: rule.intent.category().dimension(),
            translated_query: output.translated_query,
            rows: output.rows,
            explanation: format!(
                "Interpreted as a {} query. {}",
                rule.intent.label(),
                output.summary
            ),
            normalized_query: normalized,
        })
    }

    /// Match the query and describe the interpretation.
    pub fn explain(&self, query: &str) -> Result<Explanation, QueryError> {
        let normalized = normalized_input(query)?;
        let (rule, evaluation) = first_match(&normalized)?;
        let output = rule.run(&self.dataset, &normalized);
        let intent = rule.intent;

        let quoted: Vec<String> = evaluation.matched.iter().map(|k| format!("'{k}'")).collect();
        let steps = vec![
            "Received natural language query".to_string(),
            format!("Normalized text to '{normalized}'"),
            format!(
                "Checked intents in priority order; '{intent}' matched on {}",
                quoted.join(", ")
            ),
            format!(
                "Mapped the request to the '{}' dimension of the {} data",
                intent.category().dimension(),
                intent.category()
            ),
            format!("Constructed structured query: {}", output.translated_query),
        ];

        Ok(Explanation {
            original_query: query.to_string(),
            intent,
            explanation: format!(
                "The query was interpreted as a {} request because it mentions {}. {}",
                intent.label(),
                quoted.join(" and "),
                output.summary
            ),
            matched_keywords: evaluation.matched.iter().map(|k| k.to_string()).collect(),
            steps,
        })
    }

    /// Report whether the query can be answered and what it lacks if not.
    pub fn validate(&self, query: &str) -> Result<Validation, QueryError> {
        let normalized = normalized_input(query)?;
        let evaluations: Vec<(&IntentRule, RuleMatch)> = RULES
            .iter()
            .map(|rule| (rule, rule.evaluate(&normalized)))
            .collect();

        if let Some((rule, _)) = evaluations.iter().find(|(_, m)| m.is_full()) {
            return Ok(Validation {
                original_query: query.to_string(),
                feasible: true,
                intent: Some(rule.intent),
                missing_keywords: Vec::new(),
                suggestions: Vec::new(),
            });
        }

        // Most satisfied groups wins; ties go to the higher-priority rule.
        let mut closest: Option<&(&IntentRule, RuleMatch)> = None;
        for candidate in &evaluations {
            let score = candidate.1.matched.len();
            if score > 0 && closest.is_none_or(|best| score > best.1.matched.len()) {
                closest = Some(candidate);
            }
        }

        let validation = match closest {
            Some((rule, evaluation)) => Validation {
                original_query: query.to_string(),
                feasible: false,
                intent: Some(rule.intent),
                missing_keywords: evaluation.missing.iter().map(|k| k.to_string()).collect(),
                suggestions: vec![format!(
                    "Mention {} in the query, e.g. '{}'",
                    evaluation.missing.join(" and "),
                    rule.intent.example()
                )],
            },
            None => Validation {
                original_query: query.to_string(),
                feasible: false,
                intent: None,
                missing_keywords: RULES
                    .iter()
                    .filter_map(|rule| rule.groups.first())
                    .map(|group| group.name.to_string())
                    .collect(),
                suggestions: RULES
                    .iter()
                    .map(|rule| format!("Try a query like '{}'", rule.intent.example()))
                    .collect(),
            },
        };

        tracing::debug!(
            query = %normalized,
            closest = ?validation.intent,
            missing = ?validation.missing_keywords,
            "query not feasible"
        );
        Ok(validation)
    }
}

fn normalized_input(query: &str) -> Result<String, QueryError> {
    let normalized = normalize(query);
    if normalized.is_empty() {
        return Err(QueryError::EmptyQuery);
    }
    Ok(normalized)
}

fn first_match(normalized: &str) -> Result<(&'static IntentRule, RuleMatch), QueryError> {
    RULES
        .iter()
        .map(|rule| (rule, rule.evaluate(normalized)))
        .find(|(_, evaluation)| evaluation.is_full())
        .ok_or_else(|| {
            tracing::debug!(query = %normalized, "no intent matched");
            QueryError::UnrecognizedQuery {
                normalized: normalized.to_string(),
            }
        })
}
