//! Query filter construction
//!
//! Filters are field/operator/value triples joined conjunctively, rendered in
//! the table service's query syntax. Values are either timestamps or text;
//! text values have embedded quotes doubled.

use chrono::{DateTime, SecondsFormat, Utc};

/// One comparison in a query filter
#[derive(Debug, Clone)]
pub struct FilterClause {
    pub column: String,
    pub op: &'static str,
    pub value: FilterValue,
}

#[derive(Debug, Clone)]
pub enum FilterValue {
    Time(DateTime<Utc>),
    Text(String),
}

impl FilterClause {
    pub fn time(column: &str, op: &'static str, value: DateTime<Utc>) -> Self {
        Self {
            column: column.to_string(),
            op,
            value: FilterValue::Time(value),
        }
    }

    pub fn text(column: &str, op: &'static str, value: &str) -> Self {
        Self {
            column: column.to_string(),
            op,
            value: FilterValue::Text(value.to_string()),
        }
    }

    fn render(&self) -> String {
        match &self.value {
            FilterValue::Time(ts) => format!(
                "{} {} datetime'{}'",
                self.column,
                self.op,
                ts.to_rfc3339_opts(SecondsFormat::Micros, true)
            ),
            FilterValue::Text(text) => {
                format!("{} {} '{}'", self.column, self.op, text.replace('\'', "''"))
            }
        }
    }
}

/// Join clauses with `and`, each parenthesized
pub fn build_filter(clauses: &[FilterClause]) -> String {
    let rendered: Vec<String> = clauses.iter().map(FilterClause::render).collect();
    format!("({})", rendered.join(") and ("))
}
