use crate::rewrite::spec::QueryValue;
use anyhow::{Result, anyhow};
use serde_yaml::{Mapping, Value};

/// Convert a YAML scalar into a query value: strings (`%N` included),
/// booleans and numbers.
pub fn parse_query_value(value: &Value) -> Result<QueryValue> {
    match value {
        Value::String(text) => Ok(QueryValue::parse(text)),
        Value::Bool(flag) => Ok(QueryValue::from(*flag)),
        Value::Number(number) => Ok(QueryValue::Literal(number.to_string())),
        Value::Null => Ok(QueryValue::Literal(String::new())),
        other => Err(anyhow!("Query values must be scalars, got: {:?}", other)),
    }
}

/// Parse a `query` mapping, keeping the order it was written in.
pub fn parse_query(mapping: &Mapping) -> Result<Vec<(String, QueryValue)>> {
    let mut query = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let key = key
            .as_str()
            .ok_or_else(|| anyhow!("Query variable names must be strings, got: {:?}", key))?;
        if key.is_empty() {
            anyhow::bail!("Query variable names must not be empty");
        }
        query.push((key.to_string(), parse_query_value(value)?));
    }
    Ok(query)
}
