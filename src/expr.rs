//! Row-level boolean expressions for `filter --filter-expr`.
//!
//! Each column is bound twice: under its normalized name (`Order ID` becomes
//! `order_id`) and positionally as `c0`, `c1`, …. Cells are bound with the
//! evalexpr type matching the column's scalar type when they parse, and as
//! strings otherwise.

use anyhow::{Context, Result};
use evalexpr::{
    ContextWithMutableFunctions, ContextWithMutableVariables, Function, HashMapContext,
    Value as EvalValue, eval_with_context,
};

use crate::{
    data::{normalize_column_name, parse_double, parse_integer},
    table::Table,
    types::ScalarType,
};

fn register_functions(context: &mut HashMapContext) -> Result<()> {
    context
        .set_function(
            "is_null".into(),
            Function::new(|argument| {
                let empty = match argument {
                    EvalValue::String(s) => s.is_empty(),
                    EvalValue::Empty => true,
                    _ => false,
                };
                Ok(EvalValue::Boolean(empty))
            }),
        )
        .map_err(anyhow::Error::from)?;
    Ok(())
}

fn cell_to_evalexpr(cell: &str, data_type: ScalarType) -> EvalValue {
    match data_type {
        ScalarType::Integer => parse_integer(cell)
            .map(EvalValue::Int)
            .unwrap_or_else(|| EvalValue::String(cell.to_string())),
        ScalarType::Double => parse_double(cell)
            .map(EvalValue::Float)
            .unwrap_or_else(|| EvalValue::String(cell.to_string())),
        ScalarType::Boolean if cell.eq_ignore_ascii_case("true") => EvalValue::Boolean(true),
        ScalarType::Boolean if cell.eq_ignore_ascii_case("false") => EvalValue::Boolean(false),
        _ => EvalValue::String(cell.to_string()),
    }
}

pub fn build_context(table: &Table, row: usize) -> Result<HashMapContext> {
    let mut context = HashMapContext::new();
    register_functions(&mut context)?;
    for (idx, column) in table.columns().iter().enumerate() {
        let value = cell_to_evalexpr(column.get(row).unwrap_or_default(), column.data_type);
        context
            .set_value(normalize_column_name(&column.name), value.clone())
            .with_context(|| format!("Binding column '{}'", column.name))?;
        context
            .set_value(format!("c{idx}"), value)
            .with_context(|| format!("Binding column index {idx}"))?;
    }
    context
        .set_value("row_number".to_string(), EvalValue::Int(row as i64 + 1))
        .context("Binding row_number")?;
    Ok(context)
}

pub fn evaluate_row(table: &Table, expressions: &[String], row: usize) -> Result<bool> {
    if expressions.is_empty() {
        return Ok(true);
    }
    let context = build_context(table, row)?;
    for expression in expressions {
        if !evaluate_expression_to_bool(expression, &context)? {
            return Ok(false);
        }
    }
    Ok(true)
}

pub fn evaluate_expression_to_bool(expr: &str, context: &HashMapContext) -> Result<bool> {
    let result = eval_with_context(expr, context)
        .with_context(|| format!("Evaluating expression '{expr}'"))?;
    Ok(eval_value_truthy(result))
}

pub fn eval_value_truthy(value: EvalValue) -> bool {
    match value {
        EvalValue::Boolean(b) => b,
        EvalValue::Int(i) => i != 0,
        EvalValue::Float(f) => f != 0.0,
        EvalValue::String(s) => !s.is_empty(),
        EvalValue::Tuple(values) => values.into_iter().any(eval_value_truthy),
        EvalValue::Empty => false,
    }
}
