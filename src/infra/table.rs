//! Header-driven parsing of the Census "array of arrays" response format.
//!
//! Row 0 names the columns, every following row is data. Columns are looked
//! up by name, never by position, and a missing required column is an error.

use serde_json::Value;

use super::census::FetchError;
use crate::domain::FlowRow;

pub const COUNTRY_CODE: &str = "CTY_CODE";
pub const COUNTRY_NAME: &str = "CTY_NAME";

/// A validated tabular payload: a header plus rows of matching width.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn from_json(value: Value) -> Result<Self, FetchError> {
        let Value::Array(mut outer) = value else {
            return Err(FetchError::Payload("expected a JSON array of rows".into()));
        };
        if outer.is_empty() {
            return Err(FetchError::Payload("missing header row".into()));
        }

        let header = match outer.remove(0) {
            Value::Array(cells) => cells
                .into_iter()
                .map(|cell| match cell {
                    Value::String(name) => Ok(name),
                    other => Err(FetchError::Payload(format!(
                        "header cell is not a string: {other}"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            other => {
                return Err(FetchError::Payload(format!(
                    "header row is not an array: {other}"
                )))
            }
        };

        let rows = outer
            .into_iter()
            .enumerate()
            .map(|(index, row)| match row {
                Value::Array(cells) if cells.len() == header.len() => Ok(cells),
                Value::Array(cells) => Err(FetchError::Payload(format!(
                    "row {} has {} cells, header has {}",
                    index + 1,
                    cells.len(),
                    header.len()
                ))),
                other => Err(FetchError::Payload(format!(
                    "row {} is not an array: {other}",
                    index + 1
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { header, rows })
    }

    /// Position of `name` in the header.
    pub fn column(&self, name: &str) -> Result<usize, FetchError> {
        self.header
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| FetchError::MissingColumn(name.to_string()))
    }
}

/// Maps the named columns of one trade-flow response onto [`FlowRow`]s.
#[derive(Clone, Copy, Debug)]
pub struct FlowSchema {
    pub value_column: &'static str,
}

impl FlowSchema {
    pub const EXPORTS: FlowSchema = FlowSchema {
        value_column: "ALL_VAL_YR",
    };
    pub const IMPORTS: FlowSchema = FlowSchema {
        value_column: "GEN_VAL_YR",
    };

    /// Columns to request in the `get` query parameter.
    pub fn get_param(&self) -> String {
        format!("{COUNTRY_CODE},{COUNTRY_NAME},{}", self.value_column)
    }

    pub fn parse(&self, table: &Table) -> Result<Vec<FlowRow>, FetchError> {
        let code_idx = table.column(COUNTRY_CODE)?;
        let name_idx = table.column(COUNTRY_NAME)?;
        let value_idx = table.column(self.value_column)?;

        table
            .rows
            .iter()
            .map(|row| -> Result<FlowRow, FetchError> {
                let country_code = text_cell(&row[code_idx], COUNTRY_CODE)?;
                let country_name = text_cell(&row[name_idx], COUNTRY_NAME)?;
                let value_usd = value_cell(&row[value_idx], self.value_column, &country_code)?;
                Ok(FlowRow::new(country_code, country_name, value_usd))
            })
            .collect()
    }
}

fn text_cell(cell: &Value, column: &str) -> Result<String, FetchError> {
    match cell {
        Value::String(text) => Ok(text.trim().to_string()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(FetchError::InvalidValue {
            column: column.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Dollar amount cell. Null and blank count as zero.
fn value_cell(cell: &Value, column: &str, country_code: &str) -> Result<f64, FetchError> {
    let invalid = || FetchError::InvalidValue {
        column: column.to_string(),
        value: format!("{cell} (country {country_code})"),
    };
    let amount = match cell {
        Value::Null => return Ok(0.0),
        Value::Number(number) => number.as_f64().ok_or_else(invalid)?,
        Value::String(text) if text.trim().is_empty() => return Ok(0.0),
        Value::String(text) => text.trim().parse::<f64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(invalid())
    }
}
