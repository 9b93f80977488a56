//! Cell data type coercion.
//!
//! | type | accepted text |
//! |------|---------------|
//! | `any`, `string` | anything |
//! | `number` | a float, e.g. `1`, `-2.5`, `1e3` |
//! | `integer` | a signed 64-bit integer |
//! | `boolean` | `true`, `false`, `yes`, `no`, `1`, `0` (any case) |
//! | `timestamp` | a date-time, date or time in the field's strftime format |
//!
//! Surrounding whitespace is ignored for every type but `string`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::schema::DataType;

const BOOLEAN_VALUES: [&str; 6] = ["true", "false", "yes", "no", "1", "0"];

/// Whether `raw` can be coerced to `data_type`.
pub fn is_valid(data_type: &DataType, raw: &str) -> bool {
    let value = raw.trim();
    match data_type {
        DataType::Any | DataType::String => true,
        DataType::Number => value.parse::<f64>().is_ok(),
        DataType::Integer => value.parse::<i64>().is_ok(),
        DataType::Boolean => {
            let lower = value.to_lowercase();
            BOOLEAN_VALUES.contains(&lower.as_str())
        }
        DataType::Timestamp { date_time_format } => is_timestamp(value, date_time_format),
    }
}

fn is_timestamp(value: &str, format: &str) -> bool {
    NaiveDateTime::parse_from_str(value, format).is_ok()
        || DateTime::parse_from_str(value, format).is_ok()
        || NaiveDate::parse_from_str(value, format).is_ok()
        || NaiveTime::parse_from_str(value, format).is_ok()
}

/// Text listing every data type, for `--help`-style output.
pub fn data_types_description() -> String {
    r#"Supported data types (dataTypeValidation.dataType):

| Type | Accepted values |
|------|-----------------|
| any | anything |
| string | anything |
| number | a decimal number: 1, -2.5, 1e3 |
| integer | a whole number: 42, -7 |
| boolean | true, false, yes, no, 1, 0 (any case) |
| timestamp | text matching dateTimeFormat (strftime), e.g. "%Y-%m-%d" |

Extra column policies (allowExtraColumns):

| Policy | Meaning |
|--------|---------|
| no | every column not named by a field is a failure |
| anywhere | columns not named by a field are always accepted |
| onlyAfterSchemaFields | columns not named by a field must follow every schema column |

Empty cells are checked only for allowEmptyValues; they skip allowed-value and
data type checks."#
        .to_string()
}
