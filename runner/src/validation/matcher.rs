//! Field matcher: binds fieldset fields to file columns by name.
//!
//! Matching is name-driven. Column order is a separate constraint checked
//! on top of the name matching, only when the fieldset asks for it.

use std::collections::HashSet;

use crate::schema::{ExtraColumnsPolicy, Field, FieldsetSchema, ValidationFailure};

/// Which column each field is bound to, plus the unclaimed columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Column index per field, in field declaration order.
    columns: Vec<Option<usize>>,
    /// Column indexes claimed by no field, left to right.
    extra: Vec<usize>,
    /// Structural (file-level) failures found while matching.
    pub failures: Vec<ValidationFailure>,
}

impl MatchResult {
    /// Column bound to the field at `field_index`.
    pub fn column(&self, field_index: usize) -> Option<usize> {
        self.columns.get(field_index).copied().flatten()
    }

    /// Header name bound to the field at `field_index`.
    pub fn header<'h>(&self, field_index: usize, headers: &'h [String]) -> Option<&'h str> {
        self.column(field_index)
            .and_then(|c| headers.get(c))
            .map(String::as_str)
    }

    pub fn extra_columns(&self) -> &[usize] {
        &self.extra
    }

    /// Header names of the unclaimed columns; indexes outside `headers` are skipped.
    pub fn extra_headers<'h>(&self, headers: &'h [String]) -> Vec<&'h str> {
        self.extra
            .iter()
            .filter_map(|&c| headers.get(c))
            .map(String::as_str)
            .collect()
    }
}

fn names_equal(field: &Field, header: &str) -> bool {
    if field.case_sensitive {
        field.name == header
    } else {
        field.name.to_lowercase() == header.to_lowercase()
    }
}

/// Match a fieldset against a file's headers.
///
/// Each field takes the leftmost header with an equal name that no earlier
/// field has claimed. Missing required columns, out-of-order columns and
/// disallowed extra columns are reported in [`MatchResult::failures`].
pub fn match_fields(fieldset: &FieldsetSchema, headers: &[String]) -> MatchResult {
    let mut claimed = vec![false; headers.len()];
    let mut columns = Vec::with_capacity(fieldset.fields.len());

    for field in &fieldset.fields {
        let column = headers
            .iter()
            .enumerate()
            .find(|(i, h)| !claimed[*i] && names_equal(field, h))
            .map(|(i, _)| i);
        if let Some(i) = column {
            claimed[i] = true;
        }
        columns.push(column);
    }

    let extra: Vec<usize> = (0..headers.len()).filter(|&i| !claimed[i]).collect();

    let mut result = MatchResult {
        columns,
        extra,
        failures: Vec::new(),
    };
    result.failures = structural_failures(fieldset, headers, &result);
    result
}

fn structural_failures(
    fieldset: &FieldsetSchema,
    headers: &[String],
    matched: &MatchResult,
) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();

    for (i, field) in fieldset.fields.iter().enumerate() {
        if field.required && matched.column(i).is_none() {
            failures.push(ValidationFailure::file_level(format!(
                "Missing required column `{}`",
                field.name
            )));
        }
    }

    if fieldset.order_matters {
        for column in out_of_order_columns(matched) {
            failures.push(ValidationFailure::file_level(format!(
                "Column `{}` out of expected order",
                headers[column]
            )));
        }
    }

    match fieldset.allow_extra_columns {
        ExtraColumnsPolicy::Anywhere => {}
        ExtraColumnsPolicy::No => {
            let mut extra = matched.extra_headers(headers);
            extra.sort_unstable();
            for header in extra {
                failures.push(ValidationFailure::file_level(format!(
                    "Column `{}` is not allowed by fieldset `{}`",
                    header, fieldset.name
                )));
            }
        }
        ExtraColumnsPolicy::OnlyAfterSchemaFields => {
            if let Some(last_bound) = matched.columns.iter().flatten().max() {
                for &column in matched.extra.iter().filter(|&&c| c < *last_bound) {
                    failures.push(ValidationFailure::file_level(format!(
                        "Column `{}` must come after the columns of fieldset `{}`",
                        headers[column], fieldset.name
                    )));
                }
            }
        }
    }

    failures
}

/// Bound columns that break the declared field order, in field order.
///
/// Keeps the longest run of bound fields whose columns already increase and
/// reports the rest, so one misplaced column yields one failure.
fn out_of_order_columns(matched: &MatchResult) -> Vec<usize> {
    let bound: Vec<(usize, usize)> = matched
        .columns
        .iter()
        .enumerate()
        .filter_map(|(field, column)| column.map(|c| (field, c)))
        .collect();

    if bound.len() < 2 {
        return Vec::new();
    }

    // Longest increasing subsequence over column positions
    let mut length = vec![1usize; bound.len()];
    let mut previous: Vec<Option<usize>> = vec![None; bound.len()];
    for i in 0..bound.len() {
        for j in 0..i {
            if bound[j].1 < bound[i].1 && length[j] + 1 > length[i] {
                length[i] = length[j] + 1;
                previous[i] = Some(j);
            }
        }
    }

    let mut end = 0;
    for i in 1..bound.len() {
        if length[i] > length[end] {
            end = i;
        }
    }

    let mut kept = HashSet::new();
    let mut cursor = Some(end);
    while let Some(i) = cursor {
        kept.insert(i);
        cursor = previous[i];
    }

    (0..bound.len())
        .filter(|i| !kept.contains(i))
        .map(|i| bound[i].1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn messages(result: &MatchResult) -> Vec<&str> {
        result.failures.iter().map(|f| f.message.as_str()).collect()
    }

    #[test]
    fn test_match_by_name_any_position() {
        let fieldset = FieldsetSchema::new(
            "grades",
            vec![Field::new("subject"), Field::new("grade")],
        );
        let hdrs = headers(&["grade", "studentName", "subject"]);
        let result = match_fields(&fieldset, &hdrs);

        assert_eq!(result.header(0, &hdrs), Some("subject"));
        assert_eq!(result.header(1, &hdrs), Some("grade"));
        assert_eq!(result.extra_headers(&hdrs), vec!["studentName"]);
        assert!(result.failures.is_empty());
    }

    #[test]
    fn test_extra_headers_with_shorter_slice() {
        let fieldset = FieldsetSchema::new("loose", vec![Field::new("a")]);
        let hdrs = headers(&["a", "x", "y"]);
        let result = match_fields(&fieldset, &hdrs);

        assert_eq!(result.extra_headers(&hdrs[..2]), vec!["x"]);
        assert!(result.extra_headers(&[]).is_empty());
    }

    #[test]
    fn test_case_sensitivity() {
        let fieldset = FieldsetSchema::new(
            "names",
            vec![Field::new("Name").case_insensitive(), Field::new("Code")],
        );
        let hdrs = headers(&["NAME", "code"]);
        let result = match_fields(&fieldset, &hdrs);

        assert_eq!(result.column(0), Some(0));
        assert_eq!(result.column(1), None);
    }

    #[test]
    fn test_one_to_one_matching() {
        let fieldset = FieldsetSchema::new(
            "pairs",
            vec![Field::new("x").case_insensitive(), Field::new("X").case_insensitive()],
        );
        let hdrs = headers(&["X", "x"]);
        let result = match_fields(&fieldset, &hdrs);

        assert_eq!(result.column(0), Some(0));
        assert_eq!(result.column(1), Some(1));
    }

    #[test]
    fn test_missing_required_column() {
        let fieldset = FieldsetSchema::new(
            "names",
            vec![Field::new("studentName").required(), Field::new("nickname")],
        );
        let result = match_fields(&fieldset, &headers(&["subject"]));

        assert_eq!(messages(&result), vec!["Missing required column `studentName`"]);
        assert!(result.failures[0].is_file_level());
    }

    #[test]
    fn test_order_violation_reports_misplaced_column_only() {
        let fieldset = FieldsetSchema::new(
            "ordered",
            vec![Field::new("a"), Field::new("b"), Field::new("c")],
        )
        .ordered();
        let result = match_fields(&fieldset, &headers(&["b", "c", "a"]));

        assert_eq!(messages(&result), vec!["Column `a` out of expected order"]);
    }

    #[test]
    fn test_order_ignores_extra_and_missing_columns() {
        let fieldset = FieldsetSchema::new(
            "ordered",
            vec![Field::new("a"), Field::new("b"), Field::new("c")],
        )
        .ordered();
        let result = match_fields(&fieldset, &headers(&["a", "extra", "c"]));
        assert!(result.failures.is_empty());
    }

    #[test]
    fn test_unordered_fieldset_ignores_order() {
        let fieldset = FieldsetSchema::new("free", vec![Field::new("a"), Field::new("b")]);
        let result = match_fields(&fieldset, &headers(&["b", "a"]));
        assert!(result.failures.is_empty());
    }

    #[test]
    fn test_no_extra_columns() {
        let fieldset = FieldsetSchema::new("strict", vec![Field::new("a")])
            .extra_columns(ExtraColumnsPolicy::No);
        let result = match_fields(&fieldset, &headers(&["z", "a", "b"]));

        assert_eq!(
            messages(&result),
            vec![
                "Column `b` is not allowed by fieldset `strict`",
                "Column `z` is not allowed by fieldset `strict`",
            ]
        );
    }

    #[test]
    fn test_extra_columns_only_after_schema_fields() {
        let fieldset = FieldsetSchema::new("trailing", vec![Field::new("a"), Field::new("b")])
            .extra_columns(ExtraColumnsPolicy::OnlyAfterSchemaFields);

        let ok = match_fields(&fieldset, &headers(&["a", "b", "notes"]));
        assert!(ok.failures.is_empty());

        let bad = match_fields(&fieldset, &headers(&["a", "notes", "b", "more"]));
        assert_eq!(
            messages(&bad),
            vec!["Column `notes` must come after the columns of fieldset `trailing`"]
        );
    }

    #[test]
    fn test_extra_columns_anywhere() {
        let fieldset = FieldsetSchema::new("loose", vec![Field::new("a")]);
        let result = match_fields(&fieldset, &headers(&["x", "a", "y"]));
        assert!(result.failures.is_empty());
        assert_eq!(result.extra_columns(), &[0, 2]);
    }
}
