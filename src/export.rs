//! CSV export of a task collection.

use chrono::NaiveDate;

use crate::dates::format_date;
use crate::fields::CustomField;
use crate::status::effective_status;
use crate::task::Task;

const HEADER: &str =
    "id,name,description,startDate,endDate,parentId,percentComplete,status,resources,notes,dependencies";

/// Quote a cell when it contains a delimiter, a quote or a line break.
fn escape_csv(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Render `tasks` as CSV, one row per task in slice order.
///
/// The status column holds the effective status as of `today`. List-valued
/// cells are joined with `;`. Each custom field adds a trailing column, blank
/// for tasks without a value.
pub fn to_csv(tasks: &[Task], fields: &[CustomField], today: NaiveDate) -> String {
    let mut out = String::with_capacity(64 * (tasks.len() + 1));
    out.push_str(HEADER);
    for f in fields {
        out.push(',');
        out.push_str(&escape_csv(&f.name));
    }
    out.push('\n');

    for t in tasks {
        let parent = t.parent_id.map(|p| p.to_string()).unwrap_or_default();
        let deps = t.dependencies.iter().map(u64::to_string).collect::<Vec<_>>().join(";");
        let row = [
            t.id.to_string(),
            escape_csv(&t.name),
            escape_csv(t.description.as_deref().unwrap_or("")),
            format_date(t.start_date),
            format_date(t.end_date),
            parent,
            t.percent_complete.to_string(),
            effective_status(t, today).label().to_string(),
            escape_csv(&t.resources.join(";")),
            escape_csv(t.notes.as_deref().unwrap_or("")),
            deps,
        ];
        out.push_str(&row.join(","));
        for f in fields {
            out.push(',');
            out.push_str(&escape_csv(t.custom_fields.get(&f.name).map(String::as_str).unwrap_or("")));
        }
        out.push('\n');
    }
    out
}
