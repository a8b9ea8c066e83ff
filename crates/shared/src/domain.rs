use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// Field name reserved for the synthetic row identifier.
pub const ROW_ID_FIELD: &str = "id";

/// A backend row before normalization: field name to scalar value.
pub type RawRow = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDescriptor {
    pub report_id: String,
    pub report_name: String,
}

/// Selection entry shown in the report picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOption {
    pub label: String,
    pub value: String,
}

impl From<&ReportDescriptor> for ReportOption {
    fn from(descriptor: &ReportDescriptor) -> Self {
        Self {
            label: descriptor.report_name.clone(),
            value: descriptor.report_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    pub field_name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
}

/// Normalized row carrying a synthetic `row-<index>` id.
///
/// The id is unique within one result set and never comes from backend data:
/// any `id` field in the raw row is dropped when the row is built, and a
/// column bound to `id` shows the synthetic value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    id: Value,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl ReportRow {
    pub fn from_raw(index: usize, mut raw: RawRow) -> Self {
        raw.remove(ROW_ID_FIELD);
        Self {
            id: Value::String(format!("row-{index}")),
            fields: raw,
        }
    }

    pub fn id(&self) -> &str {
        self.id.as_str().unwrap_or_default()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, field_name: &str) -> Option<&Value> {
        if field_name == ROW_ID_FIELD {
            return Some(&self.id);
        }
        self.fields.get(field_name)
    }
}

/// Executed report payload as returned by the backend.
///
/// `total_records` is authoritative even when `rows` was truncated in transit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub rows: Option<Vec<RawRow>>,
    #[serde(default, deserialize_with = "record_count")]
    pub total_records: u64,
}

impl ReportResult {
    pub fn has_rows(&self) -> bool {
        self.rows.as_ref().is_some_and(|rows| !rows.is_empty())
    }
}

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `null` (as 0) and whole-number floats such as `50.0`.
fn record_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<Number>::deserialize(deserializer)? else {
        return Ok(0);
    };
    if let Some(count) = number.as_u64() {
        return Ok(count);
    }
    match number.as_f64() {
        Some(count) if count >= 0.0 && count.fract() == 0.0 && count <= u64::MAX as f64 => {
            Ok(count as u64)
        }
        _ => Err(de::Error::custom(format!(
            "totalRecords must be a non-negative whole number, got {number}"
        ))),
    }
}

/// Read-only view of the committed session, handed to hosting pages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSnapshot {
    pub report_id: String,
    pub report_name: String,
    pub data: Vec<ReportRow>,
    pub columns: Vec<ColumnSpec>,
    pub total_records: u64,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
