//! Host selection and field metadata.
//! 宿主的选区与字段元数据。

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::ids::{FieldId, RecordId};

/// Raw selection reported by the host. Either id may be missing, for
/// example when a whole column header or nothing at all is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub field_id: Option<FieldId>,
    pub record_id: Option<RecordId>,
}

impl Selection {
    pub fn new(field_id: Option<FieldId>, record_id: Option<RecordId>) -> Self {
        Self {
            field_id,
            record_id,
        }
    }

    pub fn cell(field_id: impl Into<FieldId>, record_id: impl Into<RecordId>) -> Self {
        Self {
            field_id: Some(field_id.into()),
            record_id: Some(record_id.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// A usable scope only exists when both a field and a record are selected.
    pub fn scope(&self) -> Option<SelectionScope> {
        match (&self.field_id, &self.record_id) {
            (Some(field_id), Some(record_id)) => Some(SelectionScope {
                field_id: field_id.clone(),
                record_id: record_id.clone(),
            }),
            _ => None,
        }
    }
}

/// A selection with both ids present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionScope {
    pub field_id: FieldId,
    pub record_id: RecordId,
}

/// How far a resolution reaches from the selected cell.
///
/// - `Cell`: only the selected record
/// - `Field`: every record of the active table for the selected field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    #[default]
    Cell,
    Field,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Cell => "cell",
            ScanMode::Field => "field",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cell" => Ok(ScanMode::Cell),
            "field" => Ok(ScanMode::Field),
            other => Err(anyhow::anyhow!("unknown scan mode: {other:?}")),
        }
    }
}

/// Integer field type code declared by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldType(pub i32);

impl FieldType {
    /// Well-known code of the attachment column type.
    pub const ATTACHMENT: FieldType = FieldType(17);

    pub fn is_attachment(&self) -> bool {
        *self == Self::ATTACHMENT
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    pub id: FieldId,
    pub name: String,
    pub field_type: FieldType,
}
