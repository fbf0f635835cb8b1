use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Host field (column) identifier, e.g. `fldXXXX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId(String);

impl_id!(FieldId);
