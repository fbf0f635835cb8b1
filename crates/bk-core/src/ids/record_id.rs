use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Host record (row) identifier, e.g. `recXXXX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(String);

impl_id!(RecordId);
