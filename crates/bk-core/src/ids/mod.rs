//! ID type wrappers for type safety.
//! 类型安全的 ID 包装。

mod attachment_token;
mod field_id;
mod id_macro;
mod record_id;

pub use attachment_token::AttachmentToken;
pub use field_id::FieldId;
pub use record_id::RecordId;
