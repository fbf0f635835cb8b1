use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Opaque host token for an uploaded attachment object.
///
/// 宿主分配的附件对象令牌，用于解析临时下载地址。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentToken(String);

impl_id!(AttachmentToken);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trips_inner_string() {
        let token = AttachmentToken::new("t1");
        assert_eq!(token.clone().into_inner(), "t1".to_string());
        assert_eq!(token.as_ref(), "t1");
    }
}
