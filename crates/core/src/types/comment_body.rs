use crate::error::CoreError;

pub const MAX_COMMENT_CHARS: usize = 2000;

/// Comment text that has been trimmed and checked against the length limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBody(String);

impl CommentBody {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for CommentBody {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyComment);
        }
        let len = trimmed.chars().count();
        if len > MAX_COMMENT_CHARS {
            return Err(CoreError::CommentTooLong {
                max: MAX_COMMENT_CHARS,
                len,
            });
        }
        Ok(CommentBody(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let body = CommentBody::try_from("  hello \n").unwrap();
        assert_eq!(body.as_str(), "hello");
    }

    #[test]
    fn rejects_blank() {
        assert_eq!(CommentBody::try_from(" \t\n"), Err(CoreError::EmptyComment));
        assert_eq!(CommentBody::try_from(""), Err(CoreError::EmptyComment));
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let exact = "ж".repeat(MAX_COMMENT_CHARS);
        assert!(CommentBody::try_from(exact.as_str()).is_ok());

        let over = "ж".repeat(MAX_COMMENT_CHARS + 1);
        assert_eq!(
            CommentBody::try_from(over.as_str()),
            Err(CoreError::CommentTooLong {
                max: MAX_COMMENT_CHARS,
                len: MAX_COMMENT_CHARS + 1,
            })
        );
    }

    #[test]
    fn padding_does_not_count_towards_limit() {
        let padded = format!("   {}   ", "a".repeat(MAX_COMMENT_CHARS));
        assert!(CommentBody::try_from(padded.as_str()).is_ok());
    }
}
