/// Result of toggling a like on a post or a comment.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LikeOutcome {
    pub(crate) like_count: i64,
    pub(crate) has_liked: bool,
}
