use crate::{CacheSnapshot, CommentPassResult, Post, ProfileView, WalkResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A profile page became active; replaces any other session.
    ViewActivated { username: String, view: ProfileView },
    /// Cache lookup finished for the seeding session.
    CacheChecked {
        username: String,
        snapshot: Option<CacheSnapshot>,
    },
    /// Both seeding walks joined. `None` means that type was not requested.
    SeedFetched {
        username: String,
        posts: Option<WalkResult<Post>>,
        comments: Option<CommentPassResult>,
    },
    /// User asked for more posts.
    LoadMorePostsClicked,
    PostsLoaded {
        username: String,
        result: WalkResult<Post>,
    },
    /// User asked for more comments.
    LoadMoreCommentsClicked,
    CommentsLoaded {
        username: String,
        result: CommentPassResult,
    },
    /// The profile page was left; in-flight results for it are ignored.
    NavigatedAway,
}
