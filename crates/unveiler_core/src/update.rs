use crate::state::ProfileSession;
use crate::{AppState, Effect, LoadKind, Msg, Notice, RecordKind, SessionPhase};

/// Pure update function: applies a message to state and returns any effects.
///
/// Results tagged with a username other than the active session's, or arriving
/// when the session is not waiting for them, are dropped.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ViewActivated { username, view } => {
            let unchanged = state.session().is_some_and(|session| {
                session.username() == username && session.view() == view
            });
            if unchanged {
                return (state, Vec::new());
            }
            state.replace_session(Some(ProfileSession::new(username.clone(), view)));
            vec![Effect::ReadCache { username }]
        }
        Msg::CacheChecked { username, snapshot } => {
            let Some(session) = state.session_for(&username) else {
                return (state, Vec::new());
            };
            if session.phase() != SessionPhase::Seeding {
                return (state, Vec::new());
            }

            let view = session.view();
            let (posts, comments) = match snapshot {
                Some(snapshot) => {
                    session.adopt(snapshot);
                    let need_posts = view.needs_posts() && session.posts().is_empty();
                    let need_comments = view.needs_comments() && session.comments().is_empty();
                    if need_posts {
                        session.reset_posts();
                    }
                    if need_comments {
                        session.reset_comments();
                    }
                    (need_posts, need_comments)
                }
                None => (view.needs_posts(), view.needs_comments()),
            };

            let effects = if posts || comments {
                session.set_phase(SessionPhase::Loading(LoadKind::Seed));
                vec![Effect::SeedFetch {
                    username,
                    posts,
                    comments,
                }]
            } else {
                session.finish_seed();
                Vec::new()
            };
            state.mark_dirty();
            effects
        }
        Msg::SeedFetched {
            username,
            posts,
            comments,
        } => {
            let Some(session) = state.session_for(&username) else {
                return (state, Vec::new());
            };
            if session.phase() != SessionPhase::Loading(LoadKind::Seed) {
                return (state, Vec::new());
            }
            if let Some(result) = posts {
                session.apply_posts(result);
            }
            if let Some(result) = comments {
                session.apply_comments(result);
            }
            session.finish_seed();
            let snapshot = session.snapshot();
            state.mark_dirty();
            vec![Effect::WriteCache { username, snapshot }]
        }
        Msg::LoadMorePostsClicked => {
            let Some(session) = state.session_mut() else {
                return (state, Vec::new());
            };
            if session.phase() != SessionPhase::Ready {
                return (state, Vec::new());
            }
            let effects = match session.posts_cursor().cloned() {
                Some(cursor) => {
                    session.set_notice(None);
                    session.set_phase(SessionPhase::Loading(LoadKind::MorePosts));
                    vec![Effect::FetchMorePosts {
                        username: session.username().to_string(),
                        cursor,
                        posts: session.posts_set().clone(),
                    }]
                }
                None => {
                    session.set_notice(Some(Notice::NothingToLoad(RecordKind::Posts)));
                    Vec::new()
                }
            };
            state.mark_dirty();
            effects
        }
        Msg::PostsLoaded { username, result } => {
            let Some(session) = state.session_for(&username) else {
                return (state, Vec::new());
            };
            if session.phase() != SessionPhase::Loading(LoadKind::MorePosts) {
                return (state, Vec::new());
            }
            session.apply_posts(result);
            session.set_phase(SessionPhase::Ready);
            let snapshot = session.snapshot();
            state.mark_dirty();
            vec![Effect::WriteCache { username, snapshot }]
        }
        Msg::LoadMoreCommentsClicked => {
            let Some(session) = state.session_mut() else {
                return (state, Vec::new());
            };
            if session.phase() != SessionPhase::Ready {
                return (state, Vec::new());
            }
            let effects = if session.comment_sources().can_continue() {
                session.set_notice(None);
                session.set_phase(SessionPhase::Loading(LoadKind::MoreComments));
                vec![Effect::FetchMoreComments {
                    username: session.username().to_string(),
                    sources: session.comment_sources().clone(),
                }]
            } else {
                session.set_notice(Some(Notice::NothingToLoad(RecordKind::Comments)));
                Vec::new()
            };
            state.mark_dirty();
            effects
        }
        Msg::CommentsLoaded { username, result } => {
            let Some(session) = state.session_for(&username) else {
                return (state, Vec::new());
            };
            if session.phase() != SessionPhase::Loading(LoadKind::MoreComments) {
                return (state, Vec::new());
            }
            session.apply_comments(result);
            session.set_phase(SessionPhase::Ready);
            let snapshot = session.snapshot();
            state.mark_dirty();
            vec![Effect::WriteCache { username, snapshot }]
        }
        Msg::NavigatedAway => {
            if state.session().is_some() {
                state.replace_session(None);
            }
            Vec::new()
        }
    };

    (state, effects)
}
