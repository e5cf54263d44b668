use std::fmt;
use std::str::FromStr;

use url::Url;

/// Which record type a search query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Posts,
    Comments,
}

impl RecordKind {
    pub fn as_query_type(self) -> &'static str {
        match self {
            RecordKind::Posts => "posts",
            RecordKind::Comments => "comments",
        }
    }
}

/// Sort order of a search query. Comment searches cycle through all of them;
/// post searches only ever use [`SortVariant::New`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SortVariant {
    New,
    Relevance,
    Top,
}

impl SortVariant {
    /// Priority order used when falling back across comment variants.
    pub const ALL: [SortVariant; 3] = [SortVariant::New, SortVariant::Relevance, SortVariant::Top];

    pub fn as_str(self) -> &'static str {
        match self {
            SortVariant::New => "new",
            SortVariant::Relevance => "relevance",
            SortVariant::Top => "top",
        }
    }
}

impl fmt::Display for SortVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(SortVariant::New),
            "relevance" => Ok(SortVariant::Relevance),
            "top" => Ok(SortVariant::Top),
            other => Err(format!("unknown sort variant: {other}")),
        }
    }
}

/// Which part of a profile is being looked at; decides which record types are needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileView {
    #[default]
    Overview,
    Posts,
    Comments,
}

impl ProfileView {
    pub fn needs_posts(self) -> bool {
        matches!(self, ProfileView::Overview | ProfileView::Posts)
    }

    pub fn needs_comments(self) -> bool {
        matches!(self, ProfileView::Overview | ProfileView::Comments)
    }
}

impl FromStr for ProfileView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(ProfileView::Overview),
            "posts" | "submitted" => Ok(ProfileView::Posts),
            "comments" => Ok(ProfileView::Comments),
            other => Err(format!("unknown profile view: {other}")),
        }
    }
}

/// Opaque absolute URL of the next page of one specific query variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<Url> for Cursor {
    fn from(url: Url) -> Self {
        Self(url.into())
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// First page of the author search for `username` on `origin`.
pub fn search_url(origin: &Url, username: &str, kind: RecordKind, sort: SortVariant) -> Cursor {
    let mut url = origin.clone();
    url.set_path("/search/");
    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut()
        .append_pair("q", &format!("author:{username}"))
        .append_pair("type", kind.as_query_type())
        .append_pair("sort", sort.as_str());
    Cursor::from(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_encodes_author_query() {
        let origin = Url::parse("https://www.reddit.com").unwrap();
        let url = search_url(&origin, "some_user", RecordKind::Comments, SortVariant::Top);
        assert_eq!(
            url.as_str(),
            "https://www.reddit.com/search/?q=author%3Asome_user&type=comments&sort=top"
        );
    }

    #[test]
    fn views_select_record_types() {
        assert!(ProfileView::Overview.needs_posts() && ProfileView::Overview.needs_comments());
        assert!(!ProfileView::Comments.needs_posts());
        assert!(!ProfileView::Posts.needs_comments());
    }

    #[test]
    fn variants_parse_case_insensitively() {
        assert_eq!("Relevance".parse::<SortVariant>(), Ok(SortVariant::Relevance));
        assert!("hot".parse::<SortVariant>().is_err());
    }
}
