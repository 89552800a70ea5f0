//! Crawl phase definitions
//!
//! The coordinator walks one listing page at a time through
//! `Start → FetchingPage → (HasNewPosts → ProcessingPosts → Saved → NextPage | NoPosts → Stopped)`.
//! A page whose posts are all known already goes straight to `NextPage`.

use std::fmt;

/// Represents the current phase of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Nothing fetched yet
    Start,

    /// A listing page (or its alternate URL) is being fetched and extracted
    FetchingPage,

    /// The page produced posts not seen before
    HasNewPosts,

    /// Detail bodies of the new posts are being fetched
    ProcessingPosts,

    /// The collection has been persisted for this page
    Saved,

    /// Moving on to the following listing page
    NextPage,

    /// The page produced no candidates at all
    NoPosts,

    // ===== Terminal State =====
    /// The crawl is over
    Stopped,
}

impl CrawlPhase {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Returns true if the crawl may move from `self` to `next`
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;
        matches!(
            (self, next),
            (Start, FetchingPage)
                | (Start, Stopped)
                | (FetchingPage, HasNewPosts)
                | (FetchingPage, NoPosts)
                | (FetchingPage, NextPage)
                | (HasNewPosts, ProcessingPosts)
                | (ProcessingPosts, Saved)
                | (Saved, NextPage)
                | (Saved, Stopped)
                | (NextPage, FetchingPage)
                | (NextPage, Stopped)
                | (NoPosts, Stopped)
        )
    }

    /// Stable lowercase name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::FetchingPage => "fetching_page",
            Self::HasNewPosts => "has_new_posts",
            Self::ProcessingPosts => "processing_posts",
            Self::Saved => "saved",
            Self::NextPage => "next_page",
            Self::NoPosts => "no_posts",
            Self::Stopped => "stopped",
        }
    }

    /// Returns all phases
    pub fn all_phases() -> Vec<Self> {
        vec![
            Self::Start,
            Self::FetchingPage,
            Self::HasNewPosts,
            Self::ProcessingPosts,
            Self::Saved,
            Self::NextPage,
            Self::NoPosts,
            Self::Stopped,
        ]
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a crawl stopped; the first matching condition wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// A page (and its alternate URL) produced no candidates
    NoPosts,

    /// A per-page post cap is configured, so only one page is processed
    PerPageCap,

    /// Fewer new posts than extracted candidates: treated as the last page
    PartialPage,

    /// The configured page ceiling was reached
    PageCeiling,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoPosts => "no_posts",
            Self::PerPageCap => "per_page_cap",
            Self::PartialPage => "partial_page",
            Self::PageCeiling => "page_ceiling",
        }
    }

    /// Human readable explanation for the run summary
    pub fn describe(&self) -> &'static str {
        match self {
            Self::NoPosts => "no posts found on the page",
            Self::PerPageCap => "per-page post limit reached",
            Self::PartialPage => "page had already-known posts, assumed last page",
            Self::PageCeiling => "page limit reached",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
