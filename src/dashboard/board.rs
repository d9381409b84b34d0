//! In-memory collection of media requests keyed by IMDb id

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;

use crate::models::{MediaRequest, MediaType, RequestPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Title,
    MediaType,
    Status,
    Channel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Search, filter and sort settings for [`RequestBoard::query`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    /// Case-insensitive substring of title or requester
    pub search: Option<String>,
    pub media_type: Option<MediaType>,
    pub status: Option<String>,
    pub channel: Option<String>,
    pub sort: SortField,
    pub direction: SortDirection,
}

impl RequestFilter {
    /// Selecting the current sort field flips the direction; a new field sorts ascending.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort == field {
            self.direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
        } else {
            self.sort = field;
            self.direction = SortDirection::Ascending;
        }
    }

    fn matches(&self, request: &MediaRequest) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            if !request.title.to_lowercase().contains(&needle)
                && !request.requester.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        self.media_type.is_none_or(|t| request.media_type == t)
            && self.status.as_deref().is_none_or(|s| request.status == s)
            && self.channel.as_deref().is_none_or(|c| request.channel == c)
    }

    fn sort_key(&self, request: &MediaRequest) -> String {
        match self.sort {
            SortField::Title => request.title.to_lowercase(),
            SortField::MediaType => request.media_type.as_str().to_string(),
            SortField::Status => request.status.to_lowercase(),
            SortField::Channel => request.channel.to_lowercase(),
        }
    }
}

/// Headline counts shown above the request list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BoardStats {
    pub total: usize,
    pub movies: usize,
    pub tv_shows: usize,
    pub downloading: usize,
}

/// Owned list of media requests. No two entries share an `imdb_id`.
#[derive(Debug, Clone, Default)]
pub struct RequestBoard {
    requests: Vec<MediaRequest>,
}

impl RequestBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[MediaRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn get(&self, imdb_id: &str) -> Option<&MediaRequest> {
        self.requests.iter().find(|r| r.imdb_id == imdb_id)
    }

    /// Appends requests whose `imdb_id` is non-empty and not yet on the board.
    /// Returns how many were added.
    pub fn merge_new(&mut self, incoming: impl IntoIterator<Item = MediaRequest>) -> usize {
        let mut known: HashSet<String> =
            self.requests.iter().map(|r| r.imdb_id.clone()).collect();
        let before = self.requests.len();

        for request in incoming {
            if !request.imdb_id.is_empty() && known.insert(request.imdb_id.clone()) {
                self.requests.push(request);
            }
        }

        self.requests.len() - before
    }

    /// Inserts `request`, or replaces the entry with the same `imdb_id`.
    /// Requests without an id are ignored. Returns `true` if the board changed.
    pub fn upsert(&mut self, request: MediaRequest) -> bool {
        if request.imdb_id.is_empty() {
            return false;
        }

        match self.requests.iter_mut().find(|r| r.imdb_id == request.imdb_id) {
            Some(existing) => *existing = request,
            None => self.requests.push(request),
        }
        true
    }

    /// Overlays `patch` on the request with `imdb_id`. Returns `false` if absent.
    pub fn apply_patch(&mut self, imdb_id: &str, patch: &RequestPatch) -> bool {
        match self.requests.iter_mut().find(|r| r.imdb_id == imdb_id) {
            Some(existing) => {
                existing.apply(patch);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, imdb_id: &str) -> Option<MediaRequest> {
        let index = self.requests.iter().position(|r| r.imdb_id == imdb_id)?;
        Some(self.requests.remove(index))
    }

    /// Requests matching `filter`, sorted by its field and direction
    pub fn query(&self, filter: &RequestFilter) -> Vec<&MediaRequest> {
        let mut items: Vec<&MediaRequest> =
            self.requests.iter().filter(|r| filter.matches(r)).collect();

        items.sort_by(|a, b| {
            let ordering: Ordering = filter.sort_key(a).cmp(&filter.sort_key(b));
            match filter.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        items
    }

    pub fn stats(&self) -> BoardStats {
        BoardStats {
            total: self.requests.len(),
            movies: self
                .requests
                .iter()
                .filter(|r| r.media_type == MediaType::Movie)
                .count(),
            tv_shows: self
                .requests
                .iter()
                .filter(|r| r.media_type == MediaType::TvShow)
                .count(),
            downloading: self
                .requests
                .iter()
                .filter(|r| r.status == "downloading")
                .count(),
        }
    }
}
