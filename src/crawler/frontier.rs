//! Breadth-first crawl frontier
//!
//! Holds the FIFO queue of `(url, depth)` entries plus the visited and queued
//! sets. A URL is enqueued at most once and fetched at most once per crawl.

use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// The URL to fetch
    pub url: Url,

    /// Link distance from the seed
    pub depth: u32,
}

#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
    queued: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier holding only the seed at depth 0
    pub fn new(seed: Url) -> Self {
        let mut frontier = Self::default();
        frontier.enqueue(seed, 0);
        frontier
    }

    /// Adds a URL unless it was already visited or queued
    ///
    /// Returns `true` when the URL was added.
    pub fn enqueue(&mut self, url: Url, depth: u32) -> bool {
        let key = url.as_str().to_string();
        if self.visited.contains(&key) || !self.queued.insert(key) {
            return false;
        }
        self.queue.push_back(FrontierEntry { url, depth });
        true
    }

    /// Adds every URL at the same depth, returning how many were new
    pub fn enqueue_all(&mut self, urls: impl IntoIterator<Item = Url>, depth: u32) -> usize {
        urls.into_iter()
            .filter(|url| self.enqueue(url.clone(), depth))
            .count()
    }

    /// Pops the next unvisited entry and marks it visited
    pub fn next_unvisited(&mut self) -> Option<FrontierEntry> {
        while let Some(entry) = self.queue.pop_front() {
            if self.visited.insert(entry.url.as_str().to_string()) {
                return Some(entry);
            }
        }
        None
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
