//! URL handling module for Contact-Harvest
//!
//! This module provides URL normalization, site-domain extraction, the link
//! scope filter and the link scorer used to bound crawl breadth.

mod domain;
mod normalize;
mod score;
mod scope;

// Re-export main functions
pub use domain::{matches_site, site_domain};
pub use normalize::{ensure_scheme, normalize_url, short_label};
pub use scope::ScopeFilter;
pub use score::{rank_links, score_link, RankedLinks};
