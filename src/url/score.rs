use std::cmp::Reverse;
use url::Url;

/// Path keywords that usually lead to contact details
const PRIORITY_KEYWORDS: &[&str] = &[
    "contact", "contacto", "about", "nosotros", "soporte", "support", "equipo", "team", "help",
    "ayuda", "ventas", "sales", "service", "servicio", "press", "prensa",
];

/// Path keywords for content-heavy sections
const PENALTY_KEYWORDS: &[&str] = &[
    "blog", "news", "posts", "articulo", "article", "categoria", "category", "tag", "legal",
    "term", "privacy",
];

const PRIORITY_BONUS: i32 = 6;
const PENALTY: i32 = 2;
const SHORT_PATH_LEN: i32 = 12;

/// Links kept from one page together with the number of candidates ranked
#[derive(Debug, Clone, Default)]
pub struct RankedLinks {
    /// Highest scoring links, best first
    pub links: Vec<Url>,

    /// Eligible candidates before truncation
    pub considered: usize,
}

/// Scores a link by how likely it is to lead to contact information
///
/// | Rule | Effect |
/// |------|--------|
/// | URL has a query string | -1 |
/// | path splits into more than 5 `/` parts | -1 |
/// | each priority keyword present in the path | +6 |
/// | each penalty keyword present in the path | -2 |
/// | short path | +max(0, 12 - path length) |
pub fn score_link(url: &Url) -> i32 {
    let path_lower = url.path().to_lowercase();
    let mut score = 0;

    if url.query().is_some() {
        score -= 1;
    }

    if path_lower.split('/').count() > 5 {
        score -= 1;
    }

    score += PRIORITY_KEYWORDS
        .iter()
        .filter(|k| path_lower.contains(*k))
        .count() as i32
        * PRIORITY_BONUS;

    score -= PENALTY_KEYWORDS
        .iter()
        .filter(|k| path_lower.contains(*k))
        .count() as i32
        * PENALTY;

    let path_len = path_lower.chars().count() as i32;
    score + (SHORT_PATH_LEN - path_len).max(0)
}

/// Ranks deduplicated candidates and keeps the best `limit`
///
/// Sorting is stable, so equal scores keep first-seen order.
pub fn rank_links(candidates: Vec<Url>, limit: usize) -> RankedLinks {
    let considered = candidates.len();
    let mut scored: Vec<(i32, Url)> = candidates
        .into_iter()
        .map(|url| (score_link(&url), url))
        .collect();

    scored.sort_by_key(|(score, _)| Reverse(*score));

    RankedLinks {
        links: scored.into_iter().take(limit).map(|(_, url)| url).collect(),
        considered,
    }
}
