//! Relevance ranking of fetched pages against norm targets.
//!
//! Two phases:
//!
//! 1. **Strict.** A page survives only if the first article it cites is one
//!    of the target articles and it cites no other article explicitly.
//!    Survivors are scored and ranked.
//! 2. **Soft.** If strict filtering keeps fewer than `min_keep` pages, every
//!    page is scored (no veto) and the best `max(min_keep, 2)` are returned.
//!
//! Scores sum over all targets: +4 article match, +2 code match, +1 part
//! match. Ties break on snippet length, longer first.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::LazyLock;

use lexru_core::norm::{NormTarget, normalize_code};
use lexru_core::patterns::norms;
use lexru_core::{FetchedPage, RankedPage, dedup_by_url};
use regex::Regex;
use tracing::info;

const ARTICLE_WEIGHT: i32 = 4;
const CODE_WEIGHT: i32 = 2;
const PART_WEIGHT: i32 = 1;

/// Soft ranking never returns fewer than this many pages when available.
const SOFT_FLOOR: usize = 2;

static ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(norms::ARTICLE).expect("valid article regex"));
static PART: LazyLock<Regex> = LazyLock::new(|| Regex::new(norms::PART).expect("valid part regex"));
static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(norms::CODE).expect("valid code regex"));

/// The first code, article and part cited in a text. Absent values are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormMention {
    pub code: String,
    pub article: String,
    pub part: String,
}

/// Extract the first code name, article and part from `s`.
pub fn parse_norms_from_text(s: &str) -> NormMention {
    let first = |re: &Regex| {
        re.captures(s)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    };
    let code = first(&CODE);
    NormMention {
        code: if code.is_empty() {
            code
        } else {
            normalize_code(&code)
        },
        article: first(&ARTICLE),
        part: first(&PART),
    }
}

/// Sum of per-target contributions for one mention.
pub fn score_mention(mention: &NormMention, targets: &[NormTarget]) -> i32 {
    let matches = |a: &str, b: &str| !a.is_empty() && !b.is_empty() && a == b;
    targets
        .iter()
        .map(|t| {
            let mut score = 0;
            if matches(&t.article, &mention.article) {
                score += ARTICLE_WEIGHT;
            }
            if matches(&t.code, &mention.code) {
                score += CODE_WEIGHT;
            }
            if matches(&t.part, &mention.part) {
                score += PART_WEIGHT;
            }
            score
        })
        .sum()
}

/// Lowercased title, snippet and URL: the text a page is judged on.
fn haystack(page: &FetchedPage) -> String {
    format!("{} {} {}", page.title, page.snippet, page.url).to_lowercase()
}

pub fn score_page(page: &FetchedPage, targets: &[NormTarget]) -> i32 {
    score_mention(&parse_norms_from_text(&haystack(page)), targets)
}

/// True when `text` explicitly cites an article outside `target_articles`.
///
/// Every "ст. N" counts, including passing references to adjacent articles.
fn mentions_unrelated_article(text: &str, target_articles: &HashSet<&str>) -> bool {
    ARTICLE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .any(|m| !target_articles.contains(m.as_str()))
}

fn by_score_then_length(a: &RankedPage, b: &RankedPage) -> Ordering {
    let key = |p: &RankedPage| (p.score, p.page.snippet.chars().count());
    key(b).cmp(&key(a))
}

fn rank(mut ranked: Vec<RankedPage>, keep: usize) -> Vec<RankedPage> {
    ranked.sort_by(by_score_then_length);
    dedup_by_url(ranked, keep)
}

/// Filter and rank `pages` against `targets`.
///
/// Returns at most `max_keep` pages. With no targets there is nothing to
/// score against and the first `max_keep` pages are returned as is.
/// `strict = false` skips the strict phase. `min_keep` above `max_keep` is
/// clamped to `max_keep`.
pub fn filter_and_rank_pages(
    pages: &[FetchedPage],
    targets: &[NormTarget],
    min_keep: usize,
    max_keep: usize,
    strict: bool,
) -> Vec<RankedPage> {
    if pages.is_empty() {
        return Vec::new();
    }
    if targets.is_empty() {
        return pages
            .iter()
            .take(max_keep)
            .map(|p| RankedPage {
                page: p.clone(),
                score: 0,
            })
            .collect();
    }
    let min_keep = min_keep.min(max_keep);

    if strict {
        let target_articles: HashSet<&str> = targets
            .iter()
            .map(|t| t.article.as_str())
            .filter(|a| !a.is_empty())
            .collect();

        let survivors: Vec<RankedPage> = pages
            .iter()
            .filter_map(|p| {
                let text = haystack(p);
                let mention = parse_norms_from_text(&text);
                if mention.article.is_empty()
                    || !target_articles.contains(mention.article.as_str())
                    || mentions_unrelated_article(&text, &target_articles)
                {
                    return None;
                }
                Some(RankedPage {
                    page: p.clone(),
                    score: score_mention(&mention, targets),
                })
            })
            .collect();

        let kept = rank(survivors, max_keep);
        info!(
            pages = pages.len(),
            kept = kept.len(),
            min_keep,
            "strict relevance filter"
        );
        if kept.len() >= min_keep {
            return kept;
        }
    }

    let scored: Vec<RankedPage> = pages
        .iter()
        .map(|p| RankedPage {
            page: p.clone(),
            score: score_page(p, targets),
        })
        .collect();
    let kept = rank(scored, min_keep.max(SOFT_FLOOR).min(max_keep));
    info!(kept = kept.len(), "soft relevance fallback");
    kept
}
