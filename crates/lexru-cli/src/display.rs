//! Terminal rendering for search hits, fetched pages, rankings and checks.
//!
//! Every command also supports `--json`, which bypasses these helpers and
//! prints the underlying records with [`print_json`].

use lexru_ai::QualityReport;
use lexru_core::{Confidence, FetchedPage, NormTarget, RankedPage, SearchHit};
use serde::Serialize;

/// Characters of snippet shown per item.
const SNIPPET_PREVIEW: usize = 160;

// ── Public API ──

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_hits(hits: &[SearchHit]) {
    println!("=== {} search results ===", hits.len());
    println!();
    for (i, hit) in hits.iter().enumerate() {
        println!("{:>2}. {}", i + 1, label(&hit.title, &hit.url));
        println!("    {}", hit.url);
        if !hit.snippet.is_empty() {
            println!("    {}", preview(&hit.snippet));
        }
    }
}

pub fn print_page(page: &FetchedPage) {
    println!("=== {} ===", page.title);
    println!();
    println!("  {:<26} {}", "url", page.url);
    println!("  {:<26} {}", "text_chars", page.text.chars().count());
    println!("  {:<26} {}", "snippet_chars", page.snippet.chars().count());
    println!();
    println!("{}", page.snippet);
}

pub fn print_targets(targets: &[NormTarget]) {
    if targets.is_empty() {
        println!("Norm targets: (none)");
        return;
    }
    println!("Norm targets");
    for t in targets {
        let part = if t.part.is_empty() { "-" } else { &t.part };
        println!(
            "  {:<10} ст. {:<8} ч. {:<4} {}",
            t.code, t.article, part, t.term
        );
    }
    println!();
}

pub fn print_ranked(ranked: &[RankedPage]) {
    println!("=== {} ranked pages ===", ranked.len());
    println!();
    for (i, r) in ranked.iter().enumerate() {
        println!(
            "{:>2}. [{:>3}] {}",
            i + 1,
            r.score,
            label(&r.page.title, &r.page.url)
        );
        println!("    {}", r.page.url);
        println!("    {}", preview(&r.page.snippet));
    }
}

pub fn print_quality(report: &QualityReport, used_sources: usize) {
    let confidence = Confidence::derive(used_sources, report.passes());
    println!("Quality check");
    println!("  {:<26} {}", "citations", report.citations.len());
    for c in &report.citations {
        println!("    {c}");
    }
    println!("  {:<26} {}", "sanction", yes_no(report.has_sanction));
    println!("  {:<26} {}", "amendment", yes_no(report.has_amendment));
    println!("  {:<26} {}", "passes", yes_no(report.passes()));
    println!(
        "  {:<26} {} (with {used_sources} sources)",
        "confidence",
        confidence.label_ru()
    );
}

// ── Helpers ──

fn label<'a>(title: &'a str, url: &'a str) -> &'a str {
    if title.trim().is_empty() { url } else { title }
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

fn preview(s: &str) -> String {
    match s.char_indices().nth(SNIPPET_PREVIEW) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_cuts_on_char_boundary() {
        let s = "ж".repeat(SNIPPET_PREVIEW + 5);
        let p = preview(&s);
        assert_eq!(p.chars().count(), SNIPPET_PREVIEW + 1);
        assert!(p.ends_with('…'));
        assert_eq!(preview("коротко"), "коротко");
    }

    #[test]
    fn label_falls_back_to_url() {
        assert_eq!(label("  ", "https://a"), "https://a");
        assert_eq!(label("КоАП", "https://a"), "КоАП");
    }
}
