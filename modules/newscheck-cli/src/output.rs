// Human-readable rendering for terminal output. `--json` bypasses this.

use std::fmt::Write;

use newscheck_common::{BatchOutcome, BatchResult, Details, ScoreResult, SearchResult, SignalBreakdown, UrlAnalysis};

const PREVIEW_CHARS: usize = 60;

pub fn score(result: &ScoreResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Label:      {}", result.label);
    let _ = writeln!(out, "Fake score: {:.3}", result.fake_score);
    let _ = writeln!(out, "Confidence: {:.3}", result.confidence);
    let _ = writeln!(out, "Method:     {}", result.method);

    match &result.details {
        Details::RuleBased(breakdown) => push_breakdown(&mut out, breakdown),
        Details::Transformer(model) => {
            let _ = writeln!(
                out,
                "Model:      {} ({:.3})",
                model.raw_label, model.raw_probability
            );
        }
        Details::Hybrid {
            rule_based,
            transformer,
        } => {
            push_breakdown(&mut out, rule_based);
            let _ = writeln!(
                out,
                "Model:      {} ({:.3})",
                transformer.raw_label, transformer.raw_probability
            );
        }
    }
    out
}

fn push_breakdown(out: &mut String, breakdown: &SignalBreakdown) {
    if breakdown.empty_input {
        let _ = writeln!(out, "Signals:    none (empty input)");
        return;
    }
    let _ = writeln!(out, "Signals:");
    for (name, signal) in &breakdown.signals {
        let _ = writeln!(
            out,
            "  {name:<20} {:.3} x {:.2}  {}",
            signal.value, signal.weight, signal.explanation
        );
    }
}

pub fn batch(result: &BatchResult) -> String {
    let mut out = String::new();
    for (i, item) in result.items.iter().enumerate() {
        let preview = preview(&item.input);
        match &item.outcome {
            BatchOutcome::Scored(r) => {
                let _ = writeln!(out, "{:>4}  {}  {:.3}  {preview}", i + 1, r.label, r.fake_score);
            }
            BatchOutcome::Failed(e) => {
                let _ = writeln!(out, "{:>4}  ERROR {}  {preview}", i + 1, e.message);
            }
        }
    }
    let summary = result.summary();
    let _ = writeln!(
        out,
        "\n{} texts: {} fake, {} real, {} failed",
        summary.total, summary.fake, summary.real, summary.failed
    );
    out
}

pub fn url_analysis(analysis: &UrlAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "URL:        {}", analysis.url);
    let _ = writeln!(out, "Title:      {}", analysis.title);
    if let Some(description) = &analysis.description {
        let _ = writeln!(out, "Summary:    {description}");
    }
    if let Some(strategy) = analysis.strategy {
        let _ = writeln!(out, "Extracted:  {}", strategy.as_str());
    }
    if let Some(title) = &analysis.title_analysis {
        let _ = writeln!(out, "Title:      {} ({:.3})", title.label, title.fake_score);
    }
    if let Some(content) = &analysis.content_analysis {
        let _ = writeln!(out, "Content:    {} ({:.3})", content.label, content.fake_score);
    }
    if let (Some(score), Some(label)) = (analysis.overall_fake_score, analysis.overall_label) {
        let _ = writeln!(out, "Overall:    {label} ({score:.3})");
    }
    let _ = writeln!(out, "\n{}", analysis.content_preview);
    out
}

pub fn search_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No related coverage found.\n".to_string();
    }
    let mut out = String::new();
    for (i, r) in results.iter().enumerate() {
        let _ = writeln!(out, "{}. {}\n   {}", i + 1, r.title, r.url);
        if !r.snippet.is_empty() {
            let _ = writeln!(out, "   {}", preview(&r.snippet));
        }
    }
    out
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
