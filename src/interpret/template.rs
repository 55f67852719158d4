//! Deterministic templated narrative. Also the fallback whenever the
//! generative client is disabled, rate-limited or failing.

use super::InterpretationRequest;
use crate::eigen::resolve_placements;
use crate::model::Orientation;

pub const STRONG_BAND: f64 = 0.70;
pub const BALANCED_BAND: f64 = 0.40;

/// Coarse label for an eigenvalue.
pub fn band(eigenvalue: f64) -> &'static str {
    if eigenvalue >= STRONG_BAND {
        "strong"
    } else if eigenvalue >= BALANCED_BAND {
        "balanced"
    } else {
        "subtle"
    }
}

fn band_text(eigenvalue: f64) -> &'static str {
    match band(eigenvalue) {
        "strong" => "the cards speak clearly and with one voice.",
        "balanced" => "the reading holds both promise and tension; weigh each position.",
        _ => "the message is quiet; look for small shifts rather than big events.",
    }
}

/// One line per resolved placement, then an overall line.
pub fn interpret(req: &InterpretationRequest<'_>) -> String {
    let mut lines = Vec::new();
    if let Some(q) = req.question.filter(|q| !q.trim().is_empty()) {
        lines.push(format!("Question: {}", q.trim()));
    }

    for r in resolve_placements(req.placements, req.cards, req.positions) {
        let orientation = Orientation::from_reversed(r.placement.is_reversed);
        let meaning = r.card.meaning_for(r.placement.is_reversed);
        let mut line = format!("{}: {} ({}).", r.position.name, r.card.name, orientation);
        if !meaning.is_empty() {
            line.push(' ');
            line.push_str(meaning);
        }
        lines.push(line);
    }

    lines.push(format!(
        "Overall energy {:.2} ({}): {}",
        req.eigenvalue,
        band(req.eigenvalue),
        band_text(req.eigenvalue)
    ));
    lines.join("\n")
}

/// Prompt for the generative client. Carries the same facts the template uses.
pub fn build_prompt(req: &InterpretationRequest<'_>) -> String {
    let mut out = String::new();
    if let Some(q) = req.question.filter(|q| !q.trim().is_empty()) {
        out.push_str(&format!("Question: {}\n", q.trim()));
    }
    out.push_str("Cards:\n");
    for r in resolve_placements(req.placements, req.cards, req.positions) {
        let keywords = r.card.keywords_for(r.placement.is_reversed).join(", ");
        out.push_str(&format!(
            "- {} ({}): {} {} [{}]\n",
            r.position.name,
            r.position.meaning,
            r.card.name,
            Orientation::from_reversed(r.placement.is_reversed),
            keywords
        ));
    }
    out.push_str(&format!(
        "Reading energy: {:.2} ({})",
        req.eigenvalue,
        band(req.eigenvalue)
    ));
    out
}
