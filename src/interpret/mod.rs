//! Reading interpretation: generative narrative when available, template otherwise.

pub mod ai_adapter;
pub mod template;

use metrics::counter;
use serde::Serialize;
use tracing::{debug, warn};

use crate::model::{Card, CardPlacement, SpreadPosition};
pub use ai_adapter::{build_client_from_config, DisabledClient, DynNarrativeClient, NarrativeClient};

/// Borrowed view of a scored reading.
#[derive(Debug, Clone, Copy)]
pub struct InterpretationRequest<'a> {
    pub question: Option<&'a str>,
    pub placements: &'a [CardPlacement],
    pub cards: &'a [Card],
    pub positions: &'a [SpreadPosition],
    pub eigenvalue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpretationSource {
    Generated,
    Template,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interpretation {
    pub text: String,
    pub source: InterpretationSource,
    pub provider: &'static str,
}

pub struct Interpreter {
    client: DynNarrativeClient,
}

impl Interpreter {
    pub fn new(client: DynNarrativeClient) -> Self {
        Self { client }
    }

    /// Template only.
    pub fn template_only() -> Self {
        Self::new(std::sync::Arc::new(DisabledClient))
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    pub async fn interpret(&self, req: &InterpretationRequest<'_>) -> Interpretation {
        let provider = self.client.provider_name();
        if provider != "disabled" {
            let prompt = template::build_prompt(req);
            match self.client.narrate(&prompt).await {
                Some(n) => {
                    debug!(provider, "generated interpretation");
                    return Interpretation {
                        text: n.text,
                        source: InterpretationSource::Generated,
                        provider,
                    };
                }
                None => {
                    warn!(provider, "narration unavailable; using template");
                    counter!("interpretation_fallback_total").increment(1);
                }
            }
        }

        Interpretation {
            text: template::interpret(req),
            source: InterpretationSource::Template,
            provider: "template",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ai_adapter::{CachingClient, MockProvider};
    use super::*;
    use crate::catalog;
    use std::sync::Arc;

    fn sample() -> Vec<CardPlacement> {
        vec![CardPlacement::upright("major_17_the_star", "single_0")]
    }

    #[tokio::test]
    async fn template_only_uses_template() {
        let placements = sample();
        let req = InterpretationRequest {
            question: None,
            placements: &placements,
            cards: catalog::cards(),
            positions: catalog::positions_for("single"),
            eigenvalue: 0.8,
        };
        let out = Interpreter::template_only().interpret(&req).await;
        assert_eq!(out.source, InterpretationSource::Template);
        assert!(out.text.starts_with("Focus: The Star (Upright)."));
    }

    #[tokio::test]
    async fn generated_then_fallback_when_limit_spent() {
        let dir = tempfile::tempdir().unwrap();
        let client = CachingClient::new(MockProvider::new("Hope returns."), dir.path().into(), 1);
        let interpreter = Interpreter::new(Arc::new(client));
        let placements = sample();
        let positions = catalog::positions_for("single");

        let mut req = InterpretationRequest {
            question: Some("first"),
            placements: &placements,
            cards: catalog::cards(),
            positions,
            eigenvalue: 0.8,
        };
        let out = interpreter.interpret(&req).await;
        assert_eq!(out.source, InterpretationSource::Generated);
        assert_eq!(out.text, "Hope returns.");
        assert_eq!(out.provider, "mock");

        req.question = Some("second");
        let out = interpreter.interpret(&req).await;
        assert_eq!(out.source, InterpretationSource::Template);
        assert!(out.text.contains("The Star"));
    }
}
