//! The disproval loop.
//!
//! Rather than looking for proof, the model is asked what evidence a true
//! claim would leave behind, then searches for support, for contradictions
//! and for gaps, and finally weighs the three. Every request is bounded by
//! the step timeout and tried once; the first failure ends the run.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::data::{Evidence, EvidenceKind, EvidenceStrength, Verdict, VerdictKind};
use crate::reasoning::ai::{AiClient, AiClientMetadata};
use crate::reasoning::error::ReasoningError;
use crate::reasoning::json_span::{extract_array, extract_object};
use crate::reasoning::prompts::{
    counter_evidence_prompt, expected_evidence_prompt, missing_evidence_prompt,
    supporting_evidence_prompt, synthesis_prompt, DISPROVAL_SYSTEM_PROMPT,
};

/// Per-request deadline used when none is configured.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(60);

/// Confidence assumed when the synthesis omits one.
const DEFAULT_CONFIDENCE: f64 = 0.5;

const FALLBACK_EXPLANATION: &str = "Unable to generate explanation.";

/// One request in the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// What a true claim would leave behind.
    ExpectedEvidence,
    /// Evidence for the claim.
    SupportingEvidence,
    /// Evidence against the claim.
    CounterEvidence,
    /// Expected evidence that is absent.
    MissingEvidence,
    /// Final weighing.
    Synthesis,
}

impl Step {
    /// Short label used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            Self::ExpectedEvidence => "expected evidence",
            Self::SupportingEvidence => "supporting evidence",
            Self::CounterEvidence => "counter evidence",
            Self::MissingEvidence => "missing evidence",
            Self::Synthesis => "synthesis",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs the disproval steps against an [`AiClient`].
pub struct DisprovalLoop {
    client: Box<dyn AiClient>,
    step_timeout: Duration,
}

impl DisprovalLoop {
    /// Creates a loop with the default step timeout.
    pub fn new(client: Box<dyn AiClient>) -> Self {
        Self {
            client,
            step_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    /// Overrides the per-request deadline.
    #[must_use]
    pub fn with_step_timeout(mut self, step_timeout: Duration) -> Self {
        self.step_timeout = step_timeout;
        self
    }

    /// Per-step timeout.
    pub fn step_timeout(&self) -> Duration {
        self.step_timeout
    }

    /// Metadata of the underlying client.
    pub fn metadata(&self) -> AiClientMetadata {
        self.client.get_metadata()
    }

    /// Runs all steps and returns the model's verdict.
    ///
    /// Errors carry a [`ReasoningError`] in their chain whenever the cause
    /// is known, so callers can classify them with
    /// [`FailureKind::classify`](crate::reasoning::FailureKind::classify).
    pub async fn run(&self, claimant: &str, claim: &str, context: &str) -> Result<Verdict> {
        let metadata = self.metadata();
        info!(
            claimant,
            provider = %metadata.provider,
            model = %metadata.model,
            "Starting disproval loop"
        );

        let expected = self
            .ask(Step::ExpectedEvidence, &expected_evidence_prompt(claimant, claim))
            .await?;
        if expected.trim().is_empty() {
            return Err(malformed(Step::ExpectedEvidence, "empty response").into());
        }

        let supporting_prompt = supporting_evidence_prompt(claimant, claim, context, &expected);
        let counter_prompt = counter_evidence_prompt(claimant, claim, context);
        let missing_prompt = missing_evidence_prompt(claimant, claim, context, &expected);

        let (supporting_raw, counter_raw, missing_raw) = futures::try_join!(
            self.ask(Step::SupportingEvidence, &supporting_prompt),
            self.ask(Step::CounterEvidence, &counter_prompt),
            self.ask(Step::MissingEvidence, &missing_prompt),
        )?;

        let supporting = parse_evidence_list(&supporting_raw, Step::SupportingEvidence);
        let counter = parse_evidence_list(&counter_raw, Step::CounterEvidence);
        let missing = parse_string_list(&missing_raw);

        let synthesis_raw = self
            .ask(
                Step::Synthesis,
                &synthesis_prompt(claimant, claim, &supporting, &counter, &missing),
            )
            .await?;
        let fields = parse_verdict_fields(&synthesis_raw)?;

        debug!(
            verdict = ?fields.kind,
            confidence = fields.confidence,
            supporting = supporting.len(),
            counter = counter.len(),
            missing = missing.len(),
            "Disproval loop finished"
        );

        Ok(
            Verdict::new(claimant, claim, fields.kind, fields.confidence, fields.explanation)
                .with_supporting(supporting)
                .with_counter(counter)
                .with_missing(missing),
        )
    }

    async fn ask(&self, step: Step, prompt: &str) -> Result<String> {
        debug!(step = %step, prompt_len = prompt.len(), "Dispatching disproval step");
        match tokio::time::timeout(
            self.step_timeout,
            self.client.send_request(DISPROVAL_SYSTEM_PROMPT, prompt),
        )
        .await
        {
            Ok(result) => result.with_context(|| format!("AI {step} step failed")),
            Err(_) => Err(ReasoningError::Timeout(format!(
                "{step} step exceeded {}ms",
                self.step_timeout.as_millis()
            ))
            .into()),
        }
    }
}

fn malformed(step: Step, detail: impl Into<String>) -> ReasoningError {
    ReasoningError::MalformedOutput {
        step: step.name(),
        detail: detail.into(),
    }
}

/// Decodes evidence items, skipping any that are malformed.
fn parse_evidence_list(raw: &str, step: Step) -> Vec<Evidence> {
    let values = extract_array(raw);
    let total = values.len();
    let evidence: Vec<Evidence> = values.iter().filter_map(evidence_from_value).collect();
    if evidence.len() < total {
        debug!(
            step = %step,
            skipped = total - evidence.len(),
            "Skipped malformed evidence items"
        );
    }
    evidence
}

fn evidence_from_value(value: &Value) -> Option<Evidence> {
    let obj = value.as_object()?;

    let kind = match obj.get("type") {
        None | Some(Value::Null) => EvidenceKind::GitCommit,
        Some(Value::String(label)) => EvidenceKind::from_label(label)?,
        Some(_) => return None,
    };
    let source = match obj.get("source") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => return None,
    };
    let summary = obj
        .get("summary")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())?;
    let strength = match obj.get("strength") {
        None | Some(Value::Null) => EvidenceStrength::Moderate,
        Some(Value::String(label)) => EvidenceStrength::from_label(label)?,
        Some(_) => return None,
    };

    Some(Evidence::new(kind, source, summary, strength))
}

/// Decodes a list of gap descriptions; non-text entries are skipped.
fn parse_string_list(raw: &str) -> Vec<String> {
    extract_array(raw)
        .into_iter()
        .filter_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

#[derive(Debug)]
struct VerdictFields {
    kind: VerdictKind,
    confidence: f64,
    explanation: String,
}

fn parse_verdict_fields(raw: &str) -> Result<VerdictFields, ReasoningError> {
    let obj: Map<String, Value> = extract_object(raw);

    let kind = match obj.get("verdict") {
        None | Some(Value::Null) => VerdictKind::Unverifiable,
        Some(Value::String(label)) => VerdictKind::from_label(label)
            .ok_or_else(|| malformed(Step::Synthesis, format!("unknown verdict label {label:?}")))?,
        Some(other) => {
            return Err(malformed(
                Step::Synthesis,
                format!("verdict is not a string: {other}"),
            ))
        }
    };

    let confidence = match obj.get("confidence") {
        None | Some(Value::Null) => DEFAULT_CONFIDENCE,
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| malformed(Step::Synthesis, format!("confidence {n} is not a float")))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| malformed(Step::Synthesis, format!("confidence {s:?} is not a number")))?,
        Some(other) => {
            return Err(malformed(
                Step::Synthesis,
                format!("confidence is not a number: {other}"),
            ))
        }
    };
    if !confidence.is_finite() {
        return Err(malformed(
            Step::Synthesis,
            format!("confidence {confidence} is not finite"),
        ));
    }

    let explanation = obj
        .get("explanation")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(FALLBACK_EXPLANATION)
        .to_string();

    Ok(VerdictFields {
        kind,
        confidence: confidence.clamp(0.0, 1.0),
        explanation,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::reasoning::error::FailureKind;
    use crate::reasoning::test_utils::ConfigurableMockAiClient;

    const CONTEXT: &str = "=== GIT COMMIT LOG ===\n[abc1234] Alice (2024-01-15): Add login\n  Files: src/auth.rs";

    fn ok(text: &str) -> Result<String> {
        Ok(text.to_string())
    }

    fn full_run() -> Vec<Result<String>> {
        vec![
            ok("- commits touching auth files\n- Alice presenting login"),
            ok(r#"Sure! [{"type": "git_commit", "source": "abc1234", "summary": "Alice added auth.rs", "strength": "strong"}]"#),
            ok("[]"),
            ok(r#"["No transcript where Alice presents the login flow"]"#),
            ok(r#"```json
{"verdict": "VERIFIED", "confidence": 0.85, "explanation": "Commit abc1234 adds the auth module."}
```"#),
        ]
    }

    #[tokio::test]
    async fn full_run_builds_verdict() {
        let mock = ConfigurableMockAiClient::new(full_run());
        let prompts = mock.prompt_handle();
        let verdict = DisprovalLoop::new(Box::new(mock))
            .run("Alice", "I built the login system", CONTEXT)
            .await
            .unwrap();

        assert_eq!(verdict.kind(), VerdictKind::Verified);
        assert!((verdict.confidence() - 0.85).abs() < 1e-9);
        assert_eq!(verdict.explanation(), "Commit abc1234 adds the auth module.");
        assert_eq!(verdict.supporting_evidence().len(), 1);
        assert_eq!(verdict.supporting_evidence()[0].source, "abc1234");
        assert!(verdict.counter_evidence().is_empty());
        assert_eq!(verdict.missing_evidence().len(), 1);

        assert_eq!(prompts.request_count(), 5);
        let recorded = prompts.prompts();
        assert!(recorded.iter().all(|(sys, _)| sys == DISPROVAL_SYSTEM_PROMPT));
        assert!(recorded[1].1.contains("commits touching auth files"));
        assert!(recorded[2].1.contains(CONTEXT));
        assert!(recorded[4].1.contains("Alice added auth.rs"));
    }

    #[tokio::test]
    async fn empty_expected_evidence_is_malformed() {
        let mock = ConfigurableMockAiClient::new(vec![ok("   ")]);
        let prompts = mock.prompt_handle();
        let err = DisprovalLoop::new(Box::new(mock))
            .run("Alice", "claim", CONTEXT)
            .await
            .unwrap_err();
        assert_eq!(FailureKind::classify(&err), FailureKind::MalformedOutput);
        assert_eq!(prompts.request_count(), 1);
    }

    #[tokio::test]
    async fn provider_failure_aborts_run() {
        let mock = ConfigurableMockAiClient::new(vec![
            ok("- something"),
            ok("[]"),
            Err(ReasoningError::RateLimitExceeded.into()),
            ok("[]"),
        ]);
        let err = DisprovalLoop::new(Box::new(mock))
            .run("Alice", "claim", CONTEXT)
            .await
            .unwrap_err();
        assert_eq!(FailureKind::classify(&err), FailureKind::RateLimited);
    }

    #[tokio::test]
    async fn slow_step_times_out() {
        let mock = ConfigurableMockAiClient::new(full_run()).with_delay(Duration::from_secs(5));
        let err = DisprovalLoop::new(Box::new(mock))
            .with_step_timeout(Duration::from_millis(20))
            .run("Alice", "claim", CONTEXT)
            .await
            .unwrap_err();
        assert_eq!(FailureKind::classify(&err), FailureKind::Timeout);
    }

    #[tokio::test]
    async fn unknown_verdict_label_is_malformed() {
        let mut responses = full_run();
        responses[4] = ok(r#"{"verdict": "PROBABLY", "confidence": 0.5}"#);
        let err = DisprovalLoop::new(Box::new(ConfigurableMockAiClient::new(responses)))
            .run("Alice", "claim", CONTEXT)
            .await
            .unwrap_err();
        assert_eq!(FailureKind::classify(&err), FailureKind::MalformedOutput);
    }

    #[tokio::test]
    async fn prose_only_synthesis_uses_defaults() {
        let mut responses = full_run();
        responses[4] = ok("I cannot decide.");
        let verdict = DisprovalLoop::new(Box::new(ConfigurableMockAiClient::new(responses)))
            .run("Alice", "claim", CONTEXT)
            .await
            .unwrap();
        assert_eq!(verdict.kind(), VerdictKind::Unverifiable);
        assert!((verdict.confidence() - DEFAULT_CONFIDENCE).abs() < 1e-9);
        assert_eq!(verdict.explanation(), FALLBACK_EXPLANATION);
    }

    #[test]
    fn confidence_is_validated_at_the_boundary() {
        let clamped = parse_verdict_fields(r#"{"verdict": "disputed", "confidence": 1.4}"#).unwrap();
        assert_eq!(clamped.kind, VerdictKind::Disputed);
        assert!((clamped.confidence - 1.0).abs() < f64::EPSILON);

        let negative = parse_verdict_fields(r#"{"verdict": "DISPUTED", "confidence": -3}"#).unwrap();
        assert!(negative.confidence.abs() < f64::EPSILON);

        let as_text = parse_verdict_fields(r#"{"verdict": "VERIFIED", "confidence": "0.7"}"#).unwrap();
        assert!((as_text.confidence - 0.7).abs() < 1e-9);

        let nan = parse_verdict_fields(r#"{"verdict": "VERIFIED", "confidence": "NaN"}"#).unwrap_err();
        assert_eq!(nan.kind(), FailureKind::MalformedOutput);

        let infinite = parse_verdict_fields(r#"{"verdict": "VERIFIED", "confidence": "inf"}"#).unwrap_err();
        assert_eq!(infinite.kind(), FailureKind::MalformedOutput);

        let wrong_type = parse_verdict_fields(r#"{"verdict": "VERIFIED", "confidence": true}"#).unwrap_err();
        assert_eq!(wrong_type.kind(), FailureKind::MalformedOutput);
    }

    #[test]
    fn malformed_evidence_items_are_skipped() {
        let raw = r#"[
            {"type": "git_commit", "source": "abc1234", "summary": "ok", "strength": "STRONG"},
            {"type": "slack", "source": "x", "summary": "unknown type"},
            {"type": "meeting_transcript", "source": 12, "summary": "line ref as number"},
            {"summary": "defaults apply"},
            {"type": "git_commit", "summary": "bad strength", "strength": "huge"},
            {"type": "git_commit", "source": "abc", "summary": ""},
            "not an object",
            42
        ]"#;
        let evidence = parse_evidence_list(raw, Step::SupportingEvidence);
        assert_eq!(evidence.len(), 3);
        assert_eq!(evidence[0].strength, EvidenceStrength::Strong);
        assert_eq!(evidence[1].kind, EvidenceKind::MeetingTranscript);
        assert_eq!(evidence[1].source, "12");
        assert_eq!(evidence[1].strength, EvidenceStrength::Moderate);
        assert_eq!(evidence[2].kind, EvidenceKind::GitCommit);
        assert_eq!(evidence[2].source, "");
    }

    #[test]
    fn string_list_keeps_text_entries() {
        let missing = parse_string_list(r#"Gaps: ["a", "", null, 3, {"x": 1}, "b"]"#);
        assert_eq!(missing, vec!["a", "3", "b"]);
        assert!(parse_string_list("nothing missing").is_empty());
    }
}
