//! Prompt templates for the disproval loop.

use crate::data::Evidence;

/// System prompt shared by every step.
pub const DISPROVAL_SYSTEM_PROMPT: &str = r#"You are an auditor checking claims about who did what on a software team. You do not try to prove claims. You try to disprove them, and a claim that survives an honest attempt at disproval is likely true.

You will receive a contribution claim and a flattened evidence log:
- Commit lines look like `[abc1234] Author Name (YYYY-MM-DD): message` followed by the files the commit touched.
- Transcript lines look like `[L12] Speaker: what they said`, where L12 is the source line number.

Rules:
1. Cite evidence by commit short hash or transcript line reference.
2. Never invent commits, files, speakers or statements that are not in the log.
3. When asked for JSON, return only JSON with no surrounding prose."#;

/// Asks which evidence must exist if the claim is true.
pub fn expected_evidence_prompt(claimant: &str, claim: &str) -> String {
    format!(
        r#"A team member named "{claimant}" claims: "{claim}"

If this claim is TRUE, what specific evidence MUST exist in:
1. The commit log (specific commits, file changes, authorship patterns)
2. Meeting transcripts (discussions, presentations, questions they asked or answered)

List the expected evidence as bullet points. Be specific about what to look for."#
    )
}

/// Asks for evidence supporting the claim.
pub fn supporting_evidence_prompt(
    claimant: &str,
    claim: &str,
    context: &str,
    expected: &str,
) -> String {
    format!(
        r#"Find evidence that SUPPORTS the claim.

CLAIM: "{claimant}" says: "{claim}"

EXPECTED EVIDENCE (if the claim is true):
{expected}

List ONLY items from the evidence below that support the claim. For each item give:
- type: "git_commit" or "meeting_transcript"
- source: commit hash or transcript line reference
- summary: what it shows
- strength: "strong", "moderate" or "weak"

EVIDENCE:
{context}

OUTPUT FORMAT (JSON array):
[{{"type": "git_commit", "source": "abc1234", "summary": "what it shows", "strength": "strong"}}]

Return ONLY the JSON array. If nothing supports the claim, return []."#
    )
}

/// Asks for evidence contradicting the claim.
pub fn counter_evidence_prompt(claimant: &str, claim: &str, context: &str) -> String {
    format!(
        r#"Find anything that DISPROVES or CONTRADICTS the claim.

CLAIM: "{claimant}" says: "{claim}"

Look for counter-evidence such as:
- someone else authored the work
- timeline mismatches with the claimant's involvement
- transcript statements contradicting the claim
- minimal or no involvement by the claimant

For each item give type ("git_commit" or "meeting_transcript"), source, summary and strength ("strong", "moderate" or "weak").

EVIDENCE:
{context}

OUTPUT FORMAT (JSON array):
[{{"type": "git_commit", "source": "def4567", "summary": "Bob authored the auth module, not Alice", "strength": "strong"}}]

Return ONLY the JSON array. If there is no counter-evidence, return []."#
    )
}

/// Asks which expected evidence is absent.
pub fn missing_evidence_prompt(
    claimant: &str,
    claim: &str,
    context: &str,
    expected: &str,
) -> String {
    format!(
        r#"Compare expected evidence against actual evidence and report significant gaps.

CLAIM: "{claimant}" says: "{claim}"

EXPECTED EVIDENCE (if the claim is true):
{expected}

ACTUAL EVIDENCE:
{context}

OUTPUT FORMAT (JSON array of strings):
["No commits from the claimant touching auth files", "Claimant never presented this feature"]

Return ONLY the JSON array. If all expected evidence is present, return []."#
    )
}

fn evidence_summary(items: &[Evidence], empty: &str) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    items
        .iter()
        .map(|e| {
            format!(
                "- {} (source: {}, strength: {})",
                e.summary,
                e.source,
                e.strength.as_str()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Asks for the final verdict given the gathered evidence.
pub fn synthesis_prompt(
    claimant: &str,
    claim: &str,
    supporting: &[Evidence],
    counter: &[Evidence],
    missing: &[String],
) -> String {
    let supporting = evidence_summary(supporting, "None found");
    let counter = evidence_summary(counter, "None found");
    let missing = if missing.is_empty() {
        "None".to_string()
    } else {
        missing
            .iter()
            .map(|m| format!("- {m}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"Give a final verdict on this contribution claim.

CLAIM: "{claimant}" says: "{claim}"

SUPPORTING EVIDENCE:
{supporting}

COUNTER-EVIDENCE:
{counter}

MISSING EVIDENCE:
{missing}

Provide:
1. verdict: "VERIFIED" (strong support, little counter-evidence), "DISPUTED" (significant counter-evidence) or "UNVERIFIABLE" (not enough evidence either way)
2. confidence: a number between 0.0 and 1.0
3. explanation: two or three sentences citing specific evidence

OUTPUT FORMAT (JSON object):
{{"verdict": "VERIFIED", "confidence": 0.85, "explanation": "..."}}

Return ONLY the JSON object."#
    )
}
