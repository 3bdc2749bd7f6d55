//! Prompt construction for the judgment and rewrite paths.
//!
//! Pure string composition — no I/O, no validation. Callers reject empty
//! input before building a prompt.

/// System prompt for the judgment path — enforces JSON-only output.
pub const EVALUATION_SYSTEM: &str = "You are a precise e-commerce content auditor. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt for the rewrite path — the fixed seven-point GEO policy.
pub const OPTIMIZER_SYSTEM: &str = "You are an expert in Generative Engine Optimization (GEO). \
    Rewrite the product description to: \
    1. Highlight the unique value proposition. \
    2. Integrate SEO keywords and user intent. \
    3. Add social proof. \
    4. Use Markdown (H2, H3, bullets) for scannability. \
    5. Be authoritative yet empathetic. \
    6. End with urgency and a call to action. \
    7. Maintain strict factual accuracy.";

/// Builds the evaluation prompt: the literal rubric list plus a JSON-shape
/// template with one breakdown entry per criterion. Deterministic — the same
/// rubric and text always yield byte-identical output.
pub fn build_evaluation_prompt(rubric: &[&str], text: &str) -> String {
    let mut shape = String::new();
    for (i, criterion) in rubric.iter().enumerate() {
        let comma = if i + 1 < rubric.len() { "," } else { "" };
        shape.push_str(&format!(
            "    \"{criterion}\": {{ \"present\": <bool>, \"feedback\": \"<string>\" }}{comma}\n"
        ));
    }

    format!(
        r#"Analyze this product description based on e-commerce GEO principles ({criteria}).
Return a valid JSON object:
{{
  "score": <0-100>,
  "analysis": {{
{shape}  }},
  "summary_critique": "<string>"
}}
Description: "{text}""#,
        criteria = rubric.join(", "),
    )
}

/// Builds the rewrite prompt. The policy itself lives in [`OPTIMIZER_SYSTEM`].
pub fn build_optimization_prompt(text: &str) -> String {
    format!("Rewrite this description:\n\n{text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::evaluation::rubric::GEO_CRITERIA;

    #[test]
    fn evaluation_prompt_is_deterministic() {
        let a = build_evaluation_prompt(&GEO_CRITERIA, "Soft cotton t-shirt.");
        let b = build_evaluation_prompt(&GEO_CRITERIA, "Soft cotton t-shirt.");
        assert_eq!(a, b);
    }

    #[test]
    fn evaluation_prompt_embeds_all_nine_criteria_verbatim() {
        let prompt = build_evaluation_prompt(&GEO_CRITERIA, "Soft cotton t-shirt.");
        for criterion in GEO_CRITERIA {
            assert!(prompt.contains(criterion), "missing criterion: {criterion}");
        }
    }

    #[test]
    fn evaluation_prompt_embeds_the_description() {
        let prompt = build_evaluation_prompt(&GEO_CRITERIA, "Best shoes ever, buy now!");
        assert!(prompt.contains("Best shoes ever, buy now!"));
    }

    #[test]
    fn evaluation_prompt_requests_one_breakdown_entry_per_criterion() {
        let prompt = build_evaluation_prompt(&GEO_CRITERIA, "x");
        assert_eq!(prompt.matches("\"present\": <bool>").count(), 9);
    }

    #[test]
    fn optimization_prompt_carries_the_source_text() {
        let prompt = build_optimization_prompt("Soft cotton t-shirt.");
        assert!(prompt.ends_with("Soft cotton t-shirt."));
    }
}
