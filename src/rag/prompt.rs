//! Prompt assembly from retrieved counseling cases

use std::fmt::Write as _;

use crate::cli::output::truncate_str;
use crate::models::RetrievedCase;

/// Character budget for the rendered case input excerpt
const INPUT_BUDGET: usize = 200;

/// Character budget for the rendered counselor response excerpt
const OUTPUT_BUDGET: usize = 300;

/// Assembler for the retrieval section of the generation prompt
///
/// Deterministic for identical inputs: no timestamps, no randomness.
pub struct PromptAssembler {
    input_budget: usize,
    output_budget: usize,
}

impl PromptAssembler {
    /// Create an assembler with custom excerpt budgets
    #[must_use]
    pub const fn new(input_budget: usize, output_budget: usize) -> Self {
        Self {
            input_budget,
            output_budget,
        }
    }

    /// Render retrieved cases into a bounded instruction block
    ///
    /// Returns an empty string when `cases` is empty; callers must omit the
    /// section entirely rather than inject the empty string.
    #[must_use]
    pub fn build_prompt(&self, cases: &[RetrievedCase], persona: Option<&str>) -> String {
        if cases.is_empty() {
            return String::new();
        }

        let mut prompt = String::new();

        if let Some(persona) = persona {
            let _ = writeln!(prompt, "## Companion Persona\n\n{persona}\n");
        }

        let _ = writeln!(prompt, "## Professional Counseling References\n");
        let _ = writeln!(
            prompt,
            "Below are {} professional counseling cases similar to the user's concern.",
            cases.len()
        );
        let _ = writeln!(
            prompt,
            "Use the APPROACH and WISDOM from these cases naturally, not mechanically copying.\n"
        );

        for (idx, case) in cases.iter().enumerate() {
            let _ = writeln!(prompt, "### Reference Case {}", idx + 1);
            let _ = writeln!(
                prompt,
                "**Similarity:** {:.1}% | **Type:** {}\n",
                case.similarity * 100.0,
                case.retrieval_type
            );
            let _ = writeln!(prompt, "**User Issue:**");
            let _ = writeln!(prompt, "{}\n", truncate_str(&case.input, self.input_budget));
            let _ = writeln!(prompt, "**Counselor Response:**");
            let _ = writeln!(
                prompt,
                "{}\n",
                truncate_str(&case.output, self.output_budget)
            );
            let _ = writeln!(prompt, "---\n");
        }

        prompt.push_str(RESPONSE_GUIDELINES);
        prompt
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(INPUT_BUDGET, OUTPUT_BUDGET)
    }
}

const RESPONSE_GUIDELINES: &str = r"## Response Guidelines
1. **Genuine Empathy**: Show understanding and compassion
2. **Specific Suggestions**: Provide 2-3 actionable methods
3. **Reflective Questions**: Guide user to self-discovery
4. **Warm Closing**: End with hope and support
5. **Natural Tone**: Use friendly, accessible language

Important: Integrate the core ideas naturally, not direct quotes.
";
