//! Prompt templates for jewelry image generation

use crate::models::DesignParameters;

/// Phrase used when the customer leaves the detailing field empty
pub const DEFAULT_DETAILS: &str = "elegant engraved design";

/// Opening of every generation prompt
pub const PROMPT_PREFIX: &str = "A stunning piece of jewelry: Ultra realistic";

/// Photography direction appended to every generation prompt
pub const PROMPT_SUFFIX: &str =
    "macro jewelry photography, luxury product shot, 8k, studio lighting";

/// Styles offered by the studio form
pub const STYLE_PRESETS: [&str; 4] = ["calcutti", "traditional", "modern", "minimal"];

/// Builds the generation prompt for a set of design parameters.
///
/// Pure: the same parameters always yield the same prompt.
pub fn build_prompt(params: &DesignParameters) -> String {
    let details = if params.details.is_empty() {
        DEFAULT_DETAILS
    } else {
        params.details.as_str()
    };

    format!(
        "{} {} {}, {} style, {}g, {}, {}",
        PROMPT_PREFIX,
        params.metal.label(),
        params.category,
        params.style,
        params.weight_grams,
        details,
        PROMPT_SUFFIX
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Metal};

    #[test]
    fn default_design_prompt() {
        let prompt = build_prompt(&DesignParameters::default());
        assert_eq!(
            prompt,
            "A stunning piece of jewelry: Ultra realistic Gold ring, calcutti style, 10g, \
             elegant engraved design, macro jewelry photography, luxury product shot, 8k, studio lighting"
        );
    }

    #[test]
    fn details_replace_default_phrase() {
        let params = DesignParameters {
            metal: Metal::Platinum,
            category: Category::Bangles,
            weight_grams: 42,
            style: "minimal".to_string(),
            details: "hammered finish".to_string(),
        };

        let prompt = build_prompt(&params);
        assert!(prompt.contains("Platinum bangles, minimal style, 42g, hammered finish,"));
        assert!(!prompt.contains(DEFAULT_DETAILS));
    }

    #[test]
    fn prompt_is_deterministic() {
        let params = DesignParameters {
            details: "floral filigree".to_string(),
            ..DesignParameters::default()
        };
        assert_eq!(build_prompt(&params), build_prompt(&params.clone()));
    }
}
