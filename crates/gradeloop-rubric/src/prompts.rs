use crate::{ContentMetadata, RubricCriterion};

/// Prompt templates for the grader.
pub struct EvaluationPrompts;

impl EvaluationPrompts {
    pub const GRADER_SYSTEM_PROMPT: &'static str = "You are an expert educational content \
        evaluator with deep knowledge of Direct Instruction teaching methods and K-8 \
        curriculum. You respond only with a single JSON object and no other text.";

    /// Build the evaluation prompt for one criterion.
    ///
    /// The response contract is a strict JSON object; anything else is
    /// treated as a scoring failure for this criterion.
    pub fn criterion_prompt(
        criterion: &RubricCriterion,
        content: &str,
        metadata: &ContentMetadata,
    ) -> String {
        let components = bullet_list(&criterion.components);
        let failure_modes = bullet_list(&criterion.failure_modes);

        format!(
            r#"You are evaluating a Grade {grade} {subject} educational text against one quality criterion.

## Criterion: {name}
{description}

Evaluate these aspects:
{components}

Flag any of these failure modes as issues:
{failure_modes}

## Content to evaluate
```
{content}
```

## Response format

Respond with exactly one JSON object, no prose before or after:

{{"score": <number between 0.0 and 1.0>, "justification": "<one or two sentences>", "issues": ["<each concrete problem found, empty list if none>"]}}
"#,
            grade = metadata.grade_level,
            subject = metadata.subject,
            name = criterion.name,
            description = criterion.description,
            components = components,
            failure_modes = failure_modes,
            content = content,
        )
    }
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "- (use your judgment)".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_criterion_and_metadata() {
        let criterion = RubricCriterion::new("clarity", "Clear explanations")
            .with_components(&["Direct language"])
            .with_failure_modes(&["Ambiguous terminology"]);
        let metadata = ContentMetadata::new(4, "Language Arts");
        let prompt = EvaluationPrompts::criterion_prompt(&criterion, "Some article.", &metadata);
        assert!(prompt.contains("Grade 4 Language Arts"));
        assert!(prompt.contains("## Criterion: clarity"));
        assert!(prompt.contains("- Direct language"));
        assert!(prompt.contains("- Ambiguous terminology"));
        assert!(prompt.contains("Some article."));
    }
}
