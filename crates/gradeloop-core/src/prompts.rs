use gradeloop_rubric::ImprovementBrief;

use crate::{ContentKind, GenerationSpec};

/// Section-heading variants, rotated across attempts so redrafts do
/// not converge on identical structure.
const SECTION_TEMPLATES: &[[&str; 5]] = &[
    [
        "Introduction",
        "Key Concept",
        "Worked Examples",
        "Practice",
        "Summary",
    ],
    [
        "Let's Learn About",
        "Understanding",
        "Step-by-Step Examples",
        "Your Turn",
        "Remember",
    ],
    [
        "Exploring",
        "Main Idea",
        "Watch How It's Done",
        "Try These",
        "Key Points",
    ],
];

/// Question-framing variants, rotated the same way so repeated
/// question requests do not all probe the same skill.
const QUESTION_STRUCTURES: &[&str] = &[
    "a main idea question",
    "a supporting details question",
    "a compare and contrast question",
    "a cause and effect question",
    "a vocabulary in context question",
    "a sequencing question",
    "an inference question",
];

/// Prompt builders for the drafting side of the loop
pub struct DraftPrompts;

impl DraftPrompts {
    pub const WRITER_SYSTEM_PROMPT: &'static str =
        "You are an expert education content creator specializing in Direct Instruction \
         teaching methods and Grade K-8 curriculum development.";

    /// System prompt matching the requested content kind.
    pub fn system_prompt(spec: &GenerationSpec) -> String {
        match spec.kind {
            ContentKind::Article => Self::WRITER_SYSTEM_PROMPT.to_string(),
            ContentKind::Question => format!(
                "You are an expert educational content creator specializing in Grade {} {} \
                 assessment questions.",
                spec.grade_level, spec.subject
            ),
        }
    }

    /// Build the prompt for a fresh draft with no feedback.
    pub fn initial_prompt(spec: &GenerationSpec, attempt: usize) -> String {
        match spec.kind {
            ContentKind::Article => Self::article_prompt(spec, attempt),
            ContentKind::Question => Self::question_prompt(spec, attempt),
        }
    }

    /// Build the redraft prompt: previous draft plus rendered feedback.
    pub fn revision_prompt(
        spec: &GenerationSpec,
        previous_draft: &str,
        brief: &ImprovementBrief,
    ) -> String {
        match spec.kind {
            ContentKind::Article => Self::article_revision(spec, previous_draft, brief),
            ContentKind::Question => Self::question_revision(spec, previous_draft, brief),
        }
    }

    fn article_prompt(spec: &GenerationSpec, attempt: usize) -> String {
        let sections = &SECTION_TEMPLATES[attempt % SECTION_TEMPLATES.len()];
        let keywords = spec.keywords.join(", ");

        format!(
            r#"Generate a Grade {grade} {subject} educational article on "{topic}" at {difficulty} difficulty level.

IMPORTANT: This must follow Direct Instruction teaching style with these characteristics:
1. Explicitly teach concepts with clear, direct language
2. Break down complex ideas into manageable steps
3. Include worked examples that students can follow step-by-step
4. Use grade-appropriate vocabulary and sentence structure
5. Organize content logically with clear headings and sections

ARTICLE STRUCTURE:
- {intro}: Briefly introduce the topic and why it's important
- {concept}: Clearly explain the main concepts with definitions
- {examples}: Provide 3 worked examples (easy, medium, and hard difficulty)
  - Break down each example into explicit steps
  - Explain the reasoning for each step in detail
  - Use simple language and consistent terminology
- {practice}: Offer 2-3 practice problems for students to try
- {summary}: Summarize the key ideas and connect to future learning

CONTENT REQUIREMENTS:
- Target Grade Level: {grade}
- Subject: {subject}
- Topic: {topic}
- Difficulty: {difficulty}
- Include these keywords: {keywords}
- Factually accurate information only
- Clear and unambiguous wording
- Content appropriate for students with lower working memory

FORMAT REQUIREMENTS:
- Use headings for each section
- Use bullet points or numbered lists for steps
- Break text into short paragraphs
- Include visual cues like bold text for important concepts

The article should prepare students to answer questions of varying difficulty levels about {topic}."#,
            grade = spec.grade_level,
            subject = spec.subject,
            topic = spec.topic,
            difficulty = spec.difficulty,
            keywords = keywords,
            intro = sections[0],
            concept = sections[1],
            examples = sections[2],
            practice = sections[3],
            summary = sections[4],
        )
    }

    fn article_revision(
        spec: &GenerationSpec,
        previous_draft: &str,
        brief: &ImprovementBrief,
    ) -> String {
        let keywords = spec.keywords.join(", ");

        format!(
            r#"You're an expert educator specializing in Direct Instruction. I need you to improve this Grade {grade} {subject} article on "{topic}".

The article has been evaluated and needs improvement based on this feedback:

{feedback}

Original Article:
```
{previous}
```

REVISION INSTRUCTIONS:
1. Fix all the identified issues while preserving the overall structure
2. Ensure the article strictly follows Direct Instruction style
3. Make sure worked examples are broken down into very clear steps
4. Maintain grade-appropriate vocabulary and sentence structure
5. Ensure all content is factually accurate
6. Keep the article focused on the topic: "{topic}"
7. Include these keywords: {keywords}

IMPORTANT:
- Do NOT change the overall educational purpose
- Do NOT add unnecessary complexity
- Do NOT use inquiry-based learning approaches
- KEEP the Direct Instruction style with explicit teaching

Return the complete improved article maintaining proper formatting with headings, lists, and paragraph breaks."#,
            grade = spec.grade_level,
            subject = spec.subject,
            topic = spec.topic,
            feedback = brief.render(),
            previous = previous_draft,
            keywords = keywords,
        )
    }

    fn question_prompt(spec: &GenerationSpec, attempt: usize) -> String {
        let structure = QUESTION_STRUCTURES[attempt % QUESTION_STRUCTURES.len()];
        let passage_hint = if spec.keywords.is_empty() {
            "a short, grade-appropriate topic of your choosing".to_string()
        } else {
            spec.keywords.join(", ")
        };

        format!(
            r#"Generate a high-quality Grade {grade} {subject} question for the lesson on "{lesson}" at {difficulty} difficulty level.

LANGUAGE GUIDELINES FOR GRADE {grade}:
- Use vocabulary appropriate for Grade {grade} students
- Keep sentences under 15 words when possible
- Use clear, direct language without ambiguity
- Be historically and factually accurate
- Each wrong answer explanation must be educational and complete
- Solution steps should be clear and sequential

Content Requirements:
1. Write a passage about {passage_hint}
2. Use {structure} for your question
3. Create 4 multiple choice options labeled A, B, C, and D
4. Include COMPLETE explanations for each wrong answer
5. Provide a step-by-step solution with 3-4 steps
6. Ensure there is ONE unambiguously correct answer

FORMAT THE QUESTION EXACTLY LIKE THIS:
Read the following passage and answer the question.

[Write a grade-appropriate passage with short sentences]

[Clear, unambiguous question]

A) [Option]
B) [Option]
C) [Option]
D) [Option]

Correct Answer: [Letter]

Explanation for wrong answers:
A) [If incorrect: Clear explanation why this is wrong - must be a complete thought]
B) [If incorrect: Clear explanation why this is wrong - must be a complete thought]
C) [If incorrect: Clear explanation why this is wrong - must be a complete thought]
D) [If incorrect: Clear explanation why this is wrong - must be a complete thought]

Solution:
1. [Simple step]
2. [Simple step]
3. [Simple step]
4. [Optional simple step]"#,
            grade = spec.grade_level,
            subject = spec.subject,
            lesson = spec.topic,
            difficulty = spec.difficulty,
            passage_hint = passage_hint,
            structure = structure,
        )
    }

    fn question_revision(
        spec: &GenerationSpec,
        previous_draft: &str,
        brief: &ImprovementBrief,
    ) -> String {
        format!(
            r#"You are an expert educational content developer tasked with improving a Grade {grade} {subject} question.
The question is for a lesson on "{lesson}" at {difficulty} difficulty level.

Here is the original question:
```
{previous}
```

This question did not meet our quality standards. Please improve it based on this feedback:
{feedback}

IMPORTANT:
1. Keep the same general question type and structure
2. Maintain the same difficulty level ({difficulty})
3. Address ALL the feedback points
4. Keep all the required parts: passage, question, options, explanations, and solution
5. Ensure there is ONE unambiguously correct answer
6. Keep language appropriate for Grade {grade} students
7. Make sure all explanations are complete and educational

Return the complete improved question with all components."#,
            grade = spec.grade_level,
            subject = spec.subject,
            lesson = spec.topic,
            difficulty = spec.difficulty,
            previous = previous_draft,
            feedback = brief.render(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> GenerationSpec {
        GenerationSpec::new("Fractions", 4, "Math")
            .with_difficulty("beginner")
            .with_keywords(vec!["numerator".to_string(), "denominator".to_string()])
    }

    #[test]
    fn initial_prompt_rotates_section_headings() {
        let first = DraftPrompts::initial_prompt(&spec(), 0);
        let second = DraftPrompts::initial_prompt(&spec(), 1);
        assert!(first.contains("Worked Examples"));
        assert!(second.contains("Step-by-Step Examples"));
        assert_ne!(first, second);
        // Rotation wraps around
        let fourth = DraftPrompts::initial_prompt(&spec(), 3);
        assert_eq!(first, fourth);
    }

    #[test]
    fn initial_prompt_carries_spec_fields() {
        let prompt = DraftPrompts::initial_prompt(&spec(), 0);
        assert!(prompt.contains("Grade 4 Math"));
        assert!(prompt.contains("\"Fractions\""));
        assert!(prompt.contains("beginner"));
        assert!(prompt.contains("numerator, denominator"));
    }

    #[test]
    fn question_prompt_asks_for_multiple_choice_structure() {
        let spec = GenerationSpec::question("main_idea", 4, "Language Arts");
        let prompt = DraftPrompts::initial_prompt(&spec, 0);
        assert!(prompt.contains("Grade 4 Language Arts question"));
        assert!(prompt.contains("\"main_idea\""));
        assert!(prompt.contains("4 multiple choice options labeled A, B, C, and D"));
        assert!(prompt.contains("Correct Answer:"));
        assert!(prompt.contains("Explanation for wrong answers:"));
        assert!(prompt.contains("ONE unambiguously correct answer"));
    }

    #[test]
    fn question_prompt_rotates_question_structures() {
        let spec = GenerationSpec::question("main_idea", 4, "Language Arts");
        let first = DraftPrompts::initial_prompt(&spec, 0);
        let second = DraftPrompts::initial_prompt(&spec, 1);
        assert!(first.contains("a main idea question"));
        assert!(second.contains("a supporting details question"));
        let wrapped = DraftPrompts::initial_prompt(&spec, QUESTION_STRUCTURES.len());
        assert_eq!(first, wrapped);
    }

    #[test]
    fn system_prompt_matches_content_kind() {
        let article = DraftPrompts::system_prompt(&spec());
        assert!(article.contains("Direct Instruction"));

        let question =
            DraftPrompts::system_prompt(&GenerationSpec::question("inference", 5, "Science"));
        assert!(question.contains("Grade 5 Science"));
        assert!(question.contains("assessment questions"));
    }
}
