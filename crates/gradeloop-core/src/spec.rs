use serde::{Deserialize, Serialize};

use gradeloop_rubric::ContentMetadata;

/// The shape of content a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// A short instructional article with worked examples.
    #[default]
    Article,
    /// A passage-based multiple-choice question with explanations
    /// for each wrong answer and a step-by-step solution.
    Question,
}

/// What to generate: topic, audience, and constraints for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSpec {
    /// What kind of content to produce
    #[serde(default)]
    pub kind: ContentKind,
    /// Main topic of the article, or the lesson a question targets
    /// (e.g. "main_idea", "supporting_details")
    pub topic: String,
    /// Target grade level (1-8)
    pub grade_level: u8,
    /// Subject area (e.g. "Language Arts")
    pub subject: String,
    /// Difficulty level (e.g. "beginner", "intermediate", "advanced")
    pub difficulty: String,
    /// Keywords the article must include
    pub keywords: Vec<String>,
}

impl GenerationSpec {
    pub fn new(topic: impl Into<String>, grade_level: u8, subject: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Article,
            topic: topic.into(),
            grade_level,
            subject: subject.into(),
            difficulty: "intermediate".to_string(),
            keywords: Vec::new(),
        }
    }

    /// A request for a multiple-choice question on the given lesson.
    pub fn question(lesson: impl Into<String>, grade_level: u8, subject: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Question,
            topic: lesson.into(),
            grade_level,
            subject: subject.into(),
            difficulty: "medium".to_string(),
            keywords: Vec::new(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = difficulty.into();
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    /// Metadata handed to the grader alongside each draft.
    pub fn metadata(&self) -> ContentMetadata {
        ContentMetadata::new(self.grade_level, &self.subject).with_tags(self.keywords.clone())
    }
}
