// src/models/settings.rs

use serde::{Deserialize, Serialize};

use crate::config::STORAGE_PREFIX;
use crate::models::quiz::{Difficulty, QuizGenerateRequest, QuizMode, Topic};

/// Which topics a quiz draws from.
/// `Topics` is never empty: the settings parser rejects empty selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "topic_mode", content = "topics", rename_all = "snake_case")]
pub enum TopicSelection {
    Random,
    Topics(Vec<Topic>),
}

/// Validated quiz settings. Immutable once a session has started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizConfiguration {
    pub topics: TopicSelection,
    pub difficulty: Difficulty,
    pub mode: QuizMode,
    /// None lets the backend use its default quiz size.
    pub size: Option<u32>,
}

impl QuizConfiguration {
    pub fn is_exam(&self) -> bool {
        self.mode == QuizMode::Exam
    }

    /// Cache key used to locate a resumable session for these settings.
    pub fn signature(&self) -> String {
        let topics_key = match &self.topics {
            TopicSelection::Random => "random".to_string(),
            TopicSelection::Topics(topics) => topics
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join("|"),
        };
        let size_key = self
            .size
            .map(|s| s.to_string())
            .unwrap_or_else(|| "default".to_string());

        format!(
            "{}:{}:{}:{}:{}",
            STORAGE_PREFIX, topics_key, self.difficulty, self.mode, size_key
        )
    }

    /// The topic recorded on an attempt: "random", the single topic, or "mix".
    pub fn attempt_topic(&self) -> String {
        match &self.topics {
            TopicSelection::Random => Topic::Random.as_str().to_string(),
            TopicSelection::Topics(topics) if topics.len() > 1 => "mix".to_string(),
            TopicSelection::Topics(topics) => topics
                .first()
                .map(|t| t.as_str().to_string())
                .unwrap_or_else(|| Topic::Random.as_str().to_string()),
        }
    }

    pub fn topic_list(&self) -> &[Topic] {
        match &self.topics {
            TopicSelection::Random => &[],
            TopicSelection::Topics(topics) => topics,
        }
    }

    pub fn to_generate_request(&self, attempt_id: Option<String>) -> QuizGenerateRequest {
        let (topic, topics) = match &self.topics {
            TopicSelection::Random => (Some(Topic::Random), None),
            TopicSelection::Topics(topics) => (None, Some(topics.clone())),
        };

        QuizGenerateRequest {
            topic,
            topics,
            difficulty: self.difficulty,
            mode: self.mode,
            size: self.size,
            attempt_id,
        }
    }
}
