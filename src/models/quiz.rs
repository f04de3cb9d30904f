// src/models/quiz.rs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type QuestionId = String;

/// Quiz topics known to the backend. `Random` lets the server pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    PythonCore,
    BigO,
    Algorithms,
    DataStructures,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Junior,
    Middle,
}

/// Practice shows per-question feedback, exam runs on a clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    Practice,
    Exam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    CodeOutput,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::PythonCore => "python_core",
            Topic::BigO => "big_o",
            Topic::Algorithms => "algorithms",
            Topic::DataStructures => "data_structures",
            Topic::Random => "random",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Topic::PythonCore => "Python Core",
            Topic::BigO => "Big O Notation",
            Topic::Algorithms => "Algorithms",
            Topic::DataStructures => "Data Structures",
            Topic::Random => "Random",
        }
    }
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Junior => "junior",
            Difficulty::Middle => "middle",
        }
    }
}

impl QuizMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizMode::Practice => "practice",
            QuizMode::Exam => "exam",
        }
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "python_core" => Ok(Topic::PythonCore),
            "big_o" => Ok(Topic::BigO),
            "algorithms" => Ok(Topic::Algorithms),
            "data_structures" => Ok(Topic::DataStructures),
            "random" => Ok(Topic::Random),
            other => Err(format!("Invalid topic: {}", other)),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "junior" => Ok(Difficulty::Junior),
            "middle" => Ok(Difficulty::Middle),
            other => Err(format!("Invalid difficulty: {}", other)),
        }
    }
}

impl FromStr for QuizMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "practice" => Ok(QuizMode::Practice),
            "exam" => Ok(QuizMode::Exam),
            other => Err(format!("Invalid mode: {}", other)),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A question as delivered by the quiz generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: QuestionId,
    pub topic: Topic,
    pub difficulty: Difficulty,

    /// 'mcq' (choice keys A-D) or 'code_output' (free text).
    #[serde(rename = "type")]
    pub question_type: QuestionType,

    pub prompt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Choice key to choice text, e.g. {"A": "O(n)"}.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

/// Body of `POST /quiz/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizGenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Topic>>,
    pub difficulty: Difficulty,
    pub mode: QuizMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizGenerateResponse {
    pub quiz_id: String,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_id: Option<String>,
}

/// Response of `GET /meta`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaResponse {
    pub topics: Vec<String>,
    pub difficulties: Vec<String>,
    pub modes: Vec<String>,
    pub default_quiz_size: u32,
    pub max_questions_per_quiz: u32,
}
