// src/engine/scoring.rs

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{
    attempt::QuizSummary,
    quiz::{QuestionId, QuestionType, QuizQuestion},
    session::{PracticeResult, QuizSession},
};

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Canonical form used for answer comparison.
///
/// * MCQ: the trimmed choice key, compared exactly.
/// * Free text: CRLF folded, trimmed, whitespace runs collapsed, lowercased.
pub fn normalize_answer(value: &str, question_type: QuestionType) -> String {
    match question_type {
        QuestionType::Mcq => value.trim().to_string(),
        QuestionType::CodeOutput => {
            let unified = value.replace("\r\n", "\n");
            WHITESPACE_RUN
                .replace_all(unified.trim(), " ")
                .to_lowercase()
        }
    }
}

pub fn is_correct(question: &QuizQuestion, answer: &str) -> bool {
    let expected = question.correct_answer.as_deref().unwrap_or("");
    normalize_answer(expected, question.question_type)
        == normalize_answer(answer, question.question_type)
}

/// Grades one answer. Explanations are only attached in practice mode.
pub fn evaluate(question: &QuizQuestion, answer: &str, with_explanation: bool) -> PracticeResult {
    PracticeResult {
        correct: is_correct(question, answer),
        correct_answer: question.correct_answer.clone().unwrap_or_default(),
        explanation: if with_explanation {
            question.explanation.clone()
        } else {
            None
        },
    }
}

/// Final per-question results.
/// A result recorded at submit time takes precedence over re-grading.
pub fn final_results(
    session: &QuizSession,
    with_explanation: bool,
) -> HashMap<QuestionId, PracticeResult> {
    session
        .questions
        .iter()
        .map(|q| {
            let result = session
                .results
                .get(&q.id)
                .cloned()
                .unwrap_or_else(|| evaluate(q, session.answer(&q.id), with_explanation));
            (q.id.clone(), result)
        })
        .collect()
}

/// Score in whole percent, penalizing correct answers that used hints.
///
/// Each correct question earns `max(0, 1 - penalty/100)`; incorrect ones earn
/// nothing. Computed in hundredths so halves round up exactly.
pub fn score_percent(
    questions: &[QuizQuestion],
    results: &HashMap<QuestionId, PracticeResult>,
    penalty_by_question: &HashMap<QuestionId, u32>,
) -> u32 {
    let total = questions.len() as u64;
    if total == 0 {
        return 0;
    }

    let credit: u64 = questions
        .iter()
        .filter(|q| results.get(&q.id).is_some_and(|r| r.correct))
        .map(|q| {
            let penalty = penalty_by_question.get(&q.id).copied().unwrap_or(0);
            u64::from(100u32.saturating_sub(penalty))
        })
        .sum();

    ((2 * credit + total) / (2 * total)) as u32
}

pub fn summarize(
    session: &QuizSession,
    results: &HashMap<QuestionId, PracticeResult>,
    time_used_sec: Option<u32>,
    time_limit_sec: Option<u32>,
) -> QuizSummary {
    let correct = session
        .questions
        .iter()
        .filter(|q| results.get(&q.id).is_some_and(|r| r.correct))
        .count() as u32;

    QuizSummary {
        total: session.questions.len() as u32,
        correct,
        percent: score_percent(
            &session.questions,
            results,
            &session.hints.penalty_by_question,
        ),
        time_used_sec,
        time_limit_sec,
    }
}
