// src/engine/mod.rs

pub mod finalizer;
pub mod hints;
pub mod runner;
pub mod scoring;
pub mod session_store;
pub mod settings;
pub mod timer;

pub use runner::{QuizOutcome, QuizRunner, Step, SubmissionStatus, TimerEvent};
pub use settings::parse_settings;

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use crate::{
        api::{HintRequest, QuizBackend},
        error::AppError,
        models::{
            attempt::{AttemptOut, AttemptPayload},
            quiz::{
                Difficulty, QuestionType, QuizGenerateRequest, QuizGenerateResponse,
                QuizQuestion, Topic,
            },
            session::QuizSession,
        },
        storage::{KeyValueStore, MemoryStore},
    };

    pub fn mcq_question(index: usize) -> QuizQuestion {
        let choices: BTreeMap<String, String> = ["A", "B", "C", "D"]
            .iter()
            .map(|k| (k.to_string(), format!("Option {}", k)))
            .collect();

        QuizQuestion {
            id: format!("q{}", index),
            topic: Topic::BigO,
            difficulty: Difficulty::Junior,
            question_type: QuestionType::Mcq,
            prompt: format!("Question {}", index),
            code: None,
            choices: Some(choices),
            explanation: Some(format!("Explanation {}", index)),
            correct_answer: Some("A".to_string()),
        }
    }

    pub fn code_question(id: &str, expected: &str) -> QuizQuestion {
        QuizQuestion {
            id: id.to_string(),
            topic: Topic::PythonCore,
            difficulty: Difficulty::Junior,
            question_type: QuestionType::CodeOutput,
            prompt: "What does this print?".to_string(),
            code: Some("print([1, 2, 3])".to_string()),
            choices: None,
            explanation: None,
            correct_answer: Some(expected.to_string()),
        }
    }

    /// Questions q1..=qN, every correct answer is "A".
    pub fn generated(count: usize) -> QuizGenerateResponse {
        QuizGenerateResponse {
            quiz_id: "quiz-1".to_string(),
            questions: (1..=count).map(mcq_question).collect(),
            attempt_id: None,
        }
    }

    pub fn sample_session(count: usize) -> QuizSession {
        QuizSession::from_generated(generated(count))
    }

    /// In-process backend that counts calls and can be told to fail.
    #[derive(Default)]
    pub struct FakeBackend {
        questions: usize,
        generate_calls: AtomicUsize,
        hint_calls: AtomicUsize,
        submit_calls: AtomicUsize,
        hint_failure: AtomicU16,
        submit_failure: AtomicBool,
        close_during_hint: Mutex<Option<Arc<AtomicBool>>>,
    }

    impl FakeBackend {
        pub fn with_questions(questions: usize) -> Self {
            Self {
                questions,
                ..Default::default()
            }
        }

        pub fn generate_calls(&self) -> usize {
            self.generate_calls.load(Ordering::SeqCst)
        }

        pub fn hint_calls(&self) -> usize {
            self.hint_calls.load(Ordering::SeqCst)
        }

        pub fn submit_calls(&self) -> usize {
            self.submit_calls.load(Ordering::SeqCst)
        }

        pub fn fail_hints_with(&self, status: u16) {
            self.hint_failure.store(status, Ordering::SeqCst);
        }

        pub fn fail_submissions(&self, fail: bool) {
            self.submit_failure.store(fail, Ordering::SeqCst);
        }

        /// Clears `flag` while the next hint request is in flight.
        pub fn close_during_hint(&self, flag: Arc<AtomicBool>) {
            if let Ok(mut slot) = self.close_during_hint.lock() {
                *slot = Some(flag);
            }
        }
    }

    #[async_trait]
    impl QuizBackend for FakeBackend {
        async fn generate_quiz(
            &self,
            _request: &QuizGenerateRequest,
        ) -> Result<QuizGenerateResponse, AppError> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(generated(self.questions))
        }

        async fn request_hint(
            &self,
            question_id: &str,
            request: &HintRequest,
        ) -> Result<String, AppError> {
            self.hint_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(flag) = self.close_during_hint.lock().ok().and_then(|mut s| s.take()) {
                flag.store(false, Ordering::SeqCst);
            }
            match self.hint_failure.load(Ordering::SeqCst) {
                0 => Ok(format!("Hint {} for {}", request.level, question_id)),
                503 => Err(AppError::ServiceUnavailable("unavailable".to_string())),
                status => Err(AppError::Service {
                    status,
                    message: "boom".to_string(),
                }),
            }
        }

        async fn submit_attempt(&self, payload: &AttemptPayload) -> Result<AttemptOut, AppError> {
            let n = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.submit_failure.load(Ordering::SeqCst) {
                return Err(AppError::Network("connection reset".to_string()));
            }

            Ok(AttemptOut {
                id: format!("attempt-{}", n),
                topic: payload.topic.clone(),
                difficulty: payload.difficulty.clone(),
                mode: payload.mode.clone(),
                size: payload.size,
                correct_count: payload.correct_count,
                total_count: payload.total_count,
                answers: payload.answers.clone(),
                meta: None,
                started_at: payload.started_at,
                finished_at: Some(payload.finished_at),
                time_limit_seconds: payload.time_limit_seconds,
                time_spent_seconds: payload.time_spent_seconds,
                timed_out: Some(payload.timed_out),
                created_at: Utc::now(),
                score_percent: payload.meta.raw_score_percent,
            })
        }
    }

    /// Memory store whose writes fail for keys starting with `prefix`.
    #[derive(Clone, Default)]
    pub struct FailingStore {
        pub inner: MemoryStore,
        prefix: String,
    }

    impl FailingStore {
        pub fn failing_on(prefix: &str) -> Self {
            Self {
                inner: MemoryStore::new(),
                prefix: prefix.to_string(),
            }
        }
    }

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
            if key.starts_with(&self.prefix) {
                return Err(AppError::Storage("disk full".to_string()));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), AppError> {
            self.inner.remove(key).await
        }
    }
}
