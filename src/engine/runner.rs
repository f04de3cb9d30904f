// src/engine/runner.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

use crate::{
    config::exam_time_limit,
    engine::{
        finalizer::{AttemptFinalizer, Timing},
        hints::HintAdapter,
        scoring::evaluate,
        session_store::{SessionOrigin, SessionStore},
        settings::parse_settings,
        timer::{ExamTimer, TickOutcome, TimerStore},
    },
    error::AppError,
    models::{
        attempt::{AttemptOut, QuizResult},
        quiz::QuizQuestion,
        session::{PracticeResult, QuizSession},
        settings::QuizConfiguration,
    },
    state::AppState,
};

/// What happened to the backend submission of a finished quiz.
#[derive(Debug)]
pub enum SubmissionStatus {
    Saved(AttemptOut),
    /// The backend had already acknowledged this quiz.
    AlreadySaved,
    /// The result is kept locally; `retry_submit` may be called.
    Failed(AppError),
    /// Guests have no account to save the attempt to.
    Skipped,
}

#[derive(Debug)]
pub struct QuizOutcome {
    pub result: QuizResult,
    pub submission: SubmissionStatus,
}

#[derive(Debug)]
pub enum Step {
    Moved(usize),
    Finished(QuizOutcome),
}

#[derive(Debug)]
pub enum TimerEvent {
    Idle,
    Remaining(u32),
    TimedOut(QuizOutcome),
}

/// Drives one quiz from settings to submitted attempt.
///
/// Every mutation is written through to the session store before returning.
/// Owning the runner mutably serializes user actions and timer ticks.
pub struct QuizRunner {
    config: QuizConfiguration,
    signature: String,
    session: QuizSession,
    origin: SessionOrigin,
    sessions: SessionStore,
    timers: TimerStore,
    timer: ExamTimer,
    expiry_pending: bool,
    hints: HintAdapter,
    finalizer: AttemptFinalizer,
    last_result: Option<QuizResult>,
    authenticated: bool,
    active: Arc<AtomicBool>,
}

impl QuizRunner {
    /// Validates `query`, then resumes or generates the session.
    /// In exam mode the countdown starts (or catches up) immediately.
    pub async fn open(
        state: &AppState,
        query: &str,
        attempt_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, AppError> {
        let config = parse_settings(query)?;
        let signature = config.signature();
        let sessions = SessionStore::new(state.session_store.clone());
        let timers = TimerStore::new(state.durable_store.clone());

        let (session, origin) = sessions
            .load_or_create(&config, state.backend.as_ref(), attempt_id)
            .await?;

        let mut runner = Self {
            config,
            signature,
            session,
            origin,
            sessions,
            timers,
            timer: ExamTimer::new(),
            expiry_pending: false,
            hints: HintAdapter::new(state.backend.clone()),
            finalizer: AttemptFinalizer::new(state.backend.clone(), state.durable_store.clone()),
            last_result: None,
            authenticated: true,
            active: Arc::new(AtomicBool::new(true)),
        };

        if runner.session.started_at.is_none() {
            runner.session.started_at = Some(now);
        }
        if runner.config.is_exam() {
            runner.start_timer(now).await?;
        }
        runner.persist().await?;

        Ok(runner)
    }

    /// Guests still get a local result, but nothing is sent to the backend.
    pub fn with_authentication(mut self, authenticated: bool) -> Self {
        self.authenticated = authenticated;
        self
    }

    async fn start_timer(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        let size = self
            .config
            .size
            .unwrap_or(self.session.questions.len() as u32);
        let limit = *self
            .session
            .time_limit_seconds
            .get_or_insert_with(|| exam_time_limit(size));

        let snapshot = self.timers.load(self.session.tracking_id()).await?;
        if self.timer.start(limit, now, snapshot) == TickOutcome::Expired {
            self.expiry_pending = true;
        }
        self.save_timer(now).await
    }

    async fn save_timer(&self, now: DateTime<Utc>) -> Result<(), AppError> {
        match self.timer.snapshot(now) {
            Some(snapshot) => self.timers.save(self.session.tracking_id(), &snapshot).await,
            None => Ok(()),
        }
    }

    async fn persist(&self) -> Result<(), AppError> {
        self.sessions.save(&self.signature, &self.session).await
    }

    pub fn config(&self) -> &QuizConfiguration {
        &self.config
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn origin(&self) -> SessionOrigin {
        self.origin
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.session.current_question()
    }

    /// (1-based position, total)
    pub fn progress(&self) -> (usize, usize) {
        (self.session.current_index + 1, self.session.questions.len())
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        self.config.is_exam().then(|| self.timer.remaining())
    }

    pub fn hints_remaining(&self) -> u32 {
        HintAdapter::remaining(&self.session)
    }

    pub fn is_finished(&self) -> bool {
        self.finalizer.is_finalized()
    }

    /// Flag shared with whoever may abandon the quiz (signal handler, UI
    /// teardown). Once cleared, results of in-flight calls are dropped.
    pub fn active_flag(&self) -> Arc<AtomicBool> {
        self.active.clone()
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), AppError> {
        if self.finalizer.is_finalized() {
            return Err(AppError::AlreadyFinalized);
        }
        if !self.is_active() {
            return Err(AppError::Validation("Quiz was closed".to_string()));
        }
        Ok(())
    }

    fn current_id(&self) -> Result<String, AppError> {
        self.current_question()
            .map(|q| q.id.clone())
            .ok_or_else(|| AppError::Validation("No current question".to_string()))
    }

    pub async fn set_answer(&mut self, answer: &str) -> Result<(), AppError> {
        self.ensure_open()?;
        let id = self.current_id()?;
        if self.session.is_submitted(&id) {
            return Err(AppError::Validation(
                "Question already submitted".to_string(),
            ));
        }

        self.session.answers.insert(id, answer.to_string());
        self.persist().await
    }

    /// Locks in the current answer. Practice mode returns feedback right
    /// away; exam mode keeps it until the end.
    pub async fn submit_current(&mut self) -> Result<Option<PracticeResult>, AppError> {
        self.ensure_open()?;
        let id = self.current_id()?;
        let practice = !self.config.is_exam();

        if !self.session.is_submitted(&id) {
            let question = self
                .session
                .question(&id)
                .ok_or_else(|| AppError::Validation(format!("Unknown question: {}", id)))?;
            let result = evaluate(question, self.session.answer(&id), practice);

            self.session.submitted.insert(id.clone(), true);
            self.session.results.insert(id.clone(), result);
            self.persist().await?;
        }

        Ok(if practice {
            self.session.results.get(&id).cloned()
        } else {
            None
        })
    }

    /// Advances; past the last question the quiz finishes.
    pub async fn next(&mut self, now: DateTime<Utc>) -> Result<Step, AppError> {
        self.ensure_open()?;
        if self.session.is_last_question() {
            return self.finish(false, now).await.map(Step::Finished);
        }

        self.session.current_index += 1;
        self.persist().await?;
        Ok(Step::Moved(self.session.current_index))
    }

    pub async fn previous(&mut self) -> Result<usize, AppError> {
        self.ensure_open()?;
        if self.session.current_index > 0 {
            self.session.current_index -= 1;
            self.persist().await?;
        }
        Ok(self.session.current_index)
    }

    pub async fn go_to(&mut self, index: usize) -> Result<(), AppError> {
        self.ensure_open()?;
        if index >= self.session.questions.len() {
            return Err(AppError::Validation(format!(
                "Question {} is out of range",
                index + 1
            )));
        }
        self.session.current_index = index;
        self.persist().await
    }

    /// Hints are a practice-mode aid for questions not yet submitted.
    pub async fn hint(&mut self, level: u8) -> Result<String, AppError> {
        self.ensure_open()?;
        if self.config.is_exam() {
            return Err(AppError::Validation(
                "Hints are not available in exam mode".to_string(),
            ));
        }
        let id = self.current_id()?;
        if self.session.is_submitted(&id) {
            return Err(AppError::Validation(
                "Question already submitted".to_string(),
            ));
        }

        // Work on a copy so an abandoned quiz never sees the late result.
        let mut draft_session = self.session.clone();
        let draft = draft_session.answer(&id).to_string();
        let text = self
            .hints
            .request_hint(&mut draft_session, &id, level, &draft)
            .await?;

        if !self.is_active() {
            tracing::debug!("Dropping hint for closed quiz {}", self.session.quiz_id);
            return Err(AppError::Validation("Quiz was closed".to_string()));
        }

        self.session.hints = draft_session.hints;
        self.persist().await?;
        Ok(text)
    }

    /// Drives the exam countdown. Reaching zero finishes the quiz once.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<TimerEvent, AppError> {
        if !self.config.is_exam() || self.finalizer.is_finalized() || !self.is_active() {
            return Ok(TimerEvent::Idle);
        }

        let outcome = if self.expiry_pending {
            self.expiry_pending = false;
            TickOutcome::Expired
        } else {
            self.timer.tick(now)
        };

        match outcome {
            TickOutcome::Idle => Ok(TimerEvent::Idle),
            TickOutcome::Running(remaining) => {
                self.save_timer(now).await?;
                tracing::debug!("Exam tick: {}s left", remaining);
                Ok(TimerEvent::Remaining(remaining))
            }
            TickOutcome::Expired => self
                .finish(true, now)
                .await
                .map(TimerEvent::TimedOut),
        }
    }

    /// Scores the quiz, keeps the result locally and submits the attempt.
    ///
    /// The in-progress session and timer snapshot are kept only while a
    /// signed-in submission has failed.
    pub async fn finish(&mut self, timed_out: bool, now: DateTime<Utc>) -> Result<QuizOutcome, AppError> {
        let timing = self.config.is_exam().then(|| Timing {
            used_seconds: self.timer.time_used(),
            limit_seconds: self.timer.limit(),
        });

        let result = self
            .finalizer
            .finalize(&self.session, &self.config, timed_out, timing, now)?;
        self.last_result = Some(result.clone());
        self.timer.stop();

        if let Err(e) = self.finalizer.store_result(&result).await {
            tracing::warn!("Could not keep result of quiz {}: {}", result.quiz_id, e);
        }

        self.submit(result).await
    }

    /// Re-sends a finished quiz whose submission failed.
    pub async fn retry_submit(&mut self) -> Result<QuizOutcome, AppError> {
        let result = self
            .last_result
            .clone()
            .ok_or_else(|| AppError::Validation("Quiz is not finished".to_string()))?;
        self.submit(result).await
    }

    async fn submit(&mut self, result: QuizResult) -> Result<QuizOutcome, AppError> {
        if !self.is_active() {
            return Ok(QuizOutcome {
                result,
                submission: SubmissionStatus::Failed(AppError::Validation(
                    "Quiz was closed".to_string(),
                )),
            });
        }

        let submission = if !self.authenticated {
            tracing::info!("Guest finished quiz {}; attempt not sent", result.quiz_id);
            SubmissionStatus::Skipped
        } else {
            match self.finalizer.submit(&result).await {
                Ok(created) => SubmissionStatus::Saved(created),
                Err(AppError::AlreadySubmitted(_)) => SubmissionStatus::AlreadySaved,
                Err(e) => SubmissionStatus::Failed(e),
            }
        };

        if !matches!(submission, SubmissionStatus::Failed(_)) {
            self.clear_progress().await?;
        }

        Ok(QuizOutcome { result, submission })
    }

    async fn clear_progress(&self) -> Result<(), AppError> {
        self.sessions.discard(&self.signature).await?;
        self.timers.clear(self.session.tracking_id()).await
    }

    /// Abandons the quiz and drops all its in-progress state.
    pub async fn quit(&mut self) -> Result<(), AppError> {
        self.active.store(false, Ordering::SeqCst);
        self.timer.stop();
        self.clear_progress().await?;
        tracing::info!("Quiz {} abandoned", self.session.quiz_id);
        Ok(())
    }
}
