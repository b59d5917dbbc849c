use crate::core::board::Board;
use crate::domain::model::{Category, Cell, RenderEvent, RevealState, SetupStatus};
use crate::domain::ports::{CategorySource, ConfigProvider, Renderer};
use crate::utils::error::{Result, TriviaError};
use crate::utils::validation::validate_positive_number;
use futures_util::future::try_join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetupPolicy {
    /// Extra attempts after the first one, for retryable errors only.
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl SetupPolicy {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            retry_attempts: config.retry_attempts(),
            retry_delay: config.retry_delay(),
        }
    }
}

/// Raised for the lifetime of one setup. Dropping it lowers the in-progress
/// flag; if setup never completed (the future was dropped mid-fetch) the
/// status from before the setup is restored.
struct SetupFlag<'a> {
    in_progress: &'a AtomicBool,
    status: &'a Mutex<SetupStatus>,
    previous: Option<SetupStatus>,
}

impl<'a> SetupFlag<'a> {
    fn raise(in_progress: &'a AtomicBool, status: &'a Mutex<SetupStatus>) -> Self {
        let previous = std::mem::replace(
            &mut *status.lock().unwrap_or_else(PoisonError::into_inner),
            SetupStatus::Loading,
        );
        in_progress.store(true, Ordering::SeqCst);
        Self {
            in_progress,
            status,
            previous: Some(previous),
        }
    }

    fn complete(mut self) {
        self.previous = None;
    }
}

impl Drop for SetupFlag<'_> {
    fn drop(&mut self) {
        self.in_progress.store(false, Ordering::SeqCst);
        if let Some(previous) = self.previous.take() {
            tracing::warn!("Setup abandoned before finishing, keeping the previous board");
            *self.status.lock().unwrap_or_else(PoisonError::into_inner) = previous;
        }
    }
}

/// Owns one board. Game setup pulls categories from `S`, activations advance
/// cells, and every visible change is pushed to `R`.
pub struct BoardController<S: CategorySource, R: Renderer> {
    source: S,
    renderer: R,
    policy: SetupPolicy,
    board: Mutex<Board>,
    status: Mutex<SetupStatus>,
    setup_lock: tokio::sync::Mutex<()>,
    setup_in_progress: AtomicBool,
}

impl<S: CategorySource, R: Renderer> BoardController<S, R> {
    pub fn new(source: S, renderer: R) -> Self {
        Self::with_policy(source, renderer, SetupPolicy::default())
    }

    pub fn with_policy(source: S, renderer: R, policy: SetupPolicy) -> Self {
        Self {
            source,
            renderer,
            policy,
            board: Mutex::new(Board::new()),
            status: Mutex::new(SetupStatus::Idle),
            setup_lock: tokio::sync::Mutex::new(()),
            setup_in_progress: AtomicBool::new(false),
        }
    }

    pub fn setup_in_progress(&self) -> bool {
        self.setup_in_progress.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> SetupStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of the current board.
    pub fn board(&self) -> Board {
        self.lock_board().clone()
    }

    pub fn reset(&self) {
        self.lock_board().reset();
        self.set_status(SetupStatus::Idle);
    }

    /// Builds a fresh `category_count x clue_count` board.
    ///
    /// Concurrent calls are serialized. The board is swapped in only after
    /// every category has been fetched, so readers see the old board or the
    /// new one, never a mix. On failure the old board stays and a
    /// `SetupFailed` event is rendered before the error is returned.
    pub async fn setup_game(&self, category_count: usize, clue_count: usize) -> Result<Board> {
        let _guard = self.setup_lock.lock().await;

        let flag = SetupFlag::raise(&self.setup_in_progress, &self.status);
        self.renderer.render(&RenderEvent::SetupStarted);

        let outcome = self.build_board(category_count, clue_count).await;
        flag.complete();

        match outcome {
            Ok(board) => {
                tracing::info!(
                    "Board ready: {} categories x {} clues",
                    board.column_count(),
                    board.row_count()
                );
                self.set_status(SetupStatus::Ready);
                self.renderer.render(&RenderEvent::RenderEmptyGrid {
                    titles: board.titles(),
                    row_count: board.row_count(),
                });
                Ok(board)
            }
            Err(e) => {
                tracing::error!(
                    "Game setup failed: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                let message = e.user_friendly_message();
                self.set_status(SetupStatus::Failed {
                    message: message.clone(),
                });
                self.renderer.render(&RenderEvent::SetupFailed { message });
                Err(e)
            }
        }
    }

    /// Advances the clue under `cell` and renders what it now shows.
    ///
    /// Returns `None` when nothing changes: the clue already shows its
    /// answer, a setup is running, or `cell` is off the board.
    pub fn handle_activation(&self, cell: Cell) -> Option<RenderEvent> {
        if self.setup_in_progress() {
            tracing::debug!("Ignoring activation of {:?} during setup", cell);
            return None;
        }

        let event = {
            let mut board = self.lock_board();
            let before = match board.clue_at(cell) {
                Ok(clue) => clue.reveal_state(),
                Err(e) => {
                    tracing::warn!("Ignoring activation: {}", e);
                    return None;
                }
            };
            if before.is_terminal() {
                tracing::debug!("Cell {:?} already shows its answer", cell);
                return None;
            }
            let after = board.advance(cell).ok()?;
            let clue = board.clue_at(cell).ok()?;

            match (before, after) {
                (RevealState::Hidden, RevealState::Question) => RenderEvent::ShowQuestion {
                    cell,
                    text: clue.question.clone(),
                },
                (RevealState::Question, RevealState::Answer) => RenderEvent::ShowAnswer {
                    cell,
                    text: clue.answer.clone(),
                },
                _ => return None,
            }
        };

        self.renderer.render(&event);
        Some(event)
    }

    async fn build_board(&self, category_count: usize, clue_count: usize) -> Result<Board> {
        validate_positive_number("category_count", category_count, 1)?;
        validate_positive_number("clue_count", clue_count, 1)?;

        let categories = self.fetch_with_retry(category_count, clue_count).await?;

        let mut board = self.lock_board();
        board.populate(categories)?;
        Ok(board.clone())
    }

    async fn fetch_with_retry(
        &self,
        category_count: usize,
        clue_count: usize,
    ) -> Result<Vec<Category>> {
        let mut attempt = 0;
        loop {
            match self.fetch_categories(category_count, clue_count).await {
                Ok(categories) => return Ok(categories),
                Err(e) if e.is_retryable() && attempt < self.policy.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "Fetch failed ({}), retry {}/{} in {:?}",
                        e,
                        attempt,
                        self.policy.retry_attempts,
                        self.policy.retry_delay
                    );
                    tokio::time::sleep(self.policy.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_categories(
        &self,
        category_count: usize,
        clue_count: usize,
    ) -> Result<Vec<Category>> {
        let mut ids = self.source.fetch_random_category_ids(category_count).await?;
        if ids.len() < category_count {
            return Err(TriviaError::InsufficientPool {
                requested: category_count,
                available: ids.len(),
            });
        }
        ids.truncate(category_count);
        tracing::debug!("Selected category ids: {:?}", ids);

        // try_join_all keeps input order, so ids[i] lands in column i
        let categories = try_join_all(
            ids.iter()
                .map(|&id| self.source.fetch_category(id, clue_count)),
        )
        .await?;

        if let Some(short) = categories.iter().find(|c| c.clues.len() != clue_count) {
            return Err(TriviaError::MalformedCategory {
                message: format!(
                    "category '{}' came back with {} clues, expected {}",
                    short.title,
                    short.clues.len(),
                    clue_count
                ),
            });
        }

        Ok(categories)
    }

    fn lock_board(&self) -> MutexGuard<'_, Board> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_status(&self, status: SetupStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CategoryId, Clue};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct RecordingRenderer {
        events: Arc<Mutex<Vec<RenderEvent>>>,
    }

    impl RecordingRenderer {
        fn events(&self) -> Vec<RenderEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Renderer for RecordingRenderer {
        fn render(&self, event: &RenderEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    /// In-memory source. `failures` makes the first N listing calls fail.
    struct MockSource {
        ids: Vec<CategoryId>,
        categories: HashMap<CategoryId, Category>,
        failures: AtomicUsize,
        listing_calls: AtomicUsize,
        stalled: AtomicBool,
    }

    impl MockSource {
        fn new(categories: Vec<(u64, Category)>) -> Self {
            Self {
                ids: categories.iter().map(|(id, _)| CategoryId(*id)).collect(),
                categories: categories
                    .into_iter()
                    .map(|(id, c)| (CategoryId(id), c))
                    .collect(),
                failures: AtomicUsize::new(0),
                listing_calls: AtomicUsize::new(0),
                stalled: AtomicBool::new(false),
            }
        }

        fn failing_first(self, n: usize) -> Self {
            self.failures.store(n, Ordering::SeqCst);
            self
        }
    }

    #[async_trait]
    impl CategorySource for MockSource {
        async fn fetch_random_category_ids(&self, count: usize) -> Result<Vec<CategoryId>> {
            self.listing_calls.fetch_add(1, Ordering::SeqCst);
            if self.stalled.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(TriviaError::SourceUnavailable {
                    endpoint: "mock://categories".to_string(),
                    message: "connection reset".to_string(),
                });
            }
            if count > self.ids.len() {
                return Err(TriviaError::InsufficientPool {
                    requested: count,
                    available: self.ids.len(),
                });
            }
            Ok(self.ids[..count].to_vec())
        }

        async fn fetch_category(&self, id: CategoryId, _clue_count: usize) -> Result<Category> {
            // later ids finish first so ordering must come from the ids
            tokio::time::sleep(Duration::from_millis(20 / (id.0 % 10 + 1))).await;
            self.categories
                .get(&id)
                .cloned()
                .ok_or_else(|| TriviaError::SourceUnavailable {
                    endpoint: format!("mock://category/{}", id),
                    message: "not found".to_string(),
                })
        }
    }

    fn category(title: &str, clues: usize) -> Category {
        Category::new(
            title,
            (0..clues)
                .map(|i| Clue::new(format!("{} q{}", title, i), format!("{} a{}", title, i)))
                .collect(),
        )
    }

    fn six_by_five() -> MockSource {
        MockSource::new(
            (0..6)
                .map(|i| (10 + i, category(&format!("Category {}", i), 5)))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_setup_builds_board_in_id_order() {
        let renderer = RecordingRenderer::default();
        let controller = BoardController::new(six_by_five(), renderer.clone());

        let board = controller.setup_game(6, 5).await.unwrap();

        assert_eq!(board.column_count(), 6);
        assert_eq!(board.row_count(), 5);
        let expected: Vec<String> = (0..6).map(|i| format!("Category {}", i)).collect();
        assert_eq!(board.titles(), expected);
        assert_eq!(controller.board(), board);
        assert_eq!(controller.status(), SetupStatus::Ready);
        assert!(!controller.setup_in_progress());
        assert_eq!(
            renderer.events(),
            vec![
                RenderEvent::SetupStarted,
                RenderEvent::RenderEmptyGrid {
                    titles: expected,
                    row_count: 5
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_math_scenario() {
        let source = MockSource::new(vec![(
            1,
            Category::new("Math", vec![Clue::new("2+2", "4")]),
        )]);
        let renderer = RecordingRenderer::default();
        let controller = BoardController::new(source, renderer.clone());
        controller.setup_game(1, 1).await.unwrap();

        let cell = Cell::new(0, 0);
        assert_eq!(
            controller.handle_activation(cell),
            Some(RenderEvent::ShowQuestion {
                cell,
                text: "2+2".to_string()
            })
        );
        assert_eq!(
            controller.handle_activation(cell),
            Some(RenderEvent::ShowAnswer {
                cell,
                text: "4".to_string()
            })
        );
        assert_eq!(controller.handle_activation(cell), None);

        let events = renderer.events();
        assert_eq!(events.len(), 4); // started, grid, question, answer
        assert!(matches!(events[3], RenderEvent::ShowAnswer { .. }));
    }

    #[tokio::test]
    async fn test_activation_outside_board_is_ignored() {
        let renderer = RecordingRenderer::default();
        let controller = BoardController::new(six_by_five(), renderer.clone());

        assert_eq!(controller.handle_activation(Cell::new(0, 0)), None);

        controller.setup_game(6, 5).await.unwrap();
        let before = renderer.events().len();

        assert_eq!(controller.handle_activation(Cell::new(5, 0)), None);
        assert_eq!(controller.handle_activation(Cell::new(0, 6)), None);
        assert_eq!(renderer.events().len(), before);
    }

    #[tokio::test]
    async fn test_failed_setup_keeps_previous_board() {
        let renderer = RecordingRenderer::default();
        let controller = BoardController::new(six_by_five(), renderer.clone());
        let first = controller.setup_game(3, 5).await.unwrap();

        let result = controller.setup_game(7, 5).await;

        assert!(matches!(
            result,
            Err(TriviaError::InsufficientPool {
                requested: 7,
                available: 6
            })
        ));
        assert_eq!(controller.board(), first);
        assert!(matches!(controller.status(), SetupStatus::Failed { .. }));
        assert!(matches!(
            renderer.events().last(),
            Some(RenderEvent::SetupFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_wrong_clue_count_is_malformed() {
        let source = MockSource::new(vec![(1, category("Math", 5)), (2, category("Art", 3))]);
        let controller = BoardController::new(source, RecordingRenderer::default());

        let result = controller.setup_game(2, 5).await;

        assert!(matches!(
            result,
            Err(TriviaError::MalformedCategory { .. })
        ));
        assert!(controller.board().is_empty());
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let source = six_by_five().failing_first(2);
        let policy = SetupPolicy {
            retry_attempts: 2,
            retry_delay: Duration::from_millis(1),
        };
        let controller = BoardController::with_policy(source, RecordingRenderer::default(), policy);

        let board = controller.setup_game(6, 5).await.unwrap();

        assert_eq!(board.column_count(), 6);
        assert_eq!(controller.source.listing_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_retry_budget() {
        let source = six_by_five().failing_first(5);
        let policy = SetupPolicy {
            retry_attempts: 1,
            retry_delay: Duration::from_millis(1),
        };
        let controller = BoardController::with_policy(source, RecordingRenderer::default(), policy);

        let result = controller.setup_game(6, 5).await;

        assert!(matches!(
            result,
            Err(TriviaError::SourceUnavailable { .. })
        ));
        assert_eq!(controller.source.listing_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_errors_fail_at_once() {
        let policy = SetupPolicy {
            retry_attempts: 3,
            retry_delay: Duration::from_millis(1),
        };
        let controller =
            BoardController::with_policy(six_by_five(), RecordingRenderer::default(), policy);

        assert!(controller.setup_game(10, 5).await.is_err());
        assert_eq!(controller.source.listing_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_sizes_are_rejected() {
        let controller = BoardController::new(six_by_five(), RecordingRenderer::default());

        assert!(matches!(
            controller.setup_game(0, 5).await,
            Err(TriviaError::InvalidConfigValueError { .. })
        ));
        assert!(matches!(
            controller.setup_game(6, 0).await,
            Err(TriviaError::InvalidConfigValueError { .. })
        ));
    }

    #[tokio::test]
    async fn test_new_setup_resets_reveal_state() {
        let controller = BoardController::new(six_by_five(), RecordingRenderer::default());
        controller.setup_game(6, 5).await.unwrap();
        controller.handle_activation(Cell::new(2, 3));

        controller.setup_game(6, 5).await.unwrap();

        assert_eq!(
            controller
                .board()
                .clue_at(Cell::new(2, 3))
                .unwrap()
                .reveal_state(),
            RevealState::Hidden
        );
    }

    #[tokio::test]
    async fn test_reset_clears_board() {
        let controller = BoardController::new(six_by_five(), RecordingRenderer::default());
        controller.setup_game(2, 5).await.unwrap();
        assert_eq!(controller.board().column_count(), 2);

        controller.reset();

        assert!(controller.board().is_empty());
        assert_eq!(controller.status(), SetupStatus::Idle);
    }

    #[tokio::test]
    async fn test_dropped_setup_releases_flag_on_fresh_controller() {
        let source = six_by_five();
        source.stalled.store(true, Ordering::SeqCst);
        let controller = BoardController::new(source, RecordingRenderer::default());

        let timed_out =
            tokio::time::timeout(Duration::from_millis(50), controller.setup_game(1, 1)).await;

        assert!(timed_out.is_err());
        assert!(!controller.setup_in_progress());
        assert_eq!(controller.status(), SetupStatus::Idle);
        assert!(controller.board().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_setup_keeps_playing_previous_board() {
        let renderer = RecordingRenderer::default();
        let controller = BoardController::new(six_by_five(), renderer.clone());
        let first = controller.setup_game(6, 5).await.unwrap();
        let cell = Cell::new(0, 0);
        assert!(matches!(
            controller.handle_activation(cell),
            Some(RenderEvent::ShowQuestion { .. })
        ));

        controller.source.stalled.store(true, Ordering::SeqCst);
        let timed_out =
            tokio::time::timeout(Duration::from_millis(50), controller.setup_game(6, 5)).await;

        assert!(timed_out.is_err());
        assert!(!controller.setup_in_progress());
        assert_eq!(controller.status(), SetupStatus::Ready);
        assert_eq!(controller.board().titles(), first.titles());
        assert_eq!(
            controller.handle_activation(cell),
            Some(RenderEvent::ShowAnswer {
                cell,
                text: "Category 0 a0".to_string()
            })
        );

        // a later setup still gets the lock
        controller.source.stalled.store(false, Ordering::SeqCst);
        assert!(controller.setup_game(6, 5).await.is_ok());
    }
}
