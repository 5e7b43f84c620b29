//! The ledger controller.
//!
//! A `Ledger` owns one session: the store it writes through to, the working set (an in-memory
//! copy of every stored record), the selected `FilterWindow`, and the derived view computed from
//! those two. The working set is only ever replaced wholesale by a reload after a successful
//! store call, so it always equals the store's contents as of the last reload.
//!
//! Every action takes `&mut self`, which serializes a session's actions: a store call and the
//! reload that follows it finish before the next action starts.

use crate::aggregate::{self, CategoryTotals};
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, ErrorType, IntoResult};
use crate::filter;
use crate::model::{normalize_note, Amount, ExpenseId, ExpenseRecord, FilterWindow, NewExpense};
use crate::store::ExpenseStore;
use crate::Result;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Nothing has been loaded from the store yet.
    Idle,
    /// The working set reflects the store as of the last reload.
    Loaded,
}

/// Why an action was refused without touching the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "input")]
pub enum Rejection {
    /// The amount is not a number, is zero or negative, exceeds `Amount::MAX`, or has more
    /// precision than the store keeps.
    InvalidAmount(String),
    /// The category is empty after trimming.
    EmptyCategory,
    /// The window name is not one of `all`, `this-week`, `this-month`.
    UnknownWindow(String),
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::InvalidAmount(raw) => {
                write!(
                    f,
                    "amount '{raw}' must be a number greater than zero and at most {}",
                    Amount::MAX
                )
            }
            Rejection::EmptyCategory => write!(f, "category must not be empty"),
            Rejection::UnknownWindow(raw) => write!(f, "'{raw}' is not a filter window"),
        }
    }
}

/// The result of a ledger action that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Created(ExpenseId),
    Deleted(ExpenseId),
    WindowSet(FilterWindow),
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }
}

/// The records visible under the current window and their totals.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerView {
    pub window: FilterWindow,
    pub visible_records: Vec<ExpenseRecord>,
    pub total_spend: Amount,
    pub by_category: CategoryTotals,
}

impl LedgerView {
    fn derive(working_set: &[ExpenseRecord], window: FilterWindow, clock: &dyn Clock) -> Self {
        let visible_records = filter::apply_filter(working_set, window, clock.today());
        let total_spend = aggregate::total(&visible_records);
        let by_category = aggregate::category_totals(&visible_records);
        Self {
            window,
            visible_records,
            total_spend,
            by_category,
        }
    }
}

/// One user's session over an `ExpenseStore`.
#[derive(Debug)]
pub struct Ledger<S> {
    store: S,
    clock: Box<dyn Clock>,
    state: SessionState,
    window: FilterWindow,
    working_set: Vec<ExpenseRecord>,
    view: LedgerView,
}

impl<S> Ledger<S>
where
    S: ExpenseStore,
{
    /// Creates an idle session that reads the date from the system clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }

    /// Creates an idle session that reads the date from `clock`.
    pub fn with_clock(store: S, clock: impl Clock + 'static) -> Self {
        Self {
            store,
            clock: Box::new(clock),
            state: SessionState::Idle,
            window: FilterWindow::default(),
            working_set: Vec::new(),
            view: LedgerView::default(),
        }
    }

    /// Initializes the store and loads the working set.
    pub async fn start(&mut self) -> Result<()> {
        self.store
            .initialize()
            .await
            .pub_result(ErrorType::Database)?;
        self.reload().await?;
        self.state = SessionState::Loaded;
        info!("Ledger loaded with {} expenses", self.working_set.len());
        Ok(())
    }

    /// Replaces the working set with the store's current contents and re-derives the view. On
    /// failure the working set and view are left as they were.
    pub async fn reload(&mut self) -> Result<()> {
        let records = self
            .store
            .list_all()
            .await
            .pub_result(ErrorType::Database)?;
        debug!("Reloaded {} expenses from the store", records.len());
        self.working_set = records;
        self.rederive();
        Ok(())
    }

    /// Validates raw user input and, if it is acceptable, records a new expense dated today.
    ///
    /// Invalid input is not an error: the outcome is `Outcome::Rejected` and nothing changes.
    pub async fn submit_new(
        &mut self,
        raw_amount: &str,
        raw_category: &str,
        raw_note: &str,
    ) -> Result<Outcome> {
        self.require_loaded()?;

        let expense = match self.validate(raw_amount, raw_category, raw_note) {
            Ok(expense) => expense,
            Err(rejection) => {
                debug!("Rejected new expense: {rejection}");
                return Ok(Outcome::Rejected(rejection));
            }
        };

        let id = self
            .store
            .create(&expense)
            .await
            .pub_result(ErrorType::Database)?;
        self.reload().await?;
        Ok(Outcome::Created(id))
    }

    /// Deletes the expense with `id`. An id that does not exist is not an error.
    pub async fn request_delete(&mut self, id: ExpenseId) -> Result<Outcome> {
        self.require_loaded()?;
        self.store
            .delete_by_id(id)
            .await
            .pub_result(ErrorType::Database)?;
        self.reload().await?;
        Ok(Outcome::Deleted(id))
    }

    /// Selects a window. Only the view is re-derived; the store is not consulted.
    pub fn set_window(&mut self, window: FilterWindow) -> Outcome {
        if self.window != window {
            debug!("Filter window changed from {} to {window}", self.window);
        }
        self.window = window;
        self.rederive();
        Outcome::WindowSet(window)
    }

    /// Selects a window by name. Unknown names are rejected and the current window is kept.
    pub fn set_window_named(&mut self, name: &str) -> Outcome {
        match FilterWindow::from_str(name.trim()) {
            Ok(window) => self.set_window(window),
            Err(e) => {
                warn!("{e}");
                Outcome::Rejected(Rejection::UnknownWindow(name.to_string()))
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn window(&self) -> FilterWindow {
        self.window
    }

    /// Every record in the store as of the last reload, newest first.
    pub fn working_set(&self) -> &[ExpenseRecord] {
        &self.working_set
    }

    pub fn view(&self) -> &LedgerView {
        &self.view
    }

    pub fn visible_records(&self) -> &[ExpenseRecord] {
        &self.view.visible_records
    }

    pub fn total_spend(&self) -> Amount {
        self.view.total_spend
    }

    pub fn by_category(&self) -> &CategoryTotals {
        &self.view.by_category
    }

    fn validate(
        &self,
        raw_amount: &str,
        raw_category: &str,
        raw_note: &str,
    ) -> std::result::Result<NewExpense, Rejection> {
        let amount = Amount::from_str(raw_amount)
            .ok()
            .filter(|a| a.is_positive() && a.is_storable())
            .ok_or_else(|| Rejection::InvalidAmount(raw_amount.to_string()))?;

        let category = raw_category.trim();
        if category.is_empty() {
            return Err(Rejection::EmptyCategory);
        }

        Ok(NewExpense {
            amount,
            category: category.to_string(),
            note: normalize_note(raw_note),
            date: self.clock.today(),
        })
    }

    fn rederive(&mut self) {
        self.view = LedgerView::derive(&self.working_set, self.window, self.clock.as_ref());
    }

    fn require_loaded(&self) -> Result<()> {
        match self.state {
            SessionState::Loaded => Ok(()),
            SessionState::Idle => Err(Error::new(
                ErrorType::Session,
                anyhow::anyhow!("The ledger has not been started"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::test::TestEnv;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    fn friday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ids(records: &[ExpenseRecord]) -> Vec<ExpenseId> {
        records.iter().map(|r| r.id()).collect()
    }

    /// An in-memory store that can be switched into a failing mode.
    #[derive(Debug, Default, Clone)]
    struct FlakyStore {
        rows: Arc<Mutex<Vec<ExpenseRecord>>>,
        next_id: Arc<Mutex<ExpenseId>>,
        failing: Arc<AtomicBool>,
    }

    impl FlakyStore {
        fn fail(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn check(&self) -> anyhow::Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                anyhow::bail!("medium unavailable")
            }
            Ok(())
        }

        /// Inserts a record with an explicit date, bypassing the controller.
        fn seed(&self, amount: &str, category: &str, date: NaiveDate) {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            self.rows.lock().unwrap().push(ExpenseRecord::new(
                *next,
                Amount::from_str(amount).unwrap(),
                category,
                None,
                date,
            ));
        }
    }

    #[async_trait]
    impl ExpenseStore for FlakyStore {
        async fn initialize(&self) -> anyhow::Result<()> {
            self.check()
        }

        async fn create(&self, expense: &NewExpense) -> anyhow::Result<ExpenseId> {
            self.check()?;
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            self.rows.lock().unwrap().push(ExpenseRecord::new(
                *next,
                expense.amount(),
                expense.category(),
                expense.note().map(str::to_string),
                expense.date(),
            ));
            Ok(*next)
        }

        async fn list_all(&self) -> anyhow::Result<Vec<ExpenseRecord>> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap().clone();
            rows.sort_by(|a, b| b.id().cmp(&a.id()));
            Ok(rows)
        }

        async fn delete_by_id(&self, id: ExpenseId) -> anyhow::Result<()> {
            self.check()?;
            self.rows.lock().unwrap().retain(|r| r.id() != id);
            Ok(())
        }
    }

    async fn started(store: FlakyStore) -> Ledger<FlakyStore> {
        let mut ledger = Ledger::with_clock(store, FixedClock::new(friday()));
        ledger.start().await.unwrap();
        ledger
    }

    #[tokio::test]
    async fn test_starts_idle_then_loaded() {
        let mut ledger = Ledger::with_clock(FlakyStore::default(), FixedClock::new(friday()));
        assert_eq!(ledger.state(), SessionState::Idle);
        assert!(ledger.working_set().is_empty());

        ledger.start().await.unwrap();

        assert_eq!(ledger.state(), SessionState::Loaded);
        assert_eq!(ledger.window(), FilterWindow::All);
    }

    #[tokio::test]
    async fn test_actions_before_start_are_session_errors() {
        let mut ledger = Ledger::with_clock(FlakyStore::default(), FixedClock::new(friday()));
        let err = ledger.submit_new("1", "Food", "").await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Session);
        let err = ledger.request_delete(1).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Session);
    }

    #[tokio::test]
    async fn test_end_to_end_two_records() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger().await;

        let first = ledger.submit_new("12.50", "Food", "").await.unwrap();
        let second = ledger.submit_new("7.00", "Books", "pen").await.unwrap();
        assert_eq!(first, Outcome::Created(1));
        assert_eq!(second, Outcome::Created(2));

        assert_eq!(ids(ledger.working_set()), vec![2, 1]);
        assert_eq!(ids(ledger.visible_records()), vec![2, 1]);
        assert_eq!(ledger.total_spend().value(), dec("19.50"));

        // Books was inserted last, so it comes first in the newest-first list.
        let by_category = ledger.by_category();
        assert_eq!(by_category.get("Food").unwrap().value(), dec("12.50"));
        assert_eq!(by_category.get("Books").unwrap().value(), dec("7.00"));
        assert_eq!(by_category.len(), 2);
    }

    #[tokio::test]
    async fn test_submitted_record_round_trips() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger().await;

        ledger
            .submit_new("  12.50 ", "  Food  ", "   ")
            .await
            .unwrap();
        ledger.submit_new("$1,000", "Rent", "  march  ").await.unwrap();

        let rent = &ledger.working_set()[0];
        assert_eq!(rent.amount().value(), dec("1000"));
        assert_eq!(rent.category(), "Rent");
        assert_eq!(rent.note(), Some("march"));
        assert_eq!(rent.date(), env.today());

        let food = &ledger.working_set()[1];
        assert_eq!(food.amount().value(), dec("12.5"));
        assert_eq!(food.category(), "Food");
        assert_eq!(food.note(), None);
        assert_eq!(food.date(), env.today());
    }

    #[tokio::test]
    async fn test_rejections_leave_state_unchanged() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger().await;
        ledger.submit_new("3", "Food", "").await.unwrap();
        let before_set = ledger.working_set().to_vec();
        let before_view = ledger.view().clone();

        let cases = [
            ("-5", "Food", Rejection::InvalidAmount("-5".to_string())),
            ("0", "Food", Rejection::InvalidAmount("0".to_string())),
            ("", "Food", Rejection::InvalidAmount(String::new())),
            ("abc", "Food", Rejection::InvalidAmount("abc".to_string())),
            ("NaN", "Food", Rejection::InvalidAmount("NaN".to_string())),
            ("--5", "Food", Rejection::InvalidAmount("--5".to_string())),
            ("-$-5", "Food", Rejection::InvalidAmount("-$-5".to_string())),
            ("1_000", "Food", Rejection::InvalidAmount("1_000".to_string())),
            ("5", "   ", Rejection::EmptyCategory),
            ("5", "", Rejection::EmptyCategory),
        ];
        for (amount, category, expected) in cases {
            let outcome = ledger.submit_new(amount, category, "note").await.unwrap();
            assert_eq!(outcome, Outcome::Rejected(expected));
            assert!(outcome.is_rejected());
        }

        assert_eq!(ledger.working_set(), before_set.as_slice());
        assert_eq!(ledger.view(), &before_view);
        assert_eq!(env.db().count_expenses().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_amounts_are_rejected() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger().await;

        for raw in [
            "79228162514264337593543950335",
            "50000000000000000000000000000",
            "1000000000000.01",
            "0.12345678901234567890",
        ] {
            let outcome = ledger.submit_new(raw, "Food", "").await.unwrap();
            assert_eq!(outcome, Outcome::Rejected(Rejection::InvalidAmount(raw.to_string())));
        }
        assert_eq!(env.db().count_expenses().await.unwrap(), 0);

        // The largest accepted amount can be stored, reloaded and totalled, twice over.
        ledger.submit_new("$1,000,000,000,000", "Rent", "").await.unwrap();
        ledger.submit_new("1000000000000", "Rent", "").await.unwrap();
        assert_eq!(ledger.total_spend().value(), dec("2000000000000"));
        assert_eq!(env.ledger().await.working_set().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_scenario() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger().await;
        ledger.submit_new("12.50", "Food", "").await.unwrap();
        ledger.submit_new("7.00", "Books", "pen").await.unwrap();

        let outcome = ledger.request_delete(1).await.unwrap();

        assert_eq!(outcome, Outcome::Deleted(1));
        assert_eq!(ids(ledger.working_set()), vec![2]);
        assert_eq!(ledger.total_spend().value(), dec("7.00"));
        assert_eq!(ledger.by_category().get("Food"), None);
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_idempotent() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger().await;
        ledger.submit_new("1", "Food", "").await.unwrap();

        ledger.request_delete(42).await.unwrap();
        let once = ledger.view().clone();
        ledger.request_delete(42).await.unwrap();

        assert_eq!(ledger.view(), &once);
        assert_eq!(ledger.working_set().len(), 1);
    }

    #[tokio::test]
    async fn test_window_scenario() {
        let store = FlakyStore::default();
        store.seed("4", "Rent", NaiveDate::from_ymd_opt(2024, 2, 28).unwrap());
        store.seed("3", "Books", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        store.seed("2", "Food", NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
        store.seed("1", "Food", NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        let mut ledger = started(store).await;
        assert_eq!(ledger.visible_records().len(), 4);

        assert_eq!(
            ledger.set_window(FilterWindow::ThisWeek),
            Outcome::WindowSet(FilterWindow::ThisWeek)
        );
        assert_eq!(ids(ledger.visible_records()), vec![4]);
        assert_eq!(ledger.total_spend().value(), dec("1"));

        ledger.set_window(FilterWindow::ThisMonth);
        assert_eq!(ids(ledger.visible_records()), vec![4, 3, 2]);
        assert_eq!(ledger.total_spend().value(), dec("6"));
        let order: Vec<&str> = ledger
            .by_category()
            .iter()
            .map(|e| e.category.as_str())
            .collect();
        assert_eq!(order, vec!["Food", "Books"]);

        ledger.set_window(FilterWindow::All);
        assert_eq!(ledger.visible_records().len(), 4);
        // The working set is untouched by window changes.
        assert_eq!(ledger.working_set().len(), 4);
    }

    #[tokio::test]
    async fn test_set_window_named() {
        let mut ledger = started(FlakyStore::default()).await;

        assert_eq!(
            ledger.set_window_named("this-month"),
            Outcome::WindowSet(FilterWindow::ThisMonth)
        );
        let outcome = ledger.set_window_named("fortnight");
        assert_eq!(
            outcome,
            Outcome::Rejected(Rejection::UnknownWindow("fortnight".to_string()))
        );
        assert_eq!(ledger.window(), FilterWindow::ThisMonth);
    }

    #[tokio::test]
    async fn test_window_does_not_need_the_store() {
        let store = FlakyStore::default();
        store.seed("5", "Food", friday());
        let mut ledger = started(store.clone()).await;

        store.fail(true);
        ledger.set_window(FilterWindow::ThisWeek);

        assert_eq!(ledger.visible_records().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_last_loaded_working_set() {
        let store = FlakyStore::default();
        let mut ledger = started(store.clone()).await;
        ledger.submit_new("5", "Food", "").await.unwrap();
        let before = ledger.view().clone();

        store.fail(true);
        let err = ledger.submit_new("6", "Food", "").await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Database);
        assert!(err.to_string().contains("medium unavailable"), "{err}");
        let err = ledger.request_delete(1).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Database);

        assert_eq!(ledger.view(), &before);
        assert_eq!(ids(ledger.working_set()), vec![1]);
    }

    #[tokio::test]
    async fn test_start_failure_stays_idle() {
        let store = FlakyStore::default();
        store.fail(true);
        let mut ledger = Ledger::with_clock(store, FixedClock::new(friday()));

        let err = ledger.start().await.unwrap_err();

        assert_eq!(err.error_type(), ErrorType::Database);
        assert_eq!(ledger.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_category_totals_sum_to_total() {
        let env = TestEnv::new().await;
        let mut ledger = env.ledger().await;
        for (amount, category) in [("0.10", "A"), ("0.20", "B"), ("0.30", "A"), ("99.99", "C")] {
            ledger.submit_new(amount, category, "").await.unwrap();
        }
        assert_eq!(ledger.by_category().sum(), ledger.total_spend());
        assert_eq!(ledger.total_spend().value(), dec("100.59"));
    }

    #[tokio::test]
    async fn test_restart_reloads_persisted_records() {
        let env = TestEnv::new().await;
        {
            let mut ledger = env.ledger().await;
            ledger.submit_new("2", "Food", "").await.unwrap();
        }
        let ledger = env.ledger().await;
        assert_eq!(ledger.working_set().len(), 1);
        assert_eq!(ledger.window(), FilterWindow::All);
    }
}
