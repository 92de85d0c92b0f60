/// Task list screen controller
///
/// Store I/O runs on tracked background tasks; results come back over a
/// channel and only `apply` touches the mirror. Closing the screen cancels
/// whatever is still in flight.

use crate::core::session::Session;
use crate::core::task_list::{ContextAction, EditRequest, ListChange, TaskList};
use crate::db::{Database, Task, UserProfile};
use crate::error::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

pub const TASK_DELETED: &str = "Task deleted";

/// Result of one background store call, waiting to be applied
#[derive(Debug)]
pub enum StoreOutcome {
    Tasks(Result<Vec<Task>>),
    Profile(Result<Option<UserProfile>>),
    Deleted { task_id: i64, result: Result<bool> },
}

/// What the view has to do after an outcome is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSignal {
    /// Redraw the whole list
    Refresh,
    /// One row went away at this position
    ItemRemoved(usize),
    /// Header text
    ProfileName(String),
    /// Short-lived message (toast)
    Notify(String),
}

impl From<ListChange> for ViewSignal {
    fn from(change: ListChange) -> Self {
        match change {
            ListChange::Reset => ViewSignal::Refresh,
            ListChange::Removed { index } => ViewSignal::ItemRemoved(index),
        }
    }
}

/// Where the app goes next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Edit screen, with the full task
    Edit(EditRequest),
    /// Create screen, list reloads on return
    Create,
    /// Back to login after logout
    Login,
}

pub struct TaskListScreen {
    db: Arc<Database>,
    session: Session,
    tasks: TaskList,
    profile_name: Option<String>,
    cancel: CancellationToken,
    tracker: TaskTracker,
    tx: mpsc::UnboundedSender<StoreOutcome>,
    rx: mpsc::UnboundedReceiver<StoreOutcome>,
    in_flight: usize,
}

impl TaskListScreen {
    /// Enter the screen: starts loading the task list and profile name
    pub fn open(db: Arc<Database>, session: Session) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut screen = Self {
            db,
            session,
            tasks: TaskList::new(),
            profile_name: None,
            cancel: CancellationToken::new(),
            tracker: TaskTracker::new(),
            tx,
            rx,
            in_flight: 0,
        };

        info!("task list screen opened");
        screen.spawn_load_tasks();
        screen.spawn_load_profile();
        screen
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn profile_name(&self) -> Option<&str> {
        self.profile_name.as_deref()
    }

    /// True while some background store call hasn't been received yet
    pub fn has_pending(&self) -> bool {
        self.in_flight > 0
    }

    /// Reload the list, e.g. on return from the create screen
    pub fn spawn_load_tasks(&mut self) {
        let db = Arc::clone(&self.db);
        let session = self.session.clone();
        self.spawn_store(async move {
            StoreOutcome::Tasks(load_tasks(&db, &session).await)
        });
    }

    pub fn spawn_load_profile(&mut self) {
        let db = Arc::clone(&self.db);
        let session = self.session.clone();
        self.spawn_store(async move {
            let result = match session.current_user_id().await {
                Ok(Some(user_id)) => db.get_profile(user_id).await,
                Ok(None) => Ok(None),
                Err(e) => Err(e),
            };
            StoreOutcome::Profile(result)
        });
    }

    /// Delete the task shown at `position`
    ///
    /// Returns false if there is no such row.
    pub fn spawn_delete(&mut self, position: usize) -> bool {
        let Some(task_id) = self.tasks.get(position).map(|t| t.id) else {
            return false;
        };

        let db = Arc::clone(&self.db);
        self.spawn_store(async move {
            StoreOutcome::Deleted {
                task_id,
                result: db.delete_task(task_id).await,
            }
        });
        true
    }

    fn spawn_store<F>(&mut self, work: F)
    where
        F: Future<Output = StoreOutcome> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        let tx = self.tx.clone();
        self.in_flight += 1;

        self.tracker.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("store call cancelled");
                }
                outcome = work => {
                    if !cancel.is_cancelled() {
                        // Receiver only goes away with the screen
                        let _ = tx.send(outcome);
                    }
                }
            }
        });
    }

    /// Wait for the next finished store call
    ///
    /// Returns None when nothing is in flight. A call counts as finished once
    /// it is received here, whether or not it is ever applied.
    pub async fn next_outcome(&mut self) -> Option<StoreOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let outcome = self.rx.recv().await;
        if outcome.is_some() {
            self.in_flight -= 1;
        }
        outcome
    }

    /// Apply a store call's result to the mirror
    pub fn apply(&mut self, outcome: StoreOutcome) -> Vec<ViewSignal> {
        match outcome {
            StoreOutcome::Tasks(Ok(tasks)) => {
                debug!(count = tasks.len(), "task list loaded");
                vec![self.tasks.replace(tasks).into()]
            }
            StoreOutcome::Profile(Ok(Some(profile))) => {
                let name = profile.full_name();
                self.profile_name = Some(name.clone());
                vec![ViewSignal::ProfileName(name)]
            }
            StoreOutcome::Profile(Ok(None)) => Vec::new(),
            StoreOutcome::Deleted {
                task_id,
                result: Ok(true),
            } => {
                // Look the row up again, an earlier delete may have shifted it
                let mut signals: Vec<ViewSignal> = Vec::new();
                if let Some((_, change)) = self
                    .tasks
                    .position_of(task_id)
                    .and_then(|index| self.tasks.remove_at(index))
                {
                    signals.push(change.into());
                }
                signals.push(ViewSignal::Notify(TASK_DELETED.to_string()));
                signals
            }
            StoreOutcome::Deleted {
                task_id,
                result: Ok(false),
            } => {
                debug!(task_id, "task already gone, mirror unchanged");
                Vec::new()
            }
            StoreOutcome::Tasks(Err(e))
            | StoreOutcome::Profile(Err(e))
            | StoreOutcome::Deleted { result: Err(e), .. } => {
                warn!(error = %e, "store call failed");
                vec![ViewSignal::Notify(e.user_message())]
            }
        }
    }

    /// Apply every in-flight store call as it finishes
    pub async fn settle(&mut self) -> Vec<ViewSignal> {
        let mut signals = Vec::new();
        while let Some(outcome) = self.next_outcome().await {
            signals.extend(self.apply(outcome));
        }
        signals
    }

    /// Tap on a row
    pub fn on_item_click(&self, position: usize) -> Option<Navigation> {
        self.tasks
            .get(position)
            .map(|task| Navigation::Edit(EditRequest::from(task)))
    }

    /// Long-press on a row: the menu to show, or None if there is no row
    pub fn on_item_long_press(&self, position: usize) -> Option<&'static [ContextAction]> {
        self.tasks.get(position).map(|_| ContextAction::ALL)
    }

    /// Long-press menu choice on a row
    ///
    /// Show-time answers right away. Delete answers later through `apply`.
    pub fn on_context_action(&mut self, position: usize, action: ContextAction) -> Option<ViewSignal> {
        match action {
            ContextAction::ShowTime => self
                .tasks
                .get(position)
                .map(|task| ViewSignal::Notify(task.time.clone())),
            ContextAction::Delete => {
                if !self.spawn_delete(position) {
                    debug!(position, "delete on missing row ignored");
                }
                None
            }
        }
    }

    pub fn on_create(&self) -> Navigation {
        Navigation::Create
    }

    /// Clear the session and leave the screen's mirror empty
    pub async fn on_logout(&mut self) -> Result<Navigation> {
        self.session.logout().await?;
        self.tasks.clear();
        self.profile_name = None;
        Ok(Navigation::Login)
    }

    /// Leave the screen, cancelling and joining all background work
    pub async fn close(self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        info!("task list screen closed");
    }
}

impl Drop for TaskListScreen {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// No session means no tasks, never a query with a made-up id
async fn load_tasks(db: &Database, session: &Session) -> Result<Vec<Task>> {
    match session.current_user_id().await? {
        Some(user_id) => db.get_tasks(user_id).await,
        None => {
            debug!("no session, empty task list");
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewTask, Priority};
    use crate::error::TodoError;
    use std::time::Duration;

    async fn setup() -> (Arc<Database>, Session, i64) {
        let db = Arc::new(Database::new_test().await.unwrap());
        let session = Session::new(Arc::clone(&db));
        let user = db.create_user("Ada", "Lovelace").await.unwrap();

        for title in ["Buy milk", "Pay bills"] {
            let task = NewTask {
                title: title.to_string(),
                priority: Priority::High,
                time: format!("{} time", title),
                schedule_date: "2026-10-16".to_string(),
                schedule_time: "18:00".to_string(),
            };
            db.create_task(user, &task).await.unwrap();
        }

        session.login(user).await.unwrap();
        (db, session, user)
    }

    fn titles(screen: &TaskListScreen) -> Vec<String> {
        screen.tasks().iter().map(|t| t.title.clone()).collect()
    }

    #[tokio::test]
    async fn test_open_loads_tasks_and_name() {
        let (db, session, _user) = setup().await;
        let mut screen = TaskListScreen::open(db, session);

        let signals = screen.settle().await;

        assert!(signals.contains(&ViewSignal::Refresh));
        assert!(signals.contains(&ViewSignal::ProfileName("Ada Lovelace".to_string())));
        assert_eq!(titles(&screen), vec!["Buy milk", "Pay bills"]);
        assert_eq!(screen.profile_name(), Some("Ada Lovelace"));
        assert!(!screen.has_pending());
        screen.close().await;
    }

    #[tokio::test]
    async fn test_user_without_tasks() {
        let (db, session, _user) = setup().await;
        let other = db.create_user("Alan", "Turing").await.unwrap();
        session.login(other).await.unwrap();

        let mut screen = TaskListScreen::open(db, session);
        let signals = screen.settle().await;

        assert!(signals.contains(&ViewSignal::Refresh));
        assert!(screen.tasks().is_empty());
        screen.close().await;
    }

    #[tokio::test]
    async fn test_no_session_yields_empty_list() {
        let (db, session, _user) = setup().await;
        session.logout().await.unwrap();

        let mut screen = TaskListScreen::open(db, session);
        let signals = screen.settle().await;

        assert_eq!(signals, vec![ViewSignal::Refresh]);
        assert!(screen.tasks().is_empty());
        assert_eq!(screen.profile_name(), None);
        screen.close().await;
    }

    #[tokio::test]
    async fn test_delete_first_row() {
        let (db, session, user) = setup().await;
        let mut screen = TaskListScreen::open(Arc::clone(&db), session);
        screen.settle().await;

        assert_eq!(screen.on_context_action(0, ContextAction::Delete), None);
        let signals = screen.settle().await;

        assert_eq!(
            signals,
            vec![
                ViewSignal::ItemRemoved(0),
                ViewSignal::Notify(TASK_DELETED.to_string())
            ]
        );
        assert_eq!(titles(&screen), vec!["Pay bills"]);
        assert_eq!(db.get_tasks(user).await.unwrap().len(), 1);
        screen.close().await;
    }

    #[tokio::test]
    async fn test_two_deletes_in_flight() {
        let (db, session, user) = setup().await;
        let mut screen = TaskListScreen::open(Arc::clone(&db), session);
        screen.settle().await;

        // Positions as the user saw them before either delete landed
        assert!(screen.spawn_delete(0));
        assert!(screen.spawn_delete(1));
        screen.settle().await;

        assert!(screen.tasks().is_empty());
        assert!(db.get_tasks(user).await.unwrap().is_empty());
        screen.close().await;
    }

    #[tokio::test]
    async fn test_delete_missing_task_leaves_mirror() {
        let (db, session, _user) = setup().await;
        let mut screen = TaskListScreen::open(Arc::clone(&db), session);
        screen.settle().await;

        let gone = screen.tasks().get(1).unwrap().id;
        db.delete_task(gone).await.unwrap();

        assert!(screen.spawn_delete(1));
        let signals = screen.settle().await;

        assert!(signals.is_empty());
        assert_eq!(screen.tasks().len(), 2);
        screen.close().await;
    }

    #[tokio::test]
    async fn test_delete_out_of_range() {
        let (db, session, _user) = setup().await;
        let mut screen = TaskListScreen::open(db, session);
        screen.settle().await;

        assert!(!screen.spawn_delete(5));
        assert!(!screen.has_pending());
        assert_eq!(screen.tasks().len(), 2);
        screen.close().await;
    }

    #[tokio::test]
    async fn test_show_time() {
        let (db, session, _user) = setup().await;
        let mut screen = TaskListScreen::open(db, session);
        screen.settle().await;

        assert_eq!(
            screen.on_context_action(1, ContextAction::ShowTime),
            Some(ViewSignal::Notify("Pay bills time".to_string()))
        );
        assert_eq!(screen.on_context_action(9, ContextAction::ShowTime), None);
        screen.close().await;
    }

    #[tokio::test]
    async fn test_long_press_menu() {
        let (db, session, _user) = setup().await;
        let mut screen = TaskListScreen::open(db, session);
        screen.settle().await;

        let menu = screen.on_item_long_press(1).unwrap();
        assert_eq!(menu, &[ContextAction::ShowTime, ContextAction::Delete]);
        assert_eq!(screen.on_item_long_press(2), None);
        screen.close().await;
    }

    #[tokio::test]
    async fn test_item_click_opens_editor() {
        let (db, session, _user) = setup().await;
        let mut screen = TaskListScreen::open(db, session);
        screen.settle().await;

        match screen.on_item_click(0) {
            Some(Navigation::Edit(request)) => {
                assert_eq!(request.title, "Buy milk");
                assert_eq!(request.priority, "high");
                assert_eq!(request.schedule_time, "18:00");
            }
            other => panic!("Expected edit navigation, got {:?}", other),
        }
        assert_eq!(screen.on_item_click(2), None);
        assert_eq!(screen.on_create(), Navigation::Create);
        screen.close().await;
    }

    #[tokio::test]
    async fn test_reload_after_create() {
        let (db, session, user) = setup().await;
        let mut screen = TaskListScreen::open(Arc::clone(&db), session);
        screen.settle().await;

        db.create_task(user, &NewTask::titled("Call mom")).await.unwrap();
        screen.spawn_load_tasks();
        let signals = screen.settle().await;

        assert_eq!(signals, vec![ViewSignal::Refresh]);
        assert_eq!(titles(&screen), vec!["Buy milk", "Pay bills", "Call mom"]);
        screen.close().await;
    }

    #[tokio::test]
    async fn test_logout_then_reload() {
        let (db, session, _user) = setup().await;
        let mut screen = TaskListScreen::open(db, session.clone());
        screen.settle().await;

        assert_eq!(screen.on_logout().await.unwrap(), Navigation::Login);
        assert!(screen.tasks().is_empty());
        assert_eq!(session.current_user_id().await.unwrap(), None);

        screen.spawn_load_tasks();
        let signals = screen.settle().await;
        assert_eq!(signals, vec![ViewSignal::Refresh]);
        assert!(screen.tasks().is_empty());
        screen.close().await;
    }

    #[tokio::test]
    async fn test_store_failure_notifies() {
        let (db, session, _user) = setup().await;
        let mut screen = TaskListScreen::open(db, session);
        screen.settle().await;

        let signals = screen.apply(StoreOutcome::Tasks(Err(TodoError::Generic(
            "disk on fire".to_string(),
        ))));

        assert_eq!(signals, vec![ViewSignal::Notify("disk on fire".to_string())]);
        assert_eq!(screen.tasks().len(), 2);
        screen.close().await;
    }

    #[tokio::test]
    async fn test_received_but_unapplied_outcome_does_not_block() {
        let (db, session, _user) = setup().await;
        let mut screen = TaskListScreen::open(db, session);

        let dropped = screen.next_outcome().await;
        assert!(dropped.is_some());

        let rest = tokio::time::timeout(Duration::from_secs(2), screen.settle()).await;
        assert!(rest.is_ok(), "settle should only wait for the remaining call");
        assert!(!screen.has_pending());
        screen.close().await;
    }

    #[tokio::test]
    async fn test_direct_apply_keeps_pending_reload() {
        let (db, session, _user) = setup().await;
        let mut screen = TaskListScreen::open(db, session);
        screen.settle().await;

        screen.spawn_load_tasks();
        assert!(screen.apply(StoreOutcome::Profile(Ok(None))).is_empty());
        assert!(screen.has_pending());

        let signals = screen.settle().await;
        assert_eq!(signals, vec![ViewSignal::Refresh]);
        assert_eq!(screen.tasks().len(), 2);
        screen.close().await;
    }

    #[tokio::test]
    async fn test_close_cancels_pending_work() {
        let (db, session, _user) = setup().await;
        let mut screen = TaskListScreen::open(db, session);
        screen.settle().await;

        screen.spawn_store(std::future::pending::<StoreOutcome>());
        assert!(screen.has_pending());

        let closed = tokio::time::timeout(Duration::from_secs(2), screen.close()).await;
        assert!(closed.is_ok(), "close should join cancelled work");
    }
}
