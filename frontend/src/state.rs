//! UI state container.
//!
//! All mutation of what the page shows goes through the transition methods
//! below. Server responses are the only source of task data: nothing is
//! changed optimistically, and a failed request leaves the board as it was.

use shared::{CreateTaskRequest, Task, UpdateTaskRequest};
use uuid::Uuid;

/// Contents of the create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub description: String,
}

impl Draft {
    fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
        }
    }
}

/// What submitting the form should send.
#[derive(Debug, Clone)]
pub enum Submission {
    Create(CreateTaskRequest),
    Update(Uuid, UpdateTaskRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    editing: Option<Task>,
    loading: bool,
    error: Option<String>,
    form_visible: bool,
    draft: Draft,
}

impl Default for TaskBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskBoard {
    /// A board waiting for its first load.
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            editing: None,
            loading: true,
            error: None,
            form_visible: false,
            draft: Draft::default(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn editing(&self) -> Option<&Task> {
        self.editing.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_form_visible(&self) -> bool {
        self.form_visible
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_completed).count()
    }

    pub fn can_submit(&self) -> bool {
        !self.draft.title.trim().is_empty()
    }

    pub fn load_started(&mut self) {
        self.loading = true;
    }

    pub fn load_succeeded(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.error = None;
        self.loading = false;
    }

    pub fn load_failed(&mut self, message: String) {
        self.tasks.clear();
        self.error = Some(message);
        self.loading = false;
    }

    /// The header button: opens a blank create form, or closes whatever form
    /// is open.
    pub fn toggle_form(&mut self) {
        self.editing = None;
        self.draft = Draft::default();
        self.form_visible = !self.form_visible;
    }

    pub fn close_form(&mut self) {
        self.editing = None;
        self.draft = Draft::default();
        self.form_visible = false;
    }

    /// Loads the task into the form. Returns false if the id is not on the
    /// board.
    pub fn start_editing(&mut self, id: Uuid) -> bool {
        let Some(task) = self.tasks.iter().find(|t| t.id == id) else {
            return false;
        };
        self.draft = Draft::from_task(task);
        self.editing = Some(task.clone());
        self.form_visible = true;
        true
    }

    pub fn set_draft_title(&mut self, value: String) {
        self.draft.title = value;
    }

    pub fn set_draft_description(&mut self, value: String) {
        self.draft.description = value;
    }

    /// The request the form would send, or `None` while the title is blank.
    pub fn submission(&self) -> Option<Submission> {
        if !self.can_submit() {
            return None;
        }
        let draft = self.draft.clone();
        Some(match &self.editing {
            Some(task) => Submission::Update(
                task.id,
                UpdateTaskRequest {
                    title: Some(draft.title),
                    description: Some(draft.description),
                    is_completed: None,
                },
            ),
            None => Submission::Create(CreateTaskRequest {
                title: draft.title,
                description: Some(draft.description),
            }),
        })
    }

    /// The request that flips a task's completion flag.
    pub fn toggle_request(&self, id: Uuid) -> Option<UpdateTaskRequest> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .map(|task| UpdateTaskRequest {
                is_completed: Some(!task.is_completed),
                ..UpdateTaskRequest::default()
            })
    }

    pub fn task_created(&mut self, task: Task) {
        self.tasks.insert(0, task);
        self.close_form();
    }

    /// A server-confirmed update from a toggle. The form is left alone.
    pub fn task_updated(&mut self, task: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *slot = task;
        }
    }

    /// A server-confirmed update from the edit form.
    pub fn task_saved(&mut self, task: Task) {
        self.task_updated(task);
        self.close_form();
    }

    pub fn task_deleted(&mut self, id: Uuid) {
        self.tasks.retain(|t| t.id != id);
        if self.editing.as_ref().is_some_and(|t| t.id == id) {
            self.close_form();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::NewTask;

    fn task(title_text: &str) -> Task {
        Task::new(NewTask::new(title_text, Some("details")).unwrap(), Utc::now())
    }

    fn loaded(tasks: Vec<Task>) -> TaskBoard {
        let mut board = TaskBoard::new();
        board.load_succeeded(tasks);
        board
    }

    #[test]
    fn failed_load_shows_error_without_tasks_or_spinner() {
        let mut board = TaskBoard::new();
        assert!(board.is_loading());

        board.load_failed("Failed to fetch tasks".to_string());

        assert!(!board.is_loading());
        assert_eq!(board.error(), Some("Failed to fetch tasks"));
        assert!(board.tasks().is_empty());
    }

    #[test]
    fn successful_load_clears_previous_error() {
        let mut board = TaskBoard::new();
        board.load_failed("offline".to_string());
        board.load_started();
        board.load_succeeded(vec![task("a")]);

        assert_eq!(board.error(), None);
        assert_eq!(board.tasks().len(), 1);
        assert!(!board.is_loading());
    }

    #[test]
    fn created_task_is_prepended_and_form_closes() {
        let mut board = loaded(vec![task("old")]);
        board.toggle_form();
        board.set_draft_title("new".to_string());

        let created = task("new");
        board.task_created(created.clone());

        assert_eq!(board.tasks()[0], created);
        assert!(!board.is_form_visible());
        assert_eq!(board.draft(), &Draft::default());
    }

    #[test]
    fn blank_draft_cannot_be_submitted() {
        let mut board = loaded(Vec::new());
        board.toggle_form();
        board.set_draft_title("   ".to_string());
        assert!(board.submission().is_none());

        board.set_draft_title("Write tests".to_string());
        assert!(matches!(
            board.submission(),
            Some(Submission::Create(CreateTaskRequest { title, .. })) if title == "Write tests"
        ));
    }

    #[test]
    fn editing_loads_target_and_resets_on_switch() {
        let first = task("first");
        let second = task("second");
        let mut board = loaded(vec![first.clone(), second.clone()]);

        assert!(board.start_editing(first.id));
        board.set_draft_title("unsaved change".to_string());

        assert!(board.start_editing(second.id));
        assert_eq!(board.draft().title, "second");
        assert_eq!(board.editing().map(|t| t.id), Some(second.id));
        assert!(board.is_form_visible());

        board.toggle_form();
        assert_eq!(board.editing(), None);
        assert_eq!(board.draft(), &Draft::default());
    }

    #[test]
    fn edit_submission_targets_the_edited_task() {
        let target = task("before");
        let mut board = loaded(vec![target.clone()]);
        board.start_editing(target.id);
        board.set_draft_title("after".to_string());

        match board.submission() {
            Some(Submission::Update(id, request)) => {
                assert_eq!(id, target.id);
                assert_eq!(request.title.as_deref(), Some("after"));
                assert_eq!(request.is_completed, None);
            }
            other => panic!("expected update submission, got {other:?}"),
        }
    }

    #[test]
    fn saved_task_replaces_by_id_and_closes_form() {
        let target = task("before");
        let other = task("other");
        let mut board = loaded(vec![target.clone(), other.clone()]);
        board.start_editing(target.id);

        let mut saved = target.clone();
        saved.title = "after".to_string();
        board.task_saved(saved.clone());

        assert_eq!(board.tasks(), &[saved, other]);
        assert_eq!(board.editing(), None);
        assert!(!board.is_form_visible());
    }

    #[test]
    fn pending_requests_leave_the_board_untouched() {
        let target = task("keep");
        let mut board = loaded(vec![target.clone()]);
        board.start_editing(target.id);
        board.set_draft_title("renamed".to_string());
        let before = board.clone();

        assert!(board.submission().is_some());
        assert!(board.toggle_request(target.id).is_some());

        assert_eq!(board, before);
        assert_eq!(board.tasks(), &[target]);
        assert_eq!(board.draft().title, "renamed");
    }

    #[test]
    fn toggle_request_flips_flag_only() {
        let target = task("toggle me");
        let board = loaded(vec![target.clone()]);

        let request = board.toggle_request(target.id).unwrap();
        assert_eq!(request.is_completed, Some(true));
        assert_eq!(request.title, None);
        assert!(board.toggle_request(Uuid::new_v4()).is_none());
    }

    #[test]
    fn toggle_update_keeps_open_form() {
        let target = task("toggle me");
        let mut board = loaded(vec![target.clone()]);
        board.toggle_form();
        board.set_draft_title("half typed".to_string());

        let mut completed = target.clone();
        completed.is_completed = true;
        board.task_updated(completed);

        assert_eq!(board.pending_count(), 0);
        assert!(board.is_form_visible());
        assert_eq!(board.draft().title, "half typed");
    }

    #[test]
    fn deleting_edited_task_resets_form() {
        let target = task("doomed");
        let mut board = loaded(vec![target.clone()]);
        board.start_editing(target.id);

        board.task_deleted(target.id);

        assert!(board.tasks().is_empty());
        assert_eq!(board.editing(), None);
        assert!(!board.is_form_visible());
    }
}
