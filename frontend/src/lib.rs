use sauron::{
    html::{attributes::*, *},
    prelude::*,
};
use shared::Task;
use uuid::Uuid;
use web_sys::{console, window, ScrollBehavior, ScrollToOptions};

pub mod api;
pub mod state;

use state::{Submission, TaskBoard};

#[derive(Debug, Clone)]
pub enum Msg {
    LoadTasks,
    TasksLoaded(Vec<Task>),
    LoadFailed(String),
    ToggleForm,
    CancelForm,
    SetDraftTitle(String),
    SetDraftDescription(String),
    SubmitForm,
    TaskCreated(Task),
    TaskSaved(Task),
    ToggleTask(Uuid),
    TaskUpdated(Task),
    EditTask(Uuid),
    DeleteTask(Uuid),
    TaskDeleted(Uuid),
    MutationFailed(String),
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    board: TaskBoard,
}

impl Application for Model {
    type MSG = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        Cmd::new(async { Msg::LoadTasks })
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::LoadTasks => {
                self.board.load_started();
                Cmd::new(async {
                    match api::fetch_tasks().await {
                        Ok(tasks) => Msg::TasksLoaded(tasks),
                        Err(e) => Msg::LoadFailed(e.to_string()),
                    }
                })
            }
            Msg::TasksLoaded(tasks) => {
                self.board.load_succeeded(tasks);
                Cmd::none()
            }
            Msg::LoadFailed(reason) => {
                console::error_1(&format!("Loading tasks failed: {reason}").into());
                self.board.load_failed(reason);
                Cmd::none()
            }
            Msg::ToggleForm => {
                self.board.toggle_form();
                Cmd::none()
            }
            Msg::CancelForm => {
                self.board.close_form();
                Cmd::none()
            }
            Msg::SetDraftTitle(text_value) => {
                self.board.set_draft_title(text_value);
                Cmd::none()
            }
            Msg::SetDraftDescription(text_value) => {
                self.board.set_draft_description(text_value);
                Cmd::none()
            }
            Msg::SubmitForm => match self.board.submission() {
                Some(Submission::Create(request)) => Cmd::new(async move {
                    match api::create_task(request).await {
                        Ok(task) => Msg::TaskCreated(task),
                        Err(e) => Msg::MutationFailed(e.to_string()),
                    }
                }),
                Some(Submission::Update(task_id, request)) => Cmd::new(async move {
                    match api::update_task(task_id, request).await {
                        Ok(task) => Msg::TaskSaved(task),
                        Err(e) => Msg::MutationFailed(e.to_string()),
                    }
                }),
                None => Cmd::none(),
            },
            Msg::TaskCreated(task) => {
                self.board.task_created(task);
                Cmd::none()
            }
            Msg::TaskSaved(task) => {
                self.board.task_saved(task);
                Cmd::none()
            }
            Msg::ToggleTask(task_id) => match self.board.toggle_request(task_id) {
                Some(request) => Cmd::new(async move {
                    match api::update_task(task_id, request).await {
                        Ok(task) => Msg::TaskUpdated(task),
                        Err(e) => Msg::MutationFailed(e.to_string()),
                    }
                }),
                None => Cmd::none(),
            },
            Msg::TaskUpdated(task) => {
                self.board.task_updated(task);
                Cmd::none()
            }
            Msg::EditTask(task_id) => {
                if self.board.start_editing(task_id) {
                    scroll_to_top();
                }
                Cmd::none()
            }
            Msg::DeleteTask(task_id) => {
                if !confirm("Are you sure you want to delete this task?") {
                    return Cmd::none();
                }
                Cmd::new(async move {
                    match api::delete_task(task_id).await {
                        Ok(()) => Msg::TaskDeleted(task_id),
                        Err(e) => Msg::MutationFailed(e.to_string()),
                    }
                })
            }
            Msg::TaskDeleted(task_id) => {
                self.board.task_deleted(task_id);
                Cmd::none()
            }
            Msg::MutationFailed(reason) => {
                console::error_1(&reason.clone().into());
                alert(&reason);
                Cmd::none()
            }
        }
    }

    fn view(&self) -> Node<Msg> {
        div(
            [class("min-h-screen bg-ctp-base text-ctp-text")],
            [div(
                [class("max-w-3xl mx-auto px-4 py-8 sm:py-12")],
                [
                    self.view_header(),
                    div(
                        [class("space-y-8")],
                        [
                            self.view_error(),
                            self.view_form(),
                            self.view_task_section(),
                        ],
                    ),
                ],
            )],
        )
    }
}

impl Model {
    fn view_header(&self) -> Node<Msg> {
        let form_open = self.board.is_form_visible();
        header([class("mb-8 sm:mb-12 flex flex-col sm:flex-row sm:items-center justify-between gap-4")], [
            div([], [
                h1([class("text-3xl sm:text-4xl font-extrabold text-ctp-mauve tracking-tight")], [text("Task Master")]),
                p([class("text-ctp-subtext0 mt-2 text-lg")], [text("Manage your day with elegance.")]),
            ]),
            button([
                on_click(|_| Msg::ToggleForm),
                class(&format!(
                    "px-6 py-3 rounded-xl font-semibold shadow-lg transition-colors duration-200 {}",
                    if form_open {
                        "bg-ctp-surface0 text-ctp-text border border-ctp-surface2 hover:bg-ctp-surface1"
                    } else {
                        "bg-ctp-blue text-ctp-base hover:bg-ctp-sapphire"
                    }
                )),
            ], [
                if form_open { text("Cancel") } else { text("+ New Task") }
            ]),
        ])
    }

    fn view_error(&self) -> Node<Msg> {
        match self.board.error() {
            Some(reason) => div([class("p-4 bg-ctp-red/10 text-ctp-red rounded-xl border border-ctp-red/30 flex items-center gap-3")], [
                span([class("flex-shrink-0")], [text("⚠")]),
                text(reason),
            ]),
            None => span([], []),
        }
    }

    fn view_form(&self) -> Node<Msg> {
        if !self.board.is_form_visible() {
            return span([], []);
        }
        let draft = self.board.draft();
        let is_editing = self.board.editing().is_some();

        div([class("bg-ctp-surface0 p-6 sm:p-8 rounded-3xl shadow-xl border border-ctp-surface1")], [
            h2([class("text-xl font-bold text-ctp-text mb-6")], [
                if is_editing { text("Edit Task") } else { text("Create New Task") }
            ]),
            div([class("space-y-4")], [
                div([], [
                    label([class("block text-sm font-medium text-ctp-subtext1 mb-1")], [text("Task Title")]),
                    input([
                        r#type("text"),
                        placeholder("What needs to be done?"),
                        value(&draft.title),
                        on_input(|event| Msg::SetDraftTitle(event.value())),
                        class("w-full px-4 py-2 rounded-xl bg-ctp-surface1 border border-ctp-surface2 text-ctp-text placeholder-ctp-subtext0 focus:outline-none focus:ring-2 focus:ring-ctp-blue"),
                    ], []),
                ]),
                div([], [
                    label([class("block text-sm font-medium text-ctp-subtext1 mb-1")], [
                        text("Description "),
                        span([class("text-ctp-overlay0 font-normal")], [text("(Optional)")]),
                    ]),
                    textarea([
                        placeholder("Add some details..."),
                        value(&draft.description),
                        on_input(|event| Msg::SetDraftDescription(event.value())),
                        class("w-full px-4 py-2 rounded-xl bg-ctp-surface1 border border-ctp-surface2 text-ctp-text placeholder-ctp-subtext0 focus:outline-none focus:ring-2 focus:ring-ctp-blue h-24 resize-none"),
                    ], []),
                ]),
                div([class("flex items-center justify-end gap-3 pt-2")], [
                    button([
                        r#type("button"),
                        on_click(|_| Msg::CancelForm),
                        class("px-4 py-2 text-sm font-medium text-ctp-subtext1 hover:text-ctp-text hover:bg-ctp-surface1 rounded-lg transition-colors duration-200"),
                    ], [text("Cancel")]),
                    button([
                        r#type("button"),
                        on_click(|_| Msg::SubmitForm),
                        disabled(!self.board.can_submit()),
                        class("px-6 py-2 bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base text-sm font-medium rounded-xl transition-colors duration-200 disabled:opacity-50 disabled:cursor-not-allowed"),
                    ], [
                        if is_editing { text("Update Task") } else { text("Add Task") }
                    ]),
                ]),
            ]),
        ])
    }

    fn view_task_section(&self) -> Node<Msg> {
        div([], [
            div([class("flex items-center justify-between mb-6")], [
                h2([class("text-2xl font-bold text-ctp-text")], [text("Your Tasks")]),
                span([class("bg-ctp-blue/20 text-ctp-blue px-3 py-1 rounded-full text-sm font-medium")], [
                    text(&format!("{} pending", self.board.pending_count()))
                ]),
            ]),
            if self.board.is_loading() {
                div(
                    [class("space-y-4 animate-pulse")],
                    (0..3).map(|_| div([class("h-24 bg-ctp-surface1 rounded-2xl")], [])).collect::<Vec<_>>(),
                )
            } else {
                self.view_task_list()
            },
        ])
    }

    fn view_task_list(&self) -> Node<Msg> {
        let tasks = self.board.tasks();
        if tasks.is_empty() {
            return div([class("text-center py-12 px-4 rounded-3xl bg-ctp-mantle border border-dashed border-ctp-surface2")], [
                div([class("text-ctp-overlay0 text-5xl mb-4")], [text("📋")]),
                h3([class("text-lg font-medium text-ctp-text mb-1")], [text("No tasks yet")]),
                p([class("text-ctp-subtext0 max-w-sm mx-auto")], [
                    text("Get started by creating a new task above. Your daily goals await!")
                ]),
            ]);
        }

        div(
            [class("space-y-4")],
            tasks.iter().map(|task| self.view_task(task)).collect::<Vec<_>>(),
        )
    }

    fn view_task(&self, task: &Task) -> Node<Msg> {
        let task_id = task.id;
        let created_on = task.created_at.format("%b %-d, %Y").to_string();

        div(
            [key(task.id.to_string()),
            class(&format!(
                "group relative p-6 rounded-2xl border transition-all duration-300 hover:shadow-lg {}",
                if task.is_completed {
                    "bg-ctp-mantle border-ctp-surface1 opacity-75"
                } else {
                    "bg-ctp-surface0 border-ctp-surface1 hover:border-ctp-blue"
                }
            ))],
            [div([class("flex items-start justify-between gap-4")], [
                div([class("flex-1 min-w-0")], [
                    div([class("flex items-center gap-3 mb-2")], [
                        button([
                            on_click(move |_| Msg::ToggleTask(task_id)),
                            class(&format!(
                                "flex-shrink-0 w-6 h-6 rounded-full border-2 flex items-center justify-center transition-colors duration-200 {}",
                                if task.is_completed {
                                    "bg-ctp-green border-ctp-green text-ctp-base"
                                } else {
                                    "border-ctp-surface2 hover:border-ctp-blue text-transparent"
                                }
                            )),
                        ], [text("✓")]),
                        h3([class(&format!(
                            "text-lg font-semibold truncate {}",
                            if task.is_completed { "text-ctp-overlay1 line-through" } else { "text-ctp-text" }
                        ))], [text(&task.title)]),
                    ]),
                    p([class("text-ctp-subtext1 text-sm leading-relaxed pl-9")], [
                        if task.description.is_empty() {
                            text("No description provided.")
                        } else {
                            text(&task.description)
                        }
                    ]),
                    div([class("mt-3 pl-9 flex items-center gap-2 text-xs text-ctp-overlay0")], [
                        span([], [text(&created_on)]),
                    ]),
                ]),
                div([class("flex flex-col gap-2 opacity-0 group-hover:opacity-100 transition-opacity")], [
                    button([
                        r#type("button"),
                        on_click(move |_| Msg::EditTask(task_id)),
                        class("p-2 text-ctp-overlay1 hover:text-ctp-blue hover:bg-ctp-blue/10 rounded-lg transition-colors duration-200"),
                    ], [text("✏️")]),
                    button([
                        r#type("button"),
                        on_click(move |_| Msg::DeleteTask(task_id)),
                        class("p-2 text-ctp-overlay1 hover:text-ctp-red hover:bg-ctp-red/10 rounded-lg transition-colors duration-200"),
                    ], [text("🗑️")]),
                ]),
            ])],
        )
    }
}

fn confirm(prompt: &str) -> bool {
    window()
        .and_then(|w| w.confirm_with_message(prompt).ok())
        .unwrap_or(false)
}

fn alert(reason: &str) {
    if let Some(w) = window() {
        if let Err(e) = w.alert_with_message(reason) {
            console::error_1(&e);
        }
    }
}

fn scroll_to_top() {
    if let Some(w) = window() {
        let scroll = ScrollToOptions::new();
        scroll.set_top(0.0);
        scroll.set_behavior(ScrollBehavior::Smooth);
        w.scroll_to_with_scroll_to_options(&scroll);
    }
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    Program::mount_to_body(Model::default());
}
