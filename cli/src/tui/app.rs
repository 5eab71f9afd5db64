use ratatui::widgets::TableState;
use tasklist_core::{parse_draft, KeyValueStorage, Task, TaskCommand, TaskId, TaskStore, ViewQuery};

pub enum InputMode {
    Normal,
    Adding,
    Searching,
}

pub struct App<'a, S: KeyValueStorage> {
    pub store: &'a mut TaskStore<S>,
    pub query: ViewQuery,
    pub view: Vec<Task>,
    pub state: TableState,
    pub input: String,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub message: Option<String>,
}

impl<'a, S: KeyValueStorage> App<'a, S> {
    pub fn new(store: &'a mut TaskStore<S>) -> Self {
        let mut app = App {
            store,
            query: ViewQuery::default(),
            view: Vec::new(),
            state: TableState::default(),
            input: String::new(),
            input_mode: InputMode::Normal,
            cursor_position: 0,
            message: None,
        };
        app.refresh();
        app
    }

    /// Re-derives the displayed list and keeps the selection in range.
    pub fn refresh(&mut self) {
        self.view = self.query.apply(self.store.tasks());
        let selected = match self.state.selected() {
            _ if self.view.is_empty() => None,
            Some(i) if i >= self.view.len() => Some(self.view.len() - 1),
            Some(i) => Some(i),
            None => Some(0),
        };
        self.state.select(selected);
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.state.selected().and_then(|i| self.view.get(i))
    }

    fn selected_id(&self) -> Option<TaskId> {
        self.selected_task().map(|t| t.id)
    }

    pub fn next(&mut self) {
        if self.view.is_empty() {
            return;
        }

        let i = match self.state.selected() {
            Some(i) if i + 1 < self.view.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.view.is_empty() {
            return;
        }

        let i = match self.state.selected() {
            Some(0) | None => self.view.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn dispatch(&mut self, command: TaskCommand) {
        self.store.apply(command);
        self.refresh();
    }

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.dispatch(TaskCommand::ToggleComplete(id));
            // Keep the cursor on the toggled task if it is still visible.
            if let Some(pos) = self.view.iter().position(|t| t.id == id) {
                self.state.select(Some(pos));
            }
        }
    }

    pub fn remove_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.dispatch(TaskCommand::Remove(id));
        }
    }

    pub fn cycle_filter(&mut self) {
        self.query.filter = self.query.filter.next();
        self.refresh();
    }

    pub fn toggle_sort(&mut self) {
        self.query.sort = self.query.sort.toggle();
        self.refresh();
    }

    pub fn enter_add_mode(&mut self) {
        self.input_mode = InputMode::Adding;
        self.input.clear();
        self.cursor_position = 0;
        self.message = None;
    }

    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Searching;
        self.input = self.query.search.clone();
        self.cursor_position = self.input.chars().count();
        self.message = None;
    }

    pub fn exit_input_mode(&mut self) {
        if let InputMode::Searching = self.input_mode {
            // Esc while searching clears the search.
            self.query.search.clear();
            self.refresh();
        }
        self.input.clear();
        self.cursor_position = 0;
        self.input_mode = InputMode::Normal;
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self.byte_index(self.cursor_position);
        self.input.insert(byte_index, c);
        self.cursor_position += 1;
        self.on_input_changed();
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index = self.byte_index(self.cursor_position - 1);
            self.input.remove(byte_index);
            self.cursor_position -= 1;
            self.on_input_changed();
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.input.chars().take(chars).map(|c| c.len_utf8()).sum()
    }

    fn on_input_changed(&mut self) {
        // Search filters as you type.
        if let InputMode::Searching = self.input_mode {
            self.query.search = self.input.clone();
            self.refresh();
        }
    }

    pub fn submit_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.submit_add(),
            InputMode::Searching => {}
            InputMode::Normal => return,
        }
        self.input.clear();
        self.cursor_position = 0;
        self.input_mode = InputMode::Normal;
    }

    fn submit_add(&mut self) {
        if self.input.trim().is_empty() {
            return;
        }
        let args: Vec<String> = self.input.split_whitespace().map(|s| s.to_string()).collect();
        match parse_draft(&args) {
            Ok(draft) => {
                self.dispatch(TaskCommand::Add(draft));
                let added = self.store.tasks().last().map(|t| t.id);
                if let Some(pos) = self.view.iter().position(|t| Some(t.id) == added) {
                    self.state.select(Some(pos));
                }
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }
}
