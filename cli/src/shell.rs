//! Interactive session over one `TodoBoard`.
//!
//! # Design
//! The board is loaded once and then kept in sync optimistically: toggles and
//! deletes change the local list before the request is sent and are repaired
//! from the response. Re-fetches go through a [`Debounce`], so a burst of
//! failures produces one list request. Items are addressed by their position
//! in the current filtered view.

use std::io::{BufRead, BufReader, Read, Write};
use std::thread;
use std::time::Instant;

use anyhow::Result;
use todo_core::{board::error_text, Debounce, Filter, TodoBoard, TodoClient, TodoForm};
use uuid::Uuid;

use crate::render;
use crate::transport::Transport;

const HELP: &str = "\
commands:
  ls                      show the list
  filter <all|completed|incomplete>
  add <title>             add an item
  toggle <n>              flip item n
  rm <n>                  delete item n
  refresh                 reload from the server
  help                    show this text
  quit                    leave";

pub struct Shell {
    client: TodoClient,
    transport: Transport,
    board: TodoBoard,
    filter: Filter,
    refetch: Debounce,
}

impl Shell {
    pub fn new(client: TodoClient, transport: Transport) -> Self {
        Self {
            client,
            transport,
            board: TodoBoard::new(),
            filter: Filter::All,
            refetch: Debounce::default(),
        }
    }

    /// Commands already queued behind the current one are applied without
    /// redrawing; the pending re-fetch settles and the board renders once
    /// the input catches up, or on an explicit `ls`. A burst of `refresh`
    /// lines therefore costs one list request.
    pub fn run<R: Read>(mut self, mut input: BufReader<R>, mut out: impl Write) -> Result<()> {
        self.refetch.trigger(Instant::now());
        self.settle();
        writeln!(out, "{}", render::board(&self.board, self.filter))?;

        let mut line = String::new();
        loop {
            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let mut words = line.split_whitespace();
            let Some(command) = words.next() else {
                continue;
            };
            let rest: Vec<&str> = words.collect();

            match command {
                "quit" | "exit" => break,
                "help" => {
                    writeln!(out, "{HELP}")?;
                    continue;
                }
                "ls" => {}
                "refresh" => self.refetch.trigger(Instant::now()),
                "filter" => match rest.first().copied().and_then(parse_filter) {
                    Some(filter) => self.filter = filter,
                    None => writeln!(out, "usage: filter <all|completed|incomplete>")?,
                },
                "add" => self.add(&rest.join(" "), &mut out)?,
                "toggle" => match self.pick(rest.first().copied()) {
                    Some(id) => self.toggle(id),
                    None => writeln!(out, "usage: toggle <n>")?,
                },
                "rm" | "delete" => match self.pick(rest.first().copied()) {
                    Some(id) => self.delete(id),
                    None => writeln!(out, "usage: rm <n>")?,
                },
                other => {
                    writeln!(out, "unknown command: {other} (try help)")?;
                    continue;
                }
            }

            if command != "ls" && !input.buffer().is_empty() {
                continue;
            }
            self.settle();
            writeln!(
                out,
                "[{}]\n{}",
                render::filter_name(self.filter),
                render::board(&self.board, self.filter)
            )?;
        }
        self.refetch.cancel();
        Ok(())
    }

    /// Wait out a pending re-fetch window, then load the list once.
    fn settle(&mut self) {
        let Some(wait) = self.refetch.remaining(Instant::now()) else {
            return;
        };
        thread::sleep(wait);
        if self.refetch.fire(Instant::now()) {
            self.board.begin_fetch();
            let result = self
                .transport
                .execute(self.client.build_list_todos())
                .and_then(|response| self.client.parse_list_todos(response));
            self.board.finish_fetch(result);
        }
    }

    fn pick(&self, arg: Option<&str>) -> Option<Uuid> {
        let n: usize = arg?.parse().ok()?;
        let visible = self.board.visible(self.filter);
        visible.get(n.checked_sub(1)?).map(|todo| todo.id)
    }

    fn add(&mut self, title: &str, out: &mut impl Write) -> Result<()> {
        let mut form = TodoForm::new();
        form.title = title.to_string();
        let Some(request) = form.submit(&self.client) else {
            writeln!(out, "{}", form.error().unwrap_or_default())?;
            return Ok(());
        };
        match self
            .transport
            .execute(request)
            .and_then(|response| self.client.parse_create_todo(response))
        {
            Ok(todo) => {
                tracing::info!(todo_id = %todo.id, "created");
                form.submit_succeeded();
            }
            Err(err) => {
                form.submit_failed(&err);
                writeln!(out, "{}", form.error().unwrap_or_default())?;
            }
        }
        self.refetch.trigger(Instant::now());
        Ok(())
    }

    fn toggle(&mut self, id: Uuid) {
        let Some(pending) = self.board.toggle_optimistic(id) else {
            return;
        };
        let result = pending
            .request(&self.client)
            .and_then(|request| self.transport.execute(request))
            .and_then(|response| self.client.parse_update_todo(response));
        if let Err(err) = result {
            tracing::warn!(todo_id = %id, error = %err, "toggle failed, reverting");
            self.board.toggle_failed(pending, &err);
        }
    }

    fn delete(&mut self, id: Uuid) {
        let request = self.board.delete_optimistic(&self.client, id);
        let result = self
            .transport
            .execute(request)
            .and_then(|response| self.client.parse_delete_todo(response));
        if let Err(err) = result {
            tracing::warn!(todo_id = %id, error = %err, "delete failed: {}", error_text(&err));
            let _resync = self.board.delete_failed(&err);
            self.refetch.trigger(Instant::now());
        }
    }
}

pub fn parse_filter(raw: &str) -> Option<Filter> {
    match raw.to_ascii_lowercase().as_str() {
        "all" => Some(Filter::All),
        "completed" | "done" => Some(Filter::Completed),
        "incomplete" | "open" => Some(Filter::Incomplete),
        _ => None,
    }
}
