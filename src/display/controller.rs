//! Board event loop.
//!
//! A `BoardController` owns a [`DisplaySession`] on one thread. User input,
//! resolved fetches and shutdown arrive as [`BoardEvent`]s on a channel; the
//! loop sleeps until the next event or the live timer's deadline, whichever
//! comes first. Each fetch runs on its own OS thread and reports back through
//! the same channel, so the board never blocks on the network. Page sources
//! do blocking socket I/O, which must stay off the coroutine scheduler.

use crate::client::{ClientFetchError, PageSource};
use crate::display::session::{DisplaySession, FetchCommand};
use crate::model::PageResult;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

#[derive(Debug)]
pub enum BoardEvent {
    NextPage,
    PreviousPage,
    GoToPage(u32),
    Search(String),
    Refresh,
    ToggleAutoSlide,
    Resolved {
        sequence: u64,
        outcome: Result<PageResult, ClientFetchError>,
    },
    Shutdown,
}

/// Draws the board after every state change.
pub trait BoardRenderer: Send {
    fn render(&mut self, session: &DisplaySession);
}

/// Posts events to a running controller from any thread.
#[derive(Clone)]
pub struct BoardHandle {
    sender: Sender<BoardEvent>,
}

impl BoardHandle {
    /// False once the controller has stopped.
    pub fn send(&self, event: BoardEvent) -> bool {
        self.sender.send(event).is_ok()
    }

    pub fn shutdown(&self) {
        let _ = self.sender.send(BoardEvent::Shutdown);
    }
}

pub struct BoardController<R> {
    session: DisplaySession,
    source: Arc<dyn PageSource>,
    renderer: R,
    initial_search: String,
    sender: Sender<BoardEvent>,
    events: Receiver<BoardEvent>,
}

impl<R: BoardRenderer> BoardController<R> {
    pub fn new(
        session: DisplaySession,
        source: Arc<dyn PageSource>,
        renderer: R,
        initial_search: &str,
    ) -> (Self, BoardHandle) {
        let (sender, events) = unbounded();
        let handle = BoardHandle {
            sender: sender.clone(),
        };
        let controller = Self {
            session,
            source,
            renderer,
            initial_search: initial_search.to_string(),
            sender,
            events,
        };
        (controller, handle)
    }

    /// Run until `Shutdown`; returns the renderer and final session.
    pub fn run(mut self) -> (R, DisplaySession) {
        let first = self.session.mount(&self.initial_search, Instant::now());
        self.spawn_fetch(first);
        self.renderer.render(&self.session);

        loop {
            let received = match self.session.timer() {
                Some(timer) => self.events.recv_deadline(timer.due),
                None => self.events.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            let keep_running = match received {
                Ok(event) => self.handle(event),
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(timer) = self.session.timer() {
                        if let Some(cmd) = self.session.on_timer(timer.id, Instant::now()) {
                            log::debug!("auto-slide to page {}", cmd.request.page);
                            self.spawn_fetch(cmd);
                        }
                    }
                    true
                }
                Err(RecvTimeoutError::Disconnected) => false,
            };
            if !keep_running {
                break;
            }
            self.renderer.render(&self.session);
        }

        self.session.unmount();
        (self.renderer, self.session)
    }

    fn handle(&mut self, event: BoardEvent) -> bool {
        let now = Instant::now();
        let command = match event {
            BoardEvent::NextPage => Some(self.session.next_page(now)),
            BoardEvent::PreviousPage => Some(self.session.previous_page(now)),
            BoardEvent::GoToPage(page) => Some(self.session.go_to_page(page, now)),
            BoardEvent::Search(term) => Some(self.session.submit_search(&term, now)),
            BoardEvent::Refresh => Some(self.session.refresh(now)),
            BoardEvent::ToggleAutoSlide => {
                self.session.toggle_auto_slide(now);
                None
            }
            BoardEvent::Resolved { sequence, outcome } => {
                self.session.apply(sequence, outcome);
                None
            }
            BoardEvent::Shutdown => return false,
        };
        if let Some(cmd) = command {
            self.spawn_fetch(cmd);
        }
        true
    }

    fn spawn_fetch(&self, cmd: FetchCommand) {
        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();
        let FetchCommand { sequence, request } = cmd;
        let spawned = thread::Builder::new()
            .name(format!("board-fetch-{sequence}"))
            .spawn(move || {
                let outcome = source.fetch(&request);
                // The board may already be gone; nothing left to update then.
                let _ = sender.send(BoardEvent::Resolved { sequence, outcome });
            });
        if let Err(err) = spawned {
            log::error!("failed to start fetch {sequence}: {err}");
            let _ = self.sender.send(BoardEvent::Resolved {
                sequence,
                outcome: Err(ClientFetchError::Network(err.to_string())),
            });
        }
    }
}
