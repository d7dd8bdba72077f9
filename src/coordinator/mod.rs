//! Session coordinator.
//!
//! The [`Coordinator`] is the aggregate root of one selection session. It
//! owns the line buffer, query, matcher and selection, the published filtered
//! view, exit signalling and result delivery. The four loops hold clones of
//! the same handle and talk to each other only through it.
//!
//! # Locking
//!
//! - `session` (buffer + query + matcher + generation) is one mutex, so a
//!   filter pass always snapshots a consistent triple.
//! - `selection` is separate; it is never locked while `session` is held.
//! - The view is an `RwLock<Arc<FilteredView>>`; writers swap the `Arc`.
//!
//! Poisoned locks are recovered: a loop that panicked mid-update is recorded
//! as a fault and the session winds down on the state it left behind.

pub mod debounce;
pub mod exit;
pub mod result;

use crate::config::{Config, KeyBindings};
use crate::loops::{self, FilterRequest, RenderRequest};
use crate::matcher::{Matcher, Registry};
use crate::model::{
    ConfigurationError, Error, ExitStatus, FilteredView, Layout, Line, LineId, LoopFault, Match,
};
use crate::state::QueryState;
use crate::state::Selection;
use crate::terminal::Backend;
use crate::view::RenderSnapshot;
use debounce::{Debouncer, DEFAULT_DELAY};
use exit::ExitSignal;
use result::ResultSlot;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, error, info, warn};

/// List rows assumed for paging before the first frame is drawn.
const DEFAULT_PAGE_ROWS: usize = 10;

// ===== Session state =====

/// State a filter pass reads. Guarded by one mutex.
#[derive(Debug)]
struct Session {
    buffer: Arc<Vec<Arc<Line>>>,
    next_id: u64,
    query: QueryState,
    matcher: Arc<dyn Matcher>,
    /// Bumped on every change a filter pass depends on.
    generation: u64,
}

/// Receivers handed to the loops on `run()`.
#[derive(Debug)]
struct LoopInbox {
    filter: Receiver<FilterRequest>,
    render: Receiver<RenderRequest>,
}

#[derive(Debug)]
struct Shared {
    config: Config,
    registry: Registry,
    layout: Layout,
    bindings: KeyBindings,

    session: Mutex<Session>,
    selection: Mutex<Selection>,
    view: RwLock<Arc<FilteredView>>,

    filter_tx: Sender<FilterRequest>,
    render_tx: Sender<RenderRequest>,
    inbox: Mutex<Option<LoopInbox>>,
    refilter: Debouncer,
    redraw: Debouncer,

    exit: ExitSignal,
    faults: Mutex<Vec<LoopFault>>,
    active_loops: AtomicUsize,
    page_rows: AtomicUsize,
    results: ResultSlot,
    finished: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ===== Coordinator =====

/// Handle to one selection session. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Coordinator {
    shared: Arc<Shared>,
}

impl Coordinator {
    /// Validate `config` and build a session using the built-in matchers.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for an unknown matcher or layout name or an
    /// invalid key map. No terminal resource is touched.
    pub fn start(config: Config) -> Result<Self, Error> {
        Self::start_with_registry(config, Registry::builtin())
    }

    /// Like [`Coordinator::start`] with an explicit matcher table.
    ///
    /// # Errors
    ///
    /// Same as [`Coordinator::start`].
    pub fn start_with_registry(config: Config, registry: Registry) -> Result<Self, Error> {
        let matcher = registry
            .get(&config.initial_matcher)
            .map_err(ConfigurationError::from)?;
        let layout: Layout = config.layout.parse()?;
        let bindings = KeyBindings::with_overrides(&config.keymap)?;

        let (filter_tx, filter_rx) = mpsc::channel();
        let (render_tx, render_rx) = mpsc::channel();

        info!(
            matcher = matcher.name(),
            layout = layout.name(),
            buffer_size = config.buffer_size,
            "Session started"
        );

        let session = Session {
            buffer: Arc::new(Vec::new()),
            next_id: 0,
            query: QueryState::new(config.query.clone()),
            matcher,
            generation: 0,
        };
        let selection = Selection::new(config.initial_cursor());

        Ok(Self {
            shared: Arc::new(Shared {
                registry,
                layout,
                bindings,
                session: Mutex::new(session),
                selection: Mutex::new(selection),
                view: RwLock::new(Arc::new(FilteredView::default())),
                filter_tx,
                render_tx,
                inbox: Mutex::new(Some(LoopInbox {
                    filter: filter_rx,
                    render: render_rx,
                })),
                refilter: Debouncer::new("refilter", DEFAULT_DELAY),
                redraw: Debouncer::new("redraw", DEFAULT_DELAY),
                exit: ExitSignal::new(),
                faults: Mutex::new(Vec::new()),
                active_loops: AtomicUsize::new(0),
                page_rows: AtomicUsize::new(DEFAULT_PAGE_ROWS),
                results: ResultSlot::new(),
                finished: AtomicBool::new(false),
                config,
            }),
        })
    }

    // ===== Lifecycle =====

    /// Acquire the terminal, run the four loops until exit, and deliver the result.
    ///
    /// Blocks until every loop has stopped. The terminal is released after the
    /// result channel is closed. A second call returns the recorded status
    /// without touching the backend.
    ///
    /// # Errors
    ///
    /// [`Error::TerminalInit`] if the backend cannot be acquired; no loop is
    /// started in that case.
    pub fn run(&self, backend: &mut dyn Backend) -> Result<ExitStatus, Error> {
        let Some(inbox) = lock(&self.shared.inbox).take() else {
            warn!("Session already ran");
            return Ok(self.exit_status().unwrap_or(ExitStatus::FAULT));
        };

        let parts = backend.acquire().map_err(|err| {
            error!(%err, "Terminal acquisition failed");
            Error::TerminalInit(err)
        })?;

        self.install_exit_hooks(parts.signals.closer());

        // Initial view and frame.
        self.send_filter(FilterRequest::Run);
        self.request_redraw();

        let handles = loops::spawn_all(self, inbox.filter, inbox.render, parts);
        for (kind, handle) in handles {
            if handle.join().is_err() {
                self.record_fault(LoopFault {
                    kind,
                    message: "loop thread panicked outside its guard".to_string(),
                });
            }
        }

        if self.request_exit(ExitStatus::FAULT) {
            warn!("Loops stopped without an exit request");
        }
        let status = self.exit_status().unwrap_or(ExitStatus::FAULT);

        self.finalize(status);

        if let Err(err) = backend.release() {
            warn!(%err, "Terminal restore failed");
        }
        info!(%status, "Session finished");
        Ok(status)
    }

    fn install_exit_hooks(&self, close_signals: Box<dyn Fn() + Send + Sync>) {
        let filter_tx = self.shared.filter_tx.clone();
        let render_tx = self.shared.render_tx.clone();
        self.shared.exit.on_exit(move || {
            let _ = filter_tx.send(FilterRequest::Stop);
            let _ = render_tx.send(RenderRequest::Stop);
            close_signals();
        });
    }

    /// Request the session to end with `status`.
    ///
    /// The first caller wins; returns whether this call set the status.
    pub fn request_exit(&self, status: ExitStatus) -> bool {
        self.shared.exit.request(status)
    }

    /// The winning exit status, once requested.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.shared.exit.status()
    }

    /// Whether exit has been requested.
    pub fn is_exiting(&self) -> bool {
        self.shared.exit.is_requested()
    }

    /// Faults recorded by loops during this session.
    pub fn faults(&self) -> Vec<LoopFault> {
        lock(&self.shared.faults).clone()
    }

    pub(crate) fn record_fault(&self, fault: LoopFault) {
        error!(loop_kind = %fault.kind, message = %fault.message, "Loop fault");
        lock(&self.shared.faults).push(fault);
    }

    /// Number of loops currently running.
    pub fn active_loops(&self) -> usize {
        self.shared.active_loops.load(Ordering::Acquire)
    }

    pub(crate) fn loop_started(&self) {
        self.shared.active_loops.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn loop_finished(&self) {
        self.shared.active_loops.fetch_sub(1, Ordering::AcqRel);
    }

    /// Selected matches after [`Coordinator::run`] has returned.
    ///
    /// In input order when lines were chosen explicitly, otherwise the line
    /// under the cursor. Empty when the session did not end successfully, and
    /// empty before the session has finished.
    pub fn result(&self) -> Vec<Match> {
        self.shared.results.collect()
    }

    /// Whether the result has been delivered.
    pub fn is_finished(&self) -> bool {
        self.shared.finished.load(Ordering::Acquire)
    }

    fn finalize(&self, status: ExitStatus) {
        let view = self.catch_up();
        let matches = if status.is_success() {
            self.selected_matches(&view)
        } else {
            Vec::new()
        };
        debug!(count = matches.len(), %status, "Delivering result");
        self.shared.results.deliver(matches);
        self.shared.finished.store(true, Ordering::Release);
    }

    /// Run one last pass if the view is older than the session state.
    fn catch_up(&self) -> Arc<FilteredView> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.filter_pass()));
        match outcome {
            Ok(view) => view,
            Err(payload) => {
                self.record_fault(LoopFault {
                    kind: crate::model::LoopKind::Filter,
                    message: loops::panic_message(payload.as_ref()),
                });
                self.view()
            }
        }
    }

    fn selected_matches(&self, view: &FilteredView) -> Vec<Match> {
        let selection = lock(&self.shared.selection).clone();
        if selection.has_chosen() {
            let buffer = self.buffer();
            return buffer
                .iter()
                .filter(|line| selection.is_chosen(line.id()))
                .map(|line| {
                    view.matches()
                        .iter()
                        .find(|m| m.id() == line.id())
                        .cloned()
                        .unwrap_or_else(|| Match::unfiltered(Arc::clone(line)))
                        .with_selected(true)
                })
                .collect();
        }
        view.get(selection.cursor())
            .map(|m| vec![m.clone().with_selected(true)])
            .unwrap_or_default()
    }

    // ===== Lines and query =====

    /// Append input records, evicting the oldest beyond the buffer cap.
    ///
    /// Each record gets the next input ordinal. Readers see the buffer
    /// either before or after the whole append. A re-filter is scheduled
    /// through the debounce. Returns the number of records appended.
    pub fn feed_lines<I, S>(&self, lines: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let null_separator = self.shared.config.null_separator;
        let cap = self.shared.config.buffer_size;

        let (appended, oldest) = {
            let mut session = lock(&self.shared.session);
            let mut next_id = session.next_id;
            let incoming: Vec<Arc<Line>> = lines
                .into_iter()
                .map(|raw| {
                    let line = Line::parse(LineId::new(next_id), raw.as_ref(), null_separator);
                    next_id += 1;
                    Arc::new(line)
                })
                .collect();
            if incoming.is_empty() {
                return 0;
            }
            let appended = incoming.len();
            session.next_id = next_id;

            let buffer = Arc::make_mut(&mut session.buffer);
            buffer.extend(incoming);
            if cap > 0 && buffer.len() > cap {
                let excess = buffer.len() - cap;
                buffer.drain(..excess);
            }
            let oldest = buffer.first().map(|line| line.id());
            session.generation += 1;
            (appended, oldest)
        };

        if let Some(oldest) = oldest {
            lock(&self.shared.selection).retain(|id| id >= oldest);
        }
        debug!(appended, "Lines fed");

        let filter_tx = self.shared.filter_tx.clone();
        self.shared.refilter.schedule(move || {
            let _ = filter_tx.send(FilterRequest::Run);
        });
        appended
    }

    /// Snapshot of the buffer in input order.
    pub fn buffer(&self) -> Arc<Vec<Arc<Line>>> {
        Arc::clone(&lock(&self.shared.session).buffer)
    }

    /// Number of lines in the buffer.
    pub fn buffer_len(&self) -> usize {
        lock(&self.shared.session).buffer.len()
    }

    /// Replace the query, caret at the end. Does not start a pass by itself.
    pub fn set_query(&self, text: impl Into<String>) {
        let mut session = lock(&self.shared.session);
        session.query = QueryState::new(text);
        session.generation += 1;
    }

    /// Current query text.
    pub fn query(&self) -> String {
        lock(&self.shared.session).query.text().to_string()
    }

    /// Edit the query in place. Returns whether the text changed.
    ///
    /// A text change bumps the generation; a caret-only move does not.
    pub fn edit_query(&self, edit: impl FnOnce(QueryState) -> QueryState) -> bool {
        let mut session = lock(&self.shared.session);
        let before = std::mem::take(&mut session.query);
        let after = edit(before.clone());
        let changed = after.text() != before.text();
        session.query = after;
        if changed {
            session.generation += 1;
        }
        changed
    }

    /// Request one filter pass now.
    ///
    /// Returns `false` without sending anything if a debounced re-filter is
    /// already pending; that pass will read the latest query.
    pub fn exec_query(&self) -> bool {
        if self.shared.refilter.is_pending() {
            return false;
        }
        self.send_filter(FilterRequest::Run);
        true
    }

    /// Name of the active matcher.
    pub fn matcher_name(&self) -> &'static str {
        lock(&self.shared.session).matcher.name()
    }

    /// Switch to the next registered matcher and request a pass.
    pub fn rotate_matcher(&self) -> &'static str {
        let name = {
            let mut session = lock(&self.shared.session);
            let next = self.shared.registry.next_after(session.matcher.name());
            let name = next.name();
            session.matcher = next;
            session.generation += 1;
            name
        };
        debug!(matcher = name, "Matcher rotated");
        self.exec_query();
        name
    }

    // ===== Filtering =====

    /// Latest published view.
    pub fn view(&self) -> Arc<FilteredView> {
        Arc::clone(&self.shared.view.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Run the matcher on a consistent snapshot and publish the result.
    ///
    /// Skips the work when the published view is already current. A pass
    /// never replaces a view built from a newer snapshot.
    pub(crate) fn filter_pass(&self) -> Arc<FilteredView> {
        let (buffer, query, matcher, generation) = {
            let session = lock(&self.shared.session);
            (
                Arc::clone(&session.buffer),
                session.query.text().to_string(),
                Arc::clone(&session.matcher),
                session.generation,
            )
        };

        let current = self.view();
        if current.generation() >= generation && generation > 0 {
            return current;
        }

        let chosen = lock(&self.shared.selection).chosen().clone();
        let matches: Vec<Match> = matcher
            .filter(&query, &buffer)
            .into_iter()
            .map(|m| {
                let selected = chosen.contains(&m.id());
                m.with_selected(selected)
            })
            .collect();
        let view = Arc::new(FilteredView::new(
            matches,
            query.as_str(),
            matcher.name(),
            generation,
            buffer.len(),
        ));

        let published = {
            let mut slot = self.shared.view.write().unwrap_or_else(PoisonError::into_inner);
            if slot.generation() > generation {
                Arc::clone(&slot)
            } else {
                *slot = Arc::clone(&view);
                view
            }
        };
        if !published.is_empty() {
            lock(&self.shared.selection).clamp(published.len());
        }
        debug!(
            generation,
            matched = published.len(),
            total = published.total(),
            "View published"
        );
        published
    }

    pub(crate) fn send_filter(&self, request: FilterRequest) {
        let _ = self.shared.filter_tx.send(request);
    }

    // ===== Rendering =====

    /// Ask the render loop for a frame now.
    pub fn request_redraw(&self) {
        let _ = self.shared.render_tx.send(RenderRequest::Redraw);
    }

    /// Ask the render loop to repaint every cell.
    pub fn request_refresh(&self) {
        let _ = self.shared.render_tx.send(RenderRequest::Refresh);
    }

    /// Schedule a debounced redraw. Returns `false` if one is already pending.
    pub fn schedule_redraw(&self) -> bool {
        let render_tx = self.shared.render_tx.clone();
        self.shared.redraw.schedule(move || {
            let _ = render_tx.send(RenderRequest::Redraw);
        })
    }

    /// Whether a debounced re-filter or redraw is waiting to fire.
    pub fn has_pending_debounce(&self) -> bool {
        self.shared.refilter.is_pending() || self.shared.redraw.is_pending()
    }

    /// Everything the render loop needs for one frame.
    pub fn render_snapshot(&self) -> RenderSnapshot {
        let (prompt_query, caret, total) = {
            let session = lock(&self.shared.session);
            (
                session.query.text().to_string(),
                session.query.caret(),
                session.buffer.len(),
            )
        };
        let selection = lock(&self.shared.selection).clone();
        RenderSnapshot {
            prompt: self.shared.config.prompt.clone(),
            query: prompt_query,
            caret,
            view: self.view(),
            cursor: selection.cursor(),
            chosen: selection.chosen().clone(),
            total,
            layout: self.shared.layout,
        }
    }

    pub(crate) fn set_page_rows(&self, rows: usize) {
        self.shared.page_rows.store(rows.max(1), Ordering::Release);
    }

    fn page_rows(&self) -> usize {
        self.shared.page_rows.load(Ordering::Acquire)
    }

    // ===== Selection =====

    /// Cursor index into the current view.
    pub fn cursor(&self) -> usize {
        lock(&self.shared.selection).cursor()
    }

    /// Chosen line ids in input order.
    pub fn chosen(&self) -> BTreeSet<LineId> {
        lock(&self.shared.selection).chosen().clone()
    }

    /// Move the cursor `delta` rows, wrapping at the ends.
    pub fn move_cursor(&self, delta: isize) {
        let len = self.view().len();
        lock(&self.shared.selection).step(delta, len);
        self.request_redraw();
    }

    /// Move the cursor by `pages` screen pages, stopping at the ends.
    pub fn move_page(&self, pages: isize) {
        let len = self.view().len();
        let rows = isize::try_from(self.page_rows()).unwrap_or(isize::MAX);
        lock(&self.shared.selection).page(pages.saturating_mul(rows), len);
        self.request_redraw();
    }

    /// Toggle the line under the cursor. Ignored without multi-select.
    pub fn toggle_selection(&self) -> bool {
        if !self.shared.config.multi_select {
            return false;
        }
        let view = self.view();
        let mut selection = lock(&self.shared.selection);
        let Some(m) = view.get(selection.cursor()) else {
            return false;
        };
        selection.toggle(m.id());
        drop(selection);
        self.request_redraw();
        true
    }

    /// Choose every line in the current view. Ignored without multi-select.
    pub fn select_all(&self) {
        if !self.shared.config.multi_select {
            return;
        }
        let view = self.view();
        lock(&self.shared.selection).choose_all(view.matches().iter().map(Match::id));
        self.request_redraw();
    }

    /// Forget every choice.
    pub fn select_none(&self) {
        lock(&self.shared.selection).clear();
        self.request_redraw();
    }

    // ===== Accessors =====

    /// The session configuration.
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// The validated layout.
    pub fn layout(&self) -> Layout {
        self.shared.layout
    }

    /// Key bindings resolved from the configuration.
    pub fn bindings(&self) -> &KeyBindings {
        &self.shared.bindings
    }

    /// The matcher table.
    pub fn registry(&self) -> &Registry {
        &self.shared.registry
    }

    /// Apply a query edit; a text change requests a pass, a caret move a redraw.
    pub(crate) fn edit_and_filter(&self, edit: impl FnOnce(QueryState) -> QueryState) {
        if self.edit_query(edit) {
            self.exec_query();
        } else {
            self.request_redraw();
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
