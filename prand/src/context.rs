//! Implicit per-context streams
//!
//! The convenience API keeps one lazily seeded [`GeneratorState`] per logical
//! execution context, so concurrent callers never advance each other's
//! counter. Contexts are identified by [`ContextId`]: the calling thread, or a
//! caller-minted task id for async tasks and simulation workers that migrate
//! between threads.
//!
//! Two tiers:
//! - [`ImplicitStream`] is the per-context container. A worker can own one
//!   directly and skip the registry entirely.
//! - [`StreamRegistry`] maps context ids to streams. Entries are created on
//!   first access and dropped by [`StreamRegistry::release`] or when a
//!   [`ContextGuard`] goes out of scope.
//!
//! The free functions ([`seed_global`], [`next_global`], [`get_state`],
//! [`set_state`]) operate on a stream owned by the calling thread. It is
//! created on first use, freed when the thread exits, and never locked. A
//! stream that was never seeded is seeded with
//! [`DEFAULT_SEED`](crate::config::DEFAULT_SEED) on first use.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use uuid::Uuid;

use crate::config::StreamConfig;
use crate::rng::GeneratorState;

/// Identity of a logical execution context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextId {
    /// An OS thread
    Thread(ThreadId),

    /// A caller-defined context (async task, worker, simulation run)
    Task(Uuid),
}

impl ContextId {
    /// Context of the calling thread
    pub fn current() -> Self {
        ContextId::Thread(thread::current().id())
    }

    /// Mint a fresh task context
    pub fn new_task() -> Self {
        ContextId::Task(Uuid::new_v4())
    }
}

// ============================================================================
// ImplicitStream
// ============================================================================

/// One context's implicit generator: a state plus its ready flag
///
/// # Example
/// ```
/// use feistel_prand::{GeneratorState, ImplicitStream};
///
/// let mut stream = ImplicitStream::new();
/// assert!(!stream.is_ready());
///
/// // Unseeded streams fall back to the default seed
/// assert_eq!(stream.next(), GeneratorState::new(1).next());
/// assert!(stream.is_ready());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImplicitStream {
    config: StreamConfig,

    /// `None` until seeded or assigned
    state: Option<GeneratorState>,
}

impl ImplicitStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StreamConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Whether the stream has been seeded or assigned a state
    pub fn is_ready(&self) -> bool {
        self.state.is_some()
    }

    /// Mark the stream ready and seed it
    pub fn seed(&mut self, seed: u64) {
        match self.state.as_mut() {
            Some(state) => state.seed(seed),
            None => self.state = Some(GeneratorState::new(seed)),
        }
    }

    /// Next output, auto-seeding with the configured default seed
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        self.ready_state().next()
    }

    /// Copy of the current state, auto-seeding if needed
    pub fn get_state(&mut self) -> GeneratorState {
        *self.ready_state()
    }

    /// Replace the state wholesale; the stream counts as ready afterwards
    pub fn set_state(&mut self, state: GeneratorState) {
        log::trace!("replacing implicit stream state at counter {}", state.counter());
        self.state = Some(state);
    }

    /// Current state without seeding, `None` if never seeded
    pub fn peek(&self) -> Option<&GeneratorState> {
        self.state.as_ref()
    }

    fn ready_state(&mut self) -> &mut GeneratorState {
        let default_seed = self.config.default_seed;
        self.state.get_or_insert_with(|| {
            log::debug!("auto-seeding implicit stream with default seed {}", default_seed);
            GeneratorState::new(default_seed)
        })
    }
}

// ============================================================================
// StreamRegistry
// ============================================================================

/// Map from execution context to its implicit stream
///
/// All methods take `&self`; the map is guarded by a mutex so a registry can
/// be shared between threads. Each context only ever touches its own entry.
#[derive(Debug, Default)]
pub struct StreamRegistry {
    config: StreamConfig,
    streams: Mutex<HashMap<ContextId, ImplicitStream>>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StreamConfig) -> Self {
        Self {
            config,
            streams: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    // Every mutation of a stream is a single assignment, so a panic while
    // the lock is held cannot leave an entry half-written.
    fn lock(&self) -> MutexGuard<'_, HashMap<ContextId, ImplicitStream>> {
        self.streams.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_stream<R>(&self, id: ContextId, f: impl FnOnce(&mut ImplicitStream) -> R) -> R {
        let mut streams = self.lock();
        let stream = streams.entry(id).or_insert_with(|| {
            log::trace!("creating implicit stream for {:?}", id);
            ImplicitStream::with_config(self.config)
        });
        f(stream)
    }

    /// Seed the stream of `id`, creating it if absent
    pub fn seed(&self, id: ContextId, seed: u64) {
        self.with_stream(id, |stream| stream.seed(seed))
    }

    /// Next output of the stream of `id`
    pub fn next(&self, id: ContextId) -> u64 {
        self.with_stream(id, ImplicitStream::next)
    }

    pub fn get_state(&self, id: ContextId) -> GeneratorState {
        self.with_stream(id, ImplicitStream::get_state)
    }

    pub fn set_state(&self, id: ContextId, state: GeneratorState) {
        self.with_stream(id, |stream| stream.set_state(state))
    }

    /// Drop the stream of `id`, returning its final state if it was ever seeded
    pub fn release(&self, id: ContextId) -> Option<GeneratorState> {
        let removed = self.lock().remove(&id);
        if removed.is_some() {
            log::debug!("released implicit stream for {:?}", id);
        }
        removed.and_then(|stream| stream.state)
    }

    pub fn contains(&self, id: ContextId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Number of live context streams
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Enter a fresh task context; its stream is released when the guard drops
    pub fn enter(&self) -> ContextGuard<'_> {
        self.enter_as(ContextId::new_task())
    }

    /// Enter an existing context, e.g. [`ContextId::current`]
    pub fn enter_as(&self, id: ContextId) -> ContextGuard<'_> {
        ContextGuard { registry: self, id }
    }
}

/// Scoped handle on one context of a [`StreamRegistry`]
///
/// Dropping the guard releases the context's stream.
#[derive(Debug)]
pub struct ContextGuard<'a> {
    registry: &'a StreamRegistry,
    id: ContextId,
}

impl ContextGuard<'_> {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn seed(&self, seed: u64) {
        self.registry.seed(self.id, seed)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) -> u64 {
        self.registry.next(self.id)
    }

    pub fn get_state(&self) -> GeneratorState {
        self.registry.get_state(self.id)
    }

    pub fn set_state(&self, state: GeneratorState) {
        self.registry.set_state(self.id, state)
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

// ============================================================================
// Per-thread convenience API
// ============================================================================

static LIVE_THREAD_STREAMS: AtomicUsize = AtomicUsize::new(0);

/// Implicit stream owned by one thread, dropped when the thread exits
struct ThreadStream {
    stream: ImplicitStream,
}

impl ThreadStream {
    fn new() -> Self {
        LIVE_THREAD_STREAMS.fetch_add(1, Ordering::Relaxed);
        log::trace!("creating implicit stream for {:?}", ContextId::current());
        Self {
            stream: ImplicitStream::new(),
        }
    }
}

impl Drop for ThreadStream {
    fn drop(&mut self) {
        LIVE_THREAD_STREAMS.fetch_sub(1, Ordering::Relaxed);
    }
}

thread_local! {
    static THREAD_STREAM: RefCell<ThreadStream> = RefCell::new(ThreadStream::new());
}

fn with_thread_stream<R>(f: impl FnOnce(&mut ImplicitStream) -> R) -> R {
    THREAD_STREAM.with(|cell| f(&mut cell.borrow_mut().stream))
}

/// Number of threads currently holding an implicit stream
pub fn live_thread_streams() -> usize {
    LIVE_THREAD_STREAMS.load(Ordering::Relaxed)
}

/// Seed the calling thread's implicit stream
pub fn seed_global(seed: u64) {
    with_thread_stream(|stream| stream.seed(seed))
}

/// Next output of the calling thread's implicit stream
///
/// Seeds with 1 first if the thread never called [`seed_global`].
///
/// # Example
/// ```
/// use feistel_prand::{next_global, GeneratorState};
///
/// let mut explicit = GeneratorState::new(1);
/// assert_eq!(next_global(), explicit.next());
/// ```
pub fn next_global() -> u64 {
    with_thread_stream(ImplicitStream::next)
}

/// Copy of the calling thread's implicit state
pub fn get_state() -> GeneratorState {
    with_thread_stream(ImplicitStream::get_state)
}

/// Replace the calling thread's implicit state
pub fn set_state(state: GeneratorState) {
    with_thread_stream(|stream| stream.set_state(state))
}

/// Reset the calling thread's implicit stream to unseeded
///
/// Returns the final state if the stream was ever seeded. The next
/// convenience call on this thread starts again from the default seed.
pub fn release_global() -> Option<GeneratorState> {
    with_thread_stream(|stream| {
        let released = stream.state.take();
        if released.is_some() {
            log::debug!("released implicit stream for {:?}", ContextId::current());
        }
        released
    })
}
