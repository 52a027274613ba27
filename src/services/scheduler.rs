// ============================================================================
// SCHEDULER - Timers periódicos + spawn de tareas async
// ============================================================================
// Un solo task periódico en la app: el contador de notificaciones no leídas.
// Soltar el `TimerHandle` cancela el timer.
// ============================================================================

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use gloo_timers::callback::Interval;

use crate::state::SessionState;

/// Handle de un timer activo; al soltarlo se cancela
pub struct TimerHandle {
    _inner: Box<dyn Any>,
}

impl TimerHandle {
    pub fn new<T: 'static>(inner: T) -> Self {
        Self {
            _inner: Box::new(inner),
        }
    }
}

pub trait IntervalScheduler {
    fn every(&self, millis: u32, tick: Box<dyn Fn()>) -> TimerHandle;
}

pub trait TaskSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// gloo-timers `Interval` (se cancela en su Drop)
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserScheduler;

impl IntervalScheduler for BrowserScheduler {
    fn every(&self, millis: u32, tick: Box<dyn Fn()>) -> TimerHandle {
        TimerHandle::new(Interval::new(millis, move || tick()))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserSpawner;

impl TaskSpawner for BrowserSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

/// Polling con scope: activo mientras viva y mientras la sesión no cambie
pub struct PollScope {
    active: Rc<Cell<bool>>,
    _timer: TimerHandle,
}

impl PollScope {
    /// Arranca el polling; cada tick lanza `task(vigente)` si el scope sigue vigente.
    /// La tarea recibe el flag para descartar su resultado si el scope cae mientras espera.
    pub fn start<F>(
        scheduler: &dyn IntervalScheduler,
        spawner: Rc<dyn TaskSpawner>,
        session: SessionState,
        millis: u32,
        task: F,
    ) -> Self
    where
        F: Fn(Rc<Cell<bool>>) -> LocalBoxFuture<'static, ()> + 'static,
    {
        let active = Rc::new(Cell::new(true));
        let epoch = session.epoch();
        let tick_active = active.clone();

        let timer = scheduler.every(
            millis,
            Box::new(move || {
                if !tick_active.get() {
                    return;
                }
                if session.epoch() != epoch || !session.is_authenticated() {
                    log::info!("⏹️ [POLL] Sesión cambió, deteniendo polling");
                    tick_active.set(false);
                    return;
                }
                spawner.spawn(task(tick_active.clone()));
            }),
        );

        Self {
            active,
            _timer: timer,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl Drop for PollScope {
    fn drop(&mut self) {
        self.active.set(false);
    }
}
