// ============================================================================
// TEST SUPPORT - Fakes compartidos por los tests de módulos
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures::channel::oneshot;
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;

use crate::error::{AppError, AppResult};
use crate::models::{Categoria, Estado, Identity, Linea, Reclamo, Role};
use crate::services::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::services::scheduler::{IntervalScheduler, TaskSpawner, TimerHandle};
use crate::routing::HistoryPort;
use crate::services::ApiClient;
use crate::state::{Session, SessionState};
use crate::utils::storage::MemoryStorage;

pub const TEST_API: &str = "http://api.test/api";

pub fn reclamo(id: &str, linea: Linea, estado: Estado) -> Reclamo {
    Reclamo {
        id: id.to_string(),
        numero_reclamo: format!("Línea{}-CON-{:0>4}", linea.id(), id),
        linea,
        categoria: Categoria::CondicionesDeTrabajo,
        sector_estacion: "Estación".to_string(),
        descripcion: "Descripción".to_string(),
        estado,
        responsable: None,
        solucion: None,
        responsable_cierre: None,
        fecha_creacion: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
        fecha_cierre: None,
        comentarios: Vec::new(),
        archivos: Vec::new(),
    }
}

pub fn admin_session() -> Session {
    Session {
        identity: Identity {
            id: "admin-1".to_string(),
            username: "admin".to_string(),
            role: Role::Admin,
            assigned_line: None,
        },
        token: "admin-token".to_string(),
    }
}

pub fn emisor_session(linea: Option<Linea>) -> Session {
    Session {
        identity: Identity {
            id: "emisor-1".to_string(),
            username: "delegado".to_string(),
            role: Role::EmisorReclamo,
            assigned_line: linea,
        },
        token: "emisor-token".to_string(),
    }
}

// ----------------------------------------------------------------------------
// HTTP
// ----------------------------------------------------------------------------

pub enum Reply {
    Now(AppResult<HttpResponse>),
    /// Espera el próximo receiver encolado con `ScriptedTransport::defer`
    Deferred,
}

pub fn json_reply(status: u16, body: serde_json::Value) -> Reply {
    Reply::Now(Ok(HttpResponse {
        status,
        body: body.to_string(),
    }))
}

/// Transporte guionado: una función decide la respuesta de cada request
pub struct ScriptedTransport {
    handler: Box<dyn Fn(&HttpRequest) -> Reply>,
    requests: RefCell<Vec<HttpRequest>>,
    deferred: RefCell<VecDeque<oneshot::Receiver<HttpResponse>>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> Reply + 'static,
    {
        Self {
            handler: Box::new(handler),
            requests: RefCell::new(Vec::new()),
            deferred: RefCell::new(VecDeque::new()),
        }
    }

    /// Encola una respuesta que el test completa más tarde
    pub fn defer(&self) -> oneshot::Sender<HttpResponse> {
        let (tx, rx) = oneshot::channel();
        self.deferred.borrow_mut().push_back(rx);
        tx
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

#[async_trait(?Send)]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> AppResult<HttpResponse> {
        let reply = (self.handler)(&request);
        self.requests.borrow_mut().push(request);
        match reply {
            Reply::Now(result) => result,
            Reply::Deferred => {
                let receiver = self.deferred.borrow_mut().pop_front();
                match receiver {
                    Some(rx) => rx.await.map_err(|_| AppError::Network("cancelado".to_string())),
                    None => Err(AppError::Network("sin respuesta diferida".to_string())),
                }
            }
        }
    }
}

/// Path relativo a la API (`/reclamos/r1`)
pub fn api_path(request: &HttpRequest) -> &str {
    request.url.strip_prefix(TEST_API).unwrap_or(&request.url)
}

/// Sesión en memoria + transporte guionado + cliente API
pub struct Harness {
    pub session: SessionState,
    pub transport: Rc<ScriptedTransport>,
    pub api: ApiClient,
}

impl Harness {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> Reply + 'static,
    {
        let session = SessionState::new(Rc::new(MemoryStorage::new()));
        session.restore();
        let transport = Rc::new(ScriptedTransport::new(handler));
        let api = ApiClient::new(TEST_API, transport.clone(), session.clone());
        Self {
            session,
            transport,
            api,
        }
    }

    pub fn logged_in<F>(session: Session, handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> Reply + 'static,
    {
        let harness = Self::new(handler);
        harness.session.establish(session);
        harness
    }
}

// ----------------------------------------------------------------------------
// TIMERS / SPAWN
// ----------------------------------------------------------------------------

struct ManualTimer {
    millis: u32,
    tick: Rc<dyn Fn()>,
    alive: Rc<Cell<bool>>,
}

struct AliveGuard(Rc<Cell<bool>>);

impl Drop for AliveGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Scheduler manual: el test decide cuándo pasa un intervalo
#[derive(Default)]
pub struct ManualScheduler {
    timers: RefCell<Vec<ManualTimer>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispara un tick en cada timer cuyo handle sigue vivo
    pub fn tick(&self) {
        let ticks: Vec<Rc<dyn Fn()>> = self
            .timers
            .borrow()
            .iter()
            .filter(|t| t.alive.get())
            .map(|t| t.tick.clone())
            .collect();
        for tick in ticks {
            tick();
        }
    }

    pub fn live_timers(&self) -> usize {
        self.timers.borrow().iter().filter(|t| t.alive.get()).count()
    }

    pub fn interval_of_last(&self) -> Option<u32> {
        self.timers.borrow().last().map(|t| t.millis)
    }
}

impl IntervalScheduler for ManualScheduler {
    fn every(&self, millis: u32, tick: Box<dyn Fn()>) -> TimerHandle {
        let alive = Rc::new(Cell::new(true));
        self.timers.borrow_mut().push(ManualTimer {
            millis,
            tick: Rc::from(tick),
            alive: alive.clone(),
        });
        TimerHandle::new(AliveGuard(alive))
    }
}

/// Spawner sobre un `LocalPool` de futures
pub struct PoolSpawner {
    spawner: LocalSpawner,
}

impl PoolSpawner {
    pub fn new(pool: &LocalPool) -> Self {
        Self {
            spawner: pool.spawner(),
        }
    }
}

impl TaskSpawner for PoolSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.spawner.spawn_local(task).expect("spawn en LocalPool");
    }
}

// ----------------------------------------------------------------------------
// HISTORIAL
// ----------------------------------------------------------------------------

/// Historial en memoria: pila de paths
pub struct MemoryHistory {
    entries: RefCell<Vec<String>>,
}

impl MemoryHistory {
    pub fn at(path: &str) -> Self {
        Self {
            entries: RefCell::new(vec![path.to_string()]),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

impl HistoryPort for MemoryHistory {
    fn current(&self) -> String {
        self.entries.borrow().last().cloned().unwrap_or_else(|| "/".to_string())
    }

    fn push(&self, path: &str) {
        self.entries.borrow_mut().push(path.to_string());
    }

    fn replace(&self, path: &str) {
        let mut entries = self.entries.borrow_mut();
        entries.pop();
        entries.push(path.to_string());
    }
}
