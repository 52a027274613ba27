// ============================================================================
// APP STATE - Estado global de la aplicación
// ============================================================================
// Sesión + ruta actual + cache de la página visible + mensajes flash.
// La ruta pedida pasa siempre por el guard antes de elegir vista.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;

use crate::error::AppError;
use crate::models::{ReclamoFilters, Reclamo};
use crate::routing::{guard, HistoryPort, Route};
use crate::services::{ApiClient, HttpTransport, IntervalScheduler, PollScope, TaskSpawner};
use crate::state::{ReactiveState, SessionState};
use crate::utils::storage::KeyValueStore;
use crate::viewmodels::{
    DashboardData, DetalleOutcome, EstadisticasViewModel, InvitationState, InvitationViewModel,
    NotificationViewModel, ReclamoViewModel, Resumen, SessionViewModel, UsuariosViewModel,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlashKind {
    Exito,
    Error,
}

/// Mensaje de una sola lectura mostrado arriba de la vista
#[derive(Clone, Debug, PartialEq)]
pub struct Flash {
    pub kind: FlashKind,
    pub text: String,
}

/// Datos ya cargados para la vista visible
#[derive(Clone, Debug, PartialEq)]
pub enum PageData {
    Loading,
    Dashboard(DashboardData),
    Listado(Vec<Reclamo>),
    Detalle(Reclamo),
    Estadisticas(Resumen),
    /// Vistas que manejan su propio estado (formularios, usuarios, invitación)
    Ready,
    Redirect(Route),
    Error(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageSlot {
    pub route: Option<Route>,
    /// Epoch de sesión con el que se cargó
    pub epoch: u64,
    pub data: PageData,
}

impl Default for PageSlot {
    fn default() -> Self {
        Self {
            route: None,
            epoch: 0,
            data: PageData::Loading,
        }
    }
}

/// Estado global de la aplicación
#[derive(Clone)]
pub struct AppState {
    pub session: SessionState,
    pub api: ApiClient,
    pub route: ReactiveState<Route>,
    pub page: ReactiveState<PageSlot>,
    pub flash: ReactiveState<Option<Flash>>,

    pub session_vm: SessionViewModel,
    pub reclamos_vm: ReclamoViewModel,
    pub usuarios_vm: UsuariosViewModel,
    pub notifications_vm: NotificationViewModel,
    pub estadisticas_vm: EstadisticasViewModel,

    history: Rc<dyn HistoryPort>,
    /// Flujo de invitación en curso (sobrevive a re-renders y cambios de sesión)
    invitation: Rc<RefCell<Option<InvitationViewModel>>>,
    /// Scope de polling + epoch de la sesión que lo arrancó
    poll: Rc<RefCell<Option<(u64, PollScope)>>>,
}

impl AppState {
    pub fn new(
        storage: Rc<dyn KeyValueStore>,
        transport: Rc<dyn HttpTransport>,
        history: Rc<dyn HistoryPort>,
        base_url: &str,
    ) -> Self {
        let session = SessionState::new(storage);
        let api = ApiClient::new(base_url, transport, session.clone());
        let route = ReactiveState::new(Route::parse(&history.current()));

        Self {
            session_vm: SessionViewModel::new(api.clone()),
            reclamos_vm: ReclamoViewModel::new(api.clone()),
            usuarios_vm: UsuariosViewModel::new(api.clone()),
            notifications_vm: NotificationViewModel::new(api.clone()),
            estadisticas_vm: EstadisticasViewModel::new(api.clone()),
            session,
            api,
            route,
            page: ReactiveState::new(PageSlot::default()),
            flash: ReactiveState::new(None),
            history,
            invitation: Rc::new(RefCell::new(None)),
            poll: Rc::new(RefCell::new(None)),
        }
    }

    /// Suscribirse a cualquier cambio que requiera re-render completo
    pub fn subscribe_to_changes<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        let callback: Rc<dyn Fn()> = Rc::new(callback);
        let cb = callback.clone();
        self.session.subscribe(move || cb());
        let cb = callback.clone();
        self.route.subscribe(move || cb());
        let cb = callback.clone();
        self.page.subscribe(move || cb());
        let cb = callback.clone();
        self.flash.subscribe(move || cb());
        self.usuarios_vm.subscribe(move || callback());
    }

    // ------------------------------------------------------------------------
    // NAVEGACIÓN
    // ------------------------------------------------------------------------

    pub fn navigate(&self, route: Route) {
        log::info!("🧭 [ROUTER] Navegando a {}", route.path());
        self.history.push(&route.path());
        self.route.set(route);
    }

    /// Tras `popstate`: la barra de direcciones manda
    pub fn sync_from_history(&self) {
        let route = Route::parse(&self.history.current());
        if self.route.get() != route {
            self.route.set(route);
        }
    }

    /// Pasa la ruta pedida por el guard; `None` mientras la sesión carga.
    /// Una redirección reemplaza la entrada del historial (no se apila).
    pub fn resolve_view(&self) -> Option<Route> {
        let requested = self.route.get();
        let resolution = guard::resolve(&self.session.snapshot(), requested);
        let view = resolution.view.clone()?;
        if resolution.redirected() {
            self.history.replace(&view.path());
            self.route.update_silent(|r| *r = view.clone());
        }
        Some(view)
    }

    // ------------------------------------------------------------------------
    // FLASH
    // ------------------------------------------------------------------------

    pub fn flash_ok(&self, text: impl Into<String>) {
        self.flash.set(Some(Flash {
            kind: FlashKind::Exito,
            text: text.into(),
        }));
    }

    pub fn flash_error(&self, error: &AppError) {
        self.flash.set(Some(Flash {
            kind: FlashKind::Error,
            text: error.user_message(),
        }));
    }

    /// Lee y limpia el mensaje (sin disparar otro render)
    pub fn take_flash(&self) -> Option<Flash> {
        let mut taken = None;
        self.flash.update_silent(|f| taken = f.take());
        taken
    }

    // ------------------------------------------------------------------------
    // CACHE DE PÁGINA
    // ------------------------------------------------------------------------

    pub fn needs_load(&self, view: &Route) -> bool {
        let epoch = self.session.epoch();
        self.page
            .with(|slot| slot.route.as_ref() != Some(view) || slot.epoch != epoch)
    }

    /// Marca la vista como cargando, sin notificar (estamos dentro del render)
    pub fn begin_load(&self, view: &Route) -> u64 {
        let epoch = self.session.epoch();
        self.page.update_silent(|slot| {
            *slot = PageSlot {
                route: Some(view.clone()),
                epoch,
                data: PageData::Loading,
            }
        });
        epoch
    }

    /// Aplica el resultado si la vista y la sesión siguen siendo las mismas
    pub fn finish_load(&self, view: &Route, epoch: u64, data: PageData) -> bool {
        let current = self
            .page
            .with(|slot| slot.route.as_ref() == Some(view) && slot.epoch == epoch);
        if !current || self.session.epoch() != epoch {
            log::info!("⏭️ [APP] Carga de {} descartada (vista o sesión cambió)", view.path());
            return false;
        }

        if let PageData::Redirect(to) = data {
            self.navigate(to);
            return true;
        }
        self.page.update(|slot| slot.data = data);
        true
    }

    /// Fuerza recarga de la vista visible en el próximo render
    pub fn invalidate_page(&self) {
        self.page.set(PageSlot::default());
    }

    /// Trae los datos que necesita `view`
    pub async fn load(&self, view: &Route) -> PageData {
        let result = match view {
            Route::Dashboard => self.reclamos_vm.dashboard().await.map(PageData::Dashboard),
            Route::Administracion { linea } => {
                let filters = match linea {
                    Some(linea) => ReclamoFilters::por_linea(*linea),
                    None => ReclamoFilters::default(),
                };
                self.reclamos_vm.list(filters).await.map(PageData::Listado)
            }
            Route::DetalleReclamo { id } => self.reclamos_vm.detail(id).await.map(|outcome| match outcome {
                DetalleOutcome::Found(reclamo) => PageData::Detalle(reclamo),
                DetalleOutcome::RedirectHome => PageData::Redirect(Route::Dashboard),
                DetalleOutcome::NotFound => PageData::Error("Reclamo no encontrado".to_string()),
            }),
            Route::Estadisticas => self.estadisticas_vm.resumen().await.map(PageData::Estadisticas),
            Route::Usuarios => self.usuarios_vm.load().await.map(|_| PageData::Ready),
            Route::Invitacion { token } => {
                let vm = self.invitation_vm(token);
                // Aceptar puede abrir sesión: no volver a consultar un token ya usado
                if vm.state() == InvitationState::LoadingInvitation {
                    vm.load().await;
                }
                Ok(PageData::Ready)
            }
            Route::Login | Route::Register | Route::NuevoReclamo => Ok(PageData::Ready),
        };

        result.unwrap_or_else(|e| {
            log::error!("❌ [APP] Error cargando {}: {}", view.path(), e);
            PageData::Error(e.user_message())
        })
    }

    /// Viewmodel del token pedido; se reutiliza mientras el token no cambie
    pub fn invitation_vm(&self, token: &str) -> InvitationViewModel {
        let mut slot = self.invitation.borrow_mut();
        if let Some(vm) = slot.as_ref().filter(|vm| vm.token() == token.trim()) {
            return vm.clone();
        }
        let vm = InvitationViewModel::new(self.api.clone(), token);
        let page = self.page.clone();
        vm.subscribe(move || page.notify());
        *slot = Some(vm.clone());
        vm
    }

    // ------------------------------------------------------------------------
    // POLLING DE NOTIFICACIONES
    // ------------------------------------------------------------------------

    /// Un solo scope vivo, atado a la sesión actual y a una vista con campana
    pub fn sync_polling(&self, scheduler: &dyn IntervalScheduler, spawner: Rc<dyn TaskSpawner>) {
        let mut poll = self.poll.borrow_mut();
        if !self.session.is_authenticated() || !self.route.with(Route::shows_header) {
            if poll.take().is_some() {
                log::info!("🔕 [NOTIF] Polling detenido");
            }
            return;
        }
        let epoch = self.session.epoch();
        let current = matches!(poll.as_ref(), Some((e, scope)) if *e == epoch && scope.is_active());
        if !current {
            // Soltar el anterior antes de crear el nuevo
            poll.take();
            // Primer valor del contador sin esperar al primer tick
            let vm = self.notifications_vm.clone();
            spawner.spawn(
                async move {
                    if let Err(e) = vm.refresh_unread().await {
                        log::warn!("⚠️ [NOTIF] No se pudo leer el contador: {}", e);
                    }
                }
                .boxed_local(),
            );
            *poll = Some((epoch, self.notifications_vm.start_polling(scheduler, spawner)));
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poll
            .borrow()
            .as_ref()
            .map(|(_, scope)| scope.is_active())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Estado, Linea};
    use crate::services::HttpMethod;
    use crate::test_support::{
        admin_session, emisor_session, json_reply, reclamo, ManualScheduler, MemoryHistory, PoolSpawner,
        ScriptedTransport, TEST_API,
    };
    use crate::utils::storage::MemoryStorage;
    use futures::executor::{block_on, LocalPool};
    use serde_json::json;

    fn app_at(path: &str, transport: ScriptedTransport) -> (AppState, Rc<MemoryHistory>) {
        let history = Rc::new(MemoryHistory::at(path));
        let state = AppState::new(
            Rc::new(MemoryStorage::new()),
            Rc::new(transport),
            history.clone(),
            TEST_API,
        );
        (state, history)
    }

    fn offline() -> ScriptedTransport {
        ScriptedTransport::new(|_| json_reply(500, json!({})))
    }

    #[test]
    fn nothing_renders_while_session_loads() {
        let (state, history) = app_at("/usuarios", offline());

        assert_eq!(state.resolve_view(), None);
        assert_eq!(history.current(), "/usuarios");
    }

    #[test]
    fn protected_path_without_session_replaces_with_login() {
        let (state, history) = app_at("/estadisticas", offline());
        state.session.restore();

        assert_eq!(state.resolve_view(), Some(Route::Login));
        assert_eq!(history.current(), "/login");
        assert_eq!(history.len(), 1);
        assert_eq!(state.route.get(), Route::Login);
    }

    #[test]
    fn emisor_on_admin_route_lands_on_dashboard() {
        let (state, history) = app_at("/usuarios", offline());
        state.session.restore();
        state.session.establish(emisor_session(Some(Linea::B)));

        assert_eq!(state.resolve_view(), Some(Route::Dashboard));
        assert_eq!(history.current(), "/");
    }

    #[test]
    fn logout_sends_current_view_back_to_login() {
        let (state, _history) = app_at("/", offline());
        state.session.restore();
        state.session.establish(admin_session());
        assert_eq!(state.resolve_view(), Some(Route::Dashboard));

        state.session_vm.logout();

        assert_eq!(state.resolve_view(), Some(Route::Login));
    }

    #[test]
    fn navigate_pushes_history_entry() {
        let (state, history) = app_at("/", offline());
        state.navigate(Route::DetalleReclamo { id: "r9".to_string() });

        assert_eq!(history.current(), "/reclamo/r9");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn stale_page_result_is_discarded_after_relogin() {
        let (state, _history) = app_at("/", offline());
        state.session.restore();
        state.session.establish(admin_session());
        let view = Route::Dashboard;
        let epoch = state.begin_load(&view);

        state.session.logout();
        state.session.establish(admin_session());

        assert!(!state.finish_load(&view, epoch, PageData::Ready));
        assert_eq!(state.page.get().data, PageData::Loading);
        assert!(state.needs_load(&view));
    }

    #[test]
    fn forbidden_detail_navigates_home() {
        let transport = ScriptedTransport::new(|_| json_reply(403, json!({"detail": "Sin acceso"})));
        let (state, history) = app_at("/reclamo/r1", transport);
        state.session.restore();
        state.session.establish(emisor_session(Some(Linea::A)));
        let view = state.resolve_view().unwrap();

        let epoch = state.begin_load(&view);
        let data = block_on(state.load(&view));
        assert_eq!(data, PageData::Redirect(Route::Dashboard));
        state.finish_load(&view, epoch, data);

        assert_eq!(state.route.get(), Route::Dashboard);
        assert_eq!(history.current(), "/");
    }

    #[test]
    fn admin_listing_uses_line_from_query() {
        let transport = ScriptedTransport::new(|request| {
            let linea = request
                .query
                .iter()
                .find(|(k, _)| k == "linea")
                .map(|(_, v)| v.clone())
                .unwrap_or_default();
            json_reply(200, json!([{
                "id": "r1", "numero_reclamo": "LíneaC-CON-0001", "linea": linea,
                "categoria": "Condiciones de trabajo", "sector_estacion": "Retiro",
                "descripcion": "x", "estado": "Pendiente", "fecha_creacion": "2024-01-15T10:00:00Z"
            }]))
        });
        let (state, _history) = app_at("/administracion?linea=C", transport);
        state.session.restore();
        state.session.establish(admin_session());
        let view = state.resolve_view().unwrap();

        match block_on(state.load(&view)) {
            PageData::Listado(reclamos) => {
                assert_eq!(reclamos.len(), 1);
                assert_eq!(reclamos[0].linea, Linea::C);
            }
            other => panic!("esperaba listado, llegó {:?}", other),
        }
    }

    #[test]
    fn dashboard_load_counts_active_per_line() {
        let transport = ScriptedTransport::new(|_| {
            let items = vec![
                reclamo("1", Linea::A, Estado::Pendiente),
                reclamo("2", Linea::A, Estado::Resuelto),
            ];
            json_reply(200, serde_json::to_value(items).unwrap())
        });
        let (state, _history) = app_at("/", transport);
        state.session.restore();
        state.session.establish(admin_session());

        match block_on(state.load(&Route::Dashboard)) {
            PageData::Dashboard(data) => {
                let a = data.stats.iter().find(|s| s.linea == Linea::A).unwrap();
                assert_eq!((a.total, a.activos), (2, 1));
            }
            other => panic!("esperaba dashboard, llegó {:?}", other),
        }
    }

    #[test]
    fn polling_follows_session() {
        let pool = LocalPool::new();
        let scheduler = ManualScheduler::new();
        let (state, _history) = app_at("/", offline());
        state.session.restore();

        state.sync_polling(&scheduler, Rc::new(PoolSpawner::new(&pool)));
        assert!(!state.is_polling());

        state.session.establish(admin_session());
        state.sync_polling(&scheduler, Rc::new(PoolSpawner::new(&pool)));
        state.sync_polling(&scheduler, Rc::new(PoolSpawner::new(&pool)));
        assert!(state.is_polling());
        assert_eq!(scheduler.live_timers(), 1);

        state.session.logout();
        state.session.establish(admin_session());
        state.sync_polling(&scheduler, Rc::new(PoolSpawner::new(&pool)));
        assert_eq!(scheduler.live_timers(), 1);

        state.session.logout();
        state.sync_polling(&scheduler, Rc::new(PoolSpawner::new(&pool)));
        assert!(!state.is_polling());
        assert_eq!(scheduler.live_timers(), 0);
    }

    #[test]
    fn accepted_invitation_is_not_reloaded_after_session_starts() {
        let transport = ScriptedTransport::new(|request| match request.method {
            HttpMethod::Get => json_reply(200, json!({
                "token": "tok-9", "username": "jperez", "email": "j@uta.org.ar", "linea_asignada": "D"
            })),
            _ => json_reply(200, json!({
                "access_token": "nuevo",
                "user": {"id": "u9", "username": "jperez", "role": "EMISOR_RECLAMO", "linea_asignada": "D"}
            })),
        });
        let transport = Rc::new(transport);
        let history = Rc::new(MemoryHistory::at("/invitacion/tok-9"));
        let state = AppState::new(Rc::new(MemoryStorage::new()), transport.clone(), history, TEST_API);
        state.session.restore();

        let view = state.resolve_view().unwrap();
        block_on(state.load(&view));
        let vm = state.invitation_vm("tok-9");
        assert!(matches!(vm.state(), InvitationState::ValidPending { .. }));

        block_on(vm.accept()).unwrap();
        assert!(state.session.is_authenticated());
        assert_eq!(state.resolve_view(), Some(view.clone()));
        assert!(state.needs_load(&view));
        block_on(state.load(&view));

        assert!(matches!(state.invitation_vm("tok-9").state(), InvitationState::Accepted { .. }));
        let gets = transport
            .requests()
            .iter()
            .filter(|r| r.method == HttpMethod::Get)
            .count();
        assert_eq!(gets, 1);
    }

    #[test]
    fn flash_is_read_once() {
        let (state, _history) = app_at("/", offline());
        state.flash_ok("Reclamo creado");

        assert_eq!(state.take_flash().map(|f| f.kind), Some(FlashKind::Exito));
        assert_eq!(state.take_flash(), None);
    }

    #[test]
    fn polling_stops_on_views_without_bell() {
        let pool = LocalPool::new();
        let scheduler = ManualScheduler::new();
        let (state, _history) = app_at("/invitacion/tok-1", offline());
        state.session.restore();
        state.session.establish(admin_session());

        assert_eq!(state.resolve_view(), Some(Route::Invitacion { token: "tok-1".to_string() }));
        state.sync_polling(&scheduler, Rc::new(PoolSpawner::new(&pool)));
        assert!(!state.is_polling());

        state.navigate(Route::Dashboard);
        state.sync_polling(&scheduler, Rc::new(PoolSpawner::new(&pool)));
        assert!(state.is_polling());

        state.navigate(Route::Invitacion { token: "tok-1".to_string() });
        state.sync_polling(&scheduler, Rc::new(PoolSpawner::new(&pool)));
        assert!(!state.is_polling());
        assert_eq!(scheduler.live_timers(), 0);
    }
}
