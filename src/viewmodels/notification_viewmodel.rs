// ============================================================================
// NOTIFICATION VIEWMODEL - Campana de notificaciones
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use futures::FutureExt;

use crate::config::CONFIG;
use crate::error::AppResult;
use crate::models::Notification;
use crate::services::{ApiClient, IntervalScheduler, PollScope, TaskSpawner};
use crate::state::ReactiveState;
use crate::utils::constants::NOTIFICATION_LIST_LIMIT;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NotificationSnapshot {
    /// Las más recientes primero, como máximo 5
    pub items: Vec<Notification>,
    pub unread: u32,
    pub open: bool,
}

#[derive(Clone)]
pub struct NotificationViewModel {
    api: ApiClient,
    state: ReactiveState<NotificationSnapshot>,
}

impl NotificationViewModel {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: ReactiveState::new(NotificationSnapshot::default()),
        }
    }

    pub fn snapshot(&self) -> NotificationSnapshot {
        self.state.get()
    }

    pub fn subscribe<F: Fn() + 'static>(&self, callback: F) {
        self.state.subscribe(callback);
    }

    pub fn toggle_open(&self) {
        self.state.update(|s| s.open = !s.open);
    }

    pub async fn refresh_list(&self) -> AppResult<Vec<Notification>> {
        let mut items = self.api.list_notifications().await?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(NOTIFICATION_LIST_LIMIT);
        self.state.update(|s| s.items = items.clone());
        Ok(items)
    }

    pub async fn refresh_unread(&self) -> AppResult<u32> {
        let count = self.api.unread_count().await?;
        self.state.update(|s| s.unread = count);
        Ok(count)
    }

    /// Marca como leída y refresca lista + contador
    pub async fn mark_read(&self, id: &str) -> AppResult<()> {
        self.api.mark_notification_read(id).await?;
        self.refresh_list().await?;
        self.refresh_unread().await?;
        Ok(())
    }

    /// Resultado de un tick; se descarta si la sesión cambió o el scope se soltó durante el request
    async fn poll_unread(&self, epoch: u64, vigente: &Cell<bool>) {
        match self.api.unread_count().await {
            Ok(count) if vigente.get() && self.api.session().epoch() == epoch => {
                self.state.update(|s| s.unread = count);
            }
            Ok(_) => log::info!("⏭️ [NOTIF] Resultado de un polling ya terminado, descartado"),
            Err(e) => log::warn!("⚠️ [NOTIF] Error obteniendo no leídas: {}", e),
        }
    }

    /// Polling del contador mientras viva el scope devuelto
    pub fn start_polling(
        &self,
        scheduler: &dyn IntervalScheduler,
        spawner: Rc<dyn TaskSpawner>,
    ) -> PollScope {
        self.start_polling_every(scheduler, spawner, CONFIG.notification_poll_ms)
    }

    pub fn start_polling_every(
        &self,
        scheduler: &dyn IntervalScheduler,
        spawner: Rc<dyn TaskSpawner>,
        millis: u32,
    ) -> PollScope {
        let session = self.api.session().clone();
        let epoch = session.epoch();
        let vm = self.clone();
        log::info!("🔔 [NOTIF] Polling cada {} ms", millis);
        PollScope::start(scheduler, spawner, session, millis, move |vigente| {
            let vm = vm.clone();
            async move { vm.poll_unread(epoch, &vigente).await }.boxed_local()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::HttpMethod;
    use crate::test_support::{admin_session, api_path, json_reply, Harness, ManualScheduler, PoolSpawner, Reply};
    use crate::services::HttpResponse;
    use futures::executor::{block_on, LocalPool};
    use serde_json::json;

    fn notifications_json(n: usize) -> serde_json::Value {
        let items: Vec<serde_json::Value> = (0..n)
            .map(|i| {
                json!({
                    "id": format!("n{}", i),
                    "message": format!("Reclamo actualizado {}", i),
                    "read": false,
                    "created_at": format!("2024-03-{:02}T10:00:00Z", i + 1)
                })
            })
            .collect();
        json!(items)
    }

    #[test]
    fn list_keeps_five_most_recent() {
        let harness = Harness::logged_in(admin_session(), |_| json_reply(200, notifications_json(8)));
        let vm = NotificationViewModel::new(harness.api.clone());

        let items = block_on(vm.refresh_list()).unwrap();

        assert_eq!(items.len(), 5);
        assert_eq!(items[0].id, "n7");
    }

    #[test]
    fn mark_read_refreshes_list_and_count() {
        let harness = Harness::logged_in(admin_session(), |request| match api_path(request) {
            "/notifications" => json_reply(200, notifications_json(2)),
            "/notifications/unread/count" => json_reply(200, json!({"count": 1})),
            _ => json_reply(200, json!({"message": "ok"})),
        });
        let vm = NotificationViewModel::new(harness.api.clone());

        block_on(vm.mark_read("n0")).unwrap();

        let sent = harness.transport.requests();
        assert_eq!(sent[0].method, HttpMethod::Patch);
        assert_eq!(api_path(&sent[0]), "/notifications/n0/read");
        assert_eq!(vm.snapshot().unread, 1);
        assert_eq!(vm.snapshot().items.len(), 2);
    }

    #[test]
    fn polling_updates_unread_every_tick_until_dropped() {
        let mut pool = LocalPool::new();
        let scheduler = ManualScheduler::new();
        let harness = Harness::logged_in(admin_session(), |_| json_reply(200, json!({"count": 3})));
        let vm = NotificationViewModel::new(harness.api.clone());

        let scope = vm.start_polling_every(&scheduler, Rc::new(PoolSpawner::new(&pool)), 15_000);
        assert_eq!(scheduler.interval_of_last(), Some(15_000));
        scheduler.tick();
        pool.run_until_stalled();
        assert_eq!(vm.snapshot().unread, 3);
        assert_eq!(harness.transport.request_count(), 1);

        drop(scope);
        assert_eq!(scheduler.live_timers(), 0);
        scheduler.tick();
        pool.run_until_stalled();
        assert_eq!(harness.transport.request_count(), 1);
    }

    #[test]
    fn tick_after_logout_sends_nothing() {
        let mut pool = LocalPool::new();
        let scheduler = ManualScheduler::new();
        let harness = Harness::logged_in(admin_session(), |_| json_reply(200, json!({"count": 3})));
        let vm = NotificationViewModel::new(harness.api.clone());
        let _scope = vm.start_polling_every(&scheduler, Rc::new(PoolSpawner::new(&pool)), 30_000);

        harness.session.logout();
        scheduler.tick();
        pool.run_until_stalled();

        assert_eq!(harness.transport.request_count(), 0);
        assert_eq!(vm.snapshot().unread, 0);
    }

    #[test]
    fn count_arriving_after_scope_drop_is_discarded() {
        let mut pool = LocalPool::new();
        let scheduler = ManualScheduler::new();
        let harness = Harness::logged_in(admin_session(), |_| Reply::Deferred);
        let reply = harness.transport.defer();
        let vm = NotificationViewModel::new(harness.api.clone());

        let scope = vm.start_polling_every(&scheduler, Rc::new(PoolSpawner::new(&pool)), 30_000);
        scheduler.tick();
        pool.run_until_stalled();
        assert_eq!(harness.transport.request_count(), 1);

        drop(scope);
        let _ = reply.send(HttpResponse {
            status: 200,
            body: r#"{"count": 7}"#.to_string(),
        });
        pool.run_until_stalled();

        assert_eq!(vm.snapshot().unread, 0);
    }
}
