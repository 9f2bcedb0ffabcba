// src/services/defect_service.rs

use std::{sync::Arc, time::Duration};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::DefectsBackend,
    db::{DefectOutbox, DefectStore},
    models::defect::{
        ConnectivityStatus, Defect, DefectDetailStatus, DefectStatus, DefectStatusUpdate,
        DefectUpdate, NewDefect, PendingOperation, PersistenceMode, SyncReport,
    },
    services::storage::{StorageClient, DEFECT_PHOTOS_BUCKET},
};

/// Defeitos com persistência híbrida: banco remoto quando disponível, arquivo local caso contrário.
/// O modo só muda na inicialização ou numa verificação explícita.
#[derive(Clone)]
pub struct DefectService {
    remote: Arc<dyn DefectStore>,
    local: Arc<dyn DefectStore>,
    outbox: Arc<DefectOutbox>,
    storage: StorageClient,
    mode: Arc<RwLock<PersistenceMode>>,
    // Uma sincronização por vez: a fila é lida e aparada dentro do mesmo guard
    sync_guard: Arc<Mutex<()>>,
    probe_timeout: Duration,
}

impl DefectService {
    pub fn new(
        remote: Arc<dyn DefectStore>,
        local: Arc<dyn DefectStore>,
        outbox: Arc<DefectOutbox>,
        storage: StorageClient,
        mode: PersistenceMode,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            remote,
            local,
            outbox,
            storage,
            mode: Arc::new(RwLock::new(mode)),
            sync_guard: Arc::new(Mutex::new(())),
            probe_timeout,
        }
    }

    /// Sondagem somente-leitura com limite de tempo.
    async fn probe(remote: &dyn DefectStore, timeout: Duration) -> bool {
        match tokio::time::timeout(timeout, remote.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!("⚠️ Banco remoto de defeitos indisponível: {}", e);
                false
            }
            Err(_) => {
                tracing::warn!("⚠️ Sondagem do banco remoto excedeu {:?}", timeout);
                false
            }
        }
    }

    /// Decide o modo de persistência na inicialização.
    pub async fn resolve_mode(
        backend: DefectsBackend,
        remote: &dyn DefectStore,
        timeout: Duration,
    ) -> Result<PersistenceMode, AppError> {
        let mode = match backend {
            DefectsBackend::Remote => PersistenceMode::Remote,
            DefectsBackend::Local => PersistenceMode::Local,
            DefectsBackend::Auto => {
                if Self::probe(remote, timeout).await {
                    PersistenceMode::Remote
                } else {
                    PersistenceMode::Local
                }
            }
        };
        tracing::info!("🗂️ Defeitos em modo {:?} (DEFECTS_BACKEND={:?})", mode, backend);
        Ok(mode)
    }

    pub async fn mode(&self) -> PersistenceMode {
        *self.mode.read().await
    }

    async fn active(&self) -> (PersistenceMode, &dyn DefectStore) {
        match self.mode().await {
            PersistenceMode::Remote => (PersistenceMode::Remote, self.remote.as_ref()),
            PersistenceMode::Local => (PersistenceMode::Local, self.local.as_ref()),
        }
    }

    // Em modo local toda escrita também entra na fila de sincronização
    async fn record(&self, mode: PersistenceMode, op: PendingOperation) -> Result<(), AppError> {
        if mode == PersistenceMode::Local {
            self.outbox.push(op).await?;
        }
        Ok(())
    }

    pub async fn connectivity(&self) -> Result<ConnectivityStatus, AppError> {
        Ok(ConnectivityStatus {
            mode: self.mode().await,
            pending_operations: self.outbox.len().await?,
        })
    }

    /// Sonda o banco remoto de novo e troca o modo conforme o resultado.
    /// Não migra dados entre os armazenamentos.
    pub async fn force_check_remote(&self) -> Result<ConnectivityStatus, AppError> {
        let reachable = Self::probe(self.remote.as_ref(), self.probe_timeout).await;
        let new_mode = if reachable { PersistenceMode::Remote } else { PersistenceMode::Local };

        {
            let mut mode = self.mode.write().await;
            if *mode != new_mode {
                tracing::info!("🔁 Modo de defeitos: {:?} -> {:?}", *mode, new_mode);
            }
            *mode = new_mode;
        }

        self.connectivity().await
    }

    pub async fn create_defect(&self, input: NewDefect) -> Result<Defect, AppError> {
        let now = Utc::now();
        let defect = Defect {
            id: Uuid::new_v4(),
            apartment_id: input.apartment_id,
            title: input.title,
            description: input.description,
            photo_url: input.photo_url,
            status: DefectStatus::Active,
            detail_status: Some(input.detail_status.unwrap_or(DefectDetailStatus::Open)),
            x_coord: input.x_coord,
            y_coord: input.y_coord,
            created_at: now,
            updated_at: now,
        };

        let (mode, store) = self.active().await;
        let saved = store.insert(&defect).await?;
        self.record(mode, PendingOperation::Create { defect: saved.clone() }).await?;
        Ok(saved)
    }

    pub async fn get_defects_by_apartment(&self, apartment_id: &str) -> Result<Vec<Defect>, AppError> {
        let (_, store) = self.active().await;
        store.list_by_apartment(apartment_id).await
    }

    pub async fn list_all(&self) -> Result<Vec<Defect>, AppError> {
        let (_, store) = self.active().await;
        store.list_all().await
    }

    pub async fn get_defect(&self, id: Uuid) -> Result<Defect, AppError> {
        let (_, store) = self.active().await;
        store.find(id).await?.ok_or(AppError::DefectNotFound(id))
    }

    // Lê, aplica a mudança, regrava e enfileira (se local)
    async fn modify<F>(&self, id: Uuid, change: F) -> Result<Defect, AppError>
    where
        F: FnOnce(&mut Defect),
    {
        let (mode, store) = self.active().await;
        let mut defect = store.find(id).await?.ok_or(AppError::DefectNotFound(id))?;
        change(&mut defect);
        defect.updated_at = Utc::now();

        let saved = store.save(&defect).await?;
        self.record(mode, PendingOperation::Update { defect: saved.clone() }).await?;
        Ok(saved)
    }

    pub async fn update_defect_status(&self, id: Uuid, update: DefectStatusUpdate) -> Result<Defect, AppError> {
        self.modify(id, |defect| {
            defect.status = update.status;
            if update.detail_status.is_some() {
                defect.detail_status = update.detail_status;
            }
        })
        .await
    }

    pub async fn update_defect(&self, id: Uuid, update: DefectUpdate) -> Result<Defect, AppError> {
        self.modify(id, |defect| {
            if let Some(title) = update.title {
                defect.title = title;
            }
            if let Some(description) = update.description {
                defect.description = Some(description);
            }
            if let Some(photo_url) = update.photo_url {
                defect.photo_url = Some(photo_url);
            }
            if let Some(x) = update.x_coord {
                defect.x_coord = x;
            }
            if let Some(y) = update.y_coord {
                defect.y_coord = y;
            }
        })
        .await
    }

    pub async fn delete_defect(&self, id: Uuid) -> Result<(), AppError> {
        let (mode, store) = self.active().await;
        if !store.delete(id).await? {
            return Err(AppError::DefectNotFound(id));
        }
        self.record(mode, PendingOperation::Delete { id, deleted_at: Utc::now() }).await
    }

    /// Foto do defeito: bucket no modo remoto, data URL no modo local (ou sem storage).
    pub async fn upload_defect_photo(
        &self,
        id: Uuid,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Defect, AppError> {
        // Garante que o defeito existe antes de enviar qualquer coisa
        self.get_defect(id).await?;

        if self.mode().await == PersistenceMode::Remote && self.storage.is_configured() {
            let path = format!("{}/{}.{}", id, Uuid::new_v4(), extension_for(content_type));
            return self
                .storage
                .upload_and_persist(DEFECT_PHOTOS_BUCKET, &path, bytes, content_type, |url| {
                    self.modify(id, move |defect| defect.photo_url = Some(url))
                })
                .await;
        }

        let url = format!("data:{};base64,{}", content_type, STANDARD.encode(&bytes));
        self.modify(id, |defect| defect.photo_url = Some(url)).await
    }

    /// Reenvia a fila local para o banco remoto, em ordem.
    /// Vence a última escrita (`updated_at`); a réplica mais nova no remoto é conflito.
    pub async fn sync_pending(&self) -> Result<SyncReport, AppError> {
        if self.mode().await != PersistenceMode::Remote {
            return Err(AppError::RemoteUnavailable);
        }

        let _guard = self.sync_guard.lock().await;
        let ops = self.outbox.pending().await?;
        let mut report = SyncReport::default();
        let mut processed = 0;

        for op in &ops {
            match self.replay(op).await {
                Ok(true) => report.applied += 1,
                Ok(false) => {
                    tracing::warn!("⚔️ Conflito ao sincronizar defeito {}", op.defect_id());
                    report.conflicts.push(op.defect_id());
                }
                Err(e) => {
                    tracing::error!("🔥 Sincronização interrompida em {}: {}", op.defect_id(), e);
                    break;
                }
            }
            // Resolvido: o registro deixa de existir só localmente
            self.local.delete(op.defect_id()).await?;
            processed += 1;
        }

        self.outbox.remove_first(processed).await?;
        report.remaining = ops.len() - processed;

        tracing::info!(
            "🔄 Sincronização: {} aplicadas, {} conflitos, {} pendentes",
            report.applied,
            report.conflicts.len(),
            report.remaining
        );
        Ok(report)
    }

    // Ok(true) aplicada, Ok(false) conflito
    async fn replay(&self, op: &PendingOperation) -> Result<bool, AppError> {
        match op {
            PendingOperation::Create { defect } => {
                if self.remote.find(defect.id).await?.is_some() {
                    return Ok(false);
                }
                self.remote.insert(defect).await?;
                Ok(true)
            }
            PendingOperation::Update { defect } => match self.remote.find(defect.id).await? {
                Some(current) if current.updated_at > defect.updated_at => Ok(false),
                Some(_) => {
                    self.remote.save(defect).await?;
                    Ok(true)
                }
                None => Ok(false),
            },
            PendingOperation::Delete { id, deleted_at } => match self.remote.find(*id).await? {
                Some(current) if current.updated_at > *deleted_at => Ok(false),
                Some(_) => {
                    self.remote.delete(*id).await?;
                    Ok(true)
                }
                // Já não existe no remoto
                None => Ok(true),
            },
        }
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalDefectStore;
    use async_trait::async_trait;
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicBool, Ordering},
            Mutex,
        },
    };
    use tempfile::TempDir;

    // Banco remoto em memória que pode "cair"
    #[derive(Default)]
    struct FakeRemote {
        offline: AtomicBool,
        // Lê normalmente, mas recusa gravações
        read_only: AtomicBool,
        rows: Mutex<HashMap<Uuid, Defect>>,
    }

    impl FakeRemote {
        fn check(&self) -> Result<(), AppError> {
            if self.offline.load(Ordering::SeqCst) {
                Err(AppError::RemoteUnavailable)
            } else {
                Ok(())
            }
        }

        fn check_write(&self) -> Result<(), AppError> {
            self.check()?;
            if self.read_only.load(Ordering::SeqCst) {
                return Err(AppError::RemoteUnavailable);
            }
            Ok(())
        }

        fn set_online(&self, online: bool) {
            self.offline.store(!online, Ordering::SeqCst);
        }

        fn set_read_only(&self, read_only: bool) {
            self.read_only.store(read_only, Ordering::SeqCst);
        }

        fn contains(&self, id: Uuid) -> bool {
            self.rows.lock().unwrap().contains_key(&id)
        }
    }

    #[async_trait]
    impl DefectStore for FakeRemote {
        async fn ping(&self) -> Result<(), AppError> {
            self.check()
        }

        async fn insert(&self, defect: &Defect) -> Result<Defect, AppError> {
            self.check_write()?;
            self.rows.lock().unwrap().insert(defect.id, defect.clone());
            Ok(defect.clone())
        }

        async fn find(&self, id: Uuid) -> Result<Option<Defect>, AppError> {
            self.check()?;
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        async fn list_by_apartment(&self, apartment_id: &str) -> Result<Vec<Defect>, AppError> {
            self.check()?;
            let mut rows: Vec<Defect> = self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|d| d.apartment_id == apartment_id)
                .cloned()
                .collect();
            rows.sort_by_key(|d| d.created_at);
            Ok(rows)
        }

        async fn list_all(&self) -> Result<Vec<Defect>, AppError> {
            self.check()?;
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }

        async fn save(&self, defect: &Defect) -> Result<Defect, AppError> {
            self.check_write()?;
            let mut rows = self.rows.lock().unwrap();
            if !rows.contains_key(&defect.id) {
                return Err(AppError::DefectNotFound(defect.id));
            }
            rows.insert(defect.id, defect.clone());
            Ok(defect.clone())
        }

        async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
            self.check_write()?;
            Ok(self.rows.lock().unwrap().remove(&id).is_some())
        }
    }

    struct Harness {
        _temp: TempDir,
        remote: Arc<FakeRemote>,
        service: DefectService,
    }

    fn harness(mode: PersistenceMode) -> Harness {
        harness_with_storage(mode, StorageClient::new(None).unwrap())
    }

    fn harness_with_storage(mode: PersistenceMode, storage: StorageClient) -> Harness {
        let temp = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::default());
        let service = DefectService::new(
            remote.clone(),
            Arc::new(LocalDefectStore::new(temp.path())),
            Arc::new(DefectOutbox::new(temp.path())),
            storage,
            mode,
            Duration::from_millis(200),
        );
        Harness { _temp: temp, remote, service }
    }

    fn crack() -> NewDefect {
        NewDefect {
            apartment_id: "101".into(),
            title: "Crack".into(),
            description: None,
            photo_url: None,
            detail_status: None,
            x_coord: 15.5,
            y_coord: 20.3,
        }
    }

    #[tokio::test]
    async fn created_defect_is_listed_by_apartment() {
        let h = harness(PersistenceMode::Remote);
        let created = h.service.create_defect(crack()).await.unwrap();

        assert_eq!(created.status, DefectStatus::Active);
        assert_eq!(created.detail_status, Some(DefectDetailStatus::Open));

        let listed = h.service.get_defects_by_apartment("101").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Crack");
        assert_eq!(listed[0].x_coord, 15.5);
        assert_eq!(listed[0].y_coord, 20.3);
        assert_eq!(listed[0].id, created.id);
    }

    #[tokio::test]
    async fn status_update_leaves_other_fields_untouched() {
        let h = harness(PersistenceMode::Remote);
        let created = h.service.create_defect(crack()).await.unwrap();

        let update = DefectStatusUpdate { status: DefectStatus::Fixed, detail_status: None };
        h.service.update_defect_status(created.id, update).await.unwrap();

        let fetched = h.service.get_defect(created.id).await.unwrap();
        assert_eq!(fetched.status, DefectStatus::Fixed);
        assert!(fetched.updated_at >= created.updated_at);

        let mut expected = created.clone();
        expected.status = DefectStatus::Fixed;
        expected.updated_at = fetched.updated_at;
        assert_eq!(fetched, expected);
    }

    #[tokio::test]
    async fn partial_update_changes_only_given_fields() {
        let h = harness(PersistenceMode::Local);
        let created = h.service.create_defect(crack()).await.unwrap();

        let update = DefectUpdate { description: Some("Fissura de 2mm".into()), ..Default::default() };
        let updated = h.service.update_defect(created.id, update).await.unwrap();

        assert_eq!(updated.description.as_deref(), Some("Fissura de 2mm"));
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.x_coord, created.x_coord);
    }

    #[tokio::test]
    async fn deleting_unknown_defect_is_not_found() {
        let h = harness(PersistenceMode::Local);
        let err = h.service.delete_defect(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::DefectNotFound(_)));
    }

    #[tokio::test]
    async fn auto_mode_falls_back_to_local_when_remote_is_down() {
        let remote = FakeRemote::default();
        remote.set_online(false);
        let mode = DefectService::resolve_mode(DefectsBackend::Auto, &remote, Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(mode, PersistenceMode::Local);

        remote.set_online(true);
        let mode = DefectService::resolve_mode(DefectsBackend::Auto, &remote, Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(mode, PersistenceMode::Remote);

        // Modo forçado não sonda
        remote.set_online(false);
        let mode = DefectService::resolve_mode(DefectsBackend::Remote, &remote, Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(mode, PersistenceMode::Remote);
    }

    #[tokio::test]
    async fn remote_failures_are_not_redirected_to_local() {
        let h = harness(PersistenceMode::Remote);
        h.remote.set_online(false);

        let err = h.service.create_defect(crack()).await.unwrap_err();
        assert!(matches!(err, AppError::RemoteUnavailable));
        assert_eq!(h.service.mode().await, PersistenceMode::Remote);
        assert_eq!(h.service.connectivity().await.unwrap().pending_operations, 0);
    }

    #[tokio::test]
    async fn local_records_stay_invisible_after_switching_to_remote() {
        let h = harness(PersistenceMode::Local);
        let created = h.service.create_defect(crack()).await.unwrap();
        assert_eq!(h.service.connectivity().await.unwrap().pending_operations, 1);

        let status = h.service.force_check_remote().await.unwrap();
        assert_eq!(status.mode, PersistenceMode::Remote);
        assert_eq!(status.pending_operations, 1);

        // Sem migração automática
        assert!(h.service.get_defects_by_apartment("101").await.unwrap().is_empty());
        let err = h.service.get_defect(created.id).await.unwrap_err();
        assert!(matches!(err, AppError::DefectNotFound(_)));
    }

    #[tokio::test]
    async fn force_check_switches_to_local_when_remote_drops() {
        let h = harness(PersistenceMode::Remote);
        h.remote.set_online(false);
        let status = h.service.force_check_remote().await.unwrap();
        assert_eq!(status.mode, PersistenceMode::Local);
    }

    #[tokio::test]
    async fn sync_replays_local_operations_in_order() {
        let h = harness(PersistenceMode::Local);
        let created = h.service.create_defect(crack()).await.unwrap();
        let update = DefectStatusUpdate { status: DefectStatus::Fixed, detail_status: Some(DefectDetailStatus::Resolved) };
        h.service.update_defect_status(created.id, update).await.unwrap();

        h.service.force_check_remote().await.unwrap();
        let report = h.service.sync_pending().await.unwrap();

        assert_eq!(report.applied, 2);
        assert!(report.conflicts.is_empty());
        assert_eq!(report.remaining, 0);

        let remote_copy = h.service.get_defect(created.id).await.unwrap();
        assert_eq!(remote_copy.status, DefectStatus::Fixed);
        assert_eq!(remote_copy.detail_status, Some(DefectDetailStatus::Resolved));
        assert_eq!(h.service.connectivity().await.unwrap().pending_operations, 0);
    }

    #[tokio::test]
    async fn newer_remote_record_wins_over_queued_update() {
        let h = harness(PersistenceMode::Remote);
        let created = h.service.create_defect(crack()).await.unwrap();

        // Cópia local antiga, editada offline
        let mut stale = created.clone();
        stale.title = "Edição offline".into();
        stale.updated_at = created.updated_at - chrono::Duration::minutes(5);
        h.service.outbox.push(PendingOperation::Update { defect: stale }).await.unwrap();

        let report = h.service.sync_pending().await.unwrap();
        assert_eq!(report.applied, 0);
        assert_eq!(report.conflicts, vec![created.id]);
        assert_eq!(report.remaining, 0);
        assert_eq!(h.service.get_defect(created.id).await.unwrap().title, "Crack");
    }

    #[tokio::test]
    async fn sync_requires_remote_mode() {
        let h = harness(PersistenceMode::Local);
        let err = h.service.sync_pending().await.unwrap_err();
        assert!(matches!(err, AppError::RemoteUnavailable));
    }

    #[tokio::test]
    async fn failed_replay_keeps_the_rest_queued() {
        let h = harness(PersistenceMode::Local);
        h.service.create_defect(crack()).await.unwrap();
        h.service.create_defect(crack()).await.unwrap();

        // Remoto aceito na troca de modo, mas cai antes da sincronização
        h.service.force_check_remote().await.unwrap();
        h.remote.set_online(false);

        let report = h.service.sync_pending().await.unwrap();
        assert_eq!(report.applied, 0);
        assert_eq!(report.remaining, 2);
        assert_eq!(h.service.connectivity().await.unwrap().pending_operations, 2);
    }

    #[tokio::test]
    async fn photo_becomes_data_url_without_storage() {
        let h = harness(PersistenceMode::Local);
        let created = h.service.create_defect(crack()).await.unwrap();

        let updated = h
            .service
            .upload_defect_photo(created.id, vec![0xFF, 0xD8, 0xFF], "image/jpeg")
            .await
            .unwrap();
        assert_eq!(updated.photo_url.as_deref(), Some("data:image/jpeg;base64,/9j/"));
    }

    #[tokio::test]
    async fn overlapping_syncs_apply_each_operation_once() {
        let h = harness(PersistenceMode::Local);
        for _ in 0..5 {
            h.service.create_defect(crack()).await.unwrap();
        }
        h.service.force_check_remote().await.unwrap();

        let (a, b) = tokio::join!(h.service.sync_pending(), h.service.sync_pending());
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.applied + b.applied, 5);
        assert!(a.conflicts.is_empty());
        assert!(b.conflicts.is_empty());
        assert_eq!(a.remaining + b.remaining, 0);
        assert_eq!(h.service.connectivity().await.unwrap().pending_operations, 0);
        assert_eq!(h.remote.rows.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn queued_delete_removes_remote_record() {
        let h = harness(PersistenceMode::Remote);
        let created = h.service.create_defect(crack()).await.unwrap();
        let deleted_at = created.updated_at + chrono::Duration::seconds(1);
        h.service.outbox.push(PendingOperation::Delete { id: created.id, deleted_at }).await.unwrap();

        let report = h.service.sync_pending().await.unwrap();
        assert_eq!(report.applied, 1);
        assert!(report.conflicts.is_empty());
        assert!(!h.remote.contains(created.id));
    }

    #[tokio::test]
    async fn queued_delete_loses_to_newer_remote_edit() {
        let h = harness(PersistenceMode::Remote);
        let created = h.service.create_defect(crack()).await.unwrap();
        let deleted_at = created.updated_at - chrono::Duration::minutes(5);
        h.service.outbox.push(PendingOperation::Delete { id: created.id, deleted_at }).await.unwrap();

        let report = h.service.sync_pending().await.unwrap();
        assert_eq!(report.applied, 0);
        assert_eq!(report.conflicts, vec![created.id]);
        assert_eq!(report.remaining, 0);
        assert!(h.remote.contains(created.id));
    }

    #[tokio::test]
    async fn queued_delete_of_missing_record_counts_as_applied() {
        let h = harness(PersistenceMode::Remote);
        let id = Uuid::new_v4();
        h.service.outbox.push(PendingOperation::Delete { id, deleted_at: Utc::now() }).await.unwrap();

        let report = h.service.sync_pending().await.unwrap();
        assert_eq!(report.applied, 1);
        assert!(report.conflicts.is_empty());
        assert_eq!(h.service.connectivity().await.unwrap().pending_operations, 0);
    }

    #[tokio::test]
    async fn queued_create_with_existing_id_is_a_conflict() {
        let h = harness(PersistenceMode::Remote);
        let created = h.service.create_defect(crack()).await.unwrap();

        let mut offline_copy = created.clone();
        offline_copy.title = "Outra fissura".into();
        h.service.outbox.push(PendingOperation::Create { defect: offline_copy }).await.unwrap();

        let report = h.service.sync_pending().await.unwrap();
        assert_eq!(report.applied, 0);
        assert_eq!(report.conflicts, vec![created.id]);
        assert_eq!(h.service.get_defect(created.id).await.unwrap().title, "Crack");
    }

    #[tokio::test]
    async fn queued_update_of_missing_record_is_a_conflict() {
        let h = harness(PersistenceMode::Remote);
        let now = Utc::now();
        let orphan = Defect {
            id: Uuid::new_v4(),
            apartment_id: "101".into(),
            title: "Crack".into(),
            description: None,
            photo_url: None,
            status: DefectStatus::Fixed,
            detail_status: None,
            x_coord: 1.0,
            y_coord: 2.0,
            created_at: now,
            updated_at: now,
        };
        h.service.outbox.push(PendingOperation::Update { defect: orphan.clone() }).await.unwrap();

        let report = h.service.sync_pending().await.unwrap();
        assert_eq!(report.applied, 0);
        assert_eq!(report.conflicts, vec![orphan.id]);
        assert_eq!(report.remaining, 0);
        assert!(!h.remote.contains(orphan.id));
    }

    #[tokio::test]
    async fn uploaded_photo_is_removed_when_the_record_cannot_be_saved() {
        let (config, calls) = crate::services::storage::mock::spawn().await;
        let h = harness_with_storage(PersistenceMode::Remote, StorageClient::new(Some(config)).unwrap());
        let created = h.service.create_defect(crack()).await.unwrap();

        h.remote.set_read_only(true);
        let err = h
            .service
            .upload_defect_photo(created.id, vec![0xFF, 0xD8, 0xFF], "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RemoteUnavailable));

        let calls = calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].starts_with(&format!("POST defect-photos/{}/", created.id)));
        assert_eq!(calls[1], calls[0].replacen("POST", "DELETE", 1));

        h.remote.set_read_only(false);
        assert_eq!(h.service.get_defect(created.id).await.unwrap().photo_url, None);
    }
}
