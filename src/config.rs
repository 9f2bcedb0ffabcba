// src/config.rs

use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        BudgetRepository, DashboardRepository, DefectOutbox, DefectStore, LocalDefectStore,
        MaterialRepository, PgDefectRepository, ProjectRepository, TaskRepository, UserRepository,
    },
    models::{defect::PersistenceMode, task::ColumnMapping},
    services::{
        auth::AuthService, budget_service::BudgetService, dashboard_service::DashboardService,
        defect_service::DefectService, material_service::MaterialService,
        project_service::ProjectService, report_service::ReportService, storage::StorageClient,
        task_service::TaskService,
    },
};

/// Onde os defeitos são gravados.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefectsBackend {
    Auto,
    Remote,
    Local,
}

impl FromStr for DefectsBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(DefectsBackend::Auto),
            "remote" => Ok(DefectsBackend::Remote),
            "local" => Ok(DefectsBackend::Local),
            other => Err(anyhow!("DEFECTS_BACKEND inválido: '{other}' (use auto, remote ou local)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub url: String,
    pub service_key: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub defects_backend: DefectsBackend,
    pub data_dir: PathBuf,
    pub storage: Option<StorageConfig>,
    pub fonts_dir: PathBuf,
    pub run_migrations: bool,
    pub remote_probe_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte chave/valor.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = get("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(v) => v.parse().context("DB_MAX_CONNECTIONS deve ser um número")?,
            None => 5,
        };

        let defects_backend = match get("DEFECTS_BACKEND") {
            Some(v) => v.parse()?,
            None => DefectsBackend::Auto,
        };

        // Storage só é habilitado com URL e chave
        let storage = match (get("SUPABASE_URL"), get("SUPABASE_SERVICE_KEY")) {
            (Some(url), Some(service_key)) => Some(StorageConfig { url, service_key }),
            (Some(_), None) | (None, Some(_)) => {
                return Err(anyhow!("SUPABASE_URL e SUPABASE_SERVICE_KEY devem ser definidas juntas"));
            }
            (None, None) => None,
        };

        let run_migrations = match get("RUN_MIGRATIONS") {
            Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
            None => true,
        };

        let probe_secs: u64 = match get("REMOTE_PROBE_TIMEOUT_SECS") {
            Some(v) => v.parse().context("REMOTE_PROBE_TIMEOUT_SECS deve ser um número")?,
            None => 3,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections,
            defects_backend,
            data_dir: get("DATA_DIR").unwrap_or_else(|| "./data".to_string()).into(),
            storage,
            fonts_dir: get("FONTS_DIR").unwrap_or_else(|| "./fonts".to_string()).into(),
            run_migrations,
            remote_probe_timeout: Duration::from_secs(probe_secs),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub user_repo: UserRepository,
    pub defect_service: DefectService,
    pub budget_service: BudgetService,
    pub task_service: TaskService,
    pub project_service: ProjectService,
    pub material_service: MaterialService,
    pub report_service: ReportService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        // Conexão preguiçosa: o serviço sobe mesmo sem banco (modo local)
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.remote_probe_timeout)
            .connect_lazy(&config.database_url)?;

        // Migra antes de sondar: num banco novo a tabela defects ainda não existe
        if config.run_migrations {
            Self::migrate(&db_pool, config.defects_backend).await?;
        }

        let remote: Arc<dyn DefectStore> = Arc::new(PgDefectRepository::new(db_pool.clone()));
        let mode = DefectService::resolve_mode(
            config.defects_backend,
            remote.as_ref(),
            config.remote_probe_timeout,
        )
        .await?;

        let mapping = TaskService::detect_or_default(&TaskRepository::new(db_pool.clone())).await;

        Self::assemble(config, db_pool, mode, mapping)
    }

    // Falha só é fatal quando o banco remoto foi exigido
    async fn migrate(db_pool: &PgPool, backend: DefectsBackend) -> anyhow::Result<()> {
        match sqlx::migrate!().run(db_pool).await {
            Ok(()) => {
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
                Ok(())
            }
            Err(e) if backend == DefectsBackend::Remote => {
                Err(anyhow!("Falha ao rodar as migrações do banco de dados: {e}"))
            }
            Err(e) => {
                tracing::warn!("⚠️ Migrações não aplicadas ({}); seguindo sem banco", e);
                Ok(())
            }
        }
    }

    /// Monta o grafo de dependências com modo e mapeamento já resolvidos.
    pub fn assemble(
        config: AppConfig,
        db_pool: PgPool,
        mode: PersistenceMode,
        mapping: ColumnMapping,
    ) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::load()?);
        let storage = StorageClient::new(config.storage.clone())?;

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let auth_service = AuthService::new(user_repo.clone(), config.jwt_secret.clone());

        let defect_service = DefectService::new(
            Arc::new(PgDefectRepository::new(db_pool.clone())),
            Arc::new(LocalDefectStore::new(&config.data_dir)),
            Arc::new(DefectOutbox::new(&config.data_dir)),
            storage.clone(),
            mode,
            config.remote_probe_timeout,
        );

        let budget_service = BudgetService::new(BudgetRepository::new(db_pool.clone()));
        let task_service = TaskService::new(TaskRepository::new(db_pool.clone()), mapping);
        let project_service = ProjectService::new(ProjectRepository::new(db_pool.clone()), storage);
        let material_service = MaterialService::new(MaterialRepository::new(db_pool.clone()));
        let report_service = ReportService::new(
            defect_service.clone(),
            project_service.clone(),
            config.fonts_dir.clone(),
        );
        let dashboard_service = DashboardService::new(
            DashboardRepository::new(db_pool.clone()),
            defect_service.clone(),
            budget_service.clone(),
            task_service.clone(),
        );

        Ok(Self {
            db_pool,
            i18n_store,
            auth_service,
            user_repo,
            defect_service,
            budget_service,
            task_service,
            project_service,
            material_service,
            report_service,
            dashboard_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_required_keys_are_set() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/canteiro"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.defects_backend, DefectsBackend::Auto);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert!(config.storage.is_none());
        assert!(config.run_migrations);
        assert_eq!(config.remote_probe_timeout, Duration::from_secs(3));
    }

    #[test]
    fn missing_secret_is_an_error() {
        let result = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")]));
        assert!(result.is_err());
    }

    #[test]
    fn backend_and_storage_are_parsed() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("DEFECTS_BACKEND", "LOCAL"),
            ("SUPABASE_URL", "https://demo.supabase.co"),
            ("SUPABASE_SERVICE_KEY", "key"),
            ("RUN_MIGRATIONS", "false"),
        ]))
        .unwrap();

        assert_eq!(config.defects_backend, DefectsBackend::Local);
        assert_eq!(config.storage.unwrap().url, "https://demo.supabase.co");
        assert!(!config.run_migrations);
    }

    #[test]
    fn half_configured_storage_is_rejected() {
        let result = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("SUPABASE_URL", "https://demo.supabase.co"),
        ]));
        assert!(result.is_err());
    }

    fn startup_config(backend: &str, data_dir: &std::path::Path) -> AppConfig {
        let url = env::var("CANTEIRO_TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgres://canteiro:x@127.0.0.1:1/canteiro".to_string());
        let dir = data_dir.to_string_lossy().to_string();
        let mut config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", url.as_str()),
            ("JWT_SECRET", "segredo"),
            ("DEFECTS_BACKEND", backend),
            ("DATA_DIR", dir.as_str()),
        ]))
        .unwrap();
        config.remote_probe_timeout = Duration::from_millis(300);
        config
    }

    #[tokio::test]
    async fn auto_startup_without_database_runs_in_local_mode() {
        if env::var("CANTEIRO_TEST_DATABASE_URL").is_ok() {
            return;
        }
        let temp = tempfile::TempDir::new().unwrap();
        let state = AppState::new(startup_config("auto", temp.path())).await.unwrap();
        assert_eq!(state.defect_service.mode().await, PersistenceMode::Local);
    }

    #[tokio::test]
    async fn remote_startup_fails_when_migrations_cannot_run() {
        if env::var("CANTEIRO_TEST_DATABASE_URL").is_ok() {
            return;
        }
        let temp = tempfile::TempDir::new().unwrap();
        assert!(AppState::new(startup_config("remote", temp.path())).await.is_err());
    }

    // Requer um Postgres vazio em CANTEIRO_TEST_DATABASE_URL
    #[tokio::test]
    async fn fresh_database_is_migrated_before_the_mode_is_chosen() {
        if env::var("CANTEIRO_TEST_DATABASE_URL").is_err() {
            return;
        }
        let temp = tempfile::TempDir::new().unwrap();
        let state = AppState::new(startup_config("auto", temp.path())).await.unwrap();

        assert_eq!(state.defect_service.mode().await, PersistenceMode::Remote);
        let mapping = state.task_service.mapping().await;
        assert_eq!(mapping.progress, Some("progress_perc"));
        assert!(mapping.has("project_id"));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!("cloud".parse::<DefectsBackend>().is_err());
        assert_eq!(" Remote ".parse::<DefectsBackend>().unwrap(), DefectsBackend::Remote);
    }
}
