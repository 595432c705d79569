use job_intake::config::StorageConfig;
use job_intake::error::AppError;
use job_intake::workflows::applications::{
    ApplicationIntakeService, JsonFileRepository, UploadStore,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type IntakeService = ApplicationIntakeService<JsonFileRepository>;

/// Open the durable application list and the upload directory named by `storage`.
pub(crate) fn build_intake_service(storage: &StorageConfig) -> Result<Arc<IntakeService>, AppError> {
    let repository = Arc::new(JsonFileRepository::open(&storage.data_file));
    let uploads = Arc::new(UploadStore::new(&storage.upload_dir)?);
    Ok(Arc::new(ApplicationIntakeService::new(repository, uploads)))
}
