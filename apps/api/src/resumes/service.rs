use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract;
use crate::models::ResumeVersionRow;
use crate::store::{NewResumeVersion, ScreeningStore};

pub const MAX_FILE_MB: u64 = 10;

pub struct RegisterResume {
    pub applicant_id: Uuid,
    pub storage_path: String,
}

/// Register a stored résumé file as the applicant's current version.
/// The previous version keeps its row but loses the `is_current` flag in
/// the same transaction.
pub async fn register_resume(
    store: &dyn ScreeningStore,
    req: &RegisterResume,
) -> Result<ResumeVersionRow, AppError> {
    store
        .applicant(req.applicant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Applicant {} not found", req.applicant_id)))?;

    let path = Path::new(&req.storage_path);
    extract::ensure_supported(path)
        .map_err(|err| AppError::UnsupportedMediaType(err.to_string()))?;

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|err| AppError::Validation(format!("Resume file is not readable: {err}")))?;
    if metadata.len() > MAX_FILE_MB * 1024 * 1024 {
        return Err(AppError::PayloadTooLarge(format!(
            "File too large (> {MAX_FILE_MB} MB)"
        )));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| AppError::Validation(format!("Resume file is not readable: {err}")))?;

    let version = store
        .register_resume_version(NewResumeVersion {
            applicant_id: req.applicant_id,
            storage_path: req.storage_path.clone(),
            content_hash: content_hash(&bytes),
        })
        .await?;

    info!(
        "Resume version {} registered for applicant {} ({} bytes)",
        version.id,
        req.applicant_id,
        bytes.len()
    );
    Ok(version)
}

fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use std::io::Write;

    fn resume_file(suffix: &str, bytes: &[u8]) -> tempfile::TempPath {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(bytes).unwrap();
        file.into_temp_path()
    }

    async fn register(
        store: &MemoryStore,
        applicant_id: Uuid,
        path: &std::path::Path,
    ) -> Result<ResumeVersionRow, AppError> {
        register_resume(
            store,
            &RegisterResume {
                applicant_id,
                storage_path: path.to_str().unwrap().to_string(),
            },
        )
        .await
    }

    #[tokio::test]
    async fn test_register_hashes_and_marks_current() {
        let store = MemoryStore::new();
        let applicant = store.insert_applicant("Iris Vela");
        let path = resume_file(".txt", b"plain resume text");

        let version = register(&store, applicant.id, &path).await.unwrap();

        assert!(version.is_current);
        // sha256 of "plain resume text"
        assert_eq!(version.content_hash.len(), 64);
        assert!(version.content_hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_register_replaces_previous_current() {
        let store = MemoryStore::new();
        let applicant = store.insert_applicant("Iris Vela");
        let first_file = resume_file(".txt", b"first");
        let second_file = resume_file(".txt", b"second");

        let first = register(&store, applicant.id, &first_file).await.unwrap();
        let second = register(&store, applicant.id, &second_file).await.unwrap();

        assert_ne!(first.content_hash, second.content_hash);
        let current = store
            .current_resume_version(applicant.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.id, second.id);
    }

    #[tokio::test]
    async fn test_register_refuses_unsupported_extension() {
        let store = MemoryStore::new();
        let applicant = store.insert_applicant("Iris Vela");
        let path = resume_file(".png", b"not a resume");

        let err = register(&store, applicant.id, &path).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMediaType(_)));
    }

    #[tokio::test]
    async fn test_register_refuses_unknown_applicant() {
        let store = MemoryStore::new();
        let path = resume_file(".txt", b"text");

        let err = register(&store, Uuid::new_v4(), &path).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_register_refuses_missing_file() {
        let store = MemoryStore::new();
        let applicant = store.insert_applicant("Iris Vela");

        let err = register(
            &store,
            applicant.id,
            std::path::Path::new("/nonexistent/cv.txt"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
