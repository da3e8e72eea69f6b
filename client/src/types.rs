//! Type definitions for the lifecycle client

use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

use shared::validation::{base_name, describe_extensions, matched_extension};
use shared::{ClientConfig, UserIdentity};
use crate::error::{ClientError, ClientResult, ValidationFailure};

/// A model archive selected for upload
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read an archive from disk, keeping only its base name
    pub async fn from_path(path: &Path) -> ClientResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Source of the signed-in identity. Sign-in and sign-out events replace the
/// current value; every `Session` handed out observes the change.
#[derive(Debug, Clone)]
pub struct IdentityHandle {
    sender: Arc<watch::Sender<Option<UserIdentity>>>,
}

impl IdentityHandle {
    pub fn new(initial: Option<UserIdentity>) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn sign_in(&self, identity: UserIdentity) {
        self.sender.send_replace(Some(identity));
    }

    pub fn sign_out(&self) {
        self.sender.send_replace(None);
    }

    pub fn current(&self) -> Option<UserIdentity> {
        self.sender.borrow().clone()
    }

    pub fn session(&self) -> Session {
        Session {
            identity: self.sender.subscribe(),
        }
    }
}

impl Default for IdentityHandle {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Explicit request context carrying the current owner
#[derive(Debug, Clone)]
pub struct Session {
    identity: watch::Receiver<Option<UserIdentity>>,
}

impl Session {
    /// A session fixed to one identity
    pub fn signed_in(identity: UserIdentity) -> Self {
        IdentityHandle::new(Some(identity)).session()
    }

    pub fn anonymous() -> Self {
        IdentityHandle::new(None).session()
    }

    pub fn identity(&self) -> Option<UserIdentity> {
        self.identity.borrow().clone()
    }

    pub fn require_identity(&self) -> ClientResult<UserIdentity> {
        self.identity().ok_or(ClientError::Unauthenticated)
    }
}

/// Local upload checks: extension allow-list and size ceiling
#[derive(Debug, Clone, PartialEq)]
pub struct UploadPolicy {
    pub allowed_extensions: Vec<String>,
    pub max_upload_bytes: u64,
}

impl UploadPolicy {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            allowed_extensions: config.allowed_extensions.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    pub fn validate(&self, artifact: &Artifact) -> Result<(), ValidationFailure> {
        let file_name = base_name(&artifact.file_name);
        if file_name.trim().is_empty() {
            return Err(ValidationFailure::EmptyFileName);
        }
        if matched_extension(file_name, &self.allowed_extensions).is_none() {
            return Err(ValidationFailure::UnsupportedExtension {
                file_name: file_name.to_string(),
                allowed: describe_extensions(&self.allowed_extensions),
            });
        }
        if artifact.size() > self.max_upload_bytes {
            return Err(ValidationFailure::TooLarge {
                size: artifact.size(),
                limit: self.max_upload_bytes,
            });
        }
        Ok(())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_accepts_allowed_archives() {
        let policy = UploadPolicy::default();
        assert!(policy.validate(&Artifact::new("model.zip", vec![0; 10])).is_ok());
        assert!(policy.validate(&Artifact::new("MODEL.TAR.GZ", vec![0; 10])).is_ok());
    }

    #[test]
    fn test_policy_rejections() {
        let policy = UploadPolicy {
            allowed_extensions: vec![".zip".into()],
            max_upload_bytes: 4,
        };

        assert_eq!(
            policy.validate(&Artifact::new("model.exe", vec![])),
            Err(ValidationFailure::UnsupportedExtension {
                file_name: "model.exe".into(),
                allowed: ".zip".into(),
            })
        );
        assert_eq!(
            policy.validate(&Artifact::new("model.zip", vec![0; 5])),
            Err(ValidationFailure::TooLarge { size: 5, limit: 4 })
        );
        assert_eq!(
            policy.validate(&Artifact::new("", vec![0])),
            Err(ValidationFailure::EmptyFileName)
        );
    }

    #[test]
    fn test_session_follows_identity_events() {
        let handle = IdentityHandle::default();
        let session = handle.session();
        assert_eq!(session.require_identity(), Err(ClientError::Unauthenticated));

        handle.sign_in(UserIdentity::new("u1"));
        assert_eq!(session.identity().map(|i| i.uid), Some("u1".to_string()));

        handle.sign_out();
        assert!(session.identity().is_none());
    }

    #[tokio::test]
    async fn test_artifact_from_path_uses_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.zip");
        tokio::fs::write(&path, b"zip").await.unwrap();

        let artifact = Artifact::from_path(&path).await.unwrap();
        assert_eq!(artifact.file_name, "model.zip");
        assert_eq!(artifact.size(), 3);
    }
}
