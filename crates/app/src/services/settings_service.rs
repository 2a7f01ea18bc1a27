//! Settings service: read and replace the installation settings.

use roomhub_domain::error::{HubError, NotFoundError};
use roomhub_domain::policy::{Action, Subject, authorize};
use roomhub_domain::settings::Settings;
use roomhub_domain::user::Identity;

use crate::ports::SettingsRepository;

/// Application service for the settings singleton.
pub struct SettingsService<S> {
    repo: S,
}

impl<S: SettingsRepository> SettingsService<S> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: S) -> Self {
        Self { repo }
    }

    /// Read the settings.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when no settings were ever stored, or
    /// a storage error.
    pub async fn get(&self, identity: &Identity) -> Result<Settings, HubError> {
        authorize(identity, Subject::Settings, Action::View, None)?;
        self.repo.get().await?.ok_or_else(|| {
            NotFoundError {
                entity: "Settings",
                id: "current".to_string(),
            }
            .into()
        })
    }

    /// Replace the settings. Staff only.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Forbidden`] for non-staff callers, or a storage
    /// error.
    #[tracing::instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn update(
        &self,
        identity: &Identity,
        settings: Settings,
    ) -> Result<Settings, HubError> {
        authorize(identity, Subject::Settings, Action::Update, None)?;
        self.repo.put(settings).await
    }

    /// Store `settings` unless some were already saved.
    ///
    /// Returns the settings in effect afterwards.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn seed(&self, settings: Settings) -> Result<Settings, HubError> {
        if let Some(existing) = self.repo.get().await? {
            tracing::debug!("settings already present, seed skipped");
            return Ok(existing);
        }
        tracing::info!(broker_ip = %settings.broker_ip, "settings seeded");
        self.repo.put(settings).await
    }
}
