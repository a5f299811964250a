use super::error::{ServiceError, ServiceResult};
use crate::access::{AccessProfile, Permission};
use crate::database::models::{SettingsPatch, SiteSettings};
use crate::database::TeamStore;

pub fn get_settings(store: &TeamStore, profile: &AccessProfile) -> ServiceResult<SiteSettings> {
    profile.require(Permission::SettingsRead)?;
    Ok(store.settings.clone())
}

pub fn update_settings(store: &mut TeamStore, profile: &AccessProfile, patch: SettingsPatch) -> ServiceResult<SiteSettings> {
    profile.require(Permission::SettingsManage)?;
    store
        .settings
        .apply(patch)
        .map_err(|field_errors| ServiceError::validation("Invalid settings", field_errors))?;
    Ok(store.settings.clone())
}
