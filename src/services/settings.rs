// src/services/settings.rs

use chrono::NaiveDate;
use serde::{Serialize, de::DeserializeOwned};
use tracing::info;

use crate::{
    errors::{AppError, AppResult},
    models::{KpiSystem, LeaveAdjustment, OfficeGeofence, Shift, WeeklyHolidayMap, settings::from_blob},
    services::{shift::ShiftCatalog, store::SettingsStore},
};

pub fn kpi_system_key(company_id: &str) -> String {
    format!("kpi_system_{company_id}")
}

pub fn weekly_holidays_key(company_id: &str) -> String {
    format!("weekly_holidays_{company_id}")
}

pub fn attendance_settings_key(company_id: &str) -> String {
    format!("attendance_settings_{company_id}")
}

pub fn shifts_key(company_id: &str) -> String {
    format!("shifts_{company_id}")
}

pub fn leave_adjustments_key(company_id: &str) -> String {
    format!("leave_adjustments_{company_id}")
}

async fn load<T: DeserializeOwned + Default>(store: &dyn SettingsStore, key: &str) -> AppResult<T> {
    let blob = store.get_blob(key).await?;
    Ok(from_blob(key, blob))
}

async fn save<T: Serialize>(store: &dyn SettingsStore, key: &str, value: &T) -> AppResult<()> {
    let blob = serde_json::to_value(value)
        .map_err(|e| AppError::Internal(format!("Failed to encode {key}: {e}")))?;
    store.put_blob(key, blob).await
}

pub async fn load_geofence(store: &dyn SettingsStore, company_id: &str) -> AppResult<OfficeGeofence> {
    load(store, &attendance_settings_key(company_id)).await
}

pub async fn save_geofence(store: &dyn SettingsStore, company_id: &str, geofence: &OfficeGeofence) -> AppResult<()> {
    geofence.validate()?;
    save(store, &attendance_settings_key(company_id), geofence).await
}

/// The roster for the week containing `today`. A roster left over from an
/// earlier week is replaced by an empty one and persisted.
pub async fn load_weekly_holidays(
    store: &dyn SettingsStore,
    company_id: &str,
    today: NaiveDate,
) -> AppResult<WeeklyHolidayMap> {
    let key = weekly_holidays_key(company_id);
    let stored: Option<WeeklyHolidayMap> = match store.get_blob(&key).await? {
        Some(blob) => Some(from_blob(&key, Some(blob))),
        None => None,
    };

    match stored {
        Some(map) if !map.is_stale(today) => Ok(map),
        stale => {
            let fresh = WeeklyHolidayMap::empty_for(today);
            if let Some(old) = stale {
                info!(company_id, old_week = %old.week_of, new_week = %fresh.week_of, "Resetting weekly holidays");
            }
            save(store, &key, &fresh).await?;
            Ok(fresh)
        }
    }
}

/// Stores a roster for the current week. `week_of` is pinned to `today`'s week.
pub async fn save_weekly_holidays(
    store: &dyn SettingsStore,
    company_id: &str,
    mut map: WeeklyHolidayMap,
    today: NaiveDate,
) -> AppResult<WeeklyHolidayMap> {
    map.validate()?;
    map.week_of = WeeklyHolidayMap::empty_for(today).week_of;
    save(store, &weekly_holidays_key(company_id), &map).await?;
    Ok(map)
}

pub async fn load_kpi_system(store: &dyn SettingsStore, company_id: &str) -> AppResult<KpiSystem> {
    load(store, &kpi_system_key(company_id)).await
}

pub async fn save_kpi_system(store: &dyn SettingsStore, company_id: &str, system: &KpiSystem) -> AppResult<()> {
    system.validate()?;
    save(store, &kpi_system_key(company_id), system).await
}

pub async fn load_shift_catalog(store: &dyn SettingsStore, company_id: &str) -> AppResult<ShiftCatalog> {
    let shifts: Vec<Shift> = load(store, &shifts_key(company_id)).await?;
    Ok(ShiftCatalog::or_default(shifts))
}

pub async fn save_shift_catalog(store: &dyn SettingsStore, company_id: &str, shifts: Vec<Shift>) -> AppResult<ShiftCatalog> {
    ShiftCatalog::validate(&shifts)?;
    save(store, &shifts_key(company_id), &shifts).await?;
    Ok(ShiftCatalog::or_default(shifts))
}

pub async fn load_leave_ledger(store: &dyn SettingsStore, company_id: &str) -> AppResult<Vec<LeaveAdjustment>> {
    load(store, &leave_adjustments_key(company_id)).await
}

pub async fn append_leave_adjustment(
    store: &dyn SettingsStore,
    company_id: &str,
    adjustment: LeaveAdjustment,
) -> AppResult<Vec<LeaveAdjustment>> {
    if adjustment.employee_id.trim().is_empty() {
        return Err(AppError::Validation("employee_id is required".to_string()));
    }
    let mut ledger = load_leave_ledger(store, company_id).await?;
    ledger.push(adjustment);
    save(store, &leave_adjustments_key(company_id), &ledger).await?;
    Ok(ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayName;
    use crate::services::store::MemoryStore;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn keys_are_company_scoped() {
        assert_eq!(kpi_system_key("acme"), "kpi_system_acme");
        assert_eq!(weekly_holidays_key("acme"), "weekly_holidays_acme");
        assert_eq!(attendance_settings_key("acme"), "attendance_settings_acme");
    }

    #[tokio::test]
    async fn missing_geofence_is_default() {
        let store = MemoryStore::new();
        let geofence = load_geofence(&store, "acme").await.unwrap();
        assert_eq!(geofence, OfficeGeofence::default());
    }

    #[tokio::test]
    async fn invalid_geofence_is_not_saved() {
        let store = MemoryStore::new();
        let geofence = OfficeGeofence {
            radius_meters: -5.0,
            ..OfficeGeofence::default()
        };
        assert!(save_geofence(&store, "acme", &geofence).await.is_err());
        assert!(store.get_blob("attendance_settings_acme").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stale_holiday_roster_is_reset_and_persisted() {
        let store = MemoryStore::new();
        store
            .put_blob(
                "weekly_holidays_acme",
                json!({"week_of": "2025-03-03", "days": {"Senin": ["Rina"]}}),
            )
            .await
            .unwrap();

        let same_week = load_weekly_holidays(&store, "acme", date(2025, 3, 6)).await.unwrap();
        assert!(same_week.is_off("Rina", DayName::Senin));

        let next_week = load_weekly_holidays(&store, "acme", date(2025, 3, 12)).await.unwrap();
        assert!(next_week.days.is_empty());
        assert_eq!(next_week.week_of, date(2025, 3, 10));

        let stored = store.get_blob("weekly_holidays_acme").await.unwrap().unwrap();
        assert_eq!(stored["week_of"], json!("2025-03-10"));
    }

    #[tokio::test]
    async fn saved_roster_is_pinned_to_current_week() {
        let store = MemoryStore::new();
        let mut map = WeeklyHolidayMap::default();
        map.days.entry(DayName::Jumat).or_default().insert("Budi".to_string());
        let saved = save_weekly_holidays(&store, "acme", map, date(2025, 3, 7)).await.unwrap();
        assert_eq!(saved.week_of, date(2025, 3, 3));

        let loaded = load_weekly_holidays(&store, "acme", date(2025, 3, 8)).await.unwrap();
        assert!(loaded.is_off("budi", DayName::Jumat));
    }

    #[tokio::test]
    async fn empty_shift_blob_uses_default_catalog() {
        let store = MemoryStore::new();
        let catalog = load_shift_catalog(&store, "acme").await.unwrap();
        assert_eq!(catalog, ShiftCatalog::default_set());
    }

    #[tokio::test]
    async fn leave_ledger_appends() {
        let store = MemoryStore::new();
        let adjustment = LeaveAdjustment {
            employee_id: "emp-1".to_string(),
            year: 2025,
            days: 2,
            note: "long service".to_string(),
        };
        append_leave_adjustment(&store, "acme", adjustment.clone()).await.unwrap();
        let ledger = append_leave_adjustment(&store, "acme", adjustment).await.unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(load_leave_ledger(&store, "acme").await.unwrap().len(), 2);
    }
}
