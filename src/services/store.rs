// src/services/store.rs
//
// Persistence boundary. Handlers only see these traits; `MemoryStore` backs
// the binary and the tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{
    errors::AppResult,
    models::{AttendanceRecord, Employee, OutputRecord, RevenueRecord, ShiftAssignment},
    services::calendar::DateWindow,
};

/// Company-scoped JSON settings, keyed like `kpi_system_<company>`.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_blob(&self, key: &str) -> AppResult<Option<Value>>;
    async fn put_blob(&self, key: &str, value: Value) -> AppResult<()>;
}

/// Employees and the dated rows hanging off them. Every write is an upsert.
#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn upsert_employee(&self, employee: Employee) -> AppResult<Employee>;
    async fn list_employees(&self, company_id: &str) -> AppResult<Vec<Employee>>;
    async fn get_employee(&self, company_id: &str, employee_id: &str) -> AppResult<Option<Employee>>;

    /// Keyed by (employee, date); the last write wins.
    async fn upsert_attendance(&self, company_id: &str, record: AttendanceRecord) -> AppResult<AttendanceRecord>;
    async fn attendance_between(&self, company_id: &str, window: DateWindow) -> AppResult<Vec<AttendanceRecord>>;
    async fn attendance_on(
        &self,
        company_id: &str,
        employee_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<AttendanceRecord>>;

    async fn upsert_shift_assignments(&self, company_id: &str, assignments: Vec<ShiftAssignment>) -> AppResult<()>;
    async fn shift_assignments_between(&self, company_id: &str, window: DateWindow) -> AppResult<Vec<ShiftAssignment>>;

    async fn add_output(&self, company_id: &str, record: OutputRecord) -> AppResult<()>;
    async fn outputs_between(&self, company_id: &str, window: DateWindow) -> AppResult<Vec<OutputRecord>>;

    async fn add_revenue(&self, company_id: &str, record: RevenueRecord) -> AppResult<()>;
    async fn revenue_between(&self, company_id: &str, window: DateWindow) -> AppResult<Vec<RevenueRecord>>;
}

type DatedKey = (String, NaiveDate);

#[derive(Debug, Default)]
struct CompanyRows {
    employees: BTreeMap<String, Employee>,
    attendance: BTreeMap<DatedKey, AttendanceRecord>,
    assignments: BTreeMap<DatedKey, ShiftAssignment>,
    outputs: Vec<OutputRecord>,
    revenue: Vec<RevenueRecord>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, Value>>,
    companies: RwLock<HashMap<String, CompanyRows>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn within<'a, T: 'a>(
    rows: impl Iterator<Item = &'a T>,
    window: DateWindow,
    date_of: impl Fn(&T) -> NaiveDate,
) -> Vec<T>
where
    T: Clone,
{
    rows.filter(|r| window.contains(date_of(r))).cloned().collect()
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get_blob(&self, key: &str) -> AppResult<Option<Value>> {
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn put_blob(&self, key: &str, value: Value) -> AppResult<()> {
        self.blobs.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[async_trait]
impl RosterStore for MemoryStore {
    async fn upsert_employee(&self, employee: Employee) -> AppResult<Employee> {
        let mut companies = self.companies.write().await;
        companies
            .entry(employee.company_id.clone())
            .or_default()
            .employees
            .insert(employee.id.clone(), employee.clone());
        Ok(employee)
    }

    async fn list_employees(&self, company_id: &str) -> AppResult<Vec<Employee>> {
        let companies = self.companies.read().await;
        Ok(companies
            .get(company_id)
            .map(|c| c.employees.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_employee(&self, company_id: &str, employee_id: &str) -> AppResult<Option<Employee>> {
        let companies = self.companies.read().await;
        Ok(companies
            .get(company_id)
            .and_then(|c| c.employees.get(employee_id))
            .cloned())
    }

    async fn upsert_attendance(&self, company_id: &str, record: AttendanceRecord) -> AppResult<AttendanceRecord> {
        let mut companies = self.companies.write().await;
        companies
            .entry(company_id.to_string())
            .or_default()
            .attendance
            .insert((record.employee_id.clone(), record.date), record.clone());
        Ok(record)
    }

    async fn attendance_between(&self, company_id: &str, window: DateWindow) -> AppResult<Vec<AttendanceRecord>> {
        let companies = self.companies.read().await;
        Ok(companies
            .get(company_id)
            .map(|c| within(c.attendance.values(), window, |r| r.date))
            .unwrap_or_default())
    }

    async fn attendance_on(
        &self,
        company_id: &str,
        employee_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<AttendanceRecord>> {
        let companies = self.companies.read().await;
        Ok(companies
            .get(company_id)
            .and_then(|c| c.attendance.get(&(employee_id.to_string(), date)))
            .cloned())
    }

    async fn upsert_shift_assignments(&self, company_id: &str, assignments: Vec<ShiftAssignment>) -> AppResult<()> {
        let mut companies = self.companies.write().await;
        let rows = companies.entry(company_id.to_string()).or_default();
        for a in assignments {
            rows.assignments.insert((a.employee_id.clone(), a.date), a);
        }
        Ok(())
    }

    async fn shift_assignments_between(&self, company_id: &str, window: DateWindow) -> AppResult<Vec<ShiftAssignment>> {
        let companies = self.companies.read().await;
        Ok(companies
            .get(company_id)
            .map(|c| within(c.assignments.values(), window, |a| a.date))
            .unwrap_or_default())
    }

    async fn add_output(&self, company_id: &str, record: OutputRecord) -> AppResult<()> {
        let mut companies = self.companies.write().await;
        companies.entry(company_id.to_string()).or_default().outputs.push(record);
        Ok(())
    }

    async fn outputs_between(&self, company_id: &str, window: DateWindow) -> AppResult<Vec<OutputRecord>> {
        let companies = self.companies.read().await;
        Ok(companies
            .get(company_id)
            .map(|c| within(c.outputs.iter(), window, |o| o.date))
            .unwrap_or_default())
    }

    async fn add_revenue(&self, company_id: &str, record: RevenueRecord) -> AppResult<()> {
        let mut companies = self.companies.write().await;
        companies.entry(company_id.to_string()).or_default().revenue.push(record);
        Ok(())
    }

    async fn revenue_between(&self, company_id: &str, window: DateWindow) -> AppResult<Vec<RevenueRecord>> {
        let companies = self.companies.read().await;
        Ok(companies
            .get(company_id)
            .map(|c| within(c.revenue.iter(), window, |r| r.date))
            .unwrap_or_default())
    }
}
