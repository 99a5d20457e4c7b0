// src/services/payroll.rs

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::{Employee, SalaryComponents},
    services::{absence::AbsenceSummary, calendar::DateWindow},
};

/// Standard number of paid work days in a month.
pub const STANDARD_WORK_DAYS: u32 = 26;

pub struct PayrollService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TakeHome {
    pub gross_fixed: i64,
    pub absence_deduction: i64,
    pub total_deduction: i64,
    /// May be negative; surfaced as-is for admin review.
    pub take_home: i64,
}

/// Payroll line for one employee in one payroll month.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PayrollSummary {
    pub employee_id: String,
    pub employee_name: String,
    pub window: DateWindow,
    pub absences: u32,
    pub breakdown: TakeHome,
    pub recorded_absence_deduction: i64,
}

/// Round half up to a whole unit.
fn round_half_up(value: Decimal) -> Decimal {
    (value + dec!(0.5)).floor()
}

fn saturate(value: Decimal) -> i64 {
    value.to_i64().unwrap_or(if value.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

impl PayrollService {
    /// Base salary plus the five fixed allowances.
    pub fn gross_fixed(salary: &SalaryComponents) -> i64 {
        let a = &salary.allowances;
        [a.meal, a.transport, a.communication, a.health, a.position]
            .into_iter()
            .fold(salary.base_salary, i64::saturating_add)
    }

    /// Proportional deduction for unexcused absences: `round(count × gross / 26)`.
    pub fn absence_deduction(gross_fixed: i64, absence_count: u32) -> i64 {
        // u32 × i64 stays far below Decimal's 96-bit range.
        let raw = Decimal::from(absence_count) * Decimal::from(gross_fixed)
            / Decimal::from(STANDARD_WORK_DAYS);
        saturate(round_half_up(raw))
    }

    /// Net take-home for a month with `absence_count` unexcused absences.
    pub fn compute_take_home(salary: &SalaryComponents, absence_count: u32) -> TakeHome {
        let gross_fixed = Self::gross_fixed(salary);
        let absence_deduction = Self::absence_deduction(gross_fixed, absence_count);
        let total_deduction = absence_deduction
            .saturating_add(salary.deductions.social_security)
            .saturating_add(salary.deductions.income_tax);
        let take_home = gross_fixed
            .saturating_add(salary.overtime)
            .saturating_add(salary.bonus)
            .saturating_add(salary.holiday_bonus)
            .saturating_sub(total_deduction);

        TakeHome {
            gross_fixed,
            absence_deduction,
            total_deduction,
            take_home,
        }
    }

    pub fn summarize(employee: &Employee, absences: &AbsenceSummary) -> PayrollSummary {
        PayrollSummary {
            employee_id: employee.id.clone(),
            employee_name: employee.name.clone(),
            window: absences.window,
            absences: absences.absences,
            breakdown: Self::compute_take_home(&employee.salary, absences.absences),
            recorded_absence_deduction: employee.salary.deductions.absence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Allowances, SalaryDeductions};

    fn salary() -> SalaryComponents {
        SalaryComponents {
            base_salary: 4_500_000,
            allowances: Allowances {
                meal: 500_000,
                transport: 400_000,
                communication: 200_000,
                health: 250_000,
                position: 150_000,
            },
            deductions: SalaryDeductions {
                social_security: 50_000,
                income_tax: 100_000,
                absence: 0,
            },
            bonus: 0,
            overtime: 0,
            holiday_bonus: 0,
        }
    }

    #[test]
    fn two_absences_on_six_million() {
        let result = PayrollService::compute_take_home(&salary(), 2);
        assert_eq!(result.gross_fixed, 6_000_000);
        assert_eq!(result.absence_deduction, 461_538);
        assert_eq!(result.total_deduction, 611_538);
        assert_eq!(result.take_home, 5_388_462);
    }

    #[test]
    fn no_absences_means_no_absence_deduction() {
        let mut s = salary();
        s.overtime = 300_000;
        s.bonus = 1_000_000;
        s.holiday_bonus = 6_000_000;
        let result = PayrollService::compute_take_home(&s, 0);
        assert_eq!(result.absence_deduction, 0);
        assert_eq!(
            result.take_home,
            6_000_000 + 300_000 + 1_000_000 + 6_000_000 - (50_000 + 100_000)
        );
    }

    #[test]
    fn take_home_never_increases_with_absences() {
        let s = salary();
        let mut previous = i64::MAX;
        for absences in 0..=40 {
            let take_home = PayrollService::compute_take_home(&s, absences).take_home;
            assert!(take_home <= previous, "absences {absences}");
            previous = take_home;
        }
    }

    #[test]
    fn negative_take_home_is_not_clamped() {
        let result = PayrollService::compute_take_home(&salary(), 30);
        assert!(result.take_home < 0);
    }

    #[test]
    fn rounds_half_up() {
        // 13 × 1 / 26 = 0.5
        assert_eq!(PayrollService::absence_deduction(1, 13), 1);
        // 1 × 12 / 26 = 0.4615…
        assert_eq!(PayrollService::absence_deduction(12, 1), 0);
        // 1 × 14 / 26 = 0.538…
        assert_eq!(PayrollService::absence_deduction(14, 1), 1);
    }

    #[test]
    fn empty_salary_is_all_zero() {
        let result = PayrollService::compute_take_home(&SalaryComponents::default(), 3);
        assert_eq!(
            result,
            TakeHome {
                gross_fixed: 0,
                absence_deduction: 0,
                total_deduction: 0,
                take_home: 0,
            }
        );
    }

    #[test]
    fn huge_values_saturate_instead_of_panicking() {
        let s = SalaryComponents {
            base_salary: i64::MAX,
            ..SalaryComponents::default()
        };
        let result = PayrollService::compute_take_home(&s, 60);
        assert_eq!(result.gross_fixed, i64::MAX);
        assert_eq!(result.absence_deduction, i64::MAX);
    }
}
