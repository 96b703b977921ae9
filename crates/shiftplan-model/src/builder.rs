//! Builds the [`ProblemDescription`] of one run from the precomputed stages.
//!
//! Variables are created in a fixed order (assignments by employee then
//! shift, then slack variables per rule) and every collection walked here is
//! ordered, so identical inputs produce identical problems.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use shiftplan_config::{hours_to_minutes, PlannerConfig};
use shiftplan_core::{
    iso_week, Employee, PenaltyTier, Result, SchedulingInput, Shift, ShiftplanError,
};
use shiftplan_precompute::weights::fairness_target;
use shiftplan_precompute::{
    overtime_factors, ConflictSet, DemandSource, Eligibility, Segment, SegmentIndex, WeightTable,
};
use tracing::{debug, info};

use crate::problem::{
    Constraint, ConstraintFamily, ObjectiveTerm, ProblemDescription, Relation, Term, VarId,
    VariableKind,
};

/// Packages segments, conflicts and weights into a problem description.
///
/// Hard rules become constraints without slack: rest and consecutive-night
/// pairs per affected employee, the weekly night cap, the daily shift limit,
/// weekly hours with bounded overtime and the optional global overtime cap.
/// Every soft rule gets slack variables that carry the tier's weighted cost.
///
/// # Errors
///
/// Returns [`ShiftplanError::UnknownReference`] when the eligibility mask or
/// the conflict set names a shift or employee missing from `input`.
pub fn build_problem(
    segments: &SegmentIndex,
    conflicts: &ConflictSet,
    weights: &WeightTable,
    eligibility: &Eligibility,
    input: &SchedulingInput,
    config: &PlannerConfig,
) -> Result<ProblemDescription> {
    let mut builder = ProblemBuilder::new(weights, input);
    for (employee, shift) in eligibility.pairs() {
        builder.assignment(employee, shift)?;
    }

    for segment in segments.iter() {
        builder.coverage(segment);
    }
    if weights.is_enabled(PenaltyTier::UnmetSkill) {
        for segment in segments.iter() {
            builder.skills(segment);
        }
    }
    if weights.is_enabled(PenaltyTier::UnmetShift) {
        builder.shift_demand();
    }
    builder.conflicts(conflicts);
    builder.night_cap(conflicts);
    builder.daily_limit(config.hours.max_shifts_per_day);
    builder.hours(config)?;
    if weights.is_enabled(PenaltyTier::Fairness) {
        builder.workload(fairness_target(segments, eligibility));
    }
    builder.preferences();

    let problem = builder.finish();
    info!(
        event = "problem_built",
        variables = problem.variables.len(),
        assignments = problem.assignment_count(),
        constraints = problem.constraints.len(),
        objective_terms = problem.objective.len(),
    );
    Ok(problem)
}

struct ProblemBuilder<'a> {
    problem: ProblemDescription,
    weights: &'a WeightTable,
    input: &'a SchedulingInput,
    shifts: BTreeMap<&'a str, &'a Shift>,
    employees: BTreeMap<&'a str, &'a Employee>,
    /// Assignment variables by shift, then employee.
    by_shift: BTreeMap<&'a str, BTreeMap<&'a str, VarId>>,
    /// Assignment variables by employee, then shift.
    by_employee: BTreeMap<&'a str, BTreeMap<&'a str, VarId>>,
}

impl<'a> ProblemBuilder<'a> {
    fn new(weights: &'a WeightTable, input: &'a SchedulingInput) -> Self {
        Self {
            problem: ProblemDescription::default(),
            weights,
            input,
            shifts: input.shifts.iter().map(|s| (s.id.as_str(), s)).collect(),
            employees: input.employees.iter().map(|e| (e.id.as_str(), e)).collect(),
            by_shift: BTreeMap::new(),
            by_employee: BTreeMap::new(),
        }
    }

    fn finish(self) -> ProblemDescription {
        self.problem
    }

    fn shift(&self, id: &str) -> Result<&'a Shift> {
        self.shifts
            .get(id)
            .copied()
            .ok_or_else(|| ShiftplanError::unknown("problem", "shift", id))
    }

    fn assignment(&mut self, employee: &str, shift: &str) -> Result<()> {
        let employee = self
            .employees
            .get_key_value(employee)
            .map(|(k, _)| *k)
            .ok_or_else(|| ShiftplanError::unknown("problem", "employee", employee))?;
        let shift = self.shift(shift)?.id.as_str();

        let var = self.problem.add_variable(
            format!("x[{employee},{shift}]"),
            VariableKind::Assignment {
                employee: employee.to_string(),
                shift: shift.to_string(),
            },
            0,
            1,
        );
        self.by_shift.entry(shift).or_default().insert(employee, var);
        self.by_employee.entry(employee).or_default().insert(shift, var);
        Ok(())
    }

    /// Assignment variables of a shift, by employee id.
    fn staff(&self, shift: &str) -> impl Iterator<Item = (&'a str, VarId)> + '_ {
        self.by_shift
            .get(shift)
            .into_iter()
            .flat_map(|m| m.iter().map(|(e, v)| (*e, *v)))
    }

    fn penalize(&mut self, var: VarId, tier: PenaltyTier, minutes_per_unit: u64) {
        self.penalize_scaled(var, tier, minutes_per_unit, 1.0);
    }

    /// Like `penalize`, with the cost multiplied by `factor`.
    fn penalize_scaled(
        &mut self,
        var: VarId,
        tier: PenaltyTier,
        minutes_per_unit: u64,
        factor: f64,
    ) {
        let Some(weight) = self.weights.weight(tier) else {
            return;
        };
        if minutes_per_unit == 0 || factor <= 0.0 {
            return;
        }
        self.problem.objective.push(ObjectiveTerm {
            var,
            tier,
            minutes_per_unit,
            coefficient: weight * minutes_per_unit as f64 * factor,
        });
    }

    fn slack(&mut self, name: String, kind: VariableKind, upper: i64) -> VarId {
        self.problem.add_variable(name, kind, 0, upper)
    }

    /// `Σ x + shortfall - overstaff = demand` over the segment's covering shifts.
    fn coverage(&mut self, segment: &Segment) {
        let mut terms: Vec<Term> = segment
            .covering_shifts
            .iter()
            .flat_map(|s| self.staff(s))
            .map(|(_, var)| Term { var, coef: 1 })
            .collect();
        if terms.is_empty() && segment.demand == 0 {
            return;
        }

        let minutes = u64::from(segment.minutes());
        let tier = match segment.source {
            DemandSource::Windows => PenaltyTier::UnmetWindow,
            DemandSource::Shift { .. } | DemandSource::Unspecified => PenaltyTier::UnmetDemand,
        };
        let staffable = terms.len() as i64;

        if segment.demand > 0 {
            let short = self.slack(
                format!("short[{}]", segment.id),
                VariableKind::Shortfall {
                    segment: segment.id.clone(),
                },
                i64::from(segment.demand),
            );
            self.penalize(short, tier, minutes);
            terms.push(Term { var: short, coef: 1 });
        }
        if staffable > 0 {
            let over = self.slack(
                format!("over[{}]", segment.id),
                VariableKind::Overstaff {
                    segment: segment.id.clone(),
                },
                staffable,
            );
            self.penalize(over, PenaltyTier::Overstaff, minutes);
            terms.push(Term { var: over, coef: -1 });
        }

        self.problem.add_constraint(Constraint {
            name: format!("coverage[{}]", segment.id),
            family: ConstraintFamily::Coverage,
            terms,
            relation: Relation::Eq,
            rhs: i64::from(segment.demand),
        });
    }

    /// `Σ x(holders) + shortfall >= count` per required skill.
    fn skills(&mut self, segment: &Segment) {
        let minutes = u64::from(segment.minutes());
        for (skill, &count) in segment.skills.iter() {
            if count == 0 {
                continue;
            }
            let mut terms = Vec::new();
            for shift in &segment.covering_shifts {
                for (employee, var) in self.staff(shift) {
                    let holder = self
                        .employees
                        .get(employee)
                        .is_some_and(|e| e.has_skill(skill));
                    if holder {
                        terms.push(Term { var, coef: 1 });
                    }
                }
            }
            let short = self.slack(
                format!("skill_short[{},{skill}]", segment.id),
                VariableKind::SkillShortfall {
                    segment: segment.id.clone(),
                    skill: skill.clone(),
                },
                i64::from(count),
            );
            self.penalize(short, PenaltyTier::UnmetSkill, minutes);
            terms.push(Term { var: short, coef: 1 });

            self.problem.add_constraint(Constraint {
                name: format!("skill[{},{skill}]", segment.id),
                family: ConstraintFamily::Skill,
                terms,
                relation: Relation::Ge,
                rhs: i64::from(count),
            });
        }
    }

    /// `Σ x + shortfall >= own_demand` per shift declaring a demand.
    fn shift_demand(&mut self) {
        let demanding: Vec<&'a Shift> = self
            .shifts
            .values()
            .copied()
            .filter(|s| s.own_demand.is_some_and(|d| d > 0))
            .collect();
        for shift in demanding {
            let demand = i64::from(shift.own_demand.unwrap_or(0));
            let mut terms: Vec<Term> = self
                .staff(&shift.id)
                .map(|(_, var)| Term { var, coef: 1 })
                .collect();
            let short = self.slack(
                format!("shift_short[{}]", shift.id),
                VariableKind::ShiftShortfall {
                    shift: shift.id.clone(),
                },
                demand,
            );
            self.penalize(
                short,
                PenaltyTier::UnmetShift,
                u64::from(shift.duration_minutes()),
            );
            terms.push(Term { var: short, coef: 1 });

            self.problem.add_constraint(Constraint {
                name: format!("shift_demand[{}]", shift.id),
                family: ConstraintFamily::ShiftDemand,
                terms,
                relation: Relation::Ge,
                rhs: demand,
            });
        }
    }

    /// `x[e,a] + x[e,b] <= 1` for every employee a conflict pair applies to.
    fn conflicts(&mut self, conflicts: &ConflictSet) {
        for pair in &conflicts.pairs {
            let affected: Vec<(&'a str, VarId, VarId)> = self
                .staff(&pair.first)
                .filter_map(|(employee, first)| {
                    let second = *self.by_employee.get(employee)?.get(pair.second.as_str())?;
                    Some((employee, first, second))
                })
                .filter(|(employee, _, _)| conflicts.applies_to(pair, employee))
                .collect();

            for (employee, first, second) in affected {
                let short_rest = pair.gap_minutes < i64::from(conflicts.rest_of(employee));
                let (family, label) = if short_rest {
                    (ConstraintFamily::Rest, "rest")
                } else {
                    (ConstraintFamily::ConsecutiveNights, "nights")
                };
                self.problem.add_constraint(Constraint {
                    name: format!("{label}[{employee},{},{}]", pair.first, pair.second),
                    family,
                    terms: vec![
                        Term { var: first, coef: 1 },
                        Term { var: second, coef: 1 },
                    ],
                    relation: Relation::Le,
                    rhs: 1,
                });
            }
        }
    }

    /// At most `max_nights_per_week` night shifts per employee per ISO week.
    fn night_cap(&mut self, conflicts: &ConflictSet) {
        let cap = i64::from(conflicts.max_nights_per_week);
        for week in &conflicts.night_weeks {
            let mut per_employee: BTreeMap<&'a str, Vec<VarId>> = BTreeMap::new();
            for shift in &week.shifts {
                for (employee, var) in self.staff(shift) {
                    per_employee.entry(employee).or_default().push(var);
                }
            }
            for (employee, vars) in per_employee {
                if vars.len() as i64 <= cap {
                    continue;
                }
                self.problem.add_constraint(Constraint {
                    name: format!("night_cap[{employee},{}-W{:02}]", week.iso_year, week.iso_week),
                    family: ConstraintFamily::NightCap,
                    terms: vars.into_iter().map(|var| Term { var, coef: 1 }).collect(),
                    relation: Relation::Le,
                    rhs: cap,
                });
            }
        }
    }

    /// At most `limit` shifts per employee starting on the same day.
    fn daily_limit(&mut self, limit: u32) {
        let mut per_day: BTreeMap<(&'a str, NaiveDate), Vec<VarId>> = BTreeMap::new();
        for (&employee, shifts) in &self.by_employee {
            for (&shift, &var) in shifts {
                if let Some(s) = self.shifts.get(shift) {
                    per_day.entry((employee, s.interval.day)).or_default().push(var);
                }
            }
        }
        for ((employee, day), vars) in per_day {
            if vars.len() as u32 <= limit {
                continue;
            }
            self.problem.add_constraint(Constraint {
                name: format!("daily[{employee},{day}]"),
                family: ConstraintFamily::DailyLimit,
                terms: vars.into_iter().map(|var| Term { var, coef: 1 }).collect(),
                relation: Relation::Le,
                rhs: i64::from(limit),
            });
        }
    }

    /// `Σ minutes·x - overtime <= contract` per employee per ISO week.
    ///
    /// Overtime is priced at the employee's relative overtime cost.
    fn hours(&mut self, config: &PlannerConfig) -> Result<()> {
        let factors = overtime_factors(self.input, config);
        let mut overtime_vars = Vec::new();
        let employees: Vec<&'a str> = self.by_employee.keys().copied().collect();

        for employee in employees {
            let Some(&record) = self.employees.get(employee) else {
                continue;
            };
            let contract = i64::from(hours_to_minutes(
                record.max_week_hours.unwrap_or(config.hours.max_weekly),
            ));
            let allowance = i64::from(hours_to_minutes(
                record
                    .max_overtime_hours
                    .unwrap_or(config.hours.max_overtime),
            ));

            let mut weeks: BTreeMap<(i32, u32), Vec<Term>> = BTreeMap::new();
            for (&shift, &var) in self.by_employee.get(employee).into_iter().flatten() {
                let shift = self.shift(shift)?;
                weeks
                    .entry(iso_week(shift.interval.day))
                    .or_default()
                    .push(Term {
                        var,
                        coef: i64::from(shift.duration_minutes()),
                    });
            }

            for ((iso_year, week), mut terms) in weeks {
                let possible: i64 = terms.iter().map(|t| t.coef).sum();
                if possible <= contract {
                    continue;
                }
                let upper = allowance.min(possible - contract);
                if upper > 0 {
                    let ot = self.slack(
                        format!("overtime[{employee},{iso_year}-W{week:02}]"),
                        VariableKind::Overtime {
                            employee: employee.to_string(),
                            iso_year,
                            iso_week: week,
                        },
                        upper,
                    );
                    let factor = factors.get(employee).copied().unwrap_or(1.0);
                    self.penalize_scaled(ot, PenaltyTier::Overtime, 1, factor);
                    terms.push(Term { var: ot, coef: -1 });
                    overtime_vars.push(ot);
                }
                self.problem.add_constraint(Constraint {
                    name: format!("hours[{employee},{iso_year}-W{week:02}]"),
                    family: ConstraintFamily::Hours,
                    terms,
                    relation: Relation::Le,
                    rhs: contract,
                });
            }
        }

        if let Some(cap) = config.hours.global_overtime_cap {
            if !overtime_vars.is_empty() {
                self.problem.add_constraint(Constraint {
                    name: "overtime_cap".to_string(),
                    family: ConstraintFamily::OvertimeCap,
                    terms: overtime_vars
                        .into_iter()
                        .map(|var| Term { var, coef: 1 })
                        .collect(),
                    relation: Relation::Le,
                    rhs: i64::from(hours_to_minutes(cap)),
                });
            }
        }
        Ok(())
    }

    /// `Σ minutes·x - over + under = target` per active employee.
    fn workload(&mut self, target: u64) {
        let target = target as i64;
        let rows: Vec<(&'a str, Vec<Term>)> = self
            .by_employee
            .iter()
            .map(|(&employee, shifts)| {
                let terms = shifts
                    .iter()
                    .filter_map(|(shift, &var)| {
                        let minutes = self.shifts.get(shift)?.duration_minutes();
                        Some(Term {
                            var,
                            coef: i64::from(minutes),
                        })
                    })
                    .collect();
                (employee, terms)
            })
            .collect();

        for (employee, mut terms) in rows {
            let possible: i64 = terms.iter().map(|t| t.coef).sum();
            if possible > target {
                let over = self.slack(
                    format!("work_over[{employee}]"),
                    VariableKind::WorkloadOver {
                        employee: employee.to_string(),
                    },
                    possible - target,
                );
                self.penalize(over, PenaltyTier::Fairness, 1);
                terms.push(Term { var: over, coef: -1 });
            }
            if target > 0 {
                let under = self.slack(
                    format!("work_under[{employee}]"),
                    VariableKind::WorkloadUnder {
                        employee: employee.to_string(),
                    },
                    target,
                );
                self.penalize(under, PenaltyTier::Fairness, 1);
                terms.push(Term { var: under, coef: 1 });
            }
            self.problem.add_constraint(Constraint {
                name: format!("workload[{employee}]"),
                family: ConstraintFamily::Workload,
                terms,
                relation: Relation::Eq,
                rhs: target,
            });
        }
    }

    /// Negative preference scores cost `|score|` per assigned minute.
    fn preferences(&mut self) {
        let input = self.input;
        for pref in input.preferences.iter().filter(|p| p.score < 0) {
            let var = self
                .by_employee
                .get(pref.employee_id.as_str())
                .and_then(|m| m.get(pref.shift_id.as_str()))
                .copied();
            let (Some(var), Some(shift)) = (var, self.shifts.get(pref.shift_id.as_str())) else {
                debug!(
                    event = "preference_skipped",
                    employee = %pref.employee_id,
                    shift = %pref.shift_id,
                );
                continue;
            };
            let minutes = u64::from(pref.score.unsigned_abs()) * u64::from(shift.duration_minutes());
            self.penalize(var, PenaltyTier::Preferences, minutes);
        }
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
