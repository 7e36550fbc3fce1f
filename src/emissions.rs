// Copyright (C) 2017 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, version 3.

// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.

// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>

//! Carbon emissions of a commute and the savings compared to driving alone.
//!
//! All the computations are done with full precision and rounded once, when
//! the figures are returned.

use crate::error::CoreError;
use crate::objects::{Period, TransportMode};
use serde::Serialize;
use std::fmt;

/// Constants of the emissions model.
///
/// Factors are expressed in kg of CO₂ per km. The car factor is the baseline
/// of every comparison and must be the highest one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionModel {
    car: f64,
    carpool: f64,
    bus: f64,
    train: f64,
    bike: f64,
    walk: f64,
    /// CO₂ absorbed by one mature tree in a year, in kg
    pub tree_absorption_kg_per_year: f64,
    /// Number of weeks of commute in a year
    pub weeks_per_year: f64,
}

impl EmissionModel {
    /// The model used everywhere in the application
    pub const BUILTIN: EmissionModel = EmissionModel {
        car: 0.192,
        carpool: 0.096,
        bus: 0.052,
        train: 0.041,
        bike: 0.0,
        walk: 0.0,
        tree_absorption_kg_per_year: 21.0,
        weeks_per_year: 52.0,
    };

    /// Emissions factor of a mode, in kg of CO₂ per km
    pub fn factor(&self, mode: TransportMode) -> f64 {
        use TransportMode::*;
        match mode {
            Car => self.car,
            Carpool => self.carpool,
            Bus => self.bus,
            Train => self.train,
            Bike => self.bike,
            Walk => self.walk,
        }
    }
}

impl Default for EmissionModel {
    fn default() -> Self {
        EmissionModel::BUILTIN
    }
}

/// Round to 2 decimals, the precision of every displayed kg figure.
pub fn round_kg(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn check_distance(distance_km: f64) -> Result<f64, CoreError> {
    if distance_km.is_finite() && distance_km >= 0.0 {
        Ok(distance_km)
    } else {
        Err(CoreError::InvalidDistance(distance_km))
    }
}

/// Savings obtained by not driving alone
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Savings {
    /// CO₂ not emitted over the period, in kg
    pub savings_kg: f64,
    /// Share of the car emissions that is not emitted
    pub savings_percent: i32,
}

/// Everything displayed about a commute
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmissionsReport {
    /// Mode of the commute
    pub mode: TransportMode,
    /// Period of aggregation
    pub period: Period,
    /// Emissions over the period, in kg
    pub emissions_kg: f64,
    /// Emissions of the same commute driving alone, in kg
    pub car_emissions_kg: f64,
    /// Savings compared to driving alone, in kg
    pub savings_kg: f64,
    /// Savings compared to driving alone, in percent
    pub savings_percent: i32,
}

/// Appreciation of a commute, from its savings compared to driving alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    /// At least 75% saved
    Amazing,
    /// At least 40% saved
    Great,
    /// Less than 40% saved
    OnTrack,
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImpactLevel::Amazing => write!(
                f,
                "Amazing! Your choice is significantly reducing carbon emissions."
            ),
            ImpactLevel::Great => write!(
                f,
                "Great job! You're making a positive environmental impact."
            ),
            ImpactLevel::OnTrack => write!(
                f,
                "You're on the right track. Consider even greener options when possible."
            ),
        }
    }
}

/// Advice given to someone driving alone
pub const CAR_TIP: &str = "Try switching to public transport, carpooling, or active transportation to reduce your carbon footprint.";

impl EmissionsReport {
    /// The appreciation of the commute, `None` when driving alone
    pub fn impact(&self) -> Option<ImpactLevel> {
        if self.mode == TransportMode::Car {
            None
        } else if self.savings_percent >= 75 {
            Some(ImpactLevel::Amazing)
        } else if self.savings_percent >= 40 {
            Some(ImpactLevel::Great)
        } else {
            Some(ImpactLevel::OnTrack)
        }
    }
}

/// Computes emissions with the constants of an [EmissionModel].
#[derive(Debug, Clone, Copy, Default)]
pub struct EmissionsEngine {
    model: EmissionModel,
}

impl EmissionsEngine {
    /// Create an engine
    pub fn new(model: EmissionModel) -> Self {
        EmissionsEngine { model }
    }

    /// The constants used by the engine
    pub fn model(&self) -> &EmissionModel {
        &self.model
    }

    /// How many daily commutes there are in a period
    pub fn period_multiplier(&self, period: Period, days_per_week: u8) -> Result<f64, CoreError> {
        if !(1..=7).contains(&days_per_week) {
            return Err(CoreError::InvalidDaysPerWeek(days_per_week));
        }
        let days = f64::from(days_per_week);
        Ok(match period {
            Period::Daily => 1.0,
            Period::Weekly => days,
            Period::Yearly => days * self.model.weeks_per_year,
        })
    }

    /// Emissions of a commute over a period, in kg, rounded to 2 decimals.
    pub fn emissions_for(
        &self,
        distance_km: f64,
        mode: TransportMode,
        period: Period,
        days_per_week: u8,
    ) -> Result<f64, CoreError> {
        let distance_km = check_distance(distance_km)?;
        let multiplier = self.period_multiplier(period, days_per_week)?;
        Ok(round_kg(distance_km * self.model.factor(mode) * multiplier))
    }

    /// Savings of a commute compared to driving alone.
    ///
    /// The percentage is 0 when nothing would be emitted by car (null distance).
    pub fn savings_vs_car(
        &self,
        distance_km: f64,
        mode: TransportMode,
        period: Period,
        days_per_week: u8,
    ) -> Result<Savings, CoreError> {
        let distance_km = check_distance(distance_km)?;
        let multiplier = self.period_multiplier(period, days_per_week)?;
        let daily_car = distance_km * self.model.factor(TransportMode::Car);
        let daily_mode = distance_km * self.model.factor(mode);
        let daily_savings = daily_car - daily_mode;
        let savings_percent = if daily_car > 0.0 {
            (daily_savings / daily_car * 100.0).round() as i32
        } else {
            0
        };
        Ok(Savings {
            savings_kg: round_kg(daily_savings * multiplier),
            savings_percent,
        })
    }

    /// Emissions and savings of a commute
    pub fn compute(
        &self,
        distance_km: f64,
        mode: TransportMode,
        period: Period,
        days_per_week: u8,
    ) -> Result<EmissionsReport, CoreError> {
        let emissions_kg = self.emissions_for(distance_km, mode, period, days_per_week)?;
        let car_emissions_kg =
            self.emissions_for(distance_km, TransportMode::Car, period, days_per_week)?;
        let savings = self.savings_vs_car(distance_km, mode, period, days_per_week)?;
        Ok(EmissionsReport {
            mode,
            period,
            emissions_kg,
            car_emissions_kg,
            savings_kg: savings.savings_kg,
            savings_percent: savings.savings_percent,
        })
    }

    /// Number of trees needed to absorb the emissions of a year.
    ///
    /// A partial tree counts as a whole one.
    pub fn trees_to_offset(&self, yearly_emissions_kg: f64) -> Result<u64, CoreError> {
        if !yearly_emissions_kg.is_finite() || yearly_emissions_kg < 0.0 {
            return Err(CoreError::InvalidEmissions(yearly_emissions_kg));
        }
        Ok((yearly_emissions_kg / self.model.tree_absorption_kg_per_year).ceil() as u64)
    }
}

/// [EmissionsEngine::compute] with the builtin model
pub fn compute_emissions(
    distance_km: f64,
    mode: TransportMode,
    period: Period,
    days_per_week: u8,
) -> Result<EmissionsReport, CoreError> {
    EmissionsEngine::default().compute(distance_km, mode, period, days_per_week)
}

/// [EmissionsEngine::trees_to_offset] with the builtin model
pub fn trees_to_offset(yearly_emissions_kg: f64) -> Result<u64, CoreError> {
    EmissionsEngine::default().trees_to_offset(yearly_emissions_kg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use TransportMode::*;

    const PERIODS: [Period; 3] = [Period::Daily, Period::Weekly, Period::Yearly];

    #[test]
    fn builtin_factors() {
        let model = EmissionModel::BUILTIN;
        assert_eq!(0.192, model.factor(Car));
        assert_eq!(0.096, model.factor(Carpool));
        assert_eq!(0.052, model.factor(Bus));
        assert_eq!(0.041, model.factor(Train));
        assert_eq!(0.0, model.factor(Bike));
        assert_eq!(0.0, model.factor(Walk));
        for mode in TransportMode::ALL.iter() {
            assert!(model.factor(*mode) >= 0.0);
            assert!(model.factor(*mode) <= model.factor(Car));
        }
    }

    #[test]
    fn ten_km_by_bus() {
        let report = compute_emissions(10.0, Bus, Period::Daily, 5).unwrap();
        assert_eq!(0.52, report.emissions_kg);
        assert_eq!(1.92, report.car_emissions_kg);
        assert_eq!(1.4, report.savings_kg);
        assert_eq!(73, report.savings_percent);
        assert_eq!(Some(ImpactLevel::Great), report.impact());
    }

    #[test]
    fn yearly_car_commute() {
        let report = compute_emissions(10.0, Car, Period::Yearly, 5).unwrap();
        assert_eq!(499.2, report.emissions_kg);
        assert_eq!(24, trees_to_offset(report.emissions_kg).unwrap());
        assert_eq!(None, report.impact());
    }

    #[test]
    fn yearly_is_daily_times_weeks() {
        let engine = EmissionsEngine::default();
        for mode in TransportMode::ALL.iter() {
            for days in 1..=7u8 {
                for distance in &[0.0, 1.0, 3.3, 10.0, 27.1, 49.9] {
                    let daily = engine
                        .emissions_for(*distance, *mode, Period::Daily, days)
                        .unwrap();
                    let yearly = engine
                        .emissions_for(*distance, *mode, Period::Yearly, days)
                        .unwrap();
                    assert_abs_diff_eq!(
                        yearly,
                        daily * f64::from(days) * 52.0,
                        epsilon = 0.005 * (f64::from(days) * 52.0 + 1.0)
                    );
                }
            }
        }
    }

    #[test]
    fn weekly_scaling_rounds_once() {
        let engine = EmissionsEngine::default();
        // 3.3 km by train: 0.1353 kg a day, 0.9471 kg a week (0.98 if rounded before scaling)
        assert_eq!(0.14, engine.emissions_for(3.3, Train, Period::Daily, 7).unwrap());
        assert_eq!(0.95, engine.emissions_for(3.3, Train, Period::Weekly, 7).unwrap());
    }

    #[test]
    fn active_modes_do_not_emit() {
        let engine = EmissionsEngine::default();
        for mode in &[Bike, Walk] {
            for period in PERIODS.iter() {
                assert_eq!(0.0, engine.emissions_for(42.0, *mode, *period, 7).unwrap());
            }
            let report = engine.compute(12.0, *mode, Period::Daily, 5).unwrap();
            assert_eq!(100, report.savings_percent);
            assert_eq!(Some(ImpactLevel::Amazing), report.impact());
        }
    }

    #[test]
    fn driving_alone_saves_nothing() {
        let engine = EmissionsEngine::default();
        for period in PERIODS.iter() {
            let savings = engine.savings_vs_car(18.5, Car, *period, 3).unwrap();
            assert_eq!(0.0, savings.savings_kg);
            assert_eq!(0, savings.savings_percent);
        }
    }

    #[test]
    fn null_distance_has_no_percentage() {
        let engine = EmissionsEngine::default();
        for mode in TransportMode::ALL.iter() {
            let savings = engine.savings_vs_car(0.0, *mode, Period::Weekly, 5).unwrap();
            assert_eq!(0.0, savings.savings_kg);
            assert_eq!(0, savings.savings_percent);
        }
    }

    #[test]
    fn carpool_halves_emissions() {
        let report = compute_emissions(20.0, Carpool, Period::Weekly, 5).unwrap();
        assert_eq!(9.6, report.emissions_kg);
        assert_eq!(9.6, report.savings_kg);
        assert_eq!(50, report.savings_percent);
        assert_eq!(Some(ImpactLevel::Great), report.impact());
    }

    #[test]
    fn trees() {
        assert_eq!(0, trees_to_offset(0.0).unwrap());
        assert_eq!(1, trees_to_offset(21.0).unwrap());
        assert_eq!(2, trees_to_offset(21.01).unwrap());
        assert_eq!(1, trees_to_offset(0.01).unwrap());
    }

    #[test]
    fn reject_invalid_inputs() {
        let engine = EmissionsEngine::default();
        assert_eq!(
            CoreError::InvalidDistance(-1.0),
            engine.emissions_for(-1.0, Bus, Period::Daily, 5).unwrap_err()
        );
        assert!(matches!(
            engine.savings_vs_car(f64::NAN, Bus, Period::Daily, 5),
            Err(CoreError::InvalidDistance(_))
        ));
        assert_eq!(
            CoreError::InvalidDistance(f64::INFINITY),
            engine.compute(f64::INFINITY, Bus, Period::Daily, 5).unwrap_err()
        );
        assert_eq!(
            CoreError::InvalidDaysPerWeek(0),
            engine.emissions_for(10.0, Bus, Period::Weekly, 0).unwrap_err()
        );
        assert_eq!(
            CoreError::InvalidDaysPerWeek(8),
            engine.emissions_for(10.0, Bus, Period::Yearly, 8).unwrap_err()
        );
        assert_eq!(
            CoreError::InvalidEmissions(-3.0),
            trees_to_offset(-3.0).unwrap_err()
        );
    }
}
