use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::models::Task;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnDownPoint {
    pub date: NaiveDate,
    pub ideal_remaining_hours: f64,
    pub actual_remaining_hours: f64,
}


#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BurnDownSeries {
    pub total_hours: f64,
    pub completed_hours: f64,
    pub points: Vec<BurnDownPoint>,
}

impl BurnDownSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn ideal(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.ideal_remaining_hours)
    }

    pub fn actual(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.actual_remaining_hours)
    }
}


/// Ideal vs. actual remaining hours for every day of a sprint.
///
/// The ideal line decays linearly from the total on the first day to zero on
/// the last. The actual line only knows the start and end state: it stays at
/// the total and drops to the remaining hours on the final day.
#[derive(Debug, Clone, Copy, Default)]
pub struct BurnDownSeriesBuilder;

impl BurnDownSeriesBuilder {

    pub fn new() -> Self {
        Self
    }


    pub fn build(&self, tasks: &[Task], start_date: NaiveDate, end_date: NaiveDate) -> BurnDownSeries {
        let total_hours: f64 = tasks.iter().map(|t| t.estimated_hours).sum();
        let completed_hours: f64 = tasks
            .iter()
            .filter(|t| t.completed)
            .map(|t| t.estimated_hours)
            .sum();

        let days = (end_date - start_date).num_days();
        if days < 0 {
            debug!("Burn-down for {} -> {} has no days", start_date, end_date);
            return BurnDownSeries {
                total_hours,
                completed_hours,
                points: Vec::new(),
            };
        }

        let len = days as usize + 1;
        let step = if len > 1 { total_hours / (len - 1) as f64 } else { 0.0 };

        let points = (0..len)
            .map(|i| {
                let ideal = if i + 1 == len && len > 1 {
                    0.0
                } else {
                    total_hours - step * i as f64
                };
                let actual = if i + 1 == len {
                    total_hours - completed_hours
                } else {
                    total_hours
                };
                BurnDownPoint {
                    date: start_date + Duration::days(i as i64),
                    ideal_remaining_hours: ideal,
                    actual_remaining_hours: actual,
                }
            })
            .collect();

        BurnDownSeries {
            total_hours,
            completed_hours,
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn tasks() -> Vec<Task> {
        vec![
            Task::new("a", 6.0).completed(true),
            Task::new("b", 4.0),
            Task::new("c", 10.0),
        ]
    }

    #[test]
    fn test_axis_covers_every_day_inclusive() {
        let series = BurnDownSeriesBuilder::new().build(&tasks(), day(1), day(5));

        assert_eq!(series.len(), 5);
        let dates: Vec<NaiveDate> = series.dates().collect();
        assert_eq!(dates, vec![day(1), day(2), day(3), day(4), day(5)]);
    }

    #[test]
    fn test_ideal_line_runs_from_total_to_zero() {
        let series = BurnDownSeriesBuilder::new().build(&tasks(), day(1), day(5));
        let ideal: Vec<f64> = series.ideal().collect();

        assert_eq!(ideal, vec![20.0, 15.0, 10.0, 5.0, 0.0]);
    }

    #[test]
    fn test_actual_only_moves_on_last_day() {
        let series = BurnDownSeriesBuilder::new().build(&tasks(), day(1), day(5));
        let actual: Vec<f64> = series.actual().collect();

        assert_eq!(actual, vec![20.0, 20.0, 20.0, 20.0, 14.0]);
        assert!((series.completed_hours - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_day_sprint() {
        let series = BurnDownSeriesBuilder::new().build(&tasks(), day(3), day(3));

        assert_eq!(series.len(), 1);
        assert_eq!(series.points[0].ideal_remaining_hours, 20.0);
        assert_eq!(series.points[0].actual_remaining_hours, 14.0);
    }

    #[test]
    fn test_backwards_range_is_empty() {
        let series = BurnDownSeriesBuilder::new().build(&tasks(), day(9), day(3));
        assert!(series.is_empty());
        assert_eq!(series.total_hours, 20.0);
    }

    #[test]
    fn test_no_tasks_is_flat_zero() {
        let series = BurnDownSeriesBuilder::new().build(&[], day(1), day(3));
        assert_eq!(series.len(), 3);
        assert!(series.ideal().all(|v| v == 0.0));
        assert!(series.actual().all(|v| v == 0.0));
    }
}
