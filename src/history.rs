use crate::dates::{date_key, narrow_weekday, week_start, weekday_code};
use crate::models::{
    DayView, ForecastPoint, FoodHistory, GraphPoint, WeekDay, WeekSummary, WeightLog,
};
use crate::score::{total_calories, total_protein};
use crate::store::Snapshot;
use chrono::{Datelike, Duration, NaiveDate};

const GRAPH_DAYS: i64 = 7;
const FORECAST_PAST_POINTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphMetric {
    Calories,
    Weight,
}

impl GraphMetric {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::trim) {
            None | Some("") => Some(Self::Calories),
            Some(value) if value.eq_ignore_ascii_case("calories") => Some(Self::Calories),
            Some(value) if value.eq_ignore_ascii_case("weight") => Some(Self::Weight),
            Some(_) => None,
        }
    }
}

/// Last seven days ending today, oldest first. Days without data read as 0.
pub fn graph(metric: GraphMetric, today: NaiveDate, snapshot: &Snapshot) -> Vec<GraphPoint> {
    match metric {
        GraphMetric::Calories => calorie_graph(today, &snapshot.food_history),
        GraphMetric::Weight => weight_graph(today, &snapshot.weights),
    }
}

pub fn calorie_graph(today: NaiveDate, history: &FoodHistory) -> Vec<GraphPoint> {
    last_days(today, |key| {
        history
            .get(key)
            .map(|foods| total_calories(foods))
            .unwrap_or_default()
    })
}

pub fn weight_graph(today: NaiveDate, weights: &[WeightLog]) -> Vec<GraphPoint> {
    last_days(today, |key| {
        weights
            .iter()
            .find(|log| log.date == key)
            .map(|log| log.weight)
            .unwrap_or_default()
    })
}

fn last_days(today: NaiveDate, value_of: impl Fn(&str) -> f64) -> Vec<GraphPoint> {
    (0..GRAPH_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let key = date_key(date);
            GraphPoint {
                value: value_of(&key),
                day: narrow_weekday(date),
                date: key,
            }
        })
        .collect()
}

/// The Monday-start week containing `day`. Averages use only elapsed days.
pub fn week_summary(day: NaiveDate, today: NaiveDate, history: &FoodHistory, goal: f64) -> WeekSummary {
    let start = week_start(day);
    let end = start + Duration::days(6);

    let days: Vec<WeekDay> = (0..7)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let calories = history
                .get(&date_key(date))
                .map(|foods| total_calories(foods))
                .unwrap_or_default();
            WeekDay {
                date: date_key(date),
                day: weekday_code(date),
                calories,
                over_goal: goal > 0.0 && calories > goal,
                is_future: date > today,
            }
        })
        .collect();

    let total_calories: f64 = days.iter().map(|d| d.calories).sum();
    let days_counted = if today < start {
        0
    } else if today > end {
        7
    } else {
        (today - start).num_days() as u8 + 1
    };
    let denom = if days_counted == 0 { 1.0 } else { f64::from(days_counted) };

    WeekSummary {
        week: week_label(start),
        start_date: date_key(start),
        end_date: date_key(end),
        days,
        total_calories,
        days_counted,
        avg_calories: total_calories / denom,
    }
}

pub fn day_view(day: NaiveDate, today: NaiveDate, snapshot: &Snapshot) -> DayView {
    let key = date_key(day);
    let foods = snapshot.foods_on(&key).to_vec();
    DayView {
        is_today: day == today,
        total_calories: total_calories(&foods),
        total_protein: total_protein(&foods),
        workouts: snapshot.workouts_on(&key).to_vec(),
        weight: snapshot
            .weights
            .iter()
            .find(|log| log.date == key)
            .map(|log| log.weight),
        previous: date_key(day - Duration::days(1)),
        next: date_key(day + Duration::days(1)),
        foods,
        date: key,
    }
}

pub fn latest_weight(weights: &[WeightLog]) -> Option<f64> {
    weights.last().map(|log| log.weight)
}

/// Recent logs sent as forecast context, oldest first.
pub fn recent_weights(weights: &[WeightLog], count: usize) -> &[WeightLog] {
    &weights[weights.len().saturating_sub(count)..]
}

/// Joins the last few real weigh-ins with predicted points.
pub fn forecast_series(history: &[WeightLog], predictions: Vec<ForecastPoint>) -> Vec<ForecastPoint> {
    recent_weights(history, FORECAST_PAST_POINTS)
        .iter()
        .map(|log| ForecastPoint {
            date: log.date.clone(),
            weight: log.weight,
            is_predicted: false,
        })
        .chain(predictions.into_iter().map(|point| ForecastPoint {
            is_predicted: true,
            ..point
        }))
        .collect()
}

fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Food;

    fn food(calories: f64) -> Food {
        Food {
            id: "f".into(),
            name: "Meal".into(),
            calories,
            protein: 10.0,
            carbs: None,
            fats: None,
            fiber: None,
            meal_type: None,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn calorie_graph_includes_each_day() {
        let mut history = FoodHistory::new();
        history.insert("2026-03-08".into(), vec![food(300.0), food(450.0)]);

        let points = calorie_graph(day(10), &history);
        assert_eq!(points.len(), 7);
        assert_eq!(points[0].date, "2026-03-04");
        assert_eq!(points[6].date, "2026-03-10");
        assert_eq!(points[4].value, 750.0);
        assert_eq!(points[6].day, "T");
    }

    #[test]
    fn weight_graph_uses_zero_for_missing_days() {
        let weights = vec![WeightLog { date: "2026-03-09".into(), weight: 70.2 }];
        let points = weight_graph(day(10), &weights);
        assert_eq!(points[5].value, 70.2);
        assert_eq!(points[6].value, 0.0);
    }

    #[test]
    fn week_summary_averages_elapsed_days() {
        let mut history = FoodHistory::new();
        history.insert("2026-03-09".into(), vec![food(1500.0)]);
        history.insert("2026-03-10".into(), vec![food(900.0)]);

        let week = week_summary(day(10), day(10), &history, 1300.0);
        assert_eq!(week.start_date, "2026-03-09");
        assert_eq!(week.end_date, "2026-03-15");
        assert_eq!(week.days_counted, 2);
        assert_eq!(week.total_calories, 2400.0);
        assert_eq!(week.avg_calories, 1200.0);
        assert!(week.days[0].over_goal);
        assert!(!week.days[1].over_goal);
        assert!(week.days[2].is_future);
        assert_eq!(week.week, "2026-W11");
    }

    #[test]
    fn day_view_links_neighbours() {
        let mut snapshot = Snapshot::default();
        snapshot.food_history.insert("2026-03-01".into(), vec![food(400.0)]);
        snapshot.weights.push(WeightLog { date: "2026-03-01".into(), weight: 71.0 });

        let view = day_view(day(1), day(10), &snapshot);
        assert!(!view.is_today);
        assert_eq!(view.previous, "2026-02-28");
        assert_eq!(view.next, "2026-03-02");
        assert_eq!(view.total_calories, 400.0);
        assert_eq!(view.weight, Some(71.0));
    }

    #[test]
    fn forecast_series_keeps_last_five_real_points() {
        let history: Vec<WeightLog> = (1..=8)
            .map(|d| WeightLog { date: date_key(day(d)), weight: 70.0 - f64::from(d) * 0.1 })
            .collect();
        let predictions = vec![ForecastPoint {
            date: "2026-03-15".into(),
            weight: 68.9,
            is_predicted: false,
        }];

        let series = forecast_series(&history, predictions);
        assert_eq!(series.len(), 6);
        assert_eq!(series[0].date, "2026-03-04");
        assert!(!series[4].is_predicted);
        assert!(series[5].is_predicted);
        assert_eq!(latest_weight(&history), Some(70.0 - 0.8));
    }

    #[test]
    fn graph_metric_parsing() {
        assert_eq!(GraphMetric::parse(None), Some(GraphMetric::Calories));
        assert_eq!(GraphMetric::parse(Some("WEIGHT")), Some(GraphMetric::Weight));
        assert_eq!(GraphMetric::parse(Some("mood")), None);
    }
}
