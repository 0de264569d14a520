// Unit tests for meal windows and clocks

use chrono::{Duration, FixedOffset, TimeZone, Utc};
use go_eats::core::meal::{self, Clock, FixedClock, MealWindow, Remaining, MEAL_SCHEDULE};
use go_eats::core::models::MealType;

#[test]
fn test_current_meal_for_every_hour() {
    let expected = |hour: u32| match hour {
        0..=4 => MealType::CafeNoturno,
        5..=7 => MealType::CafeTarde,
        8 => MealType::Jantar,
        9..=22 => MealType::Ceia,
        _ => MealType::CafeNoturno,
    };

    for hour in 0..24 {
        assert_eq!(meal::current_meal(hour), Some(expected(hour)), "hour {}", hour);
    }
}

#[test]
fn test_closed_all_day_meals() {
    for hour in 0..24 {
        assert!(!meal::is_open(MealType::Desjejum, hour));
        assert!(!meal::is_open(MealType::Almoco, hour));
    }
}

#[test]
fn test_schedule_covers_every_meal_once() {
    for meal_type in MealType::ALL {
        let count = MEAL_SCHEDULE.iter().filter(|(m, _)| *m == meal_type).count();
        assert_eq!(count, 1, "{} listed {} times", meal_type, count);
    }
}

#[test]
fn test_bebidas_wraps_into_afternoon() {
    assert!(meal::is_open(MealType::Bebidas, 19));
    assert!(meal::is_open(MealType::Bebidas, 0));
    assert!(meal::is_open(MealType::Bebidas, 13));
    assert!(!meal::is_open(MealType::Bebidas, 14));
    assert!(!meal::is_open(MealType::Bebidas, 18));
}

#[test]
fn test_remaining_until_boundary() {
    assert_eq!(
        meal::remaining(MealType::CafeTarde, 6, 30),
        Some(Remaining { hours: 1, minutes: 30 })
    );
    assert_eq!(
        meal::remaining(MealType::CafeNoturno, 23, 30),
        Some(Remaining { hours: 5, minutes: 30 })
    );
    assert_eq!(
        meal::remaining(MealType::Ceia, 22, 59),
        Some(Remaining { hours: 0, minutes: 1 })
    );
    assert_eq!(
        meal::remaining(MealType::Bebidas, 19, 0),
        Some(Remaining { hours: 19, minutes: 0 })
    );
}

#[test]
fn test_remaining_for_closed_meal_is_none() {
    assert_eq!(meal::remaining(MealType::Jantar, 15, 0), None);
    assert_eq!(meal::remaining(MealType::Desjejum, 0, 0), None);
}

#[test]
fn test_remaining_serializes_as_text() {
    let json = serde_json::to_value(Remaining { hours: 9, minutes: 0 }).unwrap();
    assert_eq!(json, "9h 0m");
}

#[test]
fn test_minutes_until_close_at_window_start() {
    let window = MealWindow::new(5, 9);
    assert_eq!(window.minutes_until_close(5, 0), Some(240));
    assert_eq!(window.minutes_until_close(9, 0), None);
}

#[test]
fn test_fixed_clock_applies_offset() {
    let brt = FixedOffset::west_opt(3 * 3600).unwrap();
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 10, 2, 15, 0).unwrap(), brt);

    assert_eq!(clock.local_hour_minute(), (23, 15));
    assert_eq!(meal::current_meal(clock.local_hour_minute().0), Some(MealType::CafeNoturno));
}

#[test]
fn test_fixed_clock_set_and_advance() {
    let start = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
    let clock = FixedClock::new(start, FixedOffset::east_opt(0).unwrap());

    clock.advance(Duration::minutes(90));
    assert_eq!(clock.now_utc(), start + Duration::minutes(90));
    assert_eq!(clock.local_hour_minute(), (13, 30));

    clock.set(start);
    assert_eq!(clock.now_utc(), start);
}
