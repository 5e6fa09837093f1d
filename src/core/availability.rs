use crate::domain::model::OperatingWindow;
use chrono::NaiveTime;

/// Open strictly between `opens_at` and `closes_at`; closed on both
/// boundaries. Windows that cross midnight are never open.
pub fn is_open(now: NaiveTime, window: &OperatingWindow) -> bool {
    now > window.opens_at && now < window.closes_at
}

/// Peak windows are inclusive on both ends, unlike opening hours.
pub fn is_peak_hour(now: NaiveTime, peak_windows: &[OperatingWindow]) -> bool {
    peak_windows
        .iter()
        .any(|w| now >= w.opens_at && now <= w.closes_at)
}

/// Picks the serving radius for a request: tighter during peak hours.
#[derive(Debug, Clone, PartialEq)]
pub struct ServingRadiusPolicy {
    pub normal_radius_km: f64,
    pub peak_radius_km: f64,
    pub peak_windows: Vec<OperatingWindow>,
}

impl ServingRadiusPolicy {
    pub fn radius_at(&self, now: NaiveTime) -> f64 {
        if is_peak_hour(now, &self.peak_windows) {
            self.peak_radius_km
        } else {
            self.normal_radius_km
        }
    }
}

impl Default for ServingRadiusPolicy {
    fn default() -> Self {
        let window = |opens: u32, closes: u32| {
            OperatingWindow::new(
                NaiveTime::from_hms_opt(opens, 0, 0).unwrap_or(NaiveTime::MIN),
                NaiveTime::from_hms_opt(closes, 0, 0).unwrap_or(NaiveTime::MIN),
            )
        };
        Self {
            normal_radius_km: 5.0,
            peak_radius_km: 3.0,
            peak_windows: vec![window(8, 10), window(13, 14), window(19, 21)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::parse_wall_clock;

    fn at(s: &str) -> NaiveTime {
        parse_wall_clock("now", s).unwrap()
    }

    fn window(opens: &str, closes: &str) -> OperatingWindow {
        OperatingWindow::parse(opens, closes).unwrap()
    }

    #[test]
    fn test_open_inside_window() {
        let w = window("09:00", "22:00");
        assert!(is_open(at("14:00"), &w));
        assert!(is_open(at("09:00:01"), &w));
        assert!(is_open(at("21:59:59"), &w));
    }

    #[test]
    fn test_closed_on_boundaries() {
        let w = window("09:00", "22:00");
        assert!(!is_open(at("09:00"), &w));
        assert!(!is_open(at("22:00"), &w));
    }

    #[test]
    fn test_closed_outside_window() {
        let w = window("09:00", "22:00");
        assert!(!is_open(at("08:59"), &w));
        assert!(!is_open(at("23:00"), &w));
    }

    #[test]
    fn test_midnight_window_is_never_open() {
        let w = window("22:00", "02:00");
        assert!(!is_open(at("23:30"), &w));
        assert!(!is_open(at("01:00"), &w));
        assert!(!is_open(at("12:00"), &w));
    }

    #[test]
    fn test_peak_hours_inclusive() {
        let peaks = vec![window("08:00", "10:00"), window("19:00", "21:00")];
        assert!(is_peak_hour(at("08:00"), &peaks));
        assert!(is_peak_hour(at("21:00"), &peaks));
        assert!(is_peak_hour(at("20:15"), &peaks));
        assert!(!is_peak_hour(at("14:00"), &peaks));
        assert!(!is_peak_hour(at("10:00:01"), &peaks));
    }

    #[test]
    fn test_default_radius_policy() {
        let policy = ServingRadiusPolicy::default();
        assert_eq!(policy.radius_at(at("09:15")), 3.0);
        assert_eq!(policy.radius_at(at("13:30")), 3.0);
        assert_eq!(policy.radius_at(at("20:59")), 3.0);
        assert_eq!(policy.radius_at(at("16:00")), 5.0);
        assert_eq!(policy.radius_at(at("23:00")), 5.0);
    }
}
