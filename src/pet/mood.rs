//! Discrete mood and hearts derived from the stat vector

use serde::{Deserialize, Serialize};

use super::stats::StatVector;

/// Presentation state derived from stats, checked in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Sick,
    Sleeping,
    Angry,
    Tired,
    Happy,
    #[default]
    Normal,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Sick => "sick",
            Mood::Sleeping => "sleeping",
            Mood::Angry => "angry",
            Mood::Tired => "tired",
            Mood::Happy => "happy",
            Mood::Normal => "normal",
        }
    }
}

pub fn mood(stats: &StatVector) -> Mood {
    if stats.health < 30.0 {
        return Mood::Sick;
    }
    if stats.energy < 20.0 {
        return Mood::Sleeping;
    }
    if stats.hunger < 20.0 || stats.happiness < 20.0 || stats.cleanliness < 20.0 {
        return Mood::Angry;
    }
    if stats.energy < 40.0 {
        return Mood::Tired;
    }
    if stats.average_needs() > 70.0 && stats.health > 80.0 {
        return Mood::Happy;
    }
    Mood::Normal
}

/// Number of hearts to show (0-3).
///
/// Blends health with the average of the four needs so a healthy but
/// neglected pet still loses hearts.
pub fn health_level(stats: &StatVector) -> u8 {
    let overall = (stats.health + stats.average_needs()) / 2.0;
    if overall >= 80.0 {
        3
    } else if overall >= 50.0 {
        2
    } else if overall >= 25.0 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_overrides_everything() {
        let stats = StatVector::new(90.0, 90.0, 90.0, 90.0, 20.0);
        assert_eq!(mood(&stats), Mood::Sick);
    }

    #[test]
    fn test_low_energy_sleeps() {
        let stats = StatVector::new(90.0, 90.0, 10.0, 90.0, 90.0);
        assert_eq!(mood(&stats), Mood::Sleeping);
    }

    #[test]
    fn test_priority_chain() {
        assert_eq!(mood(&StatVector::new(10.0, 90.0, 90.0, 90.0, 90.0)), Mood::Angry);
        assert_eq!(mood(&StatVector::new(90.0, 90.0, 10.0, 10.0, 90.0)), Mood::Sleeping);
        assert_eq!(mood(&StatVector::new(90.0, 90.0, 30.0, 90.0, 90.0)), Mood::Tired);
        assert_eq!(mood(&StatVector::new(80.0, 80.0, 80.0, 80.0, 100.0)), Mood::Happy);
        // Happy needs health strictly above 80
        assert_eq!(mood(&StatVector::new(80.0, 80.0, 80.0, 80.0, 80.0)), Mood::Normal);
        assert_eq!(mood(&StatVector::new(50.0, 50.0, 50.0, 50.0, 50.0)), Mood::Normal);
    }

    #[test]
    fn test_health_level_thresholds() {
        assert_eq!(health_level(&StatVector::default()), 3);
        assert_eq!(health_level(&StatVector::new(50.0, 50.0, 50.0, 50.0, 50.0)), 2);
        assert_eq!(health_level(&StatVector::new(25.0, 25.0, 25.0, 25.0, 25.0)), 1);
        assert_eq!(health_level(&StatVector::new(0.0, 0.0, 0.0, 0.0, 49.0)), 0);
    }
}
