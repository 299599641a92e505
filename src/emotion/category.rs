// Emotion categories
//
// Closed set of six categories. Ids are stable and define the tie-break
// order used by the classifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionCategory {
    Happy,
    Sad,
    Angry,
    Neutral,
    Frustrated,
    Surprised,
}

impl EmotionCategory {
    /// All categories in ascending id order
    pub const ALL: [EmotionCategory; 6] = [
        EmotionCategory::Happy,
        EmotionCategory::Sad,
        EmotionCategory::Angry,
        EmotionCategory::Neutral,
        EmotionCategory::Frustrated,
        EmotionCategory::Surprised,
    ];

    /// Stable numeric identifier
    pub fn id(&self) -> u8 {
        match self {
            EmotionCategory::Happy => 0,
            EmotionCategory::Sad => 1,
            EmotionCategory::Angry => 2,
            EmotionCategory::Neutral => 3,
            EmotionCategory::Frustrated => 4,
            EmotionCategory::Surprised => 5,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    /// Human-readable label ("Happy", "Sad", ...)
    pub fn label(&self) -> &'static str {
        match self {
            EmotionCategory::Happy => "Happy",
            EmotionCategory::Sad => "Sad",
            EmotionCategory::Angry => "Angry",
            EmotionCategory::Neutral => "Neutral",
            EmotionCategory::Frustrated => "Frustrated",
            EmotionCategory::Surprised => "Surprised",
        }
    }

    /// Lower-cased label, as interpolated into prompts and fallback text
    pub fn label_lower(&self) -> String {
        self.label().to_lowercase()
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            EmotionCategory::Happy => "😊",
            EmotionCategory::Sad => "😢",
            EmotionCategory::Angry => "😠",
            EmotionCategory::Neutral => "😐",
            EmotionCategory::Frustrated => "😤",
            EmotionCategory::Surprised => "😲",
        }
    }

    /// Badge label with emoji prefix ("😊 Happy")
    pub fn display_label(&self) -> String {
        format!("{} {}", self.emoji(), self.label())
    }

    /// Display color as a hex string
    pub fn color(&self) -> &'static str {
        match self {
            EmotionCategory::Happy => "#FFD700",      // Gold
            EmotionCategory::Sad => "#87CEEB",        // Sky blue
            EmotionCategory::Angry => "#FF6B6B",      // Red
            EmotionCategory::Neutral => "#D3D3D3",    // Light gray
            EmotionCategory::Frustrated => "#FF8C00", // Orange
            EmotionCategory::Surprised => "#9370DB",  // Purple
        }
    }

    /// Display color as RGB components
    pub fn rgb(&self) -> (u8, u8, u8) {
        let hex = &self.color()[1..];
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0xD3);
        (channel(0), channel(2), channel(4))
    }
}

impl fmt::Display for EmotionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EmotionCategory {
    type Err = String;

    /// Accepts a label (case-insensitive) or a numeric id
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<u8>() {
            return Self::from_id(id).ok_or_else(|| format!("Unknown emotion id: {}", id));
        }
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown emotion: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_ascending_in_all() {
        let ids: Vec<u8> = EmotionCategory::ALL.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_ord_follows_id() {
        assert!(EmotionCategory::Angry < EmotionCategory::Frustrated);
        assert!(EmotionCategory::Happy < EmotionCategory::Surprised);
    }

    #[test]
    fn test_from_id_round_trip() {
        for category in EmotionCategory::ALL {
            assert_eq!(EmotionCategory::from_id(category.id()), Some(category));
        }
        assert_eq!(EmotionCategory::from_id(6), None);
    }

    #[test]
    fn test_parse_label_and_id() {
        assert_eq!("frustrated".parse::<EmotionCategory>(), Ok(EmotionCategory::Frustrated));
        assert_eq!("SAD".parse::<EmotionCategory>(), Ok(EmotionCategory::Sad));
        assert_eq!("5".parse::<EmotionCategory>(), Ok(EmotionCategory::Surprised));
        assert!("bored".parse::<EmotionCategory>().is_err());
    }

    #[test]
    fn test_rgb_matches_hex() {
        assert_eq!(EmotionCategory::Happy.rgb(), (0xFF, 0xD7, 0x00));
        assert_eq!(EmotionCategory::Surprised.rgb(), (0x93, 0x70, 0xDB));
    }

    #[test]
    fn test_display_label() {
        assert_eq!(EmotionCategory::Neutral.display_label(), "😐 Neutral");
        assert_eq!(EmotionCategory::Angry.label_lower(), "angry");
    }
}
