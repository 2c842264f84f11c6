use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the two buckets for today's tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Important,
    Extra,
}

impl Section {
    pub const ALL: [Section; 2] = [Section::Important, Section::Extra];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Important => "important",
            Section::Extra => "extra",
        }
    }

    /// Section heading for human-readable output
    pub fn title(self) -> &'static str {
        match self {
            Section::Important => "Important",
            Section::Extra => "Extra",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "important" => Ok(Section::Important),
            "extra" => Ok(Section::Extra),
            _ => Err(format!(
                "unknown section '{}' (expected: important, extra)",
                s
            )),
        }
    }
}

/// Where a dropped task was picked up from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DropOrigin {
    /// An unscheduled pool under some category
    CategoryList,
    /// Already on today's board, in either section
    TodayList,
}

impl fmt::Display for DropOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropOrigin::CategoryList => f.write_str("category-list"),
            DropOrigin::TodayList => f.write_str("today-list"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        for section in Section::ALL {
            assert_eq!(section.to_string().parse::<Section>(), Ok(section));
        }
        assert!("urgent".parse::<Section>().is_err());
    }

    #[test]
    fn origin_uses_kebab_case() {
        assert_eq!(
            serde_json::to_string(&DropOrigin::CategoryList).unwrap(),
            r#""category-list""#
        );
        assert_eq!(DropOrigin::TodayList.to_string(), "today-list");
    }
}
