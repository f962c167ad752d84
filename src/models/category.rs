use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    Electrical,
    Technical,
    Mechanical,
    Plumbing,
}

impl ServiceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Electrical => "electrical",
            ServiceCategory::Technical => "technical",
            ServiceCategory::Mechanical => "mechanical",
            ServiceCategory::Plumbing => "plumbing",
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "electrical" => Ok(ServiceCategory::Electrical),
            "technical" => Ok(ServiceCategory::Technical),
            "mechanical" => Ok(ServiceCategory::Mechanical),
            "plumbing" => Ok(ServiceCategory::Plumbing),
            _ => Err(()),
        }
    }
}
