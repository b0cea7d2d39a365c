use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Overall rank label for a scorecard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rank {
    Bluebelt,
    Premium,
    Advanced,
    Standard,
}

impl Rank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Bluebelt => "BLUEBELT",
            Rank::Premium => "PREMIUM",
            Rank::Advanced => "ADVANCED",
            Rank::Standard => "STANDARD",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rank {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BLUEBELT" => Ok(Rank::Bluebelt),
            "PREMIUM" => Ok(Rank::Premium),
            "ADVANCED" => Ok(Rank::Advanced),
            "STANDARD" => Ok(Rank::Standard),
            other => Err(anyhow::anyhow!("unknown rank '{}'", other)),
        }
    }
}

/// Converts an achieved-score total (absolute points, not a percentage) into a rank.
///
/// | Range               | Rank     |
/// |---------------------|----------|
/// | 900 ..= 1000        | BLUEBELT |
/// | 800 .. 900          | PREMIUM  |
/// | 700 .. 800          | ADVANCED |
/// | anything else       | STANDARD |
pub fn rank(score: f64) -> Rank {
    match score {
        s if (900.0..=1000.0).contains(&s) => Rank::Bluebelt,
        s if (800.0..900.0).contains(&s) => Rank::Premium,
        s if (700.0..800.0).contains(&s) => Rank::Advanced,
        _ => Rank::Standard,
    }
}
