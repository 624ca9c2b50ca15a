use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;

/// Chance that a forgetful scheduler botches a multi-step plan.
pub const FORGETFUL_ERROR_RATE: f64 = 0.4;

/// How a simulated scheduler books the steps of a care plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Personality {
    /// Honours each plan's minimum gap and books as early as allowed.
    Diligent,
    /// Leaves a few spare days between steps but keeps them in order.
    Hasty,
    /// Like hasty, but sometimes collapses or reverses the steps.
    Forgetful,
}

impl Personality {
    pub const ALL: [Personality; 3] = [
        Personality::Diligent,
        Personality::Hasty,
        Personality::Forgetful,
    ];

    pub fn scheduler_id(&self) -> &'static str {
        match self {
            Personality::Diligent => "scheduler_A_diligent",
            Personality::Hasty => "scheduler_B_hasty",
            Personality::Forgetful => "scheduler_C_forgetful",
        }
    }

    /// Picks one personality from `pool`, or from all of them if it is empty.
    pub fn choose<R: Rng + ?Sized>(rng: &mut R, pool: &[Personality]) -> Personality {
        let pool = if pool.is_empty() { &Self::ALL[..] } else { pool };
        *pool.choose(rng).unwrap_or(&Personality::Diligent)
    }
}

impl FromStr for Personality {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "diligent" | "scheduler_a_diligent" => Ok(Personality::Diligent),
            "hasty" | "scheduler_b_hasty" => Ok(Personality::Hasty),
            "forgetful" | "scheduler_c_forgetful" => Ok(Personality::Forgetful),
            _ => Err(format!(
                "Invalid personality: '{}'. Must be one of: diligent, hasty, forgetful",
                value
            )),
        }
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheduler_id())
    }
}
