//! Pipeline mode selection

/// Which stage list an update run executes.
///
/// Each mode resolves to a fixed, ordered list of stages at call time; the
/// entitlement-certificate stage runs last in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Full refresh: identity certificate, repositories, facts, software
    /// profile, installed products.
    Normal,
    /// Entitlement auto-attach only.
    Heal,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Normal => write!(f, "normal"),
            Mode::Heal => write!(f, "heal"),
        }
    }
}
