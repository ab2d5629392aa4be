use plotters::style::RGBColor;

/// The policy scenarios the paper reports on, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scenario {
    Baseline,
    NoMigration,
    HighInflowShare,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [
        Scenario::Baseline,
        Scenario::NoMigration,
        Scenario::HighInflowShare,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Scenario::Baseline => "baseline_30y",
            Scenario::NoMigration => "no_migration_30y",
            Scenario::HighInflowShare => "high_inflow_share_30y",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Scenario::Baseline => "Baseline calibrated",
            Scenario::NoMigration => "No migration counterfactual",
            Scenario::HighInflowShare => "High Muslim inflow share (70%)",
        }
    }

    pub fn color(self) -> RGBColor {
        match self {
            Scenario::Baseline => RGBColor(0x1f, 0x77, 0xb4),
            Scenario::NoMigration => RGBColor(0x44, 0x44, 0x44),
            Scenario::HighInflowShare => RGBColor(0xd6, 0x27, 0x28),
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

/// Display label for a raw scenario key; unknown keys label themselves.
pub fn label_for_key(key: &str) -> String {
    Scenario::from_key(key)
        .map(|s| s.label().to_string())
        .unwrap_or_else(|| key.to_string())
}
