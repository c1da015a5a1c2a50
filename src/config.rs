use crate::error::{Error, Result};
use crate::sketcher::PointF;

/// Settings threaded through every placement step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    /// Target length of every drawn bond.
    pub bond_length: f32,
    /// Direction of the first seed bond (ring) or chain axis.
    pub initial_direction: PointF,
    /// Two non-bonded atoms closer than `clash_distance * bond_length` clash.
    pub clash_distance: f32,
    /// Upper bound on overlap resolution passes.
    pub max_overlap_passes: usize,
    /// Upper bound on the transient path edges kept during ring perception.
    pub max_path_edges: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            bond_length: 50.0,
            initial_direction: PointF(0.0, 1.0),
            clash_distance: 0.5,
            max_overlap_passes: 10,
            max_path_edges: 100_000,
        }
    }
}

impl LayoutConfig {
    pub fn with_bond_length(mut self, bond_length: f32) -> Self {
        self.bond_length = bond_length;
        self
    }

    pub fn with_initial_direction(mut self, direction: PointF) -> Self {
        self.initial_direction = direction;
        self
    }

    /// Check the values that would otherwise poison the geometry with NaNs.
    pub fn validate(&self) -> Result<()> {
        if !self.bond_length.is_finite() || self.bond_length <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "bond length must be positive and finite, got {}",
                self.bond_length
            )));
        }
        let PointF(x, y) = self.initial_direction;
        if !x.is_finite() || !y.is_finite() || self.initial_direction.length() == 0.0 {
            return Err(Error::InvalidConfig(
                "initial direction must be a finite non-zero vector".into(),
            ));
        }
        if !self.clash_distance.is_finite() || self.clash_distance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "clash distance must be non-negative, got {}",
                self.clash_distance
            )));
        }
        Ok(())
    }

    /// Unit vector along `initial_direction`.
    pub(crate) fn seed_direction(&self) -> PointF {
        let mut d = self.initial_direction;
        d.normalize();
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let cfg = LayoutConfig::default().with_bond_length(0.0);
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
        let cfg = LayoutConfig::default().with_bond_length(f32::NAN);
        assert!(cfg.validate().is_err());
        let cfg = LayoutConfig::default().with_initial_direction(PointF(0.0, 0.0));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn seed_direction_is_unit() {
        let cfg = LayoutConfig::default().with_initial_direction(PointF(3.0, 4.0));
        let d = cfg.seed_direction();
        assert!((d.length() - 1.0).abs() < 1e-6);
    }
}
