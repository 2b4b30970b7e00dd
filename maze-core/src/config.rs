use thiserror::Error;

/// Base parameters for the simulation, in physical terms.
///
/// All derived thresholds in [`Config`] are computed from these once
/// at construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Params {
    /// Brownian force weight (B).
    pub brownian: f64,
    /// Smoothing force weight (F).
    pub smoothing: f64,
    /// Repulsion force weight (A).
    pub repulsion: f64,
    /// Near radius multiplier: R0 = k0 · D.
    pub k0: f64,
    /// Far radius multiplier: R1 = k1 · D.
    pub k1: f64,
    /// Minimum spacing multiplier: dmin = kmin · D.
    pub k_min: f64,
    /// Maximum spacing multiplier: dmax = kmax · D.
    pub k_max: f64,
    /// Characteristic spacing (D).
    pub spacing: f64,
    /// Velocity clamp factor; the clamp magnitude is `max_speed · repulsion`.
    pub max_speed: f64,
    /// Proximity contact count above which a point freezes.
    pub freeze_limit: u32,
    /// Exclude resample pairs whose endpoints are both frozen.
    pub skip_frozen_pairs: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            brownian: 0.05,
            smoothing: 0.15,
            repulsion: 0.006,
            k0: 1.0,
            k1: 5.0,
            k_min: 0.2,
            k_max: 0.6,
            spacing: 1.0,
            max_speed: 20.0,
            freeze_limit: 300,
            skip_frozen_pairs: false,
        }
    }
}

/// Rejected base parameters.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("density bounds inverted: k_min {k_min} must be less than k_max {k_max}")]
    DensityBounds { k_min: f64, k_max: f64 },
    #[error("repulsion radii inverted: k0 {k0} must be less than k1 {k1}")]
    RadiusBounds { k0: f64, k1: f64 },
    #[error("characteristic spacing must be positive and finite, got {0}")]
    Spacing(f64),
    #[error("parameter {name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },
}

/// Immutable simulation constants, base weights plus thresholds
/// derived once at construction.
///
/// The squared radii and squared clamp are cached so the per-segment
/// repulsion check never takes a square root on the reject path.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub brownian: f64,
    pub smoothing: f64,
    pub repulsion: f64,
    pub freeze_limit: u32,
    pub skip_frozen_pairs: bool,

    /// Near repulsion radius, k0 · D.
    pub r0: f64,
    /// Far repulsion radius, k1 · D.
    pub r1: f64,
    pub r0_sq: f64,
    pub r1_sq: f64,
    /// Minimum adjacent spacing, kmin · D.
    pub d_min: f64,
    /// Maximum adjacent spacing, kmax · D.
    pub d_max: f64,
    /// Per-step displacement clamp magnitude.
    pub max_step: f64,
    pub max_step_sq: f64,
}

impl Config {
    /// Validates `params` and derives the cached thresholds.
    ///
    /// Rejects inverted density bounds (`k_min >= k_max`), inverted
    /// repulsion radii (`k0 >= k1`), non-positive spacing, and
    /// non-finite force weights, since an inconsistent configuration
    /// produces meaningless simulation behavior and a NaN weight
    /// silently corrupts every position it touches.
    pub fn new(params: Params) -> Result<Self, ConfigError> {
        if !(params.k_min < params.k_max) {
            return Err(ConfigError::DensityBounds {
                k_min: params.k_min,
                k_max: params.k_max,
            });
        }
        if !(params.k0 < params.k1) {
            return Err(ConfigError::RadiusBounds {
                k0: params.k0,
                k1: params.k1,
            });
        }
        if !(params.spacing > 0.0 && params.spacing.is_finite()) {
            return Err(ConfigError::Spacing(params.spacing));
        }
        let weights = [
            ("brownian", params.brownian),
            ("smoothing", params.smoothing),
            ("repulsion", params.repulsion),
            ("max_speed", params.max_speed),
        ];
        for (name, value) in weights {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
        }

        Ok(Self::derive(&params))
    }

    fn derive(p: &Params) -> Self {
        let r0 = p.k0 * p.spacing;
        let r1 = p.k1 * p.spacing;
        let max_step = p.max_speed * p.repulsion;

        Self {
            brownian: p.brownian,
            smoothing: p.smoothing,
            repulsion: p.repulsion,
            freeze_limit: p.freeze_limit,
            skip_frozen_pairs: p.skip_frozen_pairs,
            r0,
            r1,
            r0_sq: r0 * r0,
            r1_sq: r1 * r1,
            d_min: p.k_min * p.spacing,
            d_max: p.k_max * p.spacing,
            max_step,
            max_step_sq: max_step * max_step,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        // The defaults are known-consistent, so skip validation.
        Self::derive(&Params::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_derives_expected_thresholds() {
        let cfg = Config::default();

        assert_eq!(cfg.r0, 1.0);
        assert_eq!(cfg.r1, 5.0);
        assert_eq!(cfg.r0_sq, 1.0);
        assert_eq!(cfg.r1_sq, 25.0);
        assert_eq!(cfg.d_min, 0.2);
        assert_eq!(cfg.d_max, 0.6);
        assert!((cfg.max_step - 0.12).abs() < 1e-12);
        assert!((cfg.max_step_sq - 0.0144).abs() < 1e-12);
        assert_eq!(cfg.freeze_limit, 300);
    }

    #[test]
    fn spacing_scales_all_derived_values() {
        let cfg = Config::new(Params {
            spacing: 2.0,
            ..Params::default()
        })
        .unwrap();

        assert_eq!(cfg.r0, 2.0);
        assert_eq!(cfg.r1, 10.0);
        assert_eq!(cfg.d_min, 0.4);
        assert!((cfg.d_max - 1.2).abs() < 1e-12);
    }

    #[test]
    fn rejects_inverted_density_bounds() {
        let err = Config::new(Params {
            k_min: 0.6,
            k_max: 0.2,
            ..Params::default()
        })
        .unwrap_err();

        assert!(matches!(err, ConfigError::DensityBounds { .. }));
    }

    #[test]
    fn rejects_equal_radii() {
        let err = Config::new(Params {
            k0: 3.0,
            k1: 3.0,
            ..Params::default()
        })
        .unwrap_err();

        assert!(matches!(err, ConfigError::RadiusBounds { .. }));
    }

    #[test]
    fn rejects_bad_spacing() {
        for spacing in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = Config::new(Params {
                spacing,
                ..Params::default()
            })
            .unwrap_err();
            assert!(matches!(err, ConfigError::Spacing(_)));
        }
    }

    #[test]
    fn rejects_non_finite_weights() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = Config::new(Params {
                brownian: bad,
                ..Params::default()
            })
            .unwrap_err();
            assert!(matches!(err, ConfigError::NonFinite { name: "brownian", .. }));
        }

        let err = Config::new(Params {
            max_speed: f64::INFINITY,
            ..Params::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::NonFinite { name: "max_speed", .. }));

        let err = Config::new(Params {
            smoothing: f64::NAN,
            ..Params::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::NonFinite { name: "smoothing", .. }));

        let err = Config::new(Params {
            repulsion: f64::NAN,
            ..Params::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::NonFinite { name: "repulsion", .. }));
    }

    #[test]
    fn default_params_pass_validation() {
        assert!(Config::new(Params::default()).is_ok());
    }
}
