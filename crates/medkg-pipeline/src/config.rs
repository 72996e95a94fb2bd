//! Run configuration for the two batch kinds.

use medkg_domain::validate::DEFAULT_WINDOW_DAYS;

/// Configuration for a patient-graph batch.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Corroboration window in days.
    pub window_days: i64,

    /// Also export the without-isolates and only-found views per patient.
    pub export_views: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            export_views: false,
        }
    }
}

/// Configuration for a cohort aggregation run.
#[derive(Debug, Clone)]
pub struct CohortConfig {
    /// Corroboration window in days.
    pub window_days: i64,

    /// Recurrence threshold percentage in [0, 100].
    pub threshold_pct: f64,

    /// Phenotype code seeding the cohort (opaque string parameter).
    pub phenotype_code: String,

    /// Number of patients to sample from the phenotype population.
    pub cohort_size: usize,

    /// Checkpoint the running tally every this many patients.
    pub checkpoint_every: usize,
}

/// Default recurrence threshold percentage.
pub const DEFAULT_THRESHOLD_PCT: f64 = 50.0;

/// Default phenotype code ("morbid obesity" in the source domain).
pub const DEFAULT_PHENOTYPE_CODE: &str = "278.11";

/// Default tally checkpoint cadence.
pub const DEFAULT_CHECKPOINT_EVERY: usize = 25;

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            threshold_pct: DEFAULT_THRESHOLD_PCT,
            phenotype_code: DEFAULT_PHENOTYPE_CODE.to_string(),
            cohort_size: 0,
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
        }
    }
}
