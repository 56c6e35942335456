use std::fmt;

use crate::units::FluxUnit;

/// Errors caused by physically invalid input.
///
/// A domain error invalidates every downstream bin, so it aborts a whole
/// curve build.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    NonPositiveEnergy {
        energy_tev: f64,
    },
    EmptyEnergyRange {
        e_min_tev: f64,
        e_max_tev: f64,
    },
    /// Index of -1 has a logarithmic antiderivative which is not supported
    UnsupportedSpectralIndex(f64),
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    UnitMismatch {
        expected: FluxUnit,
        found: FluxUnit,
    },
    InvalidColumn {
        column: &'static str,
        row: usize,
        value: f64,
    },
    ColumnLengthMismatch {
        column: &'static str,
        expected: usize,
        found: usize,
    },
    InvalidCounts {
        n_on: f64,
        n_off: f64,
    },
    InvalidBinCount(usize),
    /// Neither sample contains any event
    NoEvents,
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NonPositiveEnergy { energy_tev } => {
                write!(f, "energy must be positive and finite, got {energy_tev} TeV")
            }
            DomainError::EmptyEnergyRange {
                e_min_tev,
                e_max_tev,
            } => write!(
                f,
                "energy range [{e_min_tev}, {e_max_tev}] TeV is empty (e_min must be < e_max)"
            ),
            DomainError::UnsupportedSpectralIndex(index) => {
                write!(f, "spectral index {index} is not supported")
            }
            DomainError::InvalidParameter {
                name,
                value,
                reason,
            } => write!(f, "invalid {name} ({value}): {reason}"),
            DomainError::UnitMismatch { expected, found } => {
                write!(f, "unit mismatch: expected {expected}, found {found}")
            }
            DomainError::InvalidColumn { column, row, value } => {
                write!(f, "invalid value {value} in column '{column}' at row {row}")
            }
            DomainError::ColumnLengthMismatch {
                column,
                expected,
                found,
            } => write!(
                f,
                "column '{column}' has {found} rows, expected {expected}"
            ),
            DomainError::InvalidCounts { n_on, n_off } => {
                write!(f, "invalid on/off counts (n_on={n_on}, n_off={n_off})")
            }
            DomainError::InvalidBinCount(n) => write!(f, "invalid number of energy bins: {n}"),
            DomainError::NoEvents => write!(f, "no events in either sample"),
        }
    }
}

impl std::error::Error for DomainError {}

/// A cut point left too few events to estimate on/off counts
#[derive(Debug, Clone, PartialEq)]
pub enum InsufficientDataError {
    /// No background event survived the selection
    EmptyBackground,
    /// Neither sample has events in this energy bin
    EmptyBin,
    /// The theta² histogram for the off estimate has no bins
    NoOffRegionBins { angular_cut: f64 },
    /// Background survived, but none of it falls into the off region
    ZeroBackgroundRate,
    NonFiniteCounts { n_on: f64, n_off: f64 },
}

impl fmt::Display for InsufficientDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsufficientDataError::EmptyBackground => {
                write!(f, "no background events left after selection")
            }
            InsufficientDataError::EmptyBin => write!(f, "energy bin contains no events"),
            InsufficientDataError::NoOffRegionBins { angular_cut } => {
                write!(f, "angular cut {angular_cut} leaves no off-region histogram bins")
            }
            InsufficientDataError::ZeroBackgroundRate => {
                write!(f, "background rate in the off region is zero")
            }
            InsufficientDataError::NonFiniteCounts { n_on, n_off } => {
                write!(f, "non-finite counts (n_on={n_on}, n_off={n_off})")
            }
        }
    }
}

impl std::error::Error for InsufficientDataError {}

/// No grid point of a bin produced a finite flux
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizationFailure {
    /// Grid points evaluated
    pub evaluated: usize,
    /// Points rejected for insufficient data
    pub invalid: usize,
    /// Points with no signal excess
    pub undetectable: usize,
}

impl fmt::Display for OptimizationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no valid cut point among {} evaluated ({} invalid, {} without excess)",
            self.evaluated, self.invalid, self.undetectable
        )
    }
}

impl std::error::Error for OptimizationFailure {}

#[derive(Debug, Clone, PartialEq)]
pub enum SensitivityError {
    Domain(DomainError),
    InsufficientData(InsufficientDataError),
    Optimization(OptimizationFailure),
    /// Curve build was cancelled by request
    Cancelled,
    /// The worker pool could not be created
    WorkerPool(String),
}

impl SensitivityError {
    /// Whether this error must abort the whole run rather than a single bin
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SensitivityError::Domain(_) | SensitivityError::WorkerPool(_)
        )
    }
}

impl fmt::Display for SensitivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensitivityError::Domain(e) => write!(f, "{e}"),
            SensitivityError::InsufficientData(e) => write!(f, "{e}"),
            SensitivityError::Optimization(e) => write!(f, "{e}"),
            SensitivityError::Cancelled => write!(f, "curve build cancelled"),
            SensitivityError::WorkerPool(msg) => write!(f, "worker pool error: {msg}"),
        }
    }
}

impl std::error::Error for SensitivityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SensitivityError::Domain(e) => Some(e),
            SensitivityError::InsufficientData(e) => Some(e),
            SensitivityError::Optimization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DomainError> for SensitivityError {
    fn from(err: DomainError) -> Self {
        SensitivityError::Domain(err)
    }
}

impl From<InsufficientDataError> for SensitivityError {
    fn from(err: InsufficientDataError) -> Self {
        SensitivityError::InsufficientData(err)
    }
}

impl From<OptimizationFailure> for SensitivityError {
    fn from(err: OptimizationFailure) -> Self {
        SensitivityError::Optimization(err)
    }
}

pub type Result<T> = std::result::Result<T, SensitivityError>;
