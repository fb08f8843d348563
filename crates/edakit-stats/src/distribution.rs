//! Chi-square distribution fitting for numeric samples.
//!
//! This is parameter estimation, not hypothesis testing: [`fit_chi_square`]
//! estimates the parameters of a (possibly shifted and scaled) chi-square law
//! from the values of a numeric column. [`ks_test`] then checks how well the
//! fitted law describes the sample.
//!
//! The law is parameterized as `X = loc + scale * Y` with `Y ~ χ²(df)`.

use rand::SeedableRng as _;
use rand_distr::Distribution as _;
use rand_pcg::Pcg32;
use serde::Serialize;
use statrs::{
    distribution::{ChiSquared, Continuous as _, ContinuousCDF as _},
    function::gamma::digamma,
};

use crate::StatsError;

/// Parameter estimation method for [`fit_chi_square`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum FitMethod {
    /// Three-parameter method of moments from mean, variance and skewness.
    #[default]
    #[display("moments")]
    Moments,
    /// Maximum likelihood for the standard form (`loc = 0`, `scale = 1`).
    #[display("max_likelihood")]
    MaxLikelihood,
}

/// A chi-square law with location and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChiSquareLaw {
    pub df: f64,
    pub loc: f64,
    pub scale: f64,
    #[serde(skip)]
    dist: ChiSquared,
}

impl ChiSquareLaw {
    /// Creates a law with `df` degrees of freedom, shifted by `loc` and
    /// stretched by `scale`.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::DegenerateInput`] unless `df` and `scale` are
    /// positive and finite and `loc` is finite.
    pub fn new(df: f64, loc: f64, scale: f64) -> Result<Self, StatsError> {
        if !(scale.is_finite() && scale > 0.0) || !loc.is_finite() {
            return Err(StatsError::degenerate(format!(
                "invalid location {loc} or scale {scale}"
            )));
        }
        let dist = ChiSquared::new(df).map_err(|err| StatsError::degenerate(err.to_string()))?;
        Ok(Self {
            df,
            loc,
            scale,
            dist,
        })
    }

    /// The standard chi-square law (`loc = 0`, `scale = 1`).
    pub fn standard(df: f64) -> Result<Self, StatsError> {
        Self::new(df, 0.0, 1.0)
    }

    fn standardize(&self, x: f64) -> f64 {
        (x - self.loc) / self.scale
    }

    #[must_use]
    pub fn cdf(&self, x: f64) -> f64 {
        let z = self.standardize(x);
        if z <= 0.0 { 0.0 } else { self.dist.cdf(z) }
    }

    /// Natural log of the density at `x`; negative infinity outside the
    /// support.
    #[must_use]
    pub fn ln_pdf(&self, x: f64) -> f64 {
        let z = self.standardize(x);
        if z <= 0.0 {
            return f64::NEG_INFINITY;
        }
        self.dist.ln_pdf(z) - self.scale.ln()
    }

    /// Draws `n` variates. The same `seed` always yields the same values.
    ///
    /// ```
    /// # use edakit_stats::distribution::ChiSquareLaw;
    /// let law = ChiSquareLaw::new(4.0, 10.0, 2.0)?;
    /// let values = law.sample(100, 42)?;
    /// assert_eq!(values.len(), 100);
    /// assert!(values.iter().all(|v| *v > 10.0));
    /// assert_eq!(values, law.sample(100, 42)?);
    /// # Ok::<(), edakit_stats::StatsError>(())
    /// ```
    pub fn sample(&self, n: usize, seed: u64) -> Result<Vec<f64>, StatsError> {
        let sampler = rand_distr::ChiSquared::new(self.df)
            .map_err(|err| StatsError::degenerate(err.to_string()))?;
        let mut rng = Pcg32::seed_from_u64(seed);
        Ok((0..n)
            .map(|_| self.loc + self.scale * sampler.sample(&mut rng))
            .collect())
    }
}

/// Result of [`fit_chi_square`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChiSquareFit {
    #[serde(flatten)]
    pub law: ChiSquareLaw,
    /// Number of values the law was fitted to.
    pub n: usize,
    /// Log-likelihood of the sample under the fitted law. Negative infinity
    /// when `outside_support` is non-zero.
    pub log_likelihood: f64,
    /// Number of values at or below `loc`, where the fitted density is zero.
    /// Only the method of moments can leave values there.
    pub outside_support: usize,
    pub method: FitMethod,
}

/// Fits a chi-square law to `values`.
///
/// # Errors
///
/// - [`StatsError::InsufficientData`] if there are fewer than three values
///   (moments) or two values (maximum likelihood)
/// - [`StatsError::DegenerateInput`] if a value is not finite, the sample has
///   no spread, the sample is not right-skewed (moments), or a value is not
///   strictly positive (maximum likelihood)
pub fn fit_chi_square(values: &[f64], method: FitMethod) -> Result<ChiSquareFit, StatsError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(StatsError::degenerate("values must be finite"));
    }
    let law = match method {
        FitMethod::Moments => fit_moments(values)?,
        FitMethod::MaxLikelihood => fit_max_likelihood(values)?,
    };
    let log_likelihood = values.iter().map(|&v| law.ln_pdf(v)).sum();
    let outside_support = values.iter().filter(|&&v| v <= law.loc).count();
    if outside_support > 0 {
        tracing::warn!(
            outside_support,
            loc = law.loc,
            "fitted law assigns zero density to some values"
        );
    }

    tracing::debug!(
        df = law.df,
        loc = law.loc,
        scale = law.scale,
        log_likelihood,
        %method,
        "fitted chi-square law"
    );
    Ok(ChiSquareFit {
        law,
        n: values.len(),
        log_likelihood,
        outside_support,
        method,
    })
}

#[expect(clippy::cast_precision_loss)]
fn fit_moments(values: &[f64]) -> Result<ChiSquareLaw, StatsError> {
    const REQUIRED: usize = 3;
    if values.len() < REQUIRED {
        return Err(StatsError::InsufficientData {
            required: REQUIRED,
            actual: values.len(),
        });
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let m2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / n;
    if m2 <= 0.0 {
        return Err(StatsError::degenerate("values have zero variance"));
    }
    let skew = m3 / m2.powf(1.5);
    if skew <= 0.0 {
        return Err(StatsError::degenerate(format!(
            "sample skewness {skew:.4} is not positive"
        )));
    }

    let df = 8.0 / skew.powi(2);
    let scale = (m2 / (2.0 * df)).sqrt();
    let loc = mean - df * scale;
    ChiSquareLaw::new(df, loc, scale)
}

#[expect(clippy::cast_precision_loss)]
fn fit_max_likelihood(values: &[f64]) -> Result<ChiSquareLaw, StatsError> {
    const REQUIRED: usize = 2;
    if values.len() < REQUIRED {
        return Err(StatsError::InsufficientData {
            required: REQUIRED,
            actual: values.len(),
        });
    }
    if values.iter().any(|v| *v <= 0.0) {
        return Err(StatsError::degenerate(
            "maximum likelihood requires strictly positive values",
        ));
    }
    let first = values[0];
    if values.iter().all(|v| (v - first).abs() < f64::EPSILON * first) {
        return Err(StatsError::degenerate("values have zero variance"));
    }

    // E[ln X] = ψ(df/2) + ln 2 for X ~ χ²(df)
    let target = values.iter().map(|v| v.ln()).sum::<f64>() / values.len() as f64 - 2f64.ln();
    let half_df = solve_increasing(digamma, target)?;
    ChiSquareLaw::standard(2.0 * half_df)
}

/// Finds `x > 0` with `f(x) = target` for an increasing `f` by bisection.
fn solve_increasing<F>(f: F, target: f64) -> Result<f64, StatsError>
where
    F: Fn(f64) -> f64,
{
    let mut lo = 1e-8;
    let mut hi = 1.0;
    while f(hi) < target {
        lo = hi;
        hi *= 2.0;
        if hi > 1e12 {
            return Err(StatsError::degenerate("degrees of freedom diverge"));
        }
    }
    if f(lo) > target {
        return Err(StatsError::degenerate("degrees of freedom vanish"));
    }
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if f(mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= 1e-12 * hi {
            break;
        }
    }
    Ok(0.5 * (lo + hi))
}

/// One-sample Kolmogorov-Smirnov test result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KsTestResult {
    /// Largest absolute gap between the empirical and fitted CDFs.
    pub statistic: f64,
    pub p_value: f64,
    pub n: usize,
}

/// Two-sided one-sample Kolmogorov-Smirnov test of `values` against `law`.
///
/// The p-value is the asymptotic Kolmogorov distribution with Stephens'
/// small-sample correction.
///
/// # Errors
///
/// - [`StatsError::InsufficientData`] if `values` is empty
/// - [`StatsError::DegenerateInput`] if a value is not finite
#[expect(clippy::cast_precision_loss)]
pub fn ks_test(values: &[f64], law: &ChiSquareLaw) -> Result<KsTestResult, StatsError> {
    if values.is_empty() {
        return Err(StatsError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(StatsError::degenerate("values must be finite"));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len() as f64;
    let statistic = sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let cdf = law.cdf(x);
            let above = (i + 1) as f64 / n - cdf;
            let below = cdf - i as f64 / n;
            above.max(below)
        })
        .fold(0.0, f64::max);

    let sqrt_n = n.sqrt();
    let lambda = (sqrt_n + 0.12 + 0.11 / sqrt_n) * statistic;
    let p_value = kolmogorov_sf(lambda);

    tracing::debug!(statistic, p_value, n = sorted.len(), "kolmogorov-smirnov test");
    Ok(KsTestResult {
        statistic,
        p_value,
        n: sorted.len(),
    })
}

/// `Q(λ) = 2 Σ (-1)^(j-1) exp(-2 j² λ²)`
fn kolmogorov_sf(lambda: f64) -> f64 {
    // Q(0.27) > 0.9999
    if lambda < 0.27 {
        return 1.0;
    }
    let a = -2.0 * lambda * lambda;
    let mut sum = 0.0;
    let mut sign = 1.0;
    for j in 1..=100 {
        let j = f64::from(j);
        let term = sign * (a * j * j).exp();
        sum += term;
        if term.abs() <= 1e-12 * sum.abs() {
            break;
        }
        sign = -sign;
    }
    (2.0 * sum).clamp(0.0, 1.0)
}
