//! Arrival and service time generators.
//!
//! Both traits map an input time to an absolute output time in seconds.  The
//! scheduler, not the generator, validates the output: it must be finite and
//! strictly later than the input, otherwise the run halts with
//! [`SimError::NonMonotonicGenerator`].  Returning raw `f64` keeps closures
//! simple and lets NaN and infinity be caught at one place.
//!
//! | Type                     | Arrival | Service | Law                              |
//! |--------------------------|---------|---------|----------------------------------|
//! | [`Deterministic`]        | yes     | yes     | `t + c`                          |
//! | [`Exponential`]          | yes     | yes     | `t + Exp(rate)`                  |
//! | [`PoissonRandomMeasure`] | yes     | no      | non-homogeneous Poisson, `λ(t)`  |
//! | closures                 | yes     | yes     | `FnMut(SimTime, &mut SimRng) -> f64` |

use rand_distr::{Distribution, Exp};

use qn_core::{SimRng, SimTime};

use crate::{SimError, SimResult};

/// Upper bound on thinning rejections before [`PoissonRandomMeasure`] gives
/// up and reports an infinite next arrival.
const MAX_THINNING_ROUNDS: u32 = 1_000_000;

// ── Traits ────────────────────────────────────────────────────────────────────

/// Produces the time of the next exogenous arrival after `now`.
pub trait ArrivalProcess: Send {
    fn next_arrival(&mut self, now: SimTime, rng: &mut SimRng) -> f64;
}

/// Produces the departure time of an agent whose service starts at `start`.
pub trait ServiceProcess: Send {
    fn departure_time(&mut self, start: SimTime, rng: &mut SimRng) -> f64;
}

impl<F> ArrivalProcess for F
where
    F: FnMut(SimTime, &mut SimRng) -> f64 + Send,
{
    fn next_arrival(&mut self, now: SimTime, rng: &mut SimRng) -> f64 {
        self(now, rng)
    }
}

impl<F> ServiceProcess for F
where
    F: FnMut(SimTime, &mut SimRng) -> f64 + Send,
{
    fn departure_time(&mut self, start: SimTime, rng: &mut SimRng) -> f64 {
        self(start, rng)
    }
}

// ── Deterministic ─────────────────────────────────────────────────────────────

/// Constant offset: `t → t + interval`.
#[derive(Debug, Clone, Copy)]
pub struct Deterministic {
    interval: f64,
}

impl Deterministic {
    pub fn new(interval: f64) -> SimResult<Self> {
        if interval.is_finite() && interval > 0.0 {
            Ok(Self { interval })
        } else {
            Err(SimError::InvalidParameter { what: "deterministic interval", value: interval })
        }
    }
}

impl ArrivalProcess for Deterministic {
    fn next_arrival(&mut self, now: SimTime, _rng: &mut SimRng) -> f64 {
        now.as_secs() + self.interval
    }
}

impl ServiceProcess for Deterministic {
    fn departure_time(&mut self, start: SimTime, _rng: &mut SimRng) -> f64 {
        start.as_secs() + self.interval
    }
}

// ── Exponential ───────────────────────────────────────────────────────────────

/// Exponentially distributed offsets with the given rate (events per second).
///
/// As an arrival process this is a homogeneous Poisson stream; as a service
/// process it gives an M-type server.
#[derive(Debug, Clone, Copy)]
pub struct Exponential {
    dist: Exp<f64>,
}

impl Exponential {
    pub fn new(rate: f64) -> SimResult<Self> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(SimError::InvalidParameter { what: "exponential rate", value: rate });
        }
        let dist = Exp::new(rate)
            .map_err(|_| SimError::InvalidParameter { what: "exponential rate", value: rate })?;
        Ok(Self { dist })
    }

    fn sample(&self, from: SimTime, rng: &mut SimRng) -> f64 {
        from.as_secs() + self.dist.sample(rng.inner())
    }
}

impl ArrivalProcess for Exponential {
    fn next_arrival(&mut self, now: SimTime, rng: &mut SimRng) -> f64 {
        self.sample(now, rng)
    }
}

impl ServiceProcess for Exponential {
    fn departure_time(&mut self, start: SimTime, rng: &mut SimRng) -> f64 {
        self.sample(start, rng)
    }
}

// ── PoissonRandomMeasure ──────────────────────────────────────────────────────

/// Non-homogeneous Poisson arrivals with intensity `rate(t)`, sampled by
/// thinning a homogeneous stream of intensity `rate_max`.
///
/// `rate(t)` must stay within `[0, rate_max]`.  If the candidate stream is
/// rejected [`MAX_THINNING_ROUNDS`] times in a row (e.g. the rate is zero from
/// `now` on), the next arrival is reported as `+∞`, which the scheduler
/// rejects.
pub struct PoissonRandomMeasure<F> {
    rate:     F,
    rate_max: f64,
    gap:      Exp<f64>,
}

impl<F> PoissonRandomMeasure<F>
where
    F: Fn(f64) -> f64 + Send,
{
    pub fn new(rate: F, rate_max: f64) -> SimResult<Self> {
        if !(rate_max.is_finite() && rate_max > 0.0) {
            return Err(SimError::InvalidParameter { what: "poisson rate_max", value: rate_max });
        }
        let gap = Exp::new(rate_max)
            .map_err(|_| SimError::InvalidParameter { what: "poisson rate_max", value: rate_max })?;
        Ok(Self { rate, rate_max, gap })
    }
}

impl<F> ArrivalProcess for PoissonRandomMeasure<F>
where
    F: Fn(f64) -> f64 + Send,
{
    fn next_arrival(&mut self, now: SimTime, rng: &mut SimRng) -> f64 {
        let mut t = now.as_secs();
        for _ in 0..MAX_THINNING_ROUNDS {
            t += self.gap.sample(rng.inner());
            let u: f64 = rng.random();
            if self.rate_max * u <= (self.rate)(t) {
                return t;
            }
        }
        f64::INFINITY
    }
}
