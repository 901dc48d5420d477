//! Injected randomness source.
//!
//! The engine never reaches for ambient entropy: every component that needs
//! a die roll takes `&mut dyn Rng`, so deterministic replay and tests can
//! supply a fixed-seed or scripted source.

/// Minimal random source consumed by the step engine and reaction handlers.
pub trait Rng {
    fn next_u32(&mut self) -> u32;

    /// Uniform float in `[0, 1)`.
    fn next_f32(&mut self) -> f32 {
        // 24 mantissa bits keep the distribution uniform
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Bernoulli roll with probability `p`.
    fn chance(&mut self, p: f32) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.next_f32() < p
    }

    /// Fair coin flip.
    fn coin(&mut self) -> bool {
        self.next_u32() & 1 == 0
    }
}

/// Xorshift32 generator, the stock implementation.
#[derive(Clone, Debug)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    pub fn new(seed: u32) -> Self {
        // xorshift has a fixed point at zero
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }
}

impl Default for XorShift32 {
    fn default() -> Self {
        Self::new(12345)
    }
}

impl Rng for XorShift32 {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}
