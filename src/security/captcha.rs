//! Arithmetic challenge shown before submission

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Captcha {
    a: u8,
    b: u8,
}

impl Captcha {
    pub fn new(a: u8, b: u8) -> Self {
        Self { a, b }
    }

    /// Two random operands in 1..=5
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self::new(rng.gen_range(1..=5), rng.gen_range(1..=5))
    }

    pub fn question(&self) -> String {
        format!("¿Cuánto es {} + {}?", self.a, self.b)
    }

    pub fn check(&self, answer: &str) -> bool {
        answer
            .trim()
            .parse::<u32>()
            .is_ok_and(|n| n == u32::from(self.a) + u32::from(self.b))
    }
}
