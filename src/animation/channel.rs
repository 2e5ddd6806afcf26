use crate::animation::ease::Ease;

/// One animated scalar: `from` at `t = 0`, `to` at `t = 1`, shaped by `ease`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Channel {
    pub from: f64,
    pub to: f64,
    pub ease: Ease,
}

impl Channel {
    pub fn new(from: f64, to: f64, ease: Ease) -> Self {
        Self { from, to, ease }
    }

    pub fn sample(&self, t: f64) -> f64 {
        let e = self.ease.apply(t);
        // Weighted form keeps both endpoints exact.
        self.from * (1.0 - e) + self.to * e
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/channel.rs"]
mod tests;
