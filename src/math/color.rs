use cgmath::BaseFloat;

/// A RGBA `Color`. Each color component is a floating point value
/// with a range from 0 to 1.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Color<S> {
    pub r: S,
    pub g: S,
    pub b: S,
    pub a: S,
}

impl<S: BaseFloat> Color<S> {
    pub fn new(r: S, g: S, b: S, a: S) -> Self {
        Color { r, g, b, a }
    }

    pub fn white() -> Self {
        Color::new(S::one(), S::one(), S::one(), S::one())
    }

    pub fn black() -> Self {
        Color::new(S::zero(), S::zero(), S::zero(), S::one())
    }

    pub fn transparent() -> Self {
        Color::new(S::zero(), S::zero(), S::zero(), S::zero())
    }

    /// Clips every component into the range from 0 to 1.
    pub fn clip(&self) -> Self {
        let min = S::zero();
        let max = S::one();
        Color::new(
            self.r.max(min).min(max),
            self.g.max(min).min(max),
            self.b.max(min).min(max),
            self.a.max(min).min(max),
        )
    }
}

impl<S: BaseFloat> Into<[S; 4]> for Color<S> {
    fn into(self) -> [S; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl<S: BaseFloat> From<[S; 4]> for Color<S> {
    fn from(v: [S; 4]) -> Self {
        Color::new(v[0], v[1], v[2], v[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip() {
        let v = Color::new(1.5f32, -0.5, 0.25, 1.0).clip();
        assert_eq!(v, Color::new(1.0, 0.0, 0.25, 1.0));
    }
}
