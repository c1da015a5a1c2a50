use std::{iter::Sum, ops::*};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointF(pub f32, pub f32);
impl PointF {
    /// Point at `radius` from the origin in direction `angle` (radians).
    pub fn from_polar(radius: f32, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self(radius * cos, radius * sin)
    }
    /// Return the square of the length of the vector.
    pub fn sq_length(self) -> f32 {
        self.0 * self.0 + self.1 * self.1
    }
    /// Return the length of the vector.
    pub fn length(self) -> f32 {
        let slen = self.sq_length();
        if slen > f32::EPSILON {
            slen.sqrt()
        } else {
            0.0
        }
    }
    /// Normalize the vector to have a length of 1 if it has a nonzero length.
    pub fn normalize(&mut self) {
        let len = self.length();
        if len > f32::EPSILON {
            self.0 /= len;
            self.1 /= len;
        }
    }
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }
    /// Rotate counter-clockwise given the sine and cosine of an angle.
    pub fn rotate(&mut self, sin: f32, cos: f32) {
        let Self(x, y) = *self;
        self.0 = x * cos - y * sin;
        self.1 = x * sin + y * cos;
    }
    /// Counter-clockwise rotation by `angle` radians.
    pub fn rotated(mut self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        self.rotate(sin, cos);
        self
    }
    /// The vector turned a quarter counter-clockwise.
    pub fn perpendicular(self) -> Self {
        Self(-self.1, self.0)
    }
    /// Direction of the vector, in radians.
    pub fn angle(self) -> f32 {
        self.1.atan2(self.0)
    }
    /// Find the parallel component of this vector along a given axis.
    pub fn parallel_component(self, axis: Self) -> Self {
        let dot = self.dot(axis);
        axis * dot / axis.sq_length()
    }
    pub fn is_finite(self) -> bool {
        self.0.is_finite() && self.1.is_finite()
    }

    /// Find the dot product of this vector with another.
    pub fn dot(self, other: Self) -> f32 {
        self.0 * other.0 + self.1 * other.1
    }
    /// Find the cross product of this vector with another.
    pub fn cross(self, other: Self) -> f32 {
        self.0 * other.1 - self.1 * other.0
    }
}
impl Add for PointF {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0, self.1 + rhs.1)
    }
}
impl Sub for PointF {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0, self.1 - rhs.1)
    }
}
impl Neg for PointF {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0, -self.1)
    }
}
impl Mul<f32> for PointF {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self(self.0 * rhs, self.1 * rhs)
    }
}
impl Div<f32> for PointF {
    type Output = Self;

    fn div(self, rhs: f32) -> Self::Output {
        Self(self.0 / rhs, self.1 / rhs)
    }
}
impl AddAssign for PointF {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
        self.1 += rhs.1;
    }
}
impl SubAssign for PointF {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
        self.1 -= rhs.1;
    }
}
impl MulAssign<f32> for PointF {
    fn mul_assign(&mut self, rhs: f32) {
        self.0 *= rhs;
        self.1 *= rhs;
    }
}
impl DivAssign<f32> for PointF {
    fn div_assign(&mut self, rhs: f32) {
        self.0 /= rhs;
        self.1 /= rhs;
    }
}
impl Sum for PointF {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self(0.0, 0.0), Add::add)
    }
}
