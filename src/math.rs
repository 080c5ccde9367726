use bevy::math::DVec2;
use nalgebra::DMatrix;

pub type Real = f64;
pub const DIM: usize = 2;

pub type Vector = DVec2;

/// Stacked column buffer, `DIM` rows per particle or spring.
pub type Stacked = DMatrix<Real>;

#[inline(always)]
pub fn zero_vector() -> Vector {
    DVec2::ZERO
}

#[inline(always)]
pub fn zero_stacked(count: usize) -> Stacked {
    DMatrix::zeros(count * DIM, 1)
}

/// Unit direction of `v`, or the zero vector when `v` has zero length.
#[inline(always)]
pub fn direction_or_zero(v: Vector) -> Vector {
    let length = v.length();
    if length == 0.0 { v } else { v / length }
}

#[inline(always)]
pub fn read_stacked(buffer: &Stacked, index: usize) -> Vector {
    DVec2::new(buffer[(index * DIM, 0)], buffer[(index * DIM + 1, 0)])
}

#[inline(always)]
pub fn write_stacked(buffer: &mut Stacked, index: usize, value: Vector) {
    buffer[(index * DIM, 0)] = value.x;
    buffer[(index * DIM + 1, 0)] = value.y;
}

#[inline]
pub fn stacked_is_finite(buffer: &Stacked) -> bool {
    buffer.iter().all(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_direction_stays_zero() {
        assert_eq!(direction_or_zero(Vector::ZERO), Vector::ZERO);
        assert_eq!(direction_or_zero(Vector::new(0.0, -3.0)), Vector::new(0.0, -1.0));
    }

    #[test]
    fn stacked_layout_is_interleaved() {
        let mut buffer = zero_stacked(3);
        write_stacked(&mut buffer, 1, Vector::new(4.0, 5.0));
        assert_eq!(buffer[(2, 0)], 4.0);
        assert_eq!(buffer[(3, 0)], 5.0);
        assert_eq!(read_stacked(&buffer, 1), Vector::new(4.0, 5.0));
        assert!(stacked_is_finite(&buffer));

        buffer[(0, 0)] = Real::NAN;
        assert!(!stacked_is_finite(&buffer));
    }
}
