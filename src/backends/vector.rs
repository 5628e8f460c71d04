/// Vector-like storage for the inputs and samples of a compiled formula.
///
/// [`crate::formula::CompiledFormula`] reads variable values from, and writes sampled y
/// values into, any type implementing this trait, so callers can keep their data in the
/// container they already use.
///
/// # Examples
///
/// ```rust
/// use graphly::prelude::Vector;
///
/// let ys: Vec<f64> = Vector::zeros(5).unwrap();
/// assert_eq!(ys.len(), 5);
///
/// // Fixed-size arrays only hold their own length
/// assert!(<[f64; 2] as Vector>::zeros(3).is_none());
///
/// let xs = vec![1.0, 2.0, 3.0];
/// assert_eq!(Vector::as_slice(&xs)[0], 1.0);
/// ```
pub trait Vector: Sized {
    /// The values as a contiguous slice.
    fn as_slice(&self) -> &[f64];

    fn as_mut_slice(&mut self) -> &mut [f64];

    /// Length every value of this type has, for fixed-size storage.
    const FIXED_LEN: Option<usize> = None;

    /// A vector of `len` zeros, `None` when this type cannot have that length.
    fn zeros(len: usize) -> Option<Self>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// # Examples
///
/// ```rust
/// use graphly::prelude::Vector;
///
/// let mut ys = <Vec<f64> as Vector>::zeros(3).unwrap();
/// Vector::as_mut_slice(&mut ys)[0] = 1.0;
/// assert_eq!(ys[0], 1.0);
/// ```
impl Vector for Vec<f64> {
    fn as_slice(&self) -> &[f64] {
        self
    }

    fn as_mut_slice(&mut self) -> &mut [f64] {
        self
    }

    fn zeros(len: usize) -> Option<Self> {
        Some(vec![0.0; len])
    }

    fn len(&self) -> usize {
        self.len()
    }
}

/// ndarray's `Array1<f64>`.
///
/// # Panics
/// When the array is not laid out contiguously, e.g. after reversing its axis.
///
/// # Examples
///
/// ```rust
/// use graphly::prelude::Vector;
/// use ndarray::Array1;
///
/// let mut ys = <Array1<f64> as Vector>::zeros(3).unwrap();
/// Vector::as_mut_slice(&mut ys)[1] = 2.0;
/// assert_eq!(ys[1], 2.0);
/// ```
#[cfg(feature = "ndarray")]
impl Vector for ndarray::Array1<f64> {
    fn as_slice(&self) -> &[f64] {
        self.as_slice().expect("Array1 must be contiguous")
    }

    fn as_mut_slice(&mut self) -> &mut [f64] {
        self.as_slice_mut().expect("Array1 must be contiguous")
    }

    fn zeros(len: usize) -> Option<Self> {
        Some(ndarray::Array1::zeros(len))
    }

    fn len(&self) -> usize {
        self.len()
    }
}

/// nalgebra's `DVector<f64>`.
///
/// # Examples
///
/// ```rust
/// use graphly::prelude::Vector;
/// use nalgebra::DVector;
///
/// let ys = <DVector<f64> as Vector>::zeros(4).unwrap();
/// assert_eq!(Vector::len(&ys), 4);
/// ```
#[cfg(feature = "nalgebra")]
impl Vector for nalgebra::DVector<f64> {
    fn as_slice(&self) -> &[f64] {
        self.as_slice()
    }

    fn as_mut_slice(&mut self) -> &mut [f64] {
        self.as_mut_slice()
    }

    fn zeros(len: usize) -> Option<Self> {
        Some(nalgebra::DVector::zeros(len))
    }

    fn len(&self) -> usize {
        self.len()
    }
}

/// Fixed-size arrays, handy for the one or two variables of a formula. As sample targets
/// they only fit a range of exactly `N` points.
///
/// # Examples
///
/// ```rust
/// use graphly::Formula;
///
/// let compiled = Formula::new("x^2 + y").unwrap().compile().unwrap();
/// assert_eq!(compiled.eval(&[3.0, 1.0]).unwrap(), 10.0);
/// ```
impl<const N: usize> Vector for [f64; N] {
    fn as_slice(&self) -> &[f64] {
        self
    }

    fn as_mut_slice(&mut self) -> &mut [f64] {
        self
    }

    const FIXED_LEN: Option<usize> = Some(N);

    fn zeros(len: usize) -> Option<Self> {
        (len == N).then_some([0.0; N])
    }

    fn len(&self) -> usize {
        N
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_zeros() {
        let ys: Vec<f64> = Vector::zeros(3).unwrap();
        assert_eq!(ys, vec![0.0; 3]);
        assert!(!Vector::is_empty(&ys));
        assert!(<Vec<f64> as Vector>::zeros(0).unwrap().is_empty());
        assert_eq!(<Vec<f64> as Vector>::FIXED_LEN, None);
    }

    #[test]
    fn test_array_len() {
        let xs = [1.0, 2.0];
        assert_eq!(Vector::len(&xs), 2);
        assert_eq!(Vector::as_slice(&xs), &[1.0, 2.0]);
    }

    #[test]
    fn test_array_zeros_only_fit_their_size() {
        assert_eq!(<[f64; 2] as Vector>::zeros(2), Some([0.0, 0.0]));
        assert_eq!(<[f64; 2] as Vector>::zeros(3), None);
        assert_eq!(<[f64; 2] as Vector>::FIXED_LEN, Some(2));
    }
}
