use nalgebra::{Dyn, MatrixView, MatrixViewMut, OMatrix, OVector, U1};

pub type VecD = OVector<f64, Dyn>;

pub type VecDView<'a> = MatrixView<'a, f64, Dyn, U1, U1, Dyn>;
pub type VecDViewMut<'a> = MatrixViewMut<'a, f64, Dyn, U1, U1, Dyn>;

pub type MatD = OMatrix<f64, Dyn, Dyn>;

/// Splits a design vector into its leading parameter block and trailing control point block.
pub trait VecHelpers {
    fn head(&self, n: usize) -> VecDView;
    fn head_mut(&mut self, n: usize) -> VecDViewMut;

    fn segment(&self, i: usize, n: usize) -> VecDView;
    fn segment_mut(&mut self, i: usize, n: usize) -> VecDViewMut;

    fn tail(&self, n: usize) -> VecDView;
    fn tail_mut(&mut self, n: usize) -> VecDViewMut;
}

impl VecHelpers for VecD {
    fn head(&self, n: usize) -> VecDView {
        self.segment(0, n)
    }

    fn head_mut(&mut self, n: usize) -> VecDViewMut {
        self.segment_mut(0, n)
    }

    fn segment(&self, start: usize, n: usize) -> VecDView {
        self.generic_view((start, 0), (Dyn(n), U1))
    }

    fn segment_mut(&mut self, start: usize, n: usize) -> VecDViewMut {
        self.generic_view_mut((start, 0), (Dyn(n), U1))
    }

    fn tail(&self, n: usize) -> VecDView {
        self.segment(self.len() - n, n)
    }

    fn tail_mut(&mut self, n: usize) -> VecDViewMut {
        self.segment_mut(self.len() - n, n)
    }
}
