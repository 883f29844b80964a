/// Sparse matrix in triplet form, used as the target of assembly.
///
/// Duplicate entries are summed on conversion.
#[derive(Default, Debug, Clone)]
pub struct SparseMatrix {
  nrows: usize,
  ncols: usize,
  triplets: Vec<(usize, usize, f64)>,
}

impl SparseMatrix {
  pub fn zeros(nrows: usize, ncols: usize) -> Self {
    Self::new(nrows, ncols, Vec::new())
  }
  pub fn new(nrows: usize, ncols: usize, triplets: Vec<(usize, usize, f64)>) -> Self {
    Self {
      nrows,
      ncols,
      triplets,
    }
  }

  pub fn nrows(&self) -> usize {
    self.nrows
  }
  pub fn ncols(&self) -> usize {
    self.ncols
  }
  pub fn ntriplets(&self) -> usize {
    self.triplets.len()
  }

  pub fn push(&mut self, r: usize, c: usize, v: f64) {
    assert!(r < self.nrows && c < self.ncols);
    if v != 0.0 {
      self.triplets.push((r, c, v));
    }
  }

  /// Adds `scale * other` with its upper left corner placed at `(row_offset, col_offset)`.
  pub fn add_block(&mut self, row_offset: usize, col_offset: usize, scale: f64, other: &Self) {
    assert!(row_offset + other.nrows <= self.nrows && col_offset + other.ncols <= self.ncols);
    if scale == 0.0 {
      return;
    }
    self.triplets.extend(
      other
        .triplets
        .iter()
        .map(|&(r, c, v)| (r + row_offset, c + col_offset, scale * v)),
    );
  }

  pub fn to_nalgebra_coo(&self) -> nas::CooMatrix<f64> {
    let rows = self.triplets.iter().map(|t| t.0).collect();
    let cols = self.triplets.iter().map(|t| t.1).collect();
    let vals = self.triplets.iter().map(|t| t.2).collect();
    nas::CooMatrix::try_from_triplets(self.nrows, self.ncols, rows, cols, vals)
      .expect("triplet indices are checked on push")
  }

  pub fn to_nalgebra_csc(&self) -> nas::CscMatrix<f64> {
    (&self.to_nalgebra_coo()).into()
  }

  pub fn to_nalgebra_dense(&self) -> na::DMatrix<f64> {
    (&self.to_nalgebra_coo()).into()
  }
}

#[cfg(test)]
mod test {
  use super::SparseMatrix;

  #[test]
  fn duplicates_are_summed() {
    let mut m = SparseMatrix::zeros(2, 2);
    m.push(0, 0, 1.0);
    m.push(0, 0, 2.0);
    m.push(1, 0, 0.0);
    assert_eq!(m.ntriplets(), 2);
    let dense = m.to_nalgebra_dense();
    assert_eq!(dense, na::DMatrix::from_row_slice(2, 2, &[3.0, 0.0, 0.0, 0.0]));
  }

  #[test]
  fn block_placement() {
    let mut block = SparseMatrix::zeros(1, 2);
    block.push(0, 1, 1.5);
    let mut m = SparseMatrix::zeros(3, 4);
    m.add_block(2, 2, -2.0, &block);
    assert_eq!((m.nrows(), m.ncols()), (3, 4));
    let dense = m.to_nalgebra_dense();
    assert_eq!(dense[(2, 3)], -3.0);
    assert_eq!(dense.iter().filter(|&&v| v != 0.0).count(), 1);
  }
}
