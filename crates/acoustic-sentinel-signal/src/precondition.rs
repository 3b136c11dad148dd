//! Per-block DC bias removal.

/// Subtract the arithmetic mean of `block` from every sample in place.
///
/// Returns the removed offset. An empty block is left untouched and reports
/// a zero offset.
pub fn remove_dc(block: &mut [f32]) -> f32 {
    if block.is_empty() {
        return 0.0;
    }
    // Accumulate in f64: 1024 samples of a large bias lose precision in f32.
    let mean = (block.iter().map(|&s| f64::from(s)).sum::<f64>() / block.len() as f64) as f32;
    for sample in block.iter_mut() {
        *sample -= mean;
    }
    mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constant_block_becomes_zero() {
        let mut block = vec![3.5_f32; 16];
        let offset = remove_dc(&mut block);
        assert_abs_diff_eq!(offset, 3.5, epsilon = 1e-6);
        assert!(block.iter().all(|&s| s.abs() < 1e-6));
    }

    #[test]
    fn result_has_zero_mean() {
        let mut block: Vec<f32> = (0..64).map(|i| 2.0 + (i as f32 * 0.3).sin()).collect();
        remove_dc(&mut block);
        let mean: f32 = block.iter().sum::<f32>() / block.len() as f32;
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn empty_block_is_noop() {
        let mut block: Vec<f32> = Vec::new();
        assert_eq!(remove_dc(&mut block), 0.0);
    }
}
