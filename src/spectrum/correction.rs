/// Compute the net counts of a spectrum from its detector calibration.
///
/// For each channel `N = (C - D) / G`, where `C` is the raw count, `D` the dark
/// current and `G` the gain correction. A zero gain gives an infinite or NaN
/// value, which is kept as is. Channels missing from either calibration array
/// are NaN. The output has one value per raw count.
pub fn corrected_counts(
    raw_counts: &[f64],
    dark_currents: &[f64],
    gain_corrections: &[f64],
) -> Vec<f64> {
    raw_counts
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let dark = dark_currents.get(i).copied().unwrap_or(f64::NAN);
            let gain = gain_corrections.get(i).copied().unwrap_or(f64::NAN);
            (raw - dark) / gain
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_formula() {
        let counts = corrected_counts(&[2282.0, 10.0], &[2313.0, 4.0], &[0.918375, 2.0]);
        assert_eq!(counts[0], (2282.0 - 2313.0) / 0.918375);
        assert_eq!(counts[1], 3.0);
    }

    #[test]
    fn test_zero_gain_propagates() {
        let counts = corrected_counts(&[5.0, 0.0, 1.0], &[1.0, 0.0, 1.0], &[0.0, 0.0, 1.0]);
        assert_eq!(counts[0], f64::INFINITY);
        assert!(counts[1].is_nan());
        assert_eq!(counts[2], 0.0);
    }

    #[test]
    fn test_short_calibration() {
        let counts = corrected_counts(&[5.0, 6.0], &[1.0], &[1.0, 1.0]);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0], 4.0);
        assert!(counts[1].is_nan());
    }

    #[test]
    fn test_idempotent() {
        let raw = [2282.0, 0.0, 17.0];
        let dark = [2313.0, 0.0, 3.0];
        let gain = [0.918375, 0.0, 0.3];
        let first = corrected_counts(&raw, &dark, &gain);
        let second = corrected_counts(&raw, &dark, &gain);
        let first_bits: Vec<u64> = first.iter().map(|v| v.to_bits()).collect();
        let second_bits: Vec<u64> = second.iter().map(|v| v.to_bits()).collect();
        assert_eq!(first_bits, second_bits);
    }
}
