/// Mean and population standard deviation of `values[warmup..]`.
///
/// When `warmup` leaves nothing to average, every value is used instead.
/// Empty input yields `(0, 0)`.
pub fn avg_and_stdev(values: &[f64], warmup: usize) -> (f64, f64) {
    let values = match values.get(warmup..) {
        Some(rest) if !rest.is_empty() => rest,
        _ => values,
    };
    if values.is_empty() {
        return (0., 0.);
    }
    let n = values.len() as f64;
    let avg = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / n;
    (avg, var.sqrt())
}

#[test]
fn test_avg_and_stdev() {
    let (avg, std) = avg_and_stdev(&[1., 2., 3., 4., 5.], 2);
    assert_eq!(avg, 4.);
    assert!((std - (2.0f64 / 3.).sqrt()).abs() < 1e-15);

    assert_eq!(avg_and_stdev(&[2., 4.], 0), (3., 1.));
    assert_eq!(avg_and_stdev(&[7., 7., 7.], 1), (7., 0.));
    // warmup 吃掉全部样本时退回到全部样本
    assert_eq!(avg_and_stdev(&[2., 4.], 2), (3., 1.));
    assert_eq!(avg_and_stdev(&[2., 4.], 5), (3., 1.));
    assert_eq!(avg_and_stdev(&[], 3), (0., 0.));
}
