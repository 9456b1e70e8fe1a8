use super::VolumeMapping;
use crate::base::{IntegMode, QpArray};
use crate::Error;

/// Reduces values at quadrature points according to the integration mode
///
/// * [IntegMode::Integral] -- `out[e] = Σ_q values[e, q] dV`
/// * [IntegMode::Average] -- `out[e] = Σ_q values[e, q] dV / Σ_q dV`
/// * [IntegMode::PointWise] -- `out = values` (no quadrature weighting)
///
/// The output must have shape `[n_el, 1, nrow, ncol]` for the first two modes and the
/// same shape as the values for the point-wise mode.
pub fn integrate(out: &mut QpArray, values: &QpArray, mapping: &VolumeMapping, mode: IntegMode) -> Result<(), Error> {
    match mode {
        IntegMode::PointWise => {
            if out.shape() != values.shape() {
                return Err(Error::IntegrationFailure(format!(
                    "output with shape {:?} must have shape {:?}",
                    out.shape(),
                    values.shape()
                )));
            }
            out.as_mut_data().copy_from_slice(values.as_data());
            Ok(())
        }
        IntegMode::Integral | IntegMode::Average => mapping.integrate(out, values, mode),
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::integrate;
    use crate::base::{IntegMode, QpArray};
    use crate::fem::VolumeMapping;
    use crate::Error;
    use russell_lab::approx_eq;

    #[test]
    fn integrate_works() {
        let mapping = VolumeMapping::new(2, 2, 1, vec![0.0; 4], vec![0.5, 1.5]).unwrap();
        let values = QpArray::from_data([1, 2, 2, 1], vec![1.0, 2.0, 3.0, 4.0]).unwrap();

        let mut out = QpArray::new([1, 1, 2, 1]);
        integrate(&mut out, &values, &mapping, IntegMode::Integral).unwrap();
        approx_eq(out.get(0, 0, 0, 0), 0.5 + 4.5, 1e-15);
        approx_eq(out.get(0, 0, 1, 0), 1.0 + 6.0, 1e-15);

        integrate(&mut out, &values, &mapping, IntegMode::Average).unwrap();
        approx_eq(out.get(0, 0, 0, 0), 5.0 / 2.0, 1e-15);
        approx_eq(out.get(0, 0, 1, 0), 7.0 / 2.0, 1e-15);

        let mut same = QpArray::new([1, 2, 2, 1]);
        integrate(&mut same, &values, &mapping, IntegMode::PointWise).unwrap();
        assert_eq!(same, values);
    }

    #[test]
    fn integrate_handles_errors() {
        let mapping = VolumeMapping::new(2, 2, 1, vec![0.0; 4], vec![0.5, 1.5]).unwrap();
        let values = QpArray::new([1, 2, 2, 1]);
        let mut out = QpArray::new([1, 1, 2, 1]);
        assert_eq!(
            integrate(&mut out, &values, &mapping, IntegMode::PointWise).err(),
            Some(Error::IntegrationFailure(
                "output with shape [1, 1, 2, 1] must have shape [1, 2, 2, 1]".to_string()
            ))
        );
        let other = QpArray::new([3, 2, 2, 1]);
        assert_eq!(
            integrate(&mut out, &other, &mapping, IntegMode::Integral).err(),
            Some(Error::IntegrationFailure(
                "values with shape [3, 2, 2, 1] do not match the mapping (n_el = 1, n_qp = 2)".to_string()
            ))
        );
    }
}
