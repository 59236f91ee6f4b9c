#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::useless_conversion, clippy::too_many_arguments)]

use pyo3::{exceptions::PyValueError, prelude::*, types::PyList, wrap_pyfunction};

use crate::{
    api::EuclideanLandmarkMatcher,
    error::MatchError,
    settings::{MatcherSettings, WeightingType},
    synthetic::{SyntheticConfig, make_synthetic_landmarks},
    types::{DataMatrix, LandmarkSet},
};

fn to_py_err(err: MatchError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn matrix_from_python(obj: &Bound<'_, PyAny>) -> PyResult<DataMatrix> {
    let rows: Vec<Vec<f64>> = obj.extract()?;
    if rows.is_empty() {
        return Ok(DataMatrix::zeros(0, 3));
    }

    let width = rows[0].len();
    if !rows.iter().all(|r| r.len() == width) {
        return Err(PyValueError::new_err("all rows must have the same length"));
    }

    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Ok(DataMatrix::from_row_slice(flat.len() / width.max(1), width, &flat))
}

fn matrix_to_python<'py>(py: Python<'py>, matrix: &DataMatrix) -> Bound<'py, PyList> {
    let rows: Vec<Vec<f64>> = matrix
        .row_iter()
        .map(|row| row.iter().copied().collect::<Vec<f64>>())
        .collect();
    PyList::new_bound(py, rows)
}

fn landmarks_from_python(
    positions: &Bound<'_, PyAny>,
    covariances: Option<&Bound<'_, PyAny>>,
    sizes: Vec<f64>,
) -> PyResult<LandmarkSet> {
    let positions = matrix_from_python(positions)?;
    let set = LandmarkSet::new(positions, sizes).map_err(to_py_err)?;
    // Covariances are accepted for API compatibility; only their count is checked.
    if let Some(cov) = covariances {
        if !cov.is_none() {
            let count = cov.len()?;
            if count != set.len() {
                return Err(to_py_err(MatchError::ShapeMismatch {
                    what: "landmark covariances",
                    expected: set.len(),
                    actual: count,
                }));
            }
        }
    }
    Ok(set)
}

fn parse_weighting(name: &str) -> PyResult<WeightingType> {
    match name {
        "linear_ramp" | "linear" => Ok(WeightingType::LinearRamp),
        "exponential" => Ok(WeightingType::Exponential),
        "constant" => Ok(WeightingType::Constant),
        other => Err(PyValueError::new_err(format!("unknown weighting '{other}'"))),
    }
}

#[pyclass(name = "EuclideanLandmarkMatcher")]
pub struct PyEuclideanLandmarkMatcher {
    inner: EuclideanLandmarkMatcher,
}

#[pymethods]
impl PyEuclideanLandmarkMatcher {
    #[new]
    #[pyo3(signature = (epsilon, size_limit, sigma=None, weighting="linear_ramp"))]
    pub fn new(epsilon: f64, size_limit: f64, sigma: Option<f64>, weighting: &str) -> PyResult<Self> {
        let mut settings =
            MatcherSettings::new(epsilon, size_limit).with_weighting(parse_weighting(weighting)?);
        settings.sigma = sigma;
        let inner = EuclideanLandmarkMatcher::new(settings).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    #[getter]
    pub fn epsilon(&self) -> f64 {
        self.inner.settings().epsilon
    }

    #[getter]
    pub fn sigma(&self) -> f64 {
        self.inner.settings().sigma()
    }

    #[getter]
    pub fn size_limit(&self) -> f64 {
        self.inner.settings().size_limit
    }

    /// Returns the selected associations as a list of `(idx1, idx2)` tuples.
    #[pyo3(signature = (positions1, covariances1, sizes1, positions2, covariances2, sizes2))]
    pub fn find_associations(
        &self,
        positions1: &Bound<'_, PyAny>,
        covariances1: Option<&Bound<'_, PyAny>>,
        sizes1: Vec<f64>,
        positions2: &Bound<'_, PyAny>,
        covariances2: Option<&Bound<'_, PyAny>>,
        sizes2: Vec<f64>,
    ) -> PyResult<Vec<(usize, usize)>> {
        let set1 = landmarks_from_python(positions1, covariances1, sizes1)?;
        let set2 = landmarks_from_python(positions2, covariances2, sizes2)?;
        let result = self.inner.find_associations(&set1, &set2).map_err(to_py_err)?;
        Ok(result.pairs())
    }
}

/// Generate `(positions1, sizes1, positions2, sizes2, planted)` for demos.
#[pyfunction]
#[pyo3(signature = (n1=30, n2=35, noise=0.01, seed=7))]
fn make_synthetic<'py>(
    py: Python<'py>,
    n1: usize,
    n2: usize,
    noise: f64,
    seed: u64,
) -> PyResult<Bound<'py, PyList>> {
    let config = SyntheticConfig {
        n1,
        n2,
        position_noise: noise,
        seed,
        ..SyntheticConfig::default()
    };
    let scene = make_synthetic_landmarks(&config).map_err(to_py_err)?;
    let items: Vec<PyObject> = vec![
        matrix_to_python(py, scene.set1.positions()).into_any().unbind(),
        PyList::new_bound(py, scene.set1.sizes()).into_any().unbind(),
        matrix_to_python(py, scene.set2.positions()).into_any().unbind(),
        PyList::new_bound(py, scene.set2.sizes()).into_any().unbind(),
        PyList::new_bound(py, scene.planted).into_any().unbind(),
    ];
    Ok(PyList::new_bound(py, items))
}

#[pymodule]
fn weighted_clipper(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyEuclideanLandmarkMatcher>()?;
    m.add_function(wrap_pyfunction!(make_synthetic, m)?)?;
    Ok(())
}
