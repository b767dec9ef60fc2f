//! Python bindings for the lablib filter kernel
//!
//! Exposes `iir_apply(trace, xcoeff, ycoeff)` to Python. Arguments may be
//! any sequence (lists, tuples, numpy arrays); they are walked into shaped
//! arrays so that nested input is rejected the same way as in Rust.

use lablib_core::CoreError;

/// Python exception class a core error is raised as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    ValueError,
    MemoryError,
}

impl ExceptionKind {
    pub fn of(err: &CoreError) -> Self {
        match err {
            CoreError::OutOfMemory { .. } => ExceptionKind::MemoryError,
            _ => ExceptionKind::ValueError,
        }
    }
}

/// Message shown to Python callers for a core error
pub fn exception_message(err: &CoreError) -> String {
    match err {
        CoreError::InvalidShape { .. } => "only 1D arrays are allowed".to_string(),
        other => other.to_string(),
    }
}

#[cfg(feature = "python-bindings")]
mod python {
    use super::{exception_message, ExceptionKind};
    use lablib_core::buffer::SampleArray;
    use lablib_core::{CoreError, RecursiveFilter};
    use pyo3::exceptions::{PyMemoryError, PyTypeError, PyValueError};
    use pyo3::prelude::*;
    use pyo3::types::PyString;

    fn to_py_err(err: CoreError) -> PyErr {
        let message = exception_message(&err);
        match ExceptionKind::of(&err) {
            ExceptionKind::MemoryError => PyMemoryError::new_err(message),
            ExceptionKind::ValueError => PyValueError::new_err(message),
        }
    }

    /// Convert a Python argument into a shaped array.
    ///
    /// Only one level is walked: a sized item inside the argument makes it
    /// at least 2-D, which is rejected without looking any deeper. This keeps
    /// self-referential and deeply nested lists from recursing.
    fn to_sample_array(obj: &PyAny, name: &'static str) -> PyResult<SampleArray> {
        reject_string(obj)?;

        // Scalars and 0-d numpy arrays have no length
        if obj.len().is_err() {
            return Ok(SampleArray::scalar(obj.extract::<f64>()?));
        }

        let mut data = Vec::new();
        for item in obj.iter()? {
            let item = item?;
            reject_string(item)?;
            if item.len().is_ok() {
                return Err(to_py_err(CoreError::InvalidShape { name, ndim: 2 }));
            }
            data.push(item.extract::<f64>()?);
        }

        Ok(SampleArray::from(data))
    }

    fn reject_string(obj: &PyAny) -> PyResult<()> {
        if obj.is_instance_of::<PyString>() {
            return Err(PyTypeError::new_err("expected real numbers, got a string"));
        }
        Ok(())
    }

    /// iir_apply(trace, xcoeff, ycoeff)
    ///
    /// Apply a digital, possibly recursive, filter with coefficients `xcoeff`
    /// and `ycoeff`. The result is the filtered signal `y` with
    /// ``y[n]=sum_j x[n-j]*xcoeff[j] + sum_k y[n-k-1]*ycoeff[k]``.
    /// All inputs must be one-dimensional and real; the trace is not modified.
    #[pyfunction]
    fn iir_apply(py: Python<'_>, trace: &PyAny, xcoeff: &PyAny, ycoeff: &PyAny) -> PyResult<Vec<f64>> {
        let trace = to_sample_array(trace, "trace")?;
        let xcoeff = to_sample_array(xcoeff, "xcoeff")?;
        let ycoeff = to_sample_array(ycoeff, "ycoeff")?;

        py.allow_threads(|| lablib_core::iir_apply(&trace, &xcoeff, &ycoeff))
            .map_err(to_py_err)
    }

    /// Python wrapper for RecursiveFilter
    #[pyclass(name = "IirFilter")]
    struct PyIirFilter {
        inner: RecursiveFilter,
    }

    #[pymethods]
    impl PyIirFilter {
        #[new]
        #[pyo3(signature = (xcoeff, ycoeff = None))]
        fn new(xcoeff: &PyAny, ycoeff: Option<&PyAny>) -> PyResult<Self> {
            let xcoeff = to_sample_array(xcoeff, "xcoeff")?;
            let ycoeff = match ycoeff {
                Some(ycoeff) => to_sample_array(ycoeff, "ycoeff")?,
                None => SampleArray::from(Vec::<f64>::new()),
            };
            let inner = RecursiveFilter::from_arrays(&xcoeff, &ycoeff).map_err(to_py_err)?;

            Ok(Self { inner })
        }

        fn apply(&self, py: Python<'_>, trace: &PyAny) -> PyResult<Vec<f64>> {
            let trace = to_sample_array(trace, "trace")?;
            let samples = trace.as_1d("trace").map_err(to_py_err)?;
            py.allow_threads(|| self.inner.apply(samples)).map_err(to_py_err)
        }

        fn is_passthrough(&self, len: usize) -> bool {
            self.inner.is_passthrough(len)
        }

        #[getter]
        fn warmup(&self) -> usize {
            self.inner.warmup()
        }

        #[getter]
        fn xcoeff(&self) -> Vec<f64> {
            self.inner.xcoeff().to_vec()
        }

        #[getter]
        fn ycoeff(&self) -> Vec<f64> {
            self.inner.ycoeff().to_vec()
        }
    }

    /// lablib filter kernel Python module
    #[pymodule]
    fn lablib_py(_py: Python, m: &PyModule) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(iir_apply, m)?)?;
        m.add_class::<PyIirFilter>()?;

        m.add("__version__", env!("CARGO_PKG_VERSION"))?;

        Ok(())
    }

    #[cfg(all(test, feature = "embedded-python"))]
    mod tests {
        use super::*;
        use pyo3::types::{PyFloat, PyList, PyTuple};

        fn list<'py>(py: Python<'py>, values: &[f64]) -> &'py PyAny {
            PyList::new(py, values).as_ref()
        }

        fn eval<'py>(py: Python<'py>, expr: &str) -> &'py PyAny {
            py.eval(expr, None, None).unwrap()
        }

        fn assert_shape_error(py: Python<'_>, result: PyResult<Vec<f64>>) {
            let err = result.unwrap_err();
            assert!(err.is_instance_of::<PyValueError>(py));
            assert_eq!(err.value(py).to_string(), "only 1D arrays are allowed");
        }

        #[test]
        fn test_decaying_feedback_after_impulse() {
            Python::with_gil(|py| {
                let trace = list(py, &[1.0, 0.0, 0.0, 0.0, 0.0]);
                let out = iir_apply(py, trace, list(py, &[1.0]), list(py, &[0.5])).unwrap();

                assert_eq!(out, vec![1.0, 0.5, 0.25, 0.125, 0.0625]);
                assert_eq!(trace.extract::<Vec<f64>>().unwrap(), vec![1.0, 0.0, 0.0, 0.0, 0.0]);
            });
        }

        #[test]
        fn test_tuples_are_accepted() {
            Python::with_gil(|py| {
                let trace: &PyAny = PyTuple::new(py, [1.0, 1.0, 1.0]).as_ref();
                let xcoeff: &PyAny = PyTuple::new(py, [0.5, 0.5]).as_ref();
                let ycoeff: &PyAny = PyTuple::empty(py).as_ref();
                let out = iir_apply(py, trace, xcoeff, ycoeff).unwrap();
                assert_eq!(out, vec![1.0, 1.0, 1.0]);
            });
        }

        #[test]
        fn test_nested_lists_are_rejected() {
            Python::with_gil(|py| {
                let nested = eval(py, "[[1.0, 2.0], [3.0, 4.0]]");
                assert_shape_error(py, iir_apply(py, nested, list(py, &[1.0]), list(py, &[])));
                assert_shape_error(py, iir_apply(py, list(py, &[1.0, 2.0]), nested, list(py, &[])));

                let first = nested.get_item(0).unwrap();
                assert_eq!(first.extract::<Vec<f64>>().unwrap(), vec![1.0, 2.0]);
            });
        }

        #[test]
        fn test_self_referential_list_is_rejected() {
            Python::with_gil(|py| {
                let looped = eval(py, "(lambda a: (a.append(a), a)[1])([1.0])");
                assert_shape_error(py, iir_apply(py, looped, list(py, &[1.0]), list(py, &[])));
                assert_shape_error(py, iir_apply(py, list(py, &[1.0, 2.0]), list(py, &[1.0]), looped));
            });
        }

        #[test]
        fn test_deeply_nested_list_is_rejected() {
            Python::with_gil(|py| {
                let nested = eval(
                    py,
                    "__import__('functools').reduce(lambda x, _: [x], range(100000), [1.0])",
                );
                assert_shape_error(py, iir_apply(py, nested, list(py, &[1.0]), list(py, &[])));
            });
        }

        #[test]
        fn test_scalars_are_rejected() {
            Python::with_gil(|py| {
                let scalar: &PyAny = PyFloat::new(py, 1.0).as_ref();
                assert_shape_error(py, iir_apply(py, scalar, list(py, &[1.0]), list(py, &[])));
                assert_shape_error(py, iir_apply(py, list(py, &[1.0, 2.0]), list(py, &[1.0]), scalar));
            });
        }

        #[test]
        fn test_strings_are_rejected() {
            Python::with_gil(|py| {
                let text: &PyAny = PyString::new(py, "1.0").as_ref();
                let err = iir_apply(py, text, list(py, &[1.0]), list(py, &[])).unwrap_err();
                assert!(err.is_instance_of::<PyTypeError>(py));

                let mixed = eval(py, "[1.0, '2']");
                let err = iir_apply(py, mixed, list(py, &[1.0]), list(py, &[])).unwrap_err();
                assert!(err.is_instance_of::<PyTypeError>(py));
            });
        }

        #[test]
        fn test_filter_class() {
            Python::with_gil(|py| {
                let filter = PyIirFilter::new(list(py, &[1.0]), None).unwrap();
                assert_eq!(filter.warmup(), 0);
                assert!(filter.ycoeff().is_empty());
                assert_eq!(filter.apply(py, list(py, &[2.0, 3.0])).unwrap(), vec![2.0, 3.0]);
                assert!(filter.is_passthrough(1));

                let filter = PyIirFilter::new(list(py, &[1.0]), Some(list(py, &[0.5]))).unwrap();
                assert_eq!(filter.warmup(), 1);
                assert_eq!(filter.xcoeff(), vec![1.0]);
                assert_eq!(filter.apply(py, list(py, &[1.0, 0.0, 0.0])).unwrap(), vec![1.0, 0.5, 0.25]);
                assert!(!filter.is_passthrough(3));

                let nested = eval(py, "[[1.0]]");
                assert!(PyIirFilter::new(nested, None).is_err());
                assert_shape_error(py, filter.apply(py, nested));
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_errors_are_value_errors() {
        let err = CoreError::InvalidShape { name: "trace", ndim: 2 };
        assert_eq!(ExceptionKind::of(&err), ExceptionKind::ValueError);
        assert_eq!(exception_message(&err), "only 1D arrays are allowed");
    }

    #[test]
    fn test_allocation_failure_is_memory_error() {
        let err = CoreError::OutOfMemory { requested: 16 };
        assert_eq!(ExceptionKind::of(&err), ExceptionKind::MemoryError);
        assert!(exception_message(&err).contains("16"));
    }
}
