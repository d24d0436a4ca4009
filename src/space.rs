//! Memory-space abstraction (C1).
//!
//! `Host` and `Device` are compile-time tags classifying where a buffer
//! resides. The sparse-matrix runtime treats the tag as opaque beyond one
//! capability: each tag selects an [`Executor`] that array and SpMV
//! operations dispatch through, so that "device" kernels run with genuine
//! data-parallelism (rayon, behind the `parallel` feature) while "host"
//! kernels run synchronously on the calling thread. There is no real
//! accelerator driver here; see the crate-level design notes for why this
//! executor split stands in for one.

/// Sequential, single-thread execution. Used by [`Host`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sequential;

/// Data-parallel execution. Used by [`Device`]. Falls back to sequential
/// iteration when the `parallel` feature is disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Parallel;

/// A strategy for running the elementwise loops inside SpMV kernels and
/// dense-array operations.
pub trait Executor: Default + Copy + Send + Sync + 'static {
    /// Run `f` once per index in `0..len`, writing nothing itself: callers
    /// pass closures that write their own output slot.
    fn for_each_index(len: usize, f: impl Fn(usize) + Sync + Send);

    /// Scatter-add `y[rows[k]] += values[k] * x[cols[k]]` for every `k`.
    /// Unlike [`Executor::for_each_index`], several `k` may target the same
    /// output slot (COO and the HYB overflow are not grouped by row), so
    /// this cannot be expressed as one independent write per row and gets
    /// its own executor hook. `y` is assumed zeroed on entry.
    fn scatter_add<V>(rows: &[usize], cols: &[usize], values: &[V], x: &[V], y: &mut [V])
    where
        V: Copy + num_traits::Zero + std::ops::AddAssign + std::ops::Mul<Output = V> + Send + Sync,
    {
        for k in 0..rows.len() {
            y[rows[k]] += values[k] * x[cols[k]];
        }
    }
}

impl Executor for Sequential {
    fn for_each_index(len: usize, f: impl Fn(usize) + Sync + Send) {
        for i in 0..len {
            f(i);
        }
    }
}

impl Executor for Parallel {
    #[cfg(feature = "parallel")]
    fn for_each_index(len: usize, f: impl Fn(usize) + Sync + Send) {
        use rayon::prelude::*;
        (0..len).into_par_iter().for_each(f);
    }

    #[cfg(not(feature = "parallel"))]
    fn for_each_index(len: usize, f: impl Fn(usize) + Sync + Send) {
        for i in 0..len {
            f(i);
        }
    }

    #[cfg(feature = "parallel")]
    fn scatter_add<V>(rows: &[usize], cols: &[usize], values: &[V], x: &[V], y: &mut [V])
    where
        V: Copy + num_traits::Zero + std::ops::AddAssign + std::ops::Mul<Output = V> + Send + Sync,
    {
        use rayon::prelude::*;

        if rows.is_empty() {
            return;
        }
        let nthreads = rayon::current_num_threads().max(1);
        let chunk_len = (rows.len() + nthreads - 1) / nthreads;
        let partial = rows
            .par_chunks(chunk_len)
            .zip(cols.par_chunks(chunk_len))
            .zip(values.par_chunks(chunk_len))
            .map(|((rs, cs), vs)| {
                let mut local = vec![V::zero(); y.len()];
                for k in 0..rs.len() {
                    local[rs[k]] += vs[k] * x[cs[k]];
                }
                local
            })
            .reduce(
                || vec![V::zero(); y.len()],
                |mut a, b| {
                    for i in 0..a.len() {
                        a[i] += b[i];
                    }
                    a
                },
            );
        y.copy_from_slice(&partial);
    }

    #[cfg(not(feature = "parallel"))]
    fn scatter_add<V>(rows: &[usize], cols: &[usize], values: &[V], x: &[V], y: &mut [V])
    where
        V: Copy + num_traits::Zero + std::ops::AddAssign + std::ops::Mul<Output = V> + Send + Sync,
    {
        for k in 0..rows.len() {
            y[rows[k]] += values[k] * x[cols[k]];
        }
    }
}

/// Sealed trait distinguishing the `Host` and `Device` memory-space tags.
///
/// Every array and matrix in this crate is parameterized by a type
/// implementing `MemorySpace`; cross-space copies are performed by
/// [`crate::array::Array1::to_space`], never by reaching into a tag's
/// internals.
pub trait MemorySpace: Default + Copy + Send + Sync + 'static + private::Sealed {
    /// The execution strategy kernels use for buffers in this space.
    type Exec: Executor;

    /// Short name, used in error messages and verbose solver diagnostics.
    fn name() -> &'static str;
}

/// Host (CPU) RAM. Kernels over `Host` buffers run synchronously on the
/// calling thread and are not re-entrant on the same container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Host;

/// Accelerator (device) memory. Kernels over `Device` buffers are
/// dispatched with massive data parallelism; from the solver's perspective
/// every device call is fenced before the next host-visible read (rayon's
/// `join`/parallel-iterator semantics give us this for free).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Device;

impl MemorySpace for Host {
    type Exec = Sequential;
    fn name() -> &'static str {
        "host"
    }
}

impl MemorySpace for Device {
    type Exec = Parallel;
    fn name() -> &'static str {
        "device"
    }
}

mod private {
    pub trait Sealed {}
    impl Sealed for super::Host {}
    impl Sealed for super::Device {}
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(Host::name(), "host");
        assert_eq!(Device::name(), "device");
    }

    #[test]
    fn sequential_executor_visits_every_index() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let sum = AtomicUsize::new(0);
        Sequential::for_each_index(5, |i| {
            sum.fetch_add(i, Ordering::Relaxed);
        });
        assert_eq!(sum.load(Ordering::Relaxed), 0 + 1 + 2 + 3 + 4);
    }

    #[test]
    fn parallel_executor_visits_every_index() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let sum = AtomicUsize::new(0);
        Parallel::for_each_index(100, |i| {
            sum.fetch_add(i, Ordering::Relaxed);
        });
        assert_eq!(sum.load(Ordering::Relaxed), (0..100).sum::<usize>());
    }

    #[test]
    fn scatter_add_accumulates_repeated_rows() {
        let rows = [0usize, 1, 0, 1];
        let cols = [0usize, 0, 1, 1];
        let values = [1.0, 1.0, 1.0, 1.0];
        let x = [2.0, 3.0];
        let mut y = vec![0.0; 2];
        Sequential::scatter_add(&rows, &cols, &values, &x, &mut y);
        assert_eq!(y, vec![2.0 + 3.0, 2.0 + 3.0]);

        let mut y2 = vec![0.0; 2];
        Parallel::scatter_add(&rows, &cols, &values, &x, &mut y2);
        assert_eq!(y2, y);
    }
}
