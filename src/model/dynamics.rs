//! Coupled logistic growth/decay dynamics over the interaction graph

use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::data::AdjacencyMatrix;
use crate::error::{NetdynError, Result};

/// Carrying capacities with magnitude below this floor are rejected:
/// the logistic term divides by K.
pub const K_FLOOR: f64 = 1e-6;

/// Per-gene rate and carrying-capacity parameters, packed `[r_0..r_{N-1},
/// K_0..K_{N-1}]`
///
/// The packed layout matches the optimizer's flat parameter vector.
/// Construction validates finiteness and the carrying-capacity floor, so a
/// `ModelParams` can always be divided through safely.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    packed: Array1<f64>,
    n_genes: usize,
}

impl ModelParams {
    /// Build from separate rate and carrying-capacity vectors
    pub fn new(rates: Array1<f64>, capacities: Array1<f64>) -> Result<Self> {
        if rates.len() != capacities.len() {
            return Err(NetdynError::DimensionMismatch {
                expected: format!("{} rates", rates.len()),
                got: format!("{} carrying capacities", capacities.len()),
            });
        }
        let n = rates.len();
        let mut packed = Array1::zeros(2 * n);
        packed.slice_mut(ndarray::s![..n]).assign(&rates);
        packed.slice_mut(ndarray::s![n..]).assign(&capacities);
        Self::from_packed(packed)
    }

    /// Build from a packed `[r, K]` vector of even length
    pub fn from_packed(packed: Array1<f64>) -> Result<Self> {
        if packed.is_empty() || packed.len() % 2 != 0 {
            return Err(NetdynError::InvalidParameters {
                reason: format!(
                    "packed parameter vector must have even nonzero length, got {}",
                    packed.len()
                ),
            });
        }
        if packed.iter().any(|p| !p.is_finite()) {
            return Err(NetdynError::InvalidParameters {
                reason: "parameters must be finite".to_string(),
            });
        }
        let n_genes = packed.len() / 2;
        if packed.slice(ndarray::s![n_genes..]).iter().any(|&k| k.abs() < K_FLOOR) {
            return Err(NetdynError::InvalidParameters {
                reason: format!("carrying capacities must satisfy |K| >= {}", K_FLOOR),
            });
        }
        Ok(Self { packed, n_genes })
    }

    /// Uniform initial guess: the same rate and capacity for every gene
    pub fn uniform(n_genes: usize, rate: f64, capacity: f64) -> Result<Self> {
        if n_genes == 0 {
            return Err(NetdynError::EmptySelection);
        }
        Self::new(
            Array1::from_elem(n_genes, rate),
            Array1::from_elem(n_genes, capacity),
        )
    }

    /// Number of genes parameterized
    pub fn n_genes(&self) -> usize {
        self.n_genes
    }

    /// Per-gene rates `r`
    pub fn rates(&self) -> ArrayView1<'_, f64> {
        self.packed.slice(ndarray::s![..self.n_genes])
    }

    /// Per-gene carrying capacities `K`
    pub fn capacities(&self) -> ArrayView1<'_, f64> {
        self.packed.slice(ndarray::s![self.n_genes..])
    }

    /// The packed `[r, K]` vector
    pub fn packed(&self) -> ArrayView1<'_, f64> {
        self.packed.view()
    }
}

/// Right-hand side of the gene-network ODE system
///
/// For each gene i:
/// `dy_i/dt = r_i * y_i * (1 - y_i / K_i) + sum_j A[i,j] * y_j`
///
/// Logistic growth/decay toward K_i, perturbed additively by the weighted
/// expression of every interacting gene. Pure function of its inputs.
#[derive(Debug, Clone)]
pub struct NetworkDynamics<'a> {
    adjacency: ArrayView2<'a, f64>,
}

impl<'a> NetworkDynamics<'a> {
    /// Wrap a module adjacency matrix as an ODE right-hand side
    pub fn new(adjacency: &'a AdjacencyMatrix) -> Self {
        Self {
            adjacency: adjacency.weights(),
        }
    }

    /// Number of state variables
    pub fn n_genes(&self) -> usize {
        self.adjacency.nrows()
    }

    /// Evaluate `dy/dt` at state `y`, writing into `dydt`
    ///
    /// `y`, `dydt`, and the parameter vectors must all have length
    /// `n_genes()`; callers go through [`crate::model::integrate`], which
    /// checks this once up front.
    pub fn rhs(&self, y: ArrayView1<'_, f64>, params: &ModelParams, dydt: &mut Array1<f64>) {
        let n = self.n_genes();
        let rates = params.rates();
        let capacities = params.capacities();

        for i in 0..n {
            let mut interaction = 0.0;
            for j in 0..n {
                interaction += self.adjacency[[i, j]] * y[j];
            }
            dydt[i] = rates[i] * y[i] * (1.0 - y[i] / capacities[i]) + interaction;
        }
    }
}
