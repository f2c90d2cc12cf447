//! Knowledge of an isomorphism between two public graphs.
//!
//! The secret is a permutation `σ`; the public key is the pair
//! `(G0, G1 = σ(G0))`. Each round the prover commits to `H = π(G0)` for a fresh
//! random `π`. On `Left` it reveals `π` (checked as `π(G0) = H`); on `Right` it
//! reveals `π∘σ⁻¹` (checked as `(π∘σ⁻¹)(G1) = H`).

use std::collections::BTreeSet;
use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::KnownPublicKey;
use crate::protocol::{ProverHelper, VerifierHelper};
use crate::{Error, PrivateKey, PublicKeyGenerator, Result, SecureRng};

/// Undirected simple graph on vertices `0..vertices`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Graph {
    vertices: usize,
    edges: BTreeSet<(usize, usize)>,
}

impl Graph {
    /// Creates a graph with no edges.
    pub fn new(vertices: usize) -> Self {
        Self {
            vertices,
            edges: BTreeSet::new(),
        }
    }

    /// Creates a graph from an edge list.
    pub fn from_edges(vertices: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut graph = Self::new(vertices);
        for &(a, b) in edges {
            graph.add_edge(a, b)?;
        }
        Ok(graph)
    }

    /// Random graph where each possible edge is present with probability one half.
    pub fn random<R: Rng + ?Sized>(vertices: usize, rng: &mut R) -> Self {
        let mut graph = Self::new(vertices);
        for a in 0..vertices {
            for b in (a + 1)..vertices {
                if rng.gen_bool(0.5) {
                    graph.edges.insert((a, b));
                }
            }
        }
        graph
    }

    /// Adds the undirected edge `{a, b}`.
    pub fn add_edge(&mut self, a: usize, b: usize) -> Result<()> {
        if a >= self.vertices || b >= self.vertices {
            return Err(Error::InvalidParams(format!(
                "Edge ({a}, {b}) out of range for {} vertices",
                self.vertices
            )));
        }

        if a == b {
            return Err(Error::InvalidParams(format!("Self-loop on vertex {a}")));
        }

        self.edges.insert((a.min(b), a.max(b)));
        Ok(())
    }

    /// Number of vertices.
    pub fn vertices(&self) -> usize {
        self.vertices
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether `{a, b}` is an edge.
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.edges.contains(&(a.min(b), a.max(b)))
    }

    /// Relabels every vertex `v` as `perm(v)`.
    ///
    /// The permutation must be valid for this graph's vertex count.
    pub fn permute(&self, perm: &Permutation) -> Graph {
        let edges = self
            .edges
            .iter()
            .map(|&(a, b)| {
                let (pa, pb) = (perm.apply(a), perm.apply(b));
                (pa.min(pb), pa.max(pb))
            })
            .collect();

        Graph {
            vertices: self.vertices,
            edges,
        }
    }
}

/// Bijection on `0..n`, stored as the image of each vertex.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// Wraps an image table, checking that it is a bijection.
    pub fn new(images: Vec<usize>) -> Result<Self> {
        let perm = Self(images);
        if !perm.is_valid_for(perm.len()) {
            return Err(Error::InvalidParams("Not a permutation".to_string()));
        }
        Ok(perm)
    }

    /// Identity on `0..n`.
    pub fn identity(n: usize) -> Self {
        Self((0..n).collect())
    }

    /// Uniformly random permutation of `0..n`.
    pub fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let mut images: Vec<usize> = (0..n).collect();
        images.shuffle(rng);
        Self(images)
    }

    /// Number of points permuted.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this permutes the empty set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Image of `v`.
    pub fn apply(&self, v: usize) -> usize {
        self.0[v]
    }

    /// `self ∘ other`: apply `other` first, then `self`.
    pub fn compose(&self, other: &Permutation) -> Permutation {
        Permutation(other.0.iter().map(|&v| self.0[v]).collect())
    }

    /// Inverse permutation.
    pub fn inverse(&self) -> Permutation {
        let mut inverse = vec![0; self.0.len()];
        for (v, &image) in self.0.iter().enumerate() {
            inverse[image] = v;
        }
        Permutation(inverse)
    }

    /// Whether this is a bijection on `0..n`.
    pub fn is_valid_for(&self, n: usize) -> bool {
        if self.0.len() != n {
            return false;
        }
        let mut seen = vec![false; n];
        self.0
            .iter()
            .all(|&v| v < n && !std::mem::replace(&mut seen[v], true))
    }
}

impl fmt::Debug for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Permutation").field(&self.0.len()).finish()
    }
}

/// Secret isomorphism `σ` together with the base graph `G0`.
#[derive(Clone)]
pub struct GraphSecret {
    base: Graph,
    sigma: Permutation,
}

impl GraphSecret {
    /// Wraps a known isomorphism.
    ///
    /// Fails with [`Error::InvalidParams`] unless `sigma` permutes exactly the
    /// vertices of `base`.
    pub fn new(base: Graph, sigma: Permutation) -> Result<Self> {
        if !sigma.is_valid_for(base.vertices) {
            return Err(Error::InvalidParams(format!(
                "Permutation of length {} does not fit a graph on {} vertices",
                sigma.len(),
                base.vertices
            )));
        }
        Ok(Self { base, sigma })
    }

    /// Draws a random graph on `vertices` vertices and a random isomorphism.
    pub fn random<R: Rng + ?Sized>(vertices: usize, rng: &mut R) -> Self {
        let base = Graph::random(vertices, rng);
        let sigma = Permutation::random(vertices, rng);
        Self { base, sigma }
    }
}

impl fmt::Debug for GraphSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphSecret")
            .field("vertices", &self.base.vertices)
            .finish_non_exhaustive()
    }
}

impl PublicKeyGenerator for GraphSecret {
    type PublicKey = GraphPublicKey;

    /// Yields no key if `σ` does not fit the base graph.
    fn generate(&self) -> Option<GraphPublicKey> {
        if !self.sigma.is_valid_for(self.base.vertices) {
            return None;
        }

        Some(GraphPublicKey {
            g0: self.base.clone(),
            g1: self.base.permute(&self.sigma),
        })
    }
}

/// The public pair of isomorphic graphs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphPublicKey {
    g0: Graph,
    g1: Graph,
}

impl GraphPublicKey {
    /// Wraps a pair of graphs received from elsewhere.
    pub fn new(g0: Graph, g1: Graph) -> Result<Self> {
        if g0.vertices != g1.vertices {
            return Err(Error::InvalidParams(
                "Graphs have different vertex counts".to_string(),
            ));
        }
        Ok(Self { g0, g1 })
    }

    /// Base graph `G0`.
    pub fn g0(&self) -> &Graph {
        &self.g0
    }

    /// Relabelled graph `G1`.
    pub fn g1(&self) -> &Graph {
        &self.g1
    }
}

/// Honest prover strategy.
#[derive(Clone, Default)]
pub struct GraphProver {
    pi: Option<Permutation>,
    rng: SecureRng,
}

impl GraphProver {
    /// Creates a prover strategy with no open round.
    pub fn new() -> Self {
        Self::default()
    }

    fn pi(&self, n: usize) -> Permutation {
        self.pi.clone().unwrap_or_else(|| Permutation::identity(n))
    }
}

impl ProverHelper for GraphProver {
    type Key = GraphSecret;
    type Proof = Graph;
    type Response = Permutation;

    fn generate(&mut self, key: &PrivateKey<GraphSecret>) -> Graph {
        let base = &key.generator().base;
        let pi = Permutation::random(base.vertices, &mut self.rng);
        let committed = base.permute(&pi);
        self.pi = Some(pi);
        committed
    }

    fn left(&mut self, key: &PrivateKey<GraphSecret>) -> Permutation {
        self.pi(key.generator().base.vertices)
    }

    fn right(&mut self, key: &PrivateKey<GraphSecret>) -> Permutation {
        let secret = key.generator();
        self.pi(secret.base.vertices).compose(&secret.sigma.inverse())
    }
}

/// Verifier strategy.
#[derive(Clone, Copy, Debug, Default)]
pub struct GraphVerifier;

impl GraphVerifier {
    fn maps_to(source: &Graph, proof: &Graph, response: &Permutation) -> bool {
        source.vertices == proof.vertices
            && response.is_valid_for(source.vertices)
            && source.permute(response) == *proof
    }
}

impl VerifierHelper for GraphVerifier {
    type PublicKey = GraphPublicKey;
    type Proof = Graph;
    type Response = Permutation;

    fn left(&self, public_key: &GraphPublicKey, proof: &Graph, response: &Permutation) -> bool {
        Self::maps_to(&public_key.g0, proof, response)
    }

    fn right(&self, public_key: &GraphPublicKey, proof: &Graph, response: &Permutation) -> bool {
        Self::maps_to(&public_key.g1, proof, response)
    }
}

/// Impersonator that knows `(G0, G1)` but not `σ`.
///
/// Each round it commits to a relabelling of whichever graph it bets the
/// verifier will ask about, and reveals the same relabelling either way.
#[derive(Clone, Default)]
pub struct CheatingGraphProver {
    pi: Option<Permutation>,
    rng: SecureRng,
}

impl CheatingGraphProver {
    /// Creates an impersonator.
    pub fn new() -> Self {
        Self::default()
    }

    fn pi(&self, n: usize) -> Permutation {
        self.pi.clone().unwrap_or_else(|| Permutation::identity(n))
    }
}

impl ProverHelper for CheatingGraphProver {
    type Key = KnownPublicKey<GraphPublicKey>;
    type Proof = Graph;
    type Response = Permutation;

    fn generate(&mut self, key: &PrivateKey<Self::Key>) -> Graph {
        let public_key = &key.generator().0;
        let source = if self.rng.gen_bool(0.5) {
            &public_key.g0
        } else {
            &public_key.g1
        };
        let pi = Permutation::random(source.vertices, &mut self.rng);
        let committed = source.permute(&pi);
        self.pi = Some(pi);
        committed
    }

    fn left(&mut self, key: &PrivateKey<Self::Key>) -> Permutation {
        self.pi(key.generator().0.g0.vertices)
    }

    fn right(&mut self, key: &PrivateKey<Self::Key>) -> Permutation {
        self.pi(key.generator().0.g1.vertices)
    }
}
