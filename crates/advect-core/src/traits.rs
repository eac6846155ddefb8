//! Read-only access to solver state for output collaborators.

/// Read-only view of the current state of every equation.
///
/// Implemented by the concurrency layer so that plotting and output
/// adapters can read ψ without knowing how subdomains or time levels
/// are laid out. Returns `None` if the equation index is invalid.
pub trait StateReader<T> {
    /// Number of equations advected by the solver.
    fn n_eqns(&self) -> usize;

    /// Interior values of equation `eqn` at the current time level,
    /// flattened in row-major order (last axis fastest).
    fn read_state(&self, eqn: usize) -> Option<Vec<T>>;

    /// Number of completed time steps.
    fn timestep(&self) -> u64;
}
