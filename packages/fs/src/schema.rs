//! Built-in schemas.
//!
//! Each function describes a directory tree as a list of levels and returns
//! the chain rooted at `prefix`. Structured values (geometries, z-matrices,
//! reactions, trajectories) are registered as JSON artifacts; scalars,
//! matrices, text and info records use their own formats.

use std::path::PathBuf;

use locfs_core::{Format, FsConfig, Result};

use crate::chain::{ArtifactSpec, LevelSpec, NodeChain};

/// Artifacts of a finished electronic-structure calculation.
fn calculation_files(level: LevelSpec) -> LevelSpec {
    level
        .file("energy", Format::SCALAR)
        .file("energy_info", Format::INFO)
        .file("energy_input", Format::TEXT)
        .file("geometry", Format::JSON)
        .file("geometry_info", Format::INFO)
        .file("geometry_input", Format::TEXT)
        .file("gradient", Format::MATRIX)
        .file("gradient_info", Format::INFO)
        .file("hessian", Format::MATRIX)
        .file("hessian_info", Format::INFO)
        .file("zmatrix", Format::JSON)
}

/// The subset of calculation artifacts that may live in a document.
fn calculation_documents(level: LevelSpec) -> LevelSpec {
    level
        .document("energy")
        .document("geometry")
        .document("geometry_info")
        .document("gradient")
        .document("hessian")
}

fn chain(prefix: impl Into<PathBuf>, levels: Vec<LevelSpec>) -> Result<NodeChain> {
    NodeChain::new(prefix, levels, FsConfig::default())
}

/// Species keyed by `[inchi, charge, multiplicity]`.
pub fn species(prefix: impl Into<PathBuf>) -> Result<NodeChain> {
    chain(
        prefix,
        vec![
            LevelSpec::root().segment("SPC"),
            LevelSpec::new(3)
                .file("geometry", Format::JSON)
                .file("info", Format::INFO),
        ],
    )
}

/// Reactions keyed by `[inchis, charges, multiplicities, ts_multiplicity]`,
/// where the first three are nested reactant/product sequences.
pub fn reaction(prefix: impl Into<PathBuf>) -> Result<NodeChain> {
    chain(
        prefix,
        vec![
            LevelSpec::root().segment("RXN"),
            LevelSpec::new(4).file("info", Format::INFO),
        ],
    )
}

/// Transition states keyed by an index.
pub fn transition_state(prefix: impl Into<PathBuf>) -> Result<NodeChain> {
    chain(
        prefix,
        vec![
            LevelSpec::root().segment("TS"),
            LevelSpec::new(1)
                .file("energy", Format::SCALAR)
                .file("geometry", Format::JSON)
                .file("zmatrix", Format::JSON),
        ],
    )
}

/// Levels of theory: method, basis and orbital restriction, one level each.
pub fn theory(prefix: impl Into<PathBuf>) -> Result<NodeChain> {
    chain(
        prefix,
        vec![
            LevelSpec::root().segment("THY"),
            LevelSpec::new(1),
            LevelSpec::new(1),
            calculation_documents(calculation_files(LevelSpec::new(1))),
        ],
    )
}

/// Conformers: a trunk, one branch per ring configuration, and one leaf per
/// conformer. Ring and conformer keys are generated identifiers.
pub fn conformer(prefix: impl Into<PathBuf>) -> Result<NodeChain> {
    chain(
        prefix,
        vec![
            LevelSpec::root()
                .segment("CONFS")
                .file("info", Format::INFO)
                .file("vibrational_frequencies", Format::JSON),
            LevelSpec::new(1).file("info", Format::INFO),
            calculation_documents(
                calculation_files(LevelSpec::new(1)).file("trajectory", Format::JSON),
            ),
        ],
    )
}

/// Single-point energies keyed by `[method, basis, restriction]`.
pub fn single_point(prefix: impl Into<PathBuf>) -> Result<NodeChain> {
    chain(
        prefix,
        vec![
            LevelSpec::root().segment("SP"),
            LevelSpec::new(3)
                .file("energy", Format::SCALAR)
                .file("energy_info", Format::INFO)
                .file("energy_input", Format::TEXT)
                .document("energy"),
        ],
    )
}

/// High-spin single points, laid out like [`single_point`].
pub fn high_spin(prefix: impl Into<PathBuf>) -> Result<NodeChain> {
    chain(
        prefix,
        vec![
            LevelSpec::root().segment("HS"),
            LevelSpec::new(3)
                .file("energy", Format::SCALAR)
                .file("energy_info", Format::INFO)
                .file("energy_input", Format::TEXT)
                .document("energy"),
        ],
    )
}

/// Z-matrices keyed by an index, with the reaction they were built for.
pub fn zmatrix(prefix: impl Into<PathBuf>) -> Result<NodeChain> {
    chain(
        prefix,
        vec![
            LevelSpec::root().segment("Z"),
            LevelSpec::new(1)
                .file("zmatrix", Format::JSON)
                .file("zmatrix_info", Format::INFO)
                .file("zmatrix_input", Format::TEXT)
                .file("reaction", Format::JSON),
        ],
    )
}

/// Rigid scans: a trunk, one branch per coordinate-name tuple, and one leaf
/// per grid point.
pub fn scan(prefix: impl Into<PathBuf>) -> Result<NodeChain> {
    chain(
        prefix,
        vec![
            LevelSpec::root().segment("SCANS"),
            LevelSpec::new(1).file("info", Format::INFO),
            calculation_files(LevelSpec::new(1)),
        ],
    )
}

/// Constrained scans: like [`scan`], with an extra level keyed by the map of
/// constrained coordinate values.
pub fn cscan(prefix: impl Into<PathBuf>) -> Result<NodeChain> {
    chain(
        prefix,
        vec![
            LevelSpec::root().segment("CSCANS"),
            LevelSpec::new(1).file("info", Format::INFO),
            LevelSpec::new(1).file("info", Format::INFO),
            calculation_files(LevelSpec::new(1)),
        ],
    )
}

/// Monte Carlo torsional samples keyed by generated identifiers.
pub fn tau(prefix: impl Into<PathBuf>) -> Result<NodeChain> {
    chain(
        prefix,
        vec![
            LevelSpec::root().segment("TAU").file("info", Format::INFO),
            calculation_documents(calculation_files(LevelSpec::new(1))),
        ],
    )
}

/// Variable-reaction-coordinate transition state theory runs.
pub fn vrctst(prefix: impl Into<PathBuf>) -> Result<NodeChain> {
    let text = |name: &str, file_name: &str| {
        ArtifactSpec::new(name, Format::TEXT).with_file_name(file_name)
    };
    chain(
        prefix,
        vec![
            LevelSpec::root().segment("VRC"),
            LevelSpec::new(1)
                .file_spec(text("vrctst_tst", "tst.inp"))
                .file_spec(text("vrctst_divsur", "divsur.inp"))
                .file_spec(text("vrctst_molpro", "molpro.inp"))
                .file_spec(text("vrctst_tml", "mol.tml"))
                .file_spec(text("vrctst_struct", "structure.inp"))
                .file_spec(text("vrctst_pot", "pot.f"))
                .file_spec(text("vrctst_flux", "flux.out")),
        ],
    )
}

/// Energy-transfer parameters keyed by the bath species followed by the
/// level of theory.
pub fn energy_transfer(prefix: impl Into<PathBuf>) -> Result<NodeChain> {
    chain(
        prefix,
        vec![
            LevelSpec::root().segment("ETRANS"),
            LevelSpec::new(3),
            LevelSpec::new(3)
                .file("lennard_jones_epsilon", Format::SCALAR)
                .file("lennard_jones_sigma", Format::SCALAR)
                .file("lennard_jones_input", Format::TEXT)
                .file("lennard_jones_elstruct", Format::TEXT)
                .file("trajectory", Format::JSON),
        ],
    )
}

/// Program runs keyed by job name.
pub fn run(prefix: impl Into<PathBuf>) -> Result<NodeChain> {
    chain(
        prefix,
        vec![
            LevelSpec::root().segment("RUN"),
            LevelSpec::new(1)
                .file("info", Format::INFO)
                .file("input", Format::TEXT)
                .file("output", Format::TEXT),
        ],
    )
}

/// Build directories keyed by `[program, name, number]`.
pub fn build(prefix: impl Into<PathBuf>) -> Result<NodeChain> {
    chain(
        prefix,
        vec![
            LevelSpec::root().segment("BUILD"),
            LevelSpec::new(1),
            LevelSpec::new(2)
                .file("input", Format::TEXT)
                .file("output", Format::TEXT),
        ],
    )
}
