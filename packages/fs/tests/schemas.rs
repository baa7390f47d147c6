use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use locfs::schema;
use locfs::{Error, Loc, Locator, Removal};
use locfs_core::ident::IdKind;
use locfs_core::{
    codec, generate_new_conformer_id, generate_new_ring_id, generate_new_tau_id, locator,
    InfoObject, Json,
};

fn prefix(root: &Path, name: &str) -> std::path::PathBuf {
    let prefix = root.join(name);
    std::fs::create_dir(&prefix).unwrap();
    prefix
}

#[test]
fn test_species() {
    let dir = tempfile::tempdir().unwrap();
    let spc = schema::species(prefix(dir.path(), "species")).unwrap();
    let locs = locator!["InChI=1S/C2H2F2/c3-1-2-4/h1-2H/b2-1+", 0, 1];

    assert!(!spc.leaf().exists(&locs).unwrap());
    spc.leaf().create(&locs).unwrap();
    assert!(spc.leaf().exists(&locs).unwrap());
}

#[test]
fn test_reaction() {
    let dir = tempfile::tempdir().unwrap();
    let rxn = schema::reaction(prefix(dir.path(), "reaction")).unwrap();
    let locs = locator![
        vec![
            vec!["InChI=1S/C2H5O2/c1-2-4-3/h3H,1-2H2"],
            vec!["InChI=1S/C2H4/c1-2/h1-2H2", "InChI=1S/HO2/c1-2/h1H"],
        ],
        vec![vec![0], vec![0, 0]],
        vec![vec![2], vec![1, 2]],
        2
    ];

    assert!(!rxn.leaf().exists(&locs).unwrap());
    rxn.leaf().create(&locs).unwrap();
    assert!(rxn.leaf().exists(&locs).unwrap());
}

#[test]
fn test_nested_locator_node() {
    let dir = tempfile::tempdir().unwrap();
    let rxn = schema::reaction(prefix(dir.path(), "reaction")).unwrap();
    let locs = locator![
        vec![vec!["L1"], vec!["L2", "L3"]],
        vec![vec![0], vec![0, 0]],
        vec![vec![2], vec![1, 2]],
        2
    ];

    assert!(!rxn.leaf().exists(&locs).unwrap());
    rxn.leaf().create(&locs).unwrap();
    assert!(rxn.leaf().exists(&locs).unwrap());
    assert_eq!(rxn.leaf().existing(&locator![]).unwrap(), vec![locs]);
}

#[test]
fn test_transition_state() {
    let dir = tempfile::tempdir().unwrap();
    let ts = schema::transition_state(prefix(dir.path(), "ts")).unwrap();
    let locs = locator![0];

    assert!(!ts.leaf().exists(&locs).unwrap());
    ts.leaf().create(&locs).unwrap();
    assert!(ts.leaf().exists(&locs).unwrap());
}

#[test]
fn test_theory() {
    let dir = tempfile::tempdir().unwrap();
    let thy = schema::theory(prefix(dir.path(), "theory")).unwrap();
    let locs = locator!["hf", "sto-3g", "U"];

    thy.leaf().create(&locs).unwrap();
    let energy = thy.get(-1).unwrap().file("energy").unwrap();
    energy.write(&5.7, &locs).unwrap();
    assert_eq!(energy.read::<f64>(&locs).unwrap(), 5.7);

    // Every level above the leaf has its own directory, but only the leaf
    // was created as a node.
    assert!(thy[2].path(&locator!["hf", "sto-3g"]).unwrap().is_dir());
    assert!(!thy[2].exists(&locator!["hf", "sto-3g"]).unwrap());
}

#[test]
fn test_conformer() {
    let dir = tempfile::tempdir().unwrap();
    let cnf = schema::conformer(prefix(dir.path(), "conformer")).unwrap();
    let locs = Locator::new(vec![generate_new_ring_id(), generate_new_conformer_id()]);

    assert!(!cnf.leaf().exists(&locs).unwrap());
    cnf.leaf().create(&locs).unwrap();
    assert!(cnf.leaf().exists(&locs).unwrap());

    let trunk = InfoObject::conformer_trunk(1);
    let branch = InfoObject::conformer_branch(1);
    let ring = locs.prefix(1);
    cnf[0].file("info").unwrap().write(&trunk, &locator![]).unwrap();
    cnf[1].file("info").unwrap().write(&branch, &ring).unwrap();

    assert_eq!(
        cnf[0].file("info").unwrap().read::<InfoObject>(&locator![]).unwrap(),
        trunk
    );
    assert_eq!(
        cnf[1].file("info").unwrap().read::<InfoObject>(&ring).unwrap(),
        branch
    );

    let energy = cnf.leaf().file("energy").unwrap();
    energy.write(&5.7, &locs).unwrap();
    assert!((energy.read::<f64>(&locs).unwrap() - 5.7).abs() < 1e-12);
}

#[test]
fn test_single_point() {
    let dir = tempfile::tempdir().unwrap();
    let sp = schema::single_point(prefix(dir.path(), "single_point")).unwrap();
    let locs = locator!["hf", "sto-3g", "U"];

    sp.leaf().create(&locs).unwrap();
    let energy = sp.leaf().file("energy").unwrap();
    energy.write(&5.7, &locs).unwrap();
    assert_eq!(energy.read::<f64>(&locs).unwrap(), 5.7);

    assert!(matches!(
        energy.remove(&locs, Removal::Denied),
        Err(Error::RemovalDenied { .. })
    ));
    assert!(matches!(
        sp.leaf().remove(&locs, Removal::Denied),
        Err(Error::RemovalDenied { .. })
    ));

    energy.remove(&locs, Removal::Permitted).unwrap();
    sp.leaf().remove(&locs, Removal::Permitted).unwrap();
    assert!(!sp.leaf().exists(&locs).unwrap());
}

#[test]
fn test_high_spin() {
    let dir = tempfile::tempdir().unwrap();
    let hs = schema::high_spin(prefix(dir.path(), "high_spin")).unwrap();
    let locs = locator!["hf", "sto-3g", "U"];

    hs.leaf().create(&locs).unwrap();
    let energy = hs.leaf().file("energy").unwrap();
    energy.write(&5.7, &locs).unwrap();
    assert_eq!(energy.read::<f64>(&locs).unwrap(), 5.7);

    energy.remove(&locs, Removal::Permitted).unwrap();
    hs.leaf().remove(&locs, Removal::Permitted).unwrap();
    assert!(!hs.leaf().exists(&locs).unwrap());
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct ZRow(
    String,
    (Option<usize>, Option<usize>, Option<usize>),
    (Option<String>, Option<String>, Option<String>),
    (Option<f64>, Option<f64>, Option<f64>),
);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Reaction {
    class: String,
    atoms: BTreeMap<usize, String>,
    bonds: Vec<((usize, usize), f64)>,
    reactant_keys: Vec<Vec<usize>>,
    product_keys: Vec<Vec<usize>>,
}

#[test]
fn test_zmatrix() {
    let dir = tempfile::tempdir().unwrap();
    let zma_fs = schema::zmatrix(prefix(dir.path(), "zmatrix")).unwrap();
    let locs = locator![0];
    zma_fs.leaf().create(&locs).unwrap();

    let zma = Json(vec![
        ZRow("O".to_string(), (None, None, None), (None, None, None), (None, None, None)),
        ZRow(
            "H".to_string(),
            (Some(0), None, None),
            (Some("R1".to_string()), None, None),
            (Some(1.84779), None, None),
        ),
    ]);
    let zmatrix = zma_fs.leaf().file("zmatrix").unwrap();
    zmatrix.write(&zma, &locs).unwrap();
    assert_eq!(zmatrix.read::<Json<Vec<ZRow>>>(&locs).unwrap(), zma);

    let rxn = Json(Reaction {
        class: "hydrogen abstraction".to_string(),
        atoms: [(0, "C"), (1, "H"), (5, "O"), (6, "H")]
            .into_iter()
            .map(|(k, s)| (k, s.to_string()))
            .collect(),
        bonds: vec![((0, 1), 1.0), ((4, 5), 0.1), ((0, 4), 0.9)],
        reactant_keys: vec![vec![0, 1, 2, 3, 4], vec![5, 6]],
        product_keys: vec![vec![0, 1, 2], vec![3, 4, 5, 6]],
    });
    let reaction = zma_fs.leaf().file("reaction").unwrap();
    reaction.write(&rxn, &locs).unwrap();
    assert_eq!(reaction.read::<Json<Reaction>>(&locs).unwrap(), rxn);
}

#[test]
fn test_scan() {
    let dir = tempfile::tempdir().unwrap();
    let scn = schema::scan(prefix(dir.path(), "scan")).unwrap();
    let locs = locator![vec!["d3", "d4"], vec![2, 3]];

    scn.leaf().create(&locs).unwrap();
    let input = scn.leaf().file("geometry_input").unwrap();
    input.write(&"<input string>".to_string(), &locs).unwrap();
    assert_eq!(input.read::<String>(&locs).unwrap(), "<input string>");

    let mut grids = BTreeMap::new();
    grids.insert("d4".to_string(), vec![0.0, 2.0]);
    let info = InfoObject::scan_branch(grids);
    scn[1].create(&locator!["d4"]).unwrap();
    scn[1].file("info").unwrap().write(&info, &locator!["d4"]).unwrap();
    assert_eq!(
        scn[1].file("info").unwrap().read::<InfoObject>(&locator!["d4"]).unwrap(),
        info
    );
}

#[test]
fn test_cscan() {
    let dir = tempfile::tempdir().unwrap();
    let scn = schema::cscan(prefix(dir.path(), "cscan")).unwrap();
    let mut constraints = BTreeMap::new();
    constraints.insert("R1", 1.0);
    constraints.insert("A2", 2.3);
    let locs = locator![constraints, vec!["D3", "D4"], vec![1.2, 2.9]];

    scn.leaf().create(&locs).unwrap();
    let input = scn.leaf().file("geometry_input").unwrap();
    input.write(&"<input string>".to_string(), &locs).unwrap();
    assert_eq!(input.read::<String>(&locs).unwrap(), "<input string>");
}

#[test]
fn test_tau() {
    let dir = tempfile::tempdir().unwrap();
    let tau = schema::tau(prefix(dir.path(), "tau")).unwrap();
    let locs = Locator::new(vec![generate_new_tau_id()]);

    assert!(!tau.leaf().exists(&locs).unwrap());
    tau.leaf().create(&locs).unwrap();
    assert!(tau.leaf().exists(&locs).unwrap());

    let info = InfoObject::tau_trunk(0, BTreeMap::new());
    let trunk_info = tau.root().file("info").unwrap();
    trunk_info.write(&info, &locator![]).unwrap();
    assert_eq!(trunk_info.read::<InfoObject>(&locator![]).unwrap(), info);
}

#[test]
fn test_vrctst() {
    let dir = tempfile::tempdir().unwrap();
    let vrc = schema::vrctst(prefix(dir.path(), "vrctst")).unwrap();
    let locs = locator![0];
    vrc.leaf().create(&locs).unwrap();

    let names = [
        ("vrctst_tst", "<TST STR>"),
        ("vrctst_divsur", "<DIVSUR STR>"),
        ("vrctst_molpro", "<MOLPRO STR>"),
        ("vrctst_tml", "<TML STR>"),
        ("vrctst_struct", "<STRUCT STR>"),
        ("vrctst_pot", "<POT STR>"),
        ("vrctst_flux", "<FLUX STR>"),
    ];
    for (name, text) in names {
        vrc.leaf()
            .file(name)
            .unwrap()
            .write(&text.to_string(), &locs)
            .unwrap();
    }
    for (name, text) in names {
        assert_eq!(
            vrc.leaf().file(name).unwrap().read::<String>(&locs).unwrap(),
            text
        );
    }
}

type Trajectory = Vec<(Vec<(String, [f64; 3])>, String)>;

#[test]
fn test_energy_transfer() {
    let dir = tempfile::tempdir().unwrap();
    let etrans = schema::energy_transfer(prefix(dir.path(), "ETRANS")).unwrap();
    let bath = locator!["InChI=1S/N2/c1-2", 0, 1];
    let thy = locator!["hf", "sto-3g", "R"];
    let locs = bath.concat(&thy);
    etrans.leaf().create(&locs).unwrap();

    let leaf = etrans.leaf();
    leaf.file("lennard_jones_epsilon").unwrap().write(&300.0, &locs).unwrap();
    leaf.file("lennard_jones_sigma").unwrap().write(&3.50, &locs).unwrap();
    leaf.file("lennard_jones_input")
        .unwrap()
        .write(&"<INP STR>".to_string(), &locs)
        .unwrap();
    leaf.file("lennard_jones_elstruct")
        .unwrap()
        .write(&"<TEMP STR>".to_string(), &locs)
        .unwrap();

    let traj: Json<Trajectory> = Json(vec![
        (vec![("H".to_string(), [0.0, 0.0, 0.0])], "comment 1".to_string()),
        (vec![("H".to_string(), [0.0, 0.0, 0.0])], "comment 2".to_string()),
    ]);
    leaf.file("trajectory").unwrap().write(&traj, &locs).unwrap();

    let eps: f64 = leaf.file("lennard_jones_epsilon").unwrap().read(&locs).unwrap();
    let sig: f64 = leaf.file("lennard_jones_sigma").unwrap().read(&locs).unwrap();
    assert!((eps - 300.0).abs() < 1e-12);
    assert!((sig - 3.50).abs() < 1e-12);
    assert_eq!(
        leaf.file("lennard_jones_input").unwrap().read::<String>(&locs).unwrap(),
        "<INP STR>"
    );
    assert_eq!(
        leaf.file("lennard_jones_elstruct").unwrap().read::<String>(&locs).unwrap(),
        "<TEMP STR>"
    );
    assert_eq!(
        leaf.file("trajectory").unwrap().read::<Json<Trajectory>>(&locs).unwrap(),
        traj
    );
}

#[test]
fn test_run() {
    let dir = tempfile::tempdir().unwrap();
    let run = schema::run(prefix(dir.path(), "run")).unwrap();
    let locs = locator!["gradient"];

    run.leaf().create(&locs).unwrap();
    let input = run.leaf().file("input").unwrap();
    input.write(&"<input string>".to_string(), &locs).unwrap();
    assert_eq!(input.read::<String>(&locs).unwrap(), "<input string>");
}

#[test]
fn test_build() {
    let dir = tempfile::tempdir().unwrap();
    let build = schema::build(prefix(dir.path(), "build")).unwrap();
    let locs = locator!["MESS", "C2H5O", 0];

    build.leaf().create(&locs).unwrap();
    let input = build.leaf().file("input").unwrap();
    input.write(&"<input string>".to_string(), &locs).unwrap();
    assert_eq!(input.read::<String>(&locs).unwrap(), "<input string>");
}

#[test]
fn test_json_tau_save() {
    let dir = tempfile::tempdir().unwrap();
    let root = prefix(dir.path(), "tau");
    let tau = schema::tau(&root).unwrap();
    let leaf = tau.leaf();

    tau.root().create(&locator![]).unwrap();
    leaf.json_create(&locator![]).unwrap();
    assert!(leaf.json_existing(&locator![]).unwrap().is_empty());

    let locs = Locator::new(vec![leaf.generate_id(&locator![], IdKind::Tau).unwrap()]);
    assert!(!leaf.exists(&locs).unwrap());

    let energy = leaf.json("energy").unwrap();
    assert!(!energy.exists(&locs).unwrap());
    energy.write(&5.7, &locs).unwrap();
    assert!(energy.exists(&locs).unwrap());
    assert!(!leaf.json("geometry").unwrap().exists(&locs).unwrap());
    assert!(!leaf.json("gradient").unwrap().exists(&locs).unwrap());
    assert!(!leaf.json("geometry_info").unwrap().exists(&locs).unwrap());
    assert_eq!(energy.read::<f64>(&locs).unwrap(), 5.7);

    assert_eq!(leaf.json_existing(&locator![]).unwrap(), vec![locs.clone()]);
    energy.write_all(&[(5.7, locs.clone())]).unwrap();
    assert_eq!(energy.read_all::<f64>(&[locs.clone()]).unwrap(), vec![5.7]);

    // The document sits in the trunk directory, not in a per-sample file.
    assert_eq!(
        leaf.json_path(&locator![]).unwrap(),
        root.join("TAU").join("locfs.json")
    );
    assert!(!leaf.path(&locs).unwrap().exists());

    // A fresh chain over the same prefix reads what the first one wrote.
    let reloaded = schema::tau(&root).unwrap();
    assert_eq!(
        reloaded.leaf().json("energy").unwrap().read::<f64>(&locs).unwrap(),
        5.7
    );

    // Single points for the sample, nested in the sample's own entry.
    let save_path = tau.root().path(&locator![]).unwrap();
    let sp = schema::single_point(&save_path)
        .unwrap()
        .with_json_layer(locs.clone())
        .unwrap();
    let sp_locs = locator!["hf", "sto-3g", "U"];
    assert!(sp.leaf().json_existing(&locator![]).unwrap().is_empty());

    let sp_energy = sp.leaf().json("energy").unwrap();
    assert!(!sp_energy.exists(&sp_locs).unwrap());
    sp_energy.write(&5.5, &sp_locs).unwrap();
    assert!(sp_energy.exists(&sp_locs).unwrap());
    assert_eq!(sp_energy.read::<f64>(&sp_locs).unwrap(), 5.5);
    assert_eq!(
        sp.leaf().json_existing(&locator![]).unwrap(),
        vec![sp_locs.clone()]
    );

    // The layered values share the tau document and leave its entries intact.
    assert_eq!(
        sp.leaf().json_path(&locator![]).unwrap(),
        leaf.json_path(&locator![]).unwrap()
    );
    assert!(!save_path.join("SP").exists());
    assert_eq!(energy.read::<f64>(&locs).unwrap(), 5.7);
    assert_eq!(leaf.json_existing(&locator![]).unwrap(), vec![locs.clone()]);

    // A chain layered under another sample sees nothing.
    let other = Locator::new(vec![leaf.generate_id(&locator![], IdKind::Tau).unwrap()]);
    let sp_other = schema::single_point(&save_path)
        .unwrap()
        .with_json_layer(other)
        .unwrap();
    assert!(!sp_other.leaf().json("energy").unwrap().exists(&sp_locs).unwrap());
}

#[test]
fn test_json_non_finite_energy_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let thy = schema::theory(prefix(dir.path(), "theory")).unwrap();
    let locs = locator!["hf", "sto-3g", "U"];
    thy.leaf().create(&locs).unwrap();

    let energy = thy.leaf().json("energy").unwrap();
    energy.write(&5.7, &locs).unwrap();
    for bad in [f64::NAN, f64::INFINITY] {
        assert!(matches!(
            energy.write(&bad, &locs),
            Err(Error::Serialization { .. })
        ));
    }
    assert_eq!(energy.read::<f64>(&locs).unwrap(), 5.7);
}

#[test]
fn test_json_theory_values() {
    let dir = tempfile::tempdir().unwrap();
    let thy = schema::theory(prefix(dir.path(), "theory")).unwrap();
    let locs = locator!["hf", "sto-3g", "U"];
    thy.leaf().create(&locs).unwrap();

    let energy = thy.leaf().json("energy").unwrap();
    energy.write(&5.7, &locs).unwrap();
    energy.write(&5.5, &locs).unwrap();
    assert_eq!(energy.read::<f64>(&locs).unwrap(), 5.5);

    // Theory documents live in the basis directory, keyed by the restriction.
    assert_eq!(
        thy.leaf().json_path(&locator!["hf", "sto-3g"]).unwrap(),
        thy[2].path(&locator!["hf", "sto-3g"]).unwrap().join("locfs.json")
    );
    assert_eq!(
        thy.leaf().json_existing(&locator!["hf", "sto-3g"]).unwrap(),
        vec![locs.clone()]
    );

    let geometry = thy.leaf().json("geometry").unwrap();
    let err = geometry.write(&5.7, &locator!["hf", "sto-3g"]);
    assert!(matches!(err, Err(Error::Arity { expected: 3, .. })));
    assert!(matches!(
        thy.leaf().json("hessian_info"),
        Err(Error::UnknownArtifact { .. })
    ));
}

#[test]
fn test_generated_ids_are_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let cnf = schema::conformer(prefix(dir.path(), "conformer")).unwrap();
    let ring = Locator::new(vec![generate_new_ring_id()]);
    cnf[1].create(&ring).unwrap();

    let mut seen = HashSet::new();
    for _ in 0..50 {
        let id = cnf.leaf().generate_id(&ring, IdKind::Conformer).unwrap();
        assert!(seen.insert(codec::encode(&id)));
        cnf.leaf().create(&ring.clone().push(id)).unwrap();
    }
    assert_eq!(cnf.leaf().existing(&ring).unwrap().len(), 50);
}

#[test]
fn test_locators_round_trip_through_paths() {
    let dir = tempfile::tempdir().unwrap();
    let rxn = schema::reaction(prefix(dir.path(), "reaction")).unwrap();
    let mut created = vec![
        locator![vec![vec!["A"]], vec![vec![0]], vec![vec![1]], 1],
        locator![vec![vec!["A b/c"]], vec![vec![-1]], vec![vec![2]], 2],
        locator![vec![vec!["2"]], vec![vec![0]], vec![vec![1]], Loc::id("x")],
    ];
    for locs in &created {
        rxn.leaf().create(locs).unwrap();
    }

    let mut found = rxn.leaf().existing(&locator![]).unwrap();
    let key = |l: &Locator| codec::encode_locator(l);
    created.sort_by_key(key);
    found.sort_by_key(key);
    assert_eq!(found, created);
}
