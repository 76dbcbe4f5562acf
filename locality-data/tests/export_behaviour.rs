//! Behavioural tests for exporting flattened locations to JSON.

use camino::Utf8PathBuf;
use locality_core::{CountrySelector, Flattener};
use locality_data::{ExportDocument, ExportError, export_to_path, load_hierarchy_from_path};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use std::fs;
use tempfile::TempDir;

struct ExportWorld {
    dir: TempDir,
    source: RefCell<Option<Utf8PathBuf>>,
    output: RefCell<Option<Utf8PathBuf>>,
    outcome: RefCell<Option<Result<usize, ExportError>>>,
}

impl ExportWorld {
    fn root(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().to_path_buf()).expect("utf-8 temp dir")
    }

    fn export_to(&self, output: Utf8PathBuf) {
        let source = self.source.borrow().clone().expect("source must be set");
        let governorates =
            load_hierarchy_from_path(&source, &CountrySelector::default()).expect("load source");
        let flattener = Flattener::new(&governorates, "Tunisie");
        let outcome = export_to_path(&output, flattener.records());
        self.output.replace(Some(output));
        self.outcome.replace(Some(outcome));
    }

    fn exported(&self) -> Vec<ExportDocument> {
        let output = self.output.borrow().clone().expect("output must be set");
        let text = fs::read_to_string(&output).expect("read export");
        serde_json::from_str(&text).expect("parse export")
    }
}

#[fixture]
fn world() -> ExportWorld {
    ExportWorld {
        dir: TempDir::new().expect("temp dir"),
        source: RefCell::new(None),
        output: RefCell::new(None),
        outcome: RefCell::new(None),
    }
}

#[given("a source file with Tunis delegation \"La Marsa\" holding \"Alpha\" and \"Beta\"")]
fn la_marsa_source(#[from(world)] world: &ExportWorld) {
    let path = Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/la_marsa.json");
    world.source.replace(Some(path));
}

#[when("I export the locations to a file")]
fn export_to_file(#[from(world)] world: &ExportWorld) {
    world.export_to(world.root().join("out/locations.json"));
}

#[when("I export the locations beneath a regular file")]
fn export_beneath_file(#[from(world)] world: &ExportWorld) {
    let blocker = world.root().join("blocker");
    fs::write(&blocker, "not a directory").expect("write blocker");
    world.export_to(blocker.join("locations.json"));
}

#[then("the file holds 2 locations named \"Alpha\" and \"Beta\"")]
fn file_holds_two(#[from(world)] world: &ExportWorld) {
    let written = match world.outcome.borrow().as_ref() {
        Some(Ok(written)) => *written,
        other => panic!("expected a successful export, got {other:?}"),
    };
    assert_eq!(written, 2);
    let names: Vec<_> = world.exported().into_iter().map(|doc| doc.name).collect();
    assert_eq!(names, ["Alpha", "Beta"]);
}

#[then("every exported location belongs to governorate \"Tunis\"")]
fn all_in_tunis(#[from(world)] world: &ExportWorld) {
    for doc in world.exported() {
        assert_eq!(doc.governorate, "Tunis");
        assert_eq!(doc.delegation, "La Marsa");
        assert_eq!(doc.country_code, "TN");
        assert_eq!(doc.name_lower, doc.name.to_lowercase());
    }
}

#[then("the export fails with a write error")]
fn export_fails(#[from(world)] world: &ExportWorld) {
    assert!(matches!(
        world.outcome.borrow().as_ref(),
        Some(Err(ExportError::Write { .. }))
    ));
}

#[scenario(path = "tests/features/export.feature", index = 0)]
fn exporting_la_marsa(#[from(world)] world: ExportWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/export.feature", index = 1)]
fn exporting_beneath_a_file(#[from(world)] world: ExportWorld) {
    let _ = world;
}
